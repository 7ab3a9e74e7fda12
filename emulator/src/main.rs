mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use door_core::config::DoorConfig;
use session::Session;

const DEFAULT_INITIAL_RAW: u16 = 900;

fn main() -> io::Result<()> {
    let initial_raw = parse_initial_raw().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: door-emulator [--light <raw>] | door-emulator <raw>");
        process::exit(2);
    });

    let mut session = Session::new(DoorConfig::DEFAULT, initial_raw).unwrap_or_else(|err| {
        eprintln!("invalid door configuration: {err}");
        process::exit(1);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Coop Door Emulator ready. Type `help` for commands or `exit` to quit."
    )?;
    writeln!(writer, "{}", session.status_line())?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(
                writer,
                "Session closed at {} after {} door run(s).",
                session.now(),
                session.motor_starts()
            )?;
            break;
        }

        for response in session.handle_line(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_initial_raw() -> Result<u16, String> {
    let mut args = env::args().skip(1);
    let value = match args.next() {
        None => return Ok(DEFAULT_INITIAL_RAW),
        Some(arg) => {
            if let Some(value) = arg.strip_prefix("--light=") {
                value.to_string()
            } else if arg == "--light" {
                args.next()
                    .ok_or_else(|| "Expected value after --light".to_string())?
            } else {
                arg
            }
        }
    };
    value
        .parse()
        .map_err(|_| format!("Invalid light reading `{value}`; expected 0-65535"))
}
