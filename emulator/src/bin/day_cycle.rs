//! Replays a full day of light readings through the emulator and prints the
//! resulting narration.

use std::io::{self, Write};
use std::time::Duration;

use door_core::config::DoorConfig;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::Session;

const NIGHT_RAW: u16 = 900;
const DAY_RAW: u16 = 100;
const MINUTES_PER_DAY: u32 = 24 * 60;
const STEP: Duration = Duration::from_secs(60);

/// Short bright or dark excursions the debouncer must ride out.
const SPIKES: &[(u32, u16)] = &[
    // Headlights sweeping the coop at night.
    (2 * 60 + 10, 80),
    (2 * 60 + 11, 90),
    // Passing storm cloud around noon.
    (12 * 60, 950),
    (12 * 60 + 1, 950),
    (12 * 60 + 2, 700),
];

fn main() -> io::Result<()> {
    let mut session = Session::new(DoorConfig::DEFAULT, NIGHT_RAW).map_err(io::Error::other)?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writeln!(writer, "{}", session.status_line())?;

    for minute in 0..MINUTES_PER_DAY {
        session.set_light(reading_at(minute));
        for line in session.advance(STEP) {
            if !line.contains("light: raw=") || line.contains("committed") {
                writeln!(writer, "{line}")?;
            }
        }
    }

    writeln!(writer, "{}", session.status_line())?;
    writeln!(
        writer,
        "day complete: {} door run(s) over {} minutes",
        session.motor_starts(),
        MINUTES_PER_DAY
    )?;
    Ok(())
}

/// Light profile with a one-hour dawn ramp at 06:00 and a dusk ramp at 19:00.
fn reading_at(minute: u32) -> u16 {
    if let Some(&(_, raw)) = SPIKES.iter().find(|(at, _)| *at == minute) {
        return raw;
    }

    let dawn = 6 * 60;
    let dusk = 19 * 60;
    if minute < dawn || minute >= dusk + 60 {
        NIGHT_RAW
    } else if minute < dawn + 60 {
        ramp(NIGHT_RAW, DAY_RAW, minute - dawn)
    } else if minute < dusk {
        DAY_RAW
    } else {
        ramp(DAY_RAW, NIGHT_RAW, minute - dusk)
    }
}

fn ramp(from: u16, to: u16, elapsed: u32) -> u16 {
    let from = i32::from(from);
    let to = i32::from(to);
    let elapsed = i32::try_from(elapsed.min(60)).unwrap_or(60);
    let value = from + (to - from) * elapsed / 60;
    u16::try_from(value).unwrap_or(u16::MAX)
}
