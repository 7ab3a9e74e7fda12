#![allow(clippy::module_name_repetitions)]

//! Line parser for the operator console.
//!
//! Keywords are matched case-insensitively and arguments are separated by
//! ASCII spaces or tabs. Durations take an integer with one of the suffixes
//! `ms`, `s`, `m` or `h`.

use core::fmt;
use core::time::Duration;

use winnow::ascii::{Caseless, alpha1, dec_uint, space1};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::literal;

/// Parsed console command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsoleCommand<'a> {
    /// Sets the emulated raw light reading.
    Light(u16),
    Press,
    Release,
    /// Advances the virtual clock.
    Advance(Duration),
    Status,
    /// Lists the most recent telemetry records, or all of them.
    Events(Option<usize>),
    Help(Option<&'a str>),
}

/// Errors produced while parsing a console line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsoleError {
    /// The line held only whitespace.
    Empty,
    /// The line did not match any command; `offset` is the byte position of
    /// the failure within the trimmed line.
    Syntax { offset: usize },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Empty => f.write_str("empty command"),
            ConsoleError::Syntax { offset } => write!(f, "syntax error at column {offset}"),
        }
    }
}

/// Parses one console line.
///
/// # Errors
///
/// Returns [`ConsoleError::Empty`] for a blank line and
/// [`ConsoleError::Syntax`] when the line matches no command.
pub fn parse(line: &str) -> Result<ConsoleCommand<'_>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ConsoleError::Empty);
    }

    command
        .parse(line)
        .map_err(|error| ConsoleError::Syntax {
            offset: error.offset(),
        })
}

fn command<'a>(input: &mut &'a str) -> ModalResult<ConsoleCommand<'a>> {
    alt((
        preceded((keyword("light"), space1), dec_uint).map(ConsoleCommand::Light),
        keyword("press").value(ConsoleCommand::Press),
        keyword("release").value(ConsoleCommand::Release),
        preceded((keyword("advance"), space1), duration).map(ConsoleCommand::Advance),
        keyword("status").value(ConsoleCommand::Status),
        preceded(keyword("events"), opt(preceded(space1, dec_uint::<_, usize, _>)))
            .map(ConsoleCommand::Events),
        preceded(keyword("help"), opt(preceded(space1, alpha1))).map(ConsoleCommand::Help),
    ))
    .parse_next(input)
}

fn keyword<'a>(name: &'static str) -> impl Parser<&'a str, &'a str, ErrMode<ContextError>> {
    literal(Caseless(name))
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DurationUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
}

impl DurationUnit {
    const fn millis(self) -> u64 {
        match self {
            DurationUnit::Millis => 1,
            DurationUnit::Seconds => 1_000,
            DurationUnit::Minutes => 60_000,
            DurationUnit::Hours => 3_600_000,
        }
    }
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    (
        dec_uint::<_, u64, _>,
        alt((
            "ms".value(DurationUnit::Millis),
            "s".value(DurationUnit::Seconds),
            "m".value(DurationUnit::Minutes),
            "h".value(DurationUnit::Hours),
        )),
    )
        .verify_map(|(amount, unit)| amount.checked_mul(unit.millis()).map(Duration::from_millis))
        .parse_next(input)
}
