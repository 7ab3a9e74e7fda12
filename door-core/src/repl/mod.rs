//! Operator console shared by the emulator and any line-oriented transport.
//!
//! [`grammar`] turns one input line into a [`grammar::ConsoleCommand`];
//! [`catalog`] holds the command names and help text.

pub mod catalog;
pub mod grammar;
