#![no_std]

// Decision logic for the light-driven coop door controller.
//
// This crate stays portable across the MCU firmware and the host emulator by
// avoiding the Rust standard library; hardware is reached only through the
// traits exposed by `sequencer` and `controller`.

pub mod config;
pub mod controller;
pub mod cooldown;
pub mod debounce;
pub mod light;
pub mod manual;
pub mod repl;
pub mod sequencer;
pub mod sequences;
pub mod telemetry;
pub mod time;
