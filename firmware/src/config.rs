#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Build-time configuration for the coop door board.

use core::time::Duration;

use door_core::config::{DoorConfig, LockConfig, ToneConfig};

/// Full-scale reading of the 10-bit light channel.
pub const ADC_MAX_RAW: u16 = 1023;

/// Controller configuration flashed into the board.
pub const DOOR_CONFIG: DoorConfig = DoorConfig::DEFAULT
    .with_sampling(Duration::from_secs(15), Duration::from_secs(300))
    .with_thresholds(250, 550)
    .with_run_duration(Duration::from_secs(20))
    .with_min_dwell(Duration::from_secs(600))
    .with_hold_delay(Duration::from_millis(2_000))
    .with_relay(Some(Duration::from_millis(50)))
    .with_lock(Some(LockConfig::new(0, 90, Duration::from_millis(500))))
    .with_tone(ToneConfig::new(1_000, Duration::from_millis(150)));

/// Period of the door task loop.
pub const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Standard hobby-servo frame rate.
pub const SERVO_FRAME_HZ: u32 = 50;
const SERVO_FRAME_US: u32 = 1_000_000 / SERVO_FRAME_HZ;
const SERVO_MIN_PULSE_US: u32 = 500;
const SERVO_MAX_PULSE_US: u32 = 2_500;
const SERVO_MAX_DEGREES: u32 = 180;

/// Pulse width commanding `position` degrees, clamped to the servo's travel.
pub fn servo_pulse_us(position: u8) -> u32 {
    let degrees = u32::from(position).min(SERVO_MAX_DEGREES);
    SERVO_MIN_PULSE_US + degrees * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) / SERVO_MAX_DEGREES
}

/// Compare value for `position` given the timer's maximum duty.
pub fn servo_duty(position: u8, max_duty: u16) -> u16 {
    let duty = servo_pulse_us(position) * u32::from(max_duty) / SERVO_FRAME_US;
    u16::try_from(duty).unwrap_or(max_duty)
}
