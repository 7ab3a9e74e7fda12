//! STM32G0 board adapters for the door controller traits.
//!
//! Pin map:
//! - PA0: light sensor divider (ADC1, 10-bit)
//! - PC13: override button to ground, internal pull-up
//! - PB4: motor enable, PB5: motor power relay
//! - PA6: lock servo signal (TIM3 CH1, 50 Hz)
//! - PA5: piezo buzzer (TIM2 CH1)
//! - PB6/PB7/PB8: green/amber/red status LEDs

use core::time::Duration;

use door_core::controller::SensorInputs;
use door_core::manual::ButtonLevel;
use door_core::sequencer::{ActuatorDriver, IndicatorMode, StatusIndicator};
use embassy_stm32::adc::{Adc, AnyAdcChannel, Resolution, SampleTime};
use embassy_stm32::gpio::{Input, Output};
use embassy_stm32::peripherals::{ADC1, TIM2, TIM3};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;

use crate::config::{ADC_MAX_RAW, SERVO_FRAME_HZ, servo_duty};
use crate::instant::to_embassy;

/// Light sensor and override button.
pub struct BoardInputs<'d> {
    adc: Adc<'d, ADC1>,
    light: AnyAdcChannel<ADC1>,
    button: Input<'d>,
}

impl<'d> BoardInputs<'d> {
    pub fn new(mut adc: Adc<'d, ADC1>, light: AnyAdcChannel<ADC1>, button: Input<'d>) -> Self {
        adc.set_resolution(Resolution::BITS10);
        adc.set_sample_time(SampleTime::CYCLES160_5);
        Self { adc, light, button }
    }
}

impl SensorInputs for BoardInputs<'_> {
    fn read_light_raw(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.light).min(ADC_MAX_RAW)
    }

    fn button_level(&mut self) -> ButtonLevel {
        if self.button.is_low() {
            ButtonLevel::Low
        } else {
            ButtonLevel::High
        }
    }
}

/// Motor, relay, lock servo and buzzer outputs.
pub struct BoardActuators<'d> {
    motor: Output<'d>,
    relay: Output<'d>,
    servo: SimplePwm<'d, TIM3>,
    buzzer: SimplePwm<'d, TIM2>,
}

impl<'d> BoardActuators<'d> {
    pub fn new(
        motor: Output<'d>,
        relay: Output<'d>,
        mut servo: SimplePwm<'d, TIM3>,
        buzzer: SimplePwm<'d, TIM2>,
    ) -> Self {
        servo.set_frequency(Hertz(SERVO_FRAME_HZ));
        servo.ch1().disable();
        Self {
            motor,
            relay,
            servo,
            buzzer,
        }
    }
}

impl ActuatorDriver for BoardActuators<'_> {
    fn set_motor(&mut self, energized: bool) {
        if energized {
            self.motor.set_high();
        } else {
            self.motor.set_low();
        }
    }

    fn set_relay(&mut self, energized: bool) {
        if energized {
            self.relay.set_high();
        } else {
            self.relay.set_low();
        }
    }

    fn attach_lock(&mut self) {
        self.servo.ch1().enable();
    }

    fn move_lock(&mut self, position: u8) {
        let mut channel = self.servo.ch1();
        let duty = servo_duty(position, channel.max_duty_cycle());
        channel.set_duty_cycle(duty);
    }

    fn detach_lock(&mut self) {
        self.servo.ch1().disable();
    }

    fn tone(&mut self, frequency_hz: u32, duration: Duration) {
        self.buzzer.set_frequency(Hertz(frequency_hz));
        let mut channel = self.buzzer.ch1();
        channel.set_duty_cycle_fraction(1, 2);
        channel.enable();
        embassy_time::block_for(to_embassy(duration));
        channel.disable();
    }

    fn block_for(&mut self, duration: Duration) {
        embassy_time::block_for(to_embassy(duration));
    }
}

/// Three-LED status display; exactly one LED is lit at a time.
pub struct BoardIndicator<'d> {
    normal: Output<'d>,
    pending: Output<'d>,
    actuating: Output<'d>,
}

impl<'d> BoardIndicator<'d> {
    pub fn new(normal: Output<'d>, pending: Output<'d>, actuating: Output<'d>) -> Self {
        Self {
            normal,
            pending,
            actuating,
        }
    }
}

impl StatusIndicator for BoardIndicator<'_> {
    fn show(&mut self, mode: IndicatorMode) {
        self.normal.set_low();
        self.pending.set_low();
        self.actuating.set_low();
        match mode {
            IndicatorMode::Normal => self.normal.set_high(),
            IndicatorMode::PendingTransition => self.pending.set_high(),
            IndicatorMode::Actuating => self.actuating.set_high(),
        }
    }
}
