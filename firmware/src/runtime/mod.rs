use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pull, Speed};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};

use door_core::controller::DoorController;

use crate::board::{BoardActuators, BoardIndicator, BoardInputs};
use crate::config::{DOOR_CONFIG, SERVO_FRAME_HZ};
use crate::instant::FirmwareInstant;
use crate::telemetry;

mod door_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let hal::Peripherals {
        ADC1,
        PA0,
        PA5,
        PA6,
        PB4,
        PB5,
        PB6,
        PB7,
        PB8,
        PC13,
        TIM2,
        TIM3,
        ..
    } = hal::init(hal::Config::default());

    let inputs = BoardInputs::new(
        Adc::new(ADC1),
        PA0.degrade_adc(),
        Input::new(PC13, Pull::Up),
    );

    let servo = SimplePwm::new(
        TIM3,
        Some(PwmPin::new(PA6, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz(SERVO_FRAME_HZ),
        CountingMode::EdgeAlignedUp,
    );
    let buzzer = SimplePwm::new(
        TIM2,
        Some(PwmPin::new(PA5, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz(DOOR_CONFIG.tone.frequency_hz),
        CountingMode::EdgeAlignedUp,
    );
    let actuators = BoardActuators::new(
        Output::new(PB4, Level::Low, Speed::Low),
        Output::new(PB5, Level::Low, Speed::Low),
        servo,
        buzzer,
    );

    let indicator = BoardIndicator::new(
        Output::new(PB6, Level::Low, Speed::Low),
        Output::new(PB7, Level::Low, Speed::Low),
        Output::new(PB8, Level::Low, Speed::Low),
    );

    let controller = match DoorController::boot(
        DOOR_CONFIG,
        inputs,
        actuators,
        indicator,
        FirmwareInstant::now(),
    ) {
        Ok(controller) => controller,
        Err(error) => {
            telemetry::log_config_error(error);
            loop {
                core::future::pending::<()>().await;
            }
        }
    };
    telemetry::log_boot(&controller.status(FirmwareInstant::now()));

    spawner
        .spawn(door_task::run(controller))
        .expect("failed to spawn door task");
}
