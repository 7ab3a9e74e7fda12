use door_core::controller::DoorController;
use embassy_time::Ticker;

use crate::board::{BoardActuators, BoardIndicator, BoardInputs};
use crate::config::TICK_PERIOD;
use crate::instant::{FirmwareInstant, to_embassy};
use crate::telemetry;

pub type BoardController = DoorController<
    FirmwareInstant,
    BoardInputs<'static>,
    BoardActuators<'static>,
    BoardIndicator<'static>,
>;

#[embassy_executor::task]
pub async fn run(mut controller: BoardController) -> ! {
    let mut ticker = Ticker::every(to_embassy(TICK_PERIOD));
    loop {
        ticker.next().await;
        let report = controller.tick(FirmwareInstant::now());
        telemetry::log_tick(&report);
    }
}
