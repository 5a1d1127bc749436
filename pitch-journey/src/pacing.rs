//! Wall-clock playback of scripted delays.
//!
//! The controller only understands virtual time. Hosts that want the
//! presentation to breathe in real time sleep until each task is due and
//! feed the elapsed time back through [`JourneyController::advance_clock`].

use std::time::Duration;

use crate::journey::JourneyController;
use crate::surfaces::{ChatSurface, MapSurface, PanelSurface};

/// Play pending tasks in real time for up to `budget_ms` milliseconds.
/// Returns how many tasks fired.
pub async fn play_for<M, C, P>(controller: &mut JourneyController<M, C, P>, budget_ms: u64) -> usize
where
    M: MapSurface,
    C: ChatSurface,
    P: PanelSurface,
{
    let mut remaining = budget_ms;
    let mut fired = 0;
    while let Some(wait) = controller.next_due_in() {
        if wait > remaining {
            break;
        }
        tokio::time::sleep(Duration::from_millis(wait)).await;
        fired += controller.advance_clock(wait);
        remaining -= wait;
    }
    if remaining > 0 {
        tokio::time::sleep(Duration::from_millis(remaining)).await;
        fired += controller.advance_clock(remaining);
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JourneyConfig;
    use crate::dataset::Dataset;
    use crate::headless::headless_controller;
    use crate::journey::{Journey, Step};

    #[tokio::test(start_paused = true)]
    async fn sleeps_through_the_b1_pause() {
        let mut ctl =
            headless_controller(Dataset::bundled().unwrap(), JourneyConfig::default()).unwrap();
        ctl.begin(Journey::B);
        let fired = play_for(&mut ctl, 2_500).await;
        assert_eq!(fired, 1);
        assert_eq!(ctl.session().step(), Some(Step::B4));
        assert_eq!(ctl.scheduler().now_ms(), 2_500);
    }
}
