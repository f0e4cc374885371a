use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::controller::FrameController;
use crate::scheduler::{SharedScheduler, SymbolScheduler};

/// Runs a fixed number of ticks on the provided scheduler, sleeping between them.
///
/// # Arguments
/// - `scheduler`: A mutable reference to a `SymbolScheduler` instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_ns`: The delay between each tick call, in nanoseconds (e.g. 256_000 at 125 kHz).
/// - `ticks`: Number of ticks to run.
///
/// # Notes
/// - The time spent in `tick()` adds to every period, so the symbol rate is only
///   approximate. Real readers tolerate a few percent at best.
pub fn run_ticks<D: DelayNs, COIL: OutputPin>(
    scheduler: &mut SymbolScheduler<COIL>,
    delay: &mut D,
    tick_ns: u32,
    ticks: usize,
) {
    for _ in 0..ticks {
        scheduler.tick();
        delay.delay_ns(tick_ns);
    }
}

/// Runs a blocking loop that ticks the shared scheduler and services the
/// frame controller in between.
///
/// This is a simple timing loop for use in environments where a timer
/// interrupt is unavailable or undesired.
///
/// # Arguments
/// - `shared`: The scheduler cell also handed to the controller.
/// - `controller`: The frame controller rotating the identifiers.
/// - `delay`: A delay provider implementing `DelayNs`.
/// - `tick_ns`: The delay between each tick call, in nanoseconds.
///
/// # Example
/// ```rust,ignore
/// use em41xx_emu::timer::run_tick_loop;
/// run_tick_loop(&TAG_SCHEDULER, &mut controller, &mut delay, 256_000);
/// ```
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose polling firmware.
/// - Regeneration runs between two ticks and stretches that tick; prefer the
///   interrupt-driven scheduler on real hardware.
pub fn run_tick_loop<D: DelayNs, COIL: OutputPin, LED: OutputPin, const N: usize>(
    shared: &SharedScheduler<COIL>,
    controller: &mut FrameController<LED, N>,
    delay: &mut D,
    tick_ns: u32,
) -> ! {
    let _ = controller.start(shared);
    loop {
        critical_section::with(|cs| {
            if let Some(scheduler) = shared.borrow(cs).borrow_mut().as_mut() {
                scheduler.tick();
            }
        });
        let _ = controller.poll(shared);
        delay.delay_ns(tick_ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SYMBOLS_PER_FRAME;
    use crate::registry::Identifier;
    use crate::testing::RecordingPin;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_run_ticks_sends_whole_frames() {
        let mut scheduler = SymbolScheduler::new(RecordingPin::default(), None);
        scheduler
            .buffer_mut()
            .encode(&Identifier::new([0x11; 5]));
        scheduler.restart();
        let mut delay = NoopDelay::new();

        run_ticks(&mut scheduler, &mut delay, 256_000, SYMBOLS_PER_FRAME * 2);

        assert_eq!(scheduler.take_passes(), 2);
        assert_eq!(scheduler.coil.levels().len(), 1 + SYMBOLS_PER_FRAME * 2);
    }
}
