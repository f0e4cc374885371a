use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::config::TagConfig;
use crate::scheduler::{SharedScheduler, SymbolScheduler};

/// Used to initialize the global static `SymbolScheduler` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutex-guarded cell
///
/// # Example
/// ```rust,ignore
/// use em41xx_emu::scheduler::SharedScheduler;
/// use em41xx_emu::timer::global_scheduler_init;
/// use some_hal::PB3;
///
/// static TAG_SCHEDULER: SharedScheduler<PB3> = global_scheduler_init::<PB3>();
/// ```
pub const fn global_scheduler_init<COIL: OutputPin>() -> SharedScheduler<COIL> {
    Mutex::new(RefCell::new(None))
}

/// Installs a new `SymbolScheduler` in the global cell.
///
/// # Arguments
/// * The global static `SymbolScheduler` cell
/// * The coil pin
/// * Whether the coil is loaded while the pin is low
///
/// # Example
/// ```rust,ignore
/// fn main() -> ! {
///     global_scheduler_setup(&TAG_SCHEDULER, coil, None);
///     // ...
/// }
/// ```
pub fn global_scheduler_setup<COIL: OutputPin>(
    global_scheduler: &SharedScheduler<COIL>,
    coil: COIL,
    coil_inverted: Option<bool>,
) {
    critical_section::with(|cs| {
        let _ = global_scheduler
            .borrow(cs)
            .replace(Some(SymbolScheduler::new(coil, coil_inverted)));
    });
}

/// Installs a new `SymbolScheduler` in the global cell, taking the coil
/// polarity from `config`.
///
/// # Example
/// ```rust,ignore
/// let config = TagConfig { coil_inverted: true, ..TagConfig::default() };
/// global_scheduler_setup_from_config(&TAG_SCHEDULER, coil, &config);
/// ```
pub fn global_scheduler_setup_from_config<COIL: OutputPin>(
    global_scheduler: &SharedScheduler<COIL>,
    coil: COIL,
    config: &TagConfig,
) {
    critical_section::with(|cs| {
        let _ = global_scheduler
            .borrow(cs)
            .replace(Some(SymbolScheduler::from_config(coil, config)));
    });
}

/// Runs the tick at each interrupt
///
/// Does nothing until [`global_scheduler_setup`] has been called.
///
/// # Arguments
/// * The global static `SymbolScheduler` cell
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(attiny85)]
/// fn TIMER0_COMPA() {
///     global_scheduler_tick(&TAG_SCHEDULER);
/// }
/// ```
#[inline]
pub fn global_scheduler_tick<COIL: OutputPin>(global_scheduler: &SharedScheduler<COIL>) {
    critical_section::with(|cs| {
        if let Some(scheduler) = global_scheduler.borrow(cs).borrow_mut().as_mut() {
            scheduler.tick();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SYMBOLS_PER_FRAME;
    use crate::testing::RecordingPin;

    static SCHEDULER: SharedScheduler<RecordingPin> = global_scheduler_init();

    #[test]
    fn test_global_scheduler_lifecycle() {
        // ticking before setup is a no-op
        global_scheduler_tick(&SCHEDULER);

        global_scheduler_setup(&SCHEDULER, RecordingPin::default(), None);
        for _ in 0..SYMBOLS_PER_FRAME {
            global_scheduler_tick(&SCHEDULER);
        }

        critical_section::with(|cs| {
            let cell = SCHEDULER.borrow(cs).borrow();
            let scheduler = cell.as_ref().unwrap();
            assert_eq!(scheduler.passes(), 1);
            assert_eq!(scheduler.cursor(), 0);
            // the setup write plus one per tick
            assert_eq!(scheduler.coil.levels().len(), SYMBOLS_PER_FRAME + 1);
        });
    }

    static INVERTED: SharedScheduler<RecordingPin> = global_scheduler_init();

    #[test]
    fn test_setup_from_config_inverts_coil() {
        let config = TagConfig {
            coil_inverted: true,
            ..TagConfig::default()
        };
        global_scheduler_setup_from_config(&INVERTED, RecordingPin::default(), &config);
        global_scheduler_tick(&INVERTED);
        global_scheduler_tick(&INVERTED);

        critical_section::with(|cs| {
            let cell = INVERTED.borrow(cs).borrow();
            let scheduler = cell.as_ref().unwrap();
            // released coil is a high pin, then the header's loaded half
            assert_eq!(scheduler.coil.levels(), &[true, true, false]);
        });
    }
}
