/// Declares a static global `TAG_SCHEDULER` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `TAG_SCHEDULER` suitable for use in
/// interrupt-based environments, where both the main loop and an ISR need
/// to safely access the shared scheduler state.
///
/// # Arguments
/// - `$coil`: The concrete type of the coil pin (must implement `OutputPin`)
///
/// # Example
/// ```rust,ignore
/// init_tag_scheduler!(MyCoilPinType);
/// ```
#[macro_export]
macro_rules! init_tag_scheduler {
    ( $coil:ty ) => {
        pub static TAG_SCHEDULER: $crate::scheduler::SharedScheduler<$coil> =
            $crate::critical_section::Mutex::new(::core::cell::RefCell::new(None));
    };
}

/// Installs a new scheduler in the global `TAG_SCHEDULER`.
///
/// # Arguments
/// - `$coil`: The coil pin (must implement `OutputPin`)
/// - `$coil_inverted`: `Option<bool>`, whether the coil is loaded while the pin is low
///
/// # Example
/// ```rust,ignore
/// fn main() -> ! {
///     setup_tag_scheduler!(coil, None);
/// }
/// ```
///
/// # Notes
/// - Requires `init_tag_scheduler!` to have been used earlier.
/// - Call before the timer interrupt is enabled.
#[macro_export]
macro_rules! setup_tag_scheduler {
    ( $coil:expr, $coil_inverted:expr ) => {
        $crate::timer::global_scheduler_setup(&TAG_SCHEDULER, $coil, $coil_inverted)
    };
}

/// Calls `tick()` on the global `TAG_SCHEDULER` if it has been initialized.
///
/// This macro is intended to be invoked from the timer compare ISR, once every
/// [`TICK_CYCLES`](crate::consts::TICK_CYCLES) carrier cycles.
///
/// # Example
/// ```rust,ignore
/// #[avr_device::interrupt(attiny85)]
/// fn TIMER0_COMPA() {
///     tick_tag_scheduler!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `TAG_SCHEDULER` was declared with `init_tag_scheduler!`
///   and initialized via `setup_tag_scheduler!`.
/// - Safe to call repeatedly; will silently do nothing if the scheduler hasn't been set up yet.
#[macro_export]
macro_rules! tick_tag_scheduler {
    () => {
        $crate::timer::global_scheduler_tick(&TAG_SCHEDULER)
    };
}

#[cfg(test)]
mod tests {
    use crate::consts::SYMBOLS_PER_FRAME;
    use crate::testing::RecordingPin;

    crate::init_tag_scheduler!(RecordingPin);

    #[test]
    fn test_macros_drive_global_scheduler() {
        crate::setup_tag_scheduler!(RecordingPin::default(), Some(true));
        for _ in 0..(SYMBOLS_PER_FRAME * 2) {
            crate::tick_tag_scheduler!();
        }
        critical_section::with(|cs| {
            let cell = TAG_SCHEDULER.borrow(cs).borrow();
            assert_eq!(cell.as_ref().map(|s| s.passes()), Some(2));
        });
    }
}
