//! Timer and tick-loop utilities for the tag.
//!
//! A passive tag is clocked by the reader's carrier, so every period below is
//! counted in carrier cycles. One timer tick sends one Manchester half-symbol;
//! two ticks send one logical bit.
//!
//! The scheduler can be driven in two ways: an interrupt service routine using
//! `critical_section::with` (`timer-isr` feature), or a busy-loop delay
//! (`delay-loop` feature).
//!
//! Contains helpers for polling- and ISR-based scheduling, including:
//! - `compare_value`: compile-time compare register calculator
//! - `compute_compare_value`: runtime calculator from a tick length in µs
//! - `run_tick_loop` / `run_ticks`: blocking driver loops for `DelayNs`
//! (feature `delay-loop`)
//! - `global_scheduler_tick` and `tick_tag_scheduler!()`: interrupt-based tick
//! callback wrapper (feature `timer-isr`)
//!
//! Common rates at a 125 kHz carrier:
//!
//! | Quantity           | Carrier cycles | Duration   |
//! |--------------------|----------------|------------|
//! | Half-symbol (tick) |             32 |   256 µs   |
//! | Logical bit        |             64 |   512 µs   |
//! | Frame (64 bits)    |          4 096 | 32.768 ms  |
//! | 24 repeats         |         98 304 | 786.432 ms |

use libm::roundf;

use crate::consts::{CYCLES_PER_BIT, FRAME_BITS, TICK_CYCLES};
use crate::error::ConfigError;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Nominal EM41xx carrier frequency.
pub const CARRIER_HZ: u32 = 125_000;

/// Cycles the tick handler may use, leaving the rest of the tick to the main
/// loop.
pub const TICK_BUDGET_CYCLES: u16 = 20;

const _: () = assert!(TICK_BUDGET_CYCLES < TICK_CYCLES);

/// Compile-time compare register calculator for a timer in CTC mode.
///
/// # Arguments
/// - `tick_cycles`: desired tick length in clock cycles (e.g., 32)
/// - `prescaler`: timer prescaler (e.g., 1, 8, 64)
///
/// # Returns
/// - The value for OCRnA, so that the timer fires every `tick_cycles` cycles
/// - [`ConfigError::CompareOutOfRange`] if it does not fit in 8 bits
pub const fn compare_value(tick_cycles: u32, prescaler: u32) -> Result<u8, ConfigError> {
    let counts = tick_cycles / prescaler;
    if counts == 0 || counts > 256 {
        return Err(ConfigError::CompareOutOfRange { cycles: counts });
    }
    Ok((counts - 1) as u8)
}

/// Computes the compare register value for a tick length given in µs.
///
/// # Arguments
/// - `f_clk`: timer clock in Hz (the carrier, for a self-clocked tag)
/// - `prescaler`: timer prescaler
/// - `tick_us`: desired tick interval in microseconds (e.g., 256.0)
///
/// # Returns
/// - The value for OCRnA (rounded to the nearest count)
/// - [`ConfigError::CompareOutOfRange`] if it does not fit in 8 bits
pub fn compute_compare_value(f_clk: u32, prescaler: u32, tick_us: f32) -> Result<u8, ConfigError> {
    let counts_per_second = f_clk as f32 / prescaler as f32;
    let counts = roundf(counts_per_second * (tick_us / 1_000_000.0)) as u32;
    compare_value(counts, 1)
}

/// Half-symbols per second for a given carrier.
pub fn symbol_rate_hz(f_clk: u32) -> f32 {
    f_clk as f32 / f32::from(TICK_CYCLES)
}

/// Logical bits per second for a given carrier.
pub fn bit_rate_hz(f_clk: u32) -> f32 {
    f_clk as f32 / f32::from(CYCLES_PER_BIT)
}

/// Time to send one full frame, in µs.
pub fn frame_period_us(f_clk: u32) -> f32 {
    FRAME_BITS as f32 * 1_000_000.0 / bit_rate_hz(f_clk)
}

/// Cycles left in the tick budget after a measured handler run.
///
/// Returns `None` if the handler overran [`TICK_BUDGET_CYCLES`]; on air that
/// shows up as corrupted symbols, never as an error.
pub fn tick_headroom(measured_cycles: u16) -> Option<u16> {
    TICK_BUDGET_CYCLES.checked_sub(measured_cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DEFAULT_REPEAT_QUOTA, TIMER_COMPARE};

    #[test]
    fn test_reference_compare_value() {
        assert_eq!(compare_value(u32::from(TICK_CYCLES), 1), Ok(TIMER_COMPARE));
        assert_eq!(compare_value(256, 1), Ok(255));
        assert_eq!(
            compare_value(257, 1),
            Err(ConfigError::CompareOutOfRange { cycles: 257 })
        );
        assert_eq!(
            compare_value(4, 8),
            Err(ConfigError::CompareOutOfRange { cycles: 0 })
        );
    }

    #[test]
    fn test_compute_compare_value() {
        // 256 µs at 125 kHz = 32 counts
        assert_eq!(compute_compare_value(CARRIER_HZ, 1, 256.0), Ok(31));
        // 256 µs at 16 MHz / 64 = 64 counts
        assert_eq!(compute_compare_value(16_000_000, 64, 256.0), Ok(63));
    }

    #[test]
    fn test_rates() {
        assert_eq!(symbol_rate_hz(CARRIER_HZ), 3_906.25);
        assert_eq!(bit_rate_hz(CARRIER_HZ), 1_953.125);
        let frame = frame_period_us(CARRIER_HZ);
        assert!((frame - 32_768.0).abs() < 0.5);
        let per_id = frame * f32::from(DEFAULT_REPEAT_QUOTA);
        assert!((per_id - 786_432.0).abs() < 10.0);
    }

    #[test]
    fn test_tick_headroom() {
        assert_eq!(tick_headroom(12), Some(8));
        assert_eq!(tick_headroom(TICK_BUDGET_CYCLES), Some(0));
        assert_eq!(tick_headroom(TICK_BUDGET_CYCLES + 1), None);
    }
}
