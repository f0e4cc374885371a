//! Real-time symbol scheduler for the tag's modulation output.
//!
//! This module provides the [`SymbolScheduler`] struct, which clocks the
//! contents of a [`SymbolBuffer`] out to the coil pin one half-symbol per
//! timer tick.
//!
//! The scheduler is a two-state machine per logical bit:
//!
//! - **load** (even cursor): the drive cell is loaded from `buffer[cursor / 2]`
//! - **invert** (odd cursor): the drive cell is flipped, giving the second half
//!   of the Manchester pair without touching the buffer
//!
//! The coil is written with the drive cell *before* any state is computed, so
//! the output edge follows the timer edge with a constant delay. The value
//! driven on tick `N + 1` is always prepared on tick `N`.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use em41xx_emu::scheduler::SymbolScheduler;
//!
//! # let coil = Pin::new(&[
//! #     PinTransaction::set(PinState::Low),
//! #     PinTransaction::set(PinState::Low),
//! # ]);
//! let mut scheduler = SymbolScheduler::new(coil, None);
//!
//! loop {
//!     scheduler.tick(); // Called every 32 carrier cycles by a timer interrupt
//!     # break;
//! }
//! # scheduler.coil.done();
//! ```
//!
//! ## Timing
//!
//! [`tick()`](SymbolScheduler::tick) has no loops and no logging and performs
//! exactly one pin write. On an 8-bit AVR clocked from the 125 kHz carrier the
//! tick period is only 32 cycles, so the handler has to stay well inside
//! [`TICK_BUDGET_CYCLES`](crate::timer::TICK_BUDGET_CYCLES). The compiler gives
//! no cycle guarantees; measure it on the target.
//!
//! For the shared-state discipline between the interrupt and the main loop,
//! see [`crate::controller`].

use core::cell::RefCell;
use core::mem;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

use crate::config::TagConfig;
use crate::consts::SYMBOLS_PER_FRAME_U8;
use crate::encoding::{Drive, SymbolBuffer};

/// A scheduler shared between the timer interrupt and the main loop.
///
/// `None` until the scheduler has been installed. Every access goes through
/// `critical_section::with`.
pub type SharedScheduler<COIL> = Mutex<RefCell<Option<SymbolScheduler<COIL>>>>;

/// Clocks a [`SymbolBuffer`] out to the coil pin.
///
/// ## Type Parameters
///
/// - `COIL`: A type implementing [`embedded_hal::digital::OutputPin`] that
///   loads the antenna coil. Boards modulating through several lines at once
///   can implement `OutputPin` for the whole group.
///
/// ## Notes
///
/// - Only one scheduler should be driven from the timer interrupt.
/// - The buffer is only written by the
///   [`FrameController`](crate::controller::FrameController), inside a critical
///   section.
#[derive(Debug)]
pub struct SymbolScheduler<COIL>
where
    COIL: OutputPin,
{
    /// Coil pin
    pub coil: COIL,
    buffer: SymbolBuffer,

    /// Half-symbol position within the frame, `0..SYMBOLS_PER_FRAME`.
    cursor: u8,

    /// Level driven on the next tick.
    drive: Drive,

    /// Frames fully sent since the controller last took the count.
    passes: u8,
    coil_inverted: bool,
}

impl<COIL> SymbolScheduler<COIL>
where
    COIL: OutputPin,
{
    /// Creates a new `SymbolScheduler` holding an empty frame.
    ///
    /// # Arguments
    /// - `coil`: The output pin that loads the antenna coil.
    /// - `coil_inverted`: Whether the coil is loaded while the pin is low.
    ///
    /// # Notes
    /// The coil is released initially.
    pub fn new(coil: COIL, coil_inverted: Option<bool>) -> Self {
        let buffer = SymbolBuffer::new();
        let mut cls = Self {
            coil,
            drive: buffer.first_half(0),
            buffer,
            cursor: 0,
            passes: 0,
            coil_inverted: coil_inverted.unwrap_or(false),
        };
        cls.write_coil(Drive::Inactive);
        cls
    }

    /// Creates a new `SymbolScheduler` with the coil polarity from `config`.
    pub fn from_config(coil: COIL, config: &TagConfig) -> Self {
        Self::new(coil, Some(config.coil_inverted))
    }

    #[inline(always)]
    fn write_coil(&mut self, drive: Drive) {
        if drive.is_active() != self.coil_inverted {
            let _ = self.coil.set_high();
        } else {
            let _ = self.coil.set_low();
        }
    }

    /// Advances the output by one half-symbol.
    ///
    /// Must be called at a fixed period, [`TICK_CYCLES`](crate::consts::TICK_CYCLES)
    /// carrier cycles apart.
    #[inline]
    pub fn tick(&mut self) {
        self.write_coil(self.drive);

        self.cursor += 1;
        if self.cursor >= SYMBOLS_PER_FRAME_U8 {
            self.cursor = 0;
            self.passes = self.passes.saturating_add(1);
        }

        if self.cursor & 1 == 1 {
            self.drive = self.drive.inverted();
        } else {
            self.drive = self.buffer.first_half(usize::from(self.cursor >> 1));
        }
    }

    /// Rewinds to the start of the frame.
    ///
    /// The next tick drives the first half-symbol of the header.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.drive = self.buffer.first_half(0);
    }

    /// Current half-symbol position within the frame.
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// The level that will be driven on the next tick.
    pub fn drive(&self) -> Drive {
        self.drive
    }

    /// Frames completed since the last call to [`take_passes`](Self::take_passes).
    pub fn passes(&self) -> u8 {
        self.passes
    }

    /// Returns and clears the completed-frame count.
    pub fn take_passes(&mut self) -> u8 {
        mem::take(&mut self.passes)
    }

    /// The frame being sent.
    pub fn buffer(&self) -> &SymbolBuffer {
        &self.buffer
    }

    /// Mutable access to the frame being sent.
    ///
    /// Only call this with the timer interrupt masked, otherwise the tick may
    /// send a half-written frame.
    pub fn buffer_mut(&mut self) -> &mut SymbolBuffer {
        &mut self.buffer
    }
}
