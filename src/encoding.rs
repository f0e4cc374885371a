//! EM41xx frame encoding with Manchester half-symbols.
//!
//! This module turns an [`Identifier`] into the [`SymbolBuffer`] read by the
//! [`SymbolScheduler`](crate::scheduler::SymbolScheduler) on every timer tick,
//! and provides a checker that parses a buffer back into an identifier.
//!
//! ## Frame
//!
//! ```text
//! 1 1 1 1 1 1 1 1 1          header
//! D00 D01 D02 D03 P0         customer/version, high nibble
//! D04 D05 D06 D07 P1         customer/version, low nibble
//! ...                        eight more rows for the card number
//! C0  C1  C2  C3  (P)        column parity nibble
//! 0                          stop
//! ```
//!
//! Each row carries its even parity bit. The column nibble equals
//! `high ^ low` of the XOR of the five identifier bytes, which is the same as
//! the per-column parity over all ten rows. Its own parity bit would land on
//! the stop slot and is always replaced by the stop bit.
//!
//! ## Manchester
//!
//! The buffer holds one [`Drive`] per logical bit: the level of the first
//! half-symbol. The scheduler emits the complement for the second half, so
//! the level always changes mid-bit:
//!
//! | Logical bit | First half            | Second half           |
//! |-------------|-----------------------|-----------------------|
//! | `1`         | [`Drive::Inactive`]   | [`Drive::Active`]     |
//! | `0`         | [`Drive::Active`]     | [`Drive::Inactive`]   |
//!
//! Readers recover each bit by comparing the two halves, see [`decode_pair`].

use crate::consts::{COLUMN_INDEX, DATA_ROWS, FRAME_BITS, HEADER_BITS, ID_LEN, ROW_BITS, STOP_INDEX};
use crate::error::FrameError;
use crate::parity::{checksum, column_nibble, nibble_high, nibble_low, nibble_parity};
use crate::registry::Identifier;

/// Output level for one half-symbol.
///
/// `Active` loads the coil (modulation on), `Inactive` releases it. Only these
/// two patterns are ever driven.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Drive {
    /// Coil released.
    #[default]
    Inactive = 0,
    /// Coil loaded.
    Active = 1,
}

impl Drive {
    /// The opposite level.
    #[inline(always)]
    pub const fn inverted(self) -> Self {
        match self {
            Drive::Inactive => Drive::Active,
            Drive::Active => Drive::Inactive,
        }
    }

    /// `true` for [`Drive::Active`].
    #[inline(always)]
    pub const fn is_active(self) -> bool {
        matches!(self, Drive::Active)
    }
}

/// Level of the first half-symbol for a logical bit.
pub const fn first_half(bit: bool) -> Drive {
    if bit { Drive::Inactive } else { Drive::Active }
}

/// Expands a logical bit into its two half-symbols.
pub const fn expand(bit: bool) -> [Drive; 2] {
    let first = first_half(bit);
    [first, first.inverted()]
}

/// Recovers a logical bit from two consecutive half-symbols.
///
/// Returns `None` if the pair carries no transition.
pub fn decode_pair(first: Drive, second: Drive) -> Option<bool> {
    match (first, second) {
        (Drive::Inactive, Drive::Active) => Some(true),
        (Drive::Active, Drive::Inactive) => Some(false),
        _ => None,
    }
}

/// Writes logical bits into a buffer, one entry per bit.
///
/// Writes past the end of the buffer are dropped.
struct FrameWriter<'a> {
    buf: &'a mut [Drive; FRAME_BITS],
    pos: usize,
}

impl<'a> FrameWriter<'a> {
    fn new(buf: &'a mut [Drive; FRAME_BITS]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bit(&mut self, bit: bool) {
        if let Some(slot) = self.buf.get_mut(self.pos) {
            *slot = first_half(bit);
        }
        self.pos += 1;
    }

    /// Writes the four low bits, most significant first, and returns their
    /// parity.
    fn nibble(&mut self, nibble: u8) -> bool {
        for shift in (0..4).rev() {
            self.bit((nibble >> shift) & 1 == 1);
        }
        nibble_parity(nibble)
    }

    fn row(&mut self, nibble: u8) {
        let parity = self.nibble(nibble);
        self.bit(parity);
    }

    fn byte(&mut self, byte: u8) {
        self.row(nibble_high(byte));
        self.row(nibble_low(byte));
    }
}

/// The first half-symbol of every logical bit of one frame.
///
/// Index 0 starts the header. The final entry always holds the stop bit.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SymbolBuffer([Drive; FRAME_BITS]);

impl Default for SymbolBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolBuffer {
    /// A buffer holding only the header and stop bit; the payload is all `1`.
    pub const fn new() -> Self {
        let mut buf = [first_half(true); FRAME_BITS];
        buf[STOP_INDEX] = first_half(false);
        Self(buf)
    }

    /// Creates a buffer already holding the frame for `id`.
    pub fn from_identifier(id: &Identifier) -> Self {
        let mut buf = Self::new();
        buf.encode(id);
        buf
    }

    /// Rewrites the buffer in place with the frame for `id`.
    pub fn encode(&mut self, id: &Identifier) {
        let mut writer = FrameWriter::new(&mut self.0);
        for _ in 0..HEADER_BITS {
            writer.bit(true);
        }

        let mut sum = 0;
        for &byte in id.bytes() {
            sum ^= byte;
            writer.byte(byte);
        }
        writer.row(column_nibble(sum));

        self.0[STOP_INDEX] = first_half(false);
    }

    /// First half-symbol of logical bit `index`.
    ///
    /// # Panics
    /// If `index >= FRAME_BITS`.
    #[inline(always)]
    pub fn first_half(&self, index: usize) -> Drive {
        self.0[index]
    }

    /// Both half-symbols of logical bit `index`.
    pub fn symbols(&self, index: usize) -> Option<[Drive; 2]> {
        let first = *self.0.get(index)?;
        Some([first, first.inverted()])
    }

    /// Logical value of bit `index`.
    pub fn logical_bit(&self, index: usize) -> Option<bool> {
        let [first, second] = self.symbols(index)?;
        decode_pair(first, second)
    }

    /// The raw entries.
    pub fn as_slice(&self) -> &[Drive] {
        &self.0
    }

    /// Number of logical bits, always [`FRAME_BITS`].
    pub const fn len(&self) -> usize {
        FRAME_BITS
    }

    /// Always `false`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    fn bit(&self, index: usize) -> bool {
        self.0[index] == Drive::Inactive
    }

    fn nibble_at(&self, index: usize) -> u8 {
        (index..index + 4).fold(0, |acc, i| (acc << 1) | u8::from(self.bit(i)))
    }

    /// Parses the buffer back into the identifier it carries.
    ///
    /// # Errors
    /// The first check that fails, in frame order: header, row parity,
    /// column nibble, stop bit.
    pub fn decode(&self) -> Result<Identifier, FrameError> {
        if !(0..HEADER_BITS).all(|i| self.bit(i)) {
            return Err(FrameError::Header);
        }

        let mut bytes = [0u8; ID_LEN];
        for row in 0..DATA_ROWS {
            let start = HEADER_BITS + row * ROW_BITS;
            let nibble = self.nibble_at(start);
            if self.bit(start + 4) != nibble_parity(nibble) {
                return Err(FrameError::RowParity { row });
            }
            let shift = if row % 2 == 0 { 4 } else { 0 };
            bytes[row / 2] |= nibble << shift;
        }

        if self.nibble_at(COLUMN_INDEX) != column_nibble(checksum(&bytes)) {
            return Err(FrameError::ColumnParity);
        }
        if self.bit(STOP_INDEX) {
            return Err(FrameError::StopBit);
        }
        Ok(Identifier::new(bytes))
    }
}
