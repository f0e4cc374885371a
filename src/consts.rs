//! Constants used across the EM41xx tag implementation.
//!
//! This module defines the frame layout, timer period, repeat quota and the
//! default identifier seed list.
//!
//! ## Frame layout
//!
//! An EM41xx frame is 64 logical bits long:
//!
//! | Bits    | Content                                            |
//! |---------|----------------------------------------------------|
//! | 0..9    | Header, nine `1` bits                              |
//! | 9..59   | Ten rows of four data bits plus one parity bit     |
//! | 59..63  | Column parity nibble                               |
//! | 63      | Stop bit, always `0`                               |
//!
//! Every logical bit is sent as two Manchester half-symbols, so one pass over
//! the frame takes [`SYMBOLS_PER_FRAME`] timer ticks.

use crate::registry::Identifier;

/// Length (in bytes) of one identifier: one customer/version byte plus a
/// 32-bit card number.
pub const ID_LEN: usize = 5;

/// Number of `1` bits sent at the start of every frame.
pub const HEADER_BITS: usize = 9;

/// Logical bits used per nibble row (four data bits plus one parity bit).
pub const ROW_BITS: usize = 5;

/// Number of nibble rows carrying identifier data.
pub const DATA_ROWS: usize = ID_LEN * 2;

/// Total number of logical bits in one frame.
pub const FRAME_BITS: usize = 64;

/// Index of the stop bit, which is always the final entry of the buffer.
pub const STOP_INDEX: usize = FRAME_BITS - 1;

/// Index of the first bit of the column parity nibble.
pub const COLUMN_INDEX: usize = HEADER_BITS + DATA_ROWS * ROW_BITS;

/// Number of timer ticks needed to send one frame.
///
/// Each logical bit becomes two half-symbols.
pub const SYMBOLS_PER_FRAME: usize = FRAME_BITS * 2;

/// See [`SYMBOLS_PER_FRAME`](crate::consts::SYMBOLS_PER_FRAME)
pub const SYMBOLS_PER_FRAME_U8: u8 = SYMBOLS_PER_FRAME as u8;

// The four column bits must land before the stop slot. Only the column
// parity bit may coincide with it.
const _: () = assert!(COLUMN_INDEX + 4 <= STOP_INDEX);
const _: () = assert!(COLUMN_INDEX + 4 + 1 == FRAME_BITS);
const _: () = assert!(SYMBOLS_PER_FRAME <= u8::MAX as usize);

/// Number of times a frame is repeated before moving to the next identifier.
pub const DEFAULT_REPEAT_QUOTA: u8 = 8 * 3;

/// Timer compare value. The timer counts `0..=TIMER_COMPARE` in CTC mode.
pub const TIMER_COMPARE: u8 = 31;

/// Carrier cycles per half-symbol tick.
pub const TICK_CYCLES: u16 = TIMER_COMPARE as u16 + 1;

/// Carrier cycles per logical bit (RF/64 data rate).
pub const CYCLES_PER_BIT: u16 = TICK_CYCLES * 2;

/// Default number of slots in the identifier registry.
pub const DEFAULT_ID_CAPACITY: usize = 12;

/// Identifiers sent when no other list is supplied.
///
/// The first byte is the customer/version byte, the remaining four bytes are
/// the card number. Each one is incremented after it has been sent.
pub const DEFAULT_ID_LIST: [Identifier; DEFAULT_ID_CAPACITY] = [
    Identifier::new([0x00, 0x00, 0x00, 0x00, 0x00]),
    Identifier::new([0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
    Identifier::new([0x11, 0x11, 0x11, 0x11, 0x11]),
    Identifier::new([0x22, 0x22, 0x22, 0x22, 0x22]),
    Identifier::new([0x33, 0x33, 0x33, 0x33, 0x33]),
    Identifier::new([0x44, 0x44, 0x44, 0x44, 0x44]),
    Identifier::new([0x55, 0x55, 0x55, 0x55, 0x55]),
    Identifier::new([0x66, 0x66, 0x66, 0x66, 0x66]),
    Identifier::new([0x77, 0x77, 0x77, 0x77, 0x77]),
    Identifier::new([0x88, 0x88, 0x88, 0x88, 0x88]),
    Identifier::new([0x99, 0x99, 0x99, 0x99, 0x99]),
    Identifier::new([0x12, 0x34, 0x56, 0x78, 0x9A]),
];
