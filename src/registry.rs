//! Identifier registry.
//!
//! Holds the ordered list of identifiers the tag cycles through and the
//! cursor selecting the active one. The list is fixed once built: identifiers
//! are only ever incremented in place, and the cursor wraps back to the first
//! slot after the last.
//!
//! ## Increment rule
//!
//! An [`Identifier`] is a 40-bit big-endian number. [`Identifier::increment`]
//! adds one starting from the last byte and carries toward the first, stopping
//! at the first byte that did not overflow. `FF FF FF FF FF` wraps to
//! `00 00 00 00 00`; the carry never spills into a neighbouring identifier.

use core::fmt;

use heapless::Vec;

use crate::consts::{DEFAULT_ID_CAPACITY, ID_LEN};
use crate::error::ConfigError;
use crate::parity::checksum;

/// A 40-bit EM41xx identifier, most significant byte first.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Identifier([u8; ID_LEN]);

impl Identifier {
    /// Largest value representable in 40 bits.
    pub const MAX: u64 = 0xFF_FFFF_FFFF;

    /// Creates an identifier from its five bytes, most significant first.
    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates an identifier from the low 40 bits of `value`.
    pub const fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Self([b[3], b[4], b[5], b[6], b[7]])
    }

    /// The identifier as an integer in `0..=Identifier::MAX`.
    pub const fn as_u64(&self) -> u64 {
        let b = self.0;
        u64::from_be_bytes([0, 0, 0, b[0], b[1], b[2], b[3], b[4]])
    }

    /// The raw bytes, most significant first.
    pub const fn bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// XOR of the five bytes.
    pub fn checksum(&self) -> u8 {
        checksum(&self.0)
    }

    /// Adds one with carry from the last byte toward the first.
    ///
    /// Bytes ahead of the first one that did not overflow are left untouched.
    /// Overflow of the first byte wraps silently.
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut().rev() {
            let (next, overflow) = byte.overflowing_add(1);
            *byte = next;
            if !overflow {
                break;
            }
        }
    }
}

impl From<[u8; ID_LEN]> for Identifier {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}")
    }
}

/// An ordered, cyclic list of identifiers with one active slot.
///
/// The capacity `N` is fixed at compile time. The list may be shorter than `N`
/// but never empty, and it is never resized after construction.
///
/// ## Example
///
/// ```rust
/// use em41xx_emu::consts::DEFAULT_ID_LIST;
/// use em41xx_emu::registry::IdRegistry;
///
/// let mut registry: IdRegistry = IdRegistry::new(&DEFAULT_ID_LIST).unwrap();
/// assert_eq!(registry.current(), DEFAULT_ID_LIST[0]);
/// registry.advance_to_next();
/// assert_eq!(registry.current(), DEFAULT_ID_LIST[1]);
/// ```
#[derive(Debug, Clone)]
pub struct IdRegistry<const N: usize = DEFAULT_ID_CAPACITY> {
    ids: Vec<Identifier, N>,
    slot: usize,
}

impl<const N: usize> IdRegistry<N> {
    /// Builds a registry from a seed list, with the first entry active.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyIdList`] if `seeds` is empty
    /// - [`ConfigError::TooManyIdentifiers`] if `seeds` does not fit in `N`
    pub fn new(seeds: &[Identifier]) -> Result<Self, ConfigError> {
        if seeds.is_empty() {
            return Err(ConfigError::EmptyIdList);
        }
        let ids =
            Vec::from_slice(seeds).map_err(|_| ConfigError::TooManyIdentifiers { capacity: N })?;
        Ok(Self { ids, slot: 0 })
    }

    /// The active identifier.
    pub fn current(&self) -> Identifier {
        self.ids[self.slot]
    }

    /// Increments the active identifier in place.
    ///
    /// See [`Identifier::increment`].
    pub fn increment_current(&mut self) {
        self.ids[self.slot].increment();
    }

    /// Moves to the next slot, wrapping to the first after the last.
    pub fn advance_to_next(&mut self) {
        self.slot += 1;
        if self.slot >= self.ids.len() {
            self.slot = 0;
        }
    }

    /// Index of the active slot.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Number of identifiers in the list.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`; a registry cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The identifier stored in `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<Identifier> {
        self.ids.get(slot).copied()
    }

    /// Iterates over the stored identifiers in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_ID_LIST;
    use proptest::prelude::*;

    #[test]
    fn test_increment_simple() {
        let mut id = Identifier::new([0x12, 0x34, 0x56, 0x78, 0x9a]);
        id.increment();
        assert_eq!(id, Identifier::new([0x12, 0x34, 0x56, 0x78, 0x9b]));
    }

    #[test]
    fn test_increment_carries_only_through_overflowed_bytes() {
        let mut id = Identifier::new([0x01, 0x02, 0x03, 0xff, 0xff]);
        id.increment();
        assert_eq!(id, Identifier::new([0x01, 0x02, 0x04, 0x00, 0x00]));
    }

    #[test]
    fn test_increment_all_ff_wraps_to_zero() {
        let mut id = Identifier::new([0xff; ID_LEN]);
        id.increment();
        assert_eq!(id, Identifier::new([0x00; ID_LEN]));
    }

    #[test]
    fn test_u64_conversion() {
        let id = Identifier::new([0x12, 0x34, 0x56, 0x78, 0x9a]);
        assert_eq!(id.as_u64(), 0x12_3456_789a);
        assert_eq!(Identifier::from_u64(0x12_3456_789a), id);
        // bits above 40 are dropped
        assert_eq!(Identifier::from_u64(0xffff_0000_0000_0001).as_u64(), 1);
        assert_eq!(Identifier::from_u64(Identifier::MAX).bytes(), &[0xff; ID_LEN]);
    }

    #[test]
    fn test_display() {
        let id = Identifier::new([0x00, 0x0a, 0xbc, 0xde, 0xf1]);
        assert_eq!(std::format!("{id}"), "00:0A:BC:DE:F1");
    }

    #[test]
    fn test_registry_rejects_empty_list() {
        let res = IdRegistry::<4>::new(&[]);
        assert_eq!(res.unwrap_err(), ConfigError::EmptyIdList);
    }

    #[test]
    fn test_registry_rejects_oversized_list() {
        let res = IdRegistry::<4>::new(&DEFAULT_ID_LIST);
        assert_eq!(
            res.unwrap_err(),
            ConfigError::TooManyIdentifiers { capacity: 4 }
        );
    }

    #[test]
    fn test_registry_cycles() {
        let mut registry: IdRegistry = IdRegistry::new(&DEFAULT_ID_LIST).unwrap();
        assert_eq!(registry.len(), DEFAULT_ID_LIST.len());
        assert!(!registry.is_empty());
        for expected in DEFAULT_ID_LIST.iter().chain(DEFAULT_ID_LIST.iter()) {
            assert_eq!(registry.current(), *expected);
            registry.advance_to_next();
        }
        assert_eq!(registry.slot(), 0);
    }

    #[test]
    fn test_registry_short_list_wraps_at_len() {
        let seeds = [Identifier::from_u64(1), Identifier::from_u64(2)];
        let mut registry = IdRegistry::<8>::new(&seeds).unwrap();
        registry.advance_to_next();
        registry.advance_to_next();
        assert_eq!(registry.slot(), 0);
        assert_eq!(registry.get(2), None);
    }

    #[test]
    fn test_increment_current_touches_only_active_slot() {
        let mut registry: IdRegistry = IdRegistry::new(&DEFAULT_ID_LIST).unwrap();
        registry.advance_to_next();
        registry.increment_current();
        assert_eq!(registry.current(), Identifier::new([0x00; ID_LEN]));
        assert_eq!(registry.get(0), Some(DEFAULT_ID_LIST[0]));
        assert_eq!(registry.get(2), Some(DEFAULT_ID_LIST[2]));
        assert!(
            registry
                .iter()
                .skip(2)
                .zip(DEFAULT_ID_LIST.iter().skip(2))
                .all(|(a, b)| a == b)
        );
    }

    proptest! {
        #[test]
        fn prop_increment_is_add_one_mod_2_40(value in 0..=Identifier::MAX) {
            let mut id = Identifier::from_u64(value);
            id.increment();
            prop_assert_eq!(id.as_u64(), (value + 1) & Identifier::MAX);
        }

        #[test]
        fn prop_increment_leaves_leading_bytes(value in 0..=Identifier::MAX) {
            let before = Identifier::from_u64(value);
            let mut after = before;
            after.increment();
            // bytes ahead of the trailing run of 0xFF (plus one) are untouched
            let trailing_ff = before.bytes().iter().rev().take_while(|&&b| b == 0xff).count();
            let changed = (trailing_ff + 1).min(ID_LEN);
            let keep = ID_LEN - changed;
            prop_assert_eq!(&before.bytes()[..keep], &after.bytes()[..keep]);
        }
    }
}
