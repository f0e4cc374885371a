//! Start-up configuration for the tag.

use crate::consts::DEFAULT_REPEAT_QUOTA;
use crate::error::ConfigError;

/// Settings shared by the [`SymbolScheduler`](crate::scheduler::SymbolScheduler)
/// and the [`FrameController`](crate::controller::FrameController).
///
/// ## Example
///
/// ```rust
/// use em41xx_emu::config::TagConfig;
///
/// let config = TagConfig {
///     repeat_quota: 8,
///     ..TagConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TagConfig {
    /// Number of full frames sent for an identifier before moving on.
    pub repeat_quota: u8,
    /// Drive the coil pin low for [`Drive::Active`](crate::encoding::Drive::Active).
    pub coil_inverted: bool,
    /// The liveness LED is lit while its pin is low.
    pub led_inverted: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            repeat_quota: DEFAULT_REPEAT_QUOTA,
            coil_inverted: false,
            led_inverted: false,
        }
    }
}

impl TagConfig {
    /// Checks the settings before they are handed to the controller.
    ///
    /// # Errors
    /// [`ConfigError::ZeroRepeatQuota`] if `repeat_quota` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_quota == 0 {
            return Err(ConfigError::ZeroRepeatQuota);
        }
        Ok(())
    }
}
