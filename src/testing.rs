//! Pin doubles for long-running tests where a scripted mock would need
//! thousands of expectations.

use core::convert::Infallible;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, OutputPin};

/// Records every level written to it, `true` for high.
#[derive(Debug, Default)]
pub(crate) struct RecordingPin {
    levels: Vec<bool>,
}

impl RecordingPin {
    pub(crate) fn levels(&self) -> &[bool] {
        &self.levels
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
    }

    /// Number of high/low changes seen so far.
    pub(crate) fn edges(&self) -> usize {
        self.levels.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
