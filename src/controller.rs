//! Frame controller: the cooperative half of the tag.
//!
//! The [`FrameController`] runs in the main loop. It never touches the coil;
//! it watches the [`SymbolScheduler`] for completed frames and decides when
//! to move to the next identifier.
//!
//! ## Shared state
//!
//! The scheduler lives in a [`SharedScheduler`], a
//! `critical_section::Mutex<RefCell<Option<SymbolScheduler<_>>>>` that both the
//! timer interrupt and the main loop borrow:
//!
//! | Context       | Reads                  | Writes                               |
//! |---------------|------------------------|--------------------------------------|
//! | Timer tick    | buffer, cursor, drive  | cursor, drive, pass count, coil pin  |
//! | Controller    | pass count             | buffer, cursor, drive (regeneration) |
//!
//! The controller takes the pass count in one short critical section. When
//! the repeat quota is reached it opens a second critical section and, without
//! releasing it, rewrites the buffer, increments the identifier, advances the
//! registry and rewinds the scheduler. A tick therefore sees either the old
//! frame or the complete new one. While the section is held the coil keeps its
//! last level.
//!
//! On a single-core MCU the `critical-section` implementation masks interrupts;
//! on multi-core targets it must be backed by a real lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use em41xx_emu::config::TagConfig;
//! use em41xx_emu::consts::DEFAULT_ID_LIST;
//! use em41xx_emu::controller::FrameController;
//! use em41xx_emu::registry::IdRegistry;
//! use em41xx_emu::{init_tag_scheduler, setup_tag_scheduler, tick_tag_scheduler};
//!
//! init_tag_scheduler!(CoilPin);
//!
//! #[interrupt]
//! fn TIMER0_COMPA() {
//!     tick_tag_scheduler!();
//! }
//!
//! fn main() -> ! {
//!     setup_tag_scheduler!(coil, None);
//!     let registry = IdRegistry::new(&DEFAULT_ID_LIST).unwrap();
//!     let mut controller = FrameController::new(registry, Some(led), TagConfig::default()).unwrap();
//!     controller.run(&TAG_SCHEDULER)
//! }
//! ```

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use nb::block;

use crate::config::TagConfig;
use crate::consts::DEFAULT_ID_CAPACITY;
use crate::error::ConfigError;
use crate::fmt::{debug, info, trace, warning};
use crate::registry::{IdRegistry, Identifier};
use crate::scheduler::{SharedScheduler, SymbolScheduler};

/// What happened on a successful [`FrameController::poll`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameEvent {
    /// The current frame was sent again; `count` frames sent so far.
    Repeated {
        /// Frames sent for the current identifier.
        count: u8,
    },
    /// The buffer now holds a new identifier.
    Regenerated {
        /// Identifier that is now on air.
        id: Identifier,
        /// Registry slot it was taken from.
        slot: usize,
    },
}

/// Drives identifier rotation and frame regeneration from the main loop.
///
/// ## Type Parameters
///
/// - `LED`: Output pin of the optional liveness LED
/// - `N`: Capacity of the [`IdRegistry`]
#[derive(Debug)]
pub struct FrameController<LED, const N: usize = DEFAULT_ID_CAPACITY>
where
    LED: OutputPin,
{
    /// Identifiers being cycled.
    pub registry: IdRegistry<N>,
    /// Liveness LED, toggled once for every finished frame.
    pub led: Option<LED>,
    repeat_quota: u8,
    repeats: u8,
    led_on: bool,
    led_inverted: bool,

    /// Counter of frames completely sent.
    pub frames_sent: u32,

    /// Counter of buffer regenerations, including the one in [`start`](Self::start).
    pub regenerations: u32,
}

impl<LED, const N: usize> FrameController<LED, N>
where
    LED: OutputPin,
{
    /// Creates a controller for `registry`.
    ///
    /// # Errors
    /// Any error from [`TagConfig::validate`].
    ///
    /// # Notes
    /// The LED is switched off initially.
    pub fn new(
        registry: IdRegistry<N>,
        led: Option<LED>,
        config: TagConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut cls = Self {
            registry,
            led,
            repeat_quota: config.repeat_quota,
            repeats: 0,
            led_on: false,
            led_inverted: config.led_inverted,
            frames_sent: 0,
            regenerations: 0,
        };
        cls.write_led(false);
        Ok(cls)
    }

    fn write_led(&mut self, on: bool) {
        self.led_on = on;
        let state = if self.led_inverted { !on } else { on };
        if let Some(ref mut led) = self.led {
            if state {
                let _ = led.set_high();
            } else {
                let _ = led.set_low();
            }
        }
    }

    fn toggle_led(&mut self) {
        self.write_led(!self.led_on);
    }

    /// Frames sent for the current identifier.
    pub fn repeats(&self) -> u8 {
        self.repeats
    }

    /// Encodes the active identifier, bumps it and moves to the next slot.
    ///
    /// Passes the scheduler finished since the last `take_passes` belong to the
    /// old frame and are dropped. Must run inside the critical section that owns
    /// `scheduler`.
    fn regenerate<COIL: OutputPin>(
        &mut self,
        scheduler: &mut SymbolScheduler<COIL>,
    ) -> FrameEvent {
        let id = self.registry.current();
        let slot = self.registry.slot();

        self.repeats = 0;
        let _ = scheduler.take_passes();
        scheduler.buffer_mut().encode(&id);
        self.registry.increment_current();
        self.registry.advance_to_next();
        scheduler.restart();

        self.regenerations = self.regenerations.wrapping_add(1);
        FrameEvent::Regenerated { id, slot }
    }

    /// Loads the first identifier and rewinds the scheduler.
    ///
    /// Call once before enabling the timer interrupt. Returns `None` if the
    /// scheduler has not been installed yet.
    pub fn start<COIL: OutputPin>(&mut self, shared: &SharedScheduler<COIL>) -> Option<FrameEvent> {
        let event = critical_section::with(|cs| {
            let mut scheduler = shared.borrow(cs).borrow_mut();
            scheduler.as_mut().map(|s| self.regenerate(s))
        });
        match event {
            Some(_) => {
                info!(
                    "tag started, {} identifiers, quota {}",
                    self.registry.len(),
                    self.repeat_quota
                );
                self.write_led(true);
            }
            None => warning!("tag started before the scheduler was installed"),
        }
        event
    }

    /// Checks whether the scheduler finished a frame since the last call.
    ///
    /// # Returns
    /// - `Err(nb::Error::WouldBlock)`: no frame finished yet
    /// - `Ok(FrameEvent::Repeated { .. })`: the frame will be sent again
    /// - `Ok(FrameEvent::Regenerated { .. })`: the quota was reached and the
    ///   next identifier is now on air
    ///
    /// # Notes
    /// Frames that finished while the loop was busy are all counted, but at
    /// most one regeneration happens per call.
    pub fn poll<COIL: OutputPin>(
        &mut self,
        shared: &SharedScheduler<COIL>,
    ) -> nb::Result<FrameEvent, Infallible> {
        let passes = critical_section::with(|cs| {
            shared
                .borrow(cs)
                .borrow_mut()
                .as_mut()
                .map_or(0, |s| s.take_passes())
        });
        if passes == 0 {
            return Err(nb::Error::WouldBlock);
        }

        self.frames_sent = self.frames_sent.wrapping_add(u32::from(passes));
        self.repeats = self.repeats.saturating_add(passes);
        for _ in 0..passes {
            self.toggle_led();
        }

        if self.repeats < self.repeat_quota {
            trace!("frame repeat {}", self.repeats);
            return Ok(FrameEvent::Repeated {
                count: self.repeats,
            });
        }

        let event = critical_section::with(|cs| {
            let mut scheduler = shared.borrow(cs).borrow_mut();
            scheduler.as_mut().map(|s| self.regenerate(s))
        });
        match event {
            Some(event) => {
                if let FrameEvent::Regenerated { id, slot } = event {
                    debug!("sending {} from slot {}", id, slot);
                }
                Ok(event)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }

    /// Starts the tag and services it forever.
    ///
    /// This is the whole main loop of a tag firmware: the timer interrupt
    /// handles the output, this loop only reacts to finished frames.
    pub fn run<COIL: OutputPin>(&mut self, shared: &SharedScheduler<COIL>) -> ! {
        let _ = self.start(shared);
        loop {
            let _ = block!(self.poll(shared));
        }
    }
}
