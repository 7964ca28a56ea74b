pub mod evdev;
#[cfg(test)]
pub mod mock;

use ::evdev::FFEffectData;
use thiserror::Error;

/// Effect descriptor id used by a transport before the device has
/// assigned one.
pub const UNASSIGNED_EFFECT: i16 = -1;

/// Represents all possible errors returned by a [Transport]
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device rejected request: {0}")]
    Device(String),
    #[error("No effect with descriptor {0} is loaded")]
    UnknownDescriptor(i16),
}

/// Namespace a raw event's code belongs to. Hardware multiplexes many
/// logical controls onto one flat code space per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Absolute axis motion (sticks, pedals, hats)
    Absolute,
    /// Key or button transition
    Key,
    /// Force feedback effect status change
    FfStatus,
    /// Anything else; ignored by the translator
    Other,
}

/// A single raw event record read from the device.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent {
    pub class: EventClass,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(class: EventClass, code: u16, value: i32) -> Self {
        Self { class, code, value }
    }
}

/// Low-level device access used by the session and the effect
/// lifecycle. Implementors own the device handle; dropping the
/// implementor closes it and releases any device-side effects.
pub trait Transport {
    /// Returns true if the device advertises force feedback support.
    fn supports_force_feedback(&self) -> bool;

    /// Switch off the device's built-in auto-centering spring.
    fn disable_autocenter(&mut self) -> Result<(), TransportError>;

    /// Upload a force effect to the device. Returns the descriptor id
    /// assigned by the device.
    fn upload_effect(&mut self, data: FFEffectData) -> Result<i16, TransportError>;

    /// Replace the parameters of an already uploaded effect.
    fn update_effect(&mut self, id: i16, data: FFEffectData) -> Result<(), TransportError>;

    /// Start playback of an uploaded effect.
    fn play_effect(&mut self, id: i16) -> Result<(), TransportError>;

    /// Stop playback of an uploaded effect. Does not release it.
    fn stop_effect(&mut self, id: i16) -> Result<(), TransportError>;

    /// Release an uploaded effect's device-side resources.
    fn erase_effect(&mut self, id: i16) -> Result<(), TransportError>;

    /// Read up to `max` pending raw event records without blocking.
    /// An empty batch means there was nothing to read this tick.
    fn poll(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError>;
}
