use evdev::{AbsoluteAxisCode, FFStatusCode, KeyCode};

use crate::transport::{EventClass, RawEvent};

use super::state::DeviceState;

const ABS_X: u16 = AbsoluteAxisCode::ABS_X.0;
const ABS_Z: u16 = AbsoluteAxisCode::ABS_Z.0;
const ABS_RX: u16 = AbsoluteAxisCode::ABS_RX.0;
const ABS_RZ: u16 = AbsoluteAxisCode::ABS_RZ.0;
const ABS_THROTTLE: u16 = AbsoluteAxisCode::ABS_THROTTLE.0;
const ABS_GAS: u16 = AbsoluteAxisCode::ABS_GAS.0;
const ABS_HAT0X: u16 = AbsoluteAxisCode::ABS_HAT0X.0;
const ABS_HAT3Y: u16 = AbsoluteAxisCode::ABS_HAT3Y.0;

/// First and one-past-last key codes of the joystick button block.
const BTN_FIRST: u16 = KeyCode::BTN_TRIGGER.0;
const BTN_END: u16 = KeyCode::BTN_DEAD.0;

const FF_STATUS_STOPPED: i32 = FFStatusCode::FF_STATUS_STOPPED.0 as i32;

/// Host-side receiver for events the translator does not fold into
/// [DeviceState].
pub trait EventSink {
    /// A joystick button changed state. `index` is zero-based within
    /// the joystick button block.
    fn button_event(&mut self, index: u16, value: i32);

    /// The device reported an effect starting or stopping.
    fn status_event(&mut self, effect_id: i16, playing: bool);

    /// Reserved hook for forwarding aggregated axis/slider/POV state
    /// once per tick.
    fn axis_dispatch(&mut self, _state: &DeviceState) {}
}

/// Reclassifies the flat raw event stream into semantic state updates
/// and sink notifications. Pure reclassification: no event is dropped
/// based on its value.
#[derive(Debug, Default)]
pub struct EventTranslator {
    state: DeviceState,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn handle(&mut self, event: &RawEvent, sink: &mut dyn EventSink) {
        match event.class {
            EventClass::Absolute => self.handle_abs(event.code, event.value),
            EventClass::Key => {
                if (BTN_FIRST..BTN_END).contains(&event.code) {
                    sink.button_event(event.code - BTN_FIRST, event.value);
                }
            }
            EventClass::FfStatus => {
                sink.status_event(event.code as i16, event.value != FF_STATUS_STOPPED)
            }
            EventClass::Other => (),
        }
    }

    fn handle_abs(&mut self, code: u16, value: i32) {
        match code {
            ABS_X..=ABS_Z => self.state.position[(code - ABS_X) as usize] = value,
            ABS_RX..=ABS_RZ => self.state.rotation[(code - ABS_RX) as usize] = value,
            ABS_THROTTLE..=ABS_GAS => self.state.sliders[(code - ABS_THROTTLE) as usize] = value,
            // Hat codes interleave horizontal and vertical per hat
            ABS_HAT0X..=ABS_HAT3Y => {
                let offset = (code - ABS_HAT0X) as usize;
                self.state.hats[offset / 2][offset % 2] = value;
            }
            _ => (),
        }
    }
}
