use std::collections::HashMap;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

use evdev::{Device, EventType, FFEffect, FFEffectCode, FFEffectData, InputEvent};
use nix::fcntl::{FcntlArg, OFlag};

use super::{EventClass, RawEvent, Transport, TransportError};

/// [Transport] implementation over the input event subsystem.
///
/// Uploaded effects are owned here keyed by their device-assigned id;
/// removing one from the map releases it on the device.
pub struct EvdevTransport {
    device: Device,
    effects: HashMap<i16, FFEffect>,
}

impl EvdevTransport {
    /// Open the event device at the given path for non-blocking reads.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TransportError> {
        let path = path.as_ref();
        log::debug!("Opening device at: {}", path.display());
        let device = Device::open(path)?;

        // Set the device to do non-blocking reads
        let raw_fd = device.as_raw_fd();
        nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))
            .map_err(|err| io::Error::from_raw_os_error(err as i32))?;

        Ok(Self {
            device,
            effects: HashMap::new(),
        })
    }
}

impl Transport for EvdevTransport {
    fn supports_force_feedback(&self) -> bool {
        self.device
            .supported_ff()
            .map(|ff| ff.iter().count() > 0)
            .unwrap_or(false)
    }

    fn disable_autocenter(&mut self) -> Result<(), TransportError> {
        let event = InputEvent::new(EventType::FORCEFEEDBACK.0, FFEffectCode::FF_AUTOCENTER.0, 0);
        self.device.send_events(&[event])?;
        Ok(())
    }

    fn upload_effect(&mut self, data: FFEffectData) -> Result<i16, TransportError> {
        log::trace!("Uploading FF effect data");
        match self.device.upload_ff_effect(data) {
            Ok(effect) => {
                let id = effect.id() as i16;
                self.effects.insert(id, effect);
                Ok(id)
            }
            Err(e) => Err(TransportError::Device(e.to_string())),
        }
    }

    fn update_effect(&mut self, id: i16, data: FFEffectData) -> Result<(), TransportError> {
        let Some(effect) = self.effects.get_mut(&id) else {
            return Err(TransportError::UnknownDescriptor(id));
        };
        effect
            .update(data)
            .map_err(|e| TransportError::Device(e.to_string()))
    }

    fn play_effect(&mut self, id: i16) -> Result<(), TransportError> {
        let Some(effect) = self.effects.get_mut(&id) else {
            return Err(TransportError::UnknownDescriptor(id));
        };
        effect
            .play(1)
            .map_err(|e| TransportError::Device(e.to_string()))
    }

    fn stop_effect(&mut self, id: i16) -> Result<(), TransportError> {
        let Some(effect) = self.effects.get_mut(&id) else {
            return Err(TransportError::UnknownDescriptor(id));
        };
        effect
            .stop()
            .map_err(|e| TransportError::Device(e.to_string()))
    }

    fn erase_effect(&mut self, id: i16) -> Result<(), TransportError> {
        log::trace!("Erasing FF effect {id}");
        self.effects.remove(&id);
        Ok(())
    }

    fn poll(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        let events = match self.device.fetch_events() {
            Ok(events) => events,
            Err(err) => match err.kind() {
                // Do nothing if this would block
                io::ErrorKind::WouldBlock => return Ok(Vec::new()),
                _ => return Err(TransportError::Io(err)),
            },
        };
        Ok(events.take(max).map(raw_event).collect())
    }
}

fn raw_event(event: InputEvent) -> RawEvent {
    let class = match event.event_type() {
        EventType::ABSOLUTE => EventClass::Absolute,
        EventType::KEY => EventClass::Key,
        EventType::FORCEFEEDBACKSTATUS => EventClass::FfStatus,
        _ => EventClass::Other,
    };
    RawEvent::new(class, event.code(), event.value())
}
