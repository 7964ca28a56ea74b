use std::collections::{HashMap, VecDeque};

use evdev::FFEffectData;

use super::{RawEvent, Transport, TransportError};

/// What happened on the device, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Autocenter,
    Upload(i16),
    Update(i16),
    Play(i16),
    Stop(i16),
    Erase(i16),
}

/// Scripted in-memory [Transport] for tests.
#[derive(Default)]
pub struct MockTransport {
    pub no_force_feedback: bool,
    pub fail_uploads_after: Option<usize>,
    pub fail_play: bool,
    pub fail_poll: bool,
    pub queued: VecDeque<RawEvent>,
    pub uploaded: HashMap<i16, FFEffectData>,
    pub commands: Vec<Command>,
    next_id: i16,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, events: impl IntoIterator<Item = RawEvent>) {
        self.queued.extend(events);
    }

    /// Descriptor ids currently uploaded, sorted for stable assertions.
    pub fn uploaded_ids(&self) -> Vec<i16> {
        let mut ids: Vec<i16> = self.uploaded.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Transport for MockTransport {
    fn supports_force_feedback(&self) -> bool {
        !self.no_force_feedback
    }

    fn disable_autocenter(&mut self) -> Result<(), TransportError> {
        self.commands.push(Command::Autocenter);
        Ok(())
    }

    fn upload_effect(&mut self, data: FFEffectData) -> Result<i16, TransportError> {
        if let Some(limit) = self.fail_uploads_after {
            if self.uploaded.len() >= limit {
                return Err(TransportError::Device("upload rejected".to_string()));
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        self.uploaded.insert(id, data);
        self.commands.push(Command::Upload(id));
        Ok(id)
    }

    fn update_effect(&mut self, id: i16, data: FFEffectData) -> Result<(), TransportError> {
        let Some(slot) = self.uploaded.get_mut(&id) else {
            return Err(TransportError::UnknownDescriptor(id));
        };
        *slot = data;
        self.commands.push(Command::Update(id));
        Ok(())
    }

    fn play_effect(&mut self, id: i16) -> Result<(), TransportError> {
        if self.fail_play {
            return Err(TransportError::Device("start rejected".to_string()));
        }
        if !self.uploaded.contains_key(&id) {
            return Err(TransportError::UnknownDescriptor(id));
        }
        self.commands.push(Command::Play(id));
        Ok(())
    }

    fn stop_effect(&mut self, id: i16) -> Result<(), TransportError> {
        if !self.uploaded.contains_key(&id) {
            return Err(TransportError::UnknownDescriptor(id));
        }
        self.commands.push(Command::Stop(id));
        Ok(())
    }

    fn erase_effect(&mut self, id: i16) -> Result<(), TransportError> {
        self.uploaded.remove(&id);
        self.commands.push(Command::Erase(id));
        Ok(())
    }

    fn poll(&mut self, max: usize) -> Result<Vec<RawEvent>, TransportError> {
        if self.fail_poll {
            return Err(TransportError::Device("short read".to_string()));
        }
        let count = max.min(self.queued.len());
        Ok(self.queued.drain(..count).collect())
    }
}
