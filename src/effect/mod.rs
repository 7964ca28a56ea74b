pub mod constant;
pub mod file;
pub mod store;

#[cfg(test)]
mod mod_test;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use evdev::FFEffectData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::{Transport, TransportError};

use self::file::FormatError;

/// Represents all possible errors creating or driving an [Effect]
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("Could not read effect file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed effect file: {0}")]
    Format(#[from] FormatError),
    #[error("Device rejected effect request: {0}")]
    Device(#[from] TransportError),
    #[error("An effect named '{0}' already exists")]
    DuplicateName(String),
}

/// When an effect's device upload happens.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreationPolicy {
    /// Upload all parsed records as soon as the effect is created
    #[default]
    Immediate,
    /// Defer the upload until the first play request
    OnFirstPlay,
}

/// A named force feedback pattern manageable as a unit.
///
/// Owns the descriptor ids assigned by the transport for every record
/// parsed from its source file. Loaded means every descriptor is
/// currently valid on the open device.
#[derive(Debug)]
pub struct Effect {
    name: String,
    path: PathBuf,
    policy: CreationPolicy,
    records: Vec<FFEffectData>,
    descriptors: Vec<i16>,
    loaded: bool,
    playing: bool,
    last_used: Instant,
}

impl Effect {
    /// Parse the effect file at `path` and build an [Effect] from it.
    /// With [CreationPolicy::Immediate] every record is uploaded to
    /// the device before this returns; any upload failure rolls back
    /// the descriptors uploaded so far and discards the effect.
    pub fn create(
        transport: &mut dyn Transport,
        name: &str,
        path: &Path,
        policy: CreationPolicy,
    ) -> Result<Self, EffectError> {
        let bytes = fs::read(path)?;
        let records = file::parse(&bytes)?;
        log::debug!(
            "Effect '{name}': {} record(s) from {}",
            records.len(),
            path.display()
        );

        let mut effect = Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            policy,
            records,
            descriptors: Vec::new(),
            loaded: false,
            playing: false,
            last_used: Instant::now(),
        };
        if policy == CreationPolicy::Immediate {
            effect.load(transport)?;
        }

        Ok(effect)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> CreationPolicy {
        self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn descriptors(&self) -> &[i16] {
        &self.descriptors
    }

    /// Seconds elapsed since this effect was last played or stopped.
    pub fn idle_seconds(&self) -> u64 {
        self.last_used.elapsed().as_secs()
    }

    /// Start playback, uploading the records first if the effect is
    /// not currently loaded. A rejected start command is returned to
    /// the caller but leaves the loaded descriptors in place.
    pub fn play(&mut self, transport: &mut dyn Transport) -> Result<(), EffectError> {
        self.touch();
        if !self.loaded {
            self.load(transport)?;
        }

        let mut started = false;
        for &id in &self.descriptors {
            if let Err(err) = transport.play_effect(id) {
                self.playing = started;
                return Err(err.into());
            }
            started = true;
        }
        self.playing = started;

        Ok(())
    }

    /// Stop playback of every descriptor. Does not unload. Stops are
    /// best-effort: all descriptors are attempted and the first
    /// rejection is reported afterwards.
    pub fn stop(&mut self, transport: &mut dyn Transport) -> Result<(), EffectError> {
        self.touch();

        let mut first_err = None;
        for &id in &self.descriptors {
            if let Err(err) = transport.stop_effect(id) {
                first_err.get_or_insert(err);
            }
        }
        self.playing = false;

        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Release every descriptor on the device. Returns `Ok(false)` and
    /// leaves the effect untouched while it is playing; the caller is
    /// expected to retry once playback has stopped.
    pub fn unload(&mut self, transport: &mut dyn Transport) -> Result<bool, EffectError> {
        if !self.loaded {
            return Ok(true);
        }
        if self.playing {
            return Ok(false);
        }

        let mut first_err = None;
        for id in self.descriptors.drain(..) {
            if let Err(err) = transport.erase_effect(id) {
                first_err.get_or_insert(err);
            }
        }
        self.loaded = false;

        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(true),
        }
    }

    /// Shutdown path: stop playback if needed, then unload without
    /// honoring the playing deferral.
    pub(crate) fn force_release(&mut self, transport: &mut dyn Transport) {
        if self.playing {
            if let Err(err) = self.stop(transport) {
                log::warn!("Failed to stop effect '{}': {err}", self.name);
            }
        }
        if let Err(err) = self.unload(transport) {
            log::warn!("Failed to unload effect '{}': {err}", self.name);
        }
    }

    /// Upload every parsed record, rolling back on the first rejection.
    fn load(&mut self, transport: &mut dyn Transport) -> Result<(), EffectError> {
        let mut uploaded = Vec::with_capacity(self.records.len());
        for record in &self.records {
            match transport.upload_effect(*record) {
                Ok(id) => uploaded.push(id),
                Err(err) => {
                    for id in uploaded {
                        let _ = transport.erase_effect(id);
                    }
                    return Err(err.into());
                }
            }
        }
        self.loaded = !uploaded.is_empty();
        self.descriptors = uploaded;
        Ok(())
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }
}
