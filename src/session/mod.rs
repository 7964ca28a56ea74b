
use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::SessionConfig;
use crate::effect::constant::ConstantForceChannel;
use crate::effect::store::EffectStore;
use crate::effect::EffectError;
use crate::input::state::DeviceState;
use crate::input::translator::{EventSink, EventTranslator};
use crate::transport::evdev::EvdevTransport;
use crate::transport::{Transport, TransportError};

/// Represents all possible errors opening or driving a [DeviceSession]
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Device does not support force feedback")]
    Unsupported,
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),
}

/// Top-level orchestrator for one force feedback device.
///
/// Owns the transport, the named effect store, the constant force
/// channel and the translated device state. Expected to be driven from
/// a single control loop: call [tick](Self::tick) repeatedly and issue
/// effect operations between ticks.
pub struct DeviceSession<T: Transport> {
    transport: T,
    translator: EventTranslator,
    effects: EffectStore,
    constant_force: ConstantForceChannel,
    idle_unload_secs: i64,
    poll_batch: usize,
    sweep_interval: Duration,
    last_sweep: Instant,
}

impl DeviceSession<EvdevTransport> {
    /// Open the event device named by the config.
    pub fn open_path(config: &SessionConfig) -> Result<Self, SessionError> {
        let transport = EvdevTransport::open(Path::new(&config.device_path))?;
        Self::open(transport, config)
    }
}

impl<T: Transport> DeviceSession<T> {
    /// Probe the transport and bring the session to ready state:
    /// verify force feedback capability, switch off auto-centering and
    /// pre-register the constant force descriptor. A device without
    /// force feedback is fatal here.
    pub fn open(mut transport: T, config: &SessionConfig) -> Result<Self, SessionError> {
        if !transport.supports_force_feedback() {
            return Err(SessionError::Unsupported);
        }
        transport.disable_autocenter()?;

        let mut constant_force = ConstantForceChannel::new();
        constant_force.prime(&mut transport)?;

        Ok(Self {
            transport,
            translator: EventTranslator::new(),
            effects: EffectStore::new(config.creation_policy),
            constant_force,
            idle_unload_secs: config.idle_unload_secs,
            poll_batch: config.poll_batch,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            last_sweep: Instant::now(),
        })
    }

    /// One cycle of the control loop: read a bounded batch of raw
    /// records, fold them into semantic state, notify the sink, and
    /// periodically sweep idle effects. Read glitches are transient;
    /// nothing is dispatched this tick and the stream is expected to
    /// self-correct on the next read.
    pub fn tick(&mut self, sink: &mut dyn EventSink) {
        match self.transport.poll(self.poll_batch) {
            Ok(events) => {
                for event in &events {
                    self.translator.handle(event, sink);
                }
                sink.axis_dispatch(self.translator.state());
            }
            Err(err) => {
                log::trace!("Skipping tick after transient read failure: {err}");
                return;
            }
        }

        if self.last_sweep.elapsed() >= self.sweep_interval {
            self.effects
                .evict_idle(&mut self.transport, self.idle_unload_secs);
            self.last_sweep = Instant::now();
        }
    }

    /// Parse the effect file at `path` and register it under `name`.
    pub fn add_effect(&mut self, name: &str, path: &Path) -> Result<(), EffectError> {
        self.effects.add(&mut self.transport, name, path)
    }

    /// Start playback of a named effect. Unknown names are a no-op.
    pub fn play_effect(&mut self, name: &str) -> Result<(), EffectError> {
        match self.effects.get_mut(name) {
            Some(effect) => effect.play(&mut self.transport),
            None => {
                log::debug!("No effect named '{name}' to play");
                Ok(())
            }
        }
    }

    /// Stop playback of a named effect. Unknown names are a no-op.
    pub fn stop_effect(&mut self, name: &str) -> Result<(), EffectError> {
        match self.effects.get_mut(name) {
            Some(effect) => effect.stop(&mut self.transport),
            None => {
                log::debug!("No effect named '{name}' to stop");
                Ok(())
            }
        }
    }

    /// Update the constant force from a host-supplied vector: direction
    /// from (x, y), strength from z.
    pub fn set_force(&mut self, x: f64, y: f64, z: f64) -> Result<(), TransportError> {
        self.constant_force.set_vector(&mut self.transport, x, y, z)
    }

    /// Advance the constant force direction sweep by `step`.
    pub fn sweep_force(&mut self, step: u16) -> Result<(), TransportError> {
        self.constant_force.sweep(&mut self.transport, step)
    }

    /// Current translated device state.
    pub fn state(&self) -> &DeviceState {
        self.translator.state()
    }

    pub fn effects(&self) -> &EffectStore {
        &self.effects
    }

    pub fn constant_force(&self) -> &ConstantForceChannel {
        &self.constant_force
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Tear the session down: force-stop and unload every effect,
    /// release the constant force descriptor and close the device.
    pub fn close(mut self) {
        self.effects.release_all(&mut self.transport);
        self.constant_force.release(&mut self.transport);
    }
}
