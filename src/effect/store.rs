use std::collections::HashMap;
use std::path::Path;

use crate::transport::Transport;

use super::{CreationPolicy, Effect, EffectError};

/// Named effect registry. Creating and looking up effects are the only
/// mutation paths; names are unique.
#[derive(Debug)]
pub struct EffectStore {
    effects: HashMap<String, Effect>,
    policy: CreationPolicy,
}

impl EffectStore {
    pub fn new(policy: CreationPolicy) -> Self {
        Self {
            effects: HashMap::new(),
            policy,
        }
    }

    /// Create an effect from the file at `path` and register it under
    /// `name` using the store-wide creation policy. A failed create
    /// never leaves a half-inserted entry.
    pub fn add(
        &mut self,
        transport: &mut dyn Transport,
        name: &str,
        path: &Path,
    ) -> Result<(), EffectError> {
        if self.effects.contains_key(name) {
            return Err(EffectError::DuplicateName(name.to_string()));
        }
        let effect = Effect::create(transport, name, path, self.policy)?;
        self.effects.insert(name.to_string(), effect);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Effect> {
        self.effects.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Effect> {
        self.effects.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Unload every loaded effect idle for at least `threshold_secs`.
    /// Playing effects defer and are retried on a later sweep. A
    /// negative threshold unloads regardless of recency; `i64::MAX`
    /// disables eviction.
    pub fn evict_idle(&mut self, transport: &mut dyn Transport, threshold_secs: i64) {
        for effect in self.effects.values_mut() {
            if !effect.is_loaded() {
                continue;
            }
            if (effect.idle_seconds() as i64) < threshold_secs {
                continue;
            }
            match effect.unload(transport) {
                Ok(true) => log::debug!("Unloaded idle effect '{}'", effect.name()),
                Ok(false) => {
                    log::trace!("Effect '{}' is playing, unload deferred", effect.name())
                }
                Err(err) => log::warn!("Failed to unload effect '{}': {err}", effect.name()),
            }
        }
    }

    /// Stop and unload everything, then drop the effects. Unlike the
    /// eviction sweep this does not honor the playing deferral.
    pub fn release_all(&mut self, transport: &mut dyn Transport) {
        for effect in self.effects.values_mut() {
            effect.force_release(transport);
        }
        self.effects.clear();
    }
}
