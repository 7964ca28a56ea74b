use std::f64::consts::TAU;

use evdev::{FFEffectData, FFEffectKind, FFEnvelope, FFReplay, FFTrigger};

use crate::transport::{Transport, TransportError, UNASSIGNED_EFFECT};

/// Full turn on the device's 16-bit angular scale.
const DIRECTION_SCALE: f64 = u16::MAX as f64;

/// One continuously updated constant force effect.
///
/// The descriptor id starts out unassigned (-1) and becomes stable for
/// the rest of the session after the first successful upload. The
/// direction sweep keeps its running phase here rather than in hidden
/// function-local state.
#[derive(Debug)]
pub struct ConstantForceChannel {
    effect_id: i16,
    direction: u16,
    level: i16,
    phase: f64,
}

impl ConstantForceChannel {
    pub fn new() -> Self {
        Self {
            effect_id: UNASSIGNED_EFFECT,
            direction: 0,
            level: 0,
            phase: 0.0,
        }
    }

    pub fn effect_id(&self) -> i16 {
        self.effect_id
    }

    pub fn direction(&self) -> u16 {
        self.direction
    }

    pub fn level(&self) -> i16 {
        self.level
    }

    /// Upload the baseline zero-level effect and record the id the
    /// device assigned. Does nothing once a descriptor exists.
    pub fn prime(&mut self, transport: &mut dyn Transport) -> Result<(), TransportError> {
        if self.effect_id == UNASSIGNED_EFFECT {
            self.effect_id = transport.upload_effect(self.effect_data())?;
            log::debug!("Constant force channel primed with id {}", self.effect_id);
        }
        Ok(())
    }

    /// Point the force along the (x, y) projection of the given vector
    /// and scale its strength from z. The x ≈ 0 case is well defined:
    /// the direction resolves to ±90° from the sign of y.
    pub fn set_vector(
        &mut self,
        transport: &mut dyn Transport,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(), TransportError> {
        self.direction = direction_from_xy(x, y);
        self.level = z.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        self.upload_or_update(transport)
    }

    /// Advance the force direction by `step` on the angular scale,
    /// wrapping at a full turn, and replay at full strength.
    pub fn sweep(&mut self, transport: &mut dyn Transport, step: u16) -> Result<(), TransportError> {
        self.phase = (self.phase + f64::from(step)) % (DIRECTION_SCALE + 1.0);
        self.direction = self.phase as u16;
        self.level = i16::MAX;
        self.upload_or_update(transport)?;
        transport.play_effect(self.effect_id)
    }

    /// Release the device-side descriptor, if any.
    pub fn release(&mut self, transport: &mut dyn Transport) {
        if self.effect_id != UNASSIGNED_EFFECT {
            if let Err(err) = transport.erase_effect(self.effect_id) {
                log::warn!("Failed to erase constant force effect: {err}");
            }
            self.effect_id = UNASSIGNED_EFFECT;
        }
    }

    fn upload_or_update(&mut self, transport: &mut dyn Transport) -> Result<(), TransportError> {
        if self.effect_id == UNASSIGNED_EFFECT {
            self.effect_id = transport.upload_effect(self.effect_data())?;
        } else {
            transport.update_effect(self.effect_id, self.effect_data())?;
        }
        Ok(())
    }

    fn effect_data(&self) -> FFEffectData {
        FFEffectData {
            direction: self.direction,
            trigger: FFTrigger {
                button: 0,
                interval: 0,
            },
            replay: FFReplay {
                length: 0xffff,
                delay: 0,
            },
            kind: FFEffectKind::Constant {
                level: self.level,
                envelope: FFEnvelope {
                    attack_length: 0,
                    attack_level: 0,
                    fade_length: 0,
                    fade_level: 0,
                },
            },
        }
    }
}

impl Default for ConstantForceChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Angle of (x, y) mapped onto the 16-bit scale, full turn = 0xFFFF.
fn direction_from_xy(x: f64, y: f64) -> u16 {
    let turns = y.atan2(x).rem_euclid(TAU) / TAU;
    (turns * DIRECTION_SCALE) as u16
}
