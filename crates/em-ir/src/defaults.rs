//! Default phase durations per channel.

use crate::Channel;

/// Fallback phase durations (seconds) used by the resolver to fill
/// missing sync points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseDefaults {
    /// start -> attackPeak.
    pub attack: f64,
    /// attackPeak -> relax.
    pub hold: f64,
    /// relax -> end.
    pub relax: f64,
}

impl PhaseDefaults {
    pub const fn new(attack: f64, hold: f64, relax: f64) -> Self {
        Self { attack, hold, relax }
    }

    /// Total default envelope length.
    pub fn total(&self) -> f64 {
        self.attack + self.hold + self.relax
    }
}

/// Per-channel default-duration table, supplied externally to the resolver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultDurations {
    table: [PhaseDefaults; Channel::COUNT],
}

impl DefaultDurations {
    /// Build from an explicit table indexed by `Channel::index()`.
    pub const fn from_table(table: [PhaseDefaults; Channel::COUNT]) -> Self {
        Self { table }
    }

    /// Defaults for one channel.
    pub fn for_channel(&self, channel: Channel) -> &PhaseDefaults {
        &self.table[channel.index()]
    }
}

impl Default for DefaultDurations {
    fn default() -> Self {
        let mut table = [PhaseDefaults::new(0.25, 0.5, 0.25); Channel::COUNT];
        // Lids snap shut and reopen; no hold by default.
        table[Channel::Blink.index()] = PhaseDefaults::new(0.1, 0.0, 0.15);
        table[Channel::Gaze.index()] = PhaseDefaults::new(0.2, 0.4, 0.2);
        table[Channel::Head.index()] = PhaseDefaults::new(0.3, 0.4, 0.3);
        table[Channel::Face.index()] = PhaseDefaults::new(0.25, 0.5, 0.25);
        // Limb motion is slower than facial motion.
        table[Channel::Gesture.index()] = PhaseDefaults::new(0.5, 0.6, 0.5);
        table[Channel::Posture.index()] = PhaseDefaults::new(0.6, 1.0, 0.6);
        table[Channel::Speech.index()] = PhaseDefaults::new(0.0, 1.0, 0.0);
        Self { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blink_is_faster_than_gesture() {
        let d = DefaultDurations::default();
        assert!(d.for_channel(Channel::Blink).total() < d.for_channel(Channel::Gesture).total());
    }

    #[test]
    fn every_channel_has_positive_total() {
        let d = DefaultDurations::default();
        for ch in Channel::ALL {
            assert!(d.for_channel(ch).total() > 0.0);
        }
    }
}
