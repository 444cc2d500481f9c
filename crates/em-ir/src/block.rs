//! Blocks: bags of simultaneous instructions sharing one time origin.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::{Channel, Instruction};

/// How a block composes against already-scheduled behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Composition {
    /// Schedule relative to now, alongside whatever is queued.
    #[default]
    Merge,
    /// Schedule after the last queued block finishes.
    Append,
    /// Evict everything queued; become the sole scheduled block.
    Replace,
    /// Legacy mode. Its original conflict-resolution algorithm shipped in
    /// two mutually inconsistent variants; accepted for compatibility and
    /// placed with `Merge` semantics.
    Overwrite,
}

impl Composition {
    /// Parse a composition mode name, case-insensitively.
    /// Unknown names get the default (`Merge`).
    pub fn from_name(name: &str) -> Composition {
        if name.eq_ignore_ascii_case("append") {
            Composition::Append
        } else if name.eq_ignore_ascii_case("replace") {
            Composition::Replace
        } else if name.eq_ignore_ascii_case("overwrite") {
            Composition::Overwrite
        } else {
            Composition::Merge
        }
    }

    /// The mode's canonical name.
    pub const fn name(self) -> &'static str {
        match self {
            Composition::Merge => "MERGE",
            Composition::Append => "APPEND",
            Composition::Replace => "REPLACE",
            Composition::Overwrite => "OVERWRITE",
        }
    }
}

/// A group of simultaneous per-channel instructions sharing one
/// composition mode and time origin.
///
/// Several instructions may target the same channel (channels allowing
/// simultaneous sub-instructions); the bag is flat.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    /// Optional BML block id.
    pub id: Option<ArrayString<24>>,
    /// Composition mode.
    pub composition: Composition,
    /// Offset (seconds) applied at placement time.
    pub start: f64,
    /// Block-origin-relative end; the resolver sets it to the max resolved
    /// instruction end.
    pub end: f64,
    /// Absolute start, filled at placement.
    pub global_start: f64,
    /// Absolute end, filled at placement.
    pub global_end: f64,
    /// The instructions.
    pub instructions: Vec<Instruction>,
}

impl Block {
    /// New empty merge block starting at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the composition mode.
    pub fn composed(mut self, mode: Composition) -> Self {
        self.composition = mode;
        self
    }

    /// Set the relative start offset in seconds.
    pub fn starting_at(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Set the block id. Names past the fixed capacity are truncated.
    pub fn with_id(mut self, id: &str) -> Self {
        let mut name = ArrayString::new();
        for c in id.chars() {
            if name.try_push(c).is_err() {
                break;
            }
        }
        self.id = Some(name);
        self
    }

    /// Add an instruction.
    pub fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Whether the block's scheduled window covers `now`.
    pub fn is_active(&self, now: f64) -> bool {
        self.global_start <= now && now < self.global_end
    }

    /// Instructions targeting one channel.
    pub fn for_channel(&self, channel: Channel) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter().filter(move |i| i.channel == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timing;

    #[test]
    fn composition_parse_is_case_insensitive() {
        assert_eq!(Composition::from_name("append"), Composition::Append);
        assert_eq!(Composition::from_name("REPLACE"), Composition::Replace);
        assert_eq!(Composition::from_name("Overwrite"), Composition::Overwrite);
    }

    #[test]
    fn unknown_composition_defaults_to_merge() {
        assert_eq!(Composition::from_name("blend"), Composition::Merge);
    }

    #[test]
    fn builder_collects_instructions() {
        let b = Block::new()
            .starting_at(0.5)
            .composed(Composition::Append)
            .push(Instruction::blink(Timing::span(0.0, 0.2), 1.0))
            .push(Instruction::posture(Timing::span(0.0, 2.0), 0.4));
        assert_eq!(b.instructions.len(), 2);
        assert_eq!(b.start, 0.5);
        assert_eq!(b.for_channel(Channel::Blink).count(), 1);
    }

    #[test]
    fn is_active_is_half_open() {
        let mut b = Block::new();
        b.global_start = 1.0;
        b.global_end = 2.0;
        assert!(!b.is_active(0.5));
        assert!(b.is_active(1.0));
        assert!(b.is_active(1.9));
        assert!(!b.is_active(2.0));
    }
}
