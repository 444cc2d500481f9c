//! Atomic behavior instructions.

use alloc::string::String;
use arrayvec::ArrayString;

use crate::{Channel, Timing};

/// Which hand performs a gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hand {
    #[default]
    Right,
    Left,
    Both,
}

impl Hand {
    /// Parse a hand name, case-insensitively. Unknown names get the default.
    pub fn from_name(name: &str) -> Hand {
        if name.eq_ignore_ascii_case("left") {
            Hand::Left
        } else if name.eq_ignore_ascii_case("both") {
            Hand::Both
        } else {
            Hand::Right
        }
    }
}

/// Channel-specific instruction parameters.
///
/// One variant per channel; the parser validates at this boundary so the
/// engine never sees a shape/channel mismatch.
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    /// Lid closure amount, 0 (open) to 1 (closed).
    Blink { amount: f32 },
    /// Gaze offset target as (yaw, pitch) in normalized units, plus how
    /// strongly the eyes commit to it.
    Gaze { target: [f32; 2], influence: f32 },
    /// Head rotation delta (pitch, yaw, roll amplitude).
    Head { rotation: [f32; 3] },
    /// Facial expression by lexeme name, scaled by `amount`.
    Face { lexeme: ArrayString<24>, amount: f32 },
    /// Arm/hand gesture by lexeme name.
    Gesture { lexeme: ArrayString<24>, amount: f32, hand: Hand },
    /// Forward/backward body lean.
    Posture { lean: f32 },
    /// Utterance text and speech rate multiplier.
    Speech { text: String, rate: f32 },
}

impl Params {
    /// The channel this parameter set belongs to.
    pub fn channel(&self) -> Channel {
        match self {
            Params::Blink { .. } => Channel::Blink,
            Params::Gaze { .. } => Channel::Gaze,
            Params::Head { .. } => Channel::Head,
            Params::Face { .. } => Channel::Face,
            Params::Gesture { .. } => Channel::Gesture,
            Params::Posture { .. } => Channel::Posture,
            Params::Speech { .. } => Channel::Speech,
        }
    }
}

/// Instruction lifecycle. Transitions happen only inside the resolver
/// (which creates `Pending` instructions) and the dispatcher (which
/// activates and, implicitly by removal, retires them).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Pending,
    Active,
    Retired,
}

/// One atomic behavior unit for one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    /// The channel this instruction drives.
    pub channel: Channel,
    /// Sync points, block-origin-relative until the resolver rebases them.
    pub timing: Timing,
    /// Channel parameters.
    pub params: Params,
    /// Lifecycle state.
    pub state: Lifecycle,
    /// Absolute activation time, filled by the resolver.
    pub global_start: f64,
    /// Absolute finish time, filled by the resolver.
    pub global_end: f64,
}

impl Instruction {
    /// Create a pending instruction. The channel comes from the params.
    pub fn new(timing: Timing, params: Params) -> Self {
        Self {
            channel: params.channel(),
            timing,
            params,
            state: Lifecycle::Pending,
            global_start: 0.0,
            global_end: 0.0,
        }
    }

    /// Blink helper (scalar lid weight).
    pub fn blink(timing: Timing, amount: f32) -> Self {
        Self::new(timing, Params::Blink { amount })
    }

    /// Gaze helper.
    pub fn gaze(timing: Timing, target: [f32; 2], influence: f32) -> Self {
        Self::new(timing, Params::Gaze { target, influence })
    }

    /// Head-movement helper.
    pub fn head(timing: Timing, rotation: [f32; 3]) -> Self {
        Self::new(timing, Params::Head { rotation })
    }

    /// Facial-expression helper. Lexeme names longer than the fixed
    /// capacity are truncated.
    pub fn face(timing: Timing, lexeme: &str, amount: f32) -> Self {
        Self::new(timing, Params::Face { lexeme: truncated(lexeme), amount })
    }

    /// Gesture helper. Lexeme names longer than the fixed capacity are
    /// truncated.
    pub fn gesture(timing: Timing, lexeme: &str, amount: f32, hand: Hand) -> Self {
        Self::new(timing, Params::Gesture { lexeme: truncated(lexeme), amount, hand })
    }

    /// Posture helper.
    pub fn posture(timing: Timing, lean: f32) -> Self {
        Self::new(timing, Params::Posture { lean })
    }
}

/// Copy a name into fixed capacity, truncating on overflow.
fn truncated(name: &str) -> ArrayString<24> {
    let mut out = ArrayString::new();
    for c in name.chars() {
        if out.try_push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_derived_from_params() {
        let i = Instruction::face(Timing::span(0.0, 1.0), "BROW_RAISER", 0.3);
        assert_eq!(i.channel, Channel::Face);
        assert_eq!(i.state, Lifecycle::Pending);
    }

    #[test]
    fn long_lexeme_is_truncated() {
        let i = Instruction::face(Timing::new(), "A_VERY_LONG_LEXEME_NAME_PAST_CAPACITY", 1.0);
        match i.params {
            Params::Face { lexeme, .. } => assert_eq!(lexeme.len(), 24),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn hand_parse() {
        assert_eq!(Hand::from_name("LEFT"), Hand::Left);
        assert_eq!(Hand::from_name("both"), Hand::Both);
        assert_eq!(Hand::from_name("???"), Hand::Right);
    }
}
