//! Channel consumers: per-channel realizations of the phase envelope.
//!
//! A consumer owns one instruction after dispatch and turns envelope
//! output into a domain-clamped channel value each frame. All consumers
//! are interchangeable behind [`ChannelConsumer`]; they differ only in
//! output shape and clamping.

mod face;
mod motion;

pub use face::FaceConsumer;
pub use motion::{BlinkConsumer, GazeConsumer, HeadConsumer, PostureConsumer};

use em_ir::{Channel, Instruction, Lexicon, Params, Value};
use tracing::debug;

use crate::envelope::PhaseEnvelope;

/// A live channel value generator.
///
/// Lifetime: created on instruction activation, advanced once per frame,
/// discarded once [`ChannelConsumer::is_done`] reports the envelope passed
/// its end. The scheduler never calls these; the consumer layer does.
pub trait ChannelConsumer {
    /// The channel this consumer drives.
    fn channel(&self) -> Channel;
    /// Restart the envelope from its activation point.
    fn reset(&mut self);
    /// Advance by `dt` seconds and return the new output value.
    fn advance(&mut self, dt: f64) -> Value;
    /// Current output without advancing (hand-off snapshot).
    fn value(&self) -> Value;
    /// Whether the envelope has reached its end.
    fn is_done(&self) -> bool;
    /// Begin decaying toward the default value from wherever the envelope
    /// currently is. Used when scheduled behavior is replaced.
    fn interrupt(&mut self);
}

/// Build the consumer matching an activated instruction.
///
/// `handoff` is the outgoing consumer's current value on this channel, if
/// any; it becomes the new envelope's initial value so re-triggering a
/// channel mid-transition stays continuous.
///
/// Returns `None` for channels realized by external collaborators
/// (gesture IK, speech audio) and for face lexemes missing from the
/// lexicon; the instruction still counts as activated.
pub fn consumer_for(
    instruction: &Instruction,
    lexicon: &Lexicon,
    handoff: Option<Value>,
) -> Option<Box<dyn ChannelConsumer>> {
    let timing = &instruction.timing;
    match &instruction.params {
        Params::Blink { amount } => {
            Some(Box::new(BlinkConsumer::new(*amount, timing, handoff)))
        }
        Params::Gaze { target, influence } => {
            Some(Box::new(GazeConsumer::new(*target, *influence, timing, handoff)))
        }
        Params::Head { rotation } => {
            Some(Box::new(HeadConsumer::new(*rotation, timing, handoff)))
        }
        Params::Posture { lean } => {
            Some(Box::new(PostureConsumer::new(*lean, timing, handoff)))
        }
        Params::Face { lexeme, amount } => match lexicon.find(lexeme) {
            Some(template) => Some(Box::new(FaceConsumer::new(
                template,
                *amount,
                timing,
                handoff,
            ))),
            None => {
                debug!(lexeme = lexeme.as_str(), "unknown face lexeme; skipping");
                None
            }
        },
        // Realized by external collaborators (limb IK, audio pipeline).
        Params::Gesture { .. } | Params::Speech { .. } => None,
    }
}

/// Shared helper: envelope whose initial value is the hand-off snapshot
/// when one exists, else the neutral default.
pub(crate) fn envelope_with_handoff(
    target: Value,
    default: Value,
    timing: &em_ir::Timing,
    handoff: Option<Value>,
) -> PhaseEnvelope {
    let initial = handoff.unwrap_or_else(|| default.clone());
    PhaseEnvelope::new(initial, target, default, timing)
}
