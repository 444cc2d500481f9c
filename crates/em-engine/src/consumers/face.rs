//! Facial action-unit consumer.

use em_ir::{Channel, FaceLexeme, Timing, Value, ACTION_UNITS};

use crate::consumers::{envelope_with_handoff, ChannelConsumer};
use crate::envelope::PhaseEnvelope;

/// Dense action-unit weight vector driven by one lexeme template, scaled
/// by the instruction's `amount` and clamped to `[0, 1]` per unit.
pub struct FaceConsumer {
    env: PhaseEnvelope,
}

impl FaceConsumer {
    pub fn new(
        template: &FaceLexeme,
        amount: f32,
        timing: &Timing,
        handoff: Option<Value>,
    ) -> Self {
        let target = template.dense(amount.clamp(0.0, 1.0));
        let env = envelope_with_handoff(
            target,
            Value::zero_weights(ACTION_UNITS),
            timing,
            handoff,
        );
        Self { env }
    }
}

impl ChannelConsumer for FaceConsumer {
    fn channel(&self) -> Channel {
        Channel::Face
    }
    fn reset(&mut self) {
        self.env.reset();
    }
    fn advance(&mut self, dt: f64) -> Value {
        self.env.advance(dt).clamp(0.0, 1.0)
    }
    fn value(&self) -> Value {
        self.env.value().clamp(0.0, 1.0)
    }
    fn is_done(&self) -> bool {
        self.env.is_done()
    }
    fn interrupt(&mut self) {
        self.env.cut_to_decay();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_ir::Lexicon;

    fn resolved(end: f64) -> Timing {
        let mut t = Timing::span(0.0, end);
        t.attack_peak = Some(end * 0.5);
        t.relax = Some(end * 0.5);
        t
    }

    #[test]
    fn peaks_at_scaled_template() {
        let lx = Lexicon::standard();
        let brow = lx.find("BROW_RAISER").unwrap();
        let mut c = FaceConsumer::new(brow, 0.3, &resolved(1.0), None);
        match c.advance(0.5) {
            Value::Weights(w) => {
                assert!((w[0] - 0.3).abs() < 1e-6);
                assert!((w[1] - 0.24).abs() < 1e-6);
                assert_eq!(w[2], 0.0);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn decays_back_to_neutral() {
        let lx = Lexicon::standard();
        let jaw = lx.find("JAW_DROP").unwrap();
        let mut c = FaceConsumer::new(jaw, 1.0, &resolved(1.0), None);
        let end = c.advance(1.0);
        assert_eq!(end, Value::zero_weights(ACTION_UNITS));
        assert!(c.is_done());
    }
}
