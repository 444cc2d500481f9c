//! Scalar and vector motion consumers: blink, gaze, head, posture.

use em_ir::{Channel, Timing, Value};

use crate::consumers::{envelope_with_handoff, ChannelConsumer};
use crate::envelope::PhaseEnvelope;

/// Eyelid closure weight, clamped to `[0, 1]`.
pub struct BlinkConsumer {
    env: PhaseEnvelope,
}

impl BlinkConsumer {
    pub fn new(amount: f32, timing: &Timing, handoff: Option<Value>) -> Self {
        let target = Value::Scalar(amount.clamp(0.0, 1.0));
        let env = envelope_with_handoff(target, Value::Scalar(0.0), timing, handoff);
        Self { env }
    }
}

impl ChannelConsumer for BlinkConsumer {
    fn channel(&self) -> Channel {
        Channel::Blink
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

/// Gaze direction offset (yaw, pitch), clamped to `[-1, 1]` per axis.
pub struct GazeConsumer {
    env: PhaseEnvelope,
}

impl GazeConsumer {
    pub fn new(target: [f32; 2], influence: f32, timing: &Timing, handoff: Option<Value>) -> Self {
        let influence = influence.clamp(0.0, 1.0);
        let target = Value::Vec2([target[0] * influence, target[1] * influence]);
        let env = envelope_with_handoff(target, Value::Vec2([0.0; 2]), timing, handoff);
        Self { env }
    }
}

impl ChannelConsumer for GazeConsumer {
    fn channel(&self) -> Channel {
        Channel::Gaze
    }
    fn reset(&mut self) {
        self.env.reset();
    }
    fn advance(&mut self, dt: f64) -> Value {
        self.env.advance(dt).clamp(-1.0, 1.0)
    }
    fn value(&self) -> Value {
        self.env.value().clamp(-1.0, 1.0)
    }
    fn is_done(&self) -> bool {
        self.env.is_done()
    }
    fn interrupt(&mut self) {
        self.env.cut_to_decay();
    }
}

/// Head rotation delta (pitch, yaw, roll), clamped to `[-1, 1]` per axis.
pub struct HeadConsumer {
    env: PhaseEnvelope,
}

impl HeadConsumer {
    pub fn new(rotation: [f32; 3], timing: &Timing, handoff: Option<Value>) -> Self {
        let env = envelope_with_handoff(
            Value::Vec3(rotation),
            Value::Vec3([0.0; 3]),
            timing,
            handoff,
        );
        Self { env }
    }
}

impl ChannelConsumer for HeadConsumer {
    fn channel(&self) -> Channel {
        Channel::Head
    }
    fn reset(&mut self) {
        self.env.reset();
    }
    fn advance(&mut self, dt: f64) -> Value {
        self.env.advance(dt).clamp(-1.0, 1.0)
    }
    fn value(&self) -> Value {
        self.env.value().clamp(-1.0, 1.0)
    }
    fn is_done(&self) -> bool {
        self.env.is_done()
    }
    fn interrupt(&mut self) {
        self.env.cut_to_decay();
    }
}

/// Body lean, clamped to `[-1, 1]`.
pub struct PostureConsumer {
    env: PhaseEnvelope,
}

impl PostureConsumer {
    pub fn new(lean: f32, timing: &Timing, handoff: Option<Value>) -> Self {
        let target = Value::Scalar(lean.clamp(-1.0, 1.0));
        let env = envelope_with_handoff(target, Value::Scalar(0.0), timing, handoff);
        Self { env }
    }
}

impl ChannelConsumer for PostureConsumer {
    fn channel(&self) -> Channel {
        Channel::Posture
    }
    fn reset(&mut self) {
        self.env.reset();
    }
    fn advance(&mut self, dt: f64) -> Value {
        self.env.advance(dt).clamp(-1.0, 1.0)
    }
    fn value(&self) -> Value {
        self.env.value().clamp(-1.0, 1.0)
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

    fn resolved(end: f64) -> Timing {
        let mut t = Timing::span(0.0, end);
        t.attack_peak = Some(end * 0.5);
        t.relax = Some(end * 0.5);
        t
    }

    #[test]
    fn blink_peaks_at_amount_and_returns() {
        let mut c = BlinkConsumer::new(1.0, &resolved(0.2), None);
        let peak = c.advance(0.1);
        assert_eq!(peak, Value::Scalar(1.0));
        let end = c.advance(0.1);
        assert_eq!(end, Value::Scalar(0.0));
        assert!(c.is_done());
    }

    #[test]
    fn blink_amount_is_clamped() {
        let mut c = BlinkConsumer::new(3.0, &resolved(0.2), None);
        assert_eq!(c.advance(0.1), Value::Scalar(1.0));
    }

    #[test]
    fn gaze_scales_by_influence() {
        let mut c = GazeConsumer::new([1.0, -0.5], 0.5, &resolved(1.0), None);
        assert_eq!(c.advance(0.5), Value::Vec2([0.5, -0.25]));
    }

    #[test]
    fn head_reaches_rotation_target() {
        let mut c = HeadConsumer::new([0.2, -0.3, 0.0], &resolved(1.0), None);
        assert_eq!(c.advance(0.5), Value::Vec3([0.2, -0.3, 0.0]));
        assert_eq!(c.channel(), Channel::Head);
    }

    #[test]
    fn interrupt_decays_to_neutral() {
        let mut c = PostureConsumer::new(0.8, &resolved(4.0), None);
        c.advance(2.0); // holding at 0.8
        c.interrupt();
        c.advance(2.0); // original decay length
        assert!(c.is_done());
        assert_eq!(c.value(), Value::Scalar(0.0));
    }

    #[test]
    fn reset_restarts_from_initial() {
        let mut c = BlinkConsumer::new(1.0, &resolved(0.2), None);
        c.advance(0.2);
        assert!(c.is_done());
        c.reset();
        assert!(!c.is_done());
        assert_eq!(c.value(), Value::Scalar(0.0));
    }
}
