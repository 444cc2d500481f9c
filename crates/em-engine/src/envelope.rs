//! Five-point phase envelope state machine.
//!
//! The reusable primitive behind every channel consumer: interpolates
//! source -> target -> default across the canonical sync points with
//! raised-cosine easing.

use em_ir::{Timing, Value};

/// Envelope phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// `time < start`: output is the initial value.
    PreStart,
    /// `start..attackPeak`: easing initial -> target.
    Attack,
    /// `attackPeak..relax`: holding target (may be zero-length).
    Hold,
    /// `relax..end`: easing target -> default.
    Decay,
    /// `time >= end`: output is the default value.
    Done,
}

/// Runtime state for one instruction's value envelope.
///
/// Times are envelope-local seconds: an instruction's rebased sync points,
/// with `start` at 0 (activation).
#[derive(Clone, Debug)]
pub struct PhaseEnvelope {
    initial: Value,
    target: Value,
    default: Value,
    start: f64,
    attack_peak: f64,
    relax: f64,
    end: f64,
    /// Elapsed time since activation.
    time: f64,
    /// Current output value.
    current: Value,
}

impl PhaseEnvelope {
    /// Build an envelope from rebased instruction timing.
    ///
    /// Missing interior points collapse onto their predecessor, so a bare
    /// `{start, end}` pair still produces a well-formed envelope once the
    /// resolver has filled defaults.
    pub fn new(initial: Value, target: Value, default: Value, timing: &Timing) -> Self {
        let start = 0.0;
        let end = timing.end.unwrap_or(start).max(start);
        let attack_peak = timing.attack_point().unwrap_or(start).clamp(start, end);
        let relax = timing.relax_point().unwrap_or(attack_peak).clamp(attack_peak, end);
        let current = initial.clone();
        let mut env = Self {
            initial,
            target,
            default,
            start,
            attack_peak,
            relax,
            end,
            time: 0.0,
            current,
        };
        env.current = env.eval();
        env
    }

    /// Advance by `dt` seconds and return the new output value.
    /// Non-positive `dt` leaves the envelope unchanged.
    pub fn advance(&mut self, dt: f64) -> Value {
        if dt > 0.0 {
            self.time += dt;
            self.current = self.eval();
        }
        self.current.clone()
    }

    /// Current output value without advancing. This is what a successor
    /// instruction snapshots as its own initial value at hand-off.
    pub fn value(&self) -> Value {
        self.current.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if self.time < self.start {
            Phase::PreStart
        } else if self.time < self.attack_peak {
            Phase::Attack
        } else if self.time < self.relax {
            Phase::Hold
        } else if self.time < self.end {
            Phase::Decay
        } else {
            Phase::Done
        }
    }

    /// Whether the envelope has reached its end.
    pub fn is_done(&self) -> bool {
        self.time >= self.end
    }

    /// Restart from activation time with the same points and buffers.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.current = self.eval();
    }

    /// Cut to the decay phase from the current value, keeping the original
    /// decay duration. Used when scheduled behavior is replaced out from
    /// under an active instruction: the value glides to default instead of
    /// snapping. No-op once decay has begun.
    pub fn cut_to_decay(&mut self) {
        if self.time >= self.relax {
            return;
        }
        let decay_len = (self.end - self.relax).max(0.0);
        self.target = self.current.clone();
        self.attack_peak = self.time;
        self.relax = self.time;
        self.end = self.time + decay_len;
        self.current = self.eval();
    }

    fn eval(&self) -> Value {
        match self.phase() {
            Phase::PreStart => self.initial.clone(),
            Phase::Attack => {
                let t = (self.time - self.start) / (self.attack_peak - self.start);
                Value::eased(&self.initial, &self.target, t as f32)
            }
            Phase::Hold => self.target.clone(),
            Phase::Decay => {
                let t = (self.time - self.relax) / (self.end - self.relax);
                Value::eased(&self.target, &self.default, t as f32)
            }
            Phase::Done => self.default.clone(),
        }
    }
}
