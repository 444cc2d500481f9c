//! Channel output values.

use arrayvec::ArrayVec;

use crate::sync::ease;

/// Maximum entries in a [`Value::Weights`] vector.
pub const MAX_WEIGHTS: usize = 8;

/// The output of one channel consumer for one frame.
///
/// Channels differ only in output shape: a blink is a scalar lid weight, a
/// gaze offset is (yaw, pitch), a head delta is three rotations, a facial
/// expression is a small action-unit weight vector.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Weights(ArrayVec<f32, MAX_WEIGHTS>),
}

impl Value {
    /// A dense weight vector of `n` zeros.
    pub fn zero_weights(n: usize) -> Value {
        let mut w = ArrayVec::new();
        for _ in 0..n.min(MAX_WEIGHTS) {
            w.push(0.0);
        }
        Value::Weights(w)
    }

    /// The zero value with the same shape as `self`.
    pub fn zero_like(&self) -> Value {
        match self {
            Value::Scalar(_) => Value::Scalar(0.0),
            Value::Vec2(_) => Value::Vec2([0.0; 2]),
            Value::Vec3(_) => Value::Vec3([0.0; 3]),
            Value::Weights(w) => Value::zero_weights(w.len()),
        }
    }

    /// Linear interpolation between two values of the same shape.
    ///
    /// A shape mismatch (possible across a re-triggered channel whose
    /// parameter set changed) snaps to `b`.
    pub fn lerp(a: &Value, b: &Value, t: f32) -> Value {
        match (a, b) {
            (Value::Scalar(x), Value::Scalar(y)) => Value::Scalar(x + (y - x) * t),
            (Value::Vec2(x), Value::Vec2(y)) => {
                Value::Vec2([x[0] + (y[0] - x[0]) * t, x[1] + (y[1] - x[1]) * t])
            }
            (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3([
                x[0] + (y[0] - x[0]) * t,
                x[1] + (y[1] - x[1]) * t,
                x[2] + (y[2] - x[2]) * t,
            ]),
            (Value::Weights(x), Value::Weights(y)) if x.len() == y.len() => {
                let mut out = ArrayVec::new();
                for (a, b) in x.iter().zip(y.iter()) {
                    out.push(a + (b - a) * t);
                }
                Value::Weights(out)
            }
            _ => b.clone(),
        }
    }

    /// Eased interpolation using the raised-cosine curve.
    pub fn eased(a: &Value, b: &Value, t: f32) -> Value {
        Value::lerp(a, b, ease(t))
    }

    /// Clamp every component into `[lo, hi]`.
    pub fn clamp(&self, lo: f32, hi: f32) -> Value {
        let c = |v: f32| v.clamp(lo, hi);
        match self {
            Value::Scalar(x) => Value::Scalar(c(*x)),
            Value::Vec2(x) => Value::Vec2([c(x[0]), c(x[1])]),
            Value::Vec3(x) => Value::Vec3([c(x[0]), c(x[1]), c(x[2])]),
            Value::Weights(w) => Value::Weights(w.iter().map(|v| c(*v)).collect()),
        }
    }

    /// The scalar component, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}
