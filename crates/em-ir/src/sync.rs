//! BML sync points and per-instruction timing.
//!
//! `Timing` carries the named synchronization points of one instruction.
//! Values arrive as seconds relative to the enclosing block's origin; the
//! resolver fills gaps from the default-duration table, folds negative
//! block-origin references, and rebases everything onto the instruction's
//! own start before the envelope ever sees it.

use core::f32::consts::PI;

/// Epsilon for "still negative after rebasing" malformedness checks.
const NEG_EPS: f64 = 1e-9;

/// Raised-cosine easing: `0.5 - 0.5*cos(pi*t)` for `t` in `[0,1]`.
///
/// Starts and ends at zero velocity, so consecutive phases join without a
/// visible velocity discontinuity even on mid-transition re-trigger.
pub fn ease(t: f32) -> f32 {
    let t = if t < 0.0 {
        0.0
    } else if t > 1.0 {
        1.0
    } else {
        t
    };
    0.5 - 0.5 * libm::cosf(PI * t)
}

/// A named synchronization point in the canonical BML set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncPoint {
    Start,
    Ready,
    AttackPeak,
    StrokeStart,
    Stroke,
    StrokeEnd,
    Relax,
    End,
}

impl SyncPoint {
    /// All sync points in timeline order.
    pub const ALL: [SyncPoint; 8] = [
        SyncPoint::Start,
        SyncPoint::Ready,
        SyncPoint::AttackPeak,
        SyncPoint::StrokeStart,
        SyncPoint::Stroke,
        SyncPoint::StrokeEnd,
        SyncPoint::Relax,
        SyncPoint::End,
    ];

    /// The point's BML attribute name.
    pub const fn name(self) -> &'static str {
        match self {
            SyncPoint::Start => "start",
            SyncPoint::Ready => "ready",
            SyncPoint::AttackPeak => "attackPeak",
            SyncPoint::StrokeStart => "strokeStart",
            SyncPoint::Stroke => "stroke",
            SyncPoint::StrokeEnd => "strokeEnd",
            SyncPoint::Relax => "relax",
            SyncPoint::End => "end",
        }
    }

    /// Look up a sync point by its BML attribute name (case-insensitive).
    pub fn from_name(name: &str) -> Option<SyncPoint> {
        SyncPoint::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

/// The sync-point subset of one instruction, in seconds.
///
/// Missing points stay `None` until [`Timing::fill_defaults`] runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timing {
    pub start: Option<f64>,
    pub ready: Option<f64>,
    pub attack_peak: Option<f64>,
    pub stroke_start: Option<f64>,
    pub stroke: Option<f64>,
    pub stroke_end: Option<f64>,
    pub relax: Option<f64>,
    pub end: Option<f64>,
}

impl Timing {
    /// Empty timing (everything defaulted later).
    pub const fn new() -> Self {
        Self {
            start: None,
            ready: None,
            attack_peak: None,
            stroke_start: None,
            stroke: None,
            stroke_end: None,
            relax: None,
            end: None,
        }
    }

    /// Timing from explicit start/end, the common two-point case.
    pub const fn span(start: f64, end: f64) -> Self {
        let mut t = Self::new();
        t.start = Some(start);
        t.end = Some(end);
        t
    }

    /// Get a point's value.
    pub fn get(&self, point: SyncPoint) -> Option<f64> {
        match point {
            SyncPoint::Start => self.start,
            SyncPoint::Ready => self.ready,
            SyncPoint::AttackPeak => self.attack_peak,
            SyncPoint::StrokeStart => self.stroke_start,
            SyncPoint::Stroke => self.stroke,
            SyncPoint::StrokeEnd => self.stroke_end,
            SyncPoint::Relax => self.relax,
            SyncPoint::End => self.end,
        }
    }

    /// Set a point's value.
    pub fn set(&mut self, point: SyncPoint, value: f64) {
        *self.slot_mut(point) = Some(value);
    }

    fn slot_mut(&mut self, point: SyncPoint) -> &mut Option<f64> {
        match point {
            SyncPoint::Start => &mut self.start,
            SyncPoint::Ready => &mut self.ready,
            SyncPoint::AttackPeak => &mut self.attack_peak,
            SyncPoint::StrokeStart => &mut self.stroke_start,
            SyncPoint::Stroke => &mut self.stroke,
            SyncPoint::StrokeEnd => &mut self.stroke_end,
            SyncPoint::Relax => &mut self.relax,
            SyncPoint::End => &mut self.end,
        }
    }

    /// The point where the attack phase ends: `attackPeak`, or the first
    /// stroke-side stand-in a channel supplied instead.
    pub fn attack_point(&self) -> Option<f64> {
        self.attack_peak
            .or(self.ready)
            .or(self.stroke_start)
            .or(self.stroke)
    }

    /// The point where the decay phase begins: `relax` or `strokeEnd`.
    pub fn relax_point(&self) -> Option<f64> {
        self.relax.or(self.stroke_end)
    }

    /// Fold negative values: `-t` is a reference to "t seconds after the
    /// block's own global start", which is the same basis positive values
    /// already use.
    pub fn resolve_block_relative(&mut self) {
        for point in SyncPoint::ALL {
            if let Some(v) = self.get(point) {
                if v < 0.0 {
                    self.set(point, -v);
                }
            }
        }
    }

    /// Fill missing points from the channel's default phase durations.
    ///
    /// Only absent points are written; caller-supplied values are left
    /// untouched so a contradictory set is caught by [`Timing::rebase`]
    /// instead of being silently repaired.
    pub fn fill_defaults(&mut self, d: &crate::PhaseDefaults) {
        let start = self.start.unwrap_or(0.0);
        self.start = Some(start);

        let end = match self.end {
            Some(e) => e,
            None => {
                let e = if let Some(r) = self.relax_point() {
                    r + d.relax
                } else if let Some(a) = self.attack_point() {
                    a + d.hold + d.relax
                } else {
                    start + d.attack + d.hold + d.relax
                };
                self.end = Some(e);
                e
            }
        };

        if self.attack_point().is_none() {
            self.attack_peak = Some((start + d.attack).min(end).max(start));
        }
        if self.relax_point().is_none() {
            let a = self.attack_point().unwrap_or(start);
            self.relax = Some((end - d.relax).max(a).min(end));
        }
    }

    /// Subtract the instruction's own `start` offset from every other
    /// point, making each value a duration relative to the instruction's
    /// global start. Returns `false` if any point lands negative — the
    /// instruction is malformed and must be discarded.
    pub fn rebase(&mut self) -> bool {
        let start = match self.start {
            Some(s) => s,
            None => return false,
        };
        let mut ok = true;
        for point in SyncPoint::ALL {
            if point == SyncPoint::Start {
                continue;
            }
            if let Some(v) = self.get(point) {
                let rebased = v - start;
                self.set(point, rebased);
                if rebased < -NEG_EPS {
                    ok = false;
                }
            }
        }
        ok
    }

    /// Whether the canonical envelope points are all present and usable.
    pub fn is_resolved(&self) -> bool {
        match (self.start, self.attack_point(), self.relax_point(), self.end) {
            (Some(s), Some(a), Some(r), Some(e)) => {
                s.is_finite() && a.is_finite() && r.is_finite() && e.is_finite()
            }
            _ => false,
        }
    }

    /// Duration from the instruction's own start to its end.
    pub fn duration(&self) -> f64 {
        match (self.start, self.end) {
            (Some(s), Some(e)) => e - s,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhaseDefaults;

    const D: PhaseDefaults = PhaseDefaults { attack: 0.25, hold: 0.5, relax: 0.25 };

    #[test]
    fn ease_endpoints_and_midpoint() {
        assert!(ease(0.0).abs() < 1e-6);
        assert!((ease(1.0) - 1.0).abs() < 1e-6);
        assert!((ease(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ease_clamps_out_of_range() {
        assert_eq!(ease(-2.0), ease(0.0));
        assert_eq!(ease(3.0), ease(1.0));
    }

    #[test]
    fn sync_point_names_round_trip() {
        for p in SyncPoint::ALL {
            assert_eq!(SyncPoint::from_name(p.name()), Some(p));
        }
        assert_eq!(SyncPoint::from_name("ATTACKPEAK"), Some(SyncPoint::AttackPeak));
        assert_eq!(SyncPoint::from_name("midpoint"), None);
    }

    #[test]
    fn fill_defaults_from_span() {
        let mut t = Timing::span(0.0, 1.0);
        t.fill_defaults(&D);
        assert_eq!(t.start, Some(0.0));
        assert_eq!(t.attack_peak, Some(0.25));
        assert_eq!(t.relax, Some(0.75));
        assert_eq!(t.end, Some(1.0));
        assert!(t.is_resolved());
    }

    #[test]
    fn fill_defaults_from_nothing() {
        let mut t = Timing::new();
        t.fill_defaults(&D);
        assert_eq!(t.start, Some(0.0));
        assert_eq!(t.end, Some(1.0)); // attack + hold + relax
    }

    #[test]
    fn fill_defaults_respects_given_points() {
        let mut t = Timing::span(0.0, 2.0);
        t.attack_peak = Some(1.0);
        t.relax = Some(1.0);
        t.fill_defaults(&D);
        assert_eq!(t.attack_peak, Some(1.0));
        assert_eq!(t.relax, Some(1.0));
    }

    #[test]
    fn fill_defaults_short_span_keeps_order() {
        let mut t = Timing::span(0.0, 0.1);
        t.fill_defaults(&D);
        let a = t.attack_point().unwrap();
        let r = t.relax_point().unwrap();
        assert!(0.0 <= a && a <= r && r <= 0.1);
    }

    #[test]
    fn stroke_aliases_feed_attack_and_relax() {
        let mut t = Timing::span(0.0, 2.0);
        t.stroke_start = Some(0.5);
        t.stroke_end = Some(1.5);
        t.fill_defaults(&D);
        assert_eq!(t.attack_point(), Some(0.5));
        assert_eq!(t.relax_point(), Some(1.5));
    }

    #[test]
    fn negative_values_fold_to_block_origin() {
        let mut t = Timing::span(0.5, -2.0);
        t.resolve_block_relative();
        assert_eq!(t.end, Some(2.0));
        assert_eq!(t.start, Some(0.5));
    }

    #[test]
    fn rebase_shifts_onto_start() {
        let mut t = Timing::span(0.5, 1.5);
        t.attack_peak = Some(0.75);
        t.relax = Some(1.25);
        t.fill_defaults(&D);
        assert!(t.rebase());
        assert_eq!(t.start, Some(0.5));
        assert_eq!(t.attack_peak, Some(0.25));
        assert_eq!(t.relax, Some(0.75));
        assert_eq!(t.end, Some(1.0));
    }

    #[test]
    fn rebase_flags_point_before_start() {
        let mut t = Timing::span(1.0, 2.0);
        t.attack_peak = Some(0.5); // earlier than start
        assert!(!t.rebase());
    }
}
