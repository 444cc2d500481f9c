//! Autonomic filler behavior planner.
//!
//! A coarse four-mood state machine that synthesizes small merge blocks
//! (blinks, gaze saccades, brow raises) on randomized countdown timers.
//! It only exercises `Merge` submission; the scheduling core does not
//! depend on it for correctness.

use em_ir::{Block, Instruction, Timing};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Coarse interaction state, set by the surrounding application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mood {
    #[default]
    Waiting,
    Processing,
    Speaking,
    Listening,
}

/// Synthesizes filler blocks between externally supplied ones.
///
/// Always seeded, so a planner-driven agent replays deterministically.
pub struct Planner {
    rng: SmallRng,
    mood: Mood,
    blink_in: f64,
    saccade_in: f64,
    brow_in: f64,
}

impl Planner {
    /// New planner with a fixed seed.
    pub fn new(seed: u64) -> Self {
        let mut p = Self {
            rng: SmallRng::seed_from_u64(seed),
            mood: Mood::Waiting,
            blink_in: 0.0,
            saccade_in: 0.0,
            brow_in: 0.0,
        };
        p.blink_in = p.next_blink_interval();
        p.saccade_in = p.next_saccade_interval();
        p.brow_in = p.next_brow_interval();
        p
    }

    /// Current mood.
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Change mood. Timers keep their remaining countdown; only the
    /// re-arm ranges change.
    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    /// Advance the countdown timers by `dt` seconds and synthesize at
    /// most one filler block. The caller submits it via `Merge`.
    pub fn update(&mut self, dt: f64) -> Option<Block> {
        self.blink_in -= dt;
        self.saccade_in -= dt;
        self.brow_in -= dt;

        if self.blink_in <= 0.0 {
            self.blink_in = self.next_blink_interval();
            return Some(
                Block::new().push(Instruction::blink(Timing::span(0.0, 0.25), 1.0)),
            );
        }
        if self.saccade_in <= 0.0 {
            self.saccade_in = self.next_saccade_interval();
            let amp = if self.mood == Mood::Waiting { 0.4 } else { 0.2 };
            let yaw = self.rng.gen_range(-amp..amp);
            let pitch = self.rng.gen_range(-amp * 0.5..amp * 0.5);
            return Some(Block::new().push(Instruction::gaze(
                Timing::span(0.0, 0.8),
                [yaw, pitch],
                0.6,
            )));
        }
        if self.mood == Mood::Speaking && self.brow_in <= 0.0 {
            self.brow_in = self.next_brow_interval();
            return Some(Block::new().push(Instruction::face(
                Timing::span(0.0, 1.2),
                "BROW_RAISER",
                0.2,
            )));
        }
        None
    }

    /// Breathing-rate blinking; tighter while listening.
    fn next_blink_interval(&mut self) -> f64 {
        match self.mood {
            Mood::Listening => self.rng.gen_range(1.0..3.0),
            _ => self.rng.gen_range(2.0..6.0),
        }
    }

    fn next_saccade_interval(&mut self) -> f64 {
        match self.mood {
            Mood::Waiting => self.rng.gen_range(1.5..4.0),
            _ => self.rng.gen_range(2.5..6.0),
        }
    }

    fn next_brow_interval(&mut self) -> f64 {
        self.rng.gen_range(3.0..8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(seed: u64, steps: usize) -> Vec<Block> {
        let mut p = Planner::new(seed);
        p.set_mood(Mood::Speaking);
        let mut out = Vec::new();
        for _ in 0..steps {
            if let Some(b) = p.update(0.1) {
                out.push(b);
            }
        }
        out
    }

    #[test]
    fn same_seed_same_blocks() {
        assert_eq!(collect(7, 400), collect(7, 400));
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(collect(1, 400), collect(2, 400));
    }

    #[test]
    fn produces_fillers_over_time() {
        let blocks = collect(42, 400); // 40 simulated seconds
        assert!(!blocks.is_empty());
        // Everything the planner emits merges.
        assert!(blocks
            .iter()
            .all(|b| b.composition == em_ir::Composition::Merge));
    }

    #[test]
    fn listening_blinks_more_often_than_waiting() {
        let count = |mood: Mood| {
            let mut p = Planner::new(9);
            p.set_mood(mood);
            let mut blinks = 0;
            for _ in 0..2000 {
                if let Some(b) = p.update(0.05) {
                    if b.for_channel(em_ir::Channel::Blink).count() > 0 {
                        blinks += 1;
                    }
                }
            }
            blinks
        };
        assert!(count(Mood::Listening) > count(Mood::Waiting));
    }
}
