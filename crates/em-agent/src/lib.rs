//! Headless embodied-agent controller.
//!
//! Owns one scheduler, the live channel consumers, and an optional
//! autonomic planner, and distills them into a per-frame [`Pose`]
//! snapshot for a renderer. The agent is synchronous and clock-free:
//! drive it with `update(now)` once per frame and it replays
//! deterministically from a recorded call sequence.

use em_engine::consumers::{consumer_for, ChannelConsumer};
use em_engine::Planner;
use em_ir::{Value, ACTION_UNITS};
use tracing::debug;

// Re-export common types so callers don't need em-ir/em-engine directly.
pub use em_bml::BmlError;
pub use em_engine::{Mood, Scheduler};
pub use em_ir::{Block, Channel, Composition, DefaultDurations, Instruction, Lexicon, Timing};

/// Flat per-frame output snapshot consumed by a renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    /// Eyelid closure, 0 (open) to 1 (closed).
    pub blink: f32,
    /// Gaze offset (yaw, pitch) in normalized units.
    pub gaze: [f32; 2],
    /// Head rotation delta (pitch, yaw, roll).
    pub head: [f32; 3],
    /// Body lean.
    pub lean: f32,
    /// Facial action-unit weights.
    pub face: [f32; ACTION_UNITS],
}

impl Pose {
    /// The rest pose.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Write one channel value into the snapshot. Simultaneous facial
    /// instructions overlay by per-unit maximum; other channels assign.
    fn apply(&mut self, channel: Channel, value: &Value) {
        match (channel, value) {
            (Channel::Blink, Value::Scalar(v)) => self.blink = *v,
            (Channel::Gaze, Value::Vec2(v)) => self.gaze = *v,
            (Channel::Head, Value::Vec3(v)) => self.head = *v,
            (Channel::Posture, Value::Scalar(v)) => self.lean = *v,
            (Channel::Face, Value::Weights(w)) => {
                for (unit, weight) in w.iter().enumerate().take(ACTION_UNITS) {
                    self.face[unit] = self.face[unit].max(*weight);
                }
            }
            _ => {}
        }
    }
}

/// Headless agent: scheduler + consumers + planner behind one facade.
pub struct Agent {
    scheduler: Scheduler,
    lexicon: Lexicon,
    planner: Option<Planner>,
    active: [Option<Box<dyn ChannelConsumer>>; Channel::COUNT],
    pose: Pose,
    last_now: Option<f64>,
}

impl Agent {
    /// New agent with the standard lexicon and default durations, no
    /// autonomic planner.
    pub fn new() -> Self {
        Self::with_defaults(DefaultDurations::default())
    }

    /// New agent with an explicit default-duration table.
    pub fn with_defaults(defaults: DefaultDurations) -> Self {
        Self {
            scheduler: Scheduler::new(defaults),
            lexicon: Lexicon::standard(),
            planner: None,
            active: Default::default(),
            pose: Pose::neutral(),
            last_now: None,
        }
    }

    /// Enable the autonomic planner with a fixed seed.
    pub fn with_planner(mut self, seed: u64) -> Self {
        self.planner = Some(Planner::new(seed));
        self
    }

    /// Set the planner mood, if a planner is enabled.
    pub fn set_mood(&mut self, mood: Mood) {
        if let Some(p) = &mut self.planner {
            p.set_mood(mood);
        }
    }

    /// Submit a behavior block at time `now`.
    ///
    /// A successful `Replace` also cuts every live envelope to its decay
    /// phase, so output glides to neutral instead of snapping while the
    /// replacement waits its turn.
    pub fn submit(&mut self, block: Block, now: f64) -> bool {
        let replace = block.composition == Composition::Replace;
        let accepted = self.scheduler.submit(block, now);
        if accepted && replace {
            for consumer in self.active.iter_mut().flatten() {
                consumer.interrupt();
            }
        }
        accepted
    }

    /// Parse and submit a JSON block description.
    pub fn submit_bml(&mut self, json: &str, now: f64) -> Result<bool, BmlError> {
        let block = em_bml::parse_block(json)?;
        Ok(self.submit(block, now))
    }

    /// Advance to `now` and return the resulting pose snapshot.
    ///
    /// Runs the planner, dispatches due instructions into consumers
    /// (snapshotting hand-off values for continuity), advances every live
    /// envelope, and drops the ones that finished.
    pub fn update(&mut self, now: f64) -> &Pose {
        let dt = self.last_now.map_or(0.0, |t| (now - t).max(0.0));
        self.last_now = Some(now);

        if let Some(planner) = &mut self.planner {
            if let Some(filler) = planner.update(dt) {
                self.scheduler.submit(filler, now);
            }
        }

        let Self { scheduler, lexicon, active, .. } = self;
        let mut fresh = [false; Channel::COUNT];
        scheduler.tick(now, |channel, instruction| {
            let idx = channel.index();
            let handoff = active[idx].as_ref().map(|c| c.value());
            match consumer_for(&instruction, lexicon, handoff) {
                Some(mut consumer) => {
                    // Activation may fall between frames; catch the new
                    // envelope up to the actual activation lag.
                    let lag = now - instruction.global_start;
                    if lag > 0.0 {
                        consumer.advance(lag);
                    }
                    active[idx] = Some(consumer);
                    fresh[idx] = true;
                }
                None => debug!(
                    channel = channel.name(),
                    "activated instruction has no embedded consumer"
                ),
            }
        });

        self.pose = Pose::neutral();
        for (idx, slot) in self.active.iter_mut().enumerate() {
            if let Some(consumer) = slot {
                let value = if fresh[idx] { consumer.value() } else { consumer.advance(dt) };
                self.pose.apply(Channel::ALL[idx], &value);
                if consumer.is_done() {
                    *slot = None;
                }
            }
        }
        &self.pose
    }

    /// The most recent pose snapshot.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// The underlying scheduler (inspection only).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The live consumer on one channel, if any.
    pub fn active_on(&self, channel: Channel) -> Option<&dyn ChannelConsumer> {
        self.active[channel.index()].as_deref()
    }

    /// The lexeme library, for registering custom expressions.
    pub fn lexicon_mut(&mut self) -> &mut Lexicon {
        &mut self.lexicon
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}
