//! Per-channel instruction queue.

use em_ir::{Instruction, Lifecycle};
use tracing::warn;

/// Tolerance when checking the non-overlap invariant; envelopes that meet
/// exactly (hand-off) are legal.
const OVERLAP_EPS: f64 = 1e-9;

/// Ordered queue of not-yet-dispatched instructions for one channel.
///
/// Invariants: sorted non-decreasing by `global_start`, and adjacent
/// instructions never overlap (`end_i <= start_{i+1}`). Violations of the
/// second are logged but never auto-corrected; they signal an upstream
/// composition bug.
#[derive(Clone, Debug, Default)]
pub struct ChannelQueue {
    items: Vec<Instruction>,
}

impl ChannelQueue {
    /// New empty queue.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert keeping sort order, scanning backward from the tail (new
    /// instructions usually land at the end).
    pub fn insert(&mut self, instruction: Instruction) {
        let mut pos = self.items.len();
        while pos > 0 && self.items[pos - 1].global_start > instruction.global_start {
            pos -= 1;
        }

        if pos > 0 && self.items[pos - 1].global_end > instruction.global_start + OVERLAP_EPS {
            warn!(
                channel = instruction.channel.name(),
                prev_end = self.items[pos - 1].global_end,
                next_start = instruction.global_start,
                "channel queue overlap: scheduled instruction begins before its predecessor ends"
            );
        }
        if pos < self.items.len()
            && instruction.global_end > self.items[pos].global_start + OVERLAP_EPS
        {
            warn!(
                channel = instruction.channel.name(),
                prev_end = instruction.global_end,
                next_start = self.items[pos].global_start,
                "channel queue overlap: scheduled instruction ends after its successor starts"
            );
        }

        self.items.insert(pos, instruction);
    }

    /// Remove and hand out every instruction due at `now`, front to back.
    /// Each handed-out instruction is marked `Active`; the queue keeps no
    /// reference to it afterwards. Idempotent: a second call with the same
    /// `now` finds nothing due.
    pub fn drain_due(&mut self, now: f64, mut on_activate: impl FnMut(Instruction)) {
        while let Some(first) = self.items.first() {
            if first.global_start <= now {
                let mut instruction = self.items.remove(0);
                instruction.state = Lifecycle::Active;
                on_activate(instruction);
            } else {
                break;
            }
        }
    }

    /// Explicit invariant scan: sorted and non-overlapping.
    pub fn check_consistency(&self) -> bool {
        self.items.windows(2).all(|w| {
            w[0].global_start <= w[1].global_start
                && w[0].global_end <= w[1].global_start + OVERLAP_EPS
        })
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of queued instructions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate queued instructions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.items.iter()
    }
}
