//! Block scheduling: composition resolution and per-frame dispatch.
//!
//! `submit` places an inbound block against already-scheduled behavior
//! (merge/append/replace), resolves block-relative timing to the absolute
//! timeline, and enqueues instructions per channel. `tick` promotes due
//! instructions to the activation callback once per frame.

use em_ir::{Block, Channel, Composition, DefaultDurations, Instruction};
use tracing::{debug, warn};

use crate::queue::ChannelQueue;
use crate::stack::BlockStack;

/// Owns the block stack and one instruction queue per channel.
///
/// Single-threaded and clock-free: `now` is supplied by the caller and must
/// be monotonically non-decreasing, which makes a scheduler replayable from
/// a recorded call sequence. Multiple independent schedulers coexist freely.
pub struct Scheduler {
    defaults: DefaultDurations,
    stack: BlockStack,
    queues: [ChannelQueue; Channel::COUNT],
}

impl Scheduler {
    /// New empty scheduler with the given default-duration table.
    pub fn new(defaults: DefaultDurations) -> Self {
        Self {
            defaults,
            stack: BlockStack::new(),
            queues: std::array::from_fn(|_| ChannelQueue::new()),
        }
    }

    /// Accept a block at time `now`.
    ///
    /// Returns `false` when the block is rejected as a no-op (no
    /// positive-duration instruction). Individual malformed instructions
    /// are logged and discarded without aborting the rest of the block.
    pub fn submit(&mut self, mut block: Block, now: f64) -> bool {
        // Fix/synchronize: fold block-origin references, fill missing
        // sync points from the per-channel defaults, derive the block end.
        for instruction in &mut block.instructions {
            instruction.timing.resolve_block_relative();
            instruction
                .timing
                .fill_defaults(self.defaults.for_channel(instruction.channel));
        }
        block.end = block
            .instructions
            .iter()
            .filter_map(|i| i.timing.end)
            .fold(0.0, f64::max);
        if block.end <= 0.0 {
            debug!(
                id = block.id.as_deref().unwrap_or(""),
                "rejecting block with no positive-duration instruction"
            );
            return false;
        }

        // Place by composition mode.
        let mut placement = block.composition;
        match placement {
            Composition::Merge => {
                block.global_start = now + block.start;
            }
            Composition::Overwrite => {
                warn!("legacy OVERWRITE composition; placing with MERGE semantics");
                block.global_start = now + block.start;
                placement = Composition::Merge;
            }
            Composition::Append => match self.stack.last_global_end() {
                Some(anchor) => {
                    block.global_start = anchor + block.start;
                }
                None => {
                    // Nothing to append after; fall back to merge placement.
                    block.global_start = now + block.start;
                    placement = Composition::Merge;
                }
            },
            Composition::Replace => {
                // If the front entry is already running, the replacement
                // waits for it; everything else goes now.
                block.global_start = if self.stack.first_is_active(now) {
                    self.stack
                        .first()
                        .map(|b| b.global_end)
                        .unwrap_or(now)
                } else {
                    now
                };
                for queue in &mut self.queues {
                    queue.clear();
                }
            }
        }
        block.global_end = block.global_start + block.end;

        // Resolve instruction timing and enqueue.
        let origin = block.global_start;
        for mut instruction in block.instructions.drain(..) {
            if !instruction.timing.rebase() || !instruction.timing.is_resolved() {
                warn!(
                    channel = instruction.channel.name(),
                    "discarding malformed instruction (sync point before start)"
                );
                continue;
            }
            let offset = instruction.timing.start.unwrap_or(0.0);
            instruction.global_start = origin + offset;
            instruction.global_end = origin + offset + instruction.timing.end.unwrap_or(0.0);
            self.queues[instruction.channel.index()].insert(instruction);
        }

        match placement {
            Composition::Merge | Composition::Overwrite => self.stack.insert_sorted(block),
            Composition::Append => self.stack.push_tail(block),
            Composition::Replace => self.stack.replace_with(block),
        }
        true
    }

    /// Advance to `now`: retire started blocks, then activate every due
    /// instruction via the callback, exactly once per instruction.
    ///
    /// Channels activate in `Channel::ALL` order; within one channel,
    /// activation follows queue order. Idempotent for a repeated `now`.
    pub fn tick(&mut self, now: f64, mut on_activate: impl FnMut(Channel, Instruction)) {
        self.stack.pop_started(now);
        for channel in Channel::ALL {
            self.queues[channel.index()].drain_due(now, |instruction| {
                on_activate(channel, instruction);
            });
        }
    }

    /// The queue for one channel.
    pub fn queue(&self, channel: Channel) -> &ChannelQueue {
        &self.queues[channel.index()]
    }

    /// The block stack.
    pub fn stack(&self) -> &BlockStack {
        &self.stack
    }

    /// Total not-yet-dispatched instructions across all channels.
    pub fn pending_len(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DefaultDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_ir::{Instruction, Timing};

    fn face_block(start: f64, end: f64) -> Block {
        Block::new().push(Instruction::face(Timing::span(start, end), "BROW_RAISER", 0.3))
    }

    #[test]
    fn merge_places_relative_to_now() {
        // Scenario: face {start:0, end:1} merged at now=5.
        let mut s = Scheduler::default();
        assert!(s.submit(face_block(0.0, 1.0), 5.0));

        let q = s.queue(Channel::Face);
        assert_eq!(q.len(), 1);
        let i = q.iter().next().unwrap();
        assert_eq!(i.global_start, 5.0);
        assert_eq!(i.global_end, 6.0);
    }

    #[test]
    fn tick_before_submit_then_exactly_one_activation() {
        let mut s = Scheduler::default();

        let mut count = 0;
        s.tick(5.5, |_, _| count += 1);
        assert_eq!(count, 0);

        assert!(s.submit(face_block(0.0, 1.0), 5.0));
        s.tick(5.0, |ch, i| {
            assert_eq!(ch, Channel::Face);
            assert_eq!(i.global_start, 5.0);
            count += 1;
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn append_anchors_on_previous_block_end() {
        // Scenario: two APPEND blocks at now=0; first end=2, second 0..1.
        let mut s = Scheduler::default();
        let first = face_block(0.0, 2.0).composed(Composition::Append);
        let second = Block::new()
            .composed(Composition::Append)
            .push(Instruction::blink(Timing::span(0.0, 1.0), 1.0));
        assert!(s.submit(first, 0.0));
        assert!(s.submit(second, 0.0));

        let i = s.queue(Channel::Blink).iter().next().unwrap();
        assert_eq!(i.global_start, 2.0);
        assert_eq!(i.global_end, 3.0);
    }

    #[test]
    fn append_on_empty_stack_falls_back_to_merge() {
        let mut s = Scheduler::default();
        assert!(s.submit(face_block(0.0, 1.0).composed(Composition::Append), 3.0));
        let i = s.queue(Channel::Face).iter().next().unwrap();
        assert_eq!(i.global_start, 3.0);
    }

    #[test]
    fn merge_keeps_queues_sorted() {
        let mut s = Scheduler::default();
        s.submit(face_block(2.0, 3.0), 0.0);
        s.submit(face_block(0.0, 1.0), 0.0);
        s.submit(face_block(1.0, 2.0), 0.0);
        assert!(s.queue(Channel::Face).check_consistency());
        let starts: Vec<f64> = s.queue(Channel::Face).iter().map(|i| i.global_start).collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn replace_evicts_everything_queued() {
        let mut s = Scheduler::default();
        s.submit(face_block(0.5, 1.5), 0.0);
        s.submit(
            Block::new().push(Instruction::blink(Timing::span(0.2, 0.4), 1.0)),
            0.0,
        );
        assert_eq!(s.pending_len(), 2);

        let replacement = Block::new()
            .composed(Composition::Replace)
            .push(Instruction::posture(Timing::span(0.0, 2.0), 0.5));
        assert!(s.submit(replacement, 0.1));

        assert_eq!(s.pending_len(), 1);
        assert_eq!(s.stack().len(), 1);
        let i = s.queue(Channel::Posture).iter().next().unwrap();
        assert_eq!(i.global_start, 0.1);

        // Nothing from before the replace ever activates.
        let mut activated = Vec::new();
        s.tick(10.0, |ch, _| activated.push(ch));
        assert_eq!(activated, vec![Channel::Posture]);
    }

    #[test]
    fn replace_waits_for_running_front_block() {
        let mut s = Scheduler::default();
        // Block running 0..2 (front entry active at now=1).
        s.submit(face_block(0.0, 2.0), 0.0);

        let replacement = Block::new()
            .composed(Composition::Replace)
            .push(Instruction::blink(Timing::span(0.0, 0.5), 1.0));
        assert!(s.submit(replacement, 1.0));

        let i = s.queue(Channel::Blink).iter().next().unwrap();
        assert_eq!(i.global_start, 2.0);
    }

    #[test]
    fn overwrite_places_like_merge() {
        let mut s = Scheduler::default();
        assert!(s.submit(face_block(0.0, 1.0).composed(Composition::Overwrite), 4.0));
        let i = s.queue(Channel::Face).iter().next().unwrap();
        assert_eq!(i.global_start, 4.0);
    }

    #[test]
    fn empty_block_is_rejected() {
        let mut s = Scheduler::default();
        assert!(!s.submit(Block::new(), 0.0));
        assert_eq!(s.stack().len(), 0);
    }

    #[test]
    fn zero_duration_block_is_rejected() {
        let mut s = Scheduler::default();
        let b = Block::new().push(Instruction::blink(Timing::span(0.0, 0.0), 1.0));
        assert!(!s.submit(b, 0.0));
    }

    #[test]
    fn malformed_instruction_discarded_rest_survives() {
        let mut s = Scheduler::default();
        let mut bad = Timing::span(1.0, 2.0);
        bad.attack_peak = Some(0.2); // before its own start
        let b = Block::new()
            .push(Instruction::blink(bad, 1.0))
            .push(Instruction::posture(Timing::span(0.0, 1.0), 0.2));
        assert!(s.submit(b, 0.0));
        assert_eq!(s.queue(Channel::Blink).len(), 0);
        assert_eq!(s.queue(Channel::Posture).len(), 1);
    }

    #[test]
    fn negative_sync_is_block_origin_reference() {
        let mut s = Scheduler::default();
        // end = -1.5 means "1.5s after the block's own global start".
        let b = Block::new().push(Instruction::blink(Timing::span(0.0, -1.5), 1.0));
        assert!(s.submit(b, 2.0));
        let i = s.queue(Channel::Blink).iter().next().unwrap();
        assert_eq!(i.global_start, 2.0);
        assert_eq!(i.global_end, 3.5);
    }

    #[test]
    fn block_start_offsets_whole_block() {
        let mut s = Scheduler::default();
        assert!(s.submit(face_block(0.0, 1.0).starting_at(0.5), 1.0));
        let i = s.queue(Channel::Face).iter().next().unwrap();
        assert_eq!(i.global_start, 1.5);
        assert_eq!(i.global_end, 2.5);
    }

    #[test]
    fn tick_is_idempotent() {
        let mut s = Scheduler::default();
        s.submit(face_block(0.0, 1.0), 0.0);

        let mut first = 0;
        s.tick(0.0, |_, _| first += 1);
        let mut second = 0;
        s.tick(0.0, |_, _| second += 1);
        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert!(s.stack().is_empty());
    }

    #[test]
    fn started_blocks_are_popped_even_while_running() {
        let mut s = Scheduler::default();
        s.submit(face_block(0.0, 5.0), 0.0);
        assert_eq!(s.stack().len(), 1);
        s.tick(0.1, |_, _| {});
        assert!(s.stack().is_empty());
    }

    #[test]
    fn channels_activate_in_canonical_order() {
        let mut s = Scheduler::default();
        let b = Block::new()
            .push(Instruction::posture(Timing::span(0.0, 1.0), 0.1))
            .push(Instruction::blink(Timing::span(0.0, 0.2), 1.0))
            .push(Instruction::face(Timing::span(0.0, 1.0), "JAW_DROP", 0.4));
        s.submit(b, 0.0);

        let mut order = Vec::new();
        s.tick(0.0, |ch, _| order.push(ch));
        assert_eq!(order, vec![Channel::Blink, Channel::Face, Channel::Posture]);
    }
}
