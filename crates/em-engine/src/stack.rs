//! Ordered stack of scheduled blocks.

use em_ir::Block;

/// Ordered list of placed blocks.
///
/// Kept non-decreasing by `global_start` for merge placement; append
/// pushes at the tail, replace clears and installs a sole entry. Blocks
/// exist only to compute instruction offsets, so the dispatcher discards
/// them once their start has passed, regardless of their end.
#[derive(Clone, Debug, Default)]
pub struct BlockStack {
    blocks: Vec<Block>,
}

impl BlockStack {
    /// New empty stack.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Insert keeping the stack sorted by `global_start` (single
    /// insertion-sort pass from the tail).
    pub fn insert_sorted(&mut self, block: Block) {
        let mut pos = self.blocks.len();
        while pos > 0 && self.blocks[pos - 1].global_start > block.global_start {
            pos -= 1;
        }
        self.blocks.insert(pos, block);
    }

    /// Push at the tail (append placement).
    pub fn push_tail(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Clear the stack and install `block` as the sole entry.
    pub fn replace_with(&mut self, block: Block) {
        self.blocks.clear();
        self.blocks.push(block);
    }

    /// The last block's `global_end` (append anchor), if any.
    pub fn last_global_end(&self) -> Option<f64> {
        self.blocks.last().map(|b| b.global_end)
    }

    /// Whether the front entry's scheduled window covers `now`.
    pub fn first_is_active(&self, now: f64) -> bool {
        self.blocks.first().is_some_and(|b| b.is_active(now))
    }

    /// The front entry, if any.
    pub fn first(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Pop every block whose `global_start` has passed. Idempotent.
    pub fn pop_started(&mut self, now: f64) {
        while let Some(first) = self.blocks.first() {
            if first.global_start <= now {
                self.blocks.remove(0);
            } else {
                break;
            }
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Number of stacked blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate stacked blocks in order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}
