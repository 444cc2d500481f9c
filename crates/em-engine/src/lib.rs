//! Behavior scheduling and realization engine for embody.
//!
//! Accepts blocks of simultaneous behavior instructions, resolves their
//! composition against already-scheduled behavior, and promotes due
//! instructions to per-channel consumers once per frame tick.

mod envelope;
mod planner;
mod queue;
mod scheduler;
mod stack;

pub mod consumers;

pub use envelope::{Phase, PhaseEnvelope};
pub use planner::{Mood, Planner};
pub use queue::ChannelQueue;
pub use scheduler::Scheduler;
pub use stack::BlockStack;
