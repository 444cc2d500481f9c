//! Core IR types for the embody behavior realizer.
//!
//! This crate defines the intermediate representation shared by the
//! scheduling engine and the block parsers: channels, sync points,
//! instructions, blocks, and the face/gesture lexicon. Block parsers emit
//! IR, and the realization engine consumes IR.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod block;
mod channel;
mod defaults;
mod instruction;
mod lexicon;
mod sync;
mod value;

pub use block::{Block, Composition};
pub use channel::Channel;
pub use defaults::{DefaultDurations, PhaseDefaults};
pub use instruction::{Hand, Instruction, Lifecycle, Params};
pub use lexicon::{FaceLexeme, LexemeKey, Lexicon, ACTION_UNITS};
pub use sync::{ease, SyncPoint, Timing};
pub use value::{Value, MAX_WEIGHTS};
