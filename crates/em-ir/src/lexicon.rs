//! Facial lexeme library.
//!
//! Maps BML facial lexeme names (`BROW_RAISER`, `JAW_DROP`, ...) to sparse
//! action-unit weight templates. The store owns all template data; callers
//! hold keys.

use arrayvec::{ArrayString, ArrayVec};
use slotmap::SlotMap;

use crate::value::{Value, MAX_WEIGHTS};

slotmap::new_key_type! {
    /// Key into a [`Lexicon`].
    pub struct LexemeKey;
}

/// Number of action units in a dense face weight vector.
pub const ACTION_UNITS: usize = MAX_WEIGHTS;

/// A sparse action-unit weight template for one facial lexeme.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceLexeme {
    /// Lexeme name as it appears in blocks.
    pub name: ArrayString<24>,
    /// `(action_unit_index, weight)` pairs; indices < [`ACTION_UNITS`].
    pub weights: ArrayVec<(usize, f32), MAX_WEIGHTS>,
}

impl FaceLexeme {
    /// Build a lexeme from a name and sparse weight pairs. Entries with an
    /// out-of-range action-unit index are dropped.
    pub fn new(name: &str, weights: &[(usize, f32)]) -> Self {
        let mut n = ArrayString::new();
        for c in name.chars() {
            if n.try_push(c).is_err() {
                break;
            }
        }
        let mut w = ArrayVec::new();
        for &(idx, weight) in weights {
            if idx < ACTION_UNITS && w.try_push((idx, weight)).is_err() {
                break;
            }
        }
        Self { name: n, weights: w }
    }

    /// Densify into a weight vector scaled by `amount`.
    pub fn dense(&self, amount: f32) -> Value {
        let mut out = ArrayVec::<f32, MAX_WEIGHTS>::new();
        for _ in 0..ACTION_UNITS {
            out.push(0.0);
        }
        for &(idx, weight) in &self.weights {
            out[idx] = weight * amount;
        }
        Value::Weights(out)
    }
}

/// Keyed store of facial lexeme templates.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: SlotMap<LexemeKey, FaceLexeme>,
}

impl Lexicon {
    /// Empty lexicon.
    pub fn new() -> Self {
        Self { entries: SlotMap::with_key() }
    }

    /// Lexicon seeded with the common BML facial lexemes.
    ///
    /// Action-unit slots: 0 inner brow, 1 outer brow, 2 brow lowerer,
    /// 3 upper lid, 4 lip corner pull, 5 lip corner depress, 6 jaw,
    /// 7 lip press.
    pub fn standard() -> Self {
        let mut lx = Self::new();
        lx.add(FaceLexeme::new("BROW_RAISER", &[(0, 1.0), (1, 0.8)]));
        lx.add(FaceLexeme::new("BROW_LOWERER", &[(2, 1.0)]));
        lx.add(FaceLexeme::new("UPPER_LID_RAISER", &[(3, 1.0)]));
        lx.add(FaceLexeme::new("LIP_CORNER_PULLER", &[(4, 1.0)]));
        lx.add(FaceLexeme::new("LIP_CORNER_DEPRESSOR", &[(5, 1.0)]));
        lx.add(FaceLexeme::new("JAW_DROP", &[(6, 1.0)]));
        lx.add(FaceLexeme::new("LIP_PRESSOR", &[(7, 1.0)]));
        lx
    }

    /// Add a lexeme, returning its key.
    pub fn add(&mut self, lexeme: FaceLexeme) -> LexemeKey {
        self.entries.insert(lexeme)
    }

    /// Get a lexeme by key.
    pub fn get(&self, key: LexemeKey) -> Option<&FaceLexeme> {
        self.entries.get(key)
    }

    /// Find a lexeme by name, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&FaceLexeme> {
        self.entries
            .values()
            .find(|l| l.name.as_str().eq_ignore_ascii_case(name))
    }

    /// Number of lexemes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
