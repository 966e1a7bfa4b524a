use serde::{Deserialize, Serialize};

use super::{hash, Model};
use crate::error::Result;
use crate::logistic::stretch;
use crate::probability_store::{Cell, ProbabilityStore, COUNT_MAX, P_MAX};

const WORD_SEED: u64 = 2_166_136_261; // FNV offset basis
const WORD_MUL: u64 = 16_777_619; // FNV prime
const WORD_MAGIC: u32 = 1337;

/// How completed bytes fold into a model's rolling history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextKind {
    /// Order-n bytes, bit i of `mask` selects the byte i positions back
    Bytes { mask: u8 },
    /// Hash of the current alphanumeric word, case-insensitive
    Word,
}

impl ContextKind {
    /// Contiguous order-n context, the last `n` bytes
    pub fn order(n: u32) -> Self {
        assert!(n <= 8, "history only holds 8 bytes");
        let mask = if n == 8 { u8::MAX } else { (1u8 << n) - 1 };
        Self::Bytes { mask }
    }
}

/// Predicts bits from the slot keyed by the hashed (masked) history
/// and the bits of the current byte seen so far.
#[derive(Clone, Debug)]
pub struct ContextModel {
    kind: ContextKind,
    bit_mask: u64,
    magic: u32,
    history: u64,
    ctx_hash: u32,
    bit_path: u32,
}

impl ContextModel {
    pub fn new(kind: ContextKind) -> Self {
        let (bit_mask, magic, history) = match kind {
            ContextKind::Bytes { mask } => (expand_mask(mask), hash(u32::from(mask), 2), 0),
            ContextKind::Word => (u64::MAX, hash(WORD_MAGIC, 2), WORD_SEED),
        };
        Self { kind, bit_mask, magic, history, ctx_hash: 0, bit_path: 1 }
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn context_hash(&self) -> u32 {
        self.ctx_hash
    }

    pub fn bit_path(&self) -> u32 {
        self.bit_path
    }

    #[inline(always)]
    fn key(&self) -> u32 {
        self.ctx_hash ^ self.bit_path
    }

    fn fold_byte(&mut self, byte: u8) {
        self.history = match self.kind {
            ContextKind::Bytes { .. } => (self.history << 8) | u64::from(byte),
            ContextKind::Word if byte.is_ascii_alphanumeric() => {
                let c = u64::from(byte.to_ascii_lowercase());
                (self.history ^ c).wrapping_mul(WORD_MUL) >> 16
            }
            ContextKind::Word => WORD_SEED,
        };

        let masked = self.history & self.bit_mask;
        let lo = hash(masked as u32, 3);
        let hi = hash((masked >> 32) as u32, 3);
        self.ctx_hash = hi
            .wrapping_mul(9)
            .wrapping_add(lo)
            .wrapping_add(1)
            .wrapping_mul(self.magic);
    }
}

impl Model for ContextModel {
    #[inline(always)]
    fn predict(&self, store: &ProbabilityStore) -> Result<f64> {
        // exact 0 or 1 can't be stretched
        let prob = store.get(self.key()).prob().clamp(1, P_MAX - 1);
        stretch(f64::from(prob) / f64::from(P_MAX))
    }

    fn update(&mut self, bit: u8, store: &mut ProbabilityStore) {
        debug_assert!(bit <= 1);
        let key = self.key();
        let cell = store.get(key);

        let count = (cell.count() + 1).min(COUNT_MAX);
        let rate = f64::from(count).powf(0.72) + 0.19;
        let prob = f64::from(cell.prob());
        let p_max = f64::from(P_MAX);
        let delta = (p_max * (f64::from(bit) - prob / p_max) / rate) as i64; // truncates toward 0
        let prob = (i64::from(cell.prob()) + delta).clamp(0, i64::from(P_MAX));
        store.set(key, Cell::new(prob as u32, count));

        self.bit_path = (self.bit_path << 1) | u32::from(bit);
        if self.bit_path >= 256 {
            self.fold_byte((self.bit_path & 0xff) as u8);
            self.bit_path = 1;
        }
    }
}

/// Expands a byte mask into a bit mask over the 64-bit history,
/// every set bit selects a whole byte.
pub fn expand_mask(byte_mask: u8) -> u64 {
    (0..8)
        .filter(|&i| (byte_mask >> i) & 1 == 1)
        .fold(0, |acc, i| acc | (0xff << (i * 8)))
}
