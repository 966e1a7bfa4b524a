pub mod context;

pub use self::context::*;

use crate::error::Result;
use crate::probability_store::ProbabilityStore;

/// A bit predictor over a shared probability store.
/// `predict` and `update` are always called in pairs, in that order.
pub trait Model {
    /// Probability of the next bit being 1, in stretched (logit) space
    fn predict(&self, store: &ProbabilityStore) -> Result<f64>;
    fn update(&mut self, bit: u8, store: &mut ProbabilityStore);
}

/// Multiplicative hash used for all context keys.
/// Part of the compressed format: encoder and decoder must agree bit for bit.
#[inline(always)]
pub fn hash(mut value: u32, shift: u32) -> u32 {
    const K_MUL: u32 = 0x9E35_A7BD;
    value ^= value >> shift;
    K_MUL.wrapping_mul(value) >> shift
}
