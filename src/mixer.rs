//! Logistic mixing of several models' stretched predictions.
//!
//! Every model has a slowly adapting global weight. On top of that each
//! (previous byte, partial byte) context gets its own faster weight vector,
//! allocated the first time the context is learned from and seeded with the
//! global weights at that moment.

use crate::error::{Error, Result};
use crate::logistic::squash;
use crate::models::Model;
use crate::probability_store::ProbabilityStore;

pub const LR_GLOBAL: f64 = 0.0004;
pub const LR_CTX: f64 = 0.022;
/// Damping of the context weights against the global ones
const CTX_BLEND: f64 = 0.3;

const BIT_PATHS: usize = 255; // 1..=255
const CTX_SLOTS: usize = 256 * BIT_PATHS;
const UNALLOCATED: u32 = u32::MAX;

pub struct Mixer<M> {
    store: ProbabilityStore,
    models: Vec<M>,
    weights: Vec<f64>,
    ctx_slots: Vec<u32>,    // offsets into ctx_weights
    ctx_weights: Vec<f64>,  // arena, one vector per allocated slot
    inputs: Vec<f64>,       // stretched predictions of the last predict
    p: f64,                 // output of the last predict
    byte_ctx: u32,
    bit_path: u32,
}

impl<M: Model> Mixer<M> {
    pub fn new(store: ProbabilityStore, models: Vec<M>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::BadConfig("mixer needs at least one model"));
        }
        let n = models.len();
        Ok(Self {
            store,
            models,
            weights: vec![1.0 / n as f64; n],
            ctx_slots: vec![UNALLOCATED; CTX_SLOTS],
            ctx_weights: Vec::new(),
            inputs: vec![0.0; n],
            p: 0.5,
            byte_ctx: 0,
            bit_path: 1,
        })
    }

    #[inline(always)]
    fn slot(&self) -> usize {
        self.byte_ctx as usize * BIT_PATHS + (self.bit_path as usize - 1)
    }

    /// Probability of the next bit being 1, already squashed into (0, 1)
    pub fn predict(&mut self) -> Result<f64> {
        let n = self.models.len();
        let offset = self.ctx_slots[self.slot()];
        let ctx = (offset != UNALLOCATED).then(|| &self.ctx_weights[offset as usize..][..n]);

        let mut sum = 0.0;
        for (i, model) in self.models.iter().enumerate() {
            let x = model.predict(&self.store)?;
            self.inputs[i] = x;
            let w = match ctx {
                Some(ctx) => ctx[i] * CTX_BLEND + self.weights[i],
                None => self.weights[i],
            };
            sum += w * x;
        }

        self.p = squash(sum);
        Ok(self.p)
    }

    /// Learns from the bit that followed the last `predict`
    pub fn learn(&mut self, bit: u8) {
        debug_assert!(bit <= 1);
        let n = self.models.len();
        let slot = self.slot();
        if self.ctx_slots[slot] == UNALLOCATED {
            self.ctx_slots[slot] = self.ctx_weights.len() as u32;
            self.ctx_weights.extend_from_slice(&self.weights);
        }
        let offset = self.ctx_slots[slot] as usize;
        let ctx = &mut self.ctx_weights[offset..offset + n];

        let err = f64::from(bit) - self.p;
        for (i, model) in self.models.iter_mut().enumerate() {
            model.update(bit, &mut self.store);
            self.weights[i] += LR_GLOBAL * err * self.inputs[i];
            ctx[i] += LR_CTX * err * self.inputs[i];
        }

        self.bit_path = (self.bit_path << 1) | u32::from(bit);
        if self.bit_path >= 256 {
            self.byte_ctx = self.bit_path & 0xff;
            self.bit_path = 1;
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Context weights for `(previous byte, bit path)`, `None` if never learned
    pub fn context_weights(&self, byte_ctx: u8, bit_path: u8) -> Option<&[f64]> {
        assert!(bit_path >= 1, "bit paths carry a leading 1");
        let slot = usize::from(byte_ctx) * BIT_PATHS + usize::from(bit_path - 1);
        let offset = self.ctx_slots[slot];
        (offset != UNALLOCATED).then(|| &self.ctx_weights[offset as usize..][..self.models.len()])
    }

    pub fn allocated_contexts(&self) -> usize {
        self.ctx_weights.len() / self.models.len()
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }

    pub fn store(&self) -> &ProbabilityStore {
        &self.store
    }
}
