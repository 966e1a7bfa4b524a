//! Bit loop driving mixer and coder, plus the length prefixed container.
//!
//! Container: `[decoded length: u32 big endian][coder payload]`, nothing else.

use tracing::debug;

use crate::config::{CoderWidth, ModelConfig};
use crate::entropy_coding::{
    io::{ACReader, ACWriter},
    ACRead, ACWrite, ArithmeticCoder, CoderWord,
};
use crate::error::{Error, Result};
use crate::mixer::Mixer;
use crate::models::ContextModel;
use crate::probability_store::{ProbabilityStore, P_MAX};
use crate::{unroll_collect, unroll_for};

const PREFIX_LEN: usize = 4;
/// Upper bound on what a (possibly corrupted) length prefix may preallocate
const MAX_PREALLOC: usize = 1 << 24;

/// One stream's worth of model state.
/// Encoder and decoder must be built from the same config and see the same
/// warm up bytes to stay in lockstep.
pub struct Compressor {
    mixer: Mixer<ContextModel>,
    width: CoderWidth,
}

impl Compressor {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        config.validate()?;
        let store = ProbabilityStore::new(config.table_bits);
        let models = config.contexts.iter().map(|&kind| ContextModel::new(kind)).collect();
        let mixer = Mixer::new(store, models)?;
        Ok(Self { mixer, width: config.width })
    }

    /// Probability of the next bit being 1, in (0, 1)
    #[inline(always)]
    pub fn predict(&mut self) -> Result<f64> {
        self.mixer.predict()
    }

    #[inline(always)]
    pub fn learn(&mut self, bit: u8) {
        self.mixer.learn(bit);
    }

    /// Trains on `bytes` without coding them
    pub fn warm_up(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            unroll_for!(bit in byte, {
                self.predict()?;
                self.learn(bit);
            });
        }
        Ok(())
    }

    #[inline(always)]
    fn coder_probability(&mut self) -> Result<u32> {
        let p = self.predict()?;
        Ok((p * f64::from(P_MAX)) as u32)
    }

    /// Codes `input` into `writer` with the configured coder width
    pub fn encode<W: ACWrite>(&mut self, input: &[u8], writer: W) -> Result<W> {
        match self.width {
            CoderWidth::U32 => self.encode_with::<u32, W>(input, writer),
            CoderWidth::U64 => self.encode_with::<u64, W>(input, writer),
        }
    }

    /// Decodes exactly `len` bytes from `reader`
    pub fn decode<R: ACRead>(&mut self, reader: R, len: usize) -> Result<Vec<u8>> {
        match self.width {
            CoderWidth::U32 => self.decode_with::<u32, R>(reader, len),
            CoderWidth::U64 => self.decode_with::<u64, R>(reader, len),
        }
    }

    fn encode_with<T: CoderWord, W: ACWrite>(&mut self, input: &[u8], writer: W) -> Result<W> {
        let mut ac = ArithmeticCoder::<T, W>::new_coder(writer);
        for &byte in input {
            unroll_for!(bit in byte, {
                ac.encode(bit, self.coder_probability()?)?;
                self.learn(bit);
            });
        }
        ac.flush()
    }

    fn decode_with<T: CoderWord, R: ACRead>(&mut self, reader: R, len: usize) -> Result<Vec<u8>> {
        let mut ac = ArithmeticCoder::<T, R>::new_decoder(reader)?;
        let mut output = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            unroll_collect!(bit into byte, {
                bit = ac.decode(self.coder_probability()?)?;
                self.learn(bit);
            });
            output.push(byte);
        }
        Ok(output)
    }
}

pub fn compress(input: &[u8], config: &ModelConfig) -> Result<Vec<u8>> {
    compress_with_dictionary(input, &[], config)
}

pub fn decompress(compressed: &[u8], config: &ModelConfig) -> Result<Vec<u8>> {
    decompress_with_dictionary(compressed, &[], config)
}

/// Like `compress`, with the models primed on `dictionary` first.
/// Decompression needs the very same dictionary.
pub fn compress_with_dictionary(
    input: &[u8],
    dictionary: &[u8],
    config: &ModelConfig,
) -> Result<Vec<u8>> {
    let len = u32::try_from(input.len()).map_err(|_| Error::TooLarge(input.len()))?;
    let mut compressor = Compressor::new(config)?;
    compressor.warm_up(dictionary)?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + input.len() / 2);
    buf.extend_from_slice(&len.to_be_bytes());
    let buf = compressor.encode(input, ACWriter::new(buf))?.into_inner();

    debug!(
        input = input.len(),
        output = buf.len(),
        dictionary = dictionary.len(),
        "compressed ({:.3} bpc)",
        bits_per_char(buf.len(), input.len())
    );
    Ok(buf)
}

pub fn decompress_with_dictionary(
    compressed: &[u8],
    dictionary: &[u8],
    config: &ModelConfig,
) -> Result<Vec<u8>> {
    let len = decoded_len(compressed)?;
    let payload = &compressed[PREFIX_LEN..];
    let mut compressor = Compressor::new(config)?;
    compressor.warm_up(dictionary)?;
    let output = compressor.decode(ACReader::new(payload), len)?;

    debug!(input = compressed.len(), output = output.len(), "decompressed");
    Ok(output)
}

/// Reads the length prefix of a compressed buffer
pub fn decoded_len(compressed: &[u8]) -> Result<usize> {
    let prefix: [u8; PREFIX_LEN] = compressed
        .get(..PREFIX_LEN)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or(Error::Truncated)?;
    Ok(u32::from_be_bytes(prefix) as usize)
}

fn bits_per_char(compressed: usize, raw: usize) -> f64 {
    if raw == 0 {
        return 0.0;
    }
    compressed as f64 * 8.0 / raw as f64
}
