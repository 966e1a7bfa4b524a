pub mod io;

use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::probability_store::P_MAX;

/// Unsigned integer the coder interval lives in
pub trait CoderWord: Copy + Ord + Debug {
    const BITS: u32;
    const ZERO: Self;
    const MAX: Self;

    /// `low + floor((high - low) * p / P_MAX)`, computed without overflow
    fn lerp(low: Self, high: Self, p: u32) -> Self;
    /// True while the top bytes of `low` and `high` agree
    fn settled(low: Self, high: Self) -> bool;
    fn top_byte(self) -> u8;
    /// `(self << 8) | byte`, dropping the top byte
    fn shift_in(self, byte: u8) -> Self;
    /// Top byte of the smallest value `>= self` with all lower bytes zero
    fn ceil_top_byte(self) -> u8;
    fn inc(self) -> Self;
    fn dec(self) -> Self;
}

macro_rules! impl_coder_word {
    ($word:ty, $wide:ty) => {
        impl CoderWord for $word {
            const BITS: u32 = <$word>::BITS;
            const ZERO: Self = 0;
            const MAX: Self = <$word>::MAX;

            #[inline(always)]
            fn lerp(low: Self, high: Self, p: u32) -> Self {
                // range < 2^BITS and p < 2^24, so the product fits the wide type
                let range = <$wide>::from(high - low);
                let lerped = range * <$wide>::from(p) / <$wide>::from(P_MAX);
                low + lerped as $word
            }

            #[inline(always)]
            fn settled(low: Self, high: Self) -> bool {
                (low ^ high) >> (Self::BITS - 8) == 0
            }

            #[inline(always)]
            fn top_byte(self) -> u8 {
                (self >> (Self::BITS - 8)) as u8
            }

            #[inline(always)]
            fn shift_in(self, byte: u8) -> Self {
                (self << 8) | <$word>::from(byte)
            }

            fn ceil_top_byte(self) -> u8 {
                let rest = self & (<$word>::MAX >> 8);
                self.top_byte() + u8::from(rest != 0)
            }

            #[inline(always)]
            fn inc(self) -> Self {
                self + 1
            }

            #[inline(always)]
            fn dec(self) -> Self {
                self - 1
            }
        }
    };
}

impl_coder_word!(u32, u64);
impl_coder_word!(u64, u128);

/// Carry-less binary arithmetic coder over a `[low, high]` interval.
/// Whole bytes are shifted out as soon as `low` and `high` agree on them.
pub struct ArithmeticCoder<T, IO> {
    low: T,
    high: T,
    state: T,
    io: IO,
}

impl<T: CoderWord, IO> ArithmeticCoder<T, IO> {
    pub fn interval(&self) -> (T, T) {
        (self.low, self.high)
    }

    /// Splits the interval, `[low, mid]` codes a 1 and `[mid + 1, high]` a 0
    #[inline(always)]
    fn mid(&self, p: u32) -> Result<T> {
        if p > P_MAX {
            return Err(Error::Range { p, max: P_MAX });
        }
        if self.high <= self.low {
            return Err(Error::Invariant("high <= low"));
        }
        let mut mid = T::lerp(self.low, self.high, p);
        if mid >= self.high {
            // give up a little precision rather than the bit 0 interval
            mid = self.high.dec();
        }
        if mid < self.low || mid >= self.high {
            return Err(Error::Invariant("mid outside of [low, high)"));
        }
        Ok(mid)
    }
}

pub trait ACRead {
    /// Read the next byte or 0 past the end of the stream
    fn read_byte(&mut self) -> std::io::Result<u8>;
}

pub trait ACWrite {
    fn write_byte(&mut self, byte: u8) -> std::io::Result<()>;
    /// Flushes the internal writer
    fn flush(&mut self) -> std::io::Result<()>;
}

impl<T: CoderWord, W: ACWrite> ArithmeticCoder<T, W> {
    pub fn new_coder(writer: W) -> Self {
        Self { low: T::ZERO, high: T::MAX, state: T::ZERO, io: writer }
    }

    /// Encodes `bit` with `p`, the probability of a 1 scaled to `P_MAX`
    pub fn encode(&mut self, bit: u8, p: u32) -> Result<()> {
        let mid = self.mid(p)?;

        match bit {
            0 => self.low = mid.inc(),
            _ => self.high = mid,
        }

        while T::settled(self.low, self.high) {
            self.io.write_byte(self.high.top_byte())?;
            self.low = self.low.shift_in(0x00);
            self.high = self.high.shift_in(0xff);
        }

        Ok(())
    }

    /// Writes the last byte needed to land inside the final interval
    /// and hands back the writer
    pub fn flush(mut self) -> Result<W> {
        debug_assert!(!T::settled(self.low, self.high));
        self.io.write_byte(self.low.ceil_top_byte())?;
        self.io.flush()?;
        Ok(self.io)
    }
}

impl<T: CoderWord, R: ACRead> ArithmeticCoder<T, R> {
    pub fn new_decoder(mut reader: R) -> Result<Self> {
        let mut state = T::ZERO;
        for _ in 0..T::BITS / 8 {
            state = state.shift_in(reader.read_byte()?);
        }
        Ok(Self { low: T::ZERO, high: T::MAX, state, io: reader })
    }

    /// Decodes a bit, `p` being the probability of a 1 scaled to `P_MAX`
    pub fn decode(&mut self, p: u32) -> Result<u8> {
        let mid = self.mid(p)?;

        let bit = if self.state <= mid {
            self.high = mid;
            1
        } else {
            self.low = mid.inc();
            0
        };

        while T::settled(self.low, self.high) {
            self.low = self.low.shift_in(0x00);
            self.high = self.high.shift_in(0xff);
            self.state = self.state.shift_in(self.io.read_byte()?);
        }

        Ok(bit)
    }
}
