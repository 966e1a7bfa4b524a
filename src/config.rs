use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ContextKind;

/// Interval width of the arithmetic coder
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoderWidth {
    #[default]
    U32,
    U64,
}

/// Everything encoder and decoder have to agree on besides the stream itself
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub contexts: Vec<ContextKind>,
    /// The probability store holds `2^table_bits` cells
    pub table_bits: u8,
    #[serde(default)]
    pub width: CoderWidth,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let orders = (0..=8).map(ContextKind::order);
        // skip the last byte, then the last two
        let sparse = [0b10, 0b110, 0b1110, 0b11110, 0b100, 0b1100, 0b11100, 0b111100]
            .into_iter()
            .map(|mask| ContextKind::Bytes { mask });
        let contexts = orders
            .chain(sparse)
            .chain(std::iter::once(ContextKind::Word))
            .collect();
        Self { contexts, table_bits: 22, width: CoderWidth::U32 }
    }
}

impl ModelConfig {
    pub fn new(contexts: Vec<ContextKind>, table_bits: u8, width: CoderWidth) -> Result<Self> {
        let config = Self { contexts, table_bits, width };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.contexts.is_empty() {
            return Err(Error::BadConfig("at least one context is required"));
        }
        if !(1..=30).contains(&self.table_bits) {
            return Err(Error::BadConfig("table_bits must be within 1..=30"));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
