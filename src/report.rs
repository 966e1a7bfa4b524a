//! Per-byte view of how well the models predict an input.

use std::io::Write;

use crate::compressor::Compressor;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::unroll_for;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ByteStats {
    pub byte: u8,
    /// Mean of `|bit - p|` over the byte's 8 bits
    pub mean_error: f64,
    /// Ideal code length of the byte, `-log2` of the predicted bit probabilities
    pub cost: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    pub bytes: Vec<ByteStats>,
}

impl Report {
    /// Ideal compressed size in bits
    pub fn total_cost(&self) -> f64 {
        self.bytes.iter().map(|b| b.cost).sum()
    }

    /// Colors every byte from red (missed) to green (predicted)
    pub fn write_html(&self, mut out: impl Write) -> Result<()> {
        write!(out, "<html><body style=\"font-family: monospace;\">")?;
        for stats in &self.bytes {
            let hue = ((1.0 - stats.mean_error) * 120.0) as u8;
            write!(
                out,
                "<i style=\"background: hsl({hue}, 100%, 40%);\" title=\"{:.2} bits\">{}</i>",
                stats.cost,
                display(stats.byte)
            )?;
        }
        writeln!(out, "</body></html>")?;
        Ok(())
    }
}

fn display(byte: u8) -> String {
    match byte {
        b'<' => "&lt;".into(),
        b'>' => "&gt;".into(),
        b'&' => "&amp;".into(),
        b'\n' => "<br>".into(),
        b' ' => "&nbsp;".into(),
        _ if byte.is_ascii_graphic() => char::from(byte).to_string(),
        _ => format!("\\x{byte:02X}"),
    }
}

/// Runs the models over `input` the way compression would, without coding
pub fn analyze(input: &[u8], config: &ModelConfig) -> Result<Report> {
    let mut compressor = Compressor::new(config)?;
    let mut bytes = Vec::with_capacity(input.len());
    for &byte in input {
        let mut error = 0.0;
        let mut cost = 0.0;
        unroll_for!(bit in byte, {
            let p = compressor.predict()?;
            let p_bit = if bit == 1 { p } else { 1.0 - p };
            error += 1.0 - p_bit;
            cost -= p_bit.log2();
            compressor.learn(bit);
        });
        bytes.push(ByteStats { byte, mean_error: error / 8.0, cost });
    }
    Ok(Report { bytes })
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use crate::config::{CoderWidth, ModelConfig};
    use crate::models::ContextKind;
    use crate::search::estimate;

    fn config() -> ModelConfig {
        ModelConfig::new(vec![ContextKind::order(1), ContextKind::Word], 16, CoderWidth::U32).unwrap()
    }

    #[test]
    fn first_byte_costs_eight_bits() {
        let report = analyze(b"a", &config()).unwrap();
        assert_eq!(report.bytes.len(), 1);
        assert!((report.bytes[0].cost - 8.0).abs() < 1e-3);
        assert!((report.bytes[0].mean_error - 0.5).abs() < 1e-3);
    }

    #[test]
    fn repetition_gets_cheaper() {
        let report = analyze(&b"hello hello ".repeat(50), &config()).unwrap();
        let first = report.bytes[..12].iter().map(|b| b.cost).sum::<f64>();
        let last = report.bytes[report.bytes.len() - 12..].iter().map(|b| b.cost).sum::<f64>();
        assert!(last < first / 4.0, "{last} vs {first}");
        for stats in &report.bytes {
            assert!((0.0..=1.0).contains(&stats.mean_error));
        }
    }

    #[test]
    fn ideal_cost_tracks_coded_size() {
        let input = b"she sells sea shells by the sea shore ".repeat(30);
        let report = analyze(&input, &config()).unwrap();
        let coded_bits = estimate(&input, &config()).unwrap() as f64 * 8.0;
        assert!((coded_bits - report.total_cost()).abs() < 64.0);
    }

    #[test]
    fn html_escapes_markup() {
        let report = analyze(b"<a>&\n\x01", &config()).unwrap();
        let mut html = Vec::new();
        report.write_html(&mut html).unwrap();
        let html = String::from_utf8(html).unwrap();
        assert!(html.starts_with("<html>"));
        assert!(html.contains("&lt;</i>") && html.contains("&amp;</i>"));
        assert!(html.contains("\\x01</i>"));
        assert_eq!(html.matches("<i ").count(), 6);
    }
}
