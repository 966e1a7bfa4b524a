//! Picks the context set that codes a given input smallest.
//! Candidates run in parallel, each with its own models, into a counting sink.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::compressor::Compressor;
use crate::config::ModelConfig;
use crate::entropy_coding::io::ACStats;
use crate::error::{Error, Result};
use crate::models::ContextKind;

/// The base config, its contiguous orders alone and every single-context
/// ablation of it, without duplicates
pub fn candidates(base: &ModelConfig) -> Vec<ModelConfig> {
    let mut res = vec![base.clone()];

    let orders: Vec<_> = base.contexts.iter().copied().filter(is_contiguous).collect();
    if !orders.is_empty() {
        res.push(ModelConfig { contexts: orders, ..base.clone() });
    }

    if base.contexts.len() > 1 {
        for i in 0..base.contexts.len() {
            let mut contexts = base.contexts.clone();
            contexts.remove(i);
            res.push(ModelConfig { contexts, ..base.clone() });
        }
    }

    let mut unique: Vec<ModelConfig> = Vec::with_capacity(res.len());
    for config in res {
        if !unique.contains(&config) {
            unique.push(config);
        }
    }
    unique
}

fn is_contiguous(kind: &ContextKind) -> bool {
    match *kind {
        ContextKind::Bytes { mask } => mask & mask.wrapping_add(1) == 0,
        ContextKind::Word => false,
    }
}

/// Estimated payload size of `input` under `config`, in bytes
pub fn estimate(input: &[u8], config: &ModelConfig) -> Result<u64> {
    let mut compressor = Compressor::new(config)?;
    let stats = compressor.encode(input, ACStats::new())?;
    Ok(stats.result())
}

/// Best candidate and its estimated size.
/// Ties go to the candidate listed first.
pub fn find_best(input: &[u8], candidates: &[ModelConfig]) -> Result<(ModelConfig, u64)> {
    let sizes = candidates
        .par_iter()
        .map(|config| {
            let size = estimate(input, config)?;
            debug!(contexts = config.contexts.len(), size, "candidate");
            Ok(size)
        })
        .collect::<Result<Vec<_>>>()?;

    let (best, &size) = sizes
        .iter()
        .enumerate()
        .min_by_key(|&(i, &size)| (size, i))
        .ok_or(Error::BadConfig("no candidates to search"))?;

    info!(
        contexts = candidates[best].contexts.len(),
        size,
        "best of {} candidates",
        candidates.len()
    );
    Ok((candidates[best].clone(), size))
}

#[cfg(test)]
mod tests {
    use super::{candidates, estimate, find_best, is_contiguous};
    use crate::config::{CoderWidth, ModelConfig};
    use crate::error::Error;
    use crate::models::ContextKind;

    fn base() -> ModelConfig {
        ModelConfig::new(
            vec![ContextKind::order(0), ContextKind::order(2), ContextKind::Bytes { mask: 0b10 }],
            14,
            CoderWidth::U32,
        )
        .unwrap()
    }

    #[test]
    fn contiguous_masks() {
        assert!(is_contiguous(&ContextKind::order(0)));
        assert!(is_contiguous(&ContextKind::order(5)));
        assert!(is_contiguous(&ContextKind::order(8)));
        assert!(!is_contiguous(&ContextKind::Bytes { mask: 0b110 }));
        assert!(!is_contiguous(&ContextKind::Word));
    }

    #[test]
    fn candidate_family() {
        let list = candidates(&base());
        // base, orders only and two ablations, dropping the sparse
        // context repeats the orders-only config
        assert_eq!(list.len(), 4);
        assert_eq!(list[0], base());
        assert_eq!(list[1].contexts, [ContextKind::order(0), ContextKind::order(2)]);
        let orders = candidates(&ModelConfig { contexts: vec![ContextKind::order(1)], ..base() });
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn finds_the_smallest() {
        let input = b"abcabcabcabcabcabcabcabcabcabc, abcabcabc".repeat(8);
        let list = candidates(&base());
        let (best, size) = find_best(&input, &list).unwrap();
        let sizes: Vec<_> = list.iter().map(|c| estimate(&input, c).unwrap()).collect();
        assert_eq!(size, *sizes.iter().min().unwrap());
        let first = sizes.iter().position(|&s| s == size).unwrap();
        assert_eq!(best, list[first]);
    }

    #[test]
    fn empty_search_is_an_error() {
        assert!(matches!(find_best(b"abc", &[]), Err(Error::BadConfig(_))));
    }
}
