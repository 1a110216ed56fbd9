//! Masked-position selection over an assembled sequence.
//!
//! Positions are picked by whole-word n-gram spans (see
//! [super::ngram::NgramSampler]): either every position of a span is
//! selected or none. Selection stops once the prediction budget is
//! reached; oversized spans are retried at shorter lengths before being
//! skipped.
use std::collections::HashSet;

use rand::prelude::*;

use crate::config::PretrainConfig;
use crate::types::special::{is_structural, MASK, RESERVED_TOKEN_COUNT, UNK};
use crate::types::TokenId;

use super::ngram::NgramSampler;

/// A masked position and the original token expected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaskedLm {
    position: usize,
    label: TokenId,
}

/// Result of the masking (and optional permutation) passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedSequence {
    /// Input tokens with replacements applied.
    pub tokens: Vec<TokenId>,
    /// Selected positions, sorted, strictly increasing.
    pub masked_lm_positions: Vec<usize>,
    /// Original token per selected position.
    pub masked_lm_labels: Vec<TokenId>,
    /// 1 where a position starts a whole word or is a structural marker.
    pub token_boundary: Vec<u8>,
}

/// Selects masked positions for `tokens` and applies the replacement
/// policy, plus the word-order permutation signal when configured.
///
/// Targets `min(max_predictions_per_seq, max(1, round(len * masked_lm_prob)))`
/// positions; returns fewer when candidates run out. A zero
/// `masked_lm_prob` short-circuits to no masking at all.
pub fn create_masked_lm_predictions<R: Rng>(
    tokens: &[TokenId],
    config: &PretrainConfig,
    vocabulary_size: u32,
    rng: &mut R,
) -> MaskedSequence {
    let mut token_boundary = vec![0u8; tokens.len()];
    let mut candidates: Vec<Vec<usize>> = Vec::new();

    for (i, &token) in tokens.iter().enumerate() {
        token_boundary[i] = 1;
        if is_structural(token) {
            continue;
        }
        // one whole word per position: the corpus carries bare ids, with
        // no sub-word pieces to regroup
        candidates.push(vec![i]);
    }

    let mut output_tokens = tokens.to_vec();

    if config.masked_lm_prob == 0.0 {
        return MaskedSequence {
            tokens: output_tokens,
            masked_lm_positions: Vec::new(),
            masked_lm_labels: Vec::new(),
            token_boundary,
        };
    }

    let num_to_predict = config
        .max_predictions_per_seq
        .min(((tokens.len() as f64 * config.masked_lm_prob).round() as usize).max(1));

    let sampler = NgramSampler::new(&candidates, config.ngram, config.favor_shorter_ngram);
    let mut order: Vec<usize> = (0..sampler.len()).collect();
    order.shuffle(rng);

    let mut masked_lms: Vec<MaskedLm> = Vec::new();
    let mut covered_indexes: HashSet<usize> = HashSet::new();

    for &start in &order {
        if masked_lms.len() >= num_to_predict {
            break;
        }
        let span = match accept_span(&sampler, start, masked_lms.len(), num_to_predict, rng, |i| {
            covered_indexes.contains(&i)
        }) {
            Some(span) => span,
            None => continue,
        };

        for &index in span {
            covered_indexes.insert(index);

            // 80% mask marker, 10% keep, 10% random vocabulary id
            let masked_token = if rng.gen::<f64>() < 0.8 {
                MASK
            } else if rng.gen::<f64>() < 0.5 {
                tokens[index]
            } else if vocabulary_size > 0 {
                rng.gen_range(0..vocabulary_size) + RESERVED_TOKEN_COUNT
            } else {
                UNK
            };

            output_tokens[index] = masked_token;
            masked_lms.push(MaskedLm {
                position: index,
                label: tokens[index],
            });
        }
    }
    debug_assert!(masked_lms.len() <= num_to_predict);

    if config.do_permutation {
        permute(
            &sampler,
            &mut order,
            num_to_predict,
            &covered_indexes,
            &mut output_tokens,
            &mut masked_lms,
            rng,
        );
    }

    masked_lms.sort_by_key(|lm| lm.position);

    let masked_lm_positions = masked_lms.iter().map(|lm| lm.position).collect();
    let masked_lm_labels = masked_lms.iter().map(|lm| lm.label).collect();

    MaskedSequence {
        tokens: output_tokens,
        masked_lm_positions,
        masked_lm_labels,
        token_boundary,
    }
}

/// Second selection pass for the word-order signal: picks spans disjoint
/// from the masked positions, then rewrites the selected positions with a
/// random permutation of their own values. Labels pair each position with
/// the value it held before the shuffle.
fn permute<R: Rng>(
    sampler: &NgramSampler,
    order: &mut [usize],
    num_to_predict: usize,
    covered_indexes: &HashSet<usize>,
    output_tokens: &mut [TokenId],
    masked_lms: &mut Vec<MaskedLm>,
    rng: &mut R,
) {
    order.shuffle(rng);

    let mut select_indexes: HashSet<usize> = HashSet::new();
    for &start in order.iter() {
        if select_indexes.len() >= num_to_predict {
            break;
        }
        let span = match accept_span(sampler, start, select_indexes.len(), num_to_predict, rng, |i| {
            covered_indexes.contains(&i) || select_indexes.contains(&i)
        }) {
            Some(span) => span,
            None => continue,
        };

        select_indexes.extend(span.iter().copied());
    }
    debug_assert!(select_indexes.len() <= num_to_predict);

    let mut select_indexes: Vec<usize> = select_indexes.into_iter().collect();
    select_indexes.sort_unstable();

    let mut permute_indexes = select_indexes.clone();
    permute_indexes.shuffle(rng);

    // selected positions are disjoint from masked ones, so the snapshot
    // still holds their original values
    let orig_tokens = output_tokens.to_vec();

    for (&src, &tgt) in select_indexes.iter().zip(permute_indexes.iter()) {
        output_tokens[src] = orig_tokens[tgt];
        masked_lms.push(MaskedLm {
            position: src,
            label: orig_tokens[src],
        });
    }
}

/// Draws an n-gram span at `start` that fits the remaining budget.
///
/// Oversized draws are retried at progressively shorter lengths, down to a
/// single word. Returns `None` when even that overflows the budget or when
/// the span touches an already-selected position (no partial overlap).
fn accept_span<'a, R, F>(
    sampler: &'a NgramSampler,
    start: usize,
    selected: usize,
    target: usize,
    rng: &mut R,
    is_covered: F,
) -> Option<&'a [usize]>
where
    R: Rng,
    F: Fn(usize) -> bool,
{
    let drawn = sampler.sample_length(start, rng);

    let mut accepted = None;
    for n in (1..=drawn).rev() {
        let span = sampler.span(start, n);
        if selected + span.len() <= target {
            accepted = Some(span);
            break;
        }
    }
    let span = accepted?;

    if span.iter().any(|&i| is_covered(i)) {
        return None;
    }

    Some(span)
}
