//! Random truncation of a segment pair to a token budget.
use rand::Rng;

use crate::error::Error;
use crate::types::TokenId;

/// Trims `tokens_a`/`tokens_b` in place until their combined length fits
/// `max_num_tokens`.
///
/// Each iteration removes one token from the longer side, from the front
/// or the back on a fair coin, so no bias towards either end builds up.
/// Retained tokens keep their order.
///
/// A no-op when the pair already fits. Errors if it would have to trim an
/// empty sequence, which means `max_num_tokens` is not representable for
/// this input.
pub fn truncate_seq_pair<R: Rng>(
    tokens_a: &mut Vec<TokenId>,
    tokens_b: &mut Vec<TokenId>,
    max_num_tokens: usize,
    rng: &mut R,
) -> Result<(), Error> {
    while tokens_a.len() + tokens_b.len() > max_num_tokens {
        let trunc_tokens = if tokens_a.len() > tokens_b.len() {
            &mut *tokens_a
        } else {
            &mut *tokens_b
        };

        if trunc_tokens.is_empty() {
            return Err(Error::Truncation(format!(
                "cannot fit segment pair into {max_num_tokens} tokens"
            )));
        }

        if rng.gen::<f64>() < 0.5 {
            trunc_tokens.remove(0);
        } else {
            trunc_tokens.pop();
        }
    }

    Ok(())
}
