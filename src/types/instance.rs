//! Training instance type.
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::special::TokenId;

/// One sentence-pair training example.
///
/// `tokens`, `segment_ids` and `token_boundary` run in parallel;
/// `masked_lm_positions` and `masked_lm_labels` run in parallel and are
/// sorted by position. Built once per document window, immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingInstance {
    pub tokens: Vec<TokenId>,
    pub segment_ids: Vec<u8>,
    pub token_boundary: Vec<u8>,
    pub is_random_next: bool,
    pub masked_lm_positions: Vec<usize>,
    pub masked_lm_labels: Vec<TokenId>,
}

impl fmt::Display for TrainingInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tokens: {}", self.tokens.iter().join(" "))?;
        writeln!(f, "segment_ids: {}", self.segment_ids.iter().join(" "))?;
        writeln!(
            f,
            "token_boundary: {}",
            self.token_boundary.iter().join(" ")
        )?;
        writeln!(f, "is_random_next: {}", self.is_random_next)?;
        writeln!(
            f,
            "masked_lm_positions: {}",
            self.masked_lm_positions.iter().join(" ")
        )?;
        writeln!(
            f,
            "masked_lm_labels: {}",
            self.masked_lm_labels.iter().join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TrainingInstance;

    #[test]
    fn display_lists_fields() {
        let instance = TrainingInstance {
            tokens: vec![2, 10, 3, 11, 3],
            segment_ids: vec![0, 0, 0, 1, 1],
            token_boundary: vec![1, 1, 1, 1, 1],
            is_random_next: true,
            masked_lm_positions: vec![1],
            masked_lm_labels: vec![10],
        };

        let s = instance.to_string();
        assert!(s.contains("tokens: 2 10 3 11 3"));
        assert!(s.contains("is_random_next: true"));
        assert!(s.contains("masked_lm_positions: 1"));
    }
}
