//! Pipeline configuration.
//!
//! Every knob of instance generation lives here and is threaded explicitly
//! into the components that need it. There is no process-global state: two
//! configs can coexist in the same process without interfering.

/// Parameters of pretraining instance generation.
///
/// Defaults mirror the usual ALBERT-style pretraining setup.
#[derive(Debug, Clone, PartialEq)]
pub struct PretrainConfig {
    /// Hard cap on assembled sequence length (markers included).
    pub max_seq_length: usize,
    /// Cap on masked-LM predictions per sequence (doubled in the
    /// serialized record when `do_permutation` is on).
    pub max_predictions_per_seq: usize,
    /// Fraction of positions to mask. `0.0` disables masking entirely.
    pub masked_lm_prob: f64,
    /// Probability of drawing a shorter per-document target length.
    pub short_seq_prob: f64,
    /// Number of passes over the corpus, each with fresh sampling.
    pub dupe_factor: usize,
    /// Maximum n-gram length for whole-word span masking.
    pub ngram: usize,
    /// Bias span-length sampling towards shorter n-grams (reversed
    /// otherwise).
    pub favor_shorter_ngram: bool,
    /// Add the word-order permutation signal on top of masking.
    pub do_permutation: bool,
    /// Sample negative B segments from other documents on a coin flip,
    /// instead of the swapped same-document pair.
    pub random_next_sentence: bool,
    /// Seed of the single random source driving the whole transform.
    pub seed: u64,
}

impl PretrainConfig {
    /// Token budget left for the two segments once `[CLS]` and the two
    /// `[SEP]` are accounted for.
    pub fn max_num_tokens(&self) -> usize {
        self.max_seq_length.saturating_sub(3)
    }

    /// Number of masked-LM slots in a serialized record.
    pub fn prediction_slots(&self) -> usize {
        if self.do_permutation {
            self.max_predictions_per_seq * 2
        } else {
            self.max_predictions_per_seq
        }
    }
}

impl Default for PretrainConfig {
    fn default() -> Self {
        Self {
            max_seq_length: 512,
            max_predictions_per_seq: 20,
            masked_lm_prob: 0.15,
            short_seq_prob: 0.1,
            dupe_factor: 40,
            ngram: 3,
            favor_shorter_ngram: true,
            do_permutation: false,
            random_next_sentence: false,
            seed: 12345,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PretrainConfig;

    #[test]
    fn budget_accounts_for_markers() {
        let cfg = PretrainConfig {
            max_seq_length: 128,
            ..Default::default()
        };
        assert_eq!(cfg.max_num_tokens(), 125);
    }

    #[test]
    fn slots_double_with_permutation() {
        let cfg = PretrainConfig::default();
        assert_eq!(cfg.prediction_slots(), 20);

        let cfg = PretrainConfig {
            do_permutation: true,
            ..cfg
        };
        assert_eq!(cfg.prediction_slots(), 40);
    }
}
