//! Length-biased sampling of whole-word n-gram spans.
//!
//! Candidates come grouped by whole word: one group per eligible word,
//! holding the token positions that must be masked together. For every
//! starting word the sampler precomputes the spans of 1..K consecutive
//! words (clipped at the end of the sequence) and draws a span length
//! from a fixed categorical distribution with weight `1/length`, so
//! shorter spans dominate. The bias is reversed when configured to favor
//! longer spans.
use rand::distributions::WeightedIndex;
use rand::prelude::*;

/// Precomputed n-gram spans over one token sequence.
pub struct NgramSampler {
    /// `spans[start][n - 1]`: positions of the `n` words starting at `start`.
    spans: Vec<Vec<Vec<usize>>>,
    /// `dists[avail - 1]`: length distribution restricted to `1..=avail`.
    dists: Vec<WeightedIndex<f64>>,
}

impl NgramSampler {
    /// Builds spans of length `1..=max_ngram` for each starting word of
    /// `candidates`.
    pub fn new(candidates: &[Vec<usize>], max_ngram: usize, favor_shorter: bool) -> Self {
        let max_ngram = max_ngram.max(1);

        let mut weights: Vec<f64> = (1..=max_ngram).map(|n| 1.0 / n as f64).collect();
        if !favor_shorter {
            weights.reverse();
        }

        // weights restricted to the lengths available near the end of the
        // sequence; WeightedIndex renormalizes on its own
        let dists = (1..=max_ngram)
            .map(|avail| {
                WeightedIndex::new(weights[..avail].iter().copied())
                    .expect("n-gram length weights are positive")
            })
            .collect();

        let spans = (0..candidates.len())
            .map(|start| {
                let avail = max_ngram.min(candidates.len() - start);
                (1..=avail)
                    .map(|n| {
                        candidates[start..start + n]
                            .iter()
                            .flat_map(|group| group.iter().copied())
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self { spans, dists }
    }

    /// Number of starting words.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Number of span lengths available at `start`.
    pub fn available(&self, start: usize) -> usize {
        self.spans[start].len()
    }

    /// Draws a span length in `1..=available(start)`.
    pub fn sample_length<R: Rng>(&self, start: usize, rng: &mut R) -> usize {
        let avail = self.available(start);
        self.dists[avail - 1].sample(rng) + 1
    }

    /// Token positions of the `n`-word span starting at `start`.
    pub fn span(&self, start: usize, n: usize) -> &[usize] {
        &self.spans[start][n - 1]
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::NgramSampler;

    fn word_groups(n: usize) -> Vec<Vec<usize>> {
        (0..n).map(|i| vec![i]).collect()
    }

    #[test]
    fn spans_clip_at_sequence_end() {
        let sampler = NgramSampler::new(&word_groups(4), 3, true);

        assert_eq!(sampler.len(), 4);
        assert_eq!(sampler.available(0), 3);
        assert_eq!(sampler.available(2), 2);
        assert_eq!(sampler.available(3), 1);
        assert_eq!(sampler.span(1, 3), &[1, 2, 3]);
        assert_eq!(sampler.span(3, 1), &[3]);
    }

    #[test]
    fn spans_flatten_multi_position_words() {
        let candidates = vec![vec![1, 2], vec![3], vec![4, 5, 6]];
        let sampler = NgramSampler::new(&candidates, 2, true);

        assert_eq!(sampler.span(0, 2), &[1, 2, 3]);
        assert_eq!(sampler.span(1, 2), &[3, 4, 5, 6]);
    }

    #[test]
    fn shorter_lengths_dominate() {
        let sampler = NgramSampler::new(&word_groups(100), 3, true);
        let mut rng = StdRng::seed_from_u64(0);

        let mut counts = [0usize; 3];
        for _ in 0..6000 {
            counts[sampler.sample_length(0, &mut rng) - 1] += 1;
        }

        // weights are 1, 1/2, 1/3
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn longer_lengths_dominate_when_reversed() {
        let sampler = NgramSampler::new(&word_groups(100), 3, false);
        let mut rng = StdRng::seed_from_u64(0);

        let mut counts = [0usize; 3];
        for _ in 0..6000 {
            counts[sampler.sample_length(0, &mut rng) - 1] += 1;
        }

        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn clipped_start_only_draws_available_lengths() {
        let sampler = NgramSampler::new(&word_groups(4), 3, true);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            assert_eq!(sampler.sample_length(3, &mut rng), 1);
            assert!(sampler.sample_length(2, &mut rng) <= 2);
        }
    }
}
