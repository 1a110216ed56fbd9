//! Masked-LM pretraining instance generation pipeline.
//!
//! Documents are cut into sentence-pair windows close to a per-document
//! target length. Each window yields one [TrainingInstance]: a split
//! point picks segment A, the B segment is either the true continuation,
//! a random span from another document, or the swapped remainder (a
//! cheap same-document negative), the pair is truncated to the token
//! budget and masked positions are selected over the assembled sequence.
//!
//! # Processing
//! 1. Document order is shuffled once, then the corpus is walked
//!    `dupe_factor` times, each pass resampling every document.
//! 1. Every window is assembled as `[CLS] A [SEP] B [SEP]` and passed
//!    through masked-position selection (and permutation selection when
//!    configured).
//! 1. The collected instances are shuffled once at the end.
//!
//! All randomness flows from a single seeded generator, so the whole
//! transform is a pure function of (corpus, config, seed).
use std::path::PathBuf;

use log::{info, log_enabled};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::PretrainConfig;
use crate::error::Error;
use crate::io::reader::CorpusReader;
use crate::io::writer::InstanceWriter;
use crate::pipelines::pipeline::Pipeline;
use crate::sampling::mask::create_masked_lm_predictions;
use crate::sampling::truncate::truncate_seq_pair;
use crate::types::special::{CLS, SEP};
use crate::types::{Corpus, Document, TokenId, TrainingInstance};

/// Pretraining-instance generation pipeline: corpus in, serialized
/// instances out.
pub struct Pretrain {
    src: PathBuf,
    dst: PathBuf,
    sequence_column: String,
    config: PretrainConfig,
}

impl Pretrain {
    pub fn new(src: PathBuf, dst: PathBuf, sequence_column: String, config: PretrainConfig) -> Self {
        Self {
            src,
            dst,
            sequence_column,
            config,
        }
    }
}

impl Pipeline<()> for Pretrain {
    fn run(&self) -> Result<(), Error> {
        let reader = CorpusReader::new(&self.sequence_column);
        let corpus = reader.read_glob(&self.src)?;
        info!(
            "read {} documents ({} vocabulary entries)",
            corpus.len(),
            corpus.vocabulary_size()
        );

        let instances = generate_instances(corpus, &self.config)?;
        info!("number of instances: {}", instances.len());

        let mut writer = InstanceWriter::new(&self.dst, &self.config)?;
        for (idx, instance) in instances.iter().enumerate() {
            // mirror record layout in the log for the first few examples
            if log_enabled!(log::Level::Info) && idx < 20 {
                info!("*** Example ***\n{instance}");
            }
            writer.write(instance)?;
        }
        writer.finish()?;

        Ok(())
    }
}

/// Runs the full corpus transform with a generator seeded from the
/// config.
///
/// Takes the corpus by value: document order is shuffled in place before
/// the first pass.
pub fn generate_instances(
    mut corpus: Corpus,
    config: &PretrainConfig,
) -> Result<Vec<TrainingInstance>, Error> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    create_training_instances(&mut corpus, config, &mut rng)
}

/// Corpus-level generation with an explicit random source.
pub fn create_training_instances<R: Rng>(
    corpus: &mut Corpus,
    config: &PretrainConfig,
    rng: &mut R,
) -> Result<Vec<TrainingInstance>, Error> {
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    if config.max_num_tokens() < 2 {
        return Err(Error::Truncation(format!(
            "max_seq_length {} leaves no room for a segment pair",
            config.max_seq_length
        )));
    }

    corpus.documents_mut().shuffle(rng);

    let vocabulary_size = corpus.vocabulary_size();
    let mut instances = Vec::new();
    for _ in 0..config.dupe_factor {
        for document_index in 0..corpus.len() {
            instances.extend(create_instances_from_document(
                corpus.documents(),
                document_index,
                vocabulary_size,
                config,
                rng,
            )?);
        }
    }

    instances.shuffle(rng);
    Ok(instances)
}

/// Builds the training instances of a single document.
///
/// Windows are closed when the accumulated sentence length reaches the
/// per-document target (drawn below the budget with probability
/// `short_seq_prob`) or the document runs out.
pub fn create_instances_from_document<R: Rng>(
    documents: &[Document],
    document_index: usize,
    vocabulary_size: u32,
    config: &PretrainConfig,
    rng: &mut R,
) -> Result<Vec<TrainingInstance>, Error> {
    let document = &documents[document_index];

    // [CLS], [SEP], [SEP] take three slots
    let max_num_tokens = config.max_num_tokens();

    // usually fill the whole budget (padding wastes compute), sometimes
    // draw a shorter target to soften the pretraining/finetuning mismatch
    let mut target_seq_length = max_num_tokens;
    if rng.gen::<f64>() < config.short_seq_prob {
        target_seq_length = rng.gen_range(2..=max_num_tokens);
    }

    let mut instances = Vec::new();
    let mut current_chunk: Vec<usize> = Vec::new();
    let mut current_length = 0;

    let mut i = 0;
    while i < document.len() {
        let segment = &document.sentences()[i];
        current_chunk.push(i);
        current_length += segment.len();

        if i == document.len() - 1 || current_length >= target_seq_length {
            if !current_chunk.is_empty() {
                // how many chunk sentences go into segment A
                let mut a_end = 1;
                if current_chunk.len() >= 2 {
                    a_end = rng.gen_range(1..=current_chunk.len() - 1);
                }

                let mut tokens_a: Vec<TokenId> = current_chunk[..a_end]
                    .iter()
                    .flat_map(|&j| document.sentences()[j].iter().copied())
                    .collect();

                let mut tokens_b: Vec<TokenId> = Vec::new();
                let is_random_next;

                if current_chunk.len() == 1
                    || (config.random_next_sentence && rng.gen::<f64>() < 0.5)
                {
                    is_random_next = true;
                    let target_b_length = target_seq_length.saturating_sub(tokens_a.len());

                    // bounded retry: pick another document, give up after
                    // 10 collisions and accept the last draw
                    let mut random_document_index = document_index;
                    for _ in 0..10 {
                        random_document_index = rng.gen_range(0..documents.len());
                        if random_document_index != document_index {
                            break;
                        }
                    }

                    let random_document = &documents[random_document_index];
                    let random_start = rng.gen_range(0..random_document.len());
                    for sentence in &random_document.sentences()[random_start..] {
                        tokens_b.extend_from_slice(sentence);
                        if tokens_b.len() >= target_b_length {
                            break;
                        }
                    }

                    // the unused chunk tail goes back under the cursor so
                    // it feeds the next window
                    let num_unused_segments = current_chunk.len() - a_end;
                    i -= num_unused_segments;
                } else if !config.random_next_sentence && rng.gen::<f64>() < 0.5 {
                    // same-document negative: keep the pair, swap the order
                    is_random_next = true;
                    for &j in &current_chunk[a_end..] {
                        tokens_b.extend_from_slice(&document.sentences()[j]);
                    }
                    std::mem::swap(&mut tokens_a, &mut tokens_b);
                } else {
                    is_random_next = false;
                    for &j in &current_chunk[a_end..] {
                        tokens_b.extend_from_slice(&document.sentences()[j]);
                    }
                }

                truncate_seq_pair(&mut tokens_a, &mut tokens_b, max_num_tokens, rng)?;
                if tokens_a.is_empty() || tokens_b.is_empty() {
                    return Err(Error::Truncation(format!(
                        "segment pair emptied while fitting {max_num_tokens} tokens"
                    )));
                }

                let mut tokens = Vec::with_capacity(tokens_a.len() + tokens_b.len() + 3);
                let mut segment_ids = Vec::with_capacity(tokens_a.len() + tokens_b.len() + 3);

                tokens.push(CLS);
                segment_ids.push(0);
                for &token in &tokens_a {
                    tokens.push(token);
                    segment_ids.push(0);
                }
                tokens.push(SEP);
                segment_ids.push(0);
                for &token in &tokens_b {
                    tokens.push(token);
                    segment_ids.push(1);
                }
                tokens.push(SEP);
                segment_ids.push(1);

                let masked =
                    create_masked_lm_predictions(&tokens, config, vocabulary_size, rng);

                instances.push(TrainingInstance {
                    tokens: masked.tokens,
                    segment_ids,
                    token_boundary: masked.token_boundary,
                    is_random_next,
                    masked_lm_positions: masked.masked_lm_positions,
                    masked_lm_labels: masked.masked_lm_labels,
                });
            }
            current_chunk.clear();
            current_length = 0;
        }
        i += 1;
    }

    Ok(instances)
}
