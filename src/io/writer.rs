//! Instance serialization.
//!
//! Writes one JSON record per instance, padded to the fixed shapes the
//! training side expects: token-parallel fields right-padded with 0 to
//! `max_seq_length`, prediction fields padded with 0 (weight 0.0) to the
//! prediction slot count. Real prediction entries carry weight 1.0.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PretrainConfig;
use crate::error::Error;
use crate::types::{TokenId, TrainingInstance};

/// Fixed-shape record, ready for the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub input_ids: Vec<TokenId>,
    pub input_mask: Vec<u8>,
    pub segment_ids: Vec<u8>,
    pub token_boundary: Vec<u8>,
    pub masked_lm_positions: Vec<usize>,
    pub masked_lm_ids: Vec<TokenId>,
    pub masked_lm_weights: Vec<f32>,
    pub next_sentence_labels: u8,
}

impl ExampleRecord {
    /// Pads an instance to the shapes mandated by `config`. Errors if the
    /// instance exceeds them: an oversized instance violates the builder's
    /// invariants.
    pub fn from_instance(
        instance: &TrainingInstance,
        config: &PretrainConfig,
    ) -> Result<Self, Error> {
        let max_seq_length = config.max_seq_length;
        let slots = config.prediction_slots();

        if instance.tokens.len() > max_seq_length
            || instance.masked_lm_positions.len() > slots
        {
            return Err(Error::Custom(format!(
                "instance exceeds configured shape ({} tokens, {} predictions)",
                instance.tokens.len(),
                instance.masked_lm_positions.len()
            )));
        }

        let real = instance.tokens.len();
        let mut input_ids = instance.tokens.clone();
        let mut input_mask = vec![1u8; real];
        let mut segment_ids = instance.segment_ids.clone();
        let mut token_boundary = instance.token_boundary.clone();

        input_ids.resize(max_seq_length, 0);
        input_mask.resize(max_seq_length, 0);
        segment_ids.resize(max_seq_length, 0);
        token_boundary.resize(max_seq_length, 0);

        let predictions = instance.masked_lm_positions.len();
        let mut masked_lm_positions = instance.masked_lm_positions.clone();
        let mut masked_lm_ids = instance.masked_lm_labels.clone();
        let mut masked_lm_weights = vec![1.0f32; predictions];

        masked_lm_positions.resize(slots, 0);
        masked_lm_ids.resize(slots, 0);
        masked_lm_weights.resize(slots, 0.0);

        Ok(Self {
            input_ids,
            input_mask,
            segment_ids,
            token_boundary,
            masked_lm_positions,
            masked_lm_ids,
            masked_lm_weights,
            next_sentence_labels: instance.is_random_next.into(),
        })
    }
}

/// JSONL writer for padded instance records.
pub struct InstanceWriter {
    handle: BufWriter<File>,
    config: PretrainConfig,
    written: usize,
}

impl InstanceWriter {
    pub fn new(dst: &Path, config: &PretrainConfig) -> Result<Self, Error> {
        Ok(Self {
            handle: BufWriter::new(File::create(dst)?),
            config: config.clone(),
            written: 0,
        })
    }

    pub fn write(&mut self, instance: &TrainingInstance) -> Result<(), Error> {
        let record = ExampleRecord::from_instance(instance, &self.config)?;
        serde_json::to_writer(&mut self.handle, &record)?;
        self.handle.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and reports the total count.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.handle.flush()?;
        info!("wrote {} total instances", self.written);
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader};

    use crate::config::PretrainConfig;
    use crate::types::TrainingInstance;

    use super::{ExampleRecord, InstanceWriter};

    fn config() -> PretrainConfig {
        PretrainConfig {
            max_seq_length: 16,
            max_predictions_per_seq: 4,
            ..Default::default()
        }
    }

    fn instance() -> TrainingInstance {
        TrainingInstance {
            tokens: vec![2, 10, 4, 3, 12, 3],
            segment_ids: vec![0, 0, 0, 0, 1, 1],
            token_boundary: vec![1, 1, 1, 1, 1, 1],
            is_random_next: true,
            masked_lm_positions: vec![2],
            masked_lm_labels: vec![11],
        }
    }

    #[test]
    fn pads_to_configured_shapes() {
        let record = ExampleRecord::from_instance(&instance(), &config()).unwrap();

        assert_eq!(record.input_ids.len(), 16);
        assert_eq!(record.input_mask, {
            let mut m = vec![1u8; 6];
            m.resize(16, 0);
            m
        });
        assert_eq!(record.segment_ids.len(), 16);
        assert_eq!(record.token_boundary.len(), 16);

        assert_eq!(record.masked_lm_positions, vec![2, 0, 0, 0]);
        assert_eq!(record.masked_lm_ids, vec![11, 0, 0, 0]);
        assert_eq!(record.masked_lm_weights, vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(record.next_sentence_labels, 1);
    }

    #[test]
    fn permutation_doubles_prediction_slots() {
        let cfg = PretrainConfig {
            do_permutation: true,
            ..config()
        };
        let record = ExampleRecord::from_instance(&instance(), &cfg).unwrap();
        assert_eq!(record.masked_lm_positions.len(), 8);
        assert_eq!(record.masked_lm_weights.iter().filter(|&&w| w == 1.0).count(), 1);
    }

    #[test]
    fn oversized_instance_is_rejected() {
        let mut oversized = instance();
        oversized.tokens = vec![2; 17];
        assert!(ExampleRecord::from_instance(&oversized, &config()).is_err());
    }

    #[test]
    fn writes_one_json_line_per_instance() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("instances.jsonl");

        let mut writer = InstanceWriter::new(&dst, &config()).unwrap();
        writer.write(&instance()).unwrap();
        writer.write(&instance()).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let lines: Vec<String> = BufReader::new(std::fs::File::open(&dst).unwrap())
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines.len(), 2);

        let record: ExampleRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record.input_ids[0], 2);
    }
}
