//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use crate::config::PretrainConfig;

#[derive(Debug, StructOpt)]
#[structopt(name = "maskgen", about = "masked-LM pretraining data tool.")]
/// Holds every command that is callable by the `maskgen` command.
pub enum Maskgen {
    #[structopt(about = "Generate pretraining instances from a tokenized corpus")]
    Pipeline(Pipeline),
}

#[derive(Debug, StructOpt)]
/// Pipeline command and parameters.
pub struct Pipeline {
    #[structopt(parse(from_os_str), help = "input corpus (glob over JSONL files)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "instance file destination")]
    pub dst: PathBuf,
    #[structopt(
        long = "sequence-column",
        help = "record field holding the token sequence",
        default_value = "tokens"
    )]
    pub sequence_column: String,
    #[structopt(long = "max-seq-length", default_value = "512")]
    pub max_seq_length: usize,
    #[structopt(
        long = "max-predictions-per-seq",
        help = "maximum masked LM predictions per sequence",
        default_value = "20"
    )]
    pub max_predictions_per_seq: usize,
    #[structopt(long = "masked-lm-prob", default_value = "0.15")]
    pub masked_lm_prob: f64,
    #[structopt(
        long = "short-seq-prob",
        help = "probability of drawing a shorter target length",
        default_value = "0.1"
    )]
    pub short_seq_prob: f64,
    #[structopt(
        long = "dupe-factor",
        help = "number of sampling passes over the corpus",
        default_value = "40"
    )]
    pub dupe_factor: usize,
    #[structopt(long = "ngram", help = "maximum masked n-gram length", default_value = "3")]
    pub ngram: usize,
    #[structopt(
        long = "favor-longer-ngram",
        help = "bias span sampling towards longer n-grams"
    )]
    pub favor_longer_ngram: bool,
    #[structopt(long = "do-permutation", help = "add the word-order permutation signal")]
    pub do_permutation: bool,
    #[structopt(
        long = "random-next-sentence",
        help = "sample negative B segments from other documents"
    )]
    pub random_next_sentence: bool,
    #[structopt(long = "seed", default_value = "12345")]
    pub seed: u64,
}

impl From<&Pipeline> for PretrainConfig {
    fn from(p: &Pipeline) -> Self {
        Self {
            max_seq_length: p.max_seq_length,
            max_predictions_per_seq: p.max_predictions_per_seq,
            masked_lm_prob: p.masked_lm_prob,
            short_seq_prob: p.short_seq_prob,
            dupe_factor: p.dupe_factor,
            ngram: p.ngram,
            favor_shorter_ngram: !p.favor_longer_ngram,
            do_permutation: p.do_permutation,
            random_next_sentence: p.random_next_sentence,
            seed: p.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use structopt::StructOpt;

    use crate::config::PretrainConfig;

    use super::Maskgen;

    #[test]
    fn pipeline_defaults_match_config_defaults() {
        let Maskgen::Pipeline(p) =
            Maskgen::from_iter(["maskgen", "pipeline", "corpus/*.jsonl", "out.jsonl"]);

        let config = PretrainConfig::from(&p);
        assert_eq!(config, PretrainConfig::default());
        assert_eq!(p.sequence_column, "tokens");
    }

    #[test]
    fn flags_invert_and_override() {
        let Maskgen::Pipeline(p) = Maskgen::from_iter([
            "maskgen",
            "pipeline",
            "corpus/*.jsonl",
            "out.jsonl",
            "--favor-longer-ngram",
            "--do-permutation",
            "--seed",
            "7",
        ]);

        let config = PretrainConfig::from(&p);
        assert!(!config.favor_shorter_ngram);
        assert!(config.do_permutation);
        assert_eq!(config.seed, 7);
    }
}
