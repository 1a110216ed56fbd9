//! Corpus reading.
//!
//! Input is newline-delimited JSON: one record per line, each holding a
//! token sequence under a configurable field. Every record becomes a
//! single-sentence document. Surface tokens are interned into integer
//! ids in first-seen order, offset past the reserved ids, so reading is
//! deterministic for a given input.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use serde_json::Value;

use crate::error::Error;
use crate::types::special::RESERVED_TOKEN_COUNT;
use crate::types::{Corpus, Document, TokenId};

/// Interns surface tokens into vocabulary ids (first-seen order).
#[derive(Debug, Default)]
struct Vocab {
    ids: HashMap<String, TokenId>,
}

impl Vocab {
    fn intern(&mut self, token: &str) -> TokenId {
        match self.ids.get(token) {
            Some(&id) => id,
            None => {
                let id = RESERVED_TOKEN_COUNT + self.ids.len() as TokenId;
                self.ids.insert(token.to_string(), id);
                id
            }
        }
    }

    fn len(&self) -> u32 {
        self.ids.len() as u32
    }
}

/// JSONL corpus reader.
pub struct CorpusReader {
    sequence_column: String,
}

impl CorpusReader {
    pub fn new(sequence_column: &str) -> Self {
        Self {
            sequence_column: sequence_column.to_string(),
        }
    }

    /// Reads every file matching the provided glob pattern into one
    /// corpus. Files are visited in path order so interning does not
    /// depend on filesystem enumeration.
    pub fn read_glob(&self, pattern: &Path) -> Result<Corpus, Error> {
        let pattern = pattern.to_string_lossy();
        let mut paths: Vec<PathBuf> = glob::glob(&pattern)?.collect::<Result<_, _>>()?;
        paths.sort();

        let mut vocab = Vocab::default();
        let mut documents = Vec::new();
        for path in paths {
            let file = BufReader::new(File::open(&path)?);
            self.read_lines(file, &mut vocab, &mut documents)?;
        }

        if documents.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(Corpus::new(documents, vocab.len()))
    }

    /// Reads one JSONL stream, appending documents and growing the
    /// vocabulary. Malformed records are dropped with a warning, they
    /// never abort the batch.
    fn read_lines<R: BufRead>(
        &self,
        reader: R,
        vocab: &mut Vocab,
        documents: &mut Vec<Document>,
    ) -> Result<(), Error> {
        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record: Value = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    warn!("line {line_number}: invalid JSON, dropping record ({e})");
                    continue;
                }
            };

            match self.sentence_from_record(&record, vocab) {
                Some(sentence) if !sentence.is_empty() => {
                    documents.push(Document::new(vec![sentence]));
                }
                Some(_) => warn!("line {line_number}: empty sequence, dropping record"),
                None => warn!(
                    "line {line_number}: no `{}` token array, dropping record",
                    self.sequence_column
                ),
            }
        }
        Ok(())
    }

    fn sentence_from_record(&self, record: &Value, vocab: &mut Vocab) -> Option<Vec<TokenId>> {
        let tokens = record.get(&self.sequence_column)?.as_array()?;

        let mut sentence = Vec::with_capacity(tokens.len());
        for token in tokens {
            let surface = match token {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            sentence.push(vocab.intern(&surface));
        }
        Some(sentence)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::types::special::RESERVED_TOKEN_COUNT;

    use super::{CorpusReader, Vocab};

    #[test]
    fn interning_is_first_seen_and_offset() {
        let mut vocab = Vocab::default();
        assert_eq!(vocab.intern("foo"), RESERVED_TOKEN_COUNT);
        assert_eq!(vocab.intern("bar"), RESERVED_TOKEN_COUNT + 1);
        assert_eq!(vocab.intern("foo"), RESERVED_TOKEN_COUNT);
        assert_eq!(vocab.len(), 2);
    }

    #[test_log::test]
    fn reads_documents_and_drops_bad_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"seq": ["a", "b", "c"]}}"#).unwrap();
        writeln!(file, r#"{{"seq": []}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"other": ["a"]}}"#).unwrap();
        writeln!(file, r#"{{"seq": ["b", "d"]}}"#).unwrap();
        file.flush().unwrap();

        let reader = CorpusReader::new("seq");
        let corpus = reader.read_glob(file.path()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.vocabulary_size(), 4);
        assert_eq!(
            corpus.documents()[0].sentences()[0],
            vec![5, 6, 7],
            "ids start after the reserved block, in first-seen order"
        );
        assert_eq!(corpus.documents()[1].sentences()[0], vec![6, 8]);
    }

    #[test]
    fn missing_file_errors() {
        let reader = CorpusReader::new("seq");
        assert!(reader
            .read_glob(std::path::Path::new("/nonexistent/nowhere-*.jsonl"))
            .is_err());
    }
}
