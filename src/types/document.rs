//! Corpus-side types: sentences, documents and the corpus itself.
use serde::{Deserialize, Serialize};

use super::special::TokenId;

/// Ordered token ids. Immutable once loaded.
pub type Sentence = Vec<TokenId>;

/// A document is an ordered sequence of sentences.
///
/// Empty documents are invalid and must be filtered out before instance
/// generation (the corpus loader does it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

impl From<Vec<Sentence>> for Document {
    fn from(sentences: Vec<Sentence>) -> Self {
        Self::new(sentences)
    }
}

/// An ordered collection of documents plus the vocabulary size needed for
/// random-replacement sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
    /// Number of non-reserved vocabulary entries.
    vocabulary_size: u32,
}

impl Corpus {
    /// Builds a corpus, discarding empty documents.
    pub fn new(documents: Vec<Document>, vocabulary_size: u32) -> Self {
        let documents = documents.into_iter().filter(|d| !d.is_empty()).collect();
        Self {
            documents,
            vocabulary_size,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut Vec<Document> {
        &mut self.documents
    }

    pub fn vocabulary_size(&self) -> u32 {
        self.vocabulary_size
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Corpus, Document};

    #[test]
    fn empty_documents_are_dropped() {
        let docs = vec![
            Document::new(vec![vec![5, 6]]),
            Document::new(vec![]),
            Document::new(vec![vec![7]]),
        ];
        let corpus = Corpus::new(docs, 10);
        assert_eq!(corpus.len(), 2);
    }
}
