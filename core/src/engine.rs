use crate::document::{DocId, Document, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::{InvertedIndex, WordFrequencies};
use crate::query::{parse_query, Query};
use crate::ranking::{select_top, DocumentPredicate, Ranker};
use crate::store::{average_rating, DocumentData, DocumentIds, DocumentStore};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use rayon::prelude::*;

/// Default number of shards in the parallel ranking accumulator.
pub const DEFAULT_SHARD_COUNT: usize = 100;

/// How a ranking, matching or removal call does its work. Both policies give
/// identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionPolicy {
    /// Ordered maps, no internal threads.
    #[default]
    Sequential,
    /// Fan out over the rayon pool; ranking accumulates in a [`crate::ConcurrentMap`].
    Parallel,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub shard_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { shard_count: DEFAULT_SHARD_COUNT }
    }
}

/// Plus words of a query found in one document, with that document's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDocument<'a> {
    /// Sorted, deduplicated. Empty when a minus word matched.
    pub words: Vec<&'a str>,
    pub status: DocumentStatus,
}

/// In-memory TF-IDF search engine.
///
/// Reads take `&self` and may run from many threads at once; `add_document` and
/// `remove_document` take `&mut self`, so mutation is always serialized.
#[derive(Debug, Default)]
pub struct SearchEngine {
    stop_words: StopWords,
    index: InvertedIndex,
    documents: DocumentStore,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(stop_words, EngineConfig::default())
    }

    pub fn with_config<I, S>(stop_words: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            stop_words: StopWords::new(stop_words)?,
            index: InvertedIndex::new(),
            documents: DocumentStore::new(),
            config,
        })
    }

    /// Build from a space-separated stop word list, e.g. `"and in on"`.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id < 0 || self.documents.contains(id) {
            return Err(SearchError::InvalidDocumentId { id });
        }
        let words = self.split_into_words_no_stop(text)?;
        self.index.insert(id, &words);
        self.documents.insert(id, DocumentData { rating: average_rating(ratings), status });
        tracing::debug!(id, words = words.len(), ?status, "document added");
        Ok(())
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(SearchError::InvalidWord { word: word.to_string() });
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    /// Erase a document from every structure. Unknown ids are a no-op.
    pub fn remove_document(&mut self, id: DocId, policy: ExecutionPolicy) {
        if self.documents.remove(id).is_none() {
            tracing::trace!(id, "remove of unknown document ignored");
            return;
        }
        match policy {
            ExecutionPolicy::Sequential => self.index.remove(id),
            ExecutionPolicy::Parallel => self.index.remove_parallel(id),
        };
        tracing::debug!(id, ?policy, "document removed");
    }

    /// Top documents for `raw_query`, best first, at most
    /// [`crate::ranking::MAX_RESULT_DOCUMENT_COUNT`].
    ///
    /// `filter` is either a [`DocumentStatus`] or a closure
    /// `Fn(DocId, DocumentStatus, i32) -> bool`.
    pub fn find_top_documents<P>(
        &self,
        raw_query: &str,
        filter: P,
        policy: ExecutionPolicy,
    ) -> Result<Vec<Document>>
    where
        P: DocumentPredicate,
    {
        let query = self.parse_query(raw_query, policy)?;
        tracing::trace!(
            plus = query.plus_words.len(),
            minus = query.minus_words.len(),
            ?policy,
            "ranking query"
        );
        let matched = self.ranker().find_all_documents(&query, &filter, policy);
        Ok(select_top(matched))
    }

    /// [`SearchEngine::find_top_documents`] restricted to
    /// [`DocumentStatus::Actual`] documents.
    pub fn find_top_documents_actual(
        &self,
        raw_query: &str,
        policy: ExecutionPolicy,
    ) -> Result<Vec<Document>> {
        self.find_top_documents(raw_query, DocumentStatus::Actual, policy)
    }

    /// Plus words of `raw_query` present in document `id`. `Ok(None)` if the
    /// document is unknown.
    pub fn match_document<'a>(
        &'a self,
        raw_query: &str,
        id: DocId,
        policy: ExecutionPolicy,
    ) -> Result<Option<MatchedDocument<'a>>> {
        let query = self.parse_query(raw_query, policy)?;
        let Some(data) = self.documents.get(id) else {
            return Ok(None);
        };
        let status = data.status;
        let index = &self.index;
        let words = match policy {
            ExecutionPolicy::Sequential => {
                if query.minus_words.iter().any(|word| index.contains(word, id)) {
                    Vec::new()
                } else {
                    query
                        .plus_words
                        .iter()
                        .filter_map(|word| index.term_in_document(word, id))
                        .collect()
                }
            }
            ExecutionPolicy::Parallel => {
                if query.minus_words.par_iter().any(|word| index.contains(word, id)) {
                    Vec::new()
                } else {
                    query
                        .plus_words
                        .par_iter()
                        .filter_map(|word| index.term_in_document(word, id))
                        .collect()
                }
            }
        };
        Ok(Some(MatchedDocument { words, status }))
    }

    fn parse_query<'q>(&self, raw_query: &'q str, policy: ExecutionPolicy) -> Result<Query<'q>> {
        parse_query(raw_query, &self.stop_words, policy)
    }

    fn ranker(&self) -> Ranker<'_> {
        Ranker {
            index: &self.index,
            documents: &self.documents,
            shard_count: self.config.shard_count,
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Ids of indexed documents in ascending order.
    pub fn document_ids(&self) -> DocumentIds<'_> {
        self.documents.ids()
    }

    /// Term frequencies of document `id`; empty if it is unknown.
    pub fn word_frequencies(&self, id: DocId) -> &WordFrequencies {
        self.index.word_frequencies(id)
    }

    /// Frequency of `term` in document `id` read from the term-to-document side
    /// of the index.
    pub fn term_frequency(&self, term: &str, id: DocId) -> Option<f64> {
        self.index.term_frequency(term, id)
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<'a> IntoIterator for &'a SearchEngine {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids()
    }
}
