use crate::document::DocId;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Interned term text. One allocation per distinct word, shared by both halves
/// of the index.
pub type Term = Arc<str>;

pub type WordFrequencies = BTreeMap<Term, f64>;

static EMPTY_FREQUENCIES: WordFrequencies = BTreeMap::new();

/// Forward (document -> term -> tf) and inverted (term -> document -> tf) maps,
/// always mutated together so that every (document, term) pair appears in both
/// with the same frequency.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    word_to_document_freqs: HashMap<Term, BTreeMap<DocId, f64>>,
    document_to_word_freqs: BTreeMap<DocId, WordFrequencies>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index `words` (stop words already removed) for `doc_id`. Term frequency
    /// is occurrences over `words.len()`; an empty slice records nothing.
    pub fn insert(&mut self, doc_id: DocId, words: &[&str]) {
        if words.is_empty() {
            return;
        }
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &word in words {
            *counts.entry(word).or_insert(0) += 1;
        }
        let total = words.len() as f64;
        let mut forward = WordFrequencies::new();
        for (word, count) in counts {
            let term = self.intern(word);
            let tf = count as f64 / total;
            self.word_to_document_freqs.entry(Arc::clone(&term)).or_default().insert(doc_id, tf);
            forward.insert(term, tf);
        }
        self.document_to_word_freqs.insert(doc_id, forward);
    }

    fn intern(&self, word: &str) -> Term {
        match self.word_to_document_freqs.get_key_value(word) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(word),
        }
    }

    /// Erase `doc_id` from both halves, visiting its terms one by one.
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        let Some(freqs) = self.document_to_word_freqs.remove(&doc_id) else {
            return false;
        };
        for term in freqs.keys() {
            if let Some(bucket) = self.word_to_document_freqs.get_mut(term) {
                bucket.remove(&doc_id);
                if bucket.is_empty() {
                    self.word_to_document_freqs.remove(term);
                }
            }
        }
        true
    }

    /// Same effect as [`InvertedIndex::remove`], with the document's own term
    /// buckets cleared by the rayon pool. The buckets are taken out of the map,
    /// edited in parallel and put back unless empty, so the work is
    /// proportional to the document's term count.
    pub fn remove_parallel(&mut self, doc_id: DocId) -> bool {
        let Some(freqs) = self.document_to_word_freqs.remove(&doc_id) else {
            return false;
        };
        let mut buckets: Vec<(Term, BTreeMap<DocId, f64>)> = freqs
            .keys()
            .filter_map(|term| self.word_to_document_freqs.remove_entry(term))
            .collect();
        buckets.par_iter_mut().for_each(|(_, bucket)| {
            bucket.remove(&doc_id);
        });
        self.word_to_document_freqs
            .extend(buckets.into_iter().filter(|(_, bucket)| !bucket.is_empty()));
        true
    }

    /// Documents containing `word`, with their term frequency.
    pub fn postings(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.word_to_document_freqs.get(word)
    }

    /// The interned text of `word` if it occurs in `doc_id`.
    pub fn term_in_document(&self, word: &str, doc_id: DocId) -> Option<&str> {
        self.word_to_document_freqs
            .get_key_value(word)
            .filter(|(_, bucket)| bucket.contains_key(&doc_id))
            .map(|(term, _)| &**term)
    }

    pub fn contains(&self, word: &str, doc_id: DocId) -> bool {
        self.term_in_document(word, doc_id).is_some()
    }

    /// Frequency of `word` in `doc_id` as recorded on the term side.
    pub fn term_frequency(&self, word: &str, doc_id: DocId) -> Option<f64> {
        self.word_to_document_freqs.get(word)?.get(&doc_id).copied()
    }

    /// Frequencies recorded on the document side; empty when `doc_id` is unknown.
    pub fn word_frequencies(&self, doc_id: DocId) -> &WordFrequencies {
        self.document_to_word_freqs.get(&doc_id).unwrap_or(&EMPTY_FREQUENCIES)
    }

    pub fn term_count(&self) -> usize {
        self.word_to_document_freqs.len()
    }
}
