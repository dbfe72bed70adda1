//! TF-IDF ranking over the inverted index.
//!
//! Relevance of a document is the sum over matching plus words of
//! `tf * ln(N / df)`. Any minus word present in the document removes it from
//! the results, whatever the predicate says.

use crate::concurrent_map::ConcurrentMap;
use crate::document::{DocId, Document, DocumentStatus};
use crate::engine::ExecutionPolicy;
use crate::index::InvertedIndex;
use crate::query::Query;
use crate::store::DocumentStore;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Highest number of results returned by a top-documents query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are ranked by rating instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Decides whether a document may be ranked, from its id, status and rating.
pub trait DocumentPredicate: Sync {
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentPredicate for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(id, status, rating)
    }
}

/// A bare status keeps only documents carrying that status.
impl DocumentPredicate for DocumentStatus {
    fn accept(&self, _id: DocId, status: DocumentStatus, _rating: i32) -> bool {
        *self == status
    }
}

pub(crate) struct Ranker<'a> {
    pub index: &'a InvertedIndex,
    pub documents: &'a DocumentStore,
    pub shard_count: usize,
}

impl Ranker<'_> {
    fn inverse_document_freq(&self, docs_with_term: usize) -> f64 {
        (self.documents.len() as f64 / docs_with_term as f64).ln()
    }

    /// Every document with at least one plus word, no minus word, and accepted by
    /// `predicate`, in ascending id order.
    pub fn find_all_documents<P>(
        &self,
        query: &Query<'_>,
        predicate: &P,
        policy: ExecutionPolicy,
    ) -> Vec<Document>
    where
        P: DocumentPredicate + ?Sized,
    {
        let relevance = match policy {
            ExecutionPolicy::Sequential => self.accumulate_sequential(query, predicate),
            ExecutionPolicy::Parallel => self.accumulate_parallel(query, predicate),
        };
        relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                let data = self.documents.get(id)?;
                Some(Document::new(id, relevance, data.rating))
            })
            .collect()
    }

    fn accumulate_sequential<P>(&self, query: &Query<'_>, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: DocumentPredicate + ?Sized,
    {
        let mut relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.index.postings(word) else { continue };
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &tf) in postings {
                let Some(data) = self.documents.get(id) else { continue };
                if predicate.accept(id, data.status, data.rating) {
                    *relevance.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }
        for word in &query.minus_words {
            let Some(postings) = self.index.postings(word) else { continue };
            for id in postings.keys() {
                relevance.remove(id);
            }
        }
        relevance
    }

    fn accumulate_parallel<P>(&self, query: &Query<'_>, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: DocumentPredicate + ?Sized,
    {
        let relevance: ConcurrentMap<DocId, f64> = ConcurrentMap::new(self.shard_count);
        query.plus_words.par_iter().for_each(|word| {
            let Some(postings) = self.index.postings(word) else { return };
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &tf) in postings {
                let Some(data) = self.documents.get(id) else { continue };
                if predicate.accept(id, data.status, data.rating) {
                    *relevance.entry(id) += tf * idf;
                }
            }
        });
        query.minus_words.par_iter().for_each(|word| {
            let Some(postings) = self.index.postings(word) else { return };
            for id in postings.keys() {
                relevance.remove(id);
            }
        });
        relevance.drain_ordered()
    }
}

/// Whether `lhs` ranks strictly above `rhs`: higher relevance, or higher rating
/// when relevances are within [`RELEVANCE_EPSILON`].
pub fn outranks(lhs: &Document, rhs: &Document) -> bool {
    if (lhs.relevance - rhs.relevance).abs() < RELEVANCE_EPSILON {
        lhs.rating > rhs.rating
    } else {
        lhs.relevance > rhs.relevance
    }
}

/// Keep the best [`MAX_RESULT_DOCUMENT_COUNT`] documents, best first.
///
/// Candidates are placed ahead of the first kept document they outrank, so
/// documents that tie keep their input order.
pub fn select_top(candidates: Vec<Document>) -> Vec<Document> {
    let mut top: Vec<Document> = Vec::with_capacity(MAX_RESULT_DOCUMENT_COUNT + 1);
    for doc in candidates {
        let pos = top.iter().position(|kept| outranks(&doc, kept)).unwrap_or(top.len());
        if pos < MAX_RESULT_DOCUMENT_COUNT {
            top.insert(pos, doc);
            top.truncate(MAX_RESULT_DOCUMENT_COUNT);
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, relevance: f64, rating: i32) -> Document {
        Document::new(id, relevance, rating)
    }

    #[test]
    fn close_relevance_falls_back_to_rating() {
        assert!(outranks(&doc(1, 0.5, 1), &doc(2, 0.4, 9)));
        assert!(outranks(&doc(1, 0.5, 9), &doc(2, 0.5 + 1e-7, 1)));
        assert!(!outranks(&doc(1, 0.5, 3), &doc(2, 0.5, 3)));
    }

    #[test]
    fn select_top_caps_and_orders() {
        let candidates = (0..8).map(|i| doc(i, f64::from(i) * 0.1, 0)).collect();
        let top = select_top(candidates);
        assert_eq!(top.iter().map(|d| d.id).collect::<Vec<_>>(), vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn ties_keep_input_order() {
        let top = select_top(vec![doc(1, 0.3, 2), doc(2, 0.3, 2), doc(3, 0.3, 4)]);
        assert_eq!(top.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn status_and_closure_predicates() {
        assert!(DocumentStatus::Banned.accept(1, DocumentStatus::Banned, 0));
        assert!(!DocumentStatus::Actual.accept(1, DocumentStatus::Banned, 0));
        let even = |id: DocId, _: DocumentStatus, _: i32| id % 2 == 0;
        assert!(even.accept(2, DocumentStatus::Removed, 0));
        assert!(!even.accept(3, DocumentStatus::Actual, 0));
    }
}
