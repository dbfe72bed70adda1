use crate::document::{Document, DocumentStatus};
use crate::engine::{ExecutionPolicy, SearchEngine};
use crate::error::Result;
use crate::ranking::DocumentPredicate;
use std::collections::VecDeque;

/// Number of most recent requests kept in the window (one per minute of a day).
pub const MIN_IN_DAY: usize = 1440;

#[derive(Debug, Clone, Copy)]
struct QueryResult {
    has_results: bool,
}

/// Records whether recent searches found anything.
pub struct RequestQueue<'a> {
    engine: &'a SearchEngine,
    requests: VecDeque<QueryResult>,
}

impl<'a> RequestQueue<'a> {
    pub fn new(engine: &'a SearchEngine) -> Self {
        Self { engine, requests: VecDeque::with_capacity(MIN_IN_DAY) }
    }

    /// Search [`DocumentStatus::Actual`] documents and record whether anything
    /// was found.
    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_by(raw_query, DocumentStatus::Actual)
    }

    pub fn add_find_request_with_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.add_find_request_by(raw_query, status)
    }

    /// Run a sequential top-documents search and record whether it found
    /// anything. Malformed queries are returned as errors and not recorded.
    pub fn add_find_request_by<P>(&mut self, raw_query: &str, filter: P) -> Result<Vec<Document>>
    where
        P: DocumentPredicate,
    {
        let policy = ExecutionPolicy::Sequential;
        let result = self.engine.find_top_documents(raw_query, filter, policy)?;
        self.requests.push_back(QueryResult { has_results: !result.is_empty() });
        if self.requests.len() > MIN_IN_DAY {
            self.requests.pop_front();
        }
        Ok(result)
    }

    /// Requests in the window that returned nothing.
    pub fn no_result_requests(&self) -> usize {
        self.requests.iter().filter(|r| !r.has_results).count()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocId;

    fn engine() -> SearchEngine {
        let docs: [(DocId, &str, &[i32]); 5] = [
            (1, "curly cat curly tail", &[7, 2, 7]),
            (2, "curly dog and fancy collar", &[1, 2, 3]),
            (3, "big cat fancy collar ", &[1, 2, 8]),
            (4, "big dog sparrow Eugene", &[1, 3, 2]),
            (5, "big dog sparrow Vasiliy", &[1, 1, 1]),
        ];
        let mut engine = SearchEngine::from_stop_words_text("and in at").unwrap();
        for (id, text, ratings) in docs {
            engine.add_document(id, text, DocumentStatus::Actual, ratings).unwrap();
        }
        engine
    }

    #[test]
    fn window_evicts_oldest_requests() {
        let engine = engine();
        let mut queue = RequestQueue::new(&engine);
        for _ in 0..MIN_IN_DAY - 1 {
            queue.add_find_request("empty request").unwrap();
        }
        assert_eq!(queue.no_result_requests(), MIN_IN_DAY - 1);
        queue.add_find_request("curly dog").unwrap();
        queue.add_find_request("big collar").unwrap();
        queue.add_find_request("sparrow").unwrap();
        assert_eq!(queue.len(), MIN_IN_DAY);
        assert_eq!(queue.no_result_requests(), MIN_IN_DAY - 3);
    }

    #[test]
    fn parse_errors_are_not_recorded() {
        let engine = engine();
        let mut queue = RequestQueue::new(&engine);
        assert!(queue.add_find_request("cat --dog").is_err());
        assert!(queue.is_empty());
        let hits = queue
            .add_find_request_by("dog", |_: DocId, _: DocumentStatus, rating: i32| rating > 1)
            .unwrap();
        assert_eq!(hits.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(queue.no_result_requests(), 0);
    }

    #[test]
    fn status_requests_share_the_window() {
        let mut engine = engine();
        engine.add_document(6, "banned parrot", DocumentStatus::Banned, &[4]).unwrap();
        let mut queue = RequestQueue::new(&engine);
        assert!(queue.add_find_request("parrot").unwrap().is_empty());
        let hits = queue.add_find_request_with_status("parrot", DocumentStatus::Banned).unwrap();
        assert_eq!(hits.iter().map(|d| d.id).collect::<Vec<_>>(), vec![6]);
        let misses = queue.add_find_request_with_status("cat", DocumentStatus::Banned).unwrap();
        assert!(misses.is_empty());
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.no_result_requests(), 2);
    }
}
