//! In-memory TF-IDF search engine with plus/minus query semantics.

pub mod concurrent_map;
pub mod dedup;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod process_queries;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod store;
pub mod tokenizer;

pub use concurrent_map::ConcurrentMap;
pub use document::{DocId, Document, DocumentStatus};
pub use engine::{EngineConfig, ExecutionPolicy, MatchedDocument, SearchEngine};
pub use error::{Result, SearchError};
pub use ranking::DocumentPredicate;
