use crate::document::DocId;

/// Errors surfaced by the engine. Every variant is an invalid-argument failure:
/// the offending call had no effect on indexed state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Negative id, or an id that is already indexed
    #[error("invalid document id: {id}")]
    InvalidDocumentId { id: DocId },

    /// Word containing a control character (document text or stop word)
    #[error("word {word:?} is invalid")]
    InvalidWord { word: String },

    /// Malformed query token: empty, lone or double minus, or a control character
    #[error("query word {word:?} is invalid")]
    InvalidQueryWord { word: String },
}

impl SearchError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidDocumentId { .. }
                | SearchError::InvalidWord { .. }
                | SearchError::InvalidQueryWord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
