use crate::document::{DocId, DocumentStatus};
use std::collections::BTreeMap;
use std::iter::Copied;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentData {
    pub rating: i32,
    pub status: DocumentStatus,
}

/// Per-document metadata. Its key set doubles as the ordered id set.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: BTreeMap<DocId, DocumentData>,
}

pub type DocumentIds<'a> = Copied<std::collections::btree_map::Keys<'a, DocId, DocumentData>>;

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, id: DocId, data: DocumentData) { self.documents.insert(id, data); }

    pub fn remove(&mut self, id: DocId) -> Option<DocumentData> { self.documents.remove(&id) }

    pub fn get(&self, id: DocId) -> Option<&DocumentData> { self.documents.get(&id) }

    pub fn contains(&self, id: DocId) -> bool { self.documents.contains_key(&id) }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    /// Ids in ascending order.
    pub fn ids(&self) -> DocumentIds<'_> { self.documents.keys().copied() }
}

/// Mean of `ratings`, truncated toward zero; 0 for an empty list.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}
