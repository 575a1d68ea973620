//! In-memory metadata store keyed by entry ID.
//!
//! The store knows nothing about vectors. [`IndexedCollection`] owns one
//! store next to its index and keeps the two in lockstep.
//!
//! [`IndexedCollection`]: crate::IndexedCollection

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::payload::Payload;
use crate::vector::VectorId;

/// Maps entry IDs to their metadata records.
///
/// Records are kept in ID order, so serialization is deterministic. There is
/// no eviction: the store grows with the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataStore {
    records: BTreeMap<VectorId, Payload>,
}

impl MetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the ID is already present. The
    /// existing record is left untouched.
    pub fn insert(&mut self, id: VectorId, payload: Payload) -> Result<()> {
        if self.records.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        self.records.insert(id, payload);
        Ok(())
    }

    /// Gets the record for an ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record exists.
    pub fn get(&self, id: VectorId) -> Result<&Payload> {
        self.records.get(&id).ok_or(Error::NotFound(id))
    }

    #[inline]
    pub fn contains(&self, id: VectorId) -> bool {
        self.records.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (VectorId, &Payload)> {
        self.records.iter().map(|(&id, payload)| (id, payload))
    }

    /// Iterates over IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = VectorId> + '_ {
        self.records.keys().copied()
    }

    /// Serializes the store as a JSON object keyed by stringified ID.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| Error::IoError(format!("metadata serialization failed: {}", e)))
    }

    /// Restores a store produced by [`MetadataStore::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::CorruptSnapshot(format!("metadata deserialization failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut store = MetadataStore::new();
        store
            .insert(0, Payload::new().with_field("text", "a"))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().get_str("text"), Some("a"));
    }

    #[test]
    fn test_get_missing() {
        let store = MetadataStore::new();
        assert!(matches!(store.get(3), Err(Error::NotFound(3))));
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let mut store = MetadataStore::new();
        store
            .insert(1, Payload::new().with_field("text", "first"))
            .unwrap();

        let result = store.insert(1, Payload::new().with_field("text", "second"));
        assert!(matches!(result, Err(Error::DuplicateId(1))));
        assert_eq!(store.get(1).unwrap().get_str("text"), Some("first"));
    }

    #[test]
    fn test_serialization_keys_are_stringified_ids() {
        let mut store = MetadataStore::new();
        store
            .insert(10, Payload::new().with_field("text", "ten"))
            .unwrap();
        store
            .insert(2, Payload::new().with_field("text", "two"))
            .unwrap();

        let bytes = store.to_bytes().unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"2":{"text":"two"},"10":{"text":"ten"}}"#
        );

        let restored = MetadataStore::from_bytes(&bytes).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.ids().collect::<Vec<_>>(), vec![2, 10]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = MetadataStore::from_bytes(b"{\"x\": 1}");
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));
    }
}
