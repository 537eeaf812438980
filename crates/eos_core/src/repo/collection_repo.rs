//! Generic collection repository and record identity bindings.

use crate::model::note::Note;
use crate::model::project::Project;
use crate::model::setting::Setting;
use crate::model::task::Task;
use crate::store::{load_records, save_records, Collection, CollectionStore, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A record persisted in one fixed collection, addressed by a string id.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn record_id(&self) -> &str;
}

impl Record for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn record_id(&self) -> &str {
        &self.project_id
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn record_id(&self) -> &str {
        &self.task_id
    }
}

impl Record for Note {
    const COLLECTION: Collection = Collection::Notes;

    fn record_id(&self) -> &str {
        &self.note_id
    }
}

impl Record for Setting {
    const COLLECTION: Collection = Collection::Settings;

    fn record_id(&self) -> &str {
        &self.key
    }
}

/// Replaces the record with the same id in place, or appends it.
///
/// Returns `true` when an existing record was replaced.
pub fn upsert_by_id<T: Record>(records: &mut Vec<T>, record: T) -> bool {
    match records
        .iter()
        .position(|existing| existing.record_id() == record.record_id())
    {
        Some(index) => {
            records[index] = record;
            true
        }
        None => {
            records.push(record);
            false
        }
    }
}

/// Repository for the collection that holds `T`.
pub struct CollectionRepo<'s, S: ?Sized, T> {
    store: &'s S,
    _record: PhantomData<fn() -> T>,
}

impl<'s, S, T> CollectionRepo<'s, S, T>
where
    S: CollectionStore + ?Sized,
    T: Record,
{
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        T::COLLECTION
    }

    /// Returns whether the collection has ever been written.
    pub fn exists(&self) -> StoreResult<bool> {
        self.store.contains(T::COLLECTION)
    }

    /// Loads every record in stored order.
    pub fn load(&self) -> StoreResult<Vec<T>> {
        load_records(self.store, T::COLLECTION)
    }

    /// Replaces the whole collection.
    pub fn store_all(&self, records: &[T]) -> StoreResult<()> {
        save_records(self.store, T::COLLECTION, records)
    }

    /// Finds one record by id. `None` when the id does not resolve.
    pub fn find(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|record| record.record_id() == id))
    }

    /// Upserts one record by id and persists the collection.
    pub fn upsert(&self, record: T) -> StoreResult<()> {
        let mut records = self.load()?;
        upsert_by_id(&mut records, record);
        self.store_all(&records)
    }

    /// Removes every record matching `predicate`.
    ///
    /// Returns the number removed. Nothing is written when it is zero.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<usize> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|record| !predicate(record));
        let removed = before - records.len();
        if removed > 0 {
            self.store_all(&records)?;
        }
        Ok(removed)
    }

    /// Removes the record with `id`; returns whether it existed.
    pub fn remove(&self, id: &str) -> StoreResult<bool> {
        Ok(self.remove_where(|record| record.record_id() == id)? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::upsert_by_id;
    use crate::model::setting::Setting;

    #[test]
    fn upsert_replaces_in_place_and_appends_new() {
        let mut settings = vec![Setting::new("a", "1"), Setting::new("b", "2")];

        assert!(upsert_by_id(&mut settings, Setting::new("a", "10")));
        assert!(!upsert_by_id(&mut settings, Setting::new("c", "3")));

        let keys: Vec<_> = settings.iter().map(|s| (s.key.as_str(), s.value.as_str())).collect();
        assert_eq!(keys, [("a", "10"), ("b", "2"), ("c", "3")]);
    }
}
