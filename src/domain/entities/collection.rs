use crate::domain::entities::record::Record;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// In-memory index of a collection's records, kept in insertion order.
///
/// Insertion order is what breaks ties between equally similar records, so it
/// must be reproducible from durable storage: records loaded from a backend
/// are ordered by `(created_at, id)`, and timestamps handed out by
/// [`Collection::next_created_at`] are strictly increasing.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    records: Vec<Record>,
    positions: HashMap<String, usize>,
    latest_created: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let mut collection = Self::new();
        for record in records {
            collection.upsert(record);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Replaces the record with the same id in place, or appends it.
    pub fn upsert(&mut self, record: Record) {
        self.latest_created = match self.latest_created {
            Some(latest) if latest >= record.created_at => Some(latest),
            _ => Some(record.created_at),
        };
        match self.positions.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let pos = self.positions.remove(id)?;
        let removed = self.records.remove(pos);
        for (offset, record) in self.records[pos..].iter().enumerate() {
            self.positions.insert(record.id.clone(), pos + offset);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.positions.clear();
    }

    /// Creation timestamp for a new record: the current time, bumped past
    /// both `floor` and every timestamp already indexed.
    pub fn next_created_at(&self, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = Utc::now();
        match floor.max(self.latest_created) {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        }
    }
}
