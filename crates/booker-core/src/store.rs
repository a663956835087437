//! Persistence contract with optimistic versioning, and an in-memory store.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::campaign::Campaign;
use crate::error::{BookerError, BookerResult};
use crate::ids::{CampaignId, RivalryId, SegmentId, TitleId, WrestlerId};
use crate::rivalry::Rivalry;
use crate::segment::Segment;
use crate::title::Title;
use crate::wrestler::Wrestler;

/// A value stored and versioned as a unit.
pub trait Aggregate: Clone + 'static {
    /// Identifier type.
    type Id: Copy + Eq + Hash + fmt::Display + 'static;
    /// Name used in errors.
    const KIND: &'static str;
    /// The aggregate's identifier.
    fn id(&self) -> Self::Id;
}

impl Aggregate for Wrestler {
    type Id = WrestlerId;
    const KIND: &'static str = "wrestler";
    fn id(&self) -> WrestlerId {
        self.id
    }
}

impl Aggregate for Rivalry {
    type Id = RivalryId;
    const KIND: &'static str = "rivalry";
    fn id(&self) -> RivalryId {
        self.id
    }
}

impl Aggregate for Title {
    type Id = TitleId;
    const KIND: &'static str = "title";
    fn id(&self) -> TitleId {
        self.id
    }
}

impl Aggregate for Campaign {
    type Id = CampaignId;
    const KIND: &'static str = "campaign";
    fn id(&self) -> CampaignId {
        self.id
    }
}

impl Aggregate for Segment {
    type Id = SegmentId;
    const KIND: &'static str = "segment";
    fn id(&self) -> SegmentId {
        self.id
    }
}

/// An aggregate together with the version it was loaded at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The loaded value.
    pub value: T,
    /// Version at load time.
    pub version: u64,
}

/// Load/save access to every aggregate kind.
///
/// `save` must reject a record whose version no longer matches the stored
/// one with [`BookerError::ConcurrentModification`].
pub trait Store {
    /// Load an aggregate and its current version.
    fn load<T: Aggregate>(&self, id: T::Id) -> BookerResult<Versioned<T>>;

    /// Current version of an aggregate, if stored.
    fn version_of<T: Aggregate>(&self, id: T::Id) -> Option<u64>;

    /// Store a new aggregate at version 1.
    fn insert<T: Aggregate>(&mut self, value: T) -> BookerResult<()>;

    /// Replace an aggregate loaded at `record.version`. Returns the new version.
    fn save<T: Aggregate>(&mut self, record: Versioned<T>) -> BookerResult<u64>;

    /// Every stored aggregate of one kind, in insertion order.
    fn all<T: Aggregate>(&self) -> Vec<T>;

    /// Check every staged change, then apply them all. Nothing is written
    /// if any check fails.
    fn commit(&mut self, changes: ChangeSet) -> BookerResult<()>
    where
        Self: Sized,
    {
        changes.verify(self)?;
        changes.apply(self)
    }
}

/// Changes staged by one command, committed together.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    wrestlers: Vec<Versioned<Wrestler>>,
    rivalries: Vec<Versioned<Rivalry>>,
    titles: Vec<Versioned<Title>>,
    campaigns: Vec<Versioned<Campaign>>,
    segments: Vec<Versioned<Segment>>,
    new_rivalries: Vec<Rivalry>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an updated wrestler.
    pub fn wrestler(&mut self, record: Versioned<Wrestler>) -> &mut Self {
        self.wrestlers.push(record);
        self
    }

    /// Stage an updated rivalry.
    pub fn rivalry(&mut self, record: Versioned<Rivalry>) -> &mut Self {
        self.rivalries.push(record);
        self
    }

    /// Stage a rivalry that does not exist yet.
    pub fn new_rivalry(&mut self, rivalry: Rivalry) -> &mut Self {
        self.new_rivalries.push(rivalry);
        self
    }

    /// Stage an updated title.
    pub fn title(&mut self, record: Versioned<Title>) -> &mut Self {
        self.titles.push(record);
        self
    }

    /// Stage an updated campaign.
    pub fn campaign(&mut self, record: Versioned<Campaign>) -> &mut Self {
        self.campaigns.push(record);
        self
    }

    /// Stage an updated segment.
    pub fn segment(&mut self, record: Versioned<Segment>) -> &mut Self {
        self.segments.push(record);
        self
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.wrestlers.is_empty()
            && self.rivalries.is_empty()
            && self.titles.is_empty()
            && self.campaigns.is_empty()
            && self.segments.is_empty()
            && self.new_rivalries.is_empty()
    }

    fn verify<S: Store>(&self, store: &S) -> BookerResult<()> {
        check_versions(store, &self.wrestlers)?;
        check_versions(store, &self.rivalries)?;
        check_versions(store, &self.titles)?;
        check_versions(store, &self.campaigns)?;
        check_versions(store, &self.segments)?;
        for rivalry in &self.new_rivalries {
            if store.version_of::<Rivalry>(rivalry.id).is_some() {
                return Err(BookerError::AlreadyExists {
                    kind: Rivalry::KIND,
                    id: rivalry.id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply<S: Store>(self, store: &mut S) -> BookerResult<()> {
        for rivalry in self.new_rivalries {
            store.insert(rivalry)?;
        }
        for record in self.wrestlers {
            store.save(record)?;
        }
        for record in self.rivalries {
            store.save(record)?;
        }
        for record in self.titles {
            store.save(record)?;
        }
        for record in self.campaigns {
            store.save(record)?;
        }
        for record in self.segments {
            store.save(record)?;
        }
        Ok(())
    }
}

fn check_versions<S: Store, T: Aggregate>(store: &S, records: &[Versioned<T>]) -> BookerResult<()> {
    for record in records {
        let id = record.value.id();
        match store.version_of::<T>(id) {
            None => return Err(BookerError::not_found(T::KIND, id)),
            Some(v) if v != record.version => {
                return Err(BookerError::ConcurrentModification {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

struct Table<T: Aggregate> {
    rows: Vec<Versioned<T>>,
    index: HashMap<T::Id, usize>,
}

impl<T: Aggregate> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

/// A [`Store`] that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<TypeId, Box<dyn Any>>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("tables", &self.tables.len())
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn table<T: Aggregate>(&self) -> Option<&Table<T>> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|t| t.downcast_ref::<Table<T>>())
    }

    fn table_mut<T: Aggregate>(&mut self) -> BookerResult<&mut Table<T>> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Table::<T>::default()))
            .downcast_mut::<Table<T>>()
            .ok_or_else(|| BookerError::InvalidConfig(format!("{} table type mismatch", T::KIND)))
    }
}

impl Store for MemoryStore {
    fn load<T: Aggregate>(&self, id: T::Id) -> BookerResult<Versioned<T>> {
        self.table::<T>()
            .and_then(|t| t.index.get(&id).map(|&i| t.rows[i].clone()))
            .ok_or_else(|| BookerError::not_found(T::KIND, id))
    }

    fn version_of<T: Aggregate>(&self, id: T::Id) -> Option<u64> {
        self.table::<T>()
            .and_then(|t| t.index.get(&id).map(|&i| t.rows[i].version))
    }

    fn insert<T: Aggregate>(&mut self, value: T) -> BookerResult<()> {
        let id = value.id();
        let table = self.table_mut::<T>()?;
        if table.index.contains_key(&id) {
            return Err(BookerError::AlreadyExists {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        table.index.insert(id, table.rows.len());
        table.rows.push(Versioned { value, version: 1 });
        Ok(())
    }

    fn save<T: Aggregate>(&mut self, record: Versioned<T>) -> BookerResult<u64> {
        let id = record.value.id();
        let table = self.table_mut::<T>()?;
        let slot = table
            .index
            .get(&id)
            .copied()
            .ok_or_else(|| BookerError::not_found(T::KIND, id))?;
        let stored = &mut table.rows[slot];
        if stored.version != record.version {
            return Err(BookerError::ConcurrentModification {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        stored.value = record.value;
        stored.version += 1;
        Ok(stored.version)
    }

    fn all<T: Aggregate>(&self) -> Vec<T> {
        self.table::<T>()
            .map(|t| t.rows.iter().map(|r| r.value.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_load() {
        let mut store = MemoryStore::new();
        let w = Wrestler::new("Ace", 1_000);
        let id = w.id;
        store.insert(w).unwrap();
        let loaded = store.load::<Wrestler>(id).unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.value.name, "Ace");
    }

    #[test]
    fn missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load::<Title>(TitleId::new()).unwrap_err();
        assert!(matches!(err, BookerError::NotFound { kind: "title", .. }));
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut store = MemoryStore::new();
        let w = Wrestler::new("Ace", 0);
        store.insert(w.clone()).unwrap();
        assert!(matches!(
            store.insert(w),
            Err(BookerError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn stale_save_is_concurrent_modification() {
        let mut store = MemoryStore::new();
        let w = Wrestler::new("Ace", 0);
        let id = w.id;
        store.insert(w).unwrap();

        let mut first = store.load::<Wrestler>(id).unwrap();
        let mut second = store.load::<Wrestler>(id).unwrap();
        first.value.add_fans(500);
        assert_eq!(store.save(first).unwrap(), 2);

        second.value.add_fans(700);
        let err = store.save(second).unwrap_err();
        assert!(matches!(err, BookerError::ConcurrentModification { .. }));
        assert_eq!(store.load::<Wrestler>(id).unwrap().value.fans, 500);
    }

    #[test]
    fn all_keeps_insertion_order() {
        let mut store = MemoryStore::new();
        for name in ["A", "B", "C"] {
            store.insert(Wrestler::new(name, 0)).unwrap();
        }
        let names: Vec<_> = store.all::<Wrestler>().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(store.all::<Campaign>().is_empty());
    }

    #[test]
    fn commit_is_all_or_nothing() {
        let mut store = MemoryStore::new();
        let a = Wrestler::new("A", 0);
        let b = Wrestler::new("B", 0);
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a).unwrap();
        store.insert(b).unwrap();

        let mut a_rec = store.load::<Wrestler>(a_id).unwrap();
        let mut b_rec = store.load::<Wrestler>(b_id).unwrap();
        a_rec.value.add_fans(100);
        b_rec.value.add_fans(100);

        let mut bump = store.load::<Wrestler>(b_id).unwrap();
        bump.value.add_bump();
        store.save(bump).unwrap();

        let mut changes = ChangeSet::new();
        changes.wrestler(a_rec).wrestler(b_rec);
        let err = store.commit(changes).unwrap_err();
        assert!(matches!(err, BookerError::ConcurrentModification { .. }));
        assert_eq!(store.load::<Wrestler>(a_id).unwrap().value.fans, 0);
    }

    #[test]
    fn commit_inserts_new_rivalries() {
        let mut store = MemoryStore::new();
        let rivalry = Rivalry::new(WrestlerId::new(), WrestlerId::new());
        let id = rivalry.id;
        let mut changes = ChangeSet::new();
        changes.new_rivalry(rivalry);
        assert!(!changes.is_empty());
        store.commit(changes).unwrap();
        assert_eq!(store.version_of::<Rivalry>(id), Some(1));
    }
}
