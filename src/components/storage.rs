//! Sled-backed persistence for component and item prototypes.
//!
//! Every revision of a component prototype is its own record, keyed
//! `component:{id:020}:{revision:010}` so that a prefix scan over one id walks
//! its revisions in order. Records are bincode-encoded and carry a schema
//! version; the type-specific fields travel as the `<Definition>` XML string.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sled::IVec;

use crate::components::errors::ComponentError;
use crate::components::item::{ItemProto, PrototypeSource};
use crate::components::manager::ComponentManager;
use crate::components::proto::{ComponentPrototype, ProtoHeader};
use crate::components::types::{ProtoKey, RevisionStatus};

pub const COMPONENT_SCHEMA_VERSION: u8 = 1;
pub const ITEM_SCHEMA_VERSION: u8 = 1;

const TREE_COMPONENTS: &str = "component_protos";
const TREE_ITEMS: &str = "item_protos";
const TREE_META: &str = "meta";

const COUNTER_COMPONENT: &str = "next_component_id";
const COUNTER_ITEM: &str = "next_item_id";

/// One stored revision of a component prototype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentProtoRecord {
    pub schema_version: u8,
    pub header: ProtoHeader,
    pub type_name: String,
    /// The `<Definition>` element as written by the component type.
    pub definition: String,
}

impl ComponentProtoRecord {
    pub fn from_prototype(prototype: &ComponentPrototype) -> Self {
        Self {
            schema_version: COMPONENT_SCHEMA_VERSION,
            header: prototype.header().clone(),
            type_name: prototype.type_name().to_string(),
            definition: prototype.save_to_xml(),
        }
    }

    pub fn key(&self) -> ProtoKey {
        self.header.key()
    }

    /// Rebuild the live prototype through the manager's database loaders.
    pub fn into_prototype(self, manager: &ComponentManager) -> Result<ComponentPrototype, ComponentError> {
        manager.load_prototype(self.header, &self.type_name, &self.definition)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProtoRecord {
    pub schema_version: u8,
    pub proto: ItemProto,
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct ComponentStoreBuilder {
    path: PathBuf,
    flush_on_write: bool,
}

impl ComponentStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flush_on_write: true,
        }
    }

    /// Leave flushing to sled's background thread (bulk imports, tests).
    pub fn without_flush(mut self) -> Self {
        self.flush_on_write = false;
        self
    }

    pub fn open(self) -> Result<ComponentStore, ComponentError> {
        ComponentStore::open_with_options(self.path, self.flush_on_write)
    }
}

pub struct ComponentStore {
    _db: sled::Db,
    components: sled::Tree,
    items: sled::Tree,
    meta: sled::Tree,
    flush_on_write: bool,
}

impl ComponentStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ComponentError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, flush_on_write: bool) -> Result<Self, ComponentError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let components = db.open_tree(TREE_COMPONENTS)?;
        let items = db.open_tree(TREE_ITEMS)?;
        let meta = db.open_tree(TREE_META)?;
        debug!("component store opened at {}", path_ref.display());
        Ok(Self {
            _db: db,
            components,
            items,
            meta,
            flush_on_write,
        })
    }

    fn component_key(key: ProtoKey) -> Vec<u8> {
        format!("component:{:020}:{:010}", key.id, key.revision).into_bytes()
    }

    fn component_prefix(id: u64) -> Vec<u8> {
        format!("component:{:020}:", id).into_bytes()
    }

    fn item_key(id: u64) -> Vec<u8> {
        format!("item:{:020}", id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ComponentError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, ComponentError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn decode_component(bytes: IVec) -> Result<ComponentProtoRecord, ComponentError> {
        let record: ComponentProtoRecord = Self::deserialize(bytes)?;
        if record.schema_version != COMPONENT_SCHEMA_VERSION {
            return Err(ComponentError::SchemaMismatch {
                entity: "component prototype",
                expected: COMPONENT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    fn flush(&self, tree: &sled::Tree) -> Result<(), ComponentError> {
        if self.flush_on_write {
            tree.flush()?;
        }
        Ok(())
    }

    fn next_id(&self, counter: &str) -> Result<u64, ComponentError> {
        let updated = self.meta.update_and_fetch(counter.as_bytes(), |old| {
            let current = old.map(decode_counter).unwrap_or(0);
            Some(current.saturating_add(1).to_be_bytes().to_vec())
        })?;
        self.flush(&self.meta)?;
        updated
            .map(|bytes| decode_counter(&bytes))
            .ok_or_else(|| ComponentError::NotFound(format!("counter {}", counter)))
    }

    // ========================================================================
    // Component prototypes
    // ========================================================================

    /// Allocate a fresh component prototype id.
    pub fn next_component_id(&self) -> Result<u64, ComponentError> {
        self.next_id(COUNTER_COMPONENT)
    }

    /// Insert or overwrite the record for this prototype's revision.
    pub fn put_component(&self, prototype: &ComponentPrototype) -> Result<(), ComponentError> {
        self.put_component_record(&ComponentProtoRecord::from_prototype(prototype))
    }

    pub fn put_component_record(&self, record: &ComponentProtoRecord) -> Result<(), ComponentError> {
        let mut record = record.clone();
        record.schema_version = COMPONENT_SCHEMA_VERSION;
        let bytes = Self::serialize(&record)?;
        self.components
            .insert(Self::component_key(record.key()), bytes)?;
        self.flush(&self.components)?;
        debug!(
            "stored {} component {} [{}]",
            record.type_name,
            record.key(),
            record.header.status
        );
        Ok(())
    }

    /// Persist a prototype and clear its pending-changes marker.
    pub fn save_component(&self, prototype: &mut ComponentPrototype) -> Result<(), ComponentError> {
        self.put_component(prototype)?;
        prototype.mark_saved();
        Ok(())
    }

    pub fn get_component_record(&self, key: ProtoKey) -> Result<ComponentProtoRecord, ComponentError> {
        let Some(bytes) = self.components.get(Self::component_key(key))? else {
            return Err(ComponentError::NotFound(format!("component {}", key)));
        };
        Self::decode_component(bytes)
    }

    pub fn load_component(
        &self,
        manager: &ComponentManager,
        key: ProtoKey,
    ) -> Result<ComponentPrototype, ComponentError> {
        self.get_component_record(key)?.into_prototype(manager)
    }

    /// Every stored revision of component `id`, oldest first.
    pub fn component_revisions(&self, id: u64) -> Result<Vec<ComponentProtoRecord>, ComponentError> {
        self.components
            .scan_prefix(Self::component_prefix(id))
            .map(|entry| {
                entry
                    .map_err(ComponentError::from)
                    .and_then(|(_key, value)| Self::decode_component(value))
            })
            .collect()
    }

    /// The approved revision of component `id`, if one exists.
    pub fn current_component(
        &self,
        manager: &ComponentManager,
        id: u64,
    ) -> Result<Option<ComponentPrototype>, ComponentError> {
        self.component_revisions(id)?
            .into_iter()
            .rev()
            .find(|record| record.header.status == RevisionStatus::Current)
            .map(|record| record.into_prototype(manager))
            .transpose()
    }

    /// The highest revision of component `id`, whatever its status.
    pub fn latest_component(
        &self,
        manager: &ComponentManager,
        id: u64,
    ) -> Result<ComponentPrototype, ComponentError> {
        self.component_revisions(id)?
            .pop()
            .ok_or_else(|| ComponentError::NotFound(format!("component #{}", id)))?
            .into_prototype(manager)
    }

    /// The latest revision of every stored component, ordered by id.
    pub fn list_components(&self) -> Result<Vec<ComponentProtoRecord>, ComponentError> {
        let mut latest: Vec<ComponentProtoRecord> = Vec::new();
        for entry in self.components.scan_prefix(b"component:") {
            let (_key, value) = entry?;
            let record = Self::decode_component(value)?;
            match latest.last_mut() {
                Some(last) if last.header.id == record.header.id => *last = record,
                _ => latest.push(record),
            }
        }
        Ok(latest)
    }

    /// Approve a draft: it becomes current and any previously current revision
    /// of the same id is superseded. Both records are written.
    pub fn approve_component(
        &self,
        manager: &ComponentManager,
        draft: &mut ComponentPrototype,
        reviewer: &str,
    ) -> Result<(), ComponentError> {
        let previous = self.current_component(manager, draft.id())?;
        draft.change_status(RevisionStatus::Current, reviewer)?;
        if let Some(mut previous) = previous.filter(|previous| previous.key() != draft.key()) {
            previous.change_status(RevisionStatus::Superseded, reviewer)?;
            self.save_component(&mut previous)?;
        }
        self.save_component(draft)?;
        info!("component {} approved", draft.key());
        Ok(())
    }

    /// Bind the store to a manager so it can serve prototypes to item instantiation.
    pub fn source<'a>(&'a self, manager: &'a ComponentManager) -> StoreSource<'a> {
        StoreSource {
            store: self,
            manager,
        }
    }

    // ========================================================================
    // Item prototypes
    // ========================================================================

    pub fn next_item_id(&self) -> Result<u64, ComponentError> {
        self.next_id(COUNTER_ITEM)
    }

    pub fn put_item_proto(&self, proto: &ItemProto) -> Result<(), ComponentError> {
        let record = ItemProtoRecord {
            schema_version: ITEM_SCHEMA_VERSION,
            proto: proto.clone(),
        };
        self.items
            .insert(Self::item_key(proto.id), Self::serialize(&record)?)?;
        self.flush(&self.items)?;
        debug!("stored item proto #{} ({})", proto.id, proto.name);
        Ok(())
    }

    pub fn get_item_proto(&self, id: u64) -> Result<ItemProto, ComponentError> {
        let Some(bytes) = self.items.get(Self::item_key(id))? else {
            return Err(ComponentError::NotFound(format!("item proto #{}", id)));
        };
        let record: ItemProtoRecord = Self::deserialize(bytes)?;
        if record.schema_version != ITEM_SCHEMA_VERSION {
            return Err(ComponentError::SchemaMismatch {
                entity: "item prototype",
                expected: ITEM_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record.proto)
    }

    pub fn list_item_proto_ids(&self) -> Result<Vec<u64>, ComponentError> {
        let mut ids = Vec::new();
        for entry in self.items.scan_prefix(b"item:") {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(id) = text.strip_prefix("item:").and_then(|id| id.parse().ok()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn decode_counter(bytes: &[u8]) -> u64 {
    <[u8; 8]>::try_from(bytes)
        .map(u64::from_be_bytes)
        .unwrap_or(0)
}

/// [`PrototypeSource`] backed by the store.
pub struct StoreSource<'a> {
    store: &'a ComponentStore,
    manager: &'a ComponentManager,
}

impl PrototypeSource for StoreSource<'_> {
    fn component(&self, key: ProtoKey) -> Result<Arc<ComponentPrototype>, ComponentError> {
        self.store
            .load_component(self.manager, key)
            .map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::kinds::belt::Belt;
    use tempfile::TempDir;

    #[test]
    fn component_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = ComponentStoreBuilder::new(dir.path()).open().expect("store");
        let manager = ComponentManager::with_builtin_types();

        let id = store.next_component_id().expect("id");
        let mut belt = manager
            .new_prototype("belt", id, "tester", "Leather Belt")
            .expect("proto");
        store.save_component(&mut belt).expect("save");
        assert!(!belt.is_changed());

        let loaded = store.load_component(&manager, belt.key()).expect("load");
        assert_eq!(loaded.name(), "Leather Belt");
        assert_eq!(loaded.definition_as::<Belt>(), belt.definition_as::<Belt>());
        assert!(store.current_component(&manager, id).expect("current").is_none());
    }

    #[test]
    fn ids_are_monotonic_and_survive_reopen() {
        let dir = TempDir::new().expect("tempdir");
        {
            let store = ComponentStoreBuilder::new(dir.path()).open().expect("store");
            assert_eq!(store.next_component_id().expect("id"), 1);
            assert_eq!(store.next_component_id().expect("id"), 2);
            assert_eq!(store.next_item_id().expect("id"), 1);
        }
        let store = ComponentStoreBuilder::new(dir.path()).open().expect("store");
        assert_eq!(store.next_component_id().expect("id"), 3);
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let store = ComponentStoreBuilder::new(dir.path()).open().expect("store");
        let manager = ComponentManager::with_builtin_types();
        let belt = manager.new_prototype("belt", 9, "tester", "Belt").expect("proto");

        let mut record = ComponentProtoRecord::from_prototype(&belt);
        record.schema_version = COMPONENT_SCHEMA_VERSION + 1;
        store
            .components
            .insert(
                ComponentStore::component_key(record.key()),
                bincode::serialize(&record).expect("encode"),
            )
            .expect("insert");
        assert!(matches!(
            store.get_component_record(belt.key()),
            Err(ComponentError::SchemaMismatch { .. })
        ));
    }
}
