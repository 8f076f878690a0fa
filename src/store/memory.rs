//! In-Process Store
//!
//! A [`StoreClient`] that keeps every instance in memory. It mirrors the
//! behaviour expected from the remote store closely enough that the whole
//! command layer can be exercised without a network.
//!
//! ## Design Decisions
//!
//! 1. **One RwLock**: The shell runs one command at a time, so a single lock
//!    over all instances is enough.
//! 2. **Lazy Expiry**: Entries carry an optional deadline and are dropped the
//!    next time they are touched. There is no background sweeper.
//! 3. **Typed Values**: A key holds a string, an array or a hash. Using a key
//!    with the wrong kind of operation is an error, never a conversion.

use super::{Hash, StoreClient, StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::trace;

/// A value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Array(Vec<String>),
    Hash(Hash),
}

impl Value {
    /// Human name of the value kind, used in `WrongType` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
        }
    }
}

/// Represents a stored value with optional expiry time.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The actual value stored
    pub value: Value,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates an entry; a `ttl` of zero or less, or one too large to
    /// represent, never expires.
    pub fn new(value: Value, ttl: i64) -> Self {
        Self {
            value,
            expires_at: deadline(ttl),
        }
    }

    /// Checks if this entry has expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Instant::now() >= exp)
            .unwrap_or(false)
    }
}

/// Expiry instant for a TTL in seconds.
///
/// A TTL too far out for the clock to represent never expires.
fn deadline(ttl: i64) -> Option<Instant> {
    u64::try_from(ttl)
        .ok()
        .filter(|secs| *secs > 0)
        .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)))
}

/// The keys of one instance.
#[derive(Debug, Default)]
struct Instance {
    entries: HashMap<String, Entry>,
}

impl Instance {
    /// Returns the live entry for `name`, removing it first if it expired.
    fn live(&mut self, name: &str) -> Option<&mut Entry> {
        if self.entries.get(name).is_some_and(Entry::is_expired) {
            self.entries.remove(name);
            trace!(key = name, "Expired key removed");
        }
        self.entries.get_mut(name)
    }

    fn require(&mut self, name: &str) -> StoreResult<&mut Entry> {
        self.live(name)
            .ok_or_else(|| StoreError::KeyNotFound(name.to_string()))
    }

    fn array(&mut self, name: &str) -> StoreResult<&mut Vec<String>> {
        match &mut self.require(name)?.value {
            Value::Array(items) => Ok(items),
            other => Err(wrong_type(name, "array", other)),
        }
    }

    fn hash(&mut self, name: &str) -> StoreResult<&mut Hash> {
        match &mut self.require(name)?.value {
            Value::Hash(fields) => Ok(fields),
            other => Err(wrong_type(name, "hash", other)),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &Value) -> StoreError {
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}

fn position(key: &str, index: i64, len: usize) -> StoreResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| StoreError::IndexOutOfRange {
            key: key.to_string(),
            index,
        })
}

/// An in-memory store with instances, typed values and TTLs.
///
/// # Example
///
/// ```
/// use kvshell::store::{MemoryStore, StoreClient};
///
/// # tokio_test::block_on(async {
/// let mut store = MemoryStore::new();
/// store.create_instance("main").await.unwrap();
/// store.select_instance("main").await.unwrap();
/// store.set("name", "Ariz", 0).await.unwrap();
/// assert_eq!(store.get("name").await.unwrap(), "Ariz");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    instances: RwLock<HashMap<String, Instance>>,
    current: String,
    /// Statistics: store operations served
    op_count: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `name` already created and selected.
    pub fn with_instance(name: &str) -> Self {
        let mut instances = HashMap::new();
        instances.insert(name.to_string(), Instance::default());
        Self {
            instances: RwLock::new(instances),
            current: name.to_string(),
            op_count: AtomicU64::new(0),
        }
    }

    /// Number of store operations served so far (reads and writes).
    pub fn op_count(&self) -> u64 {
        self.op_count.load(Ordering::Relaxed)
    }

    #[inline]
    fn record(&self) {
        self.op_count.fetch_add(1, Ordering::Relaxed);
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Instance>> {
        self.instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the selected instance.
    fn with_current<T>(&self, f: impl FnOnce(&mut Instance) -> StoreResult<T>) -> StoreResult<T> {
        if self.current.is_empty() {
            return Err(StoreError::NoInstanceSelected);
        }
        let mut instances = self.write();
        let instance = instances
            .get_mut(&self.current)
            .ok_or_else(|| StoreError::InstanceNotFound(self.current.clone()))?;
        f(instance)
    }

    fn insert(&self, name: &str, value: Value, ttl: i64) -> StoreResult<()> {
        self.with_current(|instance| {
            instance
                .entries
                .insert(name.to_string(), Entry::new(value, ttl));
            Ok(())
        })
    }
}

impl StoreClient for MemoryStore {
    fn current_instance_name(&self) -> &str {
        &self.current
    }

    async fn list_instances(&self) -> StoreResult<Vec<String>> {
        self.record();
        let mut names: Vec<String> = self.write().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_instance(&self, name: &str) -> StoreResult<()> {
        self.record();
        let mut instances = self.write();
        if instances.contains_key(name) {
            return Err(StoreError::InstanceExists(name.to_string()));
        }
        instances.insert(name.to_string(), Instance::default());
        Ok(())
    }

    async fn select_instance(&mut self, name: &str) -> StoreResult<()> {
        self.record();
        if !self.write().contains_key(name) {
            return Err(StoreError::InstanceNotFound(name.to_string()));
        }
        self.current = name.to_string();
        Ok(())
    }

    async fn destroy(&mut self, name: &str) -> StoreResult<()> {
        self.record();
        if self.write().remove(name).is_none() {
            return Err(StoreError::InstanceNotFound(name.to_string()));
        }
        if self.current == name {
            self.current.clear();
        }
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        self.record();
        self.with_current(|instance| {
            instance.entries.retain(|_, entry| !entry.is_expired());
            let mut keys: Vec<String> = instance.entries.keys().cloned().collect();
            keys.sort();
            Ok(keys)
        })
    }

    async fn set(&self, name: &str, value: &str, ttl: i64) -> StoreResult<()> {
        self.record();
        self.insert(name, Value::Str(value.to_string()), ttl)
    }

    async fn get(&self, name: &str) -> StoreResult<String> {
        self.record();
        self.with_current(|instance| match &instance.require(name)?.value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(wrong_type(name, "string", other)),
        })
    }

    async fn del(&self, name: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            instance.require(name)?;
            instance.entries.remove(name);
            Ok(())
        })
    }

    /// A non-positive TTL removes the key straight away.
    async fn set_ttl(&self, name: &str, seconds: i64) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            if seconds <= 0 {
                instance.require(name)?;
                instance.entries.remove(name);
            } else {
                instance.require(name)?.expires_at = deadline(seconds);
            }
            Ok(())
        })
    }

    async fn del_ttl(&self, name: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            instance.require(name)?.expires_at = None;
            Ok(())
        })
    }

    async fn set_array(&self, name: &str, elements: &[String], ttl: i64) -> StoreResult<()> {
        self.record();
        self.insert(name, Value::Array(elements.to_vec()), ttl)
    }

    async fn get_array(&self, name: &str) -> StoreResult<Vec<String>> {
        self.record();
        self.with_current(|instance| Ok(instance.array(name)?.clone()))
    }

    async fn get_array_element(&self, name: &str, index: i64) -> StoreResult<String> {
        self.record();
        self.with_current(|instance| {
            let items = instance.array(name)?;
            let at = position(name, index, items.len())?;
            Ok(items[at].clone())
        })
    }

    /// Appends to an array, creating it when the key is absent.
    async fn add_array_element(&self, name: &str, value: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            if instance.live(name).is_none() {
                instance
                    .entries
                    .insert(name.to_string(), Entry::new(Value::Array(Vec::new()), 0));
            }
            instance.array(name)?.push(value.to_string());
            Ok(())
        })
    }

    async fn set_array_element(&self, name: &str, index: i64, value: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            let items = instance.array(name)?;
            let at = position(name, index, items.len())?;
            items[at] = value.to_string();
            Ok(())
        })
    }

    async fn del_array_element(&self, name: &str, index: i64) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            let items = instance.array(name)?;
            let at = position(name, index, items.len())?;
            items.remove(at);
            Ok(())
        })
    }

    async fn set_hash(&self, name: &str, hash: &Hash, ttl: i64) -> StoreResult<()> {
        self.record();
        self.insert(name, Value::Hash(hash.clone()), ttl)
    }

    async fn get_hash(&self, name: &str) -> StoreResult<Hash> {
        self.record();
        self.with_current(|instance| Ok(instance.hash(name)?.clone()))
    }

    async fn get_hash_element(&self, name: &str, key: &str) -> StoreResult<String> {
        self.record();
        self.with_current(|instance| {
            instance
                .hash(name)?
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::FieldNotFound {
                    key: name.to_string(),
                    field: key.to_string(),
                })
        })
    }

    /// Sets one field, creating the hash when the key is absent.
    async fn set_hash_element(&self, name: &str, key: &str, value: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            if instance.live(name).is_none() {
                instance
                    .entries
                    .insert(name.to_string(), Entry::new(Value::Hash(Hash::new()), 0));
            }
            instance
                .hash(name)?
                .insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    async fn del_hash_element(&self, name: &str, key: &str) -> StoreResult<()> {
        self.record();
        self.with_current(|instance| {
            instance
                .hash(name)?
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| StoreError::FieldNotFound {
                    key: name.to_string(),
                    field: key.to_string(),
                })
        })
    }
}
