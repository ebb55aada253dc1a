use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::security::Security;

use super::course::Course;
use super::feedback::Feedback;
use super::user::{PasswordHash, User};

/// A record kept in a [`Table`].
pub trait Record {
    fn id(&self) -> Uuid;
}

/// Keyed collection that remembers insertion order.
///
/// Rows live under a sequence number; `push_back` takes the next number past
/// the end and `push_front` the next one before the start, so iteration walks
/// rows in the order they were placed.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    index: HashMap<Uuid, i64>,
    front: i64,
    back: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            rows: BTreeMap::new(),
            index: HashMap::new(),
            front: 0,
            back: 0,
        }
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Table<T> {
        Table::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.index.get(&id).and_then(|seq| self.rows.get(seq))
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.index.get(&id).and_then(|seq| self.rows.get_mut(seq))
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.iter().find(|&it| predicate(it))
    }

    /// Appends `row`. A row already stored under the same id is replaced.
    pub fn push_back(&mut self, row: T) {
        self.remove(row.id());
        let seq = self.back;
        self.back += 1;
        self.place(seq, row);
    }

    /// Prepends `row`. A row already stored under the same id is replaced.
    pub fn push_front(&mut self, row: T) {
        self.remove(row.id());
        self.front -= 1;
        let seq = self.front;
        self.place(seq, row);
    }

    fn place(&mut self, seq: i64, row: T) {
        self.index.insert(row.id(), seq);
        self.rows.insert(seq, row);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let seq = self.index.remove(&id)?;
        self.rows.remove(&seq)
    }

    /// Keeps rows matching `keep`, returns how many were dropped.
    pub fn retain(&mut self, keep: impl Fn(&T) -> bool) -> usize {
        let before = self.rows.len();
        let index = &mut self.index;
        self.rows.retain(|_, row| {
            let kept = keep(&*row);
            if !kept {
                index.remove(&row.id());
            }
            kept
        });
        before - self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.index.clear();
        self.front = 0;
        self.back = 0;
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    pub users: Table<User>,
    pub courses: Table<Course>,
    pub feedback: Table<Feedback>,
}

struct StoreInner {
    tables: RwLock<Tables>,
    security: Security,
    config: Config,
}

/// Handle to the portal's in-memory collections.
///
/// Clones share the same collections. All writes go through one lock, so
/// mutations (including the user/feedback cascade) are applied one at a time.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("latency_ms", &self.inner.config.latency_ms)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(config: Config, security: Security) -> Store {
        Store {
            inner: Arc::new(StoreInner {
                tables: RwLock::new(Tables::default()),
                security,
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn security(&self) -> &Security {
        &self.inner.security
    }

    /// Waits out the configured latency. Every operation calls this before
    /// touching the collections.
    pub(crate) async fn settle(&self) {
        let latency = self.inner.config.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// Runs bcrypt on the blocking pool so the executor keeps serving other
    /// operations while a password is hashed.
    pub(crate) async fn hash_password(&self, password: &str) -> StoreResult<PasswordHash> {
        let password = password.to_string();
        let security = self.inner.security.clone();
        tokio::task::spawn_blocking(move || PasswordHash::new(password, &security))
            .await
            .map_err(|err| StoreError::Internal(err.to_string()))
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.tables.write().await
    }

    pub async fn is_empty(&self) -> bool {
        let tables = self.read().await;
        tables.users.is_empty() && tables.courses.is_empty() && tables.feedback.is_empty()
    }

    /// Drops every record. The handle stays usable afterwards.
    pub async fn shutdown(&self) {
        let mut tables = self.write().await;
        tracing::info!(
            users = tables.users.len(),
            courses = tables.courses.len(),
            feedback = tables.feedback.len(),
            "Clearing store collections."
        );
        tables.users.clear();
        tables.courses.clear();
        tables.feedback.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(Uuid, &'static str);

    impl Record for Row {
        fn id(&self) -> Uuid {
            self.0
        }
    }

    fn names(table: &Table<Row>) -> Vec<&'static str> {
        table.iter().map(|it| it.1).collect()
    }

    #[test]
    fn front_and_back_keep_placement_order() {
        let mut table = Table::new();
        table.push_back(Row(Uuid::new_v4(), "b"));
        table.push_back(Row(Uuid::new_v4(), "c"));
        table.push_front(Row(Uuid::new_v4(), "a"));
        table.push_front(Row(Uuid::new_v4(), "first"));

        assert_eq!(names(&table), vec!["first", "a", "b", "c"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn lookup_and_remove_by_id() {
        let mut table = Table::new();
        let id = Uuid::new_v4();
        table.push_back(Row(id, "x"));

        assert_eq!(table.get(id).map(|it| it.1), Some("x"));
        assert!(table.contains(id));
        assert_eq!(table.remove(id).map(|it| it.1), Some("x"));
        assert!(table.get(id).is_none());
        assert!(table.remove(id).is_none());
    }

    #[test]
    fn retain_updates_index() {
        let mut table = Table::new();
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        table.push_back(Row(keep, "keep"));
        table.push_back(Row(drop, "drop"));
        table.push_back(Row(Uuid::new_v4(), "drop"));

        assert_eq!(table.retain(|it| it.1 == "keep"), 2);
        assert!(table.contains(keep));
        assert!(!table.contains(drop));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn pushing_same_id_replaces_row() {
        let mut table = Table::new();
        let id = Uuid::new_v4();
        table.push_back(Row(id, "old"));
        table.push_back(Row(id, "new"));

        assert_eq!(table.len(), 1);
        assert_eq!(names(&table), vec!["new"]);
    }

    #[tokio::test]
    async fn shutdown_clears_collections() {
        let store = test_util::test_store();
        assert!(store.is_empty().await);
        crate::data::seed::seed(&store)
            .await
            .expect("seeding an empty store");
        assert!(!store.is_empty().await);

        store.shutdown().await;
        assert!(store.is_empty().await);
    }
}
