// ── Ordered reactive collection ──
//
// Single-writer storage with push-based change notification via a
// `watch` channel. Every write goes through `send_modify`, so writes are
// serialized and the last one for a given key wins.

use std::sync::Arc;

use tokio::sync::watch;

/// An entity with a stable identity inside a collection.
pub(crate) trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> &Self::Key;
}

pub(crate) type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// Ordered collection for a single entity type.
///
/// Keeps insertion (server) order. Subscribers receive a fresh
/// `Arc<Vec<Arc<T>>>` on every mutation that changed something.
pub(crate) struct EntityCollection<T: Keyed + Send + Sync + 'static> {
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Keyed + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Replace the whole collection.
    pub(crate) fn replace_all(&self, entities: Vec<T>) {
        let values: Vec<Arc<T>> = entities.into_iter().map(Arc::new).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    /// Insert or update by key. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let mut is_new = false;
        self.snapshot.send_modify(|snap| {
            let mut values = Vec::clone(snap);
            let entity = Arc::new(entity);
            match values.iter().position(|v| v.key() == entity.key()) {
                Some(idx) => {
                    if let Some(slot) = values.get_mut(idx) {
                        *slot = entity;
                    }
                }
                None => {
                    is_new = true;
                    values.push(entity);
                }
            }
            *snap = Arc::new(values);
        });
        is_new
    }

    /// Replace the entry stored under `key`, keeping its position.
    /// Returns `false` (and changes nothing) if no such entry exists.
    pub(crate) fn replace(&self, key: &T::Key, entity: T) -> bool {
        self.snapshot.send_if_modified(|snap| {
            let Some(idx) = snap.iter().position(|v| v.key() == key) else {
                return false;
            };
            let mut values = Vec::clone(snap);
            if let Some(slot) = values.get_mut(idx) {
                *slot = Arc::new(entity);
            }
            *snap = Arc::new(values);
            true
        })
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &T::Key) -> Option<Arc<T>> {
        let mut removed = None;
        self.snapshot.send_if_modified(|snap| {
            let Some(idx) = snap.iter().position(|v| v.key() == key) else {
                return false;
            };
            let mut values = Vec::clone(snap);
            removed = Some(values.remove(idx));
            *snap = Arc::new(values);
            true
        });
        removed
    }

    pub(crate) fn get(&self, key: &T::Key) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|v| v.key() == key)
            .map(Arc::clone)
    }

    pub(crate) fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|v| pred(v))
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        value: &'static str,
    }

    impl Keyed for Item {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.id
        }
    }

    fn item(id: u32, value: &'static str) -> Item {
        Item { id, value }
    }

    fn values(col: &EntityCollection<Item>) -> Vec<&'static str> {
        col.snapshot().iter().map(|i| i.value).collect()
    }

    #[test]
    fn upsert_appends_new_and_updates_in_place() {
        let col = EntityCollection::new();
        assert!(col.upsert(item(1, "a")));
        assert!(col.upsert(item(2, "b")));
        assert!(!col.upsert(item(1, "a2")));
        assert_eq!(values(&col), vec!["a2", "b"]);
    }

    #[test]
    fn replace_only_touches_existing_entries() {
        let col = EntityCollection::new();
        col.replace_all(vec![item(1, "a"), item(2, "b")]);

        assert!(col.replace(&2, item(2, "b2")));
        assert!(!col.replace(&3, item(3, "c")));
        assert_eq!(values(&col), vec!["a", "b2"]);
    }

    #[test]
    fn remove_returns_entity() {
        let col = EntityCollection::new();
        col.replace_all(vec![item(1, "a"), item(2, "b")]);

        assert_eq!(col.remove(&1).unwrap().value, "a");
        assert!(col.remove(&1).is_none());
        assert!(col.get(&1).is_none());
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn replace_all_keeps_server_order() {
        let col = EntityCollection::new();
        col.replace_all(vec![item(3, "c"), item(1, "a")]);
        assert_eq!(values(&col), vec!["c", "a"]);
        col.replace_all(Vec::new());
        assert!(col.is_empty());
    }

    #[test]
    fn subscribers_see_only_real_changes() {
        let col = EntityCollection::new();
        let mut rx = col.subscribe();

        col.remove(&9);
        assert!(!rx.has_changed().unwrap());

        col.upsert(item(1, "a"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert_eq!(col.find(|i| i.value == "a").unwrap().id, 1);
    }
}
