//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

// == Node Handle ==
/// Stable handle to a tracked key.
///
/// Returned by [`LruTracker::push_front`] and stored next to the cached value
/// so that touches and removals never have to search the list. A handle
/// outlives its key harmlessly: once the slot is freed its generation moves
/// on, and the old handle no longer matches whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node<K> {
    /// `None` while the slot sits on the free list
    key: Option<K>,
    /// Bumped every time the slot is freed
    generation: u32,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys live in an arena of nodes linked into a doubly-linked list:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Freed slots are recycled, so the arena never grows past the peak number
/// of simultaneously tracked keys. Every operation is O(1).
#[derive(Debug)]
pub struct LruTracker<K> {
    nodes: Vec<Node<K>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
    len: usize,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            free: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty tracker with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Starts tracking `key` as the most recently used entry.
    ///
    /// The tracker does not deduplicate: callers own the key set and must
    /// [`touch`](Self::touch) an existing handle instead of pushing twice.
    pub fn push_front(&mut self, key: K) -> NodeId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx].key = Some(key);
                idx
            }
            None => {
                self.nodes.push(Node {
                    key: Some(key),
                    generation: 0,
                    prev: None,
                    next: None,
                });
                self.nodes.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        NodeId {
            index: idx,
            generation: self.nodes[idx].generation,
        }
    }

    // == Touch ==
    /// Marks a tracked key as recently used (moves to front).
    ///
    /// Stale handles are ignored.
    pub fn touch(&mut self, id: NodeId) {
        if !self.is_live(id) || self.head == Some(id.index) {
            return;
        }
        self.unlink(id.index);
        self.link_front(id.index);
    }

    // == Remove ==
    /// Stops tracking the key behind `id` and returns it.
    ///
    /// Returns None for a stale handle, even if its slot has been reused.
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        if !self.is_live(id) {
            return None;
        }
        self.unlink(id.index);
        self.free.push(id.index);
        self.len -= 1;
        let node = &mut self.nodes[id.index];
        node.generation = node.generation.wrapping_add(1);
        node.key.take()
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let index = self.tail?;
        let generation = self.nodes[index].generation;
        self.remove(NodeId { index, generation })
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.tail.and_then(|idx| self.nodes[idx].key.as_ref())
    }

    /// Returns the key behind a handle, if it is still tracked.
    pub fn key(&self, id: NodeId) -> Option<&K> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes[id.index].key.as_ref()
    }

    /// Iterates tracked keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        std::iter::successors(self.head, move |&idx| self.nodes[idx].next)
            .filter_map(move |idx| self.nodes[idx].key.as_ref())
    }

    // == Clear ==
    /// Drops every tracked key. Slots stay allocated for reuse and every
    /// outstanding handle goes stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.key.take().is_some() {
                node.generation = node.generation.wrapping_add(1);
            }
            node.prev = None;
            node.next = None;
            self.free.push(index);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index)
            .is_some_and(|node| node.key.is_some() && node.generation == id.generation)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.nodes[idx];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[idx];
        node.prev = None;
        node.next = None;
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        if let Some(head) = self.head {
            self.nodes[head].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(lru: &LruTracker<&'static str>) -> Vec<&'static str> {
        lru.iter().copied().collect()
    }

    #[test]
    fn test_lru_new() {
        let lru: LruTracker<String> = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_push_front_order() {
        let mut lru = LruTracker::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(lru.peek_oldest(), Some(&"key1"));
        assert_eq!(order(&lru), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        let key1 = lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        lru.touch(key1);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some(&"key2"));
        assert_eq!(order(&lru), vec!["key1", "key3", "key2"]);
    }

    #[test]
    fn test_lru_touch_head_is_noop() {
        let mut lru = LruTracker::new();

        lru.push_front("a");
        let b = lru.push_front("b");
        lru.touch(b);
        lru.touch(b);

        assert_eq!(order(&lru), vec!["b", "a"]);
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = LruTracker::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.evict_oldest(), Some("key1"));
        assert_eq!(lru.len(), 2);

        assert_eq!(lru.evict_oldest(), Some("key2"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_lru_evict_empty() {
        let mut lru: LruTracker<&str> = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove_middle() {
        let mut lru = LruTracker::new();

        lru.push_front("key1");
        let key2 = lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.remove(key2), Some("key2"));

        assert_eq!(lru.len(), 2);
        assert_eq!(order(&lru), vec!["key3", "key1"]);
    }

    #[test]
    fn test_lru_remove_stale_handle() {
        let mut lru = LruTracker::new();

        let key1 = lru.push_front("key1");
        lru.push_front("key2");

        assert_eq!(lru.remove(key1), Some("key1"));
        assert_eq!(lru.remove(key1), None);
        lru.touch(key1);

        assert_eq!(lru.len(), 1);
        assert_eq!(order(&lru), vec!["key2"]);
    }

    #[test]
    fn test_lru_slots_are_recycled() {
        let mut lru = LruTracker::with_capacity(2);

        let a = lru.push_front("a");
        lru.push_front("b");
        lru.remove(a);
        let c = lru.push_front("c");

        // c reuses a's slot under a new generation
        assert_eq!(c.index, a.index);
        assert_ne!(c, a);
        assert_eq!(lru.key(c), Some(&"c"));
        assert_eq!(lru.key(a), None);
        assert_eq!(order(&lru), vec!["c", "b"]);
    }

    #[test]
    fn test_lru_stale_handle_after_slot_reuse() {
        let mut lru = LruTracker::new();

        let a = lru.push_front("a");
        lru.push_front("b");
        lru.remove(a);
        lru.push_front("c");

        // a's slot now holds c; the old handle must not reach it
        lru.touch(a);
        assert_eq!(order(&lru), vec!["c", "b"]);
        assert_eq!(lru.remove(a), None);
        assert_eq!(lru.len(), 2);
        assert_eq!(order(&lru), vec!["c", "b"]);
    }

    #[test]
    fn test_lru_handles_stale_after_clear() {
        let mut lru = LruTracker::new();

        let a = lru.push_front("a");
        lru.clear();
        let b = lru.push_front("b");

        assert_eq!(b.index, a.index);
        assert_eq!(lru.remove(a), None);
        assert_eq!(order(&lru), vec!["b"]);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        let a = lru.push_front("a");
        let b = lru.push_front("b");
        let c = lru.push_front("c");

        // [c, b, a] -> touch a -> [a, c, b] -> touch c -> [c, a, b] -> touch b -> [b, c, a]
        lru.touch(a);
        lru.touch(c);
        lru.touch(b);

        assert_eq!(lru.evict_oldest(), Some("a"));
        assert_eq!(lru.evict_oldest(), Some("c"));
        assert_eq!(lru.evict_oldest(), Some("b"));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruTracker::new();

        lru.push_front("a");
        lru.push_front("b");
        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.peek_oldest(), None);
        assert_eq!(lru.iter().count(), 0);

        lru.push_front("c");
        assert_eq!(order(&lru), vec!["c"]);
    }
}
