//! Keyed disjoint-set forest.
//!
//! Keys are interned on first reference. `find` walks iteratively and
//! compresses the path afterwards, so deep chains of wire vertices never
//! touch the call stack.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct UnionFind<K> {
    index: HashMap<K, usize>,
    keys: Vec<K>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl<K: Clone + Eq + Hash> UnionFind<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            keys: Vec::new(),
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Register `key` as a singleton if it is new; returns its slot.
    pub fn insert(&mut self, key: K) -> usize {
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }
        let slot = self.keys.len();
        self.index.insert(key.clone(), slot);
        self.keys.push(key);
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    /// Root key of the group containing `key`, creating a singleton if needed.
    pub fn find(&mut self, key: K) -> K {
        let slot = self.insert(key);
        let root = self.find_slot(slot);
        self.keys[root].clone()
    }

    pub fn union(&mut self, a: K, b: K) {
        let a = self.insert(a);
        let b = self.insert(b);
        let root_a = self.find_slot(a);
        let root_b = self.find_slot(b);
        if root_a == root_b {
            return;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }
    }

    /// All groups as `(root, members)`.
    ///
    /// Groups are ordered by their earliest-inserted member, and members keep
    /// insertion order.
    pub fn groups(&mut self) -> Vec<(K, Vec<K>)> {
        let mut order: Vec<usize> = Vec::new();
        let mut members: HashMap<usize, Vec<K>> = HashMap::new();

        for slot in 0..self.keys.len() {
            let root = self.find_slot(slot);
            members
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    Vec::new()
                })
                .push(self.keys[slot].clone());
        }

        order
            .into_iter()
            .map(|root| {
                let group = members.remove(&root).unwrap_or_default();
                (self.keys[root].clone(), group)
            })
            .collect()
    }

    fn find_slot(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }
}

impl<K: Clone + Eq + Hash> Default for UnionFind<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_creates_singleton() {
        let mut uf: UnionFind<&str> = UnionFind::new();
        assert_eq!(uf.find("a"), "a");
        assert_eq!(uf.len(), 1);
        assert!(uf.contains(&"a"));
    }

    #[test]
    fn test_union_merges_groups() {
        let mut uf = UnionFind::new();
        uf.union("a", "b");
        uf.union("c", "d");
        assert_eq!(uf.find("a"), uf.find("b"));
        assert_ne!(uf.find("a"), uf.find("c"));

        uf.union("b", "d");
        assert_eq!(uf.find("a"), uf.find("c"));
    }

    #[test]
    fn test_groups_order_and_members() {
        let mut uf = UnionFind::new();
        uf.insert("x");
        uf.union("a", "b");
        uf.union("c", "a");
        uf.insert("y");

        let groups = uf.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].1, vec!["x"]);
        assert_eq!(groups[1].1, vec!["a", "b", "c"]);
        assert_eq!(groups[2].1, vec!["y"]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut uf = UnionFind::new();
        for i in 0..200_000u32 {
            uf.union(i, i + 1);
        }
        assert_eq!(uf.find(0), uf.find(200_000));
        assert_eq!(uf.groups().len(), 1);
    }
}
