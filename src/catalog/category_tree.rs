//! In-memory category hierarchy.
//!
//! The whole `categories` table is small, so the tree is loaded once per
//! request (`CategoryRepo::list_nodes`) and walked in memory instead of keeping
//! a closure table. Every walk carries a visited set: a malformed `parent_id`
//! cycle ends the walk rather than looping.

use std::collections::{HashMap, HashSet};

use crate::DbId;

/// The minimum a tree walk needs from a category row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct CategoryNode {
    pub id: DbId,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    parents: HashMap<DbId, Option<DbId>>,
    children: HashMap<DbId, Vec<DbId>>,
}

impl CategoryTree {
    pub fn new(nodes: impl IntoIterator<Item = CategoryNode>) -> Self {
        let mut parents = HashMap::new();
        let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for node in nodes {
            parents.insert(node.id, node.parent_id);
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(node.id);
            }
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }
        Self { parents, children }
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.parents.contains_key(&id)
    }

    /// `id` followed by all of its transitive children, depth-first.
    ///
    /// The result always starts with `id`, even when the id is unknown, so a
    /// filter on a freshly deleted category still narrows to nothing rather
    /// than to everything.
    pub fn descendants_of(&self, id: DbId) -> Vec<DbId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            if let Some(kids) = self.children.get(&current) {
                // Reverse so the lowest id is visited first.
                stack.extend(kids.iter().rev().copied());
            }
        }
        out
    }

    /// Parent chain of `id`, nearest parent first. Excludes `id` itself.
    pub fn ancestors_of(&self, id: DbId) -> Vec<DbId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parents.get(&id).copied().flatten();
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = self.parents.get(&parent).copied().flatten();
        }
        out
    }

    /// The given ids plus all of their ancestors, without duplicates. Input
    /// ids come first in their original order, ancestors follow.
    pub fn with_ancestors(&self, ids: &[DbId]) -> Vec<DbId> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            if seen.insert(id) {
                out.push(id);
            }
        }
        for &id in ids {
            for ancestor in self.ancestors_of(id) {
                if seen.insert(ancestor) {
                    out.push(ancestor);
                }
            }
        }
        out
    }

    /// True when making `parent` the parent of `id` would put `id` under itself.
    pub fn would_cycle(&self, id: DbId, parent: DbId) -> bool {
        self.descendants_of(id).contains(&parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: DbId, parent_id: Option<DbId>) -> CategoryNode {
        CategoryNode { id, parent_id }
    }

    /// 1 Electronics
    ///   2 Phones
    ///     4 Android
    ///   3 Laptops
    /// 5 Fashion
    fn sample() -> CategoryTree {
        CategoryTree::new([
            node(1, None),
            node(2, Some(1)),
            node(3, Some(1)),
            node(4, Some(2)),
            node(5, None),
        ])
    }

    #[test]
    fn descendants_include_self_and_subtree() {
        let tree = sample();
        assert_eq!(tree.descendants_of(1), vec![1, 2, 4, 3]);
        assert_eq!(tree.descendants_of(2), vec![2, 4]);
        assert_eq!(tree.descendants_of(5), vec![5]);
    }

    #[test]
    fn descendants_of_unknown_id_is_just_the_id() {
        assert_eq!(sample().descendants_of(99), vec![99]);
    }

    #[test]
    fn ancestors_nearest_first() {
        let tree = sample();
        assert_eq!(tree.ancestors_of(4), vec![2, 1]);
        assert!(tree.ancestors_of(1).is_empty());
    }

    #[test]
    fn with_ancestors_dedupes() {
        let tree = sample();
        assert_eq!(tree.with_ancestors(&[4, 3]), vec![4, 3, 2, 1]);
        assert_eq!(tree.with_ancestors(&[4, 2, 4]), vec![4, 2, 1]);
        assert!(tree.with_ancestors(&[]).is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let tree = CategoryTree::new([node(1, Some(2)), node(2, Some(1))]);
        assert_eq!(tree.descendants_of(1), vec![1, 2]);
        assert_eq!(tree.ancestors_of(1), vec![2]);
        let self_parent = CategoryTree::new([node(7, Some(7))]);
        assert_eq!(self_parent.descendants_of(7), vec![7]);
        assert!(self_parent.ancestors_of(7).is_empty());
    }

    #[test]
    fn would_cycle_detects_descendant_parent() {
        let tree = sample();
        assert!(tree.would_cycle(1, 4));
        assert!(tree.would_cycle(2, 2));
        assert!(!tree.would_cycle(2, 5));
    }
}
