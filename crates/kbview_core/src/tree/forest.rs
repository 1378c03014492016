//! Arena forest built from flat parent-referencing records.
//!
//! # Responsibility
//! - Create one node per record identity and attach it under its declared parent.
//! - Provide read-only navigation (children, parent, ancestors, pre-order walk).
//!
//! # Invariants
//! - A node attaches to its parent only when the parent exists, is not the node
//!   itself, and is not a descendant already attached under the node.
//! - Roots and child lists keep input order.
//! - The attached graph is acyclic at every step, so ancestor walks terminate.

use crate::model::record::FlatRecord;
use log::{debug, warn};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Ancestor walk cap used for document outlines.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 64;

/// One arena node. The forest owns every node; `parent` is a lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T: FlatRecord> {
    payload: T,
    parent: Option<T::Id>,
    children: Vec<T::Id>,
}

impl<T: FlatRecord> TreeNode<T> {
    pub fn id(&self) -> &T::Id {
        self.payload.record_id()
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Effective parent in the forest, which may differ from the declared one.
    pub fn parent(&self) -> Option<&T::Id> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[T::Id] {
        &self.children
    }
}

/// Owned nested view of one subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedNode<T> {
    pub payload: T,
    pub children: Vec<NestedNode<T>>,
}

impl<T> NestedNode<T> {
    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl<T> Drop for NestedNode<T> {
    /// Drops descendants iteratively.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Result of walking the already-attached ancestors of a candidate parent.
enum AncestorWalk {
    Clear,
    Cycle,
    TooDeep,
}

#[derive(Debug, Default)]
struct LinkageReport {
    duplicates: usize,
    self_parent: usize,
    orphans: usize,
    cycles: usize,
    too_deep: usize,
}

impl LinkageReport {
    fn is_clean(&self) -> bool {
        self.duplicates == 0
            && self.self_parent == 0
            && self.orphans == 0
            && self.cycles == 0
            && self.too_deep == 0
    }
}

/// Configurable forest assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestBuilder {
    max_ancestor_depth: Option<usize>,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    /// Builder with the default ancestor walk cap.
    pub fn new() -> Self {
        Self {
            max_ancestor_depth: Some(DEFAULT_MAX_ANCESTOR_DEPTH),
        }
    }

    /// Builder without an ancestor walk cap, for unbounded nesting.
    pub fn unbounded() -> Self {
        Self {
            max_ancestor_depth: None,
        }
    }

    /// Sets the ancestor walk cap. A chain longer than the cap attaches as a root.
    pub fn max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = Some(depth);
        self
    }

    /// Assembles records into a forest.
    ///
    /// Never fails: a record whose parent is missing, is itself, would close a
    /// cycle, or sits beyond the depth cap becomes a root. Repeated identities
    /// keep the first occurrence.
    pub fn build<T, I>(&self, records: I) -> Forest<T>
    where
        T: FlatRecord,
        I: IntoIterator<Item = T>,
    {
        let mut report = LinkageReport::default();
        let mut order = Vec::new();
        let mut nodes: HashMap<T::Id, TreeNode<T>> = HashMap::new();

        for record in records {
            let id = record.record_id().clone();
            if nodes.contains_key(&id) {
                report.duplicates += 1;
                continue;
            }
            order.push(id.clone());
            nodes.insert(
                id,
                TreeNode {
                    payload: record,
                    parent: None,
                    children: Vec::new(),
                },
            );
        }

        let mut roots = Vec::new();
        for id in order {
            let declared = nodes
                .get(&id)
                .and_then(|node| node.payload.parent_id().cloned());

            let attach_to = match declared {
                None => None,
                Some(parent) if parent == id => {
                    report.self_parent += 1;
                    None
                }
                Some(parent) if !nodes.contains_key(&parent) => {
                    report.orphans += 1;
                    None
                }
                Some(parent) => match self.walk_ancestors(&nodes, &id, &parent) {
                    AncestorWalk::Clear => Some(parent),
                    AncestorWalk::Cycle => {
                        report.cycles += 1;
                        None
                    }
                    AncestorWalk::TooDeep => {
                        report.too_deep += 1;
                        None
                    }
                },
            };

            match attach_to {
                Some(parent) => {
                    if let Some(parent_node) = nodes.get_mut(&parent) {
                        parent_node.children.push(id.clone());
                    }
                    if let Some(node) = nodes.get_mut(&id) {
                        node.parent = Some(parent);
                    }
                }
                None => roots.push(id),
            }
        }

        debug!(
            "event=forest_build module=tree status=ok nodes={} roots={}",
            nodes.len(),
            roots.len()
        );
        if !report.is_clean() {
            warn!(
                "event=forest_linkage_degraded module=tree duplicates={} self_parent={} orphans={} cycles={} too_deep={}",
                report.duplicates,
                report.self_parent,
                report.orphans,
                report.cycles,
                report.too_deep
            );
        }

        Forest { nodes, roots }
    }

    fn walk_ancestors<T: FlatRecord>(
        &self,
        nodes: &HashMap<T::Id, TreeNode<T>>,
        node_id: &T::Id,
        candidate_parent: &T::Id,
    ) -> AncestorWalk {
        let mut cursor = Some(candidate_parent);
        let mut steps = 0usize;
        while let Some(current) = cursor {
            if current == node_id {
                return AncestorWalk::Cycle;
            }
            steps += 1;
            if self.max_ancestor_depth.is_some_and(|limit| steps > limit) {
                return AncestorWalk::TooDeep;
            }
            cursor = nodes.get(current).and_then(|node| node.parent.as_ref());
        }
        AncestorWalk::Clear
    }
}

/// Builds a forest with the default ancestor walk cap.
pub fn build_forest<T, I>(records: I) -> Forest<T>
where
    T: FlatRecord,
    I: IntoIterator<Item = T>,
{
    ForestBuilder::new().build(records)
}

/// Arena forest keyed by record identity.
#[derive(Debug, Clone)]
pub struct Forest<T: FlatRecord> {
    nodes: HashMap<T::Id, TreeNode<T>>,
    roots: Vec<T::Id>,
}

impl<T: FlatRecord> Forest<T> {
    /// Root identities in presentation order.
    pub fn roots(&self) -> &[T::Id] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.nodes.contains_key(id)
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&TreeNode<T>>
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.nodes.get(id)
    }

    /// Child identities of `id`, empty when `id` is unknown or a leaf.
    pub fn children_of<Q>(&self, id: &Q) -> &[T::Id]
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Resolves the effective parent through the identity map.
    pub fn parent_of<Q>(&self, id: &Q) -> Option<&TreeNode<T>>
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes.get::<T::Id>(parent)
    }

    /// Ancestor identities of `id`, root first, excluding `id` itself.
    pub fn ancestors<Q>(&self, id: &Q) -> Vec<&T::Id>
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(id).and_then(|node| node.parent.as_ref());
        while let Some(current) = cursor {
            path.push(current);
            cursor = self
                .nodes
                .get::<T::Id>(current)
                .and_then(|node| node.parent.as_ref());
        }
        path.reverse();
        path
    }

    /// Pre-order walk of the whole forest with zero-based depth.
    pub fn depth_first(&self) -> Vec<(usize, &TreeNode<T>)> {
        let mut visited = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &T::Id)> =
            self.roots.iter().rev().map(|id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            visited.push((depth, node));
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
        visited
    }

    /// Removes `id` and its descendants, returning the removed payloads.
    pub fn remove_subtree<Q>(&mut self, id: &Q) -> Vec<T>
    where
        T::Id: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let own_id = node.id().clone();
        match node.parent.clone() {
            Some(parent) => {
                if let Some(parent_node) = self.nodes.get_mut::<T::Id>(&parent) {
                    parent_node.children.retain(|child| *child != own_id);
                }
            }
            None => self.roots.retain(|root| *root != own_id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![own_id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove::<T::Id>(&current) {
                stack.extend(node.children.iter().rev().cloned());
                removed.push(node.payload);
            }
        }
        removed
    }

    /// Reorders the root list and every child list.
    ///
    /// `order` receives one sibling group in current order and returns the
    /// identities in their new order. A result that is not a permutation of the
    /// group is ignored and the group keeps its current order.
    pub fn reorder_siblings<F>(&mut self, mut order: F)
    where
        F: FnMut(Vec<&T>) -> Vec<T::Id>,
    {
        let mut plans: Vec<(Option<T::Id>, Vec<T::Id>)> = Vec::new();

        let root_group = self.payloads_of(&self.roots);
        plans.push((None, order(root_group)));
        for (id, node) in &self.nodes {
            if node.children.len() > 1 {
                let group = self.payloads_of(&node.children);
                plans.push((Some(id.clone()), order(group)));
            }
        }

        for (parent, ordered) in plans {
            let current = match &parent {
                None => &mut self.roots,
                Some(parent) => match self.nodes.get_mut(parent) {
                    Some(node) => &mut node.children,
                    None => continue,
                },
            };
            if is_permutation(current, &ordered) {
                *current = ordered;
            } else {
                warn!(
                    "event=sibling_reorder_rejected module=tree group_len={} returned_len={}",
                    current.len(),
                    ordered.len()
                );
            }
        }
    }

    /// Converts the forest into owned nested nodes, roots in order.
    pub fn into_nested(self) -> Vec<NestedNode<T>> {
        let Forest { mut nodes, roots } = self;

        let mut post_order = Vec::with_capacity(nodes.len());
        let mut stack: Vec<(T::Id, bool)> =
            roots.iter().rev().map(|id| (id.clone(), false)).collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                post_order.push(id);
                continue;
            }
            let children = nodes
                .get(&id)
                .map(|node| node.children.clone())
                .unwrap_or_default();
            stack.push((id, true));
            stack.extend(children.into_iter().rev().map(|child| (child, false)));
        }

        let mut built: HashMap<T::Id, NestedNode<T>> = HashMap::with_capacity(post_order.len());
        for id in post_order {
            let Some(node) = nodes.remove(&id) else {
                continue;
            };
            let children = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                id,
                NestedNode {
                    payload: node.payload,
                    children,
                },
            );
        }

        roots.iter().filter_map(|id| built.remove(id)).collect()
    }

    fn payloads_of(&self, ids: &[T::Id]) -> Vec<&T> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id).map(|node| &node.payload))
            .collect()
    }
}

fn is_permutation<K: Eq + Hash>(current: &[K], ordered: &[K]) -> bool {
    if current.len() != ordered.len() {
        return false;
    }
    let expected: HashSet<&K> = current.iter().collect();
    let actual: HashSet<&K> = ordered.iter().collect();
    actual.len() == ordered.len() && expected == actual
}

#[cfg(test)]
mod tests {
    use super::{build_forest, ForestBuilder};
    use crate::model::record::FlatRecord;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: &'static str,
        parent: Option<&'static str>,
    }

    impl FlatRecord for Item {
        type Id = &'static str;

        fn record_id(&self) -> &Self::Id {
            &self.id
        }

        fn parent_id(&self) -> Option<&Self::Id> {
            self.parent.as_ref()
        }
    }

    fn item(id: &'static str, parent: Option<&'static str>) -> Item {
        Item { id, parent }
    }

    #[test]
    fn child_listed_before_parent_still_attaches() {
        let forest = build_forest(vec![item("b", Some("a")), item("a", None)]);
        assert_eq!(forest.roots(), &["a"]);
        assert_eq!(forest.children_of(&"a"), &["b"]);
        assert_eq!(forest.parent_of(&"b").map(|node| *node.id()), Some("a"));
    }

    #[test]
    fn duplicate_identity_keeps_first_occurrence() {
        let forest = build_forest(vec![
            item("a", None),
            item("b", Some("a")),
            item("b", None),
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.get(&"b").and_then(|node| node.parent()), Some(&"a"));
    }

    #[test]
    fn chain_deeper_than_cap_becomes_root() {
        let records = vec![
            item("a", None),
            item("b", Some("a")),
            item("c", Some("b")),
            item("d", Some("c")),
        ];
        let forest = ForestBuilder::new().max_ancestor_depth(2).build(records.clone());
        assert_eq!(forest.roots(), &["a", "d"]);

        let unbounded = ForestBuilder::unbounded().build(records);
        assert_eq!(unbounded.roots(), &["a"]);
        assert_eq!(unbounded.ancestors(&"d"), vec![&"a", &"b", &"c"]);
    }

    #[test]
    fn depth_first_reports_depths_in_pre_order() {
        let forest = build_forest(vec![
            item("a", None),
            item("b", Some("a")),
            item("c", Some("b")),
            item("d", Some("a")),
            item("e", None),
        ]);
        let walk: Vec<(usize, &str)> = forest
            .depth_first()
            .into_iter()
            .map(|(depth, node)| (depth, *node.id()))
            .collect();
        assert_eq!(walk, vec![(0, "a"), (1, "b"), (2, "c"), (1, "d"), (0, "e")]);
    }

    #[test]
    fn string_keyed_forest_resolves_borrowed_lookups() {
        use crate::model::document::{DocType, DocumentRecord};

        let mut forest = build_forest(vec![
            DocumentRecord::new("root", DocType::Section, "Root"),
            DocumentRecord::new("mid", DocType::Section, "Mid").with_parent("root"),
            DocumentRecord::new("leaf", DocType::Leaf, "Leaf").with_parent("mid"),
        ]);

        assert_eq!(
            forest.parent_of("leaf").map(|node| node.id().as_str()),
            Some("mid")
        );
        assert_eq!(forest.ancestors("leaf"), vec!["root", "mid"]);

        let removed = forest.remove_subtree("mid");
        assert_eq!(removed.len(), 2);
        assert!(forest.children_of("root").is_empty());
        assert!(!forest.contains("leaf"));
    }

    #[test]
    fn remove_subtree_detaches_from_parent_and_map() {
        let mut forest = build_forest(vec![
            item("a", None),
            item("b", Some("a")),
            item("c", Some("b")),
            item("d", Some("a")),
        ]);
        let removed: Vec<&str> = forest
            .remove_subtree(&"b")
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(removed, vec!["b", "c"]);
        assert_eq!(forest.children_of(&"a"), &["d"]);
        assert!(!forest.contains(&"c"));
        assert!(forest.remove_subtree(&"missing").is_empty());
    }

    #[test]
    fn reorder_ignores_non_permutation() {
        let mut forest = build_forest(vec![item("a", None), item("b", None)]);
        forest.reorder_siblings(|_| vec!["a"]);
        assert_eq!(forest.roots(), &["a", "b"]);
        forest.reorder_siblings(|group| group.iter().rev().map(|item| item.id).collect());
        assert_eq!(forest.roots(), &["b", "a"]);
    }

    #[test]
    fn into_nested_preserves_order_and_depth() {
        let nested = build_forest(vec![
            item("a", None),
            item("b", Some("a")),
            item("c", Some("a")),
            item("d", Some("c")),
        ])
        .into_nested();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].subtree_len(), 4);
        let children: Vec<&str> = nested[0].children.iter().map(|n| n.payload.id).collect();
        assert_eq!(children, vec!["b", "c"]);
        assert_eq!(nested[0].children[1].children[0].payload.id, "d");
    }
}
