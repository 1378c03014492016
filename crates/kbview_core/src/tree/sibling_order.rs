//! Sibling ordering from "previous sibling" hints.
//!
//! # Responsibility
//! - Order one sibling group by walking its previous-sibling chain.
//!
//! # Invariants
//! - Output is always a permutation of the input; nothing is dropped.
//! - Every node whose hint is absent or points outside the group starts a
//!   chain; chains are emitted in the input order of their heads, so outside
//!   a cycle a node never precedes the in-group sibling it names.
//! - When several nodes claim the same predecessor, the first in input order
//!   continues the chain.
//! - Nodes no walk reaches follow the chains in input order, so a group
//!   with no usable links keeps its input order unchanged.

use crate::model::record::SiblingLinked;
use crate::tree::forest::Forest;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Orders one sibling group.
pub fn order_siblings<'a, T: SiblingLinked>(siblings: &[&'a T]) -> Vec<&'a T> {
    if siblings.len() < 2 {
        return siblings.to_vec();
    }

    let members: HashSet<&T::Id> = siblings.iter().map(|node| node.record_id()).collect();

    let mut successor_of: HashMap<&T::Id, usize> = HashMap::new();
    let mut heads = Vec::new();
    for (index, node) in siblings.iter().enumerate() {
        match node.previous_sibling_id() {
            Some(prev) if members.contains(prev) && prev != node.record_id() => {
                successor_of.entry(prev).or_insert(index);
            }
            _ => heads.push(index),
        }
    }

    let mut placed = vec![false; siblings.len()];
    let mut ordered = Vec::with_capacity(siblings.len());
    for head in heads {
        let mut cursor = Some(head);
        while let Some(index) = cursor {
            if placed[index] {
                break;
            }
            placed[index] = true;
            ordered.push(siblings[index]);
            cursor = successor_of.get(siblings[index].record_id()).copied();
        }
    }

    let chained = ordered.len();
    ordered.extend(
        siblings
            .iter()
            .zip(placed.iter())
            .filter(|(_, placed)| !**placed)
            .map(|(node, _)| *node),
    );

    if chained < siblings.len() {
        debug!(
            "event=sibling_chain_partial module=tree group_len={} chained={}",
            siblings.len(),
            chained
        );
    }
    ordered
}

/// Applies [`order_siblings`] to the root list and every child list.
pub fn order_forest<T: SiblingLinked>(forest: &mut Forest<T>) {
    forest.reorder_siblings(|group| {
        order_siblings(&group)
            .into_iter()
            .map(|node| node.record_id().clone())
            .collect()
    });
}
