//! Structural duplication of trees.
//!
//! Mappings and sequences are rebuilt into freshly allocated containers at
//! every depth; scalars are copied by value. The result of a copy shares no
//! container with its source, so either side can be mutated afterwards
//! without the other observing it.

use crate::node::{Mapping, Node};

/// Deep-copy a single node.
pub fn deep_copy(node: &Node) -> Node {
    match node {
        Node::Mapping(map) => Node::Mapping(deep_copy_mapping(map)),
        Node::Sequence(items) => Node::Sequence(items.iter().map(deep_copy).collect()),
        Node::String(s) => Node::String(s.clone()),
        Node::Number(n) => Node::Number(*n),
        Node::Bool(b) => Node::Bool(*b),
        Node::Null => Node::Null,
    }
}

/// Deep-copy the contents of a mapping node.
pub fn deep_copy_mapping(map: &Mapping) -> Mapping {
    map.iter()
        .map(|(key, child)| (key.clone(), deep_copy(child)))
        .collect()
}
