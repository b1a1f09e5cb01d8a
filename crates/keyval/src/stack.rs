//! Layer merging ("stacking").
//!
//! A top layer is merged onto a base layer key by key:
//!
//! - if both the base value and the top value under a key are mappings, the
//!   top mapping is merged into the base mapping recursively;
//! - otherwise the top value replaces the base value outright. Sequences are
//!   never concatenated, and a scalar in either layer shadows a mapping in
//!   the other.
//!
//! [`stack_onto`] works in place on structure the caller already owns. The
//! public [`crate::KeyVal::stack`] copies both operands first, so stacking is
//! non-destructive from the outside.

use crate::node::{Mapping, Node};

/// Merge `top` onto `base` in place, consuming `top`.
pub fn stack_onto(base: &mut Mapping, top: Mapping) {
    for (key, incoming) in top {
        let Node::Mapping(nested) = incoming else {
            base.insert(key, incoming);
            continue;
        };
        if let Some(Node::Mapping(existing)) = base.get_mut(&key) {
            stack_onto(existing, nested);
            continue;
        }
        base.insert(key, Node::Mapping(nested));
    }
}
