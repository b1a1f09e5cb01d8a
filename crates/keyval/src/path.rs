//! Path handling: splitting delimited keys and resolving key sequences
//! against a tree.
//!
//! Two resolvers live here:
//!
//! - [`walk`] descends through *intermediate* mappings on behalf of the
//!   mutation entry points. In fill mode it materializes missing mappings and
//!   overwrites anything in the way; otherwise it fails without touching the
//!   tree.
//! - [`locate`] is the read-only resolver behind `value` and the typed
//!   accessors. It resolves all the way down to a leaf of any kind.

use crate::error::{KeyValError, Result};
use crate::node::{Mapping, Node, NodeKind};
use tracing::{debug, trace};

/// Delimiter used by [`split_key`].
pub const DEFAULT_DELIMITER: &str = ".";

/// Split a multi-part key such as `"server.http.port"` on `.`.
///
/// # Examples
///
/// ```
/// use keyval::split_key;
///
/// assert_eq!(split_key("hello.world.now"), vec!["hello", "world", "now"]);
/// ```
pub fn split_key(key: &str) -> Vec<&str> {
    split_key_with(key, DEFAULT_DELIMITER)
}

/// Split a multi-part key on a caller-supplied delimiter.
///
/// Splitting is purely textual: there is no escaping, so a key that itself
/// contains the delimiter cannot be addressed this way. An empty delimiter
/// leaves the key whole.
///
/// ```
/// use keyval::split_key_with;
///
/// assert_eq!(split_key_with("hello:world:now", ":"), vec!["hello", "world", "now"]);
/// ```
pub fn split_key_with<'a>(key: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![key];
    }
    key.split(delimiter).collect()
}

/// Join path components for error messages.
pub(crate) fn display_path<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(DEFAULT_DELIMITER)
}

/// Follow `keys` from `root` and return the mapping they lead to.
///
/// With `fill` set, an absent key gets a new empty mapping and a key holding
/// a non-mapping value has that value replaced by an empty mapping, so the
/// walk always succeeds. Without `fill`, an absent key is
/// [`KeyValError::KeyMissing`] and a non-mapping value is
/// [`KeyValError::KeyUnreachable`]; nothing is modified in that mode.
pub(crate) fn walk<'a, S: AsRef<str>>(
    root: &'a mut Mapping,
    fill: bool,
    keys: &[S],
) -> Result<&'a mut Mapping> {
    let mut pos = root;
    for (depth, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        let slot = if fill {
            let slot = pos.entry(key.to_owned()).or_insert_with(|| {
                trace!(key, "creating intermediate mapping");
                Node::Mapping(Mapping::new())
            });
            if !slot.is_mapping() {
                debug!(
                    key,
                    replaced = %slot.kind(),
                    "overwriting non-mapping value with an empty mapping"
                );
                *slot = Node::Mapping(Mapping::new());
            }
            slot
        } else {
            match pos.get_mut(key) {
                Some(slot) => slot,
                None => {
                    return Err(KeyValError::KeyMissing {
                        path: display_path(&keys[..=depth]),
                        key: key.to_owned(),
                    })
                }
            }
        };
        pos = match slot {
            Node::Mapping(map) => map,
            other => {
                return Err(KeyValError::KeyUnreachable {
                    path: display_path(&keys[..=depth]),
                    key: key.to_owned(),
                    found: other.kind(),
                })
            }
        };
    }
    Ok(pos)
}

/// Resolve `keys` from `root` down to a node of any kind.
///
/// Every position passed through must be a mapping, otherwise the lookup
/// fails with [`KeyValError::TypeMismatch`]. A key absent from its mapping is
/// [`KeyValError::KeyMissing`]. The empty path has no node to return and is
/// [`KeyValError::EmptyPath`].
pub(crate) fn locate<'a, S: AsRef<str>>(root: &'a Mapping, keys: &[S]) -> Result<&'a Node> {
    let (last, parents) = keys.split_last().ok_or(KeyValError::EmptyPath)?;
    let map = locate_mapping(root, parents)?;
    let key = last.as_ref();
    map.get(key).ok_or_else(|| KeyValError::KeyMissing {
        path: display_path(keys),
        key: key.to_owned(),
    })
}

/// Resolve `keys` to a mapping. The empty path resolves to `root` itself.
pub(crate) fn locate_mapping<'a, S: AsRef<str>>(
    root: &'a Mapping,
    keys: &[S],
) -> Result<&'a Mapping> {
    let mut pos = root;
    for (depth, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        let path = || display_path(&keys[..=depth]);
        pos = match pos.get(key) {
            Some(Node::Mapping(map)) => map,
            Some(other) => {
                return Err(KeyValError::TypeMismatch {
                    path: path(),
                    expected: NodeKind::Mapping,
                    found: other.kind(),
                })
            }
            None => {
                return Err(KeyValError::KeyMissing {
                    path: path(),
                    key: key.to_owned(),
                })
            }
        };
    }
    Ok(pos)
}

/// Mutable counterpart of [`locate_mapping`], used to hand out views.
pub(crate) fn locate_mapping_mut<'a, S: AsRef<str>>(
    root: &'a mut Mapping,
    keys: &[S],
) -> Result<&'a mut Mapping> {
    let mut pos = root;
    for (depth, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        pos = match pos.get_mut(key) {
            Some(Node::Mapping(map)) => map,
            Some(other) => {
                return Err(KeyValError::TypeMismatch {
                    path: display_path(&keys[..=depth]),
                    expected: NodeKind::Mapping,
                    found: other.kind(),
                })
            }
            None => {
                return Err(KeyValError::KeyMissing {
                    path: display_path(&keys[..=depth]),
                    key: key.to_owned(),
                })
            }
        };
    }
    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mapping {
        let mut inner = Mapping::new();
        inner.insert("leaf".to_owned(), Node::Number(1.0));
        let mut root = Mapping::new();
        root.insert("branch".to_owned(), Node::Mapping(inner));
        root.insert("scalar".to_owned(), Node::from("x"));
        root
    }

    #[test]
    fn walk_without_fill_leaves_tree_untouched_on_missing_key() {
        let mut root = sample();
        let err = walk(&mut root, false, &["branch", "absent"]).unwrap_err();
        assert!(matches!(err, KeyValError::KeyMissing { ref key, .. } if key == "absent"));
        assert_eq!(root, sample());
    }

    #[test]
    fn walk_without_fill_rejects_scalar_segment() {
        let mut root = sample();
        let err = walk(&mut root, false, &["scalar"]).unwrap_err();
        assert!(matches!(
            err,
            KeyValError::KeyUnreachable { found: NodeKind::String, .. }
        ));
    }

    #[test]
    fn walk_with_fill_replaces_scalar_segment() {
        let mut root = sample();
        walk(&mut root, true, &["scalar", "below"]).unwrap();
        let scalar = root.get("scalar").and_then(Node::as_mapping).unwrap();
        assert!(scalar.get("below").is_some_and(Node::is_mapping));
    }

    #[test]
    fn walk_empty_path_returns_root() {
        let mut root = sample();
        let keys: [&str; 0] = [];
        let map = walk(&mut root, false, &keys).unwrap();
        assert!(map.contains_key("branch"));
    }

    #[test]
    fn locate_reports_error_path() {
        let root = sample();
        let err = locate(&root, &["branch", "leaf", "deeper"]).unwrap_err();
        match err {
            KeyValError::TypeMismatch { path, found, .. } => {
                assert_eq!(path, "branch.leaf");
                assert_eq!(found, NodeKind::Number);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_delimiter_keeps_key_whole() {
        assert_eq!(split_key_with("a.b", ""), vec!["a.b"]);
    }
}
