//! The tree container and its path-addressed operations.
//!
//! [`KeyVal`] owns a root mapping. [`KeyValView`] is a mutable window onto a
//! mapping somewhere inside a `KeyVal`: it borrows the parent exclusively and
//! every change made through it lands in the parent. Owned trees never share
//! structure with one another; views always do.

use crate::codec;
use crate::copy::deep_copy_mapping;
use crate::error::{KeyValError, Result};
use crate::node::{Mapping, Node, NodeKind};
use crate::path::{self, display_path};
use crate::stack::stack_onto;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A dynamically-typed configuration tree.
///
/// Paths are slices of keys, e.g. `&["server", "http", "port"]`; use
/// [`crate::split_key`] to obtain one from `"server.http.port"`.
///
/// `KeyVal` is plain data. Mutation needs `&mut self`, so sharing a tree
/// between threads that write to it requires the caller to wrap it in a lock.
///
/// # Examples
///
/// ```
/// use keyval::KeyVal;
///
/// let mut kv = KeyVal::new();
/// kv.create_value(8080, &["server", "port"]).unwrap();
/// assert_eq!(kv.number(&["server", "port"]).unwrap(), 8080.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyVal {
    root: Mapping,
}

impl KeyVal {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON document. An empty buffer is treated as `{}`.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(Self {
            root: codec::decode_json(data)?,
        })
    }

    /// Decode a YAML document. An empty buffer is treated as `{}`.
    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        Ok(Self {
            root: codec::decode_yaml(data)?,
        })
    }

    /// Wrap an existing mapping. The mapping is moved in, not copied.
    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn into_mapping(self) -> Mapping {
        self.root
    }

    /// A view onto the mapping at `path`. The empty path views the root.
    ///
    /// Changes made through the view are changes to `self`.
    pub fn get_key_val<S: AsRef<str>>(&mut self, path: &[S]) -> Result<KeyValView<'_>> {
        Ok(KeyValView {
            root: path::locate_mapping_mut(&mut self.root, path)?,
        })
    }

    /// The node at `path`.
    ///
    /// Fails with [`KeyValError::TypeMismatch`] when a non-mapping is met on
    /// the way down and with [`KeyValError::KeyMissing`] when a key does not
    /// exist.
    ///
    /// The root is a [`Mapping`], not a [`Node`], so the empty path is
    /// [`KeyValError::EmptyPath`] here. Use [`KeyVal::root`] or
    /// `mapping(&[])` to read the whole tree.
    pub fn value<S: AsRef<str>>(&self, path: &[S]) -> Result<&Node> {
        path::locate(&self.root, path)
    }

    /// Like [`KeyVal::value`], but `None` instead of an error.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        path::locate(&self.root, path).ok()
    }

    pub fn string<S: AsRef<str>>(&self, path: &[S]) -> Result<&str> {
        string_at(&self.root, path)
    }

    pub fn number<S: AsRef<str>>(&self, path: &[S]) -> Result<f64> {
        number_at(&self.root, path)
    }

    pub fn boolean<S: AsRef<str>>(&self, path: &[S]) -> Result<bool> {
        boolean_at(&self.root, path)
    }

    pub fn array<S: AsRef<str>>(&self, path: &[S]) -> Result<&[Node]> {
        array_at(&self.root, path)
    }

    /// The mapping at `path`; the empty path yields the root.
    pub fn mapping<S: AsRef<str>>(&self, path: &[S]) -> Result<&Mapping> {
        path::locate_mapping(&self.root, path)
    }

    /// Set the value at `path`. Every parent of the final key must already
    /// exist and be a mapping; on failure the tree is left as it was.
    pub fn set_value<S: AsRef<str>>(&mut self, value: impl Into<Node>, path: &[S]) -> Result<()> {
        assign(&mut self.root, value.into(), path, false)
    }

    /// Set the value at `path`, creating missing parent mappings.
    ///
    /// A parent that exists but is not a mapping is replaced by an empty
    /// mapping, discarding its old value.
    pub fn create_value<S: AsRef<str>>(
        &mut self,
        value: impl Into<Node>,
        path: &[S],
    ) -> Result<()> {
        assign(&mut self.root, value.into(), path, true)
    }

    /// An independent deep copy of this tree.
    pub fn copy(&self) -> KeyVal {
        KeyVal {
            root: deep_copy_mapping(&self.root),
        }
    }

    /// A new tree with `self` as the base and `layer` stacked on top.
    ///
    /// Mappings present in both are merged recursively; for every other key
    /// the value from `layer` wins. Neither input is modified.
    ///
    /// ```
    /// use keyval::KeyVal;
    ///
    /// let base = KeyVal::from_json(br#"{"db":{"host":"localhost","port":5432}}"#).unwrap();
    /// let prod = KeyVal::from_json(br#"{"db":{"host":"db.internal"}}"#).unwrap();
    /// let merged = base.stack(&prod);
    /// assert_eq!(merged.string(&["db", "host"]).unwrap(), "db.internal");
    /// assert_eq!(merged.number(&["db", "port"]).unwrap(), 5432.0);
    /// ```
    pub fn stack(&self, layer: &KeyVal) -> KeyVal {
        let mut base = deep_copy_mapping(&self.root);
        let top = deep_copy_mapping(&layer.root);
        debug!(
            base_keys = base.len(),
            layer_keys = top.len(),
            "stacking layer"
        );
        stack_onto(&mut base, top);
        KeyVal { root: base }
    }

    /// Stack any number of layers, lowest priority first.
    pub fn stack_layers<'a>(layers: impl IntoIterator<Item = &'a KeyVal>) -> KeyVal {
        layers
            .into_iter()
            .fold(KeyVal::new(), |merged, layer| merged.stack(layer))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        codec::encode_json(&self.root)
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        codec::encode_json_pretty(&self.root)
    }

    pub fn to_yaml(&self) -> Result<Vec<u8>> {
        codec::encode_yaml(&self.root)
    }
}

impl From<Mapping> for KeyVal {
    fn from(root: Mapping) -> Self {
        Self::from_mapping(root)
    }
}

impl TryFrom<serde_json::Value> for KeyVal {
    type Error = KeyValError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Ok(Self {
            root: codec::into_root(Node::from(value))?,
        })
    }
}

/// A mutable view onto a mapping inside a [`KeyVal`].
///
/// Obtained from [`KeyVal::get_key_val`]. Reads and writes go straight to the
/// parent tree; [`KeyValView::to_key_val`] detaches a deep copy.
#[derive(Debug)]
pub struct KeyValView<'a> {
    root: &'a mut Mapping,
}

impl KeyValView<'_> {
    pub fn root(&self) -> &Mapping {
        &*self.root
    }

    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut *self.root
    }

    /// A narrower view, relative to this one.
    pub fn get_key_val<S: AsRef<str>>(&mut self, path: &[S]) -> Result<KeyValView<'_>> {
        Ok(KeyValView {
            root: path::locate_mapping_mut(&mut *self.root, path)?,
        })
    }

    pub fn value<S: AsRef<str>>(&self, path: &[S]) -> Result<&Node> {
        path::locate(&*self.root, path)
    }

    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        path::locate(&*self.root, path).ok()
    }

    pub fn string<S: AsRef<str>>(&self, path: &[S]) -> Result<&str> {
        string_at(&*self.root, path)
    }

    pub fn number<S: AsRef<str>>(&self, path: &[S]) -> Result<f64> {
        number_at(&*self.root, path)
    }

    pub fn boolean<S: AsRef<str>>(&self, path: &[S]) -> Result<bool> {
        boolean_at(&*self.root, path)
    }

    pub fn array<S: AsRef<str>>(&self, path: &[S]) -> Result<&[Node]> {
        array_at(&*self.root, path)
    }

    pub fn mapping<S: AsRef<str>>(&self, path: &[S]) -> Result<&Mapping> {
        path::locate_mapping(&*self.root, path)
    }

    pub fn set_value<S: AsRef<str>>(&mut self, value: impl Into<Node>, path: &[S]) -> Result<()> {
        assign(&mut *self.root, value.into(), path, false)
    }

    pub fn create_value<S: AsRef<str>>(
        &mut self,
        value: impl Into<Node>,
        path: &[S],
    ) -> Result<()> {
        assign(&mut *self.root, value.into(), path, true)
    }

    /// Detach the viewed mapping as an independent tree.
    pub fn to_key_val(&self) -> KeyVal {
        KeyVal {
            root: deep_copy_mapping(&*self.root),
        }
    }
}

/// Store `value` under the last key of `path`, walking the parents in the
/// given mode. The empty path is a no-op.
fn assign<S: AsRef<str>>(root: &mut Mapping, value: Node, path: &[S], fill: bool) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };
    let target = path::walk(root, fill, parents)?;
    target.insert(last.as_ref().to_owned(), value);
    Ok(())
}

fn typed<'a, S, T>(
    root: &'a Mapping,
    path: &[S],
    expected: NodeKind,
    extract: impl FnOnce(&'a Node) -> Option<T>,
) -> Result<T>
where
    S: AsRef<str>,
{
    let node = path::locate(root, path)?;
    extract(node).ok_or_else(|| KeyValError::TypeMismatch {
        path: display_path(path),
        expected,
        found: node.kind(),
    })
}

fn string_at<'a, S: AsRef<str>>(root: &'a Mapping, path: &[S]) -> Result<&'a str> {
    typed(root, path, NodeKind::String, Node::as_str)
}

fn number_at<S: AsRef<str>>(root: &Mapping, path: &[S]) -> Result<f64> {
    typed(root, path, NodeKind::Number, Node::as_f64)
}

fn boolean_at<S: AsRef<str>>(root: &Mapping, path: &[S]) -> Result<bool> {
    typed(root, path, NodeKind::Boolean, Node::as_bool)
}

fn array_at<'a, S: AsRef<str>>(root: &'a Mapping, path: &[S]) -> Result<&'a [Node]> {
    typed(root, path, NodeKind::Sequence, Node::as_sequence)
}
