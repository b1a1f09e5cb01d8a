//! # keyval
//!
//! A dynamically-typed tree of mappings, sequences and scalars, as produced by
//! parsing JSON or YAML, with path-addressed reads and writes, deep copies and
//! layered merging.
//!
//! The intended user is configuration-loading code that combines several
//! partial sources (defaults, per-environment overrides, user files) into one
//! authoritative tree and then queries it by path without knowing its shape
//! ahead of time.
//!
//! ## Quick start
//!
//! ```rust
//! use keyval::{split_key, KeyVal};
//!
//! let defaults = KeyVal::from_yaml(b"server:\n  host: 0.0.0.0\n  port: 80\n").unwrap();
//! let user = KeyVal::from_json(br#"{"server":{"port":8080}}"#).unwrap();
//!
//! let mut config = defaults.stack(&user);
//! config.create_value(true, &split_key("server.tls.enabled")).unwrap();
//!
//! assert_eq!(config.string(&["server", "host"]).unwrap(), "0.0.0.0");
//! assert_eq!(config.number(&["server", "port"]).unwrap(), 8080.0);
//! assert!(config.boolean(&["server", "tls", "enabled"]).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`node`]: the `Node` value type; every number is stored as `f64`
//! - [`path`]: key splitting and the path resolvers
//! - [`copy`]: deep copies that share no structure with their source
//! - [`stack`]: the in-place layer merge behind [`KeyVal::stack`]
//! - [`error`]: error types for lookups, mutations and codecs
//!
//! `KeyVal` owns its data and is not internally synchronized; concurrent
//! writers must coordinate outside the tree.

mod codec;
pub mod copy;
pub mod error;
mod keyval;
pub mod node;
pub mod path;
pub mod stack;

pub use copy::{deep_copy, deep_copy_mapping};
pub use error::{ErrorKind, KeyValError};
pub use keyval::{KeyVal, KeyValView};
pub use node::{Mapping, Node, NodeKind};
pub use path::{split_key, split_key_with, DEFAULT_DELIMITER};
pub use stack::stack_onto;
