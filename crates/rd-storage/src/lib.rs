//! Fragment storage for RD documentation engine.
//!
//! This crate loads the JSON fragments written by the Sphinx JSON builder
//! (`*.fjson`) from a documentation root. It provides:
//!
//! - [`DocumentId`]: slash-terminated logical path of one document
//! - [`DocumentFragment`]: the parsed fragment (body, toc, navigation metadata)
//! - [`Storage`] trait with `load()` and `exists()` methods
//! - [`FsStorage`] implementation that refuses to read outside its root
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use rd_storage::{DocumentId, FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("docs/_build/json"));
//! let fragment = storage.load(&DocumentId::parse("guide/intro/")?)?;
//! println!("{}", fragment.title.unwrap_or_default());
//! ```

mod document;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use document::{DocumentFragment, DocumentId, DocumentIdError, FRAGMENT_EXTENSION, NavLinkRef};
pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
