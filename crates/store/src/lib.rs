//! Access to the live document store backing the training log.
//!
//! The store is treated as an opaque external service behind the
//! [`DocumentStore`] trait. Two backends ship here: [`MemoryStore`] for tests
//! and local runs, and [`FirestoreStore`] which talks to Firestore over REST
//! and emulates live queries by polling. Typed access goes through the
//! repositories in [`repositories`].

pub mod document;
pub mod error;
pub mod firestore;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use document::{Direction, Document, Fields, Filter, FilterOp, Query, QuerySnapshot};
pub use error::StoreError;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use store::{DocumentStore, SnapshotStream};
