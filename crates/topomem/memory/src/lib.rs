#![deny(unsafe_code)]
//! # topomem-memory
//!
//! Topological memory: every gate decision is crystallized into an immutable
//! [`MemoryAtom`] and appended to an [`AtomStore`]. Recurring decision shapes
//! are aggregated per [`CrystalKey`] in a [`CrystalRegistry`], a materialized
//! view that can always be rebuilt by replaying the log.
//!
//! ## Stores
//!
//! - [`JsonlAtomStore`]: durable, one JSON record per line, sequence rebuilt
//!   from the log on open, corrupt or torn lines skipped.
//! - [`InMemoryAtomStore`]: same contract, for tests and ephemeral use.
//!
//! Queries return the most recent `limit` matches in append order.

pub mod atom;
pub mod config;
pub mod crystal;
pub mod error;
pub mod flower;
pub mod jsonl;
pub mod query;
pub mod stats;
pub mod store;

pub use atom::{AtomMeta, MemoryAtom, StoredAtom, ATOM_VERSION};
pub use config::{StoreConfig, SyncMode};
pub use crystal::{CrystalEntry, CrystalKey, CrystalRegistry, VerdictCounts};
pub use error::StoreError;
pub use flower::{shoelace_area, Flower};
pub use jsonl::JsonlAtomStore;
pub use query::{AtomQuery, TimeRange, DEFAULT_QUERY_LIMIT};
pub use stats::StoreStats;
pub use store::{AtomStore, InMemoryAtomStore};
