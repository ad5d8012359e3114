//! # Evidence Anchor Core
//!
//! Synchronous, I/O-free logic for Evidence Anchor: the evidence data model,
//! canonical hashing, the content-addressed store abstraction, the
//! append-only hash-linked ledger, and the service that ties them together.
//!
//! This crate contains no tokio, network, or filesystem dependencies.
//! Durable backends (on-disk object store, ledger journal) live in the
//! `evidence-anchor` crate and plug in through [`store::ContentStore`] and
//! [`ledger::LedgerJournal`].

pub mod anchor;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod models;
pub mod store;

pub use anchor::AnchorService;
pub use error::{AnchorError, Result};
pub use ledger::{Ledger, LedgerJournal};
pub use models::{AnchorReceipt, Block, ContentAddress, EvidenceRecord};
pub use store::{memory::InMemoryContentStore, ContentStore, ContentStoreExt};
