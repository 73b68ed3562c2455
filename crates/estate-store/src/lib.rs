//! Persistence for the Estate simulation engine.
//!
//! A game is saved as one [`SaveFile`] JSON document per slot. The
//! orchestrator only talks to the [`SaveStore`] trait, so the backing
//! storage can be swapped without touching the simulation.
//!
//! # Modules
//!
//! - [`store`] -- [`SaveStore`], [`MemoryStore`], and [`FileStore`]
//! - [`save_file`] -- The versioned [`SaveFile`] document
//! - [`error`] -- [`StoreError`]

pub mod error;
pub mod save_file;
pub mod store;

pub use error::StoreError;
pub use save_file::{SaveFile, validate_slot};
pub use store::{FileStore, MemoryStore, SAVE_EXTENSION, SaveStore};
