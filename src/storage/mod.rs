//!  Storage is organized through [kv_store::KeyValueStore].
//!  The basic idea is:
//!   - Every part of the state lives under its own namespaced key ([keys::StorageKey]).
//!   - Values are JSON documents or raw strings, written whole (last write wins).
//!   - [repository::Repository] knows how to read each part back, substituting safe defaults for
//!     anything malformed.

pub mod keys;
pub mod kv_store;
pub mod repository;
