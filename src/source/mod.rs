//! Narrow interfaces over remote resources, and retrying call-throughs.
//!
//! Each submodule owns one kind of resource and the same three pieces: a
//! trait describing the external collaborator, a free function that fetches
//! through the crate's retry loop with per-attempt logging, and the retry
//! budget that resource has historically needed. The traits are the
//! boundary of this crate - credential exchange, database drivers, and
//! transfer protocols live in the implementations, not here.
//!
//! In-memory implementations of all three traits live in
//! [`crate::testing`].

pub mod blob;
pub mod document;
pub mod secret;

pub use blob::{fetch_blob, BlobSource};
pub use document::{
    ensure_users, sample_users, BulkInsertError, EnsureUsersError, User, UserStore,
};
pub use secret::{fetch_secret, SecretSource};
