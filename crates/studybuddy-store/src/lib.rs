//! # studybuddy-store
//!
//! Remote profile storage for the Study Buddy client.
//!
//! The document store holds one record per uid in the `users` collection.
//! [`DocumentStore`] is the transport boundary; [`RestDocumentStore`] talks
//! to the deployment's HTTP API and [`MemoryDocumentStore`] backs tests.
//! [`ProfileRepository`] layers the profile read/write operations on top,
//! including the fetch-or-default read that never fails on absence.

pub mod document_store;
pub mod profiles;

mod error;

pub use document_store::{Document, DocumentStore, MemoryDocumentStore, RestDocumentStore};
pub use error::{Result, StoreError};
pub use profiles::ProfileRepository;
