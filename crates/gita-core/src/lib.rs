//! Core types, rules and operations for the Gita verse store.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::VerseStore`]; presentation layers drive
//! [`service::VerseService`].

pub mod error;
pub mod filter;
pub mod migrate;
pub mod page;
pub mod resolve;
pub mod service;
pub mod source;
pub mod store;
pub mod verse;
pub mod view;

pub use error::{Error, Result};
