//! JSON REST API for the Gita verse store.
//!
//! Exposes an axum [`Router`] backed by a [`VerseService`] over any
//! [`gita_core::store::VerseStore`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gita_api::api_router(service.clone()))
//! ```

pub mod chapters;
pub mod error;
pub mod stats;
pub mod verses;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use gita_core::{Error, service::VerseService, store::VerseStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<VerseService<S>>) -> Router<()>
where
  S: VerseStore + 'static,
  Error: From<S::Error>,
{
  Router::new()
    .route("/verses", get(verses::list::<S>).post(verses::create::<S>))
    .route("/verses/stats/overview", get(stats::overview::<S>))
    // Chapter / verse addressing
    .route("/verses/chapter/{chapter}", get(chapters::by_chapter::<S>))
    .route("/verses/chapter/{chapter}/{verse}", get(chapters::summary::<S>))
    .route("/verses/chapter/{chapter}/{verse}/full", get(chapters::full::<S>))
    // By id
    .route(
      "/verses/{id}",
      get(verses::get_one::<S>)
        .put(verses::replace::<S>)
        .patch(verses::patch::<S>)
        .delete(verses::soft_delete::<S>),
    )
    .route("/verses/{id}/permanent", delete(verses::hard_delete::<S>))
    .with_state(service)
}
