//! Application state shared across handlers

use common::session::SessionStore;
use sqlx::PgPool;

use crate::{repositories::PgMovieRepository, service::CatalogService};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sessions: SessionStore,
    pub catalog: CatalogService<PgMovieRepository>,
}
