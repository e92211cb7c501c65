//! Repositories for movie persistence

use std::future::Future;

use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Counter, MovieFilter, MovieRecord, PageRequest};

#[cfg(test)]
pub mod memory;
pub mod movie;

pub use movie::PgMovieRepository;

/// Name of the unique constraint guarding `movies.slug`
pub const SLUG_CONSTRAINT: &str = "uq_movies_slug";

/// Persistence operations the catalog depends on
///
/// `save` inserts or updates by id. Implementations must enforce slug
/// uniqueness at write time and report a collision as
/// `DatabaseError::UniqueViolation` naming [`SLUG_CONSTRAINT`].
pub trait MovieStore: Send + Sync {
    /// Whether any record, active or not, carries `slug`
    fn exists_slug(&self, slug: &str) -> impl Future<Output = DatabaseResult<bool>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = DatabaseResult<Option<MovieRecord>>> + Send;

    fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = DatabaseResult<Option<MovieRecord>>> + Send;

    fn save(&self, record: &MovieRecord) -> impl Future<Output = DatabaseResult<MovieRecord>> + Send;

    /// Active records matching `filter`, plus the total match count
    fn list_active(
        &self,
        filter: &MovieFilter,
        page: PageRequest,
    ) -> impl Future<Output = DatabaseResult<(Vec<MovieRecord>, i64)>> + Send;

    /// Bump a counter on an active record; `None` if no active record has `id`
    fn increment(
        &self,
        id: Uuid,
        counter: Counter,
    ) -> impl Future<Output = DatabaseResult<Option<MovieRecord>>> + Send;
}
