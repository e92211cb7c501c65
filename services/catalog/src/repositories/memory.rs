//! In-memory movie store used by unit tests

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MovieStore, SLUG_CONSTRAINT};
use crate::models::{
    Counter, MovieFilter, MovieRecord, PageRequest,
    movie::{SortField, SortOrder},
};

#[derive(Clone, Default)]
pub struct InMemoryMovieStore {
    records: Arc<Mutex<Vec<MovieRecord>>>,
    slug_checks: Arc<AtomicUsize>,
    saves: Arc<AtomicUsize>,
    blind_checks: Arc<AtomicBool>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with(records: Vec<MovieRecord>) -> Self {
        let store = Self::new();
        *store.records.lock().await = records;
        store
    }

    /// Number of `exists_slug` calls made so far
    pub fn slug_checks(&self) -> usize {
        self.slug_checks.load(AtomicOrdering::SeqCst)
    }

    /// Make `exists_slug` answer `false`, as if a concurrent writer committed
    /// between the check and the write
    pub fn blind_slug_checks(&self) {
        self.blind_checks.store(true, AtomicOrdering::SeqCst);
    }

    /// Number of `save` calls made so far
    pub fn saves(&self) -> usize {
        self.saves.load(AtomicOrdering::SeqCst)
    }
}

impl MovieStore for InMemoryMovieStore {
    async fn exists_slug(&self, slug: &str) -> DatabaseResult<bool> {
        self.slug_checks.fetch_add(1, AtomicOrdering::SeqCst);
        if self.blind_checks.load(AtomicOrdering::SeqCst) {
            return Ok(false);
        }
        Ok(self.records.lock().await.iter().any(|r| r.slug == slug))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<MovieRecord>> {
        Ok(self.records.lock().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_active_by_slug(&self, slug: &str) -> DatabaseResult<Option<MovieRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.active && r.slug == slug)
            .cloned())
    }

    async fn save(&self, record: &MovieRecord) -> DatabaseResult<MovieRecord> {
        self.saves.fetch_add(1, AtomicOrdering::SeqCst);
        let mut records = self.records.lock().await;

        if records.iter().any(|r| r.slug == record.slug && r.id != record.id) {
            return Err(DatabaseError::UniqueViolation {
                constraint: SLUG_CONSTRAINT.to_string(),
            });
        }

        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                let views_count = existing.views_count;
                let likes_count = existing.likes_count;
                *existing = record.clone();
                existing.views_count = views_count;
                existing.likes_count = likes_count;
                Ok(existing.clone())
            }
            None => {
                records.push(record.clone());
                Ok(record.clone())
            }
        }
    }

    async fn list_active(
        &self,
        filter: &MovieFilter,
        page: PageRequest,
    ) -> DatabaseResult<(Vec<MovieRecord>, i64)> {
        let mut matching: Vec<MovieRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.active && filter.matches(r))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, page.sort_by);
            let ordering = match page.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .collect();

        Ok((items, total))
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> DatabaseResult<Option<MovieRecord>> {
        let mut records = self.records.lock().await;
        Ok(records
            .iter_mut()
            .find(|r| r.id == id && r.active)
            .map(|r| {
                r.increment(counter);
                r.clone()
            }))
    }
}

fn compare(a: &MovieRecord, b: &MovieRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::ReleaseYear => a.release_year.cmp(&b.release_year),
        SortField::Title => a.title.cmp(&b.title),
        SortField::ViewsCount => a.views_count.cmp(&b.views_count),
        SortField::AverageRating => a.average_rating.cmp(&b.average_rating),
    }
}
