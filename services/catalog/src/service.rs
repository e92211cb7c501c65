//! Catalog operations
//!
//! Every mutating operation takes the acting session explicitly and checks
//! the role itself; nothing is read from ambient request state.

use common::session::SessionData;
use tracing::info;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::invariants::CatalogInvariantEnforcer;
use crate::models::{
    Counter, MovieBriefResponse, MovieFilter, MovieListResponse, MovieRecord, MovieRequest,
    MovieResponse, PageRequest,
};
use crate::repositories::{MovieStore, SLUG_CONSTRAINT};
use crate::validation::validate_movie_request;

#[derive(Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: MovieStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Active movies, one page at a time
    pub async fn list(&self, page: PageRequest) -> CatalogResult<MovieListResponse> {
        self.search(&MovieFilter::default(), page).await
    }

    pub async fn search(
        &self,
        filter: &MovieFilter,
        page: PageRequest,
    ) -> CatalogResult<MovieListResponse> {
        let (records, total) = self.store.list_active(filter, page).await?;

        Ok(MovieListResponse {
            items: records.into_iter().map(MovieBriefResponse::from).collect(),
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> CatalogResult<MovieResponse> {
        self.active_by_slug(slug).await.map(MovieResponse::from)
    }

    pub async fn create(
        &self,
        actor: &SessionData,
        request: MovieRequest,
    ) -> CatalogResult<MovieResponse> {
        require_admin(actor)?;

        let draft = validate_movie_request(request)?;
        let record = CatalogInvariantEnforcer::new(&self.store)
            .prepare_create(draft)
            .await?;
        let saved = self.persist(&record).await?;

        info!("Movie {} created by {}", saved.slug, actor.username);
        Ok(saved.into())
    }

    pub async fn update(
        &self,
        actor: &SessionData,
        id: Uuid,
        request: MovieRequest,
    ) -> CatalogResult<MovieResponse> {
        require_admin(actor)?;

        let existing = self.by_id(id).await?;
        let draft = validate_movie_request(request)?;
        let record = CatalogInvariantEnforcer::new(&self.store)
            .prepare_update(&existing, draft)
            .await?;
        let saved = self.persist(&record).await?;

        info!("Movie {} updated by {}", saved.id, actor.username);
        Ok(saved.into())
    }

    /// Soft delete; repeating it on an inactive movie succeeds without a write
    pub async fn deactivate(&self, actor: &SessionData, id: Uuid) -> CatalogResult<()> {
        require_admin(actor)?;

        let existing = self.by_id(id).await?;
        if let Some(record) = CatalogInvariantEnforcer::new(&self.store).deactivate(&existing) {
            self.persist(&record).await?;
            info!("Movie {} deactivated by {}", id, actor.username);
        }

        Ok(())
    }

    pub async fn activate(&self, actor: &SessionData, id: Uuid) -> CatalogResult<MovieResponse> {
        require_admin(actor)?;

        let existing = self.by_id(id).await?;
        match CatalogInvariantEnforcer::new(&self.store).activate(&existing) {
            Some(record) => {
                let saved = self.persist(&record).await?;
                info!("Movie {} activated by {}", id, actor.username);
                Ok(saved.into())
            }
            None => Ok(existing.into()),
        }
    }

    pub async fn record_view(&self, slug: &str) -> CatalogResult<MovieResponse> {
        self.bump(slug, Counter::Views).await
    }

    pub async fn record_like(
        &self,
        actor: &SessionData,
        slug: &str,
    ) -> CatalogResult<MovieResponse> {
        let movie = self.bump(slug, Counter::Likes).await?;
        info!("Movie {} liked by {}", movie.slug, actor.username);
        Ok(movie)
    }

    async fn bump(&self, slug: &str, counter: Counter) -> CatalogResult<MovieResponse> {
        let movie = self.active_by_slug(slug).await?;
        self.store
            .increment(movie.id, counter)
            .await?
            .map(MovieResponse::from)
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    async fn active_by_slug(&self, slug: &str) -> CatalogResult<MovieRecord> {
        self.store
            .find_active_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    async fn by_id(&self, id: Uuid) -> CatalogResult<MovieRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Write through the store, mapping a lost slug race to `DuplicateSlug`
    async fn persist(&self, record: &MovieRecord) -> CatalogResult<MovieRecord> {
        match self.store.save(record).await {
            Ok(saved) => Ok(saved),
            Err(e) if e.violated_constraint() == Some(SLUG_CONSTRAINT) => {
                Err(CatalogError::DuplicateSlug {
                    slug: record.slug.clone(),
                })
            }
            Err(e) => Err(CatalogError::Database(e)),
        }
    }
}

fn require_admin(actor: &SessionData) -> CatalogResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movie::{MovieQuality, MovieStatus, SortField, SortOrder};
    use crate::repositories::memory::InMemoryMovieStore;
    use common::Role;
    use tokio_test::{assert_err, assert_ok};

    fn admin() -> SessionData {
        SessionData::new(Uuid::new_v4(), "admin", Role::Admin)
    }

    fn viewer() -> SessionData {
        SessionData::new(Uuid::new_v4(), "viewer", Role::User)
    }

    fn request(title: &str) -> MovieRequest {
        MovieRequest {
            title: title.to_string(),
            release_year: Some(2017),
            duration_minutes: Some(100),
            quality: Some(MovieQuality::FullHd),
            status: Some(MovieStatus::NowShowing),
            ..MovieRequest::default()
        }
    }

    fn service() -> (CatalogService<InMemoryMovieStore>, InMemoryMovieStore) {
        let store = InMemoryMovieStore::new();
        (CatalogService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_and_fetch_by_slug() {
        let (service, _) = service();

        let created = assert_ok!(service.create(&admin(), request("Cô Ba Sài Gòn")).await);
        assert_eq!(created.slug, "co-ba-sai-gon");

        let fetched = assert_ok!(service.get_by_slug("co-ba-sai-gon").await);
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let (service, store) = service();
        let created = assert_ok!(service.create(&admin(), request("Interstellar")).await);

        let err = assert_err!(service.create(&viewer(), request("Inception")).await);
        assert!(matches!(err, CatalogError::Forbidden));
        let err = assert_err!(
            service
                .update(&viewer(), created.id, request("Interstellar 2"))
                .await
        );
        assert!(matches!(err, CatalogError::Forbidden));
        let err = assert_err!(service.deactivate(&viewer(), created.id).await);
        assert!(matches!(err, CatalogError::Forbidden));
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn test_create_reports_all_field_errors() {
        let (service, store) = service();

        let err = assert_err!(service.create(&admin(), MovieRequest::default()).await);
        match err {
            CatalogError::ValidationFailed(errors) => {
                assert!(errors.get("title").is_some());
                assert!(errors.get("quality").is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn test_deactivated_slug_stays_reserved() {
        let (service, _) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);

        assert_ok!(service.deactivate(&admin, created.id).await);
        let err = assert_err!(service.get_by_slug("interstellar").await);
        assert!(matches!(err, CatalogError::NotFound(_)));

        let err = assert_err!(service.create(&admin, request("Interstellar")).await);
        assert!(matches!(err, CatalogError::DuplicateSlug { .. }));
    }

    #[tokio::test]
    async fn test_create_losing_slug_race_is_duplicate() {
        let (service, store) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);
        assert_ok!(service.deactivate(&admin, created.id).await);
        store.blind_slug_checks();

        let err = assert_err!(service.create(&admin, request("Interstellar")).await);
        assert!(matches!(err, CatalogError::DuplicateSlug { ref slug } if slug == "interstellar"));
        assert_eq!(store.saves(), 3);
    }

    #[tokio::test]
    async fn test_update_losing_slug_race_is_duplicate() {
        let (service, store) = service();
        let admin = admin();
        assert_ok!(service.create(&admin, request("Inception")).await);
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);
        store.blind_slug_checks();

        let mut renamed = request("Interstellar");
        renamed.slug = Some("inception".to_string());
        let err = assert_err!(service.update(&admin, created.id, renamed).await);
        assert!(matches!(err, CatalogError::DuplicateSlug { ref slug } if slug == "inception"));

        let kept = assert_ok!(service.get_by_slug("interstellar").await);
        assert_eq!(kept.id, created.id);
    }

    #[tokio::test]
    async fn test_deactivate_twice_writes_once() {
        let (service, store) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);

        assert_ok!(service.deactivate(&admin, created.id).await);
        assert_ok!(service.deactivate(&admin, created.id).await);
        assert_eq!(store.saves(), 2);

        let record = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(!record.active);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (service, _) = service();

        let err = assert_err!(service.deactivate(&admin(), Uuid::new_v4()).await);
        assert!(matches!(err, CatalogError::NotFound(_)));
        let err = assert_err!(
            service
                .update(&admin(), Uuid::new_v4(), request("Interstellar"))
                .await
        );
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_activate_restores_visibility() {
        let (service, _) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);

        assert_ok!(service.deactivate(&admin, created.id).await);
        let restored = assert_ok!(service.activate(&admin, created.id).await);
        assert!(restored.active);
        assert_ok!(service.get_by_slug("interstellar").await);
    }

    #[tokio::test]
    async fn test_update_keeps_counters() {
        let (service, _) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);

        assert_ok!(service.record_view("interstellar").await);
        assert_ok!(service.record_view("interstellar").await);
        assert_ok!(service.record_like(&viewer(), "interstellar").await);

        let updated = assert_ok!(
            service
                .update(&admin, created.id, request("Interstellar (IMAX)"))
                .await
        );
        assert_eq!(updated.slug, "interstellar");
        assert_eq!(updated.views_count, 2);
        assert_eq!(updated.likes_count, 1);
    }

    #[tokio::test]
    async fn test_counters_ignore_inactive_movies() {
        let (service, _) = service();
        let admin = admin();
        let created = assert_ok!(service.create(&admin, request("Interstellar")).await);
        assert_ok!(service.deactivate(&admin, created.id).await);

        let err = assert_err!(service.record_view("interstellar").await);
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_filters_and_pages() {
        let (service, _) = service();
        let admin = admin();
        for title in ["Interstellar", "Inception", "Tenet"] {
            assert_ok!(service.create(&admin, request(title)).await);
        }

        let page = PageRequest::new(Some(1), Some(2), SortField::Title, SortOrder::Asc);
        let listing = assert_ok!(service.list(page).await);
        assert_eq!(listing.total, 3);
        let titles: Vec<_> = listing.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Inception", "Interstellar"]);

        let filter = MovieFilter {
            keyword: Some("in".to_string()),
            ..MovieFilter::default()
        };
        let found = assert_ok!(service.search(&filter, PageRequest::default()).await);
        assert_eq!(found.total, 2);
    }
}
