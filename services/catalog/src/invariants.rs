//! Before-write checks for movie records
//!
//! Every create and update passes through [`CatalogInvariantEnforcer`]
//! before it reaches the store. Records are never removed; deactivation
//! only clears the `active` flag, and slugs stay reserved by inactive
//! records.

use common::validation::char_len;
use tracing::warn;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{MovieDraft, MovieRecord};
use crate::repositories::MovieStore;
use crate::slug::{MAX_SLUG_LEN, generate_slug, is_canonical};

pub struct CatalogInvariantEnforcer<'a, S> {
    store: &'a S,
}

impl<'a, S: MovieStore> CatalogInvariantEnforcer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Turn a validated draft into a record ready for insertion
    ///
    /// A missing slug is derived from the title. A supplied one goes
    /// through the same normalization.
    pub async fn prepare_create(&self, draft: MovieDraft) -> CatalogResult<MovieRecord> {
        let slug = normalized_slug(draft.slug.as_deref().unwrap_or(&draft.title))?;

        if self.store.exists_slug(&slug).await? {
            warn!("Rejecting create: slug {} already taken", slug);
            return Err(CatalogError::DuplicateSlug { slug });
        }

        Ok(MovieRecord::new(draft, slug))
    }

    /// Merge a validated draft into an existing record
    ///
    /// The store is only consulted when the slug actually changes.
    pub async fn prepare_update(
        &self,
        existing: &MovieRecord,
        draft: MovieDraft,
    ) -> CatalogResult<MovieRecord> {
        let slug = match draft.slug.as_deref() {
            Some(supplied) => normalized_slug(supplied)?,
            None => existing.slug.clone(),
        };

        if slug != existing.slug && self.store.exists_slug(&slug).await? {
            warn!(
                "Rejecting update of {}: slug {} already taken",
                existing.id, slug
            );
            return Err(CatalogError::DuplicateSlug { slug });
        }

        let mut updated = existing.clone();
        updated.apply(draft, slug);
        Ok(updated)
    }

    /// Soft-delete a record
    ///
    /// Returns `None` when the record is already inactive: nothing to write.
    pub fn deactivate(&self, existing: &MovieRecord) -> Option<MovieRecord> {
        set_active(existing, false)
    }

    /// Undo a soft delete; `None` when the record is already active
    pub fn activate(&self, existing: &MovieRecord) -> Option<MovieRecord> {
        set_active(existing, true)
    }
}

fn set_active(existing: &MovieRecord, active: bool) -> Option<MovieRecord> {
    if existing.active == active {
        return None;
    }

    let mut updated = existing.clone();
    updated.active = active;
    updated.touch();
    Some(updated)
}

fn normalized_slug(source: &str) -> CatalogResult<String> {
    let slug = generate_slug(source);

    if slug.is_empty() {
        return Err(CatalogError::validation(
            "slug",
            "Slug must contain at least one letter or digit",
        ));
    }

    debug_assert!(is_canonical(&slug), "non-canonical slug {:?}", slug);

    if char_len(&slug) > MAX_SLUG_LEN {
        return Err(CatalogError::validation(
            "slug",
            format!("Slug must be at most {} characters long", MAX_SLUG_LEN),
        ));
    }

    Ok(slug)
}
