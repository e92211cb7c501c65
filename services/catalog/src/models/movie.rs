//! Movie models for the catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Encoding quality of the catalogued release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieQuality {
    Cam,
    Sd,
    Hd,
    FullHd,
    UltraHd,
}

impl MovieQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieQuality::Cam => "CAM",
            MovieQuality::Sd => "SD",
            MovieQuality::Hd => "HD",
            MovieQuality::FullHd => "FULL_HD",
            MovieQuality::UltraHd => "ULTRA_HD",
        }
    }
}

impl FromStr for MovieQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CAM" => Ok(MovieQuality::Cam),
            "SD" => Ok(MovieQuality::Sd),
            "HD" => Ok(MovieQuality::Hd),
            "FULL_HD" => Ok(MovieQuality::FullHd),
            "ULTRA_HD" => Ok(MovieQuality::UltraHd),
            other => Err(format!("unknown movie quality: {}", other)),
        }
    }
}

impl fmt::Display for MovieQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release status of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieStatus {
    ComingSoon,
    NowShowing,
    Ended,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::ComingSoon => "COMING_SOON",
            MovieStatus::NowShowing => "NOW_SHOWING",
            MovieStatus::Ended => "ENDED",
        }
    }
}

impl FromStr for MovieStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMING_SOON" => Ok(MovieStatus::ComingSoon),
            "NOW_SHOWING" => Ok(MovieStatus::NowShowing),
            "ENDED" => Ok(MovieStatus::Ended),
            other => Err(format!("unknown movie status: {}", other)),
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters that only move through dedicated increment operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Likes,
}

/// Movie entity as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub release_year: i32,
    pub duration_minutes: i32,
    pub quality: MovieQuality,
    pub status: MovieStatus,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub average_rating: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    /// Build a fresh active record from a validated draft
    ///
    /// Stamps identity and both timestamps; counters and rating start at zero.
    pub fn new(draft: MovieDraft, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            slug,
            description: draft.description,
            release_year: draft.release_year,
            duration_minutes: draft.duration_minutes,
            quality: draft.quality,
            status: draft.status,
            poster_url: draft.poster_url,
            trailer_url: draft.trailer_url,
            views_count: 0,
            likes_count: 0,
            average_rating: Decimal::ZERO,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the last-update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Overwrite the editable fields from a draft
    pub fn apply(&mut self, draft: MovieDraft, slug: String) {
        self.title = draft.title;
        self.slug = slug;
        self.description = draft.description;
        self.release_year = draft.release_year;
        self.duration_minutes = draft.duration_minutes;
        self.quality = draft.quality;
        self.status = draft.status;
        self.poster_url = draft.poster_url;
        self.trailer_url = draft.trailer_url;
        self.touch();
    }

    #[cfg(test)]
    pub fn increment(&mut self, counter: Counter) {
        match counter {
            Counter::Views => self.views_count = self.views_count.saturating_add(1),
            Counter::Likes => self.likes_count = self.likes_count.saturating_add(1),
        }
        self.touch();
    }
}

/// Create/update payload as received over HTTP
///
/// Required fields are optional here so that a missing value surfaces as a
/// field-level validation message instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRequest {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub quality: Option<MovieQuality>,
    pub status: Option<MovieStatus>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

/// A request that passed field validation
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    /// Caller-supplied slug; `None` when blank, meaning "derive" or "keep"
    pub slug: Option<String>,
    pub description: Option<String>,
    pub release_year: i32,
    pub duration_minutes: i32,
    pub quality: MovieQuality,
    pub status: MovieStatus,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

/// Full movie representation
#[derive(Debug, Clone, Serialize)]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub release_year: i32,
    pub duration_minutes: i32,
    pub quality: MovieQuality,
    pub status: MovieStatus,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub average_rating: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MovieRecord> for MovieResponse {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            slug: record.slug,
            description: record.description,
            release_year: record.release_year,
            duration_minutes: record.duration_minutes,
            quality: record.quality,
            status: record.status,
            poster_url: record.poster_url,
            trailer_url: record.trailer_url,
            views_count: record.views_count,
            likes_count: record.likes_count,
            average_rating: record.average_rating,
            active: record.active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Listing card
#[derive(Debug, Clone, Serialize)]
pub struct MovieBriefResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub poster_url: Option<String>,
    pub release_year: i32,
    pub quality: MovieQuality,
    pub average_rating: Decimal,
}

impl From<MovieRecord> for MovieBriefResponse {
    fn from(record: MovieRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            slug: record.slug,
            poster_url: record.poster_url,
            release_year: record.release_year,
            quality: record.quality,
            average_rating: record.average_rating,
        }
    }
}

/// Column a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    ReleaseYear,
    Title,
    ViewsCount,
    AverageRating,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::ReleaseYear => "release_year",
            SortField::Title => "title",
            SortField::ViewsCount => "views_count",
            SortField::AverageRating => "average_rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for movie listing and search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    /// Case-insensitive title substring
    pub keyword: Option<String>,
    pub year: Option<i32>,
    pub status: Option<MovieStatus>,
    pub quality: Option<MovieQuality>,
}

impl MovieQuery {
    pub fn filter(&self) -> MovieFilter {
        MovieFilter {
            keyword: self
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            year: self.year,
            status: self.status,
            quality: self.quality,
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page,
            self.limit,
            self.sort_by.unwrap_or_default(),
            self.order.unwrap_or_default(),
        )
    }
}

/// Filters applied to active movies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub keyword: Option<String>,
    pub year: Option<i32>,
    pub status: Option<MovieStatus>,
    pub quality: Option<MovieQuality>,
}

#[cfg(test)]
impl MovieFilter {
    pub fn matches(&self, record: &MovieRecord) -> bool {
        let keyword_ok = self.keyword.as_ref().is_none_or(|k| {
            record.title.to_lowercase().contains(&k.to_lowercase())
        });
        keyword_ok
            && self.year.is_none_or(|y| record.release_year == y)
            && self.status.is_none_or(|s| record.status == s)
            && self.quality.is_none_or(|q| record.quality == q)
    }
}

/// Clamped paging and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: Option<u32>, limit: Option<u32>, sort_by: SortField, order: SortOrder) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            sort_by,
            order,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, SortField::default(), SortOrder::default())
    }
}

/// Response for movie listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct MovieListResponse {
    pub items: Vec<MovieBriefResponse>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
