//! PostgreSQL movie repository

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::MovieStore;
use crate::models::{
    Counter, MovieFilter, MovieRecord, PageRequest,
    movie::{MovieQuality, MovieStatus},
};

const MOVIE_COLUMNS: &str = r#"
    id, title, slug, description, release_year, duration_minutes, quality, status,
    poster_url, trailer_url, views_count, likes_count, average_rating, is_active,
    created_at, updated_at
"#;

/// Movie repository for database operations
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    /// Create a new movie repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MovieStore for PgMovieRepository {
    async fn exists_slug(&self, slug: &str) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<MovieRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn find_active_by_slug(&self, slug: &str) -> DatabaseResult<Option<MovieRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM movies WHERE slug = $1 AND is_active",
            MOVIE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(movie_from_row).transpose()
    }

    async fn save(&self, record: &MovieRecord) -> DatabaseResult<MovieRecord> {
        info!("Saving movie {} ({})", record.id, record.slug);

        // Counters are only written on insert; increments go through `increment`.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO movies ({columns})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                slug = EXCLUDED.slug,
                description = EXCLUDED.description,
                release_year = EXCLUDED.release_year,
                duration_minutes = EXCLUDED.duration_minutes,
                quality = EXCLUDED.quality,
                status = EXCLUDED.status,
                poster_url = EXCLUDED.poster_url,
                trailer_url = EXCLUDED.trailer_url,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            RETURNING {columns}
            "#,
            columns = MOVIE_COLUMNS
        ))
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.description)
        .bind(record.release_year)
        .bind(record.duration_minutes)
        .bind(record.quality.as_str())
        .bind(record.status.as_str())
        .bind(&record.poster_url)
        .bind(&record.trailer_url)
        .bind(record.views_count)
        .bind(record.likes_count)
        .bind(record.average_rating)
        .bind(record.active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        movie_from_row(&row)
    }

    async fn list_active(
        &self,
        filter: &MovieFilter,
        page: PageRequest,
    ) -> DatabaseResult<(Vec<MovieRecord>, i64)> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM movies", MOVIE_COLUMNS));
        push_filter(&mut select, filter);
        // Sort column and direction come from closed enums, never from raw input.
        select.push(format!(
            " ORDER BY {} {}, id ASC",
            page.sort_by.column(),
            page.order.keyword()
        ));
        select.push(" LIMIT ").push_bind(i64::from(page.limit));
        select.push(" OFFSET ").push_bind(page.offset());

        let rows = select.build().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let movies = rows
            .iter()
            .map(movie_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok((movies, total))
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> DatabaseResult<Option<MovieRecord>> {
        let column = match counter {
            Counter::Views => "views_count",
            Counter::Likes => "likes_count",
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE movies
            SET {column} = {column} + 1, updated_at = now()
            WHERE id = $1 AND is_active
            RETURNING {columns}
            "#,
            column = column,
            columns = MOVIE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(movie_from_row).transpose()
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &MovieFilter) {
    query.push(" WHERE is_active");

    if let Some(keyword) = &filter.keyword {
        query
            .push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(keyword)));
    }
    if let Some(year) = filter.year {
        query.push(" AND release_year = ").push_bind(year);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(quality) = filter.quality {
        query.push(" AND quality = ").push_bind(quality.as_str());
    }
}

/// Escape LIKE wildcards so a keyword only matches literally
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn movie_from_row(row: &PgRow) -> DatabaseResult<MovieRecord> {
    let quality: String = row.try_get("quality")?;
    let status: String = row.try_get("status")?;

    Ok(MovieRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        release_year: row.try_get("release_year")?,
        duration_minutes: row.try_get("duration_minutes")?,
        quality: quality
            .parse::<MovieQuality>()
            .map_err(|reason| DatabaseError::Decode {
                column: "quality",
                reason,
            })?,
        status: status
            .parse::<MovieStatus>()
            .map_err(|reason| DatabaseError::Decode {
                column: "status",
                reason,
            })?,
        poster_url: row.try_get("poster_url")?,
        trailer_url: row.try_get("trailer_url")?,
        views_count: row.try_get("views_count")?,
        likes_count: row.try_get("likes_count")?,
        average_rating: row.try_get("average_rating")?,
        active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100% real_love"), "100\\% real\\_love");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_filter_sql() {
        let filter = MovieFilter {
            keyword: Some("sai gon".to_string()),
            year: Some(2017),
            status: None,
            quality: Some(MovieQuality::Hd),
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM movies");
        push_filter(&mut query, &filter);
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM movies WHERE is_active AND title ILIKE $1 AND release_year = $2 AND quality = $3"
        );
    }
}
