//! Field validation for movie payloads

use common::validation::{ValidationErrors, char_len};

use crate::models::{MovieDraft, MovieRequest};
use crate::slug::MAX_SLUG_LEN;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 500;
pub const MIN_RELEASE_YEAR: i32 = 1900;

/// Check a create/update payload and turn it into a draft
///
/// All field problems are reported together, keyed by field name.
pub fn validate_movie_request(request: MovieRequest) -> Result<MovieDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = request.title.trim().to_string();
    errors.check("title", validate_title(&title));

    let slug = non_blank(request.slug);
    if let Some(slug) = &slug {
        if char_len(slug) > MAX_SLUG_LEN {
            errors.add(
                "slug",
                format!("Slug must be at most {} characters long", MAX_SLUG_LEN),
            );
        }
    }

    let release_year = match request.release_year {
        None => {
            errors.add("release_year", "Release year is required");
            None
        }
        Some(year) if year < MIN_RELEASE_YEAR => {
            errors.add(
                "release_year",
                format!("Release year must be {} or later", MIN_RELEASE_YEAR),
            );
            None
        }
        Some(year) => Some(year),
    };

    let duration_minutes = match request.duration_minutes {
        None => {
            errors.add("duration_minutes", "Duration is required");
            None
        }
        Some(minutes) if minutes <= 0 => {
            errors.add("duration_minutes", "Duration must be a positive number");
            None
        }
        Some(minutes) => Some(minutes),
    };

    if request.quality.is_none() {
        errors.add("quality", "Quality is required");
    }
    if request.status.is_none() {
        errors.add("status", "Status is required");
    }

    let poster_url = non_blank(request.poster_url);
    errors.check("poster_url", validate_url(poster_url.as_deref()));
    let trailer_url = non_blank(request.trailer_url);
    errors.check("trailer_url", validate_url(trailer_url.as_deref()));

    match (
        release_year,
        duration_minutes,
        request.quality,
        request.status,
    ) {
        (Some(release_year), Some(duration_minutes), Some(quality), Some(status))
            if errors.is_empty() =>
        {
            Ok(MovieDraft {
                title,
                slug,
                description: non_blank(request.description),
                release_year,
                duration_minutes,
                quality,
                status,
                poster_url,
                trailer_url,
            })
        }
        _ => Err(errors),
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    if char_len(title) > MAX_TITLE_LEN {
        return Err(format!(
            "Title must be at most {} characters long",
            MAX_TITLE_LEN
        ));
    }

    Ok(())
}

fn validate_url(url: Option<&str>) -> Result<(), String> {
    match url {
        Some(url) if char_len(url) > MAX_URL_LEN => Err(format!(
            "URL must be at most {} characters long",
            MAX_URL_LEN
        )),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
