//! Input checks shared by the admin handlers. Every failure is an
//! `AppError::Validation` carrying a message fit for the client.

use std::str::FromStr;

use crate::{error::AppError, models::HERO_SLOTS, slug::slugify};

/// A required text field: present and non-blank after trimming.
pub fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// An optional text field; blank input counts as absent.
pub fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// A required field on a partial update: may be omitted, may not be blanked.
pub fn not_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => required(Some(v), field).map(Some),
    }
}

/// Slug derived from a title. Titles without any ASCII letter or digit are rejected.
pub fn derive_slug(title: &str) -> Result<String, AppError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Title must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

pub fn hero_slot(order: i32) -> Result<i32, AppError> {
    if HERO_SLOTS.contains(&order) {
        Ok(order)
    } else {
        Err(AppError::Validation(format!(
            "order must be between {} and {}",
            HERO_SLOTS.start(),
            HERO_SLOTS.end()
        )))
    }
}

pub fn positive(value: Option<i32>, field: &str) -> Result<Option<i32>, AppError> {
    match value {
        Some(v) if v <= 0 => Err(AppError::Validation(format!("{field} must be positive"))),
        other => Ok(other),
    }
}

/// status_filter
///
/// Query-string status filter: absent or `all` means no filter, anything else must
/// name a variant.
pub fn status_filter<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilmStatus;

    #[test]
    fn required_rejects_blank() {
        assert_eq!(required(Some("  Inception ".into()), "film_title").unwrap(), "Inception");
        assert_eq!(
            required(Some("   ".into()), "film_title").unwrap_err(),
            AppError::Validation("film_title is required".to_string())
        );
        assert!(required(None, "film_title").is_err());
    }

    #[test]
    fn not_blank_allows_omission() {
        assert_eq!(not_blank(None, "name").unwrap(), None);
        assert!(not_blank(Some(" ".into()), "name").is_err());
    }

    #[test]
    fn slug_must_not_be_empty() {
        assert_eq!(derive_slug("Inception").unwrap(), "inception");
        assert!(derive_slug("???").is_err());
    }

    #[test]
    fn hero_slots_are_bounded() {
        assert!(hero_slot(1).is_ok());
        assert!(hero_slot(13).is_ok());
        assert!(hero_slot(0).is_err());
        assert!(hero_slot(14).is_err());
    }

    #[test]
    fn status_filter_accepts_all() {
        assert_eq!(status_filter::<FilmStatus>(Some("all")).unwrap(), None);
        assert_eq!(status_filter::<FilmStatus>(None).unwrap(), None);
        assert_eq!(
            status_filter::<FilmStatus>(Some("now_showing")).unwrap(),
            Some(FilmStatus::NowShowing)
        );
        assert!(status_filter::<FilmStatus>(Some("showing")).is_err());
    }
}
