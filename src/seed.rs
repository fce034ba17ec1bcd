//! Idempotent provisioning used by the `studio-seed` binary.
//!
//! Every step checks for an existing row by slug, name or URL before inserting,
//! so running a step twice only reports skips. Steps run as sequential statements
//! without a transaction; a failure halfway leaves what was already written.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::AppError,
    models::{
        Admin, ArticleStatus, CabinetStatus, ContentFilter, FilmStatus, NewAdmin, NewArticle,
        NewCabinet, NewCabinetMember, NewContent, NewDivision, NewFilm, NewHeroImage, NewProject,
        Platform, ROLE_ADMIN, ROLE_SUPERADMIN,
    },
    pagination::PageParams,
    repository::Repository,
    slug::slugify,
};

pub const DEFAULT_DIVISIONS: &[(&str, &str)] = &[
    ("Production", "Directing, camera, sound and post-production crews."),
    ("Creative", "Scriptwriting, art direction and design."),
    ("Public Relations", "Partnerships, social media and events."),
    ("Human Resources", "Recruitment and member development."),
    ("Finance", "Budgeting and sponsorship administration."),
];

pub const DEFAULT_GENRES: &[&str] = &[
    "Action",
    "Animation",
    "Comedy",
    "Documentary",
    "Drama",
    "Horror",
    "Romance",
    "Thriller",
];

pub const DEFAULT_CATEGORIES: &[&str] = &["News", "Behind the Scenes", "Events", "Tutorials"];

/// SeedReport
///
/// What a seeding step inserted and what it found already present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

impl SeedReport {
    fn created(&mut self, what: impl Into<String>) {
        let what = what.into();
        tracing::info!(item = %what, "seeded");
        self.created.push(what);
    }

    fn skipped(&mut self, what: impl Into<String>) {
        let what = what.into();
        tracing::debug!(item = %what, "already present, skipped");
        self.skipped.push(what);
    }

    pub fn merge(&mut self, other: SeedReport) {
        self.created.extend(other.created);
        self.skipped.extend(other.skipped);
    }
}

/// Creates the admin, or refreshes its password and role and reactivates it.
pub async fn seed_admin(
    repo: &dyn Repository,
    username: &str,
    password: &str,
    role: &str,
) -> Result<Admin, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }
    if role != ROLE_ADMIN && role != ROLE_SUPERADMIN {
        return Err(AppError::Validation(format!(
            "role must be '{ROLE_ADMIN}' or '{ROLE_SUPERADMIN}'"
        )));
    }

    let admin = repo
        .upsert_admin(NewAdmin {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role: role.to_string(),
        })
        .await?;
    tracing::info!(admin_id = %admin.id, username = %admin.username, role = %admin.role, "admin provisioned");
    Ok(admin)
}

pub async fn seed_divisions(repo: &dyn Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    for (name, description) in DEFAULT_DIVISIONS {
        let slug = slugify(name);
        if repo.division_slug_taken(&slug, None).await? {
            report.skipped(format!("division {name}"));
            continue;
        }
        repo.create_division(NewDivision {
            name: name.to_string(),
            slug,
            description: Some(description.to_string()),
        })
        .await?;
        report.created(format!("division {name}"));
    }
    Ok(report)
}

pub async fn seed_genres(repo: &dyn Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    for name in DEFAULT_GENRES {
        let slug = slugify(name);
        if repo.genre_slug_taken(&slug, None).await? {
            report.skipped(format!("genre {name}"));
            continue;
        }
        repo.create_genre(name.to_string(), slug).await?;
        report.created(format!("genre {name}"));
    }
    Ok(report)
}

pub async fn seed_categories(repo: &dyn Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    for name in DEFAULT_CATEGORIES {
        let slug = slugify(name);
        if repo.category_slug_taken(&slug, None).await? {
            report.skipped(format!("category {name}"));
            continue;
        }
        repo.create_category(name.to_string(), slug).await?;
        report.created(format!("category {name}"));
    }
    Ok(report)
}

const SAMPLE_FILM: &str = "The Last Reel";
const SAMPLE_ARTICLE: &str = "Behind the Camera of The Last Reel";
const SAMPLE_CONTENT: &str = "The Last Reel | Official Trailer";
const SAMPLE_PROJECT: &str = "Campus Stories Documentary Series";
const SAMPLE_HERO_URL: &str = "/uploads/hero/sample-hero.jpg";
const SAMPLE_CABINET: &str = "Cabinet 2025/2026";

/// seed_samples
///
/// One sample row per public section, owned by `admin_id`. Genres, categories and
/// divisions are linked when present; run their steps first for a complete set.
pub async fn seed_samples(repo: &dyn Repository, admin_id: Uuid) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();
    let now = Utc::now();

    let film_slug = slugify(SAMPLE_FILM);
    if repo.film_slug_taken(&film_slug, None).await? {
        report.skipped(format!("film {SAMPLE_FILM}"));
    } else {
        let film = repo
            .create_film(
                NewFilm {
                    slug: film_slug,
                    film_title: SAMPLE_FILM.to_string(),
                    duration: Some(24),
                    director: Some("Studio Production Team".to_string()),
                    release_date: Some((now - Duration::days(30)).date_naive()),
                    status: FilmStatus::NowShowing,
                    synopsis: Some(
                        "A projectionist keeps an old campus cinema alive for one last screening."
                            .to_string(),
                    ),
                    ..NewFilm::default()
                },
                admin_id,
            )
            .await?;
        let genre_ids: Vec<Uuid> = repo
            .list_genres()
            .await?
            .into_iter()
            .filter(|genre| genre.slug == "drama")
            .map(|genre| genre.id)
            .collect();
        repo.set_film_genres(film.id, &genre_ids).await?;
        report.created(format!("film {SAMPLE_FILM}"));
    }

    let article_slug = slugify(SAMPLE_ARTICLE);
    let category = repo
        .list_categories()
        .await?
        .into_iter()
        .find(|category| category.slug == "behind-the-scenes");
    if repo.article_slug_taken(&article_slug, None).await? {
        report.skipped(format!("article {SAMPLE_ARTICLE}"));
    } else if let Some(category) = category {
        repo.create_article(
            NewArticle {
                title: SAMPLE_ARTICLE.to_string(),
                slug: article_slug,
                excerpt: Some("How a four-day shoot came together.".to_string()),
                body: "The crew shot the whole film in four nights inside the old auditorium."
                    .to_string(),
                cover_image_url: None,
                status: ArticleStatus::Published,
                category_id: category.id,
                published_at: Some(now),
            },
            admin_id,
        )
        .await?;
        report.created(format!("article {SAMPLE_ARTICLE}"));
    } else {
        report.skipped(format!("article {SAMPLE_ARTICLE} (no category)"));
    }

    let existing_content = repo
        .list_contents(&ContentFilter {
            search: Some(SAMPLE_CONTENT.to_string()),
            page: PageParams::new(None, Some(1)),
            ..ContentFilter::default()
        })
        .await?;
    if existing_content.total > 0 {
        report.skipped(format!("content {SAMPLE_CONTENT}"));
    } else {
        repo.create_content(
            NewContent {
                title: SAMPLE_CONTENT.to_string(),
                platform: Platform::Youtube,
                url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                banner: Some("/uploads/contents/sample-banner.jpg".to_string()),
                is_published: true,
                published_at: Some(now),
            },
            admin_id,
        )
        .await?;
        report.created(format!("content {SAMPLE_CONTENT}"));
    }

    let existing_projects = repo
        .list_projects(Some(SAMPLE_PROJECT), PageParams::new(None, Some(1)))
        .await?;
    if existing_projects.total > 0 {
        report.skipped(format!("project {SAMPLE_PROJECT}"));
    } else {
        repo.create_project(
            NewProject {
                title: SAMPLE_PROJECT.to_string(),
                description: Some("Five short portraits of students and staff.".to_string()),
                year: Some(2025),
                ..NewProject::default()
            },
            admin_id,
        )
        .await?;
        report.created(format!("project {SAMPLE_PROJECT}"));
    }

    let hero_exists = repo
        .list_hero_images()
        .await?
        .iter()
        .any(|hero| hero.image_url == SAMPLE_HERO_URL);
    if hero_exists {
        report.skipped("hero image slot 1");
    } else {
        repo.create_hero_image(
            NewHeroImage {
                image_url: SAMPLE_HERO_URL.to_string(),
                image_path: None,
                order: 1,
                height: None,
            },
            admin_id,
        )
        .await?;
        report.created("hero image slot 1");
    }

    let cabinet_exists = repo
        .list_cabinets()
        .await?
        .iter()
        .any(|cabinet| cabinet.name == SAMPLE_CABINET);
    if cabinet_exists {
        report.skipped(format!("cabinet {SAMPLE_CABINET}"));
    } else {
        let cabinet = repo
            .create_cabinet(
                NewCabinet {
                    name: SAMPLE_CABINET.to_string(),
                    period: Some("2025/2026".to_string()),
                    status: CabinetStatus::Active,
                },
                admin_id,
            )
            .await?;
        let divisions = repo.list_divisions().await?;
        let division_id = |slug: &str| {
            divisions
                .iter()
                .find(|division| division.slug == slug)
                .map(|division| division.id)
        };
        let roster = [
            ("Chairperson", None, 1),
            ("Head of Production", division_id("production"), 2),
            ("Head of Public Relations", division_id("public-relations"), 3),
        ];
        for (position, division_id, display_order) in roster {
            repo.create_cabinet_member(
                cabinet.id,
                NewCabinetMember {
                    division_id,
                    name: format!("Sample {position}"),
                    position: position.to_string(),
                    photo_url: None,
                    display_order,
                },
            )
            .await?;
        }
        report.created(format!("cabinet {SAMPLE_CABINET}"));
    }

    Ok(report)
}

/// Every reference-data step followed by the samples.
pub async fn seed_all(repo: &dyn Repository, admin_id: Uuid) -> Result<SeedReport, AppError> {
    let mut report = seed_divisions(repo).await?;
    report.merge(seed_genres(repo).await?);
    report.merge(seed_categories(repo).await?);
    report.merge(seed_samples(repo, admin_id).await?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    #[tokio::test]
    async fn reference_data_is_idempotent() {
        let repo = InMemoryRepository::new();

        let first = seed_genres(&repo).await.unwrap();
        assert_eq!(first.created.len(), DEFAULT_GENRES.len());
        assert!(first.skipped.is_empty());

        let second = seed_genres(&repo).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), DEFAULT_GENRES.len());
        assert_eq!(repo.list_genres().await.unwrap().len(), DEFAULT_GENRES.len());
    }

    #[tokio::test]
    async fn seeding_everything_twice_creates_nothing_new() {
        let repo = InMemoryRepository::new();
        let admin = seed_admin(&repo, "AdminN0lder", "secret-pass", ROLE_SUPERADMIN)
            .await
            .unwrap();

        let first = seed_all(&repo, admin.id).await.unwrap();
        assert!(first.created.iter().any(|item| item == "film The Last Reel"));
        assert!(first.created.iter().any(|item| item == "cabinet Cabinet 2025/2026"));

        let second = seed_all(&repo, admin.id).await.unwrap();
        assert!(second.created.is_empty(), "{:?}", second.created);

        let active = repo.first_active_cabinet().await.unwrap().unwrap();
        let members = repo.cabinet_members(active.id).await.unwrap();
        assert_eq!(members.len(), 3);
        assert!(members.iter().any(|m| m.division_name.as_deref() == Some("Production")));
    }

    #[tokio::test]
    async fn reseeding_an_admin_refreshes_the_password() {
        let repo = InMemoryRepository::new();
        let first = seed_admin(&repo, "AdminN0lder", "old-pass", ROLE_ADMIN).await.unwrap();
        let second = seed_admin(&repo, "AdminN0lder", "new-pass", ROLE_SUPERADMIN)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.role, ROLE_SUPERADMIN);
        assert!(crate::auth::verify_password("new-pass", &second.password_hash));
        assert!(!crate::auth::verify_password("old-pass", &second.password_hash));
    }

    #[tokio::test]
    async fn unknown_roles_are_rejected() {
        let repo = InMemoryRepository::new();
        let err = seed_admin(&repo, "someone", "pw", "owner").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
