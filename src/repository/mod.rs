use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    access::ResourceKind,
    models::{
        Admin, Article, ArticleCategory, ArticleChanges, ArticleFilter, ArticleImage, Cabinet,
        CabinetChanges, CabinetMember, CabinetMemberChanges, Content, ContentChanges,
        ContentFilter, DashboardStats, Division, Film, FilmChanges, FilmFilter, Genre, HeroImage,
        HeroImageChanges, NewAdmin, NewArticle, NewArticleImage, NewCabinet, NewCabinetMember,
        NewContent, NewDivision, NewFilm, NewHeroImage, NewProject, Project, ProjectChanges,
    },
    pagination::{Page, PageParams},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Persistence failures. Unique-constraint violations are split out so that a race
/// past the service-level slug check still reaches the client as a `Conflict`.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::UniqueViolation(
                    db_err.constraint().unwrap_or("unique").to_string(),
                );
            }
        }
        RepoError::Database(err)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// The persistence contract behind every handler. Lookups by id return soft-deleted
/// rows too (the access layer decides what "absent" means); every list method that
/// serves films or articles excludes soft-deleted rows unless its filter opts in.
///
/// `Send + Sync + async_trait` make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Admins ---
    async fn find_admin_by_id(&self, id: Uuid) -> RepoResult<Option<Admin>>;
    async fn find_admin_by_username(&self, username: &str) -> RepoResult<Option<Admin>>;
    /// Creates the account or refreshes its password and role, keyed by username.
    async fn upsert_admin(&self, admin: NewAdmin) -> RepoResult<Admin>;

    // --- Films ---
    async fn list_films(&self, filter: &FilmFilter) -> RepoResult<Page<Film>>;
    async fn get_film(&self, id: Uuid) -> RepoResult<Option<Film>>;
    /// True when a non-deleted film other than `exclude` already uses `slug`.
    async fn film_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool>;
    async fn create_film(&self, film: NewFilm, admin_id: Uuid) -> RepoResult<Film>;
    /// Partial update of a non-deleted film.
    async fn update_film(&self, id: Uuid, changes: FilmChanges) -> RepoResult<Option<Film>>;
    async fn restore_film(&self, id: Uuid) -> RepoResult<Option<Film>>;
    async fn film_genres(&self, film_id: Uuid) -> RepoResult<Vec<Genre>>;
    /// Replaces the film's whole genre set.
    async fn set_film_genres(&self, film_id: Uuid, genre_ids: &[Uuid]) -> RepoResult<()>;

    // --- Genres ---
    async fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    async fn get_genre(&self, id: Uuid) -> RepoResult<Option<Genre>>;
    async fn genre_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool>;
    async fn create_genre(&self, name: String, slug: String) -> RepoResult<Genre>;
    async fn update_genre(&self, id: Uuid, name: String, slug: String) -> RepoResult<Option<Genre>>;
    /// Number of film_genres rows referencing the genre.
    async fn genre_usage(&self, id: Uuid) -> RepoResult<i64>;

    // --- Article categories ---
    async fn list_categories(&self) -> RepoResult<Vec<ArticleCategory>>;
    async fn get_category(&self, id: Uuid) -> RepoResult<Option<ArticleCategory>>;
    async fn category_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool>;
    async fn create_category(&self, name: String, slug: String) -> RepoResult<ArticleCategory>;
    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        slug: String,
    ) -> RepoResult<Option<ArticleCategory>>;
    /// Number of articles (soft-deleted included) referencing the category.
    async fn category_usage(&self, id: Uuid) -> RepoResult<i64>;

    // --- Articles ---
    async fn list_articles(&self, filter: &ArticleFilter) -> RepoResult<Page<Article>>;
    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>>;
    /// Non-deleted article by slug.
    async fn get_article_by_slug(&self, slug: &str) -> RepoResult<Option<Article>>;
    async fn article_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool>;
    async fn create_article(&self, article: NewArticle, admin_id: Uuid) -> RepoResult<Article>;
    async fn update_article(
        &self,
        id: Uuid,
        changes: ArticleChanges,
    ) -> RepoResult<Option<Article>>;
    /// status = published, published_at = `at`.
    async fn publish_article(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<Option<Article>>;
    /// status = draft; published_at is kept.
    async fn unpublish_article(&self, id: Uuid) -> RepoResult<Option<Article>>;
    async fn article_images(&self, article_id: Uuid) -> RepoResult<Vec<ArticleImage>>;
    async fn replace_article_images(
        &self,
        article_id: Uuid,
        images: Vec<NewArticleImage>,
    ) -> RepoResult<Vec<ArticleImage>>;

    // --- Contents ---
    async fn list_contents(&self, filter: &ContentFilter) -> RepoResult<Page<Content>>;
    async fn get_content(&self, id: Uuid) -> RepoResult<Option<Content>>;
    async fn create_content(&self, content: NewContent, admin_id: Uuid) -> RepoResult<Content>;
    async fn update_content(
        &self,
        id: Uuid,
        changes: ContentChanges,
    ) -> RepoResult<Option<Content>>;
    /// Publishing keeps an already scheduled `published_at` and otherwise stamps `at`.
    async fn set_content_published(
        &self,
        id: Uuid,
        published: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Content>>;
    /// Published contents with a banner and `from <= published_at < until`.
    async fn promo_contents(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepoResult<Vec<Content>>;

    // --- Projects ---
    async fn list_projects(&self, search: Option<&str>, page: PageParams) -> RepoResult<Page<Project>>;
    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>>;
    async fn create_project(&self, project: NewProject, admin_id: Uuid) -> RepoResult<Project>;
    async fn update_project(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> RepoResult<Option<Project>>;

    // --- Hero images ---
    /// Ordered by slot, then creation time.
    async fn list_hero_images(&self) -> RepoResult<Vec<HeroImage>>;
    async fn get_hero_image(&self, id: Uuid) -> RepoResult<Option<HeroImage>>;
    async fn create_hero_image(&self, image: NewHeroImage, admin_id: Uuid) -> RepoResult<HeroImage>;
    async fn update_hero_image(
        &self,
        id: Uuid,
        changes: HeroImageChanges,
    ) -> RepoResult<Option<HeroImage>>;

    // --- Divisions ---
    async fn list_divisions(&self) -> RepoResult<Vec<Division>>;
    async fn get_division(&self, id: Uuid) -> RepoResult<Option<Division>>;
    async fn division_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool>;
    async fn create_division(&self, division: NewDivision) -> RepoResult<Division>;
    async fn update_division(
        &self,
        id: Uuid,
        division: NewDivision,
    ) -> RepoResult<Option<Division>>;

    // --- Cabinets ---
    async fn list_cabinets(&self) -> RepoResult<Vec<Cabinet>>;
    async fn get_cabinet(&self, id: Uuid) -> RepoResult<Option<Cabinet>>;
    async fn create_cabinet(&self, cabinet: NewCabinet, admin_id: Uuid) -> RepoResult<Cabinet>;
    async fn update_cabinet(
        &self,
        id: Uuid,
        changes: CabinetChanges,
    ) -> RepoResult<Option<Cabinet>>;
    /// The oldest cabinet with status `active`. Several may exist; the first wins.
    async fn first_active_cabinet(&self) -> RepoResult<Option<Cabinet>>;
    async fn cabinet_members(&self, cabinet_id: Uuid) -> RepoResult<Vec<CabinetMember>>;
    async fn get_cabinet_member(&self, id: Uuid) -> RepoResult<Option<CabinetMember>>;
    async fn create_cabinet_member(
        &self,
        cabinet_id: Uuid,
        member: NewCabinetMember,
    ) -> RepoResult<CabinetMember>;
    async fn update_cabinet_member(
        &self,
        id: Uuid,
        changes: CabinetMemberChanges,
    ) -> RepoResult<Option<CabinetMember>>;

    // --- Deletion ---
    /// Removes a row following `kind.delete_policy()`. Returns false when nothing
    /// matched (already gone, or already soft-deleted).
    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> RepoResult<bool>;

    // --- Dashboard ---
    async fn get_stats(&self) -> RepoResult<DashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
