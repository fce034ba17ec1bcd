use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::{
    access::{DeletePolicy, ResourceKind},
    models::{
        Admin, Article, ArticleCategory, ArticleChanges, ArticleFilter, ArticleImage,
        ArticleStatus, Cabinet, CabinetChanges, CabinetMember, CabinetMemberChanges,
        CabinetStatus, Content, ContentChanges, ContentFilter, DashboardStats, Division, Film,
        FilmChanges, FilmFilter, FilmStatus, Genre, HeroImage, HeroImageChanges, NewAdmin,
        NewArticle, NewArticleImage, NewCabinet, NewCabinetMember, NewContent, NewDivision,
        NewFilm, NewHeroImage, NewProject, Project, ProjectChanges,
    },
    pagination::{Page, PageParams},
};

#[derive(Default)]
struct Store {
    admins: Vec<Admin>,
    films: Vec<Film>,
    genres: Vec<Genre>,
    film_genres: Vec<(Uuid, Uuid)>,
    categories: Vec<ArticleCategory>,
    articles: Vec<Article>,
    article_images: Vec<ArticleImage>,
    contents: Vec<Content>,
    projects: Vec<Project>,
    hero_images: Vec<HeroImage>,
    divisions: Vec<Division>,
    cabinets: Vec<Cabinet>,
    members: Vec<CabinetMember>,
}

impl Store {
    fn with_division_name(&self, mut member: CabinetMember) -> CabinetMember {
        member.division_name = member.division_id.and_then(|division_id| {
            self.divisions
                .iter()
                .find(|d| d.id == division_id)
                .map(|d| d.name.clone())
        });
        member
    }
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. It mirrors the Postgres
/// implementation's filtering, ordering and delete semantics and backs the test
/// suites, which therefore run without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an admin row as-is (fixed id, role, activity flag).
    pub async fn put_admin(&self, admin: Admin) {
        let mut store = self.store.write().await;
        store.admins.retain(|a| a.id != admin.id && a.username != admin.username);
        store.admins.push(admin);
    }
}

/// Case-sensitive substring match over any of the given fields.
fn matches_search(search: Option<&str>, fields: &[Option<&str>]) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(term) => fields.iter().flatten().any(|field| field.contains(term)),
    }
}

fn paginate<T: Clone>(rows: Vec<T>, page: PageParams) -> Page<T> {
    Page {
        total: rows.len() as i64,
        items: page.slice(&rows),
    }
}

fn unique_violation(constraint: &str) -> RepoError {
    RepoError::UniqueViolation(constraint.to_string())
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Admins ---

    async fn find_admin_by_id(&self, id: Uuid) -> RepoResult<Option<Admin>> {
        let store = self.store.read().await;
        Ok(store.admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> RepoResult<Option<Admin>> {
        let store = self.store.read().await;
        Ok(store.admins.iter().find(|a| a.username == username).cloned())
    }

    async fn upsert_admin(&self, admin: NewAdmin) -> RepoResult<Admin> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        if let Some(existing) = store.admins.iter_mut().find(|a| a.username == admin.username) {
            existing.password_hash = admin.password_hash;
            existing.role = admin.role;
            existing.is_active = true;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = Admin {
            id: Uuid::new_v4(),
            username: admin.username,
            password_hash: admin.password_hash,
            role: admin.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.admins.push(row.clone());
        Ok(row)
    }

    // --- Films ---

    async fn list_films(&self, filter: &FilmFilter) -> RepoResult<Page<Film>> {
        let store = self.store.read().await;
        let mut rows: Vec<Film> = store
            .films
            .iter()
            .filter(|f| filter.include_deleted || f.deleted_at.is_none())
            .filter(|f| filter.status.is_none_or(|status| f.status == status))
            .filter(|f| {
                filter.genre_id.is_none_or(|genre_id| {
                    store.film_genres.contains(&(f.id, genre_id))
                })
            })
            .filter(|f| {
                matches_search(
                    filter.search.as_deref(),
                    &[Some(&f.film_title), f.director.as_deref()],
                )
            })
            .cloned()
            .collect();
        rows.sort_by_key(|f| (Reverse(f.created_at), f.id));
        Ok(paginate(rows, filter.page))
    }

    async fn get_film(&self, id: Uuid) -> RepoResult<Option<Film>> {
        let store = self.store.read().await;
        Ok(store.films.iter().find(|f| f.id == id).cloned())
    }

    async fn film_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .films
            .iter()
            .any(|f| f.slug == slug && f.deleted_at.is_none() && Some(f.id) != exclude))
    }

    async fn create_film(&self, film: NewFilm, admin_id: Uuid) -> RepoResult<Film> {
        let mut store = self.store.write().await;
        if store
            .films
            .iter()
            .any(|f| f.slug == film.slug && f.deleted_at.is_none())
        {
            return Err(unique_violation("films_slug_live_key"));
        }

        let now = Utc::now();
        let row = Film {
            id: Uuid::new_v4(),
            slug: film.slug,
            film_title: film.film_title,
            duration: film.duration,
            director: film.director,
            release_date: film.release_date,
            status: film.status,
            poster_url: film.poster_url,
            trailer_url: film.trailer_url,
            synopsis: film.synopsis,
            admin_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.films.push(row.clone());
        Ok(row)
    }

    async fn update_film(&self, id: Uuid, changes: FilmChanges) -> RepoResult<Option<Film>> {
        let mut store = self.store.write().await;
        let Some(film) = store
            .films
            .iter_mut()
            .find(|f| f.id == id && f.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(slug) = changes.slug {
            film.slug = slug;
        }
        if let Some(title) = changes.film_title {
            film.film_title = title;
        }
        if changes.duration.is_some() {
            film.duration = changes.duration;
        }
        if changes.director.is_some() {
            film.director = changes.director;
        }
        if changes.release_date.is_some() {
            film.release_date = changes.release_date;
        }
        if let Some(status) = changes.status {
            film.status = status;
        }
        if changes.poster_url.is_some() {
            film.poster_url = changes.poster_url;
        }
        if changes.trailer_url.is_some() {
            film.trailer_url = changes.trailer_url;
        }
        if changes.synopsis.is_some() {
            film.synopsis = changes.synopsis;
        }
        film.updated_at = Utc::now();
        Ok(Some(film.clone()))
    }

    async fn restore_film(&self, id: Uuid) -> RepoResult<Option<Film>> {
        let mut store = self.store.write().await;
        Ok(store.films.iter_mut().find(|f| f.id == id).map(|film| {
            film.deleted_at = None;
            film.updated_at = Utc::now();
            film.clone()
        }))
    }

    async fn film_genres(&self, film_id: Uuid) -> RepoResult<Vec<Genre>> {
        let store = self.store.read().await;
        let mut genres: Vec<Genre> = store
            .genres
            .iter()
            .filter(|g| store.film_genres.contains(&(film_id, g.id)))
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn set_film_genres(&self, film_id: Uuid, genre_ids: &[Uuid]) -> RepoResult<()> {
        let mut store = self.store.write().await;
        store.film_genres.retain(|(film, _)| *film != film_id);
        for genre_id in genre_ids {
            if !store.film_genres.contains(&(film_id, *genre_id)) {
                store.film_genres.push((film_id, *genre_id));
            }
        }
        Ok(())
    }

    // --- Genres ---

    async fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        let store = self.store.read().await;
        let mut genres = store.genres.clone();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_genre(&self, id: Uuid) -> RepoResult<Option<Genre>> {
        let store = self.store.read().await;
        Ok(store.genres.iter().find(|g| g.id == id).cloned())
    }

    async fn genre_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .genres
            .iter()
            .any(|g| g.slug == slug && Some(g.id) != exclude))
    }

    async fn create_genre(&self, name: String, slug: String) -> RepoResult<Genre> {
        let mut store = self.store.write().await;
        if store.genres.iter().any(|g| g.slug == slug) {
            return Err(unique_violation("genres_slug_key"));
        }
        let row = Genre {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: Utc::now(),
        };
        store.genres.push(row.clone());
        Ok(row)
    }

    async fn update_genre(&self, id: Uuid, name: String, slug: String) -> RepoResult<Option<Genre>> {
        let mut store = self.store.write().await;
        Ok(store.genres.iter_mut().find(|g| g.id == id).map(|genre| {
            genre.name = name;
            genre.slug = slug;
            genre.clone()
        }))
    }

    async fn genre_usage(&self, id: Uuid) -> RepoResult<i64> {
        let store = self.store.read().await;
        Ok(store.film_genres.iter().filter(|(_, g)| *g == id).count() as i64)
    }

    // --- Article categories ---

    async fn list_categories(&self) -> RepoResult<Vec<ArticleCategory>> {
        let store = self.store.read().await;
        let mut categories = store.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> RepoResult<Option<ArticleCategory>> {
        let store = self.store.read().await;
        Ok(store.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn category_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .categories
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != exclude))
    }

    async fn create_category(&self, name: String, slug: String) -> RepoResult<ArticleCategory> {
        let mut store = self.store.write().await;
        if store.categories.iter().any(|c| c.slug == slug) {
            return Err(unique_violation("article_categories_slug_key"));
        }
        let row = ArticleCategory {
            id: Uuid::new_v4(),
            name,
            slug,
            created_at: Utc::now(),
        };
        store.categories.push(row.clone());
        Ok(row)
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        slug: String,
    ) -> RepoResult<Option<ArticleCategory>> {
        let mut store = self.store.write().await;
        Ok(store.categories.iter_mut().find(|c| c.id == id).map(|category| {
            category.name = name;
            category.slug = slug;
            category.clone()
        }))
    }

    async fn category_usage(&self, id: Uuid) -> RepoResult<i64> {
        let store = self.store.read().await;
        Ok(store.articles.iter().filter(|a| a.category_id == id).count() as i64)
    }

    // --- Articles ---

    async fn list_articles(&self, filter: &ArticleFilter) -> RepoResult<Page<Article>> {
        let store = self.store.read().await;
        let mut rows: Vec<Article> = store
            .articles
            .iter()
            .filter(|a| a.deleted_at.is_none())
            .filter(|a| filter.status.is_none_or(|status| a.status == status))
            .filter(|a| filter.category_id.is_none_or(|id| a.category_id == id))
            .filter(|a| {
                matches_search(
                    filter.search.as_deref(),
                    &[Some(&a.title), a.excerpt.as_deref(), Some(&a.body)],
                )
            })
            .cloned()
            .collect();
        rows.sort_by_key(|a| (Reverse(a.published_at.unwrap_or(a.created_at)), a.id));
        Ok(paginate(rows, filter.page))
    }

    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn get_article_by_slug(&self, slug: &str) -> RepoResult<Option<Article>> {
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .find(|a| a.slug == slug && a.deleted_at.is_none())
            .cloned())
    }

    async fn article_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .any(|a| a.slug == slug && a.deleted_at.is_none() && Some(a.id) != exclude))
    }

    async fn create_article(&self, article: NewArticle, admin_id: Uuid) -> RepoResult<Article> {
        let mut store = self.store.write().await;
        if store
            .articles
            .iter()
            .any(|a| a.slug == article.slug && a.deleted_at.is_none())
        {
            return Err(unique_violation("articles_slug_live_key"));
        }

        let now = Utc::now();
        let row = Article {
            id: Uuid::new_v4(),
            title: article.title,
            slug: article.slug,
            excerpt: article.excerpt,
            body: article.body,
            cover_image_url: article.cover_image_url,
            status: article.status,
            category_id: article.category_id,
            admin_id,
            published_at: article.published_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        store.articles.push(row.clone());
        Ok(row)
    }

    async fn update_article(
        &self,
        id: Uuid,
        changes: ArticleChanges,
    ) -> RepoResult<Option<Article>> {
        let mut store = self.store.write().await;
        let Some(article) = store
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            article.title = title;
        }
        if let Some(slug) = changes.slug {
            article.slug = slug;
        }
        if changes.excerpt.is_some() {
            article.excerpt = changes.excerpt;
        }
        if let Some(body) = changes.body {
            article.body = body;
        }
        if changes.cover_image_url.is_some() {
            article.cover_image_url = changes.cover_image_url;
        }
        if let Some(status) = changes.status {
            article.status = status;
        }
        if let Some(category_id) = changes.category_id {
            article.category_id = category_id;
        }
        if changes.published_at.is_some() {
            article.published_at = changes.published_at;
        }
        article.updated_at = Utc::now();
        Ok(Some(article.clone()))
    }

    async fn publish_article(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<Option<Article>> {
        let mut store = self.store.write().await;
        Ok(store
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
            .map(|article| {
                article.status = ArticleStatus::Published;
                article.published_at = Some(at);
                article.updated_at = Utc::now();
                article.clone()
            }))
    }

    async fn unpublish_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        let mut store = self.store.write().await;
        Ok(store
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
            .map(|article| {
                article.status = ArticleStatus::Draft;
                article.updated_at = Utc::now();
                article.clone()
            }))
    }

    async fn article_images(&self, article_id: Uuid) -> RepoResult<Vec<ArticleImage>> {
        let store = self.store.read().await;
        let mut images: Vec<ArticleImage> = store
            .article_images
            .iter()
            .filter(|i| i.article_id == article_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        Ok(images)
    }

    async fn replace_article_images(
        &self,
        article_id: Uuid,
        images: Vec<NewArticleImage>,
    ) -> RepoResult<Vec<ArticleImage>> {
        let mut store = self.store.write().await;
        store.article_images.retain(|i| i.article_id != article_id);

        let stored: Vec<ArticleImage> = images
            .into_iter()
            .map(|image| ArticleImage {
                id: Uuid::new_v4(),
                article_id,
                image_url: image.image_url,
                caption: image.caption,
                position: image.position,
            })
            .collect();
        store.article_images.extend(stored.iter().cloned());
        Ok(stored)
    }

    // --- Contents ---

    async fn list_contents(&self, filter: &ContentFilter) -> RepoResult<Page<Content>> {
        let store = self.store.read().await;
        let mut rows: Vec<Content> = store
            .contents
            .iter()
            .filter(|c| filter.platform.is_none_or(|p| c.platform == p))
            .filter(|c| filter.published.is_none_or(|p| c.is_published == p))
            .filter(|c| matches_search(filter.search.as_deref(), &[Some(&c.title), Some(&c.url)]))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (Reverse(c.published_at.unwrap_or(c.created_at)), c.id));
        Ok(paginate(rows, filter.page))
    }

    async fn get_content(&self, id: Uuid) -> RepoResult<Option<Content>> {
        let store = self.store.read().await;
        Ok(store.contents.iter().find(|c| c.id == id).cloned())
    }

    async fn create_content(&self, content: NewContent, admin_id: Uuid) -> RepoResult<Content> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let row = Content {
            id: Uuid::new_v4(),
            title: content.title,
            platform: content.platform,
            url: content.url,
            banner: content.banner,
            is_published: content.is_published,
            published_at: content.published_at,
            admin_id,
            created_at: now,
            updated_at: now,
        };
        store.contents.push(row.clone());
        Ok(row)
    }

    async fn update_content(
        &self,
        id: Uuid,
        changes: ContentChanges,
    ) -> RepoResult<Option<Content>> {
        let mut store = self.store.write().await;
        Ok(store.contents.iter_mut().find(|c| c.id == id).map(|content| {
            if let Some(title) = changes.title {
                content.title = title;
            }
            if let Some(platform) = changes.platform {
                content.platform = platform;
            }
            if let Some(url) = changes.url {
                content.url = url;
            }
            if changes.banner.is_some() {
                content.banner = changes.banner;
            }
            if changes.published_at.is_some() {
                content.published_at = changes.published_at;
            }
            content.updated_at = Utc::now();
            content.clone()
        }))
    }

    async fn set_content_published(
        &self,
        id: Uuid,
        published: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Content>> {
        let mut store = self.store.write().await;
        Ok(store.contents.iter_mut().find(|c| c.id == id).map(|content| {
            content.is_published = published;
            if published && content.published_at.is_none() {
                content.published_at = Some(at);
            }
            content.updated_at = Utc::now();
            content.clone()
        }))
    }

    async fn promo_contents(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepoResult<Vec<Content>> {
        let store = self.store.read().await;
        let mut rows: Vec<Content> = store
            .contents
            .iter()
            .filter(|c| c.banner.is_some() && c.is_published)
            .filter(|c| c.published_at.is_some_and(|at| at >= from && at < until))
            .cloned()
            .collect();
        rows.sort_by_key(|c| Reverse(c.published_at));
        Ok(rows)
    }

    // --- Projects ---

    async fn list_projects(&self, search: Option<&str>, page: PageParams) -> RepoResult<Page<Project>> {
        let store = self.store.read().await;
        let mut rows: Vec<Project> = store
            .projects
            .iter()
            .filter(|p| matches_search(search, &[Some(&p.title), p.description.as_deref()]))
            .cloned()
            .collect();
        // year DESC NULLS LAST, then newest first
        rows.sort_by_key(|p| (p.year.is_none(), Reverse(p.year), Reverse(p.created_at), p.id));
        Ok(paginate(rows, page))
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        let store = self.store.read().await;
        Ok(store.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create_project(&self, project: NewProject, admin_id: Uuid) -> RepoResult<Project> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let row = Project {
            id: Uuid::new_v4(),
            title: project.title,
            description: project.description,
            image_url: project.image_url,
            link_url: project.link_url,
            year: project.year,
            admin_id,
            created_at: now,
            updated_at: now,
        };
        store.projects.push(row.clone());
        Ok(row)
    }

    async fn update_project(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> RepoResult<Option<Project>> {
        let mut store = self.store.write().await;
        Ok(store.projects.iter_mut().find(|p| p.id == id).map(|project| {
            if let Some(title) = changes.title {
                project.title = title;
            }
            if changes.description.is_some() {
                project.description = changes.description;
            }
            if changes.image_url.is_some() {
                project.image_url = changes.image_url;
            }
            if changes.link_url.is_some() {
                project.link_url = changes.link_url;
            }
            if changes.year.is_some() {
                project.year = changes.year;
            }
            project.updated_at = Utc::now();
            project.clone()
        }))
    }

    // --- Hero images ---

    async fn list_hero_images(&self) -> RepoResult<Vec<HeroImage>> {
        let store = self.store.read().await;
        let mut rows = store.hero_images.clone();
        rows.sort_by_key(|h| (h.order, h.created_at));
        Ok(rows)
    }

    async fn get_hero_image(&self, id: Uuid) -> RepoResult<Option<HeroImage>> {
        let store = self.store.read().await;
        Ok(store.hero_images.iter().find(|h| h.id == id).cloned())
    }

    async fn create_hero_image(&self, image: NewHeroImage, admin_id: Uuid) -> RepoResult<HeroImage> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let row = HeroImage {
            id: Uuid::new_v4(),
            image_url: image.image_url,
            image_path: image.image_path,
            order: image.order,
            height: image.height,
            admin_id,
            created_at: now,
            updated_at: now,
        };
        store.hero_images.push(row.clone());
        Ok(row)
    }

    async fn update_hero_image(
        &self,
        id: Uuid,
        changes: HeroImageChanges,
    ) -> RepoResult<Option<HeroImage>> {
        let mut store = self.store.write().await;
        Ok(store.hero_images.iter_mut().find(|h| h.id == id).map(|hero| {
            if let Some(url) = changes.image_url {
                hero.image_url = url;
            }
            if let Some(path) = changes.image_path {
                hero.image_path = path;
            }
            if let Some(order) = changes.order {
                hero.order = order;
            }
            if changes.height.is_some() {
                hero.height = changes.height;
            }
            hero.updated_at = Utc::now();
            hero.clone()
        }))
    }

    // --- Divisions ---

    async fn list_divisions(&self) -> RepoResult<Vec<Division>> {
        let store = self.store.read().await;
        let mut rows = store.divisions.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_division(&self, id: Uuid) -> RepoResult<Option<Division>> {
        let store = self.store.read().await;
        Ok(store.divisions.iter().find(|d| d.id == id).cloned())
    }

    async fn division_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        let store = self.store.read().await;
        Ok(store
            .divisions
            .iter()
            .any(|d| d.slug == slug && Some(d.id) != exclude))
    }

    async fn create_division(&self, division: NewDivision) -> RepoResult<Division> {
        let mut store = self.store.write().await;
        if store.divisions.iter().any(|d| d.slug == division.slug) {
            return Err(unique_violation("divisions_slug_key"));
        }
        let row = Division {
            id: Uuid::new_v4(),
            name: division.name,
            slug: division.slug,
            description: division.description,
            created_at: Utc::now(),
        };
        store.divisions.push(row.clone());
        Ok(row)
    }

    async fn update_division(
        &self,
        id: Uuid,
        division: NewDivision,
    ) -> RepoResult<Option<Division>> {
        let mut store = self.store.write().await;
        Ok(store.divisions.iter_mut().find(|d| d.id == id).map(|row| {
            row.name = division.name;
            row.slug = division.slug;
            if division.description.is_some() {
                row.description = division.description;
            }
            row.clone()
        }))
    }

    // --- Cabinets ---

    async fn list_cabinets(&self) -> RepoResult<Vec<Cabinet>> {
        let store = self.store.read().await;
        let mut rows = store.cabinets.clone();
        rows.sort_by_key(|c| Reverse(c.created_at));
        Ok(rows)
    }

    async fn get_cabinet(&self, id: Uuid) -> RepoResult<Option<Cabinet>> {
        let store = self.store.read().await;
        Ok(store.cabinets.iter().find(|c| c.id == id).cloned())
    }

    async fn create_cabinet(&self, cabinet: NewCabinet, admin_id: Uuid) -> RepoResult<Cabinet> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let row = Cabinet {
            id: Uuid::new_v4(),
            name: cabinet.name,
            period: cabinet.period,
            status: cabinet.status,
            admin_id,
            created_at: now,
            updated_at: now,
        };
        store.cabinets.push(row.clone());
        Ok(row)
    }

    async fn update_cabinet(
        &self,
        id: Uuid,
        changes: CabinetChanges,
    ) -> RepoResult<Option<Cabinet>> {
        let mut store = self.store.write().await;
        Ok(store.cabinets.iter_mut().find(|c| c.id == id).map(|cabinet| {
            if let Some(name) = changes.name {
                cabinet.name = name;
            }
            if changes.period.is_some() {
                cabinet.period = changes.period;
            }
            if let Some(status) = changes.status {
                cabinet.status = status;
            }
            cabinet.updated_at = Utc::now();
            cabinet.clone()
        }))
    }

    async fn first_active_cabinet(&self) -> RepoResult<Option<Cabinet>> {
        let store = self.store.read().await;
        Ok(store
            .cabinets
            .iter()
            .filter(|c| c.status == CabinetStatus::Active)
            .min_by_key(|c| (c.created_at, c.id))
            .cloned())
    }

    async fn cabinet_members(&self, cabinet_id: Uuid) -> RepoResult<Vec<CabinetMember>> {
        let store = self.store.read().await;
        let mut rows: Vec<CabinetMember> = store
            .members
            .iter()
            .filter(|m| m.cabinet_id == cabinet_id)
            .map(|m| store.with_division_name(m.clone()))
            .collect();
        rows.sort_by_key(|m| (m.display_order, m.created_at));
        Ok(rows)
    }

    async fn get_cabinet_member(&self, id: Uuid) -> RepoResult<Option<CabinetMember>> {
        let store = self.store.read().await;
        Ok(store
            .members
            .iter()
            .find(|m| m.id == id)
            .map(|m| store.with_division_name(m.clone())))
    }

    async fn create_cabinet_member(
        &self,
        cabinet_id: Uuid,
        member: NewCabinetMember,
    ) -> RepoResult<CabinetMember> {
        let mut store = self.store.write().await;
        let row = CabinetMember {
            id: Uuid::new_v4(),
            cabinet_id,
            division_id: member.division_id,
            name: member.name,
            position: member.position,
            photo_url: member.photo_url,
            display_order: member.display_order,
            created_at: Utc::now(),
            division_name: None,
        };
        store.members.push(row.clone());
        Ok(store.with_division_name(row))
    }

    async fn update_cabinet_member(
        &self,
        id: Uuid,
        changes: CabinetMemberChanges,
    ) -> RepoResult<Option<CabinetMember>> {
        let mut store = self.store.write().await;
        let updated = store.members.iter_mut().find(|m| m.id == id).map(|member| {
            if changes.division_id.is_some() {
                member.division_id = changes.division_id;
            }
            if let Some(name) = changes.name {
                member.name = name;
            }
            if let Some(position) = changes.position {
                member.position = position;
            }
            if changes.photo_url.is_some() {
                member.photo_url = changes.photo_url;
            }
            if let Some(order) = changes.display_order {
                member.display_order = order;
            }
            member.clone()
        });
        Ok(updated.map(|m| store.with_division_name(m)))
    }

    // --- Deletion ---

    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        if kind.delete_policy() == DeletePolicy::Soft {
            let stamped = match kind {
                ResourceKind::Film => store
                    .films
                    .iter_mut()
                    .find(|f| f.id == id && f.deleted_at.is_none())
                    .map(|f| {
                        f.deleted_at = Some(now);
                        f.updated_at = now;
                    }),
                ResourceKind::Article => store
                    .articles
                    .iter_mut()
                    .find(|a| a.id == id && a.deleted_at.is_none())
                    .map(|a| {
                        a.deleted_at = Some(now);
                        a.updated_at = now;
                    }),
                _ => None,
            };
            return Ok(stamped.is_some());
        }

        fn remove<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
            let before = rows.len();
            rows.retain(|row| !matches(row));
            rows.len() != before
        }

        let removed = match kind {
            ResourceKind::Genre => remove(&mut store.genres, |g| g.id == id),
            ResourceKind::ArticleCategory => remove(&mut store.categories, |c| c.id == id),
            ResourceKind::Content => remove(&mut store.contents, |c| c.id == id),
            ResourceKind::Project => remove(&mut store.projects, |p| p.id == id),
            ResourceKind::HeroImage => remove(&mut store.hero_images, |h| h.id == id),
            ResourceKind::Division => {
                let removed = remove(&mut store.divisions, |d| d.id == id);
                if removed {
                    // ON DELETE SET NULL
                    for member in store.members.iter_mut().filter(|m| m.division_id == Some(id)) {
                        member.division_id = None;
                    }
                }
                removed
            }
            ResourceKind::Cabinet => {
                let removed = remove(&mut store.cabinets, |c| c.id == id);
                if removed {
                    store.members.retain(|m| m.cabinet_id != id);
                }
                removed
            }
            ResourceKind::CabinetMember => remove(&mut store.members, |m| m.id == id),
            ResourceKind::Film | ResourceKind::Article => false,
        };
        Ok(removed)
    }

    // --- Dashboard ---

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        let store = self.store.read().await;
        let live_films = store.films.iter().filter(|f| f.deleted_at.is_none());
        let live_articles = store.articles.iter().filter(|a| a.deleted_at.is_none());

        Ok(DashboardStats {
            total_films: live_films.clone().count() as i64,
            now_showing_films: live_films
                .filter(|f| f.status == FilmStatus::NowShowing)
                .count() as i64,
            total_articles: live_articles.clone().count() as i64,
            published_articles: live_articles
                .filter(|a| a.status == ArticleStatus::Published)
                .count() as i64,
            total_contents: store.contents.len() as i64,
            total_hero_images: store.hero_images.len() as i64,
            total_projects: store.projects.len() as i64,
            total_cabinet_members: store.members.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_film(slug: &str, title: &str) -> NewFilm {
        NewFilm {
            slug: slug.to_string(),
            film_title: title.to_string(),
            ..NewFilm::default()
        }
    }

    #[tokio::test]
    async fn soft_deleted_film_frees_its_slug() {
        let repo = InMemoryRepository::new();
        let admin = Uuid::new_v4();
        let film = repo.create_film(new_film("inception", "Inception"), admin).await.unwrap();

        assert!(repo.film_slug_taken("inception", None).await.unwrap());
        assert!(!repo.film_slug_taken("inception", Some(film.id)).await.unwrap());

        assert!(repo.delete_resource(ResourceKind::Film, film.id).await.unwrap());
        assert!(!repo.delete_resource(ResourceKind::Film, film.id).await.unwrap());
        assert!(!repo.film_slug_taken("inception", None).await.unwrap());

        let kept = repo.get_film(film.id).await.unwrap().unwrap();
        assert!(kept.deleted_at.is_some());
    }

    #[tokio::test]
    async fn film_search_is_case_sensitive() {
        let repo = InMemoryRepository::new();
        let admin = Uuid::new_v4();
        repo.create_film(new_film("inception", "Inception"), admin).await.unwrap();

        let hit = FilmFilter {
            search: Some("Incep".to_string()),
            ..FilmFilter::default()
        };
        let miss = FilmFilter {
            search: Some("incep".to_string()),
            ..FilmFilter::default()
        };
        assert_eq!(repo.list_films(&hit).await.unwrap().total, 1);
        assert_eq!(repo.list_films(&miss).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn deleting_a_division_detaches_members() {
        let repo = InMemoryRepository::new();
        let admin = Uuid::new_v4();
        let division = repo
            .create_division(NewDivision {
                name: "Production".to_string(),
                slug: "production".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let cabinet = repo.create_cabinet(NewCabinet::default(), admin).await.unwrap();
        let member = repo
            .create_cabinet_member(
                cabinet.id,
                NewCabinetMember {
                    division_id: Some(division.id),
                    name: "Rani".to_string(),
                    position: "Director".to_string(),
                    ..NewCabinetMember::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(member.division_name.as_deref(), Some("Production"));

        assert!(repo.delete_resource(ResourceKind::Division, division.id).await.unwrap());
        let member = repo.get_cabinet_member(member.id).await.unwrap().unwrap();
        assert_eq!(member.division_id, None);
        assert_eq!(member.division_name, None);

        assert!(repo.delete_resource(ResourceKind::Cabinet, cabinet.id).await.unwrap());
        assert!(repo.get_cabinet_member(member.id).await.unwrap().is_none());
    }
}
