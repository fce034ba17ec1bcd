use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{RepoResult, Repository};
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

/// Member rows carry the division name through a join.
const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.cabinet_id, m.division_id, m.name, m.position, m.photo_url,
           m.display_order, m.created_at, d.name AS division_name
    FROM cabinet_members m
    LEFT JOIN divisions d ON d.id = m.division_id
"#;

/// search_pattern
///
/// Turns free-text search into a case-sensitive `LIKE` pattern, escaping the
/// wildcard characters so user input always matches literally.
pub(crate) fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

/// Appends `AND (col1 LIKE $n OR col2 LIKE $n ...)` for the given columns.
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, pattern: &str, columns: &[&str]) {
    builder.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" LIKE ").push_bind(pattern.to_string());
    }
    builder.push(")");
}

fn push_film_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &FilmFilter) {
    builder.push(" WHERE 1 = 1");
    if !filter.include_deleted {
        builder.push(" AND f.deleted_at IS NULL");
    }
    if let Some(status) = filter.status {
        builder.push(" AND f.status = ").push_bind(status.as_str());
    }
    if let Some(genre_id) = filter.genre_id {
        builder
            .push(" AND EXISTS (SELECT 1 FROM film_genres fg WHERE fg.film_id = f.id AND fg.genre_id = ")
            .push_bind(genre_id)
            .push(")");
    }
    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        push_search(builder, &pattern, &["f.film_title", "f.director"]);
    }
}

fn push_article_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder.push(" WHERE a.deleted_at IS NULL");
    if let Some(status) = filter.status {
        builder.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND a.category_id = ").push_bind(category_id);
    }
    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        push_search(builder, &pattern, &["a.title", "a.excerpt", "a.body"]);
    }
}

fn push_content_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContentFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(platform) = filter.platform {
        builder.push(" AND c.platform = ").push_bind(platform.as_str());
    }
    if let Some(published) = filter.published {
        builder.push(" AND c.is_published = ").push_bind(published);
    }
    if let Some(pattern) = search_pattern(filter.search.as_deref()) {
        push_search(builder, &pattern, &["c.title", "c.url"]);
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: PageParams) {
    builder
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are built at
/// runtime (`query_as` / `QueryBuilder`) so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> RepoResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await?)
    }

    async fn slug_taken(
        &self,
        table: &str,
        soft_deleted: bool,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> RepoResult<bool> {
        let live = if soft_deleted { " AND deleted_at IS NULL" } else { "" };
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE slug = $1{live} AND ($2::uuid IS NULL OR id <> $2))"
        );
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(slug)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Admins ---

    async fn find_admin_by_id(&self, id: Uuid) -> RepoResult<Option<Admin>> {
        Ok(sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_admin_by_username(&self, username: &str) -> RepoResult<Option<Admin>> {
        Ok(sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// upsert_admin
    ///
    /// `ON CONFLICT (username)` keeps the seed idempotent: re-running refreshes the
    /// password hash and role and reactivates the account.
    async fn upsert_admin(&self, admin: NewAdmin) -> RepoResult<Admin> {
        Ok(sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (id, username, password_hash, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW())
            ON CONFLICT (username) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    role = EXCLUDED.role,
                    is_active = TRUE,
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(admin.username)
        .bind(admin.password_hash)
        .bind(admin.role)
        .fetch_one(&self.pool)
        .await?)
    }

    // --- Films ---

    /// list_films
    ///
    /// The same filter clause feeds the count and the page query so `total_count`
    /// always describes the rows being paged.
    async fn list_films(&self, filter: &FilmFilter) -> RepoResult<Page<Film>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM films f");
        push_film_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT f.* FROM films f");
        push_film_filters(&mut select, filter);
        select.push(" ORDER BY f.created_at DESC, f.id");
        push_page(&mut select, filter.page);
        let items = select.build_query_as::<Film>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn get_film(&self, id: Uuid) -> RepoResult<Option<Film>> {
        Ok(sqlx::query_as::<_, Film>("SELECT * FROM films WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn film_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        self.slug_taken("films", true, slug, exclude).await
    }

    async fn create_film(&self, film: NewFilm, admin_id: Uuid) -> RepoResult<Film> {
        Ok(sqlx::query_as::<_, Film>(
            r#"
            INSERT INTO films (
                id, slug, film_title, duration, director, release_date, status,
                poster_url, trailer_url, synopsis, admin_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(film.slug)
        .bind(film.film_title)
        .bind(film.duration)
        .bind(film.director)
        .bind(film.release_date)
        .bind(film.status.as_str())
        .bind(film.poster_url)
        .bind(film.trailer_url)
        .bind(film.synopsis)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// update_film
    ///
    /// `COALESCE` keeps every column whose change is `None`.
    async fn update_film(&self, id: Uuid, changes: FilmChanges) -> RepoResult<Option<Film>> {
        Ok(sqlx::query_as::<_, Film>(
            r#"
            UPDATE films
            SET slug = COALESCE($2, slug),
                film_title = COALESCE($3, film_title),
                duration = COALESCE($4, duration),
                director = COALESCE($5, director),
                release_date = COALESCE($6, release_date),
                status = COALESCE($7, status),
                poster_url = COALESCE($8, poster_url),
                trailer_url = COALESCE($9, trailer_url),
                synopsis = COALESCE($10, synopsis),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.slug)
        .bind(changes.film_title)
        .bind(changes.duration)
        .bind(changes.director)
        .bind(changes.release_date)
        .bind(changes.status.map(|s: FilmStatus| s.as_str()))
        .bind(changes.poster_url)
        .bind(changes.trailer_url)
        .bind(changes.synopsis)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn restore_film(&self, id: Uuid) -> RepoResult<Option<Film>> {
        Ok(sqlx::query_as::<_, Film>(
            "UPDATE films SET deleted_at = NULL, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn film_genres(&self, film_id: Uuid) -> RepoResult<Vec<Genre>> {
        Ok(sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.* FROM genres g
            JOIN film_genres fg ON fg.genre_id = g.id
            WHERE fg.film_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_film_genres(&self, film_id: Uuid, genre_ids: &[Uuid]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film_id)
            .execute(&mut *tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO film_genres (film_id, genre_id) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
            )
            .bind(film_id)
            .bind(genre_ids.to_vec())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // --- Genres ---

    async fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        Ok(sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_genre(&self, id: Uuid) -> RepoResult<Option<Genre>> {
        Ok(sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn genre_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        self.slug_taken("genres", false, slug, exclude).await
    }

    async fn create_genre(&self, name: String, slug: String) -> RepoResult<Genre> {
        Ok(sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name, slug, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_genre(&self, id: Uuid, name: String, slug: String) -> RepoResult<Option<Genre>> {
        Ok(sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $2, slug = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn genre_usage(&self, id: Uuid) -> RepoResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM film_genres WHERE genre_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    // --- Article categories ---

    async fn list_categories(&self) -> RepoResult<Vec<ArticleCategory>> {
        Ok(
            sqlx::query_as::<_, ArticleCategory>("SELECT * FROM article_categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_category(&self, id: Uuid) -> RepoResult<Option<ArticleCategory>> {
        Ok(
            sqlx::query_as::<_, ArticleCategory>("SELECT * FROM article_categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn category_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        self.slug_taken("article_categories", false, slug, exclude).await
    }

    async fn create_category(&self, name: String, slug: String) -> RepoResult<ArticleCategory> {
        Ok(sqlx::query_as::<_, ArticleCategory>(
            "INSERT INTO article_categories (id, name, slug, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        slug: String,
    ) -> RepoResult<Option<ArticleCategory>> {
        Ok(sqlx::query_as::<_, ArticleCategory>(
            "UPDATE article_categories SET name = $2, slug = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn category_usage(&self, id: Uuid) -> RepoResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    // --- Articles ---

    async fn list_articles(&self, filter: &ArticleFilter) -> RepoResult<Page<Article>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles a");
        push_article_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT a.* FROM articles a");
        push_article_filters(&mut select, filter);
        select.push(" ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id");
        push_page(&mut select, filter.page);
        let items = select.build_query_as::<Article>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn get_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        Ok(sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_article_by_slug(&self, slug: &str) -> RepoResult<Option<Article>> {
        Ok(sqlx::query_as::<_, Article>(
            "SELECT * FROM articles WHERE slug = $1 AND deleted_at IS NULL",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn article_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        self.slug_taken("articles", true, slug, exclude).await
    }

    async fn create_article(&self, article: NewArticle, admin_id: Uuid) -> RepoResult<Article> {
        Ok(sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (
                id, title, slug, excerpt, body, cover_image_url, status, category_id,
                admin_id, published_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(article.title)
        .bind(article.slug)
        .bind(article.excerpt)
        .bind(article.body)
        .bind(article.cover_image_url)
        .bind(article.status.as_str())
        .bind(article.category_id)
        .bind(admin_id)
        .bind(article.published_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_article(
        &self,
        id: Uuid,
        changes: ArticleChanges,
    ) -> RepoResult<Option<Article>> {
        Ok(sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                excerpt = COALESCE($4, excerpt),
                body = COALESCE($5, body),
                cover_image_url = COALESCE($6, cover_image_url),
                status = COALESCE($7, status),
                category_id = COALESCE($8, category_id),
                published_at = COALESCE($9, published_at),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.slug)
        .bind(changes.excerpt)
        .bind(changes.body)
        .bind(changes.cover_image_url)
        .bind(changes.status.map(|s: ArticleStatus| s.as_str()))
        .bind(changes.category_id)
        .bind(changes.published_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn publish_article(&self, id: Uuid, at: DateTime<Utc>) -> RepoResult<Option<Article>> {
        Ok(sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles SET status = $2, published_at = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ArticleStatus::Published.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn unpublish_article(&self, id: Uuid) -> RepoResult<Option<Article>> {
        Ok(sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ArticleStatus::Draft.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn article_images(&self, article_id: Uuid) -> RepoResult<Vec<ArticleImage>> {
        Ok(sqlx::query_as::<_, ArticleImage>(
            "SELECT * FROM article_images WHERE article_id = $1 ORDER BY position",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn replace_article_images(
        &self,
        article_id: Uuid,
        images: Vec<NewArticleImage>,
    ) -> RepoResult<Vec<ArticleImage>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM article_images WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            let row = sqlx::query_as::<_, ArticleImage>(
                r#"
                INSERT INTO article_images (id, article_id, image_url, caption, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(article_id)
            .bind(image.image_url)
            .bind(image.caption)
            .bind(image.position)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row);
        }

        tx.commit().await?;
        Ok(stored)
    }

    // --- Contents ---

    async fn list_contents(&self, filter: &ContentFilter) -> RepoResult<Page<Content>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contents c");
        push_content_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT c.* FROM contents c");
        push_content_filters(&mut select, filter);
        select.push(" ORDER BY COALESCE(c.published_at, c.created_at) DESC, c.id");
        push_page(&mut select, filter.page);
        let items = select.build_query_as::<Content>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn get_content(&self, id: Uuid) -> RepoResult<Option<Content>> {
        Ok(sqlx::query_as::<_, Content>("SELECT * FROM contents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_content(&self, content: NewContent, admin_id: Uuid) -> RepoResult<Content> {
        Ok(sqlx::query_as::<_, Content>(
            r#"
            INSERT INTO contents (
                id, title, platform, url, banner, is_published, published_at,
                admin_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(content.title)
        .bind(content.platform.as_str())
        .bind(content.url)
        .bind(content.banner)
        .bind(content.is_published)
        .bind(content.published_at)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_content(
        &self,
        id: Uuid,
        changes: ContentChanges,
    ) -> RepoResult<Option<Content>> {
        Ok(sqlx::query_as::<_, Content>(
            r#"
            UPDATE contents
            SET title = COALESCE($2, title),
                platform = COALESCE($3, platform),
                url = COALESCE($4, url),
                banner = COALESCE($5, banner),
                published_at = COALESCE($6, published_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.platform.map(|p| p.as_str()))
        .bind(changes.url)
        .bind(changes.banner)
        .bind(changes.published_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_content_published(
        &self,
        id: Uuid,
        published: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<Option<Content>> {
        if !published {
            return Ok(sqlx::query_as::<_, Content>(
                "UPDATE contents SET is_published = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?);
        }

        Ok(sqlx::query_as::<_, Content>(
            r#"
            UPDATE contents
            SET is_published = TRUE, published_at = COALESCE(published_at, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// promo_contents
    ///
    /// The half-open window `[from, until)` is computed by the caller.
    async fn promo_contents(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepoResult<Vec<Content>> {
        Ok(sqlx::query_as::<_, Content>(
            r#"
            SELECT * FROM contents
            WHERE banner IS NOT NULL
              AND is_published = TRUE
              AND published_at >= $1
              AND published_at < $2
            ORDER BY published_at DESC
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?)
    }

    // --- Projects ---

    async fn list_projects(&self, search: Option<&str>, page: PageParams) -> RepoResult<Page<Project>> {
        let pattern = search_pattern(search);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects p WHERE 1 = 1");
        if let Some(pattern) = &pattern {
            push_search(&mut count, pattern, &["p.title", "p.description"]);
        }
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT p.* FROM projects p WHERE 1 = 1");
        if let Some(pattern) = &pattern {
            push_search(&mut select, pattern, &["p.title", "p.description"]);
        }
        select.push(" ORDER BY p.year DESC NULLS LAST, p.created_at DESC, p.id");
        push_page(&mut select, page);
        let items = select.build_query_as::<Project>().fetch_all(&self.pool).await?;

        Ok(Page { items, total })
    }

    async fn get_project(&self, id: Uuid) -> RepoResult<Option<Project>> {
        Ok(sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_project(&self, project: NewProject, admin_id: Uuid) -> RepoResult<Project> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                id, title, description, image_url, link_url, year, admin_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project.title)
        .bind(project.description)
        .bind(project.image_url)
        .bind(project.link_url)
        .bind(project.year)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_project(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> RepoResult<Option<Project>> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                link_url = COALESCE($5, link_url),
                year = COALESCE($6, year),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.image_url)
        .bind(changes.link_url)
        .bind(changes.year)
        .fetch_optional(&self.pool)
        .await?)
    }

    // --- Hero images ---

    async fn list_hero_images(&self) -> RepoResult<Vec<HeroImage>> {
        Ok(sqlx::query_as::<_, HeroImage>(
            "SELECT * FROM hero_images ORDER BY display_order, created_at",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_hero_image(&self, id: Uuid) -> RepoResult<Option<HeroImage>> {
        Ok(sqlx::query_as::<_, HeroImage>("SELECT * FROM hero_images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_hero_image(&self, image: NewHeroImage, admin_id: Uuid) -> RepoResult<HeroImage> {
        Ok(sqlx::query_as::<_, HeroImage>(
            r#"
            INSERT INTO hero_images (
                id, image_url, image_path, display_order, height, admin_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(image.image_url)
        .bind(image.image_path)
        .bind(image.order)
        .bind(image.height)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_hero_image(
        &self,
        id: Uuid,
        changes: HeroImageChanges,
    ) -> RepoResult<Option<HeroImage>> {
        Ok(sqlx::query_as::<_, HeroImage>(
            r#"
            UPDATE hero_images
            SET image_url = COALESCE($2, image_url),
                image_path = CASE WHEN $6 THEN $3 ELSE image_path END,
                display_order = COALESCE($4, display_order),
                height = COALESCE($5, height),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.image_url)
        .bind(changes.image_path.clone().flatten())
        .bind(changes.order)
        .bind(changes.height)
        .bind(changes.image_path.is_some())
        .fetch_optional(&self.pool)
        .await?)
    }

    // --- Divisions ---

    async fn list_divisions(&self) -> RepoResult<Vec<Division>> {
        Ok(sqlx::query_as::<_, Division>("SELECT * FROM divisions ORDER BY name")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_division(&self, id: Uuid) -> RepoResult<Option<Division>> {
        Ok(sqlx::query_as::<_, Division>("SELECT * FROM divisions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn division_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> RepoResult<bool> {
        self.slug_taken("divisions", false, slug, exclude).await
    }

    async fn create_division(&self, division: NewDivision) -> RepoResult<Division> {
        Ok(sqlx::query_as::<_, Division>(
            r#"
            INSERT INTO divisions (id, name, slug, description, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(division.name)
        .bind(division.slug)
        .bind(division.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_division(
        &self,
        id: Uuid,
        division: NewDivision,
    ) -> RepoResult<Option<Division>> {
        Ok(sqlx::query_as::<_, Division>(
            r#"
            UPDATE divisions
            SET name = $2, slug = $3, description = COALESCE($4, description)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(division.name)
        .bind(division.slug)
        .bind(division.description)
        .fetch_optional(&self.pool)
        .await?)
    }

    // --- Cabinets ---

    async fn list_cabinets(&self) -> RepoResult<Vec<Cabinet>> {
        Ok(sqlx::query_as::<_, Cabinet>("SELECT * FROM cabinets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_cabinet(&self, id: Uuid) -> RepoResult<Option<Cabinet>> {
        Ok(sqlx::query_as::<_, Cabinet>("SELECT * FROM cabinets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_cabinet(&self, cabinet: NewCabinet, admin_id: Uuid) -> RepoResult<Cabinet> {
        Ok(sqlx::query_as::<_, Cabinet>(
            r#"
            INSERT INTO cabinets (id, name, period, status, admin_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cabinet.name)
        .bind(cabinet.period)
        .bind(cabinet.status.as_str())
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_cabinet(
        &self,
        id: Uuid,
        changes: CabinetChanges,
    ) -> RepoResult<Option<Cabinet>> {
        Ok(sqlx::query_as::<_, Cabinet>(
            r#"
            UPDATE cabinets
            SET name = COALESCE($2, name),
                period = COALESCE($3, period),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.period)
        .bind(changes.status.map(|s: CabinetStatus| s.as_str()))
        .fetch_optional(&self.pool)
        .await?)
    }

    /// first_active_cabinet
    ///
    /// Nothing prevents two active cabinets; the oldest one is returned.
    async fn first_active_cabinet(&self) -> RepoResult<Option<Cabinet>> {
        Ok(sqlx::query_as::<_, Cabinet>(
            "SELECT * FROM cabinets WHERE status = $1 ORDER BY created_at ASC, id LIMIT 1",
        )
        .bind(CabinetStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn cabinet_members(&self, cabinet_id: Uuid) -> RepoResult<Vec<CabinetMember>> {
        let sql = format!("{MEMBER_SELECT} WHERE m.cabinet_id = $1 ORDER BY m.display_order, m.created_at");
        Ok(sqlx::query_as::<_, CabinetMember>(&sql)
            .bind(cabinet_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_cabinet_member(&self, id: Uuid) -> RepoResult<Option<CabinetMember>> {
        let sql = format!("{MEMBER_SELECT} WHERE m.id = $1");
        Ok(sqlx::query_as::<_, CabinetMember>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_cabinet_member(
        &self,
        cabinet_id: Uuid,
        member: NewCabinetMember,
    ) -> RepoResult<CabinetMember> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO cabinet_members (
                id, cabinet_id, division_id, name, position, photo_url, display_order, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(id)
        .bind(cabinet_id)
        .bind(member.division_id)
        .bind(member.name)
        .bind(member.position)
        .bind(member.photo_url)
        .bind(member.display_order)
        .execute(&self.pool)
        .await?;

        // Re-read through the join so `division_name` is populated.
        self.get_cabinet_member(id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    async fn update_cabinet_member(
        &self,
        id: Uuid,
        changes: CabinetMemberChanges,
    ) -> RepoResult<Option<CabinetMember>> {
        let updated = sqlx::query(
            r#"
            UPDATE cabinet_members
            SET division_id = COALESCE($2, division_id),
                name = COALESCE($3, name),
                position = COALESCE($4, position),
                photo_url = COALESCE($5, photo_url),
                display_order = COALESCE($6, display_order)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.division_id)
        .bind(changes.name)
        .bind(changes.position)
        .bind(changes.photo_url)
        .bind(changes.display_order)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_cabinet_member(id).await
    }

    // --- Deletion ---

    /// delete_resource
    ///
    /// Table names come from `ResourceKind`, never from request input.
    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> RepoResult<bool> {
        let sql = match kind.delete_policy() {
            DeletePolicy::Soft => format!(
                "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                kind.table()
            ),
            DeletePolicy::Hard => format!("DELETE FROM {} WHERE id = $1", kind.table()),
        };

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Dashboard ---

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        Ok(DashboardStats {
            total_films: self
                .count("SELECT COUNT(*) FROM films WHERE deleted_at IS NULL")
                .await?,
            now_showing_films: self
                .count("SELECT COUNT(*) FROM films WHERE deleted_at IS NULL AND status = 'now_showing'")
                .await?,
            total_articles: self
                .count("SELECT COUNT(*) FROM articles WHERE deleted_at IS NULL")
                .await?,
            published_articles: self
                .count("SELECT COUNT(*) FROM articles WHERE deleted_at IS NULL AND status = 'published'")
                .await?,
            total_contents: self.count("SELECT COUNT(*) FROM contents").await?,
            total_hero_images: self.count("SELECT COUNT(*) FROM hero_images").await?,
            total_projects: self.count("SELECT COUNT(*) FROM projects").await?,
            total_cabinet_members: self.count("SELECT COUNT(*) FROM cabinet_members").await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::search_pattern;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern(Some("100%_off")).as_deref(), Some("%100\\%\\_off%"));
        assert_eq!(search_pattern(Some("  Inception ")).as_deref(), Some("%Inception%"));
        assert_eq!(search_pattern(Some("   ")), None);
        assert_eq!(search_pattern(None), None);
    }
}
