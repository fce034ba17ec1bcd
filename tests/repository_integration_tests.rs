//! Postgres-backed repository tests. They need a reachable `DATABASE_URL` and are
//! ignored by default: `cargo test -- --ignored`.

use studio_cms::{
    access::ResourceKind,
    models::{
        Admin, FilmFilter, FilmStatus, NewAdmin, NewCabinet, NewCabinetMember, NewDivision,
        NewFilm, ROLE_ADMIN,
    },
    pagination::PageParams,
    repository::{PostgresRepository, RepoError, Repository},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Every test works under its own admin and unique slugs so runs can share a database.
async fn create_test_admin(repo: &PostgresRepository) -> Admin {
    repo.upsert_admin(NewAdmin {
        username: format!("test-{}", Uuid::new_v4()),
        password_hash: "not-a-real-hash".to_string(),
        role: ROLE_ADMIN.to_string(),
    })
    .await
    .expect("Failed to create test admin")
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn new_film(slug: &str) -> NewFilm {
    NewFilm {
        slug: slug.to_string(),
        film_title: slug.to_string(),
        status: FilmStatus::NowShowing,
        ..NewFilm::default()
    }
}

// --- Films ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_live_film_slug_is_unique_but_deleted_slug_is_reusable() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_test_admin(&repo).await;
    let slug = unique("film");

    let first = repo.create_film(new_film(&slug), admin.id).await.unwrap();
    assert!(repo.film_slug_taken(&slug, None).await.unwrap());
    assert!(!repo.film_slug_taken(&slug, Some(first.id)).await.unwrap());

    let err = repo.create_film(new_film(&slug), admin.id).await.unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation(_)), "got {err:?}");

    assert!(repo.delete_resource(ResourceKind::Film, first.id).await.unwrap());
    // Already deleted
    assert!(!repo.delete_resource(ResourceKind::Film, first.id).await.unwrap());
    assert!(!repo.film_slug_taken(&slug, None).await.unwrap());

    let second = repo.create_film(new_film(&slug), admin.id).await.unwrap();
    assert_ne!(first.id, second.id);

    let stored = repo.get_film(first.id).await.unwrap().unwrap();
    assert!(stored.deleted_at.is_some());
}

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_film_listing_counts_and_pages() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_test_admin(&repo).await;
    let marker = unique("paging");

    for i in 0..5 {
        repo.create_film(new_film(&format!("{marker}-{i}")), admin.id)
            .await
            .unwrap();
    }

    let filter = FilmFilter {
        search: Some(marker.clone()),
        page: PageParams::new(Some(2), Some(2)),
        ..FilmFilter::default()
    };
    let page = repo.list_films(&filter).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);

    let filter = FilmFilter {
        page: PageParams::new(Some(3), Some(2)),
        ..filter
    };
    let page = repo.list_films(&filter).await.unwrap();
    assert_eq!(page.items.len(), 1);
}

// --- Genres ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_genre_in_use_is_restricted() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_test_admin(&repo).await;

    let slug = unique("genre");
    let genre = repo.create_genre(slug.clone(), slug).await.unwrap();
    let film = repo.create_film(new_film(&unique("film")), admin.id).await.unwrap();
    repo.set_film_genres(film.id, &[genre.id]).await.unwrap();

    assert_eq!(repo.genre_usage(genre.id).await.unwrap(), 1);
    assert!(repo.delete_resource(ResourceKind::Genre, genre.id).await.is_err());

    repo.set_film_genres(film.id, &[]).await.unwrap();
    assert_eq!(repo.genre_usage(genre.id).await.unwrap(), 0);
    assert!(repo.delete_resource(ResourceKind::Genre, genre.id).await.unwrap());
}

// --- Organization ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_division_delete_detaches_members_and_cabinet_delete_cascades() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_test_admin(&repo).await;

    let slug = unique("division");
    let division = repo
        .create_division(NewDivision {
            name: slug.clone(),
            slug,
            description: None,
        })
        .await
        .unwrap();
    let cabinet = repo
        .create_cabinet(
            NewCabinet {
                name: unique("cabinet"),
                ..NewCabinet::default()
            },
            admin.id,
        )
        .await
        .unwrap();
    let member = repo
        .create_cabinet_member(
            cabinet.id,
            NewCabinetMember {
                division_id: Some(division.id),
                name: "Rina".to_string(),
                position: "Head".to_string(),
                ..NewCabinetMember::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(member.division_name.as_deref(), Some(division.name.as_str()));

    assert!(repo.delete_resource(ResourceKind::Division, division.id).await.unwrap());
    let member = repo.get_cabinet_member(member.id).await.unwrap().unwrap();
    assert!(member.division_id.is_none());
    assert!(member.division_name.is_none());

    assert!(repo.delete_resource(ResourceKind::Cabinet, cabinet.id).await.unwrap());
    assert!(repo.get_cabinet_member(member.id).await.unwrap().is_none());
}

// --- Admins ---

#[test]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_admin_refreshes_existing_username() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_test_admin(&repo).await;

    let refreshed = repo
        .upsert_admin(NewAdmin {
            username: admin.username.clone(),
            password_hash: "another-hash".to_string(),
            role: "superadmin".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(refreshed.id, admin.id);
    assert_eq!(refreshed.password_hash, "another-hash");
    assert_eq!(refreshed.role, "superadmin");
    assert!(refreshed.is_active);
}
