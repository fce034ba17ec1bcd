use chrono::Utc;
use serde_json::{Value, json};
use studio_cms::models::{
    Admin, AdminProfile, ArticleStatus, CabinetStatus, CreateFilmRequest, Film, FilmDetail,
    FilmStatus, Genre, HeroImage, LoginRequest, Platform, UnknownVariant, UpdateFilmRequest,
};
use uuid::Uuid;

// --- Text enums ---

#[test]
fn test_status_enums_serialize_as_lowercase_text() {
    assert_eq!(serde_json::to_value(FilmStatus::NowShowing).unwrap(), json!("now_showing"));
    assert_eq!(serde_json::to_value(FilmStatus::ComingSoon).unwrap(), json!("coming_soon"));
    assert_eq!(serde_json::to_value(ArticleStatus::Published).unwrap(), json!("published"));
    assert_eq!(serde_json::to_value(Platform::Youtube).unwrap(), json!("youtube"));
    assert_eq!(serde_json::to_value(CabinetStatus::Archived).unwrap(), json!("archived"));
}

#[test]
fn test_status_enums_parse_from_column_text() {
    assert_eq!("archived".parse::<FilmStatus>(), Ok(FilmStatus::Archived));
    assert_eq!(Platform::try_from("podcast".to_string()), Ok(Platform::Podcast));

    let err = "Now_Showing".parse::<FilmStatus>().unwrap_err();
    assert_eq!(
        err,
        UnknownVariant {
            kind: "film status",
            value: "Now_Showing".to_string(),
        }
    );
    assert_eq!(err.to_string(), "unknown film status 'Now_Showing'");
}

#[test]
fn test_enum_defaults_are_the_first_variant() {
    assert_eq!(FilmStatus::default(), FilmStatus::ComingSoon);
    assert_eq!(ArticleStatus::default(), ArticleStatus::Draft);
    assert_eq!(CabinetStatus::default(), CabinetStatus::Active);
    assert_eq!(FilmStatus::ALL.len(), 3);
}

#[test]
fn test_unknown_status_in_payload_is_rejected() {
    let result = serde_json::from_value::<CreateFilmRequest>(json!({
        "film_title": "Inception",
        "status": "playing"
    }));
    assert!(result.is_err());
}

// --- Response shapes ---

#[test]
fn test_film_detail_flattens_film_fields() {
    let film = Film {
        id: Uuid::new_v4(),
        slug: "inception".to_string(),
        film_title: "Inception".to_string(),
        status: FilmStatus::NowShowing,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Film::default()
    };
    let detail = FilmDetail {
        film,
        genres: vec![Genre {
            id: Uuid::new_v4(),
            name: "Sci-Fi".to_string(),
            slug: "sci-fi".to_string(),
            created_at: Utc::now(),
        }],
    };

    let value = serde_json::to_value(&detail).unwrap();
    assert_eq!(value["slug"], "inception");
    assert_eq!(value["status"], "now_showing");
    assert!(value["deleted_at"].is_null());
    assert_eq!(value["genres"][0]["slug"], "sci-fi");
    assert!(value.get("film").is_none());
}

#[test]
fn test_hero_image_exposes_order_field() {
    let hero = HeroImage {
        id: Uuid::new_v4(),
        image_url: "/uploads/hero/a.jpg".to_string(),
        order: 4,
        ..HeroImage::default()
    };

    let value = serde_json::to_value(&hero).unwrap();
    assert_eq!(value["order"], 4);
    assert!(value.get("display_order").is_none());
}

#[test]
fn test_admin_profile_hides_password_hash() {
    let admin = Admin {
        id: Uuid::new_v4(),
        username: "AdminN0lder".to_string(),
        password_hash: "$2b$12$secret".to_string(),
        role: "superadmin".to_string(),
        is_active: true,
        ..Admin::default()
    };

    let value = serde_json::to_value(AdminProfile::from(&admin)).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 4);
    assert_eq!(value["username"], "AdminN0lder");
    assert!(!value.to_string().contains("secret"));
}

// --- Request payloads ---

#[test]
fn test_update_film_request_omits_absent_fields() {
    let change = UpdateFilmRequest {
        status: Some(FilmStatus::Archived),
        ..UpdateFilmRequest::default()
    };

    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value, json!({ "status": "archived" }));
}

#[test]
fn test_missing_required_fields_still_deserialize() {
    let request: CreateFilmRequest = serde_json::from_value(json!({})).unwrap();
    assert!(request.film_title.is_none());
    assert!(request.genre_ids.is_empty());

    let login: LoginRequest = serde_json::from_value(json!({ "username": "a" })).unwrap();
    assert!(login.password.is_none());
    assert!(!login.remember_me);
}

#[test]
fn test_update_genre_ids_distinguishes_absent_from_empty() {
    let absent: UpdateFilmRequest = serde_json::from_value(json!({})).unwrap();
    assert!(absent.genre_ids.is_none());

    let cleared: UpdateFilmRequest = serde_json::from_value(json!({ "genre_ids": [] })).unwrap();
    assert_eq!(cleared.genre_ids, Some(vec![]));

    let value: Value = serde_json::to_value(&cleared).unwrap();
    assert_eq!(value, json!({ "genre_ids": [] }));
}
