use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    auth::AuthAdmin,
    error::AppError,
    models::{Article, Cabinet, Content, Film, HeroImage, Project, ROLE_SUPERADMIN},
};

/// DeletePolicy
///
/// How a resource disappears: by stamping `deleted_at` or by removing the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    Soft,
    Hard,
}

/// ResourceKind
///
/// Every deletable resource, with its table and its delete policy. The repository's
/// `delete_resource` reads the policy from here so no route picks it ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Film,
    Genre,
    ArticleCategory,
    Article,
    Content,
    Project,
    HeroImage,
    Division,
    Cabinet,
    CabinetMember,
}

impl ResourceKind {
    pub const fn table(self) -> &'static str {
        match self {
            ResourceKind::Film => "films",
            ResourceKind::Genre => "genres",
            ResourceKind::ArticleCategory => "article_categories",
            ResourceKind::Article => "articles",
            ResourceKind::Content => "contents",
            ResourceKind::Project => "projects",
            ResourceKind::HeroImage => "hero_images",
            ResourceKind::Division => "divisions",
            ResourceKind::Cabinet => "cabinets",
            ResourceKind::CabinetMember => "cabinet_members",
        }
    }

    pub const fn delete_policy(self) -> DeletePolicy {
        match self {
            ResourceKind::Film | ResourceKind::Article => DeletePolicy::Soft,
            _ => DeletePolicy::Hard,
        }
    }

    /// Human label used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            ResourceKind::Film => "Film",
            ResourceKind::Genre => "Genre",
            ResourceKind::ArticleCategory => "Article category",
            ResourceKind::Article => "Article",
            ResourceKind::Content => "Content",
            ResourceKind::Project => "Project",
            ResourceKind::HeroImage => "Hero image",
            ResourceKind::Division => "Division",
            ResourceKind::Cabinet => "Cabinet",
            ResourceKind::CabinetMember => "Cabinet member",
        }
    }
}

/// Owned
///
/// Rows that record their creating admin.
pub trait Owned {
    const KIND: ResourceKind;

    fn owner_id(&self) -> Uuid;

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Owned for Film {
    const KIND: ResourceKind = ResourceKind::Film;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Owned for Article {
    const KIND: ResourceKind = ResourceKind::Article;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Owned for Content {
    const KIND: ResourceKind = ResourceKind::Content;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
}

impl Owned for Project {
    const KIND: ResourceKind = ResourceKind::Project;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
}

impl Owned for HeroImage {
    const KIND: ResourceKind = ResourceKind::HeroImage;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
}

impl Owned for Cabinet {
    const KIND: ResourceKind = ResourceKind::Cabinet;
    fn owner_id(&self) -> Uuid {
        self.admin_id
    }
}

/// Superadmins manage everything; other admins manage what they created.
pub fn can_manage(owner_id: Uuid, caller: &AuthAdmin) -> bool {
    caller.role == ROLE_SUPERADMIN || owner_id == caller.id
}

/// ensure_active
///
/// `NotFound` when the resource is absent or soft-deleted.
pub fn ensure_active<T: Owned>(resource: Option<T>) -> Result<T, AppError> {
    match resource {
        Some(row) if row.deleted_at().is_none() => Ok(row),
        _ => Err(AppError::not_found(T::KIND.label())),
    }
}

/// ensure_owned
///
/// The ownership check applied before every admin mutation of an owned resource:
/// `NotFound` when absent or soft-deleted, `Forbidden` when the caller did not create
/// it and is not a superadmin.
pub fn ensure_owned<T: Owned>(resource: Option<T>, caller: &AuthAdmin) -> Result<T, AppError> {
    let row = ensure_active(resource)?;
    if can_manage(row.owner_id(), caller) {
        Ok(row)
    } else {
        Err(AppError::Forbidden(format!(
            "{} belongs to another admin",
            T::KIND.label()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_ADMIN;

    fn caller(id: Uuid, role: &str) -> AuthAdmin {
        AuthAdmin {
            id,
            username: "tester".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn delete_policies_are_explicit_per_kind() {
        assert_eq!(ResourceKind::Film.delete_policy(), DeletePolicy::Soft);
        assert_eq!(ResourceKind::Article.delete_policy(), DeletePolicy::Soft);
        assert_eq!(ResourceKind::Genre.delete_policy(), DeletePolicy::Hard);
        assert_eq!(ResourceKind::HeroImage.delete_policy(), DeletePolicy::Hard);
        assert_eq!(ResourceKind::Content.delete_policy(), DeletePolicy::Hard);
    }

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        let owner = Uuid::from_u128(1);
        let film = Film {
            admin_id: owner,
            ..Film::default()
        };

        assert!(ensure_owned(Some(film.clone()), &caller(owner, ROLE_ADMIN)).is_ok());
        assert!(matches!(
            ensure_owned(Some(film.clone()), &caller(Uuid::from_u128(2), ROLE_ADMIN)),
            Err(AppError::Forbidden(_))
        ));
        assert!(ensure_owned(Some(film), &caller(Uuid::from_u128(2), ROLE_SUPERADMIN)).is_ok());
    }

    #[test]
    fn soft_deleted_rows_are_not_found() {
        let owner = Uuid::from_u128(1);
        let film = Film {
            admin_id: owner,
            deleted_at: Some(Utc::now()),
            ..Film::default()
        };

        assert_eq!(
            ensure_owned(Some(film), &caller(owner, ROLE_ADMIN)).unwrap_err(),
            AppError::NotFound("Film not found".to_string())
        );
        assert!(matches!(
            ensure_owned::<Content>(None, &caller(owner, ROLE_ADMIN)),
            Err(AppError::NotFound(_))
        ));
    }
}
