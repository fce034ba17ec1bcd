//! Routers split by access level. Each module only declares paths; the access
//! checks live in the `AuthAdmin` extractor and the handlers.

/// Unauthenticated, read-only site data plus the login/logout gateway.
pub mod public;

/// Routes that need a session but are not part of the dashboard API.
pub mod authenticated;

/// The admin dashboard API, nested under `/admin`.
pub mod admin;
