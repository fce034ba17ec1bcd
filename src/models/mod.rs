//! Database rows, request payloads and response shapes.
//!
//! Rows derive `FromRow`; request payloads keep required fields as `Option` so that
//! a missing field surfaces as a `Validation` error through the handlers instead of a
//! bare deserialization rejection.

use thiserror::Error;

/// Declares a lowercase, text-backed enum that round-trips through JSON, SQL `TEXT`
/// columns and query strings with the same spelling. The first variant is the default.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $first:ident => $first_text:literal
            $(, $variant:ident => $text:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, ts_rs::TS, utoipa::ToSchema,
        )]
        #[ts(export)]
        pub enum $name {
            #[serde(rename = $first_text)]
            $first,
            $(
                #[serde(rename = $text)]
                $variant,
            )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$first $(, $name::$variant)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$first => $first_text,
                    $($name::$variant => $text,)*
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $first_text => Ok($name::$first),
                    $($text => Ok($name::$variant),)*
                    other => Err($crate::models::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod admin;
pub mod article;
pub mod content;
pub mod film;
pub mod hero;
pub mod organization;
pub mod project;
pub mod stats;
pub mod upload;

pub use admin::*;
pub use article::*;
pub use content::*;
pub use film::*;
pub use hero::*;
pub use organization::*;
pub use project::*;
pub use stats::*;
pub use upload::*;

/// Raised when a stored or submitted text value does not name a known enum variant.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
