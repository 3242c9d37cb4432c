//! CollabBridge domain core.
//!
//! Pure domain logic with no I/O: identifiers, the error taxonomy, closed
//! enums for roles and statuses, pagination math, search option parsing,
//! analytics math, notification templates, and rate-limit policies. Shared
//! by the repository layer, the event services, and the API server.

/// Declare a closed enum persisted as a `TEXT` column.
///
/// Generates `ALL`, `as_str`, `Display`, `FromStr` (rejecting unknown text
/// with [`error::CoreError::Validation`]) and serde impls using the same
/// text representation as the database.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The persisted text form.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

pub mod analytics;
pub mod booking;
pub mod error;
pub mod event;
pub mod messaging;
pub mod notification;
pub mod notification_templates;
pub mod pagination;
pub mod profile;
pub mod rate_limit;
pub mod review;
pub mod roles;
pub mod search;
pub mod types;
pub mod username;
