//! Domain models for the vetclinic system.

/// Declares a fieldless enum with a stable upper-case text form, used both
/// for serde and for the SQLite columns.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Text form used for storage and FFI.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }

            /// Parse the text form produced by [`Self::as_str`].
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod animal;
mod auxiliary_contact;
mod client;
mod descriptors;
mod error;
mod events;
mod identification;
mod life_cycle;
mod ownership;
mod transfer;

pub use animal::*;
pub use auxiliary_contact::*;
pub use client::*;
pub use descriptors::*;
pub use error::*;
pub use events::*;
pub use identification::*;
pub use life_cycle::*;
pub use ownership::*;
pub use transfer::*;
