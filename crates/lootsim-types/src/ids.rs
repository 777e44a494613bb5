//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Tables, entries, and items each get their own ID type so a pity rule
//! cannot accidentally point at an item, or a result at a table. IDs are
//! created by the surrounding application and arrive here already assigned;
//! the `new()` constructors exist for tests and fixtures.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a loot table definition.
    TableId
}

define_id! {
    /// Unique identifier for a weighted or guaranteed entry within a table.
    EntryId
}

define_id! {
    /// Reference to the item an entry drops.
    ItemId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let table = TableId::new();
        let entry = EntryId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(table.into_inner(), Uuid::nil());
        assert_ne!(entry.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid_string() {
        let id = EntryId::from(Uuid::nil());
        let json = serde_json::to_string(&id).ok();
        assert_eq!(
            json.as_deref(),
            Some("\"00000000-0000-0000-0000-000000000000\"")
        );
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ItemId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
