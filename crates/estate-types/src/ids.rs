//! Type-safe identifier wrappers.
//!
//! Runtime entities (tenants, properties, missions, notifications, market
//! entities) get a UUID v7 newtype so that ids sort by creation order and
//! cannot be mixed at compile time. Catalog entries that are authored by
//! hand (achievements, notification templates, scheduler tasks) are keyed by
//! a readable string slug instead.

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

/// Generates a newtype wrapper around a string slug.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create a key from anything string-like.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

define_id! {
    /// Unique identifier for the simulated player.
    PlayerId
}

define_id! {
    /// Unique identifier for a property owned by the player.
    PropertyId
}

define_id! {
    /// Unique identifier for a tenant living in a property.
    TenantId
}

define_id! {
    /// Unique identifier for a tenant complaint.
    ComplaintId
}

define_id! {
    /// Unique identifier for a market vendor.
    VendorId
}

define_id! {
    /// Unique identifier for a product sold by a vendor.
    ProductId
}

define_id! {
    /// Unique identifier for a market event (shortage, surplus, ...).
    MarketEventId
}

define_id! {
    /// Unique identifier for a market trend record.
    TrendId
}

define_id! {
    /// Unique identifier for an exploration mission.
    MissionId
}

define_id! {
    /// Unique identifier for a notification in a player's inbox.
    NotificationId
}

define_key! {
    /// Slug identifying an achievement definition (e.g. `first_property`).
    AchievementId
}

define_key! {
    /// Slug identifying a notification template (e.g. `rent_missed`).
    TemplateId
}

define_key! {
    /// Slug identifying a pending scheduler task (e.g. `mission:<uuid>`).
    TaskId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let tenant = TenantId::new();
        let property = PropertyId::new();
        assert_ne!(tenant.into_inner(), Uuid::nil());
        assert_ne!(property.into_inner(), Uuid::nil());
    }

    #[test]
    fn keys_display_as_slug() {
        let key = AchievementId::new("first_property");
        assert_eq!(key.to_string(), "first_property");
        assert_eq!(key.as_str(), "first_property");
        assert_eq!(AchievementId::from("first_property"), key);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = TenantId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }
}
