//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different sources. Backend user IDs and auth
//! provider IDs are both opaque strings, but they are never interchangeable.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use roster_core::define_id;
/// define_id!(UserId);
/// define_id!(IdentityId);
///
/// let user_id = UserId::new("64f0c2");
/// let identity_id = IdentityId::new("user_2abc");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = identity_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Backend profile record ID (`_id` on the wire)
define_id!(UserId);
// Auth provider subject ID
define_id!(IdentityId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = UserId::new("64f0c2a1");
        assert_eq!(id.as_str(), "64f0c2a1");
        assert_eq!(id.to_string(), "64f0c2a1");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = IdentityId::from("user_2abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"user_2abc\"");

        let parsed: IdentityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
