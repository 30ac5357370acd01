//! NewType wrappers for strong typing throughout the backend.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a course slug where a department slug is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Stable, human-assigned identifier for a department (e.g. "fiscal").
    ///
    /// Department slugs are what users, courses and announcements reference,
    /// and what session claims carry for department-scoped authorization.
    /// They survive renames of the department's display name.
    DepartmentSlug
);

newtype_string!(
    /// Stable, human-assigned identifier for a course
    /// (e.g. "tax-planning-basics").
    ///
    /// Used to key per-user course progress so the progress entries stay
    /// valid when a course's display name changes.
    CourseSlug
);

newtype_string!(
    /// Unique identifier stamped into every issued session token (`jti`).
    ///
    /// Tokens are self-contained and there is no revocation list today, but
    /// every token carries a stable id so a denylist could be added later
    /// without changing the token format.
    TokenId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_slug_creation() {
        let slug = DepartmentSlug::new("fiscal");
        assert_eq!(slug.as_str(), "fiscal");
        assert_eq!(slug.to_string(), "fiscal");
    }

    #[test]
    fn test_department_slug_from_string() {
        let slug: DepartmentSlug = "fiscal".into();
        assert_eq!(slug.as_str(), "fiscal");

        let slug: DepartmentSlug = String::from("contabil").into();
        assert_eq!(slug.as_str(), "contabil");
    }

    #[test]
    fn test_department_slug_into_inner() {
        let slug = DepartmentSlug::new("fiscal");
        let inner: String = slug.into_inner();
        assert_eq!(inner, "fiscal");
    }

    #[test]
    fn test_department_slug_serde() {
        let slug = DepartmentSlug::new("fiscal");
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"fiscal\"");

        let parsed: DepartmentSlug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }

    #[test]
    fn test_course_slug_creation() {
        let slug = CourseSlug::new("tax-planning-basics");
        assert_eq!(slug.as_str(), "tax-planning-basics");
    }

    #[test]
    fn test_token_id_creation() {
        let id = TokenId::new("0193e0a2-7c1f-7e5a-b7e2-3f2a9d1c8b6f");
        assert_eq!(id.as_str(), "0193e0a2-7c1f-7e5a-b7e2-3f2a9d1c8b6f");
    }

    #[test]
    fn test_type_equality() {
        let a = DepartmentSlug::new("fiscal");
        let b = DepartmentSlug::new("fiscal");
        let c = DepartmentSlug::new("contabil");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_type_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(DepartmentSlug::new("fiscal"));
        set.insert(DepartmentSlug::new("contabil"));

        assert!(set.contains(&DepartmentSlug::new("fiscal")));
        assert!(!set.contains(&DepartmentSlug::new("rh")));
    }

    #[test]
    fn test_borrow() {
        use std::borrow::Borrow;
        let slug = CourseSlug::new("tax-planning-basics");
        let s: &str = slug.borrow();
        assert_eq!(s, "tax-planning-basics");
    }
}
