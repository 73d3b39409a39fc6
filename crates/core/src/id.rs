// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes for builds and jobs.

/// Define a `SmolStr`-backed identifier with a type prefix.
///
/// Generated IDs look like `{prefix}{nanoid}`: a four character prefix
/// (`"bld-"`, `"job-"`) plus 19 random characters, which fits the 23 byte
/// inline capacity of `SmolStr`.
///
/// ```ignore
/// define_id! {
///     /// Identifier of a build.
///     pub struct BuildId("bld-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random ID.
            pub fn new() -> Self {
                Self(smol_str::SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
            }

            /// Wrap an existing ID (e.g. one read back from storage).
            pub fn from_string(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Identifier of a build (one pushed commit's set of jobs).
    pub struct BuildId("bld-");
}

crate::define_id! {
    /// Identifier of a single job in a build matrix.
    pub struct JobId("job-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
