//! NewType wrappers for the identifiers that flow through the auth core.
//!
//! These keep a username from being passed where a principal is expected,
//! and a token id from being confused with a message id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

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
    };
}

newtype_string!(
    /// Stable identifier of a user account; the principal a token asserts.
    ///
    /// Encoded as a UUID v4 string both in storage and in the `principal`
    /// claim. Never reused, never changes after the account is created.
    UserId
);

newtype_string!(
    /// Login name chosen at registration. Unique and case-sensitive.
    Username
);

newtype_string!(
    /// Unique identifier of an issued token (the `jti` claim).
    TokenId
);

newtype_string!(
    /// Identifier of a stored message.
    ///
    /// UUID v7, so lexical order follows creation order.
    MessageId
);

impl UserId {
    /// Allocate a fresh random user id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl TokenId {
    /// Allocate a fresh random 128-bit token id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl MessageId {
    /// Allocate a fresh time-ordered message id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}
