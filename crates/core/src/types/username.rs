//! Login name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too short.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9._-]`.
    #[error("username may only contain letters, digits, '.', '_' and '-'")]
    InvalidCharacter,
}

/// A login name.
///
/// Usernames are case-insensitive; they are normalized to lowercase on
/// parse so that `Juan.Dela` and `juan.dela` name the same account.
///
/// ## Constraints
///
/// - Length: 3-32 characters
/// - ASCII letters, digits, `.`, `_` and `-` only
///
/// ## Examples
///
/// ```
/// use waterline_core::Username;
///
/// assert_eq!(Username::parse("Engr.Santos").unwrap().as_str(), "engr.santos");
/// assert!(Username::parse("ab").is_err());          // too short
/// assert!(Username::parse("has space").is_err());   // invalid character
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 3;

    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a `Username` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, outside the length
    /// bounds, or contains a disallowed character.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_usernames() {
        assert!(Username::parse("admin").is_ok());
        assert!(Username::parse("engr.santos").is_ok());
        assert!(Username::parse("field_crew-2").is_ok());
        assert!(Username::parse("abc").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let name = Username::parse("  Engr.Santos ").unwrap();
        assert_eq!(name.as_str(), "engr.santos");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse("   "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            Username::parse("ab"),
            Err(UsernameError::TooShort { .. })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Username::parse(&"a".repeat(33)),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Username::parse("juan dela"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("juan@cruz"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Username = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(parsed.as_str(), "admin");
        assert!(serde_json::from_str::<Username>("\"a b\"").is_err());
    }
}
