//! Stored enum tokens
//!
//! Enum columns are persisted as plain text tokens. Every domain enum that is read back from the
//! store declares its token table once through [`stored_enum!`]; decoding an unknown token is
//! always a fault. Only callers that use [`StoredEnum::decode_or`] get a default, and only for
//! NULL columns.

use std::fmt;

/// Raised when a stored token does not belong to the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {enum_name} token: '{token}'")]
pub struct EnumDecodeError {
    pub enum_name: &'static str,
    pub token: String,
}

impl EnumDecodeError {
    pub fn new(enum_name: &'static str, token: impl Into<String>) -> Self {
        Self {
            enum_name,
            token: token.into(),
        }
    }
}

/// A closed set of values stored as text tokens.
pub trait StoredEnum: Sized + Copy + 'static {
    /// Name used in decode errors.
    const NAME: &'static str;

    /// Token table, one entry per variant.
    const TOKENS: &'static [(&'static str, Self)];

    fn as_token(&self) -> &'static str;

    fn decode(token: &str) -> Result<Self, EnumDecodeError> {
        Self::TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, v)| *v)
            .ok_or_else(|| {
                tracing::warn!(enum_name = Self::NAME, token, "unknown stored enum token");
                EnumDecodeError::new(Self::NAME, token)
            })
    }

    /// NULL stays absent; a present but unknown token is still a fault.
    fn decode_optional(token: Option<&str>) -> Result<Option<Self>, EnumDecodeError> {
        token.map(Self::decode).transpose()
    }

    /// NULL maps to `default`; a present but unknown token is still a fault.
    fn decode_or(token: Option<&str>, default: Self) -> Result<Self, EnumDecodeError> {
        Ok(Self::decode_optional(token)?.unwrap_or(default))
    }
}

/// Declares an enum together with its stored token table, `Display`, `FromStr` and serde
/// representations that all agree on the same tokens.
#[macro_export]
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $token)] $variant),+
        }

        impl $crate::enums::StoredEnum for $name {
            const NAME: &'static str = stringify!($name);
            const TOKENS: &'static [(&'static str, Self)] = &[$(($token, $name::$variant)),+];

            fn as_token(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad($crate::enums::StoredEnum::as_token(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::enums::EnumDecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as $crate::enums::StoredEnum>::decode(s)
            }
        }
    };
}

/// Formats a token table for diagnostics, e.g. `"a", "b"`.
pub fn describe_tokens<E: StoredEnum>() -> String {
    struct Tokens<E: 'static>(&'static [(&'static str, E)]);

    impl<E> fmt::Display for Tokens<E> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, (token, _)) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "\"{}\"", token)?;
            }
            Ok(())
        }
    }

    Tokens(E::TOKENS).to_string()
}
