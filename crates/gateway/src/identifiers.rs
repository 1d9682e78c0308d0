//! Newtype identifiers and pagination primitives.
//!
//! Every numeric value that arrives from a client is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`PageNumber`] with a [`ResourceId`] even though both are plain
//! integers on the wire.
//!
//! All of these types are positive by construction: the only way to obtain one
//! from client input is [`parse`](ResourceId::parse), which rejects zero,
//! signs, whitespace, fractions, and exponents. Deserializing goes through
//! [`new`](ResourceId::new), so zero is rejected there as well.

use serde::{Deserialize, Serialize};

/// Fixed number of results per search page. Not client-controlled.
pub const PAGE_SIZE: u32 = 20;

/// Returns `true` if `raw` is a non-empty run of ASCII decimal digits.
fn is_decimal(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Macro for positive-integer newtypes.
// Generates: struct (Copy), new() returning Option<Self>, parse(), get(), Display,
// and a TryFrom used by serde so deserialized values are non-zero too.
// ---------------------------------------------------------------------------
macro_rules! positive_id {
    (
        $(#[$attr:meta])*
        $name:ident($inner:ty as $repr:literal)
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = $repr)]
        pub struct $name($inner);

        impl $name {
            /// Creates a new value, returning `None` if `value` is zero.
            pub fn new(value: $inner) -> Option<Self> {
                if value == 0 { None } else { Some(Self(value)) }
            }

            /// Parses client input as a strictly positive decimal integer.
            ///
            /// Returns `None` for anything other than plain digits, for zero,
            /// and for values that overflow the underlying integer type.
            pub fn parse(raw: &str) -> Option<Self> {
                if !is_decimal(raw) {
                    return None;
                }
                raw.parse::<$inner>().ok().and_then(Self::new)
            }

            /// Returns the underlying integer value.
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl TryFrom<$inner> for $name {
            type Error = &'static str;

            fn try_from(value: $inner) -> Result<Self, Self::Error> {
                Self::new(value).ok_or("must be a positive integer")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id! {
    /// A one-based search page number.
    PageNumber(u32 as "u32")
}

positive_id! {
    /// Identifies a single catalog entity within its kind (e.g. character `1699`).
    ///
    /// The catalog assigns these; the gateway only checks they are positive.
    ResourceId(u64 as "u64")
}

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Zero-based upstream offset for this page: `(page - 1) * PAGE_SIZE`.
    ///
    /// Computed in `u64` so the largest representable page cannot overflow.
    pub fn offset(self) -> u64 {
        u64::from(self.0 - 1) * u64::from(PAGE_SIZE)
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

// ---------------------------------------------------------------------------
// Detail keys
// ---------------------------------------------------------------------------

/// The kinds of entity the gateway exposes a detail lookup for.
///
/// Each kind lives under its own fixed namespace prefix in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A comic character.
    Character,
    /// A single comic issue.
    Issue,
}

impl ResourceKind {
    /// Catalog namespace prefix for this kind.
    pub fn namespace_prefix(self) -> u32 {
        match self {
            Self::Character => 4005,
            Self::Issue => 4000,
        }
    }

    /// Path segment naming this kind in catalog URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Issue => "issue",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-qualified catalog key for one entity: kind plus identifier.
///
/// Renders as `<prefix>-<id>`, e.g. `4005-1234` for character `1234`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Which kind of entity this key addresses.
    pub kind: ResourceKind,
    /// Identifier within that kind.
    pub id: ResourceId,
}

impl ResourceKey {
    /// Creates a new [`ResourceKey`].
    pub fn new(kind: ResourceKind, id: ResourceId) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind.namespace_prefix(), self.id)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
