//! Newtype IDs for type-safe entity references.
//!
//! Every persisted entity is keyed by a string of the form
//! `<unix-millis>-<9 random base-36 chars>`. Use the `define_id!` macro to
//! create wrappers that prevent accidentally mixing IDs from different
//! entity types.

use chrono::Utc;
use rand::Rng;

/// Number of random base-36 characters appended to generated ids.
const ID_SUFFIX_LEN: usize = 9;

/// Prefix of every customer-facing order number.
pub const ORDER_NUMBER_PREFIX: &str = "DDF";

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `generate()` for fresh timestamp + random suffix ids
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use ddf_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("1717171717171-abc123xyz");
/// let order_id = OrderId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// # let _ = (user_id, order_id);
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
            /// Wrap an existing id value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh id from the current time and a random suffix.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::types::id::generate_raw_id())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
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

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(CartId);
define_id!(OrderId);
define_id!(OrderNumber);

impl OrderNumber {
    /// Generate a customer-facing order number.
    ///
    /// Format: `DDF` + last 8 digits of the unix-millis timestamp + 4 random
    /// upper-case base-36 characters (e.g. `DDF53129411K7QZ`).
    #[must_use]
    pub fn generate_for_order() -> Self {
        let millis = Utc::now().timestamp_millis().rem_euclid(100_000_000);
        let suffix = random_base36(4).to_uppercase();
        Self(format!("{ORDER_NUMBER_PREFIX}{millis:08}{suffix}"))
    }
}

/// Build a raw `<unix-millis>-<suffix>` id string.
#[doc(hidden)]
#[must_use]
pub fn generate_raw_id() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        random_base36(ID_SUFFIX_LEN)
    )
}

/// Produce `len` random lower-case base-36 characters.
fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..36u32), 36).unwrap_or('0'))
        .collect()
}
