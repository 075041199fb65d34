//! Strongly-typed value objects used by the catalog domain.
//!
//! Products carry these wrappers instead of raw primitives so that ids,
//! labels, prices and image handles are checked once, at the boundary, and
//! trusted everywhere after that.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Number of positional image slots a product exposes (`image1`..`image4`).
pub const IMAGE_SLOT_COUNT: usize = 4;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value was negative, NaN or infinite.
    #[error("{0} must be a finite number, zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Image slot outside `1..=4`.
    #[error("image slot must be between 1 and 4")]
    InvalidImageSlot,
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

fn require_url<S: Into<String>>(value: S, field: &'static str) -> Result<String, TypeConstraintError> {
    let trimmed = trim_and_require_non_empty(value, field)?;
    if trimmed.as_str().validate_url() {
        Ok(trimmed)
    } else {
        Err(TypeConstraintError::InvalidUrl(field))
    }
}

/// Generates a positive `i32` identifier newtype.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Generates a string newtype whose constructor runs `$check(value, $field)`.
macro_rules! string_newtype {
    ($name:ident, $doc:expr, $field:expr, $check:path) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Trims the input and checks it before wrapping.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                $check(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

id_newtype!(ProductId, "Store-assigned identifier of a product.", "product_id");

string_newtype!(
    ProductName,
    "Product display name enforcing non-empty values.",
    "name",
    trim_and_require_non_empty
);
string_newtype!(
    ProductDescription,
    "Product description enforcing non-empty values.",
    "description",
    trim_and_require_non_empty
);
string_newtype!(
    CategoryName,
    "Top-level category label (e.g. `Men`).",
    "category",
    trim_and_require_non_empty
);
string_newtype!(
    SubCategoryName,
    "Second-level category label (e.g. `Topwear`).",
    "subCategory",
    trim_and_require_non_empty
);
string_newtype!(
    SizeLabel,
    "A size the product is offered in (e.g. `M`, `XL`).",
    "size",
    trim_and_require_non_empty
);
string_newtype!(
    PublicId,
    "Remote image service handle used to delete a hosted image.",
    "public_id",
    trim_and_require_non_empty
);
string_newtype!(ImageUrl, "Externally servable image URL.", "image url", require_url);
string_newtype!(
    LegacyImageUrl,
    "Image location kept verbatim from older records; may be relative.",
    "legacy image url",
    trim_and_require_non_empty
);

/// Non-negative price value in standard currency units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct ProductPrice(f64);

impl ProductPrice {
    /// Constructs a finite price that is zero or greater.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("price"))
        }
    }

    /// Returns the raw `f64` value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Display for ProductPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<f64> for ProductPrice {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

/// One of the four positional image slots, numbered `1..=4` like the
/// `image1`..`image4` upload fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageSlot(u8);

impl ImageSlot {
    /// Slots in ascending order.
    pub const ALL: [ImageSlot; IMAGE_SLOT_COUNT] =
        [ImageSlot(1), ImageSlot(2), ImageSlot(3), ImageSlot(4)];

    /// Builds a slot from its 1-based number.
    pub fn new(number: u8) -> Result<Self, TypeConstraintError> {
        if (1..=IMAGE_SLOT_COUNT as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(TypeConstraintError::InvalidImageSlot)
        }
    }

    /// 1-based slot number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// 0-based position inside the slot array.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl Display for ImageSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "image{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_names() {
        let value = ProductName::new("  Cotton tee  ").unwrap();
        assert_eq!(value.as_str(), "Cotton tee");
    }

    #[test]
    fn rejects_blank_labels() {
        assert_eq!(
            SubCategoryName::new("   ").unwrap_err(),
            TypeConstraintError::EmptyString("subCategory")
        );
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ProductId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("product_id"));
    }

    #[test]
    fn validates_image_urls() {
        assert!(ImageUrl::new("https://res.cloudinary.com/demo/image/upload/a.jpg").is_ok());
        let err = ImageUrl::new("not-a-url").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("image url"));
    }

    #[test]
    fn legacy_image_urls_only_need_text() {
        let value = LegacyImageUrl::new("/uploads/a.png").unwrap();
        assert_eq!(value.as_str(), "/uploads/a.png");
        assert!(LegacyImageUrl::new(" ").is_err());
    }

    #[test]
    fn product_price_allows_zero() {
        assert_eq!(ProductPrice::new(0.0).unwrap().get(), 0.0);
    }

    #[test]
    fn product_price_rejects_negative_and_nan() {
        assert_eq!(
            ProductPrice::new(-0.01).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
        assert!(ProductPrice::new(f64::NAN).is_err());
    }

    #[test]
    fn image_slots_map_between_number_and_index() {
        let slot = ImageSlot::new(2).unwrap();
        assert_eq!(slot.index(), 1);
        assert_eq!(slot.to_string(), "image2");
        assert_eq!(ImageSlot::new(0), Err(TypeConstraintError::InvalidImageSlot));
        assert_eq!(ImageSlot::new(5), Err(TypeConstraintError::InvalidImageSlot));
    }
}
