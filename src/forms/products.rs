//! Input forms for the product endpoints.
//!
//! The admin panel posts every field as text (`price` as a decimal string,
//! `sizes` as JSON, `bestseller` as `"true"`/`"false"`). The conversions here
//! turn that bag into typed payloads and reject anything malformed before the
//! synchronizer runs, so a bad request never touches the store or the image
//! host.

use std::path::PathBuf;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::ProductFields;
use crate::domain::types::{
    CategoryName, ImageSlot, ProductDescription, ProductName, ProductPrice, SizeLabel,
    SubCategoryName, TypeConstraintError,
};

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price must be a number, got {0:?}")]
    InvalidPrice(String),
    #[error("sizes must be a JSON array of strings: {0}")]
    InvalidSizes(String),
    #[error("bestseller must be \"true\" or \"false\", got {0:?}")]
    InvalidBestseller(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// How a missing or blank `sizes` field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSizes {
    Reject,
    Empty,
}

/// Scalar product fields as they arrive, before parsing.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductFieldsInput {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub price: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 100))]
    pub sub_category: Option<String>,
    pub sizes: Option<String>,
    pub bestseller: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ProductFormError> {
    value.ok_or(ProductFormError::MissingField(field))
}

/// Parses a decimal price such as `"19.99"`.
pub fn parse_price(raw: &str) -> Result<ProductPrice, ProductFormError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ProductFormError::InvalidPrice(raw.to_string()))?;
    Ok(ProductPrice::new(value)?)
}

/// Parses a JSON array of size labels, keeping first occurrences only.
pub fn parse_sizes(raw: &str) -> Result<Vec<SizeLabel>, ProductFormError> {
    let labels: Vec<String> =
        serde_json::from_str(raw).map_err(|e| ProductFormError::InvalidSizes(e.to_string()))?;

    let mut sizes: Vec<SizeLabel> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = SizeLabel::new(label)?;
        if !sizes.contains(&label) {
            sizes.push(label);
        }
    }
    Ok(sizes)
}

/// Only the exact text `"true"` sets the flag; `"false"`, blank or absent
/// clear it.
pub fn parse_bestseller(raw: Option<&str>) -> Result<bool, ProductFormError> {
    match raw {
        Some("true") => Ok(true),
        Some("false") | Some("") | None => Ok(false),
        Some(other) => Err(ProductFormError::InvalidBestseller(other.to_string())),
    }
}

impl ProductFieldsInput {
    pub fn into_fields(self, missing_sizes: MissingSizes) -> Result<ProductFields, ProductFormError> {
        self.validate()?;

        let sizes = match (self.sizes, missing_sizes) {
            (Some(raw), MissingSizes::Empty) if raw.trim().is_empty() => Vec::new(),
            (Some(raw), _) => parse_sizes(&raw)?,
            (None, MissingSizes::Empty) => Vec::new(),
            (None, MissingSizes::Reject) => return Err(ProductFormError::MissingField("sizes")),
        };

        Ok(ProductFields {
            name: ProductName::new(required(self.name, "name")?)?,
            description: ProductDescription::new(required(self.description, "description")?)?,
            price: parse_price(&required(self.price, "price")?)?,
            category: CategoryName::new(required(self.category, "category")?)?,
            sub_category: SubCategoryName::new(required(self.sub_category, "subCategory")?)?,
            sizes,
            bestseller: parse_bestseller(self.bestseller.as_deref())?,
        })
    }
}

/// A file waiting to be pushed to the image host for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub slot: ImageSlot,
    pub path: PathBuf,
}

fn text(field: &Option<Text<String>>) -> Option<String> {
    field.as_ref().map(|t| t.0.clone())
}

/// Non-empty files in slot order. Browsers post an empty part for an
/// untouched file input; those count as absent.
fn pending_images(files: [&Option<TempFile>; 4]) -> Vec<PendingImage> {
    ImageSlot::ALL
        .into_iter()
        .zip(files)
        .filter_map(|(slot, file)| {
            file.as_ref()
                .filter(|f| f.size > 0)
                .map(|f| PendingImage {
                    slot,
                    path: f.file.path().to_path_buf(),
                })
        })
        .collect()
}

#[derive(MultipartForm)]
pub struct AddProductForm {
    pub name: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub price: Option<Text<String>>,
    pub category: Option<Text<String>>,
    #[multipart(rename = "subCategory")]
    pub sub_category: Option<Text<String>>,
    pub sizes: Option<Text<String>>,
    pub bestseller: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub image1: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image2: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image3: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image4: Option<TempFile>,
}

impl AddProductForm {
    fn fields_input(&self) -> ProductFieldsInput {
        ProductFieldsInput {
            name: text(&self.name),
            description: text(&self.description),
            price: text(&self.price),
            category: text(&self.category),
            sub_category: text(&self.sub_category),
            sizes: text(&self.sizes),
            bestseller: text(&self.bestseller),
        }
    }
}

/// Validated input for creating a product.
///
/// Paths point into the multipart temp files, so the originating form must
/// outlive the payload's use.
#[derive(Debug, Clone, PartialEq)]
pub struct AddProductFormPayload {
    pub fields: ProductFields,
    pub images: Vec<PendingImage>,
}

impl TryFrom<&AddProductForm> for AddProductFormPayload {
    type Error = ProductFormError;

    fn try_from(form: &AddProductForm) -> Result<Self, Self::Error> {
        Ok(Self {
            fields: form.fields_input().into_fields(MissingSizes::Reject)?,
            images: pending_images([&form.image1, &form.image2, &form.image3, &form.image4]),
        })
    }
}

#[derive(MultipartForm)]
pub struct UpdateProductForm {
    pub id: Option<Text<String>>,
    pub name: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub price: Option<Text<String>>,
    pub category: Option<Text<String>>,
    #[multipart(rename = "subCategory")]
    pub sub_category: Option<Text<String>>,
    pub sizes: Option<Text<String>>,
    pub bestseller: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub image1: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image2: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image3: Option<TempFile>,
    #[multipart(limit = "10MB")]
    pub image4: Option<TempFile>,
}

impl UpdateProductForm {
    fn fields_input(&self) -> ProductFieldsInput {
        ProductFieldsInput {
            name: text(&self.name),
            description: text(&self.description),
            price: text(&self.price),
            category: text(&self.category),
            sub_category: text(&self.sub_category),
            sizes: text(&self.sizes),
            bestseller: text(&self.bestseller),
        }
    }
}

/// Validated input for a full-overwrite product update.
///
/// Every scalar field is required; a missing or blank `sizes` clears the
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProductFormPayload {
    /// Raw id as posted; resolved by the service. A missing id is `0` and
    /// names no product.
    pub product_id: i32,
    pub fields: ProductFields,
    pub images: Vec<PendingImage>,
}

impl TryFrom<&UpdateProductForm> for UpdateProductFormPayload {
    type Error = ProductFormError;

    fn try_from(form: &UpdateProductForm) -> Result<Self, Self::Error> {
        let id = text(&form.id).unwrap_or_default();
        Ok(Self {
            product_id: ProductIdInput::Text(id).value(),
            fields: form.fields_input().into_fields(MissingSizes::Empty)?,
            images: pending_images([&form.image1, &form.image2, &form.image3, &form.image4]),
        })
    }
}

/// A product id posted either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ProductIdInput {
    Number(i64),
    Text(String),
}

impl ProductIdInput {
    /// The id as the store's integer key. Anything unparseable maps to `0`,
    /// which never names a product.
    pub fn value(&self) -> i32 {
        match self {
            Self::Number(n) => i32::try_from(*n).unwrap_or(0),
            Self::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

/// Body of `POST /remove`.
#[derive(Debug, Deserialize)]
pub struct RemoveProductForm {
    pub id: ProductIdInput,
}

/// Body of `POST /single`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleProductForm {
    pub product_id: ProductIdInput,
}
