use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    ImageSlots, NewProduct as DomainNewProduct, Product as DomainProduct,
    ProductFields, ProductImage as DomainProductImage,
};
use crate::domain::types::{
    CategoryName, ImageSlot, ProductDescription, ProductName, ProductPrice, SizeLabel,
    SubCategoryName, TypeConstraintError,
};
use crate::models::product_image::ProductImage;

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sub_category: String,
    /// JSON array of size labels.
    pub sizes: String,
    pub bestseller: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sub_category: String,
    pub sizes: String,
    pub bestseller: bool,
    pub created_at: NaiveDateTime,
}

/// Full overwrite of the editable columns. `created_at` is never touched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sub_category: String,
    pub sizes: String,
    pub bestseller: bool,
}

fn encode_sizes(sizes: &[SizeLabel]) -> String {
    serde_json::Value::from(
        sizes
            .iter()
            .map(|size| size.as_str().to_owned())
            .collect::<Vec<_>>(),
    )
    .to_string()
}

fn decode_sizes(raw: &str) -> Result<Vec<SizeLabel>, TypeConstraintError> {
    let labels: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| TypeConstraintError::InvalidValue(format!("stored sizes: {e}")))?;
    labels.into_iter().map(SizeLabel::new).collect()
}

impl TryFrom<(Product, Vec<ProductImage>)> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from((product, images): (Product, Vec<ProductImage>)) -> Result<Self, Self::Error> {
        let mut slots = ImageSlots::default();
        for image in images {
            let (slot, image): (ImageSlot, DomainProductImage) = image.try_into()?;
            slots.replace(slot, image);
        }

        Ok(Self {
            id: product.id.try_into()?,
            name: ProductName::new(product.name)?,
            description: ProductDescription::new(product.description)?,
            price: ProductPrice::new(product.price)?,
            category: CategoryName::new(product.category)?,
            sub_category: SubCategoryName::new(product.sub_category)?,
            sizes: decode_sizes(&product.sizes)?,
            bestseller: product.bestseller,
            images: slots,
            created_at: product.created_at,
        })
    }
}

impl From<&ProductFields> for ProductChanges {
    fn from(fields: &ProductFields) -> Self {
        Self {
            name: fields.name.as_str().to_owned(),
            description: fields.description.as_str().to_owned(),
            price: fields.price.get(),
            category: fields.category.as_str().to_owned(),
            sub_category: fields.sub_category.as_str().to_owned(),
            sizes: encode_sizes(&fields.sizes),
            bestseller: fields.bestseller,
        }
    }
}

impl From<&DomainProduct> for ProductChanges {
    fn from(product: &DomainProduct) -> Self {
        Self {
            name: product.name.as_str().to_owned(),
            description: product.description.as_str().to_owned(),
            price: product.price.get(),
            category: product.category.as_str().to_owned(),
            sub_category: product.sub_category.as_str().to_owned(),
            sizes: encode_sizes(&product.sizes),
            bestseller: product.bestseller,
        }
    }
}

impl From<&DomainNewProduct> for NewProduct {
    fn from(product: &DomainNewProduct) -> Self {
        let changes = ProductChanges::from(&product.fields);
        Self {
            name: changes.name,
            description: changes.description,
            price: changes.price,
            category: changes.category,
            sub_category: changes.sub_category,
            sizes: changes.sizes,
            bestseller: changes.bestseller,
            created_at: product.created_at,
        }
    }
}
