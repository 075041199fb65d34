use diesel::prelude::*;

use crate::domain::product::{ImageRef, ImageSlots, ProductImage as DomainProductImage};
use crate::domain::types::{ImageSlot, ImageUrl, LegacyImageUrl, PublicId, TypeConstraintError};

/// Diesel model representing the `product_images` table.
///
/// A `NULL` `public_id` marks a legacy bare-URL entry.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_images)]
#[diesel(belongs_to(crate::models::product::Product))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub slot: i32,
    pub url: String,
    pub public_id: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage {
    pub product_id: i32,
    pub slot: i32,
    pub url: String,
    pub public_id: Option<String>,
}

impl NewProductImage {
    /// One row per occupied slot of `images`.
    pub fn rows_for(product_id: i32, images: &ImageSlots) -> Vec<Self> {
        images
            .iter()
            .map(|(slot, image)| Self {
                product_id,
                slot: i32::from(slot.number()),
                url: image.url().to_owned(),
                public_id: image.public_id().map(|id| id.as_str().to_owned()),
            })
            .collect()
    }
}

impl TryFrom<ProductImage> for (ImageSlot, DomainProductImage) {
    type Error = TypeConstraintError;

    fn try_from(row: ProductImage) -> Result<Self, Self::Error> {
        let slot = u8::try_from(row.slot)
            .map_err(|_| TypeConstraintError::InvalidImageSlot)
            .and_then(ImageSlot::new)?;
        let image = match row.public_id {
            Some(public_id) => DomainProductImage::Hosted(ImageRef {
                url: ImageUrl::new(row.url)?,
                public_id: PublicId::new(public_id)?,
            }),
            // Legacy entries are served as stored, relative paths included.
            None => DomainProductImage::Legacy(LegacyImageUrl::new(row.url)?),
        };
        Ok((slot, image))
    }
}
