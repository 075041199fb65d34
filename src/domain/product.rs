use chrono::NaiveDateTime;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::domain::types::{
    CategoryName, IMAGE_SLOT_COUNT, ImageSlot, ImageUrl, LegacyImageUrl, ProductDescription,
    ProductId, ProductName, ProductPrice, PublicId, SizeLabel, SubCategoryName,
};

/// Handle to an image hosted by the remote image service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: ImageUrl,
    pub public_id: PublicId,
}

/// A stored product image.
///
/// Older records kept bare URL strings; those are read back as
/// [`ProductImage::Legacy`], passed through as stored and never deleted
/// remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProductImage {
    Hosted(ImageRef),
    Legacy(LegacyImageUrl),
}

impl ProductImage {
    /// Servable URL regardless of representation.
    pub fn url(&self) -> &str {
        match self {
            Self::Hosted(image) => image.url.as_str(),
            Self::Legacy(url) => url.as_str(),
        }
    }

    /// Remote handle, present only for hosted images.
    pub fn public_id(&self) -> Option<&PublicId> {
        match self {
            Self::Hosted(image) => Some(&image.public_id),
            Self::Legacy(_) => None,
        }
    }
}

impl From<ImageRef> for ProductImage {
    fn from(image: ImageRef) -> Self {
        Self::Hosted(image)
    }
}

/// The four positional image slots of a product.
///
/// Serialized as a JSON array in slot order; empty slots before the last
/// occupied one become `null`, trailing empty slots are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSlots([Option<ProductImage>; IMAGE_SLOT_COUNT]);

impl ImageSlots {
    /// Packs images into slots `1..=k` in iteration order. Images beyond the
    /// slot count are ignored.
    pub fn packed<I>(images: I) -> Self
    where
        I: IntoIterator<Item = ProductImage>,
    {
        let mut slots = Self::default();
        for (cell, image) in slots.0.iter_mut().zip(images) {
            *cell = Some(image);
        }
        slots
    }

    pub fn get(&self, slot: ImageSlot) -> Option<&ProductImage> {
        self.0[slot.index()].as_ref()
    }

    /// Puts `image` into `slot`, returning whatever was there before.
    pub fn replace(&mut self, slot: ImageSlot, image: ProductImage) -> Option<ProductImage> {
        self.0[slot.index()].replace(image)
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageSlot, &ProductImage)> {
        ImageSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|image| (slot, image)))
    }

    /// Empties `slot`, returning whatever was there.
    pub fn take(&mut self, slot: ImageSlot) -> Option<ProductImage> {
        self.0[slot.index()].take()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// URLs of occupied slots in slot order.
    pub fn urls(&self) -> Vec<&str> {
        self.iter().map(|(_, image)| image.url()).collect()
    }

    /// Remote handles of hosted images in slot order.
    pub fn public_ids(&self) -> Vec<&PublicId> {
        self.iter()
            .filter_map(|(_, image)| image.public_id())
            .collect()
    }
}

impl Serialize for ImageSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let used = self
            .0
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);
        let mut seq = serializer.serialize_seq(Some(used))?;
        for cell in &self.0[..used] {
            seq.serialize_element(cell)?;
        }
        seq.end()
    }
}

/// Every editable scalar field of a product.
///
/// Create and update both take the full set; there is no partial patch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub category: CategoryName,
    pub sub_category: SubCategoryName,
    pub sizes: Vec<SizeLabel>,
    pub bestseller: bool,
}

/// A catalog product as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub category: CategoryName,
    pub sub_category: SubCategoryName,
    pub sizes: Vec<SizeLabel>,
    pub bestseller: bool,
    pub images: ImageSlots,
    pub created_at: NaiveDateTime,
}

impl Product {
    /// Overwrites every scalar field. `id`, `images` and `created_at` are kept.
    pub fn apply_fields(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.category = fields.category;
        self.sub_category = fields.sub_category;
        self.sizes = fields.sizes;
        self.bestseller = fields.bestseller;
    }
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub fields: ProductFields,
    pub images: ImageSlots,
    pub created_at: NaiveDateTime,
}
