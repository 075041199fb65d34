use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::product::Product;
use crate::domain::types::PublicId;

/// Read-only projection of a product for storefront display: images are
/// plain URLs in slot order, whatever their stored form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub sub_category: String,
    pub sizes: Vec<String>,
    pub bestseller: bool,
    pub images: Vec<String>,
    pub created_at: NaiveDateTime,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            images: value
                .images
                .urls()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            name: value.name.into_inner(),
            description: value.description.into_inner(),
            price: value.price.get(),
            category: value.category.into_inner(),
            sub_category: value.sub_category.into_inner(),
            sizes: value.sizes.into_iter().map(String::from).collect(),
            bestseller: value.bestseller,
            created_at: value.created_at,
        }
    }
}

/// A remote image that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDeletion {
    pub public_id: PublicId,
    pub reason: String,
}

/// JSON envelope shared by every product endpoint.
///
/// Always sent with HTTP 200; `success` and `error` carry the outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<P: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<P>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<P>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_deletions: Vec<FailedDeletion>,
}

impl<P: Serialize> ApiResponse<P> {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            product: None,
            products: None,
            failed_deletions: Vec::new(),
        }
    }

    pub fn failure(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error),
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn product(mut self, product: P) -> Self {
        self.product = Some(product);
        self
    }

    pub fn products(mut self, products: Vec<P>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn failed_deletions(mut self, failed: Vec<FailedDeletion>) -> Self {
        self.failed_deletions = failed;
        self
    }
}
