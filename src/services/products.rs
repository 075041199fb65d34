//! Product-image synchronization.
//!
//! Keeps a product's stored image slots consistent with the remote image
//! host across create, update and remove. Remote calls are issued one at a
//! time, slot by slot; nothing spans the store and the host transactionally,
//! so each operation cleans up after itself on failure and reports remote
//! deletions that did not go through.

use chrono::Utc;

use crate::domain::product::{ImageSlots, NewProduct, Product, ProductImage};
use crate::domain::types::{ProductId, PublicId};
use crate::dto::products::{FailedDeletion, ProductDto};
use crate::forms::products::{AddProductFormPayload, PendingImage, UpdateProductFormPayload};
use crate::repository::{ProductReader, ProductWriter};
use crate::storage::ImageStorage;

use super::{ServiceError, ServiceResult};

/// Outcome of a remove: the product is gone, but some remote images may
/// have survived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalReport {
    pub failed_deletions: Vec<FailedDeletion>,
}

/// Outcome of an update: the persisted product and any replaced remote
/// images that could not be deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub product: Product,
    pub failed_deletions: Vec<FailedDeletion>,
}

/// Destroys each image in turn, collecting the ones that failed.
async fn destroy_all<'a, S, I>(storage: &S, public_ids: I) -> Vec<FailedDeletion>
where
    S: ImageStorage + ?Sized,
    I: IntoIterator<Item = &'a PublicId>,
{
    let mut failed = Vec::new();
    for public_id in public_ids {
        if let Err(e) = storage.destroy(public_id).await {
            log::warn!(public_id = public_id.as_str(); "Failed to delete remote image: {e}");
            failed.push(FailedDeletion {
                public_id: public_id.clone(),
                reason: e.to_string(),
            });
        }
    }
    failed
}

/// Compensating cleanup for images uploaded by a call that then failed.
async fn discard_uploads<'a, S, I>(storage: &S, public_ids: I)
where
    S: ImageStorage + ?Sized,
    I: IntoIterator<Item = &'a PublicId>,
{
    let leaked = destroy_all(storage, public_ids).await;
    if !leaked.is_empty() {
        log::error!(count = leaked.len(); "Uploaded images left orphaned after a failed operation");
    }
}

fn load_product<R>(product_id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!(product_id = product_id.get(); "Failed to get product: {e}");
            Err(e.into())
        }
    }
}

/// Creates a product, uploading its images first.
///
/// Present files are uploaded in slot order and packed into slots `1..=k`
/// in upload order, so a product posted with `image2` and `image4` ends up
/// with images in slots 1 and 2. If an upload or the insert fails, the
/// images this call already uploaded are deleted again.
pub async fn add_product<R, S>(
    payload: AddProductFormPayload,
    repo: &R,
    storage: &S,
) -> ServiceResult<Product>
where
    R: ProductWriter,
    S: ImageStorage + ?Sized,
{
    let mut uploaded = Vec::with_capacity(payload.images.len());
    for pending in &payload.images {
        match storage.upload(&pending.path).await {
            Ok(image) => uploaded.push(image),
            Err(e) => {
                log::error!(slot = pending.slot.number(); "Failed to upload product image: {e}");
                discard_uploads(storage, uploaded.iter().map(|image| &image.public_id)).await;
                return Err(e.into());
            }
        }
    }

    let new_product = NewProduct {
        fields: payload.fields,
        images: ImageSlots::packed(uploaded.iter().cloned().map(ProductImage::from)),
        created_at: Utc::now().naive_utc(),
    };

    match repo.create_product(&new_product) {
        Ok(product) => {
            log::info!(
                product_id = product.id.get(), images = product.images.len();
                "Product added"
            );
            Ok(product)
        }
        Err(e) => {
            log::error!("Failed to create product: {e}");
            discard_uploads(storage, uploaded.iter().map(|image| &image.public_id)).await;
            Err(e.into())
        }
    }
}

/// Lists every product with images projected to plain URLs.
pub fn list_products<R>(repo: &R) -> ServiceResult<Vec<ProductDto>>
where
    R: ProductReader,
{
    match repo.list_products() {
        Ok(products) => Ok(products.into_iter().map(ProductDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(e.into())
        }
    }
}

/// Fetches the stored product, image handles included, for admin edits.
pub fn get_product<R>(product_id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    load_product(product_id, repo)
}

/// Fetches a product projected for display.
pub fn get_client_product<R>(product_id: i32, repo: &R) -> ServiceResult<ProductDto>
where
    R: ProductReader,
{
    load_product(product_id, repo).map(ProductDto::from)
}

/// Removes a product and its hosted images.
///
/// Remote deletions run before the row is deleted. A failed deletion does
/// not stop the removal; it is reported in the returned [`RemovalReport`].
pub async fn remove_product<R, S>(
    product_id: i32,
    repo: &R,
    storage: &S,
) -> ServiceResult<RemovalReport>
where
    R: ProductReader + ProductWriter,
    S: ImageStorage + ?Sized,
{
    let product = load_product(product_id, repo)?;

    let failed_deletions = destroy_all(storage, product.images.public_ids()).await;

    match repo.delete_product(product.id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!(
                product_id = product.id.get(), failed_deletions = failed_deletions.len();
                "Product removed"
            );
            Ok(RemovalReport { failed_deletions })
        }
        Err(e) => {
            log::error!(product_id = product.id.get(); "Failed to delete product: {e}");
            Err(e.into())
        }
    }
}

/// Persists the image slots resolved before an update was cut short, so the
/// stored row never names a remote image that is already gone.
///
/// Scalar fields keep their stored values. If the row cannot be written, the
/// new uploads are discarded instead.
async fn keep_resolved_images<R, S>(
    product: &Product,
    images: ImageSlots,
    uploaded: &[PublicId],
    repo: &R,
    storage: &S,
) where
    R: ProductWriter,
    S: ImageStorage + ?Sized,
{
    if images == product.images {
        return;
    }

    let mut partial = product.clone();
    partial.images = images;

    match repo.update_product(&partial) {
        Ok(0) => discard_uploads(storage, uploaded).await,
        Ok(_) => {
            log::warn!(
                product_id = product.id.get(), kept = uploaded.len();
                "Kept image slots resolved before a failed update"
            );
        }
        Err(e) => {
            log::error!(product_id = product.id.get(); "Failed to save resolved image slots: {e}");
            discard_uploads(storage, uploaded).await;
        }
    }
}

/// Replaces the product's scalar fields and any re-uploaded image slots.
///
/// Slots are resolved one after another: the old hosted image in a slot is
/// deleted, then the new file is uploaded into that same slot. Slots
/// without a new file keep their image. Every scalar field is overwritten.
///
/// When an upload fails, the slots resolved so far are still saved and a
/// slot whose old image was already deleted is left empty; the scalar
/// fields are not touched.
pub async fn update_product<R, S>(
    payload: UpdateProductFormPayload,
    repo: &R,
    storage: &S,
) -> ServiceResult<UpdateReport>
where
    R: ProductReader + ProductWriter,
    S: ImageStorage + ?Sized,
{
    let mut product = load_product(payload.product_id, repo)?;

    let mut pending: Vec<&PendingImage> = payload.images.iter().collect();
    pending.sort_by_key(|image| image.slot);

    let mut images = product.images.clone();
    let mut uploaded: Vec<PublicId> = Vec::with_capacity(pending.len());
    let mut failed_deletions = Vec::new();

    for image in pending {
        let previous = images
            .get(image.slot)
            .and_then(ProductImage::public_id)
            .cloned();
        let mut previous_gone = false;
        if let Some(previous) = previous {
            let failed = destroy_all(storage, [&previous]).await;
            previous_gone = failed.is_empty();
            failed_deletions.extend(failed);
        }

        match storage.upload(&image.path).await {
            Ok(new_image) => {
                uploaded.push(new_image.public_id.clone());
                images.replace(image.slot, new_image.into());
            }
            Err(e) => {
                log::error!(
                    product_id = product.id.get(), slot = image.slot.number();
                    "Failed to upload replacement image: {e}"
                );
                if previous_gone {
                    images.take(image.slot);
                }
                keep_resolved_images(&product, images, &uploaded, repo, storage).await;
                return Err(e.into());
            }
        }
    }

    product.apply_fields(payload.fields);
    product.images = images;

    match repo.update_product(&product) {
        Ok(0) => {
            discard_uploads(storage, &uploaded).await;
            Err(ServiceError::NotFound)
        }
        Ok(_) => {
            log::info!(
                product_id = product.id.get(), replaced = uploaded.len();
                "Product updated"
            );
            Ok(UpdateReport {
                product,
                failed_deletions,
            })
        }
        Err(e) => {
            log::error!(product_id = product.id.get(); "Failed to update product: {e}");
            discard_uploads(storage, &uploaded).await;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::product::{ImageRef, ProductFields};
    use crate::domain::types::{
        CategoryName, ImageSlot, ImageUrl, LegacyImageUrl, ProductDescription, ProductName,
        ProductPrice, SizeLabel, SubCategoryName,
    };
    use crate::forms::products::UpdateProductForm;
    use crate::repository::test::TestRepository;
    use crate::storage::test::{RecordingStorage, StorageCall};
    use actix_multipart::form::text::Text;
    use chrono::DateTime;

    fn fields(name: &str) -> ProductFields {
        ProductFields {
            name: ProductName::new(name).unwrap(),
            description: ProductDescription::new("Soft cotton").unwrap(),
            price: ProductPrice::new(25.0).unwrap(),
            category: CategoryName::new("Men").unwrap(),
            sub_category: SubCategoryName::new("Topwear").unwrap(),
            sizes: vec![SizeLabel::new("M").unwrap(), SizeLabel::new("L").unwrap()],
            bestseller: false,
        }
    }

    fn slot(n: u8) -> ImageSlot {
        ImageSlot::new(n).unwrap()
    }

    fn pending(n: u8, file: &str) -> PendingImage {
        PendingImage {
            slot: slot(n),
            path: PathBuf::from(format!("/tmp/uploads/{file}")),
        }
    }

    fn hosted(id: &str) -> ProductImage {
        ProductImage::Hosted(ImageRef {
            url: ImageUrl::new(format!("https://cdn.test/{id}.jpg")).unwrap(),
            public_id: PublicId::new(id).unwrap(),
        })
    }

    fn legacy(url: &str) -> ProductImage {
        ProductImage::Legacy(LegacyImageUrl::new(url).unwrap())
    }

    fn stored(id: i32, images: Vec<ProductImage>) -> Product {
        let fields = fields("Stored tee");
        Product {
            id: ProductId::new(id).unwrap(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            sub_category: fields.sub_category,
            sizes: fields.sizes,
            bestseller: true,
            images: ImageSlots::packed(images),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc(),
        }
    }

    fn four_hosted() -> Product {
        stored(1, vec![hosted("old-1"), hosted("old-2"), hosted("old-3"), hosted("old-4")])
    }

    fn update(product_id: i32, images: Vec<PendingImage>) -> UpdateProductFormPayload {
        UpdateProductFormPayload {
            product_id,
            fields: fields("Renamed tee"),
            images,
        }
    }

    fn public_id_at(product: &Product, n: u8) -> Option<String> {
        product
            .images
            .get(slot(n))
            .and_then(ProductImage::public_id)
            .map(|id| id.as_str().to_string())
    }

    #[actix_web::test]
    async fn create_packs_uploads_in_issue_order() {
        let repo = TestRepository::default();
        let storage = RecordingStorage::new();
        let payload = AddProductFormPayload {
            fields: fields("Cotton tee"),
            images: vec![pending(2, "b.jpg"), pending(4, "d.jpg")],
        };

        let product = add_product(payload, &repo, &storage).await.unwrap();

        assert_eq!(product.images.len(), 2);
        assert_eq!(public_id_at(&product, 1).as_deref(), Some("unistyle/products/img-1"));
        assert_eq!(public_id_at(&product, 2).as_deref(), Some("unistyle/products/img-2"));
        assert!(product.images.get(slot(4)).is_none());
        assert_eq!(
            storage.uploads(),
            vec![
                PathBuf::from("/tmp/uploads/b.jpg"),
                PathBuf::from("/tmp/uploads/d.jpg")
            ]
        );
        assert_eq!(repo.snapshot(), vec![product]);
    }

    #[actix_web::test]
    async fn create_handles_zero_and_four_images() {
        let repo = TestRepository::default();
        let storage = RecordingStorage::new();

        let bare = AddProductFormPayload {
            fields: fields("No pictures"),
            images: vec![],
        };
        let product = add_product(bare, &repo, &storage).await.unwrap();
        assert!(product.images.is_empty());
        assert!(storage.calls().is_empty());

        let full = AddProductFormPayload {
            fields: fields("All pictures"),
            images: (1..=4).map(|n| pending(n, &format!("{n}.jpg"))).collect(),
        };
        let product = add_product(full, &repo, &storage).await.unwrap();
        assert_eq!(product.images.len(), 4);
        assert_eq!(product.images.public_ids().len(), 4);
    }

    #[actix_web::test]
    async fn create_cleans_up_when_an_upload_fails() {
        let repo = TestRepository::default();
        let storage = RecordingStorage::new();
        storage.fail_upload_of("/tmp/uploads/c.jpg");
        let payload = AddProductFormPayload {
            fields: fields("Cotton tee"),
            images: vec![pending(1, "a.jpg"), pending(3, "c.jpg"), pending(4, "d.jpg")],
        };

        let err = add_product(payload, &repo, &storage).await.unwrap_err();

        assert!(matches!(err, ServiceError::Upstream(_)));
        assert_eq!(storage.uploads().len(), 2);
        assert_eq!(storage.destroyed(), vec!["unistyle/products/img-1".to_string()]);
        assert!(storage.live().is_empty());
        assert!(repo.snapshot().is_empty());
    }

    #[actix_web::test]
    async fn create_cleans_up_when_persistence_fails() {
        let repo = TestRepository::default();
        repo.fail_writes();
        let storage = RecordingStorage::new();
        let payload = AddProductFormPayload {
            fields: fields("Cotton tee"),
            images: vec![pending(1, "a.jpg"), pending(2, "b.jpg")],
        };

        let err = add_product(payload, &repo, &storage).await.unwrap_err();

        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(storage.destroyed().len(), 2);
        assert!(storage.live().is_empty());
    }

    #[test]
    fn list_projects_images_to_urls() {
        let repo = TestRepository::new(vec![
            stored(1, vec![legacy("https://old.example.com/1.png"), hosted("abc")]),
            stored(2, vec![]),
        ]);

        let products = list_products(&repo).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0].images,
            vec![
                "https://old.example.com/1.png".to_string(),
                "https://cdn.test/abc.jpg".to_string()
            ]
        );
        assert!(products[1].images.is_empty());
    }

    #[test]
    fn single_product_variants_differ_only_in_image_form() {
        let repo = TestRepository::new(vec![stored(
            5,
            vec![legacy("https://old.example.com/1.png"), hosted("abc")],
        )]);

        let raw = get_product(5, &repo).unwrap();
        assert_eq!(public_id_at(&raw, 2).as_deref(), Some("abc"));

        let client = get_client_product(5, &repo).unwrap();
        assert_eq!(client.id, 5);
        assert_eq!(client.images[1], "https://cdn.test/abc.jpg");
    }

    #[test]
    fn single_product_reports_not_found() {
        let repo = TestRepository::new(vec![stored(5, vec![])]);

        assert_eq!(get_product(6, &repo), Err(ServiceError::NotFound));
        assert_eq!(get_client_product(0, &repo), Err(ServiceError::NotFound));
        assert_eq!(get_client_product(-3, &repo), Err(ServiceError::NotFound));
    }

    #[actix_web::test]
    async fn remove_destroys_each_hosted_image_then_deletes() {
        let repo = TestRepository::new(vec![stored(
            1,
            vec![hosted("a"), legacy("https://old.example.com/1.png"), hosted("b")],
        )]);
        let storage = RecordingStorage::with_live(["a", "b"]);

        let report = remove_product(1, &repo, &storage).await.unwrap();

        assert!(report.failed_deletions.is_empty());
        assert_eq!(storage.destroyed(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(get_product(1, &repo), Err(ServiceError::NotFound));
    }

    #[actix_web::test]
    async fn remove_missing_product_touches_nothing() {
        let repo = TestRepository::new(vec![stored(1, vec![hosted("a")])]);
        let storage = RecordingStorage::with_live(["a"]);

        let err = remove_product(2, &repo, &storage).await.unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
        assert!(storage.calls().is_empty());
        assert_eq!(repo.snapshot().len(), 1);
    }

    #[actix_web::test]
    async fn remove_reports_failed_deletions() {
        let repo = TestRepository::new(vec![stored(1, vec![hosted("a"), hosted("b")])]);
        let storage = RecordingStorage::with_live(["a", "b"]);
        storage.fail_destroy_of("a");

        let report = remove_product(1, &repo, &storage).await.unwrap();

        assert_eq!(report.failed_deletions.len(), 1);
        assert_eq!(report.failed_deletions[0].public_id, "a");
        assert_eq!(storage.destroyed().len(), 2);
        assert!(repo.snapshot().is_empty());
    }

    #[actix_web::test]
    async fn update_replaces_only_the_addressed_slot() {
        let before = four_hosted();
        let repo = TestRepository::new(vec![before.clone()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);

        let report = update_product(update(1, vec![pending(2, "new.jpg")]), &repo, &storage)
            .await
            .unwrap();

        let after = &report.product;
        assert_eq!(public_id_at(after, 2).as_deref(), Some("unistyle/products/img-1"));
        for n in [1, 3, 4] {
            assert_eq!(after.images.get(slot(n)), before.images.get(slot(n)));
        }
        assert_eq!(
            storage.calls(),
            vec![
                StorageCall::Destroy("old-2".into()),
                StorageCall::Upload(PathBuf::from("/tmp/uploads/new.jpg")),
            ]
        );
        assert_eq!(after.name, "Renamed tee");
        assert!(!after.bestseller);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(repo.snapshot(), vec![report.product.clone()]);
    }

    #[actix_web::test]
    async fn update_fills_an_empty_slot_without_deleting() {
        let repo = TestRepository::new(vec![stored(1, vec![hosted("old-1")])]);
        let storage = RecordingStorage::with_live(["old-1"]);

        let report = update_product(update(1, vec![pending(3, "c.jpg")]), &repo, &storage)
            .await
            .unwrap();

        assert!(storage.destroyed().is_empty());
        assert_eq!(public_id_at(&report.product, 1).as_deref(), Some("old-1"));
        assert!(report.product.images.get(slot(2)).is_none());
        assert_eq!(
            public_id_at(&report.product, 3).as_deref(),
            Some("unistyle/products/img-1")
        );
    }

    #[actix_web::test]
    async fn update_over_a_legacy_image_skips_deletion() {
        let repo = TestRepository::new(vec![stored(
            1,
            vec![legacy("https://old.example.com/1.png")],
        )]);
        let storage = RecordingStorage::new();

        let report = update_product(update(1, vec![pending(1, "a.jpg")]), &repo, &storage)
            .await
            .unwrap();

        assert!(storage.destroyed().is_empty());
        assert!(public_id_at(&report.product, 1).is_some());
    }

    #[actix_web::test]
    async fn sequential_updates_never_destroy_the_same_id_twice() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);

        update_product(update(1, vec![pending(1, "first.jpg")]), &repo, &storage)
            .await
            .unwrap();
        let report = update_product(
            update(1, vec![pending(1, "second.jpg"), pending(2, "other.jpg")]),
            &repo,
            &storage,
        )
        .await
        .unwrap();

        let destroyed = storage.destroyed();
        assert_eq!(
            destroyed,
            vec![
                "old-1".to_string(),
                "unistyle/products/img-1".to_string(),
                "old-2".to_string()
            ]
        );
        assert!(report.failed_deletions.is_empty());
    }

    #[actix_web::test]
    async fn update_resolves_slots_in_order() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);

        update_product(
            update(1, vec![pending(4, "d.jpg"), pending(1, "a.jpg")]),
            &repo,
            &storage,
        )
        .await
        .unwrap();

        assert_eq!(
            storage.calls(),
            vec![
                StorageCall::Destroy("old-1".into()),
                StorageCall::Upload(PathBuf::from("/tmp/uploads/a.jpg")),
                StorageCall::Destroy("old-4".into()),
                StorageCall::Upload(PathBuf::from("/tmp/uploads/d.jpg")),
            ]
        );
    }

    #[test]
    fn update_with_malformed_sizes_is_rejected_before_any_change() {
        let before = four_hosted();
        let repo = TestRepository::new(vec![before.clone()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        let form = UpdateProductForm {
            id: Some(Text("1".into())),
            name: Some(Text("Renamed tee".into())),
            description: Some(Text("Soft cotton".into())),
            price: Some(Text("30".into())),
            category: Some(Text("Men".into())),
            sub_category: Some(Text("Topwear".into())),
            sizes: Some(Text("[\"M\", ".into())),
            bestseller: Some(Text("true".into())),
            image1: None,
            image2: None,
            image3: None,
            image4: None,
        };

        let result = UpdateProductFormPayload::try_from(&form).map_err(ServiceError::from);

        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert_eq!(repo.snapshot(), vec![before]);
        assert!(storage.calls().is_empty());
    }

    #[actix_web::test]
    async fn update_missing_product_touches_nothing() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::new();

        let err = update_product(update(9, vec![pending(1, "a.jpg")]), &repo, &storage)
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
        assert!(storage.calls().is_empty());
    }

    #[actix_web::test]
    async fn update_without_id_reports_not_found() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::new();
        let payload = UpdateProductFormPayload {
            product_id: 0,
            fields: fields("Renamed tee"),
            images: vec![pending(1, "a.jpg")],
        };

        let err = update_product(payload, &repo, &storage).await.unwrap_err();

        assert_eq!(err, ServiceError::NotFound);
        assert_eq!(err.kind(), "not_found");
        assert!(storage.calls().is_empty());
    }

    fn assert_stored_images_are_live(repo: &TestRepository, storage: &RecordingStorage) {
        let live = storage.live();
        for product in repo.snapshot() {
            for public_id in product.images.public_ids() {
                assert!(
                    live.contains(public_id.as_str()),
                    "{public_id} is stored but no longer hosted"
                );
            }
        }
    }

    #[actix_web::test]
    async fn update_upload_failure_keeps_resolved_slots() {
        let before = four_hosted();
        let repo = TestRepository::new(vec![before.clone()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        storage.fail_upload_of("/tmp/uploads/c.jpg");

        let err = update_product(
            update(1, vec![pending(1, "a.jpg"), pending(3, "c.jpg")]),
            &repo,
            &storage,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Upstream(_)));
        assert_stored_images_are_live(&repo, &storage);

        let stored = &repo.snapshot()[0];
        assert_eq!(public_id_at(stored, 1).as_deref(), Some("unistyle/products/img-1"));
        assert_eq!(public_id_at(stored, 2).as_deref(), Some("old-2"));
        assert!(stored.images.get(slot(3)).is_none());
        assert_eq!(public_id_at(stored, 4).as_deref(), Some("old-4"));
        assert_eq!(stored.name, before.name);
        assert_eq!(stored.bestseller, before.bestseller);
        assert!(storage.live().contains("unistyle/products/img-1"));
    }

    #[actix_web::test]
    async fn update_upload_failure_keeps_an_image_that_could_not_be_deleted() {
        let before = four_hosted();
        let repo = TestRepository::new(vec![before.clone()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        storage.fail_destroy_of("old-2");
        storage.fail_upload_of("/tmp/uploads/b.jpg");

        let err = update_product(update(1, vec![pending(2, "b.jpg")]), &repo, &storage)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Upstream(_)));
        assert_eq!(repo.snapshot(), vec![before]);
        assert_stored_images_are_live(&repo, &storage);
    }

    #[actix_web::test]
    async fn update_upload_failure_with_unsaved_slots_discards_uploads() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        storage.fail_upload_of("/tmp/uploads/c.jpg");
        repo.fail_writes();

        let err = update_product(
            update(1, vec![pending(1, "a.jpg"), pending(3, "c.jpg")]),
            &repo,
            &storage,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Upstream(_)));
        assert!(!storage.live().contains("unistyle/products/img-1"));
    }

    #[actix_web::test]
    async fn update_persistence_failure_discards_new_uploads() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        repo.fail_writes();

        let err = update_product(update(1, vec![pending(2, "b.jpg")]), &repo, &storage)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(!storage.live().contains("unistyle/products/img-1"));
    }

    #[actix_web::test]
    async fn update_reports_failed_deletion_of_replaced_image() {
        let repo = TestRepository::new(vec![four_hosted()]);
        let storage = RecordingStorage::with_live(["old-1", "old-2", "old-3", "old-4"]);
        storage.fail_destroy_of("old-3");

        let report = update_product(update(1, vec![pending(3, "c.jpg")]), &repo, &storage)
            .await
            .unwrap();

        assert_eq!(report.failed_deletions.len(), 1);
        assert_eq!(report.failed_deletions[0].public_id, "old-3");
        assert!(public_id_at(&report.product, 3).is_some());
    }
}
