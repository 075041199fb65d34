use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::product::Product;
use crate::dto::products::{ApiResponse, ProductDto};
use crate::forms::products::{
    AddProductForm, AddProductFormPayload, ProductIdInput, RemoveProductForm, SingleProductForm,
    UpdateProductForm, UpdateProductFormPayload,
};
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::products::{
    add_product as add_product_service, get_client_product as get_client_product_service,
    get_product as get_product_service, list_products as list_products_service,
    remove_product as remove_product_service, update_product as update_product_service,
};
use crate::storage::cloudinary::CloudinaryStorage;

/// Renders a service failure into the JSON envelope. Always HTTP 200.
pub fn error_response(err: ServiceError) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::failure(err.kind(), err.to_string()))
}

#[post("/add")]
pub async fn add_product(
    MultipartForm(form): MultipartForm<AddProductForm>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<CloudinaryStorage>,
) -> impl Responder {
    let payload = match AddProductFormPayload::try_from(&form) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejected add product form: {e}");
            return error_response(e.into());
        }
    };

    match add_product_service(payload, repo.get_ref(), storage.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(ApiResponse::<()>::ok().message("Product Added")),
        Err(err) => error_response(err),
    }
}

#[get("/list")]
pub async fn list_products(repo: web::Data<DieselRepository>) -> impl Responder {
    match list_products_service(repo.get_ref()) {
        Ok(products) => HttpResponse::Ok().json(ApiResponse::<ProductDto>::ok().products(products)),
        Err(err) => error_response(err),
    }
}

#[post("/remove")]
pub async fn remove_product(
    form: web::Json<RemoveProductForm>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<CloudinaryStorage>,
) -> impl Responder {
    let product_id = form.id.value();
    match remove_product_service(product_id, repo.get_ref(), storage.get_ref()).await {
        Ok(report) => HttpResponse::Ok().json(
            ApiResponse::<()>::ok()
                .message("Product Removed")
                .failed_deletions(report.failed_deletions),
        ),
        Err(err) => error_response(err),
    }
}

/// Stored form of the product, image handles included.
#[post("/single")]
pub async fn single_product(
    form: web::Json<SingleProductForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match get_product_service(form.product_id.value(), repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(ApiResponse::<Product>::ok().product(product)),
        Err(err) => error_response(err),
    }
}

/// Display form of the product, images as plain URLs.
#[get("/single/{id}")]
pub async fn client_product(
    id: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = ProductIdInput::Text(id.into_inner()).value();
    match get_client_product_service(product_id, repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(ApiResponse::<ProductDto>::ok().product(product)),
        Err(err) => error_response(err),
    }
}

#[post("/update")]
pub async fn update_product(
    MultipartForm(form): MultipartForm<UpdateProductForm>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<CloudinaryStorage>,
) -> impl Responder {
    let payload = match UpdateProductFormPayload::try_from(&form) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Rejected update product form: {e}");
            return error_response(e.into());
        }
    };

    match update_product_service(payload, repo.get_ref(), storage.get_ref()).await {
        Ok(report) => HttpResponse::Ok().json(
            ApiResponse::<()>::ok()
                .message("Product updated successfully")
                .failed_deletions(report.failed_deletions),
        ),
        Err(err) => error_response(err),
    }
}
