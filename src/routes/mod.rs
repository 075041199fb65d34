use actix_multipart::form::MultipartFormConfig;
use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};

use crate::dto::products::ApiResponse;

pub mod products;

/// Upper bound for a whole product multipart body: four images plus text.
const MULTIPART_TOTAL_LIMIT: usize = 50 * 1024 * 1024;

fn rejected_body(message: String) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::<()>::failure("validation", message))
}

/// Registers the `/api/product` scope.
///
/// Malformed JSON or multipart bodies are answered with the same 200
/// envelope as every other failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected JSON body: {err}");
        let response = rejected_body(err.to_string());
        InternalError::from_response(err, response).into()
    });
    let multipart_config = MultipartFormConfig::default()
        .total_limit(MULTIPART_TOTAL_LIMIT)
        .error_handler(|err, _req| {
            log::warn!("Rejected multipart body: {err}");
            let response = rejected_body(err.to_string());
            InternalError::from_response(err, response).into()
        });

    cfg.service(
        web::scope("/api/product")
            .app_data(json_config)
            .app_data(multipart_config)
            .service(products::add_product)
            .service(products::list_products)
            .service(products::remove_product)
            .service(products::single_product)
            .service(products::client_product)
            .service(products::update_product),
    );
}
