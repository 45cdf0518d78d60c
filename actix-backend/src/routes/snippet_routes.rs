use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::{errors::ApiError, handlers::snippet_handler, middleware::jwt_middleware::RequireIdentity};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid request body: {err}")).into()
}

/// Body parse failures surface as `ValidationError` with the usual JSON error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

pub fn config(config: &mut web::ServiceConfig, identity: RequireIdentity) {
    config.service(
        web::scope("/api")
        .service(snippet_handler::create_snippet)
        .service(snippet_handler::get_user_snippets)
        .service(snippet_handler::get_user_snippet)
        .service(snippet_handler::update_snippet)
        .service(snippet_handler::delete_snippet)
        .wrap(identity)
    );
}
