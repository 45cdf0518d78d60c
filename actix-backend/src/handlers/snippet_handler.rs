use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use crate::{
    errors::ApiError,
    models::AuthUser,
    services::{parse_snippet_id, CreateSnippetRequest, UpdateSnippetRequest},
    AppState,
};

#[post("/new")]
pub async fn create_snippet(
    app_data: web::Data<AppState>,
    data_json: web::Json<CreateSnippetRequest>,
    user_data: web::ReqData<AuthUser>,
) -> Result<impl Responder, ApiError> {
    let snippet = app_data
        .snippets
        .create(user_data.into_inner(), data_json.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(snippet))
}

#[get("/dashboard")]
pub async fn get_user_snippets(
    app_data: web::Data<AppState>,
    user_data: web::ReqData<AuthUser>,
) -> Result<impl Responder, ApiError> {
    let snippets = app_data.snippets.list(user_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(snippets))
}

#[get("/new/{snippetId}")]
pub async fn get_user_snippet(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
    user_data: web::ReqData<AuthUser>,
) -> Result<impl Responder, ApiError> {
    let snippet_id = parse_snippet_id(&path)?;
    let snippet = app_data.snippets.get(user_data.into_inner(), snippet_id).await?;

    Ok(HttpResponse::Ok().json(snippet))
}

#[put("/new/{snippetId}")]
pub async fn update_snippet(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
    user_data: web::ReqData<AuthUser>,
    json_data: web::Json<UpdateSnippetRequest>,
) -> Result<impl Responder, ApiError> {
    let snippet_id = parse_snippet_id(&path)?;
    let snippet = app_data
        .snippets
        .update(user_data.into_inner(), snippet_id, json_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Snippet updated successfully",
        "snippet": snippet,
    })))
}

#[delete("/new/{snippetId}")]
pub async fn delete_snippet(
    app_data: web::Data<AppState>,
    path: web::Path<String>,
    user_data: web::ReqData<AuthUser>,
) -> Result<impl Responder, ApiError> {
    let snippet_id = parse_snippet_id(&path)?;
    app_data.snippets.delete(user_data.into_inner(), snippet_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Snippet deleted successfully"
    })))
}
