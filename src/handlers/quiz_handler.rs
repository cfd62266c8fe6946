use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{PaginationParams, SaveQuizRequest},
};

#[post("/api/quizzes")]
pub async fn save_quiz(
    state: web::Data<Arc<AppState>>,
    request: web::Json<SaveQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.trivia_service.save_quiz(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/quizzes")]
pub async fn list_quizzes(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state
        .trivia_service
        .list_quizzes(pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/quizzes/{nombre}")]
pub async fn get_quiz(
    state: web::Data<Arc<AppState>>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.trivia_service.get_quiz(&name).await?;
    Ok(HttpResponse::Ok().json(quiz))
}
