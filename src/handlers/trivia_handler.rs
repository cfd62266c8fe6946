use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{CustomQuizRequest, PlayQuizRequest},
};

#[post("/api/trivia/play")]
pub async fn play_quiz(
    state: web::Data<Arc<AppState>>,
    request: web::Json<PlayQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.trivia_service.play(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/trivia/custom")]
pub async fn custom_quiz(
    state: web::Data<Arc<AppState>>,
    request: web::Json<CustomQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.trivia_service.custom(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/trivia/options")]
pub async fn quiz_options(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let options = state.trivia_service.options().await?;
    Ok(HttpResponse::Ok().json(options))
}
