use async_graphql::{Context, Json, Object};

use crate::{
    app_state::AppState,
    errors::AppResult,
    graphql::helpers::{page_bounds, parse_question_count},
    models::dto::response::{PaginatedSavedQuizzes, PlayQuizResponse, QuizOptions},
    trivia::SerializedQuestion,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn quiz_options(&self, ctx: &Context<'_>) -> AppResult<QuizOptions> {
        let state = ctx.data::<AppState>()?;
        state.trivia_service.options().await
    }

    /// Questions in the same shape the REST API returns them.
    async fn generate_quiz(
        &self,
        ctx: &Context<'_>,
        years: Option<Vec<i32>>,
        countries: Option<Vec<String>>,
        count: Option<i32>,
    ) -> AppResult<Json<Vec<SerializedQuestion>>> {
        let state = ctx.data::<AppState>()?;
        let count = parse_question_count(count)?;

        let questions = state
            .trivia_service
            .generate(
                years.unwrap_or_default(),
                countries.unwrap_or_default(),
                count,
            )
            .await?;
        Ok(Json(questions))
    }

    async fn saved_quiz(&self, ctx: &Context<'_>, name: String) -> AppResult<Json<PlayQuizResponse>> {
        let state = ctx.data::<AppState>()?;
        let quiz = state.trivia_service.get_quiz(&name).await?;
        Ok(Json(quiz))
    }

    async fn saved_quizzes(
        &self,
        ctx: &Context<'_>,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> AppResult<PaginatedSavedQuizzes> {
        let state = ctx.data::<AppState>()?;
        let (offset, limit) = page_bounds(offset, limit);

        state.trivia_service.list_quizzes(offset, limit).await
    }
}
