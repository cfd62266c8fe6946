use async_graphql::{Context, InputObject, Json, Object};

use crate::{
    app_state::AppState,
    errors::AppResult,
    models::dto::{
        request::{AnsweredQuestion, SaveQuizRequest},
        response::SaveQuizResponse,
    },
};

#[derive(InputObject)]
pub struct SaveQuizInput {
    pub name: String,
    /// Questions as returned by `generateQuiz`, optionally with `seleccionado`.
    pub questions: Json<Vec<AnsweredQuestion>>,
}

impl From<SaveQuizInput> for SaveQuizRequest {
    fn from(input: SaveQuizInput) -> Self {
        SaveQuizRequest {
            name: input.name,
            questions: input.questions.0,
        }
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn save_quiz(&self, ctx: &Context<'_>, input: SaveQuizInput) -> AppResult<SaveQuizResponse> {
        let state = ctx.data::<AppState>()?;
        state.trivia_service.save_quiz(input.into()).await
    }
}
