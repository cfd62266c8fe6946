use crate::errors::{AppError, AppResult};

/// Converts an optional GraphQL question count, rejecting negatives.
pub fn parse_question_count(count: Option<i32>) -> AppResult<Option<usize>> {
    count
        .map(|count| {
            usize::try_from(count).map_err(|_| {
                AppError::ValidationError("Question count cannot be negative".to_string())
            })
        })
        .transpose()
}

/// Same bounds as the REST pagination parameters.
pub fn page_bounds(offset: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    (offset.unwrap_or(0).max(0), limit.unwrap_or(20).clamp(1, 100))
}
