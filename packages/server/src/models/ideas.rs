use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ideas::PageIdea;

const DEFAULT_COUNT: u32 = 5;
const MAX_COUNT: u32 = 20;
const MAX_PROMPT_CHARS: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GenerateIdeasRequest {
    #[schema(example = "Pages for a bakery that also runs baking classes")]
    pub prompt: String,
    /// 1-20, defaults to 5.
    pub count: Option<u32>,
}

impl GenerateIdeasRequest {
    /// Trimmed prompt and effective count.
    pub fn validated(&self) -> Result<(String, u32), AppError> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() || prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(AppError::Validation(format!(
                "Prompt must be 1-{MAX_PROMPT_CHARS} characters"
            )));
        }
        let count = self.count.unwrap_or(DEFAULT_COUNT);
        if !(1..=MAX_COUNT).contains(&count) {
            return Err(AppError::Validation(format!(
                "Count must be between 1 and {MAX_COUNT}"
            )));
        }
        Ok((prompt.to_string(), count))
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct IdeasResponse {
    pub ideas: Vec<PageIdea>,
}
