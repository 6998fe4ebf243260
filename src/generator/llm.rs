//! `LlmGenerator` — implements the generator contract over an
//! `LlmProvider`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GenerationError;
use crate::generator::{POST_IDEA_COUNT, StrategyGenerator, prompts};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::model::{
    CommentReplySuggestion, OnboardingData, PostDraft, PostIdea, PostingSuggestion,
    ScheduleSuggestion, Strategy, TrendsResult,
};

/// Strategy generator backed by an LLM provider.
pub struct LlmGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl LlmGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// One-shot completion expecting a JSON document back.
    async fn complete_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: String,
    ) -> Result<T, GenerationError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.7)
            .expecting_json();
        let response = self.llm.complete(request).await?;
        debug!(operation, output_tokens = response.output_tokens, "Generator call finished");
        decode_json(operation, &response.content)
    }

    /// One-shot completion expecting prose back.
    async fn complete_text(
        &self,
        operation: &str,
        prompt: String,
    ) -> Result<String, GenerationError> {
        let request =
            CompletionRequest::new(vec![ChatMessage::user(prompt)]).with_temperature(0.7);
        let response = self.llm.complete(request).await?;
        debug!(operation, output_tokens = response.output_tokens, "Generator call finished");
        Ok(response.content)
    }
}

/// Strip an optional markdown code fence and parse the JSON body.
fn decode_json<T: DeserializeOwned>(operation: &str, content: &str) -> Result<T, GenerationError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);
    serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse {
        reason: format!("{operation}: {e}"),
    })
}

fn expect_idea_count(
    operation: &str,
    ideas: Vec<PostIdea>,
) -> Result<Vec<PostIdea>, GenerationError> {
    if ideas.len() != POST_IDEA_COUNT {
        return Err(GenerationError::InvalidResponse {
            reason: format!(
                "{operation}: expected {POST_IDEA_COUNT} post ideas, got {}",
                ideas.len()
            ),
        });
    }
    Ok(ideas)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostIdeasEnvelope {
    post_ideas: Vec<PostIdea>,
}

#[derive(Deserialize)]
struct SuggestionsEnvelope<T> {
    suggestions: Vec<T>,
}

#[async_trait]
impl StrategyGenerator for LlmGenerator {
    async fn suggest_onboarding(
        &self,
        profile_text: &str,
    ) -> Result<OnboardingData, GenerationError> {
        self.complete_json(
            "suggest_onboarding",
            prompts::suggest_onboarding_prompt(profile_text),
        )
        .await
    }

    async fn build_strategy(&self, input: &OnboardingData) -> Result<Strategy, GenerationError> {
        let mut strategy: Strategy = self
            .complete_json("build_strategy", prompts::build_strategy_prompt(input))
            .await?;
        // The echo is a consumer-verifiable contract; do not rely on the
        // model honoring the prompt.
        strategy.target_audience = input.target_audience.clone();
        strategy.post_ideas = expect_idea_count("build_strategy", strategy.post_ideas)?;
        Ok(strategy)
    }

    async fn regenerate_ideas(
        &self,
        strategy: &Strategy,
    ) -> Result<Vec<PostIdea>, GenerationError> {
        let envelope: PostIdeasEnvelope = self
            .complete_json("regenerate_ideas", prompts::regenerate_ideas_prompt(strategy))
            .await?;
        expect_idea_count("regenerate_ideas", envelope.post_ideas)
    }

    async fn generate_post(
        &self,
        idea: &PostIdea,
        strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.complete_text("generate_post", prompts::generate_post_prompt(idea, strategy))
            .await
    }

    async fn generate_post_from_draft(
        &self,
        draft: &PostDraft,
        strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.complete_text(
            "generate_post_from_draft",
            prompts::generate_post_from_draft_prompt(draft, strategy),
        )
        .await
    }

    async fn posting_time_suggestions(
        &self,
        strategy: &Strategy,
    ) -> Result<Vec<PostingSuggestion>, GenerationError> {
        let envelope: SuggestionsEnvelope<PostingSuggestion> = self
            .complete_json(
                "posting_time_suggestions",
                prompts::posting_times_prompt(strategy),
            )
            .await?;
        Ok(envelope.suggestions)
    }

    async fn next_post_suggestion(
        &self,
        strategy: &Strategy,
    ) -> Result<Option<ScheduleSuggestion>, GenerationError> {
        match self
            .complete_json::<ScheduleSuggestion>(
                "next_post_suggestion",
                prompts::next_post_prompt(strategy),
            )
            .await
        {
            Ok(suggestion) => Ok(Some(suggestion)),
            // A malformed pick is a quality issue, not a workflow error.
            Err(GenerationError::InvalidResponse { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_trends(&self, strategy: &Strategy) -> Result<TrendsResult, GenerationError> {
        let text = self
            .complete_text("fetch_trends", prompts::fetch_trends_prompt(strategy))
            .await?;
        let mut trends = prompts::parse_trends_from_text(&text);
        if trends.is_empty() && !text.is_empty() {
            // Structure parse failed; surface the whole text as one trend.
            trends.push(crate::model::Trend {
                title: "Latest Insights".to_string(),
                summary: text.clone(),
            });
        }
        let sources = prompts::extract_sources_from_text(&text);
        Ok(TrendsResult { trends, sources })
    }

    async fn comment_replies(
        &self,
        post_content: &str,
        comment: &str,
        strategy: &Strategy,
    ) -> Result<Vec<CommentReplySuggestion>, GenerationError> {
        let envelope: SuggestionsEnvelope<CommentReplySuggestion> = self
            .complete_json(
                "comment_replies",
                prompts::comment_replies_prompt(post_content, comment, strategy),
            )
            .await?;
        Ok(envelope.suggestions)
    }

    async fn draft_intro_message(
        &self,
        connection_profile: &str,
        strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.complete_text(
            "draft_intro_message",
            prompts::intro_message_prompt(connection_profile, strategy),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_json() {
        let ideas: PostIdeasEnvelope =
            decode_json("t", r#"{"postIdeas": [{"title": "a", "description": "b"}]}"#).unwrap();
        assert_eq!(ideas.post_ideas.len(), 1);
    }

    #[test]
    fn decode_fenced_json() {
        let raw = "```json\n{\"postIdeas\": []}\n```";
        let ideas: PostIdeasEnvelope = decode_json("t", raw).unwrap();
        assert!(ideas.post_ideas.is_empty());
    }

    #[test]
    fn decode_garbage_is_invalid_response() {
        let result: Result<PostIdeasEnvelope, _> = decode_json("t", "not json");
        assert!(matches!(
            result,
            Err(GenerationError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn idea_count_enforced() {
        let five = (0..5)
            .map(|i| PostIdea {
                title: format!("t{i}"),
                description: "d".into(),
            })
            .collect::<Vec<_>>();
        assert!(expect_idea_count("t", five).is_ok());

        let four = (0..4)
            .map(|i| PostIdea {
                title: format!("t{i}"),
                description: "d".into(),
            })
            .collect::<Vec<_>>();
        assert!(expect_idea_count("t", four).is_err());
    }
}
