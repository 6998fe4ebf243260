//! Strategy generator — the LLM-backed collaborator behind every
//! "intelligent" operation.
//!
//! All operations are stateless request/response: no hidden state and no
//! side effects on session state beyond what the workflow itself applies.

pub mod llm;
pub mod prompts;

pub use llm::LlmGenerator;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::model::{
    CommentReplySuggestion, OnboardingData, PostDraft, PostIdea, PostingSuggestion,
    ScheduleSuggestion, ScrapedProfile, Strategy, TrendsResult,
};

/// Number of post ideas a strategy carries at creation and after idea
/// regeneration.
pub const POST_IDEA_COUNT: usize = 5;

/// The external generator contract.
#[async_trait]
pub trait StrategyGenerator: Send + Sync {
    /// Deduce onboarding defaults from a profile "About" text.
    async fn suggest_onboarding(
        &self,
        profile_text: &str,
    ) -> Result<OnboardingData, GenerationError>;

    /// Build a full strategy. The result's `target_audience` echoes the
    /// input verbatim.
    async fn build_strategy(&self, input: &OnboardingData) -> Result<Strategy, GenerationError>;

    /// Produce 5 fresh post ideas, excluding (best-effort) titles already
    /// present in the given strategy.
    async fn regenerate_ideas(&self, strategy: &Strategy)
    -> Result<Vec<PostIdea>, GenerationError>;

    /// Write a complete post from an idea.
    async fn generate_post(
        &self,
        idea: &PostIdea,
        strategy: &Strategy,
    ) -> Result<String, GenerationError>;

    /// Expand a user draft into a complete post.
    async fn generate_post_from_draft(
        &self,
        draft: &PostDraft,
        strategy: &Strategy,
    ) -> Result<String, GenerationError>;

    /// Suggest 3-4 optimal posting day/time windows.
    async fn posting_time_suggestions(
        &self,
        strategy: &Strategy,
    ) -> Result<Vec<PostingSuggestion>, GenerationError>;

    /// Pick the single best idea to schedule next, if any.
    async fn next_post_suggestion(
        &self,
        strategy: &Strategy,
    ) -> Result<Option<ScheduleSuggestion>, GenerationError>;

    /// Look up trending topics relevant to the strategy.
    async fn fetch_trends(&self, strategy: &Strategy) -> Result<TrendsResult, GenerationError>;

    /// Suggest 3 replies (with distinct angles) to a comment.
    async fn comment_replies(
        &self,
        post_content: &str,
        comment: &str,
        strategy: &Strategy,
    ) -> Result<Vec<CommentReplySuggestion>, GenerationError>;

    /// Draft a personalized intro DM to a new connection.
    async fn draft_intro_message(
        &self,
        connection_profile: &str,
        strategy: &Strategy,
    ) -> Result<String, GenerationError>;
}

/// The headless-browser scraping collaborator. Only the boundary is in
/// scope; DOM heuristics belong to the external service.
#[async_trait]
pub trait ProfileScraper: Send + Sync {
    /// Fetch the public profile behind `url`.
    async fn scrape(&self, url: &str) -> Result<ScrapedProfile, GenerationError>;
}
