//! Domain data model — onboarding input, strategies, and ephemeral
//! generator artifacts.
//!
//! Wire names are camelCase to stay byte-compatible with the JSON blobs
//! the browser client already persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The structured onboarding record collected (or AI-suggested) before
/// strategy generation. Immutable once submitted: a new submission creates
/// a new strategy rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingData {
    pub industry: String,
    pub goal: String,
    /// Free-text, comma-separated concept list.
    pub topics: String,
    pub tone: String,
    pub target_audience: String,
}

/// A single content idea belonging to a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdea {
    pub title: String,
    pub description: String,
}

/// A user-written draft to be expanded into a full post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub key_points: String,
}

/// A generated content strategy. Owned exclusively by one identity.
///
/// Mutated only by wholesale replacement (regeneration) or by replacement
/// of the `post_ideas` list — never by partial in-place edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub summary: String,
    /// 3-5 key themes to focus content on.
    pub content_pillars: Vec<String>,
    pub tone: String,
    /// Echoed verbatim from the onboarding input by the generator.
    pub target_audience: String,
    /// Exactly 5 at creation time.
    pub post_ideas: Vec<PostIdea>,
}

/// The per-identity persisted aggregate (current shape).
///
/// Supersedes storing a bare `Strategy`: carrying the onboarding record
/// and source profile text alongside the strategy enables full-profile
/// regeneration later. Legacy bare-`Strategy` entries are upgraded by the
/// session reconciler on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileRecord {
    pub strategy: Strategy,
    pub onboarding_data: OnboardingData,
    pub profile_text: String,
    pub linked_in_url: String,
}

impl UserProfileRecord {
    /// Upgrade a legacy bare-strategy aggregate to the current shape.
    ///
    /// The onboarding record is synthesized from what the strategy itself
    /// carries; profile text and URL are unknown for legacy entries.
    pub fn from_legacy(strategy: Strategy) -> Self {
        let onboarding_data = OnboardingData {
            industry: String::new(),
            goal: String::new(),
            topics: strategy.content_pillars.join(", "),
            tone: strategy.tone.clone(),
            target_audience: strategy.target_audience.clone(),
        };
        Self {
            strategy,
            onboarding_data,
            profile_text: String::new(),
            linked_in_url: String::new(),
        }
    }
}

/// A post scheduled onto the content calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: uuid::Uuid,
    pub title: String,
    pub content: String,
    pub scheduled_date: DateTime<Utc>,
}

// ── Ephemeral generator artifacts (never persisted) ─────────────────

/// A suggested day/time window for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingSuggestion {
    /// Day of week, e.g. "Tuesday".
    pub day: String,
    /// Time window, e.g. "9:00 AM - 11:00 AM EST".
    pub time: String,
}

/// The generator's pick for which idea to schedule next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSuggestion {
    /// Must match one of the strategy's post idea titles.
    pub post_title: String,
    pub reason: String,
}

/// A single trending topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub title: String,
    pub summary: String,
}

/// A web source backing a trend lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSource {
    pub uri: String,
    pub title: String,
}

/// Result of a trend lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResult {
    pub trends: Vec<Trend>,
    pub sources: Vec<TrendSource>,
}

/// One suggested reply to a comment, with its angle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReplySuggestion {
    /// e.g. "Insightful", "Friendly & Appreciative", "Question-based".
    pub style: String,
    pub reply: String,
}

/// Fields pulled from a public profile by the scraping collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProfile {
    pub name: String,
    pub headline: String,
    pub about: String,
}
