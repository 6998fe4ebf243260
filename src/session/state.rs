//! Workflow step machine and the serializable session state value.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::model::{OnboardingData, ScrapedProfile, UserProfileRecord};

/// The steps of the onboarding-to-strategy workflow.
///
/// `ScrapingProfile`, `AnalyzingProfile`, and `GeneratingStrategy` are
/// transient loading steps: a generator or scraper request is in flight
/// and the triggering control is disabled. Dashboard sub-tabs are not
/// steps — they affect neither persistence nor routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStep {
    /// No identity established; entry screen.
    Unauthenticated,
    /// First onboarding step: profile URL or "About" text entry.
    ProfileInput,
    /// Scraper request in flight.
    ScrapingProfile,
    /// Onboarding-suggestion request in flight.
    AnalyzingProfile,
    /// AI-suggested onboarding defaults shown for editing.
    ReviewSuggestions,
    /// Strategy request in flight.
    GeneratingStrategy,
    /// Steady state: a strategy is loaded.
    Dashboard,
}

impl AppStep {
    /// Check if this step allows transitioning to another step.
    pub fn can_transition_to(&self, target: AppStep) -> bool {
        use AppStep::*;

        matches!(
            (self, target),
            // Entry
            (Unauthenticated, ProfileInput) | (Unauthenticated, Dashboard) |
            // Onboarding input
            (ProfileInput, ScrapingProfile) | (ProfileInput, AnalyzingProfile) |
            // Scrape resolves into analysis, or falls back on error
            (ScrapingProfile, AnalyzingProfile) | (ScrapingProfile, ProfileInput) |
            // Analysis resolves into review, or falls back on error
            (AnalyzingProfile, ReviewSuggestions) | (AnalyzingProfile, ProfileInput) |
            // Review submits, or aborts back to input
            (ReviewSuggestions, GeneratingStrategy) | (ReviewSuggestions, ProfileInput) |
            // Strategy generation resolves, or falls back on error
            (GeneratingStrategy, Dashboard) | (GeneratingStrategy, ReviewSuggestions) |
            // The only paths out of the steady state
            (Dashboard, ProfileInput) | (Dashboard, Unauthenticated)
        )
    }

    /// Whether a request is in flight for this step.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::ScrapingProfile | Self::AnalyzingProfile | Self::GeneratingStrategy
        )
    }

    /// Whether the user can interact at this step.
    pub fn is_interactive(&self) -> bool {
        !self.is_loading()
    }
}

impl std::fmt::Display for AppStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::ProfileInput => "profile_input",
            Self::ScrapingProfile => "scraping_profile",
            Self::AnalyzingProfile => "analyzing_profile",
            Self::ReviewSuggestions => "review_suggestions",
            Self::GeneratingStrategy => "generating_strategy",
            Self::Dashboard => "dashboard",
        };
        write!(f, "{s}")
    }
}

/// The explicit session state value.
///
/// Rehydrated solely by the session reconciler at startup and passed
/// through the workflow — there are no ambient globals. Suggestions,
/// scraped data, and errors are ephemeral and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// The established principal, if any.
    pub identity: Option<Identity>,
    /// The loaded per-identity aggregate, if any.
    pub aggregate: Option<UserProfileRecord>,
    /// AI-suggested onboarding defaults awaiting review.
    pub suggestions: Option<OnboardingData>,
    /// Scraped profile stashed between scraping and analysis.
    pub scraped: Option<ScrapedProfile>,
    /// Source "About" text stashed for the aggregate.
    pub profile_text: String,
    /// Source profile URL stashed for the aggregate.
    pub profile_url: String,
    /// Current workflow step.
    pub step: AppStep,
    /// Recoverable error attached to the current step.
    pub error: Option<String>,
    /// Bumped on every step change; in-flight requests compare against it
    /// and discard late responses.
    pub epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            identity: None,
            aggregate: None,
            suggestions: None,
            scraped: None,
            profile_text: String::new(),
            profile_url: String::new(),
            step: AppStep::Unauthenticated,
            error: None,
            epoch: 0,
        }
    }

    /// Move to `step`, clearing any attached error and invalidating
    /// in-flight requests. The move must be a legal transition.
    pub fn enter(&mut self, step: AppStep) {
        debug_assert!(
            self.step.can_transition_to(step),
            "illegal transition {} -> {step}",
            self.step
        );
        self.step = step;
        self.error = None;
        self.epoch += 1;
    }

    /// Move to `step` with a recoverable error message attached. The move
    /// must be a legal transition.
    pub fn enter_with_error(&mut self, step: AppStep, message: impl Into<String>) {
        debug_assert!(
            self.step.can_transition_to(step),
            "illegal transition {} -> {step}",
            self.step
        );
        self.step = step;
        self.error = Some(message.into());
        self.epoch += 1;
    }

    /// Jump to `step` regardless of the transition table. Only for the
    /// entry events (sign-in, guest adoption), which restart the machine
    /// from any step.
    pub fn reset_to(&mut self, step: AppStep) {
        self.step = step;
        self.error = None;
        self.epoch += 1;
    }

    /// Drop everything tied to the onboarding flow (suggestions, scraped
    /// data, stashed sources).
    pub fn clear_onboarding_artifacts(&mut self) {
        self.suggestions = None;
        self.scraped = None;
        self.profile_text.clear();
        self.profile_url.clear();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
