//! Workflow engine — validates user intents, executes transition effects,
//! and keeps session state and storage consistent.
//!
//! Every generator/scraper call is caught at the boundary: a failure
//! returns the session to the most recent interactive step with the error
//! message attached, never crashing the session and never discarding
//! persisted data.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result, SessionError, ValidationError};
use crate::generator::{ProfileScraper, StrategyGenerator};
use crate::identity::Identity;
use crate::model::{
    CommentReplySuggestion, OnboardingData, PostDraft, PostIdea, PostingSuggestion,
    ScheduleSuggestion, Strategy, TrendsResult, UserProfileRecord,
};
use crate::session::reconcile::{load_aggregate, reconcile};
use crate::session::state::{AppStep, SessionState};
use crate::store::{Key, KeyValueStore, write_json};

/// Coordinates the onboarding-to-strategy workflow: state tracking,
/// collaborator calls, and persistence.
pub struct Workflow {
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn StrategyGenerator>,
    scraper: Option<Arc<dyn ProfileScraper>>,
    state: Arc<RwLock<SessionState>>,
}

impl Workflow {
    pub fn new(store: Arc<dyn KeyValueStore>, generator: Arc<dyn StrategyGenerator>) -> Self {
        Self {
            store,
            generator,
            scraper: None,
            state: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    pub fn with_scraper(mut self, scraper: Arc<dyn ProfileScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    /// Rehydrate session state from the store (resume-on-load).
    pub async fn resume(&self) -> Result<AppStep> {
        let resumed = reconcile(self.store.as_ref()).await?;
        let step = resumed.step;
        *self.state.write().await = resumed;
        info!(%step, "Session resumed");
        Ok(step)
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Current step.
    pub async fn step(&self) -> AppStep {
        self.state.read().await.step
    }

    fn require_step(state: &SessionState, event: &str, expected: AppStep) -> Result<()> {
        if state.step != expected {
            return Err(SessionError::InvalidStep {
                event: event.to_string(),
                step: state.step.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // ── Entry transitions ───────────────────────────────────────────

    /// `SignIn`: persist the identity, reconcile its aggregate, and route
    /// to the dashboard or to onboarding.
    pub async fn sign_in(&self, identity: Identity) -> Result<AppStep> {
        write_json(self.store.as_ref(), &Key::identity(), &identity).await?;
        let aggregate = load_aggregate(self.store.as_ref(), &identity.email).await?;

        let mut state = self.state.write().await;
        state.identity = Some(identity);
        state.clear_onboarding_artifacts();
        state.aggregate = aggregate;
        if state.aggregate.is_some() {
            state.reset_to(AppStep::Dashboard);
        } else {
            state.reset_to(AppStep::ProfileInput);
        }
        info!(step = %state.step, "Signed in");
        Ok(state.step)
    }

    /// `ContinueAsGuest`: adopt the guest identity without persisting it.
    /// The guest session is only resumable once an aggregate exists under
    /// the guest namespace.
    pub async fn continue_as_guest(&self) -> Result<AppStep> {
        let mut state = self.state.write().await;
        state.identity = Some(Identity::guest());
        state.aggregate = None;
        state.clear_onboarding_artifacts();
        state.reset_to(AppStep::ProfileInput);
        Ok(state.step)
    }

    // ── Onboarding transitions ──────────────────────────────────────

    /// `SubmitProfileUrl`: scrape the public profile, then feed its
    /// "About" text into analysis.
    pub async fn submit_profile_url(&self, url: &str) -> Result<AppStep> {
        let Some(scraper) = self.scraper.clone() else {
            return Err(Error::Validation(ValidationError::InvalidProfileUrl(
                "profile scraping is not available".to_string(),
            )));
        };
        if !url.contains("linkedin.com/in/") {
            return Err(Error::Validation(ValidationError::InvalidProfileUrl(
                url.to_string(),
            )));
        }

        let epoch = {
            let mut state = self.state.write().await;
            Self::require_step(&state, "SubmitProfileUrl", AppStep::ProfileInput)?;
            state.enter(AppStep::ScrapingProfile);
            state.epoch
        };

        let scraped = scraper.scrape(url).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding stale scrape response");
            return Ok(state.step);
        }
        let profile = match scraped {
            Ok(profile) if !profile.about.is_empty() => profile,
            Ok(_) => {
                let message = "The 'About' section was not found. Cannot proceed.";
                state.enter_with_error(AppStep::ProfileInput, message);
                return Err(Error::Validation(ValidationError::EmptyProfileText));
            }
            Err(e) => {
                state.enter_with_error(AppStep::ProfileInput, e.to_string());
                return Err(e.into());
            }
        };
        let about = profile.about.clone();
        state.scraped = Some(profile);
        state.profile_url = url.to_string();
        drop(state);

        self.analyze(about, AppStep::ScrapingProfile).await
    }

    /// `SubmitProfileText`: ask the generator for onboarding suggestions
    /// from pasted "About" text.
    pub async fn submit_profile_text(&self, profile_text: &str) -> Result<AppStep> {
        if profile_text.trim().is_empty() {
            return Err(Error::Validation(ValidationError::EmptyProfileText));
        }
        {
            let state = self.state.read().await;
            Self::require_step(&state, "SubmitProfileText", AppStep::ProfileInput)?;
        }
        self.analyze(profile_text.to_string(), AppStep::ProfileInput)
            .await
    }

    async fn analyze(&self, profile_text: String, from: AppStep) -> Result<AppStep> {
        let epoch = {
            let mut state = self.state.write().await;
            if state.step != from {
                return Err(SessionError::InvalidStep {
                    event: "AnalyzeProfile".to_string(),
                    step: state.step.to_string(),
                }
                .into());
            }
            state.enter(AppStep::AnalyzingProfile);
            state.epoch
        };

        let result = self.generator.suggest_onboarding(&profile_text).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding stale analysis response");
            return Ok(state.step);
        }
        match result {
            Ok(suggestions) => {
                state.suggestions = Some(suggestions);
                state.profile_text = profile_text;
                state.enter(AppStep::ReviewSuggestions);
                Ok(state.step)
            }
            Err(e) => {
                state.enter_with_error(AppStep::ProfileInput, e.to_string());
                Err(e.into())
            }
        }
    }

    /// `SubmitReview`: build the strategy from the (possibly edited)
    /// onboarding input and persist the aggregate.
    pub async fn submit_review(&self, input: OnboardingData) -> Result<AppStep> {
        let (epoch, email, profile_text, profile_url) = {
            let mut state = self.state.write().await;
            Self::require_step(&state, "SubmitReview", AppStep::ReviewSuggestions)?;
            let Some(identity) = state.identity.clone() else {
                state.enter_with_error(
                    AppStep::ProfileInput,
                    "Something went wrong, user data is missing. Please start over.",
                );
                return Err(SessionError::NoIdentity.into());
            };
            state.enter(AppStep::GeneratingStrategy);
            (
                state.epoch,
                identity.email,
                state.profile_text.clone(),
                state.profile_url.clone(),
            )
        };

        let result = self.generator.build_strategy(&input).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding stale strategy response");
            return Ok(state.step);
        }
        match result {
            Ok(strategy) => {
                let record = UserProfileRecord {
                    strategy,
                    onboarding_data: input,
                    profile_text,
                    linked_in_url: profile_url,
                };
                write_json(self.store.as_ref(), &Key::profile(&email), &record).await?;
                state.aggregate = Some(record);
                state.clear_onboarding_artifacts();
                state.enter(AppStep::Dashboard);
                info!("Strategy persisted");
                Ok(state.step)
            }
            Err(e) => {
                state.enter_with_error(AppStep::ReviewSuggestions, e.to_string());
                Err(e.into())
            }
        }
    }

    // ── Dashboard transitions ───────────────────────────────────────

    /// `StartOver`: delete the aggregate and every dependent namespaced
    /// collection. Requires explicit confirmation; an unconfirmed call
    /// changes nothing.
    pub async fn start_over(&self, confirmed: bool) -> Result<AppStep> {
        if !confirmed {
            return Err(SessionError::NotConfirmed.into());
        }
        let mut state = self.state.write().await;
        Self::require_step(&state, "StartOver", AppStep::Dashboard)?;
        let identity = state.identity.clone().ok_or(SessionError::NoIdentity)?;

        for key in Key::owned_by(&identity.email) {
            self.store.remove(&key).await?;
        }
        state.aggregate = None;
        state.clear_onboarding_artifacts();
        state.enter(AppStep::ProfileInput);
        info!(email = %identity.email, "Started over; namespaced data wiped");
        Ok(state.step)
    }

    /// `Logout`: drop the session. A signed-in identity's key is removed;
    /// the aggregate stays on disk, namespaced by email, for future
    /// sign-in. The guest has no persisted identity key to remove.
    pub async fn logout(&self) -> Result<AppStep> {
        let mut state = self.state.write().await;
        Self::require_step(&state, "Logout", AppStep::Dashboard)?;
        let identity = state.identity.clone().ok_or(SessionError::NoIdentity)?;

        if !identity.is_guest() {
            self.store.remove(&Key::identity()).await?;
        }
        state.identity = None;
        state.aggregate = None;
        state.clear_onboarding_artifacts();
        state.enter(AppStep::Unauthenticated);
        Ok(state.step)
    }

    /// `RequestReauth` (guest only): clear the in-memory identity without
    /// touching storage, so the guest aggregate remains recoverable via
    /// the reconciler's guest fallback.
    pub async fn request_reauth(&self) -> Result<AppStep> {
        let mut state = self.state.write().await;
        Self::require_step(&state, "RequestReauth", AppStep::Dashboard)?;
        let identity = state.identity.clone().ok_or(SessionError::NoIdentity)?;
        if !identity.is_guest() {
            return Err(SessionError::InvalidStep {
                event: "RequestReauth".to_string(),
                step: "signed-in dashboard".to_string(),
            }
            .into());
        }
        state.identity = None;
        state.aggregate = None;
        state.clear_onboarding_artifacts();
        state.enter(AppStep::Unauthenticated);
        Ok(state.step)
    }

    /// `RegenerateIdeas`: replace the aggregate's `post_ideas` list
    /// wholesale (read-modify-write, not merge). Stays on the dashboard;
    /// on failure the persisted aggregate is untouched.
    pub async fn regenerate_ideas(&self) -> Result<Vec<PostIdea>> {
        let (epoch, email, strategy) = {
            let state = self.state.read().await;
            Self::require_step(&state, "RegenerateIdeas", AppStep::Dashboard)?;
            let identity = state.identity.clone().ok_or(SessionError::NoIdentity)?;
            let aggregate = state.aggregate.as_ref().ok_or(SessionError::NoStrategy)?;
            (state.epoch, identity.email, aggregate.strategy.clone())
        };

        let ideas = match self.generator.regenerate_ideas(&strategy).await {
            Ok(ideas) => ideas,
            Err(e) => {
                let mut state = self.state.write().await;
                if state.epoch == epoch {
                    state.error = Some(e.to_string());
                }
                return Err(e.into());
            }
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding stale idea regeneration");
            return Ok(ideas);
        }
        let Some(aggregate) = state.aggregate.as_ref() else {
            return Err(SessionError::NoStrategy.into());
        };
        // Persist first so the in-memory aggregate never gets ahead of
        // the store.
        let mut record = aggregate.clone();
        record.strategy.post_ideas = ideas.clone();
        write_json(self.store.as_ref(), &Key::profile(&email), &record).await?;
        state.aggregate = Some(record);
        state.error = None;
        Ok(ideas)
    }

    /// `RegenerateStrategy`: rebuild the whole strategy from fresh
    /// onboarding input and replace the aggregate atomically. On failure
    /// the previous aggregate is kept untouched.
    pub async fn regenerate_strategy(&self, input: OnboardingData) -> Result<Strategy> {
        let (epoch, email, profile_text, profile_url) = {
            let state = self.state.read().await;
            Self::require_step(&state, "RegenerateStrategy", AppStep::Dashboard)?;
            let identity = state.identity.clone().ok_or(SessionError::NoIdentity)?;
            let aggregate = state.aggregate.as_ref().ok_or(SessionError::NoStrategy)?;
            (
                state.epoch,
                identity.email,
                aggregate.profile_text.clone(),
                aggregate.linked_in_url.clone(),
            )
        };

        let strategy = match self.generator.build_strategy(&input).await {
            Ok(strategy) => strategy,
            Err(e) => {
                let mut state = self.state.write().await;
                if state.epoch == epoch {
                    state.error = Some(e.to_string());
                }
                return Err(e.into());
            }
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!("Discarding stale strategy regeneration");
            return Ok(strategy);
        }
        let record = UserProfileRecord {
            strategy: strategy.clone(),
            onboarding_data: input,
            profile_text,
            linked_in_url: profile_url,
        };
        write_json(self.store.as_ref(), &Key::profile(&email), &record).await?;
        state.aggregate = Some(record);
        state.error = None;
        info!("Strategy regenerated");
        Ok(strategy)
    }

    // ── Dashboard conveniences (stateless generator calls) ──────────
    //
    // Independent requests: they may run concurrently, touch only
    // ephemeral caller-side state, and never write the aggregate.

    async fn current_strategy(&self) -> Result<Strategy> {
        let state = self.state.read().await;
        let aggregate = state.aggregate.as_ref().ok_or(SessionError::NoStrategy)?;
        Ok(aggregate.strategy.clone())
    }

    pub async fn generate_post(&self, idea: &PostIdea) -> Result<String> {
        let strategy = self.current_strategy().await?;
        Ok(self.generator.generate_post(idea, &strategy).await?)
    }

    pub async fn generate_post_from_draft(&self, draft: &PostDraft) -> Result<String> {
        let strategy = self.current_strategy().await?;
        Ok(self
            .generator
            .generate_post_from_draft(draft, &strategy)
            .await?)
    }

    pub async fn posting_time_suggestions(&self) -> Result<Vec<PostingSuggestion>> {
        let strategy = self.current_strategy().await?;
        Ok(self.generator.posting_time_suggestions(&strategy).await?)
    }

    pub async fn next_post_suggestion(&self) -> Result<Option<ScheduleSuggestion>> {
        let strategy = self.current_strategy().await?;
        Ok(self.generator.next_post_suggestion(&strategy).await?)
    }

    pub async fn fetch_trends(&self) -> Result<TrendsResult> {
        let strategy = self.current_strategy().await?;
        Ok(self.generator.fetch_trends(&strategy).await?)
    }

    pub async fn comment_replies(
        &self,
        post_content: &str,
        comment: &str,
    ) -> Result<Vec<CommentReplySuggestion>> {
        let strategy = self.current_strategy().await?;
        Ok(self
            .generator
            .comment_replies(post_content, comment, &strategy)
            .await?)
    }

    pub async fn draft_intro_message(&self, connection_profile: &str) -> Result<String> {
        let strategy = self.current_strategy().await?;
        Ok(self
            .generator
            .draft_intro_message(connection_profile, &strategy)
            .await?)
    }
}
