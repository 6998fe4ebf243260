//! End-to-end workflow tests over an in-memory store and a stub
//! generator: onboarding, persistence, resume, and recovery behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use brand_assist::error::{Error, GenerationError, SessionError, StorageError, ValidationError};
use brand_assist::generator::{ProfileScraper, StrategyGenerator};
use brand_assist::identity::{GUEST_EMAIL, Identity};
use brand_assist::model::{
    CommentReplySuggestion, OnboardingData, PostDraft, PostIdea, PostingSuggestion,
    ScheduleSuggestion, ScrapedProfile, Strategy, TrendsResult,
};
use brand_assist::session::{AppStep, Workflow, reconcile};
use brand_assist::store::{Key, KeyValueStore, MemoryStore};

struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// Deterministic generator. `fail_next` makes the next call fail;
/// `idea_batch` makes every idea regeneration produce a distinct set;
/// `hold_next_call` parks the next analysis or idea call on a gate so a
/// test can interleave other events while the request is in flight.
#[derive(Default)]
struct StubGenerator {
    fail_next: AtomicBool,
    idea_batch: AtomicUsize,
    hold: std::sync::Mutex<Option<Gate>>,
}

impl StubGenerator {
    fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Park the next gated call. Returns `(entered, release)`: `entered`
    /// fires once the call is in flight, `release` lets it finish.
    fn hold_next_call(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(Gate {
            entered: entered.clone(),
            release: release.clone(),
        });
        (entered, release)
    }

    async fn wait_if_held(&self) {
        let gate = self.hold.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }

    fn check_failure(&self) -> Result<(), GenerationError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GenerationError::RequestFailed {
                reason: "stubbed outage".to_string(),
            });
        }
        Ok(())
    }
}

fn ideas(batch: usize) -> Vec<PostIdea> {
    (0..5)
        .map(|i| PostIdea {
            title: format!("Idea {batch}-{i}"),
            description: format!("Description {batch}-{i}"),
        })
        .collect()
}

#[async_trait]
impl StrategyGenerator for StubGenerator {
    async fn suggest_onboarding(
        &self,
        profile_text: &str,
    ) -> Result<OnboardingData, GenerationError> {
        self.wait_if_held().await;
        self.check_failure()?;
        Ok(OnboardingData {
            industry: "Software".to_string(),
            goal: "Establish thought leadership".to_string(),
            topics: format!("topics from: {}", &profile_text[..profile_text.len().min(10)]),
            tone: "Professional".to_string(),
            target_audience: "Engineering leaders".to_string(),
        })
    }

    async fn build_strategy(&self, input: &OnboardingData) -> Result<Strategy, GenerationError> {
        self.check_failure()?;
        Ok(Strategy {
            summary: format!("Strategy for {}", input.industry),
            content_pillars: vec!["One".into(), "Two".into(), "Three".into()],
            tone: input.tone.clone(),
            target_audience: input.target_audience.clone(),
            post_ideas: ideas(0),
        })
    }

    async fn regenerate_ideas(
        &self,
        _strategy: &Strategy,
    ) -> Result<Vec<PostIdea>, GenerationError> {
        self.wait_if_held().await;
        self.check_failure()?;
        let batch = self.idea_batch.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ideas(batch))
    }

    async fn generate_post(
        &self,
        idea: &PostIdea,
        _strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.check_failure()?;
        Ok(format!("Post about {}", idea.title))
    }

    async fn generate_post_from_draft(
        &self,
        draft: &PostDraft,
        _strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.check_failure()?;
        Ok(format!("Post from draft {}", draft.title))
    }

    async fn posting_time_suggestions(
        &self,
        _strategy: &Strategy,
    ) -> Result<Vec<PostingSuggestion>, GenerationError> {
        self.check_failure()?;
        Ok(vec![PostingSuggestion {
            day: "Tuesday".into(),
            time: "9:00 AM - 11:00 AM EST".into(),
        }])
    }

    async fn next_post_suggestion(
        &self,
        strategy: &Strategy,
    ) -> Result<Option<ScheduleSuggestion>, GenerationError> {
        self.check_failure()?;
        Ok(strategy.post_ideas.first().map(|idea| ScheduleSuggestion {
            post_title: idea.title.clone(),
            reason: "First in line".into(),
        }))
    }

    async fn fetch_trends(&self, _strategy: &Strategy) -> Result<TrendsResult, GenerationError> {
        self.check_failure()?;
        Ok(TrendsResult {
            trends: vec![],
            sources: vec![],
        })
    }

    async fn comment_replies(
        &self,
        _post_content: &str,
        _comment: &str,
        _strategy: &Strategy,
    ) -> Result<Vec<CommentReplySuggestion>, GenerationError> {
        self.check_failure()?;
        Ok(vec![CommentReplySuggestion {
            style: "Insightful".into(),
            reply: "Good point.".into(),
        }])
    }

    async fn draft_intro_message(
        &self,
        _connection_profile: &str,
        _strategy: &Strategy,
    ) -> Result<String, GenerationError> {
        self.check_failure()?;
        Ok("Hi, great to connect.".into())
    }
}

struct StubScraper;

#[async_trait]
impl ProfileScraper for StubScraper {
    async fn scrape(&self, _url: &str) -> Result<ScrapedProfile, GenerationError> {
        Ok(ScrapedProfile {
            name: "Jordan".into(),
            headline: "Engineer".into(),
            about: "I build distributed systems.".into(),
        })
    }
}

/// Store that can fail its next write, for persistence-failure paths.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_next_set: AtomicBool,
}

impl FlakyStore {
    fn fail_next_set(&self) {
        self.fail_next_set.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &Key) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &Key, value: &str) -> Result<(), StorageError> {
        if self.fail_next_set.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Query("injected write failure".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &Key) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear().await
    }
}

fn harness() -> (Arc<MemoryStore>, Arc<StubGenerator>, Workflow) {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(StubGenerator::default());
    let workflow = Workflow::new(store.clone(), generator.clone());
    (store, generator, workflow)
}

async fn onboard_to_dashboard(workflow: &Workflow) -> OnboardingData {
    workflow
        .submit_profile_text("I build distributed systems.")
        .await
        .unwrap();
    let suggestions = workflow.state().await.suggestions.unwrap();
    workflow.submit_review(suggestions.clone()).await.unwrap();
    suggestions
}

#[tokio::test]
async fn fresh_sign_in_lands_on_profile_input() {
    let (_store, _generator, workflow) = harness();
    workflow.resume().await.unwrap();
    assert_eq!(workflow.step().await, AppStep::Unauthenticated);

    let step = workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    assert_eq!(step, AppStep::ProfileInput);
}

#[tokio::test]
async fn happy_path_persists_aggregate_and_resumes() {
    let (store, generator, workflow) = harness();
    workflow.resume().await.unwrap();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();

    workflow
        .submit_profile_text("I build distributed systems.")
        .await
        .unwrap();
    assert_eq!(workflow.step().await, AppStep::ReviewSuggestions);

    // Edit the suggestions before submitting
    let mut input = workflow.state().await.suggestions.unwrap();
    input.target_audience = "CTOs at seed-stage startups".to_string();
    let step = workflow.submit_review(input.clone()).await.unwrap();
    assert_eq!(step, AppStep::Dashboard);

    let aggregate = workflow.state().await.aggregate.unwrap();
    // Echo contract: the audience comes back verbatim
    assert_eq!(aggregate.strategy.target_audience, input.target_audience);
    assert_eq!(aggregate.onboarding_data, input);
    assert_eq!(aggregate.profile_text, "I build distributed systems.");

    // A second process sees exactly the same aggregate
    let resumed = Workflow::new(store, generator);
    let step = resumed.resume().await.unwrap();
    assert_eq!(step, AppStep::Dashboard);
    assert_eq!(resumed.state().await.aggregate.unwrap(), aggregate);
}

#[tokio::test]
async fn profile_url_scrape_feeds_analysis() {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(StubGenerator::default());
    let workflow =
        Workflow::new(store, generator).with_scraper(Arc::new(StubScraper));
    workflow.continue_as_guest().await.unwrap();

    let step = workflow
        .submit_profile_url("https://linkedin.com/in/jordan")
        .await
        .unwrap();
    assert_eq!(step, AppStep::ReviewSuggestions);
    let state = workflow.state().await;
    assert_eq!(state.profile_text, "I build distributed systems.");
    assert_eq!(state.profile_url, "https://linkedin.com/in/jordan");
}

#[tokio::test]
async fn invalid_profile_url_is_rejected_without_state_change() {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(StubGenerator::default());
    let workflow =
        Workflow::new(store, generator).with_scraper(Arc::new(StubScraper));
    workflow.continue_as_guest().await.unwrap();

    let result = workflow.submit_profile_url("https://example.com/jordan").await;
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::InvalidProfileUrl(_)))
    ));
    assert_eq!(workflow.step().await, AppStep::ProfileInput);
}

#[tokio::test]
async fn empty_profile_text_is_rejected_without_state_change() {
    let (_store, _generator, workflow) = harness();
    workflow.continue_as_guest().await.unwrap();

    let result = workflow.submit_profile_text("   ").await;
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::EmptyProfileText))
    ));
    assert_eq!(workflow.step().await, AppStep::ProfileInput);
}

#[tokio::test]
async fn generation_failure_returns_to_review_with_data_intact() {
    let (store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    workflow
        .submit_profile_text("I build distributed systems.")
        .await
        .unwrap();
    let input = workflow.state().await.suggestions.unwrap();

    generator.fail_next();
    let result = workflow.submit_review(input.clone()).await;
    assert!(result.is_err());

    // Back at review with the error attached; suggestions survive
    let state = workflow.state().await;
    assert_eq!(state.step, AppStep::ReviewSuggestions);
    assert!(state.error.is_some());
    assert_eq!(state.suggestions.unwrap(), input);
    // Nothing was persisted
    assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_none());

    // Retry succeeds
    let step = workflow.submit_review(input).await.unwrap();
    assert_eq!(step, AppStep::Dashboard);
    assert!(workflow.state().await.error.is_none());
}

#[tokio::test]
async fn analysis_failure_returns_to_profile_input() {
    let (_store, generator, workflow) = harness();
    workflow.continue_as_guest().await.unwrap();

    generator.fail_next();
    let result = workflow.submit_profile_text("some about text").await;
    assert!(result.is_err());

    let state = workflow.state().await;
    assert_eq!(state.step, AppStep::ProfileInput);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn idea_regeneration_replaces_list_wholesale_and_persists() {
    let (store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;
    let before = workflow.state().await.aggregate.unwrap();

    let new_ideas = workflow.regenerate_ideas().await.unwrap();
    assert_eq!(new_ideas.len(), 5);
    for idea in &new_ideas {
        assert!(!before.strategy.post_ideas.contains(idea));
    }

    let after = workflow.state().await.aggregate.unwrap();
    assert_eq!(after.strategy.post_ideas, new_ideas);
    // Everything else is untouched
    assert_eq!(after.strategy.summary, before.strategy.summary);
    assert_eq!(after.onboarding_data, before.onboarding_data);

    // The replacement reached the store
    let resumed = Workflow::new(store, generator);
    resumed.resume().await.unwrap();
    assert_eq!(
        resumed.state().await.aggregate.unwrap().strategy.post_ideas,
        new_ideas
    );
}

#[tokio::test]
async fn idea_regeneration_failure_keeps_aggregate() {
    let (_store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;
    let before = workflow.state().await.aggregate.unwrap();

    generator.fail_next();
    assert!(workflow.regenerate_ideas().await.is_err());

    assert_eq!(workflow.step().await, AppStep::Dashboard);
    assert_eq!(workflow.state().await.aggregate.unwrap(), before);
}

#[tokio::test]
async fn start_over_requires_confirmation() {
    let (store, _generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;

    let result = workflow.start_over(false).await;
    assert!(matches!(
        result,
        Err(Error::Session(SessionError::NotConfirmed))
    ));
    // Nothing changed
    assert_eq!(workflow.step().await, AppStep::Dashboard);
    assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_some());
}

#[tokio::test]
async fn confirmed_start_over_wipes_owned_keys_but_keeps_identity() {
    let (store, _generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;

    // Seed the dependent collections
    store
        .set(&Key::scheduled_posts("a@x.com"), "[]")
        .await
        .unwrap();
    store.set(&Key::follow_count("a@x.com"), "3").await.unwrap();

    let step = workflow.start_over(true).await.unwrap();
    assert_eq!(step, AppStep::ProfileInput);

    for key in Key::owned_by("a@x.com") {
        assert!(store.get(&key).await.unwrap().is_none(), "{key} not wiped");
    }
    // Still signed in
    assert!(store.get(&Key::identity()).await.unwrap().is_some());
    assert_eq!(workflow.state().await.identity.unwrap().email, "a@x.com");
}

#[tokio::test]
async fn logout_keeps_aggregate_for_next_sign_in() {
    let (store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    let input = onboard_to_dashboard(&workflow).await;

    let step = workflow.logout().await.unwrap();
    assert_eq!(step, AppStep::Unauthenticated);
    assert!(store.get(&Key::identity()).await.unwrap().is_none());
    assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_some());

    // Signing back in goes straight to the dashboard
    let again = Workflow::new(store, generator);
    let step = again.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    assert_eq!(step, AppStep::Dashboard);
    assert_eq!(
        again.state().await.aggregate.unwrap().onboarding_data,
        input
    );
}

#[tokio::test]
async fn guest_session_is_resumable_via_fallback() {
    let (store, generator, workflow) = harness();
    workflow.continue_as_guest().await.unwrap();
    onboard_to_dashboard(&workflow).await;

    // The guest never writes the identity key
    assert!(store.get(&Key::identity()).await.unwrap().is_none());
    assert!(store.get(&Key::profile(GUEST_EMAIL)).await.unwrap().is_some());

    let resumed = Workflow::new(store, generator);
    let step = resumed.resume().await.unwrap();
    assert_eq!(step, AppStep::Dashboard);
    assert!(resumed.state().await.identity.unwrap().is_guest());
}

#[tokio::test]
async fn guest_reauth_clears_memory_but_not_storage() {
    let (store, _generator, workflow) = harness();
    workflow.continue_as_guest().await.unwrap();
    onboard_to_dashboard(&workflow).await;

    let step = workflow.request_reauth().await.unwrap();
    assert_eq!(step, AppStep::Unauthenticated);
    assert!(workflow.state().await.identity.is_none());
    // The guest aggregate stays recoverable
    assert!(store.get(&Key::profile(GUEST_EMAIL)).await.unwrap().is_some());
}

#[tokio::test]
async fn aggregates_are_owned_exclusively_per_identity() {
    let (store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;
    workflow.logout().await.unwrap();

    // A different identity starts from scratch
    let other = Workflow::new(store.clone(), generator);
    let step = other.sign_in(Identity::new("b@x.com", "B")).await.unwrap();
    assert_eq!(step, AppStep::ProfileInput);
    assert!(other.state().await.aggregate.is_none());
    // The first identity's data is untouched
    assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_some());
}

#[tokio::test]
async fn corrupt_aggregate_never_crashes_resume() {
    let (store, generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;

    store
        .set(&Key::profile("a@x.com"), "{\"strategy\": 12}")
        .await
        .unwrap();

    let resumed = Workflow::new(store.clone(), generator);
    let step = resumed.resume().await.unwrap();
    assert_eq!(step, AppStep::ProfileInput);
    // The corrupt entry was discarded
    assert!(store.get(&Key::profile("a@x.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn regenerate_strategy_replaces_aggregate_atomically() {
    let (_store, _generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    let input = onboard_to_dashboard(&workflow).await;
    let before = workflow.state().await.aggregate.unwrap();

    let mut edited = input.clone();
    edited.industry = "Fintech".to_string();
    let strategy = workflow.regenerate_strategy(edited.clone()).await.unwrap();
    assert_eq!(strategy.summary, "Strategy for Fintech");

    let after = workflow.state().await.aggregate.unwrap();
    assert_eq!(after.strategy, strategy);
    assert_eq!(after.onboarding_data, edited);
    // Source text carries over from the previous aggregate
    assert_eq!(after.profile_text, before.profile_text);
    assert_eq!(workflow.step().await, AppStep::Dashboard);
}

#[tokio::test]
async fn dashboard_events_rejected_outside_dashboard() {
    let (_store, _generator, workflow) = harness();
    workflow.continue_as_guest().await.unwrap();

    let result = workflow.regenerate_ideas().await;
    assert!(matches!(
        result,
        Err(Error::Session(SessionError::InvalidStep { .. }))
    ));
}

#[tokio::test]
async fn stale_analysis_response_is_discarded() {
    let (_store, generator, workflow) = harness();
    let workflow = Arc::new(workflow);
    workflow.continue_as_guest().await.unwrap();

    let (entered, release) = generator.hold_next_call();
    let in_flight = tokio::spawn({
        let workflow = workflow.clone();
        async move {
            workflow
                .submit_profile_text("I build distributed systems.")
                .await
        }
    });
    entered.notified().await;
    assert_eq!(workflow.step().await, AppStep::AnalyzingProfile);

    // The user abandons the analysis and restarts as guest
    workflow.continue_as_guest().await.unwrap();
    assert_eq!(workflow.step().await, AppStep::ProfileInput);

    // Releasing the parked response must not move the session
    release.notify_one();
    let step = in_flight.await.unwrap().unwrap();
    assert_eq!(step, AppStep::ProfileInput);

    let state = workflow.state().await;
    assert_eq!(state.step, AppStep::ProfileInput);
    assert!(state.suggestions.is_none());
    assert!(state.profile_text.is_empty());
}

#[tokio::test]
async fn stale_idea_regeneration_is_not_applied() {
    let (store, generator, workflow) = harness();
    let workflow = Arc::new(workflow);
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(workflow.as_ref()).await;
    let persisted_before = store.get(&Key::profile("a@x.com")).await.unwrap();

    let (entered, release) = generator.hold_next_call();
    let in_flight = tokio::spawn({
        let workflow = workflow.clone();
        async move { workflow.regenerate_ideas().await }
    });
    entered.notified().await;

    // Logging out invalidates the in-flight regeneration
    workflow.logout().await.unwrap();
    release.notify_one();
    in_flight.await.unwrap().unwrap();

    // Neither memory nor store took the stale ideas
    assert!(workflow.state().await.aggregate.is_none());
    assert_eq!(
        store.get(&Key::profile("a@x.com")).await.unwrap(),
        persisted_before
    );
}

#[tokio::test]
async fn failed_idea_persist_keeps_memory_and_store_consistent() {
    let store = Arc::new(FlakyStore::default());
    let generator = Arc::new(StubGenerator::default());
    let workflow = Workflow::new(store.clone(), generator);
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;
    let before = workflow.state().await.aggregate.unwrap();
    let persisted_before = store.get(&Key::profile("a@x.com")).await.unwrap();

    store.fail_next_set();
    assert!(workflow.regenerate_ideas().await.is_err());

    // The in-memory aggregate did not get ahead of the store
    assert_eq!(workflow.state().await.aggregate.unwrap(), before);
    assert_eq!(
        store.get(&Key::profile("a@x.com")).await.unwrap(),
        persisted_before
    );
    assert_eq!(workflow.step().await, AppStep::Dashboard);
}

#[tokio::test]
async fn reconcile_matches_workflow_resume() {
    let (store, _generator, workflow) = harness();
    workflow.sign_in(Identity::new("a@x.com", "A")).await.unwrap();
    onboard_to_dashboard(&workflow).await;

    let state = reconcile(store.as_ref()).await.unwrap();
    assert_eq!(state.step, AppStep::Dashboard);
    assert_eq!(state.identity.unwrap().email, "a@x.com");
}
