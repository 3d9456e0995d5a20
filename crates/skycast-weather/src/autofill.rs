//! Debounced city-name autocomplete.
//!
//! [`AutofillCoordinator`] sits between a text input and a [`PlaceLookup`].
//! Every keystroke calls [`AutofillCoordinator::submit`]; a lookup only goes
//! out once input has been quiet for the debounce period, and only the
//! newest lookup is allowed to publish its suggestions.
//!
//! Lookup failures never escape: they log at debug level and publish an
//! empty suggestion list.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::geocode::{PlaceLookup, Suggestion};

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AutofillSettings {
    /// Quiet period before a lookup is dispatched
    pub debounce: Duration,
    /// Suggestions beyond this count are dropped
    pub max_suggestions: usize,
    /// A lookup running longer than this counts as failed
    pub lookup_timeout: Duration,
}

impl Default for AutofillSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }
}

/// Where the coordinator is in its dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A lookup is waiting for the debounce period to elapse
    Scheduled,
    /// The current lookup is on the wire
    AwaitingResponse,
}

#[derive(Debug)]
struct State {
    query: String,
    phase: Phase,
    /// Bumped by every submit, reset and selection. A lookup publishes only
    /// if the generation it was scheduled under is still current.
    generation: u64,
    /// The debounce timer. Taken out when it fires, so a running lookup is
    /// never aborted.
    pending: Option<JoinHandle<()>>,
}

impl State {
    fn advance(&mut self) -> u64 {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
        self.generation += 1;
        self.generation
    }
}

struct Inner {
    lookup: Arc<dyn PlaceLookup>,
    settings: AutofillSettings,
    runtime: Handle,
    state: Mutex<State>,
    suggestions: watch::Sender<Vec<Suggestion>>,
}

impl Inner {
    fn publish(&self, next: Vec<Suggestion>) {
        self.suggestions.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    async fn dispatch_after_quiet(self: Arc<Self>, generation: u64, query: String) {
        tokio::time::sleep(self.settings.debounce).await;

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state.pending = None;
            state.phase = Phase::AwaitingResponse;
        }

        tracing::debug!(generation, "Looking up suggestions for {:?}", query);

        let limit = self.settings.max_suggestions;
        let outcome =
            tokio::time::timeout(self.settings.lookup_timeout, self.lookup.search(&query, limit))
                .await;

        let suggestions = match outcome {
            Ok(Ok(places)) => places.iter().take(limit).map(Suggestion::from).collect(),
            Ok(Err(e)) => {
                tracing::debug!("Suggestion lookup for {:?} failed: {}", query, e);
                Vec::new()
            }
            Err(_) => {
                tracing::debug!(
                    "Suggestion lookup for {:?} timed out after {:?}",
                    query,
                    self.settings.lookup_timeout
                );
                Vec::new()
            }
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(
                generation,
                current = state.generation,
                "Discarding stale suggestions for {:?}",
                query
            );
            return;
        }
        state.phase = Phase::Idle;
        self.publish(suggestions);
    }
}

/// Coalesces keystrokes into geocoding lookups and publishes the newest
/// suggestion list.
///
/// Cloning is cheap; clones share the same timer, generation and
/// suggestion list.
#[derive(Clone)]
pub struct AutofillCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AutofillCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutofillCoordinator")
            .field("settings", &self.inner.settings)
            .field("state", &*self.inner.state.lock())
            .finish_non_exhaustive()
    }
}

impl AutofillCoordinator {
    /// Create a coordinator whose timers and lookups run on `runtime`.
    pub fn new(lookup: Arc<dyn PlaceLookup>, settings: AutofillSettings, runtime: Handle) -> Self {
        let (suggestions, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                lookup,
                settings,
                runtime,
                state: Mutex::new(State {
                    query: String::new(),
                    phase: Phase::Idle,
                    generation: 0,
                    pending: None,
                }),
                suggestions,
            }),
        }
    }

    /// Record new input and (re)start the debounce timer.
    ///
    /// Blank input clears the suggestions right away and schedules nothing.
    pub fn submit(&self, query: &str) {
        let mut state = self.inner.state.lock();
        query.clone_into(&mut state.query);
        let generation = state.advance();

        if query.trim().is_empty() {
            state.phase = Phase::Idle;
            self.inner.publish(Vec::new());
            return;
        }

        state.phase = Phase::Scheduled;
        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        state.pending = Some(
            self.inner
                .runtime
                .spawn(inner.dispatch_after_quiet(generation, query)),
        );
    }

    /// Drop any scheduled lookup and clear the suggestions.
    ///
    /// Called when the user searches without picking a suggestion.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.advance();
        state.query.clear();
        state.phase = Phase::Idle;
        self.inner.publish(Vec::new());
    }

    /// Pick a suggestion by id and return its label.
    ///
    /// Clears the suggestions. Returns `None`, leaving everything as it
    /// was, if no current suggestion has that id.
    pub fn select_suggestion(&self, id: &str) -> Option<String> {
        let mut state = self.inner.state.lock();
        let label = self
            .inner
            .suggestions
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.label.clone())?;

        state.advance();
        state.query.clear();
        state.phase = Phase::Idle;
        self.inner.publish(Vec::new());

        tracing::info!("Selected suggestion {:?}", label);
        Some(label)
    }

    /// Snapshot of the current suggestions
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.inner.suggestions.borrow().clone()
    }

    /// Receiver that is notified whenever the suggestion list changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.inner.suggestions.subscribe()
    }

    pub fn query(&self) -> String {
        self.inner.state.lock().query.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().phase
    }

    pub fn settings(&self) -> &AutofillSettings {
        &self.inner.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::Place;
    use crate::types::GeocodeError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::time::{sleep, Instant};

    const RESULTS_PER_QUERY: usize = 7;

    #[derive(Debug, Clone)]
    struct Call {
        query: String,
        limit: usize,
        at: Duration,
    }

    /// Lookup double with per-query latency. "fail" returns a 500.
    struct FakeLookup {
        started: Instant,
        latency: HashMap<String, Duration>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeLookup {
        fn new(latency: &[(&str, u64)]) -> Arc<Self> {
            Arc::new(Self {
                started: Instant::now(),
                latency: latency
                    .iter()
                    .map(|(q, ms)| (q.to_string(), Duration::from_millis(*ms)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn queries(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c.query).collect()
        }
    }

    #[async_trait]
    impl PlaceLookup for FakeLookup {
        async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
            self.calls.lock().push(Call {
                query: query.to_string(),
                limit,
                at: self.started.elapsed(),
            });

            if let Some(delay) = self.latency.get(query) {
                sleep(*delay).await;
            }

            if query == "fail" {
                return Err(GeocodeError::Status(500));
            }

            Ok((0..RESULTS_PER_QUERY)
                .map(|i| Place {
                    id: format!("{}-{}", query, i),
                    label: format!("{} {}", query, i),
                    latitude: 0.0,
                    longitude: 0.0,
                })
                .collect())
        }
    }

    fn coordinator(fake: &Arc<FakeLookup>) -> AutofillCoordinator {
        AutofillCoordinator::new(fake.clone(), AutofillSettings::default(), Handle::current())
    }

    fn labels(c: &AutofillCoordinator) -> Vec<String> {
        c.suggestions().into_iter().map(|s| s.label).collect()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn one_lookup_after_quiet_period() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Paris");
        assert_eq!(c.phase(), Phase::Scheduled);
        assert_eq!(c.query(), "Paris");

        sleep(ms(450)).await;
        assert!(fake.calls().is_empty());

        sleep(ms(200)).await;
        assert_eq!(fake.queries(), vec!["Paris"]);
        assert_eq!(c.phase(), Phase::Idle);

        sleep(ms(2000)).await;
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn suggestions_are_capped_in_server_order() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Paris");
        sleep(ms(600)).await;

        assert_eq!(fake.calls()[0].limit, DEFAULT_MAX_SUGGESTIONS);
        assert_eq!(
            labels(&c),
            vec!["Paris 0", "Paris 1", "Paris 2", "Paris 3", "Paris 4"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_submits_coalesce_into_latest_query() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Par");
        sleep(ms(200)).await;
        c.submit("Paris");

        // 650ms: "Par" would have fired by now without the restart
        sleep(ms(450)).await;
        assert!(fake.calls().is_empty());

        sleep(ms(150)).await;
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "Paris");
        assert!(calls[0].at >= ms(700) && calls[0].at < ms(705), "fired at {:?}", calls[0].at);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_response_never_overwrites_newer_result() {
        let fake = FakeLookup::new(&[("Lon", 1000), ("London", 10)]);
        let c = coordinator(&fake);

        c.submit("Lon");
        sleep(ms(600)).await;
        assert_eq!(c.phase(), Phase::AwaitingResponse);

        // "Lon" is still in flight until 1500ms
        c.submit("London");
        assert_eq!(c.phase(), Phase::Scheduled);

        sleep(ms(700)).await;
        assert_eq!(labels(&c)[0], "London 0");
        assert_eq!(c.phase(), Phase::Idle);

        sleep(ms(500)).await;
        assert_eq!(fake.queries(), vec!["Lon", "London"]);
        assert_eq!(labels(&c)[0], "London 0");
        assert_eq!(c.suggestions().len(), DEFAULT_MAX_SUGGESTIONS);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_dropped_before_newer_lookup_fires() {
        let fake = FakeLookup::new(&[("Ber", 300)]);
        let c = coordinator(&fake);

        c.submit("Ber");
        sleep(ms(600)).await;
        c.submit("Berlin");

        // "Ber" settles at 800ms, "Berlin" has not fired yet
        sleep(ms(300)).await;
        assert!(c.suggestions().is_empty());
        assert_eq!(c.phase(), Phase::Scheduled);

        sleep(ms(300)).await;
        assert_eq!(labels(&c)[0], "Berlin 0");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_clears_synchronously_without_lookup() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Rome");
        sleep(ms(600)).await;
        assert!(!c.suggestions().is_empty());

        c.submit("   ");
        assert!(c.suggestions().is_empty());
        assert_eq!(c.phase(), Phase::Idle);

        c.submit("");
        sleep(ms(2000)).await;
        assert_eq!(fake.queries(), vec!["Rome"]);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_cancels_pending_lookup() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Rom");
        sleep(ms(100)).await;
        c.submit(" ");

        sleep(ms(2000)).await;
        assert!(fake.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_clears_suggestions() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Oslo");
        sleep(ms(600)).await;
        assert!(!c.suggestions().is_empty());

        c.submit("fail");
        sleep(ms(600)).await;
        assert_eq!(fake.queries(), vec!["Oslo", "fail"]);
        assert!(c.suggestions().is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_timeout_counts_as_failure() {
        let fake = FakeLookup::new(&[("Lima", 20_000)]);
        let c = coordinator(&fake);

        c.submit("Lima");
        sleep(ms(600)).await;
        assert_eq!(c.phase(), Phase::AwaitingResponse);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_timer() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Madrid");
        sleep(ms(200)).await;
        c.reset();

        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.query(), "");
        sleep(ms(2000)).await;
        assert!(fake.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_discards_in_flight_result() {
        let fake = FakeLookup::new(&[("Quito", 1000)]);
        let c = coordinator(&fake);

        c.submit("Quito");
        sleep(ms(600)).await;
        c.reset();

        sleep(ms(2000)).await;
        assert_eq!(fake.queries(), vec!["Quito"]);
        assert!(c.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn select_returns_label_and_clears() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Tokyo");
        sleep(ms(600)).await;
        let id = c.suggestions()[2].id.clone();

        assert_eq!(c.select_suggestion(&id).as_deref(), Some("Tokyo 2"));
        assert!(c.suggestions().is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn select_unknown_id_leaves_suggestions() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);

        c.submit("Cairo");
        sleep(ms(600)).await;

        assert_eq!(c.select_suggestion("nope"), None);
        assert_eq!(c.suggestions().len(), DEFAULT_MAX_SUGGESTIONS);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_published_suggestions() {
        let fake = FakeLookup::new(&[]);
        let c = coordinator(&fake);
        let mut rx = c.subscribe();

        c.submit("Dublin");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].label, "Dublin 0");

        c.reset();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }
}
