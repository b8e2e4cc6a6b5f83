//! Scrape-job polling: the client-side lifecycle of one backend job.
//!
//! A scrape runs on the backend for an indeterminate time and is observable
//! only through `GET /scrape/status`. The poller starts the job (or adopts one
//! already in flight), probes status on a fixed interval from a single timer
//! task, and settles exactly once when the job stops running so the owning
//! view can refresh its dependent data. Every session is stamped with an
//! epoch; responses that arrive after the session was cancelled or superseded
//! carry a stale epoch and are dropped without touching state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::core::api::types::{ScrapeAck, ScrapeStatus};
use crate::core::api::{ApiClient, ApiError};

/// Fixed probe interval while a job is running.
pub const POLL_PERIOD: Duration = Duration::from_secs(3);

/// The two endpoints the poller is allowed to touch. The API client is the
/// production implementation; tests script one.
#[async_trait]
pub trait JobMonitor: Send + Sync + 'static {
    async fn trigger(&self) -> Result<ScrapeAck, ApiError>;
    async fn status(&self) -> Result<ScrapeStatus, ApiError>;
}

#[async_trait]
impl JobMonitor for ApiClient {
    async fn trigger(&self) -> Result<ScrapeAck, ApiError> {
        self.trigger_scrape().await
    }

    async fn status(&self) -> Result<ScrapeStatus, ApiError> {
        self.scrape_status().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Starting,
    Polling,
    Reconciling,
}

pub fn can_transition(from: PollState, to: PollState) -> bool {
    use PollState::*;
    matches!(
        (from, to),
        (Idle, Starting)
            | (Starting, Polling)
            | (Starting, Idle)
            | (Polling, Polling)
            | (Polling, Reconciling)
            | (Polling, Idle)
            | (Reconciling, Idle)
    )
}

#[derive(Debug)]
enum PollEvent {
    Status { epoch: u64, status: ScrapeStatus },
    Failed { epoch: u64 },
}

impl PollEvent {
    fn epoch(&self) -> u64 {
        match self {
            PollEvent::Status { epoch, .. } | PollEvent::Failed { epoch } => *epoch,
        }
    }
}

/// State change surfaced to the owning view by `pump`.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerUpdate {
    /// Job still running; the displayed message changed.
    Progress { message: String },
    /// Job reached a terminal outcome. The caller must refresh its dependent
    /// data and then call `reconciled`. Success iff `scraped > 0`.
    Settled { message: String, scraped: u64 },
    /// A status probe failed at the transport level; the session is over and
    /// the outcome is unknown. No reconciliation happens.
    Aborted,
}

pub struct ScrapePoller {
    monitor: Arc<dyn JobMonitor>,
    period: Duration,
    state: PollState,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<PollEvent>,
    rx: mpsc::UnboundedReceiver<PollEvent>,
    message: String,
}

impl ScrapePoller {
    pub fn new(monitor: Arc<dyn JobMonitor>) -> Self {
        Self::with_period(monitor, POLL_PERIOD)
    }

    pub fn with_period(monitor: Arc<dyn JobMonitor>, period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            monitor,
            period,
            state: PollState::Idle,
            epoch: 0,
            timer: None,
            tx,
            rx,
            message: String::new(),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// True while a session is live (job triggered or adopted, not settled).
    pub fn is_active(&self) -> bool {
        matches!(self.state, PollState::Starting | PollState::Polling)
    }

    /// Last status message observed for the current session.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trigger the job and enter polling. A previous session, if any, is
    /// cancelled before anything else happens. On a rejected trigger the
    /// poller returns to `Idle` and no timer is scheduled.
    pub async fn start(&mut self) -> Result<String, ApiError> {
        self.cancel();
        self.transition(PollState::Starting);
        match self.monitor.trigger().await {
            Ok(ack) => {
                self.message = ack.message.clone();
                self.begin_polling();
                Ok(ack.message)
            }
            Err(err) => {
                self.transition(PollState::Idle);
                Err(err)
            }
        }
    }

    /// Mount-time discovery: probe status once and, when a job is already
    /// running, adopt it without touching the trigger endpoint. A failed
    /// probe is ignored; it must not block the view.
    pub async fn discover(&mut self) -> Option<String> {
        if self.state != PollState::Idle {
            return None;
        }
        match self.monitor.status().await {
            Ok(status) if status.running => {
                self.transition(PollState::Starting);
                self.message = status.message.clone();
                self.begin_polling();
                Some(status.message)
            }
            Ok(_) => None,
            Err(err) => {
                debug!("mount-time status probe failed: {}", err);
                None
            }
        }
    }

    fn begin_polling(&mut self) {
        self.transition(PollState::Polling);
        self.epoch += 1;
        let epoch = self.epoch;
        let monitor = self.monitor.clone();
        let tx = self.tx.clone();
        let period = self.period;

        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // A probe still in flight when the next tick lands must not cause
            // a second outstanding request; the late tick fires after it.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; the first probe belongs one period out.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match monitor.status().await {
                    Ok(status) => {
                        let settled = !status.running;
                        if tx.send(PollEvent::Status { epoch, status }).is_err() || settled {
                            break;
                        }
                    }
                    Err(err) => {
                        debug!("status poll failed, ending session: {}", err);
                        let _ = tx.send(PollEvent::Failed { epoch });
                        break;
                    }
                }
            }
        }));
    }

    /// Drain poll events that arrived since the last call and fold them into
    /// the state machine. Called from the owning view's loop.
    pub fn pump(&mut self) -> Vec<PollerUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if let Some(update) = self.apply(event) {
                updates.push(update);
            }
        }
        updates
    }

    fn apply(&mut self, event: PollEvent) -> Option<PollerUpdate> {
        if event.epoch() != self.epoch || self.state != PollState::Polling {
            // Stale: the session this response belongs to was already
            // cancelled or has settled.
            return None;
        }
        match event {
            PollEvent::Status { status, .. } => {
                self.message = status.message.clone();
                if status.running {
                    Some(PollerUpdate::Progress { message: status.message })
                } else {
                    // Cancel the timer before anything else; the transition
                    // and the cancellation must be one atomic step.
                    self.stop_timer();
                    self.transition(PollState::Reconciling);
                    Some(PollerUpdate::Settled {
                        message: status.message,
                        scraped: status.scraped,
                    })
                }
            }
            PollEvent::Failed { .. } => {
                self.cancel();
                Some(PollerUpdate::Aborted)
            }
        }
    }

    /// The owner finished refreshing dependent data after `Settled`.
    pub fn reconciled(&mut self) {
        if self.state == PollState::Reconciling {
            self.transition(PollState::Idle);
        }
    }

    /// Idempotent teardown: abort the timer, invalidate outstanding
    /// responses, return to `Idle`. Used on unmount and before re-start.
    pub fn cancel(&mut self) {
        self.stop_timer();
        self.epoch += 1;
        if self.state != PollState::Idle {
            self.transition(PollState::Idle);
        }
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn transition(&mut self, to: PollState) {
        debug_assert!(
            can_transition(self.state, to),
            "illegal poll transition {:?} -> {:?}",
            self.state,
            to
        );
        self.state = to;
    }
}

impl Drop for ScrapePoller {
    fn drop(&mut self) {
        self.stop_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Instant, sleep};

    const TICK: Duration = Duration::from_millis(20);

    fn running(message: &str) -> ScrapeStatus {
        ScrapeStatus { running: true, message: message.to_string(), scraped: 0 }
    }

    fn done(message: &str, scraped: u64) -> ScrapeStatus {
        ScrapeStatus { running: false, message: message.to_string(), scraped }
    }

    /// Monitor that replays a scripted sequence of status responses. Once the
    /// script runs dry it keeps reporting the last running status.
    struct ScriptedMonitor {
        script: Mutex<VecDeque<Result<ScrapeStatus, ApiError>>>,
        trigger_calls: AtomicUsize,
        status_calls: AtomicUsize,
    }

    impl ScriptedMonitor {
        fn new(script: Vec<Result<ScrapeStatus, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                trigger_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl JobMonitor for ScriptedMonitor {
        async fn trigger(&self) -> Result<ScrapeAck, ApiError> {
            self.trigger_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScrapeAck {
                status: "started".to_string(),
                message: "Scraping started for 2 topics.".to_string(),
            })
        }

        async fn status(&self) -> Result<ScrapeStatus, ApiError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(running("still going")))
        }
    }

    /// Pump until a terminal update shows up or the deadline passes.
    async fn pump_until_settled(
        poller: &mut ScrapePoller,
        deadline: Duration,
    ) -> Vec<PollerUpdate> {
        let mut seen = Vec::new();
        let limit = Instant::now() + deadline;
        loop {
            for update in poller.pump() {
                let terminal = matches!(
                    update,
                    PollerUpdate::Settled { .. } | PollerUpdate::Aborted
                );
                seen.push(update);
                if terminal {
                    return seen;
                }
            }
            if Instant::now() >= limit {
                return seen;
            }
            sleep(Duration::from_millis(5)).await;
        }
    }

    #[test]
    fn transition_table_allows_the_lifecycle_path() {
        use PollState::*;
        for (from, to) in [
            (Idle, Starting),
            (Starting, Polling),
            (Polling, Polling),
            (Polling, Reconciling),
            (Reconciling, Idle),
        ] {
            assert!(can_transition(from, to), "expected {from:?} -> {to:?}");
        }
    }

    #[test]
    fn transition_table_rejects_shortcuts() {
        use PollState::*;
        assert!(!can_transition(Idle, Polling), "polling requires a start");
        assert!(!can_transition(Idle, Reconciling));
        assert!(!can_transition(Reconciling, Polling), "settled sessions stay settled");
        assert!(!can_transition(Starting, Reconciling));
    }

    #[tokio::test]
    async fn scrape_completes_and_settles_exactly_once() {
        // Three running probes, then done with 5 items.
        let monitor = ScriptedMonitor::new(vec![
            Ok(running("Scraping r/foo...")),
            Ok(running("Scraping r/foo...")),
            Ok(running("Scraping r/bar...")),
            Ok(done("Done! Scraped 5 posts across 2 topics.", 5)),
        ]);
        let mut poller = ScrapePoller::with_period(monitor.clone(), TICK);

        let ack = poller.start().await.expect("trigger accepted");
        assert_eq!(ack, "Scraping started for 2 topics.");
        assert_eq!(poller.state(), PollState::Polling);

        let updates = pump_until_settled(&mut poller, Duration::from_secs(2)).await;
        let settled: Vec<_> = updates
            .iter()
            .filter(|u| matches!(u, PollerUpdate::Settled { .. }))
            .collect();
        assert_eq!(settled.len(), 1, "reconciliation must fire exactly once");
        assert_eq!(
            *settled[0],
            PollerUpdate::Settled {
                message: "Done! Scraped 5 posts across 2 topics.".to_string(),
                scraped: 5
            }
        );
        assert_eq!(poller.state(), PollState::Reconciling);

        poller.reconciled();
        assert_eq!(poller.state(), PollState::Idle);
        assert!(!poller.is_active());

        // The timer died with the terminal observation; no further probes.
        let probes = monitor.status_calls.load(Ordering::SeqCst);
        sleep(TICK * 4).await;
        assert_eq!(monitor.status_calls.load(Ordering::SeqCst), probes);
        assert!(poller.pump().is_empty());
    }

    #[tokio::test]
    async fn empty_scrape_settles_as_failure_material() {
        // Terminal with zero items is still a settle; the caller styles it as a failure.
        let monitor = ScriptedMonitor::new(vec![Ok(done("Done! Scraped 0 posts across 1 topics.", 0))]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        poller.start().await.expect("trigger accepted");

        let updates = pump_until_settled(&mut poller, Duration::from_secs(2)).await;
        match updates.last() {
            Some(PollerUpdate::Settled { scraped, .. }) => assert_eq!(*scraped, 0),
            other => panic!("expected Settled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_ends_session_without_reconciliation() {
        let monitor = ScriptedMonitor::new(vec![
            Ok(running("Scraping r/foo...")),
            Err(ApiError::Transport("connection refused".to_string())),
        ]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        poller.start().await.expect("trigger accepted");

        let updates = pump_until_settled(&mut poller, Duration::from_secs(2)).await;
        assert_eq!(updates.last(), Some(&PollerUpdate::Aborted));
        assert!(
            !updates.iter().any(|u| matches!(u, PollerUpdate::Settled { .. })),
            "no reconciliation on transport failure"
        );
        assert_eq!(poller.state(), PollState::Idle);
        assert!(!poller.is_active(), "must not claim running forever");
    }

    #[tokio::test]
    async fn rejected_trigger_leaves_poller_idle() {
        struct RejectingTrigger;

        #[async_trait]
        impl JobMonitor for RejectingTrigger {
            async fn trigger(&self) -> Result<ScrapeAck, ApiError> {
                Err(ApiError::Rejected(
                    "Reddit API credentials not set. Go to Settings to add them.".to_string(),
                ))
            }
            async fn status(&self) -> Result<ScrapeStatus, ApiError> {
                panic!("rejected trigger must not start polling");
            }
        }

        let mut poller = ScrapePoller::with_period(Arc::new(RejectingTrigger), TICK);
        let err = poller.start().await.expect_err("trigger rejected");
        assert!(matches!(err, ApiError::Rejected(_)));
        assert_eq!(poller.state(), PollState::Idle);
        sleep(TICK * 3).await;
        assert!(poller.pump().is_empty(), "no timer was scheduled");
    }

    #[tokio::test]
    async fn discover_adopts_running_job_without_triggering() {
        // Mount adoption: the trigger endpoint must never be hit.
        let monitor = ScriptedMonitor::new(vec![
            Ok(running("Scraping topic: AI...")),
            Ok(done("Done! Scraped 3 posts across 1 topics.", 3)),
        ]);
        let mut poller = ScrapePoller::with_period(monitor.clone(), TICK);

        let adopted = poller.discover().await;
        assert_eq!(adopted.as_deref(), Some("Scraping topic: AI..."));
        assert_eq!(poller.state(), PollState::Polling);
        assert_eq!(monitor.trigger_calls.load(Ordering::SeqCst), 0);

        let updates = pump_until_settled(&mut poller, Duration::from_secs(2)).await;
        assert!(matches!(updates.last(), Some(PollerUpdate::Settled { scraped: 3, .. })));
    }

    #[tokio::test]
    async fn discover_ignores_idle_backend_and_probe_failures() {
        let monitor = ScriptedMonitor::new(vec![Ok(done("No scrape run yet.", 0))]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        assert_eq!(poller.discover().await, None);
        assert_eq!(poller.state(), PollState::Idle);

        let failing = ScriptedMonitor::new(vec![Err(ApiError::Transport("down".to_string()))]);
        let mut poller = ScrapePoller::with_period(failing, TICK);
        assert_eq!(poller.discover().await, None);
        assert_eq!(poller.state(), PollState::Idle);
    }

    #[tokio::test]
    async fn restart_supersedes_previous_session() {
        // A second start invalidates the first session's epoch: anything the
        // first timer had in flight is dropped as stale.
        let monitor = ScriptedMonitor::new(vec![Ok(running("first session"))]);
        let mut poller = ScrapePoller::with_period(monitor.clone(), TICK);

        poller.start().await.expect("first start");
        let first_epoch = poller.epoch;
        // Let the first session deliver at least one event, unconsumed.
        sleep(TICK * 3).await;

        poller.start().await.expect("second start");
        assert!(poller.epoch > first_epoch);
        assert_eq!(poller.state(), PollState::Polling);
        assert!(poller.timer.is_some(), "exactly one live timer handle");

        // Everything queued by the first session is stale now.
        let stale = poller.apply(PollEvent::Status {
            epoch: first_epoch,
            status: done("late terminal from dead session", 9),
        });
        assert_eq!(stale, None);
        assert_eq!(poller.state(), PollState::Polling, "stale event must not mutate state");
    }

    #[tokio::test]
    async fn cancelled_session_drops_late_responses() {
        let monitor = ScriptedMonitor::new(vec![Ok(running("going"))]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        poller.start().await.expect("start");
        let live_epoch = poller.epoch;

        poller.cancel();
        assert_eq!(poller.state(), PollState::Idle);

        let late = poller.apply(PollEvent::Status {
            epoch: live_epoch,
            status: done("finished after unmount", 4),
        });
        assert_eq!(late, None, "no state mutation after cancellation");
        assert_eq!(poller.message(), "going");

        // cancel is idempotent
        poller.cancel();
        poller.cancel();
        assert_eq!(poller.state(), PollState::Idle);
    }

    #[tokio::test]
    async fn second_terminal_observation_is_suppressed() {
        let monitor = ScriptedMonitor::new(vec![]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        poller.start().await.expect("start");
        let epoch = poller.epoch;

        let first = poller.apply(PollEvent::Status { epoch, status: done("done", 2) });
        assert!(matches!(first, Some(PollerUpdate::Settled { scraped: 2, .. })));
        assert_eq!(poller.state(), PollState::Reconciling);

        // Same-epoch duplicate while reconciling: dropped by the state guard.
        let second = poller.apply(PollEvent::Status { epoch, status: done("done", 2) });
        assert_eq!(second, None, "reconciliation must not run twice");

        poller.reconciled();
        let after_idle = poller.apply(PollEvent::Status { epoch, status: done("done", 2) });
        assert_eq!(after_idle, None);
    }

    #[tokio::test]
    async fn progress_updates_surface_latest_message() {
        let monitor = ScriptedMonitor::new(vec![
            Ok(running("Connecting to Reddit...")),
            Ok(running("Scraping topic: AI...")),
            Ok(done("Done! Scraped 2 posts across 1 topics.", 2)),
        ]);
        let mut poller = ScrapePoller::with_period(monitor, TICK);
        poller.start().await.expect("start");

        let updates = pump_until_settled(&mut poller, Duration::from_secs(2)).await;
        let progress: Vec<_> = updates
            .iter()
            .filter_map(|u| match u {
                PollerUpdate::Progress { message } => Some(message.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec!["Connecting to Reddit...", "Scraping topic: AI..."]);
        assert_eq!(poller.message(), "Done! Scraped 2 posts across 1 topics.");
    }
}
