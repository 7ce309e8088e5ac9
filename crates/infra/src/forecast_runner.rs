use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{info, warn};

use hirecast_core::{Clock, YearMonth};
use hirecast_predictions::{EvidenceForecastJob, ForecastWindow, Prediction, PredictionJob};

use crate::history::HistoryProvider;

/// One completed evidence-forecast run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSnapshot {
    pub generated_at: DateTime<FixedOffset>,
    pub anchor_month: YearMonth,
    pub predictions: Vec<Prediction>,
}

/// Sink for forecast snapshots.
pub trait ForecastSink: Send + Sync + 'static {
    fn emit(&self, snapshot: ForecastSnapshot);
}

/// Keeps only the most recent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryForecastSink {
    latest: Mutex<Option<ForecastSnapshot>>,
    emitted: Mutex<u64>,
}

impl InMemoryForecastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<ForecastSnapshot> {
        self.latest.lock().ok().and_then(|g| g.clone())
    }

    /// Number of snapshots received so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.lock().map(|g| *g).unwrap_or(0)
    }
}

impl ForecastSink for InMemoryForecastSink {
    fn emit(&self, snapshot: ForecastSnapshot) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(snapshot);
        }
        if let Ok(mut n) = self.emitted.lock() {
            *n += 1;
        }
    }
}

/// Config for the forecast refresh runner.
#[derive(Debug, Clone)]
pub struct ForecastRunner {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub window: ForecastWindow,
}

impl Default for ForecastRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
            window: ForecastWindow::extended_default(),
        }
    }
}

/// Handle for the running refresh thread (shutdown + trigger hook).
#[derive(Debug)]
pub struct ForecastRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl ForecastRunnerHandle {
    /// Request a refresh, e.g. after a history sync.
    ///
    /// Triggers are coalesced: if a refresh is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the refresh thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl ForecastRunner {
    /// Spawn the refresh thread.
    ///
    /// - Schedule: runs on startup, then every `interval`
    /// - Trigger: `handle.trigger()` forces an early refresh
    /// - Failures: logged and retried with bounded exponential backoff; never propagated
    pub fn spawn<P, C, S>(
        &self,
        name: &'static str,
        provider: Arc<P>,
        clock: Arc<C>,
        sink: Arc<S>,
    ) -> std::io::Result<ForecastRunnerHandle>
    where
        P: HistoryProvider + 'static,
        C: Clock,
        S: ForecastSink + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runner_loop(name, cfg, shutdown_rx, trigger_rx, provider, clock, sink))?;

        Ok(ForecastRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

fn refresh<P, C>(cfg: &ForecastRunner, provider: &P, clock: &C) -> Result<ForecastSnapshot, String>
where
    P: HistoryProvider,
    C: Clock,
{
    let generated_at = clock.now();
    let anchor_month = YearMonth::from_datetime(&generated_at);

    let histories = provider
        .histories(anchor_month)
        .map_err(|e| format!("history load failed: {e}"))?;
    let job = EvidenceForecastJob::new(histories, anchor_month).with_window(cfg.window);
    let predictions = job.run().map_err(|e| format!("{} failed: {e}", job.kind()))?;

    Ok(ForecastSnapshot {
        generated_at,
        anchor_month,
        predictions,
    })
}

/// Consecutive-failure bookkeeping for the refresh loop.
#[derive(Debug, Default)]
struct RetryState {
    failures: u32,
    until: Option<Instant>,
}

impl RetryState {
    /// True while a backoff delay is still running.
    fn waiting(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now < until => true,
            _ => {
                self.until = None;
                false
            }
        }
    }

    /// Count a failure; returns whether a retry was scheduled.
    ///
    /// After `max_retries` consecutive failures the counter resets and the
    /// loop waits for the next tick or trigger instead.
    fn record_failure(&mut self, cfg: &ForecastRunner, now: Instant) -> bool {
        self.failures += 1;
        if self.failures <= cfg.max_retries {
            self.until = Some(now + backoff(cfg.base_backoff, self.failures));
            true
        } else {
            self.failures = 0;
            false
        }
    }

    fn reset(&mut self) {
        self.failures = 0;
    }
}

fn runner_loop<P, C, S>(
    name: &'static str,
    cfg: ForecastRunner,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    provider: Arc<P>,
    clock: Arc<C>,
    sink: Arc<S>,
) where
    P: HistoryProvider + 'static,
    C: Clock,
    S: ForecastSink + 'static,
{
    info!(runner = name, window = cfg.window.months(), "forecast runner started");

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = true; // first snapshot right after startup
    let mut retry = RetryState::default();

    loop {
        // Shutdown wins over any pending work.
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        // Interval tick; skipped ticks collapse into one refresh.
        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        // Drain triggers so a burst of history syncs costs one refresh.
        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if retry.waiting(Instant::now()) {
            thread::sleep(Duration::from_millis(50));
            continue;
        }

        if !pending {
            // Idle: wake at most every 250ms to observe shutdown and triggers.
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(250));
            thread::sleep(sleep_for);
            continue;
        }
        pending = false;

        match refresh(&cfg, &*provider, &*clock) {
            Ok(snapshot) => {
                retry.reset();
                info!(
                    runner = name,
                    month = %snapshot.anchor_month,
                    count = snapshot.predictions.len(),
                    "forecast snapshot refreshed"
                );
                sink.emit(snapshot);
            }
            Err(e) => {
                let retrying = retry.record_failure(&cfg, Instant::now());
                warn!(runner = name, error = %e, retrying, "forecast refresh failed");
                pending = retrying;
            }
        }
    }

    info!(runner = name, "forecast runner stopped");
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped at 10s.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoryError, InMemoryHistoryProvider, JobRecord, OrganizationPattern};
    use chrono::{TimeZone, Utc};
    use hirecast_core::FixedClock;
    use hirecast_predictions::OrganizationHistory;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn record(id: &str, year: i32, month: u32) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            org_name: Some("Alpha".to_string()),
            title: "Alpha opening".to_string(),
            apply_start_at: Some(Utc.with_ymd_and_hms(year, month, 5, 0, 0, 0).unwrap()),
            duties_text: None,
            hire_type: None,
        }
    }

    fn wait_for(sink: &InMemoryForecastSink, count: u64) -> bool {
        for _ in 0..200 {
            if sink.emitted() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    /// Fails the first `failures` calls, then serves nothing.
    struct FlakyProvider {
        failures: u32,
        calls: AtomicU32,
    }

    impl HistoryProvider for FlakyProvider {
        fn histories(&self, _now: YearMonth) -> Result<Vec<OrganizationHistory>, HistoryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(HistoryError::Unavailable("flaky".to_string()));
            }
            Ok(Vec::new())
        }

        fn organization(
            &self,
            _org_name: &str,
            _now: YearMonth,
        ) -> Result<Option<OrganizationHistory>, HistoryError> {
            Ok(None)
        }

        fn organization_patterns(
            &self,
            _now: YearMonth,
            _limit: usize,
        ) -> Result<Vec<OrganizationPattern>, HistoryError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn refreshes_on_startup_and_on_trigger() {
        let provider = Arc::new(InMemoryHistoryProvider::with_records(vec![
            record("1", 2023, 3),
            record("2", 2024, 3),
            record("3", 2025, 3),
        ]));
        let clock = Arc::new(FixedClock::at_month(YearMonth::new(2026, 1).unwrap()).unwrap());
        let sink = Arc::new(InMemoryForecastSink::new());

        let handle = ForecastRunner::default()
            .spawn("forecast-runner-test", provider, clock, sink.clone())
            .unwrap();

        assert!(wait_for(&sink, 1));
        let snapshot = sink.latest().unwrap();
        assert_eq!(snapshot.anchor_month, YearMonth::new(2026, 1).unwrap());
        assert!(
            snapshot
                .predictions
                .iter()
                .any(|p| p.org_name == "Alpha" && p.predicted_month == YearMonth::new(2026, 3).unwrap())
        );

        handle.trigger();
        assert!(wait_for(&sink, 2));
        handle.shutdown();
    }

    #[test]
    fn retries_after_provider_failures() {
        let provider = Arc::new(FlakyProvider {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let clock = Arc::new(FixedClock::at_month(YearMonth::new(2026, 1).unwrap()).unwrap());
        let sink = Arc::new(InMemoryForecastSink::new());

        let runner = ForecastRunner {
            base_backoff: Duration::from_millis(5),
            ..ForecastRunner::default()
        };
        let handle = runner
            .spawn("forecast-runner-retry", provider.clone(), clock, sink.clone())
            .unwrap();

        assert!(wait_for(&sink, 1));
        assert!(provider.calls.load(Ordering::SeqCst) >= 3);
        assert!(sink.latest().unwrap().predictions.is_empty());
        handle.shutdown();
    }

    #[test]
    fn retries_stop_after_max_consecutive_failures() {
        let cfg = ForecastRunner {
            max_retries: 2,
            base_backoff: Duration::from_millis(100),
            ..ForecastRunner::default()
        };
        let start = Instant::now();
        let mut retry = RetryState::default();

        assert!(retry.record_failure(&cfg, start));
        assert!(retry.waiting(start + Duration::from_millis(50)));
        assert!(!retry.waiting(start + Duration::from_millis(150)));
        assert!(retry.record_failure(&cfg, start));
        assert!(!retry.record_failure(&cfg, start));
        // Counter starts over after giving up.
        assert!(retry.record_failure(&cfg, start));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff(base, 1), Duration::from_millis(100));
        assert_eq!(backoff(base, 3), Duration::from_millis(400));
        assert_eq!(backoff(base, 30), Duration::from_millis(10_000));
    }
}
