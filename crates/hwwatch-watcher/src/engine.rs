//! Watcher engine — the poll-validate-interpret-notify loop.
//!
//! One cycle runs to completion before the next begins, so the cursor and the
//! change tracker need no locking. The sleep between cycles is the only point
//! where shutdown is honoured.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hwwatch_core::config::WatcherConfig;
use hwwatch_core::error::{HwWatchError, Result};
use hwwatch_core::traits::{Notifier, StatusSource};

use crate::interpret::interpret;
use crate::tracker::ChangeTracker;
use crate::validate::{validate, watermark};

/// What happened to a message on its way to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Identical to the last attempted message.
    Suppressed,
    Failed,
}

/// Result of a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API reported no homework in the polled window.
    NothingNew,
    /// A status message went through the notify path.
    Status(Delivery),
    /// The cycle failed and an error message went through the notify path.
    Failure(Delivery),
}

/// Status message plus the watermark it was read with.
struct Observation {
    message: String,
    watermark: Option<i64>,
}

pub struct Watcher {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    destination: String,
    interval: Duration,
    cursor: i64,
    tracker: ChangeTracker,
}

impl Watcher {
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        destination: impl Into<String>,
        interval: Duration,
        cursor: i64,
    ) -> Self {
        Self {
            source,
            notifier,
            destination: destination.into(),
            interval,
            cursor,
            tracker: ChangeTracker::new(),
        }
    }

    /// Build a watcher from validated configuration, starting the cursor at
    /// the current time. Fails without touching either collaborator when the
    /// configuration is incomplete.
    pub fn from_config(
        config: &WatcherConfig,
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            source,
            notifier,
            config.telegram_chat_id.clone(),
            Duration::from_secs(config.poll_interval_secs),
            chrono::Utc::now().timestamp(),
        ))
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_notified(&self) -> Option<&str> {
        self.tracker.last_notified()
    }

    /// Run cycles until `shutdown` resolves. Only errors outside the
    /// recoverable per-cycle set end the loop early.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            "⏰ Watcher started (notifier: {}, interval: {}s)",
            self.notifier.name(),
            self.interval.as_secs()
        );

        loop {
            self.run_cycle().await?;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("🛑 Shutdown requested, watcher stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Run one full cycle. Recoverable failures are reported through the
    /// notify path and swallowed; anything else is returned.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        match self.observe().await {
            Ok(None) => {
                tracing::debug!("No new homework statuses since {}", self.cursor);
                Ok(CycleOutcome::NothingNew)
            }
            Ok(Some(observation)) => {
                let delivery = self.notify(observation.message).await;
                if delivery != Delivery::Failed {
                    self.advance(observation.watermark);
                }
                Ok(CycleOutcome::Status(delivery))
            }
            Err(e) if e.is_recoverable() => {
                let message = format!("Program failure: {e}");
                tracing::error!("{message}");
                Ok(CycleOutcome::Failure(self.notify(message).await))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch, validate and interpret. `None` means nothing to report.
    async fn observe(&self) -> Result<Option<Observation>> {
        let raw = self.source.fetch(self.cursor).await?;
        let homeworks = validate(&raw)?;
        let Some(latest) = homeworks.first() else {
            return Ok(None);
        };
        let message = interpret(latest)?;
        Ok(Some(Observation {
            message,
            watermark: watermark(&raw),
        }))
    }

    async fn notify(&mut self, message: String) -> Delivery {
        if !self.tracker.should_notify(&message) {
            tracing::debug!("Message unchanged, not sending: {message}");
            return Delivery::Suppressed;
        }

        let result = self.notifier.deliver(&self.destination, &message).await;
        let delivery = match &result {
            Ok(()) => {
                tracing::debug!("Sent message: {message}");
                Delivery::Sent
            }
            Err(e) => {
                tracing::error!("Error ({e}) while sending message: {message}");
                Delivery::Failed
            }
        };
        self.tracker.commit(message);
        delivery
    }

    fn advance(&mut self, watermark: Option<i64>) {
        match watermark {
            Some(next) => {
                tracing::debug!("Cursor advanced {} -> {}", self.cursor, next);
                self.cursor = next;
            }
            None => tracing::warn!(
                "Response has no usable current_date, keeping cursor at {}",
                self.cursor
            ),
        }
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("notifier", &self.notifier.name())
            .field("destination", &self.destination)
            .field("interval", &self.interval)
            .field("cursor", &self.cursor)
            .field("tracker", &self.tracker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records the cursor of every fetch.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Value>>>,
        cursors: Mutex<Vec<i64>>,
    }

    impl ScriptedSource {
        fn push(&self, response: Result<Value>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn cursors(&self) -> Vec<i64> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, from_date: i64) -> Result<Value> {
            self.cursors.lock().unwrap().push(from_date);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"homeworks": []})))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: Mutex<bool>,
    }

    impl RecordingNotifier {
        fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            if *self.fail.lock().unwrap() {
                return Err(HwWatchError::Delivery("chat unavailable".into()));
            }
            Ok(())
        }
    }

    fn setup(cursor: i64) -> (Arc<ScriptedSource>, Arc<RecordingNotifier>, Watcher) {
        let source = Arc::new(ScriptedSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let watcher = Watcher::new(
            source.clone(),
            notifier.clone(),
            "chat-1",
            Duration::from_secs(600),
            cursor,
        );
        (source, notifier, watcher)
    }

    fn page(status: &str, current_date: i64) -> Result<Value> {
        Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": status}],
            "current_date": current_date,
        }))
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (source, notifier, mut watcher) = setup(0);
        source.push(page("reviewing", 1000));
        source.push(page("reviewing", 1500));
        source.push(page("approved", 2000));

        assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::Status(Delivery::Sent));
        assert_eq!(watcher.cursor(), 1000);
        assert_eq!(notifier.texts().len(), 1);
        assert!(notifier.texts()[0].contains("taken for review"));

        assert_eq!(
            watcher.run_cycle().await.unwrap(),
            CycleOutcome::Status(Delivery::Suppressed)
        );
        assert_eq!(notifier.texts().len(), 1);
        assert_eq!(watcher.cursor(), 1500);

        assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::Status(Delivery::Sent));
        assert_eq!(watcher.cursor(), 2000);
        let texts = notifier.texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[1].contains("hw1"));
        assert!(texts[1].contains("liked everything"));

        assert_eq!(source.cursors(), vec![0, 1000, 1500]);
        assert_eq!(notifier.sent.lock().unwrap()[0].0, "chat-1");
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let (source, notifier, mut watcher) = setup(77);
        source.push(Ok(json!({"homeworks": [], "current_date": 999})));

        assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::NothingNew);
        assert!(notifier.texts().is_empty());
        assert_eq!(watcher.cursor(), 77);
        assert_eq!(watcher.last_notified(), None);
    }

    #[tokio::test]
    async fn test_repeated_error_alerts_once() {
        let (source, notifier, mut watcher) = setup(10);
        for _ in 0..3 {
            source.push(Ok(json!({"current_date": 20})));
        }

        let outcomes = [
            watcher.run_cycle().await.unwrap(),
            watcher.run_cycle().await.unwrap(),
            watcher.run_cycle().await.unwrap(),
        ];
        assert_eq!(outcomes[0], CycleOutcome::Failure(Delivery::Sent));
        assert_eq!(outcomes[1], CycleOutcome::Failure(Delivery::Suppressed));
        assert_eq!(outcomes[2], CycleOutcome::Failure(Delivery::Suppressed));

        let texts = notifier.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Program failure:"));
        assert!(texts[0].contains("homeworks"));
        assert_eq!(watcher.cursor(), 10);
    }

    #[tokio::test]
    async fn test_changed_error_and_recovery_are_sent() {
        let (source, notifier, mut watcher) = setup(0);
        source.push(Err(HwWatchError::EndpointUnavailable {
            endpoint: "https://example.test/".into(),
            status: 500,
        }));
        source.push(Ok(json!({"homeworks": "broken"})));
        source.push(page("rejected", 50));

        watcher.run_cycle().await.unwrap();
        watcher.run_cycle().await.unwrap();
        watcher.run_cycle().await.unwrap();

        let texts = notifier.texts();
        assert_eq!(texts.len(), 3);
        assert!(texts[0].contains("HTTP 500"));
        assert!(texts[1].contains("malformed API response"));
        assert!(texts[2].contains("remarks"));
        assert_eq!(watcher.cursor(), 50);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_retried_and_keeps_cursor() {
        let (source, notifier, mut watcher) = setup(5);
        notifier.set_failing(true);
        source.push(page("approved", 100));
        source.push(page("approved", 100));

        assert_eq!(
            watcher.run_cycle().await.unwrap(),
            CycleOutcome::Status(Delivery::Failed)
        );
        assert_eq!(watcher.cursor(), 5);

        // Same message again: suppressed, so the cycle completes and the cursor moves.
        assert_eq!(
            watcher.run_cycle().await.unwrap(),
            CycleOutcome::Status(Delivery::Suppressed)
        );
        assert_eq!(notifier.texts().len(), 1);
        assert_eq!(watcher.cursor(), 100);
    }

    #[tokio::test]
    async fn test_change_sent_after_failed_delivery() {
        let (source, notifier, mut watcher) = setup(0);
        notifier.set_failing(true);
        source.push(page("reviewing", 10));
        source.push(page("approved", 20));

        watcher.run_cycle().await.unwrap();
        notifier.set_failing(false);
        assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::Status(Delivery::Sent));
        assert_eq!(notifier.texts().len(), 2);
        assert_eq!(watcher.cursor(), 20);
    }

    #[tokio::test]
    async fn test_missing_watermark_keeps_cursor() {
        let (source, _notifier, mut watcher) = setup(33);
        source.push(Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "approved"}]})));

        assert_eq!(watcher.run_cycle().await.unwrap(), CycleOutcome::Status(Delivery::Sent));
        assert_eq!(watcher.cursor(), 33);
    }

    #[tokio::test]
    async fn test_unrecoverable_error_escapes() {
        let (source, notifier, mut watcher) = setup(0);
        source.push(Err(HwWatchError::ConfigFile("corrupt".into())));

        let err = watcher.run(std::future::pending::<()>()).await.unwrap_err();
        assert!(matches!(err, HwWatchError::ConfigFile(_)));
        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_lets_cycle_finish() {
        let (source, notifier, mut watcher) = setup(0);
        source.push(page("reviewing", 1000));

        watcher.run(std::future::ready(())).await.unwrap();

        assert_eq!(source.cursors(), vec![0]);
        assert_eq!(notifier.texts().len(), 1);
        assert_eq!(watcher.cursor(), 1000);
    }

    #[tokio::test]
    async fn test_from_config_rejects_missing_secrets() {
        let source = Arc::new(ScriptedSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut config = WatcherConfig::default();
        config.telegram_token = "bot".into();

        let err = Watcher::from_config(&config, source.clone(), notifier.clone()).unwrap_err();
        match err {
            HwWatchError::Configuration { missing } => {
                assert_eq!(missing, vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(source.cursors().is_empty());
        assert!(notifier.texts().is_empty());
    }
}
