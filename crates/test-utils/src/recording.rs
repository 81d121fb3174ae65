use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::dag::{Task, TaskFuture};
use assetpipe::engine::TaskContext;

/// Shared, ordered log of `start:<name>` / `end:<name>` entries.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// A fake task that:
/// - records when it starts and ends
/// - sleeps for a configurable delay in between
/// - optionally fails instead of ending.
#[derive(Debug, Clone)]
pub struct RecordingTask {
    name: String,
    log: EventLog,
    delay: Duration,
    fail: bool,
}

impl RecordingTask {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            delay: Duration::ZERO,
            fail: false,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn millis(self, ms: u64) -> Self {
        self.delay(Duration::from_millis(ms))
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Task for RecordingTask {
    fn run(&self, _cx: TaskContext) -> TaskFuture {
        let this = self.clone();
        Box::pin(async move {
            this.log.push(format!("start:{}", this.name));
            if !this.delay.is_zero() {
                tokio::time::sleep(this.delay).await;
            }
            if this.fail {
                this.log.push(format!("fail:{}", this.name));
                return Err(anyhow::anyhow!("{} failed", this.name).into());
            }
            this.log.push(format!("end:{}", this.name));
            Ok(())
        })
    }
}
