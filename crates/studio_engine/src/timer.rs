use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use engine_logging::engine_debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sink::EventSink;
use crate::{EngineEvent, Operation};

const TICK: Duration = Duration::from_secs(1);

struct ActiveTimer {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveTimer {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Elapsed-time counters, at most one per operation.
pub struct TimerRegistry {
    runtime: Handle,
    sink: Arc<dyn EventSink>,
    timers: Mutex<HashMap<Operation, ActiveTimer>>,
}

impl TimerRegistry {
    pub fn new(runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self {
            runtime,
            sink,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Starts counting from zero, replacing any timer already running for `operation`.
    pub fn start(&self, operation: Operation) {
        let mut timers = self.lock();
        if let Some(previous) = timers.remove(&operation) {
            previous.stop();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sink = self.sink.clone();
        let task = self.runtime.spawn(async move {
            sink.emit(EngineEvent::TimerTick {
                operation,
                elapsed_secs: 0,
            });
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            let mut elapsed_secs = 0;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        elapsed_secs += 1;
                        sink.emit(EngineEvent::TimerTick { operation, elapsed_secs });
                    }
                }
            }
        });

        engine_debug!("Timer started for {:?}", operation);
        timers.insert(operation, ActiveTimer { cancel, task });
    }

    /// Returns whether a timer was running. Stopping an idle operation is a no-op.
    pub fn stop(&self, operation: Operation) -> bool {
        match self.lock().remove(&operation) {
            Some(timer) => {
                timer.stop();
                engine_debug!("Timer stopped for {:?}", operation);
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for (_, timer) in self.lock().drain() {
            timer.stop();
        }
    }

    pub fn is_running(&self, operation: Operation) -> bool {
        self.lock().contains_key(&operation)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Operation, ActiveTimer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
