//! A scriptable stand-in for the native library.
//!
//! [`FakeNative::submit`] plays the part of a native function: it inspects a
//! [`Script`], returns an immediate status code, and, for accepted calls,
//! arranges for the callback to be fired later. Replies are fired from a
//! pool of worker threads owned by the fake, with random jitter, so they
//! arrive on foreign threads and in no particular order.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::Rng;

use callbridge_core::{
    CorrelationId, ErrorDetailsSource, NativePayload, ProtocolViolation, ResultDispatcher,
    StatusCode,
};

/// What the fake native function does with a call.
#[derive(Debug, Clone)]
pub enum Script {
    /// Accept and hold the call; the test fires the callback with
    /// [`FakeNative::fire`].
    Hold,
    /// Reject synchronously with this status; no callback follows.
    Reject(StatusCode),
    /// Reject synchronously and record error details on the calling thread.
    RejectWithDetails(StatusCode, String),
    /// Accept and fire the callback from a worker thread.
    Reply {
        code: StatusCode,
        payload: NativePayload,
    },
}

impl Script {
    /// Accept and reply with success and `payload`.
    pub fn ok(payload: NativePayload) -> Self {
        Script::Reply {
            code: StatusCode::SUCCESS,
            payload,
        }
    }

    /// Accept and reply with a failure status.
    pub fn fail(code: impl Into<StatusCode>) -> Self {
        Script::Reply {
            code: code.into(),
            payload: NativePayload::empty(),
        }
    }
}

struct Job {
    id: CorrelationId,
    code: StatusCode,
    payload: NativePayload,
    details: Option<String>,
}

thread_local! {
    static CURRENT_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Record `json` as the current error on this thread, as the native
/// library does just before reporting a failure.
pub fn set_current_error(json: Option<String>) {
    CURRENT_ERROR.with(|slot| *slot.borrow_mut() = json);
}

/// [`ErrorDetailsSource`] reading the fake's per-thread current error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeErrorDetails;

impl ErrorDetailsSource for FakeErrorDetails {
    fn current_error(&self) -> Option<String> {
        CURRENT_ERROR.with(|slot| slot.borrow().clone())
    }
}

/// Configuration for the fake's callback workers.
#[derive(Debug, Clone)]
pub struct FakeNativeConfig {
    pub workers: usize,
    /// Upper bound on the random delay before each reply is fired.
    pub max_jitter: Duration,
}

impl Default for FakeNativeConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_jitter: Duration::from_micros(500),
        }
    }
}

/// The fake native library.
pub struct FakeNative {
    dispatcher: ResultDispatcher,
    held: Mutex<HashSet<CorrelationId>>,
    rejected: Mutex<Vec<CorrelationId>>,
    violations: Arc<Mutex<Vec<ProtocolViolation>>>,
    jobs: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl FakeNative {
    pub fn new(dispatcher: ResultDispatcher) -> io::Result<Self> {
        Self::with_config(dispatcher, FakeNativeConfig::default())
    }

    /// Fails only if a worker thread cannot be spawned.
    pub fn with_config(
        dispatcher: ResultDispatcher,
        config: FakeNativeConfig,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let violations = Arc::new(Mutex::new(Vec::new()));

        let workers = (0..config.workers.max(1))
            .map(|n| {
                let rx = Arc::clone(&rx);
                let dispatcher = dispatcher.clone();
                let violations = Arc::clone(&violations);
                let max_jitter = config.max_jitter;
                thread::Builder::new()
                    .name(format!("fake-native-{n}"))
                    .spawn(move || worker_loop(rx, dispatcher, violations, max_jitter))
            })
            .collect::<io::Result<Vec<_>>>()?;

        Ok(Self {
            dispatcher,
            held: Mutex::new(HashSet::new()),
            rejected: Mutex::new(Vec::new()),
            violations,
            jobs: Some(tx),
            workers,
        })
    }

    /// The native function: returns the immediate status for `id`.
    pub fn submit(&self, id: CorrelationId, script: Script) -> StatusCode {
        match script {
            Script::Hold => {
                self.held.lock().insert(id);
                StatusCode::SUCCESS
            }
            Script::Reject(code) => {
                self.rejected.lock().push(id);
                code
            }
            Script::RejectWithDetails(code, json) => {
                set_current_error(Some(json));
                self.rejected.lock().push(id);
                code
            }
            Script::Reply { code, payload } => {
                self.enqueue(Job {
                    id,
                    code,
                    payload,
                    details: None,
                });
                StatusCode::SUCCESS
            }
        }
    }

    /// Accept the call and reply with `code` from a worker thread, recording
    /// `details` as that thread's current error first.
    pub fn submit_failure_with_details(
        &self,
        id: CorrelationId,
        code: StatusCode,
        details: String,
    ) -> StatusCode {
        self.enqueue(Job {
            id,
            code,
            payload: NativePayload::empty(),
            details: Some(details),
        });
        StatusCode::SUCCESS
    }

    fn enqueue(&self, job: Job) {
        if let Some(jobs) = &self.jobs {
            if jobs.send(job).is_err() {
                tracing::error!("fake native workers are gone");
            }
        }
    }

    /// Fire the callback for a held call on the current thread.
    pub fn fire(
        &self,
        id: CorrelationId,
        code: StatusCode,
        payload: NativePayload,
    ) -> Result<(), ProtocolViolation> {
        self.held.lock().remove(&id);
        self.dispatcher.dispatch(id, code, payload)
    }

    /// Fire callbacks for held calls from `threads` threads in shuffled order.
    pub fn fire_shuffled(
        &self,
        mut replies: Vec<(CorrelationId, StatusCode, NativePayload)>,
        threads: usize,
    ) -> Vec<ProtocolViolation> {
        replies.shuffle(&mut rand::thread_rng());
        {
            let mut held = self.held.lock();
            for (id, _, _) in &replies {
                held.remove(id);
            }
        }

        let threads = threads.max(1);
        let chunk = replies.len().div_ceil(threads).max(1);
        let mut handles = Vec::new();
        let mut replies = replies.into_iter();
        loop {
            let batch: Vec<_> = replies.by_ref().take(chunk).collect();
            if batch.is_empty() {
                break;
            }
            let dispatcher = self.dispatcher.clone();
            handles.push(thread::spawn(move || {
                batch
                    .into_iter()
                    .filter_map(|(id, code, payload)| dispatcher.dispatch(id, code, payload).err())
                    .collect::<Vec<_>>()
            }));
        }

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_default())
            .collect()
    }

    /// Calls accepted with [`Script::Hold`] and not yet fired.
    pub fn held(&self) -> Vec<CorrelationId> {
        let mut held: Vec<_> = self.held.lock().iter().copied().collect();
        held.sort();
        held
    }

    pub fn rejected(&self) -> Vec<CorrelationId> {
        self.rejected.lock().clone()
    }

    /// Violations reported while firing worker replies.
    pub fn violations(&self) -> Vec<ProtocolViolation> {
        self.violations.lock().clone()
    }

    /// Stop the workers after all queued replies have been fired.
    pub fn join(mut self) -> Vec<ProtocolViolation> {
        self.stop();
        self.violations()
    }

    fn stop(&mut self) {
        self.jobs.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for FakeNative {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    dispatcher: ResultDispatcher,
    violations: Arc<Mutex<Vec<ProtocolViolation>>>,
    max_jitter: Duration,
) {
    loop {
        let job = {
            let rx = rx.lock();
            rx.recv()
        };
        let Ok(job) = job else {
            return;
        };

        if !max_jitter.is_zero() {
            let micros = rand::thread_rng().gen_range(0..=max_jitter.as_micros() as u64);
            thread::sleep(Duration::from_micros(micros));
        }
        if job.details.is_some() {
            set_current_error(job.details);
        }
        if let Err(violation) = dispatcher.dispatch(job.id, job.code, job.payload) {
            violations.lock().push(violation);
        }
        set_current_error(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callbridge_core::{CorrelationRegistry, ErrorTranslator, ViolationPolicy};

    fn dispatcher() -> ResultDispatcher {
        ResultDispatcher::new(
            Arc::new(CorrelationRegistry::new()),
            Arc::new(ErrorTranslator::sdk()),
        )
        .with_policy(ViolationPolicy::Log)
    }

    #[test]
    fn test_reject_returns_code_and_records() {
        let native = FakeNative::new(dispatcher()).unwrap();
        let status = native.submit(CorrelationId(1), Script::Reject(StatusCode(1002)));
        assert_eq!(status, StatusCode(1002));
        assert_eq!(native.rejected(), vec![CorrelationId(1)]);
    }

    #[test]
    fn test_hold_then_fire_unknown_is_violation() {
        let native = FakeNative::new(dispatcher()).unwrap();
        native.submit(CorrelationId(3), Script::Hold);
        assert_eq!(native.held(), vec![CorrelationId(3)]);
        let result = native.fire(CorrelationId(3), StatusCode::SUCCESS, NativePayload::empty());
        assert!(result.is_err());
        assert!(native.held().is_empty());
    }

    #[test]
    fn test_worker_reply_to_unregistered_id_is_reported() {
        let native = FakeNative::new(dispatcher()).unwrap();
        native.submit(CorrelationId(8), Script::ok(NativePayload::empty()));
        let violations = native.join();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].id(), CorrelationId(8));
    }

    #[test]
    fn test_zero_workers_still_replies() -> io::Result<()> {
        let native = FakeNative::with_config(
            dispatcher(),
            FakeNativeConfig {
                workers: 0,
                max_jitter: Duration::ZERO,
            },
        )?;
        native.submit(CorrelationId(12), Script::fail(212));
        let violations = native.join();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].id(), CorrelationId(12));
        Ok(())
    }

    #[test]
    fn test_current_error_is_thread_local() {
        set_current_error(Some("{\"error\":\"x\"}".into()));
        assert!(FakeErrorDetails.current_error().is_some());
        let other = thread::spawn(|| FakeErrorDetails.current_error()).join().unwrap();
        assert!(other.is_none());
        set_current_error(None);
    }
}
