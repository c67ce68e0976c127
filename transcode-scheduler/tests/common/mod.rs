//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use transcode_scheduler::config::AppConfig;
use transcode_scheduler::database::{init_pool_with_size, run_migrations};
use transcode_scheduler::services::ServiceContainer;
use transcode_scheduler::transcoder::{CancelRequest, DispatchRequest, Transcoder};
use transcode_scheduler::{Error, Result};

/// Records every call; dispatches fail while `reject` is set.
#[derive(Default)]
pub struct FakeTranscoder {
    pub dispatched: Mutex<Vec<DispatchRequest>>,
    pub cancelled: Mutex<Vec<CancelRequest>>,
    reject: AtomicBool,
}

impl FakeTranscoder {
    pub fn reject_dispatches(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled.lock().unwrap().len()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn schedule(&self, request: &DispatchRequest) -> Result<()> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::dispatch("intake unavailable"));
        }
        self.dispatched.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn remove_job(&self, request: &CancelRequest) -> Result<()> {
        self.cancelled.lock().unwrap().push(request.clone());
        Err(Error::Transcoder("worker unreachable".to_string()))
    }
}

/// Services over a fresh in-memory database with an `h264` preset.
pub async fn setup() -> (ServiceContainer, Arc<FakeTranscoder>) {
    let pool = init_pool_with_size("sqlite::memory:", 1)
        .await
        .expect("Failed to create test pool");
    run_migrations(&pool).await.expect("Failed to run migrations");

    let transcoder = Arc::new(FakeTranscoder::default());
    let services =
        ServiceContainer::with_transcoder(pool, &AppConfig::default(), transcoder.clone());

    services
        .catalog
        .create_preset("h264", serde_json::json!({"crf": 23}))
        .await
        .expect("Failed to create preset");

    (services, transcoder)
}
