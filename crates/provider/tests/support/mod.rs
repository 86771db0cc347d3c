//! In-memory stand-in for the CloudAMQP API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use cloudamqp_provider::client::{CreateInstanceParams, Instance, InstanceApi, UpdateInstanceParams};
use cloudamqp_provider::ApiError;

/// A request the fake received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(CreateInstanceParams),
    Get(i64),
    Update(i64, UpdateInstanceParams),
    Delete(i64),
}

#[derive(Default)]
struct Failures {
    create: Option<(u16, String)>,
    get: Option<(u16, String)>,
    update: Option<(u16, String)>,
    delete: Option<(u16, String)>,
}

struct Inner {
    records: HashMap<i64, Instance>,
    next_id: i64,
    calls: Vec<Call>,
    failures: Failures,
}

pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                next_id: 42,
                calls: vec![],
                failures: Failures::default(),
            }),
        }
    }

    pub fn insert(&self, instance: Instance) {
        self.inner.lock().records.insert(instance.id, instance);
    }

    pub fn record(&self, id: i64) -> Option<Instance> {
        self.inner.lock().records.get(&id).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_create(&self, status: u16, message: &str) {
        self.inner.lock().failures.create = Some((status, message.to_string()));
    }

    pub fn fail_get(&self, status: u16, message: &str) {
        self.inner.lock().failures.get = Some((status, message.to_string()));
    }

    pub fn fail_update(&self, status: u16, message: &str) {
        self.inner.lock().failures.update = Some((status, message.to_string()));
    }

    pub fn fail_delete(&self, status: u16, message: &str) {
        self.inner.lock().failures.delete = Some((status, message.to_string()));
    }
}

fn status_error(failure: &Option<(u16, String)>) -> Option<ApiError> {
    failure.as_ref().map(|(status, message)| ApiError::Status {
        status: *status,
        message: message.clone(),
    })
}

#[async_trait]
impl InstanceApi for FakeApi {
    async fn create_instance(&self, params: &CreateInstanceParams) -> Result<Instance, ApiError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Create(params.clone()));

        if let Some(err) = status_error(&inner.failures.create) {
            return Err(err);
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let instance = Instance {
            id,
            name: params.name.clone(),
            plan: params.plan.clone(),
            region: params.region.clone(),
            url: "amqp://x".to_string(),
            apikey: "k".to_string(),
        };
        inner.records.insert(id, instance.clone());
        Ok(instance)
    }

    async fn get_instance(&self, id: i64) -> Result<Instance, ApiError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Get(id));

        if let Some(err) = status_error(&inner.failures.get) {
            return Err(err);
        }

        inner.records.get(&id).cloned().ok_or(ApiError::NotFound { id })
    }

    async fn update_instance(
        &self,
        id: i64,
        params: &UpdateInstanceParams,
    ) -> Result<Instance, ApiError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Update(id, params.clone()));

        if let Some(err) = status_error(&inner.failures.update) {
            return Err(err);
        }

        let record = inner.records.get_mut(&id).ok_or(ApiError::NotFound { id })?;
        record.name = params.name.clone();
        record.plan = params.plan.clone();
        Ok(record.clone())
    }

    async fn delete_instance(&self, id: i64) -> Result<(), ApiError> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Delete(id));

        if let Some(err) = status_error(&inner.failures.delete) {
            return Err(err);
        }

        inner.records.remove(&id).map(|_| ()).ok_or(ApiError::NotFound { id })
    }
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Formatted log lines captured by [`capture_logs`]
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Record every event on the current thread until the guard is dropped
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    (tracing::subscriber::set_default(subscriber), logs)
}
