//! Mock capability collaborators for testing.

use async_trait::async_trait;
use picker_schema::{CropTarget, PickerOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

use super::traits::{CapabilityLoader, PickerFactory, PickerInstance};
use crate::context::ConnectionContext;
use crate::error::{InstanceError, LoadError};
use crate::types::{OperationKind, PickerCall};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock picker instance.
///
/// Records every call in the order it began and keeps idempotent
/// open/cancelled state like a real picker would.
pub struct MockPicker {
    calls: Mutex<Vec<PickerCall>>,
    failures: Mutex<HashMap<OperationKind, InstanceError>>,
    delays: Mutex<HashMap<OperationKind, Duration>>,
    is_open: AtomicBool,
    cancelled: AtomicBool,
    open_transitions: AtomicU32,
}

impl MockPicker {
    /// Create a new mock picker.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            is_open: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            open_transitions: AtomicU32::new(0),
        }
    }

    /// Make an operation fail with the given error.
    pub fn with_failure(self, op: OperationKind, error: InstanceError) -> Self {
        lock(&self.failures).insert(op, error);
        self
    }

    /// Make an operation take a while after it has been recorded.
    pub fn with_delay(self, op: OperationKind, delay: Duration) -> Self {
        lock(&self.delays).insert(op, delay);
        self
    }

    /// Calls received so far, in the order they began.
    pub fn calls(&self) -> Vec<PickerCall> {
        lock(&self.calls).clone()
    }

    /// Kinds of the calls received so far.
    pub fn call_kinds(&self) -> Vec<OperationKind> {
        lock(&self.calls).iter().map(PickerCall::kind).collect()
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of closed-to-open transitions.
    pub fn open_transitions(&self) -> u32 {
        self.open_transitions.load(Ordering::SeqCst)
    }

    async fn run(&self, call: PickerCall) -> Result<(), InstanceError> {
        let kind = call.kind();
        lock(&self.calls).push(call);

        let delay = lock(&self.delays).get(&kind).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = lock(&self.failures).get(&kind).cloned();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MockPicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PickerInstance for MockPicker {
    async fn open(&self) -> Result<(), InstanceError> {
        self.run(PickerCall::Open).await?;
        if !self.is_open.swap(true, Ordering::SeqCst) {
            self.open_transitions.fetch_add(1, Ordering::SeqCst);
        }
        self.cancelled.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), InstanceError> {
        self.run(PickerCall::Close).await?;
        self.is_open.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn cancel(&self) -> Result<(), InstanceError> {
        self.run(PickerCall::Cancel).await?;
        self.cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn crop(&self, files: Vec<CropTarget>) -> Result<(), InstanceError> {
        self.run(PickerCall::Crop(files)).await
    }
}

/// Mock factory handing out one shared [`MockPicker`].
pub struct MockFactory {
    picker: Arc<MockPicker>,
    received: Mutex<Vec<(ConnectionContext, PickerOptions)>>,
    failure: Option<String>,
}

impl MockFactory {
    pub fn new(picker: Arc<MockPicker>) -> Self {
        Self {
            picker,
            received: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Make `create` fail with an initialization error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// The picker handed out by `create`.
    pub fn picker(&self) -> &Arc<MockPicker> {
        &self.picker
    }

    /// Number of times `create` was called.
    pub fn created_count(&self) -> usize {
        lock(&self.received).len()
    }

    /// Options received by the most recent `create`.
    pub fn last_options(&self) -> Option<PickerOptions> {
        lock(&self.received).last().map(|(_, options)| options.clone())
    }

    /// Context received by the most recent `create`.
    pub fn last_context(&self) -> Option<ConnectionContext> {
        lock(&self.received).last().map(|(context, _)| context.clone())
    }
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new(Arc::new(MockPicker::new()))
    }
}

impl PickerFactory for MockFactory {
    fn create(
        &self,
        context: &ConnectionContext,
        options: PickerOptions,
    ) -> Result<Arc<dyn PickerInstance>, LoadError> {
        lock(&self.received).push((context.clone(), options));

        if let Some(message) = &self.failure {
            return Err(LoadError::Initialization(message.clone()));
        }

        Ok(Arc::clone(&self.picker) as Arc<dyn PickerInstance>)
    }
}

/// Mock loader.
///
/// Can be delayed, gated until released, or made to fail.
pub struct MockLoader {
    factory: Arc<MockFactory>,
    call_count: AtomicU32,
    requests: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    failure: Option<LoadError>,
}

impl MockLoader {
    /// Create a loader serving the given factory.
    pub fn new(factory: Arc<MockFactory>) -> Self {
        Self {
            factory,
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            delay: None,
            gate: None,
            failure: None,
        }
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every acquisition until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Fail every acquisition with this error.
    pub fn with_failure(mut self, error: LoadError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Get the number of times acquire was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// `(endpoint, module_id)` of every acquire call.
    pub fn requests(&self) -> Vec<(String, String)> {
        lock(&self.requests).clone()
    }

    pub fn factory(&self) -> &Arc<MockFactory> {
        &self.factory
    }
}

impl Default for MockLoader {
    fn default() -> Self {
        Self::new(Arc::new(MockFactory::default()))
    }
}

#[async_trait]
impl CapabilityLoader for MockLoader {
    async fn acquire(
        &self,
        endpoint: &str,
        module_id: &str,
    ) -> Result<Arc<dyn PickerFactory>, LoadError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push((endpoint.to_string(), module_id.to_string()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        Ok(Arc::clone(&self.factory) as Arc<dyn PickerFactory>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_picker_is_idempotent() {
        let picker = MockPicker::new();

        picker.open().await.unwrap();
        picker.open().await.unwrap();

        assert!(picker.is_open());
        assert_eq!(picker.open_transitions(), 1);
        assert_eq!(picker.calls(), vec![PickerCall::Open, PickerCall::Open]);

        picker.close().await.unwrap();
        picker.close().await.unwrap();
        assert!(!picker.is_open());
    }

    #[tokio::test]
    async fn test_mock_picker_failure() {
        let picker = MockPicker::new().with_failure(
            OperationKind::Open,
            InstanceError::Unavailable("no display".to_string()),
        );

        assert!(picker.open().await.is_err());
        assert!(!picker.is_open());
        assert_eq!(picker.call_kinds(), vec![OperationKind::Open]);
    }

    #[tokio::test]
    async fn test_mock_loader() {
        let loader = MockLoader::default();

        assert_eq!(loader.call_count(), 0);
        let factory = loader.acquire("https://cdn.example.com", "picker").await.unwrap();
        assert_eq!(loader.call_count(), 1);
        assert_eq!(
            loader.requests(),
            vec![("https://cdn.example.com".to_string(), "picker".to_string())]
        );

        let context = ConnectionContext::new("key", "https://cdn.example.com");
        factory
            .create(&context, PickerOptions::new().with_max_files(1))
            .unwrap();
        assert_eq!(loader.factory().created_count(), 1);
        assert_eq!(loader.factory().last_options().unwrap().max_files, Some(1));
    }

    #[tokio::test]
    async fn test_mock_loader_failure() {
        let loader =
            MockLoader::default().with_failure(LoadError::Network("network down".to_string()));

        let first = loader.acquire("https://cdn.example.com", "picker").await;
        let second = loader.acquire("https://cdn.example.com", "picker").await;

        assert!(matches!(first, Err(LoadError::Network(m)) if m == "network down"));
        assert!(matches!(second, Err(LoadError::Network(m)) if m == "network down"));
        assert_eq!(loader.call_count(), 2);
    }
}
