//! Deferred picker proxy.
//!
//! A [`PickerProxy`] is returned synchronously while the real picker is still
//! being fetched. Its control operations are issued immediately and answered
//! once the single background acquisition has settled:
//!
//! ```text
//!  open() ─┐                    ┌─ Loading ─ calls queue up (FIFO)
//!  crop() ─┼─► command queue ─► │
//! close() ─┘                    ├─ Ready ──── forwarded to the instance in order
//!                               └─ Failed ─── every call gets the same error
//! ```

use chrono::Utc;
use picker_schema::{CropTarget, PickerOptions};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::capability::CapabilityLoader;
use crate::config::ProxyConfig;
use crate::context::ConnectionContext;
use crate::driver::{Command, Driver};
use crate::error::PickerError;
use crate::journal::OperationJournal;
use crate::types::{LoadState, OperationKind, PickerCall};

/// Handle to a picker that may still be loading.
///
/// Clones share the same acquisition and command queue.
#[derive(Clone)]
pub struct PickerProxy {
    proxy_id: String,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<LoadState>,
    journal: Option<Arc<OperationJournal>>,
}

impl PickerProxy {
    /// Start acquiring the picker and return the handle right away.
    pub(crate) fn spawn(
        context: ConnectionContext,
        loader: Arc<dyn CapabilityLoader>,
        options: PickerOptions,
        config: &ProxyConfig,
    ) -> Self {
        let proxy_id = uuid::Uuid::new_v4().to_string();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(LoadState::Loading);
        let journal = config
            .journal_enabled
            .then(|| Arc::new(OperationJournal::with_max_entries(config.journal_capacity)));

        let driver = Driver {
            proxy_id: proxy_id.clone(),
            context,
            loader,
            options,
            policy: config.loading_cancel,
            commands: command_rx,
            state: state_tx,
            journal: journal.clone(),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(driver.run());
            }
            Err(_) => {
                warn!(proxy_id = %proxy_id, "No tokio runtime, picker cannot be loaded");
                driver.fail_without_runtime();
            }
        }

        Self {
            proxy_id,
            commands,
            state,
            journal,
        }
    }

    /// Get the proxy ID.
    pub fn proxy_id(&self) -> &str {
        &self.proxy_id
    }

    /// Current acquisition state.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// The operation journal, if enabled in the config.
    pub fn journal(&self) -> Option<&Arc<OperationJournal>> {
        self.journal.as_ref()
    }

    /// Wait until acquisition has settled.
    pub async fn ready(&self) -> Result<(), PickerError> {
        let mut state = self.state.clone();
        // A stopped driver leaves its last state behind.
        let _ = state.wait_for(|s| !s.is_loading()).await;
        let settled = state.borrow().clone();

        match settled {
            LoadState::Ready => Ok(()),
            LoadState::Failed(err) => Err(err),
            LoadState::Loading => Err(PickerError::DriverStopped),
        }
    }

    /// Show the picker.
    pub fn open(&self) -> Operation {
        self.submit(PickerCall::Open)
    }

    /// Hide the picker.
    pub fn close(&self) -> Operation {
        self.submit(PickerCall::Close)
    }

    /// Abort the current selection or upload.
    pub fn cancel(&self) -> Operation {
        self.submit(PickerCall::Cancel)
    }

    /// Open the crop tool for the given files or URLs.
    pub fn crop<I, T>(&self, files: I) -> Operation
    where
        I: IntoIterator<Item = T>,
        T: Into<CropTarget>,
    {
        self.submit(PickerCall::Crop(files.into_iter().map(Into::into).collect()))
    }

    fn submit(&self, call: PickerCall) -> Operation {
        let op = call.kind();
        let (reply, response) = oneshot::channel();
        let command = Command {
            call,
            issued_at: Utc::now(),
            reply,
        };

        debug!(proxy_id = %self.proxy_id, %op, "Operation issued");

        match self.commands.send(command) {
            Ok(()) => Operation {
                op,
                state: OperationState::Pending(response),
            },
            Err(_) => Operation {
                op,
                state: OperationState::Settled(Some(Err(self.terminal_error()))),
            },
        }
    }

    fn terminal_error(&self) -> PickerError {
        self.state
            .borrow()
            .error()
            .cloned()
            .unwrap_or(PickerError::DriverStopped)
    }
}

impl fmt::Debug for PickerProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerProxy")
            .field("proxy_id", &self.proxy_id)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// An issued control operation.
///
/// The call is already queued when this is returned; dropping it does not
/// withdraw the call, it only discards the outcome.
#[must_use = "the operation is already issued; await it to observe the outcome"]
pub struct Operation {
    op: OperationKind,
    state: OperationState,
}

enum OperationState {
    Pending(oneshot::Receiver<Result<(), PickerError>>),
    Settled(Option<Result<(), PickerError>>),
}

impl Operation {
    /// Which operation this is.
    pub fn kind(&self) -> OperationKind {
        self.op
    }
}

impl Future for Operation {
    type Output = Result<(), PickerError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            OperationState::Pending(response) => Pin::new(response)
                .poll(cx)
                .map(|answer| answer.unwrap_or(Err(PickerError::DriverStopped))),
            OperationState::Settled(result) => {
                Poll::Ready(result.take().unwrap_or(Err(PickerError::DriverStopped)))
            }
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("op", &self.op).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::MockLoader;
    use crate::config::LoadingCancelPolicy;
    use crate::error::LoadError;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn context() -> ConnectionContext {
        ConnectionContext::new("key-123", "https://static.example.com/picker/v1")
    }

    #[tokio::test]
    async fn test_starts_loading_without_any_call() {
        let loader = Arc::new(MockLoader::default());
        let proxy = PickerProxy::spawn(
            context(),
            loader.clone(),
            PickerOptions::default(),
            &ProxyConfig::default(),
        );

        assert!(proxy.state().is_loading());
        proxy.ready().await.unwrap();

        assert!(proxy.state().is_ready());
        assert_eq!(loader.call_count(), 1);
        assert_eq!(
            loader.requests(),
            vec![(
                "https://static.example.com/picker/v1".to_string(),
                "picker".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_operation_waits_for_load() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(MockLoader::default().with_gate(gate.clone()));
        let proxy = PickerProxy::spawn(
            context(),
            loader.clone(),
            PickerOptions::default(),
            &ProxyConfig::default(),
        );

        let mut open = proxy.open();
        assert!(futures::poll!(&mut open).is_pending());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(futures::poll!(&mut open).is_pending());
        assert!(loader.factory().picker().calls().is_empty());

        gate.notify_one();
        tokio_test::assert_ok!(open.await);
        assert!(loader.factory().picker().is_open());
    }

    #[tokio::test]
    async fn test_dropped_operation_still_runs() {
        let loader = Arc::new(MockLoader::default());
        let proxy = PickerProxy::spawn(
            context(),
            loader.clone(),
            PickerOptions::default(),
            &ProxyConfig::default(),
        );

        drop(proxy.open());
        proxy.close().await.unwrap();

        assert_eq!(
            loader.factory().picker().calls(),
            vec![PickerCall::Open, PickerCall::Close]
        );
    }

    #[tokio::test]
    async fn test_abort_if_loading() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(MockLoader::default().with_gate(gate));
        let config = ProxyConfig::default().with_loading_cancel(LoadingCancelPolicy::AbortIfLoading);
        let proxy = PickerProxy::spawn(context(), loader.clone(), PickerOptions::default(), &config);

        let open = proxy.open();
        let cancel = proxy.cancel();

        tokio_test::assert_ok!(cancel.await);
        assert!(matches!(open.await, Err(PickerError::Aborted)));
        assert!(matches!(proxy.state(), LoadState::Failed(PickerError::Aborted)));
        assert!(matches!(proxy.close().await, Err(PickerError::Aborted)));

        assert_eq!(loader.call_count(), 1);
        assert!(loader.factory().picker().calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_cancel_after_abort_succeeds() {
        let gate = Arc::new(Notify::new());
        let loader = Arc::new(MockLoader::default().with_gate(gate));
        let config = ProxyConfig::default().with_loading_cancel(LoadingCancelPolicy::AbortIfLoading);
        let proxy = PickerProxy::spawn(context(), loader.clone(), PickerOptions::default(), &config);

        let (first, second) = tokio::join!(proxy.cancel(), proxy.cancel());
        tokio_test::assert_ok!(first);
        tokio_test::assert_ok!(second);

        assert!(matches!(proxy.state(), LoadState::Failed(PickerError::Aborted)));
        tokio_test::assert_ok!(proxy.cancel().await);
        assert!(matches!(proxy.open().await, Err(PickerError::Aborted)));
        assert!(loader.factory().picker().calls().is_empty());
    }

    #[tokio::test]
    async fn test_abort_policy_ignores_cancel_after_load() {
        let loader = Arc::new(MockLoader::default());
        let config = ProxyConfig::default().with_loading_cancel(LoadingCancelPolicy::AbortIfLoading);
        let proxy = PickerProxy::spawn(context(), loader.clone(), PickerOptions::default(), &config);

        proxy.ready().await.unwrap();
        proxy.cancel().await.unwrap();

        assert!(proxy.state().is_ready());
        assert!(loader.factory().picker().is_cancelled());
    }

    #[tokio::test]
    async fn test_factory_failure_is_acquisition_failure() {
        let factory = Arc::new(crate::capability::MockFactory::default().with_failure("bad options"));
        let loader = Arc::new(MockLoader::new(factory));
        let proxy = PickerProxy::spawn(context(), loader, PickerOptions::default(), &ProxyConfig::default());

        let err = proxy.open().await.unwrap_err();
        assert!(matches!(
            err.load_error().map(|e| e.as_ref()),
            Some(LoadError::Initialization(message)) if message == "bad options"
        ));
    }

    #[test]
    fn test_without_runtime() {
        let loader = Arc::new(MockLoader::default());
        let proxy = PickerProxy::spawn(
            context(),
            loader.clone(),
            PickerOptions::default(),
            &ProxyConfig::default(),
        );

        assert!(matches!(proxy.state(), LoadState::Failed(PickerError::NoRuntime)));
        let result = futures::executor::block_on(proxy.open());
        assert!(matches!(result, Err(PickerError::NoRuntime)));
        assert_eq!(loader.call_count(), 0);
    }

    #[tokio::test]
    async fn test_journal_records_operations() {
        let loader = Arc::new(MockLoader::default());
        let config = ProxyConfig::default().with_journal(10);
        let proxy = PickerProxy::spawn(context(), loader, PickerOptions::default(), &config);

        proxy.open().await.unwrap();
        proxy.crop(["https://cdn.example.com/a.png"]).await.unwrap();

        let journal = proxy.journal().unwrap();
        let stats = journal.stats().await;
        assert_eq!(stats.total_operations, 2);
        assert_eq!(stats.completed, 2);

        let recent = journal.recent(10).await;
        assert_eq!(recent[0].op, OperationKind::Crop);
        assert_eq!(recent[0].proxy_id, proxy.proxy_id());
        assert!(recent[1].forwarded_at.is_some());
    }
}
