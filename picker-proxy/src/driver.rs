//! Background task behind a [`PickerProxy`](crate::PickerProxy).
//!
//! The driver owns the one acquisition attempt and the command queue. It runs
//! in three phases: while loading it buffers commands in arrival order, once
//! ready it forwards them to the instance, and after a failed load it answers
//! every command with the shared error.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use picker_schema::PickerOptions;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::capability::{CapabilityLoader, PickerInstance};
use crate::config::LoadingCancelPolicy;
use crate::context::ConnectionContext;
use crate::error::{LoadError, PickerError};
use crate::journal::{JournalEntry, OperationJournal, Outcome};
use crate::types::{LoadState, OperationKind, PickerCall, PICKER_MODULE_ID};

/// A call sent from a proxy handle.
pub(crate) struct Command {
    pub call: PickerCall,
    pub issued_at: DateTime<Utc>,
    pub reply: oneshot::Sender<Result<(), PickerError>>,
}

/// Where a call's outcome goes.
struct Responder {
    reply: oneshot::Sender<Result<(), PickerError>>,
    entry_id: Option<String>,
}

impl Responder {
    async fn settle(self, journal: Option<&OperationJournal>, result: Result<(), PickerError>) {
        if let (Some(journal), Some(entry_id)) = (journal, &self.entry_id) {
            journal
                .log_outcome(entry_id, Outcome::from_result(&result))
                .await;
        }
        // The caller may have dropped its Operation; the call still counts.
        let _ = self.reply.send(result);
    }
}

/// A command the driver has taken off the queue.
struct Accepted {
    call: PickerCall,
    responder: Responder,
}

pub(crate) struct Driver {
    pub proxy_id: String,
    pub context: ConnectionContext,
    pub loader: Arc<dyn CapabilityLoader>,
    pub options: PickerOptions,
    pub policy: LoadingCancelPolicy,
    pub commands: mpsc::UnboundedReceiver<Command>,
    pub state: watch::Sender<LoadState>,
    pub journal: Option<Arc<OperationJournal>>,
}

impl Driver {
    /// Settle as failed without ever loading.
    pub(crate) fn fail_without_runtime(self) {
        self.state
            .send_replace(LoadState::Failed(PickerError::NoRuntime));
    }

    pub(crate) async fn run(mut self) {
        let mut backlog = VecDeque::new();

        match self.acquire(&mut backlog).await {
            Some(Ok(instance)) => {
                self.state.send_replace(LoadState::Ready);
                self.serve(instance, backlog).await;
            }
            Some(Err(err)) => {
                self.state.send_replace(LoadState::Failed(err.clone()));
                self.refuse(err, backlog).await;
            }
            None => {
                debug!(proxy_id = %self.proxy_id, "All handles dropped while loading");
            }
        }
    }

    /// Run the acquisition, queueing commands that arrive meanwhile.
    ///
    /// Returns `None` when every handle is gone and nothing is queued.
    async fn acquire(
        &mut self,
        backlog: &mut VecDeque<Accepted>,
    ) -> Option<Result<Arc<dyn PickerInstance>, PickerError>> {
        info!(
            proxy_id = %self.proxy_id,
            endpoint = %self.context.endpoint(),
            module_id = PICKER_MODULE_ID,
            "Acquiring picker"
        );

        let load = load_instance(
            Arc::clone(&self.loader),
            self.context.clone(),
            std::mem::take(&mut self.options),
        );
        tokio::pin!(load);

        let mut accepting = true;
        loop {
            tokio::select! {
                biased;

                result = &mut load => return Some(result.map_err(PickerError::from)),

                command = self.commands.recv(), if accepting => match command {
                    Some(command) => {
                        let accepted = self.accept(command).await;
                        if accepted.call.kind() == OperationKind::Cancel
                            && self.policy == LoadingCancelPolicy::AbortIfLoading
                        {
                            info!(proxy_id = %self.proxy_id, "Cancel issued while loading, aborting");
                            accepted
                                .responder
                                .settle(self.journal.as_deref(), Ok(()))
                                .await;
                            return Some(Err(PickerError::Aborted));
                        }
                        backlog.push_back(accepted);
                    }
                    None if backlog.is_empty() => return None,
                    None => accepting = false,
                },
            }
        }
    }

    /// Forward queued and future commands to the instance.
    async fn serve(&mut self, instance: Arc<dyn PickerInstance>, backlog: VecDeque<Accepted>) {
        info!(proxy_id = %self.proxy_id, queued = backlog.len(), "Picker ready");

        let mut in_flight: FuturesUnordered<BoxFuture<'static, ()>> = FuturesUnordered::new();
        for accepted in backlog {
            self.dispatch(&instance, accepted, &mut in_flight).await;
        }

        let mut accepting = true;
        loop {
            tokio::select! {
                command = self.commands.recv(), if accepting => match command {
                    Some(command) => {
                        let accepted = self.accept(command).await;
                        self.dispatch(&instance, accepted, &mut in_flight).await;
                    }
                    None => accepting = false,
                },
                Some(()) = in_flight.next(), if !in_flight.is_empty() => {}
                else => break,
            }
        }

        debug!(proxy_id = %self.proxy_id, "Picker driver finished");
    }

    /// Answer queued and future commands with the load error.
    async fn refuse(&mut self, err: PickerError, backlog: VecDeque<Accepted>) {
        warn!(
            proxy_id = %self.proxy_id,
            error = %err,
            queued = backlog.len(),
            "Picker failed to load"
        );

        for accepted in backlog {
            let result = refusal(&err, &accepted.call);
            accepted
                .responder
                .settle(self.journal.as_deref(), result)
                .await;
        }

        while let Some(command) = self.commands.recv().await {
            let accepted = self.accept(command).await;
            let result = refusal(&err, &accepted.call);
            accepted
                .responder
                .settle(self.journal.as_deref(), result)
                .await;
        }
    }

    async fn accept(&self, command: Command) -> Accepted {
        let entry_id = match &self.journal {
            Some(journal) => {
                let entry = JournalEntry::issued(&self.proxy_id, command.call.kind(), command.issued_at);
                let entry_id = entry.entry_id.clone();
                journal.log_issued(entry).await;
                Some(entry_id)
            }
            None => None,
        };

        Accepted {
            call: command.call,
            responder: Responder {
                reply: command.reply,
                entry_id,
            },
        }
    }

    /// Start forwarding one call.
    ///
    /// The call is polled once here so the instance sees calls begin in the
    /// order they were issued, even when an earlier one is still running.
    async fn dispatch(
        &self,
        instance: &Arc<dyn PickerInstance>,
        accepted: Accepted,
        in_flight: &mut FuturesUnordered<BoxFuture<'static, ()>>,
    ) {
        let Accepted { call, responder } = accepted;

        if let (Some(journal), Some(entry_id)) = (&self.journal, &responder.entry_id) {
            journal.log_forwarded(entry_id).await;
        }
        debug!(proxy_id = %self.proxy_id, op = %call.kind(), "Forwarding to picker");

        let mut forward = forward(
            Arc::clone(instance),
            call,
            responder,
            self.journal.clone(),
            self.proxy_id.clone(),
        )
        .boxed();

        if futures::poll!(&mut forward).is_pending() {
            in_flight.push(forward);
        }
    }
}

/// Answer for a call reaching a proxy whose load failed.
///
/// Once a cancel has aborted the load, further cancels find the picker
/// already cancelled and succeed.
fn refusal(err: &PickerError, call: &PickerCall) -> Result<(), PickerError> {
    match (err, call) {
        (PickerError::Aborted, PickerCall::Cancel) => Ok(()),
        _ => Err(err.clone()),
    }
}

async fn load_instance(
    loader: Arc<dyn CapabilityLoader>,
    context: ConnectionContext,
    options: PickerOptions,
) -> Result<Arc<dyn PickerInstance>, LoadError> {
    let factory = loader.acquire(context.endpoint(), PICKER_MODULE_ID).await?;
    factory.create(&context, options)
}

async fn forward(
    instance: Arc<dyn PickerInstance>,
    call: PickerCall,
    responder: Responder,
    journal: Option<Arc<OperationJournal>>,
    proxy_id: String,
) {
    let op = call.kind();
    let result = match call {
        PickerCall::Open => instance.open().await,
        PickerCall::Close => instance.close().await,
        PickerCall::Cancel => instance.cancel().await,
        PickerCall::Crop(files) => instance.crop(files).await,
    }
    .map_err(|source| PickerError::Operation { op, source });

    if let Err(err) = &result {
        warn!(proxy_id = %proxy_id, %op, error = %err, "Picker operation failed");
    }

    responder.settle(journal.as_deref(), result).await;
}
