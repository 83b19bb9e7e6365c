use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::spawn;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::models::{LedgerConfig, LedgerError, LedgerStore, Page, TransactionRecord};
use crate::storage::Storage;
use crate::types::{SessionId, SortOrder, TransactionId};

enum LedgerCommand {
    #[cfg(test)]
    Generate(u64),
    ApplyFilter(String),
    SortBy(SortOrder),
    Page(oneshot::Sender<Page>),
    AdvancePage(oneshot::Sender<bool>),
    RetreatPage(oneshot::Sender<bool>),
    AppendLive(Decimal, oneshot::Sender<Result<TransactionRecord, LedgerError>>),
    FindById(TransactionId, oneshot::Sender<Option<TransactionRecord>>),
    Recent(usize, oneshot::Sender<Vec<TransactionRecord>>),
    Balance(oneshot::Sender<Decimal>),
    Shutdown
}

/// Owns the ledger of one session on its own task.
///
/// Every operation is a message on the actor's queue, so operations run one at a time in
/// the order they were sent and the ledger never needs a lock.
pub struct LedgerActor {
    handle: LedgerHandle,
    task: JoinHandle<()>
}

impl LedgerActor {
    /// Spawns the actor, resuming the session from storage or generating a fresh ledger.
    pub fn spawn<S: Storage>(session_id: SessionId, storage: Arc<S>, config: LedgerConfig) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let task = spawn(async move {
            let mut ledger = match storage.load(session_id) {
                Some(ledger) => {
                    info!("Resumed ledger for session [{session_id}]");
                    ledger
                },
                None => LedgerStore::generated(&config)
            };

            while let Some(command) = receiver.recv().await {
                if !handle_command(&mut ledger, command) {
                    break;
                }
            }

            storage.save(session_id, ledger);
            debug!("Ledger for session [{session_id}] saved");
        });

        Self {
            handle: LedgerHandle { session_id, sender },
            task
        }
    }

    /// A cloneable sender for scheduled tasks and other callers.
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Stops the actor after everything already queued and waits for the ledger to be saved.
    pub async fn despawn(self) -> Result<(), JoinError> {
        if self.handle.sender.send(LedgerCommand::Shutdown).is_err() {
            warn!("Ledger actor for session [{}] had already stopped", self.handle.session_id);
        }

        self.task.await
    }
}

impl std::ops::Deref for LedgerActor {
    type Target = LedgerHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

/// Returns false once the actor should stop.
fn handle_command(ledger: &mut LedgerStore, command: LedgerCommand) -> bool {
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        #[cfg(test)]
        LedgerCommand::Generate(seed) => ledger.generate(seed),
        LedgerCommand::ApplyFilter(query) => ledger.apply_filter(&query),
        LedgerCommand::SortBy(order) => ledger.sort_by(order),
        LedgerCommand::Page(reply) => {
            let _ = reply.send(ledger.page());
        },
        LedgerCommand::AdvancePage(reply) => {
            let _ = reply.send(ledger.advance_page());
        },
        LedgerCommand::RetreatPage(reply) => {
            let _ = reply.send(ledger.retreat_page());
        },
        LedgerCommand::AppendLive(amount, reply) => {
            let result = ledger.append_live(amount);

            if let Err(error) = &result {
                warn!("{error}");
            }

            let _ = reply.send(result);
        },
        LedgerCommand::FindById(id, reply) => {
            let _ = reply.send(ledger.find_by_id(&id).cloned());
        },
        LedgerCommand::Recent(count, reply) => {
            let _ = reply.send(ledger.recent(count));
        },
        LedgerCommand::Balance(reply) => {
            let _ = reply.send(ledger.balance());
        },
        LedgerCommand::Shutdown => return false
    }

    true
}

/// Client side of a [`LedgerActor`].
#[derive(Clone)]
pub struct LedgerHandle {
    session_id: SessionId,
    sender: mpsc::UnboundedSender<LedgerCommand>
}

impl LedgerHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[cfg(test)]
    pub fn generate(&self, seed: u64) -> Result<(), LedgerError> {
        self.send(LedgerCommand::Generate(seed))
    }

    pub fn apply_filter(&self, query: &str) -> Result<(), LedgerError> {
        self.send(LedgerCommand::ApplyFilter(query.to_string()))
    }

    pub fn sort_by(&self, order: SortOrder) -> Result<(), LedgerError> {
        self.send(LedgerCommand::SortBy(order))
    }

    pub async fn page(&self) -> Result<Page, LedgerError> {
        self.request(LedgerCommand::Page).await
    }

    pub async fn advance_page(&self) -> Result<bool, LedgerError> {
        self.request(LedgerCommand::AdvancePage).await
    }

    pub async fn retreat_page(&self) -> Result<bool, LedgerError> {
        self.request(LedgerCommand::RetreatPage).await
    }

    pub async fn append_live(&self, amount: Decimal) -> Result<TransactionRecord, LedgerError> {
        self.request(|reply| LedgerCommand::AppendLive(amount, reply)).await?
    }

    pub async fn find_by_id(&self, id: &TransactionId) -> Result<Option<TransactionRecord>, LedgerError> {
        let id = id.clone();
        self.request(|reply| LedgerCommand::FindById(id, reply)).await
    }

    /// Detail text for a record, or `TransactionNotFound`.
    pub async fn describe(&self, id: &TransactionId) -> Result<String, LedgerError> {
        self.find_by_id(id).await?
            .map(|record| record.describe())
            .ok_or_else(|| LedgerError::transaction_not_found(id))
    }

    pub async fn recent(&self, count: usize) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.request(|reply| LedgerCommand::Recent(count, reply)).await
    }

    pub async fn balance(&self) -> Result<Decimal, LedgerError> {
        self.request(LedgerCommand::Balance).await
    }

    fn send(&self, command: LedgerCommand) -> Result<(), LedgerError> {
        self.sender.send(command)
            .map_err(|_| LedgerError::actor_unavailable(self.session_id))
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> LedgerCommand) -> Result<T, LedgerError> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply))?;

        response.await
            .map_err(|_| LedgerError::actor_unavailable(self.session_id))
    }
}
