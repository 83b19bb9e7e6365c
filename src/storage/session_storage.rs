use dashmap::DashMap;
use tracing::{debug, warn};

use crate::models::LedgerStore;
use crate::storage::Storage;
use crate::types::SessionId;

/// Parked ledgers of sessions whose actor is not currently running.
#[derive(Default)]
pub struct SessionStorage {
    parked: DashMap<SessionId, LedgerStore>
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every parked session, ascending.
    pub fn parked_sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self.parked.iter()
            .map(|entry| *entry.key())
            .collect();

        sessions.sort_unstable();
        sessions
    }
}

impl Storage for SessionStorage {
    fn load(&self, session_id: SessionId) -> Option<LedgerStore> {
        let (_, ledger) = self.parked.remove(&session_id)?;
        debug!("Session [{session_id}] unparked with {} records", ledger.records().len());

        Some(ledger)
    }

    fn save(&self, session_id: SessionId, ledger: LedgerStore) {
        let records = ledger.records().len();

        if self.parked.insert(session_id, ledger).is_some() {
            warn!("Session [{session_id}] was already parked, keeping the newer ledger");
        }

        debug!("Session [{session_id}] parked with {records} records");
    }
}
