mod session_storage;

use crate::models::LedgerStore;
use crate::types::SessionId;

pub use session_storage::SessionStorage;

/// Where a session's ledger waits while no actor owns it.
///
/// `load` hands the ledger over instead of copying it, so at most one actor owns a session.
pub trait Storage: Send + Sync + 'static {
    fn load(&self, session_id: SessionId) -> Option<LedgerStore>;
    fn save(&self, session_id: SessionId, ledger: LedgerStore);
}
