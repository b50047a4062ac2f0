//! Account list refresh.

use tracing::{debug, info, warn};

use super::event::{JobPayload, Outcome};
use super::kind::JobHandle;
use crate::account::AccountBackend;

/// Read the complete account list from the backend.
///
/// The backend call is not interrupted on cancellation; its result is
/// discarded instead.
pub(crate) async fn run<B>(backend: &B, handle: &JobHandle) -> Outcome
where
    B: AccountBackend + ?Sized,
{
    if handle.is_cancelled() {
        return Outcome::Cancelled;
    }

    let result = backend.list_accounts().await;

    if handle.is_cancelled() {
        debug!(
            sequence = handle.sequence(),
            "Account query cancelled; discarding result"
        );
        return Outcome::Cancelled;
    }

    match result {
        Ok(accounts) => {
            info!(
                sequence = handle.sequence(),
                count = accounts.len(),
                "Account query finished"
            );
            Outcome::Success(JobPayload::Accounts(accounts.into()))
        }
        Err(e) => {
            warn!(sequence = handle.sequence(), "Account query failed: {e}");
            Outcome::Failed(e.to_string())
        }
    }
}
