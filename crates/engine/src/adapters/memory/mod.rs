//! In-memory collaborators.
//!
//! Backed by `tokio::sync::RwLock`-guarded maps. Each call fails with a
//! deadline error if the request context has already expired.

mod catalog;
mod orders;
mod payments;
mod users;

pub use catalog::MemoryCatalog;
pub use orders::MemoryOrderStore;
pub use payments::MemoryPaymentProcessor;
pub use users::MemoryCredentialStore;

use crate::context::{Context, DeadlineExceeded};

fn check_deadline(ctx: &Context) -> Result<(), DeadlineExceeded> {
    if ctx.is_expired() {
        return Err(DeadlineExceeded);
    }
    Ok(())
}
