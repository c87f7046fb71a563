//! Connection guard for automatic disconnect on drop.
//!
//! Every connect-and-write attempt owns its link through a
//! [`ConnectionGuard`], so a failed discovery, an aborted selection or a
//! failed write never leaves the peripheral connected.

use std::ops::Deref;

use tokio::runtime::Handle;
use tracing::warn;

use crate::error::Result;
use crate::traits::GattLink;

/// A guard that disconnects its link when released or dropped.
///
/// Prefer [`ConnectionGuard::release`], which awaits the disconnect. If the
/// guard is dropped instead (early return, cancellation, panic), the
/// disconnect is spawned on the current tokio runtime.
///
/// # Example
///
/// ```ignore
/// use bscan_core::{ConnectionGuard, Connector};
///
/// let link = adapter.connect("AA:BB:CC:DD:EE:FF", &config).await?;
/// let guard = ConnectionGuard::new(link);
/// let services = guard.discover_services().await?;
/// guard.release().await?;
/// ```
pub struct ConnectionGuard<L: GattLink + 'static> {
    link: Option<L>,
}

impl<L: GattLink + 'static> ConnectionGuard<L> {
    /// Create a new connection guard.
    pub fn new(link: L) -> Self {
        Self { link: Some(link) }
    }

    /// Disconnect now and consume the guard.
    pub async fn release(mut self) -> Result<()> {
        match self.link.take() {
            Some(link) => link.disconnect().await,
            None => Ok(()),
        }
    }

    /// Get a reference to the link.
    ///
    /// # Panics
    ///
    /// Never in practice: the link is only taken by `release`, which
    /// consumes the guard.
    pub fn link(&self) -> &L {
        self.link.as_ref().expect("link already released")
    }
}

impl<L: GattLink + 'static> Deref for ConnectionGuard<L> {
    type Target = L;

    fn deref(&self) -> &Self::Target {
        self.link()
    }
}

impl<L: GattLink + 'static> Drop for ConnectionGuard<L> {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            if let Ok(handle) = Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = link.disconnect().await {
                        warn!("Failed to disconnect {} in guard drop: {}", link.identifier(), e);
                    }
                });
            } else {
                warn!(
                    "No tokio runtime available to disconnect {} in guard drop",
                    link.identifier()
                );
            }
        }
    }
}
