//! Deliver one message to every stored subscription

use anyhow::Result;
use journal::SubscriptionStore;
use tracing::{info, warn};

use crate::error::DeliveryError;
use crate::push::PushProvider;
use crate::reminder::ReminderMessage;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
    /// Failed deliveries whose subscription was kept
    pub failed: usize,
    /// Dead subscriptions removed from the store
    pub pruned: usize,
}

/// Send `message` to each subscriber in turn
///
/// A failed delivery never stops the rest. Endpoints reported gone are
/// removed from the store once every subscriber was tried.
pub async fn broadcast(
    store: &SubscriptionStore,
    provider: &dyn PushProvider,
    message: &ReminderMessage,
) -> Result<BroadcastReport> {
    let subscriptions = store.list();
    let mut report = BroadcastReport {
        attempted: subscriptions.len(),
        ..BroadcastReport::default()
    };
    let mut dead = Vec::new();

    for subscription in &subscriptions {
        match provider.deliver(subscription, message).await {
            Ok(()) => report.delivered += 1,
            Err(DeliveryError::Gone) => {
                warn!("Push endpoint gone, pruning: {}", subscription.endpoint);
                dead.push(subscription.endpoint.clone());
            }
            Err(e) => {
                warn!("Push to {} failed: {}", subscription.endpoint, e);
                report.failed += 1;
            }
        }
    }

    report.pruned = store.remove_endpoints(&dead)?;
    info!(
        "Sent \"{}\" to {}/{} subscribers ({} pruned)",
        message.title, report.delivered, report.attempted, report.pruned
    );
    Ok(report)
}
