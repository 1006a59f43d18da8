use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::purchase_order_entity::PurchaseOrderStatus;

/// Domain events published by lifecycle operations after commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PurchaseRequestCreated(Uuid),
    PurchaseRequestSubmitted(Uuid),
    PurchaseRequestApproved(Uuid),
    PurchaseRequestRejected(Uuid),

    PurchaseOrderCreated(Uuid),
    PurchaseOrderStatusChanged {
        purchase_order_id: Uuid,
        old_status: PurchaseOrderStatus,
        new_status: PurchaseOrderStatus,
    },
    PurchaseOrderRejected(Uuid),

    GoodsReceiptCreated {
        goods_receipt_id: Uuid,
        purchase_order_id: Uuid,
    },
    InventoryReceived {
        product_id: Uuid,
        warehouse_id: Uuid,
        quantity: i32,
    },
    AssetsCapitalized {
        goods_receipt_id: Uuid,
        count: u32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a full or closed channel is logged, never fatal.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Creates a channel pair sized for a single service process.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Background task that drains the event channel. Consumers beyond
/// logging (webhooks, projections) would hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "Processing domain event");
    }
    info!("Event channel closed; processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_events_in_order() {
        let (sender, mut rx) = channel(8);
        let id = Uuid::new_v4();
        sender.send(Event::PurchaseRequestCreated(id)).await.unwrap();
        sender.send(Event::PurchaseRequestSubmitted(id)).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::PurchaseRequestCreated(got)) if got == id
        ));
        assert!(matches!(
            rx.recv().await,
            Some(Event::PurchaseRequestSubmitted(got)) if got == id
        ));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (sender, rx) = channel(1);
        drop(rx);
        // Must not panic or error out
        sender.send_or_log(Event::PurchaseOrderCreated(Uuid::new_v4())).await;
    }
}
