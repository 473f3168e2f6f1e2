use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events raised by the services after a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ProductCreated(Uuid),
    ProductDeleted(Uuid),
    VariantStockChanged {
        product_id: Uuid,
        variant_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },
    CouponApplied {
        coupon_id: Uuid,
        user_id: Uuid,
        order_id: Option<Uuid>,
        discount_amount: Decimal,
    },
    UserRegistered(Uuid),
    PasswordResetRequested {
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ProductCreated(_) => "product_created",
            Event::ProductDeleted(_) => "product_deleted",
            Event::VariantStockChanged { .. } => "variant_stock_changed",
            Event::CouponApplied { .. } => "coupon_applied",
            Event::UserRegistered(_) => "user_registered",
            Event::PasswordResetRequested { .. } => "password_reset_requested",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a bounded channel and returns both ends.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Sends an event, waiting for capacity.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Publishes without waiting. A full or closed channel drops the event with a warning.
    pub fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.sender.try_send(event) {
            warn!(event = name, error = %e, "Dropping domain event");
        }
    }
}

/// Drains the channel until every sender is gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::ProductCreated(product_id) => {
                info!(event = event.name(), %product_id, "Product created");
            }
            Event::ProductDeleted(product_id) => {
                info!(event = event.name(), %product_id, "Product deleted");
            }
            Event::VariantStockChanged {
                product_id,
                variant_id,
                old_quantity,
                new_quantity,
            } => {
                info!(
                    event = event.name(),
                    %product_id,
                    %variant_id,
                    old_quantity,
                    new_quantity,
                    "Variant stock changed"
                );
                if *new_quantity == 0 {
                    warn!(%variant_id, "Variant is out of stock");
                }
            }
            Event::CouponApplied {
                coupon_id,
                user_id,
                order_id,
                discount_amount,
            } => {
                info!(
                    event = event.name(),
                    %coupon_id,
                    %user_id,
                    order_id = ?order_id,
                    %discount_amount,
                    "Coupon applied"
                );
            }
            Event::UserRegistered(user_id) => {
                info!(event = event.name(), %user_id, "User registered");
            }
            Event::PasswordResetRequested {
                user_id,
                expires_at,
            } => {
                info!(event = event.name(), %user_id, %expires_at, "Password reset requested");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_drops_when_channel_is_full() {
        let (sender, mut rx) = EventSender::channel(1);
        let id = Uuid::new_v4();
        sender.send_or_log(Event::ProductCreated(id));
        sender.send_or_log(Event::ProductDeleted(id));

        assert_eq!(rx.recv().await, Some(Event::ProductCreated(id)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn process_events_ends_when_senders_drop() {
        let (sender, rx) = EventSender::channel(4);
        sender
            .send(Event::UserRegistered(Uuid::new_v4()))
            .await
            .unwrap();
        drop(sender);
        process_events(rx).await;
    }
}
