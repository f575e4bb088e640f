use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events published after state changes commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockAdjusted {
        material_id: Uuid,
        transaction_id: Uuid,
        action: String,
        quantity: i32,
        new_quantity: i32,
    },
    LowStockDetected {
        material_id: Uuid,
        quantity: i32,
        min_quantity: i32,
    },
    MaterialCreated(Uuid),
    MaterialUpdated(Uuid),
    MaterialDeleted(Uuid),
    CategoryCreated(Uuid),
    CategoryDeleted(Uuid),
    MachineCreated(Uuid),
    MachineDeleted(Uuid),
    UserRegistered(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStockDetected {
                material_id,
                quantity,
                min_quantity,
            } => {
                warn!(
                    material_id = %material_id,
                    quantity = %quantity,
                    min_quantity = %min_quantity,
                    "Material at or below minimum quantity"
                );
            }
            other => {
                info!(event = ?other, "Processing event");
            }
        }
    }
    info!("Event channel closed, processor exiting");
}
