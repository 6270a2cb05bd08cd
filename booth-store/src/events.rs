use booth_shared::TableEvent;
use tokio::sync::broadcast;
use tracing::{debug, info};

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out of table events to every open kiosk stream.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TableEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns the number of streams that received the event.
    pub fn publish(&self, event: TableEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => {
                info!("Published table event to {} listeners", receivers);
                receivers
            }
            Err(broadcast::error::SendError(event)) => {
                debug!("No listeners for {} on table {}", event.name(), event.table_id());
                0
            }
        }
    }

    /// Raw receiver; callers filter by table.
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
