use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// Identifies one activation of a game session in the logs.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub struct Id(pub Uuid);
impl Id {
    pub fn new() -> Self {
        Id(Uuid::new_v4())
    }
}
impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}
impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broadcast receiver that fires once on ctrl-c.
pub async fn create_shutdown_channel() -> broadcast::Receiver<()> {
    let (shutdown_sender, shutdown_receiver): (broadcast::Sender<()>, broadcast::Receiver<()>) =
        broadcast::channel::<()>(100);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("signal received, starting graceful shutdown");
                let _ = shutdown_sender.send(());
            }
            Err(e) => {
                // Keep the sender alive so receivers don't read the closed channel as a shutdown
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });
    shutdown_receiver
}
