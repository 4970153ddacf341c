use std::time::Duration;

use common::{
    line::LineChannel,
    model::{
        game::Move,
        messages::{Outcome, Request, RESET_ACK},
    },
};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::model::error::ExchangeError;

/// Request/response client for the arbiter. One exchange at a time: `&mut self` keeps it that way.
pub struct ProtocolClient {
    channel: Box<dyn LineChannel>,
}

impl ProtocolClient {
    pub fn new(channel: Box<dyn LineChannel>) -> Self {
        ProtocolClient { channel }
    }

    /// Write one request line and read one reply line, both within `deadline`.
    pub async fn exchange(
        &mut self,
        message: &str,
        deadline: Duration,
    ) -> Result<String, ExchangeError> {
        debug!("-> {}", message);
        let channel = &mut self.channel;
        let reply = timeout(deadline, async move {
            channel.write_line(message).await?;
            channel.read_line().await
        })
        .await
        .map_err(|_| ExchangeError::Timeout(deadline))??;
        debug!("<- {}", reply);
        Ok(reply)
    }

    pub fn build_reset_message() -> String {
        Request::Reset.to_line()
    }

    pub fn build_choice_message(one: Move, two: Move) -> String {
        Request::Choices { one, two }.to_line()
    }

    pub fn is_reset_ack(reply: &str) -> bool {
        reply.contains(RESET_ACK)
    }

    pub fn classify(reply: &str) -> Outcome {
        Outcome::classify(reply)
    }

    /// Release the channel.
    pub async fn close(mut self) {
        if let Err(e) = self.channel.close().await {
            warn!("Error closing channel: {}", e);
        }
    }
}
