//! Forwards stream checkpoints as MCP progress notifications.

use infranodus_core::stream::ProgressUpdate;
use rmcp::model::{Meta, ProgressNotificationParam, ProgressToken};
use rmcp::{Peer, RoleServer};
use tracing::debug;

const TOTAL: f64 = 100.0;

pub struct McpProgress {
    client: Peer<RoleServer>,
    token: ProgressToken,
}

impl McpProgress {
    /// `None` when the caller did not ask for progress.
    pub fn from_request(meta: &Meta, client: Peer<RoleServer>) -> Option<Self> {
        meta.get_progress_token().map(|token| Self {
            client,
            token: token.clone(),
        })
    }

    pub async fn report(&self, update: &ProgressUpdate) {
        let param = ProgressNotificationParam {
            progress_token: self.token.clone(),
            progress: update.progress.map_or(0.0, f64::from),
            total: Some(TOTAL),
            message: Some(update.message.to_string()),
        };
        if let Err(err) = self.client.notify_progress(param).await {
            debug!(error = %err, "progress notification dropped");
        }
    }
}
