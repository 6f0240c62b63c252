/// Outbound mail for new-lead notifications
///
/// A `LeadMessage` is built from a freshly stored Lead and handed to a
/// `Mailer` transport. Two transports ship: `LogMailer` writes the message to
/// the structured log, `HttpMailer` POSTs it as JSON to a mail relay.

use crate::project::types::Lead;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Upper bound on one relay round trip
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification about a new lead, addressed to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    /// Lead the message refers to
    pub lead_id: i64,
}

impl LeadMessage {
    /// Build the operator notification for `lead`
    pub fn for_lead(lead: &Lead, to: &str, from: &str) -> Self {
        let mut body = format!(
            "A new project has been added to the portfolio.\n\nTitle: {}\nSlug: {}\n",
            lead.title, lead.slug
        );
        if let Some(content) = lead.content.as_deref().filter(|c| !c.trim().is_empty()) {
            body.push('\n');
            body.push_str(content);
            body.push('\n');
        }

        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: format!("New lead: {}", lead.title),
            body,
            lead_id: lead.id,
        }
    }
}

/// Mail transport
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: &LeadMessage) -> Result<()>;
}

/// Transport that only logs messages
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &LeadMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            lead_id = message.lead_id,
            "📧 {}",
            message.subject
        );
        tracing::debug!("📄 Mail body:\n{}", message.body);
        Ok(())
    }
}

/// Transport that delivers through an HTTP mail relay
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    /// Relay client with the default request timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, RELAY_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build mail relay client: {}", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &LeadMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Mail relay request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Mail relay returned {}: {}", status, body));
        }

        tracing::info!("📧 Relayed mail for lead {} to {}", message.lead_id, message.to);
        Ok(())
    }
}
