//! Alert delivery through email and SMS gateway endpoints.
//!
//! Both channels are fire-and-forget: one attempt each, failures logged at
//! warn and swallowed. Dispatch never returns an error to the caller.

use crate::scan::Alert;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, warn};

pub struct EmailChannel {
    pub endpoint: String,
    pub from: String,
    pub to: String,
    pub token: Option<SecretString>,
}

pub struct SmsChannel {
    pub endpoint: String,
    pub to: String,
    pub token: Option<SecretString>,
}

pub struct Notifier {
    client: Client,
    email: Option<EmailChannel>,
    sms: Option<SmsChannel>,
}

impl Notifier {
    pub fn new(client: Client, email: Option<EmailChannel>, sms: Option<SmsChannel>) -> Self {
        Self { client, email, sms }
    }

    /// True when at least one channel is configured.
    pub fn is_active(&self) -> bool {
        self.email.is_some() || self.sms.is_some()
    }

    /// Attempt delivery on both channels independently. A channel failure
    /// never blocks the other channel or the caller.
    pub async fn dispatch(&self, alert: &Alert) {
        let email_attempt = async {
            if let Some(channel) = &self.email {
                match self.send_email(channel, alert).await {
                    Ok(()) => debug!(symbol = %alert.symbol, "email alert delivered"),
                    Err(err) => {
                        warn!(symbol = %alert.symbol, error = %err, "email delivery failed")
                    }
                }
            }
        };
        let sms_attempt = async {
            if let Some(channel) = &self.sms {
                match self.send_sms(channel, alert).await {
                    Ok(()) => debug!(symbol = %alert.symbol, "sms alert delivered"),
                    Err(err) => {
                        warn!(symbol = %alert.symbol, error = %err, "sms delivery failed")
                    }
                }
            }
        };
        futures::future::join(email_attempt, sms_attempt).await;
    }

    async fn send_email(&self, channel: &EmailChannel, alert: &Alert) -> Result<(), reqwest::Error> {
        let mut request = self.client.post(&channel.endpoint).json(&json!({
            "from": channel.from,
            "to": channel.to,
            "subject": alert.subject,
            "body": alert.message,
        }));
        if let Some(token) = &channel.token {
            request = request.bearer_auth(token.expose_secret());
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }

    async fn send_sms(&self, channel: &SmsChannel, alert: &Alert) -> Result<(), reqwest::Error> {
        let mut request = self.client.post(&channel.endpoint).json(&json!({
            "to": channel.to,
            "body": alert.message,
        }));
        if let Some(token) = &channel.token {
            request = request.bearer_auth(token.expose_secret());
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}
