//! Outbound email over SMTP.
//!
//! The mailer is optional: when no SMTP settings are configured the
//! server still runs, and endpoints that need email degrade (OTP codes
//! are stored but not delivered, contact messages are rejected).

use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Deserialize;
use tracing::{info, instrument};

/// SMTP settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Display name used on the From header.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Address that receives contact-form messages. Defaults to the
    /// SMTP username.
    #[serde(default)]
    pub contact_to: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Trackify".to_string()
}

/// SMTP mailer. Cheap to clone; the underlying transport pools
/// connections.
#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from: Mailbox,
    contact_to: Mailbox,
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer").field("from", &self.from).finish()
    }
}

impl Mailer {
    /// Build a mailer from SMTP settings.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config
                .smtp_username
                .parse()
                .context("Invalid SMTP username address")?,
        );
        let contact_to = match &config.contact_to {
            Some(addr) => Mailbox::new(None, addr.parse().context("Invalid contact address")?),
            None => from.clone(),
        };

        let transport = SmtpTransport::relay(&config.smtp_host)
            .context("Failed to configure SMTP relay")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            contact_to,
        })
    }

    /// Send a one-time verification code to an address.
    #[instrument(skip(self, code))]
    pub async fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("Invalid recipient address")?)
            .subject("Your verification code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your verification code is {code}. It expires in 5 minutes."
            ))
            .context("Failed to build OTP email")?;

        self.send(message).await?;
        info!("Sent OTP email to {}", to);
        Ok(())
    }

    /// Forward a contact-form submission to the support inbox, with
    /// Reply-To set to the sender so replies reach them directly.
    #[instrument(skip(self, message))]
    pub async fn send_contact(&self, name: &str, reply_to: &str, message: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to.parse().context("Invalid sender address")?)
            .to(self.contact_to.clone())
            .subject(format!("Contact form message from {name}"))
            .header(ContentType::TEXT_PLAIN)
            .body(format!("From: {name} <{reply_to}>\n\n{message}"))
            .context("Failed to build contact email")?;

        self.send(email).await?;
        info!("Forwarded contact message from {}", reply_to);
        Ok(())
    }

    // SmtpTransport::send blocks on network I/O, so hop off the async
    // runtime for the duration.
    async fn send(&self, message: Message) -> Result<()> {
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("Mail task panicked")?
            .context("Failed to send email")?;
        Ok(())
    }
}
