//! Mail transports

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{MailConfig, MailTransport};
use crate::error::{MailError, MailResult};
use crate::templates::EmailMessage;

const GMAIL_RELAY: &str = "smtp.gmail.com";

/// Something that can deliver an [`EmailMessage`]
#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> MailResult<()>;
}

/// Development transport: logs instead of delivering
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "Email not delivered (log transport)"
        );
        Ok(())
    }
}

/// SMTP delivery through lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> MailResult<Self> {
        let credentials = match (&config.smtp_user, &config.smtp_password) {
            (Some(user), Some(password)) => Some(Credentials::new(user.clone(), password.clone())),
            _ => None,
        };

        let builder = match config.transport {
            MailTransport::Gmail => AsyncSmtpTransport::<Tokio1Executor>::relay(GMAIL_RELAY)?,
            MailTransport::Smtp => {
                let host = config
                    .smtp_host
                    .as_deref()
                    .ok_or_else(|| MailError::Config("smtp_host is required".to_string()))?;
                let builder = if config.smtp_secure {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
                };
                builder.port(config.smtp_port)
            }
            MailTransport::Log => {
                return Err(MailError::Config(
                    "log transport has no SMTP settings".to_string(),
                ))
            }
        };

        let builder = match credentials {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from: mailbox(Some(&config.from_name), &config.from_address)?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(mailbox(None, &message.to)?)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))?;

        let response = self.transport.send(email).await?;
        tracing::debug!(to = %message.to, code = %response.code(), "Email delivered");
        Ok(())
    }
}

fn mailbox(name: Option<&str>, address: &str) -> MailResult<Mailbox> {
    let email = address.parse().map_err(|e: lettre::address::AddressError| {
        MailError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(Mailbox::new(name.map(str::to_string), email))
}

/// Records messages in memory; used by tests
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `send` fail with a transport error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Most recent message sent to `to`
    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, message: &EmailMessage) -> MailResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("mailbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
