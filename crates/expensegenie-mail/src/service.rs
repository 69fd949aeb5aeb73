//! Account emails

use std::sync::Arc;

use crate::config::{MailConfig, MailTransport};
use crate::error::MailResult;
use crate::templates::{self, EmailMessage};
use crate::transport::{LogMailer, Mailer, SmtpMailer};

/// Renders account emails and hands them to a [`Mailer`]
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: impl Into<String>) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Pick the transport named by `config`
    pub fn from_config(config: &MailConfig) -> MailResult<Self> {
        let mailer: Arc<dyn Mailer> = match config.transport {
            MailTransport::Log => Arc::new(LogMailer),
            MailTransport::Smtp | MailTransport::Gmail => Arc::new(SmtpMailer::from_config(config)?),
        };
        tracing::info!(transport = mailer.name(), "Email transport ready");
        Ok(Self::new(mailer, config.frontend_url.clone()))
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, token)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    pub async fn send_verification_code(
        &self,
        email: &str,
        username: &str,
        code: &str,
        valid_minutes: i64,
    ) -> MailResult<()> {
        self.deliver(templates::verification_code(email, username, code, valid_minutes))
            .await
    }

    pub async fn send_verification(
        &self,
        email: &str,
        username: &str,
        code: &str,
        token: &str,
        valid_minutes: i64,
    ) -> MailResult<()> {
        let link = self.verification_link(token);
        self.deliver(templates::verification(email, username, code, &link, valid_minutes))
            .await
    }

    pub async fn send_password_reset(&self, email: &str, username: &str, token: &str) -> MailResult<()> {
        let link = self.reset_link(token);
        self.deliver(templates::password_reset(email, username, &link)).await
    }

    async fn deliver(&self, message: EmailMessage) -> MailResult<()> {
        match self.mailer.send(&message).await {
            Ok(()) => {
                tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(to = %message.to, error = %e, "Failed to send email");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryMailer;

    #[tokio::test]
    async fn test_links_use_frontend_url() {
        let mailer = Arc::new(MemoryMailer::new());
        let service = EmailService::new(mailer.clone(), "https://app.example.com/");

        service
            .send_password_reset("a@example.com", "a", "tok123")
            .await
            .unwrap();

        let sent = mailer.last_to("a@example.com").unwrap();
        assert!(sent
            .text
            .contains("https://app.example.com/reset-password?token=tok123"));
    }

    #[tokio::test]
    async fn test_verification_carries_code_and_link() {
        let mailer = Arc::new(MemoryMailer::new());
        let service = EmailService::new(mailer.clone(), "http://localhost:5173");

        service
            .send_verification("a@example.com", "a", "654321", "tok", 15)
            .await
            .unwrap();

        let sent = mailer.last_to("a@example.com").unwrap();
        assert!(sent.text.contains("654321"));
        assert!(sent.text.contains("http://localhost:5173/verify-email?token=tok"));
    }

    #[tokio::test]
    async fn test_failures_are_returned() {
        let mailer = Arc::new(MemoryMailer::new());
        mailer.set_failing(true);
        let service = EmailService::new(mailer, "http://localhost:5173");

        assert!(service
            .send_verification_code("a@example.com", "a", "111111", 15)
            .await
            .is_err());
    }

    #[test]
    fn test_log_transport_from_default_config() {
        assert!(EmailService::from_config(&MailConfig::default()).is_ok());
    }
}
