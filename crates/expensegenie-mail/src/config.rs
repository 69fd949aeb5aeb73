//! Email configuration

use serde::{Deserialize, Serialize};

/// How messages leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Write messages to the log; nothing is delivered
    #[default]
    Log,
    /// Generic SMTP relay
    Smtp,
    /// Gmail SMTP with an app password
    Gmail,
}

impl MailTransport {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "log" | "console" | "" => Some(Self::Log),
            "smtp" => Some(Self::Smtp),
            "gmail" => Some(Self::Gmail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    /// Implicit TLS instead of STARTTLS
    pub smtp_secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
    pub from_name: String,
    /// Base URL for links in emails
    pub frontend_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Log,
            smtp_host: None,
            smtp_port: 587,
            smtp_secure: false,
            smtp_user: None,
            smtp_password: None,
            from_address: "noreply@expensegenie.com".to_string(),
            from_name: "ExpenseGenie".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl MailConfig {
    /// Whether a real transport has the settings it needs
    pub fn is_deliverable(&self) -> bool {
        match self.transport {
            MailTransport::Log => false,
            MailTransport::Smtp => self.smtp_host.is_some(),
            MailTransport::Gmail => self.smtp_user.is_some() && self.smtp_password.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parsing() {
        assert_eq!(MailTransport::from_str("gmail"), Some(MailTransport::Gmail));
        assert_eq!(MailTransport::from_str(" SMTP "), Some(MailTransport::Smtp));
        assert_eq!(MailTransport::from_str(""), Some(MailTransport::Log));
        assert_eq!(MailTransport::from_str("sendgrid"), None);
    }

    #[test]
    fn test_deliverable() {
        let mut config = MailConfig::default();
        assert!(!config.is_deliverable());

        config.transport = MailTransport::Smtp;
        assert!(!config.is_deliverable());
        config.smtp_host = Some("smtp.example.com".into());
        assert!(config.is_deliverable());

        config.transport = MailTransport::Gmail;
        assert!(!config.is_deliverable());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MailConfig = serde_json::from_str(r#"{"transport": "smtp"}"#).unwrap();
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.from_address, "noreply@expensegenie.com");
        assert_eq!(config.frontend_url, "http://localhost:5173");
    }
}
