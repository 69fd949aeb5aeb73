//! ExpenseGenie outbound email
//!
//! [`EmailService`] renders the verification and password-reset messages and
//! hands them to a [`Mailer`]:
//!
//! - [`SmtpMailer`]: SMTP relay or Gmail via lettre
//! - [`LogMailer`]: development default, logs the message
//! - [`MemoryMailer`]: records messages for tests
//!
//! Send failures are returned to the caller, which decides whether they are
//! fatal for the request.

pub mod config;
pub mod error;
pub mod service;
pub mod templates;
pub mod transport;

pub use config::{MailConfig, MailTransport};
pub use error::{MailError, MailResult};
pub use service::EmailService;
pub use templates::EmailMessage;
pub use transport::{LogMailer, Mailer, MemoryMailer, SmtpMailer};
