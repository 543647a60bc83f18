//! Email service for password reset messages

use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a password reset token via email
    pub async fn send_password_reset(&self, to: &str, token: &str) -> AppResult<()> {
        let subject = "Your Lendery Password Reset Token";
        let body = format!(
            r#"
A password reset was requested for your Lendery account.

Your reset token is: {token}

This token will expire in 15 minutes and can only be used once.

If you didn't request a password reset, please ignore this email.
"#,
            token = token
        );

        self.send_email(to, subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Lendery");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        };

        let mailer_builder = mailer_builder.port(self.config.smtp_port);

        let mailer = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => mailer_builder
                .credentials(Credentials::new(username.clone(), password.clone()))
                .build(),
            _ => mailer_builder.build(),
        };

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        tracing::debug!(to, subject, "email sent");
        Ok(())
    }
}
