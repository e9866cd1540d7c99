//! Password reset notification senders.
//!
//! [`SmtpNotificationSender`] delivers plain-text email over SMTP via lettre.
//! [`LogNotificationSender`] only records that a reset happened, for
//! development setups without a mail relay.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use crate::config::EmailConfig;
use crate::context::Context;
use crate::models::User;
use crate::providers::{NotificationError, NotificationSender};

const RESET_SUBJECT: &str = "Your Bookshelf password has been reset";

/// Plain-text body of the password reset email.
fn reset_body(user: &User, new_password: &str) -> String {
    format!(
        "Hello {name},\n\n\
         Your Bookshelf password has been reset. Your new password is:\n\n\
         {new_password}\n\n\
         Log in with it and change it from your account settings.\n",
        name = user.full_name(),
    )
}

/// Sends password reset emails over SMTP.
#[derive(Clone)]
pub struct SmtpNotificationSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationSender {
    /// Create a sender from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Build the reset message without sending it.
    fn reset_message(&self, user: &User, new_password: &str) -> Result<Message, NotificationError> {
        build_reset_message(&self.from_address, user, new_password)
    }
}

fn build_reset_message(
    from_address: &str,
    user: &User,
    new_password: &str,
) -> Result<Message, NotificationError> {
    Message::builder()
        .from(
            from_address
                .parse()
                .map_err(|_| NotificationError::InvalidAddress(from_address.to_string()))?,
        )
        .to(user
            .email
            .as_str()
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(user.email.to_string()))?)
        .subject(RESET_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(reset_body(user, new_password))
        .map_err(|e| NotificationError::Delivery(e.to_string()))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_password_reset(
        &self,
        ctx: &Context,
        user: &User,
        new_password: &str,
    ) -> Result<(), NotificationError> {
        let message = self.reset_message(user, new_password)?;

        ctx.bound(self.mailer.send(message))
            .await?
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        tracing::info!(to = %user.email, subject = RESET_SUBJECT, "Email sent successfully");
        Ok(())
    }
}

/// Logs password resets instead of emailing them.
///
/// The new password is never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send_password_reset(
        &self,
        _ctx: &Context,
        user: &User,
        _new_password: &str,
    ) -> Result<(), NotificationError> {
        tracing::info!(to = %user.email, user_id = %user.id, "Password reset email suppressed (no SMTP configured)");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookshelf_core::{Email, Role, UserId};

    use super::*;

    fn ada() -> User {
        User {
            id: UserId::new("u1"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: "hash".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn test_reset_body_greets_user_and_contains_password() {
        let body = reset_body(&ada(), "n3wPass");
        assert!(body.starts_with("Hello Ada Lovelace,"));
        assert!(body.contains("n3wPass"));
    }

    #[test]
    fn test_reset_message_headers() {
        let message = build_reset_message("Bookshelf <noreply@bookshelf.test>", &ada(), "n3wPass").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains(RESET_SUBJECT));
    }

    #[test]
    fn test_reset_message_rejects_bad_sender() {
        assert!(matches!(
            build_reset_message("not an address", &ada(), "n3wPass"),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        assert!(
            LogNotificationSender
                .send_password_reset(&Context::new(), &ada(), "n3wPass")
                .await
                .is_ok()
        );
    }
}
