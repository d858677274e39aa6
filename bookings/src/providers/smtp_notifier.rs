//! SMTP notifier using Lettre.

use super::Notifier;
use crate::error::NotificationError;
use crate::model::BookingId;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt;

/// SMTP connection and sender settings.
#[derive(Clone)]
pub struct SmtpSettings {
    /// SMTP server address (e.g. "smtp.gmail.com").
    pub host: String,
    /// SMTP server port (usually 587 for STARTTLS, 465 for TLS).
    pub port: u16,
    /// SMTP authentication username.
    pub username: String,
    /// SMTP authentication password.
    pub password: String,
    /// Sender email address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// Sends booking confirmations over SMTP.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the notifier and its relay transport.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured or the sender address
    /// does not parse.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let transport = SmtpTransport::relay(&settings.host)
            .map_err(|e| NotificationError::Transport(format!("SMTP relay error: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", settings.from_name, settings.from_email)
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("from: {e}")))?;

        Ok(Self { transport, from })
    }
}

/// Subject and HTML body of the confirmation email.
fn confirmation_email(booking_id: BookingId) -> (String, String) {
    let subject = format!("Your Wild Trails safari is confirmed (booking #{booking_id})");
    let body = format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Booking confirmed</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2f6b3a;">Your safari is confirmed</h2>
        <p>A driver has been assigned to booking <strong>#{booking_id}</strong>.</p>
        <p>Payment is now due. You can complete it from your booking page.</p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Wild Trails
        </p>
    </div>
</body>
</html>
        "#
    );
    (subject, body)
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        booking_id: BookingId,
    ) -> Result<(), NotificationError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("{recipient}: {e}")))?;
        let (subject, body) = confirmation_email(booking_id);

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| NotificationError::Transport(format!("Email task failed: {e}")))?
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        tracing::info!(%recipient, %booking_id, "Booking confirmation sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: "hunter2".to_string(),
            from_email: "bookings@wildtrails.example".to_string(),
            from_name: "Wild Trails".to_string(),
        }
    }

    #[test]
    fn test_confirmation_mentions_booking() {
        let (subject, body) = confirmation_email(BookingId(31));

        assert!(subject.contains("#31"));
        assert!(body.contains("#31"));
    }

    #[test]
    fn test_settings_debug_redacts_password() {
        assert!(!format!("{:?}", settings()).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_reported_before_sending() {
        let notifier = SmtpNotifier::new(&settings()).unwrap();

        let result = notifier
            .send_booking_confirmation("not an address", BookingId(1))
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[test]
    fn test_invalid_sender_is_rejected() {
        let mut settings = settings();
        settings.from_email = "nope".to_string();

        assert!(matches!(
            SmtpNotifier::new(&settings),
            Err(NotificationError::InvalidAddress(_))
        ));
    }
}
