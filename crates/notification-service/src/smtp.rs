use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::templates::EmailTemplate;
use crate::{Alert, NotificationChannel, NotificationError, SmtpConfig, SmtpTls};

/// Mails every alert to the configured recipients in a single message.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotificationError::Config(format!("Invalid from address: {}", e)))?;

        let to: Vec<Mailbox> = config
            .to
            .iter()
            .filter_map(|addr| match addr.parse() {
                Ok(mailbox) => Some(mailbox),
                Err(e) => {
                    tracing::warn!("Skipping invalid recipient {}: {}", addr, e);
                    None
                }
            })
            .collect();
        if to.is_empty() {
            return Err(NotificationError::Config(
                "no valid recipient address".into(),
            ));
        }

        let host = config.host.as_str();
        let builder = match config.tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)),
        }
        .map_err(|e| NotificationError::Smtp(format!("SMTP transport error: {}", e)))?
        .port(config.port);

        let builder = match &config.credentials {
            Some((user, pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            None => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    fn build_message(&self, alert: &Alert) -> Result<Message, NotificationError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(&alert.title);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        builder
            .multipart(MultiPart::alternative_plain_html(
                alert.message.clone(),
                EmailTemplate::render(alert),
            ))
            .map_err(|e| NotificationError::Smtp(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl NotificationChannel for SmtpNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotificationError> {
        let email = self.build_message(alert)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Smtp(format!("Failed to send email: {}", e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
