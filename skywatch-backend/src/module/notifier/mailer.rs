///! SMTP delivery via lettre

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as InlinePart, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use super::email::OutgoingEmail;
use crate::config::NotifierConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("failed to read attachment {path:?}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Check that the transport accepts connections and credentials.
    async fn verify(&self) -> Result<(), MailError>;

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// `Mailer` backed by a pooled async SMTP transport, built once at startup.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    asset_dir: PathBuf,
}

impl SmtpMailer {
    pub fn from_config(config: &NotifierConfig) -> Result<Self, MailError> {
        let tls_parameters =
            TlsParameters::new(config.host.clone()).map_err(|e| MailError::Smtp(e.to_string()))?;
        let tls = if config.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self {
            transport,
            asset_dir: config.asset_dir(),
        })
    }

    async fn build_message(&self, email: OutgoingEmail) -> Result<Message, MailError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.from.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(email.to.clone()))?;

        let mut body = MultiPart::related().singlepart(SinglePart::html(email.html));
        for attachment in &email.attachments {
            let path = self.asset_dir.join(&attachment.path);
            let content = tokio::fs::read(&path)
                .await
                .map_err(|source| MailError::Attachment { path: path.clone(), source })?;
            let content_type = ContentType::parse(content_type_for(&path))
                .map_err(|e| MailError::Build(e.to_string()))?;
            body = body.singlepart(InlinePart::new_inline(attachment.cid.clone()).body(content, content_type));
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .multipart(body)
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Smtp("server did not accept the connection".to_string())),
            Err(e) => Err(MailError::Smtp(e.to_string())),
        }
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let subject = email.subject.clone();
        let attachments = email.attachments.len();
        let message = self.build_message(email).await?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        tracing::debug!(
            "SMTP accepted '{}' with {} attachment(s): {}",
            subject,
            attachments,
            response.code()
        );
        Ok(())
    }
}

/// MIME type from the file extension; icons are PNG unless named otherwise.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
