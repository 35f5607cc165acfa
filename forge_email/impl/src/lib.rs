use std::time::Duration;

use anyhow::anyhow;
use forge_email_contracts::{Email, EmailBody, EmailSendError, EmailService};
use forge_models::email_address::EmailAddressWithName;
use forge_utils::Apply;
use lettre::{
    message::{header, MessageBuilder, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    timeout: Duration,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Everything needed to reach the smtp server. Built once at startup.
#[derive(Debug, Clone)]
pub struct EmailTransportConfig {
    pub host: String,
    pub port: u16,
    pub security: EmailTransportSecurity,
    pub credentials: Option<(String, String)>,
    /// Mailbox every message is sent from.
    pub from: EmailAddressWithName,
    /// Upper bound for a single delivery attempt.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTransportSecurity {
    /// Plaintext connection, only for local development.
    None,
    StartTls,
    /// Implicit TLS (smtps).
    Tls,
}

impl EmailServiceImpl {
    pub fn new(config: EmailTransportConfig) -> anyhow::Result<Self> {
        let builder = match config.security {
            EmailTransportSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            EmailTransportSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            }
            EmailTransportSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
        };

        let transport = builder
            .port(config.port)
            .apply_map(config.credentials, |builder, (username, password)| {
                builder.credentials(Credentials::new(username, password))
            })
            .build();

        Ok(Self {
            from: config.from,
            timeout: config.timeout,
            transport,
        })
    }

    #[cfg(feature = "dummy")]
    pub fn dummy() -> Self {
        Self::new(EmailTransportConfig {
            host: "dummy".into(),
            port: 25,
            security: EmailTransportSecurity::None,
            credentials: None,
            from: "dummy@example.com".parse().unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject);

        let message = match email.body {
            EmailBody::Text(text) => builder.header(header::ContentType::TEXT_PLAIN).body(text)?,
            EmailBody::Html(html) => builder.header(header::ContentType::TEXT_HTML).body(html)?,
            EmailBody::Alternative { text, html } => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))?
            }
        };

        Ok(message)
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> Result<(), EmailSendError> {
        let recipient = email.recipient.email().to_owned();
        let message = self.build_message(email).map_err(EmailSendError::Transport)?;

        debug!(%recipient, "sending email");
        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| EmailSendError::Timeout(self.timeout))?
            .map_err(|err| {
                // 4xx and 5xx replies, anything else never got an answer
                if err.is_permanent() || err.is_transient() {
                    let code = err.status().map(|code| code.to_string()).unwrap_or_default();
                    error!(%recipient, %code, "smtp server rejected email: {err}");
                    EmailSendError::Rejected(format!("{code} {err}"))
                } else {
                    EmailSendError::Transport(err.into())
                }
            })?;

        debug!(%recipient, "email accepted by smtp server");
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        tokio::time::timeout(self.timeout, self.transport.test_connection())
            .await
            .map_err(|_| anyhow!("Timed out pinging smtp server"))??
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[cfg(test)]
mod tests {
    use forge_utils::assert_matches;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::TcpListener,
    };

    use super::*;

    fn config(port: u16, timeout: Duration) -> EmailTransportConfig {
        EmailTransportConfig {
            host: "127.0.0.1".into(),
            port,
            security: EmailTransportSecurity::None,
            credentials: Some(("user".into(), "password".into())),
            from: "\"STEM Forge\" <noreply@example.com>".parse().unwrap(),
            timeout,
        }
    }

    /// Accepts a single smtp session, answering `RCPT TO` with `rcpt_reply`
    /// and every other command positively.
    async fn smtp_server(listener: TcpListener, rcpt_reply: &'static str) {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();
        let mut in_data = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if in_data {
                if line == "." {
                    in_data = false;
                    write.write_all(b"250 Queued\r\n").await.unwrap();
                }
                continue;
            }

            let command = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            let reply = match command.as_str() {
                "EHLO" | "HELO" => "250 localhost\r\n",
                "RCPT" => rcpt_reply,
                "DATA" => {
                    in_data = true;
                    "354 End data with <CR><LF>.<CR><LF>\r\n"
                }
                "QUIT" => "221 Bye\r\n",
                _ => "250 OK\r\n",
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
    }

    async fn send_with_rcpt_reply(rcpt_reply: &'static str) -> Result<(), EmailSendError> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(smtp_server(listener, rcpt_reply));

        let sut = EmailServiceImpl::new(EmailTransportConfig {
            credentials: None,
            ..config(port, Duration::from_secs(5))
        })
        .unwrap();

        let result = sut.send(email()).await;
        server.abort();
        result
    }

    fn email() -> Email {
        Email {
            recipient: "contact@example.com".parse().unwrap(),
            subject: "Contact Form: Hello there".into(),
            body: EmailBody::Alternative {
                text: "line1\nline2".into(),
                html: "line1<br>line2".into(),
            },
            reply_to: Some("jo@x.com".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn from_is_configured_sender_and_reply_to_is_author() {
        // Arrange
        let sut = EmailServiceImpl::new(config(2525, Duration::from_secs(1))).unwrap();

        // Act
        let message = sut.build_message(email()).unwrap();

        // Assert
        let headers = message.headers();
        let from = headers.get_raw("From").unwrap();
        assert!(from.contains("noreply@example.com"));
        assert!(!from.contains("jo@x.com"));
        assert!(headers.get_raw("Reply-To").unwrap().contains("jo@x.com"));
        assert!(headers.get_raw("To").unwrap().contains("contact@example.com"));

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[tokio::test]
    async fn connection_refused() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sut = EmailServiceImpl::new(config(port, Duration::from_secs(5))).unwrap();

        // Act
        let result = sut.send(email()).await;

        // Assert
        assert_matches!(result, Err(EmailSendError::Transport(_)));
    }

    #[tokio::test]
    async fn unresponsive_server_times_out() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            // accept the connection but never send a greeting
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let timeout = Duration::from_millis(200);
        let sut = EmailServiceImpl::new(config(port, timeout)).unwrap();

        // Act
        let result = sut.send(email()).await;

        // Assert
        assert_matches!(result, Err(EmailSendError::Timeout(t)) if *t == timeout);
        server.abort();
    }

    #[tokio::test]
    async fn accepted() {
        // Act
        let result = send_with_rcpt_reply("250 OK\r\n").await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn unknown_recipient_is_rejected() {
        // Act
        let result = send_with_rcpt_reply("550 5.1.1 No such user\r\n").await;

        // Assert
        assert_matches!(
            result,
            Err(EmailSendError::Rejected(reason)) if reason.starts_with("550")
        );
    }

    #[tokio::test]
    async fn temporary_failure_is_rejected() {
        // Act
        let result = send_with_rcpt_reply("451 4.3.0 Try again later\r\n").await;

        // Assert
        assert_matches!(
            result,
            Err(EmailSendError::Rejected(reason)) if reason.starts_with("451")
        );
    }
}
