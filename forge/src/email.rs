use forge_config::{EmailConfig, EmailSecurity};
use forge_email_impl::{EmailServiceImpl, EmailTransportConfig, EmailTransportSecurity};

/// Connect to the SMTP server
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(transport_config(config))
}

pub fn transport_config(config: &EmailConfig) -> EmailTransportConfig {
    EmailTransportConfig {
        host: config.host.clone(),
        port: config.port,
        security: match config.security {
            EmailSecurity::None => EmailTransportSecurity::None,
            EmailSecurity::StartTls => EmailTransportSecurity::StartTls,
            EmailSecurity::Tls => EmailTransportSecurity::Tls,
        },
        credentials: Some((config.username.clone(), config.password.expose().to_owned())),
        from: config.from.clone().with_name(config.from_name.clone()),
        timeout: config.timeout.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_comes_from_config() {
        let config = forge_config::load_dev_config().unwrap();

        let transport = transport_config(&config.email);

        assert_eq!(transport.from.email(), config.email.from.as_str());
        assert_eq!(transport.from.0.name.as_deref(), Some(config.email.from_name.as_str()));
        assert_eq!(transport.security, EmailTransportSecurity::None);
    }
}
