use std::sync::Arc;

use forge_core_contact_contracts::{ContactSendMessageError, ContactService};
use forge_email_contracts::{Email, EmailBody, EmailService};
use forge_models::{contact::ContactMessage, email_address::EmailAddressWithName};
use forge_templates_contracts::{ContactNotificationTemplate, TemplateService};
use tracing::{debug, error, info};

pub const SUBJECT_PREFIX: &str = "Contact Form: ";

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<Template, Email> {
    pub template: Template,
    pub email: Email,
    pub config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    pub recipient: Arc<EmailAddressWithName>,
}

impl<TemplateS, EmailS> ContactService for ContactFeatureServiceImpl<TemplateS, EmailS>
where
    TemplateS: TemplateService,
    EmailS: EmailService,
{
    async fn send_message(&self, message: ContactMessage) -> Result<(), ContactSendMessageError> {
        let ContactMessage {
            author,
            subject,
            content,
        } = message;

        let subject = subject.into_inner();
        let rendered = self.template.render(&ContactNotificationTemplate {
            name: author.name.into_inner(),
            email: author.email.to_string(),
            subject: subject.clone(),
            message: content.into_inner(),
        })?;

        // the subject ends up in a header, keep it on one line
        let subject = format!("{SUBJECT_PREFIX}{}", subject.lines().collect::<Vec<_>>().join(" "));

        debug!(reply_to = %author.email, "delivering contact form notification");
        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject,
            body: EmailBody::Alternative {
                text: rendered.text,
                html: rendered.html,
            },
            reply_to: Some(author.email.into()),
        };

        match self.email.send(email).await {
            Ok(()) => {
                info!("contact form notification delivered");
                Ok(())
            }
            Err(err) => {
                error!("Failed to deliver contact form notification: {err}");
                Err(ContactSendMessageError::Send(err))
            }
        }
    }
}
