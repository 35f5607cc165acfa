use forge_core_contact_impl::ContactFeatureServiceImpl;
use forge_core_health_impl::HealthFeatureServiceImpl;
use forge_email_impl::EmailServiceImpl;
use forge_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = forge_api_rest::RestServer<HealthFeature, ContactFeature>;

// Email
pub type Email = EmailServiceImpl;

// Template
pub type Template = TemplateServiceImpl;

// Core
pub type ContactFeature = ContactFeatureServiceImpl<Template, Email>;
pub type HealthFeature = HealthFeatureServiceImpl<Email>;
