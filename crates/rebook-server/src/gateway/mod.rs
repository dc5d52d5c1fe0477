pub mod whatsapp;

use async_trait::async_trait;
use thiserror::Error;

/// Reminder template: customer name, business name, local start time,
/// reschedule link.
pub const TEMPLATE_REMINDER: &str = "appointment_reminder_v1";
/// Review request template: customer name, business name, review link.
pub const TEMPLATE_REVIEW_REQUEST: &str = "review_request_v1";
/// Win-back template: customer name, business name, booking link.
pub const TEMPLATE_WINBACK: &str = "winback_offer_v1";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider accepted the request but rejected the send.
    #[error("provider rejected send: {0}")]
    Rejected(String),

    /// The request never produced a provider verdict.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound messaging channel. Templates are named, versioned strings with
/// positional text parameters; implementations never interpret their content.
/// The channel has no memory of prior sends, so idempotency is the caller's
/// problem.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_template(
        &self,
        to_phone: &str,
        template: &str,
        params: &[String],
    ) -> Result<(), GatewayError>;
}
