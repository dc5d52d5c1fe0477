use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::{GatewayError, MessagingGateway};

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct WhatsAppCredentials {
    pub access_token: String,
    pub phone_number_id: String,
}

/// WhatsApp Business Cloud API client. Credentials are injected at
/// construction; nothing is read from the environment here.
pub struct WhatsAppGateway {
    credentials: WhatsAppCredentials,
    client: Client,
}

impl WhatsAppGateway {
    pub fn new(credentials: WhatsAppCredentials, client: Client) -> Self {
        Self {
            credentials,
            client,
        }
    }

    fn template_body(to: &str, template: &str, params: &[String]) -> serde_json::Value {
        let components = if params.is_empty() {
            json!([])
        } else {
            let parameters: Vec<serde_json::Value> = params
                .iter()
                .map(|p| json!({ "type": "text", "text": p }))
                .collect();
            json!([{ "type": "body", "parameters": parameters }])
        };

        json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": {
                "name": template,
                "language": { "code": "en_US" },
                "components": components,
            },
        })
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppGateway {
    async fn send_template(
        &self,
        to_phone: &str,
        template: &str,
        params: &[String],
    ) -> Result<(), GatewayError> {
        let to = to_phone.strip_prefix('+').unwrap_or(to_phone);
        let url = format!(
            "{GRAPH_API_BASE}/{}/messages",
            self.credentials.phone_number_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.access_token)
            .json(&Self::template_body(to, template, params))
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("{status}: {body}")));
        }

        debug!(template, "whatsapp template accepted");
        Ok(())
    }
}
