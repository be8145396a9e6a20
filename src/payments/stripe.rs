use serde_json::Value;

use crate::errors::AppError;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Ephemeral keys must be pinned to an API version the mobile SDK accepts.
const EPHEMERAL_KEY_API_VERSION: &str = "2023-10-16";

pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    pub publishable_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String, publishable_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            publishable_key,
        }
    }

    /// POST a form-encoded request to the Stripe API and decode the JSON
    /// body, surfacing Stripe's own error message on non-2xx responses.
    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
        api_version: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut request = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(params);
        if let Some(version) = api_version {
            request = request.header("Stripe-Version", version);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("Stripe request failed")
                .to_string();
            return Err(AppError::Internal(message));
        }
        Ok(body)
    }

    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
        address: Option<&Value>,
    ) -> Result<Value, AppError> {
        let mut params = vec![
            ("email".to_string(), email.to_string()),
            ("name".to_string(), name.to_string()),
        ];
        if let Some(Value::Object(fields)) = address {
            for (key, value) in fields {
                if let Some(text) = value.as_str() {
                    params.push((format!("address[{key}]"), text.to_string()));
                }
            }
        }
        self.post_form("/customers", &params, None).await
    }

    pub async fn create_ephemeral_key(&self, customer_id: &str) -> Result<Value, AppError> {
        self.post_form(
            "/ephemeral_keys",
            &[("customer".to_string(), customer_id.to_string())],
            Some(EPHEMERAL_KEY_API_VERSION),
        )
        .await
    }

    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_id: &str,
        description: &str,
    ) -> Result<Value, AppError> {
        self.post_form(
            "/payment_intents",
            &[
                ("amount".to_string(), amount.to_string()),
                ("currency".to_string(), currency.to_string()),
                ("customer".to_string(), customer_id.to_string()),
                ("description".to_string(), description.to_string()),
                (
                    "automatic_payment_methods[enabled]".to_string(),
                    "true".to_string(),
                ),
            ],
            None,
        )
        .await
    }
}
