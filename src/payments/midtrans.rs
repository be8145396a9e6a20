use rand::Rng;
use serde_json::{json, Value};

use crate::errors::AppError;

const SANDBOX_SNAP_BASE: &str = "https://app.sandbox.midtrans.com/snap/v1";
const PRODUCTION_SNAP_BASE: &str = "https://app.midtrans.com/snap/v1";
const SANDBOX_API_BASE: &str = "https://api.sandbox.midtrans.com/v2";
const PRODUCTION_API_BASE: &str = "https://api.midtrans.com/v2";

pub struct MidtransClient {
    http: reqwest::Client,
    server_key: String,
    snap_base: &'static str,
    api_base: &'static str,
}

impl MidtransClient {
    pub fn new(server_key: String, is_production: bool) -> Self {
        let (snap_base, api_base) = if is_production {
            (PRODUCTION_SNAP_BASE, PRODUCTION_API_BASE)
        } else {
            (SANDBOX_SNAP_BASE, SANDBOX_API_BASE)
        };
        Self {
            http: reqwest::Client::new(),
            server_key,
            snap_base,
            api_base,
        }
    }

    /// 8-digit numeric reference used as the Midtrans `order_id`.
    pub fn generate_reference() -> String {
        rand::thread_rng()
            .gen_range(10_000_000..100_000_000u64)
            .to_string()
    }

    /// Create a Snap transaction; returns the provider body containing
    /// `token` and `redirect_url`.
    pub async fn create_transaction(
        &self,
        reference: &str,
        amount: i64,
        email: &str,
        description: &str,
    ) -> Result<Value, AppError> {
        let payload = json!({
            "transaction_details": {
                "order_id": reference,
                "gross_amount": amount,
            },
            "customer_details": {
                "email": email,
            },
            "item_details": [{
                "id": reference,
                "price": amount,
                "quantity": 1,
                "name": description,
            }],
        });

        let response = self
            .http
            .post(format!("{}/transactions", self.snap_base))
            .basic_auth(&self.server_key, Some(""))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !status.is_success() {
            let message = body["error_messages"][0]
                .as_str()
                .unwrap_or("Midtrans request failed")
                .to_string();
            return Err(AppError::Internal(message));
        }
        Ok(body)
    }

    /// Look up a transaction's status by reference. Midtrans reports an
    /// unknown transaction as a 200 body with `status_code: "404"`, which
    /// is left to the caller to interpret.
    pub async fn transaction_status(&self, reference: &str) -> Result<Value, AppError> {
        let response = self
            .http
            .get(format!("{}/{}/status", self.api_base, reference))
            .basic_auth(&self.server_key, Some(""))
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::MidtransClient;

    #[test]
    fn generated_references_are_eight_digits() {
        for _ in 0..100 {
            let reference = MidtransClient::generate_reference();
            assert_eq!(reference.len(), 8);
            assert!(reference.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn sandbox_and_production_use_different_hosts() {
        let sandbox = MidtransClient::new("key".to_string(), false);
        let production = MidtransClient::new("key".to_string(), true);
        assert_ne!(sandbox.snap_base, production.snap_base);
        assert_ne!(sandbox.api_base, production.api_base);
    }
}
