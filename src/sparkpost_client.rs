use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::errors::SubmissionError;
use crate::transmission_request::{
    ApiError, ApiErrorResponse, TransmissionRequest, TransmissionResponse,
};

pub struct SparkPostClient {
    http_client: Client,
    base_url: String,
    authorization: Secret<String>,
}

impl SparkPostClient {
    pub fn new(base_url: String, authorization: Secret<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
            authorization,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one `POST /api/v1/transmissions`. Never retries.
    pub async fn send_transmission(
        &self,
        request: &TransmissionRequest,
    ) -> Result<TransmissionResponse, SubmissionError> {
        let url = format!("{}/api/v1/transmissions", self.base_url.trim_end_matches('/'));

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.authorization.expose_secret())
            .json(&request.body())
            .send()
            .await
            .map_err(SubmissionError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SubmissionError::Transport)?;

        if !status.is_success() {
            // Bodies outside the documented error shape are still surfaced to the operator
            let errors = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(parsed) => parsed.errors,
                Err(_) => vec![ApiError {
                    message: body,
                    description: None,
                    code: None,
                }],
            };
            return Err(SubmissionError::Api { status, errors });
        }

        let mut parsed: TransmissionResponse = serde_json::from_str(&body)
            .map_err(|_| SubmissionError::UnexpectedResponse(body.clone()))?;
        parsed.raw_body = body;
        Ok(parsed)
    }
}
