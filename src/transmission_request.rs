use serde_json::{Map, Value};

use crate::domain::{Batch, RecipientRecord, StartTime};

/// Settings shared by every batch of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionParameters {
    pub template: String,
    pub start_time: StartTime,
    pub binding: Option<String>,
    pub return_path: Option<String>,
    pub campaign: Option<String>,
    pub global_substitution_data: Option<Map<String, Value>>,
}

/// One batch merged with the run's parameters, ready to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionRequest {
    pub recipients: Batch,
    pub template: String,
    pub track_opens: bool,
    pub track_clicks: bool,
    pub use_draft_template: bool,
    pub start_time: StartTime,
    pub campaign: Option<String>,
    pub return_path: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub substitution_data: Option<Map<String, Value>>,
}

impl TransmissionRequest {
    /// Tracking is always on and the published template is always used,
    /// whatever the parameters say.
    pub fn build(recipients: Batch, parameters: &TransmissionParameters) -> Self {
        let metadata = parameters.binding.as_ref().map(|binding| {
            let mut metadata = Map::new();
            metadata.insert("binding".to_string(), Value::String(binding.clone()));
            metadata
        });

        Self {
            recipients,
            template: parameters.template.clone(),
            track_opens: true,
            track_clicks: true,
            use_draft_template: false,
            start_time: parameters.start_time.clone(),
            campaign: parameters.campaign.clone(),
            return_path: parameters.return_path.clone(),
            metadata,
            substitution_data: parameters.global_substitution_data.clone(),
        }
    }

    pub fn body(&self) -> TransmissionBody<'_> {
        TransmissionBody {
            options: TransmissionOptions {
                start_time: &self.start_time,
                open_tracking: self.track_opens,
                click_tracking: self.track_clicks,
            },
            campaign_id: self.campaign.as_deref(),
            return_path: self.return_path.as_deref(),
            metadata: self.metadata.as_ref(),
            substitution_data: self.substitution_data.as_ref(),
            recipients: &self.recipients,
            content: TemplateContent {
                template_id: &self.template,
                use_draft_template: self.use_draft_template,
            },
        }
    }
}

// Wire shape of `POST /api/v1/transmissions`

#[derive(serde::Serialize)]
pub struct TransmissionBody<'a> {
    options: TransmissionOptions<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    campaign_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    substitution_data: Option<&'a Map<String, Value>>,
    recipients: &'a [RecipientRecord],
    content: TemplateContent<'a>,
}

#[derive(serde::Serialize)]
struct TransmissionOptions<'a> {
    start_time: &'a StartTime,
    open_tracking: bool,
    click_tracking: bool,
}

#[derive(serde::Serialize)]
struct TemplateContent<'a> {
    template_id: &'a str,
    use_draft_template: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TransmissionResponse {
    pub results: TransmissionResults,
    /// Body exactly as the service sent it.
    #[serde(skip)]
    pub raw_body: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TransmissionResults {
    pub total_accepted_recipients: usize,
    #[serde(default)]
    pub total_rejected_recipients: usize,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{}] ", code)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(description) = &self.description {
            write!(f, ": {}", description)?;
        }
        Ok(())
    }
}
