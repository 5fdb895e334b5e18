use std::fs::File;
use std::path::PathBuf;

use crate::configuration::ValidatedSettings;
use crate::domain::StartTime;
use crate::errors::PipelineError;
use crate::pipeline::{run_pipeline, PipelineSummary};
use crate::recipient_list::{InputMode, RecipientReader};
use crate::sparkpost_client::SparkPostClient;
use crate::transmission_request::TransmissionParameters;

/// What the operator asked for on the command line.
#[derive(Debug, Clone)]
pub struct Job {
    pub recipient_list: PathBuf,
    pub template: String,
    pub start_time: String,
    pub mode: InputMode,
}

pub struct Application {
    client: SparkPostClient,
    parameters: TransmissionParameters,
    batch_size: usize,
    recipients: RecipientReader<File>,
}

impl Application {
    /// Validates everything that can be checked up front: the recipient
    /// file opens and carries a usable header, and the start time is well
    /// formed. Nothing is sent until [`Application::run_until_complete`].
    pub fn build(settings: ValidatedSettings, job: Job) -> Result<Self, PipelineError> {
        let recipients = RecipientReader::open(&job.recipient_list, job.mode)?;
        let start_time = StartTime::parse(job.start_time).map_err(PipelineError::InvalidStartTime)?;

        let parameters = TransmissionParameters {
            template: job.template,
            start_time,
            binding: settings.binding,
            return_path: settings.return_path,
            campaign: settings.campaign,
            global_substitution_data: settings.global_substitution_data,
        };

        let client = SparkPostClient::new(settings.base_url, settings.authorization);
        tracing::info!(base_url = %client.base_url(), "Opened connection to {}", client.base_url());

        Ok(Self {
            client,
            parameters,
            batch_size: settings.batch_size,
            recipients,
        })
    }

    pub async fn run_until_complete(self) -> Result<PipelineSummary, PipelineError> {
        tracing::info!("Injecting to SparkPost");
        run_pipeline(self.recipients, self.batch_size, &self.parameters, &self.client).await
    }
}
