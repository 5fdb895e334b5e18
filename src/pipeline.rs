use std::time::{Duration, Instant};

use crate::domain::{Batch, BatchAccumulator, RecipientRecord};
use crate::errors::{PipelineError, RecipientError, SubmissionError};
use crate::sparkpost_client::SparkPostClient;
use crate::transmission_request::{TransmissionParameters, TransmissionRequest};

/// What the service reported for one accepted batch.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub transmission_id: String,
    pub submitted: usize,
    pub accepted: usize,
    pub elapsed: Duration,
    pub raw_body: String,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.accepted == self.submitted
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub batches_submitted: usize,
    pub recipients_submitted: usize,
    pub recipients_accepted: usize,
    /// Batches whose accepted count differed from the number submitted.
    pub anomalies: usize,
}

/// Submits one batch and reports how it went.
///
/// An accepted-count mismatch is logged with the full response body and
/// still returned as `Ok`; only transport and API failures are errors.
#[tracing::instrument(
    name = "Submit transmission batch",
    skip(client, request),
    fields(
        recipients = request.recipients.len(),
        template = %request.template,
        start_time = %request.start_time,
    )
)]
pub async fn submit_batch(
    client: &SparkPostClient,
    request: &TransmissionRequest,
) -> Result<SubmissionReport, SubmissionError> {
    let started = Instant::now();
    let outcome = client.send_transmission(request).await;
    let elapsed = started.elapsed();

    let response = match outcome {
        Ok(response) => response,
        Err(error) => {
            match &error {
                SubmissionError::Api { status, errors } => tracing::error!(
                    status = status.as_u16(),
                    errors = ?errors,
                    "Transmission rejected by the delivery service"
                ),
                other => tracing::error!(error.cause_chain = ?other, "Transmission failed"),
            }
            return Err(error);
        }
    };

    let report = SubmissionReport {
        transmission_id: response.results.id,
        submitted: request.recipients.len(),
        accepted: response.results.total_accepted_recipients,
        elapsed,
        raw_body: response.raw_body,
    };

    if report.is_complete() {
        tracing::info!(
            transmission_id = %report.transmission_id,
            accepted = report.accepted,
            elapsed_seconds = elapsed.as_secs_f64(),
            "OK - in {:.3} seconds",
            elapsed.as_secs_f64()
        );
    } else {
        tracing::warn!(
            transmission_id = %report.transmission_id,
            submitted = report.submitted,
            accepted = report.accepted,
            response = %report.raw_body,
            "Accepted recipient count differs from batch size"
        );
    }

    Ok(report)
}

/// Reads every recipient, submitting a transmission each time a batch fills
/// and once more for a trailing partial batch.
///
/// One batch is in flight at a time. The first fatal error stops the run;
/// batches not yet submitted are never sent.
#[tracing::instrument(
    name = "Inject recipients",
    skip(recipients, parameters, client),
    fields(template = %parameters.template)
)]
pub async fn run_pipeline<I>(
    recipients: I,
    batch_size: usize,
    parameters: &TransmissionParameters,
    client: &SparkPostClient,
) -> Result<PipelineSummary, PipelineError>
where
    I: IntoIterator<Item = Result<RecipientRecord, RecipientError>>,
{
    let mut accumulator = BatchAccumulator::new(batch_size);
    let mut summary = PipelineSummary::default();

    for record in recipients {
        accumulator.append(record?);
        if accumulator.is_full() {
            flush(accumulator.drain(), parameters, client, &mut summary).await?;
        }
    }

    if !accumulator.is_empty() {
        flush(accumulator.drain(), parameters, client, &mut summary).await?;
    }

    Ok(summary)
}

async fn flush(
    batch: Batch,
    parameters: &TransmissionParameters,
    client: &SparkPostClient,
    summary: &mut PipelineSummary,
) -> Result<(), PipelineError> {
    let request = TransmissionRequest::build(batch, parameters);
    let report = submit_batch(client, &request)
        .await
        .map_err(|source| PipelineError::Submission {
            batch: summary.batches_submitted + 1,
            source,
        })?;

    summary.batches_submitted += 1;
    summary.recipients_submitted += report.submitted;
    summary.recipients_accepted += report.accepted;
    if !report.is_complete() {
        summary.anomalies += 1;
    }
    Ok(())
}
