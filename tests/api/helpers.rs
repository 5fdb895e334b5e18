use std::io::Write;

use once_cell::sync::Lazy;
use sparky_sched::configuration::{configuration_from_str, ValidatedSettings};
use sparky_sched::errors::PipelineError;
use sparky_sched::pipeline::PipelineSummary;
use sparky_sched::recipient_list::InputMode;
use sparky_sched::startup::{Application, Job};
use sparky_sched::telemetry::{get_subscriber, init_subscriber};
use tempfile::NamedTempFile;
use wiremock::{MockServer, ResponseTemplate};

pub const START_TIME: &str = "2017-05-01T09:00:00+01:00";

// Ensure that the `tracing` stack is only initialized once rather than for each test case
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_lvl = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the type returned by `get_subscriber`, so the two
    // branches cannot share a variable
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_lvl, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_lvl, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub email_server: MockServer,
    pub settings: ValidatedSettings,
}

impl TestApp {
    pub fn job(&self, recipient_file: &NamedTempFile, start_time: &str, mode: InputMode) -> Job {
        Job {
            recipient_list: recipient_file.path().to_path_buf(),
            template: "spring-sale".to_string(),
            start_time: start_time.to_string(),
            mode,
        }
    }

    /// Writes the recipient list to a temporary file and runs a whole injection.
    pub async fn inject(&self, recipients: &str) -> Result<PipelineSummary, PipelineError> {
        self.inject_with(recipients, START_TIME, InputMode::Structured).await
    }

    pub async fn inject_with(
        &self,
        recipients: &str,
        start_time: &str,
        mode: InputMode,
    ) -> Result<PipelineSummary, PipelineError> {
        let recipient_file = recipient_file(recipients);
        let application = Application::build(
            self.settings.clone(),
            self.job(&recipient_file, start_time, mode),
        )?;
        application.run_until_complete().await
    }

    /// JSON bodies of every transmission the mock service received, in order.
    pub async fn transmissions(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

/// Spin up a mock delivery service and settings pointing at it.
pub async fn spawn_app(batch_size: usize) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let ini = format!(
        "[SparkPost]\n\
         Authorization = test-api-key\n\
         Host = {}\n\
         Binding = outbound-pool\n\
         Return-Path = bounces@example.com\n\
         Campaign = spring\n\
         GlobalSub = {{\"company\": \"Acme\"}}\n\
         BatchSize = {}\n",
        email_server.uri(),
        batch_size
    );
    let settings = configuration_from_str(&ini)
        .expect("Failed to parse test settings")
        .sparkpost
        .validate("test settings")
        .expect("Invalid test settings");

    TestApp {
        email_server,
        settings,
    }
}

pub fn recipient_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create recipient file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write recipient file");
    file
}

/// `count` addresses under an `email` header.
pub fn email_list(count: usize) -> String {
    let mut list = String::from("email\n");
    for n in 0..count {
        list.push_str(&format!("user{}@example.com\n", n));
    }
    list
}

pub fn accepted(count: usize) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "results": {
            "total_rejected_recipients": 0,
            "total_accepted_recipients": count,
            "id": "11668787484950529"
        }
    }))
}

/// Answers every transmission with the number of recipients it carried.
pub struct AcceptAll;

impl wiremock::Respond for AcceptAll {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let count = body["recipients"].as_array().map(Vec::len).unwrap_or_default();
        accepted(count)
    }
}

pub fn recipient_emails(transmission: &serde_json::Value) -> Vec<String> {
    transmission["recipients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["address"]["email"].as_str().unwrap().to_string())
        .collect()
}
