use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{accepted, email_list, recipient_emails, spawn_app, AcceptAll};
use sparky_sched::errors::{PipelineError, SubmissionError};
use sparky_sched::recipient_list::InputMode;

#[tokio::test]
async fn test_recipients_are_split_into_batches_of_configured_size() {
    let app = spawn_app(10).await;

    Mock::given(path("/api/v1/transmissions"))
        .and(method("POST"))
        .respond_with(AcceptAll)
        .expect(3)
        .mount(&app.email_server)
        .await;

    let summary = app.inject(&email_list(25)).await.unwrap();

    let transmissions = app.transmissions().await;
    let sizes: Vec<usize> = transmissions.iter().map(|t| recipient_emails(t).len()).collect();
    assert_eq!(sizes, vec![10, 10, 5]);

    // Input order survives batching
    let all: Vec<String> = transmissions.iter().flat_map(recipient_emails).collect();
    let expected: Vec<String> = (0..25).map(|n| format!("user{}@example.com", n)).collect();
    assert_eq!(all, expected);

    assert_eq!(summary.batches_submitted, 3);
    assert_eq!(summary.recipients_accepted, 25);
    assert_eq!(summary.anomalies, 0);
}

#[tokio::test]
async fn test_exact_multiple_sends_no_empty_batch() {
    let app = spawn_app(5).await;

    Mock::given(path("/api/v1/transmissions"))
        .respond_with(AcceptAll)
        .expect(2)
        .mount(&app.email_server)
        .await;

    app.inject(&email_list(10)).await.unwrap();
}

#[tokio::test]
async fn test_every_transmission_carries_shared_parameters() {
    let app = spawn_app(2).await;

    Mock::given(path("/api/v1/transmissions"))
        .and(header("Authorization", "test-api-key"))
        .respond_with(AcceptAll)
        .expect(2)
        .mount(&app.email_server)
        .await;

    app.inject(&email_list(3)).await.unwrap();

    for transmission in app.transmissions().await {
        assert_eq!(transmission["content"]["template_id"], "spring-sale");
        assert_eq!(transmission["content"]["use_draft_template"], false);
        assert_eq!(transmission["options"]["start_time"], "2017-05-01T09:00:00+01:00");
        assert_eq!(transmission["options"]["open_tracking"], true);
        assert_eq!(transmission["options"]["click_tracking"], true);
        assert_eq!(transmission["campaign_id"], "spring");
        assert_eq!(transmission["return_path"], "bounces@example.com");
        assert_eq!(transmission["metadata"]["binding"], "outbound-pool");
        assert_eq!(transmission["substitution_data"]["company"], "Acme");
    }
}

#[tokio::test]
async fn test_structured_rows_are_sent_with_their_attributes() {
    let app = spawn_app(100).await;

    Mock::given(path("/api/v1/transmissions"))
        .respond_with(AcceptAll)
        .expect(1)
        .mount(&app.email_server)
        .await;

    let recipients = concat!(
        "email,name,substitution_data,tags\n",
        "a@example.com,Alice,\"{\"\"first_name\"\": \"\"Alice\"\"}\",\"[\"\"vip\"\"]\"\n",
        "b@example.com,,,\n",
    );
    app.inject(recipients).await.unwrap();

    let transmissions = app.transmissions().await;
    assert_eq!(
        transmissions[0]["recipients"],
        serde_json::json!([
            {
                "address": {"email": "a@example.com", "name": "Alice"},
                "substitution_data": {"first_name": "Alice"},
                "tags": ["vip"]
            },
            {"address": {"email": "b@example.com"}}
        ])
    );
}

#[tokio::test]
async fn test_headerless_and_plain_lists_are_sent() {
    let app = spawn_app(100).await;

    Mock::given(path("/api/v1/transmissions"))
        .respond_with(AcceptAll)
        .expect(2)
        .mount(&app.email_server)
        .await;

    app.inject("a@example.com\nb@example.com\n").await.unwrap();
    app.inject_with("c@example.com\n\nd@example.com\n", crate::helpers::START_TIME, InputMode::Plain)
        .await
        .unwrap();

    let transmissions = app.transmissions().await;
    assert_eq!(recipient_emails(&transmissions[0]), vec!["a@example.com", "b@example.com"]);
    assert_eq!(recipient_emails(&transmissions[1]), vec!["c@example.com", "d@example.com"]);
}

#[tokio::test]
async fn test_accepted_count_mismatch_does_not_stop_the_run() {
    let app = spawn_app(2).await;

    Mock::given(path("/api/v1/transmissions"))
        .respond_with(accepted(1))
        .expect(3)
        .mount(&app.email_server)
        .await;

    let summary = app.inject(&email_list(6)).await.unwrap();

    assert_eq!(summary.batches_submitted, 3);
    assert_eq!(summary.recipients_submitted, 6);
    assert_eq!(summary.recipients_accepted, 3);
    assert_eq!(summary.anomalies, 3);
}

#[tokio::test]
async fn test_api_error_halts_the_run() {
    let app = spawn_app(2).await;

    Mock::given(path("/api/v1/transmissions"))
        .respond_with(accepted(2))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(path("/api/v1/transmissions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "errors": [{
                "message": "Exceed Sending Limit (daily)",
                "code": "2102"
            }]
        })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let outcome = app.inject(&email_list(10)).await;

    match outcome {
        Err(PipelineError::Submission {
            batch,
            source: SubmissionError::Api { status, errors },
        }) => {
            assert_eq!(batch, 2);
            assert_eq!(status.as_u16(), 429);
            assert_eq!(errors[0].code.as_deref(), Some("2102"));
        }
        _ => panic!("expected the second submission to fail"),
    }
    // Batches three to five are never sent
    assert_eq!(app.transmissions().await.len(), 2);
}
