//! RequestController lifecycle against a mock engine

use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use snapocr_core::OcrError;
use snapocr_core::parser::OutputParser;
use snapocr_core::preprocess::ImagePreprocessor;
use snapocr_types::{AppEvent, OcrOutcome, RequestId, RequestState, SourceKind};
use tokio::time::timeout;

use super::mock::{MockRecognizer, Reply, blank};
use crate::request::RequestController;

fn controller(mock: Arc<MockRecognizer>) -> (RequestController, AsyncReceiver<AppEvent>) {
    let (tx, rx): (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>) = kanal::bounded_async(64);
    let controller = RequestController::new(
        ImagePreprocessor::default(),
        mock,
        Arc::new(OutputParser::default()),
        tx,
    );
    (controller, rx)
}

async fn next_event(rx: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timeout waiting for worker")
        .expect("Channel closed")
}

/// Skip progress events and return the final one
async fn finished(rx: &AsyncReceiver<AppEvent>) -> (RequestId, OcrOutcome) {
    loop {
        match next_event(rx).await {
            AppEvent::OcrFinished { id, outcome } => return (id, outcome),
            AppEvent::OcrProgress { .. } => continue,
            _ => panic!("Unexpected event from worker"),
        }
    }
}

#[tokio::test]
async fn test_success_flows_back_through_inbox() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"some text")));
    let (mut requests, rx) = controller(mock.clone());

    let id = requests.submit(blank(64, 32), SourceKind::File).unwrap();
    assert!(requests.is_busy());
    assert_eq!(requests.active().unwrap().state, RequestState::Invoking);

    match next_event(&rx).await {
        AppEvent::OcrProgress { id: progress_id, state } => {
            assert_eq!(progress_id, id);
            assert_eq!(state, RequestState::Parsing);
            assert!(requests.advance(progress_id, state));
        }
        _ => panic!("Expected parsing progress first"),
    }

    let (finished_id, outcome) = finished(&rx).await;
    assert_eq!(finished_id, id);
    assert_eq!(outcome, OcrOutcome::Success("some text".into()));

    let done = requests.complete(finished_id, outcome).unwrap();
    assert_eq!(done.request.state, RequestState::Completed);
    assert_eq!(done.request.kind, SourceKind::File);
    assert!(!requests.is_busy());
}

#[tokio::test]
async fn test_request_walks_every_state_in_order() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"text")));
    let (mut requests, rx) = controller(mock);

    let id = requests.submit(blank(32, 32), SourceKind::Region).unwrap();
    assert_eq!(
        requests.active().unwrap().history,
        vec![
            RequestState::Created,
            RequestState::Preprocessing,
            RequestState::Invoking
        ]
    );

    loop {
        match next_event(&rx).await {
            AppEvent::OcrProgress { id, state } => assert!(requests.advance(id, state)),
            AppEvent::OcrFinished { id: finished_id, outcome } => {
                assert_eq!(finished_id, id);
                let done = requests.complete(finished_id, outcome).unwrap();
                assert_eq!(
                    done.request.history,
                    vec![
                        RequestState::Created,
                        RequestState::Preprocessing,
                        RequestState::Invoking,
                        RequestState::Parsing,
                        RequestState::Completed
                    ]
                );
                break;
            }
            _ => panic!("Unexpected event from worker"),
        }
    }
}

#[tokio::test]
async fn test_worker_cleans_up_when_loop_is_gone() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"text")));
    let (mut requests, rx) = controller(mock.clone());

    requests.submit(blank(16, 16), SourceKind::File).unwrap();
    let temp_path = requests.active().unwrap().temp_path.clone();
    drop(rx);

    // nobody reads progress or the result, the worker still finishes
    timeout(Duration::from_secs(5), async {
        while mock.calls().is_empty() || temp_path.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("worker did not finish");
    assert_eq!(mock.calls()[0].path, temp_path);
}

#[tokio::test]
async fn test_failure_marker_deletes_temp_file() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"recognition failed")));
    let (mut requests, rx) = controller(mock.clone());

    let id = requests.submit(blank(64, 32), SourceKind::Region).unwrap();
    let (finished_id, outcome) = finished(&rx).await;
    assert_eq!(finished_id, id);
    assert!(!outcome.is_success());

    let done = requests.complete(id, outcome).unwrap();
    assert_eq!(done.request.state, RequestState::Failed);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, done.request.temp_path);
    assert!(calls[0].existed, "engine must see the staged image");
    assert!(!done.request.temp_path.exists(), "temp image must be gone");
}

#[tokio::test]
async fn test_invocation_error_becomes_failure() {
    let mock = Arc::new(MockRecognizer::replying(Reply::SpawnError));
    let (mut requests, rx) = controller(mock.clone());

    let id = requests.submit(blank(16, 16), SourceKind::File).unwrap();

    // no parsing stage when the engine never ran
    match next_event(&rx).await {
        AppEvent::OcrFinished { id: finished_id, outcome } => {
            assert_eq!(finished_id, id);
            assert!(outcome.message().contains("not found"));
        }
        _ => panic!("Expected OcrFinished"),
    }
    assert!(!mock.calls()[0].path.exists());
}

#[tokio::test]
async fn test_second_submit_rejected_while_busy() {
    let mock = Arc::new(
        MockRecognizer::replying(Reply::Stdout(b"text")).with_delay(Duration::from_millis(200)),
    );
    let (mut requests, rx) = controller(mock.clone());

    let id = requests.submit(blank(16, 16), SourceKind::File).unwrap();
    let second = requests.submit(blank(16, 16), SourceKind::File);
    assert!(matches!(second, Err(OcrError::RequestInFlight)));
    assert_eq!(requests.active().unwrap().id, id);

    let (finished_id, outcome) = finished(&rx).await;
    requests.complete(finished_id, outcome).unwrap();

    // idle again, a new request is accepted
    assert!(requests.submit(blank(16, 16), SourceKind::File).is_ok());
    finished(&rx).await;
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn test_stale_events_are_ignored() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"text")));
    let (mut requests, rx) = controller(mock);

    let id = requests.submit(blank(16, 16), SourceKind::File).unwrap();

    let stranger = RequestId::new();
    assert!(!requests.advance(stranger, RequestState::Parsing));
    assert!(requests.complete(stranger, OcrOutcome::Success("x".into())).is_none());
    assert!(requests.is_busy());

    let (finished_id, outcome) = finished(&rx).await;
    assert!(requests.complete(finished_id, outcome.clone()).is_some());

    // delivered once only
    assert!(requests.complete(id, outcome).is_none());
    assert!(!requests.advance(id, RequestState::Parsing));
}

#[tokio::test]
async fn test_large_image_is_downscaled_before_engine() {
    let mock = Arc::new(MockRecognizer::replying(Reply::Stdout(b"text")));
    let (mut requests, rx) = controller(mock.clone());

    requests.submit(blank(2560, 1440), SourceKind::Region).unwrap();
    finished(&rx).await;

    assert_eq!(mock.calls()[0].dimensions, Some((1280, 720)));
}
