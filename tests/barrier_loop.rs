// tests/barrier_loop.rs

use std::error::Error;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use pipeline_queue::barrier::{Barrier, BarrierOptions, BarrierOutcome, TokioWait};
use pipeline_queue::errors::PipelineQueueError;
use pipeline_queue_test_utils::builders::SnapshotBuilder;
use pipeline_queue_test_utils::fakes::{FakeSource, RecordingWait};
use pipeline_queue_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const PROJECT: &str = "987";
const PIPELINE: u64 = 1027;
const INTERVAL: Duration = Duration::from_secs(30);

fn options() -> BarrierOptions {
    BarrierOptions::new(PROJECT, PIPELINE, INTERVAL)
}

fn behind() -> pipeline_queue::pipeline::Snapshot {
    SnapshotBuilder::new()
        .running(1000, 0)
        .running(PIPELINE, 10)
        .build()
}

fn in_front() -> pipeline_queue::pipeline::Snapshot {
    SnapshotBuilder::new().running(PIPELINE, 10).build()
}

#[tokio::test]
async fn waits_exactly_once_before_becoming_first() -> TestResult {
    init_tracing();

    let source = FakeSource::new()
        .then_snapshot(behind())
        .then_snapshot(in_front());
    let calls = source.calls_handle();
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let outcome = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await?;

    assert_eq!(outcome, BarrierOutcome::First { attempts: 2 });
    assert_eq!(*waits.lock().unwrap(), vec![INTERVAL]);
    assert_eq!(*calls.lock().unwrap(), vec![PROJECT.to_string(), PROJECT.to_string()]);
    Ok(())
}

#[tokio::test]
async fn transport_error_on_first_poll_is_fatal_without_waiting() {
    init_tracing();

    let source = FakeSource::new()
        .then_error(PipelineQueueError::UnexpectedStatus {
            status: 502,
            url: "fake://projects/987/pipelines".to_string(),
        })
        .then_snapshot(in_front());
    let calls = source.calls_handle();
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let result = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await;

    assert!(matches!(
        result,
        Err(PipelineQueueError::UnexpectedStatus { status: 502, .. })
    ));
    assert!(waits.lock().unwrap().is_empty());
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn error_after_waiting_is_not_retried() {
    init_tracing();

    let source = FakeSource::new()
        .then_snapshot(behind())
        .then_error(PipelineQueueError::Other(anyhow::anyhow!("connection reset")))
        .then_snapshot(in_front());
    let calls = source.calls_handle();
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let result = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await;

    match result {
        Err(PipelineQueueError::Other(e)) => assert!(e.to_string().contains("connection reset")),
        other => panic!("expected Other error, got {other:?}"),
    }
    assert_eq!(waits.lock().unwrap().len(), 1);
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn pipeline_leaving_the_running_set_is_fatal() {
    init_tracing();

    let gone = SnapshotBuilder::new().running(1000, 0).build();
    let source = FakeSource::new().then_snapshot(behind()).then_snapshot(gone);
    let wait = RecordingWait::new();

    let result = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await;

    assert!(matches!(
        result,
        Err(PipelineQueueError::PipelineNotFound {
            pipeline_id: PIPELINE,
            ..
        })
    ));
}

#[tokio::test]
async fn malformed_timestamp_aborts_the_loop() {
    init_tracing();

    let snapshot = SnapshotBuilder::new()
        .running(PIPELINE, 0)
        .running_raw(1000, "garbage")
        .build();
    let source = FakeSource::new().then_snapshot(snapshot);
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let result = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await;

    assert!(matches!(
        result,
        Err(PipelineQueueError::TimestampParse {
            pipeline_id: 1000,
            ..
        })
    ));
    assert!(waits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn keeps_polling_with_a_constant_interval() -> TestResult {
    init_tracing();

    let source = FakeSource::new()
        .then_snapshot(behind())
        .then_snapshot(behind())
        .then_snapshot(behind())
        .then_snapshot(in_front());
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let outcome = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await?;

    assert_eq!(outcome, BarrierOutcome::First { attempts: 4 });
    assert_eq!(*waits.lock().unwrap(), vec![INTERVAL; 3]);
    Ok(())
}

#[tokio::test]
async fn single_check_reports_position_without_waiting() -> TestResult {
    init_tracing();

    let source = FakeSource::new().then_snapshot(behind());
    let wait = RecordingWait::new();
    let waits = wait.waits_handle();

    let outcome = with_timeout(
        Barrier::new(source, wait, options().once(true)).run(CancellationToken::new()),
    )
    .await?;

    match outcome {
        BarrierOutcome::NotFirst { position } => {
            assert_eq!(position.position, 1);
            assert_eq!(position.ahead, Some(1000));
        }
        other => panic!("expected NotFirst, got {other:?}"),
    }
    assert_eq!(outcome.exit_code(), 2);
    assert!(waits.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn cancellation_during_wait_stops_the_loop() -> TestResult {
    init_tracing();

    let source = FakeSource::new()
        .then_snapshot(behind())
        .then_snapshot(behind())
        .then_snapshot(in_front());
    let calls = source.calls_handle();
    let wait = RecordingWait::new().cancel_on(2);

    let outcome = with_timeout(Barrier::new(source, wait, options()).run(CancellationToken::new()))
        .await?;

    assert_eq!(outcome, BarrierOutcome::Cancelled { attempts: 2 });
    assert_eq!(calls.lock().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn already_cancelled_token_skips_polling() -> TestResult {
    init_tracing();

    let source = FakeSource::new().then_snapshot(in_front());
    let calls = source.calls_handle();
    let token = CancellationToken::new();
    token.cancel();

    let outcome = with_timeout(Barrier::new(source, RecordingWait::new(), options()).run(token))
        .await?;

    assert_eq!(outcome, BarrierOutcome::Cancelled { attempts: 0 });
    assert!(calls.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn tokio_wait_sleeps_for_the_configured_interval() -> TestResult {
    init_tracing();

    let source = FakeSource::new()
        .then_snapshot(behind())
        .then_snapshot(in_front());
    let start = tokio::time::Instant::now();

    let outcome = Barrier::new(source, TokioWait, options())
        .run(CancellationToken::new())
        .await?;

    assert_eq!(outcome, BarrierOutcome::First { attempts: 2 });
    assert!(start.elapsed() >= INTERVAL);
    assert!(start.elapsed() < INTERVAL * 2);
    Ok(())
}
