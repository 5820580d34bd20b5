// エラーハンドリングの統合テスト
use crate::fixtures::{failing_task, panicking_task, timed_task, ConcurrencyProbe};
use anyhow::Result;
use bounded_fanout::{
    core::ErrorSeverity, run_to_completion, run_with_config, DefaultDispatchConfig, Dispatcher,
    FanoutError, NoOpProgressReporter, SinkCapacity, TaskError,
};
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failures_do_not_stop_siblings() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let tasks = vec![
        timed_task(&probe, 0, 10),
        failing_task(1, 5, "connection refused"),
        timed_task(&probe, 2, 20),
        panicking_task(3),
        timed_task(&probe, 4, 5),
    ];

    let mut results = run_to_completion(tasks, 2).await?;
    results.sort_by_key(|r| r.source.index);

    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert!(matches!(
        results[1].error(),
        Some(TaskError::Failed { message }) if message.contains("connection refused")
    ));
    assert!(matches!(
        results[3].error(),
        Some(TaskError::Panicked { message }) if message.contains("exploded")
    ));
    assert_eq!(results[3].source.key, "task-3");
    Ok(())
}

#[tokio::test]
async fn test_every_task_failing_still_closes_sink() -> Result<()> {
    let tasks = (0..6).map(|i| failing_task(i, 1, "boom"));

    let results = run_to_completion(tasks, 3).await?;

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| !r.is_ok()));
    Ok(())
}

#[tokio::test]
async fn test_invalid_configuration_starts_no_workers() {
    let probe = ConcurrencyProbe::new();
    let tasks = vec![timed_task(&probe, 0, 1)];

    let error = run_to_completion(tasks, 0).await.unwrap_err();
    assert!(matches!(error, FanoutError::InvalidConfiguration { .. }));
    assert_eq!(error.severity(), ErrorSeverity::High);
    assert!(!error.is_recoverable());
    assert_eq!(probe.started(), 0);

    assert!(Dispatcher::new(1)
        .and_then(|d| d.with_sink_capacity(SinkCapacity::Fixed(0)))
        .is_err());
}

#[tokio::test]
async fn test_run_with_config_reports_failures_in_summary() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let tasks = vec![
        timed_task(&probe, 0, 5),
        failing_task(1, 5, "bad input"),
        timed_task(&probe, 2, 5),
    ];
    let config = DefaultDispatchConfig::new(1)
        .with_max_concurrent(2)
        .with_timeout(Some(Duration::from_secs(5)));

    let collected = run_with_config(tasks, &config, &NoOpProgressReporter::new()).await?;

    assert_eq!(collected.summary.succeeded, 2);
    assert_eq!(collected.summary.failed, 1);
    assert!(!collected.summary.timed_out);

    let record = collected
        .results
        .iter()
        .find(|r| !r.is_ok())
        .map(|r| r.to_record())
        .ok_or_else(|| anyhow::anyhow!("failed result missing"))?;
    let json = serde_json::to_value(&record)?;
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap_or_default().contains("bad input"));
    Ok(())
}
