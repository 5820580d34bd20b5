// 締め切り（Deadline Guard）の統合テスト
use crate::fixtures::{timed_tasks, ConcurrencyProbe};
use anyhow::Result;
use bounded_fanout::{
    collect_results, run_with_timeout, DeadlineGuard, Dispatcher, Next, NoOpProgressReporter,
};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_timeout_returns_partial_results_near_deadline() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [10, 10, 500, 500];

    let start = Instant::now();
    let collected = run_with_timeout(timed_tasks(&probe, &durations), 4, Duration::from_millis(100)).await?;
    let elapsed = start.elapsed();

    assert!(collected.summary.timed_out);
    assert_eq!(collected.summary.delivered, 2);
    assert_eq!(collected.summary.missing(), 2);
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn test_no_workers_leak_after_timeout() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = vec![150; 8];

    let dispatcher = Dispatcher::new(2)?.with_timeout(Some(Duration::from_millis(50)));
    let (mut guard, handle) = dispatcher.run(timed_tasks(&probe, &durations)).into_guard();

    assert!(matches!(guard.next().await, Next::Expired));
    assert!(guard.is_expired());

    // 実行中のワーカーは最後まで走るが、放棄されたシンクで止まらずに終わる
    let report = tokio::time::timeout(Duration::from_secs(2), handle.join())
        .await
        .map_err(|_| anyhow::anyhow!("workers did not exit after the deadline"))??;

    assert_eq!(report.submitted, 2);
    assert_eq!(report.skipped, 6);
    assert_eq!(probe.started(), 2);
    assert_eq!(probe.live(), 0);
    Ok(())
}

#[tokio::test]
async fn test_zero_timeout_waits_for_everything() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [30, 10, 20];

    let dispatcher = Dispatcher::new(2)?;
    let dispatch = dispatcher.run(timed_tasks(&probe, &durations));
    let total = dispatch.total_tasks();
    let (guard, handle) = dispatch.with_timeout(Some(Duration::ZERO));

    let collected = collect_results(guard, total, &NoOpProgressReporter::new()).await;
    assert!(!collected.summary.timed_out);
    assert_eq!(collected.summary.delivered, 3);
    handle.join().await?;
    Ok(())
}

#[tokio::test]
async fn test_results_before_deadline_are_kept() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [5, 5, 5, 300];

    let dispatcher = Dispatcher::new(4)?;
    let (results, handle) = dispatcher.run(timed_tasks(&probe, &durations)).into_parts();
    let mut guard = DeadlineGuard::new(results, Some(Duration::from_millis(120)));

    let mut delivered = Vec::new();
    loop {
        match guard.next().await {
            Next::Item(result) => delivered.push(result.source.index),
            Next::Closed => panic!("長いタスクが残っているのでシンクは閉じないはず"),
            Next::Expired => break,
        }
    }

    delivered.sort_unstable();
    assert_eq!(delivered, vec![0, 1, 2]);
    // 締め切り後は何度呼んでも Expired
    assert!(matches!(guard.next().await, Next::Expired));

    let report = handle.join().await?;
    assert_eq!(report.submitted, 4);
    Ok(())
}
