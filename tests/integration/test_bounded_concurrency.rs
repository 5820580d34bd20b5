// 同時実行数の上限と結果の完全性の統合テスト
use crate::fixtures::{timed_tasks, ConcurrencyProbe};
use anyhow::Result;
use bounded_fanout::{dispatch, run_to_completion, Dispatcher, SinkCapacity};
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_limit_is_never_exceeded_for_various_sizes() -> Result<()> {
    for (task_count, limit) in [(1, 1), (5, 1), (8, 3), (10, 10), (20, 4), (16, 7)] {
        let probe = ConcurrencyProbe::new();
        let durations: Vec<u64> = (0..task_count).map(|i| 5 + (i as u64 % 4) * 5).collect();

        let results = run_to_completion(timed_tasks(&probe, &durations), limit).await?;

        assert_eq!(results.len(), task_count, "N={task_count} K={limit}");
        assert!(
            probe.peak() <= limit,
            "N={task_count} K={limit}: 同時実行数 {} が上限を超えた",
            probe.peak()
        );
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_task_yields_exactly_one_result() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations: Vec<u64> = (0..25).map(|i| (i * 7 % 11) as u64).collect();

    let results = run_to_completion(timed_tasks(&probe, &durations), 5).await?;

    let indices: Vec<usize> = results.iter().map(|r| r.source.index).collect();
    let unique: HashSet<usize> = indices.iter().copied().collect();
    assert_eq!(indices.len(), 25);
    assert_eq!(unique, (0..25).collect::<HashSet<_>>());
    assert!(results.iter().all(|r| r.value() == Some(&r.source.index)));
    assert_eq!(probe.started(), 25);
    Ok(())
}

#[tokio::test]
async fn test_limit_one_runs_sequentially() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [20, 10, 30, 15];

    let start = Instant::now();
    let results = run_to_completion(timed_tasks(&probe, &durations), 1).await?;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 4);
    assert_eq!(probe.peak(), 1);
    assert!(elapsed >= Duration::from_millis(75), "elapsed {elapsed:?}");
    // 逐次実行なので完了順は投入順
    let order: Vec<usize> = results.iter().map(|r| r.source.index).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_durations_with_limit_three() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [10, 20, 30, 10, 20, 30];

    let start = Instant::now();
    let results = run_to_completion(timed_tasks(&probe, &durations), 3).await?;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 6);
    assert!(probe.peak() <= 3);
    // 最低でも2周分、逐次実行（120ms）よりは十分速い
    assert!(elapsed >= Duration::from_millis(40), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
    Ok(())
}

#[tokio::test]
async fn test_results_arrive_in_completion_order() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = [80, 10, 40];

    let results = run_to_completion(timed_tasks(&probe, &durations), 3).await?;

    let order: Vec<usize> = results.iter().map(|r| r.source.index).collect();
    assert_eq!(order, vec![1, 2, 0]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_small_sink_applies_backpressure_without_losing_results() -> Result<()> {
    let probe = ConcurrencyProbe::new();
    let durations = vec![1; 30];

    let dispatcher = Dispatcher::new(6)?.with_sink_capacity(SinkCapacity::Fixed(1))?;
    let (mut results, handle) = dispatcher.run(timed_tasks(&probe, &durations)).into_parts();

    // 消費者がゆっくり読んでも取りこぼしはない
    let mut seen = HashSet::new();
    while let Some(result) = results.recv().await {
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(seen.insert(result.source.index));
    }

    assert_eq!(seen.len(), 30);
    let report = handle.join().await?;
    assert_eq!(report.submitted, 30);
    assert_eq!(report.skipped, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_input_terminates() -> Result<()> {
    let mut dispatch = dispatch(Vec::<bounded_fanout::Task<usize>>::new(), 4)?;
    assert_eq!(dispatch.total_tasks(), 0);
    assert!(dispatch.results().recv().await.is_none());
    Ok(())
}
