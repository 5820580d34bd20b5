// テスト用のタスク生成ヘルパーと計測用の共有状態

use bounded_fanout::Task;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 同時実行数の計測器
///
/// 実行中のタスク数と、その最大値を記録する。
#[derive(Debug, Default, Clone)]
pub struct ConcurrencyProbe {
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// まだ drop されていないタスク本体の数（ワーカーのリーク検出用）
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn enter(&self) -> LiveGuard {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        LiveGuard { probe: self.clone() }
    }
}

/// タスク本体が終わる（またはパニックで巻き戻る）ときにカウンタを戻す
struct LiveGuard {
    probe: ConcurrencyProbe,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.probe.running.fetch_sub(1, Ordering::SeqCst);
        self.probe.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `ms` ミリ秒待って自分の番号を返すタスク
pub fn timed_task(probe: &ConcurrencyProbe, index: usize, ms: u64) -> Task<usize> {
    let probe = probe.clone();
    Task::new(format!("task-{index}"), move || async move {
        let _guard = probe.enter();
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(index)
    })
}

pub fn timed_tasks(probe: &ConcurrencyProbe, durations_ms: &[u64]) -> Vec<Task<usize>> {
    durations_ms
        .iter()
        .enumerate()
        .map(|(index, &ms)| timed_task(probe, index, ms))
        .collect()
}

/// `ms` ミリ秒待ってから失敗するタスク
pub fn failing_task(index: usize, ms: u64, message: &'static str) -> Task<usize> {
    Task::new(format!("task-{index}"), move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Err::<usize, _>(anyhow::anyhow!(message))
    })
}

/// 実行するとパニックするタスク
pub fn panicking_task(index: usize) -> Task<usize> {
    Task::new(format!("task-{index}"), move || async move {
        if index < usize::MAX {
            panic!("task {index} exploded");
        }
        Ok(index)
    })
}
