// 擬似タスク - 指定時間だけ待ってから成功または失敗する

use crate::core::Task;
use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// 擬似タスクの仕様（`"30"` なら30ms成功、`"30!"` なら30ms後に失敗）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedSpec {
    pub duration: Duration,
    pub fail: bool,
}

impl FromStr for SimulatedSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (millis, fail) = match s.strip_suffix('!') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let millis: u64 = millis
            .parse()
            .with_context(|| format!("invalid task duration: {s:?}"))?;
        Ok(Self {
            duration: Duration::from_millis(millis),
            fail,
        })
    }
}

/// `duration` 待ってから、経過時間（ms）を返すタスク
pub fn sleep_task(key: impl Into<String>, duration: Duration, fail: bool) -> Task<u64> {
    let key = key.into();
    let label = key.clone();
    Task::new(key, move || async move {
        tokio::time::sleep(duration).await;
        if fail {
            bail!("simulated failure after {}ms ({label})", duration.as_millis());
        }
        Ok(duration.as_millis() as u64)
    })
}

/// 仕様の列から擬似タスク列を作る
pub fn sleep_tasks(specs: &[SimulatedSpec]) -> Vec<Task<u64>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            sleep_task(
                format!("sleep-{i}-{}ms", spec.duration.as_millis()),
                spec.duration,
                spec.fail,
            )
        })
        .collect()
}
