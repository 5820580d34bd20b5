// 設定管理の具象実装

use crate::core::{validate_config, DispatchConfig, FanoutResult, SinkCapacity};
use std::time::Duration;

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultDispatchConfig {
    max_concurrent: usize,
    sink_capacity: SinkCapacity,
    timeout: Option<Duration>,
    enable_progress: bool,
}

impl DefaultDispatchConfig {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            max_concurrent: cpu_count.max(1) * 2,
            sink_capacity: SinkCapacity::MatchLimit,
            timeout: None,
            enable_progress: true,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_sink_capacity(mut self, sink_capacity: SinkCapacity) -> Self {
        self.sink_capacity = sink_capacity;
        self
    }

    /// ゼロは「タイムアウトなし」として扱う
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|d| !d.is_zero());
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }

    pub fn validate(&self) -> FanoutResult<()> {
        validate_config(self)
    }
}

impl Default for DefaultDispatchConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl DispatchConfig for DefaultDispatchConfig {
    fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent
    }

    fn sink_capacity(&self) -> SinkCapacity {
        self.sink_capacity
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}
