// bounded_fanout - 同時実行数を制限した fan-out/fan-in タスク実行器
//
// レイヤー構成:
// - core: トレイト・型・エラー定義
// - engine: トークンプール、シンク、ディスパッチャ、締め切り
// - services: 設定・進捗報告・タスク供給元の具象実装
// - cli: コマンドライン

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;

// よく使う型をクレート直下から使えるようにする
pub use crate::core::{
    DispatchConfig, DispatchSummary, FanoutError, FanoutResult, ProgressReporter, SinkCapacity,
    Task, TaskError, TaskId, TaskRecord, TaskResult, MAX_LIMIT,
};
pub use crate::engine::{
    collect_results, dispatch, drain_results, run_to_completion, run_with_config, run_with_timeout,
    AdmissionPool, AdmissionToken, CollectedResults, DeadlineGuard, Dispatch, DispatchHandle,
    DispatchReport, Dispatcher, Next, ResultReceiver, ResultSender,
};
pub use crate::services::{ConsoleProgressReporter, DefaultDispatchConfig, NoOpProgressReporter};
