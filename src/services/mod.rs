// サービス層 - 機能別の具象実装
// 設定・進捗報告・タスク供給元はそれぞれ独立しており、コアのトレイト越しに組み合わせる

pub mod config;
pub mod monitoring;
pub mod tasks;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::DefaultDispatchConfig;
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
pub use tasks::{
    discover_files, fetch_status_task, fetch_status_tasks, http_client, probe_file_task, sleep_task,
    sleep_tasks, FileProbe, HttpStatus, SimulatedSpec,
};
