// タスク供給元 - CLI やテストが使う作業単位の実装
// コアはタスクの中身を知らない。ここにあるのは外部協力者側の実装例

pub mod file_probe;
pub mod http;
pub mod simulated;

pub use file_probe::{discover_files, probe_file_task, FileProbe};
pub use http::{fetch_status_task, fetch_status_tasks, http_client, HttpStatus};
pub use simulated::{sleep_task, sleep_tasks, SimulatedSpec};
