// エンジン層 - 並列実行とオーケストレーション
// トークンプール・シンク・締め切りを組み合わせて fan-out/fan-in を提供

pub mod admission;
pub mod api;
pub mod collector;
pub mod deadline;
pub mod dispatcher;
pub mod sink;

// 公開API - 主要な型
pub use admission::{AdmissionPool, AdmissionToken};
pub use api::{dispatch, run_to_completion, run_with_config, run_with_timeout};
pub use collector::{collect_results, drain_results, CollectedResults};
pub use deadline::{DeadlineGuard, Next};
pub use dispatcher::{Dispatch, DispatchHandle, DispatchReport, Dispatcher};
pub use sink::{result_channel, ResultReceiver, ResultSender};
