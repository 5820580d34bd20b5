// Custom error types for the fan-out executor
// ディスパッチャ・シンク・タスク単位のエラー型定義

use thiserror::Error;

/// ディスパッチャ全体のエラー型
///
/// タスク単位の失敗はここには含まれない（`TaskError` として結果に載る）。
#[derive(Error, Debug)]
pub enum FanoutError {
    #[error("設定エラー: {field} - {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("シンクは既に閉じられています")]
    SinkClosed,

    #[error("ディスパッチはキャンセルされました")]
    Cancelled,

    #[error("ジョインエラー: {source}")]
    Join {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl FanoutError {
    /// 設定エラーの作成
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// ジョインエラーの作成
    pub fn join(source: tokio::task::JoinError) -> Self {
        Self::Join { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidConfiguration { .. } => ErrorSeverity::High,
            Self::SinkClosed => ErrorSeverity::Low,
            // 未開始のタスクが結果を返さずに捨てられる
            Self::Cancelled => ErrorSeverity::Medium,
            Self::Join { .. } => ErrorSeverity::Critical,
        }
    }

    /// エラーが回復可能かどうかを判定
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfiguration { .. } => false,
            // 消費者が読むのをやめただけなので、ワーカーは結果を捨てて終了すればよい
            Self::SinkClosed | Self::Cancelled => true,
            Self::Join { .. } => false,
        }
    }
}

impl From<tokio::task::JoinError> for FanoutError {
    fn from(error: tokio::task::JoinError) -> Self {
        FanoutError::Join { source: error }
    }
}

/// タスク単位のエラー
///
/// 結果ストリームに載せて呼び出し側へ届ける。兄弟タスクやディスパッチャを止めることはない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("タスク失敗: {message}")]
    Failed { message: String },

    #[error("タスクがパニックしました: {message}")]
    Panicked { message: String },
}

impl TaskError {
    /// 失敗エラーの作成
    ///
    /// `{:#}` で anyhow のコンテキストチェーンごと文字列化する。
    pub fn failed(error: &anyhow::Error) -> Self {
        Self::Failed {
            message: format!("{error:#}"),
        }
    }

    /// パニックのペイロードからエラーを作成
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { message }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Failed { message } | Self::Panicked { message } => message,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// ディスパッチャ操作の結果型
pub type FanoutResult<T> = std::result::Result<T, FanoutError>;
