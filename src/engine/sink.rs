// Sink - ワーカーから呼び出し側への結果配送チャンネル（fan-in）

use crate::core::{FanoutError, FanoutResult, TaskResult, MAX_LIMIT};
use std::fmt;
use tokio::sync::mpsc;

pub use tokio::sync::mpsc::error::TryRecvError;

/// 容量 `capacity` のシンクを作成
///
/// 多生産者・単一消費者。`recv` は `send` が完了した順（到着順）に結果を返す。
pub fn result_channel<T>(capacity: usize) -> (ResultSender<T>, ResultReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_LIMIT));
    (ResultSender { tx }, ResultReceiver { rx, closed: false })
}

/// 生産者側（ワーカーが保持する）
pub struct ResultSender<T> {
    tx: mpsc::Sender<TaskResult<T>>,
}

impl<T> ResultSender<T> {
    /// 結果を送信
    ///
    /// 容量が埋まっていれば消費者が読み出すまで待つ。消費者が `close` した後、
    /// または受信側が drop された後は、待機中の送信も含めて即座に `SinkClosed` で失敗する。
    pub async fn send(&self, result: TaskResult<T>) -> FanoutResult<()> {
        self.tx
            .send(result)
            .await
            .map_err(|_| FanoutError::SinkClosed)
    }

    /// 消費者が読むのをやめたかどうか
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// 送信を待たずに入れられる残り容量
    pub fn remaining_capacity(&self) -> usize {
        self.tx.capacity()
    }
}

impl<T> Clone for ResultSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for ResultSender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// 消費者側（呼び出し側が保持する）
pub struct ResultReceiver<T> {
    rx: mpsc::Receiver<TaskResult<T>>,
    closed: bool,
}

impl<T> ResultReceiver<T> {
    /// 次の結果を受信
    ///
    /// 全ての生産者が終了（またはシンクが閉じられ）バッファが空になると `None` を返す。
    pub async fn recv(&mut self) -> Option<TaskResult<T>> {
        self.rx.recv().await
    }

    /// 待たずに受信を試みる
    pub fn try_recv(&mut self) -> Result<TaskResult<T>, TryRecvError> {
        self.rx.try_recv()
    }

    /// シンクを閉じる
    ///
    /// 以降の送信は `SinkClosed` で失敗する。バッファ済みの結果は引き続き `recv` で読み出せる。
    pub fn close(&mut self) {
        if !self.closed {
            self.rx.close();
            self.closed = true;
        }
    }

    /// 消費者側から閉じられたかどうか
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> fmt::Debug for ResultReceiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultReceiver")
            .field("closed", &self.closed)
            .finish()
    }
}
