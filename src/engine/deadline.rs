// Deadline Guard - 結果の到着とタイマーを競わせる

use super::sink::ResultReceiver;
use crate::core::TaskResult;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Instant, Sleep};
use tracing::info;

/// `DeadlineGuard::next` の結果
#[derive(Debug)]
pub enum Next<T> {
    /// 結果が1件届いた
    Item(TaskResult<T>),
    /// 全ての生産者が終了し、バッファも空になった（以降は常にこれを返す）
    Closed,
    /// 締め切りを過ぎた（以降は常にこれを返す）
    Expired,
}

/// 締め切り付きの結果イテレーター
///
/// 締め切りに達するとシンクを閉じる。実行中のワーカーは強制終了されず最後まで走るが、
/// その送信は `SinkClosed` で即座に失敗するので、放棄された消費者を待ってブロックし続けることはない。
pub struct DeadlineGuard<T> {
    receiver: ResultReceiver<T>,
    deadline: Option<Pin<Box<Sleep>>>,
    timeout: Option<Duration>,
    expired: bool,
    finished: bool,
}

impl<T> DeadlineGuard<T> {
    /// `timeout` が `None` またはゼロなら締め切りなし
    pub fn new(receiver: ResultReceiver<T>, timeout: Option<Duration>) -> Self {
        let timeout = timeout.filter(|d| !d.is_zero());
        Self {
            receiver,
            deadline: timeout.map(|d| Box::pin(tokio::time::sleep(d))),
            timeout,
            expired: false,
            finished: false,
        }
    }

    pub fn without_deadline(receiver: ResultReceiver<T>) -> Self {
        Self::new(receiver, None)
    }

    /// 次の結果か締め切りのどちらか早い方を待つ
    pub async fn next(&mut self) -> Next<T> {
        if self.expired {
            return Next::Expired;
        }
        if self.finished {
            return Next::Closed;
        }

        let Some(sleep) = self.deadline.as_mut() else {
            return match self.receiver.recv().await {
                Some(result) => Next::Item(result),
                None => self.finish(),
            };
        };

        // 締め切りを先に見る。結果が途切れず届き続けても打ち切りが遅れないように
        let received = tokio::select! {
            biased;
            () = sleep.as_mut() => None,
            received = self.receiver.recv() => Some(received),
        };

        match received {
            Some(Some(result)) => Next::Item(result),
            Some(None) => self.finish(),
            None => {
                self.expire();
                Next::Expired
            }
        }
    }

    fn finish(&mut self) -> Next<T> {
        self.finished = true;
        Next::Closed
    }

    fn expire(&mut self) {
        self.expired = true;
        self.receiver.close();
        info!(timeout_ms = ?self.timeout.map(|d| d.as_millis()), "deadline elapsed; abandoning remaining results");
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// シンクが閉じて全件を受け取り終えたかどうか
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 締め切りまでの残り時間（締め切りなしなら `None`）
    pub fn remaining(&self) -> Option<Duration> {
        if self.expired {
            return Some(Duration::ZERO);
        }
        self.deadline
            .as_ref()
            .map(|sleep| sleep.deadline().saturating_duration_since(Instant::now()))
    }

    /// 締め切り前ならシンクを返す
    pub fn into_receiver(self) -> Option<ResultReceiver<T>> {
        if self.expired {
            None
        } else {
            Some(self.receiver)
        }
    }
}
