// Admission - 同時実行数を制限するトークンプール

use crate::core::traits::check_upper_bound;
use crate::core::{FanoutError, FanoutResult, MAX_LIMIT};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// 固定容量の AdmissionToken プール
///
/// tokio の Semaphore は公平（FIFO）なので、待機中の取得要求が飢餓状態になることはない。
/// 取得は空きがなければ待ち、返却は決してブロックしない。
#[derive(Debug, Clone)]
pub struct AdmissionPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// ワーカー1つ分の実行許可
///
/// drop 時にプールへ返却される。成功・失敗・パニック・キャンセルのどの経路でも一度だけ返る。
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionPool {
    pub fn new(capacity: usize) -> FanoutResult<Self> {
        let limit = NonZeroUsize::new(capacity).ok_or_else(|| {
            FanoutError::invalid_configuration("limit", "同時実行数は1以上である必要があります")
        })?;
        Self::with_limit(limit)
    }

    /// `MAX_LIMIT` を超える上限は `InvalidConfiguration`
    pub fn with_limit(limit: NonZeroUsize) -> FanoutResult<Self> {
        check_upper_bound("limit", limit.get())?;
        Ok(Self::checked(limit))
    }

    /// 上限確認済みの値から作る
    pub(crate) fn checked(limit: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.get().min(MAX_LIMIT))),
            capacity: limit.get().min(MAX_LIMIT),
        }
    }

    /// トークンを1つ取得（全トークンが使用中なら返却まで待つ）
    pub async fn acquire(&self) -> FanoutResult<AdmissionToken> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| FanoutError::Cancelled)?;
        Ok(AdmissionToken { _permit: permit })
    }

    /// 待たずにトークンの取得を試みる
    pub fn try_acquire(&self) -> Option<AdmissionToken> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionToken { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 現在空いているトークン数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 使用中のトークン数
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }

    /// 以降の取得要求を失敗させる（待機中の要求も起こされて失敗する）
    pub fn close(&self) {
        self.semaphore.close();
    }
}
