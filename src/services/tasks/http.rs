// HTTP ステータス取得タスク - URL を GET してステータス行を返す

use crate::core::Task;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// 1 URL 分の取得結果
///
/// 4xx/5xx もサーバーからの応答なので成功として扱う。接続できなかった場合だけタスクが失敗する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpStatus {
    pub url: String,
    pub code: u16,
    /// `"200 OK"` 形式のステータス行
    pub status: String,
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

/// 全タスクで共有する HTTP クライアントを作る
pub fn http_client(request_timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("fanout/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = request_timeout.filter(|t| !t.is_zero()) {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build HTTP client")
}

/// `url` を GET してステータス行を返すタスク
pub fn fetch_status_task(client: Client, url: impl Into<String>) -> Task<HttpStatus> {
    let url = url.into();
    Task::new(url.clone(), move || async move {
        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        Ok(HttpStatus {
            code: status.as_u16(),
            status: status_line(status),
            url,
        })
    })
}

pub fn fetch_status_tasks<I, S>(client: &Client, urls: I) -> Vec<Task<HttpStatus>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    urls.into_iter()
        .map(|url| fetch_status_task(client.clone(), url))
        .collect()
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_str()),
        None => status.as_str().to_string(),
    }
}
