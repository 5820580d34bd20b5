// HTTP ステータス取得タスクの統合テスト（ローカルのモックサーバーを使う）
use anyhow::Result;
use bounded_fanout::services::{fetch_status_tasks, http_client};
use bounded_fanout::run_to_completion;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fetch_statuses_with_bounded_workers() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(6)
        .mount(&server)
        .await;

    let client = http_client(Some(Duration::from_secs(5)))?;
    let urls: Vec<String> = (0..6).map(|i| format!("{}/page/{i}", server.uri())).collect();

    let start = Instant::now();
    let results = run_to_completion(fetch_status_tasks(&client, urls.clone()), 2).await?;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.value().map(|s| s.status.as_str()) == Some("200 OK")));
    let keys: HashSet<&str> = results.iter().map(|r| r.source.key.as_str()).collect();
    assert_eq!(keys, urls.iter().map(String::as_str).collect::<HashSet<_>>());

    // 同時2件なので3周分はかかる
    assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    Ok(())
}
