// 統合テスト - 公開APIだけを使ってディスパッチャ全体の振る舞いを検証する

mod fixtures;

mod test_bounded_concurrency;
mod test_error_handling;
mod test_http_fetch;
mod test_timeout;
