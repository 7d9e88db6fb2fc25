use anyhow::{Context, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde::Serialize;
use serde_json::Value;

use crate::external_time::ExternalTimeEntry;
use crate::language::Language;

/// Dreaming APIのデフォルトのURL。
pub const DEFAULT_API_URL: &str = "https://app.dreaming.com/.netlify/functions";

/// external time APIのクエリパラメータ。
#[derive(Debug, Serialize)]
struct ExternalTimeQuery {
    language: Language,
}

/// external timeを読み書きするためのリポジトリ。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExternalTimeRepository {
    /// 指定された言語のexternal timeを全て取得する。
    ///
    /// レスポンスの形式は一定ではないため、デコードしたJSONをそのまま返す。
    ///
    /// # Arguments
    ///
    /// * `language` - 取得する言語
    async fn read_external_times(&self, language: Language) -> Result<Value>;

    /// 指定された言語にexternal timeを1件登録する。
    ///
    /// # Arguments
    ///
    /// * `language` - 登録先の言語
    /// * `entry` - 登録するエントリー
    async fn create_external_time(
        &self,
        language: Language,
        entry: &ExternalTimeEntry,
    ) -> Result<Value>;
}

/// Dreaming APIと通信するためのクライアント。
///
/// 1つのクライアントは1つのアカウント(トークン)に対応する。
///
/// # Examples
///
/// ```
/// let client = DreamingClient::new(DEFAULT_API_URL, "token").unwrap();
/// let response = client.read_external_times(Language::Es).await.unwrap();
/// ```
pub struct DreamingClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl DreamingClient {
    /// 新しい`DreamingClient`を返す。
    ///
    /// # Arguments
    ///
    /// * `api_url` - APIのベースURL
    /// * `api_token` - アカウントのBearerトークン
    pub fn new(api_url: &str, api_token: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/externalTime", self.api_url)
    }
}

#[async_trait]
impl ExternalTimeRepository for DreamingClient {
    async fn read_external_times(&self, language: Language) -> Result<Value> {
        let response = self
            .client
            .get(self.endpoint())
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "*/*")
            .query(&ExternalTimeQuery { language })
            .send()
            .await
            .with_context(|| format!("Failed to send request to Dreaming API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Value>()
            .await
            .context("Failed to deserialize response")?;

        Ok(response)
    }

    async fn create_external_time(
        &self,
        language: Language,
        entry: &ExternalTimeEntry,
    ) -> Result<Value> {
        let body = serde_json::to_string(entry).context("Failed to serialize entry")?;
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .query(&ExternalTimeQuery { language })
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Dreaming API at {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Value>()
            .await
            .context("Failed to deserialize response")?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::{DreamingClient, ExternalTimeRepository};
    use crate::language::Language;

    /// 言語とトークンを指定してexternal timeを取得できることを確認する。
    #[tokio::test]
    async fn test_read_external_times() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/externalTime")
            .match_query(Matcher::UrlEncoded("language".into(), "es".into()))
            .match_header("authorization", "Bearer source-token")
            .match_header("accept", "*/*")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"externalTimes": [{"id": "a1", "timeSeconds": 60}]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = DreamingClient::new(&server.url(), "source-token").unwrap();
        let response = client.read_external_times(Language::Es).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            response,
            json!({"externalTimes": [{"id": "a1", "timeSeconds": 60}]})
        );
    }

    /// 二重にエンコードされたレスポンスは文字列として返すことを確認する。
    #[tokio::test]
    async fn test_read_external_times_encoded_string() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/externalTime")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#""[{\"id\": 1}]""#)
            .create_async()
            .await;

        let client = DreamingClient::new(&server.url(), "token").unwrap();
        let response = client.read_external_times(Language::Fr).await.unwrap();

        assert_eq!(response, json!("[{\"id\": 1}]"));
    }

    /// エラーステータスの場合はエラーを返すことを確認する。
    #[tokio::test]
    async fn test_read_external_times_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/externalTime")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = DreamingClient::new(&server.url(), "token").unwrap();
        let result = client.read_external_times(Language::Es).await;

        assert!(result.is_err());
    }

    /// 登録時のヘッダーとボディを確認する。
    #[tokio::test]
    async fn test_create_external_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/externalTime")
            .match_query(Matcher::UrlEncoded("language".into(), "fr".into()))
            .match_header("authorization", "Bearer target-token")
            .match_header("accept", "*/*")
            .match_header("content-type", "text/plain;charset=UTF-8")
            .match_body(Matcher::Json(
                json!({"timeSeconds": 60, "idempotencyKey": "key-1"}),
            ))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let entry = json!({"timeSeconds": 60, "idempotencyKey": "key-1"})
            .as_object()
            .unwrap()
            .clone();
        let client = DreamingClient::new(&format!("{}/", server.url()), "target-token").unwrap();
        let response = client
            .create_external_time(Language::Fr, &entry)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_create_external_time_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/externalTime")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": "bad request"}"#)
            .create_async()
            .await;

        let entry = json!({"timeSeconds": 60}).as_object().unwrap().clone();
        let client = DreamingClient::new(&server.url(), "token").unwrap();
        let result = client.create_external_time(Language::Fr, &entry).await;

        assert!(result.is_err());
    }
}
