use crate::database_ops::games::GameDraft;
use crate::normalization::name::clean_name;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Per-platform cap on mapped catalog entries; bounds the ingest batch size
/// and the downstream insert.
pub const MAX_ENTRIES_PER_PLATFORM: usize = 100;

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        s.truncate(max_len);
        s.push('…');
    }
    s
}

/// Client for the remote top-100 catalog documents.
///
/// Each platform exposes one JSON document, possibly an array of arrays of
/// raw app records. Failures are isolated per platform: the caller always
/// gets a vector, empty when the upstream is unreachable, returns a
/// non-success status, or serves unparseable JSON.
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    http: Client,
}

impl CatalogProvider {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self> {
        let timeout_secs = timeout_secs.unwrap_or(15);
        let http = Client::builder()
            .user_agent("games-api/0.1")
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch and map one platform's catalog. Never fails; one platform's
    /// outage must not block the other's ingest.
    pub async fn fetch_platform(&self, url: &str, platform: &str) -> Vec<GameDraft> {
        match self.try_fetch(url, platform).await {
            Ok(drafts) => {
                tracing::info!(platform = %platform, count = drafts.len(), "catalog fetched");
                drafts
            }
            Err(err) => {
                tracing::warn!(platform = %platform, error = %err, "catalog fetch failed; skipping platform");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str, platform: &str) -> Result<Vec<GameDraft>> {
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!(
                "{platform} catalog fetch failed: {status} url={url} body={body}"
            ));
        }
        let body: Value = resp.json().await?;
        let Some(items) = body.as_array() else {
            return Err(anyhow!(
                "unexpected {platform} catalog shape (expected array)"
            ));
        };
        Ok(map_catalog_entries(items, platform))
    }
}

/// Flatten one level of array nesting, drop entries without a usable name,
/// cap the batch and map the remainder into drafts.
pub fn map_catalog_entries(items: &[Value], platform: &str) -> Vec<GameDraft> {
    let now = Utc::now();
    items
        .iter()
        .flat_map(|item| match item {
            Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter_map(|entry| map_entry(entry, platform, now))
        .take(MAX_ENTRIES_PER_PLATFORM)
        .collect()
}

fn map_entry(entry: &Value, platform: &str, now: DateTime<Utc>) -> Option<GameDraft> {
    let name = clean_name(entry.get("name").and_then(|v| v.as_str()));
    if name.is_empty() {
        return None;
    }
    Some(GameDraft {
        publisher_id: entry.get("publisher_id").and_then(Value::as_i64),
        name,
        platform: platform.to_string(),
        store_id: entry.get("app_id").and_then(Value::as_i64),
        bundle_id: entry
            .get("bundle_id")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        app_version: entry
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        is_published: entry.get("release_date").map(is_truthy).unwrap_or(false),
        created_at: now,
        updated_at: now,
    })
}

/// JS-style truthiness for the `release_date` field: null, false, 0 and ""
/// all read as unreleased.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(name: &str) -> Value {
        json!({ "name": name })
    }

    #[test]
    fn flattens_one_level_of_nesting() {
        let body = json!([[named("A"), named("B")], [named("C")]]);
        let drafts = map_catalog_entries(body.as_array().unwrap(), "ios");
        let names: Vec<&str> = drafts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert!(drafts.iter().all(|d| d.platform == "ios"));
    }

    #[test]
    fn drops_entries_without_usable_names() {
        let body = json!([
            named("Keep"),
            { "app_id": 2 },
            { "name": "" },
            { "name": "   " },
            { "name": 42 },
        ]);
        let drafts = map_catalog_entries(body.as_array().unwrap(), "ios");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].name, "Keep");
    }

    #[test]
    fn caps_each_platform_at_100_entries() {
        let items: Vec<Value> = (0..150).map(|i| json!({ "name": format!("Game {i}") })).collect();
        let drafts = map_catalog_entries(&items, "android");
        assert_eq!(drafts.len(), MAX_ENTRIES_PER_PLATFORM);
        assert_eq!(drafts[0].name, "Game 0");
        assert_eq!(drafts[99].name, "Game 99");
    }

    #[test]
    fn derives_is_published_from_release_date() {
        let body = json!([
            { "name": "dated", "release_date": "2018-02-28" },
            { "name": "numeric", "release_date": 1519772400 },
            { "name": "missing" },
            { "name": "null", "release_date": null },
            { "name": "empty", "release_date": "" },
        ]);
        let drafts = map_catalog_entries(body.as_array().unwrap(), "ios");
        let published: Vec<bool> = drafts.iter().map(|d| d.is_published).collect();
        assert_eq!(published, [true, true, false, false, false]);
    }

    #[test]
    fn maps_store_fields() {
        let body = json!([{
            "name": "  Helix Jump ",
            "publisher_id": 12,
            "app_id": 1345968745,
            "bundle_id": "com.h2g.helixjump",
            "version": "2.4.4",
            "release_date": "2018-02-28",
        }]);
        let drafts = map_catalog_entries(body.as_array().unwrap(), "ios");
        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert_eq!(d.name, "Helix Jump");
        assert_eq!(d.publisher_id, Some(12));
        assert_eq!(d.store_id, Some(1345968745));
        assert_eq!(d.bundle_id.as_deref(), Some("com.h2g.helixjump"));
        assert_eq!(d.app_version.as_deref(), Some("2.4.4"));
        assert!(d.is_published);
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_empty_batch() {
        let provider = CatalogProvider::new(Some(2)).unwrap();
        let drafts = provider
            .fetch_platform("http://127.0.0.1:9/ios.top100.json", "ios")
            .await;
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn error_status_yields_empty_batch() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let _ = sock
                    .write_all(
                        b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
            }
        });

        let provider = CatalogProvider::new(Some(2)).unwrap();
        let drafts = provider
            .fetch_platform(&format!("http://{addr}/android.top100.json"), "android")
            .await;
        assert!(drafts.is_empty());
    }
}
