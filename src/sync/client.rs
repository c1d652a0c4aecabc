use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, Response};

use super::TaskRemote;
use super::error::RemoteError;
use crate::core::item::Item;

/// Characters escaped in a title used as a path segment: everything except the
/// RFC 3986 unreserved set.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTTP client for the food service's `/login` and `/tasks` resources.
#[derive(Clone)]
pub struct FoodClient {
    base_url: String,
    http: Client,
}

impl FoodClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http(base_url, http))
    }

    /// Use an already configured `reqwest` client (proxy, TLS or timeout settings).
    pub fn with_http(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn item_url(&self, title: &str) -> Result<String, RemoteError> {
        check_key_title(title)?;
        Ok(format!(
            "{}/tasks/{}",
            self.base_url,
            utf8_percent_encode(title, SEGMENT_ENCODE_SET)
        ))
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    /// Send a request and turn anything but a 2xx into an error.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, RemoteError> {
        log::debug!("{} {}", method, url);
        let mut req = self.http.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, url, e);
            RemoteError::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            log::warn!("{} {} rejected: {}", method, url, status);
            return Err(RemoteError::rejected(status));
        }

        Ok(resp)
    }
}

/// Refuse titles that cannot address a single item in a path.
///
/// A blank title leaves `/tasks/`, and `.`/`..` are dot segments that URL
/// normalization collapses onto the collection or the root.
pub fn check_key_title(title: &str) -> Result<(), RemoteError> {
    if title.trim().is_empty() {
        return Err(RemoteError::Validation(
            "Item name cannot be empty".to_string(),
        ));
    }
    if title == "." || title == ".." {
        return Err(RemoteError::Validation(format!(
            "\"{}\" cannot be used to address an item",
            title
        )));
    }
    Ok(())
}

/// Parse a `/tasks` listing: a JSON array of objects carrying a `title`.
pub fn parse_item_list(body: &str) -> Result<Vec<Item>, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::Decode(e.to_string()))
}

impl TaskRemote for FoodClient {
    async fn login(&self, username: &str, password: &str) -> Result<(), RemoteError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        self.send(Method::POST, &self.login_url(), Some(body)).await?;
        Ok(())
    }

    async fn list_items(&self) -> Result<Vec<Item>, RemoteError> {
        let resp = self.send(Method::GET, &self.collection_url(), None).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("Failed to read response: {}", e)))?;
        let items = parse_item_list(&text)?;
        log::info!("Fetched {} items", items.len());
        Ok(items)
    }

    async fn create_item(&self, title: &str) -> Result<(), RemoteError> {
        let body = serde_json::json!({ "title": title });
        self.send(Method::POST, &self.collection_url(), Some(body)).await?;
        Ok(())
    }

    async fn rename_item(&self, old_title: &str, new_title: &str) -> Result<(), RemoteError> {
        let body = serde_json::json!({ "title": new_title });
        let url = self.item_url(old_title)?;
        self.send(Method::PUT, &url, Some(body)).await?;
        Ok(())
    }

    async fn delete_item(&self, title: &str) -> Result<(), RemoteError> {
        let url = self.item_url(title)?;
        self.send(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), RemoteError> {
        self.send(Method::DELETE, &self.collection_url(), None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = FoodClient::new("http://192.168.0.2:3000/ ").unwrap();
        assert_eq!(client.base_url(), "http://192.168.0.2:3000");
        assert_eq!(client.collection_url(), "http://192.168.0.2:3000/tasks");
        assert_eq!(client.login_url(), "http://192.168.0.2:3000/login");
    }

    #[test]
    fn item_url_escapes_reserved_characters() {
        let client = FoodClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            client.item_url("Rice").unwrap(),
            "http://localhost:3000/tasks/Rice"
        );
        assert_eq!(
            client.item_url("Mac & cheese").unwrap(),
            "http://localhost:3000/tasks/Mac%20%26%20cheese"
        );
        assert_eq!(
            client.item_url("a/b?c#d").unwrap(),
            "http://localhost:3000/tasks/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            client.item_url("café").unwrap(),
            "http://localhost:3000/tasks/caf%C3%A9"
        );
        assert_eq!(
            client.item_url("pão-de_queijo.~").unwrap(),
            "http://localhost:3000/tasks/p%C3%A3o-de_queijo.~"
        );
    }

    #[test]
    fn item_url_refuses_blank_and_dot_titles() {
        let client = FoodClient::new("http://localhost:3000").unwrap();
        for title in ["", "   ", ".", ".."] {
            let err = client.item_url(title).unwrap_err();
            assert!(matches!(err, RemoteError::Validation(_)), "{:?}", title);
        }
        // Dots inside a longer title stay a normal segment.
        assert_eq!(
            client.item_url("...").unwrap(),
            "http://localhost:3000/tasks/..."
        );
        assert_eq!(
            client.item_url(". .").unwrap(),
            "http://localhost:3000/tasks/.%20."
        );
    }

    #[tokio::test]
    async fn delete_and_rename_refuse_unaddressable_titles_offline() {
        // Port 9 (discard) is never contacted: validation fails first.
        let client = FoodClient::new("http://127.0.0.1:9").unwrap();
        for title in ["", ".", ".."] {
            let err = client.delete_item(title).await.unwrap_err();
            assert!(matches!(err, RemoteError::Validation(_)));
            let err = client.rename_item(title, "Rice").await.unwrap_err();
            assert!(matches!(err, RemoteError::Validation(_)));
        }
    }

    #[test]
    fn parse_listing_keeps_server_order() {
        let items = parse_item_list(r#"[{"title":"Rice"},{"title":"Beans"}]"#).unwrap();
        assert_eq!(items, vec![Item::new("Rice"), Item::new("Beans")]);
    }

    #[test]
    fn parse_listing_rejects_non_array() {
        let err = parse_item_list(r#"{"title":"Rice"}"#).unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[test]
    fn rejected_carries_reason_phrase() {
        let err = RemoteError::rejected(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(
            err,
            RemoteError::Rejected {
                status: 404,
                reason: "Not Found".to_string()
            }
        );
        assert_eq!(err.to_string(), "Not Found (404)");
    }
}
