use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::config::PageConfig;
use trackshare_types::*;

/// API client for communicating with the Trackshare server
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: None,
        }
    }

    /// Create a client from the stored page configuration
    pub fn from_config(config: &PageConfig) -> Self {
        let mut client = Self::new(config.server_url.clone());
        client.set_session_token(config.session_token.clone());
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the session token for authenticated requests
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    /// Helper to add session token to request if available
    fn add_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.session_token {
            req.header("X-Session-Token", token)
        } else {
            req
        }
    }

    async fn get(&self, url: &str) -> ApiResult<reqwest::Response> {
        log::debug!(target: "api_calls", "GET {}", url);
        let req = self.add_auth_header(self.client.get(url));
        Ok(req.send().await?)
    }

    /// Map the status to an error or return the raw body text
    async fn read_body(&self, response: reqwest::Response) -> ApiResult<String> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.text().await?);
        }

        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        // Clean up HTML error messages (e.g., from nginx 404 pages)
        let clean_error = if error_text.contains("<html>") || error_text.contains("<!DOCTYPE") {
            format!("Server returned {} error. Please check the server URL.", status.as_u16())
        } else if let Ok(body) = serde_json::from_str::<ErrorResponse>(&error_text) {
            match body.details {
                Some(details) => format!("{} ({})", body.error, details),
                None => body.error,
            }
        } else {
            error_text
        };

        log::debug!(target: "api_calls", "request failed with {}: {}", status, clean_error);

        match status.as_u16() {
            404 => Err(ApiError::NotFound(clean_error)),
            401 => Err(ApiError::Unauthorized(clean_error)),
            400 => Err(ApiError::BadRequest(clean_error)),
            _ => Err(ApiError::Api(clean_error)),
        }
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let body = self.read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // User endpoints

    /// Look up the owner of a profile by username
    ///
    /// An empty body, a body without `userId`, or a 404 all mean there is no
    /// such user; only transport and server failures are errors.
    pub async fn get_user_id_by_username(&self, username: &str) -> ApiResult<OwnerLookup> {
        let url = format!(
            "{}/user/id/username/{}",
            self.base_url,
            urlencoding::encode(username)
        );
        let response = self.get(&url).await?;

        let body = match self.read_body(response).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(OwnerLookup::NotFound),
            Err(e) => return Err(e),
        };

        if body.trim().is_empty() {
            return Ok(OwnerLookup::NotFound);
        }

        let parsed: UserIdResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }

    /// Get the profile of a user
    pub async fn get_user(&self, user_id: UserId) -> ApiResult<ProfileInfo> {
        let url = format!("{}/user/{}", self.base_url, user_id);
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    // Post endpoints

    /// Get every post shared by a user, in the server's order
    pub async fn get_user_posts(&self, user_id: UserId) -> ApiResult<Vec<ContentItem>> {
        let url = format!("{}/post/user/{}", self.base_url, user_id);
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    /// Get a single post by ID
    pub async fn get_post(&self, post_id: PostId) -> ApiResult<ContentItem> {
        let url = format!("{}/post/{}", self.base_url, post_id);
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    /// Extend `current` with a newly shared post
    ///
    /// The post is appended unless `current` already holds it.
    pub async fn get_updated_posts(
        &self,
        new_post_id: PostId,
        current: Vec<ContentItem>,
    ) -> ApiResult<Vec<ContentItem>> {
        let mut posts = current;
        if posts.iter().any(|p| p.id == new_post_id) {
            return Ok(posts);
        }
        let post = self.get_post(new_post_id).await?;
        posts.push(post);
        Ok(posts)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        let base_url = std::env::var("TRACKSHARE_SERVER_URL")
            .unwrap_or_else(|_| crate::config::DEFAULT_SERVER_URL.to_string());
        Self::new(base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_lookup_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user/id/username/alice")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"userId":42}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let lookup = client.get_user_id_by_username("alice").await.unwrap();

        mock.assert_async().await;
        assert_eq!(lookup, OwnerLookup::Found(UserId(42)));
    }

    #[tokio::test]
    async fn test_lookup_missing_field_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user/id/username/alice")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let lookup = client.get_user_id_by_username("alice").await.unwrap();
        assert_eq!(lookup, OwnerLookup::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_empty_body_and_404_are_not_found() {
        let mut server = Server::new_async().await;
        let _empty = server
            .mock("GET", "/user/id/username/ghost")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/user/id/username/nobody")
            .with_status(404)
            .with_body("no such user")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        assert_eq!(
            client.get_user_id_by_username("ghost").await.unwrap(),
            OwnerLookup::NotFound
        );
        assert_eq!(
            client.get_user_id_by_username("nobody").await.unwrap(),
            OwnerLookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_lookup_encodes_username() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user/id/username/dj%20shadow")
            .with_status(200)
            .with_body(r#"{"userId":5}"#)
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/", server.url()));
        let lookup = client.get_user_id_by_username("dj shadow").await.unwrap();

        mock.assert_async().await;
        assert_eq!(lookup, OwnerLookup::Found(UserId(5)));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user/id/username/alice")
            .with_status(500)
            .with_body("<html><body>Internal Server Error</body></html>")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.get_user_id_by_username("alice").await.unwrap_err();

        match err {
            ApiError::Api(msg) => assert!(msg.contains("500"), "got: {}", msg),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_user_maps_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/user/9")
            .with_status(401)
            .with_body("session expired")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.get_user(UserId(9)).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_json_error_body_is_unwrapped() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/post/user/42")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid user id","details":"expected a number"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client.get_user_posts(UserId(42)).await.unwrap_err();
        match err {
            ApiError::BadRequest(message) => {
                assert_eq!(message, "invalid user id (expected a number)")
            }
            other => panic!("expected a bad request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_token_header_is_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/user/9")
            .match_header("X-Session-Token", "tok-123")
            .with_status(200)
            .with_body(r#"{"userId":9,"username":"bob"}"#)
            .create_async()
            .await;

        let mut client = ApiClient::new(server.url());
        client.set_session_token(Some("tok-123".to_string()));
        let profile = client.get_user(UserId(9)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(profile.username, "bob");
    }

    #[tokio::test]
    async fn test_get_user_posts() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/post/user/42")
            .with_status(200)
            .with_body(
                r#"[{"postId":1,"songName":"Teardrop","artist":"Massive Attack","tags":["trip-hop"]},
                    {"postId":2,"songName":"Roads","artist":"Portishead","tags":[]}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let posts = client.get_user_posts(UserId(42)).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, PostId(1));
        assert_eq!(posts[1].creator, "Portishead");
    }

    #[tokio::test]
    async fn test_updated_posts_appends_new_post() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/post/2")
            .with_status(200)
            .with_body(r#"{"postId":2,"songName":"Roads","artist":"Portishead"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let current = vec![ContentItem {
            id: PostId(1),
            title: "Teardrop".to_string(),
            creator: "Massive Attack".to_string(),
            tags: Default::default(),
        }];
        let updated = client.get_updated_posts(PostId(2), current).await.unwrap();

        mock.assert_async().await;
        let ids: Vec<PostId> = updated.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PostId(1), PostId(2)]);
    }

    #[tokio::test]
    async fn test_updated_posts_skips_fetch_when_already_held() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/post/1")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let current = vec![ContentItem {
            id: PostId(1),
            title: "Teardrop".to_string(),
            creator: "Massive Attack".to_string(),
            tags: Default::default(),
        }];
        let updated = client.get_updated_posts(PostId(1), current.clone()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updated, current);
    }
}
