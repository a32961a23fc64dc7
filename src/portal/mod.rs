//! Admin portal
//!
//! A small HTML front end for staff. It holds no state of its own: every
//! action is forwarded to the API with the browser's session cookie, and the
//! API's session and role checks decide what goes through.

pub mod pages;
pub mod server;

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::Serialize;
use tracing::debug;

pub use server::build_portal_router;
pub use server::serve_portal;

use crate::errors::Result;
use crate::errors::TwiqError;
use crate::models::Post;

/// Mascot that portal-created posts are queued under
pub const DEFAULT_MASCOT_ID: &str = "1";

/// Thin client for the API endpoints the portal drives
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
}

impl PortalClient {
    /// # Errors
    /// - HTTP client creation errors
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the caller's cookie and fail on anything but 200
    async fn send(
        &self,
        request: RequestBuilder,
        path: &str,
        cookie: Option<&HeaderValue>,
    ) -> Result<Response> {
        let request = match cookie {
            Some(cookie) => request.header(COOKIE, cookie.clone()),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        debug!("API {} answered {}", path, status);
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TwiqError::Custom(format!(
                "API {path} returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn get(&self, path: &str, cookie: Option<&HeaderValue>) -> Result<Response> {
        self.send(self.http.get(self.url(path)), path, cookie).await
    }

    async fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        cookie: Option<&HeaderValue>,
        form: &T,
    ) -> Result<Response> {
        self.send(self.http.post(self.url(path)).form(form), path, cookie)
            .await
    }

    /// Log in and return the `Set-Cookie` values to relay to the browser
    ///
    /// # Errors
    /// - Network errors or a non-200 answer (bad credentials included)
    pub async fn login(
        &self,
        cookie: Option<&HeaderValue>,
        phone: &str,
        password: &str,
    ) -> Result<Vec<HeaderValue>> {
        let response = self
            .post_form(
                "/login",
                cookie,
                &[("Phone", phone), ("Password", password)],
            )
            .await?;
        Ok(set_cookies(&response))
    }

    /// # Errors
    /// - Network errors or a non-200 answer
    pub async fn logout(&self, cookie: Option<&HeaderValue>) -> Result<Vec<HeaderValue>> {
        let response = self.get("/logout", cookie).await?;
        Ok(set_cookies(&response))
    }

    /// # Errors
    /// - Network errors, a non-200 answer or an unreadable body
    pub async fn posts(&self, cookie: Option<&HeaderValue>) -> Result<Vec<Post>> {
        let response = self.get("/posts", cookie).await?;
        Ok(response.json().await?)
    }

    /// Create a post from form fields and return its id
    ///
    /// # Errors
    /// - Network errors, a non-200 answer or an unreadable body
    pub async fn create_post(
        &self,
        cookie: Option<&HeaderValue>,
        fields: &[(String, String)],
    ) -> Result<String> {
        let response = self.post_form("/post", cookie, fields).await?;
        Ok(response.json().await?)
    }

    /// # Errors
    /// - Network errors or a non-200 answer
    pub async fn link_post(
        &self,
        cookie: Option<&HeaderValue>,
        post_id: &str,
        mascot_id: &str,
    ) -> Result<()> {
        self.post_form(
            "/postlink",
            cookie,
            &[("PostId", post_id), ("MascotId", mascot_id)],
        )
        .await?;
        Ok(())
    }

    /// # Errors
    /// - Network errors or a non-200 answer
    pub async fn delete_post(&self, cookie: Option<&HeaderValue>, post_id: &str) -> Result<()> {
        self.post_form("/deletePost", cookie, &[("PostId", post_id)])
            .await?;
        Ok(())
    }
}

fn set_cookies(response: &Response) -> Vec<HeaderValue> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = PortalClient::new("http://localhost:9980/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9980");
        assert_eq!(client.url("/posts"), "http://localhost:9980/posts");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        let client = PortalClient::new("http://127.0.0.1:9").unwrap();
        let result = client.posts(None).await;
        assert!(matches!(result, Err(TwiqError::Reqwest(_))));
    }
}
