use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::error::{ApiErrorBody, ClientError, ClientResult};
use crate::models::*;
use crate::session::{Credential, SessionStore};

/// The remote REST surface the pages depend on.
///
/// Every authenticated operation must fail with [`ClientError::Unauthorized`]
/// without touching the network when the session holds no credential.
#[async_trait]
pub trait LostFoundApi: Send + Sync {
    async fn get_profile(&self) -> ClientResult<Profile>;
    async fn get_item(&self, kind: ItemKind, id: &str) -> ClientResult<Item>;
    async fn create_item(&self, kind: ItemKind, payload: &NewItem) -> ClientResult<Item>;
    async fn get_matches(&self, item_id: &str, kind: ItemKind) -> ClientResult<Vec<MatchedItem>>;
    async fn get_user_email(&self, user_id: &str) -> ClientResult<String>;
    async fn generate_caption(&self, image_url: &str) -> ClientResult<String>;
    /// Returns the issued bearer token.
    async fn sign_in(&self, req: &SignInRequest) -> ClientResult<String>;
    async fn sign_up(&self, req: &SignUpRequest) -> ClientResult<String>;
}

/// reqwest-backed client. The session is injected at construction and read on every call.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: String,
    session: Arc<dyn SessionStore>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::from)?;
        Ok(Self { client, base: config.api_base_url.trim_end_matches('/').to_string(), session })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn credential(&self) -> ClientResult<Credential> {
        self.session.get().ok_or(ClientError::Unauthorized)
    }

    async fn send<T: DeserializeOwned>(&self, op: &'static str, req: RequestBuilder) -> ClientResult<T> {
        metrics::increment_counter!("lostfound_remote_calls_total", "op" => op);
        let resp = req.send().await.map_err(|e| {
            debug!(op, "no response: {e}");
            ClientError::from(e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            error!(op, status = status.as_u16(), "remote error: {message}");
            return Err(ClientError::Remote { status: status.as_u16(), message });
        }
        resp.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(e.to_string())
            } else {
                ClientError::InvalidResponse(e.to_string())
            }
        })
    }
}

#[async_trait]
impl LostFoundApi for HttpApi {
    async fn get_profile(&self) -> ClientResult<Profile> {
        let cred = self.credential()?;
        let req = self.client.get(self.url("/api/user/profile")).bearer_auth(cred.token());
        self.send("get_profile", req).await
    }

    async fn get_item(&self, kind: ItemKind, id: &str) -> ClientResult<Item> {
        let cred = self.credential()?;
        let path = format!("/api/{}/item/{}", kind.collection(), urlencoding::encode(id));
        let req = self.client.get(self.url(&path)).bearer_auth(cred.token());
        self.send("get_item", req).await
    }

    async fn create_item(&self, kind: ItemKind, payload: &NewItem) -> ClientResult<Item> {
        let cred = self.credential()?;
        let path = match kind {
            ItemKind::Lost => "/api/lost-item/file-complaint",
            ItemKind::Found => "/api/found-item/upload-item",
        };
        let req = self.client.post(self.url(path)).bearer_auth(cred.token()).json(payload);
        self.send("create_item", req).await
    }

    async fn get_matches(&self, item_id: &str, kind: ItemKind) -> ClientResult<Vec<MatchedItem>> {
        let cred = self.credential()?;
        let path = format!("/api/matched/{}?type={}", urlencoding::encode(item_id), kind);
        let req = self.client.get(self.url(&path)).bearer_auth(cred.token());
        self.send("get_matches", req).await
    }

    // The server accepts this lookup without a token; it is gated here like its siblings.
    async fn get_user_email(&self, user_id: &str) -> ClientResult<String> {
        let cred = self.credential()?;
        let path = format!("/api/user/user/{}", urlencoding::encode(user_id));
        let req = self.client.get(self.url(&path)).bearer_auth(cred.token());
        let user: UserInfo = self.send("get_user_email", req).await?;
        user.email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ClientError::InvalidResponse(format!("user {user_id} has no email")))
    }

    async fn generate_caption(&self, image_url: &str) -> ClientResult<String> {
        let cred = self.credential()?;
        let body = CaptionRequest { image_url: image_url.to_string() };
        let req = self
            .client
            .post(self.url("/api/lost-item/generate-caption"))
            .bearer_auth(cred.token())
            .json(&body);
        let resp: CaptionResponse = self.send("generate_caption", req).await?;
        Ok(resp.caption)
    }

    async fn sign_in(&self, req: &SignInRequest) -> ClientResult<String> {
        let rb = self.client.post(self.url("/api/user/login")).json(req);
        let resp: TokenResponse = self.send("sign_in", rb).await?;
        Ok(resp.token)
    }

    async fn sign_up(&self, req: &SignUpRequest) -> ClientResult<String> {
        let rb = self.client.post(self.url("/api/user/register")).json(req);
        let resp: TokenResponse = self.send("sign_up", rb).await?;
        Ok(resp.token)
    }
}
