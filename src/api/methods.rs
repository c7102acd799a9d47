//! Named wrappers, one per catalogue entry.
//!
//! Each method is a thin delegation to [`Client::call`] with no extra
//! headers. Endpoints without meaningful input take no parameters; the rest
//! take a [`Params`] map that is filtered by the endpoint's allow-list.
use serde_json::Value;

use super::client::{Client, Headers, Response};
use super::endpoints::Params;
use super::error::Error;
use super::transport::Transport;

/// Client name reported to `accounts/ClientLogin` when none is given.
pub const DEFAULT_CLIENT_NAME: &str = "theoldreader-rs";

impl<T: Transport> Client<T> {
    async fn call_plain(&self, endpoint_id: &str) -> Result<Response, Error> {
        self.call(endpoint_id, &Params::new(), &Headers::new()).await
    }

    async fn call_with(&self, endpoint_id: &str, params: &Params) -> Result<Response, Error> {
        self.call(endpoint_id, params, &Headers::new()).await
    }

    /// Exchange credentials for an auth token and keep it on the client.
    ///
    /// The token is read from the `Auth` field of a JSON response, or from
    /// an `Auth=` line when the server answers in plain text.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        client_name: Option<&str>,
    ) -> Result<(), Error> {
        let params: Params = [
            ("client", client_name.unwrap_or(DEFAULT_CLIENT_NAME)),
            ("Email", email),
            ("Passwd", password),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let response = self.client_login(&params).await?;
        let token = extract_auth(&response).ok_or(Error::MissingAuthToken)?;
        self.set_token(token);
        tracing::info!("Logged in");
        Ok(())
    }

    pub async fn client_login(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("accounts/ClientLogin", params).await
    }

    pub async fn status(&self) -> Result<Response, Error> {
        self.call_plain("status").await
    }

    pub async fn api_token(&self) -> Result<Response, Error> {
        self.call_plain("token").await
    }

    pub async fn user_info(&self) -> Result<Response, Error> {
        self.call_plain("user-info").await
    }

    pub async fn preference_list(&self) -> Result<Response, Error> {
        self.call_plain("preference/list").await
    }

    pub async fn friend_list(&self) -> Result<Response, Error> {
        self.call_plain("friend/list").await
    }

    /// Accepts `action`, `u`.
    pub async fn friend_edit(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("friend/edit", params).await
    }

    /// Accepts `action`, `i`, `comment`.
    pub async fn comment_edit(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("comment/edit", params).await
    }

    pub async fn tag_list(&self) -> Result<Response, Error> {
        self.call_plain("tag/list").await
    }

    pub async fn preference_stream_list(&self) -> Result<Response, Error> {
        self.call_plain("preference/stream/list").await
    }

    pub async fn preference_stream_set(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("preference/stream/set", params).await
    }

    /// Accepts `s`, `dest`.
    pub async fn rename_tag(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("rename-tag", params).await
    }

    /// Accepts `s`.
    pub async fn disable_tag(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("disable-tag", params).await
    }

    pub async fn unread_count(&self) -> Result<Response, Error> {
        self.call_plain("unread-count").await
    }

    pub async fn subscription_list(&self) -> Result<Response, Error> {
        self.call_plain("subscription/list").await
    }

    /// Accepts `quickadd`.
    pub async fn subscription_quickadd(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("subscription/quickadd", params).await
    }

    /// Accepts `ac`, `s`, `t`, `a`, `r`.
    pub async fn subscription_edit(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("subscription/edit", params).await
    }

    /// Accepts `s`, `xt`, `n`, `r`, `c`, `nt`, `ot`.
    pub async fn stream_item_ids(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("stream/items/ids", params).await
    }

    /// Accepts `i`, `output`.
    pub async fn stream_item_contents(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("stream/items/contents", params).await
    }

    /// Accepts `s`, `xt`, `n`, `r`, `c`, `nt`, `ot`, `output`.
    pub async fn stream_contents(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("stream/contents", params).await
    }

    /// Accepts `s`, `ts`.
    pub async fn mark_all_as_read(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("mark-all-as-read", params).await
    }

    /// Accepts `i`, `a`, `r`, `annotation`.
    pub async fn edit_tag(&self, params: &Params) -> Result<Response, Error> {
        self.call_with("edit-tag", params).await
    }

    /// OPML export of all subscriptions.
    pub async fn export_subscriptions(&self) -> Result<Response, Error> {
        self.call_plain("/reader/subscriptions/export").await
    }

    pub async fn atom(&self) -> Result<Response, Error> {
        self.call_plain("/reader/atom").await
    }
}

fn extract_auth(response: &Response) -> Option<String> {
    let token = match response {
        Response::Json(value) => value.get("Auth").and_then(Value::as_str),
        Response::Text(text) => text
            .lines()
            .find_map(|line| line.trim().strip_prefix("Auth=")),
    };
    token.filter(|t| !t.is_empty()).map(str::to_string)
}
