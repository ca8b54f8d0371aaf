//! Typed HTTP interface to the `EatOff` REST backend.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    config::ClientConfig,
    models::{
        LoginRequest, LoginResponse, MenuItem, Restaurant, RestaurantFilters, VoucherPackage,
    },
};
use tracing::{debug, instrument};
use url::Url;

use crate::error::ApiError;

const USER_AGENT: &str = "eatoff-cli";

/// Remote operations the client core depends on.
///
/// One request per call; no batching or retries.
#[async_trait]
pub trait RemoteApi: Send + Sync + std::fmt::Debug {
    /// `POST auth/login`.
    ///
    /// # Errors
    /// [`ApiError::Status`] for non-2xx answers, [`ApiError::Transport`] when
    /// no answer arrived, [`ApiError::Decode`] for an unexpected body.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST auth/logout`.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET restaurants` with optional filters.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn list_restaurants(
        &self,
        filters: &RestaurantFilters,
    ) -> Result<Vec<Restaurant>, ApiError>;

    /// `GET restaurants?limit=1`; returns the number of entries received.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn test_connection(&self) -> Result<usize, ApiError>;

    /// `GET restaurants/{id}`.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn get_restaurant(&self, id: i64) -> Result<Restaurant, ApiError>;

    /// `GET restaurants/{id}/menu`.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn restaurant_menu(&self, id: i64) -> Result<Vec<MenuItem>, ApiError>;

    /// `GET restaurants/{id}/packages`; platform vouchers come first.
    ///
    /// # Errors
    /// See [`RemoteApi::login`].
    async fn restaurant_packages(&self, id: i64) -> Result<Vec<VoucherPackage>, ApiError>;

    /// Bearer token attached to later requests.
    fn set_auth_token(&self, token: Option<String>);
}

/// `reqwest`-backed [`RemoteApi`].
#[derive(Clone, Debug)]
pub struct EatOffClient {
    base_url: Url,
    client: Client,
    auth_token: Arc<Mutex<Option<String>>>,
}

impl EatOffClient {
    /// Build a client for `base_url` with the given timeouts.
    ///
    /// # Errors
    /// [`ApiError::InvalidUrl`] when the base URL does not parse.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url: Url::parse(&normalized)?,
            client,
            auth_token: Arc::new(Mutex::new(None)),
        })
    }

    /// Build a client from resolved configuration.
    ///
    /// # Errors
    /// See [`EatOffClient::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Base URL every endpoint is joined onto, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Bearer token currently attached to requests.
    #[must_use]
    pub fn current_auth_token(&self) -> Option<String> {
        self.auth_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.current_auth_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "response received");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl RemoteApi for EatOffClient {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        self.send_json(self.client.post(url).json(request)).await
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("auth/logout")?;
        let request = self.authorize(self.client.post(url));
        self.set_auth_token(None);
        self.send(request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn list_restaurants(
        &self,
        filters: &RestaurantFilters,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let url = self.endpoint("restaurants")?;
        let mut request = self.client.get(url);
        if !filters.is_empty() {
            request = request.query(filters);
        }
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> Result<usize, ApiError> {
        let url = self.endpoint("restaurants")?;
        let restaurants: Vec<Restaurant> = self
            .send_json(self.client.get(url).query(&[("limit", 1)]))
            .await?;
        Ok(restaurants.len())
    }

    #[instrument(skip(self))]
    async fn get_restaurant(&self, id: i64) -> Result<Restaurant, ApiError> {
        let url = self.endpoint(&format!("restaurants/{id}"))?;
        self.send_json(self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn restaurant_menu(&self, id: i64) -> Result<Vec<MenuItem>, ApiError> {
        let url = self.endpoint(&format!("restaurants/{id}/menu"))?;
        self.send_json(self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn restaurant_packages(&self, id: i64) -> Result<Vec<VoucherPackage>, ApiError> {
        let url = self.endpoint(&format!("restaurants/{id}/packages"))?;
        self.send_json(self.client.get(url)).await
    }

    fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> EatOffClient {
        EatOffClient::new(base, Duration::from_secs(1), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = client("http://localhost:5000/api");
        assert_eq!(api.base_url().as_str(), "http://localhost:5000/api/");
        assert_eq!(
            api.endpoint("/restaurants/7/menu").unwrap().as_str(),
            "http://localhost:5000/api/restaurants/7/menu"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = EatOffClient::new("not a url", Duration::from_secs(1), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_token_is_shared_between_clones() {
        let api = client("http://localhost:5000/api/");
        let clone = api.clone();
        api.set_auth_token(Some("tok".into()));
        assert_eq!(clone.current_auth_token().as_deref(), Some("tok"));
    }
}
