//! HTTP client for the pantry service.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    ApiError, Credentials, Ingredient, LoginResponse, MealRequest, MealWindow, NewPantry,
    NewPantryItem, NewUser, Pantry, PantryItem, ProactiveMealDisplayData, RecipeSuggestions, User,
};
use crate::auth::BearerToken;
use crate::config::ClientConfig;

/// Build an HTTP client with the configured timeouts.
fn build_http_client(config: &ClientConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| ApiError::Client(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// The service reports failures as `{"detail": "..."}`; anything else falls
/// back to the operation's own message.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("detail")?.as_str().map(String::from))
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Which proactive snapshot to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    /// Everything currently suggested (`/proactiveMeals/`).
    Current,
    /// The latest suggestions after a change to one window.
    Latest(MealWindow),
}

/// Client for the pantry service REST API.
///
/// Each call issues exactly one request; failures are returned, never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<BearerToken>,
}

impl ApiClient {
    /// Create a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL does not parse, or
    /// `ApiError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Url::parse(&config.api_base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.api_base_url)))?;

        Ok(Self {
            http: build_http_client(config)?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the bearer token used for authenticated calls.
    #[must_use]
    pub fn with_token(mut self, token: BearerToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;
        Ok(request.bearer_auth(token.expose()))
    }

    async fn send(request: RequestBuilder, fallback: &str) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, fallback);
        tracing::debug!(status = status.as_u16(), message = %message, "Request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        Self::send(request, fallback)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the service's reason on bad credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        tracing::debug!(email = %credentials.email, "Logging in");
        let request = self.http.post(self.url("/user/login/")).json(credentials);
        Self::send_json(request, "Failed to log in").await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the service refuses the registration.
    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        tracing::debug!(email = %user.email, "Registering account");
        let request = self.http.post(self.url("/user/register/")).json(user);
        Self::send_json(request, "Failed to register").await
    }

    /// Resolve the identity behind the stored token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.authed(self.http.get(self.url("/user/me")))?;
        Self::send_json(request, "Failed to load current user").await
    }

    /// List the pantries of the session user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn list_pantries(&self) -> Result<Vec<Pantry>, ApiError> {
        let request = self.authed(self.http.get(self.url("/pantries")))?;
        Self::send_json(request, "Failed to fetch pantries").await
    }

    /// Create a pantry with the given nickname.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn create_pantry(&self, nickname: &str) -> Result<Pantry, ApiError> {
        let body = NewPantry {
            pantry_nickname: nickname.to_string(),
        };
        let request = self.authed(self.http.post(self.url("/pantry")).json(&body))?;
        Self::send_json(request, "Failed to add new pantry").await
    }

    /// List the items stocked in a pantry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn list_items(&self, pantry_id: i64) -> Result<Vec<PantryItem>, ApiError> {
        let request = self.authed(self.http.get(self.url(&format!("/{pantry_id}/items"))))?;
        Self::send_json(request, "Failed to fetch pantry items").await
    }

    /// Add an item to a pantry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn add_item(
        &self,
        pantry_id: i64,
        item: &NewPantryItem,
    ) -> Result<PantryItem, ApiError> {
        let request = self.authed(
            self.http
                .post(self.url(&format!("/pantry/{pantry_id}/item")))
                .json(item),
        )?;
        Self::send_json(request, "Failed to add item to pantry").await
    }

    /// Ask for recipe suggestions built around the selected items.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn suggest_meals(
        &self,
        request: &MealRequest,
    ) -> Result<RecipeSuggestions, ApiError> {
        let request = self.authed(
            self.http
                .post(self.url("/pantry/suggestMeal"))
                .json(request),
        )?;
        Self::send_json(request, "Failed to get recipe suggestions").await
    }

    /// Confirm a recipe; the body is its ingredient list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn confirm_meal(&self, ingredients: &[Ingredient]) -> Result<(), ApiError> {
        let request = self.authed(self.http.post(self.url("/selectedMeal")).json(ingredients))?;
        Self::send(request, "Meal submission failed").await?;
        Ok(())
    }

    /// Fetch every current proactive suggestion.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn proactive_meals(&self) -> Result<ProactiveMealDisplayData, ApiError> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;
        self.snapshot(token, SnapshotScope::Current).await
    }

    /// Fetch the latest proactive suggestions after a change to one window.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` without a token, or the request failure.
    pub async fn latest_proactive_meals(
        &self,
        window: MealWindow,
    ) -> Result<ProactiveMealDisplayData, ApiError> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;
        self.snapshot(token, SnapshotScope::Latest(window)).await
    }

    /// Fetch a proactive snapshot with an explicit token.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn snapshot(
        &self,
        token: &BearerToken,
        scope: SnapshotScope,
    ) -> Result<ProactiveMealDisplayData, ApiError> {
        let request = match scope {
            SnapshotScope::Current => self.http.get(self.url("/proactiveMeals/")),
            SnapshotScope::Latest(window) => self
                .http
                .get(self.url("/proactiveMeals/latest"))
                .query(&[("mealWindow", window.as_str())]),
        };
        Self::send_json(
            request.bearer_auth(token.expose()),
            "Failed to fetch proactive meals",
        )
        .await
    }
}
