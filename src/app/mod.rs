// Business-logic facade.
//
// The API layer consumes persistence and domain rules through this trait
// and nothing else: handlers call it only after validation and
// authorization have passed, and surface its errors verbatim. Test doubles
// implement the same trait instead of stubbing a concrete type.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{
    Channel, License, Permission, Post, Preference, Scheme, SchemePatch, SchemeScope, Session, Team,
};

pub mod memory;

/// Opaque application error: an id, a client-safe message, and the HTTP
/// status the API layer should answer with. Passed through unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct AppError {
    pub id: String,
    pub message: String,
    pub status_code: u16,
}

impl AppError {
    pub fn new(id: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            status_code,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.id, self.status_code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App {
            id: err.id,
            message: err.message,
            status: err.status_code,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[async_trait]
pub trait AppService: Send + Sync {
    // Schemes
    async fn create_scheme(&self, draft: Scheme) -> AppResult<Scheme>;
    async fn get_scheme(&self, scheme_id: &str) -> AppResult<Scheme>;
    async fn get_schemes_page(
        &self,
        scope: Option<SchemeScope>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Scheme>>;
    async fn patch_scheme(&self, scheme: &Scheme, patch: &SchemePatch) -> AppResult<Scheme>;
    async fn delete_scheme(&self, scheme_id: &str) -> AppResult<Scheme>;
    async fn get_teams_for_scheme_page(
        &self,
        scheme: &Scheme,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Team>>;
    async fn get_channels_for_scheme_page(
        &self,
        scheme: &Scheme,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<Channel>>;

    // Preferences
    async fn get_preferences_for_user(&self, user_id: &str) -> AppResult<Vec<Preference>>;
    async fn get_preferences_by_category(
        &self,
        user_id: &str,
        category: &str,
    ) -> AppResult<Vec<Preference>>;
    async fn get_preference_by_category_and_name(
        &self,
        user_id: &str,
        category: &str,
        name: &str,
    ) -> AppResult<Preference>;
    async fn update_preferences(&self, user_id: &str, preferences: &[Preference]) -> AppResult<()>;
    async fn delete_preferences(&self, user_id: &str, preferences: &[Preference]) -> AppResult<()>;

    // Posts
    async fn get_single_post(&self, post_id: &str) -> AppResult<Post>;

    // Session / permission oracle
    async fn session_has_permission_to(&self, session: &Session, permission: &Permission) -> bool;
    async fn session_has_permission_to_user(&self, session: &Session, user_id: &str) -> bool;
    async fn session_has_permission_to_channel(
        &self,
        session: &Session,
        channel_id: &str,
        permission: &Permission,
    ) -> bool;

    // License oracle
    fn license(&self) -> Option<License>;
}
