// Per-request context: the composition root every handler operates through.
//
// A context owns the typed request parameters, the single error slot, and
// access to the business facade and audit sink. Validation checks chain
// fluently and short-circuit as soon as the slot is latched; permission and
// license gates latch the slot the same way. Handlers re-read the slot
// after each stage and return early, so the first failure wins and nothing
// downstream of it runs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app::{AppError, AppService};
use crate::error::ApiError;
use crate::model::{is_valid_id, permissions, LicenseFeature, Permission, Session};
use crate::AppState;

pub mod audit;
pub mod params;

use self::audit::{AuditRecord, AuditSink};
use self::params::RequestParams;

const CATEGORY_MAX_LENGTH: usize = 64;
const PREFERENCE_NAME_MAX_LENGTH: usize = 64;

pub struct Context {
    pub app: Arc<dyn AppService>,
    pub session: Session,
    pub params: RequestParams,
    err: Option<ApiError>,
    audit_sink: Arc<dyn AuditSink>,
}

impl Context {
    pub fn new(state: &AppState, session: Session, params: RequestParams) -> Self {
        Self {
            app: state.app.clone(),
            session,
            params,
            err: None,
            audit_sink: state.audit.clone(),
        }
    }

    /// True once an error is latched; every later chain step and the
    /// handler body must treat this as terminal.
    pub fn failed(&self) -> bool {
        self.err.is_some()
    }

    pub fn err(&self) -> Option<&ApiError> {
        self.err.as_ref()
    }

    /// Latch an error. The slot is write-once: the first error wins and
    /// later attempts are dropped.
    pub fn set_err(&mut self, err: ApiError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    pub fn set_invalid_param(&mut self, field: &str) {
        self.set_err(ApiError::invalid_param(field));
    }

    pub fn set_permission_error(&mut self, permission: &Permission) {
        self.set_err(ApiError::permission_denied(permission.id));
    }

    /// Latch a facade error verbatim
    pub fn set_app_error(&mut self, err: AppError) {
        self.set_err(ApiError::from(err));
    }

    /// Encode the latched error. Handlers call this right after a failed
    /// stage; reaching it without a latched error is a handler bug.
    pub fn error_response(&self) -> Response {
        match &self.err {
            Some(err) => err.clone().into_response(),
            None => {
                tracing::error!("error_response called with an empty error slot");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    // Validation chain //

    pub fn require_user_id(&mut self) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        if !is_valid_id(&self.params.user_id) {
            self.set_invalid_param("user_id");
        }
        self
    }

    pub fn require_scheme_id(&mut self) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        if !is_valid_id(&self.params.scheme_id) {
            self.set_invalid_param("scheme_id");
        }
        self
    }

    pub fn require_category(&mut self) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        let category = &self.params.category;
        if category.is_empty() || category.len() > CATEGORY_MAX_LENGTH {
            self.set_invalid_param("category");
        }
        self
    }

    pub fn require_preference_name(&mut self) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        let name = &self.params.preference_name;
        if name.is_empty() || name.len() > PREFERENCE_NAME_MAX_LENGTH {
            self.set_invalid_param("preference_name");
        }
        self
    }

    /// Fold the raw query string into the parameter store; a structural
    /// coercion failure latches the slot.
    pub fn apply_query(&mut self, query: &HashMap<String, String>) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        if let Err(err) = self.params.apply_query(query) {
            self.set_err(err);
        }
        self
    }

    // Authorization gate //

    /// Ask the session oracle for a plain permission. On denial the slot is
    /// latched with the permission's id and the caller must bail out.
    pub async fn check_permission(&mut self, permission: &Permission) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.app.session_has_permission_to(&self.session, permission).await {
            return true;
        }
        self.set_permission_error(permission);
        false
    }

    /// Resource-scoped check: may this session act on the given user's
    /// data. Denial is reported as the edit_other_users permission.
    pub async fn check_permission_to_user(&mut self, user_id: &str) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.app.session_has_permission_to_user(&self.session, user_id).await {
            return true;
        }
        self.set_permission_error(&permissions::EDIT_OTHER_USERS);
        false
    }

    /// Resource-scoped check against a channel
    pub async fn check_permission_to_channel(
        &mut self,
        channel_id: &str,
        permission: &Permission,
    ) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self
            .app
            .session_has_permission_to_channel(&self.session, channel_id, permission)
            .await
        {
            return true;
        }
        self.set_permission_error(permission);
        false
    }

    /// License gate for premium operations. Runs before the permission
    /// check on gated handlers: an unlicensed deployment answers 501 no
    /// matter what the session could otherwise do, so license state never
    /// leaks permission state.
    pub fn require_license_feature(&mut self, feature: LicenseFeature) -> &mut Self {
        if self.err.is_some() {
            return self;
        }
        let enabled = self
            .app
            .license()
            .map(|license| license.feature_enabled(feature))
            .unwrap_or(false);
        if !enabled {
            self.set_err(ApiError::not_implemented(feature.id()));
        }
        self
    }

    // Audit //

    /// Begin the audit record for this request attempt. The returned guard
    /// emits to the sink when it goes out of scope, whichever exit path the
    /// handler takes.
    pub fn make_audit_record(&self, operation: &str) -> AuditRecord {
        AuditRecord::begin(operation, self.audit_sink.clone())
    }
}
