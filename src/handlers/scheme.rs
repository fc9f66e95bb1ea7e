// Permission scheme endpoints.
//
// Create, patch, and delete are license-gated and audited. The license
// check runs before the permission check on those paths so an unlicensed
// server answers 501 regardless of what the session could do.

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use std::collections::HashMap;

use crate::context::{params::RequestParams, Context};
use crate::error::ApiError;
use crate::middleware::response::{json_response, status_ok};
use crate::model::{permissions, LicenseFeature, Scheme, SchemePatch, SchemeScope, Session};
use crate::AppState;

/// POST /api/v1/schemes - create a scheme
pub async fn create_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Bytes,
) -> Response {
    let mut c = Context::new(&state, session, RequestParams::new());

    let draft: Scheme = match serde_json::from_slice(&body) {
        Ok(draft) => draft,
        Err(_) => {
            c.set_invalid_param("scheme");
            return c.error_response();
        }
    };

    let mut audit_rec = c.make_audit_record("create_scheme");
    audit_rec.add_meta("scheme", &draft);

    c.require_license_feature(LicenseFeature::CustomPermissionSchemes);
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::MANAGE_PERMISSION_SCHEMES).await {
        return c.error_response();
    }

    let scheme = match c.app.create_scheme(draft).await {
        Ok(scheme) => scheme,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };

    audit_rec.success();
    audit_rec.add_meta("scheme", &scheme); // refreshed value; the earlier entry is kept

    json_response(StatusCode::CREATED, &scheme)
}

/// GET /api/v1/schemes/:scheme_id - fetch one scheme
pub async fn get_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(scheme_id): Path<String>,
) -> Response {
    let mut params = RequestParams::new();
    params.scheme_id = scheme_id;

    let mut c = Context::new(&state, session, params);
    c.require_scheme_id();
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::READ_PERMISSION_SCHEMES).await {
        return c.error_response();
    }

    match c.app.get_scheme(&c.params.scheme_id).await {
        Ok(scheme) => json_response(StatusCode::OK, &scheme),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// GET /api/v1/schemes - list schemes, optionally filtered by scope
pub async fn get_schemes(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut c = Context::new(&state, session, RequestParams::new());
    c.apply_query(&query);
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::READ_PERMISSION_SCHEMES).await {
        return c.error_response();
    }

    match c
        .app
        .get_schemes_page(c.params.scope, c.params.page, c.params.per_page)
        .await
    {
        Ok(schemes) => json_response(StatusCode::OK, &schemes),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// GET /api/v1/schemes/:scheme_id/teams - teams the scheme is attached to
pub async fn get_teams_for_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(scheme_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut params = RequestParams::new();
    params.scheme_id = scheme_id;

    let mut c = Context::new(&state, session, params);
    c.require_scheme_id().apply_query(&query);
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::READ_TEAMS).await {
        return c.error_response();
    }

    let scheme = match c.app.get_scheme(&c.params.scheme_id).await {
        Ok(scheme) => scheme,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };

    // scope is only known once the scheme is loaded
    if scheme.scope != SchemeScope::Team {
        c.set_err(ApiError::app(
            "api.scheme.teams.scope_mismatch",
            400,
            "scheme is not team-scoped",
        ));
        return c.error_response();
    }

    match c
        .app
        .get_teams_for_scheme_page(&scheme, c.params.page, c.params.per_page)
        .await
    {
        Ok(teams) => json_response(StatusCode::OK, &teams),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// GET /api/v1/schemes/:scheme_id/channels - channels the scheme is attached to
pub async fn get_channels_for_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(scheme_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut params = RequestParams::new();
    params.scheme_id = scheme_id;

    let mut c = Context::new(&state, session, params);
    c.require_scheme_id().apply_query(&query);
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::READ_CHANNELS).await {
        return c.error_response();
    }

    let scheme = match c.app.get_scheme(&c.params.scheme_id).await {
        Ok(scheme) => scheme,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };

    if scheme.scope != SchemeScope::Channel {
        c.set_err(ApiError::app(
            "api.scheme.channels.scope_mismatch",
            400,
            "scheme is not channel-scoped",
        ));
        return c.error_response();
    }

    match c
        .app
        .get_channels_for_scheme_page(&scheme, c.params.page, c.params.per_page)
        .await
    {
        Ok(channels) => json_response(StatusCode::OK, &channels),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// PUT /api/v1/schemes/:scheme_id/patch - partial update
pub async fn patch_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(scheme_id): Path<String>,
    body: Bytes,
) -> Response {
    let mut params = RequestParams::new();
    params.scheme_id = scheme_id;

    let mut c = Context::new(&state, session, params);
    c.require_scheme_id();
    if c.failed() {
        return c.error_response();
    }

    let patch: SchemePatch = match serde_json::from_slice(&body) {
        Ok(patch) => patch,
        Err(_) => {
            c.set_invalid_param("scheme");
            return c.error_response();
        }
    };

    let mut audit_rec = c.make_audit_record("patch_scheme");

    c.require_license_feature(LicenseFeature::CustomPermissionSchemes);
    if c.failed() {
        return c.error_response();
    }

    let scheme = match c.app.get_scheme(&c.params.scheme_id).await {
        Ok(scheme) => scheme,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };
    audit_rec.add_meta("scheme", &scheme);

    if !c.check_permission(&permissions::MANAGE_PERMISSION_SCHEMES).await {
        return c.error_response();
    }

    let patched = match c.app.patch_scheme(&scheme, &patch).await {
        Ok(patched) => patched,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };
    audit_rec.add_meta("patch", &patched);
    audit_rec.success();

    json_response(StatusCode::OK, &patched)
}

/// DELETE /api/v1/schemes/:scheme_id - delete a scheme
pub async fn delete_scheme(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(scheme_id): Path<String>,
) -> Response {
    let mut params = RequestParams::new();
    params.scheme_id = scheme_id;

    let mut c = Context::new(&state, session, params);
    c.require_scheme_id();
    if c.failed() {
        return c.error_response();
    }

    let mut audit_rec = c.make_audit_record("delete_scheme");

    c.require_license_feature(LicenseFeature::CustomPermissionSchemes);
    if c.failed() {
        return c.error_response();
    }

    if !c.check_permission(&permissions::MANAGE_PERMISSION_SCHEMES).await {
        return c.error_response();
    }

    let scheme = match c.app.delete_scheme(&c.params.scheme_id).await {
        Ok(scheme) => scheme,
        Err(err) => {
            c.set_app_error(err);
            return c.error_response();
        }
    };

    audit_rec.success();
    audit_rec.add_meta("scheme", &scheme);

    status_ok()
}
