// User preference endpoints.
//
// All of them are scoped to the user in the path: the session must either
// be that user or hold edit_other_users. Updates to the flagged_post
// category reference a post id, and the whole batch is rejected before
// anything is persisted if the session cannot read that post's channel.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Response,
};

use crate::context::{params::RequestParams, Context};
use crate::middleware::response::{json_response, status_ok};
use crate::model::{permissions, Preference, Session, PREFERENCE_CATEGORY_FLAGGED_POST};
use crate::AppState;

/// GET /api/v1/users/:user_id/preferences - all preferences for a user
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
) -> Response {
    let mut params = RequestParams::new();
    params.user_id = user_id;

    let mut c = Context::new(&state, session, params);
    c.require_user_id();
    if c.failed() {
        return c.error_response();
    }

    let user_id = c.params.user_id.clone();
    if !c.check_permission_to_user(&user_id).await {
        return c.error_response();
    }

    match c.app.get_preferences_for_user(&user_id).await {
        Ok(preferences) => json_response(StatusCode::OK, &preferences),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// GET /api/v1/users/:user_id/preferences/:category
pub async fn get_preferences_by_category(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((user_id, category)): Path<(String, String)>,
) -> Response {
    let mut params = RequestParams::new();
    params.user_id = user_id;
    params.category = category;

    let mut c = Context::new(&state, session, params);
    c.require_user_id().require_category();
    if c.failed() {
        return c.error_response();
    }

    let user_id = c.params.user_id.clone();
    if !c.check_permission_to_user(&user_id).await {
        return c.error_response();
    }

    match c.app.get_preferences_by_category(&user_id, &c.params.category).await {
        Ok(preferences) => json_response(StatusCode::OK, &preferences),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// GET /api/v1/users/:user_id/preferences/:category/name/:preference_name
pub async fn get_preference_by_category_and_name(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((user_id, category, preference_name)): Path<(String, String, String)>,
) -> Response {
    let mut params = RequestParams::new();
    params.user_id = user_id;
    params.category = category;
    params.preference_name = preference_name;

    let mut c = Context::new(&state, session, params);
    c.require_user_id().require_category().require_preference_name();
    if c.failed() {
        return c.error_response();
    }

    let user_id = c.params.user_id.clone();
    if !c.check_permission_to_user(&user_id).await {
        return c.error_response();
    }

    match c
        .app
        .get_preference_by_category_and_name(&user_id, &c.params.category, &c.params.preference_name)
        .await
    {
        Ok(preference) => json_response(StatusCode::OK, &preference),
        Err(err) => {
            c.set_app_error(err);
            c.error_response()
        }
    }
}

/// PUT /api/v1/users/:user_id/preferences - upsert a batch of preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Response {
    let mut params = RequestParams::new();
    params.user_id = user_id;

    let mut c = Context::new(&state, session, params);
    c.require_user_id();
    if c.failed() {
        return c.error_response();
    }

    let mut audit_rec = c.make_audit_record("update_preferences");

    let user_id = c.params.user_id.clone();
    if !c.check_permission_to_user(&user_id).await {
        return c.error_response();
    }

    let preferences: Vec<Preference> = match serde_json::from_slice(&body) {
        Ok(preferences) => preferences,
        Err(_) => {
            c.set_invalid_param("preferences");
            return c.error_response();
        }
    };

    // A flagged_post entry names a post id; the session must be able to
    // read that post's channel. Any violation rejects the whole batch -
    // nothing below has been persisted yet.
    for preference in &preferences {
        if preference.category == PREFERENCE_CATEGORY_FLAGGED_POST {
            let post = match c.app.get_single_post(&preference.name).await {
                Ok(post) => post,
                Err(_) => {
                    c.set_invalid_param("preference.name");
                    return c.error_response();
                }
            };

            if !c
                .check_permission_to_channel(&post.channel_id, &permissions::READ_CHANNEL)
                .await
            {
                return c.error_response();
            }
        }
    }

    if let Err(err) = c.app.update_preferences(&user_id, &preferences).await {
        c.set_app_error(err);
        return c.error_response();
    }

    audit_rec.success();
    status_ok()
}

/// POST /api/v1/users/:user_id/preferences/delete - remove a batch of preferences
pub async fn delete_preferences(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Response {
    let mut params = RequestParams::new();
    params.user_id = user_id;

    let mut c = Context::new(&state, session, params);
    c.require_user_id();
    if c.failed() {
        return c.error_response();
    }

    let mut audit_rec = c.make_audit_record("delete_preferences");

    let user_id = c.params.user_id.clone();
    if !c.check_permission_to_user(&user_id).await {
        return c.error_response();
    }

    let preferences: Vec<Preference> = match serde_json::from_slice(&body) {
        Ok(preferences) => preferences,
        Err(_) => {
            c.set_invalid_param("preferences");
            return c.error_response();
        }
    };

    if let Err(err) = c.app.delete_preferences(&user_id, &preferences).await {
        c.set_app_error(err);
        return c.error_response();
    }

    audit_rec.success();
    status_ok()
}
