mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use beacon_api::context::audit::AuditStatus;
use beacon_api::model::{new_id, Post};

#[tokio::test]
async fn user_reads_their_own_preferences() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    let put = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time", "value": "true"}
        ]))
        .send()
        .await?;
    assert_eq!(put.status(), StatusCode::OK);

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["value"], "true");
    Ok(())
}

#[tokio::test]
async fn reading_another_users_preferences_requires_edit_other_users() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::bearer_token(&new_id(), &[]);

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences", new_id())))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["permission"], "edit_other_users");

    // the preference lookup itself never ran
    assert!(server.app.business_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn edit_other_users_grants_access_to_another_users_preferences() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::bearer_token(&new_id(), &["edit_other_users"]);

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences", new_id())))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn validation_reports_only_the_first_violated_check() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = common::bearer_token(&new_id(), &["edit_other_users"]);

    // user_id is malformed AND the category is oversized; only the
    // first-declared check may be reported
    let oversized = "x".repeat(80);
    let res = common::client()
        .get(server.url(&format!("/api/v1/users/not-an-id/preferences/{}", oversized)))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field"], "user_id");
    Ok(())
}

#[tokio::test]
async fn category_and_name_lookup_round_trips() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time", "value": "false"},
            {"category": "display_settings", "name": "colorize_usernames", "value": "true"},
            {"category": "notifications", "name": "email_interval", "value": "30"}
        ]))
        .send()
        .await?;

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences/display_settings", user_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let res = common::client()
        .get(server.url(&format!(
            "/api/v1/users/{}/preferences/notifications/name/email_interval",
            user_id
        )))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["value"], "30");
    Ok(())
}

#[tokio::test]
async fn unknown_preference_surfaces_the_facade_404() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    let res = common::client()
        .get(server.url(&format!(
            "/api/v1/users/{}/preferences/display_settings/name/missing",
            user_id
        )))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], "app.preference.get.not_found");
    Ok(())
}

#[tokio::test]
async fn update_preferences_succeeds_and_audits() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    let res = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time", "value": "true"}
        ]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "OK");

    let entries = server.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, "update_preferences");
    assert_eq!(entries[0].status, AuditStatus::Success);
    Ok(())
}

#[tokio::test]
async fn malformed_preference_body_is_400_with_a_fail_audit() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    let res = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{oops")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field"], "preferences");

    // the audit record was begun before the parse, so the attempt is logged
    let entries = server.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, AuditStatus::Fail);
    Ok(())
}

#[tokio::test]
async fn flagging_a_post_in_an_unreadable_channel_rejects_the_whole_batch() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let post_id = new_id();
    let channel_id = new_id();
    server.app.seed_post(Post {
        id: post_id.clone(),
        channel_id: channel_id.clone(),
        message: "classified".to_string(),
    });
    // the session holds the read_channel grant but is not a member of the
    // post's channel
    let token = common::bearer_token(&user_id, &["read_channel"]);

    let res = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time", "value": "true"},
            {"category": "flagged_post", "name": post_id, "value": "true"}
        ]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body["permission"], "read_channel");

    // no partial application: the otherwise-valid entry in the batch was
    // not persisted either
    let calls = server.app.business_calls();
    assert!(calls.contains(&"get_single_post"));
    assert!(!calls.contains(&"update_preferences"));

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert!(body.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn flagging_an_unknown_post_is_an_invalid_parameter() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &["read_channel"]);

    let res = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "flagged_post", "name": new_id(), "value": "true"}
        ]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field"], "preference.name");
    Ok(())
}

#[tokio::test]
async fn channel_members_can_flag_posts() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let post_id = new_id();
    let channel_id = new_id();
    server.app.seed_post(Post {
        id: post_id.clone(),
        channel_id: channel_id.clone(),
        message: "hello".to_string(),
    });
    server.app.add_channel_member(&channel_id, &user_id);
    let token = common::bearer_token(&user_id, &["read_channel"]);

    let res = common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "flagged_post", "name": post_id, "value": "true"}
        ]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences/flagged_post", user_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn delete_preferences_removes_the_batch() -> Result<()> {
    let server = common::spawn_server().await?;
    let user_id = new_id();
    let token = common::bearer_token(&user_id, &[]);

    common::client()
        .put(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time", "value": "true"},
            {"category": "notifications", "name": "email_interval", "value": "30"}
        ]))
        .send()
        .await?;

    let res = common::client()
        .post(server.url(&format!("/api/v1/users/{}/preferences/delete", user_id)))
        .bearer_auth(&token)
        .json(&json!([
            {"category": "display_settings", "name": "use_military_time"}
        ]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    let entries = server.audit.entries();
    let delete_entry = entries.iter().find(|e| e.operation == "delete_preferences").unwrap();
    assert_eq!(delete_entry.status, AuditStatus::Success);

    let res = common::client()
        .get(server.url(&format!("/api/v1/users/{}/preferences", user_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["category"], "notifications");
    Ok(())
}
