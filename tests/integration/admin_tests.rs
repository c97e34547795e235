//! Administration surface tests
//!
//! User, FAQ and settings management, role enforcement and the audit
//! trail those operations leave behind.

use serde_json::json;

use crate::common::{TestApp, ADMIN_EMAIL};

const REDACTED: &str = "[OCULTO POR SEGURANÇA]";

#[tokio::test]
async fn test_admin_creates_and_lists_users() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let created = app
        .post_json_auth(
            "/api/v1/users",
            json!({
                "name": "Maria Silva",
                "email": "Maria.Silva@Prefeitura.GOV.BR",
                "password": "senha-muito-boa",
                "role": "USER"
            }),
            &token,
        )
        .await;
    created.assert_created();
    let user: serde_json::Value = created.json();
    // e-mail is normalized on the way in
    assert_eq!(user["email"], "maria.silva@prefeitura.gov.br");
    assert_eq!(user["active"], true);
    assert!(user.get("password_hash").is_none());

    let listing = app.get_auth("/api/v1/users", &token).await;
    listing.assert_ok();
    let users: Vec<serde_json::Value> = listing.json();
    assert_eq!(users.len(), 2);

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=CREATE_USER", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);
}

#[tokio::test]
async fn test_non_admin_cannot_manage_users() {
    let app = TestApp::new().await;
    let (_, user_token) = app.create_user_with_role("USER").await;

    app.get_auth("/api/v1/users", &user_token)
        .await
        .assert_forbidden();
    app.post_json_auth(
        "/api/v1/users",
        json!({"name": "X", "email": "x@teste.gov.br", "password": "senha-longa"}),
        &user_token,
    )
    .await
    .assert_forbidden();
    app.get_auth("/api/v1/audit-logs", &user_token)
        .await
        .assert_forbidden();
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let body = json!({
        "name": "Outra Conta",
        "email": ADMIN_EMAIL,
        "password": "senha-muito-boa"
    });
    let response = app.post_json_auth("/api/v1/users", body, &token).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_password_change_is_redacted_in_audit_trail() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (user, _) = app.create_user_with_role("USER").await;

    app.patch_json_auth(
        &format!("/api/v1/users/{}/password", user.id),
        json!({"password": "nova-senha-forte"}),
        &token,
    )
    .await
    .assert_no_content();

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=CHANGE_USER_PASSWORD", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);

    let entry = &logs_body["items"][0];
    let prior: String = serde_json::from_str(entry["prior_state"].as_str().unwrap()).unwrap();
    let new: String = serde_json::from_str(entry["new_state"].as_str().unwrap()).unwrap();
    assert_eq!(prior, REDACTED);
    assert_eq!(new, REDACTED);
    assert!(!entry.to_string().contains("nova-senha-forte"));
}

#[tokio::test]
async fn test_toggle_user_status_blocks_login() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (user, _) = app.create_user_with_role("USER").await;

    let toggled = app
        .patch_json_auth(
            &format!("/api/v1/users/{}/status", user.id),
            json!({}),
            &token,
        )
        .await;
    toggled.assert_ok();
    let body: serde_json::Value = toggled.json();
    assert_eq!(body["active"], false);

    app.post_json(
        "/api/v1/auth/login",
        json!({"email": user.email, "password": "senha-de-teste"}),
    )
    .await
    .assert_unauthorized();
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let me = app.get_auth("/api/v1/auth/me", &token).await;
    let body: serde_json::Value = me.json();
    let my_id = body["id"].as_str().unwrap();

    app.delete_auth(&format!("/api/v1/users/{}", my_id), &token)
        .await
        .assert_bad_request();
}

#[tokio::test]
async fn test_delete_user_leaves_prior_snapshot() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (user, _) = app.create_user_with_role("USER").await;

    app.delete_auth(&format!("/api/v1/users/{}", user.id), &token)
        .await
        .assert_no_content();

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=DELETE_USER", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);

    let entry = &logs_body["items"][0];
    let prior: serde_json::Value =
        serde_json::from_str(entry["prior_state"].as_str().unwrap()).unwrap();
    assert_eq!(prior["email"], user.email);
    assert!(entry["new_state"].is_null());
}

#[tokio::test]
async fn test_faq_update_and_delete_are_audited() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let created = app
        .post_json_auth(
            "/api/v1/faqs",
            json!({"question": "Pergunta original?", "answer": "Resposta.", "position": 1}),
            &token,
        )
        .await;
    created.assert_created();
    let faq: serde_json::Value = created.json();
    let id = faq["id"].as_i64().unwrap();

    let updated = app
        .put_json_auth(
            &format!("/api/v1/faqs/{}", id),
            json!({"question": "Pergunta revisada?", "answer": "Resposta.", "position": 1}),
            &token,
        )
        .await;
    updated.assert_ok();

    app.delete_auth(&format!("/api/v1/faqs/{}", id), &token)
        .await
        .assert_no_content();

    app.flush_audit().await;
    let logs = app.get_auth("/api/v1/audit-logs?entity=FAQ", &token).await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 3);

    let update_entry = logs_body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["action"] == "UPDATE_FAQ")
        .unwrap();
    let prior: serde_json::Value =
        serde_json::from_str(update_entry["prior_state"].as_str().unwrap()).unwrap();
    let new: serde_json::Value =
        serde_json::from_str(update_entry["new_state"].as_str().unwrap()).unwrap();
    assert_eq!(prior["question"], "Pergunta original?");
    assert_eq!(new["question"], "Pergunta revisada?");
}

#[tokio::test]
async fn test_faq_not_found() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.get_auth("/api/v1/faqs/9999", &token)
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_settings_update_is_audited_and_visible_on_portal() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let updated = app
        .put_json_auth(
            "/api/v1/settings",
            json!({
                "entity_name": "Prefeitura Municipal de Horizonte",
                "cnpj": "12.345.678/0001-95",
                "entity_email": "contato@horizonte.gov.br"
            }),
            &token,
        )
        .await;
    updated.assert_ok();

    let portal = app.get("/api/v1/portal/settings").await;
    let body: serde_json::Value = portal.json();
    assert_eq!(body["entity_name"], "Prefeitura Municipal de Horizonte");

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=UPDATE_SETTINGS", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);
    assert_eq!(logs_body["items"][0]["entity_type"], "SETTINGS");
}

#[tokio::test]
async fn test_non_admin_cannot_update_settings() {
    let app = TestApp::new().await;
    let (_, user_token) = app.create_user_with_role("USER").await;

    app.put_json_auth(
        "/api/v1/settings",
        json!({"entity_name": "Invasor"}),
        &user_token,
    )
    .await
    .assert_forbidden();
}

#[tokio::test]
async fn test_manual_revenue_crud_keeps_no_batch_id() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let request = json!({
        "fiscal_year": 2024,
        "month": 4,
        "posting_date": "2024-04-10",
        "economic_category": "Receitas Correntes",
        "origin": "Impostos",
        "funding_source": "Ordinarios",
        "collected": "123.45"
    });
    let created = app.post_json_auth("/api/v1/revenues", request, &token).await;
    created.assert_created();
    let revenue: serde_json::Value = created.json();
    assert!(revenue["batch_id"].is_null());
    let id = revenue["id"].as_i64().unwrap();

    let update = json!({
        "fiscal_year": 2024,
        "month": 4,
        "posting_date": "2024-04-10",
        "economic_category": "Receitas Correntes",
        "origin": "Impostos",
        "funding_source": "Ordinarios",
        "collected": "200.00",
        "note": "corrigido"
    });
    let updated = app
        .put_json_auth(&format!("/api/v1/revenues/{}", id), update, &token)
        .await;
    updated.assert_ok();
    let revenue: serde_json::Value = updated.json();
    assert_eq!(revenue["collected"], "200.00");
    assert_eq!(revenue["note"], "corrigido");

    app.delete_auth(&format!("/api/v1/revenues/{}", id), &token)
        .await
        .assert_no_content();
    app.get_auth(&format!("/api/v1/revenues/{}", id), &token)
        .await
        .assert_not_found();

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?entity=REVENUE", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 3);
}

#[tokio::test]
async fn test_settings_update_rejects_invalid_color_and_email() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.put_json_auth(
        "/api/v1/settings",
        json!({"primary_color": "azul"}),
        &token,
    )
    .await
    .assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    app.put_json_auth(
        "/api/v1/settings",
        json!({"entity_email": "sem-arroba"}),
        &token,
    )
    .await
    .assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    app.put_json_auth(
        "/api/v1/settings",
        json!({"primary_color": "#1a2b3c"}),
        &token,
    )
    .await
    .assert_ok();
}

#[tokio::test]
async fn test_admin_years_and_year_total() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    for (year, month, date, amount) in [
        (2024, 4, "2024-04-10", "100.00"),
        (2024, 5, "2024-05-10", "23.45"),
        (2023, 12, "2023-12-01", "50.00"),
    ] {
        app.post_json_auth(
            "/api/v1/revenues",
            json!({
                "fiscal_year": year,
                "month": month,
                "posting_date": date,
                "economic_category": "Receitas Correntes",
                "origin": "Impostos",
                "funding_source": "Ordinarios",
                "collected": amount
            }),
            &token,
        )
        .await
        .assert_created();
    }

    let years = app.get_auth("/api/v1/revenues/years", &token).await;
    years.assert_ok();
    let listed: Vec<i32> = years.json();
    assert_eq!(listed, vec![2024, 2023]);

    let total = app.get_auth("/api/v1/revenues/total?year=2024", &token).await;
    total.assert_ok();
    let body: serde_json::Value = total.json();
    assert_eq!(body["year"], 2024);
    assert_eq!(body["total_collected"], "123.45");

    // a year with no rows sums to zero instead of failing
    let empty = app.get_auth("/api/v1/revenues/total?year=1999", &token).await;
    empty.assert_ok();
    let body: serde_json::Value = empty.json();
    assert_eq!(body["total_collected"], "0");
}

#[tokio::test]
async fn test_revenue_validation_rejects_bad_month() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let request = json!({
        "fiscal_year": 2024,
        "month": 13,
        "posting_date": "2024-04-10",
        "economic_category": "Receitas Correntes",
        "origin": "Impostos",
        "funding_source": "Ordinarios",
        "collected": "1.00"
    });
    let response = app.post_json_auth("/api/v1/revenues", request, &token).await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_audit_log_filters_are_substring_matches() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.post_json_auth(
        "/api/v1/faqs",
        json!({"question": "P?", "answer": "R."}),
        &token,
    )
    .await
    .assert_created();
    app.flush_audit().await;

    let by_action = app.get_auth("/api/v1/audit-logs?action=create", &token).await;
    let body: serde_json::Value = by_action.json();
    assert_eq!(body["total"], 1);

    let by_user = app.get_auth("/api/v1/audit-logs?user=administrador", &token).await;
    let body: serde_json::Value = by_user.json();
    assert_eq!(body["total"], 1);

    let no_match = app.get_auth("/api/v1/audit-logs?action=nope", &token).await;
    let body: serde_json::Value = no_match.json();
    assert_eq!(body["total"], 0);
}
