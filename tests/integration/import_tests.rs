//! Revenue and expense import pipeline tests
//!
//! Covers the all-or-nothing revenue import, batch rollback with its
//! fail-closed audit snapshot, and the lenient Latin-1 expense import.

use crate::common::{
    fixtures, TestApp,
};

async fn import_valid_file(app: &TestApp, token: &str) -> String {
    let response = app
        .post_file_auth(
            "/api/v1/revenues/import",
            "receitas.csv",
            fixtures::valid_revenue_csv().as_bytes(),
            token,
        )
        .await;
    response.assert_created();

    let body: serde_json::Value = response.json();
    assert_eq!(body["imported"], 5);
    let batch_id = body["batch_id"].as_str().unwrap().to_string();
    assert!(batch_id.starts_with("LOTE-"));
    batch_id
}

#[tokio::test]
async fn test_import_requires_authentication() {
    let app = TestApp::new().await;

    app.post_file(
        "/api/v1/revenues/import",
        "receitas.csv",
        fixtures::valid_revenue_csv().as_bytes(),
    )
    .await
    .assert_unauthorized();
}

#[tokio::test]
async fn test_import_persists_all_rows_under_one_batch() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let batch_id = import_valid_file(&app, &token).await;

    let listing = app.get_auth("/api/v1/revenues", &token).await;
    listing.assert_ok();
    let body: serde_json::Value = listing.json();
    assert_eq!(body["total"], 5);
    for item in body["items"].as_array().unwrap() {
        assert_eq!(item["batch_id"].as_str(), Some(batch_id.as_str()));
    }

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=IMPORT_BATCH_CSV", &token)
        .await;
    logs.assert_ok();
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);
    let entry = &logs_body["items"][0];
    assert_eq!(entry["entity_type"], "REVENUE");
    assert_eq!(entry["entity_id"].as_str(), Some(batch_id.as_str()));
}

#[tokio::test]
async fn test_import_parses_brazilian_formats() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    import_valid_file(&app, &token).await;

    let listing = app
        .get_auth("/api/v1/revenues?year=2024&origin=transferencias", &token)
        .await;
    listing.assert_ok();
    let body: serde_json::Value = listing.json();
    assert_eq!(body["total"], 1);
    let item = &body["items"][0];
    assert_eq!(item["collected"], "10000.00");
    assert_eq!(item["posting_date"], "2024-02-28");
    assert!(item["initial_forecast"].is_null());
}

#[tokio::test]
async fn test_short_row_aborts_whole_import() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .post_file_auth(
            "/api/v1/revenues/import",
            "receitas.csv",
            fixtures::short_row_revenue_csv().as_bytes(),
            token.as_str(),
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("row 3"));

    // nothing persisted, nothing audited
    let listing = app.get_auth("/api/v1/revenues", &token).await;
    let body: serde_json::Value = listing.json();
    assert_eq!(body["total"], 0);

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=IMPORT_BATCH_CSV", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 0);
}

#[tokio::test]
async fn test_import_rejects_file_without_data_rows() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.post_file_auth(
        "/api/v1/revenues/import",
        "receitas.csv",
        fixtures::empty_revenue_csv().as_bytes(),
        &token,
    )
    .await
    .assert_bad_request();
}

#[tokio::test]
async fn test_import_rejects_non_utf8_revenue_file() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .post_file_auth(
            "/api/v1/revenues/import",
            "receitas.csv",
            &fixtures::latin1_expense_csv(),
            &token,
        )
        .await;
    response.assert_bad_request();
    assert!(response.text().contains("UTF-8"));
}

#[tokio::test]
async fn test_rollback_removes_batch_and_snapshots_it_first() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let batch_id = import_valid_file(&app, &token).await;

    let rollback = app
        .delete_auth(&format!("/api/v1/revenues/batches/{}", batch_id), &token)
        .await;
    rollback.assert_ok();
    let outcome: serde_json::Value = rollback.json();
    assert_eq!(outcome["removed"], 5);
    assert_eq!(outcome["batch_id"].as_str(), Some(batch_id.as_str()));

    let listing = app.get_auth("/api/v1/revenues", &token).await;
    let body: serde_json::Value = listing.json();
    assert_eq!(body["total"], 0);

    // the audit entry carries the full record list that was removed
    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=DELETE_BATCH_REVENUE", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 1);

    let entry = &logs_body["items"][0];
    assert_eq!(entry["entity_id"].as_str(), Some(batch_id.as_str()));
    let prior: serde_json::Value =
        serde_json::from_str(entry["prior_state"].as_str().unwrap()).unwrap();
    assert_eq!(prior.as_array().unwrap().len(), 5);
    assert_eq!(prior[0]["batch_id"].as_str(), Some(batch_id.as_str()));
}

#[tokio::test]
async fn test_rollback_unknown_batch_is_not_found_and_not_audited() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.delete_auth("/api/v1/revenues/batches/LOTE-999999999", &token)
        .await
        .assert_not_found();

    app.flush_audit().await;
    let logs = app
        .get_auth("/api/v1/audit-logs?action=DELETE_BATCH_REVENUE", &token)
        .await;
    let logs_body: serde_json::Value = logs.json();
    assert_eq!(logs_body["total"], 0);
}

#[tokio::test]
async fn test_rollback_is_idempotent_failure_on_second_call() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let batch_id = import_valid_file(&app, &token).await;
    let uri = format!("/api/v1/revenues/batches/{}", batch_id);

    app.delete_auth(&uri, &token).await.assert_ok();
    app.delete_auth(&uri, &token).await.assert_not_found();
}

#[tokio::test]
async fn test_expense_import_decodes_latin1_and_skips_short_rows() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .post_file_auth(
            "/api/v1/expenses/import",
            "despesas.csv",
            &fixtures::latin1_expense_csv(),
            &token,
        )
        .await;
    response.assert_created();
    let outcome: serde_json::Value = response.json();
    assert_eq!(outcome["imported"], 2);
    assert_eq!(outcome["skipped"], 1);

    // accented names survive the transcoding; creditor documents are
    // normalized to digits and classified by length
    let listing = app.get("/api/v1/expenses?year=2024").await;
    listing.assert_ok();
    let body: serde_json::Value = listing.json();
    assert_eq!(body["total"], 2);

    let items = body["items"].as_array().unwrap();
    let company = items
        .iter()
        .find(|i| i["commitment_number"] == "EMP-0042")
        .unwrap();
    assert_eq!(company["creditor_name"], "Construção e Pavimentação Ltda");
    assert_eq!(company["creditor_document"], "12345678000195");

    let person = items
        .iter()
        .find(|i| i["commitment_number"] == "EMP-0043")
        .unwrap();
    assert_eq!(person["creditor_name"], "José da Silva");
    assert_eq!(person["creditor_document"], "12345678909");
}

#[tokio::test]
async fn test_failed_expense_import_persists_no_creditors() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    // valid first row, unparseable date on the second: the import aborts
    // and the first row's creditor must not linger
    let response = app
        .post_file_auth(
            "/api/v1/expenses/import",
            "despesas.csv",
            &fixtures::latin1_expense_csv_with_bad_date(),
            &token,
        )
        .await;
    response.assert_bad_request();

    let creditors: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM creditors")
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(creditors.0, 0);

    let expenses: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(expenses.0, 0);
}

#[tokio::test]
async fn test_expense_import_reuses_existing_creditor() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    app.post_file_auth(
        "/api/v1/expenses/import",
        "despesas.csv",
        &fixtures::latin1_expense_csv(),
        &token,
    )
    .await
    .assert_created();

    // importing the same file again must not duplicate creditors
    app.post_file_auth(
        "/api/v1/expenses/import",
        "despesas.csv",
        &fixtures::latin1_expense_csv(),
        &token,
    )
    .await
    .assert_created();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM creditors")
        .fetch_one(&app.state.db)
        .await
        .unwrap();
    assert_eq!(count.0, 2);
}
