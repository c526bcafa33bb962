use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::sheets_env;
use crate::helpers::spawn_app;
use crate::helpers::TestApp;
use crate::helpers::APPEND_PATH;
use crate::helpers::LOOPS_API_KEY;

async fn spawn_dual_write(loops_key: Option<&str>) -> TestApp {
    let mut vars = sheets_env();
    vars.push(("NEWSLETTER_DUAL_WRITE", "true".into()));
    if let Some(key) = loops_key {
        vars.push(("LOOPS_API_KEY", key.into()));
    }
    let app = spawn_app(&vars).await;
    app.mount_token().await;
    app
}

async fn mount_append(
    app: &TestApp,
    status: u16,
) {
    Mock::given(path(APPEND_PATH))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "updates": { "updatedRows": 1 }
        })))
        .expect(1)
        .mount(&app.google_server)
        .await;
}

fn loops_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true }))
}

#[tokio::test]
async fn writes_to_both_providers() {
    let app = spawn_dual_write(Some(LOOPS_API_KEY)).await;
    mount_append(&app, 200).await;
    Mock::given(path("/contacts/update"))
        .and(method("PUT"))
        .respond_with(loops_ok())
        .expect(1)
        .mount(&app.loops_server)
        .await;

    let resp = app
        .post_subscriptions("email=user%40example.com&source=Hero".into())
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let contact: serde_json::Value = serde_json::from_slice(
        &app.loops_server.received_requests().await.unwrap()[0].body,
    )
    .unwrap();
    assert_eq!(
        contact,
        serde_json::json!({
            "email": "user@example.com",
            "subscribed": true,
            "source": "Hero"
        })
    );
}

#[tokio::test]
async fn no_loops_key_means_sheets_only() {
    for key in [None, Some("")] {
        let app = spawn_dual_write(key).await;
        mount_append(&app, 200).await;

        let resp = app
            .post_subscriptions("email=user%40example.com&source=CTA".into())
            .await;

        assert_eq!(resp.status().as_u16(), 200, "{key:?}");
        assert!(app.loops_server.received_requests().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn loops_failure_is_ignored() {
    let app = spawn_dual_write(Some(LOOPS_API_KEY)).await;
    mount_append(&app, 200).await;
    Mock::given(path("/contacts/update"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&app.loops_server)
        .await;

    let resp = app
        .post_subscriptions("email=user%40example.com&source=Hero".into())
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let result: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(result["success"], true);
}

#[tokio::test]
async fn sheets_failure_is_reported_after_mirroring() {
    let app = spawn_dual_write(Some(LOOPS_API_KEY)).await;
    Mock::given(path(APPEND_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_string("Requested entity was not found. NOT_FOUND"),
        )
        .mount(&app.google_server)
        .await;
    Mock::given(path("/contacts/update"))
        .respond_with(loops_ok())
        .expect(1)
        .mount(&app.loops_server)
        .await;

    let resp = app
        .post_subscriptions("email=user%40example.com&source=Hero".into())
        .await;

    assert_eq!(resp.status().as_u16(), 503);
    let result: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        result["error"],
        "El servicio de suscripción no está configurado correctamente"
    );
}
