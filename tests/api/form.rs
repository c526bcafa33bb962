use chemango_newsletter::domain::NewsletterSource;
use chemango_newsletter::form::FormController;
use chemango_newsletter::form::HttpSubscribeClient;
use chemango_newsletter::form::SuccessDialog;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::sheets_env;
use crate::helpers::spawn_app;
use crate::helpers::APPEND_PATH;

#[tokio::test]
async fn form_subscribes_and_opens_dialog() {
    let app = spawn_app(&sheets_env()).await;
    app.mount_token().await;
    Mock::given(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updates": { "updatedRows": 1 }
        })))
        .expect(1)
        .mount(&app.google_server)
        .await;

    let client = HttpSubscribeClient::new(reqwest::Client::new(), app.addr.clone());
    let mut form = FormController::new(NewsletterSource::Cta);
    form.edit("user@example.com");
    form.submit(&client).await;

    assert_eq!(form.success_message(), Some("¡Listo! Te mantendremos actualizado"));
    assert_eq!(form.email(), "");

    let mut dialog = SuccessDialog::default();
    dialog.sync(form.dialog_open());
    assert!(dialog.scroll_locked());
    assert_eq!(dialog.countdown_secs(), 8);
    assert_eq!(app.appended_rows().await[0]["values"][0][2], "CTA");
}

#[tokio::test]
async fn form_shows_server_error() {
    // no provider env at all
    let app = spawn_app(&[]).await;

    let client = HttpSubscribeClient::new(reqwest::Client::new(), app.addr.clone());
    let mut form = FormController::new(NewsletterSource::Hero);
    form.edit("user@example.com");
    form.submit(&client).await;

    assert_eq!(
        form.error(),
        Some("El servicio de suscripción no está configurado correctamente")
    );
    assert_eq!(form.email(), "user@example.com");
    assert!(!form.dialog_open());
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    // nothing listens on the discard port
    let client = HttpSubscribeClient::new(reqwest::Client::new(), "http://127.0.0.1:9".into());
    let mut form = FormController::new(NewsletterSource::Hero);
    form.edit("user@example.com");
    form.submit(&client).await;

    assert_eq!(
        form.error(),
        Some("Error de conexión. Por favor verifica tu internet e intenta nuevamente.")
    );
}
