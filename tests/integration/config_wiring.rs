//! Config file to running adapter: the path the host binary takes.

use std::sync::Arc;

use futures_util::StreamExt;
use screenwise::ai::AiTextService;
use screenwise::ai::gemini::{GeminiConfig, GeminiTextService};
use screenwise::config::ScreenwiseConfig;
use screenwise::credentials::{ConfigSecrets, CredentialManager, KeyringCredentialManager};
use screenwise::overlay::StoreOptions;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn plaintext_key_from_toml_reaches_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-goog-api-key", "from-config"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(
                    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ok\"}]}}]}\n\n",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[ai]\nbase_url = \"{}\"\napi_key = \"from-config\"\n\n[speech]\nlanguage = \"fr-FR\"\n\n[store]\nstart_expanded = false\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = ScreenwiseConfig::load_or_default(&path).unwrap();
    let options = StoreOptions::from(&config);
    assert_eq!(options.language, "fr-FR");
    assert!(!options.start_expanded);

    let manager: Arc<dyn CredentialManager> = Arc::new(KeyringCredentialManager::new());
    let secrets = ConfigSecrets::new(config.ai.api_key.clone(), manager).with_env_fallback(None);
    let service = GeminiTextService::new(GeminiConfig::from(&config.ai), Arc::new(secrets));

    let mut stream = service.submit("Summarize.", "text").await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "ok");
    assert!(stream.next().await.is_none());
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[ai]\ntemperature = 9.0\n").unwrap();
    let err = ScreenwiseConfig::load_or_default(&path).unwrap_err();
    assert!(err.to_string().contains("temperature"));
}
