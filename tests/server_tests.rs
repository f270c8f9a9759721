#![cfg(feature = "server")]

use ad_table_builder::llm::{AdCopyModel, AdGenerator, AdPrompt};
use ad_table_builder::server::router;
use ad_table_builder::{AdTableError, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "ad-table-builder-test-boundary";
const ADS_JSON: &str = r#"[{"ad_type_name":"RSA","headlines":["H1","H2"],"descriptions":["D1"]}]"#;

#[derive(Clone)]
struct CannedModel {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<AdPrompt>>>,
}

impl CannedModel {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn prompt_texts(&self) -> Vec<Vec<String>> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|prompt| prompt.user_parts().map(str::to_string).collect())
            .collect()
    }
}

impl AdCopyModel for CannedModel {
    async fn generate(&self, prompt: &AdPrompt) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.reply
            .clone()
            .ok_or_else(|| AdTableError::GenerationFailed("upstream returned 503".to_string()))
    }
}

fn app(model: CannedModel) -> axum::Router {
    router(AdGenerator::new(model).unwrap(), 1024 * 1024)
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachedFiles\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_request(fields: &[(&str, &str)], files: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, files)))
        .unwrap()
}

fn urlencoded_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn complete_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("selectedProduct", "Trail Shoes"),
        ("selectedPlatforms", "Google Ads"),
        ("selectedPlatforms", "Meta"),
        ("chatInput", "Spring launch, outdoorsy tone"),
    ]
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn error_body(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_preflight() {
    let response = app(CannedModel::replying(ADS_JSON))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "3600");
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn test_multipart_success_returns_csv_download() {
    let model = CannedModel::replying(&format!("```json\n{}\n```", ADS_JSON));
    let response = app(model.clone())
        .oneshot(multipart_request(
            &complete_fields(),
            &[("brief.md", "Audience: hikers"), ("logo.png", "PNG")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"generated_ads.csv\""
    );
    assert_eq!(
        body_text(response).await,
        "ad_number,ad_type_name,headlines,long_headlines,body_texts,descriptions\r\n\
         1,RSA,H1,,,D1\r\n\
         1,RSA,H2,,,\r\n"
    );

    let prompts = model.prompt_texts();
    assert_eq!(prompts.len(), 1);
    let parts = &prompts[0];
    assert_eq!(parts.len(), 2);
    assert!(parts[0].contains("generate on Google Ads, Meta ad"));
    assert!(parts[0].contains("for Trail Shoes based on the following prompt: Spring launch, outdoorsy tone"));
    assert_eq!(
        parts[1],
        "Additional context from attached file 'brief.md':\nAudience: hikers"
    );
}

#[tokio::test]
async fn test_urlencoded_success() {
    let response = app(CannedModel::replying(ADS_JSON))
        .oneshot(urlencoded_request(
            "selectedProduct=Bike&selectedPlatforms=LinkedIn&chatInput=B2B+fleet+offer",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.starts_with("ad_number,"));
}

#[tokio::test]
async fn test_missing_parameters() {
    let model = CannedModel::replying(ADS_JSON);
    let response = app(model.clone())
        .oneshot(multipart_request(
            &[("selectedProduct", "Bike"), ("selectedPlatforms", "Meta")],
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        error_body(response).await,
        serde_json::json!({ "error": "Missing required parameters" })
    );
    assert!(model.prompt_texts().is_empty());
}

#[tokio::test]
async fn test_body_without_form_content_type_is_missing_parameters() {
    let response = app(CannedModel::replying(ADS_JSON))
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"selectedProduct":"Bike"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversize_upload_is_payload_too_large() {
    let model = CannedModel::replying(ADS_JSON);
    let brief = "x".repeat(4 * 1024);
    let response = router(AdGenerator::new(model.clone()).unwrap(), 1024)
        .oneshot(multipart_request(&complete_fields(), &[("brief.md", &brief)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        error_body(response).await,
        serde_json::json!({ "error": "Request body is too large" })
    );
    assert!(model.prompt_texts().is_empty());
}

#[tokio::test]
async fn test_oversize_urlencoded_body_is_payload_too_large() {
    let body = format!(
        "selectedProduct=Bike&selectedPlatforms=Meta&chatInput={}",
        "y".repeat(4 * 1024)
    );
    let response = router(AdGenerator::new(CannedModel::replying(ADS_JSON)).unwrap(), 1024)
        .oneshot(urlencoded_request(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_model_failure_is_internal_error() {
    let response = app(CannedModel::failing())
        .oneshot(multipart_request(&complete_fields(), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        error_body(response).await,
        serde_json::json!({ "error": "An error occurred during ad generation" })
    );
}

#[tokio::test]
async fn test_malformed_model_output_is_bad_gateway() {
    let response = app(CannedModel::replying("Here are your ads: RSA, Display"))
        .oneshot(multipart_request(&complete_fields(), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        error_body(response).await,
        serde_json::json!({ "error": "The model returned malformed ad data" })
    );
}

#[tokio::test]
async fn test_empty_ad_list_is_header_only_download() {
    let response = app(CannedModel::replying("[]"))
        .oneshot(multipart_request(&complete_fields(), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "ad_number,ad_type_name,headlines,long_headlines,body_texts,descriptions\r\n"
    );
}

#[tokio::test]
async fn test_guide_is_prepended_to_prompt() {
    let guide_path = std::env::temp_dir().join(format!(
        "ad-table-builder-guide-{}.md",
        std::process::id()
    ));
    std::fs::write(&guide_path, "# Guide to ad formats\nRSA: up to 15 headlines").unwrap();

    let model = CannedModel::replying(ADS_JSON);
    let generator = AdGenerator::new(model.clone())
        .unwrap()
        .with_guide_path(&guide_path);
    let response = router(generator, 1024 * 1024)
        .oneshot(multipart_request(&complete_fields(), &[]))
        .await
        .unwrap();
    std::fs::remove_file(&guide_path).ok();

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = model.prompt_texts();
    assert_eq!(prompts[0][0], "# Guide to ad formats\nRSA: up to 15 headlines");
    assert!(prompts[0][1].contains("<SCHEMA>"));
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let response = app(CannedModel::replying(ADS_JSON))
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
