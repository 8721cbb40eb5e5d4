//! Identity document extraction: national ID card (CCCD) or passport photo → six fields.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use idcapture_core::{DocumentExtractor, ExtractedData, IdCaptureError, ImagePayload};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::vision::GeminiClient;

/// Instruction sent alongside the image.
pub const EXTRACTION_PROMPT: &str = "\
Analyze this image of an identity document (Vietnamese citizen identity card or passport).
Extract the following information and return it as JSON matching the provided schema.
- Full name: capitalize the first letter of each word.
- Date of birth: format DD/MM/YYYY.
- ID card number: exactly 12 digits, including leading zeros. May be empty for a passport.
- ID card place of issue: as written. May be empty for a passport.
- Passport number: if present.
- Passport expiry date: if present, format DD/MM/YYYY.
If a piece of information is not found, return an empty string for that field.";

/// Response schema: six required string fields.
pub static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullName": {
                "type": "STRING",
                "description": "Full name of the document holder, first letter of each word capitalized."
            },
            "dob": {
                "type": "STRING",
                "description": "Date of birth, format DD/MM/YYYY."
            },
            "idNumber": {
                "type": "STRING",
                "description": "Citizen identity card number (12 digits), including any leading zeros."
            },
            "issuePlace": {
                "type": "STRING",
                "description": "Place of issue of the citizen identity card."
            },
            "passportNumber": {
                "type": "STRING",
                "description": "Passport number. Empty string if not present."
            },
            "passportExpiry": {
                "type": "STRING",
                "description": "Passport expiry date, format DD/MM/YYYY. Empty string if not present."
            }
        },
        "required": ExtractedData::FIELD_NAMES,
    })
});

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").unwrap());

/// Parse the model's JSON text. Missing, null or non-string fields become `""`.
pub fn parse_extraction(text: &str) -> Result<ExtractedData> {
    let text = text.trim();
    let body = FENCED_JSON_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let value: Value = serde_json::from_str(body).context("Extraction output is not valid JSON")?;
    let Value::Object(map) = value else {
        bail!("Extraction output is not a JSON object");
    };

    let field = |name: &str| -> String {
        match map.get(name) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    };

    Ok(ExtractedData {
        full_name: field("fullName"),
        dob: field("dob"),
        id_number: field("idNumber"),
        issue_place: field("issuePlace"),
        passport_number: field("passportNumber"),
        passport_expiry: field("passportExpiry"),
    })
}

/// [`DocumentExtractor`] backed by Gemini structured output.
pub struct GeminiExtractor {
    client: GeminiClient,
}

impl GeminiExtractor {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    async fn request_fields(&self, image: &ImagePayload) -> Result<ExtractedData> {
        let text = self
            .client
            .generate_json(&image.data, &image.mime_type, EXTRACTION_PROMPT, &RESPONSE_SCHEMA)
            .await?;
        parse_extraction(&text)
    }
}

#[async_trait]
impl DocumentExtractor for GeminiExtractor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn extract(&self, image: &ImagePayload) -> Result<ExtractedData, IdCaptureError> {
        if !self.client.has_api_key() {
            return Err(IdCaptureError::config("extraction API key is not set"));
        }

        info!(model = self.client.model(), file = %image.file_name, "[Vision] Extracting document fields");
        match self.request_fields(image).await {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(error = %format!("{e:#}"), "Error calling extraction API");
                Err(IdCaptureError::Extraction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, extract::State, http::StatusCode};
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<Value>>>,
    }

    async fn handle(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        stub.seen.lock().unwrap().push(body);
        (stub.status, Json(stub.reply.clone()))
    }

    async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(handle).with_state(Stub {
            status,
            reply,
            seen: seen.clone(),
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1beta"), seen)
    }

    fn gemini_reply(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn image() -> ImagePayload {
        ImagePayload::new("cccd.jpg", "image/jpeg", vec![0xFFu8, 0xD8, 0xFF, 0xE0])
    }

    #[test]
    fn parse_defaults_missing_fields_to_empty() {
        let data = parse_extraction(r#"{"fullName": "Nguyen Van A", "dob": null, "idNumber": "001090000123"}"#)
            .unwrap();
        assert_eq!(data.full_name, "Nguyen Van A");
        assert_eq!(data.dob, "");
        assert_eq!(data.id_number, "001090000123");
        assert_eq!(data.issue_place, "");
        assert_eq!(data.passport_number, "");
        assert_eq!(data.passport_expiry, "");
    }

    #[test]
    fn parse_accepts_fenced_json() {
        let data = parse_extraction("```json\n{\"passportNumber\": \"C1234567\"}\n```").unwrap();
        assert_eq!(data.passport_number, "C1234567");
    }

    #[test]
    fn parse_rejects_non_json_and_non_objects() {
        assert!(parse_extraction("I could not read the card").is_err());
        assert!(parse_extraction("[1, 2]").is_err());
    }

    #[test]
    fn schema_requires_all_six_fields() {
        let required = RESPONSE_SCHEMA["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        for name in ExtractedData::FIELD_NAMES {
            assert_eq!(RESPONSE_SCHEMA["properties"][name]["type"], "STRING");
        }
    }

    #[tokio::test]
    async fn extracts_national_id_fields() {
        let text = r#"{"fullName":"Nguyen Van A","dob":"01/01/1990","idNumber":"001090000123","issuePlace":"Ha Noi","passportNumber":"","passportExpiry":""}"#;
        let (base_url, seen) = spawn_stub(StatusCode::OK, gemini_reply(text)).await;
        let extractor = GeminiExtractor::new(GeminiClient::new("test-key").with_base_url(base_url));

        let data = extractor.extract(&image()).await.unwrap();
        assert_eq!(
            data,
            ExtractedData {
                full_name: "Nguyen Van A".into(),
                dob: "01/01/1990".into(),
                id_number: "001090000123".into(),
                issue_place: "Ha Noi".into(),
                passport_number: String::new(),
                passport_expiry: String::new(),
            }
        );

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let inline = &requests[0]["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/jpeg");
        assert_eq!(inline["data"], "/9j/4A==");
        assert_eq!(requests[0]["generationConfig"]["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn server_error_collapses_to_extraction_error() {
        let (base_url, seen) =
            spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
        let extractor = GeminiExtractor::new(GeminiClient::new("test-key").with_base_url(base_url));

        let err = extractor.extract(&image()).await.unwrap_err();
        assert!(matches!(err, IdCaptureError::Extraction));
        assert_eq!(err.to_string(), idcapture_core::EXTRACTION_FAILED_MESSAGE);
        // At most once: no retry.
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unparsable_output_collapses_to_extraction_error() {
        let (base_url, _) = spawn_stub(StatusCode::OK, gemini_reply("not json at all")).await;
        let extractor = GeminiExtractor::new(GeminiClient::new("test-key").with_base_url(base_url));

        let err = extractor.extract(&image()).await.unwrap_err();
        assert!(matches!(err, IdCaptureError::Extraction));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        let extractor =
            GeminiExtractor::new(GeminiClient::new("").with_base_url("http://127.0.0.1:9/v1beta"));
        let err = extractor.extract(&image()).await.unwrap_err();
        assert!(matches!(err, IdCaptureError::Config(_)));
    }
}
