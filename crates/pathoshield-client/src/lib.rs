//! # pathoshield-client
//!
//! The live `DataSource`: talks to the PathoShield backend over HTTP with
//! `reqwest` and validates every response at the boundary.

pub mod http;

pub use http::HttpDataSource;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use pathoshield_contracts::{
        error::AmrError,
        prediction::{PredictionRequest, SampleFile},
        prescription::PrescriptionDraft,
    };
    use pathoshield_core::traits::DataSource;

    use super::http::error_detail;
    use super::HttpDataSource;

    fn source(server: &MockServer) -> HttpDataSource {
        HttpDataSource::new(server.uri(), Duration::from_secs(5), Duration::from_secs(2)).unwrap()
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            organism: "E. coli".to_string(),
            patient_age: Some(42),
            patient_gender: None,
            region: Some("Punjab".to_string()),
            sample: SampleFile::new("run.csv", b"mz,intensity\n1,2\n".to_vec()),
        }
    }

    // ── Health ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn health_decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "message": "AMR Prediction API is running",
                "database": "connected"
            })))
            .mount(&server)
            .await;

        let status = source(&server).health().await.unwrap();
        assert_eq!(status.message, "AMR Prediction API is running");
        assert_eq!(status.database.as_deref(), Some("connected"));
    }

    #[tokio::test]
    async fn every_request_carries_a_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header_exists(super::http::REQUEST_ID_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let status = source(&server).health().await.unwrap();
        assert_eq!(status.status, None);
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let source = HttpDataSource::new("http://127.0.0.1:1", Duration::from_secs(2), Duration::from_secs(1)).unwrap();
        let err = source.health().await.unwrap_err();
        assert!(matches!(err, AmrError::Network { .. }), "got {:?}", err);
    }

    // ── Prediction ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn prediction_is_sent_as_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bacterialSpecies": "E. coli",
                "susceptibleAntibiotics": ["Amoxicillin", "Meropenem"],
                "resistantAntibiotics": ["Ciprofloxacin"],
                "region": "Punjab",
                "confidence": 88.1,
                "patientId": "PAT-48213"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = source(&server).run_prediction(&request()).await.unwrap();
        assert_eq!(result.patient_id, "PAT-48213");
        assert_eq!(result.susceptible_antibiotics.len(), 2);

        let received = server.received_requests().await.unwrap();
        let content_type = received[0].headers.get("content-type").unwrap().to_str().unwrap().to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains(r#"name="file"; filename="run.csv""#));
        assert!(body.contains(r#"name="organism""#));
        assert!(body.contains(r#"name="patientAge""#));
        assert!(!body.contains(r#"name="patientGender""#), "absent optionals are omitted");
    }

    #[tokio::test]
    async fn http_error_surfaces_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/run"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "Unsupported file format" })),
            )
            .mount(&server)
            .await;

        let err = source(&server).run_prediction(&request()).await.unwrap_err();
        assert_eq!(
            err,
            AmrError::Http {
                status: 400,
                detail: "Unsupported file format".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unsupported file format");
    }

    #[tokio::test]
    async fn http_error_without_detail_uses_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = source(&server).health().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[tokio::test]
    async fn malformed_prediction_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "confidence": 300 })))
            .mount(&server)
            .await;

        let err = source(&server).run_prediction(&request()).await.unwrap_err();
        assert!(matches!(err, AmrError::MalformedPayload { .. }), "got {:?}", err);
    }

    // ── Prescription ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn prescription_posts_camel_case_json() {
        let server = MockServer::start().await;
        let draft = PrescriptionDraft {
            patient_id: "PAT-1".to_string(),
            bacterial_species: "E. coli".to_string(),
            region: None,
            antibiotic: "Amoxicillin".to_string(),
            dosage: "250mg".to_string(),
            duration: "7 days".to_string(),
            instructions: None,
            confidence: Some(80.0),
        };

        Mock::given(method("POST"))
            .and(path("/api/eprescription"))
            .and(body_json(json!({
                "patientId": "PAT-1",
                "bacterialSpecies": "E. coli",
                "region": null,
                "antibiotic": "Amoxicillin",
                "dosage": "250mg",
                "duration": "7 days",
                "instructions": null,
                "confidence": 80.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "prescriptionId": "PRES-1767225600000",
                "patientId": "PAT-1",
                "date": "2026-01-01T00:00:00",
                "bacterialSpecies": "E. coli",
                "region": null,
                "antibiotic": "Amoxicillin",
                "dosage": "250mg",
                "duration": "7 days",
                "instructions": null,
                "confidence": 80.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let prescription = source(&server).create_prescription(&draft).await.unwrap();
        assert_eq!(prescription.prescription_id, "PRES-1767225600000");
        assert_eq!(prescription.dosage, "250mg");
    }

    // ── Surveillance ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn regions_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/surveillance/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{
                    "region": "Punjab", "lat": 31.5204, "lng": 74.3587, "cases": 456,
                    "avg_resistance_rate": 0.235, "organisms": ["E. coli"], "trend": "increasing"
                }]
            })))
            .mount(&server)
            .await;

        let regions = source(&server).regions().await.unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].cases, 456);
    }

    #[tokio::test]
    async fn malformed_regions_decode_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/surveillance/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [{ "region": "Punjab", "cases": "many" }]
            })))
            .mount(&server)
            .await;

        let regions = source(&server).regions().await.unwrap();
        assert!(regions.is_empty());
    }

    #[tokio::test]
    async fn absent_distribution_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/surveillance/organisms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Database not connected" })))
            .mount(&server)
            .await;

        assert!(source(&server).organism_distribution().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_collection_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/surveillance/trends"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        assert!(source(&server).trends().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_prediction_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/prediction/run"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = source(&server).run_prediction(&request()).await.unwrap_err();
        assert!(matches!(err, AmrError::MalformedPayload { .. }));
    }

    // ── error_detail ─────────────────────────────────────────────────────────

    #[test]
    fn error_detail_variants() {
        assert_eq!(error_detail(404, r#"{"detail":"Not Found"}"#), "Not Found");
        assert_eq!(error_detail(500, "boom"), "HTTP error! status: 500");
        assert_eq!(error_detail(500, r#"{"detail":null}"#), "HTTP error! status: 500");
        assert_eq!(
            error_detail(422, r#"{"detail":[{"msg":"field required"}]}"#),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let source =
            HttpDataSource::new("http://localhost:8000/", Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8000");
    }
}
