//! # pathoshield-mock
//!
//! A simulated PathoShield backend. It implements `DataSource` entirely in
//! memory so the console can run without a server.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pathoshield_mock::MockDataSource;
//!
//! let source = MockDataSource::with_seed(7);
//! let regions = source.regions().await?;
//! ```

pub mod mock_data;
pub mod source;
pub mod store;

pub use source::MockDataSource;

#[cfg(test)]
mod tests {
    use pathoshield_contracts::{
        error::AmrError,
        prediction::{PredictionRequest, SampleFile},
        prescription::PrescriptionDraft,
    };
    use pathoshield_core::traits::DataSource;

    use super::mock_data::{RESISTANT_POOL, SUSCEPTIBLE_POOL};
    use super::source::{HEALTH_MESSAGE, SEED_RECORDS};
    use super::MockDataSource;

    fn request(organism: &str, region: Option<&str>) -> PredictionRequest {
        PredictionRequest {
            organism: organism.to_string(),
            patient_age: Some(30),
            patient_gender: None,
            region: region.map(str::to_string),
            sample: SampleFile::new("sample.csv", b"1,2,3".to_vec()),
        }
    }

    #[tokio::test]
    async fn health_reports_running() {
        let status = MockDataSource::empty(1).health().await.unwrap();
        assert_eq!(status.message, HEALTH_MESSAGE);
        assert_eq!(status.status.as_deref(), Some("healthy"));
    }

    #[tokio::test]
    async fn prediction_draws_from_the_pools() {
        let source = MockDataSource::empty(3);
        let result = source.run_prediction(&request("E. coli", Some("Punjab"))).await.unwrap();

        assert_eq!(result.bacterial_species, "E. coli");
        assert_eq!(result.region.as_deref(), Some("Punjab"));
        assert_eq!(result.susceptible_antibiotics.len(), 6);
        assert_eq!(result.resistant_antibiotics.len(), 3);
        assert!(result
            .susceptible_antibiotics
            .iter()
            .all(|a| SUSCEPTIBLE_POOL.contains(&a.as_str())));
        assert!(result
            .resistant_antibiotics
            .iter()
            .all(|a| RESISTANT_POOL.contains(&a.as_str())));
        assert!(result.overlapping_antibiotics().is_empty());

        let confidence = result.confidence.unwrap();
        assert!((75.0..=95.0).contains(&confidence));
        assert!(result.patient_id.starts_with("PAT-"));
        assert_eq!(result.patient_id.len(), "PAT-12345".len());
    }

    #[tokio::test]
    async fn same_seed_same_prediction() {
        let a = MockDataSource::with_seed(42);
        let b = MockDataSource::with_seed(42);
        let ra = a.run_prediction(&request("", None)).await.unwrap();
        let rb = b.run_prediction(&request("", None)).await.unwrap();
        assert_eq!(ra, rb);
        assert!(!ra.bacterial_species.is_empty());
    }

    #[tokio::test]
    async fn blank_file_name_is_rejected() {
        let mut req = request("E. coli", None);
        req.sample = SampleFile::new("", Vec::new());

        let err = MockDataSource::empty(1).run_prediction(&req).await.unwrap_err();
        assert_eq!(
            err,
            AmrError::Http {
                status: 400,
                detail: "File is required".to_string()
            }
        );
    }

    #[tokio::test]
    async fn predictions_feed_surveillance() {
        let source = MockDataSource::empty(9);
        assert!(source.regions().await.unwrap().is_empty());

        source.run_prediction(&request("S. aureus", Some("Sindh"))).await.unwrap();
        source.run_prediction(&request("S. aureus", Some("sindh"))).await.unwrap();
        assert_eq!(source.stored_predictions().unwrap(), 2);

        let regions = source.regions().await.unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region, "Sindh");
        assert_eq!(regions[0].cases, 2);
        // 3 resistant of 9 reported
        assert_eq!(regions[0].avg_resistance_rate, 0.333);

        let dist = source.organism_distribution().await.unwrap();
        assert_eq!(dist[0].organism, "S. aureus");
        assert_eq!(dist[0].percentage, Some(100.0));

        let trends = source.trends().await.unwrap();
        assert_eq!(trends.len(), 12);
        assert_eq!(trends[11].cases, Some(2));
    }

    #[tokio::test]
    async fn seeded_history_covers_the_map() {
        let source = MockDataSource::with_seed(5);
        assert_eq!(source.stored_predictions().unwrap(), SEED_RECORDS);

        let regions = source.regions().await.unwrap();
        assert_eq!(regions.len(), 6);
        assert!(regions.iter().all(|r| r.cases > 0));
        assert!(regions.iter().all(|r| (0.0..=1.0).contains(&r.avg_resistance_rate)));

        let total: u64 = source
            .trends()
            .await
            .unwrap()
            .iter()
            .filter_map(|p| p.cases)
            .sum();
        assert_eq!(total as usize, SEED_RECORDS);
    }

    #[tokio::test]
    async fn prescription_gets_id_and_timestamp() {
        let draft = PrescriptionDraft {
            patient_id: "PAT-10001".to_string(),
            bacterial_species: "E. coli".to_string(),
            region: Some("KPK".to_string()),
            antibiotic: "Meropenem".to_string(),
            dosage: "1g".to_string(),
            duration: "5 days".to_string(),
            instructions: None,
            confidence: Some(90.0),
        };

        let prescription = MockDataSource::empty(1).create_prescription(&draft).await.unwrap();
        assert!(prescription.prescription_id.starts_with("PRES-"));
        assert_eq!(prescription.antibiotic, "Meropenem");
        assert!(prescription.issued_on().is_some());
    }
}
