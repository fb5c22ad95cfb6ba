//! The response schema for every backend endpoint.
//!
//! Collection endpoints only constrain the shape of the array when it is
//! present; an absent array is treated as empty by the decoder.

use serde_json::json;

use pathoshield_contracts::{endpoint::Endpoint, schema::ResponseSchema};

/// Return the schema describing `endpoint`'s response body.
pub fn schema_for(endpoint: Endpoint) -> ResponseSchema {
    let (schema_id, json_schema) = match endpoint {
        Endpoint::Health => (
            "health-v1",
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "status": { "type": ["string", "null"] },
                    "database": { "type": ["string", "null"] }
                }
            }),
        ),

        Endpoint::RunPrediction => (
            "prediction-result-v1",
            json!({
                "type": "object",
                "required": ["bacterialSpecies", "patientId"],
                "properties": {
                    "bacterialSpecies": { "type": "string" },
                    "patientId": { "type": "string" },
                    "susceptibleAntibiotics": { "type": "array", "items": { "type": "string" } },
                    "resistantAntibiotics": { "type": "array", "items": { "type": "string" } },
                    "region": { "type": ["string", "null"] },
                    "confidence": { "type": ["number", "null"], "minimum": 0, "maximum": 100 }
                }
            }),
        ),

        Endpoint::CreatePrescription => (
            "prescription-v1",
            json!({
                "type": "object",
                "required": [
                    "prescriptionId", "patientId", "date", "bacterialSpecies",
                    "antibiotic", "dosage", "duration"
                ],
                "properties": {
                    "prescriptionId": { "type": "string" },
                    "patientId": { "type": "string" },
                    "date": { "type": "string" },
                    "bacterialSpecies": { "type": "string" },
                    "region": { "type": ["string", "null"] },
                    "antibiotic": { "type": "string" },
                    "dosage": { "type": "string" },
                    "duration": { "type": "string" },
                    "instructions": { "type": ["string", "null"] },
                    "confidence": { "type": ["number", "null"] }
                }
            }),
        ),

        Endpoint::Regions => (
            "regions-v1",
            json!({
                "type": "object",
                "properties": {
                    "regions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["region", "lat", "lng", "cases", "avg_resistance_rate", "trend"],
                            "properties": {
                                "region": { "type": "string" },
                                "lat": { "type": "number" },
                                "lng": { "type": "number" },
                                "cases": { "type": "integer", "minimum": 0 },
                                "avg_resistance_rate": { "type": "number", "minimum": 0, "maximum": 1 },
                                "organisms": { "type": "array", "items": { "type": "string" } },
                                "trend": { "enum": ["increasing", "decreasing", "stable"] }
                            }
                        }
                    }
                }
            }),
        ),

        Endpoint::Trends => (
            "trends-v1",
            json!({
                "type": "object",
                "properties": {
                    "trends": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "month": { "type": ["string", "null"] },
                                "month_index": { "type": ["integer", "null"], "minimum": 0 },
                                "date": { "type": ["string", "null"] },
                                "resistance_rate": { "type": ["number", "null"] },
                                "cases": { "type": ["integer", "null"], "minimum": 0 }
                            }
                        }
                    }
                }
            }),
        ),

        Endpoint::Organisms => (
            "organism-distribution-v1",
            json!({
                "type": "object",
                "properties": {
                    "distribution": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["organism"],
                            "properties": {
                                "organism": { "type": "string" },
                                "cases": { "type": "integer", "minimum": 0 },
                                "percentage": { "type": ["number", "null"] }
                            }
                        }
                    },
                    "total_cases": { "type": "integer" }
                }
            }),
        ),
    };

    ResponseSchema {
        schema_id: schema_id.to_string(),
        endpoint,
        json_schema,
    }
}
