use serde::{Deserialize, Serialize};

pub const NO_NUMBERS_MESSAGE: &str = "No numbers detected";

/// Body of a successful `/process-image` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessImageResponse {
    /// Always "success"
    pub status: String,
    /// Numeric tokens in detection order
    pub detected_numbers: Vec<String>,
    /// Set when nothing was detected
    pub message: Option<String>,
}

impl ProcessImageResponse {
    pub fn new(detected_numbers: Vec<String>) -> Self {
        let message = detected_numbers
            .is_empty()
            .then(|| NO_NUMBERS_MESSAGE.to_string());

        Self {
            status: "success".to_string(),
            detected_numbers,
            message,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serialization() {
        let response = ProcessImageResponse::new(vec!["12.5".to_string()]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "detected_numbers": ["12.5"],
                "message": null
            })
        );
    }

    #[test]
    fn test_empty_result_has_message() {
        let response = ProcessImageResponse::new(vec![]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"detected_numbers\":[]"));
        assert!(json.contains("\"message\":\"No numbers detected\""));
    }
}
