use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::providers::utils::round_to;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// A single prediction as returned by the detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionPrediction {
    #[serde(rename = "class", default = "unknown_label")]
    pub label: String,
    /// In [0, 1].
    #[serde(default)]
    pub confidence: f64,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

fn unknown_label() -> String {
    "unknown".to_string()
}

fn empty_object() -> Value {
    json!({})
}

/// The model response, or a failure folded into the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub predictions: Vec<DetectionPrediction>,
    #[serde(default = "empty_object")]
    pub image: Value,
}

impl RawDetection {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            predictions: Vec::new(),
            image: json!({ "width": 0, "height": 0 }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedFood {
    pub name: String,
    /// Percentage, two decimals.
    pub confidence: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub success: bool,
    pub detected_foods: Vec<DetectedFood>,
    pub total_detections: usize,
    pub image_info: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetectionResponse {
    Report(DetectionReport),
    Failed(RawDetection),
}

pub fn format_detection(raw: RawDetection) -> DetectionResponse {
    if raw.error.is_some() {
        return DetectionResponse::Failed(raw);
    }

    let mut detected_foods: Vec<DetectedFood> = raw
        .predictions
        .into_iter()
        .map(|prediction| DetectedFood {
            name: prediction.label,
            confidence: round_to(prediction.confidence * 100.0, 2),
            bbox: prediction.bbox,
        })
        .collect();

    // Stable: equal confidences keep model order
    detected_foods.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    DetectionResponse::Report(DetectionReport {
        success: true,
        total_detections: detected_foods.len(),
        detected_foods,
        image_info: raw.image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, confidence: f64, x: f64) -> DetectionPrediction {
        DetectionPrediction {
            label: label.to_string(),
            confidence,
            bbox: BoundingBox {
                x,
                y: 10.0,
                width: 50.0,
                height: 40.0,
            },
        }
    }

    #[test]
    fn test_sorts_stably_and_rescales() {
        let raw = RawDetection {
            error: None,
            predictions: vec![
                prediction("apple", 0.91, 1.0),
                prediction("bread", 0.40, 2.0),
                prediction("banana", 0.91, 3.0),
            ],
            image: json!({ "width": 640, "height": 480 }),
        };

        let DetectionResponse::Report(report) = format_detection(raw) else {
            panic!("expected a report");
        };

        let names: Vec<&str> = report.detected_foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "banana", "bread"]);
        assert_eq!(report.detected_foods[0].confidence, 91.0);
        assert_eq!(report.detected_foods[2].confidence, 40.0);
        assert_eq!(report.total_detections, 3);
        assert!(report.success);
        assert_eq!(report.image_info, json!({ "width": 640, "height": 480 }));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let raw = RawDetection {
            error: None,
            predictions: vec![prediction("kiwi", 0.123456, 0.0)],
            image: json!({}),
        };
        let DetectionResponse::Report(report) = format_detection(raw) else {
            panic!("expected a report");
        };
        assert_eq!(report.detected_foods[0].confidence, 12.35);
    }

    #[test]
    fn test_error_is_passed_through_unchanged() {
        let raw = RawDetection::failed("Roboflow API Error 401: unauthorized");
        let response = format_detection(raw);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Roboflow API Error 401: unauthorized");
        assert_eq!(json["predictions"], json!([]));
        assert_eq!(json["image"], json!({ "width": 0, "height": 0 }));
        assert!(json.get("success").is_none());
    }

    #[test]
    fn test_parses_model_json_with_defaults() {
        let raw: RawDetection = serde_json::from_value(json!({
            "predictions": [
                { "class": "pizza", "confidence": 0.8, "x": 100.5, "y": 80, "width": 60, "height": 30, "class_id": 4 },
                { "confidence": 0.2 }
            ]
        }))
        .unwrap();

        assert_eq!(raw.predictions[0].label, "pizza");
        assert_eq!(raw.predictions[0].bbox.x, 100.5);
        assert_eq!(raw.predictions[1].label, "unknown");
        assert_eq!(raw.predictions[1].bbox, BoundingBox::default());
        assert_eq!(raw.image, json!({}));
    }
}
