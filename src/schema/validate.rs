//! Three-stage dataset validation.
//!
//! [`validate`] turns untrusted bytes into a typed [`Document`] in three
//! ordered stages, each mapping to a distinct error kind:
//!
//! 1. **Access** — read the source file. Fails with [`AnnolintError::Access`].
//! 2. **Syntax** — parse the text as a generic JSON value tree. Fails with
//!    [`AnnolintError::Syntax`] carrying the line/column of the first error.
//! 3. **Structure** — map the value tree onto the schema model. Fails with
//!    [`AnnolintError::Schema`] carrying a path to the first offending field
//!    (e.g. `images -> 0 -> file_name`).
//!
//! The first failing stage aborts the remaining stages. Validation is
//! deterministic and has no side effects beyond the initial read.

use std::fs;
use std::path::Path;

use serde_path_to_error::Segment;
use tracing::{debug, error, info};

use super::model::Document;
use crate::error::AnnolintError;

/// Parses and validates a COCO JSON annotation file.
///
/// # Errors
///
/// Returns [`AnnolintError::Access`] if the file cannot be read or decoded
/// as text, and [`AnnolintError::Syntax`] / [`AnnolintError::Schema`] if the
/// content is not valid JSON or violates the schema. Only the first
/// violation is reported.
pub fn validate(path: &Path) -> Result<Document, AnnolintError> {
    debug!(path = %path.display(), "reading annotation source");
    let text = fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), %source, "source unreadable");
        AnnolintError::Access {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let document = match document_from_str(&text) {
        Ok(document) => document,
        Err(err) => {
            error!(path = %path.display(), %err, "validation failed");
            return Err(err);
        }
    };

    info!(
        images = document.images.len(),
        annotations = document.annotations.len(),
        categories = document.categories.len(),
        "validation successful"
    );
    Ok(document)
}

/// Parses and validates a COCO JSON document from a string.
///
/// Runs the syntax and structural stages of [`validate`]; useful for tests
/// and for callers that already hold the content in memory.
pub fn document_from_str(json: &str) -> Result<Document, AnnolintError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|err| AnnolintError::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        })?;

    document_from_value(value)
}

/// Maps a generic JSON value tree onto the schema model.
///
/// Structural failures carry a path to the first offending field so the
/// caller can render an actionable message.
pub fn document_from_value(value: serde_json::Value) -> Result<Document, AnnolintError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let location = render_location(err.path());
        AnnolintError::Schema {
            location,
            message: err.into_inner().to_string(),
        }
    })
}

/// Renders a deserialization path as `images -> 0 -> file_name`.
fn render_location(path: &serde_path_to_error::Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for segment in path.iter() {
        match segment {
            Segment::Seq { index } => parts.push(index.to_string()),
            Segment::Map { key } => parts.push(key.clone()),
            Segment::Enum { variant } => parts.push(variant.clone()),
            Segment::Unknown => parts.push("?".to_string()),
        }
    }

    if parts.is_empty() {
        "document".to_string()
    } else {
        parts.join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Segmentation;

    fn sample_coco_json() -> &'static str {
        r#"{
            "info": {
                "year": 2024,
                "version": "1.0",
                "description": "Test dataset"
            },
            "licenses": [
                {"id": 1, "name": "CC BY 4.0", "url": "https://creativecommons.org/licenses/by/4.0/"}
            ],
            "images": [
                {"id": 1, "width": 640, "height": 480, "file_name": "image001.jpg", "license": 1}
            ],
            "annotations": [
                {
                    "id": 1,
                    "image_id": 1,
                    "category_id": 1,
                    "segmentation": [],
                    "area": 5400.0,
                    "bbox": [10.0, 20.0, 90.0, 60.0],
                    "iscrowd": 0
                }
            ],
            "categories": [
                {"id": 1, "name": "person", "supercategory": "human"}
            ]
        }"#
    }

    fn expect_schema_error(json: &str) -> (String, String) {
        match document_from_str(json) {
            Err(AnnolintError::Schema { location, message }) => (location, message),
            other => panic!("expected schema error, got {:?}", other.map(|_| "Document")),
        }
    }

    #[test]
    fn test_valid_document_parses() {
        let document = document_from_str(sample_coco_json()).expect("parse failed");

        assert_eq!(document.images.len(), 1);
        assert_eq!(document.annotations.len(), 1);
        assert_eq!(document.categories.len(), 1);
        assert_eq!(document.licenses.len(), 1);

        assert_eq!(document.info.year, Some(2024));
        assert_eq!(document.info.version, Some("1.0".to_string()));

        let img = &document.images[0];
        assert_eq!(img.id, 1);
        assert_eq!(img.file_name, "image001.jpg");
        assert_eq!(img.license, Some(1));

        let ann = &document.annotations[0];
        assert_eq!(ann.bbox, [10.0, 20.0, 90.0, 60.0]);
        assert_eq!(ann.area, 5400.0);
        assert_eq!(ann.iscrowd, 0);
    }

    #[test]
    fn test_syntax_error_reports_line_and_column() {
        let err = document_from_str("{\n  \"info\": {,\n}").unwrap_err();
        match err {
            AnnolintError::Syntax { line, column, .. } => {
                assert_eq!(line, 2);
                assert!(column > 0);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_top_level_field_rejected() {
        let json = sample_coco_json().replacen("{", "{\"bogus\": 1,", 1);
        let (_, message) = expect_schema_error(&json);
        assert!(message.contains("bogus"), "unexpected message: {message}");
    }

    #[test]
    fn test_unknown_image_field_rejected() {
        let json = sample_coco_json().replace("\"license\": 1", "\"license\": 1, \"depth\": 3");
        let (location, message) = expect_schema_error(&json);
        assert!(
            location.starts_with("images -> 0"),
            "unexpected location: {location}"
        );
        assert!(message.contains("depth"), "unexpected message: {message}");
    }

    #[test]
    fn test_missing_required_field_reported() {
        let json = sample_coco_json().replace("\"file_name\": \"image001.jpg\",", "");
        let (location, message) = expect_schema_error(&json);
        assert!(
            location.starts_with("images -> 0"),
            "unexpected location: {location}"
        );
        assert!(message.contains("file_name"), "unexpected message: {message}");
    }

    #[test]
    fn test_wrong_type_reports_field_path() {
        let json = sample_coco_json().replace("\"image001.jpg\"", "42");
        let (location, _) = expect_schema_error(&json);
        assert_eq!(location, "images -> 0 -> file_name");
    }

    #[test]
    fn test_zero_width_rejected() {
        let json = sample_coco_json().replace("\"width\": 640", "\"width\": 0");
        let (location, message) = expect_schema_error(&json);
        assert!(
            location.starts_with("images -> 0"),
            "unexpected location: {location}"
        );
        assert!(message.contains("width"), "unexpected message: {message}");
    }

    #[test]
    fn test_negative_bbox_dimensions_rejected() {
        let json = sample_coco_json().replace("[10.0, 20.0, 90.0, 60.0]", "[10.0, 20.0, -90.0, 60.0]");
        let (location, message) = expect_schema_error(&json);
        assert!(
            location.starts_with("annotations -> 0"),
            "unexpected location: {location}"
        );
        assert!(
            message.contains("non-negative"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn test_bbox_must_have_four_elements() {
        let json = sample_coco_json().replace("[10.0, 20.0, 90.0, 60.0]", "[10.0, 20.0, 90.0]");
        let (location, _) = expect_schema_error(&json);
        assert!(
            location.starts_with("annotations -> 0"),
            "unexpected location: {location}"
        );
    }

    #[test]
    fn test_iscrowd_out_of_range_rejected() {
        let json = sample_coco_json().replace("\"iscrowd\": 0", "\"iscrowd\": 2");
        let (_, message) = expect_schema_error(&json);
        assert!(message.contains("iscrowd"), "unexpected message: {message}");
    }

    #[test]
    fn test_negative_area_rejected() {
        let json = sample_coco_json().replace("\"area\": 5400.0", "\"area\": -1.0");
        let (_, message) = expect_schema_error(&json);
        assert!(message.contains("area"), "unexpected message: {message}");
    }

    #[test]
    fn test_segmentation_forms_accepted() {
        let polygons = sample_coco_json().replace(
            "\"segmentation\": []",
            "\"segmentation\": [[0.0, 0.0, 10.0, 0.0, 10.0, 10.0]]",
        );
        let document = document_from_str(&polygons).expect("polygon parse failed");
        assert!(document.annotations[0].segmentation.has_polygons());

        let rle = sample_coco_json().replace(
            "\"segmentation\": []",
            "\"segmentation\": {\"counts\": \"abc\", \"size\": [480, 640]}",
        );
        let document = document_from_str(&rle).expect("rle parse failed");
        assert!(matches!(
            document.annotations[0].segmentation,
            Segmentation::Rle(_)
        ));
    }

    #[test]
    fn test_validate_missing_file_is_access_error() {
        let err = validate(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, AnnolintError::Access { .. }));
    }

    #[test]
    fn test_roundtrip_is_idempotent() {
        let original = document_from_str(sample_coco_json()).expect("parse failed");
        let json = serde_json::to_string_pretty(&original).expect("serialize failed");
        let restored = document_from_str(&json).expect("reparse failed");
        assert_eq!(original, restored);
    }
}
