//! Typed schema model for COCO object detection datasets.
//!
//! These types are the single source of truth for what constitutes a valid
//! dataset. Deserialization is strict: every record except [`Info`] rejects
//! unknown fields, and field-level constraints (positive image dimensions,
//! non-negative bbox extents, `iscrowd` in {0, 1}) are enforced while the
//! document is being built, so a constructed [`Document`] always respects
//! its invariants.
//!
//! # COCO Format Reference
//!
//! COCO bounding boxes use `[x, y, width, height]` format where `(x, y)` is
//! the top-left corner in absolute pixel coordinates.
//!
//! Reference: <https://cocodataset.org/#format-data>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A complete, validated COCO object detection dataset.
///
/// This is the unit handed to every analysis rule. It is constructed exactly
/// once per scan by the validator and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// Descriptive metadata block.
    pub info: Info,

    /// License definitions for the dataset.
    pub licenses: Vec<License>,

    /// All images in the dataset.
    pub images: Vec<Image>,

    /// All annotations (bounding boxes with labels).
    pub annotations: Vec<Annotation>,

    /// All category definitions.
    pub categories: Vec<Category>,
}

/// Descriptive metadata for the dataset.
///
/// Every field is optional and unknown extra fields are tolerated and
/// preserved, so a round-trip through the model is lossless.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,

    /// Any extra fields the producer attached to the info block.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A license entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct License {
    pub id: u64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An image record.
///
/// Width and height must be strictly positive; a zero or missing dimension
/// is a schema violation, not a lint finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawImage")]
pub struct Image {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flickr_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coco_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_captured: Option<String>,
}

/// Unvalidated mirror of [`Image`], used to enforce constraints during
/// deserialization.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImage {
    id: u64,
    width: u32,
    height: u32,
    file_name: String,

    #[serde(default)]
    license: Option<u64>,

    #[serde(default)]
    flickr_url: Option<String>,

    #[serde(default)]
    coco_url: Option<String>,

    #[serde(default)]
    date_captured: Option<String>,
}

impl TryFrom<RawImage> for Image {
    type Error = String;

    fn try_from(raw: RawImage) -> Result<Self, Self::Error> {
        if raw.width == 0 {
            return Err(format!(
                "invalid value for `width`: must be greater than 0 (got {})",
                raw.width
            ));
        }
        if raw.height == 0 {
            return Err(format!(
                "invalid value for `height`: must be greater than 0 (got {})",
                raw.height
            ));
        }

        Ok(Image {
            id: raw.id,
            width: raw.width,
            height: raw.height,
            file_name: raw.file_name,
            license: raw.license,
            flickr_url: raw.flickr_url,
            coco_url: raw.coco_url,
            date_captured: raw.date_captured,
        })
    }
}

impl Image {
    /// Creates a new image with the given properties.
    pub fn new(id: u64, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            file_name: file_name.into(),
            license: None,
            flickr_url: None,
            coco_url: None,
            date_captured: None,
        }
    }
}

/// Segmentation data attached to an annotation: either a list of polygons
/// (each a flat list of point coordinates) or a run-length encoding object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segmentation {
    Polygons(Vec<Vec<f64>>),
    Rle(serde_json::Map<String, serde_json::Value>),
}

impl Default for Segmentation {
    fn default() -> Self {
        Segmentation::Polygons(Vec::new())
    }
}

impl Segmentation {
    /// True when this is a polygon list with at least one polygon.
    pub fn has_polygons(&self) -> bool {
        matches!(self, Segmentation::Polygons(polygons) if !polygons.is_empty())
    }
}

/// A single annotation record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnnotation")]
pub struct Annotation {
    pub id: u64,

    /// ID of the image this annotation belongs to. Not checked against the
    /// image list at construction; a dangling reference is a lint finding.
    pub image_id: u64,

    /// ID of the category for this annotation. Same referential policy as
    /// `image_id`.
    pub category_id: u64,

    #[serde(default)]
    pub segmentation: Segmentation,

    /// Pixel area of the annotated region. Never negative.
    pub area: f64,

    /// Bounding box as `[x, y, width, height]` in pixel coordinates.
    /// Width and height are never negative.
    pub bbox: [f64; 4],

    /// 1 when the annotation covers a crowd region, 0 otherwise.
    pub iscrowd: u8,
}

/// Unvalidated mirror of [`Annotation`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnnotation {
    id: u64,
    image_id: u64,
    category_id: u64,

    #[serde(default)]
    segmentation: Segmentation,

    area: f64,
    bbox: [f64; 4],
    iscrowd: u8,
}

impl TryFrom<RawAnnotation> for Annotation {
    type Error = String;

    fn try_from(raw: RawAnnotation) -> Result<Self, Self::Error> {
        let [_x, _y, w, h] = raw.bbox;
        if w < 0.0 || h < 0.0 {
            return Err(format!(
                "invalid value for `bbox`: dimensions [width, height] must be non-negative (got [w={}, h={}])",
                w, h
            ));
        }
        if raw.area < 0.0 {
            return Err(format!(
                "invalid value for `area`: must be non-negative (got {})",
                raw.area
            ));
        }
        if raw.iscrowd > 1 {
            return Err(format!(
                "invalid value for `iscrowd`: must be 0 or 1 (got {})",
                raw.iscrowd
            ));
        }

        Ok(Annotation {
            id: raw.id,
            image_id: raw.image_id,
            category_id: raw.category_id,
            segmentation: raw.segmentation,
            area: raw.area,
            bbox: raw.bbox,
            iscrowd: raw.iscrowd,
        })
    }
}

impl Annotation {
    /// Creates a new annotation with the minimum required fields.
    ///
    /// The area defaults to the bbox-derived area and `iscrowd` to 0.
    pub fn new(id: u64, image_id: u64, category_id: u64, bbox: [f64; 4]) -> Self {
        let area = bbox[2] * bbox[3];
        Self {
            id,
            image_id,
            category_id,
            segmentation: Segmentation::default(),
            area,
            bbox,
            iscrowd: 0,
        }
    }

    /// Sets the declared area.
    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    /// Sets the segmentation data.
    pub fn with_segmentation(mut self, segmentation: Segmentation) -> Self {
        self.segmentation = segmentation;
        self
    }

    /// Bounding box width.
    pub fn bbox_width(&self) -> f64 {
        self.bbox[2]
    }

    /// Bounding box height.
    pub fn bbox_height(&self) -> f64 {
        self.bbox[3]
    }

    /// Area implied by the bounding box alone.
    pub fn bbox_area(&self) -> f64 {
        self.bbox[2] * self.bbox[3]
    }
}

/// A category (class label) definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub id: u64,

    /// Name of the category (e.g., "person", "car", "dog").
    pub name: String,

    /// Optional supercategory for hierarchical taxonomies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

impl Category {
    /// Creates a new category with the given properties.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            supercategory: None,
        }
    }
}
