//! The analysis rules and their registry.
//!
//! Each rule is a pure, stateless function from a validated [`Document`] to
//! a list of human-readable finding strings. Rules check one specific kind
//! of anomaly each, never mutate the document, and are safe to run in any
//! order.
//!
//! Rules are registered explicitly in [`REGISTRY`], sorted by name, so the
//! full rule set is known at compile time and iteration order is stable
//! across runs. Per-rule finding order is deterministic: grouping rules
//! iterate sorted maps, per-annotation rules follow document order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::schema::{Category, Document, Image};

/// A rule function: validated document in, finding strings out.
pub type RuleFn = fn(&Document) -> Vec<String>;

/// A registered analysis rule.
pub struct Rule {
    /// Stable identifier, used as the result key for this rule's findings.
    pub name: &'static str,

    /// One-line description for the `rules` listing.
    pub summary: &'static str,

    /// The rule implementation.
    pub run: RuleFn,
}

/// All built-in rules, sorted by name.
static REGISTRY: &[Rule] = &[
    Rule {
        name: "attribute_area_bbox_mismatch",
        summary: "Finds significant mismatches between bbox area and the 'area' attribute.",
        run: attribute_area_bbox_mismatch,
    },
    Rule {
        name: "category_case_consistency",
        summary: "Checks for inconsistent capitalization in category names.",
        run: category_case_consistency,
    },
    Rule {
        name: "category_duplicate_ids",
        summary: "Finds multiple category definitions with the same ID.",
        run: category_duplicate_ids,
    },
    Rule {
        name: "category_duplicate_names",
        summary: "Finds multiple category definitions with the exact same name.",
        run: category_duplicate_names,
    },
    Rule {
        name: "geometry_bbox_out_of_bounds",
        summary: "Identifies bounding boxes that extend beyond image dimensions.",
        run: geometry_bbox_out_of_bounds,
    },
    Rule {
        name: "geometry_zero_area_bboxes",
        summary: "Identifies annotations with bounding boxes of zero width or height.",
        run: geometry_zero_area_bboxes,
    },
    Rule {
        name: "relation_images_without_annotations",
        summary: "Finds images that have no corresponding annotations.",
        run: relation_images_without_annotations,
    },
    Rule {
        name: "relation_unmatched_annotations",
        summary: "Finds annotations that point to a non-existent image ID.",
        run: relation_unmatched_annotations,
    },
    Rule {
        name: "relation_unmatched_category",
        summary: "Finds annotations that point to a non-existent category ID.",
        run: relation_unmatched_category,
    },
    Rule {
        name: "statistical_bbox_aspect_ratio_outliers",
        summary: "Identifies bounding boxes with extreme aspect ratios (outliers).",
        run: statistical_bbox_aspect_ratio_outliers,
    },
    Rule {
        name: "statistical_class_distribution_imbalance",
        summary: "Flags categories with very few annotations, indicating severe imbalance.",
        run: statistical_class_distribution_imbalance,
    },
];

/// Returns every registered rule, sorted by name.
pub fn all_rules() -> &'static [Rule] {
    REGISTRY
}

// ============================================================================
// Category and relational rules
// ============================================================================

/// Checks for inconsistent capitalization in category names.
fn category_case_consistency(document: &Document) -> Vec<String> {
    let mut names_by_lower: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for category in &document.categories {
        names_by_lower
            .entry(category.name.to_lowercase())
            .or_default()
            .insert(category.name.as_str());
    }

    let mut findings = Vec::new();
    for (lower_name, original_names) in &names_by_lower {
        if original_names.len() > 1 {
            let spellings: Vec<&str> = original_names.iter().copied().collect();
            findings.push(format!(
                "Inconsistent capitalization for '{}'. Found: {}",
                lower_name,
                spellings.join(", ")
            ));
        }
    }
    findings
}

/// Finds multiple category definitions with the exact same name.
fn category_duplicate_names(document: &Document) -> Vec<String> {
    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for category in &document.categories {
        *name_counts.entry(category.name.as_str()).or_insert(0) += 1;
    }

    name_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, count)| format!("Duplicate category name '{}' appears {} times.", name, count))
        .collect()
}

/// Finds multiple category definitions with the same ID.
fn category_duplicate_ids(document: &Document) -> Vec<String> {
    let mut id_counts: BTreeMap<u64, usize> = BTreeMap::new();
    for category in &document.categories {
        *id_counts.entry(category.id).or_insert(0) += 1;
    }

    id_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| format!("Duplicate category ID #{} appears {} times.", id, count))
        .collect()
}

/// Finds annotations that point to a non-existent image ID.
fn relation_unmatched_annotations(document: &Document) -> Vec<String> {
    let valid_image_ids: HashSet<u64> = document.images.iter().map(|image| image.id).collect();

    let mut findings = Vec::new();
    for ann in &document.annotations {
        if !valid_image_ids.contains(&ann.image_id) {
            findings.push(format!(
                "Orphaned annotation (ID {}) points to a missing image (ID {}).",
                ann.id, ann.image_id
            ));
        }
    }
    findings
}

/// Finds annotations that point to a non-existent category ID.
fn relation_unmatched_category(document: &Document) -> Vec<String> {
    let valid_category_ids: HashSet<u64> =
        document.categories.iter().map(|category| category.id).collect();

    let mut findings = Vec::new();
    for ann in &document.annotations {
        if !valid_category_ids.contains(&ann.category_id) {
            findings.push(format!(
                "Annotation (ID {}) points to a missing category (ID {}).",
                ann.id, ann.category_id
            ));
        }
    }
    findings
}

/// Finds images that have no corresponding annotations.
fn relation_images_without_annotations(document: &Document) -> Vec<String> {
    // A dataset with no annotations at all is a different problem; this
    // check only makes sense once some images are annotated.
    if document.annotations.is_empty() {
        return Vec::new();
    }

    let annotated_image_ids: HashSet<u64> =
        document.annotations.iter().map(|ann| ann.image_id).collect();

    let mut findings = Vec::new();
    for image in &document.images {
        if !annotated_image_ids.contains(&image.id) {
            findings.push(format!(
                "Image '{}' (ID {}) has no annotations.",
                image.file_name, image.id
            ));
        }
    }
    findings
}

// ============================================================================
// Annotation geometry and attribute rules
// ============================================================================

/// Identifies annotations with bounding boxes of zero width or height.
fn geometry_zero_area_bboxes(document: &Document) -> Vec<String> {
    let mut findings = Vec::new();
    for ann in &document.annotations {
        let (w, h) = (ann.bbox_width(), ann.bbox_height());
        if w == 0.0 || h == 0.0 {
            findings.push(format!(
                "Annotation (ID {}) on image (ID {}) has a zero-area bounding box [w={:.1}, h={:.1}].",
                ann.id, ann.image_id, w, h
            ));
        }
    }
    findings
}

/// Identifies bounding boxes that extend beyond image dimensions.
fn geometry_bbox_out_of_bounds(document: &Document) -> Vec<String> {
    let images_by_id: HashMap<u64, &Image> =
        document.images.iter().map(|image| (image.id, image)).collect();

    let mut findings = Vec::new();
    for ann in &document.annotations {
        let Some(image) = images_by_id.get(&ann.image_id) else {
            // Handled by the 'unmatched_annotations' rule.
            continue;
        };

        let [x1, y1, w, h] = ann.bbox;
        let (x2, y2) = (x1 + w, y1 + h);

        if x1 < 0.0 || y1 < 0.0 || x2 > f64::from(image.width) || y2 > f64::from(image.height) {
            findings.push(format!(
                "Annotation (ID {}) on image '{}' (ID {}) is out of bounds. \
                 Bbox [x2={:.1}, y2={:.1}] vs. Image [w={}, h={}].",
                ann.id, image.file_name, ann.image_id, x2, y2, image.width, image.height
            ));
        }
    }
    findings
}

/// Relative tolerance for the declared-area comparison.
const AREA_RTOL: f64 = 1e-3;
/// Absolute tolerance floor, so zero-area boxes compare cleanly.
const AREA_ATOL: f64 = 1e-8;

/// `|a - b| <= atol + rtol * |b|`, with the declared area as reference.
fn area_is_close(bbox_area: f64, declared_area: f64) -> bool {
    (bbox_area - declared_area).abs() <= AREA_ATOL + AREA_RTOL * declared_area.abs()
}

/// Finds significant mismatches between bbox area and the 'area' attribute.
fn attribute_area_bbox_mismatch(document: &Document) -> Vec<String> {
    let mut findings = Vec::new();
    for ann in &document.annotations {
        // Polygon-backed annotations are not rectangles; their declared area
        // legitimately differs from the bbox area.
        if ann.segmentation.has_polygons() {
            continue;
        }

        let bbox_area = ann.bbox_area();
        if !area_is_close(bbox_area, ann.area) {
            findings.push(format!(
                "Annotation (ID {}) has a mismatched area. \
                 Bbox area is {:.2}, but 'area' attribute is {:.2}.",
                ann.id, bbox_area, ann.area
            ));
        }
    }
    findings
}

// ============================================================================
// Statistical anomaly rules
// ============================================================================

/// Linear-interpolation percentile over an ascending, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// Identifies bounding boxes with extreme aspect ratios (outliers).
fn statistical_bbox_aspect_ratio_outliers(document: &Document) -> Vec<String> {
    if document.annotations.is_empty() {
        return Vec::new();
    }

    let mut ratios: Vec<f64> = document
        .annotations
        .iter()
        .filter(|ann| ann.bbox_width() > 0.0 && ann.bbox_height() > 0.0)
        .map(|ann| ann.bbox_width() / ann.bbox_height())
        .collect();

    if ratios.is_empty() {
        return Vec::new();
    }

    // IQR fences are robust to non-normal ratio distributions.
    ratios.sort_by(f64::total_cmp);
    let q1 = percentile(&ratios, 25.0);
    let q3 = percentile(&ratios, 75.0);
    let iqr = q3 - q1;
    let lower_bound = q1 - 1.5 * iqr;
    let upper_bound = q3 + 1.5 * iqr;

    let mut findings = Vec::new();
    for ann in &document.annotations {
        let (w, h) = (ann.bbox_width(), ann.bbox_height());
        if w > 0.0 && h > 0.0 {
            let ratio = w / h;
            if !(lower_bound..=upper_bound).contains(&ratio) {
                findings.push(format!(
                    "Annotation (ID {}) on image (ID {}) has an outlier aspect ratio of {:.2}. \
                     Typical range: [{:.2} - {:.2}].",
                    ann.id, ann.image_id, ratio, lower_bound, upper_bound
                ));
            }
        }
    }
    findings
}

/// Minimum dataset size before imbalance statistics mean anything.
const IMBALANCE_MIN_ANNOTATIONS: usize = 50;

/// Flags categories with very few annotations, indicating severe imbalance.
fn statistical_class_distribution_imbalance(document: &Document) -> Vec<String> {
    let total_annotations = document.annotations.len();
    if total_annotations < IMBALANCE_MIN_ANNOTATIONS {
        return Vec::new();
    }

    let mut category_counts: BTreeMap<u64, usize> = BTreeMap::new();
    for ann in &document.annotations {
        *category_counts.entry(ann.category_id).or_insert(0) += 1;
    }

    let categories_by_id: HashMap<u64, &Category> = document
        .categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let threshold = (total_annotations as f64 * 0.001).max(10.0);

    let mut findings = Vec::new();
    for (category_id, count) in &category_counts {
        if (*count as f64) < threshold {
            // Dangling category ids are covered by 'relation_unmatched_category'.
            if let Some(category) = categories_by_id.get(category_id) {
                findings.push(format!(
                    "Severe class imbalance: Category '{}' has only {} annotations.",
                    category.name, count
                ));
            }
        }
    }
    findings
}
