#![allow(dead_code)]

use annolint::schema::{Annotation, Category, Document, Image, Info, License, Segmentation};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_info() -> impl Strategy<Value = Info> {
    (
        proptest::option::of(1990u32..2030),
        proptest::option::of("[a-z0-9.]{1,8}"),
        proptest::option::of("[A-Za-z ]{0,24}"),
    )
        .prop_map(|(year, version, description)| Info {
            year,
            version,
            description,
            ..Default::default()
        })
}

pub fn arb_license() -> impl Strategy<Value = License> {
    (
        0u64..100,
        "[A-Za-z0-9 ]{1,12}",
        proptest::option::of("[a-z]{3,10}"),
    )
        .prop_map(|(id, name, url)| License {
            id,
            name,
            url: url.map(|u| format!("https://{u}.example")),
        })
}

pub fn arb_image() -> impl Strategy<Value = Image> {
    (
        0u64..1000,
        "[a-z0-9_]{1,12}",
        1u32..4000,
        1u32..4000,
        proptest::option::of(0u64..100),
    )
        .prop_map(|(id, stem, width, height, license)| {
            let mut image = Image::new(id, format!("{stem}.jpg"), width, height);
            image.license = license;
            image
        })
}

pub fn arb_segmentation() -> impl Strategy<Value = Segmentation> {
    prop::collection::vec(prop::collection::vec(0.0f64..512.0, 0..8), 0..3)
        .prop_map(Segmentation::Polygons)
}

pub fn arb_annotation() -> impl Strategy<Value = Annotation> {
    (
        0u64..10_000,
        0u64..1000,
        0u64..100,
        (0.0f64..512.0, 0.0f64..512.0, 0.0f64..256.0, 0.0f64..256.0),
        0.0f64..65_536.0,
        0u8..=1,
        arb_segmentation(),
    )
        .prop_map(
            |(id, image_id, category_id, (x, y, w, h), area, iscrowd, segmentation)| Annotation {
                id,
                image_id,
                category_id,
                segmentation,
                area,
                bbox: [x, y, w, h],
                iscrowd,
            },
        )
}

pub fn arb_category() -> impl Strategy<Value = Category> {
    (
        0u64..100,
        "[a-z]{1,10}",
        proptest::option::of("[a-z]{1,10}"),
    )
        .prop_map(|(id, name, supercategory)| Category {
            id,
            name,
            supercategory,
        })
}

pub fn arb_document(
    max_images: usize,
    max_categories: usize,
    max_annotations: usize,
) -> impl Strategy<Value = Document> {
    (
        arb_info(),
        prop::collection::vec(arb_license(), 0..=2),
        prop::collection::vec(arb_image(), 0..=max_images),
        prop::collection::vec(arb_annotation(), 0..=max_annotations),
        prop::collection::vec(arb_category(), 0..=max_categories),
    )
        .prop_map(|(info, licenses, images, annotations, categories)| Document {
            info,
            licenses,
            images,
            annotations,
            categories,
        })
}
