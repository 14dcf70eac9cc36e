// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use super::{
    buckets::SizeBuckets,
    ratio::{RatioError, anchor_ratio},
};
use crate::record::AnnotationRecord;
use itertools::Itertools;
use log::{info, warn};
use serde::Serialize;
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashSet},
    fmt,
};

/// Index-aligned width and height series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dimensions {
    widths: Vec<f64>,
    heights: Vec<f64>,
}

impl Dimensions {
    fn push(&mut self, width: f64, height: f64) {
        self.widths.push(width);
        self.heights.push(height);
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// `(width, height)` pairs in insertion order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.widths.iter().copied().zip(self.heights.iter().copied())
    }
}

/// A box that was left out of the anchor-ratio series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioSkip {
    pub image_id: String,
    /// Position of the box within its image.
    pub box_index: usize,
    pub category: String,
    pub width: f64,
    pub height: f64,
    pub reason: RatioError,
}

/// Data-quality findings collected during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Boxes excluded from the anchor ratios only.
    pub ratio_skips: Vec<RatioSkip>,
    /// Images whose width or height is not a positive finite number.
    pub malformed_images: Vec<String>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.ratio_skips.is_empty() && self.malformed_images.is_empty()
    }
}

/// Single-pass accumulator over annotation records.
///
/// Feed records in dataset order with [`push`](Self::push) and freeze the
/// aggregates with [`finish`](Self::finish), or do both with
/// [`ingest`](Self::ingest). Each analysis run owns a fresh aggregator.
///
/// ```rust
/// use detstat::{AnnotationRecord, BoundingBox, StatisticsAggregator};
///
/// let records = vec![
///     AnnotationRecord::new("a.jpg", 100.0, 100.0)
///         .with_box(BoundingBox::new(0.0, 0.0, 10.0, 10.0, "cat")),
/// ];
/// let results = StatisticsAggregator::ingest(&records);
/// assert_eq!(results.anchor_ratios(), &[1]);
/// ```
#[derive(Debug, Default)]
pub struct StatisticsAggregator {
    image_dimensions: Dimensions,
    box_dimensions: Dimensions,
    category_box_dimensions: BTreeMap<String, Dimensions>,
    anchor_ratios: Vec<u64>,
    category_occurrences: Vec<String>,
    category_image_presence: BTreeMap<String, usize>,
    image_category_diversity: BTreeMap<usize, usize>,
    boxes_per_image: Vec<usize>,
    diagnostics: Diagnostics,
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the whole pass over `records` and return the frozen aggregates.
    pub fn ingest<I>(records: I) -> AggregateResults
    where
        I: IntoIterator,
        I::Item: Borrow<AnnotationRecord>,
    {
        let mut aggregator = Self::new();
        for record in records {
            aggregator.push(record.borrow());
        }
        aggregator.finish()
    }

    /// Fold one image into the running aggregates.
    pub fn push(&mut self, record: &AnnotationRecord) {
        if !record.has_valid_size() {
            warn!(
                "{}: image has invalid size {}x{}",
                record.image_id, record.width, record.height
            );
            self.diagnostics
                .malformed_images
                .push(record.image_id.clone());
        }
        self.image_dimensions.push(record.width, record.height);

        // Categories already credited to this image in category_image_presence.
        let mut counted: HashSet<&str> = HashSet::new();

        for (box_index, bbox) in record.boxes.iter().enumerate() {
            let (width, height) = (bbox.width(), bbox.height());

            self.box_dimensions.push(width, height);
            self.category_occurrences.push(bbox.category.clone());
            self.category_box_dimensions
                .entry(bbox.category.clone())
                .or_default()
                .push(width, height);

            if counted.insert(bbox.category.as_str()) {
                *self
                    .category_image_presence
                    .entry(bbox.category.clone())
                    .or_insert(0) += 1;
            }

            match anchor_ratio(width, height) {
                Ok(ratio) => self.anchor_ratios.push(ratio),
                Err(reason) => {
                    warn!(
                        "{}: box {} ({}) has {} ({}x{}), skipping anchor ratio",
                        record.image_id, box_index, bbox.category, reason, width, height
                    );
                    self.diagnostics.ratio_skips.push(RatioSkip {
                        image_id: record.image_id.clone(),
                        box_index,
                        category: bbox.category.clone(),
                        width,
                        height,
                        reason,
                    });
                }
            }
        }

        *self
            .image_category_diversity
            .entry(counted.len())
            .or_insert(0) += 1;
        self.boxes_per_image.push(record.box_count());
    }

    /// Derive the size buckets and freeze every aggregate.
    pub fn finish(self) -> AggregateResults {
        let size_buckets =
            SizeBuckets::from_dimensions(self.box_dimensions.widths(), self.box_dimensions.heights());

        info!(
            "Aggregated {} images, {} boxes, {} categories",
            self.image_dimensions.len(),
            self.box_dimensions.len(),
            self.category_image_presence.len()
        );

        AggregateResults {
            image_dimensions: self.image_dimensions,
            box_dimensions: self.box_dimensions,
            category_box_dimensions: self.category_box_dimensions,
            anchor_ratios: self.anchor_ratios,
            category_occurrences: self.category_occurrences,
            category_image_presence: self.category_image_presence,
            image_category_diversity: self.image_category_diversity,
            boxes_per_image: self.boxes_per_image,
            size_buckets,
            diagnostics: self.diagnostics,
        }
    }
}

/// Frozen output of one aggregation pass.
///
/// Category-keyed maps iterate in label order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResults {
    image_dimensions: Dimensions,
    box_dimensions: Dimensions,
    category_box_dimensions: BTreeMap<String, Dimensions>,
    anchor_ratios: Vec<u64>,
    category_occurrences: Vec<String>,
    category_image_presence: BTreeMap<String, usize>,
    image_category_diversity: BTreeMap<usize, usize>,
    boxes_per_image: Vec<usize>,
    size_buckets: SizeBuckets,
    diagnostics: Diagnostics,
}

impl AggregateResults {
    pub fn image_dimensions(&self) -> &Dimensions {
        &self.image_dimensions
    }

    /// Box sizes flattened across all images.
    pub fn box_dimensions(&self) -> &Dimensions {
        &self.box_dimensions
    }

    pub fn category_box_dimensions(&self) -> &BTreeMap<String, Dimensions> {
        &self.category_box_dimensions
    }

    /// One ratio per box with positive finite sides.
    pub fn anchor_ratios(&self) -> &[u64] {
        &self.anchor_ratios
    }

    /// One label per box, in box order.
    pub fn category_occurrences(&self) -> &[String] {
        &self.category_occurrences
    }

    /// Category → number of images holding at least one box of it.
    pub fn category_image_presence(&self) -> &BTreeMap<String, usize> {
        &self.category_image_presence
    }

    /// Distinct-category count → number of images with exactly that many.
    pub fn image_category_diversity(&self) -> &BTreeMap<usize, usize> {
        &self.image_category_diversity
    }

    pub fn boxes_per_image(&self) -> &[usize] {
        &self.boxes_per_image
    }

    pub fn size_buckets(&self) -> &SizeBuckets {
        &self.size_buckets
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn image_count(&self) -> usize {
        self.image_dimensions.len()
    }

    pub fn box_count(&self) -> usize {
        self.box_dimensions.len()
    }

    /// Discovered category labels in label order.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.category_image_presence.keys().map(String::as_str)
    }

    /// Boxes per category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.category_occurrences
            .iter()
            .cloned()
            .counts()
            .into_iter()
            .collect()
    }

    /// Share of all boxes per category; empty when there are no boxes.
    pub fn category_proportions(&self) -> BTreeMap<String, f64> {
        let total = self.category_occurrences.len() as f64;
        self.category_counts()
            .into_iter()
            .map(|(category, count)| (category, count as f64 / total))
            .collect()
    }

    /// Box count → number of images with that many boxes.
    pub fn boxes_per_image_histogram(&self) -> BTreeMap<usize, usize> {
        self.boxes_per_image
            .iter()
            .copied()
            .counts()
            .into_iter()
            .collect()
    }

    /// Anchor ratio → number of boxes with that ratio.
    pub fn anchor_ratio_histogram(&self) -> BTreeMap<u64, usize> {
        self.anchor_ratios
            .iter()
            .copied()
            .counts()
            .into_iter()
            .collect()
    }
}

impl fmt::Display for AggregateResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "╔══════════════════════════════════════════════════════════════╗"
        )?;
        writeln!(
            f,
            "║                     DATASET STATISTICS                       ║"
        )?;
        writeln!(
            f,
            "╠══════════════════════════════════════════════════════════════╣"
        )?;
        writeln!(f, "║ Images:      {}", self.image_count())?;
        writeln!(f, "║ Boxes:       {}", self.box_count())?;
        writeln!(
            f,
            "║ Categories:  {}",
            self.categories().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "╠══════════════════════════════════════════════════════════════╣"
        )?;
        writeln!(f, "║ Boxes per category (images):")?;
        for (category, count) in self.category_counts() {
            let images = self
                .category_image_presence
                .get(&category)
                .copied()
                .unwrap_or(0);
            writeln!(f, "║   {:<20} {:>8} ({})", category, count, images)?;
        }
        writeln!(f, "║ Box sizes:")?;
        for (bucket, count) in self.size_buckets.iter() {
            writeln!(f, "║   {:<20} {:>8}", bucket.label(), count)?;
        }
        writeln!(f, "║ Anchor ratios:")?;
        for (ratio, count) in self.anchor_ratio_histogram() {
            writeln!(f, "║   {:<20} {:>8}", format!("1:{}", ratio), count)?;
        }
        writeln!(
            f,
            "╠══════════════════════════════════════════════════════════════╣"
        )?;
        writeln!(
            f,
            "║ Skipped ratios:   {}",
            self.diagnostics.ratio_skips.len()
        )?;
        writeln!(
            f,
            "║ Malformed images: {}",
            self.diagnostics.malformed_images.len()
        )?;
        writeln!(
            f,
            "╚══════════════════════════════════════════════════════════════╝"
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BoundingBox;
    use crate::stats::RatioError;

    /// Two images: A (100x100) with two "cat" boxes, one of zero width, and
    /// B (50x50) with a single "dog".
    fn two_image_dataset() -> Vec<AnnotationRecord> {
        vec![
            AnnotationRecord::new("a.jpg", 100.0, 100.0)
                .with_box(BoundingBox::new(0.0, 0.0, 10.0, 10.0, "cat"))
                .with_box(BoundingBox::new(0.0, 0.0, 0.0, 20.0, "cat")),
            AnnotationRecord::new("b.jpg", 50.0, 50.0)
                .with_box(BoundingBox::new(0.0, 0.0, 5.0, 10.0, "dog")),
        ]
    }

    #[test]
    fn test_two_image_scenario() {
        let results = StatisticsAggregator::ingest(&two_image_dataset());

        assert_eq!(results.image_dimensions().widths(), &[100.0, 50.0]);
        assert_eq!(results.image_dimensions().heights(), &[100.0, 50.0]);
        assert_eq!(results.box_dimensions().widths(), &[10.0, 0.0, 5.0]);
        assert_eq!(results.box_dimensions().heights(), &[10.0, 20.0, 10.0]);
        assert_eq!(results.anchor_ratios(), &[1, 2]);

        let presence = results.category_image_presence();
        assert_eq!(presence.get("cat"), Some(&1));
        assert_eq!(presence.get("dog"), Some(&1));

        let counts = results.category_counts();
        assert_eq!(counts.get("cat"), Some(&2));
        assert_eq!(counts.get("dog"), Some(&1));

        assert_eq!(
            *results.size_buckets(),
            SizeBuckets {
                small: 3,
                medium: 0,
                large: 0
            }
        );
        assert_eq!(
            results.image_category_diversity(),
            &BTreeMap::from([(1, 2)])
        );
        assert_eq!(results.boxes_per_image(), &[2, 1]);
    }

    #[test]
    fn test_zero_width_box_still_counts_elsewhere() {
        let results = StatisticsAggregator::ingest(&two_image_dataset());

        let skips = &results.diagnostics().ratio_skips;
        assert_eq!(skips.len(), 1);
        assert_eq!(skips[0].image_id, "a.jpg");
        assert_eq!(skips[0].box_index, 1);
        assert_eq!(skips[0].reason, RatioError::ZeroDimension);

        assert_eq!(results.category_occurrences().len(), 3);
        let cat = &results.category_box_dimensions()["cat"];
        assert_eq!(cat.widths(), &[10.0, 0.0]);
        assert_eq!(cat.heights(), &[10.0, 20.0]);
    }

    #[test]
    fn test_empty_input() {
        let results = StatisticsAggregator::ingest(Vec::<AnnotationRecord>::new());

        assert_eq!(results.image_count(), 0);
        assert_eq!(results.box_count(), 0);
        assert!(results.anchor_ratios().is_empty());
        assert!(results.category_occurrences().is_empty());
        assert!(results.category_image_presence().is_empty());
        assert!(results.image_category_diversity().is_empty());
        assert!(results.boxes_per_image().is_empty());
        assert_eq!(results.size_buckets().total(), 0);
        assert!(results.category_proportions().is_empty());
        assert_eq!(results.categories().count(), 0);
        assert!(results.diagnostics().is_clean());
    }

    #[test]
    fn test_presence_counts_images_not_boxes() {
        let mut record = AnnotationRecord::new("crowd.jpg", 640.0, 480.0);
        for i in 0..5 {
            let x = i as f64 * 20.0;
            record = record.with_box(BoundingBox::new(x, 0.0, x + 10.0, 30.0, "person"));
        }
        let record = record.with_box(BoundingBox::new(0.0, 0.0, 100.0, 100.0, "car"));
        let other = AnnotationRecord::new("street.jpg", 640.0, 480.0)
            .with_box(BoundingBox::new(0.0, 0.0, 10.0, 10.0, "person"));

        let results = StatisticsAggregator::ingest([record, other]);

        assert_eq!(results.category_image_presence()["person"], 2);
        assert_eq!(results.category_image_presence()["car"], 1);
        assert_eq!(results.category_counts()["person"], 6);
        assert_eq!(
            results.image_category_diversity(),
            &BTreeMap::from([(1, 1), (2, 1)])
        );
    }

    #[test]
    fn test_images_without_boxes() {
        let records = vec![
            AnnotationRecord::new("empty1.jpg", 320.0, 240.0),
            AnnotationRecord::new("empty2.jpg", 320.0, 240.0),
            AnnotationRecord::new("one.jpg", 320.0, 240.0)
                .with_box(BoundingBox::new(1.0, 1.0, 40.0, 41.0, "bird")),
        ];
        let results = StatisticsAggregator::ingest(&records);

        assert_eq!(results.boxes_per_image(), &[0, 0, 1]);
        assert_eq!(
            results.image_category_diversity(),
            &BTreeMap::from([(0, 2), (1, 1)])
        );
        assert_eq!(
            results.boxes_per_image_histogram(),
            BTreeMap::from([(0, 2), (1, 1)])
        );
    }

    #[test]
    fn test_malformed_image_size_is_reported_not_dropped() {
        let records = vec![
            AnnotationRecord::new("nosize.jpg", 0.0, 0.0)
                .with_box(BoundingBox::new(0.0, 0.0, 40.0, 40.0, "cat")),
            AnnotationRecord::new("ok.jpg", 10.0, 10.0),
        ];
        let results = StatisticsAggregator::ingest(&records);

        assert_eq!(results.image_dimensions().widths(), &[0.0, 10.0]);
        assert_eq!(results.diagnostics().malformed_images, vec!["nosize.jpg"]);
        assert_eq!(results.size_buckets().medium, 1);
    }

    #[test]
    fn test_negative_box_propagates() {
        let records = vec![
            AnnotationRecord::new("flip.jpg", 100.0, 100.0)
                .with_box(BoundingBox::new(50.0, 10.0, 20.0, 60.0, "kite")),
        ];
        let results = StatisticsAggregator::ingest(&records);

        assert_eq!(results.box_dimensions().widths(), &[-30.0]);
        assert_eq!(results.box_dimensions().heights(), &[50.0]);
        assert!(results.anchor_ratios().is_empty());
        assert_eq!(
            results.diagnostics().ratio_skips[0].reason,
            RatioError::NegativeDimension
        );
        assert_eq!(results.size_buckets().small, 1);
    }

    #[test]
    fn test_derived_histograms() {
        let records = vec![
            AnnotationRecord::new("a.jpg", 100.0, 100.0)
                .with_box(BoundingBox::new(0.0, 0.0, 10.0, 10.0, "a"))
                .with_box(BoundingBox::new(0.0, 0.0, 10.0, 30.0, "b"))
                .with_box(BoundingBox::new(0.0, 0.0, 30.0, 10.0, "b")),
            AnnotationRecord::new("b.jpg", 100.0, 100.0)
                .with_box(BoundingBox::new(0.0, 0.0, 20.0, 20.0, "a")),
        ];
        let results = StatisticsAggregator::ingest(&records);

        assert_eq!(
            results.anchor_ratio_histogram(),
            BTreeMap::from([(1, 2), (3, 2)])
        );
        assert_eq!(
            results.boxes_per_image_histogram(),
            BTreeMap::from([(1, 1), (3, 1)])
        );

        let proportions = results.category_proportions();
        assert_eq!(proportions["a"], 0.5);
        assert_eq!(proportions["b"], 0.5);
    }

    #[test]
    fn test_incremental_push_matches_ingest() {
        let records = two_image_dataset();
        let mut aggregator = StatisticsAggregator::new();
        for record in &records {
            aggregator.push(record);
        }
        assert_eq!(aggregator.finish(), StatisticsAggregator::ingest(&records));
    }

    #[test]
    fn test_summary_display() {
        let results = StatisticsAggregator::ingest(&two_image_dataset());
        let summary = results.to_string();

        assert!(summary.contains("Images:      2"));
        assert!(summary.contains("Boxes:       3"));
        assert!(summary.contains("Categories:  cat, dog"));
        assert!(summary.contains("Skipped ratios:   1"));
    }

    #[test]
    fn test_results_serialize() {
        let results = StatisticsAggregator::ingest(&two_image_dataset());
        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json["anchor_ratios"], serde_json::json!([1, 2]));
        assert_eq!(json["size_buckets"]["small"], 3);
        assert_eq!(json["category_image_presence"]["cat"], 1);
        assert_eq!(json["diagnostics"]["ratio_skips"][0]["reason"], "zero_dimension");
    }
}
