//! Report generation.

use fake::{Fake, faker::lorem::en::Words};
use incidents::models::REPORT_WORD_RANGE;
use incidents::{
    Asset, GeoPoint, ModelError, NewReport, ObjectId, Report, ReportLabel, ReportSource,
    ReportStatus,
};
use rand::Rng;

use super::random_uuid;
use crate::config::{BoundingBox, Region};

/// Citizens and analysts a report can be attributed to.
///
/// Construction fails when there are no citizens, since every report needs a
/// submitter.
#[derive(Debug, Clone, Copy)]
pub struct ReportAuthors<'a> {
    citizens: &'a [ObjectId],
    analysts: &'a [ObjectId],
}

impl<'a> ReportAuthors<'a> {
    pub fn new(citizens: &'a [ObjectId], analysts: &'a [ObjectId]) -> Option<Self> {
        if citizens.is_empty() {
            None
        } else {
            Some(Self { citizens, analysts })
        }
    }

    fn pick_citizen(&self, rng: &mut impl Rng) -> ObjectId {
        self.citizens[rng.gen_range(0..self.citizens.len())]
    }

    fn pick_analyst(&self, rng: &mut impl Rng) -> Option<ObjectId> {
        if self.analysts.is_empty() {
            None
        } else {
            Some(self.analysts[rng.gen_range(0..self.analysts.len())])
        }
    }
}

/// Configuration for report generation.
#[derive(Debug, Clone)]
pub struct ReportGenConfig {
    /// Area report locations are drawn from.
    pub region: BoundingBox,
    /// Probability that a report carries a media attachment.
    pub media_rate: f64,
    /// Decimal places kept on each coordinate.
    pub coordinate_decimals: u32,
}

impl Default for ReportGenConfig {
    fn default() -> Self {
        Self {
            region: Region::SERVICE_AREA,
            media_rate: 0.6,
            coordinate_decimals: 4,
        }
    }
}

pub struct ReportGenerator {
    config: ReportGenConfig,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            config: ReportGenConfig::default(),
        }
    }

    pub fn with_config(config: ReportGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single report. Status, source, label, media, and
    /// confidence are drawn independently.
    pub fn generate(
        &self,
        authors: &ReportAuthors<'_>,
        rng: &mut impl Rng,
    ) -> Result<Report, ModelError> {
        let status = ReportStatus::ALL[rng.gen_range(0..ReportStatus::ALL.len())];
        let has_media = rng.gen_bool(self.config.media_rate);

        let (lat, lon) = self.config.region.random_point(rng);
        let location = GeoPoint::new(
            round_to(lon, self.config.coordinate_decimals),
            round_to(lat, self.config.coordinate_decimals),
        )?;

        let verified_by = match status {
            ReportStatus::Verified => authors.pick_analyst(rng),
            _ => None,
        };

        Report::new_in(
            NewReport {
                text: generate_text(rng),
                location,
                source: ReportSource::ALL[rng.gen_range(0..ReportSource::ALL.len())],
                media: has_media.then(|| generate_media(rng)),
                status,
                label: ReportLabel::ALL[rng.gen_range(0..ReportLabel::ALL.len())],
                confidence: rng.gen_range(30..=99u32) as f64 / 100.0,
                submitted_by: authors.pick_citizen(rng),
                verified_by,
            },
            &self.config.region,
        )
    }

    /// Generates multiple reports.
    pub fn generate_batch(
        &self,
        count: usize,
        authors: &ReportAuthors<'_>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Report>, ModelError> {
        (0..count).map(|_| self.generate(authors, rng)).collect()
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A capitalised lorem sentence of 5 to 15 words.
fn generate_text(rng: &mut impl Rng) -> String {
    let range = *REPORT_WORD_RANGE.start()..*REPORT_WORD_RANGE.end() + 1;
    let words: Vec<String> = Words(range).fake_with_rng(rng);

    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get(..1) {
        let upper = first.to_uppercase();
        sentence.replace_range(..1, &upper);
    }
    sentence.push('.');
    sentence
}

fn generate_media(rng: &mut impl Rng) -> Asset {
    Asset {
        public_id: random_uuid(rng).to_string(),
        url: format!(
            "https://loremflickr.com/640/480/nature?lock={}",
            rng.gen_range(1..1_000_000u32)
        ),
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
