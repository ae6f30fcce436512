//! Documents stored in the `users` and `reports` collections.
//!
//! Both document types are built through validating constructors
//! ([`User::new`], [`Report::new`]) so a value that exists in memory already
//! satisfies the field constraints the application relies on.

use std::fmt;
use std::ops::RangeInclusive;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const USERS_COLLECTION: &str = "users";
pub const REPORTS_COLLECTION: &str = "reports";

/// Inclusive bounds on a report's classifier confidence.
pub const CONFIDENCE_RANGE: RangeInclusive<f64> = 0.30..=0.99;

/// Inclusive bounds on the number of words in a report's text.
pub const REPORT_WORD_RANGE: RangeInclusive<usize> = 5..=15;

pub const MAX_CREDIBILITY_SCORE: i32 = 100;

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random `(lat, lon)` within the box, edges included.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..=self.max_lat);
        let lon = rng.gen_range(self.min_lon..=self.max_lon);
        (lat, lon)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Fails with the first coordinate of `point` that lies outside the box.
    pub fn check(&self, point: &GeoPoint) -> Result<(), ModelError> {
        if !(self.min_lon..=self.max_lon).contains(&point.lon()) {
            return Err(ModelError::OutOfRange {
                field: "longitude",
                value: point.lon(),
                min: self.min_lon,
                max: self.max_lon,
            });
        }
        if !(self.min_lat..=self.max_lat).contains(&point.lat()) {
            return Err(ModelError::OutOfRange {
                field: "latitude",
                value: point.lat(),
                min: self.min_lat,
                max: self.max_lat,
            });
        }
        Ok(())
    }
}

/// Area reports are accepted from: Chennai and the surrounding coast.
pub const SERVICE_AREA: BoundingBox = BoundingBox::new(12.0, 79.0, 14.0, 81.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Analyst,
    Citizen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Analyst => "Analyst",
            Role::Citizen => "Citizen",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded asset as stored by the media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub public_id: String,
    pub url: String,
}

impl Asset {
    fn validate(&self) -> Result<(), ModelError> {
        if self.public_id.is_empty() {
            return Err(ModelError::EmptyField("public_id"));
        }
        if self.url.is_empty() {
            return Err(ModelError::EmptyField("url"));
        }
        Ok(())
    }
}

/// Unvalidated user fields.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub credibility_score: i32,
    pub avatar: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    firstname: String,
    lastname: String,
    email: String,
    phone: String,
    password: String,
    role: Role,
    is_verified: i32,
    credibility_score: i32,
    user_avatar: Asset,
}

impl User {
    pub fn new(new: NewUser) -> Result<Self, ModelError> {
        if new.firstname.trim().is_empty() {
            return Err(ModelError::EmptyField("firstname"));
        }
        if new.lastname.trim().is_empty() {
            return Err(ModelError::EmptyField("lastname"));
        }
        if new.password_hash.is_empty() {
            return Err(ModelError::EmptyField("password"));
        }

        let email = new.email.to_lowercase();
        if !is_plausible_email(&email) {
            return Err(ModelError::InvalidEmail(new.email));
        }
        if !is_valid_phone(&new.phone) {
            return Err(ModelError::InvalidPhone(new.phone));
        }
        if !(0..=MAX_CREDIBILITY_SCORE).contains(&new.credibility_score) {
            return Err(ModelError::OutOfRange {
                field: "credibilityScore",
                value: new.credibility_score as f64,
                min: 0.0,
                max: MAX_CREDIBILITY_SCORE as f64,
            });
        }
        new.avatar.validate()?;

        Ok(Self {
            id: None,
            firstname: new.firstname,
            lastname: new.lastname,
            email,
            phone: new.phone,
            password: new.password_hash,
            role: new.role,
            is_verified: i32::from(new.is_verified),
            credibility_score: new.credibility_score,
            user_avatar: new.avatar,
        })
    }

    /// Store-assigned identifier, `None` until inserted.
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn password_hash(&self) -> &str {
        &self.password
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Stored as 0/1.
    pub fn is_verified(&self) -> i32 {
        self.is_verified
    }

    pub fn credibility_score(&self) -> i32 {
        self.credibility_score
    }

    pub fn avatar(&self) -> &Asset {
        &self.user_avatar
    }
}

/// Ten ASCII digits, the first one of 6, 7, 8 or 9.
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 10
        && matches!(bytes[0], b'6'..=b'9')
        && bytes.iter().all(|b| b.is_ascii_digit())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

/// GeoJSON point, coordinates stored as `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    kind: GeometryType,
    coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Result<Self, ModelError> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ModelError::OutOfRange {
                field: "longitude",
                value: lon,
                min: -180.0,
                max: 180.0,
            });
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ModelError::OutOfRange {
                field: "latitude",
                value: lat,
                min: -90.0,
                max: 90.0,
            });
        }
        Ok(Self {
            kind: GeometryType::Point,
            coordinates: [lon, lat],
        })
    }

    pub fn lon(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn coordinates(&self) -> [f64; 2] {
        self.coordinates
    }
}

/// Channel a report arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Citizen,
    Twitter,
    Facebook,
    Whatsapp,
}

impl ReportSource {
    pub const ALL: [ReportSource; 4] = [
        ReportSource::Citizen,
        ReportSource::Twitter,
        ReportSource::Facebook,
        ReportSource::Whatsapp,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    #[serde(rename = "Needs Verification")]
    NeedsVerification,
    Verified,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Pending,
        ReportStatus::NeedsVerification,
        ReportStatus::Verified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::NeedsVerification => "Needs Verification",
            ReportStatus::Verified => "Verified",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier label attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLabel {
    Relevant,
    Irrelevant,
    Panic,
}

impl ReportLabel {
    pub const ALL: [ReportLabel; 3] = [
        ReportLabel::Relevant,
        ReportLabel::Irrelevant,
        ReportLabel::Panic,
    ];
}

/// Unvalidated report fields.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub text: String,
    pub location: GeoPoint,
    pub source: ReportSource,
    pub media: Option<Asset>,
    pub status: ReportStatus,
    pub label: ReportLabel,
    pub confidence: f64,
    pub submitted_by: ObjectId,
    pub verified_by: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    text: String,
    location: GeoPoint,
    source: ReportSource,
    #[serde(with = "optional_asset", default)]
    media: Option<Asset>,
    status: ReportStatus,
    label: ReportLabel,
    confidence: f64,
    submitted_by: ObjectId,
    verified_by: Option<ObjectId>,
}

impl Report {
    /// Validates a report located inside [`SERVICE_AREA`].
    pub fn new(new: NewReport) -> Result<Self, ModelError> {
        Self::new_in(new, &SERVICE_AREA)
    }

    /// Validates a report whose location must fall inside `region`.
    pub fn new_in(new: NewReport, region: &BoundingBox) -> Result<Self, ModelError> {
        region.check(&new.location)?;

        let words = new.text.split_whitespace().count();
        if !REPORT_WORD_RANGE.contains(&words) {
            return Err(ModelError::WordCount(words));
        }
        if !CONFIDENCE_RANGE.contains(&new.confidence) {
            return Err(ModelError::OutOfRange {
                field: "confidence",
                value: new.confidence,
                min: *CONFIDENCE_RANGE.start(),
                max: *CONFIDENCE_RANGE.end(),
            });
        }
        if !has_decimals(new.confidence, 2) {
            return Err(ModelError::Precision {
                field: "confidence",
                value: new.confidence,
                decimals: 2,
            });
        }
        if new.verified_by.is_some() && new.status != ReportStatus::Verified {
            return Err(ModelError::UnexpectedVerifier(new.status));
        }
        if let Some(media) = &new.media {
            media.validate()?;
        }

        Ok(Self {
            id: None,
            text: new.text,
            location: new.location,
            source: new.source,
            media: new.media,
            status: new.status,
            label: new.label,
            confidence: new.confidence,
            submitted_by: new.submitted_by,
            verified_by: new.verified_by,
        })
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> &GeoPoint {
        &self.location
    }

    pub fn source(&self) -> ReportSource {
        self.source
    }

    pub fn media(&self) -> Option<&Asset> {
        self.media.as_ref()
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn label(&self) -> ReportLabel {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn submitted_by(&self) -> ObjectId {
        self.submitted_by
    }

    pub fn verified_by(&self) -> Option<ObjectId> {
        self.verified_by
    }
}

/// True when `value` has at most `decimals` digits after the point.
pub fn has_decimals(value: f64, decimals: u32) -> bool {
    let scaled = value * 10f64.powi(decimals as i32);
    (scaled.round() - scaled).abs() < 1e-6
}

/// Missing media is stored as an empty document rather than `null`.
mod optional_asset {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Asset;

    pub fn serialize<S: Serializer>(asset: &Option<Asset>, serializer: S) -> Result<S::Ok, S::Error> {
        match asset {
            Some(asset) => asset.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    #[derive(Deserialize)]
    struct PartialAsset {
        public_id: Option<String>,
        url: Option<String>,
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Asset>, D::Error> {
        let partial = Option::<PartialAsset>::deserialize(deserializer)?;
        Ok(match partial {
            Some(PartialAsset {
                public_id: Some(public_id),
                url: Some(url),
            }) => Some(Asset { public_id, url }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            firstname: "Asha".to_string(),
            lastname: "Raman".to_string(),
            email: "Asha.Raman@Example.com".to_string(),
            phone: "9876543210".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
            role: Role::Citizen,
            is_verified: true,
            credibility_score: 42,
            avatar: Asset {
                public_id: "c0ffee00-0000-4000-8000-000000000000".to_string(),
                url: "https://avatars.githubusercontent.com/u/1".to_string(),
            },
        }
    }

    fn new_report() -> NewReport {
        NewReport {
            text: "Water level rising fast near the old bridge.".to_string(),
            location: GeoPoint::new(80.2707, 13.0827).unwrap(),
            source: ReportSource::Twitter,
            media: None,
            status: ReportStatus::Pending,
            label: ReportLabel::Relevant,
            confidence: 0.75,
            submitted_by: ObjectId::new(),
            verified_by: None,
        }
    }

    #[test]
    fn test_user_email_lowercased() {
        let user = User::new(new_user()).unwrap();
        assert_eq!(user.email(), "asha.raman@example.com");
        assert_eq!(user.is_verified(), 1);
        assert!(user.id().is_none());
    }

    #[test]
    fn test_user_rejects_bad_phone() {
        for phone in ["5876543210", "987654321", "98765432100", "98765x3210"] {
            let mut new = new_user();
            new.phone = phone.to_string();
            assert!(matches!(User::new(new), Err(ModelError::InvalidPhone(_))), "{phone}");
        }
    }

    #[test]
    fn test_user_rejects_out_of_range_score() {
        let mut new = new_user();
        new.credibility_score = 101;
        assert!(matches!(User::new(new), Err(ModelError::OutOfRange { .. })));

        let mut new = new_user();
        new.credibility_score = -1;
        assert!(matches!(User::new(new), Err(ModelError::OutOfRange { .. })));
    }

    #[test]
    fn test_user_rejects_bad_email_and_empty_names() {
        let mut new = new_user();
        new.email = "not-an-email".to_string();
        assert!(matches!(User::new(new), Err(ModelError::InvalidEmail(_))));

        let mut new = new_user();
        new.firstname = "  ".to_string();
        assert!(matches!(User::new(new), Err(ModelError::EmptyField("firstname"))));
    }

    #[test]
    fn test_user_document_field_names() {
        let user = User::new(new_user()).unwrap();
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("_id").is_none());
        assert_eq!(json["role"], "Citizen");
        assert_eq!(json["isVerified"], 1);
        assert_eq!(json["credibilityScore"], 42);
        assert!(json["userAvatar"]["public_id"].is_string());
        assert!(json["password"].is_string());
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("6000000000"));
        assert!(is_valid_phone("9999999999"));
        assert!(!is_valid_phone("0999999999"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_report_word_count() {
        let mut new = new_report();
        new.text = "Too short.".to_string();
        assert!(matches!(Report::new(new), Err(ModelError::WordCount(2))));

        let mut new = new_report();
        new.text = vec!["word"; 16].join(" ");
        assert!(matches!(Report::new(new), Err(ModelError::WordCount(16))));
    }

    #[test]
    fn test_report_confidence_bounds_and_precision() {
        let mut new = new_report();
        new.confidence = 0.29;
        assert!(matches!(Report::new(new), Err(ModelError::OutOfRange { .. })));

        let mut new = new_report();
        new.confidence = 0.555;
        assert!(matches!(Report::new(new), Err(ModelError::Precision { .. })));

        let mut new = new_report();
        new.confidence = 0.99;
        assert!(Report::new(new).is_ok());
    }

    #[test]
    fn test_report_verifier_requires_verified_status() {
        let mut new = new_report();
        new.verified_by = Some(ObjectId::new());
        assert!(matches!(
            Report::new(new),
            Err(ModelError::UnexpectedVerifier(ReportStatus::Pending))
        ));

        let mut new = new_report();
        new.status = ReportStatus::Verified;
        new.verified_by = Some(ObjectId::new());
        assert!(Report::new(new).is_ok());
    }

    #[test]
    fn test_report_document_shape() {
        let report = Report::new(new_report()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["location"]["coordinates"][0], 80.2707);
        assert_eq!(json["source"], "twitter");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["label"], "relevant");
        assert_eq!(json["media"], serde_json::json!({}));
        assert!(json["verifiedBy"].is_null());
        assert!(json.get("submittedBy").is_some());
    }

    #[test]
    fn test_needs_verification_serialization() {
        let json = serde_json::to_value(ReportStatus::NeedsVerification).unwrap();
        assert_eq!(json, "Needs Verification");
    }

    #[test]
    fn test_media_round_trip_through_empty_document() {
        let mut new = new_report();
        new.media = Some(Asset {
            public_id: "abc".to_string(),
            url: "https://loremflickr.com/640/480/nature?lock=1".to_string(),
        });
        let with_media = Report::new(new).unwrap();
        let without_media = Report::new(new_report()).unwrap();

        for report in [with_media, without_media] {
            let json = serde_json::to_string(&report).unwrap();
            let back: Report = serde_json::from_str(&json).unwrap();
            assert_eq!(back.media(), report.media());
        }
    }

    #[test]
    fn test_report_location_must_be_in_service_area() {
        for (lon, lat) in [(0.0, 0.0), (78.9, 13.0), (80.0, 14.01)] {
            let mut new = new_report();
            new.location = GeoPoint::new(lon, lat).unwrap();
            assert!(
                matches!(Report::new(new), Err(ModelError::OutOfRange { .. })),
                "({lon}, {lat})"
            );
        }

        for (lon, lat) in [(79.0, 12.0), (81.0, 14.0), (79.0, 14.0), (81.0, 12.0)] {
            let mut new = new_report();
            new.location = GeoPoint::new(lon, lat).unwrap();
            assert!(Report::new(new).is_ok(), "({lon}, {lat})");
        }
    }

    #[test]
    fn test_report_location_checked_against_custom_region() {
        let region = BoundingBox::new(0.0, 0.0, 1.0, 1.0);

        let mut new = new_report();
        new.location = GeoPoint::new(0.5, 0.5).unwrap();
        assert!(Report::new_in(new.clone(), &region).is_ok());
        assert!(Report::new(new).is_err());

        assert!(matches!(
            Report::new_in(new_report(), &region),
            Err(ModelError::OutOfRange { field: "longitude", .. })
        ));
    }

    #[test]
    fn test_assets_reject_empty_fields() {
        let mut new = new_user();
        new.avatar.public_id = String::new();
        assert!(matches!(User::new(new), Err(ModelError::EmptyField("public_id"))));

        let mut new = new_user();
        new.avatar.url = String::new();
        assert!(matches!(User::new(new), Err(ModelError::EmptyField("url"))));

        let mut new = new_report();
        new.media = Some(Asset {
            public_id: String::new(),
            url: "https://loremflickr.com/640/480/nature?lock=2".to_string(),
        });
        assert!(matches!(Report::new(new), Err(ModelError::EmptyField("public_id"))));

        let mut new = new_report();
        new.media = Some(Asset {
            public_id: "media".to_string(),
            url: String::new(),
        });
        assert!(matches!(Report::new(new), Err(ModelError::EmptyField("url"))));
    }

    #[test]
    fn test_geo_point_rejects_invalid_coordinates() {
        assert!(GeoPoint::new(181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -91.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }
}
