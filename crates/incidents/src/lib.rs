//! Domain types for the incident-reporting backend.
//!
//! Citizens submit geo-tagged [`Report`]s; Analysts verify them. Documents are
//! stored in MongoDB, so ids are [`ObjectId`]s and field names follow the
//! collection schema rather than Rust naming.

pub mod auth;
pub mod errors;
pub mod models;

pub use errors::ModelError;
pub use models::{
    Asset, BoundingBox, GeoPoint, NewReport, NewUser, Report, ReportLabel, ReportSource,
    ReportStatus, Role, User,
};
pub use mongodb::bson::oid::ObjectId;
