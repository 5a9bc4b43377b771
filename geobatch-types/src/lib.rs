//! # geobatch-types
//!
//! Core data types for the geobatch engine.
//!
//! This crate provides the plain, serializable values that flow between the
//! processing stages:
//!
//! - **Points**: `GeoPoint` with its passthrough `Attributes`
//! - **Regions**: `BoundingBox`
//! - **Results**: `DistanceResult`, `Neighbor`, `NeighborResult`, `ChunkResult`
//!
//! All owned types are serializable with Serde and convert to and from the
//! `geo` crate's geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geobatch_types::point::GeoPoint;
//!
//! let nyc = GeoPoint::new(40.7128, -74.0060).with_attribute("name", "New York");
//! assert_eq!(nyc.attribute("name").and_then(|v| v.as_str()), Some("New York"));
//! ```

pub mod bbox;
pub mod point;
pub mod result;

pub use bbox::BoundingBox;
pub use point::{Attributes, GeoPoint, in_range};
pub use result::{ChunkResult, DistanceResult, Neighbor, NeighborResult, round_km};
