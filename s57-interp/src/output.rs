//! Serialization of build output to the three external interfaces this
//! crate's consumer writes: a GeoJSON feature collection, a sector-light
//! sidecar, and a single-line metadata object.

use crate::builder::{BuildOutput, Feature, SectorLight};
use serde::Serialize;

#[derive(Serialize)]
struct GeoJsonFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Option<&'a crate::builder::Geometry>,
    properties: &'a std::collections::BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
struct GeoJsonFeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<GeoJsonFeature<'a>>,
}

/// Render the built features as a GeoJSON FeatureCollection string.
pub fn feature_collection_json(features: &[Feature]) -> serde_json::Result<String> {
    let collection = GeoJsonFeatureCollection {
        kind: "FeatureCollection",
        features: features
            .iter()
            .map(|f| GeoJsonFeature {
                kind: "Feature",
                geometry: f.geometry.as_ref(),
                properties: &f.properties,
            })
            .collect(),
    };
    serde_json::to_string(&collection)
}

/// Render the sector-light sidecar list as a JSON array string.
pub fn sector_lights_json(sector_lights: &[SectorLight]) -> serde_json::Result<String> {
    serde_json::to_string(sector_lights)
}

/// The single-line metadata object written to stdout at completion.
#[derive(Serialize)]
pub struct Metadata {
    pub geojson_path: String,
    pub has_safety_areas: bool,
    pub feature_count: usize,
    pub sector_lights_path: Option<String>,
    pub sector_lights_count: usize,
}

impl Metadata {
    pub fn from_build(
        output: &BuildOutput,
        geojson_path: String,
        sector_lights_path: Option<String>,
    ) -> Self {
        Metadata {
            geojson_path,
            has_safety_areas: crate::builder::has_safety_areas(&output.features),
            feature_count: output.features.len(),
            sector_lights_path,
            sector_lights_count: output.sector_lights.len(),
        }
    }

    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
