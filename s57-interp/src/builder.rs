//! Feature Builder
//!
//! Turns the ECS `World` populated by [`crate::systems`] into the normalized
//! output features this crate exists to produce: one [`Feature`] per FRID,
//! geometry materialized from the spatial graph, attributes merged from
//! ATTF/NATF, followed by the fixed post-processing pipeline (coordinate
//! rounding, COLOUR normalization, sounding explosion, light orientation).

use crate::ecs::{EntityType, World};
use crate::topology::{
    ContinuityPolicy, CyclePolicy, EdgeWalker, FeatureBoundaryCursor, TraversalContext,
};
use num_traits::ToPrimitive;
use s57_catalogue::AttributeInfo;
use std::collections::BTreeMap;

/// Fatal, per-cell build failures: something the decoder cannot recover
/// from by skipping a record.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] s57_parse::ParseError),
    #[error("dataset parameters (DSPM) missing: cannot interpret any geometry")]
    MissingDatasetParams,
    #[error("invalid coordinate factor: {0}")]
    InvalidCoordinateFactor(String),
}

/// GeoJSON-shaped geometry. Variant names match the GeoJSON `type` field
/// verbatim, and `serde`'s internally-tagged representation reproduces the
/// standard `{"type": ..., "coordinates": ...}` shape without renaming.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point((f64, f64)),
    MultiPoint(Vec<(f64, f64)>),
    LineString(Vec<(f64, f64)>),
    Polygon(Vec<Vec<(f64, f64)>>),
}

/// A single normalized feature, ready for GeoJSON serialization.
#[derive(Debug, Clone)]
pub struct Feature {
    pub objl: u16,
    pub objl_name: String,
    pub geometry: Option<Geometry>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// A sectored LIGHTS feature, accumulated into the sidecar list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SectorLight {
    pub lon: f64,
    pub lat: f64,
    pub sectr1: f64,
    pub sectr2: f64,
    pub colour: i64,
    pub scamin: f64,
    #[serde(rename = "chartId")]
    pub chart_id: String,
}

/// Output of a full build pass over a cell's ECS `World`.
pub struct BuildOutput {
    pub features: Vec<Feature>,
    pub sector_lights: Vec<SectorLight>,
}

/// OBJL codes that count as a safety area for the `has_safety_areas`
/// metadata flag (RESARE, CTNARE, MIPARE, ACHARE, ACHBRT, MARCUL).
const SAFETY_AREA_OBJL: [u16; 6] = [112, 27, 83, 4, 3, 82];

const SOUNDG_OBJL: u16 = 129;
const LIGHTS_OBJL: u16 = 75;

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// Build every feature in `world` into normalized output, running the full
/// post-processing pipeline (coordinate rounding, COLOUR normalization,
/// sounding explosion, light orientation/sidecar).
///
/// `chart_id` is the cell filename stem (e.g. `US4AK4PH`); `scale_num` is
/// its third character parsed as a decimal digit, falling back to 0 when
/// the stem is too short or that character isn't a digit.
pub fn build_features(world: &World, chart_id: &str) -> Result<BuildOutput, BuildError> {
    if world.dataset_params.is_none() {
        return Err(BuildError::MissingDatasetParams);
    }

    let scale_num = chart_id
        .chars()
        .nth(2)
        .and_then(|c| c.to_digit(10))
        .unwrap_or(0);

    let ctx = TraversalContext::new(world)
        .with_cycle_policy(CyclePolicy::Truncate)
        .with_continuity_policy(ContinuityPolicy::InsertGapMarker);

    let mut features = Vec::new();

    for entity in world.entities_of_type(EntityType::Feature) {
        let meta = match world.feature_meta.get(&entity) {
            Some(m) => m,
            None => continue,
        };

        let (geometry, soundg_depths) = assemble_geometry(&ctx, world, entity, meta.prim, meta.objl);

        let objl_name = s57_catalogue::decode_object(meta.objl)
            .map(|class| class.to_string())
            .unwrap_or_else(|| format!("UNKNOWN_{}", meta.objl));

        let mut properties = materialize_attributes(world, entity);
        properties.insert("OBJL".to_string(), serde_json::json!(meta.objl));
        properties.insert("OBJL_NAME".to_string(), serde_json::json!(objl_name));
        properties.insert("CHART_ID".to_string(), serde_json::json!(chart_id));
        properties.insert("_chartId".to_string(), serde_json::json!(chart_id));
        properties.insert("_scaleNum".to_string(), serde_json::json!(scale_num));
        if let Some(depths) = soundg_depths {
            properties.insert("_soundgDepths".to_string(), serde_json::json!(depths));
        }

        features.push(Feature {
            objl: meta.objl,
            objl_name,
            geometry,
            properties,
        });
    }

    let mut sector_lights = Vec::new();
    let mut pipeline_output = Vec::new();
    for feature in features {
        let feature = normalize_colour(feature);
        let exploded = explode_soundings(feature);
        for f in exploded {
            let f = apply_light_orientation(f, chart_id, &mut sector_lights);
            pipeline_output.push(f);
        }
    }

    Ok(BuildOutput {
        features: pipeline_output,
        sector_lights,
    })
}

/// True iff any feature's OBJL names a safety area, per the metadata
/// contract's `has_safety_areas` flag.
pub fn has_safety_areas(features: &[Feature]) -> bool {
    features
        .iter()
        .any(|f| SAFETY_AREA_OBJL.contains(&f.objl))
}

fn assemble_geometry(
    ctx: &TraversalContext,
    world: &World,
    entity: crate::ecs::EntityId,
    prim: u8,
    objl: u16,
) -> (Option<Geometry>, Option<Vec<f64>>) {
    let Some(pointers) = world.feature_pointers.get(&entity) else {
        return (None, None);
    };

    match prim {
        1 => {
            let Some(sref) = pointers.spatial_refs.first() else {
                return (None, None);
            };
            let Some(name) = world.vector_meta.get(&sref.entity).map(|m| m.name) else {
                return (None, None);
            };
            let mut walker = EdgeWalker::new(ctx);
            let Ok(coords) = walker.resolve_line_2d(name) else {
                return (None, None);
            };
            let points: Vec<(f64, f64)> = coords
                .iter()
                .filter_map(|(lat, lon)| Some((round6(lon.to_f64()?), round6(lat.to_f64()?))))
                .collect();

            let depths = if objl == SOUNDG_OBJL {
                world
                    .exact_depths
                    .get(&sref.entity)
                    .map(|d| d.depth.iter().filter_map(|r| r.to_f64()).collect())
            } else {
                None
            };

            let geometry = match points.len() {
                0 => None,
                1 => Some(Geometry::Point(points[0])),
                _ => Some(Geometry::MultiPoint(points)),
            };
            (geometry, depths)
        }
        2 => {
            let mut line: Vec<(num_rational::BigRational, num_rational::BigRational)> =
                Vec::new();
            for sref in &pointers.spatial_refs {
                let name = match world.vector_meta.get(&sref.entity) {
                    Some(m) => m.name,
                    None => continue,
                };
                // Fresh walker per edge: a shared walker would see the
                // node at the seam with the previous edge as a revisit and
                // falsely trip cycle detection.
                let mut walker = EdgeWalker::new(ctx);
                let mut coords = match walker.resolve_line_2d(name) {
                    Ok(c) => c,
                    Err(_) => continue,
                };
                if crate::topology::Orientation::from_ornt(sref.ornt).should_reverse() {
                    coords.reverse();
                }
                if coords.is_empty() {
                    continue;
                }
                if let Some(last) = line.last() {
                    let first = &coords[0];
                    if last.0 == first.0 && last.1 == first.1 {
                        line.extend(coords.into_iter().skip(1));
                        continue;
                    }
                }
                line.extend(coords);
            }
            let points: Vec<(f64, f64)> = line
                .iter()
                .filter_map(|(lat, lon)| Some((round6(lon.to_f64()?), round6(lat.to_f64()?))))
                .collect();
            let geometry = if points.is_empty() {
                None
            } else {
                Some(Geometry::LineString(points))
            };
            (geometry, None)
        }
        3 => {
            let Some(foid) = world.feature_meta.get(&entity).map(|m| m.foid) else {
                return (None, None);
            };
            let cursor = FeatureBoundaryCursor::new(ctx, foid);
            let Ok(rings) = cursor.resolve_rings() else {
                return (None, None);
            };
            if rings.is_empty() {
                return (None, None);
            }
            let polygon: Vec<Vec<(f64, f64)>> = rings
                .iter()
                .map(|ring| {
                    ring.iter()
                        .filter_map(|(lat, lon)| {
                            Some((round6(lon.to_f64()?), round6(lat.to_f64()?)))
                        })
                        .collect()
                })
                .collect();
            (Some(Geometry::Polygon(polygon)), None)
        }
        _ => (None, None),
    }
}

/// Merge ATTF/NATF into a single acronym-keyed property map. Empty values
/// are dropped entirely rather than stored as `""`.
fn materialize_attributes(world: &World, entity: crate::ecs::EntityId) -> BTreeMap<String, serde_json::Value> {
    let mut properties = BTreeMap::new();
    let Some(attrs) = world.feature_attributes.get(&entity) else {
        return properties;
    };

    for (code, value) in attrs.attf.iter().chain(attrs.natf.iter()) {
        if value.is_empty() {
            continue;
        }
        let acronym = AttributeInfo::from_code(*code)
            .map(|info| info.acronym.to_string())
            .unwrap_or_else(|| format!("ATTR_{}", code));
        properties.insert(acronym, serde_json::json!(value));
    }

    properties
}

/// Post-processing step 2: strip bracket characters, split on `,`/`:`,
/// parse the first token as an integer. Missing/invalid value drops the
/// attribute entirely rather than keeping a malformed one.
fn normalize_colour(mut feature: Feature) -> Feature {
    let Some(raw) = feature.properties.remove("COLOUR") else {
        return feature;
    };
    let raw = raw.as_str().unwrap_or_default();
    let cleaned = raw.trim_matches(|c| c == '(' || c == ')' || c == '[' || c == ']');
    let first_token = cleaned.split([',', ':']).next().unwrap_or("");
    if let Ok(code) = first_token.trim().parse::<i64>() {
        feature.properties.insert("COLOUR".to_string(), serde_json::json!(code));
    }
    feature
}

/// Post-processing step 3: explode a MultiPoint SOUNDG feature into one
/// Point feature per coordinate, each stamped with its own DEPTH. A 2D
/// sounding (single Point geometry) is passed through unchanged aside from
/// stamping DEPTH from its declared depth attribute, if present.
fn explode_soundings(mut feature: Feature) -> Vec<Feature> {
    if feature.objl != SOUNDG_OBJL {
        return vec![feature];
    }

    let depths: Vec<f64> = feature
        .properties
        .remove("_soundgDepths")
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    match feature.geometry.clone() {
        Some(Geometry::MultiPoint(points)) => points
            .into_iter()
            .enumerate()
            .map(|(i, (lon, lat))| {
                let mut properties = feature.properties.clone();
                if let Some(&depth) = depths.get(i) {
                    properties.insert("DEPTH".to_string(), serde_json::json!(depth));
                }
                Feature {
                    objl: feature.objl,
                    objl_name: feature.objl_name.clone(),
                    geometry: Some(Geometry::Point((lon, lat))),
                    properties,
                }
            })
            .collect(),
        Some(Geometry::Point(_)) => {
            if let Some(&depth) = depths.first() {
                feature
                    .properties
                    .insert("DEPTH".to_string(), serde_json::json!(round6(depth)));
            }
            vec![feature]
        }
        _ => vec![feature],
    }
}

/// Post-processing step 4: compute `_ORIENT` for LIGHTS features and
/// accumulate a sector-light sidecar entry when both SECTR1/SECTR2 are
/// present and geometry is a point.
fn apply_light_orientation(
    mut feature: Feature,
    chart_id: &str,
    sidecar: &mut Vec<SectorLight>,
) -> Feature {
    if feature.objl != LIGHTS_OBJL {
        return feature;
    }

    let sectr1 = feature
        .properties
        .get("SECTR1")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite());
    let sectr2 = feature
        .properties
        .get("SECTR2")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite());
    let orient = feature
        .properties
        .get("ORIENT")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite());

    let computed_orient = match (sectr1, sectr2) {
        (Some(s1), Some(s2)) => {
            let span = (s2 - s1).rem_euclid(360.0);
            let midpoint = (s1 + span / 2.0).rem_euclid(360.0);
            (midpoint + 180.0).rem_euclid(360.0)
        }
        _ => orient.unwrap_or(135.0),
    };

    feature
        .properties
        .insert("_ORIENT".to_string(), serde_json::json!(computed_orient));

    if let (Some(s1), Some(s2), Some(Geometry::Point((lon, lat)))) =
        (sectr1, sectr2, &feature.geometry)
    {
        let colour = feature
            .properties
            .get("COLOUR")
            .and_then(|v| v.as_i64())
            .unwrap_or(1);
        let scamin = feature
            .properties
            .get("SCAMIN")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(f64::INFINITY);

        sidecar.push(SectorLight {
            lon: *lon,
            lat: *lat,
            sectr1: s1,
            sectr2: s2,
            colour,
            scamin,
            chart_id: chart_id.to_string(),
        });
    }

    feature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round6() {
        assert_eq!(round6(1.0000004999), 1.0);
        assert_eq!(round6(1.0000005001), 1.000001);
    }

    #[test]
    fn test_normalize_colour_strips_brackets_and_takes_first_token() {
        let mut properties = BTreeMap::new();
        properties.insert("COLOUR".to_string(), serde_json::json!("(3,1)"));
        let feature = Feature {
            objl: 1,
            objl_name: "TEST".to_string(),
            geometry: None,
            properties,
        };
        let feature = normalize_colour(feature);
        assert_eq!(feature.properties.get("COLOUR"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_normalize_colour_drops_invalid() {
        let mut properties = BTreeMap::new();
        properties.insert("COLOUR".to_string(), serde_json::json!("not-a-number"));
        let feature = Feature {
            objl: 1,
            objl_name: "TEST".to_string(),
            geometry: None,
            properties,
        };
        let feature = normalize_colour(feature);
        assert_eq!(feature.properties.get("COLOUR"), None);
    }

    #[test]
    fn test_explode_soundings_multipoint() {
        let mut properties = BTreeMap::new();
        properties.insert("_soundgDepths".to_string(), serde_json::json!([5.5, 6.5]));
        let feature = Feature {
            objl: SOUNDG_OBJL,
            objl_name: "SOUNDG".to_string(),
            geometry: Some(Geometry::MultiPoint(vec![(1.0, 2.0), (3.0, 4.0)])),
            properties,
        };
        let exploded = explode_soundings(feature);
        assert_eq!(exploded.len(), 2);
        assert!(matches!(exploded[0].geometry, Some(Geometry::Point(_))));
        assert_eq!(exploded[0].properties.get("DEPTH"), Some(&serde_json::json!(5.5)));
        assert_eq!(exploded[1].properties.get("DEPTH"), Some(&serde_json::json!(6.5)));
    }

    #[test]
    fn test_explode_soundings_leaves_other_objl_alone() {
        let feature = Feature {
            objl: 42,
            objl_name: "DEPARE".to_string(),
            geometry: Some(Geometry::Point((1.0, 2.0))),
            properties: BTreeMap::new(),
        };
        let exploded = explode_soundings(feature.clone());
        assert_eq!(exploded.len(), 1);
        assert_eq!(exploded[0].geometry, feature.geometry);
    }

    #[test]
    fn test_light_orientation_from_sectors() {
        let mut properties = BTreeMap::new();
        properties.insert("SECTR1".to_string(), serde_json::json!("10"));
        properties.insert("SECTR2".to_string(), serde_json::json!("50"));
        let feature = Feature {
            objl: LIGHTS_OBJL,
            objl_name: "LIGHTS".to_string(),
            geometry: Some(Geometry::Point((1.0, 2.0))),
            properties,
        };
        let mut sidecar = Vec::new();
        let feature = apply_light_orientation(feature, "US4TEST0", &mut sidecar);
        // span = 40, midpoint = 30, _ORIENT = 210
        assert_eq!(
            feature.properties.get("_ORIENT"),
            Some(&serde_json::json!(210.0))
        );
        assert_eq!(sidecar.len(), 1);
        assert_eq!(sidecar[0].chart_id, "US4TEST0");
    }

    #[test]
    fn test_light_orientation_default_when_no_sectors_or_orient() {
        let feature = Feature {
            objl: LIGHTS_OBJL,
            objl_name: "LIGHTS".to_string(),
            geometry: Some(Geometry::Point((1.0, 2.0))),
            properties: BTreeMap::new(),
        };
        let mut sidecar = Vec::new();
        let feature = apply_light_orientation(feature, "US4TEST0", &mut sidecar);
        assert_eq!(
            feature.properties.get("_ORIENT"),
            Some(&serde_json::json!(135.0))
        );
        assert!(sidecar.is_empty());
    }

    #[test]
    fn test_has_safety_areas() {
        let features = vec![Feature {
            objl: 112,
            objl_name: "RESARE".to_string(),
            geometry: None,
            properties: BTreeMap::new(),
        }];
        assert!(has_safety_areas(&features));

        let features = vec![Feature {
            objl: 42,
            objl_name: "DEPARE".to_string(),
            geometry: None,
            properties: BTreeMap::new(),
        }];
        assert!(!has_safety_areas(&features));
    }
}

/// End-to-end tests built directly against an ECS `World`, mirroring the
/// cell/scenario fixtures in the design spec (one isolated buoy, a two-edge
/// line, a reversed edge, a closed area ring, SOUNDG explosion). Each
/// bypasses container/DDR parsing (already exercised in `s57-parse`) and
/// constructs the `World` the same way `systems.rs` would have left it.
#[cfg(test)]
mod end_to_end_tests {
    use super::*;
    use crate::ecs::{
        EntityType, ExactPositions, FeatureAttributes, FeatureMeta, FeaturePointers, SpatialRef,
        VectorMeta, VectorTopology, World,
    };
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use s57_parse::bitstring::{FoidKey, NameKey};

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn add_node(world: &mut World, rcid: u32, lat: BigRational, lon: BigRational) -> crate::ecs::EntityId {
        let entity = world.create_entity(EntityType::Vector);
        let name = NameKey { rcnm: 110, rcid };
        world.name_index.insert(name, entity);
        world.vector_meta.insert(
            entity,
            VectorMeta {
                name,
                rver: 1,
                ruin: 1,
            },
        );
        world.exact_positions.insert(
            entity,
            ExactPositions {
                lat: vec![lat],
                lon: vec![lon],
            },
        );
        entity
    }

    /// An edge referencing two endpoint nodes (via VRPT) plus its own
    /// interior vertices, the same shape `TopologySystem`/`GeometrySystem`
    /// would leave behind: endpoints as VRPT neighbors, interior vertices as
    /// the edge's own direct `ExactPositions`.
    fn add_edge(
        world: &mut World,
        rcid: u32,
        start: crate::ecs::EntityId,
        interior: Vec<(BigRational, BigRational)>,
        end: crate::ecs::EntityId,
    ) -> crate::ecs::EntityId {
        let entity = world.create_entity(EntityType::Vector);
        let name = NameKey { rcnm: 130, rcid };
        world.name_index.insert(name, entity);
        world.vector_meta.insert(
            entity,
            VectorMeta {
                name,
                rver: 1,
                ruin: 1,
            },
        );

        let start_name = world.vector_meta[&start].name;
        let end_name = world.vector_meta[&end].name;
        let start_entity = world.name_index[&start_name];
        let end_entity = world.name_index[&end_name];

        let mut neighbors = vec![crate::ecs::VectorNeighbor {
            entity: start_entity,
            ornt: 1,
            usag: 255,
            topi: 1,
            mask: 255,
        }];
        if !interior.is_empty() {
            let (lat, lon): (Vec<_>, Vec<_>) = interior.into_iter().unzip();
            let interior_entity = world.create_entity(EntityType::Vector);
            // EdgeWalker resolves every VRPT neighbor by re-deriving its
            // NAME through vector_meta, so even a synthetic "interior
            // vertices" pseudo-vector needs its own NAME/vector_meta entry.
            let interior_name = NameKey {
                rcnm: 130,
                rcid: rcid + 1_000_000,
            };
            world.name_index.insert(interior_name, interior_entity);
            world.vector_meta.insert(
                interior_entity,
                VectorMeta {
                    name: interior_name,
                    rver: 1,
                    ruin: 1,
                },
            );
            world.exact_positions.insert(interior_entity, ExactPositions { lat, lon });
            neighbors.push(crate::ecs::VectorNeighbor {
                entity: interior_entity,
                ornt: 255,
                usag: 255,
                topi: 0,
                mask: 255,
            });
        }
        neighbors.push(crate::ecs::VectorNeighbor {
            entity: end_entity,
            ornt: 1,
            usag: 255,
            topi: 2,
            mask: 255,
        });

        world
            .vector_topology
            .insert(entity, VectorTopology { neighbors });
        entity
    }

    fn add_point_feature(
        world: &mut World,
        fidn: u32,
        objl: u16,
        node: crate::ecs::EntityId,
        attrs: Vec<(u16, &str)>,
    ) {
        let entity = world.create_entity(EntityType::Feature);
        let foid = FoidKey {
            agen: 550,
            fidn,
            fids: 0,
        };
        world.foid_index.insert(foid, entity);
        world.feature_meta.insert(
            entity,
            FeatureMeta {
                foid,
                prim: 1,
                grup: 1,
                objl,
                rver: 1,
                ruin: 1,
            },
        );
        world.feature_attributes.insert(
            entity,
            FeatureAttributes {
                attf: attrs.into_iter().map(|(c, v)| (c, v.to_string())).collect(),
                natf: vec![],
            },
        );
        let node_name = world.vector_meta[&node].name;
        world.feature_pointers.insert(
            entity,
            FeaturePointers {
                related_features: vec![],
                spatial_refs: vec![SpatialRef {
                    entity: world.name_index[&node_name],
                    ornt: 255,
                    usag: 255,
                    mask: 255,
                }],
            },
        );
    }

    fn add_line_feature(world: &mut World, fidn: u32, edges: Vec<(crate::ecs::EntityId, u8)>) {
        let entity = world.create_entity(EntityType::Feature);
        let foid = FoidKey {
            agen: 550,
            fidn,
            fids: 0,
        };
        world.foid_index.insert(foid, entity);
        world.feature_meta.insert(
            entity,
            FeatureMeta {
                foid,
                prim: 2,
                grup: 1,
                objl: 130,
                rver: 1,
                ruin: 1,
            },
        );
        let spatial_refs = edges
            .into_iter()
            .map(|(edge, ornt)| SpatialRef {
                entity: edge,
                ornt,
                usag: 255,
                mask: 255,
            })
            .collect();
        world.feature_pointers.insert(
            entity,
            FeaturePointers {
                related_features: vec![],
                spatial_refs,
            },
        );
    }

    fn minimal_world() -> World {
        let mut world = World::new();
        world.dataset_params = Some(crate::ecs::DatasetParams {
            comf: BigInt::from(10_000_000),
            somf: BigInt::from(10),
            duni: 1,
            huni: 1,
            puni: 1,
            hdat: 0,
            vdat: 0,
            sdat: 0,
            cscl: 80_000,
        });
        world
    }

    /// Scenario 1: single isolated buoy.
    #[test]
    fn scenario_single_isolated_buoy() {
        let mut world = minimal_world();
        let node = add_node(
            &mut world,
            1,
            rat(456_789_012, 10_000_000),
            rat(-1_234_567_890, 10_000_000),
        );
        add_point_feature(&mut world, 1, 17, node, vec![(116, "Foo Buoy"), (75, "3")]);
        // ATTL 116 = OBJNAM, ATTL 75 = COLOUR in the embedded catalogue.

        let output = build_features(&world, "US4AK4PH").unwrap();
        assert_eq!(output.features.len(), 1);
        let f = &output.features[0];
        assert_eq!(f.objl, 17);
        assert_eq!(f.objl_name, "BOYLAT");
        assert_eq!(f.geometry, Some(Geometry::Point((-123.456789, 45.678901))));
        assert_eq!(f.properties.get("OBJNAM"), Some(&serde_json::json!("Foo Buoy")));
        assert_eq!(f.properties.get("COLOUR"), Some(&serde_json::json!(3)));
        assert_eq!(f.properties.get("_scaleNum"), Some(&serde_json::json!(4)));
    }

    /// Scenario 2: two-edge line, both forward.
    #[test]
    fn scenario_two_edge_line() {
        let mut world = minimal_world();
        let a = add_node(&mut world, 1, rat(0, 1), rat(0, 1));
        let b = add_node(&mut world, 2, rat(0, 1), rat(1, 1));
        let c = add_node(&mut world, 3, rat(0, 1), rat(2, 1));
        let e1 = add_edge(&mut world, 10, a, vec![(rat(0, 1), rat(1, 2))], b);
        let e2 = add_edge(&mut world, 11, b, vec![(rat(0, 1), rat(3, 2))], c);
        add_line_feature(&mut world, 1, vec![(e1, 1), (e2, 1)]);

        let output = build_features(&world, "US4AK4PH").unwrap();
        assert_eq!(output.features.len(), 1);
        let Some(Geometry::LineString(pts)) = &output.features[0].geometry else {
            panic!("expected LineString");
        };
        assert_eq!(
            pts,
            &vec![(0.0, 0.0), (0.5, 0.0), (1.0, 0.0), (1.5, 0.0), (2.0, 0.0)]
        );
    }

    /// Scenario 3: reversed first edge produces a discontinuity at the seam;
    /// implementations must not silently repair it.
    #[test]
    fn scenario_reversed_edge_is_not_repaired() {
        let mut world = minimal_world();
        let a = add_node(&mut world, 1, rat(0, 1), rat(0, 1));
        let b = add_node(&mut world, 2, rat(0, 1), rat(1, 1));
        let c = add_node(&mut world, 3, rat(0, 1), rat(2, 1));
        let e1 = add_edge(&mut world, 10, a, vec![(rat(0, 1), rat(1, 2))], b);
        let e2 = add_edge(&mut world, 11, b, vec![(rat(0, 1), rat(3, 2))], c);
        // edge1 reverse, edge2 forward
        add_line_feature(&mut world, 1, vec![(e1, 2), (e2, 1)]);

        let output = build_features(&world, "US4AK4PH").unwrap();
        let Some(Geometry::LineString(pts)) = &output.features[0].geometry else {
            panic!("expected LineString");
        };
        // reverse(edge1) = [B, v1, A]; edge2 = [B, v2, C]; seam A != B, so
        // both sequences are concatenated verbatim -- a visible discontinuity.
        assert_eq!(
            pts,
            &vec![
                (1.0, 0.0),
                (0.5, 0.0),
                (0.0, 0.0),
                (1.0, 0.0),
                (1.5, 0.0),
                (2.0, 0.0)
            ]
        );
    }

    /// Scenario 4: a closed square ring as an area feature's exterior.
    #[test]
    fn scenario_simple_area() {
        let mut world = minimal_world();
        let n1 = add_node(&mut world, 1, rat(0, 1), rat(0, 1));
        let n2 = add_node(&mut world, 2, rat(0, 1), rat(1, 1));
        let n3 = add_node(&mut world, 3, rat(1, 1), rat(1, 1));
        let n4 = add_node(&mut world, 4, rat(1, 1), rat(0, 1));
        let e1 = add_edge(&mut world, 10, n1, vec![], n2);
        let e2 = add_edge(&mut world, 11, n2, vec![], n3);
        let e3 = add_edge(&mut world, 12, n3, vec![], n4);
        let e4 = add_edge(&mut world, 13, n4, vec![], n1);

        let entity = world.create_entity(EntityType::Feature);
        let foid = FoidKey {
            agen: 550,
            fidn: 1,
            fids: 0,
        };
        world.foid_index.insert(foid, entity);
        world.feature_meta.insert(
            entity,
            FeatureMeta {
                foid,
                prim: 3,
                grup: 1,
                objl: 42,
                rver: 1,
                ruin: 1,
            },
        );
        world.feature_pointers.insert(
            entity,
            FeaturePointers {
                related_features: vec![],
                spatial_refs: vec![
                    SpatialRef { entity: e1, ornt: 1, usag: 1, mask: 255 },
                    SpatialRef { entity: e2, ornt: 1, usag: 1, mask: 255 },
                    SpatialRef { entity: e3, ornt: 1, usag: 1, mask: 255 },
                    SpatialRef { entity: e4, ornt: 1, usag: 1, mask: 255 },
                ],
            },
        );

        let output = build_features(&world, "US4AK4PH").unwrap();
        assert_eq!(output.features.len(), 1);
        let Some(Geometry::Polygon(rings)) = &output.features[0].geometry else {
            panic!("expected Polygon");
        };
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    /// Scenario 5: SOUNDG explosion from a 3D multi-point source.
    #[test]
    fn scenario_soundg_explosion() {
        let mut world = minimal_world();
        let node = world.create_entity(EntityType::Vector);
        let name = NameKey { rcnm: 110, rcid: 1 };
        world.name_index.insert(name, node);
        world.vector_meta.insert(
            node,
            VectorMeta {
                name,
                rver: 1,
                ruin: 1,
            },
        );
        world.exact_positions.insert(
            node,
            ExactPositions {
                lat: vec![rat(1, 1), rat(2, 1), rat(3, 1)],
                lon: vec![rat(10, 1), rat(20, 1), rat(30, 1)],
            },
        );
        world.exact_depths.insert(
            node,
            crate::ecs::ExactDepths {
                depth: vec![rat(55, 10), rat(65, 10), rat(75, 10)],
                units: 1,
            },
        );
        add_point_feature(&mut world, 1, 129, node, vec![(133, "133")]);
        // ATTL 133 = SCAMIN in the embedded catalogue.

        let output = build_features(&world, "US4AK4PH").unwrap();
        assert_eq!(output.features.len(), 3);
        for (i, f) in output.features.iter().enumerate() {
            assert_eq!(f.objl, 129);
            assert!(matches!(f.geometry, Some(Geometry::Point(_))));
            let expected_depth = [5.5, 6.5, 7.5][i];
            assert_eq!(f.properties.get("DEPTH"), Some(&serde_json::json!(expected_depth)));
            assert_eq!(f.properties.get("SCAMIN"), Some(&serde_json::json!("133")));
        }
    }
}
