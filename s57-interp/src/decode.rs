//! Top-level decode pipeline: turns raw cell bytes into a populated ECS
//! `World` in two passes over the records, dispatching by each record's
//! classifying field tag (DSPM, VRID, FRID). See [`decode`] for why two
//! passes are needed.

use crate::ecs::{DatasetParams, EntityId, World};
use crate::systems::{
    get_u16, get_u32, AttributeDecodeSystem, FeatureBindSystem, FoidDecodeSystem, GeometrySystem,
    NameDecodeSystem, TopologySystem,
};
use num_bigint::BigInt;
use s57_parse::ddr::DDR;
use s57_parse::iso8211::Record;
use s57_parse::{ParseError, ParseErrorKind, Result as ParseResult};

/// Which entity-bearing record family a data record belongs to, carried
/// from the entity-creation pass to the cross-reference pass below.
#[derive(Clone, Copy)]
enum RecordKind {
    Vrid(EntityId),
    Frid(EntityId),
}

/// Parse a cell's raw bytes and populate a fresh ECS `World`.
///
/// A malformed data record is a recoverable error: it's skipped, counted,
/// and decoding continues with the rest of the file (a bad record must not
/// abort the whole cell).
///
/// Decoding runs in two passes over the records rather than one. VRID and
/// FRID entities are created first, so `name_index`/`foid_index` reflect
/// every vector and feature in the cell; only then are the cross-referencing
/// fields (VRPT, FSPT, FFPT) resolved against that finished index. A single
/// forward pass would resolve a spatial pointer against whatever subset of
/// the graph had been seen so far, which falsely drops any pointer to a
/// VRID that happens to appear later in the file than the record
/// referencing it -- spatial records may appear anywhere relative to
/// features, so pointer resolution must not depend on file order.
pub fn decode(data: &[u8]) -> ParseResult<World> {
    let file = s57_parse::S57File::from_bytes(data)?;
    let records = file.records();

    let ddr_record = records
        .first()
        .ok_or_else(|| ParseError::at(ParseErrorKind::UnexpectedEof, 0))?;
    let ddr = DDR::parse(ddr_record)?;

    let mut world = World::new();
    let data_records = &records[1..];

    let mut kinds: Vec<Option<RecordKind>> = Vec::with_capacity(data_records.len());
    for record in data_records {
        match create_entity(&mut world, &ddr, record) {
            Ok(kind) => kinds.push(kind),
            Err(e) => {
                log::warn!("skipping malformed record: {}", e);
                world.stats.truncated_records += 1;
                kinds.push(None);
            }
        }
    }

    for (record, kind) in data_records.iter().zip(kinds.iter()) {
        let Some(kind) = kind else { continue };
        if let Err(e) = decode_cross_references(&mut world, &ddr, record, *kind) {
            log::warn!("skipping malformed record: {}", e);
            world.stats.truncated_records += 1;
        }
    }

    Ok(world)
}

/// Entity-creation pass: dispatch by the record's classifying field tag and
/// create its VRID/FRID entity (or, for DSPM, apply it directly -- dataset
/// parameters don't reference other entities so there's nothing to defer).
fn create_entity(world: &mut World, ddr: &DDR, record: &Record) -> ParseResult<Option<RecordKind>> {
    if record.fields.iter().any(|f| f.tag == "DSPM") {
        decode_dspm(world, ddr, record)?;
        return Ok(None);
    }
    if record.fields.iter().any(|f| f.tag == "VRID") {
        let vrid_field = record
            .fields
            .iter()
            .find(|f| f.tag == "VRID")
            .expect("caller verified VRID is present");
        let vrid = ddr.parse_field_data(vrid_field)?;
        let entity = NameDecodeSystem::process_vrid(world, &vrid)?;
        return Ok(Some(RecordKind::Vrid(entity)));
    }
    if record.fields.iter().any(|f| f.tag == "FRID") {
        let frid_field = record
            .fields
            .iter()
            .find(|f| f.tag == "FRID")
            .expect("caller verified FRID is present");
        let foid_field = record.fields.iter().find(|f| f.tag == "FOID").ok_or_else(|| {
            ParseError::at(
                ParseErrorKind::InvalidField("FRID record missing FOID".to_string()),
                0,
            )
        })?;
        let frid = ddr.parse_field_data(frid_field)?;
        let foid = ddr.parse_field_data(foid_field)?;
        let entity = FoidDecodeSystem::process_feature(world, &frid, &foid)?;
        return Ok(Some(RecordKind::Frid(entity)));
    }
    // DSID and any other header-only records carry no entities to create.
    Ok(None)
}

/// Cross-reference pass: decode the fields of a VRID/FRID record that point
/// at other entities, now that every entity in the cell exists.
fn decode_cross_references(
    world: &mut World,
    ddr: &DDR,
    record: &Record,
    kind: RecordKind,
) -> ParseResult<()> {
    match kind {
        RecordKind::Vrid(entity) => decode_vrid_fields(world, ddr, record, entity),
        RecordKind::Frid(entity) => decode_frid_fields(world, ddr, record, entity),
    }
}

fn decode_dspm(world: &mut World, ddr: &DDR, record: &Record) -> ParseResult<()> {
    let field = record
        .fields
        .iter()
        .find(|f| f.tag == "DSPM")
        .expect("caller verified DSPM is present");
    let parsed = ddr.parse_field_data(field)?;
    let group = parsed.groups().first().ok_or_else(|| {
        ParseError::at(
            ParseErrorKind::InvalidField("DSPM has no data".to_string()),
            0,
        )
    })?;

    let comf = get_u32(group, "COMF")?.ok_or_else(|| {
        ParseError::at(
            ParseErrorKind::InvalidField("DSPM missing COMF".to_string()),
            0,
        )
    })?;
    let somf = get_u32(group, "SOMF")?.unwrap_or(1);
    let duni = get_u16(group, "DUNI")?.unwrap_or(1);
    let huni = get_u16(group, "HUNI")?.unwrap_or(1);
    let puni = get_u16(group, "PUNI")?.unwrap_or(1);
    let hdat = get_u16(group, "HDAT")?.unwrap_or(0);
    let vdat = get_u16(group, "VDAT")?.unwrap_or(0);
    let sdat = get_u16(group, "SDAT")?.unwrap_or(0);
    let cscl = get_u32(group, "CSCL")?.unwrap_or(0);

    world.dataset_params = Some(DatasetParams {
        comf: BigInt::from(comf),
        somf: BigInt::from(somf),
        duni,
        huni,
        puni,
        hdat,
        vdat,
        sdat,
        cscl,
    });

    Ok(())
}

fn decode_vrid_fields(
    world: &mut World,
    ddr: &DDR,
    record: &Record,
    entity: EntityId,
) -> ParseResult<()> {
    for field in &record.fields {
        match field.tag.as_str() {
            "SG2D" => {
                let parsed = ddr.parse_field_data(field)?;
                GeometrySystem::process_sg2d(world, entity, &parsed)?;
            }
            "SG3D" => {
                let parsed = ddr.parse_field_data(field)?;
                GeometrySystem::process_sg3d(world, entity, &parsed)?;
            }
            "VRPT" => {
                let parsed = ddr.parse_field_data(field)?;
                TopologySystem::process_vrpt(world, entity, &parsed)?;
            }
            _ => {}
        }
    }

    Ok(())
}

fn decode_frid_fields(
    world: &mut World,
    ddr: &DDR,
    record: &Record,
    entity: EntityId,
) -> ParseResult<()> {
    for field in &record.fields {
        match field.tag.as_str() {
            "ATTF" => {
                let parsed = ddr.parse_field_data(field)?;
                AttributeDecodeSystem::process_attf(world, entity, &parsed)?;
            }
            "NATF" => {
                let parsed = ddr.parse_field_data(field)?;
                AttributeDecodeSystem::process_natf(world, entity, &parsed)?;
            }
            "FSPT" => {
                let parsed = ddr.parse_field_data(field)?;
                FeatureBindSystem::process_fspt(world, entity, &parsed)?;
            }
            "FFPT" => {
                let parsed = ddr.parse_field_data(field)?;
                FeatureBindSystem::process_ffpt(world, entity, &parsed)?;
            }
            _ => {}
        }
    }

    Ok(())
}
