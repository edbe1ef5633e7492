//! S-57 Electronic Navigational Chart (ENC) container and record parser
//!
//! This crate parses S-57 format files used by NOAA and other hydrographic
//! organizations for Electronic Navigational Charts.
//!
//! S-57 files are encoded using the ISO 8211 standard: a Data Descriptive
//! Record (DDR) describes the field layout, followed by Data Records (DR)
//! that carry the actual vector and feature data.

pub mod bitstring;
pub mod ddr;
pub mod error;
pub mod iso8211;
pub mod s57_schema;

pub use error::{ParseError, ParseErrorKind, Result};

/// A parsed S-57 file: the raw sequence of ISO 8211 logical records.
///
/// Record 0 is always the DDR; records 1.. are data records (DSID, VRID,
/// FRID, ...). Use [`ddr::DDR::parse`] on the first record to get field
/// definitions, then [`ddr::DDR::parse_field_data`] to decode subsequent
/// records' fields.
pub struct S57File {
    records: Vec<iso8211::Record>,
}

impl S57File {
    /// Parse an S-57 file from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let records = iso8211::parse_file(data)?;
        Ok(S57File { records })
    }

    /// Get all records in the file
    pub fn records(&self) -> &[iso8211::Record] {
        &self.records
    }
}
