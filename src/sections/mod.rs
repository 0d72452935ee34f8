//! Section parsers: one record type per GRIB2 section, each validating
//! `declared-length == len(span)` and `span[4] == expected_section_number`
//! before handing the body on to its template dispatcher.

mod bitmap;

pub(crate) use bitmap::BitmapSection;

use crate::{
    error::GribError,
    grid::GridDefinition,
    product::ProductDefinition,
    decode::RepresentationDefinition,
    utils::ByteReader,
};

fn too_short(section: u8, byte_offset: usize, what: &str, body: &[u8]) -> GribError {
    GribError::invalid_format(
        section.into(),
        byte_offset,
        format!("{what}, found {}", body.len()),
    )
}

/// Strips and validates the common 5-byte section header (4-byte length +
/// 1-byte section number), returning the body that follows it.
pub(crate) fn section_body<'a>(
    span: &'a [u8],
    expected_number: u8,
    byte_offset: usize,
) -> Result<&'a [u8], GribError> {
    let mut r = ByteReader::new(span);
    let declared_length = r
        .read_u32()
        .map_err(|_| too_short(expected_number, byte_offset, "section shorter than its 5-byte header", span))?
        as usize;
    let section_number = r
        .read_u8()
        .map_err(|_| too_short(expected_number, byte_offset, "section shorter than its 5-byte header", span))?;
    if declared_length != span.len() {
        return Err(GribError::invalid_format(
            expected_number.into(),
            byte_offset,
            format!(
                "declared section length {declared_length} does not match byte range {}",
                span.len()
            ),
        ));
    }
    if section_number != expected_number {
        return Err(GribError::invalid_format(
            expected_number.into(),
            byte_offset,
            format!("expected section {expected_number}, found section {section_number}"),
        ));
    }
    Ok(r.rest())
}

/// Section 0 (Indicator): 16 fixed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Indicator {
    pub(crate) discipline: u8,
    pub(crate) total_length: u64,
}

impl Indicator {
    pub(crate) const SIZE: usize = 16;
    const MAGIC: &'static [u8; 4] = b"GRIB";

    pub(crate) fn from_buf(buf: &[u8]) -> Result<Self, GribError> {
        if buf.len() != Self::SIZE {
            return Err(GribError::invalid_format(
                0,
                0,
                format!("Section 0 must be {} bytes, found {}", Self::SIZE, buf.len()),
            ));
        }
        let mut r = ByteReader::new(buf);
        let magic = r.read_bytes(4).expect("length checked above");
        if magic != Self::MAGIC {
            return Err(GribError::invalid_format(0, 0, "missing 'GRIB' magic prefix"));
        }
        r.skip(2).expect("length checked above");
        let discipline = r.read_u8().expect("length checked above");
        let edition = r.read_u8().expect("length checked above");
        if edition != 2 {
            return Err(GribError::invalid_format(
                0,
                7,
                format!("unsupported GRIB edition {edition}, only edition 2 is supported"),
            ));
        }
        let total_length = r.read_u64().expect("length checked above");
        Ok(Self {
            discipline,
            total_length,
        })
    }
}

/// Section 1 (Identification): originating centre, reference time, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identification {
    pub(crate) centre_id: u16,
    pub(crate) subcentre_id: u16,
    pub(crate) master_table_version: u8,
    pub(crate) local_table_version: u8,
    pub(crate) ref_time_significance: u8,
    pub(crate) year: u16,
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    pub(crate) prod_status: u8,
    pub(crate) data_type: u8,
}

impl Identification {
    pub(crate) fn from_buf(body: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        let mut r = ByteReader::new(body);
        let id = (|| -> Result<Self, GribError> {
            Ok(Self {
                centre_id: r.read_u16()?,
                subcentre_id: r.read_u16()?,
                master_table_version: r.read_u8()?,
                local_table_version: r.read_u8()?,
                ref_time_significance: r.read_u8()?,
                year: r.read_u16()?,
                month: r.read_u8()?,
                day: r.read_u8()?,
                hour: r.read_u8()?,
                minute: r.read_u8()?,
                second: r.read_u8()?,
                prod_status: r.read_u8()?,
                data_type: r.read_u8()?,
            })
        })()
        .map_err(|_| {
            GribError::invalid_format(
                1,
                byte_offset,
                format!("Section 1 body must be at least 16 bytes, found {}", body.len()),
            )
        })?;
        id.check_valid_reference_time(byte_offset)?;
        Ok(id)
    }

    #[cfg(feature = "time-calculation")]
    fn check_valid_reference_time(&self, byte_offset: usize) -> Result<(), GribError> {
        use chrono::NaiveDate;
        NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
            .and_then(|d| d.and_hms_opt(self.hour.into(), self.minute.into(), self.second.into()))
            .ok_or_else(|| {
                GribError::invalid_format(
                    1,
                    byte_offset,
                    format!(
                        "reference time {}-{:02}-{:02} {:02}:{:02}:{:02} is not a valid UTC calendar date",
                        self.year, self.month, self.day, self.hour, self.minute, self.second
                    ),
                )
            })?;
        Ok(())
    }

    #[cfg(not(feature = "time-calculation"))]
    fn check_valid_reference_time(&self, _byte_offset: usize) -> Result<(), GribError> {
        Ok(())
    }
}

/// Section 2 (Local use): optional, opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalUse {
    pub(crate) payload: Box<[u8]>,
}

/// Section 3 (Grid definition).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GridSection {
    pub(crate) template_number: u16,
    pub(crate) num_data_points: u32,
    pub(crate) grid: GridDefinition,
}

impl GridSection {
    pub(crate) fn from_buf(body: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        let mut r = ByteReader::new(body);
        let err = || too_short(3, byte_offset, "Section 3 body must be at least 9 bytes", body);
        r.skip(1).map_err(|_| err())?;
        let num_data_points = r.read_u32().map_err(|_| err())?;
        r.skip(2).map_err(|_| err())?;
        let template_number = r.read_u16().map_err(|_| err())?;
        let grid = GridDefinition::from_template(template_number, r.rest())?;

        let expected = grid.total_points();
        if expected != num_data_points {
            return Err(GribError::invalid_format(
                3,
                byte_offset,
                format!("declared data-point count {num_data_points} does not equal Nx*Ny ({expected})"),
            ));
        }

        Ok(Self {
            template_number,
            num_data_points,
            grid,
        })
    }
}

/// Section 4 (Product definition).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProductSection {
    pub(crate) template_number: u16,
    pub(crate) product: ProductDefinition,
}

impl ProductSection {
    pub(crate) fn from_buf(body: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        let mut r = ByteReader::new(body);
        let err = || too_short(4, byte_offset, "Section 4 body must be at least 4 bytes", body);
        r.skip(2).map_err(|_| err())?;
        let template_number = r.read_u16().map_err(|_| err())?;
        let product = ProductDefinition::from_template(template_number, r.rest(), byte_offset)?;
        Ok(Self {
            template_number,
            product,
        })
    }
}

/// Section 5 (Data representation).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RepresentationSection {
    pub(crate) template_number: u16,
    pub(crate) num_values: u32,
    pub(crate) representation: RepresentationDefinition,
}

impl RepresentationSection {
    pub(crate) fn from_buf(body: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        let mut r = ByteReader::new(body);
        let err = || too_short(5, byte_offset, "Section 5 body must be at least 6 bytes", body);
        let num_values = r.read_u32().map_err(|_| err())?;
        let template_number = r.read_u16().map_err(|_| err())?;
        let representation =
            RepresentationDefinition::from_template(template_number, r.rest(), byte_offset)?;
        Ok(Self {
            template_number,
            num_values,
            representation,
        })
    }
}

/// Section 7 (Data): opaque bit-packed payload, consumed by the data
/// representation decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataSection {
    pub(crate) payload: Box<[u8]>,
}
