//! Data decoding: Section 5 template dispatch plus the pipeline that
//! turns a Section 7 payload and a Section 6 bitmap into a full grid of
//! `f32` values.

mod complex;
mod simple;

pub(crate) use complex::ComplexParams;
pub(crate) use simple::SimpleParams;

use crate::{error::GribError, sections::BitmapSection};

/// Sentinel written at grid points the bitmap marks missing, rather than
/// `f32::NAN`, so downstream min/max reductions over a field don't need to
/// special-case NaN.
pub(crate) const MISSING_VALUE_SENTINEL: f32 = 9.999e20;

/// The Section 5 representation variant (tagged sum type over supported
/// templates).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RepresentationDefinition {
    Simple(SimpleParams),
    ComplexSpatialDiff(ComplexParams),
}

impl RepresentationDefinition {
    /// Dispatches on the Data Representation Template Number (Section 5).
    pub(crate) fn from_template(
        template_number: u16,
        buf: &[u8],
        byte_offset: usize,
    ) -> Result<Self, GribError> {
        match template_number {
            0 => Ok(Self::Simple(SimpleParams::from_buf(buf, byte_offset)?)),
            3 => Ok(Self::ComplexSpatialDiff(ComplexParams::from_buf(
                buf,
                byte_offset,
            )?)),
            n => Err(GribError::unsupported_template(5, n)),
        }
    }

    /// Decodes the non-missing values packed in `data`, then weaves them
    /// back onto the full `total_points`-sized grid using `bitmap`, filling
    /// missing points with [`MISSING_VALUE_SENTINEL`].
    pub(crate) fn decode(
        &self,
        data: &[u8],
        bitmap: &BitmapSection,
        total_points: usize,
        byte_offset: usize,
    ) -> Result<Vec<f32>, GribError> {
        let num_present = bitmap.count_present(total_points);
        let packed = match self {
            Self::Simple(p) => p.decode_values(data, num_present, byte_offset)?,
            Self::ComplexSpatialDiff(p) => p.decode_values(data, num_present, byte_offset)?,
        };

        if matches!(bitmap, BitmapSection::None) {
            return Ok(packed);
        }

        let mut out = Vec::with_capacity(total_points);
        let mut packed_iter = packed.into_iter();
        for idx in 0..total_points {
            if bitmap.is_present(idx) {
                out.push(packed_iter.next().ok_or_else(|| {
                    GribError::data_decode(
                        7,
                        byte_offset,
                        "fewer decoded values than the bitmap's present-point count",
                    )
                })?);
            } else {
                out.push(MISSING_VALUE_SENTINEL);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_params(bits: u8) -> SimpleParams {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0f32.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.push(bits);
        buf.push(0); // original field type: floating point
        SimpleParams::from_buf(&buf, 0).unwrap()
    }

    #[test]
    fn weaves_missing_sentinel_at_bitmap_gaps() {
        let params = RepresentationDefinition::Simple(simple_params(8));
        // 4 grid points, only points 0 and 2 present.
        let bitmap = BitmapSection::Explicit(vec![true, false, true, false]);
        let data = [5u8, 7u8];
        let decoded = params.decode(&data, &bitmap, 4, 0).unwrap();
        assert_eq!(decoded[0], 5.0);
        assert_eq!(decoded[1], MISSING_VALUE_SENTINEL);
        assert_eq!(decoded[2], 7.0);
        assert_eq!(decoded[3], MISSING_VALUE_SENTINEL);
    }

    #[test]
    fn no_bitmap_returns_every_point() {
        let params = RepresentationDefinition::Simple(simple_params(8));
        let data = [1u8, 2u8, 3u8];
        let decoded = params.decode(&data, &BitmapSection::None, 3, 0).unwrap();
        assert_eq!(decoded, vec![1.0, 2.0, 3.0]);
    }
}
