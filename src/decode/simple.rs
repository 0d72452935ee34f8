//! Data Representation Template 5.0 — simple packing.

use num::ToPrimitive;

use crate::{
    error::GribError,
    utils::{BitReader, GribInt},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SimpleParams {
    pub(crate) reference_value: f32,
    pub(crate) binary_scale_factor: i16,
    pub(crate) decimal_scale_factor: i16,
    pub(crate) bit_count: u8,
    pub(crate) original_field_type: u8,
}

impl SimpleParams {
    const SIZE: usize = 10;

    pub(crate) fn from_buf(buf: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        if buf.len() < Self::SIZE {
            return Err(GribError::invalid_format(
                5,
                byte_offset,
                format!(
                    "Template 5.0 body must be at least {} bytes, found {}",
                    Self::SIZE,
                    buf.len()
                ),
            ));
        }
        let mut r = BitReader::new(buf);
        let reference_value = f32::from_bits(r.read_bits_u32(32)?);
        let binary_scale_factor = (r.read_bits_u32(16)? as u16).as_grib_int();
        let decimal_scale_factor = (r.read_bits_u32(16)? as u16).as_grib_int();
        let bit_count = r.read_bits_u32(8)? as u8;
        let original_field_type = r.read_bits_u32(8)? as u8;
        Ok(Self {
            reference_value,
            binary_scale_factor,
            decimal_scale_factor,
            bit_count,
            original_field_type,
        })
    }

    /// `Y = (R + X * 2^E) / 10^D` (WMO Regulation 92.1.4).
    pub(crate) fn unscale(&self, raw: u32) -> f32 {
        let x = raw.to_f64().expect("u32 always fits in f64");
        let r = f64::from(self.reference_value);
        let e = 2f64.powi(i32::from(self.binary_scale_factor));
        let d = 10f64.powi(i32::from(self.decimal_scale_factor));
        ((r + x * e) / d) as f32
    }

    /// Decodes `num_data_points` values (non-missing count, per the bitmap)
    /// from a bit-packed run of fixed-width unsigned integers.
    pub(crate) fn decode_values(
        &self,
        data: &[u8],
        num_values: usize,
        byte_offset: usize,
    ) -> Result<Vec<f32>, GribError> {
        if self.bit_count == 0 {
            return Ok(vec![self.unscale(0); num_values]);
        }
        let width = usize::from(self.bit_count);
        let needed_bits = width * num_values;
        if data.len() * 8 < needed_bits {
            return Err(GribError::data_decode(
                7,
                byte_offset,
                format!(
                    "simple packing needs {needed_bits} bits for {num_values} values, found {}",
                    data.len() * 8
                ),
            ));
        }
        let mut r = BitReader::new(data);
        (0..num_values)
            .map(|_| r.read_bits_u32(width).map(|raw| self.unscale(raw)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(bit_count: u8, original_field_type: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0f32.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.push(bit_count);
        buf.push(original_field_type);
        buf
    }

    /// Testable Properties scenario 3: signed sign-magnitude scale factor
    /// round trip.
    #[test]
    fn negative_binary_scale_factor_round_trip() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&273.15f32.to_be_bytes());
        buf.extend_from_slice(&0x8002u16.to_be_bytes()); // E = -2, sign-magnitude
        buf.extend_from_slice(&0u16.to_be_bytes()); // D = 0
        buf.push(8); // 8 bits per value
        buf.push(0); // original-field type: floating point
        let params = SimpleParams::from_buf(&buf, 0).unwrap();
        assert_eq!(params.binary_scale_factor, -2);

        let decoded = params.unscale(4);
        assert!((decoded - (273.15 + 4.0 * 0.25)).abs() < 1e-4);
    }

    #[test]
    fn original_field_type_is_parsed() {
        let buf = header_bytes(8, 1);
        let params = SimpleParams::from_buf(&buf, 0).unwrap();
        assert_eq!(params.original_field_type, 1);
    }

    #[test]
    fn decode_values_detects_short_data() {
        let buf = header_bytes(16, 0);
        let params = SimpleParams::from_buf(&buf, 0).unwrap();
        assert!(params.decode_values(&[0u8; 1], 10, 0).is_err());
    }

    #[test]
    fn zero_bit_count_yields_constant_field() {
        let buf = header_bytes(0, 0);
        let params = SimpleParams::from_buf(&buf, 0).unwrap();
        let values = params.decode_values(&[], 5, 0).unwrap();
        assert_eq!(values.len(), 5);
        assert!(values.iter().all(|&v| v == params.reference_value));
    }
}
