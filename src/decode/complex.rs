//! Data Representation Template 5.3 — complex packing with spatial
//! differencing (NOAA reference-implementation semantics: the previous
//! value's reconstructed minimum is re-added at every differencing step,
//! not only seeded once).

use num::ToPrimitive;

use crate::{
    error::GribError,
    utils::{BitReader, GribInt},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ComplexParams {
    pub(crate) reference_value: f32,
    pub(crate) binary_scale_factor: i16,
    pub(crate) decimal_scale_factor: i16,
    pub(crate) group_reference_bit_width: u8,
    pub(crate) original_field_type: u8,
    pub(crate) group_splitting_method: u8,
    pub(crate) missing_value_management_mode: u8,
    pub(crate) primary_missing_value_substitute: f32,
    pub(crate) secondary_missing_value_substitute: f32,
    pub(crate) num_groups: u32,
    pub(crate) group_width_reference: u8,
    pub(crate) group_width_bit_width: u8,
    pub(crate) group_length_reference: u32,
    pub(crate) group_length_increment: u8,
    pub(crate) group_length_of_last: u32,
    pub(crate) group_length_bit_width: u8,
    pub(crate) spatial_diff_order: u8,
    pub(crate) spatial_diff_octets: u8,
}

impl ComplexParams {
    const SIZE: usize = 38;

    pub(crate) fn from_buf(buf: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        if buf.len() < Self::SIZE {
            return Err(GribError::invalid_format(
                5,
                byte_offset,
                format!(
                    "Template 5.3 body must be at least {} bytes, found {}",
                    Self::SIZE,
                    buf.len()
                ),
            ));
        }
        let mut r = BitReader::new(buf);
        let reference_value = f32::from_bits(r.read_bits_u32(32)?);
        let binary_scale_factor = (r.read_bits_u32(16)? as u16).as_grib_int();
        let decimal_scale_factor = (r.read_bits_u32(16)? as u16).as_grib_int();
        let group_reference_bit_width = r.read_bits_u32(8)? as u8;
        let original_field_type = r.read_bits_u32(8)? as u8;
        let group_splitting_method = r.read_bits_u32(8)? as u8;
        let missing_value_management_mode = r.read_bits_u32(8)? as u8;
        let primary_missing_value_substitute = f32::from_bits(r.read_bits_u32(32)?);
        let secondary_missing_value_substitute = f32::from_bits(r.read_bits_u32(32)?);
        let num_groups = r.read_bits_u32(32)?;
        let group_width_reference = r.read_bits_u32(8)? as u8;
        let group_width_bit_width = r.read_bits_u32(8)? as u8;
        let group_length_reference = r.read_bits_u32(32)?;
        let group_length_increment = r.read_bits_u32(8)? as u8;
        let group_length_of_last = r.read_bits_u32(32)?;
        let group_length_bit_width = r.read_bits_u32(8)? as u8;
        let spatial_diff_order = r.read_bits_u32(8)? as u8;
        let spatial_diff_octets = r.read_bits_u32(8)? as u8;

        Ok(Self {
            reference_value,
            binary_scale_factor,
            decimal_scale_factor,
            group_reference_bit_width,
            original_field_type,
            group_splitting_method,
            missing_value_management_mode,
            primary_missing_value_substitute,
            secondary_missing_value_substitute,
            num_groups,
            group_width_reference,
            group_width_bit_width,
            group_length_reference,
            group_length_increment,
            group_length_of_last,
            group_length_bit_width,
            spatial_diff_order,
            spatial_diff_octets,
        })
    }

    fn unscale(&self, raw: i64) -> f32 {
        let x = raw.to_f64().expect("i64 magnitudes seen here always fit in f64");
        let r = f64::from(self.reference_value);
        let e = 2f64.powi(i32::from(self.binary_scale_factor));
        let d = 10f64.powi(i32::from(self.decimal_scale_factor));
        ((r + x * e) / d) as f32
    }

    /// Runs the full 9-step complex-packing pipeline over `data` (the
    /// Section 7 payload immediately following this template's own header
    /// fields) and returns `num_values` decoded non-missing values in scan
    /// order.
    pub(crate) fn decode_values(
        &self,
        data: &[u8],
        num_values: usize,
        byte_offset: usize,
    ) -> Result<Vec<f32>, GribError> {
        let seed_count = match self.spatial_diff_order {
            1 => 1,
            2 => 2,
            other => {
                return Err(GribError::data_decode(
                    7,
                    byte_offset,
                    format!("unsupported spatial differencing order {other}, only 1 or 2 are supported"),
                ))
            }
        };

        let mut r = BitReader::new(data);
        let octets = usize::from(self.spatial_diff_octets);

        // Step 1: extra descriptors. The `s` seed ("first") values are
        // unsigned; the overall minimum that follows them is sign-magnitude.
        let mut seeds = Vec::with_capacity(seed_count);
        for _ in 0..seed_count {
            let seed = r.read_octets_unsigned(octets).map_err(|e| {
                GribError::data_decode_from(
                    7,
                    byte_offset,
                    "insufficient bits for spatial differencing seed values",
                    e,
                )
            })?;
            seeds.push(i64::from(seed));
        }
        let overall_min = r
            .read_octets_sign_magnitude(octets)
            .map(i64::from)
            .map_err(|e| {
                GribError::data_decode_from(
                    7,
                    byte_offset,
                    "insufficient bits for spatial differencing overall minimum",
                    e,
                )
            })?;

        let num_groups = self.num_groups as usize;

        // Step 2: group reference (minimum) values.
        let group_refs = self.read_group_field(&mut r, num_groups, self.group_reference_bit_width, byte_offset, "group reference values")?;

        // Step 3: group widths.
        let raw_widths = self.read_group_field(&mut r, num_groups, self.group_width_bit_width, byte_offset, "group widths")?;
        let group_widths: Vec<u64> = raw_widths
            .into_iter()
            .map(|w| u64::from(self.group_width_reference) + w)
            .collect();

        // Step 4: group lengths (the final group's length is carried in the
        // header rather than the bitstream).
        let mut group_lengths = Vec::with_capacity(num_groups);
        for g in 0..num_groups {
            let length = if g + 1 == num_groups {
                u64::from(self.group_length_of_last)
            } else {
                let raw = r.read_bits_u64(usize::from(self.group_length_bit_width)).map_err(|e| {
                    GribError::data_decode_from(7, byte_offset, "insufficient bits for group lengths", e)
                })?;
                u64::from(self.group_length_reference) + raw * u64::from(self.group_length_increment)
            };
            group_lengths.push(length);
        }

        r.align_to_byte();

        // Step 5: unpack each group's values (reference added in, constant
        // groups of width 0 repeat their reference value).
        let mut unpacked = Vec::with_capacity(group_lengths.iter().sum::<u64>() as usize);
        for g in 0..num_groups {
            let width = group_widths[g] as usize;
            let reference = group_refs[g] as i64;
            for _ in 0..group_lengths[g] {
                let value = if width == 0 {
                    reference
                } else {
                    let raw = r.read_bits_u64(width).map_err(|e| {
                        GribError::data_decode_from(7, byte_offset, "insufficient bits for group values", e)
                    })?;
                    reference + raw as i64
                };
                unpacked.push(value);
            }
        }

        // Step 6: prepend the spatial-diff seed values.
        let mut merged = Vec::with_capacity(seeds.len() + unpacked.len());
        merged.extend_from_slice(&seeds);
        merged.extend_from_slice(&unpacked);

        if merged.len() != num_values {
            return Err(GribError::data_decode(
                7,
                byte_offset,
                format!(
                    "decoded {} values but the bitmap declares {num_values} non-missing points",
                    merged.len()
                ),
            ));
        }

        // Step 7: reverse spatial differencing, re-adding `overall_min` at
        // every step rather than only at the seed.
        let mut g = vec![0i64; merged.len()];
        match self.spatial_diff_order {
            1 => {
                g[0] = merged[0];
                for i in 1..merged.len() {
                    g[i] = g[i - 1] + merged[i] + overall_min;
                }
            }
            2 => {
                g[0] = merged[0];
                g[1] = merged[1];
                for i in 2..merged.len() {
                    g[i] = 2 * g[i - 1] - g[i - 2] + merged[i] + overall_min;
                }
            }
            _ => unreachable!("validated above"),
        }

        // Step 8: apply scaling.
        Ok(g.into_iter().map(|v| self.unscale(v)).collect())
    }

    fn read_group_field(
        &self,
        r: &mut BitReader,
        num_groups: usize,
        width: u8,
        byte_offset: usize,
        what: &str,
    ) -> Result<Vec<u64>, GribError> {
        (0..num_groups)
            .map(|_| {
                r.read_bits_u64(usize::from(width)).map_err(|e| {
                    GribError::data_decode_from(7, byte_offset, format!("insufficient bits for {what}"), e)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::grib_int_from_bytes;

    fn header_bytes(order: u8, num_groups: u32, group_length_of_last: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0f32.to_be_bytes()); // R = 0
        buf.extend_from_slice(&0u16.to_be_bytes()); // E = 0
        buf.extend_from_slice(&0u16.to_be_bytes()); // D = 0
        buf.push(8); // group reference bit width
        buf.push(0); // original field type: floating point
        buf.push(1); // group splitting method: general
        buf.push(0); // missing value management: no explicit missing values
        buf.extend_from_slice(&0f32.to_be_bytes()); // primary missing value substitute
        buf.extend_from_slice(&0f32.to_be_bytes()); // secondary missing value substitute
        buf.extend_from_slice(&num_groups.to_be_bytes());
        buf.push(0); // group width reference
        buf.push(4); // group width bit width
        buf.extend_from_slice(&0u32.to_be_bytes()); // group length reference
        buf.push(1); // group length increment
        buf.extend_from_slice(&group_length_of_last.to_be_bytes());
        buf.push(4); // group length bit width
        buf.push(order);
        buf.push(1); // spatial diff octets
        buf
    }

    /// Testable Properties scenario 4: order-1 spatial differencing round
    /// trip through a single constant group.
    #[test]
    fn order_1_single_group_round_trip() {
        let header = header_bytes(1, 1, 3);
        let params = ComplexParams::from_buf(&header, 0).unwrap();

        // data: seed=10 (unsigned), overall_min=0 (sign-magnitude),
        // group_ref=0 (8 bits), group width=0 (4 bits, constant group, no
        // packed values), no length field since this is the only (= last)
        // group.
        let mut data = Vec::new();
        data.push(10u8); // seed, unsigned 1 octet
        data.push(0u8); // overall_min, sign-magnitude
        data.push(0u8); // group_ref, 8 bits
        data.push(0u8 << 4); // group width nibble = 0, top 4 bits of this byte

        // total points = 1 seed + group_length_of_last(3) subsequent deltas
        let decoded = params.decode_values(&data, 4, 0).unwrap();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded, vec![10.0, 10.0, 10.0, 10.0]);
        assert_eq!(grib_int_from_bytes(&[10u8]), 10);
    }

    #[test]
    fn unsupported_order_is_rejected() {
        let header = header_bytes(3, 1, 1);
        let params = ComplexParams::from_buf(&header, 0).unwrap();
        assert!(params.decode_values(&[0u8; 8], 2, 0).is_err());
    }

    #[test]
    fn mismatched_value_count_is_rejected() {
        let header = header_bytes(1, 1, 3);
        let params = ComplexParams::from_buf(&header, 0).unwrap();
        let mut data = Vec::new();
        data.push(10u8);
        data.push(0u8);
        data.push(0u8);
        data.push(0u8);
        assert!(params.decode_values(&data, 99, 0).is_err());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let buf = vec![0u8; 20];
        assert!(ComplexParams::from_buf(&buf, 0).is_err());
    }

    #[test]
    fn full_header_fields_are_parsed() {
        let mut header = header_bytes(1, 1, 3);
        header[10] = 2; // group splitting method
        header[11] = 1; // missing value management mode
        let params = ComplexParams::from_buf(&header, 0).unwrap();
        assert_eq!(params.group_splitting_method, 2);
        assert_eq!(params.missing_value_management_mode, 1);
        assert_eq!(params.spatial_diff_order, 1);
        assert_eq!(params.spatial_diff_octets, 1);
    }
}
