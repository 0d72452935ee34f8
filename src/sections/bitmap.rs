//! Section 6 (Bitmap), marks which grid points of Section 7 are present
//! versus missing. Builds on the Section 3 point count threaded in from the
//! grid section.

use crate::error::GribError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BitmapSection {
    /// Indicator 255: every point is present.
    None,
    /// Indicator 0: an explicit bitmap follows, one bit per point,
    /// MSB-first, packed into whole octets.
    Explicit(Vec<bool>),
}

impl BitmapSection {
    pub(crate) fn from_buf(
        body: &[u8],
        num_data_points: usize,
        byte_offset: usize,
    ) -> Result<Self, GribError> {
        let indicator = *body
            .first()
            .ok_or_else(|| GribError::invalid_format(6, byte_offset, "empty bitmap section body"))?;

        match indicator {
            255 => Ok(Self::None),
            0 => {
                let packed = &body[1..];
                let needed_bytes = num_data_points.div_ceil(8);
                if packed.len() < needed_bytes {
                    return Err(GribError::invalid_format(
                        6,
                        byte_offset,
                        format!(
                            "bitmap needs {needed_bytes} bytes for {num_data_points} points, found {}",
                            packed.len()
                        ),
                    ));
                }
                let mut present = Vec::with_capacity(num_data_points);
                for idx in 0..num_data_points {
                    let byte = packed[idx / 8];
                    let bit = (byte >> (7 - idx % 8)) & 1;
                    present.push(bit == 1);
                }
                Ok(Self::Explicit(present))
            }
            // Predefined centre bitmaps (1-253) and "reuse the bitmap from an
            // earlier field in this message" (254) both require state this
            // crate does not carry, since multi-field messages are rejected
            // outright. This is a bitmap indicator, not a template number, so
            // it's reported as a malformed section rather than an
            // unsupported template.
            n => Err(GribError::invalid_format(
                6,
                byte_offset,
                format!("bitmap indicator {n} requires a predefined or prior-field bitmap, which this crate does not carry"),
            )),
        }
    }

    pub(crate) fn is_present(&self, idx: usize) -> bool {
        match self {
            Self::None => true,
            Self::Explicit(bits) => bits[idx],
        }
    }

    pub(crate) fn count_present(&self, total: usize) -> usize {
        match self {
            Self::None => total,
            Self::Explicit(bits) => bits.iter().filter(|&&b| b).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bitmap_means_all_present() {
        let section = BitmapSection::from_buf(&[255], 10, 0).unwrap();
        assert!(section.is_present(0));
        assert_eq!(section.count_present(10), 10);
    }

    /// Testable Properties scenario 2: explicit bitmap with a mix of
    /// present/missing points.
    #[test]
    fn explicit_bitmap_round_trip() {
        // 10 points: bits 1,0,1,1,0,0,1,0,1,0 packed MSB-first, padded to 2 bytes.
        let packed = [0b1011_0010, 0b1000_0000];
        let mut body = vec![0u8];
        body.extend_from_slice(&packed);
        let section = BitmapSection::from_buf(&body, 10, 0).unwrap();
        let expected = [true, false, true, true, false, false, true, false, true, false];
        for (i, &exp) in expected.iter().enumerate() {
            assert_eq!(section.is_present(i), exp, "bit {i}");
        }
        assert_eq!(section.count_present(10), 5);
    }

    #[test]
    fn short_bitmap_is_rejected() {
        let body = [0u8, 0xff];
        assert!(BitmapSection::from_buf(&body, 100, 0).is_err());
    }

    #[test]
    fn predefined_bitmap_is_unsupported() {
        let body = [3u8];
        assert!(BitmapSection::from_buf(&body, 10, 0).is_err());
    }
}
