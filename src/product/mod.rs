//! Product definition templates: Section 4, dispatched by template
//! number.

use crate::{
    error::GribError,
    utils::{read_as, GribInt},
};

/// Shared fields carried by every supported product definition template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FixedSurface {
    pub(crate) surface_type: u8,
    pub(crate) scale_factor: i8,
    pub(crate) scaled_value: i32,
}

impl FixedSurface {
    fn from_buf(buf: &[u8]) -> Self {
        Self {
            surface_type: buf[0],
            scale_factor: read_as!(u8, buf, 1).as_grib_int(),
            scaled_value: read_as!(u32, buf, 2).as_grib_int(),
        }
    }
}

/// Template 4.0: analysis or forecast at a horizontal level, fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AnalysisOrForecast {
    pub(crate) parameter_category: u8,
    pub(crate) parameter_number: u8,
    pub(crate) generating_process_type: u8,
    pub(crate) background_process: u8,
    pub(crate) generating_process_id: u8,
    pub(crate) hours_after_cutoff: u16,
    pub(crate) minutes_after_cutoff: u8,
    pub(crate) time_range_unit: u8,
    pub(crate) forecast_time: u32,
    pub(crate) first_surface: FixedSurface,
    pub(crate) second_surface: FixedSurface,
}

impl AnalysisOrForecast {
    const SIZE: usize = 25;

    fn from_buf(buf: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        if buf.len() < Self::SIZE {
            return Err(GribError::invalid_format(
                4,
                byte_offset,
                format!(
                    "Template 4.0 body must be at least {} bytes, found {}",
                    Self::SIZE,
                    buf.len()
                ),
            ));
        }
        Ok(Self {
            parameter_category: buf[0],
            parameter_number: buf[1],
            generating_process_type: buf[2],
            background_process: buf[3],
            generating_process_id: buf[4],
            hours_after_cutoff: read_as!(u16, buf, 5),
            minutes_after_cutoff: buf[7],
            time_range_unit: buf[8],
            forecast_time: read_as!(u32, buf, 9),
            first_surface: FixedSurface::from_buf(&buf[13..19]),
            second_surface: FixedSurface::from_buf(&buf[19..25]),
        })
    }
}

/// One statistically-processed time range record within Template 4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeRange {
    pub(crate) statistical_process: u8,
    pub(crate) increment_type: u8,
    pub(crate) time_range_unit: u8,
    pub(crate) time_range_length: u32,
    pub(crate) time_increment_unit: u8,
    pub(crate) time_increment: u32,
}

impl TimeRange {
    const SIZE: usize = 12;

    fn from_buf(buf: &[u8]) -> Self {
        Self {
            statistical_process: buf[0],
            increment_type: buf[1],
            time_range_unit: buf[2],
            time_range_length: read_as!(u32, buf, 3),
            time_increment_unit: buf[7],
            time_increment: read_as!(u32, buf, 8),
        }
    }
}

/// Template 4.8: average, accumulation or other statistically-processed
/// field over a time interval. Carries the Template 4.0 fields plus the end
/// of the overall interval and a list of per-range processing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatisticallyProcessed {
    pub(crate) base: AnalysisOrForecast,
    pub(crate) end_year: u16,
    pub(crate) end_month: u8,
    pub(crate) end_day: u8,
    pub(crate) end_hour: u8,
    pub(crate) end_minute: u8,
    pub(crate) end_second: u8,
    pub(crate) missing_value_count: u32,
    pub(crate) time_ranges: Vec<TimeRange>,
}

impl StatisticallyProcessed {
    const HEADER_SIZE: usize = AnalysisOrForecast::SIZE + 12;

    fn from_buf(buf: &[u8], byte_offset: usize) -> Result<Self, GribError> {
        let base = AnalysisOrForecast::from_buf(buf, byte_offset)?;
        if buf.len() < Self::HEADER_SIZE {
            return Err(GribError::invalid_format(
                4,
                byte_offset,
                format!(
                    "Template 4.8 header must be at least {} bytes, found {}",
                    Self::HEADER_SIZE,
                    buf.len()
                ),
            ));
        }
        let tail = &buf[AnalysisOrForecast::SIZE..];
        let num_time_ranges = usize::from(tail[7]);
        let expected_len = Self::HEADER_SIZE + num_time_ranges * TimeRange::SIZE;
        if buf.len() < expected_len {
            return Err(GribError::invalid_format(
                4,
                byte_offset,
                format!(
                    "Template 4.8 declares {num_time_ranges} time ranges, needs {expected_len} bytes, found {}",
                    buf.len()
                ),
            ));
        }
        let ranges_start = Self::HEADER_SIZE;
        let time_ranges = (0..num_time_ranges)
            .map(|n| {
                let start = ranges_start + n * TimeRange::SIZE;
                TimeRange::from_buf(&buf[start..start + TimeRange::SIZE])
            })
            .collect();

        Ok(Self {
            base,
            end_year: read_as!(u16, tail, 0),
            end_month: tail[2],
            end_day: tail[3],
            end_hour: tail[4],
            end_minute: tail[5],
            end_second: tail[6],
            missing_value_count: read_as!(u32, tail, 8),
            time_ranges,
        })
    }
}

/// The Section 4 product variant (tagged sum type over supported templates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProductDefinition {
    AnalysisOrForecast(AnalysisOrForecast),
    StatisticallyProcessed(StatisticallyProcessed),
}

impl ProductDefinition {
    /// Dispatches on the Product Definition Template Number (Section 4).
    pub(crate) fn from_template(
        template_number: u16,
        buf: &[u8],
        byte_offset: usize,
    ) -> Result<Self, GribError> {
        match template_number {
            0 => Ok(Self::AnalysisOrForecast(AnalysisOrForecast::from_buf(
                buf,
                byte_offset,
            )?)),
            8 => Ok(Self::StatisticallyProcessed(StatisticallyProcessed::from_buf(
                buf,
                byte_offset,
            )?)),
            n => Err(GribError::unsupported_template(4, n)),
        }
    }

    pub(crate) fn parameter(&self) -> (u8, u8) {
        match self {
            Self::AnalysisOrForecast(p) => (p.parameter_category, p.parameter_number),
            Self::StatisticallyProcessed(p) => {
                (p.base.parameter_category, p.base.parameter_number)
            }
        }
    }

    /// The level this field is valid at; every supported template carries
    /// one as its first fixed-surface descriptor.
    pub(crate) fn first_surface(&self) -> FixedSurface {
        match self {
            Self::AnalysisOrForecast(p) => p.first_surface,
            Self::StatisticallyProcessed(p) => p.base.first_surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_4_0_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; AnalysisOrForecast::SIZE];
        buf[0] = 0; // temperature category
        buf[1] = 0; // TMP
        buf[9..13].copy_from_slice(&6u32.to_be_bytes());
        buf[13] = 100; // isobaric surface
        buf[15..19].copy_from_slice(&85000u32.to_be_bytes());
        buf
    }

    #[test]
    fn template_0_round_trip() {
        let buf = template_4_0_bytes();
        let product = ProductDefinition::from_template(0, &buf, 0).unwrap();
        assert_eq!(product.parameter(), (0, 0));
        match product {
            ProductDefinition::AnalysisOrForecast(p) => {
                assert_eq!(p.forecast_time, 6);
                assert_eq!(p.first_surface.surface_type, 100);
                assert_eq!(p.first_surface.scaled_value, 85000);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn template_8_with_two_time_ranges() {
        let mut buf = template_4_0_bytes();
        buf.extend_from_slice(&2024u16.to_be_bytes());
        buf.extend_from_slice(&[1, 2, 0, 0, 0]); // month,day,hour,min,sec
        buf.push(2); // n = 2 time ranges
        buf.extend_from_slice(&0u32.to_be_bytes()); // missing value count
        for _ in 0..2 {
            buf.push(1); // statistical process: average
            buf.push(255); // increment type: none
            buf.push(1); // unit: hour
            buf.extend_from_slice(&24u32.to_be_bytes());
            buf.push(255);
            buf.extend_from_slice(&0u32.to_be_bytes());
        }
        let product = ProductDefinition::from_template(8, &buf, 0).unwrap();
        match product {
            ProductDefinition::StatisticallyProcessed(p) => {
                assert_eq!(p.end_year, 2024);
                assert_eq!(p.time_ranges.len(), 2);
                assert_eq!(p.time_ranges[0].time_range_length, 24);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unsupported_template_is_rejected() {
        let buf = template_4_0_bytes();
        assert!(ProductDefinition::from_template(99, &buf, 0).is_err());
    }

    #[test]
    fn truncated_body_is_rejected() {
        let buf = vec![0u8; 10];
        assert!(ProductDefinition::from_template(0, &buf, 0).is_err());
    }
}
