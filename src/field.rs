//! The public field record: one decoded, geolocated GRIB2 message.

use std::sync::Weak;

use crate::{codetables, message::Message};

/// The UTC time a field's data is valid for, from Section 1. Exposed as raw
/// calendar fields rather than forcing a particular date-time crate on every
/// caller; see [`ReferenceTime::to_naive_datetime`] when the
/// `time-calculation` feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[cfg(feature = "time-calculation")]
impl ReferenceTime {
    /// Converts to a [`chrono::NaiveDateTime`]. Returns `None` only if this
    /// crate's own Section 1 parser let an invalid calendar date through,
    /// which it already rejects at parse time.
    pub fn to_naive_datetime(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
            .and_then(|d| d.and_hms_opt(self.hour.into(), self.minute.into(), self.second.into()))
    }
}

/// One decoded GRIB2 field: a grid of values alongside the coordinates
/// they're valid at and the metadata needed to identify what they measure.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) message_index: usize,
    pub(crate) discipline: u8,
    pub(crate) centre_id: u16,
    pub(crate) parameter_category: u8,
    pub(crate) parameter_number: u8,
    pub(crate) grid_short_name: &'static str,
    pub(crate) ni: u32,
    pub(crate) nj: u32,
    pub(crate) lats: Vec<f32>,
    pub(crate) lons: Vec<f32>,
    pub(crate) values: Vec<f32>,
    pub(crate) level_type: u8,
    pub(crate) level_scale_factor: i8,
    pub(crate) level_scaled_value: i32,
    pub(crate) reference_time: ReferenceTime,
    pub(crate) message: Weak<Message>,
}

impl Field {
    /// Index of the message this field came from within the source stream,
    /// in the order boundaries were found.
    pub fn message_index(&self) -> usize {
        self.message_index
    }

    pub fn discipline(&self) -> u8 {
        self.discipline
    }

    pub fn centre_id(&self) -> u16 {
        self.centre_id
    }

    /// `(category, number)` within the parameter table named by
    /// [`Field::discipline`].
    pub fn parameter(&self) -> (u8, u8) {
        (self.parameter_category, self.parameter_number)
    }

    /// WMO short name such as `TMP` or `HGT`, when this crate recognizes
    /// the parameter triple.
    pub fn parameter_short_name(&self) -> Option<&'static str> {
        codetables::parameter_short_name(self.discipline, self.parameter_category, self.parameter_number)
    }

    pub fn grid_short_name(&self) -> &'static str {
        self.grid_short_name
    }

    /// Human-readable description of the level this field is valid at,
    /// e.g. `isobaric surface at 85000`. Falls back to the raw WMO
    /// surface-type code when this crate doesn't recognize it.
    pub fn level_description(&self) -> String {
        let value = f64::from(self.level_scaled_value) * 10f64.powi(-i32::from(self.level_scale_factor));
        match codetables::surface_type_name(self.level_type) {
            Some(name) => format!("{name} at {value}"),
            None => format!("surface type {} at {value}", self.level_type),
        }
    }

    /// Human-readable name of the originating/generating centre, when this
    /// crate recognizes [`Field::centre_id`].
    pub fn center_name(&self) -> Option<&'static str> {
        codetables::centre_name(self.centre_id)
    }

    /// The UTC time this field's data is valid for.
    pub fn reference_time(&self) -> ReferenceTime {
        self.reference_time
    }

    /// A weak handle to the parsed message this field was built from, for
    /// advanced consumers. Does not keep the message or its arrays alive;
    /// upgrading after the parse call that produced this field has returned
    /// yields `None`.
    pub fn message(&self) -> Weak<Message> {
        self.message.clone()
    }

    /// `(ni, nj)`: grid point counts along the two scan dimensions.
    pub fn grid_shape(&self) -> (u32, u32) {
        (self.ni, self.nj)
    }

    /// Latitude and longitude in degrees, one pair per grid point, in scan
    /// order; parallel to [`Field::values`].
    pub fn coordinates(&self) -> (&[f32], &[f32]) {
        (&self.lats, &self.lons)
    }

    /// Decoded values in scan order, with missing points carrying the
    /// `9.999e20` sentinel.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn non_missing(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied().filter(|v| *v != crate::decode::MISSING_VALUE_SENTINEL)
    }

    pub fn min(&self) -> Option<f32> {
        self.non_missing().fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.min(v))))
    }

    pub fn max(&self) -> Option<f32> {
        self.non_missing().fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
    }

    pub fn non_missing_count(&self) -> usize {
        self.non_missing().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::MISSING_VALUE_SENTINEL;

    fn sample_field() -> Field {
        Field {
            message_index: 0,
            discipline: 0,
            centre_id: 7,
            parameter_category: 0,
            parameter_number: 0,
            grid_short_name: "regular_ll",
            ni: 2,
            nj: 2,
            lats: vec![1.0, 1.0, 0.0, 0.0],
            lons: vec![0.0, 1.0, 0.0, 1.0],
            values: vec![10.0, MISSING_VALUE_SENTINEL, 5.0, 20.0],
            level_type: 100,
            level_scale_factor: 0,
            level_scaled_value: 85000,
            reference_time: ReferenceTime {
                year: 2024,
                month: 1,
                day: 2,
                hour: 0,
                minute: 0,
                second: 0,
            },
            message: Weak::new(),
        }
    }

    #[test]
    fn min_max_ignore_missing_sentinel() {
        let field = sample_field();
        assert_eq!(field.min(), Some(5.0));
        assert_eq!(field.max(), Some(20.0));
        assert_eq!(field.non_missing_count(), 3);
    }

    #[test]
    fn parameter_short_name_resolves() {
        let field = sample_field();
        assert_eq!(field.parameter_short_name(), Some("TMP"));
    }

    #[test]
    fn all_missing_field_has_no_min_or_max() {
        let mut field = sample_field();
        field.values = vec![MISSING_VALUE_SENTINEL; 4];
        assert_eq!(field.min(), None);
        assert_eq!(field.max(), None);
        assert_eq!(field.non_missing_count(), 0);
    }

    #[test]
    fn level_description_resolves_known_surface_type() {
        let field = sample_field();
        assert_eq!(field.level_description(), "isobaric surface at 85000");
    }

    #[test]
    fn level_description_falls_back_for_unknown_surface_type() {
        let mut field = sample_field();
        field.level_type = 250;
        assert_eq!(field.level_description(), "surface type 250 at 85000");
    }

    #[test]
    fn center_name_resolves_known_centre() {
        let field = sample_field();
        assert_eq!(field.center_name(), Some("US National Weather Service - NCEP"));
    }

    #[test]
    fn reference_time_is_threaded_through() {
        let field = sample_field();
        assert_eq!(field.reference_time().year, 2024);
    }

    #[test]
    fn message_handle_does_not_outlive_the_parsed_message() {
        let field = sample_field();
        assert!(field.message().upgrade().is_none());
    }
}
