//! WMO code table lookups: small coded enums via `num_enum`, plus the
//! parameter short-name table as plain immutable data.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Table 5.6 — order of spatial differencing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum Table5_6 {
    FirstOrderSpatialDifferencing = 1,
    SecondOrderSpatialDifferencing = 2,
}

/// Table 3.2 — shape of the reference system.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum Table3_2 {
    SphericalRadius6367470 = 0,
    SphericalUserDefinedRadius = 1,
    Iau1965 = 2,
    UserDefinedOblate = 3,
    Iag1980 = 4,
    Wgs84 = 5,
    SphericalRadius6371229 = 6,
    UserDefinedOblateMeters = 7,
    SphericalRadius6371200 = 8,
}

/// Table 4.4 — unit of time range.
#[derive(Debug, Clone, Copy, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub(crate) enum Table4_4 {
    Minute = 0,
    Hour = 1,
    Day = 2,
    Month = 3,
    Year = 4,
    Decade = 5,
    Normal = 6,
    Century = 7,
    ThreeHours = 10,
    SixHours = 11,
    TwelveHours = 12,
    Second = 13,
    Missing = 255,
}

/// `(discipline, category, number) -> short name`, the subset of the WMO
/// parameter tables this crate resolves. Unknown triples fall back to
/// `None` rather than a placeholder string.
const PARAMETER_SHORT_NAMES: &[((u8, u8, u8), &str)] = &[
    ((0, 0, 0), "TMP"),
    ((0, 0, 6), "DPT"),
    ((0, 1, 0), "SPFH"),
    ((0, 1, 1), "RH"),
    ((0, 1, 8), "APCP"),
    ((0, 2, 1), "WIND"),
    ((0, 2, 2), "UGRD"),
    ((0, 2, 3), "VGRD"),
    ((0, 3, 0), "PRES"),
    ((0, 3, 1), "PRMSL"),
    ((0, 3, 5), "HGT"),
    ((0, 6, 1), "TCDC"),
    ((2, 0, 0), "LAND"),
    ((10, 3, 0), "ICEC"),
];

/// Looks up a WMO short name such as `TMP` or `HGT` for a (discipline,
/// category, parameter number) triple.
pub fn parameter_short_name(discipline: u8, category: u8, number: u8) -> Option<&'static str> {
    PARAMETER_SHORT_NAMES
        .iter()
        .find(|((d, c, n), _)| *d == discipline && *c == category && *n == number)
        .map(|(_, name)| *name)
}

/// Common Code Table C-1 — originating/generating centre, the subset this
/// crate resolves. Unknown ids fall back to `None`.
const CENTRE_NAMES: &[(u16, &str)] = &[
    (7, "US National Weather Service - NCEP"),
    (8, "US National Weather Service - NWSTG"),
    (9, "US National Weather Service - Other"),
    (34, "Japan Meteorological Agency - Tokyo"),
    (54, "Environment Canada - CMC"),
    (57, "US Air Force - AFWA"),
    (58, "US Navy - FNMOC"),
    (74, "UK Met Office - Exeter"),
    (78, "Deutscher Wetterdienst - Offenbach"),
    (85, "Meteo France - Toulouse"),
    (97, "European Space Agency"),
    (98, "ECMWF"),
    (160, "NOAA/NWS/NCEP Environmental Modeling Center"),
];

/// Looks up the human-readable name of an originating centre from Section
/// 1's centre id.
pub fn centre_name(centre_id: u16) -> Option<&'static str> {
    CENTRE_NAMES.iter().find(|(id, _)| *id == centre_id).map(|(_, name)| *name)
}

/// Table 4.5 — type of fixed surface, the subset this crate resolves.
const SURFACE_TYPE_NAMES: &[(u8, &str)] = &[
    (1, "ground or water surface"),
    (100, "isobaric surface"),
    (101, "mean sea level"),
    (102, "altitude above mean sea level"),
    (103, "height above ground"),
    (104, "sigma level"),
    (105, "hybrid level"),
    (106, "depth below land surface"),
    (200, "entire atmosphere layer"),
];

/// Looks up the human-readable name of a fixed-surface type code.
pub fn surface_type_name(code: u8) -> Option<&'static str> {
    SURFACE_TYPE_NAMES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_parameter_resolves() {
        assert_eq!(parameter_short_name(0, 0, 0), Some("TMP"));
        assert_eq!(parameter_short_name(0, 3, 5), Some("HGT"));
    }

    #[test]
    fn unknown_parameter_is_none() {
        assert_eq!(parameter_short_name(9, 9, 9), None);
    }

    #[test]
    fn table_5_6_round_trip() {
        assert_eq!(Table5_6::try_from(1u8), Ok(Table5_6::FirstOrderSpatialDifferencing));
        assert!(Table5_6::try_from(3u8).is_err());
    }

    #[test]
    fn known_centre_resolves() {
        assert_eq!(centre_name(7), Some("US National Weather Service - NCEP"));
        assert_eq!(centre_name(98), Some("ECMWF"));
    }

    #[test]
    fn unknown_centre_is_none() {
        assert_eq!(centre_name(9999), None);
    }

    #[test]
    fn known_surface_type_resolves() {
        assert_eq!(surface_type_name(100), Some("isobaric surface"));
    }

    #[test]
    fn unknown_surface_type_is_none() {
        assert_eq!(surface_type_name(250), None);
    }
}
