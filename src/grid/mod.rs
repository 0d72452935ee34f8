//! Grid templates: grid definition variants and their inverse
//! projections into (lat, lon) pairs.

mod earth;
mod lambert;
mod latlon;
mod mercator;
mod polar_stereographic;
mod scanning;

pub(crate) use lambert::LambertGrid;
pub(crate) use latlon::LatLonGrid;
pub(crate) use mercator::MercatorGrid;
pub(crate) use polar_stereographic::PolarStereographicGrid;

use crate::error::GribError;

/// Identifies a grid for the purposes of the coordinate dedup cache:
/// `(template_number, declared_point_count, ni, nj)` is sufficient to
/// identify identical projections in practice.
pub(crate) type GridKey = (u16, u32, u32, u32);

/// The Section 3 grid variant (tagged sum type over supported templates).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GridDefinition {
    LatLon(LatLonGrid),
    Mercator(MercatorGrid),
    PolarStereographic(PolarStereographicGrid),
    Lambert(LambertGrid),
}

impl GridDefinition {
    /// Dispatches on the Grid Definition Template Number (Section 3).
    pub(crate) fn from_template(template_number: u16, buf: &[u8]) -> Result<Self, GribError> {
        let grid = match template_number {
            0 => Self::LatLon(LatLonGrid::from_buf(buf)),
            10 => Self::Mercator(MercatorGrid::from_buf(buf)),
            20 => Self::PolarStereographic(PolarStereographicGrid::from_buf(buf)),
            30 => Self::Lambert(LambertGrid::from_buf(buf)),
            n => return Err(GribError::unsupported_template(3, n)),
        };
        Ok(grid)
    }

    pub(crate) fn total_points(&self) -> u32 {
        match self {
            Self::LatLon(g) => g.total_points(),
            Self::Mercator(g) => g.total_points(),
            Self::PolarStereographic(g) => g.total_points(),
            Self::Lambert(g) => g.total_points(),
        }
    }

    pub(crate) fn ni_nj(&self) -> (u32, u32) {
        match self {
            Self::LatLon(g) => (g.ni, g.nj),
            Self::Mercator(g) => (g.ni, g.nj),
            Self::PolarStereographic(g) => (g.ni, g.nj),
            Self::Lambert(g) => (g.ni, g.nj),
        }
    }

    /// Returns `(lats, lons)` of length `ni * nj`, in scan order.
    pub(crate) fn coordinates(&self) -> Result<(Vec<f32>, Vec<f32>), GribError> {
        match self {
            Self::LatLon(g) => g.coordinates(),
            Self::Mercator(g) => g.coordinates(),
            Self::PolarStereographic(g) => g.coordinates(),
            Self::Lambert(g) => g.coordinates(),
        }
    }

    pub(crate) fn short_name(&self) -> &'static str {
        match self {
            Self::LatLon(_) => "regular_ll",
            Self::Mercator(_) => "mercator",
            Self::PolarStereographic(_) => "polar_stereographic",
            Self::Lambert(_) => "lambert",
        }
    }

    pub(crate) fn grid_key(&self, template_number: u16, declared_point_count: u32) -> GridKey {
        let (ni, nj) = self.ni_nj();
        (template_number, declared_point_count, ni, nj)
    }
}
