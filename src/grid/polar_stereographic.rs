//! Grid Definition Template 3.20 — polar stereographic.

use super::{
    earth::{EarthShapeDefinition, PROJECTION_SPHERE_RADIUS_M},
    scanning::{normalize_longitude, step_signs, GridPointIndexIterator, ScanningMode},
};
use crate::{
    error::GribError,
    utils::{read_as, GribInt},
};

/// Projection-centre flag byte (bit 0 set ⇒ south pole on the projection
/// plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProjectionCentreFlag(pub(crate) u8);

impl ProjectionCentreFlag {
    pub(crate) fn is_south_pole(&self) -> bool {
        self.0 & 0b1000_0000 != 0
    }

    pub(crate) fn has_unsupported_flags(&self) -> bool {
        self.0 & 0b0111_1111 != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PolarStereographicGrid {
    pub(crate) earth_shape: EarthShapeDefinition,
    pub(crate) ni: u32,
    pub(crate) nj: u32,
    pub(crate) first_point_lat_microdeg: i32,
    pub(crate) first_point_lon_microdeg: i32,
    pub(crate) lad_microdeg: i32,
    pub(crate) lov_microdeg: i32,
    pub(crate) dx_mm: u32,
    pub(crate) dy_mm: u32,
    pub(crate) projection_centre: ProjectionCentreFlag,
    pub(crate) scanning_mode: ScanningMode,
}

impl PolarStereographicGrid {
    pub(crate) fn total_points(&self) -> u32 {
        self.ni * self.nj
    }

    /// USGS GCTP spherical polar-stereographic inverse projection.
    pub(crate) fn coordinates(&self) -> Result<(Vec<f32>, Vec<f32>), GribError> {
        self.scanning_mode.check_supported()?;
        if self.projection_centre.has_unsupported_flags() {
            return Err(GribError::coordinate_projection(format!(
                "unsupported projection centre flags: {:#010b}",
                self.projection_centre.0
            )));
        }

        let r = PROJECTION_SPHERE_RADIUS_M;
        let lad = (f64::from(self.lad_microdeg) * 1e-6).abs().to_radians();
        let lov = (f64::from(self.lov_microdeg) * 1e-6).to_radians();
        let lat1 = (f64::from(self.first_point_lat_microdeg) * 1e-6).to_radians();
        let lon1 = (f64::from(self.first_point_lon_microdeg) * 1e-6).to_radians();

        let mcs = lad.cos();
        let tcs = (std::f64::consts::FRAC_PI_4 - lad / 2.0).tan();
        let k0 = mcs / tcs;
        let south = self.projection_centre.is_south_pole();
        let pole_sign = if south { -1.0 } else { 1.0 };

        let rho_of = |lat: f64| {
            r * k0 * (std::f64::consts::FRAC_PI_4 - pole_sign * lat / 2.0).tan()
        };
        let rho1 = rho_of(lat1);
        let theta1 = pole_sign * (lon1 - lov);
        let x0 = rho1 * theta1.sin();
        let y0 = -pole_sign * rho1 * theta1.cos();

        let (sign_i, sign_j) = step_signs(self.scanning_mode);
        let dx = f64::from(self.dx_mm) * 1e-3 * sign_i;
        let dy = f64::from(self.dy_mm) * 1e-3 * sign_j;

        let indices = GridPointIndexIterator::new(self.ni as usize, self.nj as usize, self.scanning_mode);
        let mut lats = Vec::with_capacity((self.ni * self.nj) as usize);
        let mut lons = Vec::with_capacity((self.ni * self.nj) as usize);
        for (i, j) in indices {
            let x = x0 + dx * (i as f64);
            let y = y0 + dy * (j as f64);
            let rho = (x * x + y * y).sqrt();

            let (lat, lon) = if rho < 1e-9 {
                (pole_sign * std::f64::consts::FRAC_PI_2, 0.0)
            } else {
                let t = rho / (r * k0);
                let lat = pole_sign * (std::f64::consts::FRAC_PI_2 - 2.0 * t.atan());
                let theta = x.atan2(-pole_sign * y);
                let lon = lov + pole_sign * theta;
                (lat, lon)
            };

            lats.push(lat.to_degrees() as f32);
            lons.push(normalize_longitude(lon.to_degrees()) as f32);
        }
        Ok((lats, lons))
    }

    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        Self {
            earth_shape: EarthShapeDefinition::from_buf(buf),
            ni: read_as!(u32, buf, 16),
            nj: read_as!(u32, buf, 20),
            first_point_lat_microdeg: read_as!(u32, buf, 24).as_grib_int(),
            first_point_lon_microdeg: read_as!(u32, buf, 28).as_grib_int(),
            lad_microdeg: read_as!(u32, buf, 33).as_grib_int(),
            lov_microdeg: read_as!(u32, buf, 37).as_grib_int(),
            dx_mm: read_as!(u32, buf, 41),
            dy_mm: read_as!(u32, buf, 45),
            projection_centre: ProjectionCentreFlag(read_as!(u8, buf, 49)),
            scanning_mode: ScanningMode(read_as!(u8, buf, 50)),
        }
    }
}
