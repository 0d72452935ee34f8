//! Grid Definition Template 3.30 — Lambert conformal conic.

use super::{
    earth::{EarthShapeDefinition, PROJECTION_SPHERE_RADIUS_M},
    scanning::{step_signs, GridPointIndexIterator, ScanningMode},
};
use crate::{
    error::GribError,
    utils::{read_as, GribInt},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LambertGrid {
    pub(crate) earth_shape: EarthShapeDefinition,
    pub(crate) ni: u32,
    pub(crate) nj: u32,
    pub(crate) first_point_lat_microdeg: i32,
    pub(crate) first_point_lon_microdeg: i32,
    pub(crate) lad_microdeg: i32,
    pub(crate) lov_microdeg: i32,
    pub(crate) dx_mm: u32,
    pub(crate) dy_mm: u32,
    pub(crate) scanning_mode: ScanningMode,
    pub(crate) latin1_microdeg: i32,
    pub(crate) latin2_microdeg: i32,
}

impl LambertGrid {
    pub(crate) fn total_points(&self) -> u32 {
        self.ni * self.nj
    }

    /// Inverse Lambert conformal conic projection, spherical earth.
    pub(crate) fn coordinates(&self) -> Result<(Vec<f32>, Vec<f32>), GribError> {
        self.scanning_mode.check_supported()?;

        let r = PROJECTION_SPHERE_RADIUS_M;
        let lat1 = f64::from(self.first_point_lat_microdeg) * 1e-6;
        let lon1 = f64::from(self.first_point_lon_microdeg) * 1e-6;
        let lov = f64::from(self.lov_microdeg) * 1e-6;
        let latin1 = f64::from(self.latin1_microdeg) * 1e-6;
        let latin2 = f64::from(self.latin2_microdeg) * 1e-6;

        let (lat1, lon1, lov, latin1, latin2) = (
            lat1.to_radians(),
            lon1.to_radians(),
            lov.to_radians(),
            latin1.to_radians(),
            latin2.to_radians(),
        );

        let n = if (latin1 - latin2).abs() < 1e-6 {
            latin1.sin()
        } else {
            (latin1.cos() / latin2.cos()).ln()
                / ((std::f64::consts::FRAC_PI_4 + latin2 / 2.0).tan()
                    / (std::f64::consts::FRAC_PI_4 + latin1 / 2.0).tan())
                .ln()
        };
        let f = latin1.cos() * (std::f64::consts::FRAC_PI_4 + latin1 / 2.0).tan().powf(n) / n;

        let rho = |lat: f64| r * f / (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().powf(n);
        let rho1 = rho(lat1);
        let theta1 = n * (lon1 - lov);
        let x0 = rho1 * theta1.sin();
        let y0 = rho1 * theta1.cos();

        let (sign_i, sign_j) = step_signs(self.scanning_mode);
        let dx = f64::from(self.dx_mm) * 1e-3 * sign_i;
        let dy = f64::from(self.dy_mm) * 1e-3 * sign_j;

        let indices = GridPointIndexIterator::new(self.ni as usize, self.nj as usize, self.scanning_mode);
        let mut lats = Vec::with_capacity((self.ni * self.nj) as usize);
        let mut lons = Vec::with_capacity((self.ni * self.nj) as usize);
        for (i, j) in indices {
            let mut x = x0 + dx * (i as f64);
            let mut y = y0 - dy * (j as f64);

            let mut rho_p = (x * x + y * y).sqrt();
            if n < 0.0 {
                rho_p = -rho_p;
                x = -x;
                y = -y;
            }
            let theta = x.atan2(-y);
            let lat = 2.0 * (r * f / rho_p).powf(1.0 / n).atan() - std::f64::consts::FRAC_PI_2;
            let lon = lov + theta / n;

            lats.push(lat.to_degrees() as f32);
            lons.push(super::scanning::normalize_longitude(lon.to_degrees()) as f32);
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
            scanning_mode: ScanningMode(read_as!(u8, buf, 50)),
            latin1_microdeg: read_as!(u32, buf, 51).as_grib_int(),
            latin2_microdeg: read_as!(u32, buf, 55).as_grib_int(),
        }
    }
}
