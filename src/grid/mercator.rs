//! Grid Definition Template 3.10 — Mercator, in the same
//! struct-plus-`from_buf`-plus-`coordinates` shape as the other grid
//! templates, using the WMO GDT 3.10 field layout.

use super::{
    earth::{EarthShapeDefinition, PROJECTION_SPHERE_RADIUS_M},
    scanning::{normalize_longitude, step_signs, GridPointIndexIterator, ScanningMode},
};
use crate::{
    error::GribError,
    utils::{read_as, GribInt},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MercatorGrid {
    pub(crate) earth_shape: EarthShapeDefinition,
    pub(crate) ni: u32,
    pub(crate) nj: u32,
    pub(crate) first_point_lat_microdeg: i32,
    pub(crate) first_point_lon_microdeg: i32,
    pub(crate) lad_microdeg: i32,
    pub(crate) dx_mm: u32,
    pub(crate) dy_mm: u32,
    pub(crate) scanning_mode: ScanningMode,
}

impl MercatorGrid {
    pub(crate) fn total_points(&self) -> u32 {
        self.ni * self.nj
    }

    pub(crate) fn coordinates(&self) -> Result<(Vec<f32>, Vec<f32>), GribError> {
        self.scanning_mode.check_supported()?;

        let r = PROJECTION_SPHERE_RADIUS_M;
        let lat1 = (f64::from(self.first_point_lat_microdeg) * 1e-6).to_radians();
        let lon1 = (f64::from(self.first_point_lon_microdeg) * 1e-6).to_radians();
        let lad = (f64::from(self.lad_microdeg) * 1e-6).to_radians();
        let scale = 1.0 / lad.cos();

        let x0 = r * lon1;
        let y0 = r * (std::f64::consts::FRAC_PI_4 + lat1 / 2.0).tan().ln();

        let (sign_i, sign_j) = step_signs(self.scanning_mode);
        let dx = f64::from(self.dx_mm) * 1e-3 * scale * sign_i;
        let dy = f64::from(self.dy_mm) * 1e-3 * scale * sign_j;

        let indices = GridPointIndexIterator::new(self.ni as usize, self.nj as usize, self.scanning_mode);
        let mut lats = Vec::with_capacity((self.ni * self.nj) as usize);
        let mut lons = Vec::with_capacity((self.ni * self.nj) as usize);
        for (i, j) in indices {
            let x = x0 + dx * (i as f64);
            let y = y0 + dy * (j as f64);

            let lon = x / r;
            let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

            lats.push(lat.to_degrees() as f32);
            lons.push(normalize_longitude(lon.to_degrees()) as f32);
        }
        Ok((lats, lons))
    }

    /// Byte offsets mirror the WMO GDT 3.10 field layout, relative to octet
    /// 15 (the start of the shared shape-of-the-earth block), in the same
    /// convention the other grid templates' `from_buf` methods use.
    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        Self {
            earth_shape: EarthShapeDefinition::from_buf(buf),
            ni: read_as!(u32, buf, 16),
            nj: read_as!(u32, buf, 20),
            first_point_lat_microdeg: read_as!(u32, buf, 24).as_grib_int(),
            first_point_lon_microdeg: read_as!(u32, buf, 28).as_grib_int(),
            lad_microdeg: read_as!(u32, buf, 41).as_grib_int(),
            scanning_mode: ScanningMode(read_as!(u8, buf, 45)),
            dx_mm: read_as!(u32, buf, 46),
            dy_mm: read_as!(u32, buf, 50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equatorial_mercator_origin() {
        let grid = MercatorGrid {
            earth_shape: EarthShapeDefinition::from_buf(&[0; 15]),
            ni: 2,
            nj: 2,
            first_point_lat_microdeg: 0,
            first_point_lon_microdeg: 0,
            lad_microdeg: 0,
            dx_mm: 1_000_000,
            dy_mm: 1_000_000,
            scanning_mode: ScanningMode(0b0100_0000),
        };
        let (lats, lons) = grid.coordinates().unwrap();
        assert!(lats[0].abs() < 1e-6);
        assert!(lons[0].abs() < 1e-6);
        assert!(lats[1] > lats[0]); // j increases northward under positive-j scanning
    }

    #[test]
    fn longitudes_normalized() {
        let grid = MercatorGrid {
            earth_shape: EarthShapeDefinition::from_buf(&[0; 15]),
            ni: 4,
            nj: 1,
            first_point_lat_microdeg: 0,
            first_point_lon_microdeg: -10_000_000,
            lad_microdeg: 0,
            dx_mm: 50_000_000,
            dy_mm: 0,
            scanning_mode: ScanningMode(0b0100_0000),
        };
        let (_, lons) = grid.coordinates().unwrap();
        assert!(lons.iter().all(|&l| (0.0..360.0).contains(&l)));
    }
}
