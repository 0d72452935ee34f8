//! Grid Definition Template 3.0 — equirectangular lat/lon grid.

use super::scanning::{normalize_longitude, step_signs, GridPointIndexIterator, ScanningMode};
use crate::{
    error::GribError,
    utils::{read_as, GribInt},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LatLonGrid {
    pub(crate) ni: u32,
    pub(crate) nj: u32,
    pub(crate) first_point_lat_millideg: i32,
    pub(crate) first_point_lon_millideg: i32,
    pub(crate) di_millideg: u32,
    pub(crate) dj_millideg: u32,
    pub(crate) scanning_mode: ScanningMode,
}

impl LatLonGrid {
    pub(crate) fn total_points(&self) -> u32 {
        self.ni * self.nj
    }

    /// Returns `(lats, lons)`, each of length `ni * nj`, in scan order.
    pub(crate) fn coordinates(&self) -> Result<(Vec<f32>, Vec<f32>), GribError> {
        self.scanning_mode.check_supported()?;

        let (sign_i, sign_j) = step_signs(self.scanning_mode);
        let la1 = f64::from(self.first_point_lat_millideg) * 1e-3;
        let lo1 = f64::from(self.first_point_lon_millideg) * 1e-3;
        let di = f64::from(self.di_millideg) * 1e-3;
        let dj = f64::from(self.dj_millideg) * 1e-3;

        let indices = GridPointIndexIterator::new(self.ni as usize, self.nj as usize, self.scanning_mode);
        let mut lats = Vec::with_capacity((self.ni * self.nj) as usize);
        let mut lons = Vec::with_capacity((self.ni * self.nj) as usize);
        for (i, j) in indices {
            let lat = la1 + sign_j * (j as f64) * dj;
            let lon = normalize_longitude(lo1 + sign_i * (i as f64) * di);
            lats.push(lat as f32);
            lons.push(lon as f32);
        }
        Ok((lats, lons))
    }

    /// `buf` starts at octet 15 of Section 3, same convention as the other
    /// grid templates. The 16-byte shape-of-earth block (octets 15-30) is
    /// skipped; this crate doesn't expose earth shape for the lat/lon
    /// template, always treating it as the fixed sphere.
    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        Self {
            ni: read_as!(u32, buf, 16),
            nj: read_as!(u32, buf, 20),
            first_point_lat_millideg: read_as!(u32, buf, 32).as_grib_int(),
            first_point_lon_millideg: read_as!(u32, buf, 36).as_grib_int(),
            di_millideg: read_as!(u32, buf, 49),
            dj_millideg: read_as!(u32, buf, 53),
            scanning_mode: ScanningMode(read_as!(u8, buf, 57)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Testable Properties scenario 1: Simple packing smoke grid.
    #[test]
    fn smoke_grid_3x3_coordinates() {
        let grid = LatLonGrid {
            ni: 3,
            nj: 3,
            first_point_lat_millideg: 90_000,
            first_point_lon_millideg: 0,
            di_millideg: 1_000,
            dj_millideg: 1_000,
            scanning_mode: ScanningMode(0b0000_0000),
        };
        let (lats, lons) = grid.coordinates().unwrap();
        assert_eq!(lats, vec![90.0, 90.0, 90.0, 89.0, 89.0, 89.0, 88.0, 88.0, 88.0]);
        assert_eq!(lons, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn longitudes_always_normalized() {
        let grid = LatLonGrid {
            ni: 2,
            nj: 1,
            first_point_lat_millideg: 0,
            first_point_lon_millideg: -1_000,
            di_millideg: 2_000,
            dj_millideg: 0,
            scanning_mode: ScanningMode(0b0000_0000),
        };
        let (_, lons) = grid.coordinates().unwrap();
        assert!(lons.iter().all(|&l| (0.0..360.0).contains(&l)));
    }
}
