//! Shape-of-the-earth definition shared by every grid template (Code Table
//! 3.2).

use crate::utils::read_as;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EarthShapeDefinition {
    pub(crate) shape_of_the_earth: u8,
    pub(crate) scale_factor_of_radius: u8,
    pub(crate) scaled_value_of_radius: u32,
    pub(crate) scale_factor_of_major_axis: u8,
    pub(crate) scaled_value_of_major_axis: u32,
    pub(crate) scale_factor_of_minor_axis: u8,
    pub(crate) scaled_value_of_minor_axis: u32,
}

impl EarthShapeDefinition {
    /// Returns `(major, minor)` radii in meters, or `None` for an unknown
    /// Code Table 3.2 value.
    pub(crate) fn radii(&self) -> Option<(f64, f64)> {
        let radii = match self.shape_of_the_earth {
            0 => (6_367_470.0, 6_367_470.0),
            1 => {
                let r = f64::from(self.scaled_value_of_radius)
                    * 10f64.powf(f64::from(self.scale_factor_of_radius));
                (r, r)
            }
            2 => (6_378_160.0, 6_356_775.0),
            3 => {
                let (major, minor) = self.defined_axes();
                (major * 1000.0, minor * 1000.0)
            }
            4 => (6_378_137.0, 6_356_752.314),
            5 => (6_378_137.0, 6_356_752.3142),
            6 => (6_371_229.0, 6_371_229.0),
            7 => self.defined_axes(),
            8 => (6_371_200.0, 6_371_200.0),
            _ => return None,
        };
        Some(radii)
    }

    fn defined_axes(&self) -> (f64, f64) {
        let major = f64::from(self.scaled_value_of_major_axis)
            * 10f64.powf(f64::from(self.scale_factor_of_major_axis));
        let minor = f64::from(self.scaled_value_of_minor_axis)
            * 10f64.powf(f64::from(self.scale_factor_of_minor_axis));
        (major, minor)
    }

    pub(crate) fn from_buf(buf: &[u8]) -> Self {
        Self {
            shape_of_the_earth: read_as!(u8, buf, 0),
            scale_factor_of_radius: read_as!(u8, buf, 1),
            scaled_value_of_radius: read_as!(u32, buf, 2),
            scale_factor_of_major_axis: read_as!(u8, buf, 6),
            scaled_value_of_major_axis: read_as!(u32, buf, 7),
            scale_factor_of_minor_axis: read_as!(u8, buf, 11),
            scaled_value_of_minor_axis: read_as!(u32, buf, 12),
        }
    }
}

/// Spherical earth radius (m) used for Lambert/Mercator/polar-stereographic
/// inverse projection as a spherical approximation.
pub(crate) const PROJECTION_SPHERE_RADIUS_M: f64 = 6_371_229.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_6_is_projection_sphere() {
        let shape = EarthShapeDefinition {
            shape_of_the_earth: 6,
            scale_factor_of_radius: 0,
            scaled_value_of_radius: 0,
            scale_factor_of_major_axis: 0,
            scaled_value_of_major_axis: 0,
            scale_factor_of_minor_axis: 0,
            scaled_value_of_minor_axis: 0,
        };
        assert_eq!(shape.radii(), Some((6_371_229.0, 6_371_229.0)));
    }

    #[test]
    fn unknown_shape_is_none() {
        let shape = EarthShapeDefinition {
            shape_of_the_earth: 200,
            scale_factor_of_radius: 0,
            scaled_value_of_radius: 0,
            scale_factor_of_major_axis: 0,
            scaled_value_of_major_axis: 0,
            scale_factor_of_minor_axis: 0,
            scaled_value_of_minor_axis: 0,
        };
        assert_eq!(shape.radii(), None);
    }
}
