// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::error::GeomError;
use crate::math::{Mat4, Vec3};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` and represent meters in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidBounds`] if any component of `min` is
    /// greater than its counterpart in `max` (or either corner is NaN).
    pub fn new(min: Vec3, max: Vec3) -> Result<Self, GeomError> {
        let a = min.to_array();
        let b = max.to_array();
        let ordered = a[0] <= b[0] && a[1] <= b[1] && a[2] <= b[2];
        if !ordered {
            return Err(GeomError::InvalidBounds { min: a, max: b });
        }
        Ok(Self { min, max })
    }

    /// Builds the box spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min_by_component(&b),
            max: a.max_by_component(&b),
        }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with half-extents `he`.
    ///
    /// Negative half-extents are mirrored.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, he: Vec3) -> Self {
        let he = he.abs();
        Self {
            min: center.sub(&he),
            max: center.add(&he),
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.min.add(&self.max).scale(0.5)
    }

    /// Full size along each axis.
    #[must_use]
    pub fn extents(&self) -> Vec3 {
        self.max.sub(&self.min)
    }

    /// Half size along each axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.extents().scale(0.5)
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    ///
    /// Touching faces count as overlap so the broad phase never drops a
    /// resting contact.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..3).all(|i| self.max.get(i) >= other.min.get(i) && self.min.get(i) <= other.max.get(i))
    }

    /// Strict overlap: touching faces do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..3).all(|i| self.max.get(i) > other.min.get(i) && self.min.get(i) < other.max.get(i))
    }

    /// Returns `true` if `other` lies entirely inside this box (faces inclusive).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        (0..3).all(|i| self.min.get(i) <= other.min.get(i) && self.max.get(i) >= other.max.get(i))
    }

    /// Returns `true` if `point` lies inside this box (faces inclusive).
    #[must_use]
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (0..3).all(|i| self.min.get(i) <= point.get(i) && point.get(i) <= self.max.get(i))
    }

    /// Grows this box in place to also enclose `other`.
    pub fn merge(&mut self, other: &Self) {
        *self = self.union(other);
    }

    /// Smallest box enclosing both `a` and `b`.
    #[must_use]
    pub fn merged(a: &Self, b: &Self) -> Self {
        a.union(b)
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_by_component(&other.min),
            max: self.max.max_by_component(&other.max),
        }
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    #[must_use]
    pub fn inflate(&self, m: f32) -> Self {
        let delta = Vec3::splat(m);
        Self {
            min: self.min.sub(&delta),
            max: self.max.add(&delta),
        }
    }

    /// Inflates each axis by `ratio` of the box's own extent on that axis.
    #[must_use]
    pub fn fattened(&self, ratio: f32) -> Self {
        let margin = self.extents().scale(ratio.max(0.0));
        Self {
            min: self.min.sub(&margin),
            max: self.max.add(&margin),
        }
    }

    /// Moves the box by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min.add(offset),
            max: self.max.add(offset),
        }
    }

    /// Surface area `2(wh + hd + dw)`.
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        let e = self.extents();
        2.0 * (e.x() * e.y() + e.y() * e.z() + e.z() * e.x())
    }

    /// The eight corners, ordered by the bit pattern `(x, y, z)` of max selection.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let [minx, miny, minz] = self.min.to_array();
        let [maxx, maxy, maxz] = self.max.to_array();
        [
            Vec3::new(minx, miny, minz),
            Vec3::new(minx, miny, maxz),
            Vec3::new(minx, maxy, minz),
            Vec3::new(minx, maxy, maxz),
            Vec3::new(maxx, miny, minz),
            Vec3::new(maxx, miny, maxz),
            Vec3::new(maxx, maxy, minz),
            Vec3::new(maxx, maxy, maxz),
        ]
    }

    /// Computes the AABB that bounds this box after transformation by `mat`.
    #[must_use]
    pub fn transformed(&self, mat: &Mat4) -> Self {
        let corners = self.corners();
        let first = mat.transform_point(&corners[0]);
        corners[1..].iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, c| {
                let p = mat.transform_point(c);
                Self {
                    min: acc.min.min_by_component(&p),
                    max: acc.max.max_by_component(&p),
                }
            },
        )
    }

    /// Builds the minimal AABB that contains all `points`.
    ///
    /// # Errors
    /// Returns [`GeomError::EmptyPointSet`] if `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Result<Self, GeomError> {
        let (first, rest) = points.split_first().ok_or(GeomError::EmptyPointSet)?;
        Ok(rest.iter().fold(
            Self {
                min: *first,
                max: *first,
            },
            |acc, p| Self {
                min: acc.min.min_by_component(p),
                max: acc.max.max_by_component(p),
            },
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5))
    }

    #[test]
    fn new_rejects_inverted_corners() {
        let err = Aabb::new(Vec3::ONE, Vec3::ZERO).unwrap_err();
        assert!(matches!(err, GeomError::InvalidBounds { .. }));
    }

    #[test]
    fn touching_faces_overlap_but_do_not_intersect() {
        let a = unit_at(0.0);
        let b = unit_at(1.0);
        assert!(a.overlaps(&b));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&unit_at(0.9)));
    }

    #[test]
    fn fattened_grows_by_own_extent() {
        let a = Aabb::new(Vec3::ZERO, Vec3::new(10.0, 2.0, 0.0)).unwrap();
        let f = a.fattened(0.1);
        assert_eq!(f.min().to_array(), [-1.0, -0.2, 0.0]);
        assert_eq!(f.max().to_array(), [11.0, 2.2, 0.0]);
        assert!(f.contains(&a));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        assert!((unit_at(3.0).surface_area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn merge_in_place_matches_merged() {
        let mut a = unit_at(0.0);
        let b = unit_at(4.0);
        let m = Aabb::merged(&a, &b);
        a.merge(&b);
        assert_eq!(a, m);
        assert_eq!(m.min().x(), -0.5);
        assert_eq!(m.max().x(), 4.5);
    }

    #[test]
    fn from_points_empty_is_error() {
        assert_eq!(Aabb::from_points(&[]), Err(GeomError::EmptyPointSet));
    }
}
