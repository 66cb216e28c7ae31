//! Great-circle distance and an R-tree index for radius queries over
//! geographic coordinates.
//!
//! The index stores points in an R-tree keyed by degrees and answers
//! radius queries with a bounding-envelope prefilter followed by an exact
//! haversine check, so the expensive trigonometry only runs on candidates
//! that survive the envelope.

use geo::{Distance, Haversine, Point};
use rstar::{AABB, RTree, RTreeObject};

/// Kilometers per degree of latitude (and of longitude at the equator).
const KM_PER_DEGREE: f64 = 110.574;

/// Great-circle distance between two coordinates in kilometers.
#[must_use]
pub fn haversine_km(lat_a: f64, lng_a: f64, lat_b: f64, lng_b: f64) -> f64 {
    Haversine.distance(Point::new(lng_a, lat_a), Point::new(lng_b, lat_b)) / 1000.0
}

/// A point stored in the R-tree with its position in the original slice.
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// R-tree over geographic points supporting radius queries in kilometers.
pub struct GeoIndex {
    tree: RTree<IndexedPoint>,
}

impl GeoIndex {
    /// Builds an index over `(latitude, longitude)` pairs. The returned
    /// neighbor indices refer to positions in this slice.
    #[must_use]
    pub fn new(points: &[(f64, f64)]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(idx, &(lat, lng))| IndexedPoint { idx, lat, lng })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Returns the indices of all points within `radius_km` of the given
    /// coordinate (a point is within radius of itself), sorted ascending
    /// so callers see a deterministic order.
    #[must_use]
    pub fn neighbors_within(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<usize> {
        let delta_lat = radius_km / KM_PER_DEGREE;
        // Longitude degrees shrink with latitude; clamp the cosine so the
        // envelope stays finite near the poles.
        let delta_lng = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().max(0.01));

        let envelope = AABB::from_corners(
            [lng - delta_lng, lat - delta_lat],
            [lng + delta_lng, lat + delta_lat],
        );

        let mut neighbors: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|p| haversine_km(lat, lng, p.lat, p.lng) <= radius_km)
            .map(|p| p.idx)
            .collect();

        neighbors.sort_unstable();
        neighbors
    }
}
