use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::layer::{Feature, FeatureId};

/// A feature's bounding rectangle, tagged with its id.
type Entry = GeomWithData<Rectangle<[f64; 2]>, FeatureId>;

#[inline]
fn corners(rect: &Rect<f64>) -> ([f64; 2], [f64; 2]) {
    (rect.min().into(), rect.max().into())
}

/// R-tree over the bounding rectangles of a layer's features.
///
/// Built once with a bulk load, then only queried. Lookups are
/// over-approximate: a hit means the rectangles touch, not the polygons.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<Entry>,
}

impl SpatialIndex {
    /// Bulk-load every feature that has a non-empty geometry.
    /// Features with null or empty geometry are never indexed.
    pub fn build<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                features.into_iter()
                    .filter_map(|feature| {
                        let (min, max) = corners(&feature.polygons()?.bounding_rect()?);
                        Some(Entry::new(Rectangle::from_corners(min, max), feature.id))
                    })
                    .collect()
            ),
        }
    }

    /// Number of indexed features.
    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }

    /// Ids of all features whose bounding rectangle intersects `rect`,
    /// in ascending id order.
    pub fn query(&self, rect: &Rect<f64>) -> Vec<FeatureId> {
        let (min, max) = corners(rect);
        let mut ids = self.rtree
            .locate_in_envelope_intersecting(&AABB::from_corners(min, max))
            .map(|entry| entry.data)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Candidates for `geom`: query with its bounding rectangle.
    /// A geometry without a rectangle (no coordinates) has no candidates.
    pub fn candidates(&self, geom: &MultiPolygon<f64>) -> Vec<FeatureId> {
        geom.bounding_rect()
            .map(|rect| self.query(&rect))
            .unwrap_or_default()
    }
}
