use scene::region::{Polygon, Region, RegionSet};

use crate::geojson::{Feature, FeatureCollection, Geometry};

/// Property holding the region's display name; it is also the join key value.
pub const NAME_PROPERTY: &str = "name";

/// Builds one region per feature, in feature order.
///
/// Features without a name keep an empty one so they still render with the
/// default style; they never match a table row. Non-area geometry yields a
/// region with no polygons.
pub fn regions_from_collection(fc: &FeatureCollection) -> RegionSet {
    let regions: Vec<Region> = fc.features.iter().map(region_from_feature).collect();
    let unnamed = regions.iter().filter(|r| r.name.is_empty()).count();
    if unnamed > 0 {
        tracing::warn!(unnamed, "boundary features without a name property");
    }
    RegionSet::new(regions)
}

fn region_from_feature(feature: &Feature) -> Region {
    let name = feature
        .string_property(NAME_PROPERTY)
        .unwrap_or_default()
        .to_string();
    let polygons = match &feature.geometry {
        Some(Geometry::Polygon(rings)) => vec![Polygon::new(rings.clone())],
        Some(Geometry::MultiPolygon(polys)) => {
            polys.iter().cloned().map(Polygon::new).collect()
        }
        Some(Geometry::Other(_)) | None => Vec::new(),
    };
    Region::new(name, polygons)
}
