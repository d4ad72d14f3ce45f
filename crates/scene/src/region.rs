use foundation::bounds::{GeoBounds, LonLat};
use serde::{Deserialize, Serialize};

/// One ring of a polygon, in lon/lat degrees. The closing vertex may or may
/// not repeat the first one.
pub type Ring = Vec<LonLat>;

/// A polygon: outer ring first, then holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn outer(&self) -> Option<&Ring> {
        self.rings.first()
    }
}

/// An administrative region joined to table rows by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub bounds: GeoBounds,
}

impl Region {
    pub fn new(name: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        let bounds = polygons
            .iter()
            .filter_map(Polygon::outer)
            .flatten()
            .copied()
            .collect();
        Self {
            name: name.into(),
            polygons,
            bounds,
        }
    }
}

/// Read-only geographic reference data for one load cycle.
///
/// Ordering contract:
/// - Regions keep source order; lookups by name return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn bounds(&self) -> GeoBounds {
        self.regions
            .iter()
            .fold(GeoBounds::empty(), |acc, r| acc.union(&r.bounds))
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
