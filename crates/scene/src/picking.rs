use foundation::bounds::LonLat;

use crate::region::{Polygon, RegionSet};

/// Result of resolving a map click against the region set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickHit {
    /// Inside the polygon of the region at this index.
    Region(usize),
    /// Inside some region's bounding box but no polygon (gaps, coastlines).
    Covered,
    /// Outside every region's bounds.
    Outside,
}

/// Deterministic point picking.
///
/// Ordering contract:
/// - If regions overlap, the lowest index wins.
pub fn pick_point(regions: &RegionSet, p: LonLat) -> PickHit {
    let mut covered = false;
    for (idx, region) in regions.iter().enumerate() {
        if !region.bounds.contains(p) {
            continue;
        }
        covered = true;
        if region.polygons.iter().any(|poly| polygon_contains(poly, p)) {
            return PickHit::Region(idx);
        }
    }
    if covered {
        PickHit::Covered
    } else {
        PickHit::Outside
    }
}

/// Even-odd containment over all rings, so holes are excluded.
pub fn polygon_contains(poly: &Polygon, p: LonLat) -> bool {
    let mut inside = false;
    for ring in &poly.rings {
        if ring_crossings_odd(ring, p) {
            inside = !inside;
        }
    }
    inside
}

fn ring_crossings_odd(ring: &[LonLat], p: LonLat) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut odd = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.lat_deg > p.lat_deg) != (b.lat_deg > p.lat_deg) {
            let t = (p.lat_deg - a.lat_deg) / (b.lat_deg - a.lat_deg);
            let x = a.lon_deg + t * (b.lon_deg - a.lon_deg);
            if p.lon_deg < x {
                odd = !odd;
            }
        }
        j = i;
    }
    odd
}
