use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Axis-aligned lon/lat rectangle.
///
/// An empty box has `min > max` on both axes so that `extend` with the first
/// point yields a degenerate box around that point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl GeoBounds {
    pub const fn new(min: LonLat, max: LonLat) -> Self {
        Self { min, max }
    }

    pub const fn empty() -> Self {
        Self {
            min: LonLat::new(f64::INFINITY, f64::INFINITY),
            max: LonLat::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.lon_deg > self.max.lon_deg || self.min.lat_deg > self.max.lat_deg
    }

    pub fn extend(&mut self, p: LonLat) {
        self.min.lon_deg = self.min.lon_deg.min(p.lon_deg);
        self.min.lat_deg = self.min.lat_deg.min(p.lat_deg);
        self.max.lon_deg = self.max.lon_deg.max(p.lon_deg);
        self.max.lat_deg = self.max.lat_deg.max(p.lat_deg);
    }

    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: LonLat) -> bool {
        !self.is_empty()
            && p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
            && p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
    }

    pub fn center(&self) -> Option<LonLat> {
        if self.is_empty() {
            return None;
        }
        Some(LonLat::new(
            (self.min.lon_deg + self.max.lon_deg) * 0.5,
            (self.min.lat_deg + self.max.lat_deg) * 0.5,
        ))
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<LonLat> for GeoBounds {
    fn from_iter<I: IntoIterator<Item = LonLat>>(iter: I) -> Self {
        let mut b = Self::empty();
        for p in iter {
            b.extend(p);
        }
        b
    }
}
