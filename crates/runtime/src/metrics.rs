use std::collections::BTreeMap;

/// Draw/release accounting per surface.
///
/// A surface whose `live` count ever exceeds one is holding a stale drawing
/// handle. Sorted maps keep snapshots stable for logs and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SurfaceMetrics {
    surfaces: BTreeMap<&'static str, SurfaceCounters>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SurfaceCounters {
    pub draws: u64,
    pub releases: u64,
    /// Highest number of simultaneously live handles observed.
    pub peak_live: u64,
}

impl SurfaceCounters {
    pub fn live(&self) -> u64 {
        self.draws.saturating_sub(self.releases)
    }
}

impl SurfaceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_draw(&mut self, surface: &'static str) {
        let c = self.surfaces.entry(surface).or_default();
        c.draws += 1;
        c.peak_live = c.peak_live.max(c.live());
    }

    pub fn record_release(&mut self, surface: &'static str) {
        self.surfaces.entry(surface).or_default().releases += 1;
    }

    pub fn counters(&self, surface: &str) -> SurfaceCounters {
        self.surfaces.get(surface).copied().unwrap_or_default()
    }

    /// Returns a stable, sorted snapshot suitable for logs/debug UI.
    pub fn snapshot(&self) -> Vec<(&'static str, SurfaceCounters)> {
        self.surfaces.iter().map(|(k, v)| (*k, *v)).collect()
    }
}
