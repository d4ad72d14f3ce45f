#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use foundation::bounds::{GeoBounds, LonLat};
use layers::chart::{ChartSlot, ChartSnapshot};
use layers::choropleth::OverlaySnapshot;
use layers::info::InfoPanel;
use layers::legend::Legend;
use layers::marker::Marker;
use layers::surface::{BaseLayer, ChartSurface, MapSurface};
use layers::symbology::RegionStyle;
use scene::region::{Polygon, Region, RegionSet};
use tracing_subscriber::EnvFilter;

/// Routes viewer logs to the test harness; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared call log so map and chart calls interleave in one sequence.
pub type Log = Rc<RefCell<Vec<String>>>;

#[derive(Default)]
pub struct RecordingMap {
    pub log: Log,
    next: u32,
    pub live_overlays: u32,
    pub live_legends: u32,
    pub live_markers: u32,
    pub last_overlay: Option<OverlaySnapshot>,
    pub last_legend: Option<Legend>,
    pub last_info: Option<InfoPanel>,
    pub fitted: Vec<GeoBounds>,
    pub restyled: Vec<(usize, RegionStyle)>,
    pub base_layer: Option<BaseLayer>,
    pub region_count: usize,
}

impl RecordingMap {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    fn id(&mut self) -> u32 {
        self.next += 1;
        self.next
    }
}

impl MapSurface for RecordingMap {
    type Overlay = u32;
    type Legend = u32;
    type Marker = u32;

    fn set_regions(&mut self, regions: &RegionSet) {
        self.region_count = regions.len();
        self.log.borrow_mut().push("set regions".into());
    }

    fn draw_overlay(&mut self, overlay: &OverlaySnapshot) -> u32 {
        assert_eq!(self.live_overlays, 0, "overlay drawn before the old one was removed");
        self.live_overlays += 1;
        self.last_overlay = Some(overlay.clone());
        self.log.borrow_mut().push("draw overlay".into());
        self.id()
    }

    fn remove_overlay(&mut self, _overlay: u32) {
        self.live_overlays -= 1;
        self.log.borrow_mut().push("remove overlay".into());
    }

    fn bring_overlay_to_front(&mut self, _overlay: &u32) {
        self.log.borrow_mut().push("front overlay".into());
    }

    fn restyle_region(&mut self, _overlay: &u32, index: usize, style: &RegionStyle) {
        self.restyled.push((index, style.clone()));
    }

    fn draw_legend(&mut self, legend: &Legend) -> u32 {
        assert_eq!(self.live_legends, 0, "legend drawn before the old one was removed");
        self.live_legends += 1;
        self.last_legend = Some(legend.clone());
        self.log.borrow_mut().push("draw legend".into());
        self.id()
    }

    fn remove_legend(&mut self, _legend: u32) {
        self.live_legends -= 1;
        self.last_legend = None;
        self.log.borrow_mut().push("remove legend".into());
    }

    fn show_info(&mut self, panel: &InfoPanel) {
        self.last_info = Some(panel.clone());
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.fitted.push(bounds);
    }

    fn set_base_layer(&mut self, layer: BaseLayer) {
        self.base_layer = Some(layer);
        self.log.borrow_mut().push("base layer".into());
    }

    fn add_marker(&mut self, _marker: &Marker) -> u32 {
        self.live_markers += 1;
        self.id()
    }

    fn remove_marker(&mut self, _marker: u32) {
        self.live_markers -= 1;
    }
}

#[derive(Default)]
pub struct RecordingCharts {
    pub log: Log,
    next: u32,
    pub live: [u32; 2],
    pub last: [Option<ChartSnapshot>; 2],
    owner: Vec<(u32, ChartSlot)>,
}

impl RecordingCharts {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }
}

impl ChartSurface for RecordingCharts {
    type Chart = u32;

    fn draw_chart(&mut self, slot: ChartSlot, chart: &ChartSnapshot) -> u32 {
        assert_eq!(self.live[slot.index()], 0, "chart drawn before the old one was destroyed");
        self.live[slot.index()] += 1;
        self.last[slot.index()] = Some(chart.clone());
        self.log
            .borrow_mut()
            .push(format!("draw {}", slot.surface_name()));
        self.next += 1;
        self.owner.push((self.next, slot));
        self.next
    }

    fn destroy_chart(&mut self, chart: u32) {
        let Some(pos) = self.owner.iter().position(|(id, _)| *id == chart) else {
            panic!("destroying unknown chart {chart}");
        };
        let (_, slot) = self.owner.remove(pos);
        self.live[slot.index()] -= 1;
        self.last[slot.index()] = None;
        self.log
            .borrow_mut()
            .push(format!("destroy {}", slot.surface_name()));
    }
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn square(name: &str, lon: f64, lat: f64) -> Region {
    let ring = vec![
        LonLat::new(lon, lat),
        LonLat::new(lon + 1.0, lat),
        LonLat::new(lon + 1.0, lat + 1.0),
        LonLat::new(lon, lat + 1.0),
        LonLat::new(lon, lat),
    ];
    Region::new(name, vec![Polygon::new(vec![ring])])
}

pub fn three_cities() -> RegionSet {
    RegionSet::new(vec![
        square("北京", 116.0, 39.0),
        square("上海", 121.0, 31.0),
        square("广州", 113.0, 23.0),
    ])
}

/// GeoJSON for the same three squares.
pub const THREE_CITIES_GEOJSON: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"name": "北京"}, "geometry": {"type": "Polygon",
     "coordinates": [[[116, 39], [117, 39], [117, 40], [116, 40], [116, 39]]]}},
    {"type": "Feature", "properties": {"name": "上海"}, "geometry": {"type": "Polygon",
     "coordinates": [[[121, 31], [122, 31], [122, 32], [121, 32], [121, 31]]]}},
    {"type": "Feature", "properties": {"name": "广州"}, "geometry": {"type": "Polygon",
     "coordinates": [[[113, 23], [114, 23], [114, 24], [113, 24], [113, 23]]]}}
]}"#;
