pub mod chart;
pub mod choropleth;
pub mod info;
pub mod legend;
pub mod marker;
pub mod surface;
pub mod symbology;

pub use chart::{ChartConfig, ChartKind, ChartSlot, ChartSnapshot, UnknownChartKind, build_chart};
pub use choropleth::{OverlaySnapshot, RegionPaint, build_overlay};
pub use info::{FieldIcon, InfoBody, InfoLine, InfoPanel};
pub use legend::{Legend, LegendEntry, build_legend};
pub use marker::{Marker, Popup};
pub use surface::{BaseLayer, ChartSurface, MapSurface};
pub use symbology::RegionStyle;
