use foundation::bounds::GeoBounds;
use scene::region::RegionSet;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartSlot, ChartSnapshot};
use crate::choropleth::OverlaySnapshot;
use crate::info::InfoPanel;
use crate::legend::Legend;
use crate::marker::Marker;
use crate::symbology::RegionStyle;

/// Background tiles under the data overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseLayer {
    #[default]
    Standard,
    Satellite,
}

/// Drawing backend for the map. Handles returned by `draw_*` are owned by
/// the caller and must be handed back to the matching `remove_*` before a
/// replacement is drawn.
pub trait MapSurface {
    type Overlay;
    type Legend;
    type Marker;

    /// Geometry for the current load cycle. Overlay snapshots refer to
    /// regions by index into this set.
    fn set_regions(&mut self, regions: &RegionSet);

    fn draw_overlay(&mut self, overlay: &OverlaySnapshot) -> Self::Overlay;
    fn remove_overlay(&mut self, overlay: Self::Overlay);
    /// Re-raises the overlay above tile layers.
    fn bring_overlay_to_front(&mut self, overlay: &Self::Overlay);
    /// Restyles one region of a drawn overlay, by region index.
    fn restyle_region(&mut self, overlay: &Self::Overlay, index: usize, style: &RegionStyle);

    fn draw_legend(&mut self, legend: &Legend) -> Self::Legend;
    fn remove_legend(&mut self, legend: Self::Legend);

    fn show_info(&mut self, panel: &InfoPanel);
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn set_base_layer(&mut self, layer: BaseLayer);

    fn add_marker(&mut self, marker: &Marker) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
}

/// Drawing backend for the two chart slots.
pub trait ChartSurface {
    type Chart;

    fn draw_chart(&mut self, slot: ChartSlot, chart: &ChartSnapshot) -> Self::Chart;
    fn destroy_chart(&mut self, chart: Self::Chart);
}
