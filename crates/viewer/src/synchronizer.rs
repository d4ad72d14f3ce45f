use compute::binning::{BinSet, compute_bins};
use compute::filter::{FilterSpec, filter_indices};
use foundation::bounds::LonLat;
use formats::export::write_csv;
use formats::table::{Row, SourceFile, Table};
use layers::chart::{ChartConfig, ChartKind, ChartSlot, build_chart};
use layers::choropleth::{OverlaySnapshot, build_overlay};
use layers::info::InfoPanel;
use layers::legend::build_legend;
use layers::marker::Marker;
use layers::surface::{BaseLayer, ChartSurface, MapSurface};
use runtime::{EventBus, Revision, SurfaceMetrics};
use scene::picking::{PickHit, pick_point};
use scene::region::RegionSet;
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::load::{LoadGuard, LoadTicket, prepare};
use crate::status::Status;

pub const MAP_SURFACE: &str = "map";
pub const LEGEND_SURFACE: &str = "legend";
pub const MARKER_SURFACE: &str = "marker";

/// Choices offered by the metric, filter and chart dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Non-key headers; the metric dropdown has no empty entry.
    pub metrics: Vec<String>,
    /// `""` (no selection) followed by the non-key headers.
    pub filter_fields: Vec<String>,
    pub chart_fields: Vec<String>,
}

/// What a map click resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Zoomed to the named region.
    Zoomed(String),
    /// Inside the covered area but on no region; nothing happens.
    Ignored,
    /// Outside every region; an informational marker was placed.
    Marked,
}

/// The filtered rows written out as CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedCsv {
    pub file_name: String,
    pub text: String,
}

/// Owns the table, filter, metric and chart selections, and keeps the map
/// and both chart slots in step with them.
///
/// Every mutating command advances the revision, recomputes filtered rows
/// and bins, then redraws the map overlay and legend, chart slot 1 and chart
/// slot 2 in that order. Each previous drawing handle is released before
/// its replacement is drawn.
pub struct Synchronizer<M: MapSurface, C: ChartSurface> {
    config: ViewerConfig,
    map: M,
    charts: C,

    table: Table,
    regions: RegionSet,
    filter: FilterSpec,
    metric: Option<String>,
    chart_configs: [ChartConfig; 2],
    base_layer: BaseLayer,

    filtered: Vec<usize>,
    bins: Option<BinSet>,
    snapshot: OverlaySnapshot,
    info: InfoPanel,
    hovered: Option<usize>,

    overlay: Option<M::Overlay>,
    legend: Option<M::Legend>,
    chart_handles: [Option<C::Chart>; 2],
    markers: Vec<M::Marker>,

    load: LoadGuard,
    status: Option<Status>,
    revision: Revision,
    events: EventBus,
    metrics: SurfaceMetrics,
}

impl<M: MapSurface, C: ChartSurface> Synchronizer<M, C> {
    pub fn new(config: ViewerConfig, mut map: M, charts: C) -> Self {
        let info = InfoPanel::idle();
        map.show_info(&info);
        Self {
            config,
            map,
            charts,
            table: Table::default(),
            regions: RegionSet::default(),
            filter: FilterSpec::identity(),
            metric: None,
            chart_configs: Default::default(),
            base_layer: BaseLayer::default(),
            filtered: Vec::new(),
            bins: None,
            snapshot: OverlaySnapshot::default(),
            info,
            hovered: None,
            overlay: None,
            legend: None,
            chart_handles: [None, None],
            markers: Vec::new(),
            load: LoadGuard::default(),
            status: None,
            revision: Revision::INITIAL,
            events: EventBus::new(),
            metrics: SurfaceMetrics::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref()
    }

    pub fn bins(&self) -> Option<&BinSet> {
        self.bins.as_ref()
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        let rows = self.table.rows();
        self.filtered.iter().map(|&i| &rows[i]).collect()
    }

    pub fn chart_config(&self, slot: ChartSlot) -> &ChartConfig {
        &self.chart_configs[slot.index()]
    }

    pub fn overlay(&self) -> &OverlaySnapshot {
        &self.snapshot
    }

    pub fn info_panel(&self) -> &InfoPanel {
        &self.info
    }

    pub fn base_layer(&self) -> BaseLayer {
        self.base_layer
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn metrics(&self) -> &SurfaceMetrics {
        &self.metrics
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn charts(&self) -> &C {
        &self.charts
    }

    pub fn is_loading(&self) -> bool {
        self.load.is_loading()
    }

    pub fn field_options(&self) -> FieldOptions {
        let metrics: Vec<String> = self
            .table
            .data_headers(&self.config.key_field)
            .map(str::to_string)
            .collect();
        let with_empty: Vec<String> = std::iter::once(String::new())
            .chain(metrics.iter().cloned())
            .collect();
        FieldOptions {
            metrics,
            filter_fields: with_empty.clone(),
            chart_fields: with_empty,
        }
    }

    /// Replaces the table and resets every selection derived from it.
    pub fn on_data_loaded(&mut self, table: Table) {
        self.commit(table, None);
    }

    pub fn on_regions_loaded(&mut self, regions: RegionSet) {
        self.regions = regions;
        self.map.set_regions(&self.regions);
        self.mutate();
    }

    /// Selects the field driving map coloring. The key field cannot be a
    /// metric and is ignored; an empty string clears the selection.
    pub fn on_metric_changed(&mut self, field: &str) {
        if field == self.config.key_field {
            tracing::warn!(field, "key field cannot drive map coloring");
            return;
        }
        self.metric = (!field.is_empty()).then(|| field.to_string());
        self.mutate();
    }

    pub fn on_filter_applied(&mut self, spec: FilterSpec) {
        self.filter = spec;
        self.mutate();
    }

    pub fn on_chart_config_changed(&mut self, slot: ChartSlot, kind: ChartKind, field: &str) {
        self.chart_configs[slot.index()] = ChartConfig::new(kind, field);
        self.mutate();
    }

    /// Swaps configuration; a new key field re-joins everything.
    pub fn on_config_changed(&mut self, config: ViewerConfig) {
        self.config = config;
        if self.metric.as_deref() == Some(self.config.key_field.as_str()) {
            self.metric = None;
        }
        self.mutate();
    }

    /// Starts a load. Fails while another load is pending.
    pub fn begin_load(&mut self) -> Result<LoadTicket, ViewerError> {
        match self.load.begin() {
            Ok(ticket) => {
                self.status = Some(Status::Loading);
                tracing::debug!(ticket = ticket.id(), "load started");
                Ok(ticket)
            }
            Err(err) => {
                tracing::warn!(%err, "load trigger rejected");
                Err(err)
            }
        }
    }

    /// Merges `files`, parses `geo_json` and commits both, or leaves all
    /// previous state in place on failure.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        files: &[SourceFile],
        geo_json: &str,
    ) -> Result<(), ViewerError> {
        self.load.finish(ticket)?;
        match prepare(files, geo_json, &self.config.key_field) {
            Ok(data) => {
                tracing::info!(
                    files = files.len(),
                    rows = data.table.len(),
                    headers = data.table.headers().len(),
                    regions = data.regions.len(),
                    "load committed"
                );
                self.commit(data.table, Some(data.regions));
                self.status = Some(Status::Success);
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "load failed");
                self.status = Some(Status::Error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Ends a load that failed before it could finish, e.g. on a network
    /// error. Prior state is untouched.
    pub fn abort_load(&mut self, ticket: LoadTicket, err: ViewerError) -> Result<(), ViewerError> {
        self.load.finish(ticket)?;
        tracing::error!(%err, "load aborted");
        self.status = Some(Status::Error(err.to_string()));
        Ok(())
    }

    /// Highlights the region and shows its first filtered row.
    pub fn on_region_hover(&mut self, name: &str) {
        self.reset_highlight();
        if let (Some(overlay), Some(idx)) = (self.overlay.as_ref(), self.snapshot.position(name)) {
            let style = self.snapshot.regions[idx].highlight_style();
            self.map.restyle_region(overlay, idx, &style);
            self.hovered = Some(idx);
        }

        let key = self.config.key_field.as_str();
        let rows = self.table.rows();
        let row = self
            .filtered
            .iter()
            .map(|&i| &rows[i])
            .find(|r| r.get(key) == Some(name));
        let panel = InfoPanel::hovered(
            name,
            row,
            self.table.headers().iter().map(String::as_str),
            key,
            &self.config.placeholder,
        );
        self.map.show_info(&panel);
        self.info = panel;
    }

    pub fn on_region_hover_end(&mut self) {
        self.reset_highlight();
        self.info = InfoPanel::idle();
        self.map.show_info(&self.info);
    }

    pub fn on_map_click(&mut self, point: LonLat) -> ClickOutcome {
        match pick_point(&self.regions, point) {
            PickHit::Region(idx) => match self.regions.get(idx) {
                Some(region) => {
                    self.map.fit_bounds(region.bounds);
                    ClickOutcome::Zoomed(region.name.clone())
                }
                None => ClickOutcome::Ignored,
            },
            PickHit::Covered => ClickOutcome::Ignored,
            PickHit::Outside => {
                let marker = self.map.add_marker(&Marker::outside_coverage(point));
                self.metrics.record_draw(MARKER_SURFACE);
                self.markers.push(marker);
                ClickOutcome::Marked
            }
        }
    }

    pub fn on_base_layer_changed(&mut self, layer: BaseLayer) {
        self.base_layer = layer;
        self.map.set_base_layer(layer);
        if let Some(overlay) = self.overlay.as_ref() {
            self.map.bring_overlay_to_front(overlay);
        }
    }

    pub fn export_filtered(&self) -> Result<ExportedCsv, ViewerError> {
        let text = write_csv(self.table.headers(), self.filtered_rows())?;
        Ok(ExportedCsv {
            file_name: self.config.export_file_name.clone(),
            text,
        })
    }

    fn commit(&mut self, table: Table, regions: Option<RegionSet>) {
        self.metric = table
            .data_headers(&self.config.key_field)
            .next()
            .map(str::to_string);
        self.table = table;
        if let Some(regions) = regions {
            self.regions = regions;
            self.map.set_regions(&self.regions);
        }
        self.filter = FilterSpec::identity();
        for cfg in &mut self.chart_configs {
            cfg.field.clear();
        }
        for marker in self.markers.drain(..) {
            self.map.remove_marker(marker);
            self.metrics.record_release(MARKER_SURFACE);
        }
        self.hovered = None;
        self.info = InfoPanel::idle();
        self.map.show_info(&self.info);
        self.mutate();
    }

    fn mutate(&mut self) {
        self.revision = self.revision.next();
        self.redraw();
    }

    fn reset_highlight(&mut self) {
        let Some(idx) = self.hovered.take() else {
            return;
        };
        if let (Some(overlay), Some(paint)) = (self.overlay.as_ref(), self.snapshot.regions.get(idx))
        {
            self.map.restyle_region(overlay, idx, &paint.style);
        }
    }

    fn redraw(&mut self) {
        let key = self.config.key_field.as_str();
        let metric = self.metric.as_deref();
        let rows = self.table.rows();
        self.filtered = filter_indices(rows, &self.filter);
        let filtered: Vec<&Row> = self.filtered.iter().map(|&i| &rows[i]).collect();
        self.bins = metric.and_then(|m| compute_bins(filtered.iter().copied(), m));
        tracing::debug!(
            revision = self.revision.0,
            rows = rows.len(),
            filtered = filtered.len(),
            metric,
            binned = self.bins.is_some(),
            "recomputed derived state"
        );

        // Map overlay, then its legend.
        let snapshot = build_overlay(&self.regions, &filtered, key, metric, self.bins.as_ref());
        if let Some(old) = self.overlay.take() {
            self.map.remove_overlay(old);
            self.metrics.record_release(MAP_SURFACE);
        }
        let handle = self.map.draw_overlay(&snapshot);
        self.map.bring_overlay_to_front(&handle);
        self.metrics.record_draw(MAP_SURFACE);
        self.overlay = Some(handle);
        self.hovered = None;

        if let Some(old) = self.legend.take() {
            self.map.remove_legend(old);
            self.metrics.record_release(LEGEND_SURFACE);
        }
        if let (Some(m), Some(bins)) = (metric, self.bins.as_ref()) {
            self.legend = Some(self.map.draw_legend(&build_legend(m, bins)));
            self.metrics.record_draw(LEGEND_SURFACE);
        }
        self.events.emit(
            self.revision,
            MAP_SURFACE,
            format!(
                "{} regions, {} matched, metric {:?}",
                snapshot.regions.len(),
                snapshot.matched(),
                metric
            ),
        );
        self.snapshot = snapshot;

        for slot in ChartSlot::ALL {
            let i = slot.index();
            let surface = slot.surface_name();
            if let Some(old) = self.chart_handles[i].take() {
                self.charts.destroy_chart(old);
                self.metrics.record_release(surface);
            }
            let message = match build_chart(&filtered, key, &self.chart_configs[i]) {
                Some(chart) => {
                    self.chart_handles[i] = Some(self.charts.draw_chart(slot, &chart));
                    self.metrics.record_draw(surface);
                    format!("{} {} over {} rows", chart.kind, chart.series_label, filtered.len())
                }
                None => "cleared".to_string(),
            };
            self.events.emit(self.revision, surface, message);
        }
    }
}
