use foundation::bounds::GeoBounds;
use layers::chart::{ChartSlot, ChartSnapshot};
use layers::choropleth::OverlaySnapshot;
use layers::info::InfoPanel;
use layers::legend::Legend;
use layers::marker::Marker;
use layers::surface::{BaseLayer, ChartSurface, MapSurface};
use layers::symbology::RegionStyle;
use scene::region::RegionSet;
use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

// Leaflet and Chart.js are loaded by the host page as globals. Map pointer
// events are re-dispatched as `choropleth:*` DOM events on the map container
// so the page can forward them to the exported commands.
#[wasm_bindgen(inline_js = "
const st = { map: null, base: null, satellite: null, info: null, infoDiv: null,
             regions: [], handles: new Map(), next: 1 };

function keep(obj) {
    const id = st.next++;
    st.handles.set(id, obj);
    return id;
}

function emit(type, detail) {
    st.map.getContainer().dispatchEvent(new CustomEvent(type, { detail }));
}

function leafletStyle(s) {
    return { weight: s.weight, opacity: s.opacity, color: s.stroke,
             dashArray: s.dash ?? null, fillOpacity: s.fill_opacity, fillColor: s.fill };
}

function node(tag, cls, text) {
    const el = document.createElement(tag);
    if (cls) el.className = cls;
    if (text !== undefined) el.textContent = text;
    return el;
}

export function cm_init_map(containerId, configJson) {
    const cfg = JSON.parse(configJson);
    const opts = { subdomains: cfg.subdomains, attribution: cfg.attribution, maxZoom: 18 };
    st.base = L.tileLayer(cfg.base_tiles, opts);
    st.satellite = L.layerGroup([L.tileLayer(cfg.satellite_tiles, opts),
                                 L.tileLayer(cfg.annotation_tiles, opts)]);
    st.map = L.map(containerId, { center: cfg.center, zoom: cfg.zoom, layers: [st.base] });
    L.control.layers({ '标准地图': st.base, '卫星地图': st.satellite }).addTo(st.map);

    st.info = L.control();
    st.info.onAdd = () => {
        st.infoDiv = L.DomUtil.create('div', 'info');
        return st.infoDiv;
    };
    st.info.addTo(st.map);

    st.map.on('click', e => emit('choropleth:click', { lon: e.latlng.lng, lat: e.latlng.lat }));
    st.map.on('baselayerchange', e =>
        emit('choropleth:baselayer', { layer: e.layer === st.satellite ? 'satellite' : 'standard' }));
}

export function cm_set_regions(json) {
    st.regions = JSON.parse(json).regions;
}

export function cm_draw_overlay(json) {
    const snap = JSON.parse(json);
    const group = L.featureGroup();
    const layers = [];
    snap.regions.forEach((paint, i) => {
        const region = st.regions[i];
        if (!region || region.polygons.length === 0) {
            layers.push(null);
            return;
        }
        const latlngs = region.polygons.map(p =>
            p.rings.map(r => r.map(pt => [pt.lat_deg, pt.lon_deg])));
        const layer = L.polygon(latlngs, leafletStyle(paint.style));
        layer.bindTooltip(paint.name, { direction: 'center', permanent: false, sticky: true, opacity: 0.9 });
        layer.on('mouseover', () => emit('choropleth:hover', { name: paint.name }));
        layer.on('mouseout', () => emit('choropleth:hoverend', {}));
        group.addLayer(layer);
        layers.push(layer);
    });
    group.addTo(st.map);
    return keep({ kind: 'layer', layer: group, layers });
}

export function cm_restyle(id, index, styleJson) {
    const h = st.handles.get(id);
    const layer = h && h.layers[index];
    if (!layer) return;
    layer.setStyle(leafletStyle(JSON.parse(styleJson)));
    layer.bringToFront();
}

export function cm_overlay_front(id) {
    const h = st.handles.get(id);
    if (h) h.layer.bringToFront();
}

export function cm_draw_legend(json) {
    const legend = JSON.parse(json);
    const control = L.control({ position: 'bottomright' });
    control.onAdd = () => {
        const div = L.DomUtil.create('div', 'legend');
        div.appendChild(node('h4', null, legend.title));
        for (const entry of legend.entries) {
            const item = node('div', 'legend-item');
            const swatch = node('i');
            swatch.style.backgroundColor = entry.color;
            item.appendChild(swatch);
            item.appendChild(node('span', null, entry.label));
            div.appendChild(item);
        }
        return div;
    };
    control.addTo(st.map);
    return keep({ kind: 'control', control });
}

export function cm_show_info(json) {
    if (!st.infoDiv) return;
    const panel = JSON.parse(json);
    const icons = { Place: 'fa-city', Percentage: 'fa-percentage', Trend: 'fa-chart-line', Info: 'fa-info-circle' };
    st.infoDiv.replaceChildren(node('h4', null, panel.title));
    if (panel.body.Idle) {
        st.infoDiv.appendChild(node('p', 'hint', panel.body.Idle.hint));
        return;
    }
    for (const line of panel.body.Hovered.lines) {
        const row = node('div', 'info-item');
        row.appendChild(node('i', 'fas ' + icons[line.icon]));
        row.appendChild(node('span', 'label', line.field + '：'));
        row.appendChild(node('span', 'value', line.value));
        st.infoDiv.appendChild(row);
    }
}

export function cm_fit_bounds(south, west, north, east) {
    st.map.fitBounds([[south, west], [north, east]]);
}

export function cm_set_base_layer(name) {
    const want = name === 'satellite' ? st.satellite : st.base;
    const other = want === st.base ? st.satellite : st.base;
    if (st.map.hasLayer(other)) st.map.removeLayer(other);
    if (!st.map.hasLayer(want)) st.map.addLayer(want);
}

export function cm_add_marker(json) {
    const m = JSON.parse(json);
    const popup = node('div', 'info-window');
    popup.appendChild(node('h3', null, m.title));
    for (const line of m.lines) popup.appendChild(node('p', null, line));
    const marker = L.marker([m.lat, m.lon], { title: m.title }).bindPopup(popup).addTo(st.map);
    return keep({ kind: 'layer', layer: marker });
}

export function cm_draw_chart(canvasId, json) {
    const c = JSON.parse(json);
    const ctx = document.getElementById(canvasId).getContext('2d');
    const chart = new Chart(ctx, {
        type: c.kind,
        data: {
            labels: c.labels,
            datasets: [{ label: c.series_label, data: c.values,
                         backgroundColor: c.fill_colors, borderColor: c.border_colors, borderWidth: 1 }]
        },
        options: {
            responsive: true,
            plugins: { legend: { position: 'top' }, title: { display: true, text: c.title } }
        }
    });
    return keep({ kind: 'chart', chart });
}

export function cm_release(id) {
    const h = st.handles.get(id);
    st.handles.delete(id);
    if (!h) return;
    if (h.kind === 'layer') st.map.removeLayer(h.layer);
    else if (h.kind === 'control') st.map.removeControl(h.control);
    else if (h.kind === 'chart') h.chart.destroy();
}

export function cm_download(fileName, text) {
    const blob = new Blob([text], { type: 'text/csv;charset=utf-8;' });
    const link = document.createElement('a');
    link.href = URL.createObjectURL(blob);
    link.download = fileName;
    link.click();
    URL.revokeObjectURL(link.href);
}
")]
extern "C" {
    fn cm_init_map(container_id: &str, config_json: &str);
    fn cm_set_regions(json: &str);
    fn cm_draw_overlay(json: &str) -> u32;
    fn cm_restyle(id: u32, index: u32, style_json: &str);
    fn cm_overlay_front(id: u32);
    fn cm_draw_legend(json: &str) -> u32;
    fn cm_show_info(json: &str);
    fn cm_fit_bounds(south: f64, west: f64, north: f64, east: f64);
    fn cm_set_base_layer(name: &str);
    fn cm_add_marker(json: &str) -> u32;
    fn cm_draw_chart(canvas_id: &str, json: &str) -> u32;
    fn cm_release(id: u32);
    fn cm_download(file_name: &str, text: &str);
}

/// Id of a Leaflet layer, control or Chart.js instance held on the JS side.
#[derive(Debug, PartialEq, Eq)]
pub struct JsHandle(u32);

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::error!(%err, "bridge payload serialization failed");
        "null".to_string()
    })
}

pub fn legend_payload(legend: &Legend) -> Value {
    json!({
        "title": legend.title,
        "entries": legend
            .entries
            .iter()
            .map(|e| json!({ "label": e.label(), "color": e.color }))
            .collect::<Vec<_>>(),
    })
}

pub fn marker_payload(marker: &Marker) -> Value {
    json!({
        "lat": marker.position.lat_deg,
        "lon": marker.position.lon_deg,
        "title": marker.popup.title,
        "lines": marker.popup.lines,
    })
}

pub fn download(file_name: &str, text: &str) {
    cm_download(file_name, text);
}

/// Leaflet map inside the given container element.
pub struct JsMap;

impl JsMap {
    pub fn mount(container_id: &str, map_config_json: &str) -> Self {
        cm_init_map(container_id, map_config_json);
        JsMap
    }
}

impl MapSurface for JsMap {
    type Overlay = JsHandle;
    type Legend = JsHandle;
    type Marker = JsHandle;

    fn set_regions(&mut self, regions: &RegionSet) {
        cm_set_regions(&json!({ "regions": regions.iter().collect::<Vec<_>>() }).to_string());
    }

    fn draw_overlay(&mut self, overlay: &OverlaySnapshot) -> JsHandle {
        JsHandle(cm_draw_overlay(&to_json(overlay)))
    }

    fn remove_overlay(&mut self, overlay: JsHandle) {
        cm_release(overlay.0);
    }

    fn bring_overlay_to_front(&mut self, overlay: &JsHandle) {
        cm_overlay_front(overlay.0);
    }

    fn restyle_region(&mut self, overlay: &JsHandle, index: usize, style: &RegionStyle) {
        let Ok(index) = u32::try_from(index) else {
            return;
        };
        cm_restyle(overlay.0, index, &to_json(style));
    }

    fn draw_legend(&mut self, legend: &Legend) -> JsHandle {
        JsHandle(cm_draw_legend(&legend_payload(legend).to_string()))
    }

    fn remove_legend(&mut self, legend: JsHandle) {
        cm_release(legend.0);
    }

    fn show_info(&mut self, panel: &InfoPanel) {
        cm_show_info(&to_json(panel));
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        if bounds.is_empty() {
            return;
        }
        cm_fit_bounds(
            bounds.min.lat_deg,
            bounds.min.lon_deg,
            bounds.max.lat_deg,
            bounds.max.lon_deg,
        );
    }

    fn set_base_layer(&mut self, layer: BaseLayer) {
        cm_set_base_layer(match layer {
            BaseLayer::Standard => "standard",
            BaseLayer::Satellite => "satellite",
        });
    }

    fn add_marker(&mut self, marker: &Marker) -> JsHandle {
        JsHandle(cm_add_marker(&marker_payload(marker).to_string()))
    }

    fn remove_marker(&mut self, marker: JsHandle) {
        cm_release(marker.0);
    }
}

/// Chart.js charts on two canvases, one per slot.
pub struct JsCharts {
    canvases: [String; 2],
}

impl JsCharts {
    pub fn new(first_canvas: &str, second_canvas: &str) -> Self {
        Self {
            canvases: [first_canvas.to_string(), second_canvas.to_string()],
        }
    }
}

impl ChartSurface for JsCharts {
    type Chart = JsHandle;

    fn draw_chart(&mut self, slot: ChartSlot, chart: &ChartSnapshot) -> JsHandle {
        JsHandle(cm_draw_chart(&self.canvases[slot.index()], &to_json(chart)))
    }

    fn destroy_chart(&mut self, chart: JsHandle) {
        cm_release(chart.0);
    }
}
