use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use compute::filter::{FilterSpec, Operator};
use foundation::bounds::LonLat;
use gloo_net::http::Request;
use layers::chart::{ChartKind, ChartSlot};
use layers::surface::BaseLayer;
use tracing::level_filters::LevelFilter;
use viewer::{FileQueue, Synchronizer, ViewerConfig, ViewerError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod bridge;
mod logging;

use bridge::{JsCharts, JsMap};
use logging::{init_logging, init_panic_hook};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

const FIRST_CHART_CANVAS: &str = "chart1";
const SECOND_CHART_CANVAS: &str = "chart2";

struct App {
    sync: Synchronizer<JsMap, JsCharts>,
    queue: FileQueue,
}

thread_local! {
    static STATE: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Runs `f` against the mounted viewer. Re-entrant calls (a JS callback
/// fired while Rust is drawing) are dropped with a warning.
fn with_app<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut App) -> R,
{
    STATE
        .try_with(|state| {
            let Ok(mut slot) = state.try_borrow_mut() else {
                tracing::warn!("viewer busy; command dropped");
                return Err(JsValue::from_str("viewer busy"));
            };
            match slot.as_mut() {
                Some(app) => Ok(f(app)),
                None => Err(JsValue::from_str("viewer not initialized")),
            }
        })
        .unwrap_or_else(|_| Err(JsValue::from_str("viewer state unavailable")))
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Unknown operators and blank or non-numeric thresholds clear the filter.
fn parse_filter(field: &str, op: &str, value: &str) -> FilterSpec {
    match op.parse::<Operator>() {
        Ok(op) => FilterSpec::from_input(field, op, value),
        Err(err) => {
            tracing::warn!(%err, "filter operator rejected");
            FilterSpec::identity()
        }
    }
}

fn parse_base_layer(name: &str) -> BaseLayer {
    match name.trim().to_ascii_lowercase().as_str() {
        "satellite" | "卫星地图" => BaseLayer::Satellite,
        _ => BaseLayer::Standard,
    }
}

/// `slot` is 1-based, matching the chart canvases.
fn parse_chart(slot: u32, kind: &str) -> Result<(ChartSlot, ChartKind), String> {
    let slot = usize::try_from(slot)
        .ok()
        .and_then(|s| s.checked_sub(1))
        .and_then(ChartSlot::from_index)
        .ok_or_else(|| format!("unknown chart slot {slot}"))?;
    let kind = kind.parse::<ChartKind>().map_err(|err| err.to_string())?;
    Ok((slot, kind))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    init_panic_hook();
    init_logging(LevelFilter::INFO);
    Ok(())
}

/// Mounts the map into `map_container` and wires its pointer events.
/// `config_json` may be partial; missing keys use defaults.
#[wasm_bindgen]
pub fn init_viewer(map_container: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(text) if !text.trim().is_empty() => ViewerConfig::from_json(text).map_err(js_err)?,
        _ => ViewerConfig::default(),
    };
    let map_json = serde_json::to_string(&config.map).map_err(js_err)?;
    let map = JsMap::mount(map_container, &map_json);
    let charts = JsCharts::new(FIRST_CHART_CANVAS, SECOND_CHART_CANVAS);

    STATE
        .try_with(|state| {
            *state.borrow_mut() = Some(App {
                sync: Synchronizer::new(config, map, charts),
                queue: FileQueue::new(),
            });
        })
        .map_err(js_err)?;

    wire_map_events(map_container)?;
    tracing::info!(container = map_container, "viewer mounted");
    Ok(())
}

fn wire_map_events(map_container: &str) -> Result<(), JsValue> {
    let target = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(map_container))
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{map_container}")))?;

    listen(&target, "choropleth:hover", |detail| {
        if let Some(name) = detail_str(detail, "name") {
            hover(&name);
        }
    })?;
    listen(&target, "choropleth:hoverend", |_| hover_end())?;
    listen(&target, "choropleth:click", |detail| {
        if let (Some(lon), Some(lat)) = (detail_f64(detail, "lon"), detail_f64(detail, "lat")) {
            map_click(lon, lat);
        }
    })?;
    listen(&target, "choropleth:baselayer", |detail| {
        if let Some(layer) = detail_str(detail, "layer") {
            set_base_layer(&layer);
        }
    })?;
    Ok(())
}

fn listen(
    target: &web_sys::Element,
    event: &str,
    handler: impl Fn(&JsValue) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn Fn(web_sys::Event)>::new(move |e: web_sys::Event| {
        let detail = e
            .dyn_ref::<web_sys::CustomEvent>()
            .map(|c| c.detail())
            .unwrap_or(JsValue::UNDEFINED);
        handler(&detail);
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    closure.forget();
    Ok(())
}

fn detail_str(detail: &JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(detail, &JsValue::from_str(key))
        .ok()?
        .as_string()
}

fn detail_f64(detail: &JsValue, key: &str) -> Option<f64> {
    js_sys::Reflect::get(detail, &JsValue::from_str(key))
        .ok()?
        .as_f64()
}

#[wasm_bindgen]
pub fn queue_file(name: String, text: String) -> Result<(), JsValue> {
    with_app(|app| app.queue.push(name, text))
}

/// Queues a file whose region column is headed `column` instead of the
/// configured key field.
#[wasm_bindgen]
pub fn queue_file_rekeyed(name: String, text: String, column: &str) -> Result<(), JsValue> {
    with_app(|app| {
        let key = app.sync.config().key_field.clone();
        app.queue.push_rekeyed(name, &text, column, &key)
    })?
    .map_err(js_err)
}

#[wasm_bindgen]
pub fn remove_file(index: usize) -> Result<bool, JsValue> {
    with_app(|app| app.queue.remove(index).is_some())
}

#[wasm_bindgen]
pub fn clear_files() -> Result<(), JsValue> {
    with_app(|app| app.queue.clear())
}

#[wasm_bindgen]
pub fn queued_files() -> Result<Vec<String>, JsValue> {
    with_app(|app| app.queue.names().into_iter().map(str::to_string).collect())
}

/// Fetches the region boundaries and merges every queued file. Resolves
/// once the new data is drawn; rejects with the user-facing message.
#[wasm_bindgen]
pub async fn load() -> Result<(), JsValue> {
    let (ticket, files, url) = with_app(|app| {
        app.sync.begin_load().map(|ticket| {
            (
                ticket,
                app.queue.files().to_vec(),
                app.sync.config().geo_data_url.clone(),
            )
        })
    })?
    .map_err(js_err)?;

    if files.is_empty() {
        return with_app(|app| app.sync.finish_load(ticket, &files, ""))?.map_err(js_err);
    }

    match fetch_text(&url).await {
        Ok(geo_json) => with_app(|app| app.sync.finish_load(ticket, &files, &geo_json))?
            .map_err(js_err),
        Err(msg) => {
            let err = ViewerError::Network(msg);
            let shown = err.to_string();
            with_app(|app| app.sync.abort_load(ticket, err))?.map_err(js_err)?;
            Err(JsValue::from_str(&shown))
        }
    }
}

/// Fire-and-forget variant of [`load`] for plain button handlers.
#[wasm_bindgen]
pub fn load_in_background() {
    spawn_local(async {
        if let Err(err) = load().await {
            tracing::warn!(err = ?err.as_string(), "background load failed");
        }
    });
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let body = body.trim();
        return Err(if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        });
    }
    resp.text().await.map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn set_metric(field: &str) -> Result<(), JsValue> {
    with_app(|app| app.sync.on_metric_changed(field))
}

#[wasm_bindgen]
pub fn apply_filter(field: &str, op: &str, value: &str) -> Result<(), JsValue> {
    let spec = parse_filter(field, op, value);
    with_app(|app| app.sync.on_filter_applied(spec))
}

#[wasm_bindgen]
pub fn set_chart(slot: u32, kind: &str, field: &str) -> Result<(), JsValue> {
    let (slot, kind) = parse_chart(slot, kind).map_err(js_err)?;
    with_app(|app| app.sync.on_chart_config_changed(slot, kind, field))
}

#[wasm_bindgen]
pub fn hover(name: &str) {
    let _ = with_app(|app| app.sync.on_region_hover(name));
}

#[wasm_bindgen]
pub fn hover_end() {
    let _ = with_app(|app| app.sync.on_region_hover_end());
}

#[wasm_bindgen]
pub fn map_click(lon: f64, lat: f64) {
    if let Ok(outcome) = with_app(|app| app.sync.on_map_click(LonLat::new(lon, lat))) {
        tracing::debug!(?outcome, lon, lat, "map click");
    }
}

#[wasm_bindgen]
pub fn set_base_layer(name: &str) {
    let layer = parse_base_layer(name);
    let _ = with_app(|app| {
        if app.sync.base_layer() != layer {
            app.sync.on_base_layer_changed(layer);
        }
    });
}

/// Downloads the filtered rows as CSV.
#[wasm_bindgen]
pub fn save_filtered() -> Result<(), JsValue> {
    let exported = with_app(|app| app.sync.export_filtered())?.map_err(js_err)?;
    bridge::download(&exported.file_name, &exported.text);
    tracing::info!(file = %exported.file_name, bytes = exported.text.len(), "filtered rows saved");
    Ok(())
}

#[wasm_bindgen]
pub fn get_config() -> Result<String, JsValue> {
    with_app(|app| app.sync.config().to_json())?.map_err(js_err)
}

#[wasm_bindgen]
pub fn set_config(config_json: &str) -> Result<(), JsValue> {
    let config = ViewerConfig::from_json(config_json).map_err(js_err)?;
    with_app(|app| app.sync.on_config_changed(config))
}

/// Dropdown choices as `{metrics, filter_fields, chart_fields}`.
#[wasm_bindgen]
pub fn field_options() -> Result<JsValue, JsValue> {
    let options = with_app(|app| app.sync.field_options())?;
    let text = serde_json::to_string(&options).map_err(js_err)?;
    js_sys::JSON::parse(&text)
}

/// The status line as `{kind, message}`, or `null` before the first load.
#[wasm_bindgen]
pub fn status() -> Result<JsValue, JsValue> {
    let status = with_app(|app| app.sync.status().cloned())?;
    let Some(status) = status else {
        return Ok(JsValue::NULL);
    };
    let out = js_sys::Object::new();
    js_sys::Reflect::set(&out, &"kind".into(), &status.kind().into())?;
    js_sys::Reflect::set(&out, &"message".into(), &status.message().into())?;
    Ok(out.into())
}
