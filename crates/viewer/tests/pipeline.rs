mod common;

use common::{
    RecordingCharts, RecordingMap, THREE_CITIES_GEOJSON, init_tracing, new_log, three_cities,
};
use compute::filter::{FilterSpec, Operator};
use foundation::color::GREENS;
use formats::table::{SourceFile, merge};
use layers::chart::{ChartKind, ChartSlot};
use pretty_assertions::assert_eq;
use viewer::{Status, Synchronizer, ViewerConfig, ViewerError};

type TestSync = Synchronizer<RecordingMap, RecordingCharts>;

fn viewer() -> TestSync {
    init_tracing();
    let log = new_log();
    Synchronizer::new(
        ViewerConfig::default(),
        RecordingMap::new(log.clone()),
        RecordingCharts::new(log),
    )
}

fn scenario_files() -> Vec<SourceFile> {
    vec![
        SourceFile::new("a.csv", "城市,人口\n北京,100\n上海,80\n"),
        SourceFile::new("b.csv", "城市,面积\n北京,16\n广州,50\n"),
    ]
}

fn loaded() -> TestSync {
    let mut v = viewer();
    let ticket = v.begin_load().unwrap();
    v.finish_load(ticket, &scenario_files(), THREE_CITIES_GEOJSON)
        .unwrap();
    v
}

#[test]
fn two_file_scenario_merges_then_filters() {
    let mut v = loaded();
    assert_eq!(v.table().headers(), ["城市", "人口", "面积"]);
    // Rows are appended, never merged by key.
    assert_eq!(v.table().len(), 4);
    assert_eq!(v.status(), Some(&Status::Success));
    assert_eq!(v.metric(), Some("人口"));
    assert_eq!(v.regions().len(), 3);

    v.on_filter_applied(FilterSpec::from_input("人口", Operator::Greater, "90"));
    let rows = v.filtered_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("城市"), Some("北京"));
    assert_eq!(rows[0].get("人口"), Some("100"));
    assert!(!rows[0].contains("面积"));
    // The table itself is untouched by filtering.
    assert_eq!(v.table().len(), 4);
}

#[test]
fn bins_follow_filtered_rows_and_metric() {
    let mut v = viewer();
    let text = "城市,GDP\n".to_string()
        + &["北京,10", "上海,20", "广州,30", "深圳,40", "杭州,50", "南京,60", "成都,70", "武汉,80"]
            .join("\n");
    v.on_data_loaded(merge(&[SourceFile::new("gdp.csv", text)], "城市").unwrap());
    let bins = v.bins().copied().unwrap();
    assert_eq!(
        *bins.boundaries(),
        [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0]
    );

    v.on_filter_applied(FilterSpec::new("GDP", Operator::Less, 45.0));
    let bins = v.bins().copied().unwrap();
    assert_eq!(bins.min(), 10.0);
    assert_eq!(bins.max(), 40.0);

    v.on_metric_changed("");
    assert_eq!(v.bins(), None);
    assert!(v.map().last_legend.is_none());
}

#[test]
fn redraw_order_is_map_then_chart_slots() {
    let mut v = loaded();
    v.on_chart_config_changed(ChartSlot::First, ChartKind::Bar, "人口");
    v.on_chart_config_changed(ChartSlot::Second, ChartKind::Line, "面积");
    v.map().log.borrow_mut().clear();

    v.on_filter_applied(FilterSpec::new("人口", Operator::Greater, 0.0));

    assert_eq!(
        *v.map().log.borrow(),
        [
            "remove overlay",
            "draw overlay",
            "front overlay",
            "remove legend",
            "draw legend",
            "destroy chart1",
            "draw chart1",
            "destroy chart2",
            "draw chart2",
        ]
    );
    assert_eq!(
        v.events().surfaces_at(v.revision()),
        ["map", "chart1", "chart2"]
    );
}

#[test]
fn handles_are_released_before_replacement() {
    let mut v = loaded();
    for field in ["人口", "面积", "", "人口"] {
        v.on_chart_config_changed(ChartSlot::First, ChartKind::Bar, field);
        v.on_metric_changed(field);
        v.on_filter_applied(FilterSpec::new("人口", Operator::Less, 1000.0));
    }
    for surface in ["map", "legend", "chart1"] {
        let c = v.metrics().counters(surface);
        assert!(c.draws > 1, "{surface} never redrawn");
        assert_eq!(c.peak_live, 1, "{surface} held two handles");
    }
    assert_eq!(v.map().live_overlays, 1);
    assert!(v.map().live_legends <= 1);
    assert_eq!(v.charts().live, [1, 0]);
}

#[test]
fn chart_slots_are_independent() {
    let mut v = loaded();
    v.on_chart_config_changed(ChartSlot::Second, ChartKind::Line, "面积");
    let second = v.charts().last[1].clone().unwrap();
    assert!(v.charts().last[0].is_none());

    v.on_chart_config_changed(ChartSlot::First, ChartKind::Bar, "人口");
    assert_eq!(v.charts().last[1].as_ref(), Some(&second));
    assert_eq!(v.chart_config(ChartSlot::Second).field, "面积");
    assert_eq!(second.title, "面积分布");
    assert_eq!(second.labels, ["北京", "上海", "北京", "广州"]);
}

#[test]
fn failed_merge_keeps_previous_state() {
    let mut v = loaded();
    let revision = v.revision();
    let ticket = v.begin_load().unwrap();
    let files = [
        SourceFile::new("ok.csv", "城市,GDP\n北京,1\n"),
        SourceFile::new("bad.csv", "name,GDP\n北京,1\n"),
    ];
    let err = v.finish_load(ticket, &files, THREE_CITIES_GEOJSON).unwrap_err();
    assert!(matches!(err, ViewerError::Merge(_)));
    assert!(v.status().unwrap().message().contains("bad.csv"));
    assert_eq!(v.status().unwrap().kind(), "error");
    assert_eq!(v.table().headers(), ["城市", "人口", "面积"]);
    assert_eq!(v.revision(), revision);
    assert!(!v.is_loading());
}

#[test]
fn network_failure_aborts_without_touching_state() {
    let mut v = loaded();
    let revision = v.revision();
    let ticket = v.begin_load().unwrap();
    assert_eq!(v.status(), Some(&Status::Loading));
    v.abort_load(ticket, ViewerError::Network("HTTP 503".into()))
        .unwrap();
    assert_eq!(v.status().unwrap().kind(), "error");
    assert!(v.status().unwrap().message().contains("HTTP 503"));
    assert_eq!(v.table().len(), 4);
    assert_eq!(v.revision(), revision);
    // The ticket is spent.
    assert!(matches!(
        v.abort_load(ticket, ViewerError::Network("again".into())),
        Err(ViewerError::StaleLoad { .. })
    ));
}

#[test]
fn concurrent_load_trigger_is_rejected() {
    let mut v = viewer();
    let first = v.begin_load().unwrap();
    assert!(v.is_loading());
    assert!(matches!(v.begin_load(), Err(ViewerError::LoadInFlight)));
    v.finish_load(first, &scenario_files(), THREE_CITIES_GEOJSON)
        .unwrap();
    assert!(!v.is_loading());
    assert!(v.begin_load().is_ok());
}

#[test]
fn empty_queue_cannot_load() {
    let mut v = viewer();
    let ticket = v.begin_load().unwrap();
    let err = v.finish_load(ticket, &[], THREE_CITIES_GEOJSON).unwrap_err();
    assert!(matches!(err, ViewerError::NoFilesQueued));
    assert_eq!(v.revision().0, 0);
}

#[test]
fn key_field_is_never_a_metric() {
    let mut v = loaded();
    let revision = v.revision();
    v.on_metric_changed("城市");
    assert_eq!(v.metric(), Some("人口"));
    assert_eq!(v.revision(), revision);
}

#[test]
fn reload_resets_selections() {
    let mut v = loaded();
    v.on_metric_changed("面积");
    v.on_filter_applied(FilterSpec::new("人口", Operator::Greater, 90.0));
    v.on_chart_config_changed(ChartSlot::First, ChartKind::Line, "人口");

    let ticket = v.begin_load().unwrap();
    v.finish_load(
        ticket,
        &[SourceFile::new("c.csv", "城市,GDP,人口\n上海,5,1\n")],
        THREE_CITIES_GEOJSON,
    )
    .unwrap();

    assert_eq!(v.metric(), Some("GDP"));
    assert!(v.filter_spec().is_identity());
    assert_eq!(v.chart_config(ChartSlot::First).field, "");
    assert_eq!(v.chart_config(ChartSlot::First).kind, ChartKind::Line);
    assert_eq!(v.charts().live, [0, 0]);
    assert_eq!(v.table().len(), 1);
}

#[test]
fn join_misses_render_with_default_color() {
    let v = loaded();
    let overlay = v.overlay();
    assert_eq!(overlay.regions.len(), 3);
    // 广州 has no 人口 value; 北京 (100) tops the range, 上海 (80) opens it.
    assert_eq!(overlay.regions[0].style.fill, GREENS[7]);
    assert_eq!(overlay.regions[1].style.fill, GREENS[0]);
    assert_eq!(overlay.regions[2].value, None);
    assert_eq!(overlay.regions[2].style.fill, GREENS[0]);
    let legend = v.map().last_legend.clone().unwrap();
    assert_eq!(legend.title, "人口");
    assert_eq!(legend.entries.len(), 8);
}

#[test]
fn field_options_list_non_key_headers() {
    let v = loaded();
    let opts = v.field_options();
    assert_eq!(opts.metrics, ["人口", "面积"]);
    assert_eq!(opts.filter_fields, ["", "人口", "面积"]);
    assert_eq!(opts.chart_fields, opts.filter_fields);
}

#[test]
fn export_round_trips_filtered_rows() {
    let mut v = loaded();
    v.on_filter_applied(FilterSpec::new("人口", Operator::Greater, 0.0));
    let out = v.export_filtered().unwrap();
    assert_eq!(out.file_name, "filtered_data.csv");
    assert_eq!(out.text, "城市,人口,面积\n北京,100,\n上海,80,\n");

    let back = merge(&[SourceFile::new(out.file_name, out.text)], "城市").unwrap();
    assert_eq!(back.headers(), v.table().headers());
    for (got, want) in back.rows().iter().zip(v.filtered_rows()) {
        for h in v.table().headers() {
            assert_eq!(got.get(h).unwrap_or(""), want.get(h).unwrap_or(""));
        }
    }
}

#[test]
fn regions_can_arrive_separately() {
    let mut v = viewer();
    v.on_data_loaded(merge(&scenario_files(), "城市").unwrap());
    assert!(v.overlay().regions.is_empty());
    v.on_regions_loaded(three_cities());
    assert_eq!(v.overlay().matched(), 3);
}
