mod common;

use common::{RecordingCharts, RecordingMap, new_log};
use compute::filter::{FilterSpec, Operator};
use formats::table::{SourceFile, merge};
use proptest::prelude::*;
use viewer::{Synchronizer, ViewerConfig};

fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("人口".to_string()),
        Just("面积".to_string()),
        Just("GDP".to_string()),
        Just("率".to_string()),
    ]
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..500).prop_map(|v| v.to_string()),
        Just(String::new()),
        Just("n/a".to_string()),
    ]
}

/// A file with the key column, one to three other columns and some rows.
fn csv_file() -> impl Strategy<Value = (Vec<String>, Vec<Vec<String>>)> {
    prop::collection::btree_set(field(), 1..4).prop_flat_map(|fields| {
        let mut headers = vec!["城市".to_string()];
        headers.extend(fields);
        let width = headers.len();
        let row = ("[a-z]{1,4}", prop::collection::vec(value(), width - 1)).prop_map(
            |(city, mut cells)| {
                cells.insert(0, city);
                cells
            },
        );
        (Just(headers), prop::collection::vec(row, 0..6))
    })
}

fn render(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut out = headers.join(",");
    for r in rows {
        out.push('\n');
        out.push_str(&r.join(","));
    }
    out.push('\n');
    out
}

proptest! {
    #[test]
    fn merge_counts_rows_and_unions_headers(files in prop::collection::vec(csv_file(), 1..4)) {
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (h, rows))| SourceFile::new(format!("f{i}.csv"), render(h, rows)))
            .collect();
        let table = merge(&sources, "城市").unwrap();

        let expected_rows: usize = files.iter().map(|(_, rows)| rows.len()).sum();
        prop_assert_eq!(table.len(), expected_rows);

        let mut expected_headers: Vec<String> = Vec::new();
        for (h, _) in &files {
            for name in h {
                if !expected_headers.contains(name) {
                    expected_headers.push(name.clone());
                }
            }
        }
        prop_assert_eq!(table.headers(), expected_headers.as_slice());
    }

    #[test]
    fn missing_key_in_any_file_fails_the_merge(
        files in prop::collection::vec(csv_file(), 1..4),
        broken in 0usize..4,
    ) {
        let broken = broken % files.len();
        let sources: Vec<SourceFile> = files
            .iter()
            .enumerate()
            .map(|(i, (h, rows))| {
                let mut h = h.clone();
                if i == broken {
                    h[0] = "城".to_string();
                }
                SourceFile::new(format!("f{i}.csv"), render(&h, rows))
            })
            .collect();
        prop_assert!(merge(&sources, "城市").is_err());
    }

    #[test]
    fn export_of_any_filter_reparses_to_the_filtered_rows(
        file in csv_file(),
        op in prop_oneof![Just(Operator::Greater), Just(Operator::Less), Just(Operator::Equal)],
        threshold in 0u32..500,
        use_filter in any::<bool>(),
    ) {
        let (headers, rows) = file;
        let log = new_log();
        let mut v = Synchronizer::new(
            ViewerConfig::default(),
            RecordingMap::new(log.clone()),
            RecordingCharts::new(log),
        );
        v.on_data_loaded(merge(&[SourceFile::new("in.csv", render(&headers, &rows))], "城市").unwrap());
        let spec = if use_filter {
            FilterSpec::new(headers[1].clone(), op, f64::from(threshold))
        } else {
            FilterSpec::identity()
        };
        v.on_filter_applied(spec);

        let out = v.export_filtered().unwrap();
        let back = merge(&[SourceFile::new("out.csv", out.text)], "城市").unwrap();
        let filtered = v.filtered_rows();
        prop_assert_eq!(back.len(), filtered.len());
        for (got, want) in back.rows().iter().zip(filtered) {
            for h in v.table().headers() {
                prop_assert_eq!(got.get(h).unwrap_or(""), want.get(h).unwrap_or(""));
            }
        }
    }
}
