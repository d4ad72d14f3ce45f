use formats::table::Row;

pub struct Statistics;

impl Statistics {
    /// Numeric readings of `field`, skipping rows where it is missing or
    /// does not parse.
    pub fn numeric_values<'a>(rows: impl IntoIterator<Item = &'a Row>, field: &str) -> Vec<f64> {
        rows.into_iter().filter_map(|r| r.number(field)).collect()
    }

    /// `(min, max)` of `values`, or `None` when there are none.
    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let (&first, rest) = values.split_first()?;
        Some(
            rest.iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;
    use formats::table::Row;

    #[test]
    fn numeric_values_skip_unparseable_cells() {
        let rows: Vec<Row> = ["12", "", "n/a", " 7.5 "]
            .into_iter()
            .map(|v| [("GDP", v)].into_iter().collect())
            .chain(std::iter::once(Row::new()))
            .collect();
        let values = Statistics::numeric_values(&rows, "GDP");
        assert_eq!(values, [12.0, 7.5]);
        assert_eq!(Statistics::min_max(&values), Some((7.5, 12.0)));
    }

    #[test]
    fn min_max_of_nothing_is_none() {
        assert_eq!(Statistics::min_max(&[]), None);
        assert_eq!(Statistics::min_max(&[-3.0]), Some((-3.0, -3.0)));
    }
}
