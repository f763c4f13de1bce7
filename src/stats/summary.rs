use serde::Serialize;

use crate::data::model::Dataset;

/// Descriptive statistics of one feature column.
///
/// Every float is NaN when the feature has no value to describe (and `std` also
/// when there is a single value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub feature: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// Summarise every feature column, in schema order, over its non-missing values.
///
/// With `round_digits > 0` every float is rounded to that many decimals; the
/// count is always exact. The category column is not summarised.
pub fn summarize(dataset: &Dataset, round_digits: u32) -> Vec<FeatureSummary> {
    dataset
        .features()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut values: Vec<f64> = dataset.column(idx).filter_map(|c| c.as_f64()).collect();
            let summary = describe(name, &mut values);
            if round_digits > 0 {
                summary.rounded(round_digits)
            } else {
                summary
            }
        })
        .collect()
}

fn describe(feature: &str, values: &mut [f64]) -> FeatureSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = mean(values);

    FeatureSummary {
        feature: feature.to_string(),
        count,
        mean,
        std: sample_std(values, mean),
        min: values.first().copied().unwrap_or(f64::NAN),
        q25: quantile(values, 0.25),
        q50: quantile(values, 0.50),
        q75: quantile(values, 0.75),
        max: values.last().copied().unwrap_or(f64::NAN),
    }
}

impl FeatureSummary {
    fn rounded(self, digits: u32) -> Self {
        let r = |v: f64| round_to(v, digits);
        FeatureSummary {
            mean: r(self.mean),
            std: r(self.std),
            min: r(self.min),
            q25: r(self.q25),
            q50: r(self.q50),
            q75: r(self.q75),
            max: r(self.max),
            ..self
        }
    }
}

/// Arithmetic mean; NaN for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// N-1 denominator.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of sorted values, linear interpolation between the closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Round half to even at `digits` decimals.
fn round_to(v: f64, digits: u32) -> f64 {
    if !v.is_finite() {
        return v;
    }
    let scale = 10f64.powi(digits as i32);
    (v * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, Row};

    fn single_feature(values: &[Option<f64>]) -> Dataset {
        let rows = values
            .iter()
            .map(|v| {
                Row::new(
                    vec![v.map(Cell::Numeric).unwrap_or(Cell::Missing), Cell::Numeric(0.0)],
                    "red",
                )
            })
            .collect();
        Dataset::new(vec!["x".into(), "pad".into()], "type", rows).unwrap()
    }

    #[test]
    fn missing_values_are_excluded() {
        let ds = single_feature(&[Some(5.0), Some(7.0), None, Some(9.0)]);
        let s = &summarize(&ds, 0)[0];
        assert_eq!(s.feature, "x");
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, 7.0);
        assert_eq!(s.std, 2.0);
        assert_eq!(s.min, 5.0);
        assert_eq!(s.q25, 6.0);
        assert_eq!(s.q50, 7.0);
        assert_eq!(s.q75, 8.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let ds = single_feature(&[Some(4.0), Some(1.0), Some(3.0), Some(2.0)]);
        let s = &summarize(&ds, 0)[0];
        assert_eq!(s.q25, 1.75);
        assert_eq!(s.q50, 2.5);
        assert_eq!(s.q75, 3.25);
    }

    #[test]
    fn all_missing_feature_is_nan_with_zero_count() {
        let ds = single_feature(&[None, None]);
        let s = &summarize(&ds, 2)[0];
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan() && s.std.is_nan() && s.q50.is_nan() && s.max.is_nan());
    }

    #[test]
    fn single_value_has_undefined_std() {
        let ds = single_feature(&[Some(3.0)]);
        let s = &summarize(&ds, 0)[0];
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 3.0);
        assert!(s.std.is_nan());
        assert_eq!(s.q75, 3.0);
    }

    #[test]
    fn rounding_applies_only_with_positive_digits() {
        let ds = single_feature(&[Some(1.0), Some(2.0), Some(2.0)]);
        let raw = &summarize(&ds, 0)[0];
        assert_eq!(raw.mean, 5.0 / 3.0);
        let rounded = &summarize(&ds, 2)[0];
        assert_eq!(rounded.mean, 1.67);
        assert_eq!(rounded.std, 0.58);
        assert_eq!(rounded.count, 3);
    }

    #[test]
    fn summary_follows_schema_order_and_is_reproducible() {
        let ds = single_feature(&[Some(1.5), Some(2.5)]);
        let a = summarize(&ds, 3);
        let b = summarize(&ds, 3);
        let names: Vec<&str> = a.iter().map(|s| s.feature.as_str()).collect();
        assert_eq!(names, ["x", "pad"]);
        assert_eq!(a[0].mean.to_bits(), b[0].mean.to_bits());
    }

    #[test]
    fn round_to_is_half_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
