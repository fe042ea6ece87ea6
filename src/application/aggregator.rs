// Telemetry aggregator - turns a batch of samples into chart views
use crate::domain::charts::{
    CategoryCount, CategoryPercentage, GroupAverage, HistogramBucket, MetricAverages,
    TimeSeriesPoint,
};
use crate::domain::measurement::{CategoryField, MeasurementSample, Metric};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Accumulator keyed by name that remembers first-seen order
struct OrderedGroups<T> {
    index: HashMap<String, usize>,
    entries: Vec<(String, T)>,
}

impl<T> OrderedGroups<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry_or_insert_with(&mut self, key: String, init: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.clone(), idx);
                self.entries.push((key, init()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    fn into_entries(self) -> Vec<(String, T)> {
        self.entries
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn accumulate(means: &mut [Mean], metrics: &[Metric], sample: &MeasurementSample) {
    for (mean, metric) in means.iter_mut().zip(metrics) {
        if let Some(value) = metric.value(sample) {
            mean.add(value);
        }
    }
}

fn averages_of(means: &[Mean], metrics: &[Metric]) -> MetricAverages {
    metrics
        .iter()
        .zip(means)
        .filter_map(|(metric, mean)| mean.value().map(|avg| (metric.average_key(), avg)))
        .collect()
}

/// Stable sort by timestamp; equal timestamps keep their input order
fn sorted_by_time(samples: &[MeasurementSample]) -> Vec<&MeasurementSample> {
    let mut sorted: Vec<&MeasurementSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.timestamp_ms);
    sorted
}

/// Percentage of total dwell time spent in each category.
///
/// The gap between the last sample of a run and the first sample of the
/// next, different run is credited to the run being left. The final run has
/// no successor and earns nothing, though its category is still listed.
pub fn category_dwell_percentages(
    samples: &[MeasurementSample],
    field: CategoryField,
) -> Vec<CategoryPercentage> {
    let sorted = sorted_by_time(samples);
    let categories: Vec<String> = sorted.iter().map(|s| field.category_of(s)).collect();

    let mut dwell: OrderedGroups<i64> = OrderedGroups::new();
    for (idx, category) in categories.iter().enumerate() {
        let credited = match categories.get(idx + 1) {
            Some(next) if next != category => {
                sorted[idx + 1].timestamp_ms - sorted[idx].timestamp_ms
            }
            _ => 0,
        };
        *dwell.entry_or_insert_with(category.clone(), || 0) += credited;
    }

    let entries = dwell.into_entries();
    let total: i64 = entries.iter().map(|(_, ms)| ms).sum();

    entries
        .into_iter()
        .map(|(name, ms)| CategoryPercentage {
            name,
            percent: if total > 0 {
                ms as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Number of samples per category, in first-seen order
pub fn category_counts(samples: &[MeasurementSample], field: CategoryField) -> Vec<CategoryCount> {
    let mut counts: OrderedGroups<usize> = OrderedGroups::new();
    for sample in samples {
        *counts.entry_or_insert_with(field.category_of(sample), || 0) += 1;
    }

    counts
        .into_entries()
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect()
}

/// Fixed-width histogram of one metric.
///
/// Buckets start at `floor(value / width) * width` and are labelled
/// "{METRIC} {start} to {end}". Rows are ordered by label text, not by value.
/// Samples without the metric are skipped.
pub fn histogram(
    samples: &[MeasurementSample],
    metric: Metric,
    bucket_width: f64,
) -> Vec<HistogramBucket> {
    if !bucket_width.is_finite() || bucket_width <= 0.0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in samples.iter().filter_map(|s| metric.value(s)) {
        // `+ 0.0` folds -0 into 0 so both land in one bucket
        let start = (value / bucket_width).floor() * bucket_width + 0.0;
        let label = format!("{} {} to {}", metric.label(), start, start + bucket_width);
        *counts.entry(label).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(range, count)| HistogramBucket { range, count })
        .collect()
}

/// Averages per fixed time window, ascending by window start
pub fn time_windowed_average(
    samples: &[MeasurementSample],
    window_ms: i64,
    metrics: &[Metric],
) -> Vec<TimeSeriesPoint> {
    if window_ms <= 0 || metrics.is_empty() {
        return Vec::new();
    }

    let mut windows: BTreeMap<i64, Vec<Mean>> = BTreeMap::new();
    for sample in samples {
        let start = sample.timestamp_ms.div_euclid(window_ms) * window_ms;
        let means = windows
            .entry(start)
            .or_insert_with(|| vec![Mean::default(); metrics.len()]);
        accumulate(means, metrics, sample);
    }

    windows
        .into_iter()
        .filter_map(|(start, means)| {
            let averages = averages_of(&means, metrics);
            if averages.is_empty() {
                return None;
            }
            Some(TimeSeriesPoint {
                time: start,
                label: window_label(start),
                averages,
            })
        })
        .collect()
}

fn window_label(start_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(start_ms)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Averages per category, best primary-metric average first.
///
/// The first metric in `metrics` is the primary one. Groups tied on it keep
/// first-seen order; groups without it go last.
pub fn group_average(
    samples: &[MeasurementSample],
    field: CategoryField,
    metrics: &[Metric],
) -> Vec<GroupAverage> {
    let Some(&primary) = metrics.first() else {
        return Vec::new();
    };

    let mut groups: OrderedGroups<Vec<Mean>> = OrderedGroups::new();
    for sample in samples {
        let means = groups.entry_or_insert_with(field.category_of(sample), || {
            vec![Mean::default(); metrics.len()]
        });
        accumulate(means, metrics, sample);
    }

    let mut rows: Vec<GroupAverage> = groups
        .into_entries()
        .into_iter()
        .filter_map(|(group_key, means)| {
            let averages = averages_of(&means, metrics);
            (!averages.is_empty()).then_some(GroupAverage {
                group_key,
                averages,
            })
        })
        .collect();

    rows.sort_by(|a, b| match (a.average(primary), b.average(primary)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}
