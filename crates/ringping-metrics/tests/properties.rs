//! Property tests for the histogram and its summary

use proptest::prelude::*;
use ringping_metrics::{Histogram, HistogramConfig, HistogramSummary};

fn small_config() -> HistogramConfig {
    HistogramConfig {
        bin_width_ns: 100,
        max_latency_ns: 10_000,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every sample lands in min(L / width, bins - 1) and none is lost
    #[test]
    fn record_places_and_keeps_every_sample(latencies in prop::collection::vec(0u64..50_000, 0..300)) {
        let config = small_config();
        let histogram = Histogram::with_config(config).unwrap();
        let mut expected = vec![0u64; config.bins()];

        for &ns in &latencies {
            histogram.record(ns);
            let bin = ((ns / config.bin_width_ns) as usize).min(config.bins() - 1);
            expected[bin] += 1;
        }

        prop_assert_eq!(histogram.total_count(), latencies.len() as u64);
        prop_assert_eq!(histogram.counts(), expected);
    }

    /// Summaries depend only on bucket state
    #[test]
    fn summarize_is_pure(latencies in prop::collection::vec(0u64..20_000, 0..300)) {
        let histogram = Histogram::with_config(small_config()).unwrap();
        for ns in latencies {
            histogram.record(ns);
        }
        let first = histogram.summarize();
        let second = histogram.summarize();
        prop_assert_eq!(first.to_string(), second.to_string());
        prop_assert_eq!(first, second);
    }

    /// Percentile latencies never decrease along the target list
    #[test]
    fn percentiles_are_monotonic(counts in prop::collection::vec(0u64..1_000, 1..64)) {
        let summary = HistogramSummary::from_counts(100, &counts);
        let values: Vec<u64> = summary.percentiles.iter().filter_map(|p| p.latency_ns).collect();
        for pair in values.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        if summary.samples > 0 {
            prop_assert_eq!(values.len(), summary.percentiles.len());
        }
    }

    /// Mean is the count-weighted average of bucket edges
    #[test]
    fn mean_matches_weighted_average(counts in prop::collection::vec(0u64..1_000, 1..64)) {
        let summary = HistogramSummary::from_counts(100, &counts);
        let total: u64 = counts.iter().sum();
        let weighted: u64 = counts.iter().enumerate().map(|(i, c)| i as u64 * 100 * c).sum();

        match summary.mean_ns {
            None => prop_assert_eq!(total, 0),
            Some(mean) => {
                let expected = weighted as f64 / total as f64;
                prop_assert!((mean - expected).abs() < 1e-6);
            }
        }
    }

    /// The detail table lists exactly the non-empty buckets, ending at 100%
    #[test]
    fn detail_rows_cover_all_samples(counts in prop::collection::vec(0u64..1_000, 1..64)) {
        let summary = HistogramSummary::from_counts(100, &counts);
        let nonempty = counts.iter().filter(|&&c| c > 0).count();
        prop_assert_eq!(summary.buckets.len(), nonempty);
        prop_assert_eq!(summary.buckets.iter().map(|r| r.count).sum::<u64>(), summary.samples);
        if let Some(last) = summary.buckets.last() {
            prop_assert!((last.cumulative_percent - 100.0).abs() < 1e-9);
        }
    }
}
