//! Elution consistency scoring over a batch of results
use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};

use crate::result::{ScoreType, SearchResult};

/// Scores each result by how many results for the same peptide elute near it.
///
/// The scan span of the batch is split into `ranges` equal-width ranges. A result's
/// score is the fraction of its peptide's results falling in its own range or one of
/// the two neighboring ranges. Scores above `limit` are raised to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoElution {
    pub ranges: usize,
    pub limit: f64,
}

impl Default for CoElution {
    fn default() -> Self {
        Self {
            ranges: 30,
            limit: 0.8,
        }
    }
}

impl CoElution {
    pub fn new(ranges: usize, limit: f64) -> Self {
        Self {
            ranges: ranges.max(1),
            limit,
        }
    }

    fn range_of(&self, scan: usize, start: usize, end: usize) -> usize {
        (scan - start) * self.ranges / (end + 1 - start)
    }

    /// Attach [`ScoreType::Elution`] to every result in `results`
    pub fn update(&self, results: &mut [SearchResult]) {
        let (start, end) = match results.iter().map(|r| r.scan).minmax() {
            MinMaxResult::NoElements => return,
            MinMaxResult::OneElement(scan) => (scan, scan),
            MinMaxResult::MinMax(start, end) => (start, end),
        };

        let mut totals: HashMap<&str, usize> = HashMap::new();
        let mut range_counts: HashMap<&str, Vec<usize>> = HashMap::new();
        for result in results.iter() {
            *totals.entry(result.peptide.as_str()).or_default() += 1;
            let counts = range_counts
                .entry(result.peptide.as_str())
                .or_insert_with(|| vec![0; self.ranges + 1]);
            counts[self.range_of(result.scan, start, end)] += 1;
        }

        let scores: Vec<f64> = results
            .iter()
            .map(|result| {
                let peptide = result.peptide.as_str();
                let Some(counts) = range_counts.get(peptide) else {
                    return 0.0;
                };
                let index = self.range_of(result.scan, start, end);
                let mut near = counts[index];
                if index > 0 {
                    near += counts[index - 1];
                }
                if index + 1 < counts.len() {
                    near += counts[index + 1];
                }
                let total = totals.get(peptide).copied().unwrap_or(1).max(1);
                let score = near as f64 / total as f64;
                if score > self.limit {
                    1.0
                } else {
                    score
                }
            })
            .collect();

        for (result, score) in results.iter_mut().zip(scores) {
            result.set_extra_score(ScoreType::Elution, score);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::result::ScoringMode;

    fn result(scan: usize, peptide: &str) -> SearchResult {
        SearchResult::new(
            scan,
            peptide.to_string(),
            "GlcNAc-4-Man-3-".to_string(),
            2,
            [0.1, 0.0, 0.0, 0.1, 0.1],
            ScoringMode::Simple,
        )
    }

    #[test]
    fn test_coelution() {
        let mut results = vec![
            result(100, "AANGTK"),
            result(102, "AANGTK"),
            result(104, "AANGTK"),
            result(1000, "AANGTK"),
            result(500, "LCNVSK"),
        ];
        CoElution::default().update(&mut results);
        // three of the four AANGTK results share a range, 0.75 is under the limit
        let elution: Vec<f64> = results
            .iter()
            .map(|r| r.extra_score(ScoreType::Elution))
            .collect();
        assert!((elution[0] - 0.75).abs() < 1e-12);
        assert!((elution[1] - 0.75).abs() < 1e-12);
        assert!((elution[3] - 0.25).abs() < 1e-12);
        assert_eq!(elution[4], 1.0);
        assert!((results[0].final_score() - 0.3 * 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_limit() {
        let mut results: Vec<_> = (0..9).map(|i| result(100 + i, "AANGTK")).collect();
        results.push(result(900, "AANGTK"));
        CoElution::default().update(&mut results);
        assert_eq!(results[0].extra_score(ScoreType::Elution), 1.0);
        assert!((results[9].extra_score(ScoreType::Elution) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        let mut results: Vec<SearchResult> = Vec::new();
        CoElution::default().update(&mut results);
        assert!(results.is_empty());
        let mut single = vec![result(7, "AANGTK")];
        CoElution::default().update(&mut single);
        assert_eq!(single[0].extra_score(ScoreType::Elution), 1.0);
    }
}
