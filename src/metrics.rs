//! Run statistics for the risk engine passes.

use crate::fraud::auditor::PortfolioAudit;
use crate::segmentation::rfm::{RfmRecord, Segment};
use crate::types::risk::RiskLevel;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

const MAX_SAMPLES: usize = 1000;

/// Metrics collector shared across engine passes
pub struct EngineMetrics {
    /// Loans used as a traversal start
    pub loans_analyzed: AtomicU64,
    /// Loans above `LOW`
    pub loans_flagged: AtomicU64,
    /// Customers run through segmentation
    pub customers_segmented: AtomicU64,
    flagged_by_level: RwLock<BTreeMap<RiskLevel, u64>>,
    customers_by_segment: RwLock<HashMap<Segment, u64>>,
    /// Pass durations in microseconds, keyed by pass name
    pass_times: RwLock<HashMap<String, Vec<u64>>>,
    start_time: Instant,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            loans_analyzed: AtomicU64::new(0),
            loans_flagged: AtomicU64::new(0),
            customers_segmented: AtomicU64::new(0),
            flagged_by_level: RwLock::new(BTreeMap::new()),
            customers_by_segment: RwLock::new(HashMap::new()),
            pass_times: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a finished portfolio audit
    pub fn record_audit(&self, elapsed: Duration, audit: &PortfolioAudit) {
        self.record_pass_time("audit", elapsed);
        self.loans_analyzed
            .fetch_add(audit.analyzed_loans.len() as u64, Ordering::Relaxed);

        for flagged in &audit.flagged_loans {
            self.record_flagged(flagged.analysis.risk_level);
        }
    }

    pub fn record_flagged(&self, level: RiskLevel) {
        self.loans_flagged.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_level) = self.flagged_by_level.write() {
            *by_level.entry(level).or_insert(0) += 1;
        }
    }

    /// Record a finished segmentation pass
    pub fn record_segmentation(&self, elapsed: Duration, records: &[RfmRecord]) {
        self.record_pass_time("segmentation", elapsed);
        self.customers_segmented
            .fetch_add(records.len() as u64, Ordering::Relaxed);

        if let Ok(mut by_segment) = self.customers_by_segment.write() {
            for record in records {
                *by_segment.entry(record.segment).or_insert(0) += 1;
            }
        }
    }

    pub fn record_pass_time(&self, pass: &str, elapsed: Duration) {
        if let Ok(mut times) = self.pass_times.write() {
            let samples = times.entry(pass.to_string()).or_default();
            samples.push(elapsed.as_micros() as u64);
            if samples.len() > MAX_SAMPLES {
                samples.drain(0..MAX_SAMPLES / 2);
            }
        }
    }

    pub fn get_flagged_by_level(&self) -> BTreeMap<RiskLevel, u64> {
        self.flagged_by_level
            .read()
            .map(|by_level| by_level.clone())
            .unwrap_or_default()
    }

    /// Counts per segment in rule order, zero counts included
    pub fn get_segment_counts(&self) -> Vec<(Segment, u64)> {
        let by_segment = self
            .customers_by_segment
            .read()
            .map(|by_segment| by_segment.clone())
            .unwrap_or_default();

        Segment::ALL
            .iter()
            .map(|segment| (*segment, by_segment.get(segment).copied().unwrap_or(0)))
            .collect()
    }

    pub fn get_pass_stats(&self) -> BTreeMap<String, PassStats> {
        let Ok(times) = self.pass_times.read() else {
            return BTreeMap::new();
        };

        times
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(pass, samples)| {
                let mut sorted = samples.clone();
                sorted.sort_unstable();
                let count = sorted.len();

                let stats = PassStats {
                    runs: count as u64,
                    mean_us: sorted.iter().sum::<u64>() / count as u64,
                    p50_us: sorted[count / 2],
                    max_us: sorted[count - 1],
                };
                (pass.clone(), stats)
            })
            .collect()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log a run summary
    pub fn print_summary(&self) {
        let analyzed = self.loans_analyzed.load(Ordering::Relaxed);
        let flagged = self.loans_flagged.load(Ordering::Relaxed);
        let flag_rate = if analyzed > 0 {
            (flagged as f64 / analyzed as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              PORTFOLIO RISK ENGINE - RUN SUMMARY             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Loans Analyzed: {:>8}  │  Flagged: {:>6} ({:>5.1}%)         ║",
            analyzed, flagged, flag_rate
        );
        info!(
            "║ Customers Segmented: {:>8}  │  Uptime: {:>8.1} ms         ║",
            self.customers_segmented.load(Ordering::Relaxed),
            self.uptime().as_secs_f64() * 1000.0
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Flagged by Risk Level:                                       ║");
        for (level, count) in self.get_flagged_by_level().iter().rev() {
            info!("║   {:10}: {:>6}                                          ║", level, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Customers by Segment:                                        ║");
        for (segment, count) in self.get_segment_counts() {
            if count > 0 {
                info!("║   {:20}: {:>6}                                ║", segment, count);
            }
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        let pass_stats = self.get_pass_stats();
        if !pass_stats.is_empty() {
            info!("Pass Times (μs):");
            for (pass, stats) in &pass_stats {
                info!(
                    "  {}: mean={} p50={} max={} (runs={})",
                    pass, stats.mean_us, stats.p50_us, stats.max_us, stats.runs
                );
            }
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Timing statistics for one pass
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassStats {
    pub runs: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fraud::auditor::PortfolioAuditor;
    use crate::segmentation::rfm::SegmentationEngine;
    use crate::types::customer::Customer;
    use crate::types::loan::Loan;
    use chrono::Utc;

    #[test]
    fn test_audit_recording() {
        let metrics = EngineMetrics::new();
        let loans = vec![
            Loan::new("a", "Big", "Unknown Lender", 60_000.0, 59_000.0),
            Loan::new("b", "Small", "Bank", 1_000.0, 100.0),
        ];
        let audit = PortfolioAuditor::default().audit(&loans);

        metrics.record_audit(Duration::from_micros(150), &audit);

        assert_eq!(metrics.loans_analyzed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.loans_flagged.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_flagged_by_level().get(&RiskLevel::Medium), Some(&1));
    }

    #[test]
    fn test_segment_counts_cover_every_segment() {
        let metrics = EngineMetrics::new();
        let now = Utc::now();
        let customers = vec![Customer::new("c1", 500.0).active(now)];
        let records = SegmentationEngine::new().segment(&customers, now);

        metrics.record_segmentation(Duration::from_micros(10), &records);

        let counts = metrics.get_segment_counts();
        assert_eq!(counts.len(), Segment::ALL.len());
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<u64>(), 1);
    }

    #[test]
    fn test_pass_stats() {
        let metrics = EngineMetrics::new();
        metrics.record_pass_time("audit", Duration::from_micros(100));
        metrics.record_pass_time("audit", Duration::from_micros(300));
        metrics.record_pass_time("audit", Duration::from_micros(200));

        let stats = metrics.get_pass_stats();
        let audit = &stats["audit"];
        assert_eq!(audit.runs, 3);
        assert_eq!(audit.mean_us, 200);
        assert_eq!(audit.p50_us, 200);
        assert_eq!(audit.max_us, 300);
    }
}
