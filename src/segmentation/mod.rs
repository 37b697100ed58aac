//! Customer segmentation (RFM) and lifetime value estimation

pub mod clv;
pub mod rfm;

pub use clv::{ClvOverview, ClvRecord, ClvTier, LifetimeValueEstimator};
pub use rfm::{RfmOverview, RfmRecord, RfmScores, Segment, SegmentationEngine};
