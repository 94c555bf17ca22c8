pub mod summary;
pub mod trend;

pub use summary::{summarize, GroupKey, GroupStats, Overview, StatusSummary};
pub use trend::{AnalysisType, Period, TimePoint, TrendAnalysis, TrendGroup, Trends};
