//! Analytics
//!
//! The four analyzers and the engine that runs them in parallel and
//! merges their outputs into one report.

pub mod cross_functional;
pub mod engine;
pub mod manager;
pub mod meeting;
pub mod text;

pub use cross_functional::{
    BoundarySpanner, CrossFunctionalAnalyzer, CrossFunctionalInsights, FunctionPairEdge,
    HealthScore, InternalCollaborator, SiloFinding,
};
pub use engine::{
    Collaborator, IndividualReport, InsightsEngine, InsightsReport, Recommendation, ReportSummary,
};
pub use manager::{
    AtRiskPair, AtRiskReason, ManagerAnalyzer, ManagerInsights, ManagerSummary,
    MonitoringIndicator, PairStats, TimeAllocation,
};
pub use meeting::{
    DurationBucket, MeetingAnalyzer, MeetingInsights, MeetingType, SizeBucket, SizeDurationMatrix,
    TypeMix,
};
pub use text::{SentimentIndicator, TextAnalyzer, TextInsights};
