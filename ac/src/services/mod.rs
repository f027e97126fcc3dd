//! Typed calls to the analysis server

pub mod analysis;
pub mod history;

pub use analysis::{
    ANALYSIS_ERROR_MESSAGE, ANALYSIS_SUCCESS_MESSAGE, AnalysisApi, AnalysisResult, AnalysisService,
};
pub use history::{HistoryApi, HistoryItem, HistoryQuery, HistoryResponse, HistoryService, PaginationInfo};
