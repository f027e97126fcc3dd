//! Analyzer - client for the conformity analysis server
//!
//! Every HTTP call the client makes moves through one lifecycle: a loading
//! start signal, the request, exactly one loading end signal, and at most one
//! user-facing notification. The busy flag the global loader shows is derived
//! from those signals, so overlapping calls keep it on until the last settles.
//!
//! # Modules
//!
//! - [`lifecycle`] - Loading signal bus and in-flight counter
//! - [`http`] - API client wrapper, error taxonomy and interceptors
//! - [`notify`] - Notification records, dedup and console presenter
//! - [`events`] - Request activity events and the JSONL activity log
//! - [`services`] - Typed `/analyze` and `/history` calls
//! - [`views`] - Screen state: analyzer, history, properties, login, guard, loader
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod services;
pub mod views;

// Re-export commonly used types
pub use config::{ApiConfig, Config};
pub use events::{ActivityBus, ApiEvent, create_activity_bus, spawn_activity_logger};
pub use http::{ApiClient, ErrorKind, HttpError, Interceptor, RequestConfig, RequestSpec};
pub use lifecycle::{InFlight, LoadingBus, LoadingSignal, LoadingState, RequestLifecycle};
pub use notify::{ConsolePresenter, Notification, NotificationCenter, NotificationKind, Notifier};
pub use services::{AnalysisApi, AnalysisResult, AnalysisService, HistoryApi, HistoryQuery, HistoryService};
pub use views::ViewError;
