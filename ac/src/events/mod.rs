//! Request activity events
//!
//! The API client's [`ActivityInterceptor`](crate::http::ActivityInterceptor)
//! emits an [`ApiEvent`] when a request starts and when it settles. Consumers
//! subscribe to the [`ActivityBus`]; the [`ActivityLogger`] keeps a JSONL trail
//! that `ac activity` reads back.
//!
//! ```text
//!   ApiClient ──► ActivityInterceptor ──► ActivityBus (broadcast)
//!                                              │
//!                                              ├──► ActivityLogger ──► activity.jsonl
//!                                              └──► tests / other subscribers
//! ```

mod bus;
mod logger;
mod types;

pub use bus::{ActivityBus, DEFAULT_CHANNEL_CAPACITY, create_activity_bus};
pub use logger::{ACTIVITY_FILE, ActivityLogger, read_activity, spawn_activity_logger};
pub use types::{ApiEvent, EventLogEntry};
