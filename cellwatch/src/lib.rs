//! cellwatch: watch cells of published spreadsheets for changes
//!
//! Turns shared links into watch targets, fetches each document once per
//! polling cycle and reports ranges whose text changed since the last sweep.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod link;
pub mod monitor;
pub mod subscription;

pub use cache::DocumentCache;
pub use config::WatchConfig;
pub use fetch::{DocumentSource, FileSource};
#[cfg(feature = "http")]
pub use fetch::HttpSource;
pub use link::SheetLink;
pub use monitor::{Change, Failure, Monitor, Notifier, SweepReport, read_target};
pub use subscription::{MemoryStore, Subscription, SubscriptionList, ValueStore, WatchTarget};
