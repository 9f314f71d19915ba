pub mod buffer;
pub mod export;
pub mod query;
pub mod sample;
pub mod store;

pub use buffer::{RecentWindow, WindowPoint};
pub use export::{export_by_extension, export_to_csv, export_to_json};
pub use query::{load_history, load_range, HistoryNotice, HistoryReport};
pub use sample::{format_timestamp, parse_timestamp, Sample, TimeRange, TIMESTAMP_FORMAT};
pub use store::SampleStore;
