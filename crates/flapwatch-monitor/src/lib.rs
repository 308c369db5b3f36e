pub mod detector;
pub mod listener;
pub mod replay;
pub mod series;
pub mod shared;

pub use detector::FlapDetector;
pub use listener::{EventLog, FlapEvent, FlapEventKind, FlapListener, TracingListener};
pub use replay::{parse_record, replay, ReplayRecord, ReplaySummary};
pub use series::{FlapState, SeriesSnapshot};
pub use shared::SharedFlapDetector;
