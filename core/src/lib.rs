pub mod config;
pub mod error;
pub mod form;
pub mod input;
pub mod model;
pub mod photo;
pub mod repository;
pub mod service;
pub mod time;

pub use config::Config;
pub use error::{Error, Field, Result};
pub use form::{PhotoChange, RecordForm};
pub use model::range::DateRange;
pub use model::record::{Record, RecordDraft};
pub use photo::{Photo, PhotoInfo, PhotoView};
pub use repository::{FileRecordRepository, LoadSource, RecordRepository};
pub use service::chart::{ChartData, ChartPoint};
pub use service::journal::{Journal, LoadReport};
pub use service::store::{filter_by_range, sort_by_date_ascending, sort_by_date_descending, Upsert};
pub use time::{format_date, parse_human_date, parse_record_date};
