//! Stored-reading playback: detail view model, grouping and navigation.

pub mod detail;
pub mod list;
pub mod navigator;

pub use detail::{format_timestamp, load_error_message, ReadingDetail, READING_NOT_FOUND};
pub use list::{group_readings, ReadingGroup};
pub use navigator::{parse_id_list, ReadingNavigator};
