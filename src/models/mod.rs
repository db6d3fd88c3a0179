//! Domain value types and calendar math.

pub mod calendar;
pub mod federal;
pub mod record;

pub use calendar::{clamp_day, days_in_month, fiscal_quarter, fiscal_year};
pub use federal::is_federal_funder;
pub use record::{DeadlineHistoryRecord, RawGrantListing};
