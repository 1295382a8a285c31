mod bucket_name;
mod calendar_date;
mod rule_id;

pub use bucket_name::BucketName;
pub use calendar_date::CalendarDate;
pub use rule_id::RuleId;
