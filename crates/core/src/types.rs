/// Users are keyed by the login id they chose (e.g. `"s-tanaka"`).
pub type UserId = String;

/// Training days are calendar dates without a time zone.
pub type Day = chrono::NaiveDate;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
