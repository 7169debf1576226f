use chrono::{serde::ts_seconds_option, DateTime, Utc};

/// A mailing list entry. `confirmed_at` travels as epoch seconds, `None`
/// when the address was never confirmed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    #[serde(with = "ts_seconds_option")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opted_out: bool,
}
