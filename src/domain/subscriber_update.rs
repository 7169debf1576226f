use chrono::{serde::ts_seconds_option, DateTime, Utc};
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

/// Full replacement of the mutable state of a subscriber, keyed by email.
#[derive(Debug, Clone)]
pub struct SubscriberUpdate {
    pub email: SubscriberEmail,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opted_out: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberUpdateBody {
    pub email: String,
    #[serde(default, with = "ts_seconds_option")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub opted_out: bool,
}

impl TryFrom<SubscriberUpdateBody> for SubscriberUpdate {
    type Error = String;

    fn try_from(body: SubscriberUpdateBody) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(body.email)?;

        Ok(SubscriberUpdate {
            email,
            confirmed_at: body.confirmed_at,
            opted_out: body.opted_out,
        })
    }
}
