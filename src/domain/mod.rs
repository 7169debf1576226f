pub mod pagination;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_update;
