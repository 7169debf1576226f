use actix_web::{error::JsonPayloadError, web, HttpRequest, Resource, Route};
use serde::Deserialize;

use crate::domain::{
    pagination::{Pagination, PaginationBody},
    subscriber::Subscriber,
    subscriber_email::SubscriberEmail,
    subscriber_update::{SubscriberUpdate, SubscriberUpdateBody},
};
use crate::routes::response::{ApiError, Envelope};
use crate::storage::SubscriberStore;

#[derive(Deserialize, Debug)]
pub struct EmailBody {
    pub email: String,
}

impl TryFrom<EmailBody> for SubscriberEmail {
    type Error = String;

    fn try_from(body: EmailBody) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(body.email)
    }
}

/// Registers the `/email/*` endpoints. Requests with another method than the
/// one an endpoint accepts get a 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(reject_payload))
        .service(
            web::scope("/email")
                .service(endpoint("/create", web::post().to(create_subscriber)))
                .service(endpoint("/get", web::get().to(get_subscriber)))
                .service(endpoint("/get_batch", web::get().to(get_subscriber_batch)))
                .service(endpoint("/update", web::put().to(update_subscriber)))
                .service(endpoint("/delete", web::post().to(delete_subscriber))),
        );
}

fn endpoint(path: &str, route: Route) -> Resource {
    web::resource(path)
        .route(route)
        .default_service(web::to(method_not_allowed))
}

fn reject_payload(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected request body: {}", err);
    ApiError::Validation(err.to_string()).into()
}

async fn method_not_allowed() -> Result<Envelope<()>, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn create_subscriber(
    body: web::Json<EmailBody>,
    store: web::Data<SubscriberStore>,
) -> Result<Envelope<Subscriber>, ApiError> {
    let email: SubscriberEmail = body.into_inner().try_into().map_err(ApiError::Validation)?;
    let subscriber = store.create(&email).await?;

    Ok(Envelope(subscriber))
}

#[tracing::instrument(
    name = "Getting a subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn get_subscriber(
    body: web::Json<EmailBody>,
    store: web::Data<SubscriberStore>,
) -> Result<Envelope<Option<Subscriber>>, ApiError> {
    let email: SubscriberEmail = body.into_inner().try_into().map_err(ApiError::Validation)?;
    let subscriber = store.get(&email).await?;

    Ok(Envelope(subscriber))
}

#[tracing::instrument(
    name = "Updating a subscriber handler",
    skip(body, store),
    fields(
        subscriber_email = %body.email,
        opted_out = body.opted_out
    )
)]
pub async fn update_subscriber(
    body: web::Json<SubscriberUpdateBody>,
    store: web::Data<SubscriberStore>,
) -> Result<Envelope<Subscriber>, ApiError> {
    let update: SubscriberUpdate = body.into_inner().try_into().map_err(ApiError::Validation)?;
    let subscriber = store.upsert(&update).await?;

    Ok(Envelope(subscriber))
}

#[tracing::instrument(
    name = "Opting out a subscriber handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn delete_subscriber(
    body: web::Json<EmailBody>,
    store: web::Data<SubscriberStore>,
) -> Result<Envelope<Option<Subscriber>>, ApiError> {
    let email: SubscriberEmail = body.into_inner().try_into().map_err(ApiError::Validation)?;
    let subscriber = store.soft_delete(&email).await?;

    Ok(Envelope(subscriber))
}

#[tracing::instrument(
    name = "Getting a batch of subscribers handler",
    skip(body, store),
    fields(
        page = body.page,
        count = body.count
    )
)]
pub async fn get_subscriber_batch(
    body: web::Json<PaginationBody>,
    store: web::Data<SubscriberStore>,
) -> Result<Envelope<Vec<Subscriber>>, ApiError> {
    let pagination: Pagination = body.into_inner().try_into().map_err(ApiError::Validation)?;
    let subscribers = store.get_page(&pagination).await?;

    Ok(Envelope(subscribers))
}
