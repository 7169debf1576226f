mod get_batch;
mod health_check;
mod helpers;
