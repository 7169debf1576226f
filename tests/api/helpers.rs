use once_cell::sync::Lazy;
use reqwest::{Method, Response};
use serde_json::Value;
use uuid::Uuid;

use mailing_list::{
    config::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

// Logs are only printed when TEST_LOG is set, e.g. `TEST_LOG=true cargo test`.
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = String::from("info");
    let subscriber_name = String::from("test");

    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink,
        ));
    }
});

pub struct TestApp {
    pub address: String,
    pub db_path: String,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        Lazy::force(&TRACING);

        let mut config = get_configuration().expect("Missing configuration file.");
        // Every test owns its database file.
        let db_path = std::env::temp_dir()
            .join(format!("mailing_list_{}.db", Uuid::new_v4().simple()))
            .to_string_lossy()
            .into_owned();

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_db_path(db_path.clone());

        let application = Application::build(config)
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp { address, db_path }
    }

    pub async fn send(&self, method: Method, endpoint: &str, body: &Value) -> Response {
        reqwest::Client::new()
            .request(method, format!("{}/email/{}", self.address, endpoint))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_subscriber(&self, email: &str) -> Response {
        self.send(Method::POST, "create", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn get_subscriber(&self, email: &str) -> Response {
        self.send(Method::GET, "get", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn update_subscriber(&self, body: &Value) -> Response {
        self.send(Method::PUT, "update", body).await
    }

    pub async fn delete_subscriber(&self, email: &str) -> Response {
        self.send(Method::POST, "delete", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn get_batch(&self, page: i64, count: i64) -> Response {
        self.send(
            Method::GET,
            "get_batch",
            &serde_json::json!({ "page": page, "count": count }),
        )
        .await
    }
}

// SQLite runs in WAL mode, which leaves two sidecar files next to the database.
impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_path, suffix));
        }
    }
}
