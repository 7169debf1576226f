use config::{Config, ConfigError, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions};

// Overrides kept from the first version of the service, which was configured
// through these two variables only.
const DATABASE_PATH_VAR: &str = "MAILINGLIST_DB";
const BIND_ADDRESS_VAR: &str = "MAILINGLIST_BIND_JSON";

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Full bind address, takes precedence over host and port when present.
    #[serde(default)]
    pub bind_address: Option<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: String,
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

fn default_create_if_missing() -> bool {
    true
}

impl Settings {
    pub fn get_address(&self) -> String {
        self.application.get_address()
    }

    pub fn get_db_path(&self) -> String {
        self.database.get_path()
    }

    pub fn set_db_path(&mut self, path: String) {
        self.database.set_path(path)
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
        self.application.bind_address = None;
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> SqliteConnectOptions {
        let mut db_options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(self.create_if_missing);

        db_options.log_statements(log::LevelFilter::Trace);

        db_options
    }

    pub fn get_path(&self) -> String {
        self.path.clone()
    }

    pub fn set_path(&mut self, new_path: String) {
        self.path = new_path
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }

    /// Port-only addresses such as ":8080" listen on every interface.
    pub fn get_address(&self) -> String {
        match &self.bind_address {
            Some(address) if address.starts_with(':') => format!("0.0.0.0{}", address),
            Some(address) => address.clone(),
            None => format!("{}:{}", self.get_host(), self.get_port()),
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| ConfigError::Foreign(Box::new(err)))?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(environment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let mut builder = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_APPLICATION__PORT would set Settings.application.port
        .add_source(config::Environment::with_prefix("app").separator("__"));

    if let Ok(path) = std::env::var(DATABASE_PATH_VAR) {
        builder = builder.set_override("database.path", path)?;
    }

    if let Ok(address) = std::env::var(BIND_ADDRESS_VAR) {
        builder = builder.set_override("application.bind_address", address)?;
    }

    let settings = builder.build()?;

    tracing::info!("Application environment = {:?}", environment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
