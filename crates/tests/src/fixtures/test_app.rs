use axum::Router;
use mongodb::{Client, Database, options::ClientOptions};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use vigil_api::{build_router, state::AppState};
use vigil_config::{
    AppSettings, AttendanceSettings, AuthMode, AuthSettings, DatabaseSettings, JwtSettings,
    Settings, StreamSettings,
};
use vigil_db::indexes::ensure_indexes;

/// A running test application with its own MongoDB database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub settings: Settings,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Requires a running MongoDB at localhost:27017.
    /// Set VIGIL__DATABASE__URL to override the connection string.
    /// Each test gets a unique database name for isolation.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after defaults are applied.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let db_name = format!("vigil_test_{}", uuid::Uuid::new_v4().simple());

        let mut settings = test_settings();
        if let Ok(url) = std::env::var("VIGIL__DATABASE__URL") {
            settings.database.url = url;
        }
        settings.database.name = db_name.clone();

        mutator(&mut settings);

        let client_options = ClientOptions::parse(&settings.database.url)
            .await
            .expect("Failed to parse MongoDB URL");
        let mongo_client =
            Client::with_options(client_options).expect("Failed to create MongoDB client");
        let db = mongo_client.database(&db_name);

        ensure_indexes(&db).await.expect("Failed to create indexes");

        let app_state =
            AppState::new(db.clone(), settings.clone()).expect("Failed to create AppState");
        let app = build_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            db,
            settings,
            client,
        }
    }

    /// Spawn a server in entry-form mode: no accounts, identities from name/email only.
    pub async fn spawn_unverified() -> Self {
        Self::spawn_with_settings(|s| s.auth.mode = AuthMode::Unverified).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        tokio::spawn(async move {
            let _ = db.drop().await;
        });
    }
}

/// Router whose MongoDB can never be reached. Requests that touch the
/// database fail after a short server-selection timeout.
pub async fn unreachable_router() -> (Router, Settings) {
    let mut settings = test_settings();
    settings.database.url =
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=300&connectTimeoutMS=300".to_string();

    let options = ClientOptions::parse(&settings.database.url)
        .await
        .expect("Failed to parse MongoDB URL");
    let db = Client::with_options(options)
        .expect("Failed to create MongoDB client")
        .database("unreachable");
    let state = AppState::new(db, settings.clone()).expect("Failed to create AppState");

    (build_router(state), settings)
}

pub fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            timezone: "UTC".to_string(),
            cors_origins: vec![],
        },
        database: DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "vigil_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: Some(1),
        },
        jwt: JwtSettings {
            secret: "test-secret-key-for-jwt-signing-minimum-32-chars".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604800,
            issuer: "vigil".to_string(),
        },
        auth: AuthSettings {
            mode: AuthMode::Verified,
            admin_emails: vec![],
        },
        stream: StreamSettings {
            default_channel_id: "UCR4c-NsIGhMqV8W-E-Q5N6A".to_string(),
            default_title: "Sunday Service".to_string(),
        },
        attendance: AttendanceSettings { list_limit: 100 },
    }
}
