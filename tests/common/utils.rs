use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use serde_json::{json, Value};

use my_voice::routes::Route;
use my_voice::services::ApiClient;
use my_voice::store::AppStore;
use my_voice::telemetry::{get_subscriber, init_subscriber};

use super::backend::{routes, BackendState, PASSWORD};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub backend: web::Data<BackendState>,
}

impl TestApp {
    pub fn store(&self) -> AppStore {
        let client = ApiClient::new(&self.address, Duration::from_secs(5))
            .expect("Failed to build API client");
        AppStore::new(client)
    }

    /// A store already logged in as the stub's user.
    pub async fn logged_in_store(&self) -> (AppStore, Route) {
        let mut store = self.store();
        let email = self.backend.with(|inner| inner.user["email"].as_str().unwrap_or_default().to_string());
        let route = store
            .login(&email, SecretString::new(PASSWORD.into()))
            .await
            .expect("Failed to log in against the stub backend");
        (store, route)
    }
}

pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "username": format!("{}-name", id),
        "email": format!("{}@example.com", id),
        "role": role,
    })
}

pub fn routine_json(name: &str) -> Value {
    json!({
        "name": name,
        "days": [
            {
                "dayName": "Lunes",
                "musclesWorked": ["pecho", "tríceps"],
                "warmupOptions": ["movilidad"],
                "explanation": "Empuje",
                "exercises": [
                    { "name": "Press banca", "muscleGroup": ["pecho"], "sets": 4, "reps": 8,
                      "repsUnit": "count", "weight": 60.0, "weightUnit": "kg", "rest": "90",
                      "tips": [], "completed": false, "videos": [], "circuitId": "" },
                    { "name": "Fondos", "muscleGroup": ["tríceps"], "sets": 3, "reps": 12,
                      "repsUnit": "count", "weight": 0.0, "weightUnit": "kg", "rest": "60",
                      "tips": [], "completed": false, "videos": [], "circuitId": "C1" }
                ]
            },
            {
                "dayName": "Jueves",
                "musclesWorked": ["espalda"],
                "warmupOptions": [],
                "explanation": "",
                "exercises": []
            }
        ]
    })
}

/// Serves the stub backend on a random port, logged-in user role `role`.
pub async fn spawn_app(role: &str) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let backend = web::Data::new(BackendState::default());
    backend.with(|inner| inner.user = user_json("u-1", role));

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let state = backend.clone();
    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .workers(1)
        .listen(listener)
        .expect("Failed to bind address")
        .run();
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp { address, backend }
}
