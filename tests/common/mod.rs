#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use warp::http::StatusCode;

use recipe_api::{
    jwt::SessionKeys,
    memory::MemoryStore,
    routes,
    schema::{NewUser, User},
    store::Store,
};

pub struct TestApi {
    pub store: Arc<MemoryStore>,
    pub keys: Arc<SessionKeys>,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApi {
    pub fn new() -> Self {
        let keys = SessionKeys::new(b"integration-test-secret", Duration::hours(1))
            .expect("valid test key");

        Self {
            store: Arc::new(MemoryStore::new()),
            keys: Arc::new(keys),
        }
    }

    /// Registers a user directly in the store and returns a session token for
    /// them.
    pub async fn user(&self, email: &str) -> (User, String) {
        let user = self
            .store
            .create_user(NewUser {
                email: email.to_owned(),
                name: "Test user".to_owned(),
                password: "not-a-real-hash".to_owned(),
            })
            .await
            .expect("user created");
        let token = self.keys.generate_jwt_session(&user).expect("token signed");

        (user, token)
    }

    pub async fn send(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let api = routes::api(self.store.clone(), self.keys.clone());

        let mut request = warp::test::request().method(method).path(path);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.reply(&api).await;
        let body = if response.body().is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(response.body()).expect("JSON response")
        };

        Response {
            status: response.status(),
            body,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.send("GET", path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Response {
        self.send("POST", path, Some(token), Some(body)).await
    }

    pub async fn create_label(&self, path: &str, token: &str, name: &str) -> i64 {
        let response = self
            .post(path, token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);

        response.body["id"].as_i64().expect("label id")
    }

    pub async fn create_recipe(&self, token: &str, body: Value) -> Value {
        let response = self.post("/recipes", token, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        response.body
    }
}

pub fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("JSON array")
        .iter()
        .map(|item| item["name"].as_str().expect("name"))
        .collect()
}

pub fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("JSON array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
