// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the Kubernetes API, plugged in below `kube::Client`.

use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("POST".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            Ok(match response {
                Some((status, body)) => json_response(status, body),
                None => json_response(404, not_found_json("object", &path)),
            })
        })
    }
}

/// In-memory API server: objects are stored per path, `resourceVersion` is
/// enforced on PUT, and statuses, failures and slow deletions can be scripted.
#[derive(Clone, Default)]
pub struct FakeApiServer {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    objects: HashMap<String, Value>,
    next_rv: u64,
    status_scripts: HashMap<String, VecDeque<Value>>,
    failures: HashMap<(String, String), (u16, String)>,
    unserved: Vec<String>,
    delete_linger: HashMap<String, usize>,
    deleting: HashMap<String, usize>,
    requests: Vec<(String, String)>,
}

impl FakeApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    /// Seed a live object at its object path
    pub fn with_object(self, path: &str, mut body: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_rv += 1;
            body["metadata"]["resourceVersion"] = json!(state.next_rv.to_string());
            state.objects.insert(path.to_string(), body);
        }
        self
    }

    /// Each GET of `path` applies the next status; the last one sticks. `null` removes the status.
    pub fn with_status_sequence(self, path: &str, statuses: Vec<Value>) -> Self {
        self.state
            .lock()
            .unwrap()
            .status_scripts
            .insert(path.to_string(), statuses.into());
        self
    }

    /// Answer `method path` with an API error
    pub fn fail(self, method: &str, path: &str, code: u16, reason: &str) -> Self {
        self.state.lock().unwrap().failures.insert(
            (method.to_string(), path.to_string()),
            (code, status_json(code, reason, "injected failure")),
        );
        self
    }

    /// Paths under `prefix` answer like an API server that does not serve the group/version
    pub fn unserved(self, prefix: &str) -> Self {
        self.state.lock().unwrap().unserved.push(prefix.to_string());
        self
    }

    /// After DELETE, `path` stays visible for `polls` more GETs
    pub fn delete_lingers(self, path: &str, polls: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .delete_linger
            .insert(path.to_string(), polls);
        self
    }

    pub fn object(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().objects.get(path).cloned()
    }

    /// Every request seen, as (method, path)
    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    fn handle(&self, method: &str, path: &str, body: &[u8]) -> (u16, String) {
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.to_string(), path.to_string()));

        if let Some(resp) = state.failures.get(&(method.to_string(), path.to_string())) {
            return resp.clone();
        }
        if state.unserved.iter().any(|prefix| path.starts_with(prefix)) {
            return (404, "404 page not found".to_string());
        }

        match method {
            "POST" => {
                let Ok(mut object) = serde_json::from_slice::<Value>(body) else {
                    return (400, status_json(400, "BadRequest", "invalid body"));
                };
                let name = object["metadata"]["name"].as_str().unwrap_or_default().to_string();
                let object_path = format!("{}/{}", path, name);
                if state.objects.contains_key(&object_path) {
                    return (409, status_json(409, "AlreadyExists", "already exists"));
                }
                state.next_rv += 1;
                object["metadata"]["resourceVersion"] = json!(state.next_rv.to_string());
                object["metadata"]["uid"] = json!(format!("uid-{}", state.next_rv));
                state.objects.insert(object_path, object.clone());
                (201, object.to_string())
            }
            "GET" => {
                if let Some(remaining) = state.deleting.get_mut(path) {
                    if *remaining == 0 {
                        state.deleting.remove(path);
                        state.objects.remove(path);
                    } else {
                        *remaining -= 1;
                    }
                }

                let next_status = match state.status_scripts.get_mut(path) {
                    Some(script) if script.len() > 1 => script.pop_front(),
                    Some(script) => script.front().cloned(),
                    None => None,
                };

                match state.objects.get_mut(path) {
                    Some(object) => {
                        match next_status {
                            Some(Value::Null) => {
                                if let Some(map) = object.as_object_mut() {
                                    map.remove("status");
                                }
                            }
                            Some(status) => object["status"] = status,
                            None => {}
                        }
                        (200, object.to_string())
                    }
                    None => (404, not_found_json("object", path)),
                }
            }
            "PUT" => {
                let Ok(mut object) = serde_json::from_slice::<Value>(body) else {
                    return (400, status_json(400, "BadRequest", "invalid body"));
                };
                let Some(stored) = state.objects.get(path) else {
                    return (404, not_found_json("object", path));
                };
                let submitted = object["metadata"]["resourceVersion"].as_str();
                let current = stored["metadata"]["resourceVersion"].as_str();
                if submitted.is_none() || submitted != current {
                    return (
                        409,
                        status_json(409, "Conflict", "the object has been modified; please apply your changes to the latest version and try again"),
                    );
                }
                let status = stored.get("status").cloned();
                state.next_rv += 1;
                object["metadata"]["resourceVersion"] = json!(state.next_rv.to_string());
                if let Some(status) = status {
                    object["status"] = status;
                }
                state.objects.insert(path.to_string(), object.clone());
                (200, object.to_string())
            }
            "DELETE" => {
                if !state.objects.contains_key(path) {
                    return (404, not_found_json("object", path));
                }
                match state.delete_linger.get(path).copied() {
                    Some(polls) if polls > 0 => {
                        state.deleting.insert(path.to_string(), polls);
                    }
                    _ => {
                        state.objects.remove(path);
                    }
                }
                (
                    200,
                    json!({"kind": "Status", "apiVersion": "v1", "metadata": {}, "status": "Success", "code": 200})
                        .to_string(),
                )
            }
            _ => (405, status_json(405, "MethodNotAllowed", "unsupported")),
        }
    }
}

impl Service<Request<Body>> for FakeApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move {
            let method = req.method().to_string();
            let path = req.uri().path().to_string();
            let body = req.into_body().collect().await?.to_bytes();
            let (status, body) = server.handle(&method, &path, &body);
            Ok(json_response(status, body))
        })
    }
}

/// An API server that accepts every request and never answers
#[derive(Clone, Copy)]
pub struct StalledService;

impl StalledService {
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Service<Request<Body>> for StalledService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<Body>) -> Self::Future {
        Box::pin(futures::future::pending())
    }
}

fn json_response(status: u16, body: String) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.into_bytes()))
        .unwrap()
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a failure Status response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Minimal discovery documents: the core group serving Services, no other groups
pub fn discovery_service() -> MockService {
    MockService::new()
        .on_get(
            "/api",
            200,
            &json!({
                "kind": "APIVersions",
                "versions": ["v1"],
                "serverAddressByClientCIDRs": []
            })
            .to_string(),
        )
        .on_get(
            "/apis",
            200,
            &json!({"kind": "APIGroupList", "apiVersion": "v1", "groups": []}).to_string(),
        )
        .on_get(
            "/api/v1",
            200,
            &json!({
                "kind": "APIResourceList",
                "groupVersion": "v1",
                "resources": [{
                    "name": "services",
                    "singularName": "service",
                    "namespaced": true,
                    "kind": "Service",
                    "verbs": ["create", "delete", "get", "list", "update"]
                }, {
                    "name": "namespaces",
                    "singularName": "namespace",
                    "namespaced": false,
                    "kind": "Namespace",
                    "verbs": ["create", "delete", "get", "list", "update"]
                }]
            })
            .to_string(),
        )
}
