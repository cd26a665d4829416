//! Transport doubles shared by the gateway test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use access::{AccessError, Transport, Verb, WireRequest, WireResponse};

/// Scripted transport: records every request, replays queued responses.
pub(crate) struct MockTransport {
    pub calls: AtomicUsize,
    requests: Mutex<Vec<WireRequest>>,
    responses: Mutex<VecDeque<WireResponse>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        })
    }

    pub fn push_response(&self, status: u16, body: &[u8]) {
        self.responses.lock().unwrap().push_back(WireResponse {
            status,
            headers: Vec::new(),
            body: body.to_vec(),
        });
    }

    pub fn recorded(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn invoke(&self, request: WireRequest) -> Result<WireResponse, AccessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or(WireResponse {
            status: 200,
            headers: Vec::new(),
            body: b"{}".to_vec(),
        }))
    }
}

/// Stateful transport double: stores created objects by path and serves
/// them back, applying merge-patch the way the remote side would.
pub(crate) struct EchoStore {
    objects: Mutex<HashMap<String, Value>>,
}

impl EchoStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl Transport for EchoStore {
    async fn invoke(&self, request: WireRequest) -> Result<WireResponse, AccessError> {
        let mut objects = self.objects.lock().unwrap();
        let response = match request.verb {
            Verb::Post => {
                let body = request.body.unwrap_or(Value::Null);
                let name = body
                    .get("name")
                    .and_then(Value::as_str)
                    .expect("created objects carry a name")
                    .to_string();
                objects.insert(format!("{}/{}", request.path, name), body.clone());
                ok(&body)
            }
            Verb::Get => match objects.get(&request.path) {
                Some(value) => ok(value),
                None => missing(),
            },
            Verb::Put => {
                let body = request.body.unwrap_or(Value::Null);
                objects.insert(request.path.clone(), body.clone());
                ok(&body)
            }
            Verb::Patch => match objects.get_mut(&request.path) {
                Some(target) => {
                    merge_patch(target, &request.body.unwrap_or(Value::Null));
                    ok(target)
                }
                None => missing(),
            },
            Verb::Delete => match objects.remove(&request.path) {
                Some(_) => WireResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: Vec::new(),
                },
                None => missing(),
            },
        };
        Ok(response)
    }
}

fn ok(value: &Value) -> WireResponse {
    WireResponse {
        status: 200,
        headers: Vec::new(),
        body: serde_json::to_vec(value).unwrap(),
    }
}

fn missing() -> WireResponse {
    let error = json!({"type": "error", "status": 404, "message": "not found"});
    WireResponse {
        status: 200,
        headers: Vec::new(),
        body: serde_json::to_vec(&error).unwrap(),
    }
}

/// JSON merge-patch as the remote side applies it: supplied fields change,
/// nested objects recurse, explicit null removes.
fn merge_patch(target: &mut Value, patch: &Value) {
    let Some(patch_fields) = patch.as_object() else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let fields = target.as_object_mut().expect("target coerced to an object");
    for (key, value) in patch_fields {
        if value.is_null() {
            fields.remove(key);
        } else if value.is_object() {
            let entry = fields.entry(key.clone()).or_insert(Value::Object(Map::new()));
            merge_patch(entry, value);
        } else {
            fields.insert(key.clone(), value.clone());
        }
    }
}
