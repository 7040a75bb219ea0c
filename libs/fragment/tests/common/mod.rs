//! Common test utilities for Fragment integration tests
//!
//! `ScriptedTransport` answers requests from per-path queues and records
//! every call with the (paused) tokio clock, so retry counts, request bodies
//! and backoff timing can all be asserted.

#![allow(dead_code)]

use async_trait::async_trait;
use fragment::{
    CredentialEncoding, CredentialPreparer, FlowSettings, FragmentClient, TransportError,
};
use fragment::infrastructure::Transport;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::time::Instant;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub type Reply = Result<Value, TransportError>;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub at: Instant,
}

impl Call {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    repeated: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer the next call to `path` with `reply`
    pub fn push(&self, path: &str, reply: Reply) {
        self.queued
            .lock()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn push_json(&self, path: &str, value: Value) {
        self.push(path, Ok(value));
    }

    /// Answer every call to `path` with `reply` once its queue is empty
    pub fn repeat(&self, path: &str, reply: Reply) {
        self.repeated.lock().insert(path.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls_to(path).len()
    }

    fn reply(&self, call: Call) -> Reply {
        let path = call.path.clone();
        verbose_println!("{} {} {:?}", call.method, path, call.body);
        self.calls.lock().push(call);

        if let Some(reply) = self.queued.lock().get_mut(&path).and_then(VecDeque::pop_front) {
            return reply;
        }
        self.repeated
            .lock()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Network(format!("no scripted reply for {}", path))))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.reply(Call {
            method: "GET",
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
            at: Instant::now(),
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.reply(Call {
            method: "POST",
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
            at: Instant::now(),
        })
    }
}

pub mod fixtures {
    //! Credentials and canned API responses

    use super::*;

    pub fn seed(words: usize) -> String {
        vec!["abandon"; words].join(" ")
    }

    pub const COOKIES: &str = "stel_ssid=abc123; stel_token=tok";

    pub fn created(order_id: &str, cost: Value) -> Value {
        json!({"success": true, "order_id": order_id, "cost": cost})
    }

    pub fn failure(code: &str) -> Value {
        json!({"success": false, "error_code": code, "message": format!("{} from test", code)})
    }

    pub fn paid() -> Value {
        json!({"success": true, "status": "success", "tx_hash": "0xfeed"})
    }

    pub fn status(status: &str) -> Value {
        json!({"success": true, "status": status})
    }

    pub fn http(status: u16) -> Reply {
        Err(TransportError::Status {
            status,
            body: format!("{{\"status\":{}}}", status),
        })
    }

    pub fn lost() -> Reply {
        Err(TransportError::Timeout)
    }
}

/// Raw-encoded credentials with defaults, so request bodies are readable
pub fn raw_preparer() -> CredentialPreparer {
    CredentialPreparer::new(CredentialEncoding::Raw)
        .with_default_seed(Some(fixtures::seed(24)))
        .with_default_cookies(Some(fixtures::COOKIES.to_string()))
}

pub fn client(
    transport: &Arc<ScriptedTransport>,
    settings: FlowSettings,
) -> FragmentClient<Arc<ScriptedTransport>> {
    FragmentClient::with_transport(Arc::clone(transport), raw_preparer(), settings)
}
