// One-shot callback bridge for script-injection providers
//
// A JSONP provider answers with a script that calls a function we named in the
// request. Instead of a global function we keep a table of named one-shot
// senders; evaluating the script looks up the callee and delivers its argument.
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{Result, TransportError};

type Pending = HashMap<String, oneshot::Sender<Value>>;

/// Table of callbacks that are waiting for a script to invoke them
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    pending: Arc<Mutex<Pending>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh callback named `<prefix>_<millis>_<random>`.
    ///
    /// The registration lives until the guard is released or dropped,
    /// whichever comes first.
    pub fn register(&self, prefix: &str) -> (CallbackGuard, oneshot::Receiver<Value>) {
        let name = callback_name(prefix);
        let (tx, rx) = oneshot::channel();
        self.lock().insert(name.clone(), tx);

        let guard = CallbackGuard {
            name,
            registry: self.clone(),
            released: false,
        };
        (guard, rx)
    }

    /// Deliver a payload to a registered callback.
    ///
    /// Returns false when the callback already settled or was never registered;
    /// the payload is dropped in that case.
    pub fn invoke(&self, name: &str, payload: Value) -> bool {
        let sender = self.lock().remove(name);
        match sender {
            Some(tx) => tx.send(payload).is_ok(),
            None => {
                debug!("Discarding payload for settled callback {}", name);
                false
            }
        }
    }

    /// Evaluate a JSONP script body by routing its call to the registry
    pub fn dispatch(&self, script: &str) -> Result<bool> {
        let invocation = parse_invocation(script).ok_or_else(|| {
            TransportError::ScriptLoad("response is not a callback invocation".to_string())
        })?;
        let payload: Value = serde_json::from_str(invocation.args)?;
        Ok(self.invoke(invocation.callee, payload))
    }

    /// Number of callbacks still waiting
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        // A panic while holding the lock can't leave the map half-updated
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owns one registration; removing it happens exactly once
pub struct CallbackGuard {
    name: String,
    registry: CallbackRegistry,
    released: bool,
}

impl CallbackGuard {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drop the registration. Safe to call any number of times.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if self.registry.lock().remove(&self.name).is_some() {
            debug!("Released unsettled callback {}", self.name);
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A parsed `callee(args)` script body
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub callee: &'a str,
    pub args: &'a str,
}

/// Parse the `name({...});` shape JSONP endpoints answer with.
///
/// Tolerates the `/**/` prefix some servers add and a `window.` qualifier.
pub fn parse_invocation(script: &str) -> Option<Invocation<'_>> {
    let mut body = script.trim();
    body = body.strip_prefix("/**/").unwrap_or(body).trim_start();
    body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let body = body.strip_suffix(')')?;

    let open = body.find('(')?;
    let callee = body[..open].trim();
    let callee = callee.strip_prefix("window.").unwrap_or(callee);

    if callee.is_empty() || !callee.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return None;
    }

    Some(Invocation {
        callee,
        args: body[open + 1..].trim(),
    })
}

fn callback_name(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &suffix[..8])
}
