// Scripted in-process backend shared by the integration tests
#![allow(dead_code)]

use benchpilot_lib::{Backend, Gateway, HandlerTransport};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub fn queue_status(
    state: &str,
    current_job_id: Option<i64>,
    pending: u32,
    running: u32,
    completed: u32,
) -> Value {
    json!({
        "state": state,
        "currentJobId": current_job_id,
        "pendingCount": pending,
        "runningCount": running,
        "completedCount": completed,
    })
}

pub fn idle() -> Value {
    queue_status("idle", None, 0, 0, 0)
}

#[derive(Default)]
struct Script {
    /// Upcoming `get_queue_status` answers, the last one repeats
    statuses: VecDeque<Result<Value, String>>,
    ssh_status: Value,
    sync_status: Value,
    calls: HashMap<String, usize>,
}

/// Backend reached through the real gateway, with answers scripted per command
pub struct FakeBackend {
    pub transport: Arc<HandlerTransport>,
    pub backend: Arc<dyn Backend>,
    script: Arc<Mutex<Script>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let transport = Arc::new(HandlerTransport::new());
        let script = Arc::new(Mutex::new(Script {
            statuses: VecDeque::from([Ok(idle())]),
            ssh_status: json!({ "type": "InAgent" }),
            sync_status: json!({ "type": "UpToDate" }),
            calls: HashMap::new(),
        }));

        let fake = Self {
            backend: Arc::new(Gateway::new(transport.clone())),
            transport,
            script,
        };

        let script = fake.script.clone();
        fake.transport.register("get_queue_status", move |_| {
            let answer = {
                let mut script = script.lock();
                *script.calls.entry("get_queue_status".into()).or_default() += 1;
                if script.statuses.len() > 1 {
                    script.statuses.pop_front()
                } else {
                    script.statuses.front().cloned()
                }
            };
            async move { answer.unwrap_or_else(|| Ok(idle())) }
        });

        let script = fake.script.clone();
        fake.transport.register("check_ssh_key_status", move |_| {
            let answer = {
                let mut script = script.lock();
                *script.calls.entry("check_ssh_key_status".into()).or_default() += 1;
                script.ssh_status.clone()
            };
            async move { Ok(answer) }
        });

        let script = fake.script.clone();
        fake.transport.register("check_sync_status", move |_| {
            let answer = {
                let mut script = script.lock();
                *script.calls.entry("check_sync_status".into()).or_default() += 1;
                script.sync_status.clone()
            };
            async move { Ok(answer) }
        });

        fake
    }

    /// Replace the scripted queue statuses
    pub fn script_statuses(&self, statuses: Vec<Result<Value, String>>) {
        self.script.lock().statuses = statuses.into();
    }

    pub fn set_ssh_status(&self, status: Value) {
        self.script.lock().ssh_status = status;
    }

    pub fn set_sync_status(&self, status: Value) {
        self.script.lock().sync_status = status;
    }

    pub fn calls(&self, command: &str) -> usize {
        self.script.lock().calls.get(command).copied().unwrap_or(0)
    }

    /// Register `command` to answer `result`, counting invocations
    pub fn answer(&self, command: &str, result: Result<Value, String>) {
        let script = self.script.clone();
        let name = command.to_string();
        self.transport.register(command, move |_| {
            *script.lock().calls.entry(name.clone()).or_default() += 1;
            let result = result.clone();
            async move { result }
        });
    }

    /// Like [`FakeBackend::answer`], also running `effect` on the script state
    pub fn answer_with<F>(&self, command: &str, effect: F)
    where
        F: Fn(&Value, &FakeHandle) -> Result<Value, String> + Send + Sync + 'static,
    {
        let handle = self.handle();
        let name = command.to_string();
        self.transport.register(command, move |args| {
            *handle.script.lock().calls.entry(name.clone()).or_default() += 1;
            let result = effect(&args, &handle);
            async move { result }
        });
    }

    pub fn handle(&self) -> FakeHandle {
        FakeHandle {
            script: self.script.clone(),
        }
    }
}

/// Cloneable access to the script from inside handlers
#[derive(Clone)]
pub struct FakeHandle {
    script: Arc<Mutex<Script>>,
}

impl FakeHandle {
    pub fn set_ssh_status(&self, status: Value) {
        self.script.lock().ssh_status = status;
    }

    pub fn set_sync_status(&self, status: Value) {
        self.script.lock().sync_status = status;
    }

    pub fn script_statuses(&self, statuses: Vec<Result<Value, String>>) {
        self.script.lock().statuses = statuses.into();
    }
}
