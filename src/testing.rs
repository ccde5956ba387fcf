// 测试用的时钟与上游替身

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::UpstreamError;
use crate::gate::Clock;
use crate::upstream::{UpstreamProvider, UpstreamQuery};

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub enum StubBehavior {
    Respond(Result<Value, UpstreamError>),
    Hang,
}

/// 记录调用次数的上游替身
pub struct StubProvider {
    behavior: StubBehavior,
    calls: AtomicUsize,
    last_query: Mutex<Option<UpstreamQuery>>,
}

impl StubProvider {
    pub fn returning(payload: Value) -> Self {
        Self::with(StubBehavior::Respond(Ok(payload)))
    }

    pub fn failing(err: UpstreamError) -> Self {
        Self::with(StubBehavior::Respond(Err(err)))
    }

    pub fn hanging() -> Self {
        Self::with(StubBehavior::Hang)
    }

    fn with(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<UpstreamQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamProvider for StubProvider {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());
        match &self.behavior {
            StubBehavior::Respond(result) => result.clone(),
            StubBehavior::Hang => std::future::pending().await,
        }
    }
}
