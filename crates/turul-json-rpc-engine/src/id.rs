//! Request identifier generation.
//!
//! Each engine owns its own generator. Identifiers must not repeat while a
//! call using an earlier value is still pending; the built-in generators are
//! monotonic, injected ones are the embedder's responsibility.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::config::IdConfig;
use crate::types::RequestId;

/// Source of correlation identifiers for outbound calls
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RequestId;
}

impl<F> IdGenerator for F
where
    F: Fn() -> RequestId + Send + Sync,
{
    fn next_id(&self) -> RequestId {
        (self)()
    }
}

/// Integer identifiers counting up from `start` (0 by default)
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicI64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: i64) -> Self {
        Self {
            counter: AtomicI64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RequestId {
        RequestId::Number(self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

/// String identifiers of the form `{prefix}{n}`, e.g. `req_0`, `req_1`
#[derive(Debug)]
pub struct PrefixedIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl PrefixedIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 0)
    }

    pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for PrefixedIdGenerator {
    fn next_id(&self) -> RequestId {
        let counter = self.counter.fetch_add(1, Ordering::SeqCst);
        RequestId::String(format!("{}{}", self.prefix, counter))
    }
}

/// Build the generator described by an [`IdConfig`].
pub fn generator_from_config(config: &IdConfig) -> Box<dyn IdGenerator> {
    match config {
        IdConfig::Sequential { start } => Box::new(SequentialIdGenerator::starting_at(*start)),
        IdConfig::Prefixed { prefix, start } => {
            Box::new(PrefixedIdGenerator::starting_at(prefix.clone(), *start))
        }
    }
}
