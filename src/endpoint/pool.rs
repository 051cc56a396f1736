//! Endpoint pool and repository selection.

use super::SparqlEndpoint;
use crate::config::SelectionStrategy;
use crate::error::{Error, Result};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Non-empty, read-only set of equivalent read-replica endpoints
///
/// Selection never mutates shared state apart from the round-robin cursor,
/// which is a single atomic. Random selection uses the calling thread's own
/// RNG.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<SparqlEndpoint>,
    strategy: SelectionStrategy,
    cursor: AtomicUsize,
}

impl EndpointPool {
    /// Build a pool, rejecting an empty endpoint list
    pub fn new(endpoints: Vec<SparqlEndpoint>, strategy: SelectionStrategy) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::config(
                "endpoint pool needs at least one endpoint",
                "endpoints",
            ));
        }
        Ok(Self {
            endpoints,
            strategy,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Pick the endpoint for one operation
    pub fn choose(&self) -> &SparqlEndpoint {
        let index = self.choose_index();
        let endpoint = &self.endpoints[index];
        tracing::debug!(endpoint = %endpoint.label(), index, "Chose endpoint");
        endpoint
    }

    fn choose_index(&self) -> usize {
        let len = self.endpoints.len();
        if len == 1 {
            return 0;
        }
        match self.strategy {
            SelectionStrategy::Random => rand::thread_rng().gen_range(0..len),
            SelectionStrategy::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed) % len,
        }
    }

    /// Number of endpoints (always at least one)
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; present for API completeness
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &SparqlEndpoint> {
        self.endpoints.iter()
    }

    /// Selection strategy in use
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Shut every endpoint down, each exactly once
    pub(crate) fn close(self) {
        for endpoint in self.endpoints {
            tracing::debug!(endpoint = %endpoint.label(), "Closing endpoint");
            drop(endpoint);
        }
    }
}
