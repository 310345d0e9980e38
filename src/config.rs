use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};

use crate::allocator::{Allocator, IdStrategy, RandomSource};

pub const DEFAULT_API_URL: &str = "http://localhost:4000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// JSON REST API at `--api-url`.
    Rest,
    /// Empty in-process store, gone when the process exits.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdPolicy {
    /// Propose random ids checked against the live collection.
    Client,
    /// Let the backend assign ids.
    Server,
}

/// Connection and allocation settings, from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct AdminConfig {
    /// Base url of the REST backend
    #[arg(long, env = "ADMIN_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Where records are stored
    #[arg(long, env = "ADMIN_BACKEND", value_enum, default_value_t = BackendKind::Rest, global = true)]
    pub backend: BackendKind,

    /// Who picks ids for new users and orders
    #[arg(long, env = "ADMIN_ID_POLICY", value_enum, default_value_t = IdPolicy::Client, global = true)]
    pub id_policy: IdPolicy,

    /// Random draws before falling back to max + 1
    #[arg(long, default_value_t = crate::allocator::DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "ADMIN_HTTP_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Pending requests buffered per collection
    #[arg(long, default_value_t = 32, global = true)]
    pub channel_capacity: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            backend: BackendKind::Rest,
            id_policy: IdPolicy::Client,
            max_attempts: crate::allocator::DEFAULT_MAX_ATTEMPTS,
            timeout_secs: 10,
            channel_capacity: 32,
        }
    }
}

impl AdminConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn allocator(&self) -> Allocator {
        Allocator::new(Arc::new(RandomSource), self.max_attempts)
    }

    pub fn id_strategy(&self) -> IdStrategy {
        match self.id_policy {
            IdPolicy::Client => IdStrategy::ClientProposed(self.allocator()),
            IdPolicy::Server => IdStrategy::ServerAssigned,
        }
    }
}
