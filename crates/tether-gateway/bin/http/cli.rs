use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;
use tether_redirector::ClickPolicy;

pub const LISTEN_ADDR_ENV: &str = "TETHER_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "TETHER_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "TETHER_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "TETHER_MYSQL_DSN";
pub const MYSQL_ENSURE_SCHEMA_ENV: &str = "TETHER_MYSQL_ENSURE_SCHEMA";
pub const CACHE_BACKEND_ENV: &str = "TETHER_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "TETHER_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "TETHER_REDIS_KEY_PREFIX";
pub const MOKA_CAPACITY_ENV: &str = "TETHER_MOKA_CAPACITY";
pub const CACHE_TTL_ENV: &str = "TETHER_CACHE_TTL_SECS";
pub const LOCAL_CACHE_TTL_ENV: &str = "TETHER_LOCAL_CACHE_TTL_SECS";
pub const MAX_GENERATE_ATTEMPTS_ENV: &str = "TETHER_MAX_GENERATE_ATTEMPTS";
pub const CLICK_POLICY_ENV: &str = "TETHER_CLICK_POLICY";
pub const CLICK_QUEUE_CAPACITY_ENV: &str = "TETHER_CLICK_QUEUE_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "TETHER_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "tether:url:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    None,
    Moka,
    Redis,
    /// Moka in front of Redis.
    Layered,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::None => write!(f, "none"),
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
            CacheBackendArg::Layered => write!(f, "layered"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClickPolicyArg {
    #[value(name = "store-reads-only")]
    StoreReadsOnly,
    #[value(name = "every-resolution")]
    EveryResolution,
}

impl From<ClickPolicyArg> for ClickPolicy {
    fn from(value: ClickPolicyArg) -> Self {
        match value {
            ClickPolicyArg::StoreReadsOnly => ClickPolicy::StoreReadsOnly,
            ClickPolicyArg::EveryResolution => ClickPolicy::EveryResolution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "tether-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public URL short codes are appended to. Targets on this host are rejected.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Create the `short_links` table on startup if it is missing.
    #[arg(long, env = MYSQL_ENSURE_SCHEMA_ENV)]
    pub mysql_ensure_schema: bool,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(
        long,
        env = REDIS_URL_ENV,
        required_if_eq_any([("cache", "redis"), ("cache", "layered")])
    )]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = DEFAULT_REDIS_KEY_PREFIX)]
    pub redis_key_prefix: String,

    #[arg(long, env = MOKA_CAPACITY_ENV, default_value_t = 10_000)]
    pub moka_capacity: u64,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = 24 * 60 * 60)]
    pub cache_ttl_secs: u64,

    /// TTL of the in-process layer when `--cache layered` is used.
    #[arg(long, env = LOCAL_CACHE_TTL_ENV, default_value_t = 300)]
    pub local_cache_ttl_secs: u64,

    #[arg(long, env = MAX_GENERATE_ATTEMPTS_ENV, default_value_t = 3)]
    pub max_generate_attempts: u32,

    #[arg(
        long,
        env = CLICK_POLICY_ENV,
        value_enum,
        default_value_t = ClickPolicyArg::StoreReadsOnly
    )]
    pub click_policy: ClickPolicyArg,

    #[arg(long, env = CLICK_QUEUE_CAPACITY_ENV, default_value_t = 1024)]
    pub click_queue_capacity: usize,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// The local layer never outlives the shared one.
    pub fn local_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.local_cache_ttl_secs.min(self.cache_ttl_secs))
    }
}
