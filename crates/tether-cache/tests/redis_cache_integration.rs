use std::time::Duration;

use redis::AsyncCommands;
use tether_cache::{RedisUrlCache, UrlCache};
use tether_core::ShortCode;
use tether_test_infra::redis::RedisServer;

/// Test fixture that manages a Redis container using test-infra.
struct RedisTestContainer {
    _redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("Failed to start Redis");
        let redis_url = redis.redis_url().await.expect("Failed to get Redis URL");

        // Give the server a moment after the readiness log line.
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self {
            _redis: redis,
            redis_url,
        }
    }

    async fn create_connection(&self) -> redis::aio::MultiplexedConnection {
        let client =
            redis::Client::open(self.redis_url.as_str()).expect("Failed to create Redis client");
        client
            .get_multiplexed_async_connection()
            .await
            .expect("Failed to get Redis connection")
    }
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_get_and_set() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::connect(&fixture.redis_url, RedisUrlCache::DEFAULT_KEY_PREFIX)
        .await
        .unwrap();
    let code = ShortCode::new("test123").unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());

    cache
        .set_url(&code, "https://example.com", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        cache.get_url(&code).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_sets_expiry_on_keys() {
    let fixture = RedisTestContainer::start().await;
    let mut conn = fixture.create_connection().await;
    let cache = RedisUrlCache::with_prefix(conn.clone(), "it:url:");
    let code = ShortCode::new("ttl123").unwrap();

    cache
        .set_url(&code, "https://example.com", Duration::from_secs(24 * 60 * 60))
        .await
        .unwrap();

    let ttl: i64 = conn.ttl("it:url:ttl123").await.unwrap();
    assert!(ttl > 0 && ttl <= 24 * 60 * 60);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn redis_cache_entry_expires() {
    let fixture = RedisTestContainer::start().await;
    let cache = RedisUrlCache::new(fixture.create_connection().await);
    let code = ShortCode::new("expiring").unwrap();

    cache
        .set_url(&code, "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert!(cache.get_url(&code).await.unwrap().is_none());
}
