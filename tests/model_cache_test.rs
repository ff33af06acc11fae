use std::sync::Arc;
use std::time::Duration;

use tamlil::application::services::ModelCache;
use tamlil::infrastructure::recognition::MockRecognizerLoader;

#[tokio::test]
async fn given_cold_cache_when_ten_tasks_acquire_concurrently_then_one_load_serves_all() {
    let loader = Arc::new(MockRecognizerLoader::new().with_delay(Duration::from_millis(100)));
    let cache = Arc::new(ModelCache::new(loader.clone(), Duration::from_secs(60)));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        tasks.push(tokio::spawn(async move { cache.acquire().await }));
    }

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap().expect("acquire should succeed"));
    }

    assert_eq!(loader.load_count(), 1);
    for pair in handles.windows(2) {
        assert!(
            Arc::ptr_eq(&pair[0], &pair[1]),
            "all callers must share the single loaded handle"
        );
    }
}

#[tokio::test]
async fn given_fresh_handle_when_acquiring_again_within_ttl_then_no_reload_happens() {
    let loader = Arc::new(MockRecognizerLoader::new());
    let cache = ModelCache::new(loader.clone(), Duration::from_millis(500));

    let first = cache.acquire().await.expect("first acquire");
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = cache.acquire().await.expect("second acquire");

    assert_eq!(loader.load_count(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn given_expired_handle_when_acquiring_then_a_new_load_replaces_it() {
    let loader = Arc::new(MockRecognizerLoader::new());
    let cache = ModelCache::new(loader.clone(), Duration::from_millis(100));

    let first = cache.acquire().await.expect("first acquire");
    tokio::time::sleep(Duration::from_millis(150)).await;
    let second = cache.acquire().await.expect("second acquire");

    assert_eq!(loader.load_count(), 2);
    assert!(
        !Arc::ptr_eq(&first, &second),
        "expiry must produce a fresh handle for later acquires"
    );
    // The first handle stays usable even though the cache replaced it.
    drop(first);
}

#[tokio::test]
async fn given_failing_loader_when_tasks_acquire_concurrently_then_all_observe_the_failure() {
    let loader = Arc::new(
        MockRecognizerLoader::new()
            .with_delay(Duration::from_millis(100))
            .failing(),
    );
    let cache = Arc::new(ModelCache::new(loader.clone(), Duration::from_secs(60)));

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let cache = Arc::clone(&cache);
        tasks.push(tokio::spawn(async move { cache.acquire().await }));
    }

    for task in tasks {
        let result = task.await.unwrap();
        assert!(result.is_err(), "every waiter shares the flight's failure");
    }

    assert_eq!(loader.load_count(), 1);
}

#[tokio::test]
async fn given_failed_load_when_acquiring_again_then_the_cache_retries_immediately() {
    let loader = Arc::new(MockRecognizerLoader::new().failing());
    let cache = ModelCache::new(loader.clone(), Duration::from_secs(60));

    assert!(cache.acquire().await.is_err());
    assert!(cache.acquire().await.is_err());

    // No backoff and no poisoned state: each acquire after a failure starts
    // a fresh load attempt.
    assert_eq!(loader.load_count(), 2);
}
