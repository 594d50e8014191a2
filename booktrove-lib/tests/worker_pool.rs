use std::time::Duration;

use booktrove_lib::WorkerPool;

#[tokio::test]
async fn processes_every_item() {
    let pool = WorkerPool::start(3, (1..=10).collect(), |n: u32| async move { n * 2 });
    let mut results = pool.collect().await;
    results.sort();
    assert_eq!(results, (1..=10).map(|n| n * 2).collect::<Vec<_>>());
}

#[tokio::test]
async fn zero_workers_still_makes_progress() {
    let pool = WorkerPool::start(0, vec!["a", "b"], |s| async move { s.len() });
    assert_eq!(pool.collect().await.len(), 2);
}

#[tokio::test]
async fn timed_out_items_are_skipped() {
    let pool = WorkerPool::start_with_timeout(
        2,
        vec![1u64, 500, 2],
        Duration::from_millis(100),
        |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            ms
        },
    );
    let mut results = pool.collect().await;
    results.sort();
    assert_eq!(results, vec![1, 2]);
}
