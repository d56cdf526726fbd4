//! End-to-end pipeline tests: both consumer loops running against mock
//! transports, wired the way a composition root would wire them.

use std::sync::Arc;
use std::time::Duration;

use msgsync_core::SyncStatus;
use msgsync_engine::{
    IncrementalSyncManager, InMemoryCheckpointStore, LocalEventBus, LocalEventManager,
    MockCatchUpSource, MockLiveSource, RecordingProcessor, SyncConfig, SyncFailure,
};
use msgsync_types::{ClientId, Event, EventId, EventPage};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn event(id: &str) -> Event {
    Event::new(EventId::new(id), serde_json::Value::Null)
}

fn page(ids: &[&str], has_more: bool) -> EventPage {
    EventPage::new(ids.iter().map(|id| event(id)).collect(), has_more)
}

/// Poll until `condition` holds, failing the test after two seconds.
async fn wait_for(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

#[tokio::test]
async fn remote_and_local_loops_share_one_processor() {
    init_logging();

    let catch_up = MockCatchUpSource::new();
    let live = MockLiveSource::new();
    let checkpoint = InMemoryCheckpointStore::new();
    let processor = Arc::new(RecordingProcessor::new());
    let bus = LocalEventBus::new(16);

    catch_up.queue_page(page(&["e1", "e2"], true));
    catch_up.queue_page(page(&["e3"], false));
    live.push_opened();
    live.push_event(event("e4"));

    let config = SyncConfig::new(ClientId::new()).with_page_size(10);
    let sync = IncrementalSyncManager::new(
        &config,
        catch_up.clone(),
        live.clone(),
        Arc::new(checkpoint.clone()),
        Arc::clone(&processor),
    );
    let local = LocalEventManager::new(&bus, Arc::clone(&processor));

    let mut status = sync.status();
    let sync_cancel = sync.cancellation_handle();
    let local_cancel = local.cancellation_handle();
    let sync_task = tokio::spawn(sync.run());
    let local_task = tokio::spawn(local.run());

    bus.emit(event("l1"));

    let reached = status.wait_until_live().await.unwrap();
    assert_eq!(
        reached,
        SyncStatus::Live {
            last_event_id: Some(EventId::new("e3"))
        }
    );

    let p = Arc::clone(&processor);
    wait_for(move || p.processed_ids().len() == 5).await;

    // Remote delivery keeps source order; the local event interleaves
    // wherever it lands.
    let remote: Vec<EventId> = processor
        .processed_ids()
        .into_iter()
        .filter(|id| id.as_str().starts_with('e'))
        .collect();
    assert_eq!(
        remote,
        vec![
            EventId::new("e1"),
            EventId::new("e2"),
            EventId::new("e3"),
            EventId::new("e4")
        ]
    );
    assert!(processor.processed_ids().contains(&EventId::new("l1")));

    // Catch-up progress is durable; live and local events left no trace.
    assert_eq!(checkpoint.current(), Some(EventId::new("e3")));
    assert_eq!(checkpoint.write_count(), 3);

    sync_cancel.cancel();
    local_cancel.cancel();
    sync_task.await.unwrap().unwrap();
    local_task.await.unwrap();
}

#[tokio::test]
async fn dropped_connection_resumes_from_checkpoint() {
    init_logging();

    let catch_up = MockCatchUpSource::new();
    let live = MockLiveSource::new();
    let checkpoint = InMemoryCheckpointStore::new();
    let processor = Arc::new(RecordingProcessor::new());
    let config = SyncConfig::new(ClientId::new()).with_page_size(10);

    // First attempt: two events land, then the push channel drops.
    catch_up.queue_page(page(&["e1", "e2"], false));
    live.push_opened();
    live.push_closed(Some("connection reset by peer"));

    let sync = IncrementalSyncManager::new(
        &config,
        catch_up.clone(),
        live.clone(),
        Arc::new(checkpoint.clone()),
        Arc::clone(&processor),
    );
    let mut status = sync.status();
    let result = sync.run().await;
    assert!(matches!(result, Err(SyncFailure::Transport(_))));
    assert!(status.wait_until_live().await.unwrap().is_failed());

    // Second attempt: a fresh manager picks up behind the checkpoint and
    // only fetches what the first attempt had not confirmed.
    catch_up.queue_page(page(&["e3"], false));
    live.push_opened();

    let sync = IncrementalSyncManager::new(
        &config,
        catch_up.clone(),
        live.clone(),
        Arc::new(checkpoint.clone()),
        Arc::clone(&processor),
    );
    let mut status = sync.status();
    let cancel = sync.cancellation_handle();
    let task = tokio::spawn(sync.run());

    assert!(status.wait_until_live().await.unwrap().is_live());
    assert_eq!(
        catch_up.requested_cursors(),
        vec![None, Some(EventId::new("e2"))]
    );
    assert_eq!(
        processor.processed_ids(),
        vec![EventId::new("e1"), EventId::new("e2"), EventId::new("e3")]
    );

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn live_replays_of_catch_up_events_reach_the_processor_once() {
    init_logging();

    let catch_up = MockCatchUpSource::new();
    let live = MockLiveSource::new();
    let checkpoint = InMemoryCheckpointStore::new();
    let processor = Arc::new(RecordingProcessor::new());
    let config = SyncConfig::new(ClientId::new()).with_page_size(10);

    catch_up.queue_page(page(&["e1", "e2"], false));
    live.push_opened();
    // The backend replays the catch-up tail on the push channel before
    // delivering anything new.
    live.push_event(event("e1"));
    live.push_event(event("e2"));
    live.push_event(event("e3"));

    let sync = IncrementalSyncManager::new(
        &config,
        catch_up.clone(),
        live.clone(),
        Arc::new(checkpoint.clone()),
        Arc::clone(&processor),
    );
    let mut status = sync.status();
    let cancel = sync.cancellation_handle();
    let task = tokio::spawn(sync.run());

    assert!(status.wait_until_live().await.unwrap().is_live());
    let p = Arc::clone(&processor);
    wait_for(move || p.processed_ids().contains(&EventId::new("e3"))).await;

    assert_eq!(
        processor.processed_ids(),
        vec![EventId::new("e1"), EventId::new("e2"), EventId::new("e3")]
    );

    cancel.cancel();
    task.await.unwrap().unwrap();
}
