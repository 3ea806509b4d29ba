use pikcards_bot::deck::session::{ChannelInfo, Session, SessionKey};
use pikcards_bot::deck::store::SessionStore;
use pikcards_bot::error::StoreError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serenity::model::id::{ChannelId, UserId};

const USER: u64 = 111;

fn session(channel: u64, seed: u64) -> Session {
    let mut rng = StdRng::seed_from_u64(seed);
    let cards = (1..=40).map(|i| format!("card_{i}")).collect();
    let info = ChannelInfo {
        id: ChannelId::new(channel),
        name: format!("table-{channel}"),
        guild_id: None,
    };
    let mut s = Session::new(UserId::new(USER), info, cards, &mut rng).expect("valid deck");
    s.deal(&mut rng).expect("deal");
    s
}

fn record(store: &SessionStore, channel: u64) -> std::path::PathBuf {
    store.path_for(&SessionKey::new(UserId::new(USER), ChannelId::new(channel)))
}

#[tokio::test]
async fn create_writes_through_and_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    assert!(store.is_empty().await);

    let original = session(1, 1);
    store.create(original.clone()).await.expect("create");
    let path = record(&store, 1);
    assert!(path.exists());
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("111_1.json"));

    let reloaded = SessionStore::load(dir.path()).await.expect("reload");
    let handle = reloaded
        .get(UserId::new(USER), ChannelId::new(1))
        .await
        .expect("session survives restart");
    let restored = handle.lock().await;
    assert_eq!(restored.deck, original.deck);
    assert_eq!(restored.hand, original.hand);
    assert_eq!(restored.channel, original.channel);
}

#[tokio::test]
async fn duplicate_create_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    store.create(session(1, 1)).await.expect("create");
    let err = store.create(session(1, 2)).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { user_id: USER, channel_id: 1 }));
    assert!(!err.is_persistence());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn saving_twice_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    let handle = store.create(session(3, 3)).await.expect("create");
    let path = record(&store, 3);

    let guard = handle.lock().await;
    store.save(&guard).await.expect("first save");
    let first = std::fs::read(&path).expect("read");
    store.save(&guard).await.expect("second save");
    let second = std::fs::read(&path).expect("read");
    assert_eq!(first, second);

    let json: serde_json::Value = serde_json::from_slice(&first).expect("json");
    assert!(json.get("userId").is_some());
    assert!(json.get("createdAt").is_some());
    assert_eq!(json["hand"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn corrupt_records_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let store = SessionStore::load(dir.path()).await.expect("load");
        store.create(session(4, 4)).await.expect("create");
    }
    std::fs::write(dir.path().join("111_5.json"), b"{ not json").expect("write");
    std::fs::write(dir.path().join("notes.txt"), b"ignored").expect("write");

    let store = SessionStore::load(dir.path()).await.expect("load");
    assert_eq!(store.len().await, 1);
    assert!(store.get(UserId::new(USER), ChannelId::new(4)).await.is_some());
}

#[tokio::test]
async fn load_creates_missing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("data").join("games");
    let store = SessionStore::load(&nested).await.expect("load");
    assert!(nested.is_dir());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn remove_deletes_file_then_memory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    let handle = store.create(session(6, 6)).await.expect("create");

    assert!(store.remove(UserId::new(USER), ChannelId::new(6)).await.expect("remove"));
    assert!(!record(&store, 6).exists());
    assert!(store.get(UserId::new(USER), ChannelId::new(6)).await.is_none());
    assert!(!store.remove(UserId::new(USER), ChannelId::new(6)).await.expect("second remove"));

    // A stale handle must not bring the record back.
    let stale = handle.lock().await;
    store.save(&stale).await.expect("save is a no-op");
    assert!(!record(&store, 6).exists());
}

#[tokio::test]
async fn failed_delete_keeps_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    store.create(session(7, 7)).await.expect("create");
    std::fs::remove_file(record(&store, 7)).expect("remove behind the store's back");

    let err = store
        .remove(UserId::new(USER), ChannelId::new(7))
        .await
        .unwrap_err();
    match err {
        StoreError::Io { path, source } => {
            assert_eq!(path, record(&store, 7));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an i/o error, got {other:?}"),
    }
    assert!(store.get(UserId::new(USER), ChannelId::new(7)).await.is_some());
}

#[tokio::test]
async fn failed_first_write_keeps_session_in_memory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    // A directory where the temp file goes makes the write fail.
    std::fs::create_dir(record(&store, 8).with_extension("json.tmp")).expect("block temp file");

    let err = store.create(session(8, 8)).await.unwrap_err();
    assert!(err.is_persistence());
    assert!(!record(&store, 8).exists());
    let handle = store
        .get(UserId::new(USER), ChannelId::new(8))
        .await
        .expect("degraded session is still reachable");
    assert_eq!(handle.lock().await.channel.id, ChannelId::new(8));
}

#[tokio::test]
async fn discard_drops_a_session_that_was_never_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    std::fs::create_dir(record(&store, 9).with_extension("json.tmp")).expect("block temp file");
    let handle = match store.create(session(9, 9)).await {
        Err(e) if e.is_persistence() => store
            .get(UserId::new(USER), ChannelId::new(9))
            .await
            .expect("session"),
        other => panic!("expected a persistence error, got {other:?}"),
    };

    store
        .discard(UserId::new(USER), ChannelId::new(9))
        .await
        .expect("discard");
    assert!(store.get(UserId::new(USER), ChannelId::new(9)).await.is_none());
    // Retired: saving the stale handle is skipped rather than hitting the blocked path.
    let stale = handle.lock().await;
    store.save(&stale).await.expect("retired session is not written");
    // Nothing left to discard.
    store
        .discard(UserId::new(USER), ChannelId::new(9))
        .await
        .expect("second discard");
}

#[tokio::test]
async fn discard_deletes_a_written_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    store.create(session(10, 10)).await.expect("create");

    store
        .discard(UserId::new(USER), ChannelId::new(10))
        .await
        .expect("discard");
    assert!(!record(&store, 10).exists());
    assert!(store.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn overlapping_bulk_removals_do_not_deadlock() {
    for round in 0..20 {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = std::sync::Arc::new(SessionStore::load(dir.path()).await.expect("load"));
        for channel in 1..=6 {
            store.create(session(channel, channel)).await.expect("create");
        }
        let ids: Vec<ChannelId> = (1..=6).map(ChannelId::new).collect();

        let first = tokio::spawn({
            let store = store.clone();
            let ids = ids.clone();
            async move { store.remove_multi(UserId::new(USER), &ids).await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            let mut ids = ids.clone();
            ids.reverse();
            async move { store.remove_multi(UserId::new(USER), &ids).await }
        });
        let (first, second) = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            (first.await.expect("task"), second.await.expect("task"))
        })
        .await
        .unwrap_or_else(|_| panic!("bulk removals deadlocked in round {round}"));

        // Every session is ended exactly once across both calls.
        let mut ended = first.succeeded.clone();
        ended.extend(second.succeeded.iter().copied());
        ended.sort();
        assert_eq!(ended, ids);
        assert_eq!(first.succeeded.len() + first.failed.len(), 6);
        assert_eq!(second.succeeded.len() + second.failed.len(), 6);
        assert!(store.is_empty().await);
    }
}

#[tokio::test]
async fn remove_multi_reports_partial_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    store.create(session(10, 10)).await.expect("create");
    store.create(session(20, 20)).await.expect("create");
    store.create(session(30, 30)).await.expect("create");
    std::fs::remove_file(record(&store, 20)).expect("break one record");

    let ids = [30, 20, 10, 99, 10].map(ChannelId::new);
    let report = store.remove_multi(UserId::new(USER), &ids).await;

    assert_eq!(report.succeeded, vec![ChannelId::new(10), ChannelId::new(30)]);
    let mut failed = report.failed.clone();
    failed.sort();
    assert_eq!(failed, vec![ChannelId::new(20), ChannelId::new(99)]);

    let left: Vec<ChannelId> = store
        .channels(UserId::new(USER))
        .await
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(left, vec![ChannelId::new(20)]);
}

#[tokio::test]
async fn channels_are_listed_per_user_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::load(dir.path()).await.expect("load");
    store.create(session(50, 1)).await.expect("create");
    store.create(session(40, 2)).await.expect("create");

    let names: Vec<String> = store
        .channels(UserId::new(USER))
        .await
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["table-40".to_string(), "table-50".to_string()]);
    assert!(store.channels(UserId::new(222)).await.is_empty());
    assert_eq!(store.get_all(UserId::new(USER)).await.len(), 2);
}
