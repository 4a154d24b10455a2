use std::fs;
use std::path::PathBuf;

use chat_store::{
    load_seed_file, store_root, Conversation, DurableStore, FileBackend, MemoryBackend, Message,
    StorageBackend, CHATS_KEY,
};
use tempfile::TempDir;

fn file_store() -> (TempDir, PathBuf, DurableStore) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let root = store_root(dir.path());
    let store = DurableStore::new(FileBackend::new(&root));
    (dir, root, store)
}

fn sample_conversations() -> Vec<Conversation> {
    vec![
        Conversation::with_messages(
            "Rust questions",
            vec![
                Message::user("What is a lifetime?"),
                Message::assistant("A lifetime names a region of code where a borrow is valid."),
                Message::system("Error: Could not connect to AI service."),
            ],
        ),
        Conversation::with_messages("Empty", Vec::new()),
        Conversation::with_messages(
            "Unicode \u{1f980}",
            vec![Message::user("line one\nline \"two\"")],
        ),
    ]
}

#[tokio::test]
async fn file_backend_round_trip_is_lossless() {
    let (_dir, _root, store) = file_store();
    let conversations = sample_conversations();

    assert!(store.save(&conversations).await);

    assert_eq!(store.load().await, Some(conversations));
}

#[tokio::test]
async fn missing_snapshot_loads_as_absent() {
    let (_dir, _root, store) = file_store();

    assert_eq!(store.load().await, None);
    assert!(store.try_load().await.expect("missing file is not an error").is_none());
}

#[tokio::test]
async fn corrupt_snapshot_loads_as_absent() {
    let (_dir, root, store) = file_store();
    fs::create_dir_all(&root).expect("store root should be created");
    fs::write(root.join("chats.json"), "{ this is not json").expect("corrupt file written");

    assert_eq!(store.load().await, None);
    assert!(store.try_load().await.is_err());
}

#[tokio::test]
async fn corrupt_record_content_keeps_title_with_empty_transcript() {
    let backend = MemoryBackend::new();
    backend.insert_raw(
        CHATS_KEY,
        r#"[{"title":"Broken","content":"[{\"role\":"},{"title":"Fine","content":"[{\"role\":\"user\",\"content\":\"ok\"}]"}]"#,
    );
    let store = DurableStore::new(backend);

    let loaded = store.load().await.expect("outer snapshot is valid");
    assert_eq!(loaded[0], Conversation::with_messages("Broken", Vec::new()));
    assert_eq!(loaded[1].messages, vec![Message::user("ok")]);
}

#[tokio::test]
async fn record_without_content_field_loads_empty() {
    let backend = MemoryBackend::new();
    backend.insert_raw(CHATS_KEY, r#"[{"title":"Bare"}]"#);
    let store = DurableStore::new(backend);

    let loaded = store.load().await.expect("snapshot should load");
    assert_eq!(loaded, vec![Conversation::new("Bare")]);
}

#[tokio::test]
async fn unavailable_backend_degrades_to_no_op() {
    let backend = MemoryBackend::new();
    backend.set_offline(true);
    let store = DurableStore::new(backend.clone());

    assert!(!store.save(&sample_conversations()).await);
    assert_eq!(store.load().await, None);
    assert_eq!(backend.write_count(), 0);

    backend.set_offline(false);
    assert!(store.save(&sample_conversations()).await);
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test]
async fn save_into_unwritable_root_reports_failure() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").expect("blocker written");
    let store = DurableStore::new(FileBackend::new(&blocker));

    assert!(!store.save(&sample_conversations()).await);
    let error = store
        .try_save(&sample_conversations())
        .await
        .expect_err("write under a file path must fail");
    assert!(error.to_string().contains("creating store directory"));
}

#[tokio::test]
async fn file_backend_overwrites_previous_snapshot() {
    let (_dir, root, _store) = file_store();
    let backend = FileBackend::new(&root);

    backend
        .set(CHATS_KEY, "first".to_string())
        .await
        .expect("first write");
    backend
        .set(CHATS_KEY, "second".to_string())
        .await
        .expect("second write");

    assert_eq!(
        backend.get(CHATS_KEY).await.expect("read back"),
        Some("second".to_string())
    );
    assert!(!root.join("chats.json.tmp").exists());
}

#[tokio::test]
async fn failed_replace_removes_temporary_file() {
    let (_dir, root, _store) = file_store();
    let backend = FileBackend::new(&root);
    // A non-empty directory at the target path cannot be renamed over.
    let target = root.join("chats.json");
    fs::create_dir_all(&target).expect("target directory created");
    fs::write(target.join("occupant"), "x").expect("occupant written");

    let error = backend
        .set(CHATS_KEY, "snapshot".to_string())
        .await
        .expect_err("rename over a directory must fail");

    assert!(error.to_string().contains("replacing stored value"));
    assert!(!root.join("chats.json.tmp").exists());
}

#[tokio::test]
async fn seed_file_loads_in_record_format() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("seed.json");
    fs::write(
        &path,
        r#"[{"title":"Welcome","content":"[{\"role\":\"assistant\",\"content\":\"Ask me anything.\"}]"}]"#,
    )
    .expect("seed written");

    let seed = load_seed_file(&path).await.expect("seed should load");
    assert_eq!(
        seed,
        vec![Conversation::with_messages(
            "Welcome",
            vec![Message::assistant("Ask me anything.")]
        )]
    );
}

#[tokio::test]
async fn missing_seed_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let error = load_seed_file(&dir.path().join("absent.json"))
        .await
        .expect_err("missing seed must fail");

    assert!(error.to_string().contains("reading seed file"));
}
