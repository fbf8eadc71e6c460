//! Load, save and photo tests against in-memory and on-disk collaborators

use std::sync::Arc;

use famtree::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

struct Harness {
    auth: Arc<StaticAuth>,
    documents: Arc<MemoryDocumentStore>,
    blobs: Arc<MemoryBlobStore>,
    previews: Arc<MemoryPreviewHost>,
    console: FamilyConsole,
}

impl Harness {
    fn new() -> Self {
        let auth = Arc::new(StaticAuth::signed_in("tester"));
        let documents = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let previews = Arc::new(MemoryPreviewHost::new());
        let console = FamilyConsole::new(
            EditorConfig::default(),
            auth.clone(),
            documents.clone(),
            blobs.clone(),
            previews.clone(),
        )
        .unwrap();
        Self {
            auth,
            documents,
            blobs,
            previews,
            console,
        }
    }

    fn seed(&self, record: serde_json::Value) {
        let id = record["id"].as_str().unwrap().to_string();
        self.documents.insert("families", &id, record);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_open_normalizes() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada", "children": [{ "id": "2" }] }));

    let session = h.console.open("1").await.ready().unwrap();
    assert_eq!(
        session.root(),
        &Person::new("1", "Ada").with_child(Person::new("2", ""))
    );
}

#[tokio::test]
async fn test_missing_tree_is_pending() {
    let h = Harness::new();
    assert!(h.console.open("404").await.is_pending());
}

#[tokio::test]
async fn test_signed_out_is_pending() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    h.auth.sign_out();
    assert!(h.console.open("1").await.is_pending());
}

#[tokio::test]
async fn test_store_failure_is_pending() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    h.documents.set_offline(true);
    assert!(h.console.open("1").await.is_pending());
}

#[tokio::test]
async fn test_nested_records_without_ids_open() {
    let h = Harness::new();
    h.seed(json!({
        "id": "1",
        "name": "Ada",
        "spouseObj": { "name": "Bert" },
        "children": [{ "name": "Bo" }, { "id": "5", "name": "Cy" }]
    }));

    let mut session = h.console.open("1").await.ready().unwrap();
    assert_eq!(session.root().ids(), vec!["1", "1s", "6", "5"]);
    assert_eq!(session.editor().add_child("Di").as_deref(), Some("7"));
}

#[tokio::test]
async fn test_unusable_record_is_pending() {
    let h = Harness::new();
    h.documents.insert("families", "1", json!("just a string"));
    assert!(h.console.open("1").await.is_pending());
}

// ═══════════════════════════════════════════════════════════════════════
// Saving
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_save_writes_whole_tree() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));

    let mut session = h.console.open("1").await.ready().unwrap();
    session.editor().add_spouse("Bert");
    session.editor().add_child("Cleo");
    h.console.save(&session).await.unwrap();

    let stored = h.documents.get("families", "1").unwrap();
    assert_eq!(stored["spouseObj"]["id"], json!("1s"));
    assert_eq!(stored["children"][0]["id"], json!("2"));
    assert_eq!(normalize(&stored).unwrap(), session.root().clone());
}

#[tokio::test]
async fn test_last_writer_wins() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));

    let mut first = h.console.open("1").await.ready().unwrap();
    let mut second = h.console.open("1").await.ready().unwrap();
    first.editor().edit(Field::Phone, Some("111"));
    second.editor().edit(Field::Occupation, Some("Baker"));

    h.console.save(&first).await.unwrap();
    h.console.save(&second).await.unwrap();

    let stored = h.documents.get("families", "1").unwrap();
    assert_eq!(stored["phone"], serde_json::Value::Null);
    assert_eq!(stored["occupation"], json!("Baker"));
}

#[tokio::test]
async fn test_failed_save_keeps_local_state() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));

    let mut session = h.console.open("1").await.ready().unwrap();
    session.editor().add_child("Bo");
    h.documents.set_offline(true);

    let err = h.console.save(&session).await.unwrap_err();
    assert!(matches!(err, TreeError::Save { ref id, .. } if id == "1"));
    assert_eq!(session.root().children().len(), 1);

    h.documents.set_offline(false);
    assert_eq!(
        h.documents.get("families", "1").unwrap()["children"],
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn test_family_size() {
    let h = Harness::new();
    h.seed(json!({
        "id": "1",
        "spouseObj": { "id": "1s", "children": [{ "id": "8" }] },
        "children": [
            { "id": "2" },
            { "id": "3", "children": [{ "id": "4" }] }
        ]
    }));
    assert_eq!(h.console.family_size("1").await, Some(5));
    assert_eq!(h.console.family_size("nope").await, None);
}

#[tokio::test]
async fn test_import_then_open() {
    let h = Harness::new();
    let session = h
        .console
        .import(&json!({ "id": 42, "name": "Root", "children": [] }))
        .await
        .unwrap();
    assert_eq!(session.root().id, "42");
    let reopened = h.console.open("42").await.ready().unwrap();
    assert_eq!(reopened.root(), session.root());
}

// ═══════════════════════════════════════════════════════════════════════
// Photos
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_attach_image_uploads_by_id() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada", "children": [{ "id": "2", "name": "Bo" }] }));
    let mut session = h.console.open("1").await.ready().unwrap();
    let path = NodePath::root().child(0);

    let reference = session
        .editor_at(&path)
        .unwrap()
        .attach_image(vec![1, 2, 3], h.console.blobs())
        .await
        .unwrap();

    assert_eq!(reference, "images/2.jpg");
    assert_eq!(h.blobs.get("images/2.jpg"), Some(vec![1, 2, 3]));
    assert_eq!(session.node(&path).unwrap().image.as_deref(), Some("images/2.jpg"));
    assert_eq!(h.previews.live_count(), 1);

    let url = session.image_url(&path, h.console.blobs()).await.unwrap();
    assert!(url.unwrap().starts_with("blob:preview/"));
}

#[tokio::test]
async fn test_reattach_overwrites_and_supersedes_preview() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    let mut session = h.console.open("1").await.ready().unwrap();

    let mut editor = session.editor();
    editor.attach_image(vec![1], h.console.blobs()).await.unwrap();
    editor.attach_image(vec![2], h.console.blobs()).await.unwrap();

    assert_eq!(h.blobs.len(), 1);
    assert_eq!(h.blobs.get("images/1.jpg"), Some(vec![2]));
    assert_eq!(h.previews.live_count(), 1);
}

#[tokio::test]
async fn test_failed_upload_leaves_field_unchanged() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada", "image": "images/old.jpg" }));
    let mut session = h.console.open("1").await.ready().unwrap();
    h.blobs.set_offline(true);

    let err = session
        .editor()
        .attach_image(vec![9], h.console.blobs())
        .await
        .unwrap_err();

    assert!(matches!(err, TreeError::Upload { ref key, .. } if key == "images/1.jpg"));
    assert_eq!(session.root().image.as_deref(), Some("images/old.jpg"));
    assert_eq!(h.previews.live_count(), 0);
}

#[tokio::test]
async fn test_remove_image_releases_preview_and_saves_null() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    let mut session = h.console.open("1").await.ready().unwrap();

    session
        .editor()
        .attach_image(vec![7], h.console.blobs())
        .await
        .unwrap();
    assert_eq!(h.previews.live_count(), 1);

    session.editor().remove_image();
    assert_eq!(h.previews.live_count(), 0);

    h.console.save(&session).await.unwrap();
    assert_eq!(
        h.documents.get("families", "1").unwrap()["image"],
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn test_clearing_image_field_hides_preview() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    let mut session = h.console.open("1").await.ready().unwrap();

    session
        .editor()
        .attach_image(vec![7], h.console.blobs())
        .await
        .unwrap();
    session.editor().edit(Field::Image, None);

    assert_eq!(session.root().image, None);
    assert_eq!(h.previews.live_count(), 0);
    let url = session
        .image_url(&NodePath::root(), h.console.blobs())
        .await
        .unwrap();
    assert_eq!(url, None);
}

#[tokio::test]
async fn test_stored_image_resolves_without_preview() {
    let h = Harness::new();
    h.seed(json!({ "id": "1", "name": "Ada" }));
    let mut session = h.console.open("1").await.ready().unwrap();
    session
        .editor()
        .attach_image(vec![7], h.console.blobs())
        .await
        .unwrap();
    h.console.save(&session).await.unwrap();
    drop(session);
    assert_eq!(h.previews.live_count(), 0);

    let reopened = h.console.open("1").await.ready().unwrap();
    let url = reopened
        .image_url(&NodePath::root(), h.console.blobs())
        .await
        .unwrap();
    assert_eq!(url.as_deref(), Some("memory://images/1.jpg"));
}

#[tokio::test]
async fn test_deleting_subtree_releases_previews() {
    let h = Harness::new();
    h.seed(json!({
        "id": "1",
        "children": [{ "id": "2", "spouseObj": { "id": "2s" } }]
    }));
    let mut session = h.console.open("1").await.ready().unwrap();
    session
        .editor_at(&"/0/s".parse().unwrap())
        .unwrap()
        .attach_image(vec![1], h.console.blobs())
        .await
        .unwrap();
    assert_eq!(session.previews().live_count(), 1);

    session
        .delete(&NodePath::root().child(0), &|_: &str| true)
        .unwrap();
    assert_eq!(h.previews.live_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════════
// Filesystem collaborators
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_fs_round_trip() {
    let dir = tempdir().unwrap();
    let console = FamilyConsole::new(
        EditorConfig::default().with_collection("trees"),
        Arc::new(StaticAuth::signed_in("tester")),
        Arc::new(FsDocumentStore::new(dir.path().join("documents"))),
        Arc::new(FsBlobStore::new(dir.path().join("blobs"))),
        Arc::new(MemoryPreviewHost::new()),
    )
    .unwrap();

    let mut session = console
        .import(&json!({ "id": "1", "name": "Ada" }))
        .await
        .unwrap();
    session.editor().add_child("Bo");
    session
        .editor()
        .attach_image(b"jpeg".to_vec(), console.blobs())
        .await
        .unwrap();
    console.save(&session).await.unwrap();

    assert!(dir.path().join("documents/trees/1.json").exists());
    assert!(dir.path().join("blobs/images/1.jpg").exists());

    let reopened = console.open("1").await.ready().unwrap();
    assert_eq!(reopened.root(), session.root());
    assert_eq!(reopened.member_count(), 2);
}
