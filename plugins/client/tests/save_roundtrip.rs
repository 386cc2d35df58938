use scribe_client::{
    EditorWidget, HttpTransport, MemoryPage, MemoryTextArea, MemoryWidget, PageHandles,
    SaveController, SaveOutcome,
};
use scribe_core::{ClientConfig, SaveStatus, ScribeError, ServerConfig};
use scribe_server::{store::file_hash, SaveServer, ServerHandle};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn start_server(dir: &TempDir) -> ServerHandle {
    let config = ServerConfig {
        root: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    SaveServer::new(config).spawn(listener).unwrap()
}

async fn input_value(page: &MemoryPage, name: &str) -> String {
    page.input(name).await.map(|i| i.value).unwrap_or_default()
}

fn controller_for(
    page: Arc<MemoryPage>,
    widget: Arc<MemoryWidget>,
) -> SaveController {
    let handles = PageHandles {
        widget: Some(widget as Arc<dyn EditorWidget>),
        text_area: Arc::new(MemoryTextArea::new("")),
        dom: page.clone(),
        navigator: page,
    };
    SaveController::new(
        ClientConfig::default(),
        handles,
        Arc::new(HttpTransport::new().unwrap()),
    )
}

#[tokio::test]
async fn test_save_round_trip_against_reference_server() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir).await;

    let url = format!(
        "http://{}/edit/welcome/controllers/default.py",
        server.addr
    );
    let page = Arc::new(
        MemoryPage::new(url)
            .with_input("file_hash", "")
            .with_input("saved_on", "")
            .with_element("exposed", ""),
    );
    let widget = Arc::new(MemoryWidget::new(
        "def index():\n    return dict()\n\ndef about():\n    return dict()\n",
    ));
    let controller = controller_for(page.clone(), widget.clone());

    let hash = match controller.save().await {
        SaveOutcome::Saved { file_hash: hash, .. } => hash,
        other => panic!("expected a successful save, got {:?}", other),
    };

    let on_disk =
        std::fs::read_to_string(dir.path().join("welcome/controllers/default.py")).unwrap();
    assert_eq!(hash, file_hash(&on_disk));
    assert_eq!(input_value(&page, "file_hash").await, hash);
    assert_eq!(
        page.element_html("exposed").await.unwrap(),
        "exposes  <a href=\"/welcome/default/index\">index</a>, <a href=\"/welcome/default/about\">about</a>"
    );
    assert_eq!(controller.status().await, SaveStatus::Saved);

    // The updated hash lets a second save through
    widget.set_text("def index():\n    return 'hi'\n");
    assert!(controller.save().await.is_saved());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_changed_on_disk_redirects_to_resolve_page() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("welcome/models/db.py");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, "db = 1\n").unwrap();
    let server = start_server(&dir).await;

    let url = format!("http://{}/edit/welcome/models/db.py", server.addr);
    let page = Arc::new(
        MemoryPage::new(url)
            .with_input("file_hash", "not-the-current-hash")
            .with_input("saved_on", "earlier")
            .with_element("exposed", ""),
    );
    let controller = controller_for(page.clone(), Arc::new(MemoryWidget::new("db = 2\n")));

    let outcome = controller.save().await;
    assert!(matches!(outcome, SaveOutcome::Redirected { .. }));
    assert_eq!(
        page.location().await.as_deref(),
        Some("/resolve/welcome/models/db.py")
    );
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "db = 1\n");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_seeded_inputs_let_an_existing_file_be_saved() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("welcome/models/db.py");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, "db = 1\n").unwrap();
    let server = start_server(&dir).await;

    let url = format!("http://{}/edit/welcome/models/db.py", server.addr);
    let page = Arc::new(
        MemoryPage::new(url)
            .with_input("file_hash", "")
            .with_input("saved_on", "")
            .with_element("exposed", ""),
    );
    let controller = controller_for(page.clone(), Arc::new(MemoryWidget::new("db = 2\n")));

    let snapshot = controller.seed_inputs().await.unwrap().unwrap();
    assert_eq!(snapshot.data, "db = 1\n");
    assert_eq!(input_value(&page, "file_hash").await, file_hash("db = 1\n"));
    assert_eq!(input_value(&page, "saved_on").await, snapshot.saved_on);

    assert!(controller.save().await.is_saved());
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "db = 2\n");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_seeding_a_new_file_leaves_inputs_empty() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir).await;

    let url = format!("http://{}/edit/welcome/models/new.py", server.addr);
    let page = Arc::new(
        MemoryPage::new(url)
            .with_input("file_hash", "")
            .with_input("saved_on", ""),
    );
    let controller = controller_for(page.clone(), Arc::new(MemoryWidget::new("")));

    assert_eq!(controller.seed_inputs().await.unwrap(), None);
    assert_eq!(input_value(&page, "file_hash").await, "");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_keepalive_against_live_and_stopped_server() {
    let dir = TempDir::new().unwrap();
    let server = start_server(&dir).await;
    let keepalive_url = format!("http://{}/keepalive", server.addr);

    let page = Arc::new(
        MemoryPage::new("http://unused/")
            .with_input("file_hash", "")
            .with_input("saved_on", "t0"),
    );
    let controller = controller_for(page.clone(), Arc::new(MemoryWidget::new("")));

    controller.ping(&keepalive_url).await.unwrap();
    assert_eq!(input_value(&page, "saved_on").await, "t0");

    server.shutdown().await.unwrap();

    let err = controller.ping(&keepalive_url).await.unwrap_err();
    assert!(matches!(err, ScribeError::Communication(_)));
    assert_eq!(
        input_value(&page, "saved_on").await,
        "communication error"
    );
    assert_eq!(controller.status().await, SaveStatus::Error);
}
