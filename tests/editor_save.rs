//! End-to-end tests for entity form submission against an in-process stub
//! of the backend's multipart save endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{patch, post},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use storefront_client::{
    config::AppConfig,
    models::{media::StagedFile, product::Specification},
    services::{
        api_client::ApiClient,
        editor_service::{CategoryForm, EditorService, EntityForm, NewsForm, ProductForm},
        media_list::MediaList,
    },
};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Stub {
    received: Arc<Mutex<Option<ReceivedSave>>>,
}

#[derive(Debug)]
struct ReceivedSave {
    endpoint: String,
    meta: Value,
    files: Vec<ReceivedFile>,
}

#[derive(Debug)]
struct ReceivedFile {
    part: String,
    file_name: String,
    content_type: String,
    len: usize,
}

impl Stub {
    fn take(&self) -> ReceivedSave {
        self.received.lock().unwrap().take().expect("stub saw no save")
    }
}

async fn record_save(stub: Stub, endpoint: String, mut multipart: Multipart) -> StatusCode {
    let mut meta = Value::Null;
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let part = field.name().unwrap_or_default().to_string();
        match part.as_str() {
            "product" | "news" | "category" => {
                meta = serde_json::from_str(&field.text().await.unwrap()).unwrap();
            }
            _ => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let len = field.bytes().await.unwrap().len();
                files.push(ReceivedFile { part, file_name, content_type, len });
            }
        }
    }
    *stub.received.lock().unwrap() = Some(ReceivedSave { endpoint, meta, files });
    StatusCode::CREATED
}

async fn create_product(State(stub): State<Stub>, multipart: Multipart) -> StatusCode {
    record_save(stub, "POST /products".into(), multipart).await
}

async fn update_news(
    State(stub): State<Stub>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> StatusCode {
    record_save(stub, format!("PATCH /news/{id}"), multipart).await
}

async fn create_category(State(stub): State<Stub>, multipart: Multipart) -> StatusCode {
    record_save(stub, "POST /categories".into(), multipart).await
}

async fn spawn_stub(stub: Stub) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let app = Router::new()
        .route("/products", post(create_product))
        .route("/news/{id}", patch(update_news))
        .route("/categories", post(create_category))
        .with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config_for(base_url: &str) -> AppConfig {
    AppConfig {
        api_base_url: base_url.to_string(),
        data_dir: "./data/test".into(),
        bucket_markers: vec!["parsifal-files".into(), "twcstorage".into()],
    }
}

fn png(name: &str) -> StagedFile {
    StagedFile::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a])
}

#[tokio::test]
async fn product_save_partitions_media_and_preserves_order() {
    let stub = Stub::default();
    let base_url = spawn_stub(stub.clone()).await;
    let cfg = config_for(&base_url);
    let editor = EditorService::new(ApiClient::with_base_url(base_url.clone()), &cfg);

    let mut form = ProductForm::new();
    form.name = "Anvil".into();
    form.description = "Drop-forged".into();
    form.price = 149.0;
    form.stock = 12;
    form.specifications = vec![
        Specification { name: "Weight".into(), value: "50kg".into() },
        Specification { name: "".into(), value: "orphan value".into() },
    ];
    form.images = MediaList::from_entity(
        &[
            "https://s3.example/parsifal-files/parsifal-files/p/a.jpg?sig=abc".to_string(),
            "https://s3.example/parsifal-files/p/b.jpg".to_string(),
        ],
        None,
    );
    form.images.stage_all([png("new1.png"), png("new2.png")]);
    form.images.remove_at(1); // detach b.jpg
    form.images.reorder(0, 1); // a.jpg after new1.png
    form.stage_video(StagedFile::new("clip.mp4", "video/mp4", vec![0u8; 16]));

    editor.save(&EntityForm::Product(form)).await.unwrap();

    let save = stub.take();
    assert_eq!(save.endpoint, "POST /products");
    assert_eq!(save.meta["name"], "Anvil");
    assert_eq!(save.meta["stock"], 12);
    assert_eq!(save.meta["oldPrice"], Value::Null);

    // Detached entry gone, signature stripped, doubled bucket collapsed.
    assert_eq!(save.meta["images"], serde_json::json!(["p/a.jpg"]));

    // Blank specification rows are dropped at save time.
    assert_eq!(save.meta["specifications"], serde_json::json!([{"name": "Weight", "value": "50kg"}]));

    // Files ride along after the metadata part, staging order preserved.
    let parts: Vec<(&str, &str)> = save
        .files
        .iter()
        .map(|f| (f.part.as_str(), f.file_name.as_str()))
        .collect();
    assert_eq!(
        parts,
        vec![("images", "new1.png"), ("images", "new2.png"), ("video", "clip.mp4")]
    );
    assert!(save.files.iter().all(|f| f.len > 0));
    assert_eq!(save.files[0].content_type, "image/png");
}

#[tokio::test]
async fn news_update_reduces_image_url_to_its_key() {
    let stub = Stub::default();
    let base_url = spawn_stub(stub.clone()).await;
    let cfg = config_for(&base_url);
    let editor = EditorService::new(ApiClient::with_base_url(base_url.clone()), &cfg);

    let form = NewsForm {
        id: Some(5),
        title: "Grand opening".into(),
        content: "Doors open at nine.".into(),
        image: Some("https://s3.twcstorage.ru/parsifal-files/news/cover.jpg?X-Amz-Expires=60".into()),
        image_file: Some(png("replacement.png")),
    };

    editor.save(&EntityForm::News(form)).await.unwrap();

    let save = stub.take();
    assert_eq!(save.endpoint, "PATCH /news/5");
    assert_eq!(save.meta["title"], "Grand opening");
    assert_eq!(save.meta["image"], "news/cover.jpg");
    assert_eq!(save.files.len(), 1);
    assert_eq!(save.files[0].part, "image");
    assert_eq!(save.files[0].file_name, "replacement.png");
}

#[tokio::test]
async fn category_create_without_image_serializes_null() {
    let stub = Stub::default();
    let base_url = spawn_stub(stub.clone()).await;
    let cfg = config_for(&base_url);
    let editor = EditorService::new(ApiClient::with_base_url(base_url.clone()), &cfg);

    let form = CategoryForm {
        id: None,
        name: "Hand tools".into(),
        description: String::new(),
        image: None,
        image_file: None,
    };

    editor.save(&EntityForm::Category(form)).await.unwrap();

    let save = stub.take();
    assert_eq!(save.endpoint, "POST /categories");
    assert_eq!(save.meta["name"], "Hand tools");
    assert_eq!(save.meta["image"], Value::Null);
    assert!(save.files.is_empty());
}
