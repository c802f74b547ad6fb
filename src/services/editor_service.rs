//! Typed edit forms for the admin panel and their multipart submission.
//!
//! One fixed-shape form per entity kind — the editor opens exactly one at
//! a time. Each form owns its staged media; submission assembles the
//! backend's multipart convention (a single JSON metadata part named after
//! the entity kind, plus binary parts for newly staged files, which the
//! server appends after the metadata's ordered key list).

use crate::{
    config::AppConfig,
    errors::ApiError,
    models::{
        category::Category,
        media::{SavePayload, StagedFile},
        news::NewsItem,
        product::{Product, Specification},
    },
    services::{
        api_client::ApiClient,
        media_list::{MediaList, extract_storage_key},
    },
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::info;

/// Product editor state.
#[derive(Clone, Debug, Default)]
pub struct ProductForm {
    /// `None` while creating, `Some` while editing.
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub old_price: Option<f64>,
    pub stock: u32,
    pub category_id: Option<i64>,
    pub images: MediaList,
    /// Current video key or URL, if the product has one.
    pub video: Option<String>,
    /// Replacement video staged in this session.
    pub video_file: Option<StagedFile>,
    /// The current video was removed; serializes as `null` on save.
    pub removed_video: bool,
    pub specifications: Vec<Specification>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_product(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            old_price: product.old_price,
            stock: product.stock,
            category_id: product.category_id,
            images: MediaList::from_entity(&product.images, product.image.as_deref()),
            video: product.video.clone(),
            video_file: None,
            removed_video: false,
            specifications: product.specifications.clone(),
        }
    }

    /// Append a blank specification row for the editor to fill in.
    pub fn add_specification(&mut self) {
        self.specifications.push(Specification {
            name: String::new(),
            value: String::new(),
        });
    }

    pub fn remove_specification(&mut self, index: usize) {
        if index < self.specifications.len() {
            self.specifications.remove(index);
        }
    }

    /// Stage a replacement video, discarding any earlier staged one.
    pub fn stage_video(&mut self, file: StagedFile) {
        self.video_file = Some(file);
    }

    pub fn clear_staged_video(&mut self) {
        self.video_file = None;
    }

    /// Mark the persisted video for removal. Confirmation is the caller's
    /// concern.
    pub fn remove_current_video(&mut self) {
        self.video = None;
        self.removed_video = true;
    }
}

/// News editor state.
#[derive(Clone, Debug, Default)]
pub struct NewsForm {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    /// Current cover image key or URL, if any.
    pub image: Option<String>,
    /// Replacement image staged in this session.
    pub image_file: Option<StagedFile>,
}

impl NewsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_news(news: &NewsItem) -> Self {
        Self {
            id: Some(news.id),
            title: news.title.clone(),
            content: news.content.clone(),
            image: news.image.clone(),
            image_file: None,
        }
    }
}

/// Category editor state.
#[derive(Clone, Debug, Default)]
pub struct CategoryForm {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub image_file: Option<StagedFile>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            image_file: None,
        }
    }
}

/// The one form open in the editor at a time.
#[derive(Clone, Debug)]
pub enum EntityForm {
    Product(ProductForm),
    News(NewsForm),
    Category(CategoryForm),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductMeta<'a> {
    name: &'a str,
    description: &'a str,
    price: f64,
    old_price: Option<f64>,
    stock: u32,
    category_id: Option<i64>,
    images: &'a [String],
    video: Option<&'a str>,
    specifications: Vec<&'a Specification>,
}

#[derive(Serialize)]
struct NewsMeta<'a> {
    title: &'a str,
    content: &'a str,
    image: Option<&'a str>,
}

#[derive(Serialize)]
struct CategoryMeta<'a> {
    name: &'a str,
    description: &'a str,
    image: Option<&'a str>,
}

/// Builds and submits entity save payloads.
pub struct EditorService {
    api: ApiClient,
    bucket_markers: Vec<String>,
}

impl EditorService {
    pub fn new(api: ApiClient, cfg: &AppConfig) -> Self {
        Self {
            api,
            bucket_markers: cfg.bucket_markers.clone(),
        }
    }

    /// Submit a form: create when it has no id, update otherwise.
    pub async fn save(&self, form: &EntityForm) -> Result<(), ApiError> {
        match form {
            EntityForm::Product(form) => self.save_product(form).await,
            EntityForm::News(form) => self.save_news(form).await,
            EntityForm::Category(form) => self.save_category(form).await,
        }
    }

    async fn save_product(&self, form: &ProductForm) -> Result<(), ApiError> {
        let SavePayload {
            existing_keys,
            new_files,
        } = form.images.build_save_payload(&self.bucket_markers);

        // A removed video always serializes as null; otherwise the current
        // value is reduced to its stable key.
        let video_key = if form.removed_video {
            None
        } else {
            form.video
                .as_deref()
                .and_then(|video| extract_storage_key(video, &self.bucket_markers))
        };

        // Rows with a blank name or value are dropped at save time only, so
        // half-filled rows survive while the editor is open.
        let specifications: Vec<&Specification> = form
            .specifications
            .iter()
            .filter(|spec| !spec.name.is_empty() && !spec.value.is_empty())
            .collect();

        let meta = ProductMeta {
            name: &form.name,
            description: &form.description,
            price: form.price,
            old_price: form.old_price,
            stock: form.stock,
            category_id: form.category_id,
            images: &existing_keys,
            video: video_key.as_deref(),
            specifications,
        };

        let mut multipart = Form::new().text("product", serde_json::to_string(&meta)?);
        for file in &new_files {
            multipart = multipart.part("images", file_part(file)?);
        }
        if let Some(video) = &form.video_file {
            multipart = multipart.part("video", file_part(video)?);
        }

        info!(
            "saving product ({} existing key(s), {} upload(s))",
            existing_keys.len(),
            new_files.len()
        );
        match form.id {
            Some(id) => self.api.update_product(id, multipart).await,
            None => self.api.create_product(multipart).await,
        }
    }

    async fn save_news(&self, form: &NewsForm) -> Result<(), ApiError> {
        let image_key = self.single_image_key(form.image.as_deref());
        let meta = NewsMeta {
            title: &form.title,
            content: &form.content,
            image: image_key.as_deref(),
        };

        let mut multipart = Form::new().text("news", serde_json::to_string(&meta)?);
        if let Some(image) = &form.image_file {
            multipart = multipart.part("image", file_part(image)?);
        }

        match form.id {
            Some(id) => self.api.update_news(id, multipart).await,
            None => self.api.create_news(multipart).await,
        }
    }

    async fn save_category(&self, form: &CategoryForm) -> Result<(), ApiError> {
        let image_key = self.single_image_key(form.image.as_deref());
        let meta = CategoryMeta {
            name: &form.name,
            description: &form.description,
            image: image_key.as_deref(),
        };

        let mut multipart = Form::new().text("category", serde_json::to_string(&meta)?);
        if let Some(image) = &form.image_file {
            multipart = multipart.part("image", file_part(image)?);
        }

        match form.id {
            Some(id) => self.api.update_category(id, multipart).await,
            None => self.api.create_category(multipart).await,
        }
    }

    /// Reduce a single-image field to its stable key. An unparseable value
    /// is omitted rather than blocking the save of the other fields.
    fn single_image_key(&self, image: Option<&str>) -> Option<String> {
        image.and_then(|value| extract_storage_key(value, &self.bucket_markers))
    }
}

fn file_part(file: &StagedFile) -> Result<Part, ApiError> {
    Ok(Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)?)
}
