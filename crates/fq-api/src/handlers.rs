//! # fq-api Handlers
//!
//! Coordinates the flow between HTTP requests and the core ports. Every
//! get-by-id, update, and delete runs the ownership guard before touching
//! or disclosing the resource.

use std::sync::Arc;

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde::Serialize;
use uuid::Uuid;

use fq_core::auth::ensure_owner;
use fq_core::categories;
use fq_core::error::{AppError, FieldError};
use fq_core::models::{
    ClothingItem, ClothingItemPatch, Outfit, OutfitDraft, OutfitPatch, WardrobeEntry,
};
use fq_core::outfits;
use fq_core::stylist::OutfitStylist;
use fq_core::traits::{MediaStore, OutfitRepo, WardrobeRepo};

use crate::error::ApiError;

/// Caller identity is asserted by the fronting identity provider and
/// forwarded in this header; this core never verifies credentials itself.
const USER_HEADER: &str = "x-fabriq-user";

/// State shared across all Actix-web workers.
pub struct AppState {
    pub wardrobe: Arc<dyn WardrobeRepo>,
    pub outfits: Arc<dyn OutfitRepo>,
    pub media: Arc<dyn MediaStore>,
    pub stylist: OutfitStylist,
}

fn caller_id(req: &HttpRequest) -> Result<String, ApiError> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized("missing caller identity header"))
}

/// GET /api/categories
pub async fn list_categories() -> HttpResponse {
    HttpResponse::Ok().json(categories::sorted_categories())
}

/// GET /api/clothing
pub async fn list_items(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let items = data.wardrobe.list_items(&caller).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/clothing/{id}
pub async fn get_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let item = data
        .wardrobe
        .get_item(id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    ensure_owner("clothing item", &item.owner_id, &caller)?;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /api/clothing — multipart: `photo` (file), `name`, `category`.
///
/// The photo goes through the media store first; only the resulting
/// locator is persisted on the item.
pub async fn create_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let form = read_item_form(payload).await?;

    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "item name must not be empty"));
    }
    if form.category.trim().is_empty() {
        errors.push(FieldError::new("category", "a category is required"));
    }
    if form.photo.as_ref().map_or(true, |(bytes, _)| bytes.is_empty()) {
        errors.push(FieldError::new("photo", "an item photo is required"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors).into());
    }

    let (bytes, content_type) = form
        .photo
        .ok_or_else(|| AppError::Internal("photo missing after validation".to_string()))?;
    let media_id = data
        .media
        .save_upload(bytes, &content_type)
        .await
        .map_err(|err| AppError::Validation(vec![FieldError::new("photo", &err.to_string())]))?;

    let item = ClothingItem {
        id: Uuid::now_v7(),
        owner_id: caller,
        name: form.name.trim().to_string(),
        category: form.category.trim().to_string(),
        image_url: data.media.get_url(&media_id),
        created_at: Utc::now(),
    };
    let created = data.wardrobe.create_item(item).await?;
    Ok(HttpResponse::Created().json(created))
}

/// PUT /api/clothing/{id}
pub async fn update_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ClothingItemPatch>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let existing = data
        .wardrobe
        .get_item(id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    ensure_owner("clothing item", &existing.owner_id, &caller)?;

    let patch = body.into_inner();
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(
                AppError::Validation(vec![FieldError::new("name", "item name must not be empty")])
                    .into(),
            );
        }
    }

    let updated = data
        .wardrobe
        .update_item(id, patch)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/clothing/{id} — immediate and terminal, no soft delete.
pub async fn delete_item(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let existing = data
        .wardrobe
        .get_item(id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    ensure_owner("clothing item", &existing.owner_id, &caller)?;
    data.wardrobe.delete_item(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/outfits
pub async fn list_outfits(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let found = data.outfits.list_outfits(&caller).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[derive(Serialize)]
struct OutfitWithItems {
    #[serde(flatten)]
    outfit: Outfit,
    /// Materialized item records; dangling references are omitted.
    items: Vec<ClothingItem>,
}

/// GET /api/outfits/{id} — returns the outfit with its items materialized.
pub async fn get_outfit(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let outfit = data
        .outfits
        .get_outfit(id)
        .await?
        .ok_or_else(|| outfit_not_found(id))?;
    ensure_owner("outfit", &outfit.owner_id, &caller)?;

    let items = outfits::materialize_items(data.wardrobe.as_ref(), &outfit.item_ids).await?;
    Ok(HttpResponse::Ok().json(OutfitWithItems { outfit, items }))
}

/// POST /api/outfits
pub async fn create_outfit(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<OutfitDraft>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let draft = body.into_inner();
    outfits::validate_draft(&draft)?;

    let outfit = Outfit {
        id: Uuid::now_v7(),
        owner_id: caller,
        name: draft.name.trim().to_string(),
        item_ids: draft.item_ids,
        notes: draft.notes,
        created_at: Utc::now(),
    };
    let created = data.outfits.create_outfit(outfit).await?;
    Ok(HttpResponse::Created().json(created))
}

/// PUT /api/outfits/{id}
pub async fn update_outfit(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<OutfitPatch>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let existing = data
        .outfits
        .get_outfit(id)
        .await?
        .ok_or_else(|| outfit_not_found(id))?;
    ensure_owner("outfit", &existing.owner_id, &caller)?;

    let patch = body.into_inner();
    outfits::validate_patch(&patch)?;

    let updated = data
        .outfits
        .update_outfit(id, patch)
        .await?
        .ok_or_else(|| outfit_not_found(id))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/outfits/{id}
pub async fn delete_outfit(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;
    let id = path.into_inner();
    let existing = data
        .outfits
        .get_outfit(id)
        .await?
        .ok_or_else(|| outfit_not_found(id))?;
    ensure_owner("outfit", &existing.owner_id, &caller)?;
    data.outfits.delete_outfit(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/recommend — multipart: `inspiration` (image file), `prompt`.
///
/// Always answers 200 with a structurally valid recommendation; AI
/// degradation is absorbed inside the stylist.
pub async fn recommend(
    data: web::Data<AppState>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let caller = caller_id(&req)?;

    let mut prompt = String::new();
    let mut inspiration: Option<(Vec<u8>, String)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_upload)? {
        match field.name() {
            "inspiration" => inspiration = Some(read_file_field(&mut field).await?),
            "prompt" => prompt = read_text_field(&mut field).await?,
            _ => {}
        }
    }

    let (bytes, content_type) = match inspiration {
        Some((bytes, ct)) if !bytes.is_empty() => (bytes, ct),
        _ => {
            return Err(AppError::Validation(vec![FieldError::new(
                "inspiration",
                "an inspiration image is required",
            )])
            .into())
        }
    };

    let snapshot: Vec<WardrobeEntry> = data
        .wardrobe
        .list_items(&caller)
        .await?
        .iter()
        .map(WardrobeEntry::from)
        .collect();

    let recommendation = data
        .stylist
        .generate(&bytes, &content_type, &prompt, &snapshot)
        .await;
    Ok(HttpResponse::Ok().json(recommendation))
}

/* ------------------------- multipart helpers ------------------------- */

struct ItemForm {
    name: String,
    category: String,
    photo: Option<(Vec<u8>, String)>,
}

async fn read_item_form(mut payload: Multipart) -> Result<ItemForm, ApiError> {
    let mut form = ItemForm {
        name: String::new(),
        category: String::new(),
        photo: None,
    };
    while let Some(mut field) = payload.try_next().await.map_err(bad_upload)? {
        match field.name() {
            "photo" => form.photo = Some(read_file_field(&mut field).await?),
            "name" => form.name = read_text_field(&mut field).await?,
            "category" => form.category = read_text_field(&mut field).await?,
            _ => {}
        }
    }
    Ok(form)
}

async fn read_file_field(field: &mut Field) -> Result<(Vec<u8>, String), ApiError> {
    let content_type = field
        .content_type()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_upload)? {
        bytes.extend_from_slice(&chunk);
    }
    Ok((bytes, content_type))
}

async fn read_text_field(field: &mut Field) -> Result<String, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_upload)? {
        bytes.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

fn bad_upload(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::App(AppError::Validation(vec![FieldError::new(
        "upload",
        &err.to_string(),
    )]))
}

fn item_not_found(id: Uuid) -> AppError {
    AppError::NotFound("clothing item".to_string(), id.to_string())
}

fn outfit_not_found(id: Uuid) -> AppError {
    AppError::NotFound("outfit".to_string(), id.to_string())
}
