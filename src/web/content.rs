use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    delete_and_redirect, load, redirect_error, redirect_notice, Flash, Listing, SharedState,
};
use crate::db::Record;
use crate::error::{AppError, Result};
use crate::forms::{
    ArticleInput, CurrentEventInput, FormData, GalleryInput, GkInput, NoteInput, PradeshInput,
    TemplateInput,
};
use crate::models::{
    Article, ArticleCategory, CurrentEvent, EntityId, GalleryImage, GkEntry, GkKind, GkQuestion,
    Note, Pradesh, PradeshQa, Province, TemplateResource,
};
use crate::services::storage::UploadFolder;

const MANAGE_NOTES: &str = "/manage/notes";
const MANAGE_GK: &str = "/manage/gk";
const MANAGE_BLOG: &str = "/manage/blog";
const MANAGE_PRADESH: &str = "/manage/pradesh";
const MANAGE_TEMPLATES: &str = "/manage/templates";
const MANAGE_GALLERY: &str = "/manage/gallery";
const MANAGE_EVENTS: &str = "/manage/current-events";

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/notes", get(notes))
        .route("/gk", get(gk))
        .route("/gk/{id}", get(gk_detail))
        .route("/pradesh", get(pradesh))
        .route("/pradesh/{id}", get(pradesh_detail))
        .route("/blog", get(blog))
        .route("/blog/{id}", get(blog_detail))
        .route("/templates", get(templates))
        .route("/gallery", get(gallery))
        .route("/current-events", get(current_events))
        .route("/current-events/{id}", get(current_event_detail))
        .route(MANAGE_NOTES, get(manage_notes).post(create_note))
        .route("/manage/notes/{id}/delete", get(delete_note).post(delete_note))
        .route(MANAGE_GK, get(manage_gk).post(create_gk))
        .route("/manage/gk/{id}/edit", get(gk_detail).post(update_gk))
        .route("/manage/gk/{id}/delete", get(delete_gk).post(delete_gk))
        .route(MANAGE_BLOG, get(manage_blog).post(create_blog_post))
        .route("/manage/blog/{id}/edit", get(blog_detail).post(update_blog_post))
        .route("/manage/blog/{id}/delete", get(delete_blog_post).post(delete_blog_post))
        .route(MANAGE_PRADESH, get(manage_pradesh).post(create_pradesh))
        .route("/manage/pradesh/{id}/edit", get(pradesh_detail).post(update_pradesh))
        .route("/manage/pradesh/{id}/delete", get(delete_pradesh).post(delete_pradesh))
        .route(MANAGE_TEMPLATES, get(manage_templates).post(create_template))
        .route("/manage/templates/{id}/edit", get(template_detail).post(update_template))
        .route("/manage/templates/{id}/delete", get(delete_template).post(delete_template))
        .route(MANAGE_GALLERY, get(manage_gallery).post(create_gallery_image))
        .route("/manage/gallery/{id}/edit", get(gallery_detail).post(update_gallery_image))
        .route("/manage/gallery/{id}/delete", get(delete_gallery_image).post(delete_gallery_image))
        .route(MANAGE_EVENTS, get(manage_current_events).post(create_current_event))
        .route("/manage/current-events/{id}/edit", get(current_event_detail).post(update_current_event))
        .route("/manage/current-events/{id}/delete", get(delete_current_event).post(delete_current_event))
}

// Notes

#[derive(Debug, Deserialize)]
struct NoteSearch {
    #[serde(default)]
    q: String,
}

async fn notes(
    State(state): State<SharedState>,
    Query(search): Query<NoteSearch>,
) -> Result<Json<Value>> {
    let q = search.q.trim();
    let notes = if q.is_empty() {
        state.repository.list::<Note>().await?
    } else {
        state.repository.search_notes(q).await?
    };
    Ok(Json(json!({ "q": q, "notes": notes })))
}

async fn manage_notes(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Note>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_note(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = NoteInput::from_form(&form)?;
    let file_url = state
        .upload(&mut form, "file", UploadFolder::Notes)
        .await?
        .ok_or_else(|| AppError::validation("A file is required"))?;
    state
        .repository
        .insert(Note::new(input.title, file_url))
        .await?;
    Ok(redirect_notice(MANAGE_NOTES, "Note uploaded successfully!"))
}

async fn delete_note(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<Note>(&state, &id, MANAGE_NOTES, "Note deleted successfully!").await
}

// General knowledge

#[derive(Debug, Deserialize)]
struct GkTab {
    tab: Option<String>,
}

#[derive(Debug, Serialize)]
struct GkDetail {
    #[serde(flatten)]
    entry: GkEntry,
    questions: Vec<GkQuestion>,
}

async fn gk(State(state): State<SharedState>, Query(query): Query<GkTab>) -> Result<Json<Value>> {
    let tab = query.tab.unwrap_or_else(|| GkKind::Nepal.as_str().to_string());
    let entries = match tab.parse::<GkKind>() {
        Ok(kind) => state.repository.list_by::<GkEntry>("kind", kind).await?,
        Err(_) => Vec::new(),
    };
    Ok(Json(json!({ "tab": tab, "gk_entries": entries })))
}

async fn gk_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<GkDetail>> {
    let entry: GkEntry = load(&state, &id).await?;
    let questions = state.repository.list_by("entry_id", entry.id).await?;
    Ok(Json(GkDetail { entry, questions }))
}

async fn manage_gk(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<GkEntry>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

fn gk_questions(entry_id: EntityId, pairs: Vec<(String, String)>) -> Vec<GkQuestion> {
    pairs
        .into_iter()
        .map(|(question, answer)| GkQuestion::new(entry_id, question, answer))
        .collect()
}

async fn create_gk(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = GkInput::from_form(&form)?;
    let document_url = state.upload(&mut form, "document", UploadFolder::Gk).await?;
    let entry = state
        .repository
        .insert(GkEntry::new(input.kind, input.title, document_url))
        .await?;
    state
        .repository
        .insert_many(gk_questions(entry.id, input.questions))
        .await?;
    Ok(redirect_notice(MANAGE_GK, "GK entry added successfully!"))
}

async fn update_gk(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut entry: GkEntry = load(&state, &id).await?;
    let input = GkInput::from_form(&form)?;
    if let Some(url) = state.upload(&mut form, "document", UploadFolder::Gk).await? {
        entry.document_url = Some(url);
    }
    entry.kind = input.kind;
    entry.title = input.title;
    let questions = gk_questions(entry.id, input.questions);
    state
        .repository
        .replace_children(entry, "entry_id", questions)
        .await?;
    Ok(redirect_notice(MANAGE_GK, "GK entry updated successfully!"))
}

async fn delete_gk(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<GkEntry>(&state, &id, MANAGE_GK, "GK entry deleted successfully!").await
}

// Blog

async fn blog(State(state): State<SharedState>) -> Result<Json<Value>> {
    let articles = state
        .repository
        .list_by::<Article>("category", ArticleCategory::Blog)
        .await?;
    Ok(Json(json!({ "articles": articles })))
}

/// Loads an article only when it belongs to the blog category.
async fn load_blog_post(state: &SharedState, raw_id: &str) -> Result<Article> {
    match load::<Article>(state, raw_id).await? {
        article if article.category == ArticleCategory::Blog => Ok(article),
        _ => Err(AppError::NotFound(Article::LABEL)),
    }
}

async fn blog_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Article>> {
    Ok(Json(load_blog_post(&state, &id).await?))
}

async fn manage_blog(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Article>>> {
    let articles = state
        .repository
        .list_by("category", ArticleCategory::Blog)
        .await?;
    Ok(Json(Listing::new(flash, articles)))
}

async fn create_blog_post(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = ArticleInput::from_form(&form)?;
    let image_url = state.upload(&mut form, "image", UploadFolder::Blog).await?;
    state
        .repository
        .insert(Article::blog_post(input.title, input.content, image_url))
        .await?;
    Ok(redirect_notice(MANAGE_BLOG, "Blog post created successfully!"))
}

async fn update_blog_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut article = load_blog_post(&state, &id).await?;
    let input = ArticleInput::from_form(&form)?;
    if let Some(url) = state.upload(&mut form, "image", UploadFolder::Blog).await? {
        article.image_url = Some(url);
    }
    article.title = input.title;
    article.content = input.content;
    state.repository.update(article).await?;
    Ok(redirect_notice(MANAGE_BLOG, "Blog post updated successfully!"))
}

async fn delete_blog_post(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    match load_blog_post(&state, &id).await {
        Ok(_) => {}
        Err(AppError::NotFound(label)) => {
            return Ok(redirect_error(MANAGE_BLOG, &format!("{label} not found!")))
        }
        Err(e) => return Err(e),
    }
    delete_and_redirect::<Article>(&state, &id, MANAGE_BLOG, "Blog post deleted successfully!").await
}

// Province-wise entries

#[derive(Debug, Deserialize)]
struct ProvinceFilter {
    province: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProvinceOption {
    number: u8,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct PradeshDetail {
    #[serde(flatten)]
    pradesh: Pradesh,
    qas: Vec<PradeshQa>,
}

async fn pradesh(
    State(state): State<SharedState>,
    Query(filter): Query<ProvinceFilter>,
) -> Result<Json<Value>> {
    let selected = filter
        .province
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u8>().ok())
        .and_then(|n| Province::try_from(n).ok());

    let entries = match selected {
        Some(province) => {
            state
                .repository
                .list_by::<Pradesh>("province", province)
                .await?
        }
        None => state.repository.list::<Pradesh>().await?,
    };
    let provinces: Vec<ProvinceOption> = Province::ALL
        .iter()
        .map(|p| ProvinceOption {
            number: p.number(),
            name: p.name(),
        })
        .collect();

    Ok(Json(json!({
        "pradeshes": entries,
        "provinces": provinces,
        "selected_province": selected.map(Province::number),
    })))
}

async fn pradesh_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PradeshDetail>> {
    let pradesh: Pradesh = load(&state, &id).await?;
    let qas = state.repository.list_by("pradesh_id", pradesh.id).await?;
    Ok(Json(PradeshDetail { pradesh, qas }))
}

async fn manage_pradesh(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Pradesh>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

fn pradesh_qas(pradesh_id: EntityId, pairs: Vec<(String, String)>) -> Vec<PradeshQa> {
    pairs
        .into_iter()
        .map(|(question, answer)| PradeshQa::new(pradesh_id, question, answer))
        .collect()
}

async fn create_pradesh(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = PradeshInput::from_form(&form)?;
    let document_url = state
        .upload(&mut form, "document", UploadFolder::Pradesh)
        .await?;
    let pradesh = state
        .repository
        .insert(Pradesh::new(input.province, input.title, document_url))
        .await?;
    state
        .repository
        .insert_many(pradesh_qas(pradesh.id, input.qas))
        .await?;
    Ok(redirect_notice(MANAGE_PRADESH, "Pradesh entry added successfully!"))
}

async fn update_pradesh(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut pradesh: Pradesh = load(&state, &id).await?;
    let input = PradeshInput::from_form(&form)?;
    if let Some(url) = state
        .upload(&mut form, "document", UploadFolder::Pradesh)
        .await?
    {
        pradesh.document_url = Some(url);
    }
    pradesh.set_province(input.province);
    pradesh.title = input.title;
    let qas = pradesh_qas(pradesh.id, input.qas);
    state
        .repository
        .replace_children(pradesh, "pradesh_id", qas)
        .await?;
    Ok(redirect_notice(MANAGE_PRADESH, "Province entry updated successfully!"))
}

async fn delete_pradesh(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<Pradesh>(
        &state,
        &id,
        MANAGE_PRADESH,
        "Province entry deleted successfully!",
    )
    .await
}

// Templates

async fn templates(State(state): State<SharedState>) -> Result<Json<Value>> {
    let templates = state.repository.list::<TemplateResource>().await?;
    Ok(Json(json!({ "templates": templates })))
}

async fn template_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateResource>> {
    Ok(Json(load(&state, &id).await?))
}

async fn manage_templates(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<TemplateResource>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_template(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = TemplateInput::from_form(&form)?;
    let image_url = state
        .upload(&mut form, "image", UploadFolder::Templates)
        .await?;
    let file_url = state
        .upload(&mut form, "file", UploadFolder::Templates)
        .await?;
    state
        .repository
        .insert(TemplateResource {
            id: EntityId::generate(),
            title: input.title,
            description: input.description,
            image_url,
            file_url,
        })
        .await?;
    Ok(redirect_notice(MANAGE_TEMPLATES, "Template added successfully!"))
}

async fn update_template(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut template: TemplateResource = load(&state, &id).await?;
    let input = TemplateInput::from_form(&form)?;
    if let Some(url) = state
        .upload(&mut form, "image", UploadFolder::Templates)
        .await?
    {
        template.image_url = Some(url);
    }
    if let Some(url) = state
        .upload(&mut form, "file", UploadFolder::Templates)
        .await?
    {
        template.file_url = Some(url);
    }
    template.title = input.title;
    template.description = input.description;
    state.repository.update(template).await?;
    Ok(redirect_notice(MANAGE_TEMPLATES, "Template updated successfully!"))
}

async fn delete_template(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<TemplateResource>(
        &state,
        &id,
        MANAGE_TEMPLATES,
        "Template deleted successfully!",
    )
    .await
}

// Gallery

async fn gallery(State(state): State<SharedState>) -> Result<Json<Value>> {
    let images = state.repository.list::<GalleryImage>().await?;
    Ok(Json(json!({ "images": images })))
}

async fn gallery_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GalleryImage>> {
    Ok(Json(load(&state, &id).await?))
}

async fn manage_gallery(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<GalleryImage>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_gallery_image(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = GalleryInput::from_form(&form)?;
    let file_url = state
        .upload(&mut form, "file", UploadFolder::Gallery)
        .await?;
    state
        .repository
        .insert(GalleryImage {
            id: EntityId::generate(),
            title: input.title,
            file_url,
            description: input.description,
            caption: input.caption,
        })
        .await?;
    Ok(redirect_notice(MANAGE_GALLERY, "Image added to gallery!"))
}

async fn update_gallery_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut image: GalleryImage = load(&state, &id).await?;
    let input = GalleryInput::from_form(&form)?;
    if let Some(url) = state
        .upload(&mut form, "file", UploadFolder::Gallery)
        .await?
    {
        image.file_url = Some(url);
    }
    image.title = input.title;
    image.description = input.description;
    image.caption = input.caption;
    state.repository.update(image).await?;
    Ok(redirect_notice(MANAGE_GALLERY, "Gallery image updated successfully!"))
}

async fn delete_gallery_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    delete_and_redirect::<GalleryImage>(
        &state,
        &id,
        MANAGE_GALLERY,
        "Gallery image deleted successfully!",
    )
    .await
}

// Current events

async fn current_events(State(state): State<SharedState>) -> Result<Json<Value>> {
    let events = state.repository.list::<CurrentEvent>().await?;
    Ok(Json(json!({ "events": events })))
}

async fn current_event_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CurrentEvent>> {
    Ok(Json(load(&state, &id).await?))
}

async fn manage_current_events(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<CurrentEvent>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_current_event(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = CurrentEventInput::from_form(&form)?;
    let image_url = state
        .upload(&mut form, "image", UploadFolder::CurrentEvents)
        .await?;
    let document_url = state
        .upload(&mut form, "document", UploadFolder::CurrentEvents)
        .await?;
    state
        .repository
        .insert(CurrentEvent {
            id: EntityId::generate(),
            title: input.title,
            description: input.description,
            image_url,
            document_url,
            created_at: Utc::now(),
        })
        .await?;
    Ok(redirect_notice(MANAGE_EVENTS, "Current event added successfully!"))
}

async fn update_current_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let mut event: CurrentEvent = load(&state, &id).await?;
    let input = CurrentEventInput::from_form(&form)?;
    if let Some(url) = state
        .upload(&mut form, "image", UploadFolder::CurrentEvents)
        .await?
    {
        event.image_url = Some(url);
    }
    if let Some(url) = state
        .upload(&mut form, "document", UploadFolder::CurrentEvents)
        .await?
    {
        event.document_url = Some(url);
    }
    event.title = input.title;
    event.description = input.description;
    state.repository.update(event).await?;
    Ok(redirect_notice(MANAGE_EVENTS, "Current event updated successfully!"))
}

async fn delete_current_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    delete_and_redirect::<CurrentEvent>(
        &state,
        &id,
        MANAGE_EVENTS,
        "Current event deleted successfully!",
    )
    .await
}
