use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::{delete_and_redirect, load, redirect_notice, Flash, Listing, SharedState};
use crate::error::Result;
use crate::forms::{ContactInput, FormData, JobInput, ProfileInput, UserInput};
use crate::models::{
    Article, BookmarkTarget, BookmarkedItem, ContactMessage, EntityId, Job, ModelSet, Note,
    Pradesh, Quiz, User,
};

const MANAGE_JOBS: &str = "/manage/jobs";
const MANAGE_MESSAGES: &str = "/manage/messages";
const MANAGE_USERS: &str = "/manage/users";

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/jobs", get(jobs))
        .route("/contact", get(contact).post(send_message))
        .route("/users/{id}/profile", get(profile))
        .route("/users/{id}/profile/edit", get(profile).post(update_profile))
        .route("/users/{id}/bookmarks", get(bookmarks))
        .route("/users/{id}/bookmarks/{kind}/{target_id}", post(toggle_bookmark))
        .route("/manage/dashboard", get(dashboard))
        .route(MANAGE_JOBS, get(manage_jobs).post(create_job))
        .route("/manage/jobs/{id}/edit", get(job_detail).post(update_job))
        .route("/manage/jobs/{id}/delete", get(delete_job).post(delete_job))
        .route(MANAGE_MESSAGES, get(manage_messages))
        .route("/manage/messages/{id}/reply", get(message_detail).post(reply_to_message))
        .route(MANAGE_USERS, get(manage_users).post(create_user))
        .route("/manage/users/{id}/make-admin", post(make_admin))
}

// Jobs

fn build_job(id: EntityId, input: JobInput, posted_at: DateTime<Utc>) -> Job {
    Job {
        id,
        title: input.title,
        position: input.position,
        vacancies: input.vacancies,
        opening_date: input.opening_date,
        application_deadline: input.application_deadline,
        more_details: input.more_details,
        job_type: input.job_type,
        location: input.location,
        posted_at,
    }
}

async fn jobs(State(state): State<SharedState>) -> Result<Json<Value>> {
    let jobs = state.repository.list::<Job>().await?;
    Ok(Json(json!({ "jobs": jobs })))
}

async fn manage_jobs(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Job>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_job(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = JobInput::from_form(&form)?;
    state
        .repository
        .insert(build_job(EntityId::generate(), input, Utc::now()))
        .await?;
    Ok(redirect_notice(MANAGE_JOBS, "Job added successfully!"))
}

async fn job_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Job>> {
    Ok(Json(load(&state, &id).await?))
}

async fn update_job(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let existing: Job = load(&state, &id).await?;
    let input = JobInput::from_form(&form)?;
    state
        .repository
        .update(build_job(existing.id, input, existing.posted_at))
        .await?;
    Ok(redirect_notice(MANAGE_JOBS, "Job updated successfully!"))
}

async fn delete_job(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<Job>(&state, &id, MANAGE_JOBS, "Job deleted successfully!").await
}

// Contact messages

async fn contact(Query(flash): Query<Flash>) -> Json<Flash> {
    Json(flash)
}

async fn send_message(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = ContactInput::from_form(&form)?;
    state
        .repository
        .insert(ContactMessage::new(input.name, input.email, input.message))
        .await?;
    Ok(redirect_notice("/contact", "Your message has been sent!"))
}

async fn manage_messages(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<ContactMessage>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn message_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ContactMessage>> {
    Ok(Json(load(&state, &id).await?))
}

async fn reply_to_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut message: ContactMessage = load(&state, &id).await?;
    message.reply = Some(form.required("reply", "Reply")?);
    state.repository.update(message).await?;
    Ok(redirect_notice(MANAGE_MESSAGES, "Reply saved successfully!"))
}

// Users

async fn manage_users(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<User>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_user(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = UserInput::from_form(&form)?;
    let user = state
        .repository
        .create_user(User::new(input.username, input.email))
        .await?;
    tracing::info!("Created user {}", user.username);
    Ok(redirect_notice(MANAGE_USERS, "User created successfully!"))
}

async fn make_admin(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    let mut user: User = load(&state, &id).await?;
    if user.is_admin() {
        return Ok(redirect_notice(
            MANAGE_USERS,
            &format!("{} is already an admin.", user.username),
        ));
    }
    user.promote();
    let user = state.repository.update(user).await?;
    tracing::info!("Promoted {} to admin", user.username);
    Ok(redirect_notice(
        MANAGE_USERS,
        &format!("{} is now an admin.", user.username),
    ))
}

#[derive(Debug, Serialize)]
struct Profile {
    #[serde(flatten)]
    flash: Flash,
    user: User,
    messages: Vec<ContactMessage>,
}

async fn profile(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<Profile>> {
    let user: User = load(&state, &id).await?;
    let messages = state
        .repository
        .list_by("email", user.email.clone())
        .await?;
    Ok(Json(Profile {
        flash,
        user,
        messages,
    }))
}

async fn update_profile(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut user: User = load(&state, &id).await?;
    let input = ProfileInput::from_form(&form)?;
    user.first_name = input.first_name;
    user.last_name = input.last_name;
    user.email = input.email;
    let user = state.repository.update(user).await?;
    Ok(redirect_notice(
        &format!("/users/{}/profile", user.id),
        "Profile updated successfully!",
    ))
}

// Bookmarks

#[derive(Debug, Serialize)]
struct BookmarkEntry {
    id: EntityId,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    target: BookmarkedItem,
}

async fn bookmarks(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let user: User = load(&state, &id).await?;
    let entries: Vec<BookmarkEntry> = state
        .repository
        .bookmarks_for(user.id)
        .await?
        .into_iter()
        .map(|(bookmark, target)| BookmarkEntry {
            id: bookmark.id,
            created_at: bookmark.created_at,
            target,
        })
        .collect();
    Ok(Json(json!({ "bookmarks": entries })))
}

async fn toggle_bookmark(
    State(state): State<SharedState>,
    Path((id, kind, target_id)): Path<(String, String, String)>,
) -> Result<Json<Value>> {
    let user_id = EntityId::parse(&id, "User")?;
    let target = BookmarkTarget::parse(&kind, &target_id)?;
    let status = state.repository.toggle_bookmark(user_id, target).await?;
    Ok(Json(json!({ "status": status })))
}

// Dashboard

#[derive(Debug, Serialize)]
struct DashboardCounts {
    users: i64,
    notes: i64,
    articles: i64,
    pradesh: i64,
    model_sets: i64,
    quizzes: i64,
    jobs: i64,
}

async fn dashboard(State(state): State<SharedState>) -> Result<Json<DashboardCounts>> {
    let repository = &state.repository;
    Ok(Json(DashboardCounts {
        users: repository.count::<User>().await?,
        notes: repository.count::<Note>().await?,
        articles: repository.count::<Article>().await?,
        pradesh: repository.count::<Pradesh>().await?,
        model_sets: repository.count::<ModelSet>().await?,
        quizzes: repository.count::<Quiz>().await?,
        jobs: repository.count::<Job>().await?,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tokio_test::assert_ok;

    use super::super::testing::*;
    use crate::models::{Job, Quiz, Role, User};

    const JOB: [(&str, &str); 7] = [
        ("title", "Section Officer"),
        ("position", "Officer"),
        ("vacancies", "3"),
        ("opening_date", "2026-02-01"),
        ("application_deadline", "2026-03-01"),
        ("job_type", "job"),
        ("location", "Kathmandu"),
    ];

    async fn user_id(app: &axum::Router, username: &str) -> String {
        let (status, _) = post_form(
            app,
            "/manage/users",
            &[("username", username), ("email", "ram@example.com")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, listing) = get_json(app, "/manage/users").await;
        let users = listing["items"].as_array().unwrap();
        let user = users.iter().find(|u| u["username"] == username).unwrap();
        user["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn job_board_lifecycle() {
        let (app, state) = app().await;
        let (status, location) = post_form(&app, "/manage/jobs", &JOB).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with("/manage/jobs?notice="));

        let (_, board) = get_json(&app, "/jobs").await;
        let job = &board["jobs"][0];
        assert_eq!(job["title"], "Section Officer");
        assert_eq!(job["vacancies"], 3);
        assert_eq!(job["opening_date"], "2026-02-01");
        assert_eq!(job["job_type"], "job");
        let id = job["id"].as_str().unwrap().to_string();

        let mut edited = JOB.to_vec();
        edited[0] = ("title", "Nayab Subba");
        let (status, _) = post_form(&app, &format!("/manage/jobs/{id}/edit"), &edited).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, job) = get_json(&app, &format!("/manage/jobs/{id}/edit")).await;
        assert_eq!(job["title"], "Nayab Subba");
        assert_eq!(job["posted_at"], board["jobs"][0]["posted_at"]);

        let mut backwards = JOB.to_vec();
        backwards[4] = ("application_deadline", "2026-01-01");
        let (status, body) = post_form(&app, "/manage/jobs", &backwards).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("Application deadline"));
        assert_eq!(assert_ok!(state.repository.count::<Job>().await), 1);
    }

    #[tokio::test]
    async fn profile_lists_messages_sent_from_the_users_email() {
        let (app, _) = app().await;
        let id = user_id(&app, "ram").await;

        let (status, location) = post_form(
            &app,
            "/contact",
            &[
                ("first_name", "Ram"),
                ("last_name", "Thapa"),
                ("email", "ram@example.com"),
                ("message", "When is the next exam?"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with("/contact?notice="));
        post_form(
            &app,
            "/contact",
            &[("email", "sita@example.com"), ("message", "Hello")],
        )
        .await;

        let (_, profile) = get_json(&app, &format!("/users/{id}/profile")).await;
        assert_eq!(profile["user"]["username"], "ram");
        let messages = profile["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["name"], "Ram Thapa");

        let message_id = messages[0]["id"].as_str().unwrap().to_string();
        let (status, _) = post_form(
            &app,
            &format!("/manage/messages/{message_id}/reply"),
            &[("reply", "Next month.")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, inbox) = get_json(&app, "/manage/messages").await;
        assert_eq!(inbox["items"][0]["reply"], "Next month.");
        assert!(inbox["items"][1]["reply"].is_null());
    }

    #[tokio::test]
    async fn profile_edit_and_admin_promotion() {
        let (app, state) = app().await;
        let id = user_id(&app, "sita").await;

        let (status, location) = post_form(
            &app,
            &format!("/users/{id}/profile/edit"),
            &[
                ("first_name", "Sita"),
                ("last_name", "Rai"),
                ("email", "sita@example.com"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with(&format!("/users/{id}/profile?notice=")));

        let (status, _) = post_form(&app, &format!("/manage/users/{id}/make-admin"), &[]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let user = assert_ok!(state.repository.find_user("sita").await).unwrap();
        assert_eq!(user.first_name, "Sita");
        assert_eq!(user.email, "sita@example.com");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let (app, state) = app().await;
        user_id(&app, "ram").await;
        let (status, body) = post_form(
            &app,
            "/manage/users",
            &[("username", "ram"), ("email", "other@example.com")],
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("already exists"));
        assert_eq!(assert_ok!(state.repository.count::<User>().await), 1);
    }

    #[tokio::test]
    async fn bookmarks_toggle_and_list() {
        let (app, state) = app().await;
        let id = user_id(&app, "ram").await;
        post_form(
            &app,
            "/manage/quizzes",
            &[("title", "GK Quiz"), ("topic", "GK"), ("level", "easy")],
        )
        .await;
        let quizzes = assert_ok!(state.repository.list::<Quiz>().await);
        let toggle = format!("/users/{id}/bookmarks/quiz/{}", quizzes[0].id);

        let (status, body) = post_form(&app, &toggle, &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"added\""));

        let (_, listing) = get_json(&app, &format!("/users/{id}/bookmarks")).await;
        assert_eq!(listing["bookmarks"][0]["kind"], "quiz");
        assert_eq!(listing["bookmarks"][0]["item"]["title"], "GK Quiz");

        let (_, body) = post_form(&app, &toggle, &[]).await;
        assert!(body.contains("\"removed\""));
        let (_, listing) = get_json(&app, &format!("/users/{id}/bookmarks")).await;
        assert_eq!(listing["bookmarks"].as_array().unwrap().len(), 0);

        let (status, _) = post_form(&app, &format!("/users/{id}/bookmarks/user/{id}"), &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_counts_entities() {
        let (app, _) = app().await;
        user_id(&app, "ram").await;
        post_form(&app, "/manage/jobs", &JOB).await;
        post_form(&app, "/manage/model-sets", &[("title", "Set 1")]).await;

        let (status, counts) = get_json(&app, "/manage/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts["users"], 1);
        assert_eq!(counts["jobs"], 1);
        assert_eq!(counts["model_sets"], 1);
        assert_eq!(counts["notes"], 0);
    }
}
