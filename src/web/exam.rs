use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    delete_and_redirect, delete_child_and_redirect, load, redirect_notice, Flash, Listing,
    SharedState,
};
use crate::error::{AppError, Result};
use crate::forms::{CategoryInput, FormData, ModelSetInput, QuestionInput, QuizInput};
use crate::models::{Attempt, Category, EntityId, ModelSet, ModelSetQuestion, Quiz};
use crate::quiz::{self, QuestionSheet, Score};
use crate::services::storage::UploadFolder;

const MANAGE_CATEGORIES: &str = "/manage/categories";
const MANAGE_MODEL_SETS: &str = "/manage/model-sets";
const MANAGE_QUIZZES: &str = "/manage/quizzes";

fn questions_path(model_set_id: EntityId) -> String {
    format!("{MANAGE_MODEL_SETS}/{model_set_id}/questions")
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/model-sets", get(model_sets))
        .route("/model-sets/categories", get(categories))
        .route("/model-sets/categories/{id}", get(category_detail))
        .route("/model-sets/{id}", get(model_set_start))
        .route("/model-sets/{id}/test", get(start_test).post(submit_test))
        .route("/quizzes", get(quizzes))
        .route(MANAGE_CATEGORIES, get(manage_categories).post(create_category))
        .route("/manage/categories/{id}/edit", get(category_detail).post(update_category))
        .route("/manage/categories/{id}/delete", get(delete_category).post(delete_category))
        .route(MANAGE_MODEL_SETS, get(manage_model_sets).post(create_model_set))
        .route("/manage/model-sets/{id}/edit", get(model_set_start).post(update_model_set))
        .route("/manage/model-sets/{id}/delete", get(delete_model_set).post(delete_model_set))
        .route("/manage/model-sets/{id}/questions", get(manage_questions).post(create_question))
        .route("/manage/model-sets/{id}/questions/bulk", post(bulk_add_questions))
        .route("/manage/questions/{id}/edit", get(question_detail).post(update_question))
        .route("/manage/questions/{id}/delete", get(delete_question).post(delete_question))
        .route(MANAGE_QUIZZES, get(manage_quizzes).post(create_quiz))
        .route("/manage/quizzes/{id}/delete", get(delete_quiz).post(delete_quiz))
}

// Categories

async fn categories(State(state): State<SharedState>) -> Result<Json<Value>> {
    let categories = state.repository.list::<Category>().await?;
    Ok(Json(json!({ "categories": categories })))
}

#[derive(Debug, Serialize)]
struct CategoryDetail {
    #[serde(flatten)]
    category: Category,
    model_sets: Vec<ModelSet>,
}

async fn category_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryDetail>> {
    let category: Category = load(&state, &id).await?;
    let model_sets = state
        .repository
        .list_by("category_id", category.id)
        .await?;
    Ok(Json(CategoryDetail {
        category,
        model_sets,
    }))
}

async fn manage_categories(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Category>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_category(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = CategoryInput::from_form(&form)?;
    state
        .repository
        .insert(Category::new(input.name, input.description))
        .await?;
    Ok(redirect_notice(MANAGE_CATEGORIES, "Category added successfully!"))
}

async fn update_category(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut category: Category = load(&state, &id).await?;
    let input = CategoryInput::from_form(&form)?;
    category.name = input.name;
    category.description = input.description;
    state.repository.update(category).await?;
    Ok(redirect_notice(MANAGE_CATEGORIES, "Category updated successfully!"))
}

async fn delete_category(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<Category>(
        &state,
        &id,
        MANAGE_CATEGORIES,
        "Category deleted successfully!",
    )
    .await
}

// Model sets

fn build_model_set(id: EntityId, input: ModelSetInput, file_url: Option<String>) -> ModelSet {
    ModelSet {
        id,
        category_id: input.category_id,
        title: input.title,
        description: input.description,
        timer_hours: input.timer_hours,
        timer_minutes: input.timer_minutes,
        timer_seconds: input.timer_seconds,
        file_url,
        interactive_url: input.interactive_url,
    }
}

async fn model_sets(State(state): State<SharedState>) -> Result<Json<Value>> {
    let model_sets = state.repository.list::<ModelSet>().await?;
    Ok(Json(json!({ "model_sets": model_sets })))
}

#[derive(Debug, Serialize)]
struct ModelSetOverview {
    #[serde(flatten)]
    model_set: ModelSet,
    question_count: usize,
    total_seconds: u64,
}

async fn model_set_start(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ModelSetOverview>> {
    let model_set: ModelSet = load(&state, &id).await?;
    let questions = state
        .repository
        .list_by::<ModelSetQuestion>("model_set_id", model_set.id)
        .await?;
    Ok(Json(ModelSetOverview {
        total_seconds: model_set.time_limit_seconds(),
        question_count: questions.len(),
        model_set,
    }))
}

#[derive(Debug, Serialize)]
struct ModelSetAdmin {
    #[serde(flatten)]
    listing: Listing<ModelSet>,
    categories: Vec<Category>,
}

async fn manage_model_sets(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<ModelSetAdmin>> {
    Ok(Json(ModelSetAdmin {
        listing: Listing::new(flash, state.repository.list().await?),
        categories: state.repository.list().await?,
    }))
}

// Checked before any upload so a bad category leaves no orphan file.
async fn ensure_category(state: &SharedState, input: &ModelSetInput) -> Result<()> {
    if let Some(category_id) = input.category_id {
        if !state.repository.exists::<Category>(category_id).await? {
            return Err(AppError::NotFound("Category"));
        }
    }
    Ok(())
}

async fn create_model_set(State(state): State<SharedState>, mut form: FormData) -> Result<Redirect> {
    let input = ModelSetInput::from_form(&form)?;
    ensure_category(&state, &input).await?;
    let file_url = state
        .upload(&mut form, "file", UploadFolder::ModelSets)
        .await?;
    state
        .repository
        .insert(build_model_set(EntityId::generate(), input, file_url))
        .await?;
    Ok(redirect_notice(MANAGE_MODEL_SETS, "Model Set added successfully!"))
}

async fn update_model_set(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut form: FormData,
) -> Result<Redirect> {
    let existing: ModelSet = load(&state, &id).await?;
    let input = ModelSetInput::from_form(&form)?;
    ensure_category(&state, &input).await?;
    let file_url = state
        .upload(&mut form, "file", UploadFolder::ModelSets)
        .await?
        .or(existing.file_url);
    state
        .repository
        .update(build_model_set(existing.id, input, file_url))
        .await?;
    Ok(redirect_notice(MANAGE_MODEL_SETS, "Model Set updated successfully!"))
}

async fn delete_model_set(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<ModelSet>(
        &state,
        &id,
        MANAGE_MODEL_SETS,
        "Model Set deleted successfully!",
    )
    .await
}

// Questions

#[derive(Debug, Serialize)]
struct QuestionAdmin {
    #[serde(flatten)]
    flash: Flash,
    model_set: ModelSet,
    questions: Vec<ModelSetQuestion>,
}

async fn manage_questions(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<QuestionAdmin>> {
    let model_set: ModelSet = load(&state, &id).await?;
    let questions = state
        .repository
        .list_by("model_set_id", model_set.id)
        .await?;
    Ok(Json(QuestionAdmin {
        flash,
        model_set,
        questions,
    }))
}

async fn create_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let model_set_id = EntityId::parse(&id, "Model Set")?;
    let input = QuestionInput::from_form(&form)?;
    state
        .repository
        .insert(input.into_question(model_set_id))
        .await?;
    Ok(redirect_notice(
        &questions_path(model_set_id),
        "Question added successfully!",
    ))
}

async fn bulk_add_questions(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let model_set: ModelSet = load(&state, &id).await?;
    let questions: Vec<ModelSetQuestion> = QuestionInput::bulk_from_form(&form)?
        .into_iter()
        .map(|input| input.into_question(model_set.id))
        .collect();
    let count = state.repository.insert_many(questions).await?;
    tracing::info!("Added {} question(s) to {}", count, model_set.title);
    Ok(redirect_notice(
        &questions_path(model_set.id),
        &format!("{count} questions added successfully!"),
    ))
}

async fn question_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ModelSetQuestion>> {
    Ok(Json(load(&state, &id).await?))
}

async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut question: ModelSetQuestion = load(&state, &id).await?;
    let input = QuestionInput::from_form(&form)?;
    question.question_text = input.question_text;
    question.options = input.options;
    question.correct_option = input.correct_option;
    question.explanation = input.explanation;
    let back = questions_path(question.model_set_id);
    state.repository.update(question).await?;
    Ok(redirect_notice(&back, "Question updated successfully!"))
}

async fn delete_question(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_child_and_redirect::<ModelSetQuestion>(
        &state,
        &id,
        MANAGE_MODEL_SETS,
        |question| questions_path(question.model_set_id),
        "Question deleted successfully!",
    )
    .await
}

// Timed test

#[derive(Debug, Serialize)]
struct TestSheet {
    attempt: EntityId,
    model_set: ModelSet,
    total_seconds: u64,
    questions: Vec<QuestionSheet>,
}

async fn start_test(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<TestSheet>> {
    let model_set: ModelSet = load(&state, &id).await?;
    let questions = state
        .repository
        .list_by::<ModelSetQuestion>("model_set_id", model_set.id)
        .await?;
    let attempt = state
        .repository
        .start_attempt(model_set.id, Utc::now(), state.config.attempt_ttl())
        .await?;
    tracing::info!("Started attempt {} on {}", attempt.id, model_set.title);

    Ok(Json(TestSheet {
        attempt: attempt.id,
        total_seconds: model_set.time_limit_seconds(),
        questions: questions.iter().map(QuestionSheet::from).collect(),
        model_set,
    }))
}

#[derive(Debug, Serialize)]
struct TestResult {
    model_set: ModelSet,
    #[serde(flatten)]
    score: Score,
    elapsed: i64,
    overtime: bool,
}

async fn submit_test(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Json<TestResult>> {
    let model_set: ModelSet = load(&state, &id).await?;
    let now = Utc::now();

    let attempt = match form
        .optional("attempt")
        .and_then(|raw| EntityId::parse(&raw, "Attempt").ok())
    {
        Some(attempt_id) => state.repository.find::<Attempt>(attempt_id).await?,
        None => None,
    };
    let attempt = quiz::check_open(attempt, model_set.id, now, state.config.attempt_ttl())?;
    if !state.repository.close_attempt(attempt.id, now).await? {
        return Err(AppError::AttemptClosed(
            "This test attempt has already been submitted".to_string(),
        ));
    }

    let questions = state
        .repository
        .list_by::<ModelSetQuestion>("model_set_id", model_set.id)
        .await?;
    let answers: HashMap<EntityId, String> = questions
        .iter()
        .map(|q| {
            let answer = form.text(&quiz::answer_field(q.id)).unwrap_or_default();
            (q.id, answer.to_string())
        })
        .collect();

    let score = quiz::grade(&questions, &answers);
    let elapsed = attempt.elapsed(now);
    let overtime = quiz::is_overtime(&model_set, elapsed);
    tracing::info!(
        "Attempt {} scored {}/{} in {}s",
        attempt.id,
        score.score,
        score.total,
        elapsed.num_seconds()
    );

    Ok(Json(TestResult {
        model_set,
        score,
        elapsed: elapsed.num_seconds(),
        overtime,
    }))
}

// Quizzes

#[derive(Debug, Deserialize)]
struct QuizFilter {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    level: String,
}

async fn quizzes(
    State(state): State<SharedState>,
    Query(filter): Query<QuizFilter>,
) -> Result<Json<Value>> {
    let mut filters: Vec<(&'static str, rusqlite::types::Value)> = Vec::new();
    if !filter.topic.is_empty() {
        filters.push(("topic", filter.topic.clone().into()));
    }
    if !filter.level.is_empty() {
        filters.push(("level", filter.level.clone().into()));
    }
    let quizzes = state.repository.list_filtered::<Quiz>(filters).await?;
    let topics = state.repository.distinct::<Quiz>("topic").await?;
    let levels = state.repository.distinct::<Quiz>("level").await?;

    Ok(Json(json!({
        "quizzes": quizzes,
        "topics": topics,
        "levels": levels,
        "topic": filter.topic,
        "level": filter.level,
    })))
}

async fn manage_quizzes(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<Quiz>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_quiz(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = QuizInput::from_form(&form)?;
    state
        .repository
        .insert(Quiz {
            id: EntityId::generate(),
            title: input.title,
            topic: input.topic,
            level: input.level,
        })
        .await?;
    Ok(redirect_notice(MANAGE_QUIZZES, "Quiz added successfully!"))
}

async fn delete_quiz(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_and_redirect::<Quiz>(&state, &id, MANAGE_QUIZZES, "Quiz deleted successfully!").await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use super::super::testing::*;
    use crate::models::{Attempt, ModelSet, ModelSetQuestion};

    async fn set_with_questions(app: &axum::Router, correct: &[&str]) -> String {
        let (status, _) = post_form(
            app,
            "/manage/model-sets",
            &[("title", "Kharidar Set 1"), ("timer_minutes", "30")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, listing) = get_json(app, "/manage/model-sets").await;
        let items = listing["items"].as_array().unwrap();
        let set_id = items.last().unwrap()["id"].as_str().unwrap().to_string();

        for (i, option) in correct.iter().enumerate() {
            let text = format!("Question {}", i + 1);
            let (status, location) = post_form(
                app,
                &format!("/manage/model-sets/{set_id}/questions"),
                &[
                    ("question_text", text.as_str()),
                    ("option_a", "a"),
                    ("option_b", "b"),
                    ("option_c", "c"),
                    ("option_d", "d"),
                    ("correct_option", option),
                ],
            )
            .await;
            assert_eq!(status, StatusCode::SEE_OTHER);
            assert!(location.starts_with(&format!("/manage/model-sets/{set_id}/questions?notice=")));
        }
        set_id
    }

    fn answer_pairs(sheet: &Value, answers: &[&str]) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "attempt".to_string(),
            sheet["attempt"].as_str().unwrap().to_string(),
        )];
        for (question, answer) in sheet["questions"].as_array().unwrap().iter().zip(answers) {
            pairs.push((
                question["field"].as_str().unwrap().to_string(),
                answer.to_string(),
            ));
        }
        pairs
    }

    async fn submit(app: &axum::Router, set_id: &str, pairs: &[(String, String)]) -> (StatusCode, Value) {
        let borrowed: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let (status, body) = post_form(app, &format!("/model-sets/{set_id}/test"), &borrowed).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn half_right_scores_fifty_percent() {
        let (app, _) = app().await;
        let set_id = set_with_questions(&app, &["A", "B"]).await;

        let (status, sheet) = get_json(&app, &format!("/model-sets/{set_id}/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sheet["total_seconds"], 1800);
        let questions = sheet["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[0].get("correct_option").is_none());

        let (status, result) = submit(&app, &set_id, &answer_pairs(&sheet, &["A", "C"])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["score"], 1);
        assert_eq!(result["total"], 2);
        assert_eq!(result["percent"], 50.0);
        assert_eq!(result["overtime"], false);
    }

    #[tokio::test]
    async fn an_attempt_is_scored_once() {
        let (app, state) = app().await;
        let set_id = set_with_questions(&app, &["D"]).await;
        let (_, sheet) = get_json(&app, &format!("/model-sets/{set_id}/test")).await;
        let pairs = answer_pairs(&sheet, &["D"]);

        let (status, _) = submit(&app, &set_id, &pairs).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = submit(&app, &set_id, &pairs).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "This test attempt has already been submitted");
        assert_eq!(state.repository.count::<Attempt>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_or_foreign_attempts_are_closed() {
        let (app, _) = app().await;
        let set_id = set_with_questions(&app, &["A"]).await;

        let (status, _) = submit(&app, &set_id, &[]).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let other = set_with_questions(&app, &["B"]).await;
        let (_, sheet) = get_json(&app, &format!("/model-sets/{other}/test")).await;
        let (status, _) = submit(&app, &set_id, &answer_pairs(&sheet, &["A"])).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bulk_add_counts_rows() {
        let (app, state) = app().await;
        let set_id = set_with_questions(&app, &[]).await;
        let (status, location) = post_form(
            &app,
            &format!("/manage/model-sets/{set_id}/questions/bulk"),
            &[
                ("question_text", "Q1"),
                ("option_a", "a"),
                ("option_b", "b"),
                ("option_c", "c"),
                ("option_d", "d"),
                ("correct_option", "B"),
                ("explanation", "because"),
                ("question_text", "Q2"),
                ("option_a", "a"),
                ("option_b", "b"),
                ("option_c", "c"),
                ("option_d", "d"),
                ("correct_option", "C"),
                ("explanation", ""),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.contains("2%20questions%20added"));
        assert_eq!(state.repository.count::<ModelSetQuestion>().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn questions_under_unknown_sets_are_not_found() {
        let (app, state) = app().await;
        let unknown = crate::models::EntityId::generate();
        let (status, _) = post_form(
            &app,
            &format!("/manage/model-sets/{unknown}/questions"),
            &[
                ("question_text", "Q"),
                ("option_a", "a"),
                ("option_b", "b"),
                ("option_c", "c"),
                ("option_d", "d"),
                ("correct_option", "A"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(state.repository.count::<ModelSetQuestion>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_a_category_removes_its_model_sets() {
        let (app, state) = app().await;
        post_form(&app, "/manage/categories", &[("name", "Kharidar")]).await;
        let (_, categories) = get_json(&app, "/model-sets/categories").await;
        let category_id = categories["categories"][0]["id"].as_str().unwrap().to_string();

        let (status, _) = post_form(
            &app,
            "/manage/model-sets",
            &[("title", "Set A"), ("category", category_id.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, detail) = get_json(&app, &format!("/model-sets/categories/{category_id}")).await;
        assert_eq!(detail["model_sets"].as_array().unwrap().len(), 1);

        let (status, location) =
            post_form(&app, &format!("/manage/categories/{category_id}/delete"), &[]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with("/manage/categories?notice="));
        assert_eq!(state.repository.count::<ModelSet>().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn quizzes_filter_by_topic_and_level() {
        let (app, _) = app().await;
        for (title, topic, level) in [
            ("GK 1", "GK", "easy"),
            ("GK 2", "GK", "hard"),
            ("IQ 1", "IQ", "easy"),
        ] {
            let (status, _) = post_form(
                &app,
                "/manage/quizzes",
                &[("title", title), ("topic", topic), ("level", level)],
            )
            .await;
            assert_eq!(status, StatusCode::SEE_OTHER);
        }

        let (_, body) = get_json(&app, "/quizzes?topic=GK&level=easy").await;
        assert_eq!(body["quizzes"].as_array().unwrap().len(), 1);
        assert_eq!(body["quizzes"][0]["title"], "GK 1");
        assert_eq!(body["topics"], serde_json::json!(["GK", "IQ"]));
        assert_eq!(body["levels"], serde_json::json!(["easy", "hard"]));
    }

    #[tokio::test]
    async fn editing_with_an_unknown_category_skips_the_upload() {
        let (app, state) = app().await;
        post_form(&app, "/manage/model-sets", &[("title", "Set A")]).await;
        let set = state.repository.list::<ModelSet>().await.unwrap().remove(0);
        let unknown = crate::models::EntityId::generate().to_string();

        // No storage is configured, so reaching the upload would be a 502.
        let status = post_multipart(
            &app,
            &format!("/manage/model-sets/{}/edit", set.id),
            &[("title", "Set B"), ("category", unknown.as_str())],
            ("file", "set-b.pdf", b"%PDF-1.4"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let stored: ModelSet = state.repository.get(set.id).await.unwrap();
        assert_eq!(stored.title, "Set A");
    }
}
