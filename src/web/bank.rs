use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    delete_and_redirect, delete_child_and_redirect, load, redirect_notice, Flash, Listing,
    SharedState,
};
use crate::error::{AppError, Result};
use crate::forms::{FormData, McqInput, ObjectiveSetInput, QaInput, SubjectInput};
use crate::models::{
    EntityId, ObjectiveMcq, ObjectiveSet, ObjectiveSubject, SubjectiveChapter, SubjectiveQa,
    SubjectiveSubject,
};

const MANAGE_OBJECTIVES: &str = "/manage/objectives";
const MANAGE_SUBJECTIVES: &str = "/manage/subjectives";

fn sets_path(subject_id: EntityId) -> String {
    format!("{MANAGE_OBJECTIVES}/{subject_id}/sets")
}

fn mcqs_path(set_id: EntityId) -> String {
    format!("/manage/objective-sets/{set_id}/mcqs")
}

fn chapters_path(subject_id: EntityId) -> String {
    format!("{MANAGE_SUBJECTIVES}/{subject_id}/chapters")
}

fn qas_path(chapter_id: EntityId) -> String {
    format!("/manage/chapters/{chapter_id}/qas")
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/objectives", get(objectives))
        .route("/objectives/{id}", get(objective_subject))
        .route("/objectives/sets/{id}", get(objective_set))
        .route("/subjectives", get(subjectives))
        .route("/subjectives/{id}", get(subjective_subject))
        .route("/subjectives/{id}/chapters/{chapter_id}", get(subjective_chapter))
        .route(MANAGE_OBJECTIVES, get(manage_objectives).post(create_objective_subject))
        .route("/manage/objectives/{id}/edit", get(objective_subject).post(update_objective_subject))
        .route("/manage/objectives/{id}/delete", get(delete_objective_subject).post(delete_objective_subject))
        .route("/manage/objectives/{id}/sets", get(manage_objective_sets).post(create_objective_set))
        .route("/manage/objective-sets/{id}/edit", get(objective_set).post(update_objective_set))
        .route("/manage/objective-sets/{id}/delete", get(delete_objective_set).post(delete_objective_set))
        .route("/manage/objective-sets/{id}/mcqs", get(manage_mcqs).post(create_mcq))
        .route("/manage/mcqs/{id}/edit", get(mcq_detail).post(update_mcq))
        .route("/manage/mcqs/{id}/delete", get(delete_mcq).post(delete_mcq))
        .route(MANAGE_SUBJECTIVES, get(manage_subjectives).post(create_subjective_subject))
        .route("/manage/subjectives/{id}/edit", get(subjective_subject).post(update_subjective_subject))
        .route("/manage/subjectives/{id}/delete", get(delete_subjective_subject).post(delete_subjective_subject))
        .route("/manage/subjectives/{id}/chapters", get(manage_chapters).post(create_chapter))
        .route("/manage/chapters/{id}/edit", get(chapter_detail).post(update_chapter))
        .route("/manage/chapters/{id}/delete", get(delete_chapter).post(delete_chapter))
        .route("/manage/chapters/{id}/qas", get(manage_qas).post(create_qas))
        .route("/manage/qas/{id}/edit", get(qa_detail).post(update_qa))
        .route("/manage/qas/{id}/delete", get(delete_qa).post(delete_qa))
}

/// A parent record together with its direct children.
#[derive(Debug, Serialize)]
struct Branch<P, C> {
    #[serde(flatten)]
    flash: Flash,
    #[serde(flatten)]
    parent: P,
    children: Vec<C>,
}

impl<P, C> Branch<P, C> {
    fn new(parent: P, children: Vec<C>) -> Self {
        Self {
            flash: Flash::default(),
            parent,
            children,
        }
    }

    fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = flash;
        self
    }
}

// Objective bank

async fn objectives(State(state): State<SharedState>) -> Result<Json<Value>> {
    let subjects = state.repository.list::<ObjectiveSubject>().await?;
    Ok(Json(json!({ "subjects": subjects })))
}

async fn subject_with_sets(
    state: &SharedState,
    raw_id: &str,
) -> Result<Branch<ObjectiveSubject, ObjectiveSet>> {
    let subject: ObjectiveSubject = load(state, raw_id).await?;
    let sets = state.repository.list_by("subject_id", subject.id).await?;
    Ok(Branch::new(subject, sets))
}

async fn set_with_mcqs(state: &SharedState, raw_id: &str) -> Result<Branch<ObjectiveSet, ObjectiveMcq>> {
    let set: ObjectiveSet = load(state, raw_id).await?;
    let mcqs = state.repository.list_by("set_id", set.id).await?;
    Ok(Branch::new(set, mcqs))
}

async fn objective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Branch<ObjectiveSubject, ObjectiveSet>>> {
    Ok(Json(subject_with_sets(&state, &id).await?))
}

async fn objective_set(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Branch<ObjectiveSet, ObjectiveMcq>>> {
    Ok(Json(set_with_mcqs(&state, &id).await?))
}

async fn manage_objectives(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<ObjectiveSubject>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_objective_subject(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = SubjectInput::from_form(&form)?;
    state
        .repository
        .insert(ObjectiveSubject::new(input.name, input.description))
        .await?;
    Ok(redirect_notice(MANAGE_OBJECTIVES, "Subject added successfully!"))
}

async fn update_objective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut subject: ObjectiveSubject = load(&state, &id).await?;
    let input = SubjectInput::from_form(&form)?;
    subject.name = input.name;
    subject.description = input.description;
    subject.updated_at = Utc::now();
    state.repository.update(subject).await?;
    Ok(redirect_notice(MANAGE_OBJECTIVES, "Subject updated successfully!"))
}

async fn delete_objective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    delete_and_redirect::<ObjectiveSubject>(
        &state,
        &id,
        MANAGE_OBJECTIVES,
        "Subject deleted successfully!",
    )
    .await
}

async fn manage_objective_sets(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<Branch<ObjectiveSubject, ObjectiveSet>>> {
    Ok(Json(subject_with_sets(&state, &id).await?.with_flash(flash)))
}

async fn create_objective_set(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let subject_id = EntityId::parse(&id, "Subject")?;
    let input = ObjectiveSetInput::from_form(&form)?;
    state
        .repository
        .insert(ObjectiveSet::new(subject_id, input.title, input.description))
        .await?;
    Ok(redirect_notice(&sets_path(subject_id), "Set added successfully!"))
}

async fn update_objective_set(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut set: ObjectiveSet = load(&state, &id).await?;
    let input = ObjectiveSetInput::from_form(&form)?;
    set.title = input.title;
    set.description = input.description;
    set.updated_at = Utc::now();
    let back = sets_path(set.subject_id);
    state.repository.update(set).await?;
    Ok(redirect_notice(&back, "Set updated successfully!"))
}

async fn delete_objective_set(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_child_and_redirect::<ObjectiveSet>(
        &state,
        &id,
        MANAGE_OBJECTIVES,
        |set| sets_path(set.subject_id),
        "Set deleted successfully!",
    )
    .await
}

async fn manage_mcqs(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<Branch<ObjectiveSet, ObjectiveMcq>>> {
    Ok(Json(set_with_mcqs(&state, &id).await?.with_flash(flash)))
}

async fn create_mcq(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let set_id = EntityId::parse(&id, "Set")?;
    let input = McqInput::from_form(&form)?;
    state
        .repository
        .insert(ObjectiveMcq::new(
            set_id,
            input.question,
            input.options,
            input.correct_answer,
            input.explanation,
        ))
        .await?;
    Ok(redirect_notice(&mcqs_path(set_id), "MCQ added successfully!"))
}

async fn mcq_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<ObjectiveMcq>> {
    Ok(Json(load(&state, &id).await?))
}

async fn update_mcq(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut mcq: ObjectiveMcq = load(&state, &id).await?;
    let input = McqInput::from_form(&form)?;
    mcq.question = input.question;
    mcq.options = input.options;
    mcq.correct_answer = input.correct_answer;
    mcq.explanation = input.explanation;
    mcq.updated_at = Utc::now();
    let back = mcqs_path(mcq.set_id);
    state.repository.update(mcq).await?;
    Ok(redirect_notice(&back, "MCQ updated successfully!"))
}

async fn delete_mcq(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_child_and_redirect::<ObjectiveMcq>(
        &state,
        &id,
        MANAGE_OBJECTIVES,
        |mcq| mcqs_path(mcq.set_id),
        "MCQ deleted successfully!",
    )
    .await
}

// Subjective bank

#[derive(Debug, Serialize)]
struct SubjectTree {
    #[serde(flatten)]
    subject: SubjectiveSubject,
    chapters: Vec<Branch<SubjectiveChapter, SubjectiveQa>>,
}

async fn subjectives(State(state): State<SharedState>) -> Result<Json<Value>> {
    let mut tree = Vec::new();
    for subject in state.repository.list::<SubjectiveSubject>().await? {
        let mut chapters = Vec::new();
        for chapter in state
            .repository
            .list_by::<SubjectiveChapter>("subject_id", subject.id)
            .await?
        {
            let qas = state.repository.list_by("chapter_id", chapter.id).await?;
            chapters.push(Branch::new(chapter, qas));
        }
        tree.push(SubjectTree { subject, chapters });
    }
    Ok(Json(json!({ "subjects": tree })))
}

async fn subject_with_chapters(
    state: &SharedState,
    raw_id: &str,
) -> Result<Branch<SubjectiveSubject, SubjectiveChapter>> {
    let subject: SubjectiveSubject = load(state, raw_id).await?;
    let chapters = state.repository.list_by("subject_id", subject.id).await?;
    Ok(Branch::new(subject, chapters))
}

async fn chapter_with_qas(
    state: &SharedState,
    raw_id: &str,
) -> Result<Branch<SubjectiveChapter, SubjectiveQa>> {
    let chapter: SubjectiveChapter = load(state, raw_id).await?;
    let qas = state.repository.list_by("chapter_id", chapter.id).await?;
    Ok(Branch::new(chapter, qas))
}

async fn subjective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Branch<SubjectiveSubject, SubjectiveChapter>>> {
    Ok(Json(subject_with_chapters(&state, &id).await?))
}

#[derive(Debug, Serialize)]
struct ChapterPage {
    subject: SubjectiveSubject,
    chapter: Branch<SubjectiveChapter, SubjectiveQa>,
}

async fn subjective_chapter(
    State(state): State<SharedState>,
    Path((subject_id, chapter_id)): Path<(String, String)>,
) -> Result<Json<ChapterPage>> {
    let subject: SubjectiveSubject = load(&state, &subject_id).await?;
    let chapter = chapter_with_qas(&state, &chapter_id).await?;
    if chapter.parent.subject_id != subject.id {
        return Err(AppError::NotFound("Chapter"));
    }
    Ok(Json(ChapterPage { subject, chapter }))
}

async fn manage_subjectives(
    State(state): State<SharedState>,
    Query(flash): Query<Flash>,
) -> Result<Json<Listing<SubjectiveSubject>>> {
    Ok(Json(Listing::new(flash, state.repository.list().await?)))
}

async fn create_subjective_subject(State(state): State<SharedState>, form: FormData) -> Result<Redirect> {
    let input = SubjectInput::from_form(&form)?;
    state
        .repository
        .insert(SubjectiveSubject::new(input.name))
        .await?;
    Ok(redirect_notice(MANAGE_SUBJECTIVES, "Subject added successfully!"))
}

async fn update_subjective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut subject: SubjectiveSubject = load(&state, &id).await?;
    subject.name = SubjectInput::from_form(&form)?.name;
    state.repository.update(subject).await?;
    Ok(redirect_notice(MANAGE_SUBJECTIVES, "Subject updated successfully!"))
}

async fn delete_subjective_subject(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    delete_and_redirect::<SubjectiveSubject>(
        &state,
        &id,
        MANAGE_SUBJECTIVES,
        "Subject deleted successfully!",
    )
    .await
}

async fn manage_chapters(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<Branch<SubjectiveSubject, SubjectiveChapter>>> {
    Ok(Json(subject_with_chapters(&state, &id).await?.with_flash(flash)))
}

async fn create_chapter(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let subject_id = EntityId::parse(&id, "Subject")?;
    let name = SubjectInput::from_form(&form)?.name;
    state
        .repository
        .insert(SubjectiveChapter::new(subject_id, name))
        .await?;
    Ok(redirect_notice(&chapters_path(subject_id), "Chapter added successfully!"))
}

async fn chapter_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Branch<SubjectiveChapter, SubjectiveQa>>> {
    Ok(Json(chapter_with_qas(&state, &id).await?))
}

async fn update_chapter(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut chapter: SubjectiveChapter = load(&state, &id).await?;
    chapter.name = SubjectInput::from_form(&form)?.name;
    let back = chapters_path(chapter.subject_id);
    state.repository.update(chapter).await?;
    Ok(redirect_notice(&back, "Chapter updated successfully!"))
}

async fn delete_chapter(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_child_and_redirect::<SubjectiveChapter>(
        &state,
        &id,
        MANAGE_SUBJECTIVES,
        |chapter| chapters_path(chapter.subject_id),
        "Chapter deleted successfully!",
    )
    .await
}

async fn manage_qas(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Json<Branch<SubjectiveChapter, SubjectiveQa>>> {
    Ok(Json(chapter_with_qas(&state, &id).await?.with_flash(flash)))
}

/// Adds every complete question/answer pair sent for the chapter.
async fn create_qas(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let chapter: SubjectiveChapter = load(&state, &id).await?;
    let qas: Vec<SubjectiveQa> = form
        .qa_pairs(false)
        .into_iter()
        .map(|(question, answer)| SubjectiveQa::new(chapter.id, question, answer))
        .collect();
    if qas.is_empty() {
        return Err(AppError::validation(
            "Please provide at least one question with an answer.",
        ));
    }
    let count = state.repository.insert_many(qas).await?;
    Ok(redirect_notice(
        &qas_path(chapter.id),
        &format!("{count} Q&A(s) added successfully!"),
    ))
}

async fn qa_detail(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Json<SubjectiveQa>> {
    Ok(Json(load(&state, &id).await?))
}

async fn update_qa(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    form: FormData,
) -> Result<Redirect> {
    let mut qa: SubjectiveQa = load(&state, &id).await?;
    let input = QaInput::from_form(&form)?;
    qa.question = input.question;
    qa.answer = input.answer;
    let back = qas_path(qa.chapter_id);
    state.repository.update(qa).await?;
    Ok(redirect_notice(&back, "Q&A updated successfully!"))
}

async fn delete_qa(State(state): State<SharedState>, Path(id): Path<String>) -> Result<Redirect> {
    delete_child_and_redirect::<SubjectiveQa>(
        &state,
        &id,
        MANAGE_SUBJECTIVES,
        |qa| qas_path(qa.chapter_id),
        "Q&A deleted successfully!",
    )
    .await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tokio_test::assert_ok;

    use super::super::testing::*;
    use crate::models::{
        ObjectiveMcq, ObjectiveSet, ObjectiveSubject, SubjectiveChapter, SubjectiveQa,
        SubjectiveSubject,
    };

    async fn last_id(app: &axum::Router, uri: &str, key: &str) -> String {
        let (status, body) = get_json(app, uri).await;
        assert_eq!(status, StatusCode::OK);
        let items = body[key].as_array().unwrap();
        items.last().unwrap()["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn deleting_a_subject_removes_its_chapters_and_qas() {
        let (app, state) = app().await;

        let (status, _) = post_form(&app, "/manage/subjectives", &[("name", "History")]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let subject_id = last_id(&app, "/manage/subjectives", "items").await;

        let (status, location) = post_form(
            &app,
            &format!("/manage/subjectives/{subject_id}/chapters"),
            &[("name", "Ancient")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with(&format!("/manage/subjectives/{subject_id}/chapters?notice=")));
        let chapter_id =
            last_id(&app, &format!("/manage/subjectives/{subject_id}/chapters"), "children").await;

        let (status, _) = post_form(
            &app,
            &format!("/manage/chapters/{chapter_id}/qas"),
            &[("question", "Q1"), ("answer", "A1")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);

        let (_, page) = get_json(
            &app,
            &format!("/subjectives/{subject_id}/chapters/{chapter_id}"),
        )
        .await;
        assert_eq!(page["subject"]["name"], "History");
        assert_eq!(page["chapter"]["name"], "Ancient");
        assert_eq!(page["chapter"]["children"][0]["question"], "Q1");
        assert_eq!(page["chapter"]["children"][0]["answer"], "A1");

        let (status, location) =
            post_form(&app, &format!("/manage/subjectives/{subject_id}/delete"), &[]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with("/manage/subjectives?notice="));

        let repository = &state.repository;
        assert_eq!(assert_ok!(repository.count::<SubjectiveSubject>().await), 0);
        assert_eq!(assert_ok!(repository.count::<SubjectiveChapter>().await), 0);
        assert_eq!(assert_ok!(repository.count::<SubjectiveQa>().await), 0);
    }

    #[tokio::test]
    async fn bulk_qas_keep_only_complete_pairs() {
        let (app, state) = app().await;
        post_form(&app, "/manage/subjectives", &[("name", "Geography")]).await;
        let subject_id = last_id(&app, "/manage/subjectives", "items").await;
        post_form(
            &app,
            &format!("/manage/subjectives/{subject_id}/chapters"),
            &[("name", "Rivers")],
        )
        .await;
        let chapter_id = last_id(&app, &format!("/subjectives/{subject_id}"), "children").await;

        let (status, location) = post_form(
            &app,
            &format!("/manage/chapters/{chapter_id}/qas"),
            &[
                ("question", "Longest river?"),
                ("answer", "Karnali"),
                ("question", "Unanswered"),
                ("answer", "  "),
                ("question", ""),
                ("answer", "Orphan"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.contains("1%20Q%26A%28s%29%20added"));
        assert_eq!(assert_ok!(state.repository.count::<SubjectiveQa>().await), 1);

        let (status, _) = post_form(
            &app,
            &format!("/manage/chapters/{chapter_id}/qas"),
            &[("question", "Only a question"), ("answer", "")],
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn chapters_must_belong_to_the_subject() {
        let (app, _) = app().await;
        post_form(&app, "/manage/subjectives", &[("name", "History")]).await;
        post_form(&app, "/manage/subjectives", &[("name", "Science")]).await;
        let (_, listing) = get_json(&app, "/manage/subjectives").await;
        let history = listing["items"][0]["id"].as_str().unwrap().to_string();
        let science = listing["items"][1]["id"].as_str().unwrap().to_string();

        post_form(
            &app,
            &format!("/manage/subjectives/{history}/chapters"),
            &[("name", "Medieval")],
        )
        .await;
        let chapter_id = last_id(&app, &format!("/subjectives/{history}"), "children").await;

        let (status, _) =
            get_json(&app, &format!("/subjectives/{history}/chapters/{chapter_id}")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            get_json(&app, &format!("/subjectives/{science}/chapters/{chapter_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Chapter not found");

        let (_, tree) = get_json(&app, "/subjectives").await;
        assert_eq!(tree["subjects"][0]["chapters"][0]["name"], "Medieval");
        assert_eq!(tree["subjects"][1]["chapters"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn objective_bank_lifecycle() {
        let (app, state) = app().await;
        post_form(
            &app,
            "/manage/objectives",
            &[("name", "Constitution"), ("description", "Articles and parts")],
        )
        .await;
        let subject_id = last_id(&app, "/objectives", "subjects").await;

        let (status, _) = post_form(
            &app,
            &format!("/manage/objectives/{subject_id}/sets"),
            &[("title", "Set 1")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let set_id = last_id(&app, &format!("/objectives/{subject_id}"), "children").await;

        let (status, location) = post_form(
            &app,
            &format!("/manage/objective-sets/{set_id}/mcqs"),
            &[
                ("question", "How many provinces?"),
                ("option_a", "5"),
                ("option_b", "6"),
                ("option_c", "7"),
                ("option_d", "8"),
                ("correct_answer", "C"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with(&format!("/manage/objective-sets/{set_id}/mcqs?notice=")));

        let (_, set) = get_json(&app, &format!("/objectives/sets/{set_id}")).await;
        assert_eq!(set["title"], "Set 1");
        assert_eq!(set["children"][0]["option_c"], "7");
        assert_eq!(set["children"][0]["correct_answer"], "C");

        let subject = assert_ok!(
            state
                .repository
                .get::<ObjectiveSubject>(subject_id.parse().unwrap())
                .await
        );
        let (status, _) = post_form(
            &app,
            &format!("/manage/objectives/{subject_id}/edit"),
            &[("name", "Constitution of Nepal")],
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let edited = assert_ok!(state.repository.get::<ObjectiveSubject>(subject.id).await);
        assert_eq!(edited.name, "Constitution of Nepal");
        assert_eq!(edited.description, "");
        assert!(edited.updated_at >= subject.updated_at);
        assert_eq!(edited.created_at, subject.created_at);

        let (status, location) =
            post_form(&app, &format!("/manage/objective-sets/{set_id}/delete"), &[]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert!(location.starts_with(&format!("/manage/objectives/{subject_id}/sets?notice=")));
        assert_eq!(assert_ok!(state.repository.count::<ObjectiveSet>().await), 0);
        assert_eq!(assert_ok!(state.repository.count::<ObjectiveMcq>().await), 0);
    }

    #[tokio::test]
    async fn unknown_children_redirect_with_an_error() {
        let (app, _) = app().await;
        let unknown = crate::models::EntityId::generate();

        let (status, location) =
            post_form(&app, &format!("/manage/mcqs/{unknown}/delete"), &[]).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, "/manage/objectives?error=MCQ%20not%20found%21");

        let (status, _) = post_form(
            &app,
            &format!("/manage/subjectives/{unknown}/chapters"),
            &[("name", "Orphan")],
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
