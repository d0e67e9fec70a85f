use std::collections::HashMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;
use chrono::NaiveDate;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    AnswerOptions, Choice, EntityId, GkKind, JobType, ModelSetQuestion, Province,
};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// A submitted form, URL-encoded or multipart. Repeated keys keep every
/// value in order; file parts are kept apart from text fields.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Self::read_multipart(multipart).await
        } else {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self::from_pairs(pairs))
        }
    }
}

impl FormData {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = FormData::default();
        for (key, value) in pairs {
            form.fields.entry(key.into()).or_default().push(value.into());
        }
        form
    }

    async fn read_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    // Browsers send an empty part for a file input left blank.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    form.fields.entry(name).or_default().push(value);
                }
            }
        }
        Ok(form)
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file_name: &str, bytes: &'static [u8]) -> Self {
        self.files.insert(
            name.to_string(),
            UploadedFile {
                file_name: file_name.to_string(),
                content_type: None,
                bytes: Bytes::from_static(bytes),
            },
        );
        self
    }

    /// First value of a field, as sent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Trimmed value, or `None` when missing or blank.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &str, label: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{label} is required")))
    }

    /// Trimmed value, empty when missing.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.optional(name).unwrap_or_default()
    }

    pub fn parse_required<T: FromStr>(&self, name: &str, label: &str) -> Result<T> {
        let raw = self.required(name, label)?;
        raw.parse()
            .map_err(|_| AppError::Validation(format!("{label} is invalid")))
    }

    pub fn parse_optional<T: FromStr>(&self, name: &str, label: &str) -> Result<Option<T>> {
        self.optional(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::Validation(format!("{label} is invalid")))
            })
            .transpose()
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    fn url(&self, name: &str, label: &str) -> Result<Option<String>> {
        match self.optional(name) {
            Some(raw) => {
                let url = Url::parse(&raw)
                    .map_err(|_| AppError::Validation(format!("{label} must be a valid URL")))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::Validation(format!(
                        "{label} must be an http(s) URL"
                    )));
                }
                Ok(Some(raw))
            }
            None => Ok(None),
        }
    }

    fn email(&self, name: &str) -> Result<String> {
        let email = self.required(name, "Email")?;
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
            _ => Err(AppError::validation("Enter a valid email address")),
        }
    }

    fn options(&self) -> Result<AnswerOptions> {
        Ok(AnswerOptions {
            option_a: self.required("option_a", "Option A")?,
            option_b: self.required("option_b", "Option B")?,
            option_c: self.required("option_c", "Option C")?,
            option_d: self.required("option_d", "Option D")?,
        })
    }

    fn choice(&self, name: &str) -> Result<Choice> {
        self.parse_required(name, "Correct option")
    }

    /// Question/answer pairs from parallel `question` and `answer` lists,
    /// zipped to the shorter list. Pairs with a blank question are dropped;
    /// pairs with a blank answer are dropped too unless `allow_blank_answer`.
    pub fn qa_pairs(&self, allow_blank_answer: bool) -> Vec<(String, String)> {
        self.all("question")
            .iter()
            .zip(self.all("answer"))
            .map(|(q, a)| (q.trim().to_string(), a.trim().to_string()))
            .filter(|(q, a)| !q.is_empty() && (allow_blank_answer || !a.is_empty()))
            .collect()
    }
}

// Content

pub struct NoteInput {
    pub title: String,
}

impl NoteInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let title = form.required("title", "Title")?;
        if form.file("file").is_none() {
            return Err(AppError::validation("A file is required"));
        }
        Ok(Self { title })
    }
}

pub struct GkInput {
    pub kind: GkKind,
    pub title: String,
    pub questions: Vec<(String, String)>,
}

impl GkInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let kind = form
            .required("type", "GK type")
            .and_then(|raw| {
                raw.parse::<GkKind>()
                    .map_err(|_| AppError::validation("GK type is invalid"))
            })
            .map_err(|_| AppError::validation("Please provide GK type and title."))?;
        let title = form
            .required("title", "Title")
            .map_err(|_| AppError::validation("Please provide GK type and title."))?;
        Ok(Self {
            kind,
            title,
            questions: form.qa_pairs(true),
        })
    }
}

pub struct ArticleInput {
    pub title: String,
    pub content: String,
}

impl ArticleInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            content: form.required("content", "Content")?,
        })
    }
}

pub struct PradeshInput {
    pub province: Province,
    pub title: String,
    pub qas: Vec<(String, String)>,
}

impl PradeshInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let province = match form.optional("province") {
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .and_then(|n| Province::try_from(n).ok())
                .ok_or_else(|| AppError::validation("Province must be between 1 and 7"))?,
            None => Province::Koshi,
        };
        Ok(Self {
            province,
            title: form.required("title", "Title")?,
            qas: form.qa_pairs(true),
        })
    }
}

pub struct TemplateInput {
    pub title: String,
    pub description: String,
}

impl TemplateInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            description: form.required("description", "Description")?,
        })
    }
}

pub struct GalleryInput {
    pub title: String,
    pub description: String,
    pub caption: String,
}

impl GalleryInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            description: form.text_or_empty("description"),
            caption: form.text_or_empty("caption"),
        })
    }
}

pub struct CurrentEventInput {
    pub title: String,
    pub description: String,
}

impl CurrentEventInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            description: form.required("description", "Description")?,
        })
    }
}

// Model sets and quizzes

pub struct CategoryInput {
    pub name: String,
    pub description: String,
}

impl CategoryInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            name: form.required("name", "Name")?,
            description: form.text_or_empty("description"),
        })
    }
}

pub struct ModelSetInput {
    pub category_id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub timer_hours: u32,
    pub timer_minutes: u32,
    pub timer_seconds: u32,
    pub interactive_url: Option<String>,
}

impl ModelSetInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let category_id = form
            .optional("category")
            .map(|raw| EntityId::parse(&raw, "Category"))
            .transpose()?;
        Ok(Self {
            category_id,
            title: form.required("title", "Title")?,
            description: form.text_or_empty("description"),
            timer_hours: form.parse_optional("timer_hours", "Hours")?.unwrap_or(0),
            timer_minutes: form.parse_optional("timer_minutes", "Minutes")?.unwrap_or(0),
            timer_seconds: form.parse_optional("timer_seconds", "Seconds")?.unwrap_or(0),
            interactive_url: form.url("interactive_url", "Interactive URL")?,
        })
    }
}

pub struct QuestionInput {
    pub question_text: String,
    pub options: AnswerOptions,
    pub correct_option: Choice,
    pub explanation: String,
}

impl QuestionInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            question_text: form.required("question_text", "Question")?,
            options: form.options()?,
            correct_option: form.choice("correct_option")?,
            explanation: form.text_or_empty("explanation"),
        })
    }

    pub fn into_question(self, model_set_id: EntityId) -> ModelSetQuestion {
        ModelSetQuestion::new(
            model_set_id,
            self.question_text,
            self.options,
            self.correct_option,
            self.explanation,
        )
    }

    /// Rows of the bulk-add form: parallel lists indexed by position. Rows
    /// with a blank question are skipped; any other row must be complete.
    pub fn bulk_from_form(form: &FormData) -> Result<Vec<Self>> {
        let cell = |name: &str, row: usize| -> String {
            form.all(name)
                .get(row)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        let mut rows = Vec::new();
        for (row, question_text) in form.all("question_text").iter().enumerate() {
            let question_text = question_text.trim();
            if question_text.is_empty() {
                continue;
            }
            let options = AnswerOptions {
                option_a: cell("option_a", row),
                option_b: cell("option_b", row),
                option_c: cell("option_c", row),
                option_d: cell("option_d", row),
            };
            let incomplete = [
                &options.option_a,
                &options.option_b,
                &options.option_c,
                &options.option_d,
            ]
            .iter()
            .any(|option| option.is_empty());
            if incomplete {
                return Err(AppError::Validation(format!(
                    "Question {} is missing an option",
                    row + 1
                )));
            }
            let correct_option = cell("correct_option", row).parse().map_err(|_| {
                AppError::Validation(format!("Question {} has no valid correct option", row + 1))
            })?;
            rows.push(Self {
                question_text: question_text.to_string(),
                options,
                correct_option,
                explanation: cell("explanation", row),
            });
        }
        Ok(rows)
    }
}

pub struct QuizInput {
    pub title: String,
    pub topic: String,
    pub level: String,
}

impl QuizInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            topic: form.required("topic", "Topic")?,
            level: form.required("level", "Level")?,
        })
    }
}

// Question banks

pub struct SubjectInput {
    pub name: String,
    pub description: String,
}

impl SubjectInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            name: form.required("name", "Name")?,
            description: form.text_or_empty("description"),
        })
    }
}

pub struct ObjectiveSetInput {
    pub title: String,
    pub description: String,
}

impl ObjectiveSetInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            title: form.required("title", "Title")?,
            description: form.text_or_empty("description"),
        })
    }
}

pub struct McqInput {
    pub question: String,
    pub options: AnswerOptions,
    pub correct_answer: Choice,
    pub explanation: String,
}

impl McqInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            question: form.required("question", "Question")?,
            options: form.options()?,
            correct_answer: form.choice("correct_answer")?,
            explanation: form.text_or_empty("explanation"),
        })
    }
}

pub struct QaInput {
    pub question: String,
    pub answer: String,
}

impl QaInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            question: form.required("question", "Question")?,
            answer: form.required("answer", "Answer")?,
        })
    }
}

// Board

pub struct JobInput {
    pub title: String,
    pub position: String,
    pub vacancies: u32,
    pub opening_date: NaiveDate,
    pub application_deadline: NaiveDate,
    pub more_details: Option<String>,
    pub job_type: JobType,
    pub location: String,
}

impl JobInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let vacancies = form.parse_optional("vacancies", "Vacancies")?.unwrap_or(1);
        if vacancies == 0 {
            return Err(AppError::validation("Vacancies must be at least 1"));
        }
        let opening_date: NaiveDate = form.parse_required("opening_date", "Opening date")?;
        let application_deadline: NaiveDate =
            form.parse_required("application_deadline", "Application deadline")?;
        if application_deadline < opening_date {
            return Err(AppError::validation(
                "Application deadline cannot be before the opening date",
            ));
        }
        Ok(Self {
            title: form.required("title", "Title")?,
            position: form.required("position", "Position")?,
            vacancies,
            opening_date,
            application_deadline,
            more_details: form.url("more_details", "More details")?,
            job_type: form.parse_required("job_type", "Job type")?,
            location: form.required("location", "Location")?,
        })
    }
}

pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let name = format!(
            "{} {}",
            form.text_or_empty("first_name"),
            form.text_or_empty("last_name")
        );
        Ok(Self {
            name: name.trim().to_string(),
            email: form.email("email")?,
            message: form.required("message", "Message")?,
        })
    }
}

pub struct UserInput {
    pub username: String,
    pub email: String,
}

impl UserInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        let username = form.required("username", "Username")?;
        if username.chars().any(char::is_whitespace) {
            return Err(AppError::validation("Username cannot contain spaces"));
        }
        Ok(Self {
            username,
            email: form.email("email")?,
        })
    }
}

pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ProfileInput {
    pub fn from_form(form: &FormData) -> Result<Self> {
        Ok(Self {
            first_name: form.text_or_empty("first_name"),
            last_name: form.text_or_empty("last_name"),
            email: form.email("email")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn required_fields_are_trimmed_and_checked() {
        let data = form(&[("title", "  Rivers  "), ("blank", "   ")]);
        assert_eq!(data.required("title", "Title").unwrap(), "Rivers");

        let err = data.required("blank", "Blank").unwrap_err();
        assert_eq!(err.to_string(), "Blank is required");
        assert!(data.required("missing", "Missing").is_err());
    }

    #[test]
    fn repeated_keys_keep_every_value() {
        let data = form(&[
            ("question", "Q1"),
            ("answer", "A1"),
            ("question", "  "),
            ("answer", "A2"),
            ("question", "Q3"),
            ("answer", ""),
            ("question", "Q4"),
        ]);
        assert_eq!(data.all("question").len(), 4);
        assert_eq!(
            data.qa_pairs(true),
            vec![
                ("Q1".to_string(), "A1".to_string()),
                ("Q3".to_string(), String::new()),
            ]
        );
        assert_eq!(data.qa_pairs(false), vec![("Q1".to_string(), "A1".to_string())]);
    }

    #[test]
    fn gk_input_requires_a_known_type() {
        let err = GkInput::from_form(&form(&[("type", "space"), ("title", "Planets")]))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));

        let input = GkInput::from_form(&form(&[("type", "world"), ("title", "Planets")])).unwrap();
        assert_eq!(input.kind, GkKind::World);
        assert!(input.questions.is_empty());
    }

    #[test]
    fn pradesh_province_defaults_and_bounds() {
        let input = PradeshInput::from_form(&form(&[("title", "Budget")])).unwrap();
        assert_eq!(input.province, Province::Koshi);

        let input =
            PradeshInput::from_form(&form(&[("title", "Budget"), ("province", "3")])).unwrap();
        assert_eq!(input.province, Province::Bagmati);

        assert!(PradeshInput::from_form(&form(&[("title", "Budget"), ("province", "8")])).is_err());
    }

    #[test]
    fn model_set_timer_and_url() {
        let input = ModelSetInput::from_form(&form(&[
            ("title", "Kharidar Set 1"),
            ("timer_minutes", "45"),
            ("interactive_url", "https://example.com/set1"),
        ]))
        .unwrap();
        assert_eq!((input.timer_hours, input.timer_minutes), (0, 45));
        assert!(input.category_id.is_none());

        assert!(ModelSetInput::from_form(&form(&[
            ("title", "Bad timer"),
            ("timer_hours", "-1"),
        ]))
        .is_err());
        assert!(ModelSetInput::from_form(&form(&[
            ("title", "Bad url"),
            ("interactive_url", "not a url"),
        ]))
        .is_err());
    }

    #[test]
    fn malformed_category_is_not_found() {
        let err = ModelSetInput::from_form(&form(&[("title", "Set"), ("category", "nope")]))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::NotFound("Category")));
    }

    #[test]
    fn bulk_rows_skip_blank_questions() {
        let data = form(&[
            ("question_text", "Q1"),
            ("question_text", ""),
            ("question_text", "Q3"),
            ("option_a", "a1"),
            ("option_a", ""),
            ("option_a", "a3"),
            ("option_b", "b1"),
            ("option_b", ""),
            ("option_b", "b3"),
            ("option_c", "c1"),
            ("option_c", ""),
            ("option_c", "c3"),
            ("option_d", "d1"),
            ("option_d", ""),
            ("option_d", "d3"),
            ("correct_option", "A"),
            ("correct_option", ""),
            ("correct_option", "D"),
        ]);
        let rows = QuestionInput::bulk_from_form(&data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].question_text, "Q3");
        assert_eq!(rows[1].correct_option, Choice::D);
        assert_eq!(rows[1].explanation, "");
    }

    #[test]
    fn bulk_rows_must_be_complete() {
        let data = form(&[
            ("question_text", "Q1"),
            ("option_a", "a"),
            ("option_b", "b"),
            ("option_c", "c"),
            ("correct_option", "A"),
        ]);
        let err = QuestionInput::bulk_from_form(&data).err().unwrap();
        assert_eq!(err.to_string(), "Question 1 is missing an option");
    }

    #[test]
    fn job_dates_and_vacancies() {
        let base = [
            ("title", "Engineer"),
            ("position", "Officer"),
            ("opening_date", "2026-01-01"),
            ("application_deadline", "2026-01-31"),
            ("job_type", "internship"),
            ("location", "Kathmandu"),
        ];
        let input = JobInput::from_form(&form(&base)).unwrap();
        assert_eq!(input.vacancies, 1);
        assert_eq!(input.job_type, JobType::Internship);

        let mut zero = base.to_vec();
        zero.push(("vacancies", "0"));
        assert!(JobInput::from_form(&form(&zero)).is_err());

        let mut bad_date = base.to_vec();
        bad_date[2] = ("opening_date", "01/01/2026");
        assert!(JobInput::from_form(&form(&bad_date)).is_err());
    }

    #[test]
    fn contact_joins_names_and_checks_email() {
        let input = ContactInput::from_form(&form(&[
            ("first_name", "Ram"),
            ("last_name", "Thapa"),
            ("email", "ram@example.com"),
            ("message", "Hello"),
        ]))
        .unwrap();
        assert_eq!(input.name, "Ram Thapa");

        assert!(ContactInput::from_form(&form(&[
            ("email", "not-an-email"),
            ("message", "Hello"),
        ]))
        .is_err());
    }

    #[test]
    fn note_needs_a_file() {
        let data = form(&[("title", "Constitution")]);
        assert!(NoteInput::from_form(&data).is_err());

        let data = data.with_file("file", "constitution.pdf", b"%PDF");
        assert_eq!(NoteInput::from_form(&data).unwrap().title, "Constitution");
    }
}
