//! Scoring of timed model-set tests.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Attempt, Choice, EntityId, ModelSet, ModelSetQuestion};

/// A question as handed to the test taker, without its answer.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSheet {
    pub id: EntityId,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub field: String,
}

impl From<&ModelSetQuestion> for QuestionSheet {
    fn from(question: &ModelSetQuestion) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text.clone(),
            option_a: question.options.option_a.clone(),
            option_b: question.options.option_b.clone(),
            option_c: question.options.option_c.clone(),
            option_d: question.options.option_d.clone(),
            field: answer_field(question.id),
        }
    }
}

/// Form field carrying the answer to one question.
pub fn answer_field(question_id: EntityId) -> String {
    format!("answer_{question_id}")
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub question_id: EntityId,
    pub question_text: String,
    pub user_answer: String,
    pub correct_option: Choice,
    pub explanation: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Score {
    pub score: usize,
    pub total: usize,
    pub percent: f64,
    pub results: Vec<QuestionResult>,
}

/// Grades submitted answers against the stored options. An answer counts
/// only when it equals the option letter exactly; missing answers are
/// empty and wrong.
pub fn grade(questions: &[ModelSetQuestion], answers: &HashMap<EntityId, String>) -> Score {
    let results: Vec<QuestionResult> = questions
        .iter()
        .map(|question| {
            let user_answer = answers.get(&question.id).cloned().unwrap_or_default();
            QuestionResult {
                question_id: question.id,
                question_text: question.question_text.clone(),
                is_correct: user_answer == question.correct_option.as_str(),
                user_answer,
                correct_option: question.correct_option,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    let score = results.iter().filter(|r| r.is_correct).count();
    let total = results.len();
    let percent = if total == 0 {
        0.0
    } else {
        score as f64 / total as f64 * 100.0
    };

    Score {
        score,
        total,
        percent,
        results,
    }
}

/// Checks that `attempt` may still be submitted for `model_set_id` and
/// hands it back.
pub fn check_open(
    attempt: Option<Attempt>,
    model_set_id: EntityId,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<Attempt> {
    let attempt = attempt.ok_or_else(|| closed("This test attempt does not exist"))?;
    if attempt.model_set_id != model_set_id {
        return Err(closed("This test attempt belongs to another model set"));
    }
    if attempt.is_submitted() {
        return Err(closed("This test attempt has already been submitted"));
    }
    if attempt.elapsed(now) > ttl {
        return Err(closed("This test attempt has expired"));
    }
    Ok(attempt)
}

/// Whether a submission after `elapsed` ran past the set's time limit.
pub fn is_overtime(model_set: &ModelSet, elapsed: Duration) -> bool {
    let limit = model_set.time_limit_seconds();
    limit > 0 && u64::try_from(elapsed.num_seconds()).unwrap_or(0) > limit
}

fn closed(message: &str) -> AppError {
    AppError::AttemptClosed(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerOptions;

    fn question(correct: Choice) -> ModelSetQuestion {
        ModelSetQuestion::new(
            EntityId::generate(),
            "?".to_string(),
            AnswerOptions {
                option_a: "a".to_string(),
                option_b: "b".to_string(),
                option_c: "c".to_string(),
                option_d: "d".to_string(),
            },
            correct,
            String::new(),
        )
    }

    #[test]
    fn one_of_two_is_fifty_percent() {
        let questions = vec![question(Choice::A), question(Choice::B)];
        let answers = HashMap::from([
            (questions[0].id, "A".to_string()),
            (questions[1].id, "C".to_string()),
        ]);

        let score = grade(&questions, &answers);
        assert_eq!(score.score, 1);
        assert_eq!(score.total, 2);
        assert_eq!(score.percent, 50.0);
        assert!(score.results[0].is_correct);
        assert!(!score.results[1].is_correct);
    }

    #[test]
    fn matching_is_exact() {
        let questions = vec![question(Choice::A), question(Choice::B), question(Choice::C)];
        let answers = HashMap::from([
            (questions[0].id, "a".to_string()),
            (questions[1].id, " B".to_string()),
        ]);

        let score = grade(&questions, &answers);
        assert_eq!(score.score, 0);
        assert_eq!(score.results[2].user_answer, "");
    }

    #[test]
    fn empty_set_scores_zero() {
        let score = grade(&[], &HashMap::new());
        assert_eq!((score.score, score.total), (0, 0));
        assert_eq!(score.percent, 0.0);
    }

    #[test]
    fn attempt_rules() {
        let set_id = EntityId::generate();
        let now = Utc::now();
        let ttl = Duration::hours(24);
        let mut attempt = Attempt::start(set_id, now - Duration::minutes(10));

        assert!(check_open(Some(attempt.clone()), set_id, now, ttl).is_ok());
        assert!(matches!(
            check_open(None, set_id, now, ttl),
            Err(AppError::AttemptClosed(_))
        ));
        assert!(check_open(Some(attempt.clone()), EntityId::generate(), now, ttl).is_err());
        assert!(check_open(Some(attempt.clone()), set_id, now + Duration::hours(25), ttl).is_err());

        attempt.submitted_at = Some(now);
        assert!(check_open(Some(attempt), set_id, now, ttl).is_err());
    }

    #[test]
    fn overtime_needs_a_limit() {
        let mut set = ModelSet {
            id: EntityId::generate(),
            category_id: None,
            title: "Set".to_string(),
            description: String::new(),
            timer_hours: 0,
            timer_minutes: 1,
            timer_seconds: 30,
            file_url: None,
            interactive_url: None,
        };
        assert!(!is_overtime(&set, Duration::seconds(90)));
        assert!(is_overtime(&set, Duration::seconds(91)));

        set.timer_minutes = 0;
        set.timer_seconds = 0;
        assert!(!is_overtime(&set, Duration::hours(5)));
    }
}
