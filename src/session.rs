use chrono::NaiveDateTime;
use teloxide::types::ChatId;

use crate::{
    database::{
        connection::{EditProfile, RetrieveProfile, RetrieveQuiz},
        profile::{Profile, QuizAttempt},
        quiz::{QuizDefinition, Question},
    },
    error::QuizError,
    scoring,
};

/// What to do at a given question index.
#[derive(Debug, PartialEq)]
pub enum Step<'a> {
    Ask { index: usize, question: &'a Question },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub score: u32,
    pub total: usize,
    pub reward: i64,
    pub balance: i64,
}

/// Decides whether `profile` may start `quiz_id` at `now`.
///
/// Admins may re-attempt a quiz. The window is inclusive at both ends.
pub fn validate_start(
    profile: &Profile,
    found: Option<(u8, QuizDefinition)>,
    quiz_id: &str,
    is_admin: bool,
    now: NaiveDateTime,
) -> Result<(u8, QuizDefinition), QuizError> {
    if profile.attempts.contains_key(quiz_id) && !is_admin {
        return Err(QuizError::AlreadyAttempted);
    }

    let (grade, quiz) = found.ok_or(QuizError::NotFound)?;

    if now < quiz.start_time() {
        return Err(QuizError::NotYetOpen);
    }
    if now > quiz.end_time() {
        return Err(QuizError::Expired);
    }

    Ok((grade, quiz))
}

/// Validates the start and records an empty attempt for the user.
pub fn start_quiz<Db: RetrieveQuiz + RetrieveProfile + EditProfile>(
    db: &Db,
    chat_id: ChatId,
    quiz_id: &str,
    is_admin: bool,
    now: NaiveDateTime,
) -> Result<(u8, QuizDefinition), QuizError> {
    let profile = db.profile(chat_id).ok_or(QuizError::NotFound)?;
    let (grade, quiz) = validate_start(&profile, db.find_quiz(quiz_id), quiz_id, is_admin, now)?;

    db.edit_profile(chat_id, |profile| {
        profile.attempts.insert(quiz.id().to_owned(), QuizAttempt::default());
    });

    Ok((grade, quiz))
}

pub fn step(quiz: &QuizDefinition, index: usize) -> Step<'_> {
    match quiz.questions().get(index) {
        Some(question) => Step::Ask { index, question },
        None => Step::Finished,
    }
}

/// Appends the raw answer, upper-cased and trimmed. Letters outside the
/// question's options are kept as given.
pub fn record_answer<Db: EditProfile>(db: &Db, chat_id: ChatId, quiz_id: &str, raw: &str) -> bool {
    let answer = raw.trim().to_uppercase();
    db.edit_profile(chat_id, |profile| match profile.attempts.get_mut(quiz_id) {
        Some(attempt) => {
            attempt.answers.push(answer);
            true
        }
        None => false,
    })
    .unwrap_or(false)
}

/// Scores the attempt, stores the score and credits the reward.
pub fn finish_quiz<Db: EditProfile>(db: &Db, chat_id: ChatId, quiz: &QuizDefinition) -> Option<Outcome> {
    db.edit_profile(chat_id, |profile| {
        let attempt = profile.attempts.get_mut(quiz.id())?;
        let score = scoring::score(&attempt.answers, quiz.questions());
        attempt.score = score;

        let total = quiz.questions().len();
        let reward = scoring::reward(score, total);
        profile.balance += reward;

        Some(Outcome {
            score,
            total,
            reward,
            balance: profile.balance,
        })
    })
    .flatten()
}
