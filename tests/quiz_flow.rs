use std::sync::Arc;

use chrono::NaiveDateTime;
use tangaquizbot::{
    database::{
        backend::MemoryBackend,
        connection::{CreateQuiz, Database, EditProfile, RetrieveProfile},
        quiz::{parse_time, Question, QuizDefinition},
    },
    error::QuizError,
    scoring::Leaderboard,
    session::{finish_quiz, record_answer, start_quiz, step, Step},
};
use teloxide::types::ChatId;

const ROOT: ChatId = ChatId(1);

fn at(raw: &str) -> NaiveDateTime {
    parse_time(raw).unwrap()
}

fn database() -> Database {
    let db = Database::open(Arc::new(MemoryBackend::new()), ROOT);
    let questions = ["A", "B", "C", "D", "A"]
        .iter()
        .enumerate()
        .map(|(idx, letter)| Question::new(format!("Savol {}", idx + 1), 4, (*letter).to_owned()))
        .collect();
    db.create_quiz(
        9,
        QuizDefinition::new(
            "ALG-1".to_owned(),
            at("2024-10-01 10:00"),
            at("2024-10-01 11:00"),
            Some(questions),
        ),
    );
    db
}

fn register(db: &Database, chat_id: i64, name: &str) -> ChatId {
    let chat_id = ChatId(chat_id);
    db.ensure_profile(chat_id);
    db.edit_profile(chat_id, |profile| profile.name = Some(name.to_owned()));
    chat_id
}

fn take(db: &Database, chat_id: ChatId, answers: &[&str]) -> (u32, i64, i64) {
    let (_, quiz) = start_quiz(db, chat_id, "ALG-1", false, at("2024-10-01 10:30")).unwrap();
    for (index, answer) in answers.iter().enumerate() {
        assert!(matches!(step(&quiz, index), Step::Ask { .. }));
        assert!(record_answer(db, chat_id, "ALG-1", answer));
    }
    assert_eq!(step(&quiz, answers.len()), Step::Finished);
    let outcome = finish_quiz(db, chat_id, &quiz).unwrap();
    (outcome.score, outcome.reward, outcome.balance)
}

#[test]
fn full_run_scores_and_rewards() {
    let db = database();
    let chat_id = register(&db, 10, "Ali");

    assert_eq!(take(&db, chat_id, &["a", " b ", "C", "D", "A"]), (5, 10, 10));

    let attempt = db.profile(chat_id).unwrap().attempts["ALG-1"].clone();
    assert_eq!(attempt.answers, vec!["A", "B", "C", "D", "A"]);
    assert_eq!(attempt.score, 5);
}

#[test]
fn zero_score_costs_tanga() {
    let db = database();
    let chat_id = register(&db, 10, "Ali");
    assert_eq!(take(&db, chat_id, &["D", "D", "D", "A", "B"]), (0, -5, -5));
}

#[test]
fn rejected_starts_leave_no_attempt() {
    let db = database();
    let chat_id = register(&db, 10, "Ali");

    assert_eq!(
        start_quiz(&db, chat_id, "ALG-1", false, at("2024-10-01 09:59")).unwrap_err(),
        QuizError::NotYetOpen
    );
    assert_eq!(
        start_quiz(&db, chat_id, "ALG-1", false, at("2024-10-01 11:01")).unwrap_err(),
        QuizError::Expired
    );
    assert_eq!(
        start_quiz(&db, chat_id, "GEO-1", false, at("2024-10-01 10:30")).unwrap_err(),
        QuizError::NotFound
    );
    assert!(db.profile(chat_id).unwrap().attempts.is_empty());
}

#[test]
fn second_start_is_refused_but_admin_restart_resets() {
    let db = database();
    let chat_id = register(&db, 10, "Ali");
    take(&db, chat_id, &["A", "B", "C", "D", "A"]);

    assert_eq!(
        start_quiz(&db, chat_id, "ALG-1", false, at("2024-10-01 10:40")).unwrap_err(),
        QuizError::AlreadyAttempted
    );

    start_quiz(&db, chat_id, "ALG-1", true, at("2024-10-01 10:40")).unwrap();
    let attempt = db.profile(chat_id).unwrap().attempts["ALG-1"].clone();
    assert!(attempt.answers.is_empty());
    assert_eq!(attempt.score, 0);
    assert_eq!(db.profile(chat_id).unwrap().balance, 10);
}

#[test]
fn leaderboard_reflects_stored_attempts() {
    let db = database();
    let ali = register(&db, 10, "Ali");
    let vali = register(&db, 11, "Vali");
    let gani = register(&db, 12, "Gani");

    take(&db, ali, &["A", "A", "A", "A", "A"]);
    take(&db, vali, &["A", "B", "C", "D", "A"]);
    take(&db, gani, &["A", "B", "A", "A", "A"]);

    let board = Leaderboard::collect(&db.profiles(), "ALG-1");
    let order: Vec<(usize, &str, u32)> = board
        .standings()
        .iter()
        .map(|standing| (standing.rank, standing.name.as_str(), standing.score))
        .collect();
    assert_eq!(order, vec![(1, "Vali", 5), (2, "Gani", 3), (3, "Ali", 2)]);

    assert_eq!(
        board.render_for(ali),
        "Test ID: ALG-1\nNatijalar:\nTop 10:\n1. Vali - 5 ball\n2. Gani - 3 ball\n3. Ali - 2 ball\n"
    );
}
