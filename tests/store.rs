use std::{fs, sync::Arc};

use tangaquizbot::database::{
    backend::{Document, JsonFileBackend, MemoryBackend},
    connection::{CreateQuiz, Database, EditProfile, ManageChannels, RetrieveProfile, RetrieveQuiz},
    profile::QuizAttempt,
    quiz::{parse_time, Question, QuizDefinition},
};
use teloxide::types::ChatId;

const ROOT: ChatId = ChatId(1);

fn quiz(id: &str) -> QuizDefinition {
    QuizDefinition::new(
        id.to_owned(),
        parse_time("2024-09-01 08:00").unwrap(),
        parse_time("2024-09-01 09:00").unwrap(),
        Some(vec![Question::new("2+2?".to_owned(), 4, "C".to_owned())]),
    )
}

#[test]
fn mutations_survive_a_reopen() {
    let backend = Arc::new(MemoryBackend::new());

    let db = Database::open(backend.clone(), ROOT);
    db.ensure_profile(ChatId(42));
    db.edit_profile(ChatId(42), |profile| {
        profile.name = Some("Aziza".to_owned());
        profile.balance = 15;
    });
    db.create_quiz(7, quiz("M-7"));
    db.add_channel("maktab");
    drop(db);

    let reopened = Database::open(backend.clone(), ROOT);
    let profile = reopened.profile(ChatId(42)).unwrap();
    assert_eq!(profile.display_id, "00001");
    assert_eq!(profile.name.as_deref(), Some("Aziza"));
    assert_eq!(profile.balance, 15);
    assert_eq!(reopened.find_quiz("M-7"), Some((7, quiz("M-7"))));
    assert_eq!(reopened.channels(), vec!["maktab"]);
}

#[test]
fn every_profile_field_survives_a_reopen() {
    let backend = Arc::new(MemoryBackend::new());

    let db = Database::open(backend.clone(), ROOT);
    db.ensure_profile(ChatId(42));
    db.ensure_profile(ChatId(-7));
    db.edit_profile(ChatId(42), |profile| {
        profile.name = Some("Aziza".to_owned());
        profile.age = Some(14);
        profile.phone = Some("+998901234567".to_owned());
        profile.grade = Some(8);
        profile.region = Some("Toshkent".to_owned());
        profile.district = Some("Chilonzor tuman".to_owned());
        profile.balance = -5;
        profile.attempts.insert(
            "M-7".to_owned(),
            QuizAttempt {
                answers: vec!["A".to_owned(), "C".to_owned(), "B".to_owned()],
                score: 2,
            },
        );
        profile.attempts.insert("F-9".to_owned(), QuizAttempt::default());
    });
    drop(db);

    let before = Database::open(backend.clone(), ROOT).profiles();
    let profile = &before[&42];
    assert_eq!(profile.age, Some(14));
    assert_eq!(profile.district.as_deref(), Some("Chilonzor tuman"));
    assert_eq!(profile.attempts["M-7"].score, 2);
    assert_eq!(profile.attempts.keys().collect::<Vec<_>>(), vec!["M-7", "F-9"]);

    let reopened = Database::open(backend.clone(), ROOT);
    assert_eq!(reopened.profiles(), before);
    assert_eq!(reopened.profile(ChatId(-7)).unwrap().display_id, "00002");
}

#[test]
fn a_half_written_quiz_does_not_drop_the_catalog() {
    let backend = Arc::new(MemoryBackend::new().with_document(
        Document::Catalog,
        r#"{
            "5": {
                "ALG-1": {
                    "test_id": "ALG-1",
                    "questions": [{"question": "2+2?", "option_count": 4, "correct_answer": "C"}],
                    "start_time": "2024-09-01 08:00",
                    "end_time": "2024-09-01 09:00"
                },
                "DRAFT": {"test_id": "DRAFT", "questions": []}
            }
        }"#,
    ));

    let db = Database::open(backend.clone(), ROOT);
    assert!(db.find_quiz("ALG-1").is_some());
    assert!(db.find_quiz("DRAFT").is_none());

    db.create_quiz(5, quiz("NEW"));
    drop(db);

    let reopened = Database::open(backend.clone(), ROOT);
    assert!(reopened.find_quiz("ALG-1").is_some());
    assert_eq!(reopened.find_quiz("NEW"), Some((5, quiz("NEW"))));
}

#[test]
fn profiles_are_written_with_persisted_field_names() {
    let backend = Arc::new(MemoryBackend::new());
    let db = Database::open(backend.clone(), ROOT);
    db.ensure_profile(ChatId(42));
    db.edit_profile(ChatId(42), |profile| profile.grade = Some(9));

    let written: serde_json::Value =
        serde_json::from_str(&backend.contents(Document::Profiles).unwrap()).unwrap();
    let profile = &written["42"];
    assert_eq!(profile["user_id"], "00001");
    assert_eq!(profile["class"], 9);
    assert_eq!(profile["tanga"], 0);
    assert!(profile["tests"].as_object().unwrap().is_empty());
}

#[test]
fn json_files_round_trip_through_a_directory() {
    let dir = std::env::temp_dir().join(format!("tangaquizbot-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("address.json"),
        r#"{"Toshkent": ["Chilonzor tuman", "Yunusobod tuman"]}"#,
    )
    .unwrap();

    let db = Database::open(JsonFileBackend::new(dir.clone()), ROOT);
    assert_eq!(db.address().regions(), vec!["Toshkent"]);
    db.create_quiz(9, quiz("F-9"));
    drop(db);

    let raw = fs::read_to_string(dir.join("test_data.json")).unwrap();
    assert!(raw.contains("\"test_id\": \"F-9\""));
    assert!(raw.contains("\"start_time\": \"2024-09-01 08:00\""));

    let reopened = Database::open(JsonFileBackend::new(dir.clone()), ROOT);
    assert_eq!(reopened.retrieve_quiz(9, "F-9"), Some(quiz("F-9")));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_directory_starts_empty() {
    let dir = std::env::temp_dir().join(format!("tangaquizbot-missing-{}", uuid::Uuid::new_v4()));
    let db = Database::open(JsonFileBackend::new(dir), ROOT);
    assert!(db.profiles().is_empty());
    assert!(db.catalog().is_empty());
    assert!(db.channels().is_empty());
}
