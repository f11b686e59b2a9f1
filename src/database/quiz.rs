use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `grade -> quiz id -> quiz`, in insertion order.
pub type Catalog = IndexMap<u8, IndexMap<String, QuizDefinition>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDefinition {
    #[serde(rename = "test_id")]
    id: String,
    #[serde(with = "minute_format")]
    start_time: NaiveDateTime,
    #[serde(with = "minute_format")]
    end_time: NaiveDateTime,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    text: String,
    option_count: u8,
    correct_answer: String,
}

impl fmt::Display for QuizDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Test ID: {}\n{} - {}\nSavollar: {}",
            self.id,
            self.start_time.format(TIME_FORMAT),
            self.end_time.format(TIME_FORMAT),
            self.questions.len()
        )
    }
}

impl QuizDefinition {
    pub fn new(
        id: String,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        questions: Option<Vec<Question>>,
    ) -> Self {
        Self {
            id,
            start_time,
            end_time,
            questions: questions.unwrap_or_default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }
}

impl Question {
    pub fn new(text: String, option_count: u8, correct_answer: String) -> Self {
        Self {
            text,
            option_count,
            correct_answer,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Option labels `A, B, C, ...` sized to the option count.
    pub fn option_labels(&self) -> Vec<String> {
        option_labels(self.option_count)
    }
}

pub fn option_labels(option_count: u8) -> Vec<String> {
    (0..option_count.min(26))
        .map(|idx| char::from(b'A' + idx).to_string())
        .collect()
}

pub fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_option_count() {
        assert_eq!(option_labels(4), vec!["A", "B", "C", "D"]);
        assert_eq!(option_labels(2), vec!["A", "B"]);
    }

    #[test]
    fn reads_persisted_document_layout() {
        let raw = r#"{
            "test_id": "T1",
            "questions": [{"question": "2+2?", "option_count": 3, "correct_answer": "B"}],
            "start_time": "2024-05-01 09:00",
            "end_time": "2024-05-01 10:30"
        }"#;
        let quiz: QuizDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(quiz.id(), "T1");
        assert_eq!(quiz.questions()[0].correct_answer(), "B");
        assert_eq!(quiz.end_time(), parse_time("2024-05-01 10:30").unwrap());
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_time("2024-05-01").is_none());
        assert!(parse_time("01.05.2024 09:00").is_none());
        assert!(parse_time(" 2024-05-01 09:00 ").is_some());
    }
}
