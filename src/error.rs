use thiserror::Error;

/// Errors a user can run into while starting or authoring a quiz.
///
/// Every variant is recovered locally: the handler replies with
/// [`QuizError::user_message`] and either re-prompts or returns to a menu.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("quiz not found")]
    NotFound,
    #[error("quiz already attempted")]
    AlreadyAttempted,
    #[error("quiz has not started yet")]
    NotYetOpen,
    #[error("quiz has already ended")]
    Expired,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl QuizError {
    pub fn user_message(&self) -> String {
        match self {
            QuizError::NotFound => "Test topilmadi.".to_owned(),
            QuizError::AlreadyAttempted => "Siz ushbu testni allaqachon yechib bo'lgansiz.".to_owned(),
            QuizError::NotYetOpen => "Test hali boshlanmagan.".to_owned(),
            QuizError::Expired => "Test tugagan.".to_owned(),
            QuizError::InvalidInput(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {document}: {source}")]
    Io {
        document: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {document}: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set.")]
    Missing(&'static str),
    #[error("{name} can't be parsed: {value}")]
    Malformed { name: &'static str, value: String },
}
