use chrono::NaiveDateTime;

use crate::database::{profile::ProfileField, quiz::QuizDefinition};

/// Quiz being authored, kept in the dialogue until it is finished.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    pub(crate) grade: u8,
    pub(crate) quiz: QuizDefinition,
}

/// What the bot expects next from a chat. Each variant carries the context
/// the next message is interpreted against.
#[derive(Debug, Clone, Default)]
pub enum BotState {
    #[default]
    Idle,

    // PART FOR --- PROFILE ---
    Onboarding {
        field: ProfileField,
    },
    EditName,
    EditRegion,
    EditDistrict,

    // PART FOR --- TAKING QUIZ ---
    ReceiveQuizId,
    AnswerQuestion {
        grade: u8,
        quiz_id: String,
        index: usize,
    },
    ReceiveResultsQuizId,

    // PART FOR --- AUTHORING QUIZ ---
    ReceiveGrade,
    ReceiveNewQuizId {
        grade: u8,
    },
    ReceiveStartTime {
        grade: u8,
        quiz_id: String,
    },
    ReceiveEndTime {
        grade: u8,
        quiz_id: String,
        start_time: NaiveDateTime,
    },
    ReceiveQuestion {
        draft: QuizDraft,
    },
    ReceiveOptionCount {
        draft: QuizDraft,
        text: String,
    },
    ReceiveCorrectAnswer {
        draft: QuizDraft,
        text: String,
        option_count: u8,
    },

    // PART FOR --- ADMIN ---
    ReceiveResultsMode,
    ReceiveAdminResultsQuizId {
        with_chat_id: bool,
    },
    ReceiveNewAdmin,
    ReceiveRemovedAdmin,
    ReceiveNewChannel,
    ReceiveRemovedChannel,
    BrowseGrade,
    BrowseRegion {
        grade: u8,
    },
    BrowseDistrict {
        grade: u8,
        region: String,
    },
    ReceiveGrantUser,
    ReceiveGrantAmount {
        user: i64,
    },
    ReceiveBroadcast,
}
