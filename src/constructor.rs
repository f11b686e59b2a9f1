use std::sync::Arc;

use chrono::NaiveDateTime;
use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::{ChatId, Message}, Bot};
use tracing::instrument;

use crate::{
    database::{
        connection::{CreateQuiz, Database, ManageAdmins, RetrieveProfile, RetrieveQuiz},
        quiz::{option_labels, parse_time, Question, QuizDefinition},
    },
    keyboard::{back_finish_keyboard, back_keyboard, options_keyboard, BACK, FINISH},
    menu::{back_to_admin_main, require_admin},
    state::{BotState, QuizDraft},
    validation::{parse_correct_answer, parse_grade, parse_option_count},
    HandlerResult, UserDialogue,
};

pub(crate) async fn upload_quiz<Db: ManageAdmins>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    if !require_admin(bot, chat_id, db).await? {
        return Ok(());
    }

    bot.send_message(chat_id, "Iltimos, sinfni kiriting (masalan, 9):")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveGrade).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_grade(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    match msg.text() {
        Some(BACK) => back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(text) => match parse_grade(text) {
            Ok(grade) => {
                log::info!("{} authors a quiz for grade {}", msg.chat.id.0, grade);
                bot.send_message(msg.chat.id, "Endi test ID kiritishingiz kerak:").await?;
                dialogue.update(BotState::ReceiveNewQuizId { grade }).await?;
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.user_message()).await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Iltimos, to'g'ri sinf raqamini kiriting:").await?;
        }
    }
    Ok(())
}

/// Quiz ids are unique across every grade, since users start quizzes by id alone.
#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_new_quiz_id<Db: RetrieveQuiz + ManageAdmins + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    grade: u8,
    db: Arc<Db>,
) -> HandlerResult {
    match msg.text() {
        Some(BACK) => back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(quiz_id) if db.find_quiz(quiz_id.trim()).is_some() => {
            bot.send_message(
                msg.chat.id,
                "Bu test ID allaqachon mavjud. Iltimos, boshqa test ID kiritishingiz kerak:",
            )
            .await?;
        }
        Some(quiz_id) if !quiz_id.trim().is_empty() => {
            log::info!("{} names the new quiz '{}'", msg.chat.id.0, quiz_id.trim());
            bot.send_message(msg.chat.id, "Testning boshlanish vaqtini kiriting (YYYY-MM-DD HH:MM):")
                .reply_markup(back_keyboard())
                .await?;
            dialogue
                .update(BotState::ReceiveStartTime {
                    grade,
                    quiz_id: quiz_id.trim().to_owned(),
                })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Endi test ID kiritishingiz kerak:").await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_start_time(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (grade, quiz_id): (u8, String),
    db: Arc<Database>,
) -> HandlerResult {
    match msg.text() {
        Some(BACK) => back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(text) => match parse_time(text) {
            Some(start_time) => {
                bot.send_message(msg.chat.id, "Testning tugash vaqtini kiriting (YYYY-MM-DD HH:MM):")
                    .reply_markup(back_keyboard())
                    .await?;
                dialogue
                    .update(BotState::ReceiveEndTime {
                        grade,
                        quiz_id,
                        start_time,
                    })
                    .await?;
            }
            None => {
                bot.send_message(
                    msg.chat.id,
                    "Vaqt formati noto'g'ri. Iltimos, boshlanish vaqtini qaytadan kiriting (YYYY-MM-DD HH:MM):",
                )
                .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Testning boshlanish vaqtini kiriting (YYYY-MM-DD HH:MM):")
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_end_time(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (grade, quiz_id, start_time): (u8, String, NaiveDateTime),
    db: Arc<Database>,
) -> HandlerResult {
    let text = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => text,
        None => {
            bot.send_message(msg.chat.id, "Testning tugash vaqtini kiriting (YYYY-MM-DD HH:MM):")
                .await?;
            return Ok(());
        }
    };

    match parse_time(text) {
        Some(end_time) if end_time <= start_time => {
            bot.send_message(
                msg.chat.id,
                "Tugash vaqti boshlanish vaqtidan keyin bo'lishi kerak. Iltimos, tugash vaqtini qaytadan kiriting (YYYY-MM-DD HH:MM):",
            )
            .await?;
        }
        Some(end_time) => {
            let draft = QuizDraft {
                grade,
                quiz: QuizDefinition::new(quiz_id, start_time, end_time, None),
            };
            log::info!("{} opens window {}", msg.chat.id.0, draft.quiz);
            bot.send_message(msg.chat.id, "Endi test savolini kiriting:")
                .reply_markup(back_finish_keyboard())
                .await?;
            dialogue.update(BotState::ReceiveQuestion { draft }).await?;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                "Vaqt formati noto'g'ri. Iltimos, tugash vaqtini qaytadan kiriting (YYYY-MM-DD HH:MM):",
            )
            .await?;
        }
    }
    Ok(())
}

async fn save_draft<Db: CreateQuiz + ManageAdmins + RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    draft: QuizDraft,
    db: &Db,
) -> HandlerResult {
    log::info!(
        "{} saves quiz '{}' with {} questions",
        chat_id.0,
        draft.quiz.id(),
        draft.quiz.questions().len()
    );
    db.create_quiz(draft.grade, draft.quiz);
    bot.send_message(chat_id, "Test muvaffaqiyatli saqlandi va yakunlandi!").await?;
    back_to_admin_main(bot, dialogue, chat_id, db).await
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_question<Db: CreateQuiz + ManageAdmins + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    draft: QuizDraft,
    db: Arc<Db>,
) -> HandlerResult {
    match msg.text() {
        Some(FINISH) => save_draft(&bot, &dialogue, msg.chat.id, draft, db.as_ref()).await?,
        Some(BACK) => {
            log::info!("{} drops draft '{}'", msg.chat.id.0, draft.quiz.id());
            back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?;
        }
        Some(text) => {
            bot.send_message(msg.chat.id, "Variantlar sonini kiriting:").await?;
            dialogue
                .update(BotState::ReceiveOptionCount {
                    draft,
                    text: text.to_owned(),
                })
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Endi test savolini kiriting:").await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_option_count<Db: CreateQuiz + ManageAdmins + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (draft, text): (QuizDraft, String),
    db: Arc<Db>,
) -> HandlerResult {
    match msg.text() {
        Some(FINISH) => save_draft(&bot, &dialogue, msg.chat.id, draft, db.as_ref()).await?,
        Some(BACK) => back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(count) => match parse_option_count(count) {
            Ok(option_count) => {
                bot.send_message(msg.chat.id, "To'g'ri javobni tanlang:")
                    .reply_markup(options_keyboard(&option_labels(option_count)))
                    .await?;
                dialogue
                    .update(BotState::ReceiveCorrectAnswer {
                        draft,
                        text,
                        option_count,
                    })
                    .await?;
            }
            Err(e) => {
                bot.send_message(msg.chat.id, e.user_message()).await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Iltimos, raqam kiriting:").await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn receive_correct_answer(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (mut draft, text, option_count): (QuizDraft, String, u8),
) -> HandlerResult {
    let Some(answer) = msg.text() else {
        bot.send_message(msg.chat.id, "To'g'ri javobni tanlang:").await?;
        return Ok(());
    };

    match parse_correct_answer(answer, option_count) {
        Ok(correct_answer) => {
            log::info!(
                "{} adds question #{} to '{}' with answer {}",
                msg.chat.id.0,
                draft.quiz.questions().len() + 1,
                draft.quiz.id(),
                correct_answer
            );
            draft.quiz.add_question(Question::new(text, option_count, correct_answer));
            bot.send_message(msg.chat.id, "Yangi savolni kiriting yoki '✅ Yakunlash' tugmasini bosing:")
                .reply_markup(back_finish_keyboard())
                .await?;
            dialogue.update(BotState::ReceiveQuestion { draft }).await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message())
                .reply_markup(options_keyboard(&option_labels(option_count)))
                .await?;
        }
    }
    Ok(())
}
