use std::sync::Arc;

use chrono::Local;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message},
    Bot,
};
use tracing::instrument;

use crate::{
    database::{
        connection::{Database, ManageAdmins, RetrieveProfile, RetrieveQuiz},
        quiz::QuizDefinition,
    },
    error::QuizError,
    keyboard::{back_keyboard, options_keyboard, results_mode_keyboard, BACK},
    menu::{passes_gate, show_user_menu},
    scoring::Leaderboard,
    session::{finish_quiz, record_answer, start_quiz, step, Step},
    state::BotState,
    HandlerResult, UserDialogue,
};

pub(crate) async fn start_test(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, db: &Database) -> HandlerResult {
    if !passes_gate(bot, chat_id, db).await? {
        return Ok(());
    }
    bot.send_message(chat_id, "Iltimos, test ID kiritishingiz kerak:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveQuizId).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_quiz_id(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    let quiz_id = match msg.text() {
        Some(BACK) => return show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(quiz_id) => quiz_id.to_owned(),
        None => {
            bot.send_message(msg.chat.id, "Iltimos, test ID kiritishingiz kerak:").await?;
            return Ok(());
        }
    };

    if !passes_gate(&bot, msg.chat.id, db.as_ref()).await? {
        dialogue.update(BotState::Idle).await?;
        return Ok(());
    }

    let now = Local::now().naive_local();
    match start_quiz(db.as_ref(), msg.chat.id, &quiz_id, db.is_admin(msg.chat.id), now) {
        Ok((grade, quiz)) => {
            log::info!(
                "{} starts quiz '{}' of grade {}",
                msg.chat.username().unwrap_or("anonymous"),
                quiz.id(),
                grade
            );
            present_question(&bot, &dialogue, msg.chat.id, &db, grade, &quiz, 0).await?;
        }
        Err(e) => {
            log::info!(
                "{} failed to start quiz '{}': {}",
                msg.chat.username().unwrap_or("anonymous"),
                quiz_id,
                e
            );
            bot.send_message(msg.chat.id, e.user_message()).await?;
            dialogue.update(BotState::Idle).await?;
        }
    }
    Ok(())
}

/// Asks the question at `index`, or scores the attempt once every question
/// has been answered. The gate is re-checked before each question.
async fn present_question(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Database,
    grade: u8,
    quiz: &QuizDefinition,
    index: usize,
) -> HandlerResult {
    if !passes_gate(bot, chat_id, db).await? {
        dialogue.update(BotState::Idle).await?;
        return Ok(());
    }

    match step(quiz, index) {
        Step::Ask { index, question } => {
            log::info!("{}: asking question #{} of '{}'", chat_id.0, index + 1, quiz.id());
            bot.send_message(chat_id, question.text())
                .reply_markup(options_keyboard(&question.option_labels()))
                .await?;
            dialogue
                .update(BotState::AnswerQuestion {
                    grade,
                    quiz_id: quiz.id().to_owned(),
                    index,
                })
                .await?;
        }
        Step::Finished => {
            match finish_quiz(db, chat_id, quiz) {
                Some(outcome) => {
                    log::info!(
                        "{} completed quiz '{}' with {}/{}, reward {}, balance {}",
                        chat_id.0,
                        quiz.id(),
                        outcome.score,
                        outcome.total,
                        outcome.reward,
                        outcome.balance
                    );
                    bot.send_message(chat_id, format!("Test yakunlandi! Sizning balingiz: {}", outcome.score))
                        .await?;
                }
                None => {
                    log::error!("{} finished quiz '{}' without an attempt", chat_id.0, quiz.id());
                }
            }
            show_user_menu(bot, dialogue, chat_id, db).await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn take_answer(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (grade, quiz_id, index): (u8, String, usize),
    db: Arc<Database>,
) -> HandlerResult {
    let answer = match msg.text() {
        Some(BACK) => {
            log::info!("{} leaves quiz '{}' at question #{}", msg.chat.id.0, quiz_id, index + 1);
            return show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await;
        }
        Some(answer) => answer,
        None => {
            bot.send_message(msg.chat.id, "Iltimos, javob variantini tanlang.").await?;
            return Ok(());
        }
    };

    log::info!(
        "{} answers {} to question #{} of '{}'",
        msg.chat.username().unwrap_or("anonymous"),
        answer,
        index + 1,
        quiz_id
    );
    if !record_answer(db.as_ref(), msg.chat.id, &quiz_id, answer) {
        log::error!("{} has no attempt for '{}'", msg.chat.id.0, quiz_id);
    }

    match db.retrieve_quiz(grade, &quiz_id) {
        Some(quiz) => present_question(&bot, &dialogue, msg.chat.id, &db, grade, &quiz, index + 1).await?,
        None => {
            bot.send_message(msg.chat.id, QuizError::NotFound.user_message()).await?;
            show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await?;
        }
    }
    Ok(())
}

/// Admins pick a results layout first; users go straight to their own standing.
pub(crate) async fn view_results(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, db: &Database) -> HandlerResult {
    if !passes_gate(bot, chat_id, db).await? {
        return Ok(());
    }

    if db.is_admin(chat_id) {
        bot.send_message(chat_id, "Natijalarni ko'rish usulini tanlang:")
            .reply_markup(results_mode_keyboard())
            .await?;
        dialogue.update(BotState::ReceiveResultsMode).await?;
    } else {
        bot.send_message(chat_id, "Iltimos, test ID kiritishingiz kerak:")
            .reply_markup(back_keyboard())
            .await?;
        dialogue.update(BotState::ReceiveResultsQuizId).await?;
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_results_quiz_id(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Database>,
) -> HandlerResult {
    let quiz_id = match msg.text() {
        Some(BACK) => return show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(quiz_id) => quiz_id,
        None => {
            bot.send_message(msg.chat.id, "Iltimos, test ID kiritishingiz kerak:").await?;
            return Ok(());
        }
    };

    dialogue.update(BotState::Idle).await?;
    if !passes_gate(&bot, msg.chat.id, db.as_ref()).await? {
        return Ok(());
    }

    let board = Leaderboard::collect(&db.profiles(), quiz_id);
    match board.standing_of(msg.chat.id) {
        Some(own) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "Test ID: {}\nSizning balingiz: {}\nO'rningiz: {}/{}",
                    board.quiz_id(),
                    own.score,
                    own.rank,
                    board.participants()
                ),
            )
            .await?;
            bot.send_message(msg.chat.id, board.render_for(msg.chat.id)).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Siz bunday testga qatnashmagansiz.").await?;
        }
    }
    Ok(())
}
