use std::sync::Arc;

use teloxide::{prelude::Requester, types::Message, utils::command::BotCommands, Bot};

use crate::{
    database::connection::{Database, ManageAdmins, RetrieveProfile},
    editor::ensure_profile,
    menu::{show_admin_panel, show_user_menu, NO_ADMIN_RIGHTS},
    state::BotState,
    HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "snake_case")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "register or open the main menu.")]
    Start,
    #[command(description = "open the admin panel.")]
    AdminStart,
    #[command(description = "abort the current step.")]
    Cancel,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub(crate) async fn start(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    log::info!("{} sends /start", msg.chat.username().unwrap_or("anonymous"));
    ensure_profile(&bot, &dialogue, msg.chat.id, &db).await
}

pub(crate) async fn admin_start(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    if db.is_admin(msg.chat.id) {
        show_admin_panel(&bot, &dialogue, msg.chat.id).await
    } else {
        log::info!("{} is refused the admin panel", msg.chat.id.0);
        bot.send_message(msg.chat.id, NO_ADMIN_RIGHTS).await?;
        Ok(())
    }
}

/// Drops whatever the chat was in the middle of, including an unsaved draft.
pub(crate) async fn cancel(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    dialogue.update(BotState::Idle).await?;
    if db.profile(msg.chat.id).is_some_and(|profile| profile.is_complete()) {
        show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await
    } else {
        ensure_profile(&bot, &dialogue, msg.chat.id, &db).await
    }
}
