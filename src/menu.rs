use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::ChatId,
    Bot,
};

use crate::{
    database::connection::{ManageAdmins, ManageChannels, RetrieveProfile},
    gate::{is_subscribed, join_prompt},
    keyboard::{admin_menu_keyboard, user_menu_keyboard},
    state::BotState,
    HandlerResult, UserDialogue,
};

pub(crate) const NO_ADMIN_RIGHTS: &str = "Sizda admin huquqlari yo'q.";

/// Checks the channel gate and sends the join prompt when it fails.
pub(crate) async fn passes_gate<Db: ManageChannels>(bot: &Bot, chat_id: ChatId, db: &Db) -> Result<bool, teloxide::RequestError> {
    let channels = db.channels();
    if is_subscribed(bot, &channels, chat_id).await {
        return Ok(true);
    }

    log::info!("{} is not subscribed to the required channels", chat_id.0);
    bot.send_message(chat_id, join_prompt(&channels)).await?;
    Ok(false)
}

pub(crate) async fn show_user_menu<Db: RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    let name = db
        .profile(chat_id)
        .and_then(|profile| profile.name)
        .unwrap_or_default();
    bot.send_message(chat_id, format!("Xush kelibsiz, {name}!"))
        .reply_markup(user_menu_keyboard())
        .await?;
    dialogue.update(BotState::Idle).await?;
    Ok(())
}

pub(crate) async fn show_admin_panel(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Admin paneliga xush kelibsiz!")
        .reply_markup(admin_menu_keyboard())
        .await?;
    dialogue.update(BotState::Idle).await?;
    Ok(())
}

/// Returns admins to the panel; anyone else lands back in the user menu.
pub(crate) async fn back_to_admin_main<Db: ManageAdmins + RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    if !db.is_admin(chat_id) {
        return show_user_menu(bot, dialogue, chat_id, db).await;
    }

    bot.send_message(chat_id, "Admin panelining asosiy menyusiga qaytdingiz!")
        .reply_markup(admin_menu_keyboard())
        .await?;
    dialogue.update(BotState::Idle).await?;
    Ok(())
}

/// Replies with the admin refusal when `chat_id` is not an admin.
pub(crate) async fn require_admin<Db: ManageAdmins>(bot: &Bot, chat_id: ChatId, db: &Db) -> Result<bool, teloxide::RequestError> {
    if db.is_admin(chat_id) {
        return Ok(true);
    }
    log::info!("{} tried an admin action without rights", chat_id.0);
    bot.send_message(chat_id, NO_ADMIN_RIGHTS).await?;
    Ok(false)
}
