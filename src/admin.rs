use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message},
    Bot,
};
use tracing::instrument;

use crate::{
    database::{
        connection::{Database, EditProfile, ManageAdmins, ManageChannels, RetrieveProfile},
        profile::{Profile, Profiles},
    },
    gate::normalize_channel,
    keyboard::{
        admin_menu_keyboard, back_keyboard, choices_keyboard, grades_keyboard, manage_admins_keyboard,
        manage_channels_keyboard, results_mode_keyboard, BACK, WITHOUT_CHAT_ID, WITH_CHAT_ID,
    },
    menu::{back_to_admin_main, passes_gate, show_user_menu, NO_ADMIN_RIGHTS},
    scoring::Leaderboard,
    state::BotState,
    validation::{parse_amount, parse_chat_id, parse_grade_button},
    HandlerResult, UserDialogue,
};

/// Profiles of one grade living in the given region and district.
pub fn users_in(profiles: &Profiles, grade: u8, region: &str, district: &str) -> Vec<Profile> {
    profiles
        .values()
        .filter(|profile| {
            profile.grade == Some(grade)
                && profile.region.as_deref() == Some(region)
                && profile.district.as_deref() == Some(district)
        })
        .cloned()
        .collect()
}

pub fn render_user_list(users: &[Profile]) -> String {
    if users.is_empty() {
        return "Bu tanlov bo'yicha foydalanuvchilar topilmadi.".to_owned();
    }
    let listed = users.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n\n");
    format!("Foydalanuvchilar ro'yxati:\n\n{listed}")
}

async fn refuse_lost_rights<Db: RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    log::info!("{} lost admin rights in the middle of a flow", chat_id.0);
    bot.send_message(chat_id, NO_ADMIN_RIGHTS).await?;
    show_user_menu(bot, dialogue, chat_id, db).await
}

/// Refuses and returns to the user menu when the chat lost its admin rights
/// in the middle of a flow.
async fn still_admin<Db: ManageAdmins + RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    if db.is_admin(chat_id) {
        return Ok(true);
    }
    refuse_lost_rights(bot, dialogue, chat_id, db).await?;
    Ok(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEdit {
    Add,
    Remove,
}

/// `None` when `chat_id` is no longer an admin, otherwise whether the channel
/// list changed.
pub fn edit_channels<Db: ManageChannels + ManageAdmins>(
    db: &Db,
    chat_id: ChatId,
    edit: ChannelEdit,
    channel: &str,
) -> Option<bool> {
    if !db.is_admin(chat_id) {
        return None;
    }
    Some(match edit {
        ChannelEdit::Add => db.add_channel(channel),
        ChannelEdit::Remove => db.remove_channel(channel),
    })
}

// PART FOR --- RESULTS ---

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_results_mode(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Database>,
) -> HandlerResult {
    let with_chat_id = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(WITH_CHAT_ID) => true,
        Some(WITHOUT_CHAT_ID) => false,
        _ => {
            bot.send_message(msg.chat.id, "Noto'g'ri tanlov. Iltimos, qaytadan tanlang.")
                .reply_markup(results_mode_keyboard())
                .await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, "Iltimos, test ID kiritishingiz kerak:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue
        .update(BotState::ReceiveAdminResultsQuizId { with_chat_id })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn show_admin_results(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    with_chat_id: bool,
    db: Arc<Database>,
) -> HandlerResult {
    let quiz_id = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
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
    log::info!("{} views {} results of '{}'", msg.chat.id.0, board.participants(), quiz_id);
    bot.send_message(msg.chat.id, board.render_for_admin(with_chat_id))
        .reply_markup(admin_menu_keyboard())
        .await?;
    Ok(())
}

// PART FOR --- USERS ---

pub(crate) async fn view_users(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, db: &Database) -> HandlerResult {
    if !passes_gate(bot, chat_id, db).await? {
        return Ok(());
    }
    bot.send_message(chat_id, "Sinfni tanlang:")
        .reply_markup(grades_keyboard())
        .await?;
    dialogue.update(BotState::BrowseGrade).await?;
    Ok(())
}

async fn ask_region(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, grade: u8, db: &Database) -> HandlerResult {
    bot.send_message(chat_id, "Viloyatni tanlang:")
        .reply_markup(choices_keyboard(&db.address().regions()))
        .await?;
    dialogue.update(BotState::BrowseRegion { grade }).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn browse_grade(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    match msg.text() {
        Some(BACK) => back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(text) => match parse_grade_button(text) {
            Ok(grade) => ask_region(&bot, &dialogue, msg.chat.id, grade, &db).await?,
            Err(e) => {
                bot.send_message(msg.chat.id, e.user_message())
                    .reply_markup(grades_keyboard())
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Sinfni tanlang:")
                .reply_markup(grades_keyboard())
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn browse_region(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    grade: u8,
    db: Arc<Database>,
) -> HandlerResult {
    match msg.text() {
        Some(BACK) => view_users(&bot, &dialogue, msg.chat.id, &db).await?,
        Some(region) if db.address().has_region(region) => {
            bot.send_message(msg.chat.id, "Tumaningizni tanlang:")
                .reply_markup(choices_keyboard(db.address().districts(region)))
                .await?;
            dialogue
                .update(BotState::BrowseDistrict {
                    grade,
                    region: region.to_owned(),
                })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Noto'g'ri viloyat tanlandi. Iltimos, qayta tanlang.")
                .reply_markup(choices_keyboard(&db.address().regions()))
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn browse_district(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    (grade, region): (u8, String),
    db: Arc<Database>,
) -> HandlerResult {
    let district = match msg.text() {
        Some(BACK) => return ask_region(&bot, &dialogue, msg.chat.id, grade, &db).await,
        Some(text) => db.address().resolve_district(&region, text),
        None => None,
    };

    let Some(district) = district else {
        bot.send_message(msg.chat.id, "Noto'g'ri tuman tanlandi. Iltimos, qayta tanlang.")
            .reply_markup(choices_keyboard(db.address().districts(&region)))
            .await?;
        return Ok(());
    };

    let users = users_in(&db.profiles(), grade, &region, &district);
    log::info!(
        "{} browses {} users of grade {} in {}, {}",
        msg.chat.id.0,
        users.len(),
        grade,
        region,
        district
    );
    bot.send_message(msg.chat.id, render_user_list(&users)).await?;
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

// PART FOR --- TANGA ---

pub(crate) async fn grant_tanga(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Foydalanuvchi ID sini kiriting:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveGrantUser).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_grant_user(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Database>,
) -> HandlerResult {
    let target = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(id) => db.find_chat(id),
        None => None,
    };

    let Some(profile_chat) = target else {
        bot.send_message(
            msg.chat.id,
            "Foydalanuvchi topilmadi. Iltimos, to'g'ri foydalanuvchi ID sini kiriting.",
        )
        .await?;
        return Ok(());
    };

    let name = db
        .profile(profile_chat)
        .map(|profile| profile.display_name().to_owned())
        .unwrap_or_default();
    bot.send_message(msg.chat.id, format!("Qancha tanga berishni xohlaysiz {name} foydalanuvchisiga?"))
        .await?;
    dialogue
        .update(BotState::ReceiveGrantAmount { user: profile_chat.0 })
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_grant_amount(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    user: i64,
    db: Arc<Database>,
) -> HandlerResult {
    let text = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => text,
        None => "",
    };

    if !still_admin(&bot, &dialogue, msg.chat.id, db.as_ref()).await? {
        return Ok(());
    }

    let amount = match parse_amount(text) {
        Ok(amount) => amount,
        Err(e) => {
            let name = db
                .profile(ChatId(user))
                .map(|profile| profile.display_name().to_owned())
                .unwrap_or_default();
            bot.send_message(msg.chat.id, e.user_message()).await?;
            bot.send_message(msg.chat.id, format!("Qancha tanga berishni xohlaysiz {name} foydalanuvchisiga?"))
                .await?;
            return Ok(());
        }
    };

    let granted = db.edit_profile(ChatId(user), |profile| {
        profile.balance += amount;
        (profile.display_name().to_owned(), profile.balance)
    });
    match granted {
        Some((name, balance)) => {
            log::info!("{} grants {} tanga to {}, balance now {}", msg.chat.id.0, amount, user, balance);
            bot.send_message(msg.chat.id, format!("{name} foydalanuvchisiga {amount} tanga berildi."))
                .await?;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                "Foydalanuvchi topilmadi. Iltimos, to'g'ri foydalanuvchi ID sini kiriting.",
            )
            .await?;
        }
    }
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

// PART FOR --- BROADCAST ---

pub(crate) async fn broadcast(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Yuboriladigan xabarni kiriting:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveBroadcast).await?;
    Ok(())
}

/// Sends the text to every known chat. Failed deliveries are logged and skipped.
#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_broadcast(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Database>,
) -> HandlerResult {
    let text = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => text,
        None => {
            bot.send_message(msg.chat.id, "Yuboriladigan xabarni kiriting:").await?;
            return Ok(());
        }
    };

    if !still_admin(&bot, &dialogue, msg.chat.id, db.as_ref()).await? {
        return Ok(());
    }

    let recipients: Vec<i64> = db.profiles().keys().copied().collect();
    let mut delivered = 0usize;
    for recipient in &recipients {
        match bot.send_message(ChatId(*recipient), text).await {
            Ok(_) => delivered += 1,
            Err(e) => log::error!("Broadcast to {} failed: {}", recipient, e),
        }
    }
    log::info!("{} broadcast delivered to {}/{} chats", msg.chat.id.0, delivered, recipients.len());

    bot.send_message(msg.chat.id, "Xabar barcha foydalanuvchilarga yuborildi.").await?;
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

// PART FOR --- ADMINS ---

pub(crate) async fn manage_admins(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Adminlarni boshqarish paneli:")
        .reply_markup(manage_admins_keyboard())
        .await?;
    Ok(())
}

pub(crate) async fn add_admin(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Yangi adminning chat ID sini kiriting:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveNewAdmin).await?;
    Ok(())
}

/// Only the root admin removes admins.
pub(crate) async fn remove_admin<Db: ManageAdmins>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    if !db.is_root_admin(chat_id) {
        bot.send_message(chat_id, "Sizda bu amalni bajarish uchun ruxsat yo'q.").await?;
        return Ok(());
    }
    bot.send_message(chat_id, "Adminni o'chirish uchun chat ID sini kiriting:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::ReceiveRemovedAdmin).await?;
    Ok(())
}

pub(crate) async fn list_admins<Db: ManageAdmins>(bot: &Bot, chat_id: ChatId, db: &Db) -> HandlerResult {
    let admins = db
        .admins()
        .into_iter()
        .map(|admin| admin.0.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    bot.send_message(chat_id, format!("Adminlar ro'yxati:\n{admins}")).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_new_admin(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    let text = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => text,
        None => "",
    };

    if !still_admin(&bot, &dialogue, msg.chat.id, db.as_ref()).await? {
        return Ok(());
    }

    let new_admin = match parse_chat_id(text) {
        Ok(new_admin) => ChatId(new_admin),
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
            return Ok(());
        }
    };

    if db.profile(new_admin).is_none() {
        bot.send_message(msg.chat.id, "Chat ID mavjud foydalanuvchi emas.").await?;
        return Ok(());
    }

    if db.add_admin(new_admin) {
        log::info!("{} promotes {} to admin", msg.chat.id.0, new_admin.0);
        bot.send_message(msg.chat.id, format!("Chat ID {} admin qilib qo'shildi.", new_admin.0))
            .await?;
    } else {
        bot.send_message(msg.chat.id, format!("Chat ID {} allaqachon admin.", new_admin.0))
            .await?;
    }
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_removed_admin(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Database>,
) -> HandlerResult {
    let text = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => text,
        None => "",
    };

    if !db.is_root_admin(msg.chat.id) {
        bot.send_message(msg.chat.id, "Sizda bu amalni bajarish uchun ruxsat yo'q.").await?;
        return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await;
    }

    let removed = match parse_chat_id(text) {
        Ok(removed) => ChatId(removed),
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
            return Ok(());
        }
    };

    if db.is_root_admin(removed) {
        bot.send_message(msg.chat.id, "Asosiy adminni o'chirib bo'lmaydi.").await?;
    } else if db.remove_admin(removed) {
        log::info!("{} revokes admin rights of {}", msg.chat.id.0, removed.0);
        bot.send_message(msg.chat.id, format!("Chat ID {} adminlardan o'chirildi.", removed.0))
            .await?;
    } else {
        bot.send_message(msg.chat.id, format!("Chat ID {} admin emas.", removed.0))
            .await?;
    }
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

// PART FOR --- CHANNELS ---

pub(crate) async fn manage_channels(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Kanallarni boshqarish paneli:")
        .reply_markup(manage_channels_keyboard())
        .await?;
    Ok(())
}

pub(crate) async fn add_channel(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(
        chat_id,
        "Qo'shmoqchi bo'lgan kanalni username'ini kiriting (masalan, channel_name):",
    )
    .reply_markup(back_keyboard())
    .await?;
    dialogue.update(BotState::ReceiveNewChannel).await?;
    Ok(())
}

pub(crate) async fn remove_channel(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(
        chat_id,
        "O'chirmoqchi bo'lgan kanalni username'ini kiriting (masalan, channel_name):",
    )
    .reply_markup(back_keyboard())
    .await?;
    dialogue.update(BotState::ReceiveRemovedChannel).await?;
    Ok(())
}

pub(crate) async fn list_channels<Db: ManageChannels + ManageAdmins + RetrieveProfile>(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    db: &Db,
) -> HandlerResult {
    let channels = db.channels();
    if channels.is_empty() {
        bot.send_message(chat_id, "Hozircha hech qanday kanal qo'shilmagan.").await?;
    } else {
        let listed = channels
            .iter()
            .map(|channel| format!("@{channel}"))
            .collect::<Vec<_>>()
            .join("\n");
        bot.send_message(chat_id, format!("Kanallar ro'yxati:\n\n{listed}")).await?;
    }
    back_to_admin_main(bot, dialogue, chat_id, db).await
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_new_channel<Db: ManageChannels + ManageAdmins + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Db>,
) -> HandlerResult {
    let channel = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => normalize_channel(text),
        None => String::new(),
    };

    if channel.is_empty() {
        bot.send_message(
            msg.chat.id,
            "Qo'shmoqchi bo'lgan kanalni username'ini kiriting (masalan, channel_name):",
        )
        .await?;
        return Ok(());
    }

    let Some(added) = edit_channels(db.as_ref(), msg.chat.id, ChannelEdit::Add, &channel) else {
        return refuse_lost_rights(&bot, &dialogue, msg.chat.id, db.as_ref()).await;
    };

    if added {
        log::info!("{} requires channel @{}", msg.chat.id.0, channel);
        bot.send_message(msg.chat.id, format!("Kanal @{channel} muvaffaqiyatli qo'shildi."))
            .await?;
    } else {
        bot.send_message(msg.chat.id, format!("Kanal @{channel} allaqachon mavjud."))
            .await?;
    }
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_removed_channel<Db: ManageChannels + ManageAdmins + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Db>,
) -> HandlerResult {
    let channel = match msg.text() {
        Some(BACK) => return back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await,
        Some(text) => normalize_channel(text),
        None => String::new(),
    };

    let Some(removed) = edit_channels(db.as_ref(), msg.chat.id, ChannelEdit::Remove, &channel) else {
        return refuse_lost_rights(&bot, &dialogue, msg.chat.id, db.as_ref()).await;
    };

    if removed {
        log::info!("{} drops channel @{}", msg.chat.id.0, channel);
        bot.send_message(msg.chat.id, format!("Kanal @{channel} muvaffaqiyatli o'chirildi."))
            .await?;
    } else {
        bot.send_message(msg.chat.id, format!("Kanal @{channel} topilmadi."))
            .await?;
    }
    back_to_admin_main(&bot, &dialogue, msg.chat.id, db.as_ref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::backend::MemoryBackend;

    fn profile(display_id: &str, grade: u8, region: &str, district: &str) -> Profile {
        let mut profile = Profile::new(display_id.to_owned());
        profile.name = Some(format!("user {display_id}"));
        profile.grade = Some(grade);
        profile.region = Some(region.to_owned());
        profile.district = Some(district.to_owned());
        profile
    }

    fn profiles() -> Profiles {
        Profiles::from([
            (1, profile("00001", 9, "Toshkent", "Chilonzor tuman")),
            (2, profile("00002", 9, "Toshkent", "Yunusobod tuman")),
            (3, profile("00003", 10, "Toshkent", "Chilonzor tuman")),
            (4, profile("00004", 9, "Toshkent", "Chilonzor tuman")),
        ])
    }

    #[test]
    fn browsing_matches_grade_region_and_district() {
        let found = users_in(&profiles(), 9, "Toshkent", "Chilonzor tuman");
        let ids: Vec<&str> = found.iter().map(|profile| profile.display_id.as_str()).collect();
        assert_eq!(ids, vec!["00001", "00004"]);
    }

    #[test]
    fn incomplete_profiles_are_not_listed() {
        let mut profiles = profiles();
        profiles.insert(5, Profile::new("00005".to_owned()));
        assert!(users_in(&profiles, 9, "Samarqand", "Urgut tuman").is_empty());
    }

    #[test]
    fn user_list_rendering() {
        assert_eq!(render_user_list(&[]), "Bu tanlov bo'yicha foydalanuvchilar topilmadi.");

        let listed = render_user_list(&users_in(&profiles(), 10, "Toshkent", "Chilonzor tuman"));
        assert!(listed.starts_with("Foydalanuvchilar ro'yxati:\n\nIsm: user 00003"));
        assert!(listed.contains("Foydalanuvchi ID: 00003"));
    }

    #[test]
    fn demoted_admin_cannot_edit_channels() {
        let root = ChatId(1000);
        let helper = ChatId(7);
        let db = Database::open(MemoryBackend::new(), root);
        db.add_admin(helper);

        assert_eq!(edit_channels(&db, helper, ChannelEdit::Add, "maktab"), Some(true));
        db.remove_admin(helper);

        assert_eq!(edit_channels(&db, helper, ChannelEdit::Add, "olimpiada"), None);
        assert_eq!(edit_channels(&db, helper, ChannelEdit::Remove, "maktab"), None);
        assert_eq!(db.channels(), vec!["maktab"]);

        assert_eq!(edit_channels(&db, root, ChannelEdit::Remove, "maktab"), Some(true));
        assert_eq!(edit_channels(&db, root, ChannelEdit::Remove, "maktab"), Some(false));
    }
}
