use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message, ReplyMarkup},
    Bot,
};
use tracing::instrument;

use crate::{
    database::{
        address::AddressBook,
        connection::{Database, EditProfile, RetrieveProfile},
        profile::{Profile, ProfileField},
    },
    error::QuizError,
    keyboard::{back_keyboard, choices_keyboard, edit_info_keyboard, BACK},
    menu::{passes_gate, show_user_menu},
    state::BotState,
    validation::{parse_age, parse_grade, parse_phone},
    HandlerResult, UserDialogue,
};

/// Stores one onboarding answer on the profile after validating it.
pub fn fill_field(profile: &mut Profile, field: ProfileField, input: &str, address: &AddressBook) -> Result<(), QuizError> {
    match field {
        ProfileField::Name => profile.name = Some(input.to_owned()),
        ProfileField::Age => profile.age = Some(parse_age(input)?),
        ProfileField::Phone => profile.phone = Some(parse_phone(input)?),
        ProfileField::Grade => profile.grade = Some(parse_grade(input)?),
        ProfileField::Region => {
            if !address.has_region(input) {
                return Err(QuizError::InvalidInput(
                    "Noto'g'ri viloyat. Iltimos, qaytadan tanlang:".to_owned(),
                ));
            }
            profile.set_region(input.to_owned());
        }
        ProfileField::District => {
            let region = profile.region.clone().unwrap_or_default();
            let district = address.resolve_district(&region, input).ok_or_else(|| {
                QuizError::InvalidInput("Noto'g'ri tuman. Iltimos, qaytadan tanlang:".to_owned())
            })?;
            profile.district = Some(district);
        }
    }
    Ok(())
}

async fn prompt_field(bot: &Bot, chat_id: ChatId, field: ProfileField, profile: &Profile, db: &Database) -> HandlerResult {
    match field {
        ProfileField::Name => {
            bot.send_message(chat_id, "Ismingizni kiriting:")
                .reply_markup(ReplyMarkup::kb_remove())
                .await?;
        }
        ProfileField::Age => {
            bot.send_message(chat_id, "Yoshingizni kiriting (7-25 oralig'ida):").await?;
        }
        ProfileField::Phone => {
            bot.send_message(chat_id, "Telefon raqamingizni kiriting (+998XXXXXXXXX formatida):")
                .await?;
        }
        ProfileField::Grade => {
            bot.send_message(chat_id, "Sinfingizni kiriting (1-12):").await?;
        }
        ProfileField::Region => {
            bot.send_message(chat_id, "Viloyatingizni tanlang:")
                .reply_markup(choices_keyboard(&db.address().regions()))
                .await?;
        }
        ProfileField::District => {
            let region = profile.region.as_deref().unwrap_or_default();
            bot.send_message(chat_id, "Tumaningizni tanlang:")
                .reply_markup(choices_keyboard(db.address().districts(region)))
                .await?;
        }
    }
    Ok(())
}

/// Gate, first-contact registration and the mandatory onboarding sequence.
/// Shows the main menu once every profile field is filled.
#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn ensure_profile(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, db: &Database) -> HandlerResult {
    if !passes_gate(bot, chat_id, db).await? {
        dialogue.update(BotState::Idle).await?;
        return Ok(());
    }

    let profile = db.ensure_profile(chat_id);
    match profile.next_missing() {
        Some(field) => {
            log::info!("{} is asked for {:?}", chat_id.0, field);
            prompt_field(bot, chat_id, field, &profile, db).await?;
            dialogue.update(BotState::Onboarding { field }).await?;
        }
        None => show_user_menu(bot, dialogue, chat_id, db).await?,
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn receive_field(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    field: ProfileField,
    db: Arc<Database>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Iltimos, matn kiriting.").await?;
        return Ok(());
    };

    if text == BACK {
        return ensure_profile(&bot, &dialogue, msg.chat.id, &db).await;
    }

    let filled = db.edit_profile(msg.chat.id, |profile| fill_field(profile, field, text, db.address()));
    match filled {
        Some(Ok(())) => {
            log::info!("{} filled {:?}", msg.chat.username().unwrap_or("anonymous"), field);
            ensure_profile(&bot, &dialogue, msg.chat.id, &db).await?;
        }
        Some(Err(e)) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
        None => ensure_profile(&bot, &dialogue, msg.chat.id, &db).await?,
    }
    Ok(())
}

pub(crate) async fn view_information(bot: &Bot, chat_id: ChatId, profile: &Profile) -> HandlerResult {
    bot.send_message(chat_id, profile.to_string()).await?;
    Ok(())
}

pub(crate) async fn view_balance(bot: &Bot, chat_id: ChatId, profile: &Profile) -> HandlerResult {
    bot.send_message(chat_id, format!("Sizning tangalaringiz soni: {}", profile.balance))
        .await?;
    Ok(())
}

pub(crate) async fn edit_information(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Qaysi ma'lumotni o'zgartirmoqchisiz?")
        .reply_markup(edit_info_keyboard())
        .await?;
    Ok(())
}

pub(crate) async fn start_edit_name(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Yangi ismingizni kiriting:")
        .reply_markup(back_keyboard())
        .await?;
    dialogue.update(BotState::EditName).await?;
    Ok(())
}

pub(crate) async fn start_edit_region(bot: &Bot, dialogue: &UserDialogue, chat_id: ChatId, db: &Database) -> HandlerResult {
    bot.send_message(chat_id, "Yangi viloyatingizni tanlang:")
        .reply_markup(choices_keyboard(&db.address().regions()))
        .await?;
    dialogue.update(BotState::EditRegion).await?;
    Ok(())
}

pub(crate) async fn start_edit_district(
    bot: &Bot,
    dialogue: &UserDialogue,
    chat_id: ChatId,
    profile: &Profile,
    db: &Database,
) -> HandlerResult {
    let region = profile.region.as_deref().unwrap_or_default();
    bot.send_message(chat_id, "Yangi tumaningizni tanlang:")
        .reply_markup(choices_keyboard(db.address().districts(region)))
        .await?;
    dialogue.update(BotState::EditDistrict).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn edit_name<Db: EditProfile + RetrieveProfile>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    db: Arc<Db>,
) -> HandlerResult {
    match msg.text() {
        Some(BACK) => show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(new_name) => {
            log::info!("User '@{}' changes name to {}", msg.chat.username().unwrap_or("anonymous"), new_name);
            db.edit_profile(msg.chat.id, |profile| profile.name = Some(new_name.to_owned()));
            bot.send_message(msg.chat.id, format!("Ismingiz muvaffaqiyatli yangilandi: {new_name}"))
                .await?;
            show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Iltimos, matn kiriting.").await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn edit_region(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    match msg.text() {
        Some(BACK) => show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await?,
        Some(region) if db.address().has_region(region) => {
            log::info!("User '@{}' moves to region {}", msg.chat.username().unwrap_or("anonymous"), region);
            db.edit_profile(msg.chat.id, |profile| profile.set_region(region.to_owned()));
            bot.send_message(msg.chat.id, format!("Viloyatingiz muvaffaqiyatli yangilandi: {region}"))
                .await?;
            bot.send_message(msg.chat.id, "Endi yangi tumaningizni tanlang:")
                .reply_markup(choices_keyboard(db.address().districts(region)))
                .await?;
            dialogue.update(BotState::EditDistrict).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Noto'g'ri viloyat. Iltimos, qaytadan tanlang:")
                .await?;
        }
    }
    Ok(())
}

/// After a region change the district is empty, so backing out resumes
/// onboarding for it.
#[instrument(level = "info", skip(bot, dialogue, db))]
pub(crate) async fn edit_district(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Noto'g'ri tuman. Iltimos, qaytadan tanlang:").await?;
        return Ok(());
    };

    if text == BACK {
        return ensure_profile(&bot, &dialogue, msg.chat.id, &db).await;
    }

    let updated = db.edit_profile(msg.chat.id, |profile| {
        fill_field(profile, ProfileField::District, text, db.address()).map(|()| profile.district.clone())
    });
    match updated {
        Some(Ok(Some(district))) => {
            bot.send_message(msg.chat.id, format!("Tumaningiz muvaffaqiyatli yangilandi: {district}"))
                .await?;
            show_user_menu(&bot, &dialogue, msg.chat.id, db.as_ref()).await?;
        }
        Some(Err(e)) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
        _ => ensure_profile(&bot, &dialogue, msg.chat.id, &db).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> AddressBook {
        serde_json::from_str(r#"{"Toshkent": ["Chilonzor tuman"], "Samarqand": ["Urgut tuman"]}"#).unwrap()
    }

    #[test]
    fn invalid_answers_leave_profile_untouched() {
        let mut profile = Profile::new("00001".to_owned());
        assert!(fill_field(&mut profile, ProfileField::Age, "5", &book()).is_err());
        assert!(fill_field(&mut profile, ProfileField::Region, "Xorazm", &book()).is_err());
        assert_eq!(profile, Profile::new("00001".to_owned()));
    }

    #[test]
    fn district_is_checked_against_chosen_region() {
        let mut profile = Profile::new("00001".to_owned());
        fill_field(&mut profile, ProfileField::Region, "Samarqand", &book()).unwrap();

        assert!(fill_field(&mut profile, ProfileField::District, "Chilonzor", &book()).is_err());
        fill_field(&mut profile, ProfileField::District, "Urgut", &book()).unwrap();
        assert_eq!(profile.district.as_deref(), Some("Urgut tuman"));
    }

    #[test]
    fn new_region_drops_old_district() {
        let mut profile = Profile::new("00001".to_owned());
        fill_field(&mut profile, ProfileField::Region, "Toshkent", &book()).unwrap();
        fill_field(&mut profile, ProfileField::District, "Chilonzor tuman", &book()).unwrap();

        fill_field(&mut profile, ProfileField::Region, "Samarqand", &book()).unwrap();
        assert_eq!(profile.district, None);
    }
}
