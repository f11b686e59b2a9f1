use std::sync::Arc;

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        DpHandlerDescription, UpdateFilterExt, UpdateHandler,
    },
    dptree::{self, Handler},
    prelude::{DependencyMap, Requester},
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    admin,
    commands::{admin_start, cancel, help, start, Command},
    constructor,
    database::connection::{Database, ManageAdmins, RetrieveProfile},
    editor,
    keyboard::MenuAction,
    menu::{back_to_admin_main, passes_gate, show_user_menu, NO_ADMIN_RIGHTS},
    runner,
    state::BotState,
    HandlerResult, UserDialogue,
};

type Branch = Handler<'static, DependencyMap, HandlerResult, DpHandlerDescription>;

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::AdminStart].endpoint(admin_start))
        .branch(case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![BotState::Idle].endpoint(dispatch_menu))
        .branch(profile_scheme())
        .branch(running_scheme())
        .branch(constructor_scheme())
        .branch(admin_scheme())
        .endpoint(invalid_state);

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>().branch(handler)
}

/// Routes a main-menu button pressed while no flow is active.
#[instrument(level = "info", skip(bot, dialogue, db))]
async fn dispatch_menu(bot: Bot, dialogue: UserDialogue, msg: Message, db: Arc<Database>) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(action) = msg.text().and_then(MenuAction::parse) else {
        return invalid_state(bot, msg).await;
    };

    let is_admin = db.is_admin(chat_id);
    if action.requires_admin() && !is_admin {
        log::info!("{} pressed '{}' without admin rights", chat_id.0, action.label());
        bot.send_message(chat_id, NO_ADMIN_RIGHTS).await?;
        return Ok(());
    }

    let needs_profile = !action.requires_admin()
        && action != MenuAction::Back
        && !(action == MenuAction::ViewResults && is_admin);
    let profile = db.profile(chat_id);
    let profile = match profile {
        Some(profile) if profile.is_complete() => Some(profile),
        _ if needs_profile => return editor::ensure_profile(&bot, &dialogue, chat_id, &db).await,
        _ => None,
    };

    log::info!("{} chooses '{}'", msg.chat.username().unwrap_or("anonymous"), action.label());
    match (action, profile) {
        (MenuAction::StartQuiz, _) => runner::start_test(&bot, &dialogue, chat_id, &db).await?,
        (MenuAction::ViewResults, _) => runner::view_results(&bot, &dialogue, chat_id, &db).await?,
        (MenuAction::ViewInfo, Some(profile)) => {
            if passes_gate(&bot, chat_id, db.as_ref()).await? {
                editor::view_information(&bot, chat_id, &profile).await?;
            }
        }
        (MenuAction::ViewBalance, Some(profile)) => {
            if passes_gate(&bot, chat_id, db.as_ref()).await? {
                editor::view_balance(&bot, chat_id, &profile).await?;
            }
        }
        (MenuAction::EditInfo, _) => {
            if passes_gate(&bot, chat_id, db.as_ref()).await? {
                editor::edit_information(&bot, chat_id).await?;
            }
        }
        (MenuAction::EditName, _) => editor::start_edit_name(&bot, &dialogue, chat_id).await?,
        (MenuAction::EditRegion, _) => editor::start_edit_region(&bot, &dialogue, chat_id, &db).await?,
        (MenuAction::EditDistrict, Some(profile)) => {
            editor::start_edit_district(&bot, &dialogue, chat_id, &profile, &db).await?
        }
        (MenuAction::UploadQuiz, _) => constructor::upload_quiz(&bot, &dialogue, chat_id, db.as_ref()).await?,
        (MenuAction::ViewUsers, _) => admin::view_users(&bot, &dialogue, chat_id, &db).await?,
        (MenuAction::ManageAdmins, _) => admin::manage_admins(&bot, chat_id).await?,
        (MenuAction::ManageChannels, _) => admin::manage_channels(&bot, chat_id).await?,
        (MenuAction::GrantTanga, _) => admin::grant_tanga(&bot, &dialogue, chat_id).await?,
        (MenuAction::Broadcast, _) => admin::broadcast(&bot, &dialogue, chat_id).await?,
        (MenuAction::AddAdmin, _) => admin::add_admin(&bot, &dialogue, chat_id).await?,
        (MenuAction::RemoveAdmin, _) => admin::remove_admin(&bot, &dialogue, chat_id, db.as_ref()).await?,
        (MenuAction::ListAdmins, _) => admin::list_admins(&bot, chat_id, db.as_ref()).await?,
        (MenuAction::AddChannel, _) => admin::add_channel(&bot, &dialogue, chat_id).await?,
        (MenuAction::RemoveChannel, _) => admin::remove_channel(&bot, &dialogue, chat_id).await?,
        (MenuAction::ListChannels, _) => admin::list_channels(&bot, &dialogue, chat_id, db.as_ref()).await?,
        (MenuAction::Back, _) if is_admin => back_to_admin_main(&bot, &dialogue, chat_id, db.as_ref()).await?,
        (MenuAction::Back, _) => show_user_menu(&bot, &dialogue, chat_id, db.as_ref()).await?,
        (MenuAction::ViewInfo | MenuAction::ViewBalance | MenuAction::EditDistrict, None) => {
            editor::ensure_profile(&bot, &dialogue, chat_id, &db).await?
        }
    }

    Ok(())
}

#[instrument(level = "debug")]
fn profile_scheme() -> Branch {
    use dptree::case;
    log::debug!("Building a dispatch tree for profiles");
    Update::filter_message()
        .branch(case![BotState::Onboarding { field }].endpoint(editor::receive_field))
        .branch(case![BotState::EditName].endpoint(editor::edit_name::<Database>))
        .branch(case![BotState::EditRegion].endpoint(editor::edit_region))
        .branch(case![BotState::EditDistrict].endpoint(editor::edit_district))
}

#[instrument(level = "debug")]
fn running_scheme() -> Branch {
    use dptree::case;
    log::debug!("Building a dispatch tree for quiz runs");
    Update::filter_message()
        .branch(case![BotState::ReceiveQuizId].endpoint(runner::receive_quiz_id))
        .branch(
            case![BotState::AnswerQuestion {
                grade,
                quiz_id,
                index
            }]
            .endpoint(runner::take_answer),
        )
        .branch(case![BotState::ReceiveResultsQuizId].endpoint(runner::receive_results_quiz_id))
}

#[instrument(level = "debug")]
fn constructor_scheme() -> Branch {
    use dptree::case;
    log::debug!("Building a dispatch tree for the quiz constructor");
    Update::filter_message()
        .branch(case![BotState::ReceiveGrade].endpoint(constructor::receive_grade))
        .branch(
            case![BotState::ReceiveNewQuizId { grade }]
                .endpoint(constructor::receive_new_quiz_id::<Database>),
        )
        .branch(
            case![BotState::ReceiveStartTime { grade, quiz_id }].endpoint(constructor::receive_start_time),
        )
        .branch(
            case![BotState::ReceiveEndTime {
                grade,
                quiz_id,
                start_time
            }]
            .endpoint(constructor::receive_end_time),
        )
        .branch(
            case![BotState::ReceiveQuestion { draft }].endpoint(constructor::receive_question::<Database>),
        )
        .branch(
            case![BotState::ReceiveOptionCount { draft, text }]
                .endpoint(constructor::receive_option_count::<Database>),
        )
        .branch(
            case![BotState::ReceiveCorrectAnswer {
                draft,
                text,
                option_count
            }]
            .endpoint(constructor::receive_correct_answer),
        )
}

#[instrument(level = "debug")]
fn admin_scheme() -> Branch {
    use dptree::case;
    log::debug!("Building a dispatch tree for the admin panel");
    Update::filter_message()
        .branch(case![BotState::ReceiveResultsMode].endpoint(admin::receive_results_mode))
        .branch(
            case![BotState::ReceiveAdminResultsQuizId { with_chat_id }].endpoint(admin::show_admin_results),
        )
        .branch(case![BotState::BrowseGrade].endpoint(admin::browse_grade))
        .branch(case![BotState::BrowseRegion { grade }].endpoint(admin::browse_region))
        .branch(case![BotState::BrowseDistrict { grade, region }].endpoint(admin::browse_district))
        .branch(case![BotState::ReceiveGrantUser].endpoint(admin::receive_grant_user))
        .branch(case![BotState::ReceiveGrantAmount { user }].endpoint(admin::receive_grant_amount))
        .branch(case![BotState::ReceiveBroadcast].endpoint(admin::receive_broadcast))
        .branch(case![BotState::ReceiveNewAdmin].endpoint(admin::receive_new_admin))
        .branch(case![BotState::ReceiveRemovedAdmin].endpoint(admin::receive_removed_admin))
        .branch(case![BotState::ReceiveNewChannel].endpoint(admin::receive_new_channel::<Database>))
        .branch(
            case![BotState::ReceiveRemovedChannel].endpoint(admin::receive_removed_channel::<Database>),
        )
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    log::info!(
        "{}: unhandled input '{:?}'",
        msg.chat.username().unwrap_or("anonymous"),
        msg.text()
    );
    bot.send_message(
        msg.chat.id,
        "Xabarni tushunmadim. Menyudan tanlang yoki /help buyrug'ini kiriting.",
    )
    .await?;
    Ok(())
}
