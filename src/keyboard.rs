use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub(crate) const BACK: &str = "⬅Ortga";
pub(crate) const FINISH: &str = "✅ Yakunlash";
pub(crate) const WITH_CHAT_ID: &str = "Chat ID bilan";
pub(crate) const WITHOUT_CHAT_ID: &str = "Chat ID siz";

/// Every reply-keyboard button the idle state reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    // user menu
    StartQuiz,
    ViewResults,
    ViewInfo,
    EditInfo,
    ViewBalance,
    // profile edit menu
    EditName,
    EditRegion,
    EditDistrict,
    // admin panel
    UploadQuiz,
    ViewUsers,
    ManageAdmins,
    ManageChannels,
    GrantTanga,
    Broadcast,
    // admin management
    AddAdmin,
    RemoveAdmin,
    ListAdmins,
    // channel management
    AddChannel,
    RemoveChannel,
    ListChannels,
    Back,
}

impl MenuAction {
    const LABELS: [(MenuAction, &'static str); 21] = [
        (MenuAction::StartQuiz, "📄 Test boshlash"),
        (MenuAction::ViewResults, "📊 Natijalarni ko'rish"),
        (MenuAction::ViewInfo, "👤 Ma'lumotlarni ko'rish"),
        (MenuAction::EditInfo, "✏ Ma'lumotlarni o'zgartirish"),
        (MenuAction::ViewBalance, "💰 Sandiq"),
        (MenuAction::EditName, "Ismni o'zgartirish"),
        (MenuAction::EditRegion, "Viloyatni o'zgartirish"),
        (MenuAction::EditDistrict, "Tumanini o'zgartirish"),
        (MenuAction::UploadQuiz, "📄 Test yuklash"),
        (MenuAction::ViewUsers, "👥 Foydalanuvchilar ko'rish"),
        (MenuAction::ManageAdmins, "🔧 Adminlar"),
        (MenuAction::ManageChannels, "📺 Kanallarni boshqarish"),
        (MenuAction::GrantTanga, "💰 Tangalar berish"),
        (MenuAction::Broadcast, "📢 Barchaga xabar yuborish"),
        (MenuAction::AddAdmin, "Yangi admin qo'shish"),
        (MenuAction::RemoveAdmin, "Adminni o'chirish"),
        (MenuAction::ListAdmins, "Adminlar ro'yxati"),
        (MenuAction::AddChannel, "Kanal qo'shish"),
        (MenuAction::RemoveChannel, "Kanalni o'chirish"),
        (MenuAction::ListChannels, "Kanallar ro'yxati"),
        (MenuAction::Back, BACK),
    ];

    pub fn parse(text: &str) -> Option<Self> {
        Self::LABELS
            .iter()
            .find(|(_, label)| *label == text)
            .map(|(action, _)| *action)
    }

    pub fn label(self) -> &'static str {
        Self::LABELS
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, label)| *label)
            .unwrap_or_default()
    }

    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            MenuAction::UploadQuiz
                | MenuAction::ViewUsers
                | MenuAction::ManageAdmins
                | MenuAction::ManageChannels
                | MenuAction::GrantTanga
                | MenuAction::Broadcast
                | MenuAction::AddAdmin
                | MenuAction::RemoveAdmin
                | MenuAction::ListAdmins
                | MenuAction::AddChannel
                | MenuAction::RemoveChannel
                | MenuAction::ListChannels
        )
    }
}

fn rows<I, S>(labels: I, width: usize) -> Vec<Vec<KeyboardButton>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let buttons: Vec<KeyboardButton> = labels.into_iter().map(KeyboardButton::new).collect();
    buttons.chunks(width.max(1)).map(<[KeyboardButton]>::to_vec).collect()
}

fn actions_keyboard(actions: &[MenuAction], width: usize) -> KeyboardMarkup {
    KeyboardMarkup::new(rows(actions.iter().map(|action| action.label()), width))
}

pub(crate) fn user_menu_keyboard() -> KeyboardMarkup {
    actions_keyboard(
        &[
            MenuAction::StartQuiz,
            MenuAction::ViewResults,
            MenuAction::ViewInfo,
            MenuAction::EditInfo,
            MenuAction::ViewBalance,
        ],
        2,
    )
}

pub(crate) fn admin_menu_keyboard() -> KeyboardMarkup {
    actions_keyboard(
        &[
            MenuAction::UploadQuiz,
            MenuAction::ViewResults,
            MenuAction::ViewUsers,
            MenuAction::ManageAdmins,
            MenuAction::ManageChannels,
            MenuAction::GrantTanga,
            MenuAction::Broadcast,
        ],
        2,
    )
}

pub(crate) fn edit_info_keyboard() -> KeyboardMarkup {
    actions_keyboard(
        &[
            MenuAction::EditName,
            MenuAction::EditRegion,
            MenuAction::EditDistrict,
            MenuAction::Back,
        ],
        2,
    )
}

pub(crate) fn manage_admins_keyboard() -> KeyboardMarkup {
    actions_keyboard(
        &[
            MenuAction::AddAdmin,
            MenuAction::RemoveAdmin,
            MenuAction::ListAdmins,
            MenuAction::Back,
        ],
        2,
    )
}

pub(crate) fn manage_channels_keyboard() -> KeyboardMarkup {
    actions_keyboard(
        &[
            MenuAction::AddChannel,
            MenuAction::RemoveChannel,
            MenuAction::ListChannels,
            MenuAction::Back,
        ],
        2,
    )
}

pub(crate) fn back_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BACK)]])
}

pub(crate) fn back_finish_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BACK), KeyboardButton::new(FINISH)]])
}

/// Choices followed by a back button, three per row.
pub(crate) fn choices_keyboard(choices: &[String]) -> KeyboardMarkup {
    let mut keyboard = rows(choices.iter().cloned(), 3);
    keyboard.push(vec![KeyboardButton::new(BACK)]);
    KeyboardMarkup::new(keyboard)
}

/// One button per answer letter.
pub(crate) fn options_keyboard(labels: &[String]) -> KeyboardMarkup {
    KeyboardMarkup::new(rows(labels.iter().cloned(), 1))
}

pub(crate) fn grades_keyboard() -> KeyboardMarkup {
    choices_keyboard(&(1..=12).map(|grade| format!("{grade} sinf")).collect::<Vec<_>>())
}

pub(crate) fn results_mode_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BACK)],
        vec![KeyboardButton::new(WITH_CHAT_ID), KeyboardButton::new(WITHOUT_CHAT_ID)],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_parse() {
        for (action, label) in MenuAction::LABELS {
            assert_eq!(MenuAction::parse(label), Some(action));
            assert_eq!(action.label(), label);
        }
        assert_eq!(MenuAction::parse("📄 Test"), None);
    }

    #[test]
    fn user_actions_do_not_need_admin() {
        assert!(!MenuAction::StartQuiz.requires_admin());
        assert!(!MenuAction::ViewResults.requires_admin());
        assert!(MenuAction::Broadcast.requires_admin());
    }

    #[test]
    fn choices_end_with_back_row() {
        let keyboard = choices_keyboard(&["a".to_owned(), "b".to_owned(), "c".to_owned(), "d".to_owned()]);
        assert_eq!(keyboard.keyboard.len(), 3);
        assert_eq!(keyboard.keyboard[2][0].text, BACK);
    }
}
