use teloxide::{
    prelude::Requester,
    types::{ChatId, Recipient, UserId},
    Bot,
};
use tracing::instrument;

/// Answers "is this user currently in that channel".
pub(crate) trait MembershipCheck {
    async fn is_member(&self, channel: &str, user: ChatId) -> Result<bool, String>;
}

impl MembershipCheck for Bot {
    async fn is_member(&self, channel: &str, user: ChatId) -> Result<bool, String> {
        let user_id = u64::try_from(user.0).map_err(|_| format!("{} is not a user chat", user.0))?;
        let member = self
            .get_chat_member(Recipient::ChannelUsername(format!("@{channel}")), UserId(user_id))
            .await
            .map_err(|e| e.to_string())?;

        Ok(member.kind.is_owner() || member.kind.is_administrator() || member.kind.is_member())
    }
}

/// True when the user is in every required channel. Lookup failures count
/// as "not a member".
#[instrument(level = "debug", skip(checker))]
pub(crate) async fn is_subscribed<M: MembershipCheck>(checker: &M, channels: &[String], user: ChatId) -> bool {
    for channel in channels {
        match checker.is_member(channel, user).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                log::error!("Error checking channel @{}: {}", channel, e);
                return false;
            }
        }
    }
    true
}

pub(crate) fn join_prompt(channels: &[String]) -> String {
    let links = channels
        .iter()
        .map(|channel| format!("@{channel}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Botdan foydalanish uchun quyidagi kanallarga a'zo bo'ling:\n\n{links}\n\nBarcha kanallarga a'zo bo'lganingizdan so'ng, /start buyrug'ini kiriting."
    )
}

/// Channel usernames are stored without the leading `@`.
pub(crate) fn normalize_channel(input: &str) -> String {
    input.trim().replace('@', "")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FakeMembership(HashMap<&'static str, Result<bool, String>>);

    impl MembershipCheck for FakeMembership {
        async fn is_member(&self, channel: &str, _user: ChatId) -> Result<bool, String> {
            self.0.get(channel).cloned().unwrap_or(Ok(false))
        }
    }

    fn channels(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[tokio::test]
    async fn no_channels_always_pass() {
        let checker = FakeMembership(HashMap::new());
        assert!(is_subscribed(&checker, &[], ChatId(1)).await);
    }

    #[tokio::test]
    async fn every_channel_must_confirm() {
        let checker = FakeMembership(HashMap::from([("a", Ok(true)), ("b", Ok(false))]));
        assert!(is_subscribed(&checker, &channels(&["a"]), ChatId(1)).await);
        assert!(!is_subscribed(&checker, &channels(&["a", "b"]), ChatId(1)).await);
    }

    #[tokio::test]
    async fn lookup_errors_count_as_not_subscribed() {
        let checker = FakeMembership(HashMap::from([("a", Err("Bad Request: chat not found".to_owned()))]));
        assert!(!is_subscribed(&checker, &channels(&["a"]), ChatId(1)).await);
    }

    #[test]
    fn prompt_lists_channels() {
        assert!(join_prompt(&channels(&["maktab", "olimpiada"])).contains("@maktab\n@olimpiada"));
    }

    #[test]
    fn channel_names_drop_at_sign() {
        assert_eq!(normalize_channel(" @maktab "), "maktab");
    }
}
