use teloxide::types::ChatId;

use crate::database::{profile::Profiles, quiz::Question};

/// Size of the user-facing leaderboard.
pub const TOP_SIZE: usize = 10;

/// Reward brackets as `(exclusive lower percentage bound, reward)`, checked top-down.
const REWARD_BRACKETS: [(u64, i64); 8] = [
    (90, 10),
    (85, 9),
    (80, 8),
    (70, 7),
    (65, 6),
    (50, 5),
    (30, 3),
    (0, 1),
];

const ZERO_SCORE_PENALTY: i64 = -5;

/// Counts positions where the answer equals the question's correct letter,
/// pairing both sequences up to the shorter one.
pub fn score(answers: &[String], questions: &[Question]) -> u32 {
    answers
        .iter()
        .zip(questions)
        .filter(|(answer, question)| answer.as_str() == question.correct_answer())
        .count() as u32
}

/// Tanga earned for `score` out of `total`.
///
/// The bracket lookup and the zero-score penalty are independent checks.
/// A zero score never matches a bracket, so it nets the bare penalty.
/// An empty quiz counts as 0%.
pub fn reward(score: u32, total: usize) -> i64 {
    let (score, total) = (u64::from(score), total as u64);

    let mut reward = REWARD_BRACKETS
        .iter()
        // percentage > bound  <=>  100 * score > bound * total
        .find(|(bound, _)| total > 0 && 100 * score > bound * total)
        .map(|(_, reward)| *reward)
        .unwrap_or(0);

    if score == 0 {
        reward += ZERO_SCORE_PENALTY;
    }
    reward
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub chat_id: ChatId,
    pub name: String,
    pub score: u32,
}

/// Every recorded attempt of one quiz, best score first.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    quiz_id: String,
    standings: Vec<Standing>,
}

impl Leaderboard {
    /// Ranks are strictly positional; ties keep profile order.
    pub fn collect(profiles: &Profiles, quiz_id: &str) -> Self {
        let mut entries: Vec<(ChatId, String, u32)> = profiles
            .iter()
            .filter_map(|(chat_id, profile)| {
                profile.attempts.get(quiz_id).map(|attempt| {
                    (ChatId(*chat_id), profile.display_name().to_owned(), attempt.score)
                })
            })
            .collect();
        entries.sort_by(|a, b| b.2.cmp(&a.2));

        let standings = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (chat_id, name, score))| Standing {
                rank: idx + 1,
                chat_id,
                name,
                score,
            })
            .collect();

        Self {
            quiz_id: quiz_id.to_owned(),
            standings,
        }
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    pub fn participants(&self) -> usize {
        self.standings.len()
    }

    pub fn top(&self) -> &[Standing] {
        &self.standings[..self.standings.len().min(TOP_SIZE)]
    }

    pub fn standing_of(&self, chat_id: ChatId) -> Option<&Standing> {
        self.standings.iter().find(|standing| standing.chat_id == chat_id)
    }

    /// Top list for `viewer`, with the viewer's own row appended after an
    /// ellipsis when they are outside the top.
    pub fn render_for(&self, viewer: ChatId) -> String {
        let mut rankings = String::from("Top 10:\n");
        for standing in self.top() {
            rankings.push_str(&format!("{}. {} - {} ball\n", standing.rank, standing.name, standing.score));
        }
        if let Some(own) = self.standing_of(viewer).filter(|own| own.rank > TOP_SIZE) {
            rankings.push_str("...\n");
            rankings.push_str(&format!("{}. {} - {} ball\n", own.rank, own.name, own.score));
        }
        format!("Test ID: {}\nNatijalar:\n{}", self.quiz_id, rankings)
    }

    pub fn render_for_admin(&self, with_chat_id: bool) -> String {
        let results = self
            .standings
            .iter()
            .map(|standing| {
                if with_chat_id {
                    format!("Ism: {}, Baho: {}, Chat ID: {}", standing.name, standing.score, standing.chat_id.0)
                } else {
                    format!("Ism: {}, Baho: {}", standing.name, standing.score)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("Test ID: {}\nNatijalar:\n{}", self.quiz_id, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::profile::{Profile, QuizAttempt};

    fn questions(correct: &[&str]) -> Vec<Question> {
        correct
            .iter()
            .map(|letter| Question::new("?".to_owned(), 4, (*letter).to_owned()))
            .collect()
    }

    fn answers(given: &[&str]) -> Vec<String> {
        given.iter().map(|a| (*a).to_owned()).collect()
    }

    fn profiles_with_scores(scores: &[(i64, &str, u32)]) -> Profiles {
        let mut profiles = Profiles::new();
        for (idx, (chat_id, name, score)) in scores.iter().enumerate() {
            let mut profile = Profile::new(format!("{:05}", idx + 1));
            profile.name = Some((*name).to_owned());
            profile.attempts.insert(
                "T1".to_owned(),
                QuizAttempt {
                    answers: vec![],
                    score: *score,
                },
            );
            profiles.insert(*chat_id, profile);
        }
        profiles
    }

    #[test]
    fn score_counts_positional_matches() {
        assert_eq!(score(&answers(&["A", "C"]), &questions(&["A", "B"])), 1);
    }

    #[test]
    fn score_tolerates_short_answer_list() {
        assert_eq!(score(&answers(&["A"]), &questions(&["A", "B", "C"])), 1);
        assert_eq!(score(&[], &questions(&["A"])), 0);
    }

    #[test]
    fn out_of_range_letters_never_match() {
        assert_eq!(score(&answers(&["Z", "1"]), &questions(&["A", "B"])), 0);
    }

    #[test]
    fn reward_table_edges() {
        assert_eq!(reward(0, 10), -5);
        assert_eq!(reward(9, 10), 9);
        assert_eq!(reward(10, 10), 10);
        assert_eq!(reward(1, 10), 1);
        assert_eq!(reward(3, 10), 1);
        assert_eq!(reward(4, 10), 3);
        assert_eq!(reward(5, 10), 3);
        assert_eq!(reward(6, 10), 5);
        assert_eq!(reward(7, 10), 6);
        assert_eq!(reward(8, 10), 7);
        assert_eq!(reward(17, 20), 8);
        assert_eq!(reward(35, 40), 9);
    }

    #[test]
    fn empty_quiz_only_gets_penalty() {
        assert_eq!(reward(0, 0), -5);
    }

    #[test]
    fn leaderboard_breaks_ties_by_profile_order() {
        let profiles = profiles_with_scores(&[(1, "u1", 80), (2, "u2", 95), (3, "u3", 95), (4, "u4", 10)]);
        let board = Leaderboard::collect(&profiles, "T1");

        let order: Vec<(usize, &str, u32)> = board
            .standings()
            .iter()
            .map(|s| (s.rank, s.name.as_str(), s.score))
            .collect();
        assert_eq!(order, vec![(1, "u2", 95), (2, "u3", 95), (3, "u1", 80), (4, "u4", 10)]);
    }

    #[test]
    fn leaderboard_skips_users_without_attempt() {
        let mut profiles = profiles_with_scores(&[(1, "u1", 3)]);
        profiles.insert(2, Profile::new("00002".to_owned()));

        let board = Leaderboard::collect(&profiles, "T1");
        assert_eq!(board.participants(), 1);
        assert!(board.standing_of(ChatId(2)).is_none());
        assert_eq!(Leaderboard::collect(&profiles, "T2").participants(), 0);
    }

    #[test]
    fn viewer_outside_top_gets_own_row() {
        let scores: Vec<(i64, String, u32)> = (1..=12).map(|i| (i, format!("u{i}"), 100 - i as u32)).collect();
        let scores: Vec<(i64, &str, u32)> = scores.iter().map(|(c, n, s)| (*c, n.as_str(), *s)).collect();
        let board = Leaderboard::collect(&profiles_with_scores(&scores), "T1");

        assert_eq!(board.top().len(), TOP_SIZE);

        let outside = board.render_for(ChatId(12));
        assert!(outside.contains("...\n12. u12 - 88 ball\n"));

        let inside = board.render_for(ChatId(3));
        assert!(!inside.contains("..."));
        assert!(inside.contains("3. u3 - 97 ball\n"));
    }

    #[test]
    fn admin_view_optionally_shows_chat_ids() {
        let board = Leaderboard::collect(&profiles_with_scores(&[(42, "Ali", 3), (43, "Vali", 5)]), "T1");

        assert_eq!(
            board.render_for_admin(true),
            "Test ID: T1\nNatijalar:\nIsm: Vali, Baho: 5, Chat ID: 43\nIsm: Ali, Baho: 3, Chat ID: 42"
        );
        assert_eq!(
            board.render_for_admin(false),
            "Test ID: T1\nNatijalar:\nIsm: Vali, Baho: 5\nIsm: Ali, Baho: 3"
        );
    }
}
