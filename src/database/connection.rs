use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::{IndexMap, IndexSet};
use serde::{de::DeserializeOwned, Serialize};
use teloxide::types::ChatId;

use super::{
    address::AddressBook,
    backend::{Backend, Document},
    profile::{next_display_id, Profile, Profiles},
    quiz::{Catalog, QuizDefinition},
};
use crate::error::StoreError;

/// In-memory stores loaded once at startup and flushed wholesale to the
/// backend after every mutation.
pub struct Database {
    backend: Box<dyn Backend>,
    profiles: Mutex<Profiles>,
    catalog: Mutex<Catalog>,
    channels: Mutex<Vec<String>>,
    admins: Mutex<IndexSet<i64>>,
    root_admin: ChatId,
    address: AddressBook,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn load_document<T: DeserializeOwned + Default>(backend: &dyn Backend, document: Document) -> T {
    let parsed = backend.load(document).and_then(|contents| match contents {
        Some(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            document: document.file_name(),
            source,
        }),
        None => Ok(T::default()),
    });

    match parsed {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{e}; starting with an empty store");
            T::default()
        }
    }
}

/// Decodes each quiz on its own so one half-written entry does not cost the
/// rest of the catalog.
fn load_catalog(backend: &dyn Backend) -> Catalog {
    let raw: IndexMap<u8, IndexMap<String, serde_json::Value>> = load_document(backend, Document::Catalog);

    raw.into_iter()
        .map(|(grade, quizzes)| {
            let quizzes = quizzes
                .into_iter()
                .filter_map(|(id, value)| match serde_json::from_value::<QuizDefinition>(value) {
                    Ok(quiz) => Some((id, quiz)),
                    Err(e) => {
                        log::warn!("Skipping quiz '{id}' in grade {grade}: {e}");
                        None
                    }
                })
                .collect();
            (grade, quizzes)
        })
        .collect()
}

impl Database {
    pub fn open(backend: impl Backend + 'static, root_admin: ChatId) -> Self {
        let backend: Box<dyn Backend> = Box::new(backend);

        let profiles: Profiles = load_document(backend.as_ref(), Document::Profiles);
        let catalog = load_catalog(backend.as_ref());
        let channels: Vec<String> = load_document(backend.as_ref(), Document::Channels);
        let address: AddressBook = load_document(backend.as_ref(), Document::Addresses);

        log::info!(
            "Loaded {} profiles, {} grades, {} required channels, {} regions",
            profiles.len(),
            catalog.len(),
            channels.len(),
            address.regions().len()
        );

        Self {
            backend,
            profiles: Mutex::new(profiles),
            catalog: Mutex::new(catalog),
            channels: Mutex::new(channels),
            admins: Mutex::new(IndexSet::from([root_admin.0])),
            root_admin,
            address,
        }
    }

    pub fn address(&self) -> &AddressBook {
        &self.address
    }

    fn flush<T: Serialize>(&self, document: Document, value: &T) {
        let written = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Json {
                document: document.file_name(),
                source,
            })
            .and_then(|contents| self.backend.save(document, &contents));

        match written {
            Ok(()) => log::debug!("Data successfully saved to {}", document.file_name()),
            Err(e) => log::error!("Error saving data: {e}"),
        }
    }
}

pub trait RetrieveQuiz {
    /// Looks a quiz up across every grade.
    fn find_quiz(&self, quiz_id: &str) -> Option<(u8, QuizDefinition)>;

    fn retrieve_quiz(&self, grade: u8, quiz_id: &str) -> Option<QuizDefinition>;

    fn catalog(&self) -> Catalog;
}

pub trait CreateQuiz {
    fn create_quiz(&self, grade: u8, quiz: QuizDefinition) -> String;
}

pub trait RetrieveProfile {
    fn profile(&self, chat_id: ChatId) -> Option<Profile>;

    fn profiles(&self) -> Profiles;

    /// Resolves either a raw chat id or a zero-padded display id.
    fn find_chat(&self, id: &str) -> Option<ChatId>;
}

pub trait EditProfile {
    /// Creates a profile on first contact and returns the current record.
    fn ensure_profile(&self, chat_id: ChatId) -> Profile;

    /// Applies `edit` to the stored profile and persists it. `None` when the
    /// chat has no profile.
    fn edit_profile<R>(&self, chat_id: ChatId, edit: impl FnOnce(&mut Profile) -> R) -> Option<R>;
}

pub trait ManageChannels {
    fn channels(&self) -> Vec<String>;

    fn add_channel(&self, channel: &str) -> bool;

    fn remove_channel(&self, channel: &str) -> bool;
}

pub trait ManageAdmins {
    fn is_admin(&self, chat_id: ChatId) -> bool;

    fn is_root_admin(&self, chat_id: ChatId) -> bool;

    fn admins(&self) -> Vec<ChatId>;

    fn add_admin(&self, chat_id: ChatId) -> bool;

    fn remove_admin(&self, chat_id: ChatId) -> bool;
}

impl RetrieveQuiz for Database {
    fn find_quiz(&self, quiz_id: &str) -> Option<(u8, QuizDefinition)> {
        lock(&self.catalog).iter().find_map(|(grade, quizzes)| {
            quizzes.get(quiz_id).map(|quiz| (*grade, quiz.clone()))
        })
    }

    fn retrieve_quiz(&self, grade: u8, quiz_id: &str) -> Option<QuizDefinition> {
        lock(&self.catalog).get(&grade)?.get(quiz_id).cloned()
    }

    fn catalog(&self) -> Catalog {
        lock(&self.catalog).clone()
    }
}

impl CreateQuiz for Database {
    fn create_quiz(&self, grade: u8, quiz: QuizDefinition) -> String {
        let mut catalog = lock(&self.catalog);
        let id = quiz.id().to_owned();
        log::debug!("Adding quiz {} with {} questions to grade {}", id, quiz.questions().len(), grade);
        catalog
            .entry(grade)
            .or_insert_with(IndexMap::new)
            .insert(id.clone(), quiz);
        self.flush(Document::Catalog, &*catalog);
        id
    }
}

impl RetrieveProfile for Database {
    fn profile(&self, chat_id: ChatId) -> Option<Profile> {
        lock(&self.profiles).get(&chat_id.0).cloned()
    }

    fn profiles(&self) -> Profiles {
        lock(&self.profiles).clone()
    }

    fn find_chat(&self, id: &str) -> Option<ChatId> {
        let id = id.trim();
        let profiles = lock(&self.profiles);

        if let Some(chat_id) = id.parse::<i64>().ok().filter(|chat_id| profiles.contains_key(chat_id)) {
            return Some(ChatId(chat_id));
        }

        profiles
            .iter()
            .find(|(_, profile)| profile.display_id == id)
            .map(|(chat_id, _)| ChatId(*chat_id))
    }
}

impl EditProfile for Database {
    fn ensure_profile(&self, chat_id: ChatId) -> Profile {
        let mut profiles = lock(&self.profiles);
        if let Some(profile) = profiles.get(&chat_id.0) {
            return profile.clone();
        }

        let profile = Profile::new(next_display_id(&profiles));
        log::info!("New user {} registered as {}", chat_id.0, profile.display_id);
        profiles.insert(chat_id.0, profile.clone());
        self.flush(Document::Profiles, &*profiles);
        profile
    }

    fn edit_profile<R>(&self, chat_id: ChatId, edit: impl FnOnce(&mut Profile) -> R) -> Option<R> {
        let mut profiles = lock(&self.profiles);
        let result = edit(profiles.get_mut(&chat_id.0)?);
        self.flush(Document::Profiles, &*profiles);
        Some(result)
    }
}

impl ManageChannels for Database {
    fn channels(&self) -> Vec<String> {
        lock(&self.channels).clone()
    }

    fn add_channel(&self, channel: &str) -> bool {
        let mut channels = lock(&self.channels);
        if channels.iter().any(|known| known == channel) {
            return false;
        }
        channels.push(channel.to_owned());
        self.flush(Document::Channels, &*channels);
        true
    }

    fn remove_channel(&self, channel: &str) -> bool {
        let mut channels = lock(&self.channels);
        let Some(position) = channels.iter().position(|known| known == channel) else {
            return false;
        };
        channels.remove(position);
        self.flush(Document::Channels, &*channels);
        true
    }
}

impl ManageAdmins for Database {
    fn is_admin(&self, chat_id: ChatId) -> bool {
        lock(&self.admins).contains(&chat_id.0)
    }

    fn is_root_admin(&self, chat_id: ChatId) -> bool {
        chat_id == self.root_admin
    }

    fn admins(&self) -> Vec<ChatId> {
        lock(&self.admins).iter().copied().map(ChatId).collect()
    }

    fn add_admin(&self, chat_id: ChatId) -> bool {
        lock(&self.admins).insert(chat_id.0)
    }

    fn remove_admin(&self, chat_id: ChatId) -> bool {
        if self.is_root_admin(chat_id) {
            return false;
        }
        lock(&self.admins).shift_remove(&chat_id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::backend::MemoryBackend;

    const ROOT: ChatId = ChatId(1000);

    #[test]
    fn malformed_documents_start_empty() {
        let backend = MemoryBackend::new()
            .with_document(Document::Profiles, "{ not json")
            .with_document(Document::Channels, r#"["olimpiada"]"#);
        let db = Database::open(backend, ROOT);

        assert!(db.profiles().is_empty());
        assert_eq!(db.channels(), vec!["olimpiada"]);
    }

    #[test]
    fn root_admin_is_seeded_and_cannot_be_removed() {
        let db = Database::open(MemoryBackend::new(), ROOT);
        assert!(db.is_admin(ROOT));
        assert!(!db.remove_admin(ROOT));

        assert!(db.add_admin(ChatId(7)));
        assert!(!db.add_admin(ChatId(7)));
        assert_eq!(db.admins(), vec![ROOT, ChatId(7)]);
        assert!(db.remove_admin(ChatId(7)));
        assert!(!db.is_admin(ChatId(7)));
    }

    #[test]
    fn channels_reject_duplicates() {
        let db = Database::open(MemoryBackend::new(), ROOT);
        assert!(db.add_channel("maktab"));
        assert!(!db.add_channel("maktab"));
        assert!(db.remove_channel("maktab"));
        assert!(!db.remove_channel("maktab"));
        assert!(db.channels().is_empty());
    }

    #[test]
    fn chats_resolve_by_chat_id_or_display_id() {
        let db = Database::open(MemoryBackend::new(), ROOT);
        db.ensure_profile(ChatId(555));
        db.ensure_profile(ChatId(777));

        assert_eq!(db.find_chat("555"), Some(ChatId(555)));
        assert_eq!(db.find_chat("00002"), Some(ChatId(777)));
        assert_eq!(db.find_chat("123"), None);
    }

    #[test]
    fn editing_unknown_profile_is_a_no_op() {
        let db = Database::open(MemoryBackend::new(), ROOT);
        assert_eq!(db.edit_profile(ChatId(9), |profile| profile.balance += 5), None);
    }
}
