use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::error::StoreError;

/// The flat documents the bot keeps its state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Profiles,
    Catalog,
    Channels,
    Addresses,
}

impl Document {
    pub fn file_name(self) -> &'static str {
        match self {
            Document::Profiles => "user.json",
            Document::Catalog => "test_data.json",
            Document::Channels => "channels.json",
            Document::Addresses => "address.json",
        }
    }
}

/// Where documents are read from at startup and rewritten on every mutation.
pub trait Backend: Send + Sync {
    /// `Ok(None)` when the document does not exist yet.
    fn load(&self, document: Document) -> Result<Option<String>, StoreError>;

    fn save(&self, document: Document, contents: &str) -> Result<(), StoreError>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn load(&self, document: Document) -> Result<Option<String>, StoreError> {
        (**self).load(document)
    }

    fn save(&self, document: Document, contents: &str) -> Result<(), StoreError> {
        (**self).save(document, contents)
    }
}

pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Backend for JsonFileBackend {
    fn load(&self, document: Document) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.dir.join(document.file_name())) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                document: document.file_name(),
                source,
            }),
        }
    }

    fn save(&self, document: Document, contents: &str) -> Result<(), StoreError> {
        fs::write(self.dir.join(document.file_name()), contents).map_err(|source| StoreError::Io {
            document: document.file_name(),
            source,
        })
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<Document, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, document: Document, contents: impl Into<String>) -> Self {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(document, contents.into());
        }
        self
    }

    pub fn contents(&self, document: Document) -> Option<String> {
        self.documents.lock().ok()?.get(&document).cloned()
    }
}

impl Backend for MemoryBackend {
    fn load(&self, document: Document) -> Result<Option<String>, StoreError> {
        Ok(self.contents(document))
    }

    fn save(&self, document: Document, contents: &str) -> Result<(), StoreError> {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(document, contents.to_owned());
        }
        Ok(())
    }
}
