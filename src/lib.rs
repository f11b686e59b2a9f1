use state::BotState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod admin;
pub mod commands;
pub mod config;
pub mod constructor;
pub mod database;
pub mod editor;
pub mod error;
pub mod gate;
pub mod keyboard;
pub mod menu;
pub mod runner;
pub mod schema;
pub mod scoring;
pub mod session;
pub mod state;
pub mod validation;

type UserDialogue = Dialogue<BotState, InMemStorage<BotState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
