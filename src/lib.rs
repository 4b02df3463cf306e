pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{storage::LocalStorage, supabase::SupabaseHistory};
pub use crate::config::{AppConfig, CliConfig};
pub use crate::core::{classifier::TicketClassifier, predictor::Predictor};
pub use crate::utils::error::{Result, TriageError};
