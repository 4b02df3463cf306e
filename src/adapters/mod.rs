// Adapters layer: concrete implementations for external systems (artifact storage, history database).

pub mod storage;
pub mod supabase;
