use std::env;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_KEY: &str = "SUPABASE_SERVICE_KEY";
pub const ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";

/// Deployment settings read from the process environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub allowed_origins: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            supabase_url: read(SUPABASE_URL),
            supabase_service_key: read(SUPABASE_SERVICE_KEY),
            allowed_origins: read(ALLOWED_ORIGINS),
        }
    }
}
