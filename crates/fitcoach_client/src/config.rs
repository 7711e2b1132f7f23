use crate::FitcoachError;
use secrecy::SecretString;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;

/// Chat-completion settings; present only when an API key is configured.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: SecretString,
    pub llm: Option<LlmConfig>,
    pub default_user_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, FitcoachError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, FitcoachError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let supabase_url = get("FITCOACH_SUPABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FitcoachError::Config("FITCOACH_SUPABASE_URL missing".into()))?;
        let supabase_key = get("FITCOACH_SUPABASE_ANON_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| FitcoachError::Config("FITCOACH_SUPABASE_ANON_KEY missing".into()))?;

        let llm = match get("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            Some(key) => {
                let temperature = match get("FITCOACH_LLM_TEMPERATURE") {
                    Some(raw) => raw.trim().parse::<f32>().map_err(|_| {
                        FitcoachError::Config(format!("FITCOACH_LLM_TEMPERATURE invalid: {raw}"))
                    })?,
                    None => DEFAULT_LLM_TEMPERATURE,
                };
                Some(LlmConfig {
                    api_key: SecretString::new(key.into()),
                    base_url: get("FITCOACH_LLM_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into()),
                    model: get("FITCOACH_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
                    temperature,
                })
            }
            None => None,
        };

        Ok(Self {
            supabase_url,
            supabase_key: SecretString::new(supabase_key.into()),
            llm,
            default_user_id: get("FITCOACH_DEFAULT_USER_ID").filter(|v| !v.trim().is_empty()),
        })
    }
}
