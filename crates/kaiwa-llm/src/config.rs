use serde::{Deserialize, Serialize};

/// Connection settings for an OpenAI-compatible provider. Both values are
/// supplied by the surrounding application as opaque strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL without a trailing slash, e.g. "https://api.openai.com/v1".
    pub base_url: String,
    pub api_key: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Sampling parameters for one generation.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 1.0,
            top_p: 1.0,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_builder_defaults() {
        let params = GenerationParams::new("gpt-4o");
        assert_eq!(params.model, "gpt-4o");
        assert_eq!(params.temperature, 1.0);
        assert_eq!(params.top_p, 1.0);

        let params = GenerationParams::new("gpt-4o").temperature(0.6).top_p(0.9);
        assert_eq!(params.temperature, 0.6);
        assert_eq!(params.top_p, 0.9);
    }
}
