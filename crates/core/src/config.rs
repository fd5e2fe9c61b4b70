use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with
/// the prefix `OFFERSCOPE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
}

/// Defaults for the comparison pipeline parameters an analyst can override
/// per invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default = "default_top_n_offers")]
    pub top_n_offers: usize,
    /// Offers that always keep their own bucket regardless of popularity.
    #[serde(default = "default_always_keep")]
    pub always_keep: Vec<String>,
    /// Event name the upstream query used to resolve "first show of this
    /// offer before first purchase". Recorded in report metadata.
    #[serde(default = "default_show_event")]
    pub show_event: String,
}

/// Normalization ranges for the diverging difference-cell color scale.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_share_range")]
    pub share_range: f64,
    #[serde(default = "default_time_range")]
    pub time_range: f64,
}

fn default_window_days() -> i64 {
    7
}
fn default_top_n_offers() -> usize {
    5
}
fn default_always_keep() -> Vec<String> {
    vec![
        "al.2x2startofer".to_string(),
        "al.5x2startofer".to_string(),
        "al.10x2startofer".to_string(),
    ]
}
fn default_show_event() -> String {
    "ActivateOffer".to_string()
}
fn default_share_range() -> f64 {
    10.0
}
fn default_time_range() -> f64 {
    500.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            top_n_offers: default_top_n_offers(),
            always_keep: default_always_keep(),
            show_event: default_show_event(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            share_range: default_share_range(),
            time_range: default_time_range(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OFFERSCOPE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.window_days, 7);
        assert_eq!(config.pipeline.top_n_offers, 5);
        assert_eq!(config.pipeline.always_keep.len(), 3);
        assert_eq!(config.pipeline.show_event, "ActivateOffer");
        assert_eq!(config.highlight.share_range, 10.0);
        assert_eq!(config.highlight.time_range, 500.0);
    }
}
