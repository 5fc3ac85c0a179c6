use std::env;

use thiserror::Error;

const PIPELINES_ENV: &str = "BUILDTAP_PIPELINES";

/// Whether the host exposes the pipeline launch capability.
///
/// Decided once when the host is constructed; callers that hit a disabled
/// capability get a distinct `Unsupported` failure, never a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    #[default]
    Auto,
    Disabled,
}

impl PipelineMode {
    pub fn parse(s: &str) -> Result<Self, OptionsError> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PipelineMode::Auto),
            "disabled" => Ok(PipelineMode::Disabled),
            _ => Err(OptionsError::InvalidPipelineMode(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid pipeline mode: {0}. Valid options: auto, disabled")]
    InvalidPipelineMode(String),
}

#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub pipelines: PipelineMode,
}

impl HostOptions {
    /// Options for the embedding tool's own process environment. An
    /// unrecognized value falls back to the default rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let pipelines = env::var(PIPELINES_ENV)
            .ok()
            .and_then(|value| PipelineMode::parse(&value).ok())
            .unwrap_or_default();
        Self { pipelines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse() {
        assert_eq!(PipelineMode::parse("auto").unwrap(), PipelineMode::Auto);
        assert_eq!(
            PipelineMode::parse("Disabled").unwrap(),
            PipelineMode::Disabled
        );
        assert!(PipelineMode::parse("yes").is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::remove_var(PIPELINES_ENV);
        assert_eq!(HostOptions::from_env().pipelines, PipelineMode::Auto);

        env::set_var(PIPELINES_ENV, "disabled");
        assert_eq!(HostOptions::from_env().pipelines, PipelineMode::Disabled);

        env::set_var(PIPELINES_ENV, "bogus");
        assert_eq!(HostOptions::from_env().pipelines, PipelineMode::Auto);

        env::remove_var(PIPELINES_ENV);
    }
}
