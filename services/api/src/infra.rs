use crate::cli::ArtifactArgs;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::prediction::ArtifactEngine;
use loan_approval::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Command-line artifact paths win over `LOAN_MODEL_PATH` / `LOAN_SCALER_PATH`.
pub(crate) fn apply_artifact_overrides(config: &mut AppConfig, overrides: ArtifactArgs) {
    if let Some(model) = overrides.model {
        config.artifacts.model_path = model;
    }
    if let Some(scaler) = overrides.scaler {
        config.artifacts.scaler_path = scaler;
    }
}

/// Config, stderr logging and artifacts for the one-shot commands.
pub(crate) fn load_engine(overrides: ArtifactArgs) -> Result<ArtifactEngine, AppError> {
    let mut config = AppConfig::load()?;
    apply_artifact_overrides(&mut config, overrides);
    telemetry::init_stderr(&config.telemetry)?;
    Ok(ArtifactEngine::load(&config.artifacts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_approval::config::{
        AppEnvironment, ArtifactConfig, ServerConfig, TelemetryConfig,
    };
    use std::path::PathBuf;

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            artifacts: ArtifactConfig::default(),
        }
    }

    #[test]
    fn overrides_replace_only_the_given_paths() {
        let mut config = config();

        apply_artifact_overrides(
            &mut config,
            ArtifactArgs {
                model: Some(PathBuf::from("/srv/models/forest.json")),
                scaler: None,
            },
        );

        assert_eq!(
            config.artifacts.model_path,
            PathBuf::from("/srv/models/forest.json")
        );
        assert_eq!(
            config.artifacts.scaler_path,
            PathBuf::from(ArtifactConfig::DEFAULT_SCALER_PATH)
        );
    }

    #[test]
    fn empty_overrides_keep_configured_paths() {
        let mut config = config();

        apply_artifact_overrides(&mut config, ArtifactArgs::default());

        assert_eq!(config.artifacts, ArtifactConfig::default());
    }
}
