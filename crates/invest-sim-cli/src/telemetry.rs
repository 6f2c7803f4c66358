use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Engine events only; dependencies stay quiet unless asked for.
const DEFAULT_DIRECTIVE: &str = "warn,invest_sim_core=info";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid --log-level '{directive}': {source}")]
    Directive {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("could not install the log subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where the active filter came from, highest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    Flag(String),
    Env(String),
    Default,
}

impl FilterSource {
    /// `--log-level` beats `RUST_LOG`; a blank value counts as unset.
    pub fn resolve(flag: Option<&str>, env: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
        match (present(flag), present(env)) {
            (Some(f), _) => Self::Flag(f),
            (None, Some(e)) => Self::Env(e),
            (None, None) => Self::Default,
        }
    }

    /// Build the filter. A bad flag is an error; a bad `RUST_LOG` falls back
    /// to the default so a stale environment never blocks a run.
    pub fn filter(&self) -> Result<EnvFilter, TelemetryError> {
        match self {
            Self::Flag(directive) => {
                EnvFilter::try_new(directive).map_err(|source| TelemetryError::Directive {
                    directive: directive.clone(),
                    source,
                })
            }
            Self::Env(directive) => Ok(EnvFilter::try_new(directive)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))),
            Self::Default => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
        }
    }
}

/// Install the global subscriber on stderr, keeping stdout for the result.
pub fn init(log_level: Option<&str>) -> Result<(), TelemetryError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = FilterSource::resolve(log_level, env.as_deref()).filter()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
