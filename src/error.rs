use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("release is required")]
    ReleaseRequired,

    #[error("failed to load admin kubeconfig: {0}")]
    KubeConfigLoad(String),

    #[error("failed to create API client configuration from kubeconfig: {0}")]
    KubeClientConfig(String),

    #[error("release storage unavailable: {0}")]
    ReleaseStorage(String),

    #[error("{0}")]
    Conversion(String),

    #[error("failure preserving release version {name}: {reason}")]
    PreserveFailed { name: String, reason: String },

    #[error("release record {0} not found")]
    RecordNotFound(String),

    #[error("while running '{command}': {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("could not start '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReleaseRequired => "release_required",
            Self::KubeConfigLoad(_) => "kubeconfig_load",
            Self::KubeClientConfig(_) => "kube_client_config",
            Self::ReleaseStorage(_) => "release_storage",
            Self::Conversion(_) => "conversion_failed",
            Self::PreserveFailed { .. } => "preserve_failed",
            Self::RecordNotFound(_) => "record_not_found",
            Self::CommandFailed { .. } => "command_failed",
            Self::CommandSpawn { .. } => "command_spawn",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
