use std::fmt;
use std::sync::Arc;

use crate::error::{MigrateError, Result};
use crate::kube::config::KubeConfigRef;
use crate::log::DebugLog;
use crate::process::ProcessRunner;

pub const HELM_BIN: &str = "helm";

/// Backend Tiller used to store v2 releases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    #[default]
    ConfigMap,
}

impl StorageType {
    /// Value expected by the `--release-storage` flag of the 2to3 plugin.
    pub fn plugin_value(self) -> &'static str {
        match self {
            Self::ConfigMap => "configmaps",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigMap => write!(f, "configmap"),
        }
    }
}

/// Parameters for one v2 -> v3 release conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub delete_release: bool,
    pub dry_run: bool,
    pub max_release_versions: u32,
    pub release_name: String,
    pub storage_type: StorageType,
    pub tiller_label: String,
    pub tiller_namespace: String,
    pub tiller_out_cluster: bool,
}

/// Translates v2 release records into v3 release history.
///
/// Fails when no v2 record matches `options`. With `delete_release` set the
/// converter also removes the v2 records it converted.
pub trait ReleaseConverter {
    fn convert(
        &self,
        options: &ConvertOptions,
        kube: &KubeConfigRef,
        debug: Option<&DebugLog>,
    ) -> Result<()>;
}

/// Runs the `helm 2to3` plugin.
pub struct HelmPluginConverter {
    runner: Arc<dyn ProcessRunner>,
}

impl HelmPluginConverter {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    fn args(options: &ConvertOptions, kube: &KubeConfigRef) -> Vec<String> {
        let mut args = vec![
            "2to3".to_string(),
            "convert".to_string(),
            options.release_name.clone(),
            "--release-versions-max".to_string(),
            options.max_release_versions.to_string(),
            "--tiller-ns".to_string(),
            options.tiller_namespace.clone(),
            "--label".to_string(),
            options.tiller_label.clone(),
            "--release-storage".to_string(),
            options.storage_type.plugin_value().to_string(),
            "--kubeconfig".to_string(),
            kube.file.display().to_string(),
        ];
        if let Some(ref context) = kube.context {
            args.push("--kube-context".into());
            args.push(context.clone());
        }
        if options.delete_release {
            args.push("--delete-v2-releases".into());
        }
        if options.dry_run {
            args.push("--dry-run".into());
        }
        if options.tiller_out_cluster {
            args.push("--tiller-out-cluster".into());
        }
        args
    }
}

impl ReleaseConverter for HelmPluginConverter {
    fn convert(
        &self,
        options: &ConvertOptions,
        kube: &KubeConfigRef,
        debug: Option<&DebugLog>,
    ) -> Result<()> {
        let mut cmd = self.runner.command(HELM_BIN, Self::args(options, kube));
        if let Some(debug) = debug {
            debug.log(&format!("running '{cmd}'"));
        }

        let outcome = cmd.run();

        if let Some(debug) = debug {
            for line in cmd.stdout().lines().filter(|l| !l.trim().is_empty()) {
                debug.log(line);
            }
        }

        match outcome {
            Ok(()) => Ok(()),
            Err(MigrateError::CommandFailed { command, stderr }) => Err(MigrateError::Conversion(
                failure_message(&command, &stderr, cmd.stdout()),
            )),
            Err(e) => Err(e),
        }
    }
}

/// The plugin's stderr, else its last stdout line, else the command itself.
fn failure_message(command: &str, stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match stdout.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        Some(line) => line.to_string(),
        None => format!("'{command}' failed without output"),
    }
}
