use std::sync::Arc;

use crate::error::{MigrateError, Result};
use crate::kube::config::{self, KubeConfigRef};
use crate::kube::records::{
    self, ClusterConnector, LegacyRecord, LegacyRecords, ReleaseHistory,
};
use crate::process::ProcessRunner;

pub const KUBECTL_BIN: &str = "kubectl";

/// Cluster access through the `kubectl` binary.
pub struct KubectlConnector {
    runner: Arc<dyn ProcessRunner>,
    settings: KubeConfigRef,
}

impl KubectlConnector {
    /// `settings` locates the credentials used for the v3 release history.
    pub fn new(runner: Arc<dyn ProcessRunner>, settings: KubeConfigRef) -> Self {
        Self { runner, settings }
    }

    fn client(&self, kube: &KubeConfigRef) -> Result<Kubectl> {
        let cfg = config::load_from_file(&kube.file)?;
        let client = cfg.client_config(kube.context.as_deref())?;
        Ok(Kubectl {
            runner: self.runner.clone(),
            global: vec![
                "--kubeconfig".into(),
                kube.file.display().to_string(),
                "--context".into(),
                client.context,
                "--request-timeout".into(),
                format!("{}s", client.timeout.as_secs()),
            ],
        })
    }
}

impl ClusterConnector for KubectlConnector {
    fn release_history(&self, namespace: &str) -> Result<Box<dyn ReleaseHistory>> {
        let kubectl = self
            .client(&self.settings)
            .map_err(|e| MigrateError::ReleaseStorage(e.to_string()))?;
        Ok(Box::new(SecretHistory {
            kubectl,
            namespace: namespace.to_string(),
        }))
    }

    fn legacy_records(&self, kube: &KubeConfigRef) -> Result<Box<dyn LegacyRecords>> {
        Ok(Box::new(ConfigMapRecords {
            kubectl: self.client(kube)?,
        }))
    }
}

struct Kubectl {
    runner: Arc<dyn ProcessRunner>,
    global: Vec<String>,
}

impl Kubectl {
    fn run(&self, args: Vec<String>) -> Result<String> {
        let mut full = self.global.clone();
        full.extend(args);
        let mut cmd = self.runner.command(KUBECTL_BIN, full);
        cmd.run()?;
        Ok(cmd.stdout().to_string())
    }
}

fn namespace_args(namespace: &str) -> Vec<String> {
    if namespace.is_empty() {
        vec![]
    } else {
        vec!["--namespace".into(), namespace.to_string()]
    }
}

struct ConfigMapRecords {
    kubectl: Kubectl,
}

impl LegacyRecords for ConfigMapRecords {
    fn list(&self, namespace: &str, selector: &str) -> Result<Vec<LegacyRecord>> {
        let mut args = vec!["get".to_string(), "configmaps".to_string()];
        args.extend(namespace_args(namespace));
        args.extend(["--selector".into(), selector.to_string(), "--output".into(), "json".into()]);
        records::parse_list(&self.kubectl.run(args)?)
    }

    fn set_label(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> Result<()> {
        let mut args = vec![
            "label".to_string(),
            "configmap".to_string(),
            name.to_string(),
            format!("{key}={value}"),
            "--overwrite".to_string(),
        ];
        args.extend(namespace_args(namespace));
        if dry_run {
            args.push("--dry-run=server".into());
        }

        match self.kubectl.run(args) {
            Ok(_) => Ok(()),
            Err(MigrateError::CommandFailed { stderr, .. }) if stderr.contains("(NotFound)") => {
                Err(MigrateError::RecordNotFound(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// v3 releases live in Secrets labeled `owner=helm,name=<release>,status=<status>`.
struct SecretHistory {
    kubectl: Kubectl,
    namespace: String,
}

impl ReleaseHistory for SecretHistory {
    fn has_deployed(&self, release: &str) -> Result<bool> {
        let mut args = vec!["get".to_string(), "secrets".to_string()];
        args.extend(namespace_args(&self.namespace));
        args.extend([
            "--selector".into(),
            format!("owner=helm,name={release},status=deployed"),
            "--output".into(),
            "json".into(),
        ]);
        let found = records::parse_list(&self.kubectl.run(args)?)?;
        Ok(!found.is_empty())
    }
}
