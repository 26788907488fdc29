use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{MigrateError, Result};

/// Timeout applied to every API request made with credentials from a kubeconfig.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the cluster credentials live: a kubeconfig file plus an optional
/// context override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeConfigRef {
    pub file: PathBuf,
    pub context: Option<String>,
}

impl KubeConfigRef {
    pub fn new(file: impl Into<PathBuf>, context: &str) -> Self {
        Self {
            file: file.into(),
            context: (!context.is_empty()).then(|| context.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KubeConfig {
    #[serde(default, rename = "current-context")]
    pub current_context: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<NamedContext>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<NamedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub server: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,
}

/// Resolved settings for talking to one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub context: String,
    pub timeout: Duration,
}

// kubectl writes `users: null` for empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read and parse a kubeconfig file.
pub fn load_from_file(path: &Path) -> Result<KubeConfig> {
    let data = fs::read_to_string(path)
        .map_err(|e| MigrateError::KubeConfigLoad(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&data)
        .map_err(|e| MigrateError::KubeConfigLoad(format!("{}: {e}", path.display())))
}

impl KubeConfig {
    /// Resolve `context` (or the current context when `None`) to a client
    /// configuration. The context must name a known cluster, and a known
    /// user when it names one.
    pub fn client_config(&self, context: Option<&str>) -> Result<ClientConfig> {
        let name = context.unwrap_or(&self.current_context);
        if name.is_empty() {
            return Err(MigrateError::KubeClientConfig(
                "no context selected and current-context is not set".into(),
            ));
        }

        let ctx = self
            .contexts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| MigrateError::KubeClientConfig(format!("context '{name}' not found")))?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == ctx.context.cluster)
            .ok_or_else(|| {
                MigrateError::KubeClientConfig(format!(
                    "cluster '{}' referenced by context '{name}' not found",
                    ctx.context.cluster
                ))
            })?;

        if cluster.cluster.server.is_empty() {
            return Err(MigrateError::KubeClientConfig(format!(
                "cluster '{}' has no server",
                cluster.name
            )));
        }

        if !ctx.context.user.is_empty() && !self.users.iter().any(|u| u.name == ctx.context.user)
        {
            return Err(MigrateError::KubeClientConfig(format!(
                "user '{}' referenced by context '{name}' not found",
                ctx.context.user
            )));
        }

        Ok(ClientConfig {
            context: name.to_string(),
            timeout: REQUEST_TIMEOUT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
  - name: dev-cluster
    cluster:
      server: https://dev.example:6443
  - name: prod-cluster
    cluster:
      server: https://prod.example:6443
contexts:
  - name: dev
    context:
      cluster: dev-cluster
      user: ci
  - name: prod
    context:
      cluster: prod-cluster
      user: ci
  - name: broken
    context:
      cluster: missing
users:
  - name: ci
    user:
      token: abc
"#;

    fn parsed() -> KubeConfig {
        serde_yaml::from_str(KUBECONFIG).unwrap()
    }

    #[test]
    fn current_context_is_used_when_none_given() {
        let cfg = parsed().client_config(None).unwrap();
        assert_eq!(cfg.context, "dev");
        assert_eq!(cfg.timeout, Duration::from_secs(15));
    }

    #[test]
    fn explicit_context_overrides_current() {
        let cfg = parsed().client_config(Some("prod")).unwrap();
        assert_eq!(cfg.context, "prod");
    }

    #[test]
    fn unknown_context_and_dangling_cluster_are_rejected() {
        let err = parsed().client_config(Some("nope")).unwrap_err();
        assert!(matches!(err, MigrateError::KubeClientConfig(_)));

        let err = parsed().client_config(Some("broken")).unwrap_err();
        assert!(err.to_string().contains("cluster 'missing'"));
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempdir().unwrap();

        let err = load_from_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, MigrateError::KubeConfigLoad(_)));

        let bad = dir.path().join("config");
        fs::write(&bad, "clusters: [this is: not valid").unwrap();
        let err = load_from_file(&bad).unwrap_err();
        assert!(err.to_string().starts_with("failed to load admin kubeconfig"));

        let good = dir.path().join("good");
        fs::write(&good, KUBECONFIG).unwrap();
        assert_eq!(load_from_file(&good).unwrap().contexts.len(), 3);
    }

    #[test]
    fn null_lists_written_by_kubectl_are_accepted() {
        let raw = r#"
apiVersion: v1
kind: Config
preferences: {}
current-context: ci
clusters:
  - name: c
    cluster:
      server: https://k8s.example:6443
contexts:
  - name: ci
    context:
      cluster: c
users: null
"#;
        let cfg: KubeConfig = serde_yaml::from_str(raw).unwrap();
        assert!(cfg.users.is_empty());
        assert_eq!(cfg.client_config(None).unwrap().context, "ci");

        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let no_contexts = raw.replace(
            "contexts:\n  - name: ci\n    context:\n      cluster: c\n",
            "contexts: null\n",
        );
        fs::write(&path, no_contexts).unwrap();
        let cfg = load_from_file(&path).unwrap();
        assert!(cfg.contexts.is_empty());
        assert!(matches!(
            cfg.client_config(None),
            Err(MigrateError::KubeClientConfig(_))
        ));
    }

    #[test]
    fn empty_context_string_means_no_override() {
        assert_eq!(KubeConfigRef::new("/tmp/k", "").context, None);
        assert_eq!(
            KubeConfigRef::new("/tmp/k", "prod").context.as_deref(),
            Some("prod")
        );
    }
}
