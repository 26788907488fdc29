use clap::Args;

pub const DEFAULT_KUBE_CONFIG: &str = "/root/.kube/config";

/// Plugin settings, read from flags or the `PLUGIN_*` environment a CI runner
/// exports for each pipeline step.
///
/// Zero and empty values mean "unset"; steps apply their own defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct Config {
    /// Helm command to run (`convert`, `list`)
    #[arg(long, env = "PLUGIN_HELM_COMMAND", default_value = "")]
    pub helm_command: String,
    /// Namespace holding the v3 release
    #[arg(long, env = "PLUGIN_NAMESPACE", default_value = "")]
    pub namespace: String,
    /// Release name
    #[arg(long, env = "PLUGIN_RELEASE", default_value = "")]
    pub release: String,
    /// Namespace where Tiller stored v2 releases
    #[arg(long, env = "PLUGIN_TILLER_NS", default_value = "")]
    pub tiller_ns: String,
    /// Base label selector for v2 release configmaps
    #[arg(long, env = "PLUGIN_TILLER_LABEL", default_value = "")]
    pub tiller_label: String,
    /// Max number of v2 release versions to convert
    #[arg(long, env = "PLUGIN_MAX_RELEASE_VERSIONS", default_value_t = 0)]
    pub max_release_versions: u32,
    /// Delete v2 release records after conversion instead of preserving them
    #[arg(long, env = "PLUGIN_DELETE_V2_RELEASES")]
    pub delete_v2_releases: bool,
    /// Simulate the run without changing the cluster
    #[arg(long, env = "PLUGIN_DRY_RUN")]
    pub dry_run: bool,
    /// Verbose diagnostics
    #[arg(long, env = "PLUGIN_DEBUG")]
    pub debug: bool,
    /// Path to the kubeconfig file
    #[arg(long, env = "PLUGIN_KUBE_CONFIG", default_value = DEFAULT_KUBE_CONFIG)]
    pub kube_config: String,
    /// Kubeconfig context to use
    #[arg(long, env = "PLUGIN_KUBE_CONTEXT", default_value = "")]
    pub kube_context: String,
}
