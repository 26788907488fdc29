use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::convert::{ConvertOptions, HelmPluginConverter, ReleaseConverter, StorageType};
use crate::error::{MigrateError, Result};
use crate::kube::config::KubeConfigRef;
use crate::kube::kubectl::KubectlConnector;
use crate::kube::records::{
    ClusterConnector, LegacyRecord, LegacyRecords, NAME_LABEL, OWNER_LABEL,
};
use crate::kube::selector::LabelSelector;
use crate::log::{DebugLog, Log, TracingLog};
use crate::process::SystemRunner;
use crate::steps::Step;

pub const DEFAULT_MAX_RELEASE_VERSIONS: u32 = 10;
pub const DEFAULT_TILLER_NAMESPACE: &str = "kube-system";
pub const DEFAULT_TILLER_LABEL: &str = "OWNER=TILLER";
/// `OWNER` value given to preserved v2 records once their release is on v3.
pub const CONVERTED_OWNER: &str = "converted-to-helm3";

/// Migrates one Helm v2 release to v3, unless a deployed v3 release of the
/// same name already exists.
pub struct Convert {
    namespace: String,
    kube: KubeConfigRef,
    options: ConvertOptions,
    log: Arc<dyn Log>,
    debug: Option<DebugLog>,
    cluster: Box<dyn ClusterConnector>,
    converter: Box<dyn ReleaseConverter>,
}

impl Convert {
    /// Build a Convert that talks to the cluster through `kubectl` and the
    /// `helm 2to3` plugin. No validation is performed at this time.
    pub fn new(cfg: &Config) -> Self {
        let runner = Arc::new(SystemRunner);
        let kube = KubeConfigRef::new(&cfg.kube_config, &cfg.kube_context);
        Self::with_collaborators(
            cfg,
            Arc::new(TracingLog),
            Box::new(KubectlConnector::new(runner.clone(), kube)),
            Box::new(HelmPluginConverter::new(runner)),
        )
    }

    pub fn with_collaborators(
        cfg: &Config,
        log: Arc<dyn Log>,
        cluster: Box<dyn ClusterConnector>,
        converter: Box<dyn ReleaseConverter>,
    ) -> Self {
        let max_release_versions = match cfg.max_release_versions {
            0 => DEFAULT_MAX_RELEASE_VERSIONS,
            n => n,
        };
        let tiller_namespace = or_default(&cfg.tiller_ns, DEFAULT_TILLER_NAMESPACE);
        let base_label = or_default(&cfg.tiller_label, DEFAULT_TILLER_LABEL);

        let options = ConvertOptions {
            delete_release: cfg.delete_v2_releases,
            dry_run: cfg.dry_run,
            max_release_versions,
            release_name: cfg.release.clone(),
            storage_type: StorageType::ConfigMap,
            tiller_label: format!("{base_label},{NAME_LABEL}={}", cfg.release),
            tiller_namespace,
            tiller_out_cluster: false,
        };

        let debug = cfg.debug.then(|| DebugLog::new(log.clone()));

        Self {
            namespace: cfg.namespace.clone(),
            kube: KubeConfigRef::new(&cfg.kube_config, &cfg.kube_context),
            options,
            log,
            debug,
            cluster,
            converter,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.is_some()
    }

    fn v3_release_found(&self, release: &str) -> Result<bool> {
        let history = self.cluster.release_history(&self.namespace)?;
        // Lookup errors count as "not found", the conversion itself then
        // decides whether there is anything to migrate.
        let found = match history.has_deployed(release) {
            Ok(found) => found,
            Err(e) => {
                self.log.debug(&format!("v3 release lookup for {release} failed: {e}"));
                false
            }
        };
        if found {
            self.log.info(&format!("A v3 Release of {release} was found"));
        } else {
            self.log.info(&format!("No v3 Release of {release} found"));
        }
        Ok(found)
    }

    /// Snapshot the v2 records of this release, keyed by name. Must be taken
    /// before the converter runs; the converter may rewrite or drop records.
    fn v2_release_records(
        &self,
        records: &dyn LegacyRecords,
    ) -> Result<BTreeMap<String, LegacyRecord>> {
        let selector = LabelSelector::parse(&self.options.tiller_label);
        let listed = records.list(&self.options.tiller_namespace, &self.options.tiller_label)?;
        Ok(listed
            .into_iter()
            .filter(|r| selector.matches(&r.labels))
            .map(|r| (r.name.clone(), r))
            .collect())
    }

    fn preserve_v2_release_records(
        &self,
        records: &dyn LegacyRecords,
        snapshot: &BTreeMap<String, LegacyRecord>,
        owner: &str,
    ) -> Result<()> {
        let namespace = &self.options.tiller_namespace;
        self.log.info(&format!(
            "Preserving release versions of {}",
            self.options.release_name
        ));

        for name in snapshot.keys() {
            match records.set_label(namespace, name, OWNER_LABEL, owner, self.options.dry_run) {
                Ok(()) => {}
                Err(MigrateError::RecordNotFound(_)) => {
                    self.log
                        .info(&format!("Release version {name} no longer exists, skipping"));
                }
                Err(e) => {
                    self.log
                        .info(&format!("Failure preserving release version {name}: {e}"));
                    return Err(MigrateError::PreserveFailed {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl Step for Convert {
    fn prepare(&mut self) -> Result<()> {
        if self.options.release_name.is_empty() {
            return Err(MigrateError::ReleaseRequired);
        }
        Ok(())
    }

    /// Runs the conversion unless a deployed v3 release already exists. If
    /// there is no v2 release either, the converter's error is returned as is.
    fn execute(&mut self) -> Result<()> {
        if self.v3_release_found(&self.options.release_name)? {
            return Ok(());
        }

        let records = self.cluster.legacy_records(&self.kube)?;

        if self.options.delete_release {
            return self
                .converter
                .convert(&self.options, &self.kube, self.debug.as_ref());
        }

        let snapshot = self.v2_release_records(records.as_ref())?;
        self.converter
            .convert(&self.options, &self.kube, self.debug.as_ref())?;
        self.preserve_v2_release_records(records.as_ref(), &snapshot, CONVERTED_OWNER)
    }
}
