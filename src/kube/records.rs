use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::kube::config::KubeConfigRef;

pub const OWNER_LABEL: &str = "OWNER";
pub const NAME_LABEL: &str = "NAME";

/// A Helm v2 release version as Tiller stores it: one ConfigMap per
/// `<release>.v<N>`, labeled `NAME`, `OWNER`, `STATUS`, `VERSION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRecord {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Object {
    #[serde(default)]
    metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
}

/// Parse the `items` of a list response (`kubectl get ... -o json`).
pub fn parse_list(json: &str) -> Result<Vec<LegacyRecord>> {
    let list: ObjectList = serde_json::from_str(json)?;
    Ok(list
        .items
        .into_iter()
        .map(|o| LegacyRecord {
            name: o.metadata.name,
            namespace: o.metadata.namespace,
            labels: o.metadata.labels,
        })
        .collect())
}

/// Read and relabel access to v2 release records.
pub trait LegacyRecords {
    fn list(&self, namespace: &str, selector: &str) -> Result<Vec<LegacyRecord>>;

    /// Set a single label on a record, leaving the rest of the object as the
    /// server has it. Fails with `RecordNotFound` when the record is gone.
    fn set_label(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
        dry_run: bool,
    ) -> Result<()>;
}

/// v3 release history store.
pub trait ReleaseHistory {
    fn has_deployed(&self, release: &str) -> Result<bool>;
}

/// Opens the two stores a conversion needs.
pub trait ClusterConnector {
    fn release_history(&self, namespace: &str) -> Result<Box<dyn ReleaseHistory>>;
    fn legacy_records(&self, kube: &KubeConfigRef) -> Result<Box<dyn LegacyRecords>>;
}
