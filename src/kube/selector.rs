use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Requirement {
    key: String,
    op: Op,
    value: String,
}

/// Equality-based label selector, e.g. `OWNER=TILLER,NAME=myapp`.
///
/// Clauses without an operator are ignored; an empty selector matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn parse(raw: &str) -> Self {
        let requirements = raw
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .filter_map(|clause| {
                let (key, op, value) = if let Some((k, v)) = clause.split_once("!=") {
                    (k, Op::NotEquals, v)
                } else if let Some((k, v)) = clause.split_once("==") {
                    (k, Op::Equals, v)
                } else {
                    let (k, v) = clause.split_once('=')?;
                    (k, Op::Equals, v)
                };
                Some(Requirement {
                    key: key.trim().to_string(),
                    op,
                    value: value.trim().to_string(),
                })
            })
            .collect();
        Self { requirements }
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| {
            let actual = labels.get(&r.key);
            match r.op {
                Op::Equals => actual == Some(&r.value),
                Op::NotEquals => actual != Some(&r.value),
            }
        })
    }
}
