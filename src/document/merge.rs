//! Document merge - field records → Analysis settings + Field elements

use crate::document::{Document, Element, Node};
use crate::types::FieldRecord;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const ANALYSIS_TAG: &str = "Analysis";
pub const FIELD_TAG: &str = "Field";
const GROUP_TAG: &str = "Group";
const GROUP_ALL: &str = "all";
const PARAM_TAG: &str = "A";
const PROCESS_TAG: &str = "Process";

/// `modifies` attribute value that marks a Field element as ours
pub const TEMPLATE_MARKER: &str = "template";

/// Parameters that OPGEE reads from inside a process element, with the process class
const PROCESS_PARAMETERS: &[(&str, &str)] = &[
    ("fraction_diluent", "HeavyOilDilution"),
    ("heater_treater", "CrudeOilDewatering"),
];

/// The singleton Analysis element and its global settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub name: String,
    pub settings: Vec<(String, String)>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            name: "FUSE_run".to_string(),
            settings: vec![
                ("functional_unit".to_string(), "oil".to_string()),
                ("GWP_horizon".to_string(), "100".to_string()),
                ("GWP_version".to_string(), "AR5".to_string()),
            ],
        }
    }
}

/// What a merge did to the managed Field elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Present before, absent from this run: deleted
    pub removed: Vec<String>,
    /// Present before and in this run: rebuilt from scratch
    pub replaced: Vec<String>,
    /// New in this run
    pub added: Vec<String>,
}

pub struct DocumentMerger {
    analysis: AnalysisSettings,
}

impl DocumentMerger {
    pub fn new(analysis: AnalysisSettings) -> Self {
        Self { analysis }
    }

    /// Reconcile the document with one run's records.
    ///
    /// The Analysis element is updated in place. Managed Field elements are
    /// swapped out as a block: all of them are dropped and the fresh ones are
    /// appended in run order. Every other node keeps its place.
    pub fn merge(&self, doc: &mut Document, records: &[FieldRecord]) -> MergeReport {
        self.upsert_analysis(&mut doc.root);

        let mut by_name: IndexMap<&str, &FieldRecord> = IndexMap::new();
        for record in records {
            if by_name.insert(record.name.as_str(), record).is_some() {
                warn!(field = %record.name, "duplicate field name, later column wins");
            }
        }

        let existing: Vec<String> = doc
            .root
            .elements()
            .filter(|e| is_managed_field(e))
            .filter_map(|e| e.attr("name").map(str::to_string))
            .collect();
        let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();

        let mut report = MergeReport::default();
        for name in &existing {
            if by_name.contains_key(name.as_str()) {
                report.replaced.push(name.clone());
            } else {
                debug!(field = %name, "removing stale field");
                report.removed.push(name.clone());
            }
        }
        for name in by_name.keys() {
            if !existing_set.contains(name) {
                report.added.push(name.to_string());
            }
        }

        let fresh: Vec<Node> = by_name
            .values()
            .map(|record| Node::Element(build_field(record)))
            .collect();

        doc.root
            .children
            .retain(|n| !matches!(n, Node::Element(e) if is_managed_field(e)));
        doc.root.children.extend(fresh);

        info!(
            added = report.added.len(),
            replaced = report.replaced.len(),
            removed = report.removed.len(),
            "merged fields into document"
        );
        report
    }

    fn upsert_analysis(&self, root: &mut Element) {
        if root.find_named(ANALYSIS_TAG, &self.analysis.name).is_none() {
            root.push(Element::new(ANALYSIS_TAG).with_attr("name", self.analysis.name.as_str()));
        }
        let Some(analysis) = root.find_named_mut(ANALYSIS_TAG, &self.analysis.name) else {
            return;
        };

        let has_group = analysis
            .elements()
            .any(|e| e.name == GROUP_TAG && e.text() == GROUP_ALL);
        if !has_group {
            analysis.push(Element::new(GROUP_TAG).with_text(GROUP_ALL));
        }

        for (key, value) in &self.analysis.settings {
            match analysis.find_named_mut(PARAM_TAG, key) {
                Some(leaf) => leaf.set_text(value.as_str()),
                None => analysis.push(
                    Element::new(PARAM_TAG)
                        .with_attr("name", key.as_str())
                        .with_text(value.as_str()),
                ),
            }
        }
    }
}

impl Default for DocumentMerger {
    fn default() -> Self {
        Self::new(AnalysisSettings::default())
    }
}

/// True for `<Field modifies="template">` elements
pub fn is_managed_field(element: &Element) -> bool {
    element.name == FIELD_TAG && element.attr("modifies") == Some(TEMPLATE_MARKER)
}

/// Build a complete Field element from a record
pub fn build_field(record: &FieldRecord) -> Element {
    let mut field = Element::new(FIELD_TAG)
        .with_attr("name", record.name.as_str())
        .with_attr("modifies", TEMPLATE_MARKER)
        .with_child(Element::new(GROUP_TAG).with_text(GROUP_ALL));

    for (param, value) in &record.params {
        let leaf = Element::new(PARAM_TAG)
            .with_attr("name", param.as_str())
            .with_text(value.to_string());

        match process_class(param) {
            Some(class) => {
                // A disabled copy first, so OPGEE does not register the process twice
                field.push(
                    Element::new(PROCESS_TAG)
                        .with_attr("class", class)
                        .with_attr("enabled", "false"),
                );
                field.push(
                    Element::new(PROCESS_TAG)
                        .with_attr("class", class)
                        .with_child(leaf),
                );
            }
            None => field.push(leaf),
        }
    }
    field
}

fn process_class(param: &str) -> Option<&'static str> {
    PROCESS_PARAMETERS
        .iter()
        .find(|(p, _)| *p == param)
        .map(|(_, class)| *class)
}
