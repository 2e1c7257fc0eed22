//! Name/API side export
//!
//! Post-processing tools match OPGEE results back to fields by name and API
//! gravity. This writes both as two horizontal CSV rows:
//!
//! ```text
//! name,Hibernia,Field 501
//! API,34.5,22
//! ```

use crate::document::{Document, Element, FIELD_TAG, TEMPLATE_MARKER};
use crate::error::FuseResult;
use std::path::Path;
use tracing::{debug, info};

/// Field names and API values in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameApiRows {
    pub names: Vec<String>,
    pub apis: Vec<String>,
}

impl NameApiRows {
    /// Collect from every managed Field that has both a `name` and an `API` leaf
    pub fn collect(doc: &Document) -> Self {
        let mut rows = Self::default();
        for field in doc.root.descendants() {
            if field.name != FIELD_TAG || field.attr("modifies") != Some(TEMPLATE_MARKER) {
                continue;
            }
            if let (Some(name), Some(api)) = (leaf_text(field, "name"), leaf_text(field, "API")) {
                debug!(field = field.attr("name").unwrap_or_default(), "exporting name/API");
                rows.names.push(name);
                rows.apis.push(api);
            }
        }
        rows
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Write both rows to `path`, replacing any existing file
    pub fn write_csv(&self, path: &Path) -> FuseResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;
        writer.write_record(std::iter::once("name").chain(self.names.iter().map(String::as_str)))?;
        writer.write_record(std::iter::once("API").chain(self.apis.iter().map(String::as_str)))?;
        writer.flush()?;
        info!(path = %path.display(), fields = self.len(), "exported field names and API");
        Ok(())
    }
}

fn leaf_text(field: &Element, param: &str) -> Option<String> {
    field.find_named("A", param).map(Element::text)
}

/// Collect and write in one step
pub fn export_name_api(doc: &Document, path: &Path) -> FuseResult<NameApiRows> {
    let rows = NameApiRows::collect(doc);
    rows.write_csv(path)?;
    Ok(rows)
}
