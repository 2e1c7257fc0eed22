//! Canonical document output
//!
//! Four-space indentation, a UTF-8 declaration, no blank lines and no
//! trailing newline. Elements without children are self-closed; text-only
//! elements stay on one line.

use crate::document::{Document, Element, Node};
use crate::error::{FuseError, FuseResult};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;
use tracing::info;

const INDENT_WIDTH: usize = 4;

/// Render the document to its canonical byte form
pub fn to_canonical_bytes(doc: &Document) -> FuseResult<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    write_element(&mut writer, &doc.root)?;

    let rendered = String::from_utf8(writer.into_inner())
        .map_err(|e| FuseError::Xml(format!("rendered document is not UTF-8: {e}")))?;
    let lines: Vec<&str> = rendered
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    Ok(lines.join("\n").into_bytes())
}

/// Overwrite `path` with the canonical form of the document
pub fn save(doc: &Document, path: &Path) -> FuseResult<()> {
    let bytes = to_canonical_bytes(doc)?;
    fs::write(path, &bytes)?;
    info!(document = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> FuseResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(
                    text.as_str(),
                ))))
                .map_err(xml_error)?,
            Node::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(xml_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> FuseError {
    FuseError::Xml(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMerger;
    use crate::types::{FieldRecord, ParamValue};
    use pretty_assertions::assert_eq;

    fn render(doc: &Document) -> String {
        String::from_utf8(to_canonical_bytes(doc).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(
            render(&Document::new()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Model/>"
        );
    }

    #[test]
    fn test_merged_document_layout() {
        let mut doc = Document::new();
        let mut record = FieldRecord::new("Alpha");
        record.insert("API", ParamValue::Scalar("30".into()));
        record.insert("WIR", ParamValue::Scalar(String::new()));
        record.insert("fraction_diluent", ParamValue::Scalar("0.2".into()));
        DocumentMerger::default().merge(&mut doc, &[record]);

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<Model>
    <Analysis name="FUSE_run">
        <Group>all</Group>
        <A name="functional_unit">oil</A>
        <A name="GWP_horizon">100</A>
        <A name="GWP_version">AR5</A>
    </Analysis>
    <Field name="Alpha" modifies="template">
        <Group>all</Group>
        <A name="API">30</A>
        <A name="WIR"/>
        <Process class="HeavyOilDilution" enabled="false"/>
        <Process class="HeavyOilDilution">
            <A name="fraction_diluent">0.2</A>
        </Process>
    </Field>
</Model>"#;
        assert_eq!(render(&doc), expected);
    }

    #[test]
    fn test_reparse_is_stable() {
        let doc = Document::parse(
            r#"<Model>

    <Field name="A &amp; B" modifies="template"><A name="country">Trinidad &amp; Tobago</A></Field>
    <!-- kept -->
</Model>"#,
        )
        .unwrap();
        let first = render(&doc);
        let second = render(&Document::parse(&first).unwrap());

        assert_eq!(first, second);
        assert!(first.contains("Trinidad &amp; Tobago"));
        assert!(first.contains("<!-- kept -->"));
        assert!(!first.ends_with('\n'));
        assert!(!first.lines().any(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fuse.xml");
        std::fs::write(&path, "old content that is much longer than the new one").unwrap();

        save(&Document::new(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Model/>"
        );
    }
}
