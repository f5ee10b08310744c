use std::fmt;

use tracing::{debug, warn};

use crate::errors::PersistenceError;
use crate::writer::FileEntry;

/// Category of a recoverable condition met during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A link names an object that does not exist.
    DanglingLink,
    /// A link names the object that owns it.
    SelfLink,
    /// A stored property has a different kind than the declared one.
    PropertyTypeMismatch,
    /// An auxiliary file announced in the XML is absent.
    MissingFile,
}

/// A recoverable condition met during a load. The load continues.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDiagnostic {
    pub kind: DiagnosticKind,
    /// The name the diagnostic is about (object, property or file).
    pub subject: String,
    pub message: String,
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone)]
enum XmlEvent {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
        /// Index of the matching `End`.
        end: usize,
    },
    End {
        name: String,
    },
}

/// Forward-only cursor over the elements of an XML document.
///
/// `read_element` advances to the next start tag with the given name
/// inside the enclosing element; attribute accessors then refer to that
/// element until the next read.
#[derive(Debug)]
pub struct XmlReader<T> {
    events: Vec<XmlEvent>,
    pos: usize,
    current: Option<usize>,
    verbose: bool,
    file_version: u32,
    files: Vec<FileEntry<T>>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl<T> XmlReader<T> {
    pub fn parse(xml: &str) -> Result<Self, PersistenceError> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| PersistenceError::MalformedXml(e.to_string()))?;
        let mut events = Vec::new();
        flatten(doc.root_element(), &mut events);
        Ok(Self {
            events,
            pos: 0,
            current: None,
            verbose: false,
            file_version: 0,
            files: Vec::new(),
            diagnostics: Vec::new(),
        })
    }

    /// Report diagnostics as warnings instead of debug messages.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn file_version(&self) -> u32 {
        self.file_version
    }

    pub fn set_file_version(&mut self, version: u32) {
        self.file_version = version;
    }

    /// Advance to the next element named `name`.
    ///
    /// The search covers the content of the element last read, then its
    /// later siblings. It stops at the end of the element enclosing them.
    pub fn read_element(&mut self, name: &str) -> Result<(), PersistenceError> {
        // The element last read may still be open; its end does not bound
        // the search.
        let mut may_leave = match self.current.and_then(|i| self.events.get(i)) {
            Some(XmlEvent::Start { end, .. }) => usize::from(*end >= self.pos),
            _ => 0,
        };
        let mut depth = 0usize;
        for idx in self.pos..self.events.len() {
            match &self.events[idx] {
                XmlEvent::Start { name: n, .. } if n == name => {
                    self.current = Some(idx);
                    self.pos = idx + 1;
                    return Ok(());
                }
                XmlEvent::Start { .. } => depth += 1,
                XmlEvent::End { .. } if depth > 0 => depth -= 1,
                XmlEvent::End { .. } if may_leave > 0 => may_leave -= 1,
                XmlEvent::End { .. } => break,
            }
        }
        Err(PersistenceError::MissingElement {
            expected: name.to_string(),
        })
    }

    /// Advance past the end of the innermost open element named `name`.
    ///
    /// Nested elements of the same name are skipped along with their content.
    pub fn read_end_element(&mut self, name: &str) -> Result<(), PersistenceError> {
        let mut depth = 0usize;
        while let Some(event) = self.events.get(self.pos) {
            self.pos += 1;
            match event {
                XmlEvent::Start { name: n, .. } if n == name => depth += 1,
                XmlEvent::End { name: n } if n == name => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(PersistenceError::MissingEndElement {
            expected: name.to_string(),
        })
    }

    /// Name of the element last read.
    pub fn element_name(&self) -> Result<&str, PersistenceError> {
        match self.current.and_then(|i| self.events.get(i)) {
            Some(XmlEvent::Start { name, .. }) => Ok(name),
            _ => Err(PersistenceError::NoCurrentElement),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.find_attribute(name).is_some()
    }

    pub fn get_attribute(&self, name: &str) -> Result<&str, PersistenceError> {
        match self.find_attribute(name) {
            Some(value) => Ok(value),
            None => Err(PersistenceError::MissingAttribute {
                element: self.element_name()?.to_string(),
                attribute: name.to_string(),
            }),
        }
    }

    pub fn get_attribute_as_integer(&self, name: &str) -> Result<i64, PersistenceError> {
        let raw = self.get_attribute(name)?;
        raw.trim()
            .parse()
            .map_err(|_| invalid(name, raw, "an integer"))
    }

    pub fn get_attribute_as_unsigned(&self, name: &str) -> Result<u64, PersistenceError> {
        let raw = self.get_attribute(name)?;
        raw.trim()
            .parse()
            .map_err(|_| invalid(name, raw, "an unsigned integer"))
    }

    pub fn get_attribute_as_float(&self, name: &str) -> Result<f64, PersistenceError> {
        let raw = self.get_attribute(name)?;
        raw.trim()
            .parse()
            .map_err(|_| invalid(name, raw, "a number"))
    }

    /// A non-negative element count.
    pub fn get_attribute_as_count(&self, name: &str) -> Result<usize, PersistenceError> {
        let raw = self.get_attribute(name)?;
        raw.trim()
            .parse()
            .map_err(|_| invalid(name, raw, "a non-negative count"))
    }

    /// Register an auxiliary file to be read once the XML pass is done.
    pub fn add_file(&mut self, file_name: &str, owner: T) {
        self.files.push(FileEntry {
            file_name: file_name.to_string(),
            owner,
        });
    }

    pub fn take_files(&mut self) -> Vec<FileEntry<T>> {
        std::mem::take(&mut self.files)
    }

    /// Record a recoverable condition.
    pub fn diagnose(&mut self, kind: DiagnosticKind, subject: &str, message: String) {
        if self.verbose {
            warn!(?kind, subject, "{}", message);
        } else {
            debug!(?kind, subject, "{}", message);
        }
        self.diagnostics.push(LoadDiagnostic {
            kind,
            subject: subject.to_string(),
            message,
        });
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<LoadDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn find_attribute(&self, name: &str) -> Option<&str> {
        match self.current.and_then(|i| self.events.get(i)) {
            Some(XmlEvent::Start { attributes, .. }) => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

fn invalid(attribute: &str, value: &str, expected: &'static str) -> PersistenceError {
    PersistenceError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn flatten(node: roxmltree::Node<'_, '_>, events: &mut Vec<XmlEvent>) {
    let name = node.tag_name().name().to_string();
    let attributes = node
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();
    let start = events.len();
    events.push(XmlEvent::Start {
        name: name.clone(),
        attributes,
        end: start,
    });
    for child in node.children().filter(|c| c.is_element()) {
        flatten(child, events);
    }
    let end_idx = events.len();
    events.push(XmlEvent::End { name });
    if let Some(XmlEvent::Start { end, .. }) = events.get_mut(start) {
        *end = end_idx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<LinkList count="2">
    <Link value="Box"/>
    <Link value="Cyl&amp;1"/>
</LinkList>"#;

    #[test]
    fn reads_elements_in_order() {
        let mut r: XmlReader<()> = XmlReader::parse(SAMPLE).unwrap();
        r.read_element("LinkList").unwrap();
        assert_eq!(r.get_attribute_as_count("count").unwrap(), 2);
        r.read_element("Link").unwrap();
        assert_eq!(r.get_attribute("value").unwrap(), "Box");
        r.read_element("Link").unwrap();
        assert_eq!(r.get_attribute("value").unwrap(), "Cyl&1");
        r.read_end_element("LinkList").unwrap();
        assert!(r.read_element("Link").is_err());
    }

    #[test]
    fn missing_attribute_names_the_element() {
        let mut r: XmlReader<()> = XmlReader::parse(SAMPLE).unwrap();
        r.read_element("LinkList").unwrap();
        let err = r.get_attribute("value").unwrap_err();
        assert_eq!(
            err,
            PersistenceError::MissingAttribute {
                element: "LinkList".into(),
                attribute: "value".into(),
            }
        );
    }

    #[test]
    fn invalid_integer_is_rejected() {
        let mut r: XmlReader<()> = XmlReader::parse(r#"<Integer value="x1"/>"#).unwrap();
        r.read_element("Integer").unwrap();
        assert!(matches!(
            r.get_attribute_as_integer("value"),
            Err(PersistenceError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn end_element_skips_nested_namesakes() {
        let xml = "<A><A><B/></A><C/></A><D/>";
        let mut r: XmlReader<()> = XmlReader::parse(&format!("<Root>{}</Root>", xml)).unwrap();
        r.read_element("A").unwrap();
        r.read_end_element("A").unwrap();
        r.read_element("D").unwrap();
        assert_eq!(r.element_name().unwrap(), "D");
    }

    #[test]
    fn short_list_does_not_borrow_from_the_next_one() {
        let xml = r#"<Properties>
    <StringList count="2"><String value="a"/></StringList>
    <StringList count="1"><String value="b"/></StringList>
</Properties>"#;
        let mut r: XmlReader<()> = XmlReader::parse(xml).unwrap();
        r.read_element("StringList").unwrap();
        r.read_element("String").unwrap();
        assert_eq!(r.get_attribute("value").unwrap(), "a");
        assert_eq!(
            r.read_element("String").unwrap_err(),
            PersistenceError::MissingElement {
                expected: "String".into()
            }
        );
    }

    #[test]
    fn siblings_follow_an_empty_element() {
        let xml = r#"<Property><Integer value="1"/><CustomEnumList count="0"/></Property>"#;
        let mut r: XmlReader<()> = XmlReader::parse(xml).unwrap();
        r.read_element("Integer").unwrap();
        r.read_element("CustomEnumList").unwrap();
        assert_eq!(r.get_attribute_as_count("count").unwrap(), 0);
    }

    #[test]
    fn malformed_xml_is_structural() {
        assert!(matches!(
            XmlReader::<()>::parse("<Link value=\"a\">"),
            Err(PersistenceError::MalformedXml(_))
        ));
    }

    #[test]
    fn diagnostics_are_collected() {
        let mut r: XmlReader<()> = XmlReader::parse("<A/>").unwrap();
        r.diagnose(DiagnosticKind::DanglingLink, "Box", "lost link to 'Box'".into());
        assert_eq!(r.diagnostics().len(), 1);
        assert_eq!(r.diagnostics()[0].kind, DiagnosticKind::DanglingLink);
        assert_eq!(r.take_diagnostics().len(), 1);
        assert!(r.diagnostics().is_empty());
    }
}
