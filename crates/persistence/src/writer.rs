use std::collections::HashSet;

use crate::escape::encode_attribute;

/// An auxiliary file registered while writing, to be filled in after the
/// XML pass by whoever owns `owner`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry<T> {
    pub file_name: String,
    pub owner: T,
}

/// Indented XML writer with auxiliary file registration.
///
/// `T` identifies the owner of each registered file so the caller can
/// write the binary payloads once the XML stream is complete.
#[derive(Debug)]
pub struct Writer<T> {
    out: String,
    indent: usize,
    indent_width: usize,
    force_xml: bool,
    file_version: u32,
    files: Vec<FileEntry<T>>,
    file_names: HashSet<String>,
}

impl<T> Writer<T> {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            indent_width: 4,
            force_xml: false,
            file_version: 1,
            files: Vec::new(),
            file_names: HashSet::new(),
        }
    }

    /// Write bulk list data inline instead of into auxiliary files.
    pub fn with_force_xml(mut self, force_xml: bool) -> Self {
        self.force_xml = force_xml;
        self
    }

    pub fn with_file_version(mut self, file_version: u32) -> Self {
        self.file_version = file_version;
        self
    }

    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn is_force_xml(&self) -> bool {
        self.force_xml
    }

    pub fn file_version(&self) -> u32 {
        self.file_version
    }

    /// Current indentation prefix.
    pub fn ind(&self) -> String {
        " ".repeat(self.indent * self.indent_width)
    }

    pub fn inc_ind(&mut self) {
        self.indent += 1;
    }

    pub fn dec_ind(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Raw access to the output stream.
    pub fn stream(&mut self) -> &mut String {
        &mut self.out
    }

    /// Write one indented line.
    pub fn line(&mut self, text: &str) {
        let ind = self.ind();
        self.out.push_str(&ind);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Write `<name a="v" .../>`. Attribute values are escaped.
    pub fn empty_element(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let tag = format_tag(name, attributes);
        self.line(&format!("<{}/>", tag));
    }

    /// Write `<name a="v" ...>` and indent the following lines.
    pub fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let tag = format_tag(name, attributes);
        self.line(&format!("<{}>", tag));
        self.inc_ind();
    }

    /// Undo the indentation of the matching [`Writer::start_element`] and write `</name>`.
    pub fn end_element(&mut self, name: &str) {
        self.dec_ind();
        self.line(&format!("</{}>", name));
    }

    /// Keep [`Writer::add_file`] from handing out `name`, for files the
    /// caller stores next to the auxiliary ones.
    pub fn reserve_file_name(&mut self, name: &str) {
        self.file_names.insert(name.to_lowercase());
    }

    /// Register an auxiliary file and return its unique name.
    ///
    /// The name is derived from `base`; a numeric suffix is appended when
    /// the base name is already taken or reserved. Names are compared
    /// without regard to case.
    pub fn add_file(&mut self, base: &str, owner: T) -> String {
        let base = sanitize_file_name(base);
        let mut file_name = base.clone();
        let mut counter = 1;
        while self.file_names.contains(&file_name.to_lowercase()) {
            file_name = format!("{}{}", base, counter);
            counter += 1;
        }
        self.file_names.insert(file_name.to_lowercase());
        self.files.push(FileEntry {
            file_name: file_name.clone(),
            owner,
        });
        file_name
    }

    pub fn files(&self) -> &[FileEntry<T>] {
        &self.files
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Split into the XML text and the registered auxiliary files.
    pub fn into_parts(self) -> (String, Vec<FileEntry<T>>) {
        (self.out, self.files)
    }
}

impl<T> Default for Writer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn format_tag(name: &str, attributes: &[(&str, &str)]) -> String {
    let mut tag = String::from(name);
    for (key, value) in attributes {
        tag.push(' ');
        tag.push_str(key);
        tag.push_str("=\"");
        tag.push_str(&encode_attribute(value));
        tag.push('"');
    }
    tag
}

fn sanitize_file_name(base: &str) -> String {
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "File".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements_are_indented() {
        let mut w: Writer<()> = Writer::new();
        w.start_element("LinkList", &[("count", "1")]);
        w.empty_element("Link", &[("value", "Box")]);
        w.end_element("LinkList");
        assert_eq!(
            w.as_str(),
            "<LinkList count=\"1\">\n    <Link value=\"Box\"/>\n</LinkList>\n"
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut w: Writer<()> = Writer::new();
        w.empty_element("String", &[("value", "a\"b")]);
        assert_eq!(w.as_str(), "<String value=\"a&quot;b\"/>\n");
    }

    #[test]
    fn file_names_are_unique() {
        let mut w = Writer::new();
        let a = w.add_file("Colors", 1);
        let b = w.add_file("Colors", 2);
        let c = w.add_file("Colors", 3);
        assert_eq!(a, "Colors");
        assert_eq!(b, "Colors1");
        assert_eq!(c, "Colors2");
        assert_eq!(w.files().len(), 3);
        assert_eq!(w.files()[1].owner, 2);
    }

    #[test]
    fn reserved_names_are_skipped() {
        let mut w = Writer::new();
        w.reserve_file_name("Document.xml");
        assert_eq!(w.add_file("Document.xml", ()), "Document.xml1");
        assert_eq!(w.add_file("document.XML", ()), "document.XML2");
    }

    #[test]
    fn dec_ind_saturates() {
        let mut w: Writer<()> = Writer::new();
        w.dec_ind();
        w.line("<A/>");
        assert_eq!(w.as_str(), "<A/>\n");
    }
}
