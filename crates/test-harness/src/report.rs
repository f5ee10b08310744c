//! Structured text reports of a document.
//!
//! Reports are plain text, not JSON: a failing test prints one and a reader
//! sees the whole graph at a glance.

use std::fmt;

use object_graph::doc_types::PropertyStatus;
use object_graph::{Document, LoadDiagnostic, ObjectId, PropertyValue};

use crate::workflow::DocumentBuilder;

/// A complete document report.
pub struct DocumentReport {
    pub name: String,
    pub object_entries: Vec<ObjectEntry>,
    pub diagnostics: Vec<String>,
}

/// A single object's report entry.
pub struct ObjectEntry {
    pub index: usize,
    pub name: String,
    pub type_name: String,
    pub touched: bool,
    pub properties: Vec<PropertyEntry>,
    pub links_to: Vec<String>,
    pub linked_from: Vec<String>,
}

pub struct PropertyEntry {
    pub name: String,
    pub type_name: String,
    pub flags: String,
    pub summary: String,
}

impl DocumentReport {
    pub fn from_document(doc: &Document) -> Self {
        let names = |ids: Vec<ObjectId>| -> Vec<String> {
            ids.into_iter()
                .filter_map(|id| doc.object(id).map(|o| o.name().to_string()))
                .collect()
        };

        let object_entries = doc
            .objects()
            .enumerate()
            .map(|(index, (id, obj))| ObjectEntry {
                index,
                name: obj.name().to_string(),
                type_name: obj.type_name().to_string(),
                touched: obj.is_touched(),
                properties: obj
                    .properties()
                    .map(|p| PropertyEntry {
                        name: p.name().to_string(),
                        type_name: p.type_name().to_string(),
                        flags: describe_status(p.status()),
                        summary: summarize(doc, p.value()),
                    })
                    .collect(),
                links_to: names(obj.out_list().into_iter().collect()),
                linked_from: names(obj.in_list().collect()),
            })
            .collect();

        Self {
            name: doc.name().to_string(),
            object_entries,
            diagnostics: Vec::new(),
        }
    }

    /// Attach the diagnostics of the load that produced the document.
    pub fn with_diagnostics(mut self, diagnostics: &[LoadDiagnostic]) -> Self {
        self.diagnostics = diagnostics
            .iter()
            .map(|d| format!("{:?} {}: {}", d.kind, d.subject, d.message))
            .collect();
        self
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Document Report: {} ===\n\n", self.name));

        let touched = self.object_entries.iter().filter(|e| e.touched).count();
        out.push_str(&format!(
            "Objects ({} objects, {} touched):\n",
            self.object_entries.len(),
            touched,
        ));

        for entry in &self.object_entries {
            let mark = if entry.touched { " [TOUCHED]" } else { "" };
            out.push_str(&format!(
                "  [{}] {} \"{}\"{}\n",
                entry.index, entry.type_name, entry.name, mark,
            ));
            for prop in &entry.properties {
                out.push_str(&format!("      {}: {} = {}", prop.name, prop.type_name, prop.summary));
                if !prop.flags.is_empty() {
                    out.push_str(&format!(" ({})", prop.flags));
                }
                out.push('\n');
            }
            if !entry.links_to.is_empty() {
                out.push_str(&format!("      Links to: {}\n", entry.links_to.join(", ")));
            }
            if !entry.linked_from.is_empty() {
                out.push_str(&format!("      Linked from: {}\n", entry.linked_from.join(", ")));
            }
        }

        if self.diagnostics.is_empty() {
            out.push_str("\nDiagnostics: none\n");
        } else {
            out.push_str(&format!("\nDiagnostics ({}):\n", self.diagnostics.len()));
            for d in &self.diagnostics {
                out.push_str(&format!("  {d}\n"));
            }
        }

        out
    }
}

impl fmt::Display for DocumentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl DocumentBuilder {
    pub fn report(&self) -> DocumentReport {
        DocumentReport::from_document(&self.document)
    }
}

fn describe_status(status: PropertyStatus) -> String {
    let flags = [
        (PropertyStatus::HIDDEN, "hidden"),
        (PropertyStatus::READ_ONLY, "read-only"),
        (PropertyStatus::TRANSIENT, "transient"),
        (PropertyStatus::OUTPUT, "output"),
        (PropertyStatus::NO_RECOMPUTE, "no-recompute"),
    ];
    flags
        .iter()
        .filter(|(flag, _)| status.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn summarize(doc: &Document, value: &PropertyValue) -> String {
    let name = |id: ObjectId| {
        doc.object(id)
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    match value {
        PropertyValue::Link(None) => "null".to_string(),
        PropertyValue::Link(Some(id)) => name(*id),
        PropertyValue::LinkList(ids) => format!(
            "[{}]",
            ids.iter().map(|id| name(*id)).collect::<Vec<_>>().join(", ")
        ),
        PropertyValue::LinkSub(link) => match link.object() {
            Some(id) => format!("{} {:?}", name(id), link.sub_values()),
            None => "null".to_string(),
        },
        PropertyValue::LinkSubList(list) => format!(
            "[{}]",
            list.iter()
                .map(|(id, sub)| format!("{}.{}", name(id), sub))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        PropertyValue::FloatList(v) => format!("{} floats", v.len()),
        PropertyValue::ColorList(v) => format!("{} colours", v.len()),
        PropertyValue::MaterialList(v) => format!("{} materials", v.len()),
        PropertyValue::String(s) | PropertyValue::Font(s) => format!("{s:?}"),
        PropertyValue::Integer(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::Bool(v) => v.to_string(),
        other => format!("{other:?}"),
    }
}
