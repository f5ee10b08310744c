//! Whole-document save/load and copy/paste of objects.

use std::collections::{BTreeMap, HashMap};

use doc_types::PropertyStatus;
use persistence::{
    check_text, DiagnosticKind, LoadDiagnostic, PersistenceError, Writer, XmlReader,
};
use tracing::{debug, instrument};

use crate::config::{LoadOptions, SaveOptions};
use crate::document::Document;
use crate::errors::DocumentError;
use crate::object::{DocumentObject, ObjectId};
use crate::persist::{
    restore_doc_file, restore_value, save_doc_file, save_value, PropertyRef, RestoreContext,
};
use crate::value::PropertyValue;

/// Version of the document XML layout.
pub const SCHEMA_VERSION: u32 = 4;

/// A saved document: the XML text plus auxiliary binary files by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedDocument {
    pub xml: String,
    pub files: BTreeMap<String, Vec<u8>>,
}

/// A loaded document together with the recoverable problems met on the way.
#[derive(Debug)]
pub struct LoadedDocument {
    pub document: Document,
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Objects created by [`Document::import_objects`].
#[derive(Debug, Default)]
pub struct ImportedObjects {
    /// New objects, in fragment order.
    pub objects: Vec<ObjectId>,
    pub diagnostics: Vec<LoadDiagnostic>,
}

type NameTable = HashMap<String, ObjectId>;

/// Declares the properties of an object when a load creates it.
///
/// Properties declared here are restored in place, keeping their
/// constraints and enumeration items; stored properties of another kind
/// are skipped with a diagnostic.
pub trait ObjectFactory {
    fn declare(
        &self,
        doc: &mut Document,
        id: ObjectId,
        type_name: &str,
    ) -> Result<(), DocumentError>;
}

/// Declares nothing: every stored property is created from its type name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainObjects;

impl ObjectFactory for PlainObjects {
    fn declare(&self, _: &mut Document, _: ObjectId, _: &str) -> Result<(), DocumentError> {
        Ok(())
    }
}

impl Document {
    /// Serialize the whole document.
    pub fn save_xml(&self, options: &SaveOptions) -> Result<SavedDocument, DocumentError> {
        self.save_xml_reserving(options, &[])
    }

    /// [`Document::save_xml`] with auxiliary files kept clear of the
    /// `reserved` names, which the caller stores alongside them.
    #[instrument(skip_all, fields(document = %self.name()))]
    pub fn save_xml_reserving(
        &self,
        options: &SaveOptions,
        reserved: &[&str],
    ) -> Result<SavedDocument, DocumentError> {
        let mut writer = Writer::new()
            .with_force_xml(options.force_xml)
            .with_file_version(options.file_version)
            .with_indent_width(options.indent_width);
        for name in reserved {
            writer.reserve_file_name(name);
        }
        let ids = self.order.clone();
        self.write_document(&mut writer, &ids)?;

        let file_version = writer.file_version();
        let (xml, entries) = writer.into_parts();
        let mut files = BTreeMap::new();
        for entry in entries {
            let value = self.value(entry.owner.object, &entry.owner.property)?;
            files.insert(entry.file_name, save_doc_file(value, file_version)?);
        }
        debug!(objects = ids.len(), files = files.len(), "document saved");
        Ok(SavedDocument { xml, files })
    }

    /// Rebuild a document from [`Document::save_xml`] output.
    ///
    /// Dangling links, self links, mismatched property kinds and missing
    /// auxiliary files are recovered and reported as diagnostics. The
    /// loaded document starts with no touched objects, events or undo
    /// history.
    pub fn load_xml(
        xml: &str,
        files: &BTreeMap<String, Vec<u8>>,
        options: &LoadOptions,
    ) -> Result<LoadedDocument, DocumentError> {
        Self::load_xml_with(xml, files, options, &PlainObjects)
    }

    /// [`Document::load_xml`] with objects set up by `factory` before their
    /// data is read.
    #[instrument(skip_all)]
    pub fn load_xml_with(
        xml: &str,
        files: &BTreeMap<String, Vec<u8>>,
        options: &LoadOptions,
        factory: &dyn ObjectFactory,
    ) -> Result<LoadedDocument, DocumentError> {
        let mut reader = XmlReader::parse(xml)?.with_verbose(options.verbose);
        reader.read_element("Document")?;
        let name = if reader.has_attribute("Name") {
            reader.get_attribute("Name")?.to_string()
        } else {
            "Unnamed".to_string()
        };
        read_file_version(&mut reader)?;

        let mut document = Document::new(name);
        let mut created = NameTable::new();
        for (type_name, name) in read_object_list(&mut reader)? {
            let id = document.add_object(&type_name, &name);
            factory.declare(&mut document, id, &type_name)?;
            created.insert(name, id);
        }
        document.read_object_data(&mut reader, &created, &NameTable::new())?;
        document.read_doc_files(&mut reader, files)?;
        document.settle();

        debug!(objects = document.len(), "document loaded");
        Ok(LoadedDocument {
            document,
            diagnostics: reader.take_diagnostics(),
        })
    }

    /// Serialize some objects as a self-contained XML fragment.
    ///
    /// Everything is written inline. Links to objects outside the selection
    /// are kept by name.
    pub fn export_objects(&self, ids: &[ObjectId]) -> Result<String, DocumentError> {
        let options = SaveOptions::clipboard();
        let mut writer = Writer::new()
            .with_force_xml(options.force_xml)
            .with_file_version(options.file_version)
            .with_indent_width(options.indent_width);
        self.write_document(&mut writer, ids)?;
        let (xml, _) = writer.into_parts();
        Ok(xml)
    }

    /// Create the objects of an exported fragment in this document.
    ///
    /// Objects get fresh unique names. Links between imported objects
    /// follow the renaming; other links resolve against the objects that
    /// were already here. On error every object created so far is removed
    /// and the undo history is left as it was.
    pub fn import_objects(
        &mut self,
        xml: &str,
        options: &LoadOptions,
    ) -> Result<ImportedObjects, DocumentError> {
        let mut reader = XmlReader::parse(xml)?.with_verbose(options.verbose);
        reader.read_element("Document")?;
        read_file_version(&mut reader)?;
        let existing = self.names_snapshot();

        let mut imported = ImportedObjects::default();
        let mut renamed = NameTable::new();
        let objects = read_object_list(&mut reader)?;
        for (type_name, name) in objects {
            let id = self.add_object(&type_name, &name);
            renamed.insert(name, id);
            imported.objects.push(id);
        }

        if let Err(e) = self.read_object_data(&mut reader, &renamed, &existing) {
            // Nothing was recorded for undo while reading, so the history
            // survives the rollback.
            for id in imported.objects.iter().rev() {
                self.discard_object(*id).ok();
            }
            return Err(e);
        }
        imported.diagnostics = reader.take_diagnostics();
        debug!(objects = imported.objects.len(), "objects imported");
        Ok(imported)
    }

    fn names_snapshot(&self) -> NameTable {
        self.objects()
            .map(|(id, o)| (o.name().to_string(), id))
            .collect()
    }

    fn write_document(
        &self,
        writer: &mut Writer<PropertyRef>,
        ids: &[ObjectId],
    ) -> Result<(), DocumentError> {
        let objects: Vec<(ObjectId, &DocumentObject)> = ids
            .iter()
            .map(|id| self.get(*id).map(|o| (*id, o)))
            .collect::<Result<_, _>>()?;

        check_text(self.name())?;
        for (_, obj) in &objects {
            check_text(obj.type_name())?;
        }

        writer.line("<?xml version='1.0' encoding='utf-8'?>");
        let schema = SCHEMA_VERSION.to_string();
        let file_version = writer.file_version().to_string();
        writer.start_element(
            "Document",
            &[
                ("SchemaVersion", schema.as_str()),
                ("FileVersion", file_version.as_str()),
                ("Name", self.name()),
            ],
        );

        let count = objects.len().to_string();
        writer.start_element("Objects", &[("Count", count.as_str())]);
        for (_, obj) in &objects {
            writer.empty_element("Object", &[("type", obj.type_name()), ("name", obj.name())]);
        }
        writer.end_element("Objects");

        writer.start_element("ObjectData", &[("Count", count.as_str())]);
        for (id, obj) in &objects {
            writer.start_element("Object", &[("name", obj.name())]);
            let props: Vec<_> = obj
                .properties()
                .filter(|p| !p.status().contains(PropertyStatus::TRANSIENT))
                .collect();
            let prop_count = props.len().to_string();
            writer.start_element("Properties", &[("Count", prop_count.as_str())]);
            for prop in props {
                let status = prop.status().persistent().bits().to_string();
                writer.start_element(
                    "Property",
                    &[
                        ("name", prop.name()),
                        ("type", prop.type_name()),
                        ("status", status.as_str()),
                    ],
                );
                let owner = PropertyRef {
                    object: *id,
                    property: prop.name().to_string(),
                };
                check_text(prop.name())
                    .and_then(|()| save_value(prop.value(), &owner, self, writer))
                    .map_err(|source| DocumentError::Save {
                        object: obj.name().to_string(),
                        property: prop.name().to_string(),
                        source,
                    })?;
                writer.end_element("Property");
            }
            writer.end_element("Properties");
            writer.end_element("Object");
        }
        writer.end_element("ObjectData");
        writer.end_element("Document");
        Ok(())
    }

    /// Read `ObjectData`. Saved names map to objects through `created`;
    /// links resolve through `created` first and `existing` second.
    fn read_object_data(
        &mut self,
        reader: &mut XmlReader<PropertyRef>,
        created: &NameTable,
        existing: &NameTable,
    ) -> Result<(), DocumentError> {
        let resolve = |name: &str| created.get(name).or_else(|| existing.get(name)).copied();
        reader.read_element("ObjectData")?;
        let count = reader.get_attribute_as_count("Count")?;
        for _ in 0..count {
            reader.read_element("Object")?;
            let name = reader.get_attribute("name")?.to_string();
            let id = *created
                .get(&name)
                .ok_or(DocumentError::UnknownObjectName { name })?;
            self.read_properties(reader, id, &resolve)?;
            reader.read_end_element("Object")?;
        }
        reader.read_end_element("ObjectData")?;
        Ok(())
    }

    fn read_properties(
        &mut self,
        reader: &mut XmlReader<PropertyRef>,
        id: ObjectId,
        resolve: &dyn Fn(&str) -> Option<ObjectId>,
    ) -> Result<(), DocumentError> {
        let owner_name = self.get(id)?.name().to_string();
        reader.read_element("Properties")?;
        let count = reader.get_attribute_as_count("Count")?;
        for _ in 0..count {
            reader.read_element("Property")?;
            let name = reader.get_attribute("name")?.to_string();
            let type_name = reader.get_attribute("type")?.to_string();
            let status = if reader.has_attribute("status") {
                let bits = reader.get_attribute_as_unsigned("status")?;
                PropertyStatus::from_bits_truncate(bits as u32)
            } else {
                PropertyStatus::empty()
            };

            let Some(template) = self.restore_template(reader, id, &owner_name, &name, &type_name, status)?
            else {
                reader.read_end_element("Property")?;
                continue;
            };
            let ctx = RestoreContext {
                owner: id,
                owner_name: &owner_name,
                property: &name,
                resolve,
            };
            let value = restore_value(&template, reader, &ctx)?;
            self.apply_value(id, &name, value, false)?;
            self.set_status(id, &name, status)?;
            reader.read_end_element("Property")?;
        }
        reader.read_end_element("Properties")?;
        Ok(())
    }

    /// The value to restore into, declaring the property if needed.
    ///
    /// `None` means the stored element cannot be restored and is skipped.
    fn restore_template(
        &mut self,
        reader: &mut XmlReader<PropertyRef>,
        id: ObjectId,
        owner_name: &str,
        name: &str,
        type_name: &str,
        status: PropertyStatus,
    ) -> Result<Option<PropertyValue>, DocumentError> {
        let stored = PropertyValue::from_type_name(type_name);
        let declared = self.get(id)?.property(name).map(|p| p.value().clone());
        match (declared, stored) {
            (Some(declared), Some(stored)) if declared.pasted(&stored).is_ok() => Ok(Some(declared)),
            (Some(declared), _) => {
                reader.diagnose(
                    DiagnosticKind::PropertyTypeMismatch,
                    name,
                    format!(
                        "{owner_name}.{name}: stored type '{type_name}' does not match declared type '{}', value skipped",
                        declared.type_name()
                    ),
                );
                Ok(None)
            }
            (None, Some(stored)) => {
                self.add_property(id, name, stored.clone(), status)?;
                Ok(Some(stored))
            }
            (None, None) => {
                reader.diagnose(
                    DiagnosticKind::PropertyTypeMismatch,
                    name,
                    format!("{owner_name}.{name}: unknown property type '{type_name}', value skipped"),
                );
                Ok(None)
            }
        }
    }

    /// Read the auxiliary files registered while reading the XML.
    fn read_doc_files(
        &mut self,
        reader: &mut XmlReader<PropertyRef>,
        files: &BTreeMap<String, Vec<u8>>,
    ) -> Result<(), DocumentError> {
        for entry in reader.take_files() {
            let PropertyRef { object, property } = entry.owner;
            let Some(data) = files.get(&entry.file_name) else {
                let owner = self.get(object)?.name().to_string();
                reader.diagnose(
                    DiagnosticKind::MissingFile,
                    &entry.file_name,
                    format!(
                        "auxiliary file '{}' for {owner}.{property} is missing",
                        entry.file_name
                    ),
                );
                continue;
            };
            let template = self.value(object, &property)?.clone();
            let value = restore_doc_file(&template, data, reader.file_version())?;
            self.apply_value(object, &property, value, false)?;
        }
        Ok(())
    }
}

fn read_file_version(reader: &mut XmlReader<PropertyRef>) -> Result<(), PersistenceError> {
    if reader.has_attribute("FileVersion") {
        let raw = reader.get_attribute_as_unsigned("FileVersion")?;
        let version = u32::try_from(raw).map_err(|_| PersistenceError::InvalidAttribute {
            attribute: "FileVersion".to_string(),
            value: raw.to_string(),
            expected: "a 32-bit version number",
        })?;
        reader.set_file_version(version);
    }
    Ok(())
}

fn read_object_list(
    reader: &mut XmlReader<PropertyRef>,
) -> Result<Vec<(String, String)>, PersistenceError> {
    reader.read_element("Objects")?;
    let count = reader.get_attribute_as_count("Count")?;
    let mut objects = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        reader.read_element("Object")?;
        objects.push((
            reader.get_attribute("type")?.to_string(),
            reader.get_attribute("name")?.to_string(),
        ));
    }
    reader.read_end_element("Objects")?;
    Ok(objects)
}
