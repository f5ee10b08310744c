//! DocumentBuilder: fluent API for scripting document edits in tests.
//!
//! Drives the public [`Document`] API directly. All methods accept object
//! names instead of handles for readability.

use std::collections::HashMap;

use file_format::{load_project, save_project, LoadedProject, ProjectMetadata};
use object_graph::doc_types::PropertyStatus;
use object_graph::{
    Document, LoadOptions, LoadedDocument, ObjectId, PropertyValue, RecomputeReport, SaveOptions,
};
use tracing::debug;

use crate::assertions;
use crate::helpers::HarnessError;

/// A fluent builder for constructing and verifying documents in tests.
///
/// Keeps a name table of the objects it created and a history of the
/// operations applied, for failure messages.
pub struct DocumentBuilder {
    pub document: Document,
    named: HashMap<String, ObjectId>,
    history: Vec<(String, String)>,
    auto_check: bool,
}

impl DocumentBuilder {
    pub fn new(name: &str) -> Self {
        Self::from_document(Document::new(name))
    }

    /// Wrap an existing document, e.g. one just loaded.
    pub fn from_document(document: Document) -> Self {
        let named = document
            .objects()
            .map(|(id, o)| (o.name().to_string(), id))
            .collect();
        Self {
            document,
            named,
            history: Vec::new(),
            auto_check: false,
        }
    }

    /// Enable auto-checking: after every operation, verify back-link symmetry.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Objects ─────────────────────────────────────────────────────────

    /// Create an object. The name must be free and already canonical, so
    /// the document keeps it unchanged.
    pub fn object(&mut self, type_name: &str, name: &str) -> Result<ObjectId, HarnessError> {
        self.check_name_available(name)?;
        let id = self.document.add_object(type_name, name);
        self.named.insert(name.to_string(), id);
        self.record("AddObject", format!("{type_name} '{name}'"));
        Ok(id)
    }

    /// Look up an object created by or loaded into this builder.
    pub fn id(&self, name: &str) -> Result<ObjectId, HarnessError> {
        self.named
            .get(name)
            .copied()
            .ok_or_else(|| HarnessError::ObjectNotFound {
                name: name.to_string(),
            })
    }

    pub fn remove(&mut self, name: &str) -> Result<(), HarnessError> {
        let id = self.id(name)?;
        self.document.remove_object(id)?;
        self.named.remove(name);
        self.record("RemoveObject", format!("'{name}'"));
        self.after_step("remove")
    }

    pub fn object_count(&self) -> usize {
        self.document.len()
    }

    // ── Properties ──────────────────────────────────────────────────────

    /// Declare a property with no status flags.
    pub fn property(
        &mut self,
        object: &str,
        property: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), HarnessError> {
        self.property_with_status(object, property, value, PropertyStatus::empty())
    }

    pub fn property_with_status(
        &mut self,
        object: &str,
        property: &str,
        value: impl Into<PropertyValue>,
        status: PropertyStatus,
    ) -> Result<(), HarnessError> {
        let id = self.id(object)?;
        let value = value.into();
        self.record("AddProperty", format!("{object}.{property}: {}", value.type_name()));
        self.document.add_property(id, property, value, status)?;
        self.after_step("property")
    }

    /// Assign a value to a declared property.
    pub fn set(
        &mut self,
        object: &str,
        property: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), HarnessError> {
        let id = self.id(object)?;
        self.record("SetValue", format!("{object}.{property}"));
        self.document.set_value(id, property, value)?;
        self.after_step("set")
    }

    pub fn value(&self, object: &str, property: &str) -> Result<&PropertyValue, HarnessError> {
        Ok(self.document.value(self.id(object)?, property)?)
    }

    // ── Links ───────────────────────────────────────────────────────────

    /// Point a single link at `target`, or clear it with `None`.
    /// The property is declared on first use.
    pub fn link(&mut self, object: &str, property: &str, target: Option<&str>) -> Result<(), HarnessError> {
        let target = target.map(|t| self.id(t)).transpose()?;
        self.record("SetLink", format!("{object}.{property} -> {target:?}"));
        self.assign(object, property, PropertyValue::Link(target))
    }

    /// Set a link list. The property is declared on first use.
    pub fn link_list(&mut self, object: &str, property: &str, targets: &[&str]) -> Result<(), HarnessError> {
        let targets = self.ids(targets)?;
        self.record("SetLinkList", format!("{object}.{property} -> {} targets", targets.len()));
        self.assign(object, property, PropertyValue::LinkList(targets))
    }

    /// Set a link-with-subnames list from `(object, sub-element)` pairs.
    /// The property is declared on first use.
    pub fn link_sub_list(
        &mut self,
        object: &str,
        property: &str,
        entries: &[(&str, &str)],
    ) -> Result<(), HarnessError> {
        let (names, subs): (Vec<&str>, Vec<String>) =
            entries.iter().map(|(o, s)| (*o, s.to_string())).unzip();
        let targets = self.ids(&names)?;
        let id = self.id(object)?;
        self.record("SetLinkSubList", format!("{object}.{property} -> {} entries", targets.len()));
        if self.document.property(id, property).is_err() {
            self.document
                .add_property(id, property, PropertyValue::LinkSubList(Default::default()), PropertyStatus::empty())?;
        }
        self.document.set_link_sub_values(id, property, targets, subs)?;
        self.after_step("link_sub_list")
    }

    fn assign(&mut self, object: &str, property: &str, value: PropertyValue) -> Result<(), HarnessError> {
        let id = self.id(object)?;
        if self.document.property(id, property).is_ok() {
            self.document.set_value(id, property, value)?;
        } else {
            self.document.add_property(id, property, value, PropertyStatus::empty())?;
        }
        self.after_step("link")
    }

    fn ids(&self, names: &[&str]) -> Result<Vec<ObjectId>, HarnessError> {
        names.iter().map(|n| self.id(n)).collect()
    }

    // ── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<(), HarnessError> {
        self.document.undo()?;
        self.record("Undo", String::new());
        self.after_step("undo")
    }

    pub fn redo(&mut self) -> Result<(), HarnessError> {
        self.document.redo()?;
        self.record("Redo", String::new());
        self.after_step("redo")
    }

    /// Operations applied so far as `(operation, detail)` pairs.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── Recompute ───────────────────────────────────────────────────────

    /// Recompute with an executor that addresses objects by name.
    pub fn recompute<F>(&mut self, mut execute: F) -> Result<RecomputeReport, HarnessError>
    where
        F: FnMut(&mut Document, &str) -> Result<(), String>,
    {
        let report = self.document.recompute(|doc, id| {
            let name = doc
                .object(id)
                .map(|o| o.name().to_string())
                .ok_or_else(|| format!("object {id:?} vanished during recompute"))?;
            execute(doc, &name)
        })?;
        self.record("Recompute", format!("{} recomputed", report.recomputed.len()));
        Ok(report)
    }

    /// Names of objects in dependency order.
    pub fn dependency_order(&self) -> Result<Vec<String>, HarnessError> {
        let order = self.document.topological_order()?;
        Ok(order
            .into_iter()
            .filter_map(|id| self.document.object(id).map(|o| o.name().to_string()))
            .collect())
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Save the document and load it back.
    pub fn round_trip(&self, options: &SaveOptions) -> Result<LoadedDocument, HarnessError> {
        let saved = self.document.save_xml(options)?;
        debug!(files = saved.files.len(), "round trip saved");
        Ok(Document::load_xml(&saved.xml, &saved.files, &LoadOptions::default())?)
    }

    /// Save the document as a project archive and load it back.
    pub fn archive_round_trip(&self, project: &str) -> Result<LoadedProject, HarnessError> {
        let metadata = ProjectMetadata::new(project);
        let archive = save_project(&self.document, &metadata, &SaveOptions::archive())?;
        Ok(load_project(&archive, &LoadOptions::default())?)
    }

    // ── Verification ────────────────────────────────────────────────────

    pub fn assert_back_link_symmetry(&self) -> Result<(), HarnessError> {
        assertions::assert_back_link_symmetry(&self.document, &self.context())
    }

    pub fn assert_links_to(&self, object: &str, expected: &[&str]) -> Result<(), HarnessError> {
        assertions::assert_links_to(&self.document, self.id(object)?, expected, &self.context())
    }

    pub fn assert_linked_from(&self, object: &str, expected: &[&str]) -> Result<(), HarnessError> {
        assertions::assert_linked_from(&self.document, self.id(object)?, expected, &self.context())
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn check_name_available(&self, name: &str) -> Result<(), HarnessError> {
        if self.named.contains_key(name) || self.document.object_by_name(name).is_some() {
            return Err(HarnessError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn record(&mut self, op: &str, detail: String) {
        self.history.push((op.to_string(), detail));
    }

    fn context(&self) -> String {
        match self.history.last() {
            Some((op, detail)) => format!("step {} {op} {detail}", self.history.len()),
            None => "empty".to_string(),
        }
    }

    fn after_step(&self, step: &str) -> Result<(), HarnessError> {
        if self.auto_check {
            assertions::assert_back_link_symmetry(&self.document, &format!("{step}: {}", self.context()))?;
        }
        Ok(())
    }
}
