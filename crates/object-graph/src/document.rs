use std::collections::HashMap;

use doc_types::{Enumeration, PropertyStatus};
use indexmap::IndexSet;
use slotmap::SlotMap;
use tracing::debug;

use crate::config::UndoConfig;
use crate::errors::{DocumentError, PropertyError};
use crate::events::DocumentEvent;
use crate::links::{LinkSub, LinkSubList, SubSet};
use crate::object::{DocumentObject, ObjectId};
use crate::property::Property;
use crate::undo::{Command, UndoStack};
use crate::value::PropertyValue;

/// A named container of objects and the links between them.
///
/// The document owns every object. Links are stored as [`ObjectId`]
/// handles and the inverse edges (back-links) are kept in step with every
/// property write, so `in_list` and `out_list` always agree.
#[derive(Debug)]
pub struct Document {
    name: String,
    pub(crate) objects: SlotMap<ObjectId, DocumentObject>,
    pub(crate) order: Vec<ObjectId>,
    names: HashMap<String, ObjectId>,
    events: Vec<DocumentEvent>,
    undo: UndoStack,
    undo_config: UndoConfig,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_undo_config(name, UndoConfig::default())
    }

    pub fn with_undo_config(name: impl Into<String>, undo_config: UndoConfig) -> Self {
        Self {
            name: name.into(),
            objects: SlotMap::with_key(),
            order: Vec::new(),
            names: HashMap::new(),
            events: Vec::new(),
            undo: UndoStack::new(undo_config.max_depth),
            undo_config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn undo_config(&self) -> UndoConfig {
        self.undo_config
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ── Objects ───────────────────────────────────────────────────────

    /// Create an object. The name is sanitized and made unique, so the
    /// stored name may differ from `name`.
    pub fn add_object(&mut self, type_name: &str, name: &str) -> ObjectId {
        let name = self.unique_name(name);
        let id = self
            .objects
            .insert(DocumentObject::new(name.clone(), type_name.to_string()));
        self.order.push(id);
        self.names.insert(name.clone(), id);
        debug!(object = %name, type_name, "object created");
        self.events.push(DocumentEvent::ObjectCreated { object: id, name });
        id
    }

    /// A name not yet used in this document, derived from `candidate`.
    ///
    /// `Box` stays `Box` when free, otherwise becomes `Box001`, `Box002`, ...
    pub fn unique_name(&self, candidate: &str) -> String {
        let base = sanitize_name(candidate);
        if !self.names.contains_key(&base) {
            return base;
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n = 1usize;
        loop {
            let name = format!("{stem}{n:03}");
            if !self.names.contains_key(&name) {
                return name;
            }
            n += 1;
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&DocumentObject> {
        self.objects.get(id)
    }

    pub fn object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    /// Objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &DocumentObject)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.objects.get(*id).map(|o| (*id, o)))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Delete an object.
    ///
    /// Links held by other objects that point at it are removed first,
    /// through the normal setter path. Undo history is cleared since it may
    /// refer to the deleted object.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<(), DocumentError> {
        self.discard_object(id)?;
        self.undo.clear();
        Ok(())
    }

    /// [`Document::remove_object`] without clearing undo history. Only for
    /// objects no recorded command refers to.
    pub(crate) fn discard_object(&mut self, id: ObjectId) -> Result<(), DocumentError> {
        let holders: Vec<ObjectId> = self.get(id)?.in_list().collect();
        for holder in holders.into_iter().filter(|h| *h != id) {
            let updates: Vec<(String, PropertyValue)> = self
                .get(holder)?
                .properties()
                .filter_map(|p| {
                    p.value()
                        .without_target(id)
                        .map(|v| (p.name().to_string(), v))
                })
                .collect();
            for (property, value) in updates {
                self.apply_value(holder, &property, value, false)?;
            }
        }

        for target in self.get(id)?.out_list() {
            if let Some(obj) = self.objects.get_mut(target) {
                obj.back_links.shift_remove(&id);
            }
        }

        let removed = self.objects.remove(id).ok_or(DocumentError::ObjectNotFound { id })?;
        self.order.retain(|o| *o != id);
        self.names.remove(&removed.name);
        debug!(object = %removed.name, "object removed");
        self.events.push(DocumentEvent::ObjectDeleted {
            object: id,
            name: removed.name,
        });
        Ok(())
    }

    // ── Properties ────────────────────────────────────────────────────

    /// Declare a property on an object.
    ///
    /// Declaration is not a change: nothing is touched or recorded for
    /// undo. Link targets in `value` get their back-links.
    pub fn add_property(
        &mut self,
        id: ObjectId,
        name: &str,
        value: impl Into<PropertyValue>,
        status: PropertyStatus,
    ) -> Result<(), DocumentError> {
        let value = value.into();
        self.check_targets(&value)?;
        let obj = self.get(id)?;
        if obj.properties.contains_key(name) {
            return Err(DocumentError::DuplicateProperty {
                object: obj.name.clone(),
                property: name.to_string(),
            });
        }
        let before = obj.out_list();
        let obj = self.get_mut(id)?;
        obj.properties
            .insert(name.to_string(), Property::new(name, value, status));
        self.reconcile_back_links(id, &before);
        Ok(())
    }

    pub fn property(&self, id: ObjectId, name: &str) -> Result<&Property, DocumentError> {
        let obj = self.get(id)?;
        obj.property(name)
            .ok_or_else(|| DocumentError::PropertyNotFound {
                object: obj.name.clone(),
                property: name.to_string(),
            })
    }

    pub fn value(&self, id: ObjectId, name: &str) -> Result<&PropertyValue, DocumentError> {
        Ok(self.property(id, name)?.value())
    }

    /// Assign a value of the property's kind.
    ///
    /// Plain and constrained numbers are interchangeable; constrained
    /// properties clamp. Any other kind difference is a type mismatch and
    /// leaves the property untouched.
    pub fn set_value(
        &mut self,
        id: ObjectId,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), DocumentError> {
        let source = value.into();
        let new = self
            .value(id, name)?
            .pasted(&source)
            .map_err(|e| DocumentError::property(name, e))?;
        self.apply_value(id, name, new, true)
    }

    /// Overwrite a property with the value of `source`.
    pub fn paste_property(
        &mut self,
        id: ObjectId,
        name: &str,
        source: &Property,
    ) -> Result<(), DocumentError> {
        let new = self
            .property(id, name)?
            .pasted(source)
            .map_err(|e| DocumentError::property(name, e))?;
        self.apply_value(id, name, new, true)
    }

    pub fn set_status(
        &mut self,
        id: ObjectId,
        name: &str,
        status: PropertyStatus,
    ) -> Result<(), DocumentError> {
        self.property_mut(id, name)?.status = status;
        Ok(())
    }

    pub fn set_link(
        &mut self,
        id: ObjectId,
        name: &str,
        target: Option<ObjectId>,
    ) -> Result<(), DocumentError> {
        self.set_value(id, name, PropertyValue::Link(target))
    }

    pub fn set_link_list(
        &mut self,
        id: ObjectId,
        name: &str,
        targets: Vec<ObjectId>,
    ) -> Result<(), DocumentError> {
        self.set_value(id, name, PropertyValue::LinkList(targets))
    }

    pub fn set_link_sub(
        &mut self,
        id: ObjectId,
        name: &str,
        target: Option<ObjectId>,
        subs: Vec<String>,
    ) -> Result<(), DocumentError> {
        self.set_value(id, name, LinkSub::new(target, subs))
    }

    /// Set a link-with-subnames list from parallel lists.
    ///
    /// Mismatched lengths fail before anything is modified.
    pub fn set_link_sub_values(
        &mut self,
        id: ObjectId,
        name: &str,
        objects: Vec<ObjectId>,
        subs: Vec<String>,
    ) -> Result<(), DocumentError> {
        let list = LinkSubList::new(objects, subs).map_err(|e| DocumentError::property(name, e))?;
        self.set_value(id, name, list)
    }

    /// Set a link-with-subnames list from its grouped form.
    pub fn set_sub_list_values(
        &mut self,
        id: ObjectId,
        name: &str,
        sets: &[SubSet],
    ) -> Result<(), DocumentError> {
        self.set_value(id, name, LinkSubList::from_sub_sets(sets))
    }

    /// Set a link-with-subnames list to one object and its names.
    pub fn set_link_sub_list_single(
        &mut self,
        id: ObjectId,
        name: &str,
        target: Option<ObjectId>,
        subs: Vec<String>,
    ) -> Result<(), DocumentError> {
        self.set_value(id, name, LinkSubList::single(target, subs))
    }

    /// Grouped view of a link-with-subnames list.
    pub fn sub_list_values(&self, id: ObjectId, name: &str) -> Result<Vec<SubSet>, DocumentError> {
        Ok(self.link_sub_list(id, name)?.sub_sets())
    }

    /// The single object every entry of a link-with-subnames list refers to.
    pub fn sub_list_object(
        &self,
        id: ObjectId,
        name: &str,
    ) -> Result<Option<ObjectId>, DocumentError> {
        Ok(self.link_sub_list(id, name)?.value())
    }

    /// Select an enumeration item by name.
    pub fn select_enum(&mut self, id: ObjectId, name: &str, item: &str) -> Result<(), DocumentError> {
        let mut enumeration = self.enumeration(id, name)?.clone();
        enumeration
            .select(item)
            .map_err(|e| DocumentError::property(name, e.into()))?;
        self.apply_value(id, name, PropertyValue::Enumeration(enumeration), true)
    }

    pub(crate) fn enumeration(&self, id: ObjectId, name: &str) -> Result<&Enumeration, DocumentError> {
        match self.value(id, name)? {
            PropertyValue::Enumeration(e) => Ok(e),
            other => Err(DocumentError::property(
                name,
                PropertyError::TypeMismatch {
                    expected: "Enumeration",
                    found: other.type_name(),
                },
            )),
        }
    }

    fn link_sub_list(&self, id: ObjectId, name: &str) -> Result<&LinkSubList, DocumentError> {
        match self.value(id, name)? {
            PropertyValue::LinkSubList(list) => Ok(list),
            other => Err(DocumentError::property(
                name,
                PropertyError::TypeMismatch {
                    expected: "LinkSubList",
                    found: other.type_name(),
                },
            )),
        }
    }

    // ── Graph queries ─────────────────────────────────────────────────

    /// Objects `id` links to, deduplicated, in first-seen order.
    pub fn out_list(&self, id: ObjectId) -> Result<Vec<ObjectId>, DocumentError> {
        Ok(self.get(id)?.out_list().into_iter().collect())
    }

    /// Objects linking to `id`.
    pub fn in_list(&self, id: ObjectId) -> Result<Vec<ObjectId>, DocumentError> {
        Ok(self.get(id)?.in_list().collect())
    }

    // ── Touch state, events, history ──────────────────────────────────

    /// Mark an object for recompute.
    pub fn touch(&mut self, id: ObjectId) -> Result<(), DocumentError> {
        self.get_mut(id)?.touched = true;
        Ok(())
    }

    /// Clear every touched flag on objects and properties.
    pub fn purge_touched(&mut self) {
        for obj in self.objects.values_mut() {
            obj.touched = false;
            for prop in obj.properties.values_mut() {
                prop.touched = false;
            }
        }
    }

    pub fn touched_objects(&self) -> Vec<ObjectId> {
        self.objects()
            .filter(|(_, o)| o.is_touched())
            .map(|(id, _)| id)
            .collect()
    }

    /// Drain queued change notifications.
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Revert the most recent property change.
    pub fn undo(&mut self) -> Result<(), DocumentError> {
        let cmd = self.undo.pop_undo().ok_or(DocumentError::NothingToUndo)?;
        let reverse = cmd.clone().inverse();
        self.replay(&reverse)?;
        self.undo.push_redo(cmd);
        Ok(())
    }

    /// Re-apply the most recently undone change.
    pub fn redo(&mut self) -> Result<(), DocumentError> {
        let cmd = self.undo.pop_redo().ok_or(DocumentError::NothingToRedo)?;
        self.replay(&cmd)?;
        self.undo.push_undo_only(cmd);
        Ok(())
    }

    pub fn clear_undo(&mut self) {
        self.undo.clear();
    }

    /// Forget transient change state: touched flags, events and undo.
    pub(crate) fn settle(&mut self) {
        self.purge_touched();
        self.events.clear();
        self.undo.clear();
    }

    fn replay(&mut self, cmd: &Command) -> Result<(), DocumentError> {
        match cmd {
            Command::SetProperty {
                object,
                property,
                new,
                ..
            } => self.apply_value(*object, property, (**new).clone(), false),
        }
    }

    // ── Setter core ───────────────────────────────────────────────────

    /// Install `new` as the value of a property.
    ///
    /// The write is bracketed by `about_to_set_value`/`has_set_value` and
    /// back-links are reconciled in between. `new` must already be of the
    /// property's kind. With `record`, the change goes onto the undo stack.
    pub(crate) fn apply_value(
        &mut self,
        id: ObjectId,
        name: &str,
        new: PropertyValue,
        record: bool,
    ) -> Result<(), DocumentError> {
        self.check_targets(&new)?;
        let before = self.get(id)?.out_list();
        self.about_to_set_value(id, name)?;
        let prop = self.property_mut(id, name)?;
        let old = std::mem::replace(&mut prop.value, new);
        self.reconcile_back_links(id, &before);
        self.has_set_value(id, name, old, record)
    }

    fn about_to_set_value(&mut self, id: ObjectId, name: &str) -> Result<(), DocumentError> {
        self.property(id, name)?;
        self.events.push(DocumentEvent::PropertyAboutToChange {
            object: id,
            property: name.to_string(),
        });
        Ok(())
    }

    fn has_set_value(
        &mut self,
        id: ObjectId,
        name: &str,
        old: PropertyValue,
        record: bool,
    ) -> Result<(), DocumentError> {
        let prop = self.property_mut(id, name)?;
        prop.touched = true;
        let status = prop.status;
        let new = prop.value.clone();
        if status.touches_container() {
            self.get_mut(id)?.touched = true;
        }
        if record && self.undo_config.enabled && old != new {
            self.undo.push(Command::SetProperty {
                object: id,
                property: name.to_string(),
                old: Box::new(old),
                new: Box::new(new),
            });
        }
        self.events.push(DocumentEvent::PropertyChanged {
            object: id,
            property: name.to_string(),
        });
        Ok(())
    }

    /// Bring back-links in line with the holder's current forward set.
    ///
    /// `before` is the holder's forward set prior to the change. Targets
    /// still linked through another property or entry keep their back-link.
    fn reconcile_back_links(&mut self, holder: ObjectId, before: &IndexSet<ObjectId>) {
        let Some(after) = self.objects.get(holder).map(DocumentObject::out_list) else {
            return;
        };
        for gone in before.difference(&after) {
            if let Some(obj) = self.objects.get_mut(*gone) {
                obj.back_links.shift_remove(&holder);
            }
        }
        for target in &after {
            if let Some(obj) = self.objects.get_mut(*target) {
                obj.back_links.insert(holder);
            }
        }
    }

    fn check_targets(&self, value: &PropertyValue) -> Result<(), DocumentError> {
        match value.link_targets().into_iter().find(|t| !self.contains(*t)) {
            Some(id) => Err(DocumentError::ObjectNotFound { id }),
            None => Ok(()),
        }
    }

    pub(crate) fn get(&self, id: ObjectId) -> Result<&DocumentObject, DocumentError> {
        self.objects.get(id).ok_or(DocumentError::ObjectNotFound { id })
    }

    fn get_mut(&mut self, id: ObjectId) -> Result<&mut DocumentObject, DocumentError> {
        self.objects
            .get_mut(id)
            .ok_or(DocumentError::ObjectNotFound { id })
    }

    pub(crate) fn property_mut(
        &mut self,
        id: ObjectId,
        name: &str,
    ) -> Result<&mut Property, DocumentError> {
        let obj = self.get_mut(id)?;
        let object = obj.name.clone();
        obj.property_mut(name)
            .ok_or_else(|| DocumentError::PropertyNotFound {
                object,
                property: name.to_string(),
            })
    }
}

/// Restrict a name to ASCII identifier characters.
fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push_str("Unnamed");
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_boxes(n: usize) -> (Document, Vec<ObjectId>) {
        let mut doc = Document::new("Test");
        let ids = (0..n).map(|_| doc.add_object("Part::Box", "Box")).collect();
        (doc, ids)
    }

    #[test]
    fn names_are_made_unique() {
        let (doc, ids) = doc_with_boxes(3);
        let names: Vec<&str> = ids.iter().map(|id| doc.object(*id).unwrap().name()).collect();
        assert_eq!(names, ["Box", "Box001", "Box002"]);
    }

    #[test]
    fn names_are_sanitized() {
        let mut doc = Document::new("Test");
        let a = doc.add_object("Part::Box", "my box");
        let b = doc.add_object("Part::Box", "3D");
        let c = doc.add_object("Part::Box", "");
        assert_eq!(doc.object(a).unwrap().name(), "my_box");
        assert_eq!(doc.object(b).unwrap().name(), "_3D");
        assert_eq!(doc.object(c).unwrap().name(), "Unnamed");
    }

    #[test]
    fn numbered_name_clash_strips_digits() {
        let mut doc = Document::new("Test");
        doc.add_object("Part::Box", "Box001");
        let b = doc.add_object("Part::Box", "Box001");
        assert_eq!(doc.object(b).unwrap().name(), "Box002");
    }

    #[test]
    fn duplicate_property_is_rejected() {
        let (mut doc, ids) = doc_with_boxes(1);
        doc.add_property(ids[0], "Length", 1.0, PropertyStatus::empty())
            .unwrap();
        let err = doc
            .add_property(ids[0], "Length", 2.0, PropertyStatus::empty())
            .unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateProperty { .. }));
    }

    #[test]
    fn set_link_maintains_back_links() {
        let (mut doc, ids) = doc_with_boxes(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        doc.add_property(a, "Base", PropertyValue::Link(None), PropertyStatus::empty())
            .unwrap();

        doc.set_link(a, "Base", Some(b)).unwrap();
        assert_eq!(doc.in_list(b).unwrap(), vec![a]);

        doc.set_link(a, "Base", Some(c)).unwrap();
        assert!(doc.in_list(b).unwrap().is_empty());
        assert_eq!(doc.in_list(c).unwrap(), vec![a]);

        doc.set_link(a, "Base", None).unwrap();
        assert!(doc.in_list(c).unwrap().is_empty());
    }

    #[test]
    fn back_link_survives_while_another_property_links() {
        let (mut doc, ids) = doc_with_boxes(2);
        let (a, b) = (ids[0], ids[1]);
        doc.add_property(a, "Base", PropertyValue::Link(Some(b)), PropertyStatus::empty())
            .unwrap();
        doc.add_property(a, "Tools", PropertyValue::LinkList(vec![b, b]), PropertyStatus::empty())
            .unwrap();
        assert_eq!(doc.in_list(b).unwrap(), vec![a]);

        doc.set_link(a, "Base", None).unwrap();
        assert_eq!(doc.in_list(b).unwrap(), vec![a]);

        doc.set_link_list(a, "Tools", vec![b]).unwrap();
        assert_eq!(doc.in_list(b).unwrap(), vec![a]);

        doc.set_link_list(a, "Tools", Vec::new()).unwrap();
        assert!(doc.in_list(b).unwrap().is_empty());
    }

    #[test]
    fn length_mismatch_leaves_value_unchanged() {
        let (mut doc, ids) = doc_with_boxes(2);
        let (a, b) = (ids[0], ids[1]);
        doc.add_property(a, "Faces", LinkSubList::default(), PropertyStatus::empty())
            .unwrap();
        doc.set_link_sub_values(a, "Faces", vec![b], vec!["Face1".into()])
            .unwrap();
        doc.take_events();

        let err = doc
            .set_link_sub_values(a, "Faces", vec![b, b], vec!["Face2".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Property {
                source: PropertyError::LengthMismatch { objects: 2, subnames: 1 },
                ..
            }
        ));
        assert_eq!(doc.sub_list_values(a, "Faces").unwrap(), vec![SubSet::new(b, ["Face1"])]);
        assert!(doc.take_events().is_empty());
    }

    #[test]
    fn type_mismatch_is_reported() {
        let (mut doc, ids) = doc_with_boxes(1);
        doc.add_property(ids[0], "Label", "box", PropertyStatus::empty())
            .unwrap();
        let err = doc.set_value(ids[0], "Label", 3i64).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Property {
                source: PropertyError::TypeMismatch { .. },
                ..
            }
        ));
        assert_eq!(doc.value(ids[0], "Label").unwrap(), &PropertyValue::from("box"));
    }

    #[test]
    fn link_to_unknown_object_is_rejected() {
        let (mut doc, ids) = doc_with_boxes(2);
        doc.add_property(ids[0], "Base", PropertyValue::Link(None), PropertyStatus::empty())
            .unwrap();
        doc.remove_object(ids[1]).unwrap();
        let err = doc.set_link(ids[0], "Base", Some(ids[1])).unwrap_err();
        assert_eq!(err, DocumentError::ObjectNotFound { id: ids[1] });
    }

    #[test]
    fn setter_brackets_with_events() {
        let (mut doc, ids) = doc_with_boxes(1);
        doc.add_property(ids[0], "Length", 1.0, PropertyStatus::empty())
            .unwrap();
        doc.take_events();
        doc.set_value(ids[0], "Length", 2.0).unwrap();
        assert_eq!(
            doc.take_events(),
            vec![
                DocumentEvent::PropertyAboutToChange {
                    object: ids[0],
                    property: "Length".into()
                },
                DocumentEvent::PropertyChanged {
                    object: ids[0],
                    property: "Length".into()
                },
            ]
        );
    }

    #[test]
    fn output_properties_do_not_touch_the_object() {
        let (mut doc, ids) = doc_with_boxes(1);
        doc.add_property(ids[0], "Volume", 0.0, PropertyStatus::OUTPUT)
            .unwrap();
        doc.set_value(ids[0], "Volume", 8.0).unwrap();
        assert!(doc.property(ids[0], "Volume").unwrap().is_touched());
        assert!(!doc.object(ids[0]).unwrap().is_touched());
    }

    #[test]
    fn undo_and_redo_restore_links() {
        let (mut doc, ids) = doc_with_boxes(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        doc.add_property(a, "Base", PropertyValue::Link(None), PropertyStatus::empty())
            .unwrap();
        doc.set_link(a, "Base", Some(b)).unwrap();
        doc.set_link(a, "Base", Some(c)).unwrap();

        doc.undo().unwrap();
        assert_eq!(doc.value(a, "Base").unwrap(), &PropertyValue::Link(Some(b)));
        assert_eq!(doc.in_list(b).unwrap(), vec![a]);
        assert!(doc.in_list(c).unwrap().is_empty());

        doc.redo().unwrap();
        assert_eq!(doc.value(a, "Base").unwrap(), &PropertyValue::Link(Some(c)));
        assert!(doc.in_list(b).unwrap().is_empty());

        doc.undo().unwrap();
        doc.undo().unwrap();
        assert_eq!(doc.undo(), Err(DocumentError::NothingToUndo));
    }

    #[test]
    fn disabled_undo_records_nothing() {
        let mut doc = Document::with_undo_config("Test", UndoConfig::disabled());
        let a = doc.add_object("Part::Box", "Box");
        doc.add_property(a, "Length", 1.0, PropertyStatus::empty())
            .unwrap();
        doc.set_value(a, "Length", 2.0).unwrap();
        assert!(!doc.can_undo());
    }

    #[test]
    fn removing_a_target_nulls_links_to_it() {
        let (mut doc, ids) = doc_with_boxes(3);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        doc.add_property(a, "Base", PropertyValue::Link(Some(b)), PropertyStatus::empty())
            .unwrap();
        doc.add_property(a, "Tools", PropertyValue::LinkList(vec![b, c, b]), PropertyStatus::empty())
            .unwrap();

        doc.remove_object(b).unwrap();
        assert_eq!(doc.value(a, "Base").unwrap(), &PropertyValue::Link(None));
        assert_eq!(doc.value(a, "Tools").unwrap(), &PropertyValue::LinkList(vec![c]));
        assert_eq!(doc.in_list(c).unwrap(), vec![a]);
        assert_eq!(doc.object_by_name("Box001"), None);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn removing_a_holder_drops_its_back_links() {
        let (mut doc, ids) = doc_with_boxes(2);
        let (a, b) = (ids[0], ids[1]);
        doc.add_property(a, "Base", PropertyValue::Link(Some(b)), PropertyStatus::empty())
            .unwrap();
        doc.remove_object(a).unwrap();
        assert!(doc.in_list(b).unwrap().is_empty());
    }

    #[test]
    fn select_enum_by_name() {
        let (mut doc, ids) = doc_with_boxes(1);
        let modes = Enumeration::new(["Dimension", "TwoLengths", "UpToFace"]);
        doc.add_property(ids[0], "Type", modes, PropertyStatus::empty())
            .unwrap();
        doc.select_enum(ids[0], "Type", "UpToFace").unwrap();
        let PropertyValue::Enumeration(e) = doc.value(ids[0], "Type").unwrap() else {
            panic!("not an enumeration");
        };
        assert_eq!(e.selected(), Some("UpToFace"));
        assert!(doc.select_enum(ids[0], "Type", "Sideways").is_err());
    }
}
