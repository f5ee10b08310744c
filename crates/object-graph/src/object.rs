use indexmap::{IndexMap, IndexSet};
use slotmap::new_key_type;

use crate::property::Property;

new_key_type! {
    /// Stable handle of an object inside its document's arena.
    pub struct ObjectId;
}

/// A node of the document graph: a named, typed bag of properties.
///
/// Objects are owned by their [`Document`](crate::Document); they refer to
/// each other only through [`ObjectId`] handles held in link properties.
#[derive(Debug, Clone)]
pub struct DocumentObject {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) properties: IndexMap<String, Property>,
    /// Objects holding a forward link to this one.
    pub(crate) back_links: IndexSet<ObjectId>,
    pub(crate) touched: bool,
}

impl DocumentObject {
    pub(crate) fn new(name: String, type_name: String) -> Self {
        Self {
            name,
            type_name,
            properties: IndexMap::new(),
            back_links: IndexSet::new(),
            touched: false,
        }
    }

    /// Unique name within the owning document.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Objects that link to this one, in the order the links were made.
    pub fn in_list(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.back_links.iter().copied()
    }

    /// Forward targets over every link property, deduplicated, in
    /// first-seen order.
    pub fn out_list(&self) -> IndexSet<ObjectId> {
        self.properties
            .values()
            .flat_map(|p| p.value().link_targets())
            .collect()
    }

    pub(crate) fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }
}
