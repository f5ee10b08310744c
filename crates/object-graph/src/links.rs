//! Values of the link-with-subelement property kinds.

use indexmap::IndexMap;

use crate::errors::PropertyError;
use crate::object::ObjectId;

/// A link to one object plus the names of sub-elements (faces, edges, ...)
/// of that object.
///
/// A null link carries no sub-element names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSub {
    object: Option<ObjectId>,
    subs: Vec<String>,
}

impl LinkSub {
    pub fn new(object: Option<ObjectId>, subs: Vec<String>) -> Self {
        match object {
            Some(_) => Self { object, subs },
            None => Self::default(),
        }
    }

    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn sub_values(&self) -> &[String] {
        &self.subs
    }

    /// Sub-element names starting with `prefix`, e.g. all `"Face"` entries.
    pub fn sub_values_starts_with(&self, prefix: &str) -> Vec<String> {
        self.subs
            .iter()
            .filter(|s| s.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// One object with all the sub-element names attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSet {
    pub object: ObjectId,
    pub subs: Vec<String>,
}

impl SubSet {
    pub fn new<I, S>(object: ObjectId, subs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object,
            subs: subs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parallel lists of objects and sub-element names.
///
/// Entry `i` pairs `objects[i]` with `subs[i]`; both lists always have the
/// same length. An object may appear several times to carry several names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSubList {
    objects: Vec<ObjectId>,
    subs: Vec<String>,
}

impl LinkSubList {
    /// Pair up `objects` and `subs`. Fails if their lengths differ.
    pub fn new(objects: Vec<ObjectId>, subs: Vec<String>) -> Result<Self, PropertyError> {
        if objects.len() != subs.len() {
            return Err(PropertyError::LengthMismatch {
                objects: objects.len(),
                subnames: subs.len(),
            });
        }
        Ok(Self { objects, subs })
    }

    /// Link one object with a list of sub-element names.
    ///
    /// An empty name list still links the object, with a single empty name.
    /// A null object gives an empty list.
    pub fn single(object: Option<ObjectId>, subs: Vec<String>) -> Self {
        match object {
            None => Self::default(),
            Some(obj) if subs.is_empty() => Self {
                objects: vec![obj],
                subs: vec![String::new()],
            },
            Some(obj) => Self {
                objects: vec![obj; subs.len()],
                subs,
            },
        }
    }

    /// Flatten grouped entries back into parallel lists.
    pub fn from_sub_sets(sets: &[SubSet]) -> Self {
        let mut list = Self::default();
        for set in sets {
            for sub in &set.subs {
                list.push(set.object, sub.clone());
            }
        }
        list
    }

    /// Group entries by object, keeping first-seen object order and the
    /// order of names within each object.
    pub fn sub_sets(&self) -> Vec<SubSet> {
        let mut grouped: IndexMap<ObjectId, Vec<String>> = IndexMap::new();
        for (obj, sub) in self.iter() {
            grouped.entry(obj).or_default().push(sub.to_string());
        }
        grouped
            .into_iter()
            .map(|(object, subs)| SubSet { object, subs })
            .collect()
    }

    /// The common object when every entry links the same one.
    ///
    /// `None` for an empty list or mixed objects.
    pub fn value(&self) -> Option<ObjectId> {
        let first = *self.objects.first()?;
        self.objects
            .iter()
            .all(|o| *o == first)
            .then_some(first)
    }

    pub fn push(&mut self, object: ObjectId, sub: String) {
        self.objects.push(object);
        self.subs.push(sub);
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn subs(&self) -> &[String] {
        &self.subs
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &str)> + '_ {
        self.objects
            .iter()
            .copied()
            .zip(self.subs.iter().map(String::as_str))
    }

    /// Drop every entry whose object is `target`.
    pub(crate) fn without(&self, target: ObjectId) -> Self {
        let mut list = Self::default();
        for (obj, sub) in self.iter().filter(|(o, _)| *o != target) {
            list.push(obj, sub.to_string());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ObjectId> {
        let mut map: SlotMap<ObjectId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let o = ids(2);
        let err = LinkSubList::new(o, names(&["Face1"])).unwrap_err();
        assert_eq!(
            err,
            PropertyError::LengthMismatch {
                objects: 2,
                subnames: 1
            }
        );
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let o = ids(2);
        let (a, b) = (o[0], o[1]);
        let list = LinkSubList::new(
            vec![a, a, b],
            names(&["Face1", "Face2", "Edge3"]),
        )
        .unwrap();
        assert_eq!(
            list.sub_sets(),
            vec![
                SubSet::new(a, ["Face1", "Face2"]),
                SubSet::new(b, ["Edge3"]),
            ]
        );
    }

    #[test]
    fn interleaved_entries_group_together() {
        let o = ids(2);
        let (a, b) = (o[0], o[1]);
        let list =
            LinkSubList::new(vec![b, a, b], names(&["Edge1", "Face1", "Edge2"])).unwrap();
        let sets = list.sub_sets();
        assert_eq!(sets[0], SubSet::new(b, ["Edge1", "Edge2"]));
        assert_eq!(sets[1], SubSet::new(a, ["Face1"]));

        let flat = LinkSubList::from_sub_sets(&sets);
        assert_eq!(flat.objects(), &[b, b, a]);
        assert_eq!(flat.subs(), &names(&["Edge1", "Edge2", "Face1"])[..]);
    }

    #[test]
    fn common_value_requires_a_single_object() {
        let o = ids(2);
        assert_eq!(LinkSubList::default().value(), None);

        let same = LinkSubList::new(vec![o[0], o[0]], names(&["F1", "F2"])).unwrap();
        assert_eq!(same.value(), Some(o[0]));

        let mixed = LinkSubList::new(vec![o[0], o[1]], names(&["F1", "F2"])).unwrap();
        assert_eq!(mixed.value(), None);
    }

    #[test]
    fn single_with_no_names_keeps_the_link() {
        let o = ids(1);
        let list = LinkSubList::single(Some(o[0]), Vec::new());
        assert_eq!(list.len(), 1);
        assert_eq!(list.subs(), &[String::new()]);
        assert!(LinkSubList::single(None, names(&["Face1"])).is_empty());
    }

    #[test]
    fn null_link_sub_drops_names() {
        let sub = LinkSub::new(None, names(&["Face1"]));
        assert!(sub.sub_values().is_empty());
    }

    #[test]
    fn prefix_filter() {
        let o = ids(1);
        let sub = LinkSub::new(Some(o[0]), names(&["Face1", "Edge2", "Face3"]));
        assert_eq!(sub.sub_values_starts_with("Face"), names(&["Face1", "Face3"]));
    }
}
