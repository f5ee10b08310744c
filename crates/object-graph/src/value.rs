use std::collections::{BTreeMap, BTreeSet};
use std::mem::size_of;
use std::path::PathBuf;

use doc_types::{Color, Enumeration, FloatConstraints, IntConstraints, Material, Uuid};

use crate::errors::PropertyError;
use crate::links::{LinkSub, LinkSubList};
use crate::object::ObjectId;

/// Concrete kind of a property, independent of its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Integer,
    IntegerConstraint,
    Float,
    FloatConstraint,
    Bool,
    String,
    Font,
    Path,
    Uuid,
    Color,
    Material,
    Enumeration,
    IntegerList,
    IntegerSet,
    FloatList,
    BoolList,
    StringList,
    Map,
    ColorList,
    MaterialList,
    Link,
    LinkList,
    LinkSub,
    LinkSubList,
}

impl PropertyKind {
    pub fn is_link(self) -> bool {
        matches!(
            self,
            PropertyKind::Link
                | PropertyKind::LinkList
                | PropertyKind::LinkSub
                | PropertyKind::LinkSubList
        )
    }
}

/// The value held by a property, one variant per property kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(i64),
    IntegerConstraint {
        value: i64,
        constraints: IntConstraints,
    },
    Float(f64),
    FloatConstraint {
        value: f64,
        constraints: FloatConstraints,
    },
    Bool(bool),
    String(String),
    /// A font name. Stored like a string under its own type name.
    Font(String),
    Path(PathBuf),
    Uuid(Uuid),
    Color(Color),
    Material(Material),
    Enumeration(Enumeration),
    IntegerList(Vec<i64>),
    IntegerSet(BTreeSet<i64>),
    FloatList(Vec<f64>),
    BoolList(Vec<bool>),
    StringList(Vec<String>),
    Map(BTreeMap<String, String>),
    ColorList(Vec<Color>),
    MaterialList(Vec<Material>),
    Link(Option<ObjectId>),
    LinkList(Vec<ObjectId>),
    LinkSub(LinkSub),
    LinkSubList(LinkSubList),
}

impl PropertyValue {
    /// A constrained integer in `[0, 100]`.
    pub fn percent(value: i64) -> Self {
        PropertyValue::constrained_integer(value, IntConstraints::PERCENT)
    }

    /// A non-negative float stepping by a thousandth.
    pub fn precision(value: f64) -> Self {
        PropertyValue::constrained_float(value, FloatConstraints::PRECISION)
    }

    /// A constrained integer. The value is clamped into the range.
    pub fn constrained_integer(value: i64, constraints: IntConstraints) -> Self {
        PropertyValue::IntegerConstraint {
            value: constraints.clamp(value),
            constraints,
        }
    }

    /// A constrained float. The value is clamped into the range.
    pub fn constrained_float(value: f64, constraints: FloatConstraints) -> Self {
        PropertyValue::FloatConstraint {
            value: constraints.clamp(value),
            constraints,
        }
    }

    /// The default value of the kind registered under `type_name`.
    pub fn from_type_name(type_name: &str) -> Option<PropertyValue> {
        let value = match type_name {
            "Integer" => PropertyValue::Integer(0),
            "IntegerConstraint" => PropertyValue::constrained_integer(0, IntConstraints::UNBOUNDED),
            "Percent" => PropertyValue::percent(0),
            "Float" => PropertyValue::Float(0.0),
            "FloatConstraint" => PropertyValue::constrained_float(0.0, FloatConstraints::UNBOUNDED),
            "Precision" => PropertyValue::precision(0.0),
            "Bool" => PropertyValue::Bool(false),
            "String" => PropertyValue::String(String::new()),
            "Font" => PropertyValue::Font(String::new()),
            "Path" => PropertyValue::Path(PathBuf::new()),
            "Uuid" => PropertyValue::Uuid(Uuid::nil()),
            "Color" => PropertyValue::Color(Color::default()),
            "Material" => PropertyValue::Material(Material::default()),
            "Enumeration" => PropertyValue::Enumeration(Enumeration::default()),
            "IntegerList" => PropertyValue::IntegerList(Vec::new()),
            "IntegerSet" => PropertyValue::IntegerSet(BTreeSet::new()),
            "FloatList" => PropertyValue::FloatList(Vec::new()),
            "BoolList" => PropertyValue::BoolList(Vec::new()),
            "StringList" => PropertyValue::StringList(Vec::new()),
            "Map" => PropertyValue::Map(BTreeMap::new()),
            "ColorList" => PropertyValue::ColorList(Vec::new()),
            "MaterialList" => PropertyValue::MaterialList(Vec::new()),
            "Link" => PropertyValue::Link(None),
            "LinkList" => PropertyValue::LinkList(Vec::new()),
            "LinkSub" => PropertyValue::LinkSub(LinkSub::default()),
            "LinkSubList" => PropertyValue::LinkSubList(LinkSubList::default()),
            _ => return None,
        };
        Some(value)
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Integer(_) => PropertyKind::Integer,
            PropertyValue::IntegerConstraint { .. } => PropertyKind::IntegerConstraint,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::FloatConstraint { .. } => PropertyKind::FloatConstraint,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Font(_) => PropertyKind::Font,
            PropertyValue::Path(_) => PropertyKind::Path,
            PropertyValue::Uuid(_) => PropertyKind::Uuid,
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::Material(_) => PropertyKind::Material,
            PropertyValue::Enumeration(_) => PropertyKind::Enumeration,
            PropertyValue::IntegerList(_) => PropertyKind::IntegerList,
            PropertyValue::IntegerSet(_) => PropertyKind::IntegerSet,
            PropertyValue::FloatList(_) => PropertyKind::FloatList,
            PropertyValue::BoolList(_) => PropertyKind::BoolList,
            PropertyValue::StringList(_) => PropertyKind::StringList,
            PropertyValue::Map(_) => PropertyKind::Map,
            PropertyValue::ColorList(_) => PropertyKind::ColorList,
            PropertyValue::MaterialList(_) => PropertyKind::MaterialList,
            PropertyValue::Link(_) => PropertyKind::Link,
            PropertyValue::LinkList(_) => PropertyKind::LinkList,
            PropertyValue::LinkSub(_) => PropertyKind::LinkSub,
            PropertyValue::LinkSubList(_) => PropertyKind::LinkSubList,
        }
    }

    /// Registered type name, the inverse of [`PropertyValue::from_type_name`].
    ///
    /// Constrained values using the percent or precision presets report
    /// those preset names.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::IntegerConstraint { constraints, .. }
                if *constraints == IntConstraints::PERCENT =>
            {
                "Percent"
            }
            PropertyValue::FloatConstraint { constraints, .. }
                if *constraints == FloatConstraints::PRECISION =>
            {
                "Precision"
            }
            _ => kind_name(self.kind()),
        }
    }

    pub fn is_link(&self) -> bool {
        self.kind().is_link()
    }

    /// Every object referenced by this value, in storage order, with repeats.
    pub fn link_targets(&self) -> Vec<ObjectId> {
        match self {
            PropertyValue::Link(target) => target.iter().copied().collect(),
            PropertyValue::LinkList(targets) => targets.clone(),
            PropertyValue::LinkSub(sub) => sub.object().into_iter().collect(),
            PropertyValue::LinkSubList(list) => list.objects().to_vec(),
            _ => Vec::new(),
        }
    }

    /// This value with every reference to `target` removed, or `None` if it
    /// does not reference `target`.
    pub fn without_target(&self, target: ObjectId) -> Option<PropertyValue> {
        if !self.link_targets().contains(&target) {
            return None;
        }
        let value = match self {
            PropertyValue::Link(_) => PropertyValue::Link(None),
            PropertyValue::LinkList(targets) => PropertyValue::LinkList(
                targets.iter().copied().filter(|t| *t != target).collect(),
            ),
            PropertyValue::LinkSub(_) => PropertyValue::LinkSub(LinkSub::default()),
            PropertyValue::LinkSubList(list) => PropertyValue::LinkSubList(list.without(target)),
            _ => return None,
        };
        Some(value)
    }

    /// The value a property holding `self` takes when `source` is pasted
    /// into it.
    ///
    /// Kinds must match, except that plain and constrained numbers paste
    /// into each other. A constrained target keeps its own range and clamps
    /// the pasted number.
    pub fn pasted(&self, source: &PropertyValue) -> Result<PropertyValue, PropertyError> {
        use PropertyValue as V;
        let value = match (self, source) {
            (V::Integer(_), V::Integer(v) | V::IntegerConstraint { value: v, .. }) => {
                V::Integer(*v)
            }
            (
                V::IntegerConstraint { constraints, .. },
                V::Integer(v) | V::IntegerConstraint { value: v, .. },
            ) => V::constrained_integer(*v, *constraints),
            (V::Float(_), V::Float(v) | V::FloatConstraint { value: v, .. }) => V::Float(*v),
            (
                V::FloatConstraint { constraints, .. },
                V::Float(v) | V::FloatConstraint { value: v, .. },
            ) => V::constrained_float(*v, *constraints),
            (V::Bool(_), V::Bool(_))
            | (V::String(_), V::String(_))
            | (V::Font(_), V::Font(_))
            | (V::Path(_), V::Path(_))
            | (V::Uuid(_), V::Uuid(_))
            | (V::Color(_), V::Color(_))
            | (V::Material(_), V::Material(_))
            | (V::Enumeration(_), V::Enumeration(_))
            | (V::IntegerList(_), V::IntegerList(_))
            | (V::IntegerSet(_), V::IntegerSet(_))
            | (V::FloatList(_), V::FloatList(_))
            | (V::BoolList(_), V::BoolList(_))
            | (V::StringList(_), V::StringList(_))
            | (V::Map(_), V::Map(_))
            | (V::ColorList(_), V::ColorList(_))
            | (V::MaterialList(_), V::MaterialList(_))
            | (V::Link(_), V::Link(_))
            | (V::LinkList(_), V::LinkList(_))
            | (V::LinkSub(_), V::LinkSub(_))
            | (V::LinkSubList(_), V::LinkSubList(_)) => source.clone(),
            _ => {
                return Err(PropertyError::TypeMismatch {
                    expected: self.type_name(),
                    found: source.type_name(),
                })
            }
        };
        Ok(value)
    }

    /// Overwrite `self` with `source`. On error `self` is unchanged.
    pub fn paste(&mut self, source: &PropertyValue) -> Result<(), PropertyError> {
        *self = self.pasted(source)?;
        Ok(())
    }

    /// Approximate bytes used by the value, heap included.
    pub fn mem_size(&self) -> usize {
        let heap = match self {
            PropertyValue::String(s) | PropertyValue::Font(s) => s.capacity(),
            PropertyValue::Path(p) => p.as_os_str().len(),
            PropertyValue::Enumeration(e) => strings_size(e.items()),
            PropertyValue::IntegerList(v) => v.capacity() * size_of::<i64>(),
            PropertyValue::IntegerSet(s) => s.len() * size_of::<i64>(),
            PropertyValue::FloatList(v) => v.capacity() * size_of::<f64>(),
            PropertyValue::BoolList(v) => v.capacity(),
            PropertyValue::StringList(v) => strings_size(v),
            PropertyValue::Map(m) => m.iter().map(|(k, v)| k.len() + v.len()).sum(),
            PropertyValue::ColorList(v) => v.capacity() * size_of::<Color>(),
            PropertyValue::MaterialList(v) => v.capacity() * size_of::<Material>(),
            PropertyValue::LinkList(v) => v.capacity() * size_of::<ObjectId>(),
            PropertyValue::LinkSub(sub) => strings_size(sub.sub_values()),
            PropertyValue::LinkSubList(list) => {
                list.len() * size_of::<ObjectId>() + strings_size(list.subs())
            }
            _ => 0,
        };
        size_of::<Self>() + heap
    }
}

fn strings_size(strings: &[String]) -> usize {
    strings
        .iter()
        .map(|s| size_of::<String>() + s.capacity())
        .sum()
}

fn kind_name(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Integer => "Integer",
        PropertyKind::IntegerConstraint => "IntegerConstraint",
        PropertyKind::Float => "Float",
        PropertyKind::FloatConstraint => "FloatConstraint",
        PropertyKind::Bool => "Bool",
        PropertyKind::String => "String",
        PropertyKind::Font => "Font",
        PropertyKind::Path => "Path",
        PropertyKind::Uuid => "Uuid",
        PropertyKind::Color => "Color",
        PropertyKind::Material => "Material",
        PropertyKind::Enumeration => "Enumeration",
        PropertyKind::IntegerList => "IntegerList",
        PropertyKind::IntegerSet => "IntegerSet",
        PropertyKind::FloatList => "FloatList",
        PropertyKind::BoolList => "BoolList",
        PropertyKind::StringList => "StringList",
        PropertyKind::Map => "Map",
        PropertyKind::ColorList => "ColorList",
        PropertyKind::MaterialList => "MaterialList",
        PropertyKind::Link => "Link",
        PropertyKind::LinkList => "LinkList",
        PropertyKind::LinkSub => "LinkSub",
        PropertyKind::LinkSubList => "LinkSubList",
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    i64 => Integer,
    f64 => Float,
    bool => Bool,
    String => String,
    PathBuf => Path,
    Uuid => Uuid,
    Color => Color,
    Material => Material,
    Enumeration => Enumeration,
    Vec<i64> => IntegerList,
    BTreeSet<i64> => IntegerSet,
    Vec<f64> => FloatList,
    Vec<bool> => BoolList,
    Vec<String> => StringList,
    BTreeMap<String, String> => Map,
    Vec<Color> => ColorList,
    Vec<Material> => MaterialList,
    Option<ObjectId> => Link,
    Vec<ObjectId> => LinkList,
    LinkSub => LinkSub,
    LinkSubList => LinkSubList,
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<ObjectId> for PropertyValue {
    fn from(value: ObjectId) -> Self {
        PropertyValue::Link(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    const ALL_TYPE_NAMES: &[&str] = &[
        "Integer",
        "IntegerConstraint",
        "Percent",
        "Float",
        "FloatConstraint",
        "Precision",
        "Bool",
        "String",
        "Font",
        "Path",
        "Uuid",
        "Color",
        "Material",
        "Enumeration",
        "IntegerList",
        "IntegerSet",
        "FloatList",
        "BoolList",
        "StringList",
        "Map",
        "ColorList",
        "MaterialList",
        "Link",
        "LinkList",
        "LinkSub",
        "LinkSubList",
    ];

    #[test]
    fn type_names_round_trip() {
        for name in ALL_TYPE_NAMES {
            let value = PropertyValue::from_type_name(name).unwrap();
            assert_eq!(value.type_name(), *name);
        }
        assert!(PropertyValue::from_type_name("Sketch").is_none());
    }

    #[test]
    fn font_does_not_paste_into_string() {
        let target = PropertyValue::String(String::new());
        let err = target.pasted(&PropertyValue::Font("Sans".into())).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                expected: "String",
                found: "Font",
            }
        );
    }

    #[test]
    fn paste_into_percent_clamps() {
        let target = PropertyValue::percent(10);
        let pasted = target.pasted(&PropertyValue::Integer(250)).unwrap();
        assert_eq!(pasted, PropertyValue::percent(100));
        assert_eq!(pasted.type_name(), "Percent");
    }

    #[test]
    fn constrained_pastes_into_plain() {
        let target = PropertyValue::Float(0.0);
        let pasted = target.pasted(&PropertyValue::precision(0.5)).unwrap();
        assert_eq!(pasted, PropertyValue::Float(0.5));
    }

    #[test]
    fn mismatched_paste_leaves_target_unchanged() {
        let mut target = PropertyValue::StringList(vec!["a".into()]);
        let err = target.paste(&PropertyValue::Integer(3)).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                expected: "StringList",
                found: "Integer",
            }
        );
        assert_eq!(target, PropertyValue::StringList(vec!["a".into()]));
    }

    #[test]
    fn link_kinds_do_not_mix() {
        let target = PropertyValue::Link(None);
        assert!(target.pasted(&PropertyValue::LinkList(Vec::new())).is_err());
    }

    #[test]
    fn without_target_strips_all_occurrences() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let list = PropertyValue::LinkList(vec![a, b, a]);
        assert_eq!(list.without_target(a), Some(PropertyValue::LinkList(vec![b])));
        assert_eq!(PropertyValue::Link(Some(b)).without_target(a), None);
        assert_eq!(PropertyValue::Integer(1).without_target(a), None);
    }

    #[test]
    fn mem_size_grows_with_content() {
        let small = PropertyValue::StringList(Vec::new());
        let large = PropertyValue::StringList(vec!["x".repeat(64); 4]);
        assert!(large.mem_size() > small.mem_size());
    }
}
