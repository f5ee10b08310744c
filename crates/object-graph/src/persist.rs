//! Per-kind save and restore of property values.
//!
//! Each kind writes one self-describing element (see the table in the
//! crate docs). Float, colour and material lists write a stub naming an
//! auxiliary binary file unless the writer forces inline XML.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use doc_types::{Color, Enumeration, Material, Uuid};
use persistence::{
    check_text, BinaryReader, BinaryWriter, DiagnosticKind, PersistenceError, Writer, XmlReader,
};

use crate::document::Document;
use crate::links::{LinkSub, LinkSubList};
use crate::object::ObjectId;
use crate::value::PropertyValue;

/// Identifies the property an auxiliary file belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub object: ObjectId,
    pub property: String,
}

/// Name resolution used while restoring links.
pub(crate) struct RestoreContext<'a> {
    pub owner: ObjectId,
    pub owner_name: &'a str,
    pub property: &'a str,
    pub resolve: &'a dyn Fn(&str) -> Option<ObjectId>,
}

impl RestoreContext<'_> {
    /// Resolve a saved object name.
    ///
    /// Unknown names and links to the owner itself are diagnosed and
    /// resolve to `None`.
    fn link(&self, reader: &mut XmlReader<PropertyRef>, name: &str) -> Option<ObjectId> {
        if name.is_empty() {
            return None;
        }
        match (self.resolve)(name) {
            None => {
                reader.diagnose(
                    DiagnosticKind::DanglingLink,
                    name,
                    format!(
                        "lost link to '{}' while loading {}.{}",
                        name, self.owner_name, self.property
                    ),
                );
                None
            }
            Some(id) if id == self.owner => {
                reader.diagnose(
                    DiagnosticKind::SelfLink,
                    name,
                    format!(
                        "object '{}' links to itself through '{}', link dropped",
                        self.owner_name, self.property
                    ),
                );
                None
            }
            Some(id) => Some(id),
        }
    }

    fn file_owner(&self) -> PropertyRef {
        PropertyRef {
            object: self.owner,
            property: self.property.to_string(),
        }
    }
}

fn object_name(doc: &Document, id: ObjectId) -> &str {
    doc.object(id).map(|o| o.name()).unwrap_or("")
}

fn packed(color: Color) -> String {
    color.packed().to_string()
}

fn material_attributes(m: &Material) -> [(&'static str, String); 6] {
    [
        ("ambientColor", packed(m.ambient_color)),
        ("diffuseColor", packed(m.diffuse_color)),
        ("specularColor", packed(m.specular_color)),
        ("emissiveColor", packed(m.emissive_color)),
        ("shininess", m.shininess.to_string()),
        ("transparency", m.transparency.to_string()),
    ]
}

fn write_material(writer: &mut Writer<PropertyRef>, element: &str, m: &Material) {
    let attrs = material_attributes(m);
    let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
    writer.empty_element(element, &attrs);
}

/// Write the element(s) of one value.
pub(crate) fn save_value(
    value: &PropertyValue,
    owner: &PropertyRef,
    doc: &Document,
    writer: &mut Writer<PropertyRef>,
) -> Result<(), PersistenceError> {
    check_value_text(value)?;
    match value {
        PropertyValue::Integer(v) | PropertyValue::IntegerConstraint { value: v, .. } => {
            writer.empty_element("Integer", &[("value", v.to_string().as_str())]);
        }
        PropertyValue::Float(v) | PropertyValue::FloatConstraint { value: v, .. } => {
            writer.empty_element("Float", &[("value", v.to_string().as_str())]);
        }
        PropertyValue::Bool(v) => {
            writer.empty_element("Bool", &[("value", if *v { "true" } else { "false" })]);
        }
        PropertyValue::String(s) | PropertyValue::Font(s) => {
            writer.empty_element("String", &[("value", s.as_str())]);
        }
        PropertyValue::Path(p) => {
            writer.empty_element("Path", &[("value", p.to_string_lossy().as_ref())]);
        }
        PropertyValue::Uuid(u) => writer.empty_element("Uuid", &[("value", u.to_string().as_str())]),
        PropertyValue::Color(c) => writer.empty_element("PropertyColor", &[("value", packed(*c).as_str())]),
        PropertyValue::Material(m) => write_material(writer, "PropertyMaterial", m),
        PropertyValue::Enumeration(e) => {
            let index = e.index().to_string();
            writer.empty_element("Integer", &[("value", index.as_str()), ("CustomEnum", "true")]);
            write_list(writer, "CustomEnumList", e.items(), |w, item| {
                w.empty_element("Enum", &[("value", item.as_str())]);
            });
        }
        PropertyValue::IntegerList(v) => write_list(writer, "IntegerList", v, |w, i| {
            w.empty_element("I", &[("v", i.to_string().as_str())]);
        }),
        PropertyValue::IntegerSet(s) => {
            let items: Vec<i64> = s.iter().copied().collect();
            write_list(writer, "IntegerSet", &items, |w, i| {
                w.empty_element("I", &[("v", i.to_string().as_str())]);
            });
        }
        PropertyValue::FloatList(v) => {
            if writer.is_force_xml() {
                write_list(writer, "FloatList", v, |w, f| {
                    w.empty_element("F", &[("v", f.to_string().as_str())]);
                });
            } else {
                write_file_stub(writer, "FloatList", owner, doc);
            }
        }
        PropertyValue::BoolList(v) => {
            let bits: String = v.iter().rev().map(|b| if *b { '1' } else { '0' }).collect();
            writer.empty_element("BoolList", &[("value", bits.as_str())]);
        }
        PropertyValue::StringList(v) => write_list(writer, "StringList", v, |w, s| {
            w.empty_element("String", &[("value", s.as_str())]);
        }),
        PropertyValue::Map(m) => {
            let items: Vec<(&String, &String)> = m.iter().collect();
            write_list(writer, "Map", &items, |w, (k, v)| {
                w.empty_element("Item", &[("key", k.as_str()), ("value", v.as_str())]);
            });
        }
        PropertyValue::ColorList(v) => {
            if writer.is_force_xml() {
                write_list(writer, "ColorList", v, |w, c| {
                    w.empty_element("C", &[("v", packed(*c).as_str())]);
                });
            } else {
                write_file_stub(writer, "ColorList", owner, doc);
            }
        }
        PropertyValue::MaterialList(v) => {
            if writer.is_force_xml() {
                write_list(writer, "MaterialList", v, |w, m| write_material(w, "M", m));
            } else {
                write_file_stub(writer, "MaterialList", owner, doc);
            }
        }
        PropertyValue::Link(target) => {
            let name = target.map(|t| object_name(doc, t)).unwrap_or("");
            writer.empty_element("Link", &[("value", name)]);
        }
        PropertyValue::LinkList(targets) => write_list(writer, "LinkList", targets, |w, t| {
            w.empty_element("Link", &[("value", object_name(doc, *t))]);
        }),
        PropertyValue::LinkSub(sub) => {
            let name = sub.object().map(|t| object_name(doc, t)).unwrap_or("");
            let count = sub.sub_values().len().to_string();
            let attrs = [("value", name), ("count", count.as_str())];
            if sub.sub_values().is_empty() {
                writer.empty_element("LinkSub", &attrs);
            } else {
                writer.start_element("LinkSub", &attrs);
                for s in sub.sub_values() {
                    writer.empty_element("Sub", &[("value", s.as_str())]);
                }
                writer.end_element("LinkSub");
            }
        }
        PropertyValue::LinkSubList(list) => {
            let entries: Vec<(ObjectId, &str)> = list.iter().collect();
            write_list(writer, "LinkSubList", &entries, |w, (obj, sub)| {
                w.empty_element("Link", &[("obj", object_name(doc, *obj)), ("sub", *sub)]);
            });
        }
    }
    Ok(())
}

/// Every piece of free text in `value` must survive a trip through XML.
fn check_value_text(value: &PropertyValue) -> Result<(), PersistenceError> {
    match value {
        PropertyValue::String(s) | PropertyValue::Font(s) => check_text(s),
        PropertyValue::Path(p) => check_text(&p.to_string_lossy()),
        PropertyValue::StringList(items) => items.iter().try_for_each(|s| check_text(s)),
        PropertyValue::Map(m) => m.iter().try_for_each(|(k, v)| {
            check_text(k)?;
            check_text(v)
        }),
        PropertyValue::Enumeration(e) => e.items().iter().try_for_each(|s| check_text(s)),
        PropertyValue::LinkSub(l) => l.sub_values().iter().try_for_each(|s| check_text(s)),
        PropertyValue::LinkSubList(l) => l.subs().iter().try_for_each(|s| check_text(s)),
        _ => Ok(()),
    }
}

/// `<name count="n">` with one child per item, or an empty element.
fn write_list<I>(
    writer: &mut Writer<PropertyRef>,
    element: &str,
    items: &[I],
    mut write_item: impl FnMut(&mut Writer<PropertyRef>, &I),
) {
    let count = items.len().to_string();
    if items.is_empty() {
        writer.empty_element(element, &[("count", count.as_str())]);
        return;
    }
    writer.start_element(element, &[("count", count.as_str())]);
    for item in items {
        write_item(writer, item);
    }
    writer.end_element(element);
}

fn write_file_stub(
    writer: &mut Writer<PropertyRef>,
    element: &str,
    owner: &PropertyRef,
    doc: &Document,
) {
    let base = format!("{}.{}", object_name(doc, owner.object), owner.property);
    let file = writer.add_file(&base, owner.clone());
    writer.empty_element(element, &[("file", file.as_str())]);
}

/// Read the element(s) written by [`save_value`] for a value of the same
/// kind as `template`.
///
/// Kind-specific settings of the template (constraints, enumeration items
/// when none are stored) are kept. File-backed lists register their file
/// with the reader and return the template until the file is read.
pub(crate) fn restore_value(
    template: &PropertyValue,
    reader: &mut XmlReader<PropertyRef>,
    ctx: &RestoreContext<'_>,
) -> Result<PropertyValue, PersistenceError> {
    let value = match template {
        PropertyValue::Integer(_) => {
            reader.read_element("Integer")?;
            PropertyValue::Integer(reader.get_attribute_as_integer("value")?)
        }
        PropertyValue::IntegerConstraint { constraints, .. } => {
            reader.read_element("Integer")?;
            PropertyValue::constrained_integer(reader.get_attribute_as_integer("value")?, *constraints)
        }
        PropertyValue::Float(_) => {
            reader.read_element("Float")?;
            PropertyValue::Float(reader.get_attribute_as_float("value")?)
        }
        PropertyValue::FloatConstraint { constraints, .. } => {
            reader.read_element("Float")?;
            PropertyValue::constrained_float(reader.get_attribute_as_float("value")?, *constraints)
        }
        PropertyValue::Bool(_) => {
            reader.read_element("Bool")?;
            PropertyValue::Bool(parse_bool(reader.get_attribute("value")?)?)
        }
        PropertyValue::String(_) => {
            reader.read_element("String")?;
            PropertyValue::String(reader.get_attribute("value")?.to_string())
        }
        PropertyValue::Font(_) => {
            reader.read_element("String")?;
            PropertyValue::Font(reader.get_attribute("value")?.to_string())
        }
        PropertyValue::Path(_) => {
            reader.read_element("Path")?;
            PropertyValue::Path(PathBuf::from(reader.get_attribute("value")?))
        }
        PropertyValue::Uuid(_) => {
            reader.read_element("Uuid")?;
            let raw = reader.get_attribute("value")?;
            let uuid = Uuid::parse_str(raw).map_err(|_| invalid("value", raw, "a UUID"))?;
            PropertyValue::Uuid(uuid)
        }
        PropertyValue::Color(_) => {
            reader.read_element("PropertyColor")?;
            PropertyValue::Color(read_color(reader, "value")?)
        }
        PropertyValue::Material(_) => {
            reader.read_element("PropertyMaterial")?;
            PropertyValue::Material(read_material(reader)?)
        }
        PropertyValue::Enumeration(current) => {
            PropertyValue::Enumeration(restore_enumeration(current, reader)?)
        }
        PropertyValue::IntegerList(_) => {
            PropertyValue::IntegerList(read_list(reader, "IntegerList", "I", |r| {
                r.get_attribute_as_integer("v")
            })?)
        }
        PropertyValue::IntegerSet(_) => {
            let items = read_list(reader, "IntegerSet", "I", |r| r.get_attribute_as_integer("v"))?;
            PropertyValue::IntegerSet(items.into_iter().collect::<BTreeSet<_>>())
        }
        PropertyValue::FloatList(_) => {
            match read_file_or_list(reader, ctx, "FloatList", "F", |r| r.get_attribute_as_float("v"))? {
                Some(items) => PropertyValue::FloatList(items),
                None => template.clone(),
            }
        }
        PropertyValue::BoolList(_) => {
            reader.read_element("BoolList")?;
            PropertyValue::BoolList(parse_bits(reader.get_attribute("value")?)?)
        }
        PropertyValue::StringList(_) => {
            PropertyValue::StringList(read_list(reader, "StringList", "String", |r| {
                Ok(r.get_attribute("value")?.to_string())
            })?)
        }
        PropertyValue::Map(_) => {
            let items = read_list(reader, "Map", "Item", |r| {
                Ok((
                    r.get_attribute("key")?.to_string(),
                    r.get_attribute("value")?.to_string(),
                ))
            })?;
            PropertyValue::Map(items.into_iter().collect::<BTreeMap<_, _>>())
        }
        PropertyValue::ColorList(_) => {
            match read_file_or_list(reader, ctx, "ColorList", "C", |r| read_color(r, "v"))? {
                Some(items) => PropertyValue::ColorList(items),
                None => template.clone(),
            }
        }
        PropertyValue::MaterialList(_) => {
            match read_file_or_list(reader, ctx, "MaterialList", "M", read_material)? {
                Some(items) => PropertyValue::MaterialList(items),
                None => template.clone(),
            }
        }
        PropertyValue::Link(_) => {
            reader.read_element("Link")?;
            let name = reader.get_attribute("value")?.to_string();
            PropertyValue::Link(ctx.link(reader, &name))
        }
        PropertyValue::LinkList(_) => {
            let names = read_list(reader, "LinkList", "Link", |r| {
                Ok(r.get_attribute("value")?.to_string())
            })?;
            let targets = names
                .iter()
                .filter_map(|name| ctx.link(reader, name))
                .collect();
            PropertyValue::LinkList(targets)
        }
        PropertyValue::LinkSub(_) => {
            reader.read_element("LinkSub")?;
            let name = reader.get_attribute("value")?.to_string();
            let count = reader.get_attribute_as_count("count")?;
            let mut subs = Vec::with_capacity(count);
            for _ in 0..count {
                reader.read_element("Sub")?;
                subs.push(reader.get_attribute("value")?.to_string());
            }
            reader.read_end_element("LinkSub")?;
            PropertyValue::LinkSub(LinkSub::new(ctx.link(reader, &name), subs))
        }
        PropertyValue::LinkSubList(_) => {
            let entries = read_list(reader, "LinkSubList", "Link", |r| {
                Ok((
                    r.get_attribute("obj")?.to_string(),
                    r.get_attribute("sub")?.to_string(),
                ))
            })?;
            let mut list = LinkSubList::default();
            for (name, sub) in entries {
                if let Some(obj) = ctx.link(reader, &name) {
                    list.push(obj, sub);
                }
            }
            PropertyValue::LinkSubList(list)
        }
    };
    Ok(value)
}

fn restore_enumeration(
    current: &Enumeration,
    reader: &mut XmlReader<PropertyRef>,
) -> Result<Enumeration, PersistenceError> {
    reader.read_element("Integer")?;
    let index = reader.get_attribute_as_integer("value")?;
    let mut restored = current.clone();
    if reader.has_attribute("CustomEnum") {
        let items = read_list(reader, "CustomEnumList", "Enum", |r| {
            Ok(r.get_attribute("value")?.to_string())
        })?;
        restored.set_items(items);
    }
    if restored.set_index(index).is_err() {
        // Stale index for the current item list: keep the list, select nothing.
        let _ = restored.set_index(-1);
    }
    Ok(restored)
}

/// Read `<list count="n">` and `n` children named `item`.
fn read_list<I>(
    reader: &mut XmlReader<PropertyRef>,
    list: &str,
    item: &str,
    mut read_item: impl FnMut(&XmlReader<PropertyRef>) -> Result<I, PersistenceError>,
) -> Result<Vec<I>, PersistenceError> {
    reader.read_element(list)?;
    let count = reader.get_attribute_as_count("count")?;
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        reader.read_element(item)?;
        items.push(read_item(reader)?);
    }
    reader.read_end_element(list)?;
    Ok(items)
}

/// Either the inline children of `list`, or `None` after registering the
/// auxiliary file the element names.
fn read_file_or_list<I>(
    reader: &mut XmlReader<PropertyRef>,
    ctx: &RestoreContext<'_>,
    list: &str,
    item: &str,
    mut read_item: impl FnMut(&XmlReader<PropertyRef>) -> Result<I, PersistenceError>,
) -> Result<Option<Vec<I>>, PersistenceError> {
    reader.read_element(list)?;
    if reader.has_attribute("file") {
        let file = reader.get_attribute("file")?.to_string();
        reader.read_end_element(list)?;
        if !file.is_empty() {
            reader.add_file(&file, ctx.file_owner());
        }
        return Ok(None);
    }
    let count = reader.get_attribute_as_count("count")?;
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        reader.read_element(item)?;
        items.push(read_item(reader)?);
    }
    reader.read_end_element(list)?;
    Ok(Some(items))
}

fn read_color(reader: &XmlReader<PropertyRef>, attribute: &str) -> Result<Color, PersistenceError> {
    let raw = reader.get_attribute_as_unsigned(attribute)?;
    let packed = u32::try_from(raw)
        .map_err(|_| invalid(attribute, &raw.to_string(), "a packed RGBA colour"))?;
    Ok(Color::from_packed(packed))
}

fn read_material(reader: &XmlReader<PropertyRef>) -> Result<Material, PersistenceError> {
    Ok(Material {
        ambient_color: read_color(reader, "ambientColor")?,
        diffuse_color: read_color(reader, "diffuseColor")?,
        specular_color: read_color(reader, "specularColor")?,
        emissive_color: read_color(reader, "emissiveColor")?,
        shininess: reader.get_attribute_as_float("shininess")? as f32,
        transparency: reader.get_attribute_as_float("transparency")? as f32,
    })
}

fn parse_bool(raw: &str) -> Result<bool, PersistenceError> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid("value", raw, "true or false")),
    }
}

/// Bits are stored highest index first.
fn parse_bits(raw: &str) -> Result<Vec<bool>, PersistenceError> {
    raw.chars()
        .rev()
        .map(|c| match c {
            '1' => Ok(true),
            '0' => Ok(false),
            _ => Err(invalid("value", raw, "a string of 0 and 1")),
        })
        .collect()
}

fn invalid(attribute: &str, value: &str, expected: &'static str) -> PersistenceError {
    PersistenceError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
        expected,
    }
}

// ── Auxiliary files ───────────────────────────────────────────────────────

/// Encode the bulk payload of a file-backed list.
///
/// Float lists use `f64` from file version 1 on and `f32` before.
pub(crate) fn save_doc_file(value: &PropertyValue, file_version: u32) -> Result<Vec<u8>, PersistenceError> {
    let mut out = BinaryWriter::new();
    match value {
        PropertyValue::FloatList(v) => {
            out.write_count(v.len())?;
            for f in v {
                if file_version >= 1 {
                    out.write_f64(*f);
                } else {
                    out.write_f32(*f as f32);
                }
            }
        }
        PropertyValue::ColorList(v) => {
            out.write_count(v.len())?;
            for c in v {
                out.write_u32(c.packed());
            }
        }
        PropertyValue::MaterialList(v) => {
            out.write_count(v.len())?;
            for m in v {
                out.write_u32(m.ambient_color.packed());
                out.write_u32(m.diffuse_color.packed());
                out.write_u32(m.specular_color.packed());
                out.write_u32(m.emissive_color.packed());
                out.write_f32(m.shininess);
                out.write_f32(m.transparency);
            }
        }
        other => {
            return Err(PersistenceError::InvalidAttribute {
                attribute: "file".to_string(),
                value: other.type_name().to_string(),
                expected: "a float, colour or material list",
            })
        }
    }
    Ok(out.into_bytes())
}

/// Decode a payload written by [`save_doc_file`] into a value of the
/// template's kind.
pub(crate) fn restore_doc_file(
    template: &PropertyValue,
    data: &[u8],
    file_version: u32,
) -> Result<PropertyValue, PersistenceError> {
    let mut input = BinaryReader::new(data);
    let value = match template {
        PropertyValue::FloatList(_) => {
            let size = if file_version >= 1 { 8 } else { 4 };
            let count = input.read_count(size)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(if file_version >= 1 {
                    input.read_f64()?
                } else {
                    f64::from(input.read_f32()?)
                });
            }
            PropertyValue::FloatList(values)
        }
        PropertyValue::ColorList(_) => {
            let count = input.read_count(4)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(Color::from_packed(input.read_u32()?));
            }
            PropertyValue::ColorList(values)
        }
        PropertyValue::MaterialList(_) => {
            let count = input.read_count(24)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(Material {
                    ambient_color: Color::from_packed(input.read_u32()?),
                    diffuse_color: Color::from_packed(input.read_u32()?),
                    specular_color: Color::from_packed(input.read_u32()?),
                    emissive_color: Color::from_packed(input.read_u32()?),
                    shininess: input.read_f32()?,
                    transparency: input.read_f32()?,
                });
            }
            PropertyValue::MaterialList(values)
        }
        other => {
            return Err(PersistenceError::InvalidAttribute {
                attribute: "file".to_string(),
                value: other.type_name().to_string(),
                expected: "a float, colour or material list",
            })
        }
    };
    Ok(value)
}
