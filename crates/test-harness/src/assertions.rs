//! Assertion helpers with diagnostic output.
//!
//! Every failure names the context it was called with, the expected and the
//! actual state, using object names rather than handles.

use object_graph::doc_types::PropertyStatus;
use object_graph::{DiagnosticKind, Document, LoadDiagnostic, ObjectId, Property, PropertyValue};

use crate::helpers::HarnessError;

fn name_of(doc: &Document, id: ObjectId) -> String {
    doc.object(id)
        .map(|o| o.name().to_string())
        .unwrap_or_else(|| format!("{id:?}"))
}

fn sorted_names(doc: &Document, ids: impl IntoIterator<Item = ObjectId>) -> Vec<String> {
    let mut names: Vec<String> = ids.into_iter().map(|id| name_of(doc, id)).collect();
    names.sort();
    names
}

fn persistent<'a>(props: impl Iterator<Item = &'a Property>) -> impl Iterator<Item = &'a Property> {
    props.filter(|p| !p.status().contains(PropertyStatus::TRANSIENT))
}

fn sub_names(value: &PropertyValue) -> Vec<String> {
    match value {
        PropertyValue::LinkSub(link) => link.sub_values().to_vec(),
        PropertyValue::LinkSubList(list) => list.subs().to_vec(),
        _ => Vec::new(),
    }
}

fn failed(ctx: &str, detail: String) -> HarnessError {
    HarnessError::AssertionFailed {
        detail: format!("[{ctx}] {detail}"),
    }
}

/// Assert that every outgoing link has a matching back-link and every
/// back-link is explained by an outgoing link.
pub fn assert_back_link_symmetry(doc: &Document, ctx: &str) -> Result<(), HarnessError> {
    for (id, obj) in doc.objects() {
        for target in obj.out_list() {
            let Some(target_obj) = doc.object(target) else {
                return Err(failed(
                    ctx,
                    format!("'{}' links to a removed object", obj.name()),
                ));
            };
            if !target_obj.in_list().any(|holder| holder == id) {
                return Err(failed(
                    ctx,
                    format!(
                        "'{}' links to '{}' but is missing from its back-links",
                        obj.name(),
                        target_obj.name()
                    ),
                ));
            }
        }
        for holder in obj.in_list() {
            let Some(holder_obj) = doc.object(holder) else {
                return Err(failed(
                    ctx,
                    format!("'{}' has a back-link from a removed object", obj.name()),
                ));
            };
            if !holder_obj.out_list().contains(&id) {
                return Err(failed(
                    ctx,
                    format!(
                        "'{}' lists '{}' as a back-link but '{}' does not link to it",
                        obj.name(),
                        holder_obj.name(),
                        holder_obj.name()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Assert the set of objects `holder` links to, by name.
pub fn assert_links_to(
    doc: &Document,
    holder: ObjectId,
    expected: &[&str],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = sorted_names(doc, doc.out_list(holder)?);
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    if actual == expected {
        Ok(())
    } else {
        Err(failed(
            ctx,
            format!(
                "'{}' links to {:?}, expected {:?}",
                name_of(doc, holder),
                actual,
                expected
            ),
        ))
    }
}

/// Assert the set of objects linking to `target`, by name.
pub fn assert_linked_from(
    doc: &Document,
    target: ObjectId,
    expected: &[&str],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = sorted_names(doc, doc.in_list(target)?);
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    if actual == expected {
        Ok(())
    } else {
        Err(failed(
            ctx,
            format!(
                "'{}' is linked from {:?}, expected {:?}",
                name_of(doc, target),
                actual,
                expected
            ),
        ))
    }
}

/// Assert the grouped view of a link-with-subnames list.
///
/// `expected` pairs object names with their sub-element names, in
/// first-appearance order.
pub fn assert_sub_sets(
    doc: &Document,
    holder: ObjectId,
    property: &str,
    expected: &[(&str, &[&str])],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual: Vec<(String, Vec<String>)> = doc
        .sub_list_values(holder, property)?
        .into_iter()
        .map(|set| (name_of(doc, set.object), set.subs))
        .collect();
    let expected: Vec<(String, Vec<String>)> = expected
        .iter()
        .map(|(name, subs)| (name.to_string(), subs.iter().map(|s| s.to_string()).collect()))
        .collect();
    if actual == expected {
        Ok(())
    } else {
        Err(failed(
            ctx,
            format!("{property}: got {actual:?}, expected {expected:?}"),
        ))
    }
}

/// Assert that a diagnostic of `kind` about `subject` was recorded.
pub fn assert_diagnostic(
    diagnostics: &[LoadDiagnostic],
    kind: DiagnosticKind,
    subject: &str,
    ctx: &str,
) -> Result<(), HarnessError> {
    if diagnostics
        .iter()
        .any(|d| d.kind == kind && d.subject == subject)
    {
        Ok(())
    } else {
        let seen: Vec<String> = diagnostics
            .iter()
            .map(|d| format!("{:?}({})", d.kind, d.subject))
            .collect();
        Err(failed(
            ctx,
            format!("no {kind:?} diagnostic for '{subject}', got {seen:?}"),
        ))
    }
}

pub fn assert_no_diagnostics(diagnostics: &[LoadDiagnostic], ctx: &str) -> Result<(), HarnessError> {
    if diagnostics.is_empty() {
        Ok(())
    } else {
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        Err(failed(ctx, format!("unexpected diagnostics: {messages:?}")))
    }
}

/// Assert that two documents hold the same objects, properties and links.
///
/// Objects are matched by name, so handles may differ. Transient
/// properties are ignored since they are never saved.
pub fn assert_same_graph(a: &Document, b: &Document, ctx: &str) -> Result<(), HarnessError> {
    let names_a: Vec<&str> = a.objects().map(|(_, o)| o.name()).collect();
    let names_b: Vec<&str> = b.objects().map(|(_, o)| o.name()).collect();
    if names_a != names_b {
        return Err(failed(
            ctx,
            format!("objects differ: {names_a:?} vs {names_b:?}"),
        ));
    }

    for (id_a, obj_a) in a.objects() {
        let id_b = b
            .object_by_name(obj_a.name())
            .ok_or_else(|| HarnessError::ObjectNotFound {
                name: obj_a.name().to_string(),
            })?;
        let obj_b = b.object(id_b).ok_or_else(|| HarnessError::ObjectNotFound {
            name: obj_a.name().to_string(),
        })?;
        if obj_a.type_name() != obj_b.type_name() {
            return Err(failed(
                ctx,
                format!(
                    "'{}' has type {} vs {}",
                    obj_a.name(),
                    obj_a.type_name(),
                    obj_b.type_name()
                ),
            ));
        }

        let props_a: Vec<(&str, &str)> = persistent(obj_a.properties()).map(|p| (p.name(), p.type_name())).collect();
        let props_b: Vec<(&str, &str)> = persistent(obj_b.properties()).map(|p| (p.name(), p.type_name())).collect();
        if props_a != props_b {
            return Err(failed(
                ctx,
                format!("'{}' properties differ: {props_a:?} vs {props_b:?}", obj_a.name()),
            ));
        }

        for prop_a in persistent(obj_a.properties()) {
            let value_a = prop_a.value();
            let value_b = b.value(id_b, prop_a.name())?;
            let same = if value_a.is_link() {
                let targets_a: Vec<String> = value_a.link_targets().into_iter().map(|t| name_of(a, t)).collect();
                let targets_b: Vec<String> = value_b.link_targets().into_iter().map(|t| name_of(b, t)).collect();
                targets_a == targets_b && sub_names(value_a) == sub_names(value_b)
            } else {
                value_a == value_b
            };
            if !same {
                return Err(failed(
                    ctx,
                    format!("{}.{} differs: {value_a:?} vs {value_b:?}", obj_a.name(), prop_a.name()),
                ));
            }
        }

        let links_a = sorted_names(a, a.out_list(id_a)?);
        let links_b = sorted_names(b, b.out_list(id_b)?);
        if links_a != links_b {
            return Err(failed(
                ctx,
                format!("'{}' links differ: {links_a:?} vs {links_b:?}", obj_a.name()),
            ));
        }
    }
    Ok(())
}
