//! End-to-end link scenarios driven through the DocumentBuilder.

use object_graph::{DiagnosticKind, Document, LoadOptions, PropertyValue, SaveOptions};
use test_harness::assertions::{assert_diagnostic, assert_no_diagnostics, assert_same_graph, assert_sub_sets};
use test_harness::helpers::subs;
use test_harness::DocumentBuilder;

fn cut_model() -> DocumentBuilder {
    let mut b = DocumentBuilder::new("Model").with_auto_check();
    b.object("Part::Box", "Box").unwrap();
    b.object("Part::Cylinder", "Cylinder").unwrap();
    b.object("Part::Cut", "Cut").unwrap();
    b.property("Box", "Length", 10.0).unwrap();
    b.property("Cylinder", "Radius", 2.0).unwrap();
    b.link("Cut", "Base", Some("Box")).unwrap();
    b.link("Cut", "Tool", Some("Cylinder")).unwrap();
    b
}

// ── Single link ────────────────────────────────────────────────────────────

#[test]
fn single_link_is_saved_by_name_and_lost_without_its_target() {
    let b = cut_model();
    let cut = b.id("Cut").unwrap();
    let saved = b.document.save_xml(&SaveOptions::archive()).unwrap();
    assert!(saved.xml.contains(r#"<Link value="Box"/>"#), "{}", saved.xml);

    let fragment = b.document.export_objects(&[cut]).unwrap();
    let mut empty = Document::new("Empty");
    let imported = empty.import_objects(&fragment, &LoadOptions::default()).unwrap();
    let pasted = imported.objects[0];
    assert_eq!(empty.value(pasted, "Base").unwrap(), &PropertyValue::Link(None));
    assert_diagnostic(&imported.diagnostics, DiagnosticKind::DanglingLink, "Box", "paste").unwrap();
}

#[test]
fn retargeting_a_link_moves_the_back_link() {
    let mut b = cut_model();
    b.link("Cut", "Base", Some("Cylinder")).unwrap();
    b.assert_linked_from("Box", &[]).unwrap();
    b.assert_linked_from("Cylinder", &["Cut"]).unwrap();

    // Tool still points at the cylinder, so clearing Base keeps the back-link.
    b.link("Cut", "Base", None).unwrap();
    b.assert_linked_from("Cylinder", &["Cut"]).unwrap();
    b.link("Cut", "Tool", None).unwrap();
    b.assert_linked_from("Cylinder", &[]).unwrap();
}

// ── Link with sub-element names ────────────────────────────────────────────

#[test]
fn sub_list_groups_entries_by_object() {
    let mut b = DocumentBuilder::new("Subs").with_auto_check();
    b.object("Part", "A").unwrap();
    b.object("Part", "B").unwrap();
    b.object("Part::Fillet", "Fillet").unwrap();
    b.link_sub_list("Fillet", "Edges", &[("A", "Face1"), ("A", "Face2"), ("B", "Edge3")])
        .unwrap();

    let fillet = b.id("Fillet").unwrap();
    let expected: [(&str, &[&str]); 2] = [("A", &["Face1", "Face2"]), ("B", &["Edge3"])];
    assert_sub_sets(&b.document, fillet, "Edges", &expected, "grouped").unwrap();
    b.assert_links_to("Fillet", &["A", "B"]).unwrap();
}

#[test]
fn mismatched_sub_list_lengths_change_nothing() {
    let mut b = DocumentBuilder::new("Subs").with_auto_check();
    let a = b.object("Part", "A").unwrap();
    let fillet = b.object("Part::Fillet", "Fillet").unwrap();
    b.link_sub_list("Fillet", "Edges", &[("A", "Edge1")]).unwrap();

    let result = b
        .document
        .set_link_sub_values(fillet, "Edges", vec![a, a], subs(&["Edge1"]));
    assert!(result.is_err());
    let expected: [(&str, &[&str]); 1] = [("A", &["Edge1"])];
    assert_sub_sets(&b.document, fillet, "Edges", &expected, "unchanged").unwrap();
    b.assert_back_link_symmetry().unwrap();
}

// ── Removal, undo ──────────────────────────────────────────────────────────

#[test]
fn removing_a_target_nulls_links_to_it() {
    let mut b = cut_model();
    b.remove("Box").unwrap();
    assert_eq!(b.value("Cut", "Base").unwrap(), &PropertyValue::Link(None));
    b.assert_links_to("Cut", &["Cylinder"]).unwrap();
    assert_eq!(b.object_count(), 2);
}

#[test]
fn undo_and_redo_restore_back_links() {
    let mut b = cut_model();
    b.link("Cut", "Base", Some("Cylinder")).unwrap();
    b.undo().unwrap();
    b.assert_linked_from("Box", &["Cut"]).unwrap();
    b.redo().unwrap();
    b.assert_linked_from("Box", &[]).unwrap();
    b.assert_linked_from("Cylinder", &["Cut"]).unwrap();
}

// ── Save / load ────────────────────────────────────────────────────────────

#[test]
fn inline_round_trip_keeps_the_graph() {
    let mut b = cut_model();
    b.property("Box", "Knots", vec![0.0, 0.5, 1.0]).unwrap();
    b.link_sub_list("Cut", "Faces", &[("Box", "Face1"), ("Cylinder", "Face2")])
        .unwrap();

    let loaded = b.round_trip(&SaveOptions::clipboard()).unwrap();
    assert_no_diagnostics(&loaded.diagnostics, "inline").unwrap();
    assert_same_graph(&b.document, &loaded.document, "inline").unwrap();

    let reloaded = DocumentBuilder::from_document(loaded.document);
    reloaded.assert_back_link_symmetry().unwrap();
    reloaded.assert_linked_from("Box", &["Cut"]).unwrap();
}

#[test]
fn report_describes_a_loaded_document() {
    let b = cut_model();
    let loaded = b.round_trip(&SaveOptions::archive()).unwrap();
    let report = DocumentBuilder::from_document(loaded.document)
        .report()
        .with_diagnostics(&loaded.diagnostics);
    let text = report.to_text();
    assert!(text.contains("Objects (3 objects, 0 touched)"), "{text}");
    assert!(text.contains("Links to: Box, Cylinder"), "{text}");
    assert!(text.contains("Diagnostics: none"), "{text}");
}
