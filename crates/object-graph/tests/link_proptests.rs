//! Property-based tests for link and back-link invariants using the `proptest` crate.

use proptest::prelude::*;

use doc_types::PropertyStatus;
use object_graph::{
    Document, LinkSub, LinkSubList, LoadOptions, ObjectId, PropertyValue, SaveOptions,
};

const OBJECTS: usize = 5;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    SetLink { holder: usize, target: Option<usize> },
    SetList { holder: usize, targets: Vec<usize> },
    SetSub { holder: usize, target: Option<usize>, subs: Vec<String> },
    SetSubList { holder: usize, entries: Vec<(usize, String)> },
    Undo,
    Redo,
}

fn arb_sub() -> impl Strategy<Value = String> {
    "(Face|Edge|Vertex)[1-9]"
}

fn arb_op() -> impl Strategy<Value = Op> {
    let idx = 0..OBJECTS;
    prop_oneof![
        (idx.clone(), proptest::option::of(idx.clone()))
            .prop_map(|(holder, target)| Op::SetLink { holder, target }),
        (idx.clone(), proptest::collection::vec(idx.clone(), 0..6))
            .prop_map(|(holder, targets)| Op::SetList { holder, targets }),
        (
            idx.clone(),
            proptest::option::of(idx.clone()),
            proptest::collection::vec(arb_sub(), 0..3)
        )
            .prop_map(|(holder, target, subs)| Op::SetSub { holder, target, subs }),
        (
            idx.clone(),
            proptest::collection::vec((idx.clone(), arb_sub()), 0..6)
        )
            .prop_map(|(holder, entries)| Op::SetSubList { holder, entries }),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

fn linked_document() -> (Document, Vec<ObjectId>) {
    let mut doc = Document::new("Links");
    let st = PropertyStatus::empty();
    let ids: Vec<ObjectId> = (0..OBJECTS)
        .map(|_| doc.add_object("Part::Feature", "Feature"))
        .collect();
    for id in &ids {
        doc.add_property(*id, "Base", PropertyValue::Link(None), st)
            .unwrap();
        doc.add_property(*id, "Tools", PropertyValue::LinkList(Vec::new()), st)
            .unwrap();
        doc.add_property(*id, "Face", LinkSub::default(), st).unwrap();
        doc.add_property(*id, "Edges", LinkSubList::default(), st)
            .unwrap();
    }
    (doc, ids)
}

fn apply(doc: &mut Document, ids: &[ObjectId], op: &Op) {
    match op {
        Op::SetLink { holder, target } => {
            doc.set_link(ids[*holder], "Base", target.map(|t| ids[t]))
                .unwrap();
        }
        Op::SetList { holder, targets } => {
            let targets = targets.iter().map(|t| ids[*t]).collect();
            doc.set_link_list(ids[*holder], "Tools", targets).unwrap();
        }
        Op::SetSub {
            holder,
            target,
            subs,
        } => {
            doc.set_link_sub(ids[*holder], "Face", target.map(|t| ids[t]), subs.clone())
                .unwrap();
        }
        Op::SetSubList { holder, entries } => {
            let objects = entries.iter().map(|(t, _)| ids[*t]).collect();
            let subs = entries.iter().map(|(_, s)| s.clone()).collect();
            doc.set_link_sub_values(ids[*holder], "Edges", objects, subs)
                .unwrap();
        }
        Op::Undo => {
            let _ = doc.undo();
        }
        Op::Redo => {
            let _ = doc.redo();
        }
    }
}

fn assert_symmetric(doc: &Document) -> Result<(), TestCaseError> {
    for (a, _) in doc.objects() {
        for b in doc.out_list(a).unwrap() {
            prop_assert!(doc.in_list(b).unwrap().contains(&a), "{:?} -> {:?} has no back-link", a, b);
        }
        for holder in doc.in_list(a).unwrap() {
            prop_assert!(
                doc.out_list(holder).unwrap().contains(&a),
                "back-link {:?} <- {:?} without forward link",
                a,
                holder
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 1. Back-link symmetry after every mutation, undo and redo
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn back_links_mirror_forward_links(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let (mut doc, ids) = linked_document();
        for op in &ops {
            apply(&mut doc, &ids, op);
            assert_symmetric(&doc)?;
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Removing an object leaves no edge pointing at it
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn removal_keeps_graph_consistent(
        ops in proptest::collection::vec(arb_op(), 1..30),
        victim in 0..OBJECTS,
    ) {
        let (mut doc, ids) = linked_document();
        for op in &ops {
            apply(&mut doc, &ids, op);
        }
        doc.remove_object(ids[victim]).unwrap();
        assert_symmetric(&doc)?;
        for (id, _) in doc.objects() {
            prop_assert!(!doc.out_list(id).unwrap().contains(&ids[victim]));
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Group then flatten reproduces the pairing
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn group_flatten_keeps_pairs(entries in proptest::collection::vec((0..OBJECTS, arb_sub()), 0..12)) {
        let (_, ids) = linked_document();
        let objects: Vec<ObjectId> = entries.iter().map(|(t, _)| ids[*t]).collect();
        let subs: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();
        let list = LinkSubList::new(objects, subs).unwrap();

        let sets = list.sub_sets();
        let flat = LinkSubList::from_sub_sets(&sets);
        prop_assert_eq!(flat.len(), list.len());
        prop_assert_eq!(flat.sub_sets(), sets.clone());

        // Per object, the names keep their relative order.
        for set in &sets {
            let original: Vec<&str> = list.iter().filter(|(o, _)| *o == set.object).map(|(_, s)| s).collect();
            let grouped: Vec<&str> = set.subs.iter().map(String::as_str).collect();
            prop_assert_eq!(original, grouped);
        }

        // Distinct objects keep their first-seen order.
        let mut first_seen = Vec::new();
        for obj in list.objects() {
            if !first_seen.contains(obj) {
                first_seen.push(*obj);
            }
        }
        let grouped_order: Vec<ObjectId> = sets.iter().map(|s| s.object).collect();
        prop_assert_eq!(first_seen, grouped_order);
    }
}

// ---------------------------------------------------------------------------
// 4. Mismatched parallel lists never change the property
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn mismatched_lengths_are_rejected(
        targets in proptest::collection::vec(0..OBJECTS, 0..6),
        subs in proptest::collection::vec(arb_sub(), 0..6),
    ) {
        prop_assume!(targets.len() != subs.len());
        let (mut doc, ids) = linked_document();
        doc.set_link_sub_values(ids[0], "Edges", vec![ids[1]], vec!["Face1".into()]).unwrap();
        let before = doc.value(ids[0], "Edges").unwrap().clone();

        let objects = targets.iter().map(|t| ids[*t]).collect();
        prop_assert!(doc.set_link_sub_values(ids[0], "Edges", objects, subs).is_err());
        prop_assert_eq!(doc.value(ids[0], "Edges").unwrap(), &before);
        prop_assert_eq!(doc.in_list(ids[1]).unwrap(), vec![ids[0]]);
    }
}

// ---------------------------------------------------------------------------
// 5. Save/load round trip of random link graphs and lists
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn link_graph_round_trip(ops in proptest::collection::vec(arb_op(), 1..25)) {
        let (mut doc, ids) = linked_document();
        for op in &ops {
            apply(&mut doc, &ids, op);
        }
        let saved = doc.save_xml(&SaveOptions::archive()).unwrap();
        let loaded = Document::load_xml(&saved.xml, &saved.files, &LoadOptions::default()).unwrap();
        let restored = &loaded.document;

        // Objects are recreated in order, so handles line up by position.
        let new_ids: Vec<ObjectId> = restored.objects().map(|(id, _)| id).collect();
        for (i, id) in ids.iter().enumerate() {
            for prop in ["Base", "Tools", "Face", "Edges"] {
                let a: Vec<usize> = doc.value(*id, prop).unwrap().link_targets().iter()
                    .map(|t| ids.iter().position(|x| x == t).unwrap()).collect();
                let b: Vec<usize> = restored.value(new_ids[i], prop).unwrap().link_targets().iter()
                    .map(|t| new_ids.iter().position(|x| x == t).unwrap()).collect();
                // Self links are dropped on load.
                let a: Vec<usize> = a.into_iter().filter(|t| *t != i).collect();
                prop_assert_eq!(a, b, "property {} of object {}", prop, i);
            }
        }
        assert_symmetric(restored)?;
    }
}

proptest! {
    #[test]
    fn float_lists_round_trip(values in proptest::collection::vec(-1e12f64..1e12, 0..20), inline in any::<bool>()) {
        let mut doc = Document::new("Floats");
        let id = doc.add_object("Part::Spline", "Spline");
        doc.add_property(id, "Knots", values.clone(), PropertyStatus::empty()).unwrap();
        let options = if inline { SaveOptions::clipboard() } else { SaveOptions::archive() };
        let saved = doc.save_xml(&options).unwrap();
        let loaded = Document::load_xml(&saved.xml, &saved.files, &LoadOptions::default()).unwrap();
        let id = loaded.document.object_by_name("Spline").unwrap();
        prop_assert_eq!(loaded.document.value(id, "Knots").unwrap(), &PropertyValue::FloatList(values));
    }
}
