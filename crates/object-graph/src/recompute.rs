use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, instrument, warn};

use crate::document::Document;
use crate::errors::DocumentError;
use crate::object::ObjectId;

/// Outcome of [`Document::recompute`].
#[derive(Debug, Default)]
pub struct RecomputeReport {
    /// Objects recomputed successfully, in execution order.
    pub recomputed: Vec<ObjectId>,
    /// Objects that failed or were skipped, with error messages.
    pub errors: Vec<(ObjectId, String)>,
}

impl RecomputeReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Document {
    /// All objects ordered so that every object comes after the objects it
    /// links to. Ties keep creation order.
    pub fn topological_order(&self) -> Result<Vec<ObjectId>, DocumentError> {
        let mut pending: HashMap<ObjectId, usize> = self
            .objects()
            .map(|(id, obj)| (id, obj.out_list().len()))
            .collect();
        let mut ready: VecDeque<ObjectId> = self
            .objects()
            .map(|(id, _)| id)
            .filter(|id| pending.get(id) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(id) = ready.pop_front() {
            order.push(id);
            for dependent in self.in_list(id)? {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        if order.len() < self.len() {
            let placed: HashSet<ObjectId> = order.into_iter().collect();
            return Err(DependencyCycleFinder::new(self, placed).error());
        }
        Ok(order)
    }

    /// Recompute touched objects and everything depending on them.
    ///
    /// `execute` runs once per object, dependencies first. An object whose
    /// execution fails stays touched, and its dependents are skipped.
    #[instrument(skip_all, fields(document = %self.name()))]
    pub fn recompute<F>(&mut self, mut execute: F) -> Result<RecomputeReport, DocumentError>
    where
        F: FnMut(&mut Document, ObjectId) -> Result<(), String>,
    {
        let order = self.topological_order()?;

        let mut dirty: HashSet<ObjectId> = self.touched_objects().into_iter().collect();
        for id in &order {
            if !dirty.contains(id) && self.get(*id)?.out_list().iter().any(|d| dirty.contains(d)) {
                dirty.insert(*id);
            }
        }

        let mut report = RecomputeReport::default();
        let mut failed: HashSet<ObjectId> = HashSet::new();
        for id in order.into_iter().filter(|id| dirty.contains(id)) {
            let Some(obj) = self.object(id) else {
                continue;
            };
            if let Some(dep) = obj.out_list().into_iter().find(|d| failed.contains(d)) {
                let dep_name = self.object(dep).map(|o| o.name().to_string()).unwrap_or_default();
                report
                    .errors
                    .push((id, format!("dependency '{dep_name}' failed")));
                failed.insert(id);
                continue;
            }
            match execute(self, id) {
                Ok(()) => {
                    if let Some(obj) = self.objects.get_mut(id) {
                        obj.touched = false;
                        for prop in obj.properties.values_mut() {
                            prop.touched = false;
                        }
                    }
                    report.recomputed.push(id);
                }
                Err(message) => {
                    warn!(object = ?id, %message, "recompute failed");
                    report.errors.push((id, message));
                    failed.insert(id);
                }
            }
        }
        debug!(
            recomputed = report.recomputed.len(),
            failed = report.errors.len(),
            "recompute finished"
        );
        Ok(report)
    }
}

/// Narrows the objects left over by the topological sort to those taking
/// part in a cycle.
struct DependencyCycleFinder<'a> {
    doc: &'a Document,
    remaining: HashSet<ObjectId>,
}

impl<'a> DependencyCycleFinder<'a> {
    fn new(doc: &'a Document, placed: HashSet<ObjectId>) -> Self {
        let remaining = doc
            .objects()
            .map(|(id, _)| id)
            .filter(|id| !placed.contains(id))
            .collect();
        Self { doc, remaining }
    }

    fn error(mut self) -> DocumentError {
        // Objects merely depending on a cycle have no remaining dependents.
        loop {
            let leaves: Vec<ObjectId> = self
                .remaining
                .iter()
                .copied()
                .filter(|id| {
                    self.doc
                        .object(*id)
                        .map(|o| o.in_list().all(|d| !self.remaining.contains(&d)))
                        .unwrap_or(true)
                })
                .collect();
            if leaves.is_empty() {
                break;
            }
            for id in leaves {
                self.remaining.remove(&id);
            }
        }
        let objects = self
            .doc
            .objects()
            .filter(|(id, _)| self.remaining.contains(id))
            .map(|(_, o)| o.name().to_string())
            .collect();
        DocumentError::DependencyCycle { objects }
    }
}
