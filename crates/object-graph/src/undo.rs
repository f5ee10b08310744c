use std::collections::VecDeque;

use crate::object::ObjectId;
use crate::value::PropertyValue;

/// A reversible change recorded by the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetProperty {
        object: ObjectId,
        property: String,
        old: Box<PropertyValue>,
        new: Box<PropertyValue>,
    },
}

impl Command {
    /// The command that reverts this one.
    pub fn inverse(self) -> Command {
        match self {
            Command::SetProperty {
                object,
                property,
                old,
                new,
            } => Command::SetProperty {
                object,
                property,
                old: new,
                new: old,
            },
        }
    }
}

/// Two-stack undo/redo history with a bounded undo depth.
#[derive(Debug)]
pub struct UndoStack {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    max_depth: usize,
}

impl UndoStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Push a command onto the undo stack, clearing the redo stack.
    pub fn push(&mut self, cmd: Command) {
        self.push_undo_only(cmd);
        self.redo.clear();
    }

    /// Push a command onto the undo stack without clearing redo.
    /// Used by `redo()` to re-populate the undo stack.
    pub fn push_undo_only(&mut self, cmd: Command) {
        self.undo.push_back(cmd);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }

    pub fn pop_undo(&mut self) -> Option<Command> {
        self.undo.pop_back()
    }

    pub fn push_redo(&mut self, cmd: Command) {
        self.redo.push(cmd);
    }

    pub fn pop_redo(&mut self) -> Option<Command> {
        self.redo.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn cmd(object: ObjectId, v: i64) -> Command {
        Command::SetProperty {
            object,
            property: "Value".into(),
            old: Box::new(PropertyValue::Integer(v - 1)),
            new: Box::new(PropertyValue::Integer(v)),
        }
    }

    #[test]
    fn depth_is_bounded() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let mut stack = UndoStack::new(2);
        for v in 0..5 {
            stack.push(cmd(id, v));
        }
        assert_eq!(stack.undo_len(), 2);
        assert_eq!(stack.pop_undo(), Some(cmd(id, 4)));
        assert_eq!(stack.pop_undo(), Some(cmd(id, 3)));
        assert!(!stack.can_undo());
    }

    #[test]
    fn push_clears_redo() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let mut stack = UndoStack::default();
        stack.push_redo(cmd(id, 1));
        assert!(stack.can_redo());
        stack.push(cmd(id, 2));
        assert!(!stack.can_redo());
    }

    #[test]
    fn inverse_swaps_values() {
        let mut ids: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let id = ids.insert(());
        let Command::SetProperty { old, new, .. } = cmd(id, 7).inverse();
        assert_eq!(*old, PropertyValue::Integer(7));
        assert_eq!(*new, PropertyValue::Integer(6));
    }
}
