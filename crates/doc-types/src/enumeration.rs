use serde::{Deserialize, Serialize};

use crate::TypesError;

/// A selection out of an ordered list of named items.
///
/// An index of `-1` means nothing is selected, which is the state of an
/// enumeration without items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    items: Vec<String>,
    index: i64,
}

impl Enumeration {
    /// Create an enumeration selecting the first item, if any.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let index = if items.is_empty() { -1 } else { 0 };
        Self { items, index }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    /// The selected item, if any.
    pub fn selected(&self) -> Option<&str> {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    pub fn is_value(&self, item: &str) -> bool {
        self.selected() == Some(item)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Replace the item list while keeping the current index.
    ///
    /// The index is reset to `-1` when it no longer addresses an item.
    pub fn set_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        if self.index >= self.items.len() as i64 {
            self.index = -1;
        }
    }

    pub fn set_index(&mut self, index: i64) -> Result<(), TypesError> {
        if index < -1 || index >= self.items.len() as i64 {
            return Err(TypesError::EnumIndexOutOfRange {
                index,
                count: self.items.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    pub fn select(&mut self, item: &str) -> Result<(), TypesError> {
        let pos = self
            .items
            .iter()
            .position(|i| i == item)
            .ok_or_else(|| TypesError::UnknownEnumItem {
                item: item.to_string(),
            })?;
        self.index = pos as i64;
        Ok(())
    }
}

impl Default for Enumeration {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_selects_first_item() {
        let e = Enumeration::new(["Mid", "Left", "Right"]);
        assert_eq!(e.index(), 0);
        assert_eq!(e.selected(), Some("Mid"));
    }

    #[test]
    fn empty_enumeration_selects_nothing() {
        let e = Enumeration::default();
        assert_eq!(e.index(), -1);
        assert_eq!(e.selected(), None);
    }

    #[test]
    fn select_unknown_item_fails() {
        let mut e = Enumeration::new(["A", "B"]);
        assert!(e.select("C").is_err());
        assert_eq!(e.index(), 0);
        e.select("B").unwrap();
        assert!(e.is_value("B"));
    }

    #[test]
    fn shrinking_items_resets_index() {
        let mut e = Enumeration::new(["A", "B", "C"]);
        e.set_index(2).unwrap();
        e.set_items(["A"]);
        assert_eq!(e.index(), -1);
    }

    #[test]
    fn index_bounds_are_checked() {
        let mut e = Enumeration::new(["A", "B"]);
        assert!(e.set_index(2).is_err());
        assert!(e.set_index(-2).is_err());
        assert!(e.set_index(-1).is_ok());
    }
}
