//! # Ordered Component List
//!
//! The page's components in render/drag order. Each component is identified
//! by its tree path, which is unique within the list. The only structural
//! change a list supports is moving one element to another position, so a list
//! and any list derived from it always hold the same multiset of tree paths.
//!
//! Lists are values: `move_item` returns a new list and leaves the receiver
//! untouched, which lets the edit session keep its committed snapshot around
//! for rollback without copying on every read.

use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::iter::FusedIterator;

/// A component slot on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    /// Unique key of the component within the page
    pub tree_path: String,

    /// Whether this particular component may be dragged
    pub is_sortable: bool,
}

impl ComponentDescriptor {
    pub fn new(tree_path: impl Into<String>, is_sortable: bool) -> Self {
        Self {
            tree_path: tree_path.into(),
            is_sortable,
        }
    }
}

/// Ordered sequence of components with unique tree paths
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ComponentDescriptor>", into = "Vec<ComponentDescriptor>")]
pub struct OrderedList {
    items: Vec<ComponentDescriptor>,
}

impl OrderedList {
    /// Build a list, rejecting duplicate tree paths
    pub fn new(items: Vec<ComponentDescriptor>) -> Result<Self, EditorError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.tree_path.as_str()) {
                return Err(EditorError::DuplicateTreePath(item.tree_path.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ComponentDescriptor> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentDescriptor> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ComponentDescriptor] {
        &self.items
    }

    /// Current index of a component
    pub fn position(&self, tree_path: &str) -> Option<usize> {
        self.items.iter().position(|c| c.tree_path == tree_path)
    }

    pub fn tree_paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|c| c.tree_path.as_str())
    }

    /// Relocate the element at `from` to `to`, shifting everything between.
    ///
    /// Both indices must address existing elements.
    pub fn move_item(&self, from: usize, to: usize) -> Result<Self, EditorError> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditorError::OutOfRange { index, len });
            }
        }

        let mut items = self.items.clone();
        let item = items.remove(from);
        items.insert(to, item);

        Ok(Self { items })
    }

    /// Presentational bindings, one per component, in order.
    ///
    /// The returned iterator borrows the list and can be cloned to restart.
    pub fn render(&self, options: RenderOptions) -> Bindings<'_> {
        Bindings {
            items: self.items.iter().enumerate(),
            list_sortable: options.list_sortable(),
        }
    }
}

impl TryFrom<Vec<ComponentDescriptor>> for OrderedList {
    type Error = EditorError;

    fn try_from(items: Vec<ComponentDescriptor>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<OrderedList> for Vec<ComponentDescriptor> {
    fn from(list: OrderedList) -> Self {
        list.items
    }
}

impl<'a> IntoIterator for &'a OrderedList {
    type Item = &'a ComponentDescriptor;
    type IntoIter = std::slice::Iter<'a, ComponentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Options for [`OrderedList::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// List-level sortable flag
    pub sortable: bool,

    /// Replaces `sortable` when set
    pub editable_override: Option<bool>,
}

impl RenderOptions {
    pub fn list_sortable(&self) -> bool {
        self.editable_override.unwrap_or(self.sortable)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sortable: true,
            editable_override: None,
        }
    }
}

/// One component as presentation should draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBinding<'a> {
    pub index: usize,
    pub key: &'a str,
    pub component: &'a ComponentDescriptor,

    /// Drag handle column is drawn for every row of a sortable list
    pub show_drag_handle: bool,

    /// Row can actually be dragged (list and component both sortable)
    pub draggable: bool,
}

/// Lazy iterator returned by [`OrderedList::render`]
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    items: std::iter::Enumerate<std::slice::Iter<'a, ComponentDescriptor>>,
    list_sortable: bool,
}

impl<'a> Iterator for Bindings<'a> {
    type Item = ComponentBinding<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, component) = self.items.next()?;
        Some(ComponentBinding {
            index,
            key: &component.tree_path,
            component,
            show_drag_handle: self.list_sortable,
            draggable: self.list_sortable && component.is_sortable,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Bindings<'_> {}

impl FusedIterator for Bindings<'_> {}
