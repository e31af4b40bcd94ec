//! Master pages: named element sets merged into renderable pages.

use crate::layout::GridGeometry;
use crate::model::Element;
use serde::{Deserialize, Serialize};

/// A named, non-rendered element set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Master {
    /// Master name as referenced by pages
    pub name: String,

    /// Geometry of the page that defined the master
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GridGeometry>,

    /// Elements in declaration order
    pub elements: Vec<Element>,
}

impl Master {
    /// Create a master.
    pub fn new(name: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            elements,
        }
    }

    /// Record the defining page's geometry.
    pub fn with_geometry(mut self, geometry: GridGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

/// Where a merged element came from. Master layers sort before page
/// layers when z-values tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Contributed by the page's master
    Master,
    /// Declared on the page itself
    Page,
}

/// One entry of a merged render list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layered<'a> {
    /// The element
    pub element: &'a Element,
    /// Its source
    pub origin: Origin,
}

/// Masters in registration order, looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterRegistry {
    masters: Vec<Master>,
}

impl MasterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `elements` under `name`, replacing an earlier definition.
    pub fn register(&mut self, name: &str, elements: Vec<Element>) {
        self.register_master(Master::new(name, elements));
    }

    /// Register a master. A redefinition keeps the original position.
    pub fn register_master(&mut self, master: Master) {
        match self.masters.iter_mut().find(|m| m.name == master.name) {
            Some(slot) => {
                log::debug!("redefining master '{}'", master.name);
                *slot = master;
            }
            None => {
                log::debug!("registering master '{}'", master.name);
                self.masters.push(master);
            }
        }
    }

    /// Look up a master by name.
    pub fn get(&self, name: &str) -> Option<&Master> {
        self.masters.iter().find(|m| m.name == name)
    }

    /// Check if a master is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Master> {
        self.masters.iter()
    }

    /// Iterate mutably in registration order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Master> {
        self.masters.iter_mut()
    }

    /// Number of masters.
    pub fn len(&self) -> usize {
        self.masters.len()
    }

    /// Check if no master is registered.
    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }

    /// Merge the named master's elements with a page's own elements.
    ///
    /// An absent or unregistered master contributes nothing.
    pub fn merge<'a>(&'a self, master: Option<&str>, page_elements: &'a [Element]) -> Vec<Layered<'a>> {
        let master_elements = master
            .and_then(|name| self.get(name))
            .map(|m| m.elements.as_slice())
            .unwrap_or(&[]);
        merge_layers(master_elements, page_elements)
    }
}

/// Concatenate master then page elements and stable-sort by z.
pub fn merge_layers<'a>(master: &'a [Element], page: &'a [Element]) -> Vec<Layered<'a>> {
    let mut layers: Vec<Layered<'a>> = master
        .iter()
        .map(|element| Layered {
            element,
            origin: Origin::Master,
        })
        .chain(page.iter().map(|element| Layered {
            element,
            origin: Origin::Page,
        }))
        .collect();
    layers.sort_by_key(|l| l.element.z);
    layers
}
