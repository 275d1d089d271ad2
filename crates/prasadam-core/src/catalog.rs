//! In-memory catalog of temples and prasadam.
//!
//! Collections are replaced wholesale when a fetch completes and never
//! mutated otherwise. Filtering temples by type is purely local.

use crate::models::{PrasadamItem, Temple, TempleType};

/// Temple type filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TempleFilter {
    #[default]
    All,
    Jyotirlinga,
    Dham,
}

impl TempleFilter {
    pub fn label(&self) -> &'static str {
        match self {
            TempleFilter::All => "All",
            TempleFilter::Jyotirlinga => "Jyotirlingas",
            TempleFilter::Dham => "Dhams",
        }
    }

    pub fn matches(&self, temple: &Temple) -> bool {
        match self {
            TempleFilter::All => true,
            TempleFilter::Jyotirlinga => temple.temple_type == TempleType::Jyotirlinga,
            TempleFilter::Dham => temple.temple_type == TempleType::Dham,
        }
    }
}

/// Where the current prasadam listing came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogScope {
    #[default]
    All,
    Temple { id: i64, name: String },
}

#[derive(Debug, Default)]
pub struct Catalog {
    temples: Vec<Temple>,
    /// Full listing from the last bulk fetch.
    all_prasadam: Vec<PrasadamItem>,
    /// What is currently displayed.
    prasadam: Vec<PrasadamItem>,
    scope: CatalogScope,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temples(&self) -> &[Temple] {
        &self.temples
    }

    pub fn prasadam(&self) -> &[PrasadamItem] {
        &self.prasadam
    }

    pub fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    pub fn set_temples(&mut self, temples: Vec<Temple>) {
        self.temples = temples;
    }

    /// Replace the listing with the full catalog.
    pub fn set_all_prasadam(&mut self, items: Vec<PrasadamItem>) {
        self.prasadam = items.clone();
        self.all_prasadam = items;
        self.scope = CatalogScope::All;
    }

    /// Go back to the full listing from the last bulk fetch.
    pub fn show_all(&mut self) {
        self.prasadam = self.all_prasadam.clone();
        self.scope = CatalogScope::All;
    }

    /// Replace the listing with one temple's items.
    ///
    /// The temple-scoped endpoint leaves out the temple name and type, so
    /// blank fields are filled from the scoped temple.
    pub fn set_temple_prasadam(&mut self, temple_id: i64, mut items: Vec<PrasadamItem>) {
        let temple = self.temple(temple_id);
        let temple_type = temple.map(|t| t.temple_type);
        let name = temple
            .map(|t| t.name.clone())
            .or_else(|| {
                items
                    .iter()
                    .map(|item| item.temple_name.clone())
                    .find(|name| !name.is_empty())
            })
            .unwrap_or_else(|| format!("Temple {}", temple_id));

        for item in &mut items {
            if item.temple_name.is_empty() {
                item.temple_name = name.clone();
            }
            if item.temple_type == TempleType::Other {
                if let Some(temple_type) = temple_type {
                    item.temple_type = temple_type;
                }
            }
            item.temple_id.get_or_insert(temple_id);
        }

        self.prasadam = items;
        self.scope = CatalogScope::Temple { id: temple_id, name };
    }

    pub fn temple(&self, id: i64) -> Option<&Temple> {
        self.temples.iter().find(|t| t.id == id)
    }

    pub fn item(&self, id: i64) -> Option<&PrasadamItem> {
        self.prasadam.iter().find(|p| p.id == id)
    }

    pub fn temples_of_type(&self, filter: TempleFilter) -> Vec<&Temple> {
        self.temples.iter().filter(|t| filter.matches(t)).collect()
    }
}
