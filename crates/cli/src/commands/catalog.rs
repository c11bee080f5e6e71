//! Catalog import.
//!
//! # File format
//!
//! YAML (`.yaml`, `.yml`) or JSON (anything else). Entries use the same
//! camelCase fields as the admin API, plus an optional `id` so categories
//! can be referenced from products:
//!
//! ```yaml
//! categories:
//!   - id: nuts
//!     name: Nuts
//!     slug: nuts
//!     displayOrder: 1
//! products:
//!   - name: California Almonds
//!     slug: california-almonds
//!     description: Crunchy, lightly sweet almonds.
//!     categoryId: nuts
//!     variants:
//!       - weight: 250g
//!         price: 299
//!         stock: 40
//! ```
//!
//! Products are always replaced. Categories are replaced only when the file
//! has a `categories` key. Users, carts and orders are never touched.

use std::collections::HashSet;
use std::path::Path;

use ddf_core::{Category, CategoryId, Product, ProductId};
use ddf_storefront::db::products::NewProduct;
use ddf_storefront::db::categories::NewCategory;
use ddf_storefront::db::{StoreError, Store};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during a catalog import.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for a catalog.
    #[error("Invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file is not valid JSON for a catalog.
    #[error("Invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// A product is missing a required field.
    #[error("Product #{index} ({slug:?}) is missing required fields")]
    Incomplete { index: usize, slug: String },

    /// Two products share a slug.
    #[error("Duplicate product slug: {0}")]
    DuplicateSlug(String),

    /// The data file could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A catalog file as authored.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Option<Vec<CategoryEntry>>,
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryEntry {
    #[serde(default)]
    pub id: Option<CategoryId>,
    #[serde(flatten)]
    pub fields: NewCategory,
}

#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(flatten)]
    pub fields: NewProduct,
}

/// Validated records ready to be written.
#[derive(Debug)]
pub struct Catalog {
    pub categories: Option<Vec<Category>>,
    pub products: Vec<Product>,
}

impl CatalogFile {
    /// Parse a catalog, choosing YAML or JSON by the file extension.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed input.
    pub fn parse(path: &Path, content: &str) -> Result<Self, CatalogError> {
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }

    /// Check every product and assign ids where missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Incomplete` for a product without name, slug,
    /// description, category or variants, and `CatalogError::DuplicateSlug`
    /// when two products share a slug.
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        let mut slugs = HashSet::new();
        let mut products = Vec::with_capacity(self.products.len());

        for (index, entry) in self.products.into_iter().enumerate() {
            if !entry.fields.has_required_fields() {
                return Err(CatalogError::Incomplete {
                    index: index + 1,
                    slug: entry.fields.slug,
                });
            }
            if !slugs.insert(entry.fields.slug.clone()) {
                return Err(CatalogError::DuplicateSlug(entry.fields.slug));
            }
            let id = entry.id.unwrap_or_else(ProductId::generate);
            products.push(entry.fields.into_product(id));
        }

        let categories = self.categories.map(|entries| {
            entries
                .into_iter()
                .map(|entry| {
                    let id = entry.id.unwrap_or_else(CategoryId::generate);
                    entry.fields.into_category(id)
                })
                .collect()
        });

        Ok(Catalog {
            categories,
            products,
        })
    }
}

/// Replace the catalog in `store` with the contents of `file`.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, parsed or validated,
/// or if the data file cannot be written. Nothing is written on error.
pub async fn import(store: &Store, file: &Path) -> Result<(), CatalogError> {
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CatalogError::Read {
            path: file.display().to_string(),
            source,
        })?;

    let catalog = CatalogFile::parse(file, &content)?.into_catalog()?;
    tracing::info!(
        path = %file.display(),
        products = catalog.products.len(),
        categories = ?catalog.categories.as_ref().map(Vec::len),
        "Parsed catalog"
    );

    let Catalog {
        categories,
        products,
    } = catalog;
    store
        .mutate(|ds| {
            ds.products = products;
            if let Some(categories) = categories {
                ds.categories = categories;
            }
            Ok::<_, CatalogError>(())
        })
        .await?;

    tracing::info!("Catalog import complete!");
    Ok(())
}
