//! Category repository.

use chrono::Utc;
use ddf_core::{Category, CategoryId};
use serde::{Deserialize, Serialize};

use super::{RepositoryError, Store};

/// A category together with how many products reference it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}

/// Fields of a category to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub display_order: i32,
}

impl NewCategory {
    /// Build the stored category under `id`.
    #[must_use]
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            image: self.image,
            display_order: self.display_order,
            created_at: Utc::now(),
        }
    }
}

/// Partial category update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub display_order: Option<i32>,
}

/// Repository for categories.
pub struct CategoryRepository<'a> {
    store: &'a Store,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All categories ordered by `displayOrder`, each with its product count.
    ///
    /// Categories with equal `displayOrder` keep their stored order.
    pub async fn list_with_counts(&self) -> Vec<CategoryWithCount> {
        let dataset = self.store.read().await;
        let mut categories: Vec<CategoryWithCount> = dataset
            .categories
            .into_iter()
            .map(|category| {
                let product_count = dataset
                    .products
                    .iter()
                    .filter(|p| p.category_id == category.id)
                    .count();
                CategoryWithCount {
                    category,
                    product_count,
                }
            })
            .collect();
        categories.sort_by_key(|c| c.category.display_order);
        categories
    }

    /// Get a category by id.
    pub async fn get(&self, id: &CategoryId) -> Option<Category> {
        self.store
            .read()
            .await
            .categories
            .into_iter()
            .find(|c| &c.id == id)
    }

    /// Create a category with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the data file cannot be written.
    pub async fn create(&self, input: NewCategory) -> Result<Category, RepositoryError> {
        let category = input.into_category(CategoryId::generate());

        self.store
            .mutate(|ds| {
                ds.categories.push(category.clone());
                Ok(category)
            })
            .await
    }

    /// Merge `update` into the category with this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this id.
    pub async fn update(
        &self,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        self.store
            .mutate(|ds| {
                let category = ds
                    .categories
                    .iter_mut()
                    .find(|c| &c.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                if let Some(name) = update.name {
                    category.name = name;
                }
                if let Some(slug) = update.slug {
                    category.slug = slug;
                }
                if let Some(description) = update.description {
                    category.description = description;
                }
                if let Some(image) = update.image {
                    category.image = image;
                }
                if let Some(display_order) = update.display_order {
                    category.display_order = display_order;
                }
                Ok(category.clone())
            })
            .await
    }

    /// Delete a category. Products in it keep their now-dangling `categoryId`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this id.
    pub async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        self.store
            .mutate(|ds| {
                let index = ds
                    .categories
                    .iter()
                    .position(|c| &c.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                ds.categories.remove(index);
                Ok(())
            })
            .await
    }
}
