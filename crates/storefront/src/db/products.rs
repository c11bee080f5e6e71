//! Product repository and the admin input types for products.

use chrono::Utc;
use ddf_core::{CategoryId, NutritionalInfo, Price, Product, ProductId, Variant, VariantId};
use serde::Deserialize;

use super::{RepositoryError, Store};

/// Catalog listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Only products in this category.
    #[serde(rename = "category")]
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
}

impl ProductFilter {
    fn matches(&self, product: &Product, needle: Option<&str>) -> bool {
        self.category_id
            .as_ref()
            .filter(|category| !category.as_str().is_empty())
            .is_none_or(|category| &product.category_id == category)
            && needle.is_none_or(|needle| product.matches_search(needle))
    }
}

/// Variant as submitted by the back-office. A missing id is generated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    #[serde(default)]
    pub id: Option<VariantId>,
    pub weight: String,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub sku: String,
}

impl From<VariantInput> for Variant {
    fn from(input: VariantInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(VariantId::generate),
            weight: input.weight,
            price: input.price,
            stock: input.stock,
            sku: input.sku,
        }
    }
}

/// Fields of a product to create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub nutritional_info: Option<NutritionalInfo>,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
}

impl NewProduct {
    /// Whether the name, slug, description, category and at least one
    /// variant are present.
    #[must_use]
    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.slug.trim().is_empty()
            && !self.description.trim().is_empty()
            && self
                .category_id
                .as_ref()
                .is_some_and(|id| !id.as_str().is_empty())
            && !self.variants.is_empty()
    }

    /// Build the stored product under `id`, stamped with the current time.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            category_id: self.category_id.unwrap_or_else(|| CategoryId::new("")),
            images: self.images,
            variants: self.variants.into_iter().map(Variant::from).collect(),
            featured: self.featured,
            nutritional_info: self.nutritional_info,
            benefits: self.benefits,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub variants: Option<Vec<VariantInput>>,
    pub featured: Option<bool>,
    pub nutritional_info: Option<NutritionalInfo>,
    pub benefits: Option<Vec<String>>,
}

impl ProductUpdate {
    fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(slug) = self.slug {
            product.slug = slug;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(short_description) = self.short_description {
            product.short_description = short_description;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(variants) = self.variants {
            product.variants = variants.into_iter().map(Variant::from).collect();
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
        if self.nutritional_info.is_some() {
            product.nutritional_info = self.nutritional_info;
        }
        if self.benefits.is_some() {
            product.benefits = self.benefits;
        }
        product.updated_at = Utc::now();
    }
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    store: &'a Store,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// List products matching `filter`, in stored order.
    ///
    /// The search text is lower-cased but otherwise matched as given, spaces
    /// included. An empty search matches everything.
    pub async fn list(&self, filter: &ProductFilter) -> Vec<Product> {
        let needle = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.store
            .read()
            .await
            .products
            .into_iter()
            .filter(|p| filter.matches(p, needle.as_deref()))
            .collect()
    }

    /// Get a product by id.
    pub async fn get(&self, id: &ProductId) -> Option<Product> {
        self.store
            .read()
            .await
            .products
            .into_iter()
            .find(|p| &p.id == id)
    }

    /// Get a product by id, falling back to a slug match.
    pub async fn get_by_id_or_slug(&self, key: &str) -> Option<Product> {
        let products = self.store.read().await.products;
        let by_id = products.iter().position(|p| p.id.as_str() == key);
        let index = by_id.or_else(|| products.iter().position(|p| p.slug == key))?;
        products.into_iter().nth(index)
    }

    /// Create a product with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    /// Returns `RepositoryError::Store` if the data file cannot be written.
    pub async fn create(&self, input: NewProduct) -> Result<Product, RepositoryError> {
        let product = input.into_product(ProductId::generate());

        self.store
            .mutate(|ds| {
                if ds.products.iter().any(|p| p.slug == product.slug) {
                    return Err(slug_conflict(&product.slug));
                }
                ds.products.push(product.clone());
                Ok(product)
            })
            .await
    }

    /// Merge `update` into the product with this id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: &ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        self.store
            .mutate(|ds| {
                if let Some(slug) = &update.slug
                    && ds.products.iter().any(|p| &p.slug == slug && &p.id != id)
                {
                    return Err(slug_conflict(slug));
                }
                let product = ds
                    .products
                    .iter_mut()
                    .find(|p| &p.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                update.apply(product);
                Ok(product.clone())
            })
            .await
    }

    /// Delete a product. Carts and orders referencing it are left as is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.store
            .mutate(|ds| {
                let index = ds
                    .products
                    .iter()
                    .position(|p| &p.id == id)
                    .ok_or(RepositoryError::NotFound)?;
                ds.products.remove(index);
                Ok(())
            })
            .await
    }
}

fn slug_conflict(slug: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("slug '{slug}' is already in use"))
}
