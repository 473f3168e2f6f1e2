use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{category, product, Category, CategoryModel, Product, SoftDelete};
use crate::errors::ServiceError;
use crate::services::summaries::{CategorySummary, ProductSummary};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 150))]
    pub slug: String,
    pub parent_id: Option<Uuid>,
    #[validate(url)]
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub slug: Option<String>,
    /// `null` detaches the category from its parent
    #[serde(default, deserialize_with = "crate::services::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    #[validate(url)]
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Category with its nested live subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: CategoryModel,
    pub parent: Option<CategorySummary>,
    pub children: Vec<CategoryModel>,
    pub products: Vec<ProductSummary>,
}

/// Assembles a forest from a flat list.
///
/// Roots are categories without a parent or whose parent is not in `categories`.
/// Siblings keep the relative order of the input.
pub fn build_category_tree(categories: Vec<CategoryModel>) -> Vec<CategoryNode> {
    let known: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let mut children_of: HashMap<Option<Uuid>, Vec<CategoryModel>> = HashMap::new();

    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p) && *p != category.id);
        children_of.entry(parent).or_default().push(category);
    }

    fn attach(
        parent: Option<Uuid>,
        children_of: &mut HashMap<Option<Uuid>, Vec<CategoryModel>>,
        visiting: &mut HashSet<Uuid>,
    ) -> Vec<CategoryNode> {
        let Some(models) = children_of.remove(&parent) else {
            return Vec::new();
        };
        let mut nodes = Vec::with_capacity(models.len());
        for m in models {
            if !visiting.insert(m.id) {
                continue;
            }
            let children = attach(Some(m.id), children_of, visiting);
            nodes.push(CategoryNode {
                id: m.id,
                name: m.name,
                slug: m.slug,
                parent_id: m.parent_id,
                image: m.image,
                is_active: m.is_active,
                created_at: m.created_at,
                updated_at: m.updated_at,
                children,
            });
        }
        nodes
    }

    let mut visiting = HashSet::new();
    attach(None, &mut children_of, &mut visiting)
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All live categories as a tree, siblings sorted by name.
    #[instrument(skip(self))]
    pub async fn tree(&self) -> Result<Vec<CategoryNode>, ServiceError> {
        let categories = Category::find_live()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(build_category_tree(categories))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<CategoryDetail, ServiceError> {
        let category = self.find(id).await?;

        let parent = match category.parent_id {
            Some(parent_id) => Category::find_live_by_id(parent_id)
                .one(&*self.db)
                .await?
                .map(|p| CategorySummary::from(&p)),
            None => None,
        };

        let children = Category::find_live()
            .filter(category::Column::ParentId.eq(id))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        let products = Product::find_live()
            .filter(product::Column::CategoryId.eq(id))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?
            .iter()
            .map(ProductSummary::from)
            .collect();

        Ok(CategoryDetail {
            category,
            parent,
            children,
            products,
        })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<CategoryModel, ServiceError> {
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }
        let slug = input.slug.trim().to_string();
        self.ensure_unique_slug(&slug, None).await?;

        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            slug: Set(slug),
            parent_id: Set(input.parent_id),
            image: Set(input.image),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = %model.id, slug = %model.slug, "Category created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let existing = self.find(id).await?;

        if let Some(slug) = input.slug.as_deref() {
            let slug = slug.trim();
            if slug != existing.slug {
                self.ensure_unique_slug(slug, Some(id)).await?;
            }
        }

        if let Some(Some(parent_id)) = input.parent_id {
            if parent_id == id {
                return Err(ServiceError::bad_request("Category cannot be its own parent"));
            }
            self.ensure_parent_exists(parent_id).await?;
            if self.is_descendant(parent_id, id).await? {
                warn!(category_id = %id, %parent_id, "Rejected move under descendant");
                return Err(ServiceError::bad_request(
                    "Category cannot be moved under its own descendant",
                ));
            }
        }

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug.trim().to_string());
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        if let Some(image) = input.image {
            active.image = Set(Some(image));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(category_id = %id, "Category updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;

        let children = Category::find_live()
            .filter(category::Column::ParentId.eq(id))
            .count(&*self.db)
            .await?;
        if children > 0 {
            return Err(ServiceError::bad_request(
                "Cannot delete category with subcategories",
            ));
        }

        let products = Product::find_live()
            .filter(product::Column::CategoryId.eq(id))
            .count(&*self.db)
            .await?;
        if products > 0 {
            return Err(ServiceError::bad_request("Cannot delete category with products"));
        }

        let mut active: category::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category not found"))
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> Result<(), ServiceError> {
        Category::find_live_by_id(parent_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Parent category not found"))
    }

    async fn ensure_unique_slug(&self, slug: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = Category::find_live().filter(category::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("Category slug already exists"));
        }
        Ok(())
    }

    /// True when `candidate` sits somewhere below `ancestor`.
    async fn is_descendant(&self, candidate: Uuid, ancestor: Uuid) -> Result<bool, ServiceError> {
        let mut seen = HashSet::new();
        let mut cursor = Some(candidate);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            if !seen.insert(current) {
                break;
            }
            cursor = Category::find_by_id(current)
                .one(&*self.db)
                .await?
                .and_then(|c| c.parent_id);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, parent: Option<Uuid>) -> CategoryModel {
        let now = Utc::now();
        CategoryModel {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent_id: parent,
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn builds_nested_tree_to_any_depth() {
        let men = cat("Men", None);
        let shirts = cat("Shirts", Some(men.id));
        let polos = cat("Polos", Some(shirts.id));
        let women = cat("Women", None);

        let tree = build_category_tree(vec![
            men.clone(),
            polos.clone(),
            shirts.clone(),
            women.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Men");
        assert_eq!(tree[1].name, "Women");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].name, "Shirts");
        assert_eq!(tree[0].children[0].children[0].name, "Polos");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphan_with_missing_parent_becomes_root() {
        let orphan = cat("Orphan", Some(Uuid::new_v4()));
        let tree = build_category_tree(vec![orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, orphan.id);
    }

    #[test]
    fn siblings_keep_input_order() {
        let root = cat("Root", None);
        let a = cat("Accessories", Some(root.id));
        let b = cat("Bags", Some(root.id));
        let c = cat("Caps", Some(root.id));

        let tree = build_category_tree(vec![a, b, c, root]);
        let names: Vec<_> = tree[0].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Accessories", "Bags", "Caps"]);
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(build_category_tree(Vec::new()).is_empty());
    }
}
