//! Catalog query layer.
//!
//! Every product listing in the storefront and the admin panel goes through
//! here: a [`ProductFilter`] is compiled once against the [`CategoryTree`],
//! then the same [`WhereClause`](filter::WhereClause) drives the page query,
//! the count, and the brand/category facets.

pub mod category_tree;
pub mod facets;
pub mod filter;
pub mod pagination;
pub mod query;

use serde::Serialize;
use sqlx::PgPool;

pub use category_tree::{CategoryNode, CategoryTree};
pub use facets::Facets;
pub use filter::{FilterBuilder, ProductFilter};
pub use pagination::{PageRequest, MAX_PAGE_SIZE};
pub use query::{ProductPage, ProductQuery, SortBy};

use crate::models::category::Category;
use crate::repositories::category_repo::CategoryRepo;
use crate::DbId;

/// A product page together with the facets consistent with its filter.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    #[serde(flatten)]
    pub page: ProductPage,
    pub facets: Facets,
}

/// Run a full listing: page, count and both facets.
pub async fn browse(
    pool: &PgPool,
    filter: &ProductFilter,
    sort: SortBy,
    page: PageRequest,
) -> Result<CatalogPage, sqlx::Error> {
    let tree = CategoryTree::new(CategoryRepo::list_nodes(pool).await?);

    let clause = FilterBuilder::build(filter, &tree);
    let page = ProductQuery::run(pool, &clause, sort, page).await?;

    let brand_clause = FilterBuilder::build(&filter.without_brand(), &tree);
    let brands = facets::brands_for_filter(pool, &brand_clause).await?;

    let category_clause = FilterBuilder::build(&filter.without_category(), &tree);
    let categories = facets::categories_for_filter(pool, &category_clause, &tree).await?;

    Ok(CatalogPage { page, facets: Facets { brands, categories } })
}

/// Root-first chain ending at `category_id`, for breadcrumbs.
pub async fn breadcrumb(pool: &PgPool, tree: &CategoryTree, category_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
    let mut chain = tree.ancestors_of(category_id);
    chain.reverse();
    chain.push(category_id);

    let mut rows = CategoryRepo::find_many(pool, &chain).await?;
    rows.sort_by_key(|c| chain.iter().position(|id| *id == c.id));
    Ok(rows)
}
