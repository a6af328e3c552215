//! Product filter → SQL predicate compilation.
//!
//! A [`ProductFilter`] is the union of every listing input (search box,
//! category and brand pickers, merchandising flags). [`FilterBuilder`] turns it
//! into a [`WhereClause`]: a conjunction of predicates with typed bind values.
//! Rendering is deferred so the page query and the count query share one
//! clause and can never disagree on what matches.

use crate::catalog::category_tree::CategoryTree;
use crate::domain::aggregates::ProductStatus;
use crate::DbId;

/// Optional listing inputs. `None` and empty lists mean "no constraint".
///
/// `category_id`/`category_ids` and `brand_id`/`brand_ids` are the shopper's
/// selection and match any of the listed ids. `scope_category_id` and
/// `scope_brand_id` pin a category or brand page: they are always ANDed with
/// the selection and survive [`without_brand`](Self::without_brand) and
/// [`without_category`](Self::without_category).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub query: Option<String>,
    pub category_id: Option<DbId>,
    pub category_ids: Vec<DbId>,
    pub brand_id: Option<DbId>,
    pub brand_ids: Vec<DbId>,
    pub scope_category_id: Option<DbId>,
    pub scope_brand_id: Option<DbId>,
    pub is_trending: Option<bool>,
    pub is_best_selling: Option<bool>,
    pub is_featured: Option<bool>,
    pub exclude_product_id: Option<DbId>,
    pub published_only: bool,
}

impl ProductFilter {
    /// Storefront default: published products only, nothing else applied.
    pub fn storefront() -> Self {
        Self { published_only: true, ..Self::default() }
    }

    /// Same filter without the brand dimension (for the brand facet).
    pub fn without_brand(&self) -> Self {
        Self { brand_id: None, brand_ids: Vec::new(), ..self.clone() }
    }

    /// Same filter without the category dimension (for the category facet).
    pub fn without_category(&self) -> Self {
        Self { category_id: None, category_ids: Vec::new(), ..self.clone() }
    }

    fn requested_categories(&self) -> Vec<DbId> {
        positive_ids(self.category_id.into_iter().chain(self.category_ids.iter().copied()))
    }

    fn requested_brands(&self) -> Vec<DbId> {
        positive_ids(self.brand_id.into_iter().chain(self.brand_ids.iter().copied()))
    }
}

/// Drop non-positive ids (unset form fields arrive as 0) and duplicates.
fn positive_ids(ids: impl Iterator<Item = DbId>) -> Vec<DbId> {
    let mut out: Vec<DbId> = Vec::new();
    for id in ids.filter(|id| *id > 0) {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Typed bind value for dynamically-built catalog queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    BigInt(i64),
    BigIntArray(Vec<i64>),
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFlag {
    Trending,
    BestSelling,
    Featured,
}

impl ProductFlag {
    fn column(&self) -> &'static str {
        match self {
            Self::Trending => "p.is_trending",
            Self::BestSelling => "p.is_best_selling",
            Self::Featured => "p.is_featured",
        }
    }
}

/// One conjunct of the product predicate. Columns are qualified with the
/// `p` alias used by every catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Already-escaped `%…%` pattern.
    TextSearch(String),
    CategoryIn(Vec<DbId>),
    BrandIn(Vec<DbId>),
    Flag(ProductFlag, bool),
    ExcludeProduct(DbId),
    Status(ProductStatus),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

/// A rendered clause: SQL text (empty or starting with `WHERE `), the values
/// to bind in order, and the next free `$n` index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWhere {
    pub sql: String,
    pub binds: Vec<BindValue>,
    pub next_index: u32,
}

impl WhereClause {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Render placeholders starting at `$first_index`.
    pub fn render(&self, first_index: u32) -> RenderedWhere {
        let mut idx = first_index;
        let mut conditions: Vec<String> = Vec::with_capacity(self.predicates.len());
        let mut binds = Vec::with_capacity(self.predicates.len());

        for predicate in &self.predicates {
            match predicate {
                Predicate::TextSearch(pattern) => {
                    conditions.push(format!(
                        "(p.name ILIKE ${idx} ESCAPE '\\' \
                         OR p.description ILIKE ${idx} ESCAPE '\\' \
                         OR array_to_string(p.keywords, ' ') ILIKE ${idx} ESCAPE '\\')"
                    ));
                    binds.push(BindValue::Text(pattern.clone()));
                }
                Predicate::CategoryIn(ids) => {
                    conditions.push(format!("p.category_id = ANY(${idx})"));
                    binds.push(BindValue::BigIntArray(ids.clone()));
                }
                Predicate::BrandIn(ids) => {
                    conditions.push(format!("p.brand_id = ANY(${idx})"));
                    binds.push(BindValue::BigIntArray(ids.clone()));
                }
                Predicate::Flag(flag, value) => {
                    conditions.push(format!("{} = ${idx}", flag.column()));
                    binds.push(BindValue::Bool(*value));
                }
                Predicate::ExcludeProduct(id) => {
                    conditions.push(format!("p.id <> ${idx}"));
                    binds.push(BindValue::BigInt(*id));
                }
                Predicate::Status(status) => {
                    conditions.push(format!("p.status = ${idx}"));
                    binds.push(BindValue::Text(status.as_str().to_string()));
                }
            }
            idx += 1;
        }

        let sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        RenderedWhere { sql, binds, next_index: idx }
    }
}

/// Escape `LIKE`/`ILIKE` metacharacters so user text matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub struct FilterBuilder;

impl FilterBuilder {
    /// Compile `filter` into a conjunction. Category ids are widened to their
    /// subtrees through `tree`; clauses whose id set ends up empty are left
    /// out entirely.
    pub fn build(filter: &ProductFilter, tree: &CategoryTree) -> WhereClause {
        let mut clause = WhereClause::default();

        if filter.published_only {
            clause.push(Predicate::Status(ProductStatus::Published));
        }

        if let Some(q) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            clause.push(Predicate::TextSearch(format!("%{}%", escape_like(q))));
        }

        if let Some(scope) = filter.scope_category_id.filter(|id| *id > 0) {
            clause.push(Predicate::CategoryIn(subtrees(tree, [scope])));
        }
        let categories = filter.requested_categories();
        if !categories.is_empty() {
            clause.push(Predicate::CategoryIn(subtrees(tree, categories)));
        }

        if let Some(scope) = filter.scope_brand_id.filter(|id| *id > 0) {
            clause.push(Predicate::BrandIn(vec![scope]));
        }
        let brands = filter.requested_brands();
        if !brands.is_empty() {
            clause.push(Predicate::BrandIn(brands));
        }

        for (flag, value) in [
            (ProductFlag::Trending, filter.is_trending),
            (ProductFlag::BestSelling, filter.is_best_selling),
            (ProductFlag::Featured, filter.is_featured),
        ] {
            if let Some(v) = value {
                clause.push(Predicate::Flag(flag, v));
            }
        }

        if let Some(id) = filter.exclude_product_id.filter(|id| *id > 0) {
            clause.push(Predicate::ExcludeProduct(id));
        }

        clause
    }
}

/// Every id in `roots` plus its descendants, without duplicates.
fn subtrees(tree: &CategoryTree, roots: impl IntoIterator<Item = DbId>) -> Vec<DbId> {
    let mut expanded: Vec<DbId> = Vec::new();
    for id in roots {
        for d in tree.descendants_of(id) {
            if !expanded.contains(&d) {
                expanded.push(d);
            }
        }
    }
    expanded
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub(crate) fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    binds: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in binds {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::BigIntArray(v) => q = q.bind(v.as_slice()),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
pub(crate) fn bind_values_scalar<'q, O>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    binds: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in binds {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::BigIntArray(v) => q = q.bind(v.as_slice()),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::category_tree::CategoryNode;

    fn tree() -> CategoryTree {
        CategoryTree::new([
            CategoryNode { id: 1, parent_id: None },
            CategoryNode { id: 2, parent_id: Some(1) },
            CategoryNode { id: 3, parent_id: Some(2) },
        ])
    }

    #[test]
    fn empty_filter_renders_nothing() {
        let rendered = FilterBuilder::build(&ProductFilter::default(), &tree()).render(1);
        assert_eq!(rendered.sql, "");
        assert!(rendered.binds.is_empty());
        assert_eq!(rendered.next_index, 1);
    }

    #[test]
    fn empty_brand_list_equals_no_brand_filter() {
        let t = tree();
        let with_empty = ProductFilter { brand_ids: vec![], ..ProductFilter::storefront() };
        let with_zeroes = ProductFilter { brand_ids: vec![0, -1], brand_id: Some(0), ..ProductFilter::storefront() };
        let without = ProductFilter::storefront();
        assert_eq!(FilterBuilder::build(&with_empty, &t), FilterBuilder::build(&without, &t));
        assert_eq!(FilterBuilder::build(&with_zeroes, &t), FilterBuilder::build(&without, &t));
    }

    #[test]
    fn category_expands_to_descendants() {
        let filter = ProductFilter { category_id: Some(1), ..Default::default() };
        let clause = FilterBuilder::build(&filter, &tree());
        assert_eq!(clause.predicates(), &[Predicate::CategoryIn(vec![1, 2, 3])]);

        let leaf = ProductFilter { category_ids: vec![3], ..Default::default() };
        assert_eq!(FilterBuilder::build(&leaf, &tree()).predicates(), &[Predicate::CategoryIn(vec![3])]);
    }

    #[test]
    fn overlapping_categories_dedupe() {
        let filter = ProductFilter { category_id: Some(2), category_ids: vec![1, 2], ..Default::default() };
        let clause = FilterBuilder::build(&filter, &tree());
        assert_eq!(clause.predicates(), &[Predicate::CategoryIn(vec![2, 3, 1])]);
    }

    #[test]
    fn text_query_is_escaped_and_trimmed() {
        let filter = ProductFilter { query: Some("  50%_off  ".into()), ..Default::default() };
        let clause = FilterBuilder::build(&filter, &tree());
        assert_eq!(clause.predicates(), &[Predicate::TextSearch("%50\\%\\_off%".into())]);

        let blank = ProductFilter { query: Some("   ".into()), ..Default::default() };
        assert!(FilterBuilder::build(&blank, &tree()).is_empty());
    }

    #[test]
    fn escape_like_handles_backslash() {
        assert_eq!(escape_like(r"a\b%c_d"), r"a\\b\%c\_d");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn render_numbers_placeholders_in_order() {
        let filter = ProductFilter {
            query: Some("shirt".into()),
            brand_ids: vec![4, 5],
            is_featured: Some(true),
            exclude_product_id: Some(9),
            published_only: true,
            ..Default::default()
        };
        let rendered = FilterBuilder::build(&filter, &tree()).render(1);
        assert_eq!(
            rendered.sql,
            "WHERE p.status = $1 AND (p.name ILIKE $2 ESCAPE '\\' OR p.description ILIKE $2 ESCAPE '\\' \
             OR array_to_string(p.keywords, ' ') ILIKE $2 ESCAPE '\\') AND p.brand_id = ANY($3) \
             AND p.is_featured = $4 AND p.id <> $5"
        );
        assert_eq!(
            rendered.binds,
            vec![
                BindValue::Text("published".into()),
                BindValue::Text("%shirt%".into()),
                BindValue::BigIntArray(vec![4, 5]),
                BindValue::Bool(true),
                BindValue::BigInt(9),
            ]
        );
        assert_eq!(rendered.next_index, 6);
    }

    #[test]
    fn render_offsets_start_index() {
        let filter = ProductFilter { is_trending: Some(false), ..Default::default() };
        let rendered = FilterBuilder::build(&filter, &tree()).render(3);
        assert_eq!(rendered.sql, "WHERE p.is_trending = $3");
        assert_eq!(rendered.next_index, 4);
    }

    #[test]
    fn brand_scope_is_anded_with_the_selection() {
        let filter = ProductFilter { scope_brand_id: Some(1), brand_ids: vec![2], ..ProductFilter::storefront() };
        let clause = FilterBuilder::build(&filter, &tree());
        assert_eq!(
            clause.predicates(),
            &[
                Predicate::Status(ProductStatus::Published),
                Predicate::BrandIn(vec![1]),
                Predicate::BrandIn(vec![2]),
            ]
        );
        assert!(clause.render(1).sql.ends_with("p.brand_id = ANY($2) AND p.brand_id = ANY($3)"));
    }

    #[test]
    fn category_scope_is_anded_with_the_selection() {
        let filter = ProductFilter { scope_category_id: Some(2), category_ids: vec![5], ..Default::default() };
        let clause = FilterBuilder::build(&filter, &tree());
        assert_eq!(
            clause.predicates(),
            &[Predicate::CategoryIn(vec![2, 3]), Predicate::CategoryIn(vec![5])]
        );
    }

    #[test]
    fn scope_survives_facet_variants() {
        let filter = ProductFilter {
            scope_category_id: Some(1),
            scope_brand_id: Some(4),
            category_ids: vec![3],
            brand_ids: vec![4, 5],
            ..Default::default()
        };
        let no_brand = filter.without_brand();
        assert_eq!(no_brand.scope_brand_id, Some(4));
        assert!(no_brand.brand_ids.is_empty());
        let no_cat = filter.without_category();
        assert_eq!(no_cat.scope_category_id, Some(1));
        assert!(no_cat.category_ids.is_empty());
        assert_eq!(
            FilterBuilder::build(&no_cat, &tree()).predicates(),
            &[Predicate::CategoryIn(vec![1, 2, 3]), Predicate::BrandIn(vec![4]), Predicate::BrandIn(vec![4, 5])]
        );
    }

    #[test]
    fn facet_variants_drop_one_dimension() {
        let filter = ProductFilter {
            category_id: Some(1),
            brand_ids: vec![2],
            is_trending: Some(true),
            ..Default::default()
        };
        let no_brand = filter.without_brand();
        assert!(no_brand.brand_ids.is_empty());
        assert_eq!(no_brand.category_id, Some(1));
        let no_cat = filter.without_category();
        assert_eq!(no_cat.category_id, None);
        assert_eq!(no_cat.brand_ids, vec![2]);
        assert_eq!(no_cat.is_trending, Some(true));
    }
}
