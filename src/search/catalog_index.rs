use anyhow::{Context, Result};
use std::ops::Bound;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, RangeQuery, TermQuery};
use tantivy::schema::*;
use tantivy::{doc, Index, IndexWriter, ReloadPolicy, Term};

use crate::interpret::rules::EXTRA_ATTRIBUTES;
use crate::interpret::FilterSet;
use crate::models::{Product, ProductHit};

const PRICE_FIELD: &str = "selling_price";

/// Product search index built on tantivy.
///
/// Filter values are matched as tokens against title, brand, category and
/// sub-category; price bounds become an inclusive range on selling price.
pub struct CatalogIndex {
    index: Index,
    f_id: Field,
    f_title: Field,
    f_brand: Field,
    f_category: Field,
    f_sub_category: Field,
    f_selling_price: Field,
    f_actual_price: Field,
    f_average_rating: Field,
    f_discount: Field,
    f_url: Field,
}

impl CatalogIndex {
    /// Create or open a catalog index at the given directory.
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let mut schema_builder = Schema::builder();
        let f_id = schema_builder.add_text_field("id", STRING | STORED);
        let f_title = schema_builder.add_text_field("title", TEXT | STORED);
        let f_brand = schema_builder.add_text_field("brand", TEXT | STORED);
        let f_category = schema_builder.add_text_field("category", TEXT | STORED);
        let f_sub_category = schema_builder.add_text_field("sub_category", TEXT | STORED);
        let f_selling_price = schema_builder.add_f64_field(PRICE_FIELD, INDEXED | FAST | STORED);
        let f_actual_price = schema_builder.add_f64_field("actual_price", STORED);
        let f_average_rating = schema_builder.add_f64_field("average_rating", STORED);
        let f_discount = schema_builder.add_text_field("discount", STORED);
        let f_url = schema_builder.add_text_field("url", STORED);

        let schema = schema_builder.build();

        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(index_dir).context("Failed to open existing tantivy index")?
        } else {
            Index::create_in_dir(index_dir, schema).context("Failed to create tantivy index")?
        };

        Ok(Self {
            index,
            f_id,
            f_title,
            f_brand,
            f_category,
            f_sub_category,
            f_selling_price,
            f_actual_price,
            f_average_rating,
            f_discount,
            f_url,
        })
    }

    /// Replace the index contents with `products`.
    pub fn rebuild(&self, products: &[Product]) -> Result<()> {
        let mut writer: IndexWriter = self
            .index
            .writer(50_000_000)
            .context("Failed to create index writer")?;

        writer
            .delete_all_documents()
            .context("Failed to clear index")?;

        for p in products {
            writer.add_document(doc!(
                self.f_id => p.id.clone(),
                self.f_title => p.title.clone().unwrap_or_default(),
                self.f_brand => p.brand.clone().unwrap_or_default(),
                self.f_category => p.category.clone().unwrap_or_default(),
                self.f_sub_category => p.sub_category.clone().unwrap_or_default(),
                self.f_selling_price => p.selling_price,
                self.f_actual_price => p.actual_price,
                self.f_average_rating => p.average_rating,
                self.f_discount => p.discount.clone().unwrap_or_default(),
                self.f_url => p.url.clone().unwrap_or_default(),
            ))?;
        }

        writer.commit().context("Failed to commit index")?;
        tracing::info!("Catalog index rebuilt with {} products", products.len());
        Ok(())
    }

    /// Find products matching `filters`.
    ///
    /// Every filter value must match first. If nothing does and there is more
    /// than one value, any single value is enough. A filter set with no
    /// constraints falls back to a keyword search over `raw_query`.
    pub fn search(&self, filters: &FilterSet, raw_query: &str, limit: usize) -> Result<Vec<ProductHit>> {
        let groups = term_groups(filters);
        let has_price = filters.price_min.is_some() || filters.price_max.is_some();

        if groups.is_empty() && !has_price {
            return self.keyword_search(raw_query, limit);
        }

        let strict = self.filter_query(&groups, filters, Occur::Must);
        let hits = self.run(strict.as_ref(), limit)?;
        if !hits.is_empty() || groups.len() <= 1 {
            return Ok(hits);
        }

        tracing::info!(
            "No product matched all {} filter terms, relaxing to any term",
            groups.len()
        );
        let relaxed = self.filter_query(&groups, filters, Occur::Should);
        self.run(relaxed.as_ref(), limit)
    }

    fn keyword_search(&self, raw_query: &str, limit: usize) -> Result<Vec<ProductHit>> {
        if tokenize(raw_query).is_empty() {
            return Ok(Vec::new());
        }
        let parser = QueryParser::for_index(&self.index, self.text_fields().to_vec());
        let (query, errors) = parser.parse_query_lenient(raw_query);
        if !errors.is_empty() {
            tracing::debug!("Ignored {} query syntax errors in {raw_query:?}", errors.len());
        }
        self.run(query.as_ref(), limit)
    }

    fn text_fields(&self) -> [Field; 4] {
        [self.f_title, self.f_brand, self.f_category, self.f_sub_category]
    }

    /// Build the filter query. `group_occur` is `Must` for the strict pass and
    /// `Should` (at least one group) for the relaxed pass.
    fn filter_query(&self, groups: &[Vec<String>], filters: &FilterSet, group_occur: Occur) -> Box<dyn Query> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        if !groups.is_empty() {
            let group_queries: Vec<(Occur, Box<dyn Query>)> = groups
                .iter()
                .map(|tokens| (group_occur, self.group_query(tokens)))
                .collect();
            clauses.push((Occur::Must, Box::new(BooleanQuery::new(group_queries))));
        }

        if filters.price_min.is_some() || filters.price_max.is_some() {
            let lower = filters.price_min.map_or(Bound::Unbounded, Bound::Included);
            let upper = filters.price_max.map_or(Bound::Unbounded, Bound::Included);
            clauses.push((
                Occur::Must,
                Box::new(RangeQuery::new_f64_bounds(PRICE_FIELD.to_string(), lower, upper)),
            ));
        }

        Box::new(BooleanQuery::new(clauses))
    }

    /// Every token of one filter value must appear in some text field.
    fn group_query(&self, tokens: &[String]) -> Box<dyn Query> {
        let token_queries: Vec<(Occur, Box<dyn Query>)> = tokens
            .iter()
            .map(|token| {
                let per_field: Vec<(Occur, Box<dyn Query>)> = self
                    .text_fields()
                    .iter()
                    .map(|field| {
                        let term = Term::from_field_text(*field, token);
                        let q: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                        (Occur::Should, q)
                    })
                    .collect();
                let q: Box<dyn Query> = Box::new(BooleanQuery::new(per_field));
                (Occur::Must, q)
            })
            .collect();
        Box::new(BooleanQuery::new(token_queries))
    }

    fn run(&self, query: &dyn Query, limit: usize) -> Result<Vec<ProductHit>> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("Failed to create reader")?;

        let searcher = reader.searcher();
        let top_docs = searcher
            .search(query, &TopDocs::with_limit(limit.max(1)))
            .context("Search failed")?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .context("Failed to retrieve document")?;

            let text = |field: Field| {
                doc.get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            let number = |field: Field| doc.get_first(field).and_then(|v| v.as_f64()).unwrap_or(0.0);

            hits.push(ProductHit {
                id: text(self.f_id),
                title: text(self.f_title),
                brand: text(self.f_brand),
                category: text(self.f_category),
                sub_category: text(self.f_sub_category),
                selling_price: number(self.f_selling_price),
                actual_price: number(self.f_actual_price),
                average_rating: number(self.f_average_rating),
                discount: text(self.f_discount),
                url: text(self.f_url),
                score,
            });
        }

        Ok(hits)
    }
}

/// Token groups for every textual filter value, deduplicated.
///
/// Price-sentiment attributes ("cheap", "expensive") describe price, not
/// product text, and are left out.
pub fn term_groups(filters: &FilterSet) -> Vec<Vec<String>> {
    let gender = filters.gender.map(|g| g.as_str().to_string());
    let values = [&filters.product_type, &filters.color, &filters.brand, &gender]
        .into_iter()
        .flatten()
        .chain(
            filters
                .attributes
                .iter()
                .filter(|a| !EXTRA_ATTRIBUTES.contains(&a.as_str())),
        );

    let mut groups: Vec<Vec<String>> = Vec::new();
    for value in values {
        let tokens = tokenize(value);
        if !tokens.is_empty() && !groups.contains(&tokens) {
            groups.push(tokens);
        }
    }
    groups
}

/// Split like tantivy's default tokenizer: alphanumeric runs, lower-cased.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
