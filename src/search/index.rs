//! In-memory fuzzy and prefix search over one corpus
//!
//! The index is built once from a full record set and never updated; a
//! changed corpus gets a new index.

use crate::search::schema::{IndexSchema, Indexable};
use crate::search::SearchResult;
use std::marker::PhantomData;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, Term};

/// Indexing memory budget for the single writer thread
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Weight of an approximate match relative to an exact one
const FUZZY_WEIGHT: f32 = 0.5;

/// One ranked match
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

/// Full-text index over records of type `T`
pub struct SearchIndex<T> {
    schema: IndexSchema,
    index: Index,
    reader: IndexReader,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for SearchIndex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex").field("len", &self.len).finish()
    }
}

impl<T: Indexable> SearchIndex<T> {
    /// Builds an index over `records`
    ///
    /// Record position is kept as the ordinal that breaks score ties.
    pub fn build(records: &[T]) -> SearchResult<Self> {
        let schema = IndexSchema::for_fields(T::FIELDS);
        let index = Index::create_in_ram(schema.schema.clone());
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;

        for (ord, record) in records.iter().enumerate() {
            let mut doc = TantivyDocument::default();
            doc.add_text(schema.id, record.id());
            doc.add_u64(schema.ord, ord as u64);
            for (&(field, _), text) in schema.text.iter().zip(record.field_texts()) {
                doc.add_text(field, &text);
            }
            writer.add_document(doc)?;
        }

        writer.commit()?;
        let reader = index.reader()?;
        tracing::debug!("Built search index over {} records", records.len());

        Ok(Self {
            schema,
            index,
            reader,
            len: records.len(),
            _marker: PhantomData,
        })
    }

    /// An index with no records
    pub fn empty() -> SearchResult<Self> {
        Self::build(&[])
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ranks records against a free-text query
    ///
    /// Every query token matches exactly, by prefix, or within an edit
    /// distance that grows with token length. Results are best score first;
    /// equal scores keep record order. At most `limit` hits are returned.
    pub fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<SearchHit>> {
        if limit == 0 || self.len == 0 {
            return Ok(Vec::new());
        }
        let Some(query) = self.build_query(query)? else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.len))?;

        let mut ranked = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc = searcher.doc::<TantivyDocument>(address)?;
            let id = doc.get_first(self.schema.id).and_then(|v| v.as_str());
            let ord = doc.get_first(self.schema.ord).and_then(|v| v.as_u64());
            if let (Some(id), Some(ord)) = (id, ord) {
                ranked.push((
                    ord,
                    SearchHit {
                        id: id.to_string(),
                        score,
                    },
                ));
            }
        }

        ranked.sort_by(|(ord_a, a), (ord_b, b)| {
            b.score.total_cmp(&a.score).then(ord_a.cmp(ord_b))
        });
        ranked.truncate(limit);

        Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
    }

    /// Combines exact and fuzzy-prefix clauses for every token and field
    ///
    /// Returns `None` when the query has no tokens.
    fn build_query(&self, text: &str) -> SearchResult<Option<BooleanQuery>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for &(field, boost) in &self.schema.text {
            let mut analyzer = self.index.tokenizer_for_field(field)?;
            let mut stream = analyzer.token_stream(text);
            stream.process(&mut |token| {
                let term = Term::from_field_text(field, &token.text);

                let exact = TermQuery::new(term.clone(), IndexRecordOption::WithFreqs);
                clauses.push((Occur::Should, Box::new(BoostQuery::new(Box::new(exact), boost))));

                let fuzzy = FuzzyTermQuery::new_prefix(term, fuzzy_distance(&token.text), true);
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(Box::new(fuzzy), boost * FUZZY_WEIGHT)),
                ));
            });
        }

        Ok((!clauses.is_empty()).then(|| BooleanQuery::new(clauses)))
    }
}

/// Edit distance tolerated for a token: a fifth of its length, at most 2
fn fuzzy_distance(token: &str) -> u8 {
    match token.chars().count() {
        0..=4 => 0,
        5..=9 => 1,
        _ => 2,
    }
}
