//! Index schema per corpus
//!
//! Each record type names its searchable fields and their boosts. Every
//! schema also carries a stored `id` and a stored insertion ordinal `ord`.

use crate::storage::{GitHubExample, IndexedPage};
use tantivy::schema::{Field, Schema, STORED, STRING, TEXT};

/// A searchable text field and its relative weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub boost: f32,
}

/// A record type that can be placed in a [`SearchIndex`](crate::search::SearchIndex)
pub trait Indexable {
    /// Searchable fields, in the order [`Indexable::field_texts`] returns them
    const FIELDS: &'static [FieldSpec];

    /// Stable identifier returned in search hits
    fn id(&self) -> &str;

    /// Text for each field in [`Indexable::FIELDS`]; list values are
    /// whitespace-joined
    fn field_texts(&self) -> Vec<String>;
}

impl Indexable for IndexedPage {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "title", boost: 3.0 },
        FieldSpec { name: "headings", boost: 2.0 },
        FieldSpec { name: "text", boost: 1.0 },
        FieldSpec { name: "codeBlocks", boost: 1.0 },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field_texts(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.headings.join(" "),
            self.text.clone(),
            self.code_blocks.join(" "),
        ]
    }
}

impl Indexable for GitHubExample {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "title", boost: 3.0 },
        FieldSpec { name: "relatedClasses", boost: 2.0 },
        FieldSpec { name: "relatedMethods", boost: 2.0 },
        FieldSpec { name: "description", boost: 1.5 },
        FieldSpec { name: "content", boost: 1.0 },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn field_texts(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.related_classes.join(" "),
            self.related_methods.join(" "),
            self.description.clone(),
            self.content.clone(),
        ]
    }
}

/// Resolved tantivy schema and field handles
#[derive(Debug, Clone)]
pub(crate) struct IndexSchema {
    pub schema: Schema,
    pub id: Field,
    pub ord: Field,

    /// Searchable fields paired with their boosts
    pub text: Vec<(Field, f32)>,
}

impl IndexSchema {
    pub fn for_fields(specs: &[FieldSpec]) -> Self {
        let mut builder = Schema::builder();
        let id = builder.add_text_field("id", STRING | STORED);
        let ord = builder.add_u64_field("ord", STORED);
        let text = specs
            .iter()
            .map(|spec| (builder.add_text_field(spec.name, TEXT), spec.boost))
            .collect();

        Self {
            schema: builder.build(),
            id,
            ord,
            text,
        }
    }
}
