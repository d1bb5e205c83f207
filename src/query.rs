// ============================================================================
// Batch Selection Query
// ============================================================================
//
// Selects the next slice of documents that still carry the source field and
// renders it as GROQ for the HTTP store. The document type travels as a query
// parameter; field names are spliced into the expression and therefore must be
// plain identifiers.
//
// ============================================================================

use crate::core::{ID_ATTRIBUTE, MigrationError, REVISION_ATTRIBUTE, Result};
use regex::Regex;

lazy_static::lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Name of the query parameter carrying the document type.
pub const TYPE_PARAM: &str = "type";

/// Returns an error unless `name` can be used verbatim as a GROQ attribute.
pub fn validate_field_name(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(MigrationError::InvalidQuery(format!(
            "'{}' is not a valid field name",
            name
        )))
    }
}

/// "Documents of `document_type` with `source_field` defined, at most `limit`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    document_type: String,
    source_field: String,
    limit: usize,
}

impl BatchQuery {
    pub fn new(document_type: &str, source_field: &str, limit: usize) -> Result<Self> {
        if document_type.trim().is_empty() {
            return Err(MigrationError::InvalidQuery(
                "document type cannot be empty".to_string(),
            ));
        }
        validate_field_name(source_field)?;
        if limit == 0 {
            return Err(MigrationError::InvalidQuery(
                "batch limit must be > 0".to_string(),
            ));
        }

        Ok(Self {
            document_type: document_type.to_string(),
            source_field: source_field.to_string(),
            limit,
        })
    }

    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// `*[_type == $type && defined(body)][0...100] {_id, _rev, body}`
    pub fn to_groq(&self) -> String {
        format!(
            "*[_type == ${param} && defined({field})][0...{limit}] {{{id}, {rev}, {field}}}",
            param = TYPE_PARAM,
            field = self.source_field,
            limit = self.limit,
            id = ID_ATTRIBUTE,
            rev = REVISION_ATTRIBUTE,
        )
    }

    /// URL query pairs: the expression plus JSON-encoded parameters.
    pub fn url_params(&self) -> Vec<(String, String)> {
        vec![
            ("query".to_string(), self.to_groq()),
            (
                format!("${}", TYPE_PARAM),
                serde_json::Value::String(self.document_type.clone()).to_string(),
            ),
        ]
    }
}
