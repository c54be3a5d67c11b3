//! Response models for `GET /v1/paper/arXiv:{id}`

use serde::{Deserialize, Serialize};

/// Paper metadata. Unknown fields in the response are ignored; missing
/// required ones fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
    /// Null for many papers
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub arxiv_id: String,
    pub authors: Vec<Author>,
    pub title: String,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Null for authors S2 could not disambiguate
    pub author_id: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

impl PaperMetadata {
    /// Author names, in order.
    pub fn author_names(&self) -> Vec<&str> {
        self.authors.iter().map(|a| a.name.as_str()).collect()
    }
}
