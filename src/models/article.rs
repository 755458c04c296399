use serde::{Deserialize, Deserializer};

/// One headline as returned by the news service. Fields are kept verbatim;
/// `published_at` is only interpreted when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: Source,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub published_at: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// Body of a `top-headlines` response. `articles` has no default: a body
/// without a list there is not a usable response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesResponse {
    #[allow(dead_code)]
    pub status: Option<String>,
    #[allow(dead_code)]
    pub total_results: Option<u64>,
    pub articles: Vec<Article>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
