use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, FetchError, Result};
use crate::models::{Article, HeadlinesResponse};

const HEADLINES_SEGMENTS: [&str; 2] = ["v2", "top-headlines"];

/// Error envelope the service sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct NewsFetcher {
    client: Client,
    endpoint: Url,
    category: String,
    api_key: String,
}

impl NewsFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent("headline-desk/0.1");
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        // Appended, not joined, so a gateway prefix in base_url survives
        let mut endpoint = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("invalid base_url {}: {}", config.base_url, e)))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| AppError::Config(format!("base_url {} cannot take a path", config.base_url)))?
            .pop_if_empty()
            .extend(HEADLINES_SEGMENTS);

        Ok(Self {
            client,
            endpoint,
            category: config.category.clone(),
            api_key: config.api_key()?.to_string(),
        })
    }

    /// Full request URL for `country_code`. The code is encoded but otherwise
    /// passed through as given.
    pub fn request_url(&self, country_code: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("country", country_code)
            .append_pair("category", &self.category)
            .append_pair("apiKey", &self.api_key);
        url
    }

    /// One request, no retry. Articles come back in service order.
    pub async fn fetch(&self, country_code: &str) -> std::result::Result<Vec<Article>, FetchError> {
        let response = self.client.get(self.request_url(country_code)).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let detail = match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(ErrorEnvelope {
                    code: Some(code),
                    message: Some(message),
                }) => format!("HTTP {} ({}): {}", status, code, message),
                Ok(ErrorEnvelope {
                    message: Some(message),
                    ..
                }) => format!("HTTP {}: {}", status, message),
                _ => format!("HTTP {}", status),
            };
            return Err(FetchError::Response(detail));
        }

        let body: HeadlinesResponse = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Response(format!("unusable body: {}", e)))?;

        tracing::debug!(
            "Fetched {} articles for country {:?}",
            body.articles.len(),
            country_code
        );

        Ok(body.articles)
    }
}
