//! HTTP product backend
//!
//! Talks to the store API:
//! - `GET {base}/products?limit={page_size}` -> `{data: {products: [...]}}`
//! - `GET {base}/products/categories/all` -> `{data: {categories: [...]}}`
//!
//! Bare arrays and un-enveloped objects are accepted too.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use figuro_voice_config::CatalogConfig;
use figuro_voice_core::{BackendError, Category, Product, ProductBackend};

use crate::CatalogError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Enveloped { data: T },
    Bare(T),
}

impl<T> Listing<T> {
    fn into_inner(self) -> T {
        match self {
            Listing::Enveloped { data } => data,
            Listing::Bare(inner) => inner,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductPage {
    Keyed { products: Vec<Product> },
    List(Vec<Product>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryPage {
    Keyed { categories: Vec<Category> },
    List(Vec<Category>),
}

/// reqwest-backed [`ProductBackend`]
#[derive(Clone)]
pub struct HttpProductBackend {
    client: Client,
    base_url: String,
    page_size: usize,
    timeout: Duration,
}

impl HttpProductBackend {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    fn map_send_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout(self.timeout.as_millis() as u64)
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl ProductBackend for HttpProductBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let listing: Listing<ProductPage> = self
            .get_json("/products", &[("limit", self.page_size.to_string())])
            .await?;
        Ok(match listing.into_inner() {
            ProductPage::Keyed { products } => products,
            ProductPage::List(products) => products,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let listing: Listing<CategoryPage> = self.get_json("/products/categories/all", &[]).await?;
        Ok(match listing.into_inner() {
            CategoryPage::Keyed { categories } => categories,
            CategoryPage::List(categories) => categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_product_envelope() {
        let body = json!({
            "statusCode": 200,
            "message": "OK",
            "data": {
                "products": [
                    {"id": 1, "name": "Naruto Sage Mode", "price": "1500000.00",
                     "category": {"id": 2, "name": "Naruto"}}
                ],
                "pagination": {"page": 1, "limit": 1000, "total": 1}
            }
        });
        let listing: Listing<ProductPage> = serde_json::from_value(body).unwrap();
        let ProductPage::Keyed { products } = listing.into_inner() else {
            panic!("expected keyed page");
        };
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 1_500_000);
    }

    #[test]
    fn test_parse_bare_category_list() {
        let body = json!([{"id": 1, "name": "One Piece"}, {"id": 2, "name": "Naruto"}]);
        let listing: Listing<CategoryPage> = serde_json::from_value(body).unwrap();
        let CategoryPage::List(categories) = listing.into_inner() else {
            panic!("expected list");
        };
        assert_eq!(categories[1].name, "Naruto");
    }

    #[test]
    fn test_parse_category_envelope() {
        let body = json!({"data": {"categories": [{"id": 3, "name": "Dragon Ball", "slug": "dragon-ball"}]}});
        let listing: Listing<CategoryPage> = serde_json::from_value(body).unwrap();
        let CategoryPage::Keyed { categories } = listing.into_inner() else {
            panic!("expected keyed page");
        };
        assert_eq!(categories[0].extra["slug"], "dragon-ball");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = CatalogConfig {
            base_url: "http://store.local/api/".to_string(),
            ..CatalogConfig::default()
        };
        let backend = HttpProductBackend::new(&config).unwrap();
        assert_eq!(backend.url("/products"), "http://store.local/api/products");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_soft_error() {
        let config = CatalogConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
            ..CatalogConfig::default()
        };
        let backend = HttpProductBackend::new(&config).unwrap();
        assert!(backend.list_products().await.is_err());
    }
}
