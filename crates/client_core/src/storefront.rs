use serde::de::DeserializeOwned;
use shared::{
    domain::{Category, CategoryId, Product, ProductId, Subcategory, SubcategoryId},
    error::{ApiException, ErrorCode},
    normalize::ApiResponse,
    protocol::ProductQuery,
};

use crate::transport::{ApiRequest, ApiTransport, EndpointFamily};

#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

/// A category or subcategory together with the products filed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct WithProducts<T> {
    pub parent: T,
    pub products: Vec<Product>,
}

/// Read-only catalog access over the public endpoints.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    transport: ApiTransport,
}

impl StorefrontClient {
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &ApiTransport {
        &self.transport
    }

    async fn get(&self, path: String) -> ApiResponse {
        self.transport
            .send(ApiRequest::get(EndpointFamily::Public, path))
            .await
    }

    pub async fn list_categories(&self) -> ApiResponse {
        self.get("categories".into()).await
    }

    pub async fn get_category(&self, id: &CategoryId) -> ApiResponse {
        self.get(format!("categories/{id}")).await
    }

    pub async fn get_category_with_products(&self, id: &CategoryId) -> ApiResponse {
        self.get(format!("categories/{id}/products")).await
    }

    pub async fn list_subcategories(&self) -> ApiResponse {
        self.get("subcategories".into()).await
    }

    pub async fn get_subcategory(&self, id: &SubcategoryId) -> ApiResponse {
        self.get(format!("subcategories/{id}")).await
    }

    pub async fn get_subcategory_with_products(&self, id: &SubcategoryId) -> ApiResponse {
        self.get(format!("subcategories/{id}/products")).await
    }

    pub async fn list_products(&self, query: &ProductQuery) -> ApiResponse {
        match ApiRequest::get(EndpointFamily::Public, "products").query(query) {
            Ok(request) => self.transport.send(request).await,
            Err(err) => ApiResponse::rejected(ApiException::validation(err.to_string())),
        }
    }

    pub async fn get_product(&self, id: &ProductId) -> ApiResponse {
        self.get(format!("products/{id}")).await
    }

    pub async fn search_products(&self, text: &str) -> ApiResponse {
        let request =
            ApiRequest::get(EndpointFamily::Public, "products/search").query_pair("q", text);
        self.transport.send(request).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiException> {
        Ok(self.list_categories().await.into_result()?.extract_list())
    }

    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiException> {
        found(self.get_category(id).await, "category")
    }

    pub async fn category_products(
        &self,
        id: &CategoryId,
    ) -> Result<WithProducts<Category>, ApiException> {
        with_products(self.get_category_with_products(id).await, "category")
    }

    pub async fn subcategories(&self) -> Result<Vec<Subcategory>, ApiException> {
        Ok(self.list_subcategories().await.into_result()?.extract_list())
    }

    pub async fn subcategory(&self, id: &SubcategoryId) -> Result<Subcategory, ApiException> {
        found(self.get_subcategory(id).await, "subcategory")
    }

    pub async fn subcategory_products(
        &self,
        id: &SubcategoryId,
    ) -> Result<WithProducts<Subcategory>, ApiException> {
        with_products(self.get_subcategory_with_products(id).await, "subcategory")
    }

    pub async fn products(&self, query: &ProductQuery) -> Result<Listing<Product>, ApiException> {
        let response = self.list_products(query).await.into_result()?;
        Ok(Listing {
            items: response.extract_list(),
            total: response.total(),
        })
    }

    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiException> {
        found(self.get_product(id).await, "product")
    }

    pub async fn search(&self, text: &str) -> Result<Vec<Product>, ApiException> {
        Ok(self.search_products(text).await.into_result()?.extract_list())
    }
}

pub(crate) fn found<T: DeserializeOwned>(
    response: ApiResponse,
    kind: &str,
) -> Result<T, ApiException> {
    response
        .into_result()?
        .extract_item()
        .ok_or_else(|| ApiException::new(ErrorCode::NotFound, format!("{kind} not found")))
}

fn with_products<T: DeserializeOwned>(
    response: ApiResponse,
    kind: &str,
) -> Result<WithProducts<T>, ApiException> {
    let response = response.into_result()?;
    let parent = response
        .extract_item()
        .ok_or_else(|| ApiException::new(ErrorCode::NotFound, format!("{kind} not found")))?;
    Ok(WithProducts {
        parent,
        products: response.extract_list(),
    })
}
