use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::{Category, CategoryId, ProductId, Subcategory, SubcategoryId, User, UserId},
    error::{ApiException, ErrorCode},
    normalize::ApiResponse,
    protocol::{
        LoginRequest, LoginResponse, NewCategory, NewProduct, NewSubcategory, ProductUpdate,
        UserUpdate,
    },
};
use tracing::{debug, info, warn};

use crate::{
    session::{AdminSession, SessionError},
    storefront::{found, StorefrontClient},
    transport::{ApiRequest, ApiTransport, EndpointFamily},
};

/// Everything the product form needs before it can render its pickers.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
}

/// Management operations. Every call except `login` carries the session's
/// bearer token and short-circuits locally when there is none.
#[derive(Clone)]
pub struct AdminClient {
    transport: ApiTransport,
    catalog: StorefrontClient,
    session: Arc<AdminSession>,
}

impl AdminClient {
    pub fn new(transport: ApiTransport, session: Arc<AdminSession>) -> Self {
        Self {
            catalog: StorefrontClient::new(transport.clone()),
            transport,
            session,
        }
    }

    pub fn session(&self) -> &Arc<AdminSession> {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse, SessionError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        if let Err(rejection) = credentials.validate() {
            return Ok(ApiResponse::rejected(rejection));
        }
        let request = ApiRequest::post(EndpointFamily::Admin, "auth/login").json(&credentials);
        let request = match request {
            Ok(request) => request,
            Err(err) => return Ok(ApiResponse::rejected(ApiException::validation(err.to_string()))),
        };

        let response = self.transport.send(request).await;
        if !response.success {
            return Ok(response);
        }

        let login = response
            .extract_extra::<LoginResponse>()
            .or_else(|| response.extract_item::<LoginResponse>());
        let Some(login) = login else {
            warn!("login succeeded but the response carried no token");
            return Ok(ApiResponse::rejected(ApiException::new(
                ErrorCode::MalformedBody,
                "login response did not include a token",
            )));
        };

        self.session.login(login.token).await?;
        info!(email, "admin logged in");
        Ok(response)
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        self.session.logout().await
    }

    async fn send_authed(&self, request: ApiRequest) -> ApiResponse {
        let Some(token) = self.session.token().await else {
            debug!(path = %request.path, "admin request without a session");
            return ApiResponse::not_authenticated();
        };
        self.transport.send(request.bearer(token)).await
    }

    async fn submit<T: Serialize>(
        &self,
        request: ApiRequest,
        body: &T,
        validation: Result<(), ApiException>,
    ) -> ApiResponse {
        if let Err(rejection) = validation {
            return ApiResponse::rejected(rejection);
        }
        match request.json(body) {
            Ok(request) => self.send_authed(request).await,
            Err(err) => ApiResponse::rejected(ApiException::validation(err.to_string())),
        }
    }

    pub async fn create_product(&self, product: &NewProduct) -> ApiResponse {
        let request = ApiRequest::post(EndpointFamily::Admin, "products");
        self.submit(request, product, product.validate()).await
    }

    pub async fn update_product(&self, id: &ProductId, update: &ProductUpdate) -> ApiResponse {
        let request = ApiRequest::put(EndpointFamily::Admin, format!("products/{id}"));
        self.submit(request, update, update.validate()).await
    }

    pub async fn delete_product(&self, id: &ProductId) -> ApiResponse {
        self.send_authed(ApiRequest::delete(
            EndpointFamily::Admin,
            format!("products/{id}"),
        ))
        .await
    }

    pub async fn create_category(&self, category: &NewCategory) -> ApiResponse {
        let request = ApiRequest::post(EndpointFamily::Admin, "categories");
        self.submit(request, category, category.validate()).await
    }

    pub async fn update_category(&self, id: &CategoryId, category: &NewCategory) -> ApiResponse {
        let request = ApiRequest::put(EndpointFamily::Admin, format!("categories/{id}"));
        self.submit(request, category, category.validate()).await
    }

    pub async fn delete_category(&self, id: &CategoryId) -> ApiResponse {
        self.send_authed(ApiRequest::delete(
            EndpointFamily::Admin,
            format!("categories/{id}"),
        ))
        .await
    }

    pub async fn create_subcategory(&self, subcategory: &NewSubcategory) -> ApiResponse {
        let request = ApiRequest::post(EndpointFamily::Admin, "subcategories");
        self.submit(request, subcategory, subcategory.validate())
            .await
    }

    pub async fn update_subcategory(
        &self,
        id: &SubcategoryId,
        subcategory: &NewSubcategory,
    ) -> ApiResponse {
        let request = ApiRequest::put(EndpointFamily::Admin, format!("subcategories/{id}"));
        self.submit(request, subcategory, subcategory.validate())
            .await
    }

    pub async fn delete_subcategory(&self, id: &SubcategoryId) -> ApiResponse {
        self.send_authed(ApiRequest::delete(
            EndpointFamily::Admin,
            format!("subcategories/{id}"),
        ))
        .await
    }

    pub async fn list_users(&self) -> ApiResponse {
        self.send_authed(ApiRequest::get(EndpointFamily::Admin, "users"))
            .await
    }

    pub async fn get_user(&self, id: &UserId) -> ApiResponse {
        self.send_authed(ApiRequest::get(EndpointFamily::Admin, format!("users/{id}")))
            .await
    }

    pub async fn update_user(&self, id: &UserId, update: &UserUpdate) -> ApiResponse {
        let request = ApiRequest::put(EndpointFamily::Admin, format!("users/{id}"));
        self.submit(request, update, update.validate()).await
    }

    pub async fn delete_user(&self, id: &UserId) -> ApiResponse {
        self.send_authed(ApiRequest::delete(
            EndpointFamily::Admin,
            format!("users/{id}"),
        ))
        .await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiException> {
        Ok(self.list_users().await.into_result()?.extract_list())
    }

    pub async fn user(&self, id: &UserId) -> Result<User, ApiException> {
        found(self.get_user(id).await, "user")
    }

    /// Loads categories and subcategories concurrently; either failure fails
    /// the whole form.
    pub async fn product_form_options(&self) -> Result<FormOptions, ApiException> {
        let (categories, subcategories) =
            futures::join!(self.catalog.categories(), self.catalog.subcategories());
        Ok(FormOptions {
            categories: categories?,
            subcategories: subcategories?,
        })
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
