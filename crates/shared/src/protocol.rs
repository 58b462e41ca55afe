use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{CategoryId, Role, SubcategoryId, User},
    error::ApiException,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiException> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiException::validation("email and password are required"));
        }
        Ok(())
    }
}

/// Only `token` is required; a `user` that does not match [`User`] is
/// dropped rather than failing the login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(
        default,
        deserialize_with = "lenient_user",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<User>,
}

fn lenient_user<'de, D>(deserializer: D) -> Result<Option<User>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| User::deserialize(value).ok()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubcategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubcategoryId>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ApiException> {
        validate_name("product", &self.name)?;
        validate_price(self.price)
    }
}

/// Partial update; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubcategoryId>,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), ApiException> {
        if let Some(name) = &self.name {
            validate_name("product", name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), ApiException> {
        validate_name("category", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSubcategory {
    pub name: String,
    pub categories: Vec<CategoryId>,
}

impl NewSubcategory {
    pub fn validate(&self) -> Result<(), ApiException> {
        validate_name("subcategory", &self.name)?;
        if self.categories.is_empty() {
            return Err(ApiException::validation(
                "subcategory must belong to at least one category",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ApiException> {
        if let Some(name) = &self.name {
            validate_name("user", name)?;
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ApiException::validation("email address is invalid"));
            }
        }
        if self.role == Some(Role::Unknown) {
            return Err(ApiException::validation("role must be admin or customer"));
        }
        Ok(())
    }
}

fn validate_name(kind: &str, name: &str) -> Result<(), ApiException> {
    if name.trim().is_empty() {
        return Err(ApiException::validation(format!("{kind} name is required")));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiException> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiException::validation("price must be a non-negative number"));
    }
    Ok(())
}
