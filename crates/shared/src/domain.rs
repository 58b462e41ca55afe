use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(CategoryId);
id_newtype!(SubcategoryId);
id_newtype!(ProductId);
id_newtype!(UserId);

/// A related record as the API returns it: either a bare id or the populated
/// document, depending on whether the backend joined it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<I, T> {
    Id(I),
    Populated(T),
}

impl<I: Clone, T: HasId<Id = I>> Reference<I, T> {
    pub fn id(&self) -> I {
        match self {
            Self::Id(id) => id.clone(),
            Self::Populated(record) => record.id().clone(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Populated(record) => Some(record),
        }
    }
}

pub trait HasId {
    type Id;

    fn id(&self) -> &Self::Id;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_categories: Vec<Reference<SubcategoryId, Subcategory>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Reference<ProductId, Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Reference<CategoryId, Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Reference<CategoryId, Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<Reference<SubcategoryId, Subcategory>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Customer,
    /// Any role this client does not know about.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HasId for Category {
    type Id = CategoryId;

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

impl HasId for Subcategory {
    type Id = SubcategoryId;

    fn id(&self) -> &SubcategoryId {
        &self.id
    }
}

impl HasId for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}
