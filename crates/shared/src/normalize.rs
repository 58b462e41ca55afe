//! Classification and extraction for the API's response envelopes.
//!
//! Every response carries `{success, message?, error?}` plus at most one body
//! shape. The shape is decided once, in [`ApiResponse::from_value`], and
//! callers read data through [`ApiResponse::extract_list`] and
//! [`ApiResponse::extract_item`] without branching on it.
//!
//! Precedence is fixed: a bare list (an `items` array with no `category` or
//! `subCategory` sibling) is checked first, then a single `item`, then the
//! category-with-products pair, then the subcategory-with-products pair. The
//! narrow list predicate is what keeps a category-products payload from being
//! read as a plain list.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ApiException, ErrorCode, MALFORMED_BODY, NETWORK_ERROR, NOT_AUTHENTICATED};

const SUCCESS: &str = "success";
const MESSAGE: &str = "message";
const ERROR: &str = "error";
const ITEMS: &str = "items";
const ITEM: &str = "item";
const TOTAL: &str = "total";
const CATEGORY: &str = "category";
const SUB_CATEGORY: &str = "subCategory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    List,
    Item,
    CategoryProducts,
    SubcategoryProducts,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    List {
        items: Vec<Value>,
        total: Option<u64>,
    },
    Item(Value),
    CategoryProducts {
        category: Value,
        items: Vec<Value>,
    },
    SubcategoryProducts {
        sub_category: Value,
        items: Vec<Value>,
    },
    Unrecognized,
}

impl ResponseBody {
    pub fn shape(&self) -> ResponseShape {
        match self {
            Self::List { .. } => ResponseShape::List,
            Self::Item(_) => ResponseShape::Item,
            Self::CategoryProducts { .. } => ResponseShape::CategoryProducts,
            Self::SubcategoryProducts { .. } => ResponseShape::SubcategoryProducts,
            Self::Unrecognized => ResponseShape::Unrecognized,
        }
    }
}

pub fn classify(payload: &Value) -> ResponseShape {
    let Some(object) = payload.as_object() else {
        return ResponseShape::Unrecognized;
    };

    let has_items = object.get(ITEMS).is_some_and(Value::is_array);
    let has_category = is_present(object.get(CATEGORY));
    let has_sub_category = is_present(object.get(SUB_CATEGORY));

    if has_items && !has_category && !has_sub_category {
        ResponseShape::List
    } else if object.get(ITEM).is_some_and(is_non_empty) {
        ResponseShape::Item
    } else if has_category && has_items {
        ResponseShape::CategoryProducts
    } else if has_sub_category && has_items {
        ResponseShape::SubcategoryProducts
    } else {
        ResponseShape::Unrecognized
    }
}

fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    /// HTTP status as observed by the transport; `None` when no response
    /// was received or the envelope was built locally.
    pub status: Option<u16>,
    body: ResponseBody,
    extra: Map<String, Value>,
    failure: Option<ErrorCode>,
}

impl ApiResponse {
    /// Decodes an envelope, classifying its body exactly once.
    pub fn from_value(status: Option<u16>, payload: Value) -> Self {
        let shape = classify(&payload);
        let mut object = match payload {
            Value::Object(object) => object,
            _ => Map::new(),
        };

        let success = object
            .remove(SUCCESS)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let message = object.remove(MESSAGE).and_then(text);
        let error = object.remove(ERROR).and_then(text);

        let body = match shape {
            ResponseShape::List => ResponseBody::List {
                items: take_items(&mut object),
                total: object.remove(TOTAL).and_then(|v| v.as_u64()),
            },
            ResponseShape::Item => {
                ResponseBody::Item(object.remove(ITEM).unwrap_or(Value::Null))
            }
            ResponseShape::CategoryProducts => ResponseBody::CategoryProducts {
                category: object.remove(CATEGORY).unwrap_or(Value::Null),
                items: take_items(&mut object),
            },
            ResponseShape::SubcategoryProducts => ResponseBody::SubcategoryProducts {
                sub_category: object.remove(SUB_CATEGORY).unwrap_or(Value::Null),
                items: take_items(&mut object),
            },
            ResponseShape::Unrecognized => ResponseBody::Unrecognized,
        };

        let failure = if success {
            None
        } else {
            Some(status.map_or(ErrorCode::Http, ErrorCode::from_status))
        };

        Self {
            success,
            message,
            error,
            status,
            body,
            extra: object,
            failure,
        }
    }

    /// Failure envelope for a non-2xx status. Server-provided `message` and
    /// `error` are kept when the body had them.
    pub fn http_failure(status: u16, payload: Value) -> Self {
        let mut response = Self::from_value(Some(status), payload);
        response.success = false;
        response.failure = Some(ErrorCode::from_status(status));
        if response.message.is_none() {
            response.message = Some(format!("Request failed with status {status}"));
        }
        response
    }

    pub fn malformed_body(status: u16) -> Self {
        Self::local_failure(
            Some(status),
            ErrorCode::MalformedBody,
            MALFORMED_BODY.to_string(),
            None,
        )
    }

    pub fn network_error(detail: impl Into<String>) -> Self {
        Self::local_failure(
            None,
            ErrorCode::Network,
            detail.into(),
            Some(NETWORK_ERROR.to_string()),
        )
    }

    pub fn not_authenticated() -> Self {
        Self::local_failure(
            Some(401),
            ErrorCode::Unauthorized,
            NOT_AUTHENTICATED.to_string(),
            Some(NOT_AUTHENTICATED.to_string()),
        )
    }

    pub fn rejected(exception: ApiException) -> Self {
        Self::local_failure(
            exception.status,
            exception.code,
            exception.message,
            exception.error,
        )
    }

    fn local_failure(
        status: Option<u16>,
        code: ErrorCode,
        message: String,
        error: Option<String>,
    ) -> Self {
        Self {
            success: false,
            message: Some(message),
            error,
            status,
            body: ResponseBody::Unrecognized,
            extra: Map::new(),
            failure: Some(code),
        }
    }

    pub fn shape(&self) -> ResponseShape {
        self.body.shape()
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn items(&self) -> &[Value] {
        match &self.body {
            ResponseBody::List { items, .. }
            | ResponseBody::CategoryProducts { items, .. }
            | ResponseBody::SubcategoryProducts { items, .. } => items,
            ResponseBody::Item(_) | ResponseBody::Unrecognized => &[],
        }
    }

    pub fn item(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Item(item) => Some(item),
            ResponseBody::CategoryProducts { category, .. } => Some(category),
            ResponseBody::SubcategoryProducts { sub_category, .. } => Some(sub_category),
            ResponseBody::List { .. } | ResponseBody::Unrecognized => None,
        }
    }

    pub fn total(&self) -> Option<u64> {
        match &self.body {
            ResponseBody::List { total, .. } => *total,
            _ => None,
        }
    }

    /// The contained list, decoded. Entries that do not decode as `T` are
    /// skipped; shapes without a list yield an empty vector.
    pub fn extract_list<T: DeserializeOwned>(&self) -> Vec<T> {
        self.items()
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match T::deserialize(value) {
                Ok(decoded) => Some(decoded),
                Err(error) => {
                    warn!(index, %error, shape = ?self.shape(), "skipping undecodable list entry");
                    None
                }
            })
            .collect()
    }

    pub fn extract_item<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.item()?;
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                warn!(%error, shape = ?self.shape(), "item did not decode");
                None
            }
        }
    }

    /// Decodes the envelope fields that belong to no known shape, such as
    /// the `token` of a login response.
    pub fn extract_extra<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&Value::Object(self.extra.clone())).ok()
    }

    pub fn failure_code(&self) -> Option<ErrorCode> {
        self.failure
    }

    pub fn requires_login(&self) -> bool {
        self.failure.is_some_and(ErrorCode::requires_login)
    }

    pub fn to_exception(&self) -> Option<ApiException> {
        let code = self.failure?;
        Some(ApiException {
            code,
            status: self.status,
            message: self
                .message
                .clone()
                .or_else(|| self.error.clone())
                .unwrap_or_else(|| "Request failed".to_string()),
            error: self.error.clone(),
        })
    }

    pub fn into_result(self) -> Result<Self, ApiException> {
        match self.to_exception() {
            Some(exception) => Err(exception),
            None => Ok(self),
        }
    }
}

fn take_items(object: &mut Map<String, Value>) -> Vec<Value> {
    match object.remove(ITEMS) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
