//! Screen outcomes and error modeling for the console controller.

use shared::error::{ApiException, ErrorCode};

pub const ADMIN_LOGIN_ROUTE: &str = "/admin/login";

/// What the console does next after a command settles.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOutcome {
    Render(Vec<String>),
    Banner(UiError),
    Redirect(String),
    /// Transient confirmation shown before navigating to `next`.
    Saved {
        message: String,
        next: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    NotFound,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Catalog,
    Login,
    AdminList,
    AdminForm,
}

impl UiErrorContext {
    /// Screens behind the admin login; auth failures there send the user
    /// back to the login screen.
    pub fn is_protected(self) -> bool {
        matches!(self, Self::AdminList | Self::AdminForm)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_exception(context: UiErrorContext, exception: &ApiException) -> Self {
        let category = match exception.code {
            ErrorCode::Unauthorized | ErrorCode::Forbidden => UiErrorCategory::Auth,
            ErrorCode::Network => UiErrorCategory::Transport,
            ErrorCode::Validation => UiErrorCategory::Validation,
            ErrorCode::NotFound => UiErrorCategory::NotFound,
            ErrorCode::MalformedBody | ErrorCode::Http => UiErrorCategory::Server,
        };

        Self {
            category,
            context,
            message: exception.message.clone(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn banner_text(&self) -> String {
        match self.category {
            UiErrorCategory::Transport => {
                format!("Server unreachable; check the API URL and retry. ({})", self.message)
            }
            _ => self.message.clone(),
        }
    }
}
