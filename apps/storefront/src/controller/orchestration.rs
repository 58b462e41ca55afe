//! Runs console commands against the API and settles each into a screen
//! outcome.

use client_core::{FormOptions, UrbanSpaceClient};
use shared::{
    domain::{Category, CategoryId, Product, ProductId, Subcategory, SubcategoryId, User, UserId},
    error::ApiException,
    normalize::ApiResponse,
};
use tracing::{debug, warn};

use crate::{
    commands::{new_category, new_subcategory, AdminCommand, Command},
    controller::events::{ScreenOutcome, UiError, UiErrorContext, ADMIN_LOGIN_ROUTE},
};

const ADMIN_DASHBOARD_ROUTE: &str = "/admin/dashboard";
const ADMIN_PRODUCTS_ROUTE: &str = "/admin/products";
const ADMIN_CATEGORIES_ROUTE: &str = "/admin/categories";
const ADMIN_SUBCATEGORIES_ROUTE: &str = "/admin/subcategories";
const ADMIN_USERS_ROUTE: &str = "/admin/users";

pub async fn run(client: &UrbanSpaceClient, command: Command) -> ScreenOutcome {
    let storefront = &client.storefront;
    match command {
        Command::Categories => {
            let result = storefront.categories().await;
            settle(client, UiErrorContext::Catalog, result, render_categories).await
        }
        Command::Category { id } => {
            let result = storefront.category_products(&CategoryId::from(id)).await;
            settle(client, UiErrorContext::Catalog, result, |listing| {
                let mut lines = vec![format!("{} ({})", listing.parent.name, listing.parent.id)];
                lines.extend(render_products(listing.products));
                lines
            })
            .await
        }
        Command::Subcategories => {
            let result = storefront.subcategories().await;
            settle(client, UiErrorContext::Catalog, result, render_subcategories).await
        }
        Command::Subcategory { id } => {
            let result = storefront
                .subcategory_products(&SubcategoryId::from(id))
                .await;
            settle(client, UiErrorContext::Catalog, result, |listing| {
                let mut lines = vec![format!("{} ({})", listing.parent.name, listing.parent.id)];
                lines.extend(render_products(listing.products));
                lines
            })
            .await
        }
        Command::Products(filter) => {
            let result = storefront.products(&filter.to_query()).await;
            settle(client, UiErrorContext::Catalog, result, |listing| {
                let shown = listing.items.len();
                let mut lines = render_products(listing.items);
                if let Some(total) = listing.total {
                    lines.push(format!("showing {shown} of {total}"));
                }
                lines
            })
            .await
        }
        Command::Product { id } => {
            let result = storefront.product(&ProductId::from(id)).await;
            settle(client, UiErrorContext::Catalog, result, |product| {
                render_products(vec![product])
            })
            .await
        }
        Command::Search { text } => {
            let result = storefront.search(&text).await;
            settle(client, UiErrorContext::Catalog, result, render_products).await
        }
        Command::Admin(admin) => run_admin(client, admin).await,
    }
}

async fn run_admin(client: &UrbanSpaceClient, command: AdminCommand) -> ScreenOutcome {
    let admin = &client.admin;
    match command {
        AdminCommand::Login { email, password } => match admin.login(&email, &password).await {
            Ok(response) if response.success => ScreenOutcome::Saved {
                message: "Signed in".to_string(),
                next: ADMIN_DASHBOARD_ROUTE.to_string(),
            },
            Ok(response) => fail(client, UiErrorContext::Login, exception_of(&response)).await,
            Err(err) => {
                warn!(%err, "failed to persist admin session");
                ScreenOutcome::Banner(UiError::from_exception(
                    UiErrorContext::Login,
                    &ApiException::new(shared::error::ErrorCode::Http, err.to_string()),
                ))
            }
        },
        AdminCommand::Logout => {
            if let Err(err) = admin.logout().await {
                warn!(%err, "failed to clear admin session");
            }
            ScreenOutcome::Redirect(ADMIN_LOGIN_ROUTE.to_string())
        }
        AdminCommand::Users => {
            let result = admin.users().await;
            settle(client, UiErrorContext::AdminList, result, render_users).await
        }
        AdminCommand::DeleteUser { id } => {
            let response = admin.delete_user(&UserId::from(id)).await;
            mutate(client, response, "User deleted", ADMIN_USERS_ROUTE).await
        }
        AdminCommand::FormOptions => {
            let result = admin.product_form_options().await;
            settle(client, UiErrorContext::AdminForm, result, render_form_options).await
        }
        AdminCommand::CreateProduct(form) => {
            let response = admin.create_product(&form.to_new_product()).await;
            mutate(client, response, "Product created", ADMIN_PRODUCTS_ROUTE).await
        }
        AdminCommand::UpdateProduct { id, form } => {
            let response = admin
                .update_product(&ProductId::from(id), &form.to_update())
                .await;
            mutate(client, response, "Product updated", ADMIN_PRODUCTS_ROUTE).await
        }
        AdminCommand::DeleteProduct { id } => {
            let response = admin.delete_product(&ProductId::from(id)).await;
            mutate(client, response, "Product deleted", ADMIN_PRODUCTS_ROUTE).await
        }
        AdminCommand::CreateCategory { name } => {
            let response = admin.create_category(&new_category(&name)).await;
            mutate(client, response, "Category created", ADMIN_CATEGORIES_ROUTE).await
        }
        AdminCommand::DeleteCategory { id } => {
            let response = admin.delete_category(&CategoryId::from(id)).await;
            mutate(client, response, "Category deleted", ADMIN_CATEGORIES_ROUTE).await
        }
        AdminCommand::CreateSubcategory { name, categories } => {
            let response = admin
                .create_subcategory(&new_subcategory(&name, &categories))
                .await;
            mutate(
                client,
                response,
                "Subcategory created",
                ADMIN_SUBCATEGORIES_ROUTE,
            )
            .await
        }
        AdminCommand::DeleteSubcategory { id } => {
            let response = admin.delete_subcategory(&SubcategoryId::from(id)).await;
            mutate(
                client,
                response,
                "Subcategory deleted",
                ADMIN_SUBCATEGORIES_ROUTE,
            )
            .await
        }
    }
}

async fn settle<T>(
    client: &UrbanSpaceClient,
    context: UiErrorContext,
    result: Result<T, ApiException>,
    render: impl FnOnce(T) -> Vec<String>,
) -> ScreenOutcome {
    match result {
        Ok(value) => ScreenOutcome::Render(render(value)),
        Err(exception) => fail(client, context, exception).await,
    }
}

/// Successful writes confirm and navigate away; failed writes stay on the
/// form with the error inline.
async fn mutate(
    client: &UrbanSpaceClient,
    response: ApiResponse,
    fallback_message: &str,
    next: &str,
) -> ScreenOutcome {
    if response.success {
        return ScreenOutcome::Saved {
            message: response
                .message
                .unwrap_or_else(|| fallback_message.to_string()),
            next: next.to_string(),
        };
    }
    fail(client, UiErrorContext::AdminForm, exception_of(&response)).await
}

async fn fail(
    client: &UrbanSpaceClient,
    context: UiErrorContext,
    exception: ApiException,
) -> ScreenOutcome {
    let error = UiError::from_exception(context, &exception);
    if context.is_protected() && error.requires_reauth() {
        debug!(
            ?context,
            status = ?exception.status,
            "admin session rejected; redirecting to login"
        );
        if let Err(err) = client.admin.logout().await {
            warn!(%err, "failed to clear rejected admin session");
        }
        return ScreenOutcome::Redirect(ADMIN_LOGIN_ROUTE.to_string());
    }
    ScreenOutcome::Banner(error)
}

fn exception_of(response: &ApiResponse) -> ApiException {
    response
        .to_exception()
        .unwrap_or_else(|| ApiException::new(shared::error::ErrorCode::Http, "Request failed"))
}

fn render_categories(categories: Vec<Category>) -> Vec<String> {
    categories
        .into_iter()
        .map(|category| format!("{}  {}", category.id, category.name))
        .collect()
}

fn render_subcategories(subcategories: Vec<Subcategory>) -> Vec<String> {
    subcategories
        .into_iter()
        .map(|sub| {
            let owners: Vec<String> = sub.categories.iter().map(|c| c.id().0).collect();
            format!("{}  {}  [{}]", sub.id, sub.name, owners.join(", "))
        })
        .collect()
}

fn render_products(products: Vec<Product>) -> Vec<String> {
    products
        .into_iter()
        .map(|product| {
            let stock = match product.in_stock {
                Some(false) => "  (out of stock)",
                _ => "",
            };
            format!("{}  {}  ${:.2}{stock}", product.id, product.name, product.price)
        })
        .collect()
}

fn render_users(users: Vec<User>) -> Vec<String> {
    users
        .into_iter()
        .map(|user| format!("{}  {} <{}>  {:?}", user.id, user.name, user.email, user.role))
        .collect()
}

fn render_form_options(options: FormOptions) -> Vec<String> {
    let mut lines = vec!["categories:".to_string()];
    lines.extend(render_categories(options.categories));
    lines.push("subcategories:".to_string());
    lines.extend(render_subcategories(options.subcategories));
    lines
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
