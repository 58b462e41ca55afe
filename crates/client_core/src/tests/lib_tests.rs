use std::path::PathBuf;

use super::*;
use crate::stub_backend::{
    spawn_stub_backend, unreachable_base_url, ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_TOKEN,
};
use shared::{
    domain::{CategoryId, ProductId, SubcategoryId},
    error::ErrorCode,
    normalize::ResponseShape,
    protocol::ProductQuery,
};

fn client(base_url: &str) -> UrbanSpaceClient {
    UrbanSpaceClient::new(base_url, Arc::new(AdminSession::in_memory()))
}

#[tokio::test]
async fn categories_list_and_detail() {
    let (base_url, _state) = spawn_stub_backend().await;
    let client = client(&base_url);

    let response = client.storefront.list_categories().await;
    assert_eq!(response.shape(), ResponseShape::List);
    assert_eq!(response.total(), Some(2));

    let categories = client.storefront.categories().await.expect("categories");
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Living Room", "Bedroom"]);
    assert!(categories[0].created_at.is_some());

    let category = client
        .storefront
        .category(&CategoryId::from("c1"))
        .await
        .expect("category");
    assert_eq!(category.name, "Living Room");

    let err = client
        .storefront
        .category(&CategoryId::from("nope"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Category not found");
}

#[tokio::test]
async fn category_with_products_keeps_product_order() {
    let (base_url, state) = spawn_stub_backend().await;
    state.seed_product("Sofa", 899.0).await;
    state.seed_product("Side Table", 149.0).await;
    let client = client(&base_url);

    let response = client
        .storefront
        .get_category_with_products(&CategoryId::from("c1"))
        .await;
    assert_eq!(response.shape(), ResponseShape::CategoryProducts);

    let listing = client
        .storefront
        .category_products(&CategoryId::from("c1"))
        .await
        .expect("category products");
    assert_eq!(listing.parent.id, CategoryId::from("c1"));
    let names: Vec<&str> = listing.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Sofa", "Side Table"]);
}

#[tokio::test]
async fn subcategory_with_products_returns_subcategory_as_item() {
    let (base_url, state) = spawn_stub_backend().await;
    state.seed_product("Loveseat", 499.0).await;
    let client = client(&base_url);

    let listing = client
        .storefront
        .subcategory_products(&SubcategoryId::from("s1"))
        .await
        .expect("subcategory products");
    assert_eq!(listing.parent.name, "Sofas");
    assert_eq!(listing.products.len(), 1);
    assert!(listing.parent.categories[0].populated().is_some());

    let subcategories = client.storefront.subcategories().await.expect("list");
    assert_eq!(subcategories.len(), 1);
}

#[tokio::test]
async fn product_listing_forwards_filters_and_total() {
    let (base_url, state) = spawn_stub_backend().await;
    state.seed_product("Desk", 300.0).await;
    let client = client(&base_url);

    let listing = client
        .storefront
        .products(&ProductQuery {
            page: Some(2),
            limit: Some(12),
            sub_category: Some(SubcategoryId::from("s1")),
            ..ProductQuery::default()
        })
        .await
        .expect("products");

    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.total, Some(1));
    let queries = state.queries.lock().await;
    let query = queries.last().expect("query recorded");
    assert_eq!(query.get("page").map(String::as_str), Some("2"));
    assert_eq!(query.get("limit").map(String::as_str), Some("12"));
    assert_eq!(query.get("subCategory").map(String::as_str), Some("s1"));
    assert!(!query.contains_key("category"));
}

#[tokio::test]
async fn search_matches_product_names() {
    let (base_url, state) = spawn_stub_backend().await;
    state.seed_product("Oak Dining Table", 1200.0).await;
    state.seed_product("Wool Rug", 250.0).await;
    let client = client(&base_url);

    let hits = client.storefront.search("table").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Oak Dining Table");
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let (base_url, _state) = spawn_stub_backend().await;
    let client = client(&base_url);

    let response = client
        .storefront
        .get_product(&ProductId::from("ghost"))
        .await;
    assert!(!response.success);
    assert!(response.extract_item::<shared::domain::Product>().is_none());
}

#[tokio::test]
async fn typed_accessors_surface_network_failures() {
    let client = client(&unreachable_base_url().await);

    let err = client.storefront.categories().await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Network);
    assert_eq!(err.error.as_deref(), Some("Network error"));
}

#[tokio::test]
async fn from_settings_restores_persisted_session() {
    let (base_url, _state) = spawn_stub_backend().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session_file: PathBuf = dir.path().join("session.json");
    std::fs::write(
        &session_file,
        format!(r#"{{"{}":"{ADMIN_TOKEN}"}}"#, session::TOKEN_KEY),
    )
    .expect("seed session");

    let settings = ClientSettings {
        api_base_url: base_url,
        session_file,
    };
    let client = UrbanSpaceClient::from_settings(&settings).await;

    assert!(client.admin.session().is_authenticated().await);
    let users = client.admin.users().await.expect("users");
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn corrupt_session_file_still_allows_public_browsing() {
    let (base_url, _state) = spawn_stub_backend().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let session_file: PathBuf = dir.path().join("session.json");
    std::fs::write(&session_file, "{not json").expect("seed session");

    let settings = ClientSettings {
        api_base_url: base_url,
        session_file: session_file.clone(),
    };
    let client = UrbanSpaceClient::from_settings(&settings).await;

    assert!(!client.admin.session().is_authenticated().await);
    let categories = client.storefront.categories().await.expect("categories");
    assert_eq!(categories.len(), 2);

    let response = client
        .admin
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("session store");
    assert!(response.success);
    let raw = std::fs::read_to_string(&session_file).expect("session file");
    assert!(raw.contains(ADMIN_TOKEN));
}
