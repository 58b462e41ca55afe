//! Console commands parsed from the command line.

use clap::{Args, Subcommand};
use shared::{
    domain::{CategoryId, SubcategoryId},
    protocol::{NewCategory, NewProduct, NewSubcategory, ProductQuery, ProductUpdate},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List all categories.
    Categories,
    /// Show one category and its products.
    Category { id: String },
    Subcategories,
    /// Show one subcategory and its products.
    Subcategory { id: String },
    Products(ProductFilter),
    Product { id: String },
    Search { text: String },
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProductFilter {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub sub_category: Option<String>,
    #[arg(long)]
    pub sort: Option<String>,
}

impl ProductFilter {
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            page: self.page,
            limit: self.limit,
            category: self.category.as_deref().map(CategoryId::from),
            sub_category: self.sub_category.as_deref().map(SubcategoryId::from),
            sort: self.sort.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Users,
    DeleteUser {
        id: String,
    },
    /// Categories and subcategories for the product form.
    FormOptions,
    CreateProduct(ProductForm),
    UpdateProduct {
        id: String,
        #[command(flatten)]
        form: ProductPatch,
    },
    DeleteProduct {
        id: String,
    },
    CreateCategory {
        #[arg(long)]
        name: String,
    },
    DeleteCategory {
        id: String,
    },
    CreateSubcategory {
        #[arg(long)]
        name: String,
        /// Owning category; repeat for several.
        #[arg(long = "category")]
        categories: Vec<String>,
    },
    DeleteSubcategory {
        id: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProductForm {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "image")]
    pub images: Vec<String>,
    #[arg(long)]
    pub in_stock: Option<bool>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub sub_category: Option<String>,
}

impl ProductForm {
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            images: self.images.clone(),
            in_stock: self.in_stock,
            category: self.category.as_deref().map(CategoryId::from),
            sub_category: self.sub_category.as_deref().map(SubcategoryId::from),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProductPatch {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub in_stock: Option<bool>,
}

impl ProductPatch {
    pub fn to_update(&self) -> ProductUpdate {
        ProductUpdate {
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            in_stock: self.in_stock,
            ..ProductUpdate::default()
        }
    }
}

pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.to_string(),
    }
}

pub fn new_subcategory(name: &str, categories: &[String]) -> NewSubcategory {
    NewSubcategory {
        name: name.to_string(),
        categories: categories.iter().map(|c| CategoryId::from(c.as_str())).collect(),
    }
}
