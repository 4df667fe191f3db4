//! Catalog types: products and packages.

use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::{BrandId, PackageId, ProductId};
use super::price::Price;

/// Brand reference. Some endpoints return the bare id, others populate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<BrandId>,
        name: String,
    },
    Id(BrandId),
}

impl BrandRef {
    /// Brand name, when populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated { name, .. } => Some(name),
            Self::Id(_) => None,
        }
    }

    /// Brand id, when known.
    #[must_use]
    pub const fn id(&self) -> Option<&BrandId> {
        match self {
            Self::Populated { id, .. } => id.as_ref(),
            Self::Id(id) => Some(id),
        }
    }
}

/// A product as returned by `/api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default, rename = "brandID")]
    pub brand: Option<BrandRef>,
}

impl Product {
    /// Cart entry for this product.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone().into(),
            name: self.name.clone(),
            unit_price: self.price,
            image: self.product_image.clone(),
            brand_name: self.brand.as_ref().and_then(BrandRef::name).map(str::to_owned),
        }
    }

    /// Whether the product belongs to the given brand.
    #[must_use]
    pub fn is_brand(&self, brand: &BrandId) -> bool {
        self.brand.as_ref().and_then(BrandRef::id) == Some(brand)
    }
}

/// A product inside a package, with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageProduct {
    pub product: Product,
    pub quantity: u32,
}

/// A bundle of products sold together at a combined price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id")]
    pub id: PackageId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub products: Vec<PackageProduct>,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub type_of_delivery: Option<String>,
    #[serde(default)]
    pub number_of_shipment: Option<u32>,
    #[serde(default)]
    pub discount: Option<Price>,
    #[serde(default)]
    pub total_price_discount: Option<Price>,
}

impl Package {
    /// Display name: the explicit name, or the product names joined.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.products
                .iter()
                .map(|p| format!("{} x{}", p.product.name, p.quantity))
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    /// Price charged for one package: the listed total, or the sum of its
    /// products when the total is missing. `total_price_discount` is shown
    /// only and never charged.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.total_price.unwrap_or_else(|| {
            self.products
                .iter()
                .map(|p| p.product.price * p.quantity)
                .sum()
        })
    }

    /// Cart entry for this package.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone().into(),
            name: self.display_name(),
            unit_price: self.effective_price(),
            image: self
                .products
                .first()
                .and_then(|p| p.product.product_image.clone()),
            brand_name: None,
        }
    }
}

/// Packages containing a product whose name includes `query`, ignoring case.
/// A blank query matches every package.
#[must_use]
pub fn packages_matching<'a>(packages: &'a [Package], query: &str) -> Vec<&'a Package> {
    let needle = query.trim().to_lowercase();
    packages
        .iter()
        .filter(|pkg| {
            needle.is_empty()
                || pkg
                    .products
                    .iter()
                    .any(|p| p.product.name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Keep only products of `brand`.
#[must_use]
pub fn products_by_brand<'a>(products: &'a [Product], brand: &BrandId) -> Vec<&'a Product> {
    products.iter().filter(|p| p.is_brand(brand)).collect()
}
