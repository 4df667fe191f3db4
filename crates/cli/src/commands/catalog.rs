//! Catalog browsing commands.

use milk_delivery_client::App;
use milk_delivery_core::{BrandId, Package, PackageId, Product, ProductId};

use super::{CliError, print_lines};

pub async fn products(app: &App, brand: Option<&str>) -> Result<(), CliError> {
    let products = match brand {
        Some(brand) => app.catalog().products_by_brand(&BrandId::new(brand)).await?,
        None => app.catalog().products().await?,
    };
    print_lines(products.iter().map(product_line))
}

pub async fn product(app: &App, id: &str) -> Result<(), CliError> {
    let product = app.catalog().product(&ProductId::new(id)).await?;
    let stock = product
        .stock_quantity
        .map_or_else(|| "-".to_owned(), |q| q.to_string());
    print_lines([
        product_line(&product),
        format!("Stock: {stock}"),
        product.description,
    ])
}

/// List packages, optionally only those matching `search`.
pub async fn packages(app: &App, search: Option<&str>) -> Result<(), CliError> {
    let packages = match search {
        Some(query) => app.search_packages(query).await?,
        None => app.catalog().packages().await?,
    };
    print_lines(packages.iter().map(package_line))
}

pub async fn package(app: &App, id: &str) -> Result<(), CliError> {
    let package = app.catalog().package(&PackageId::new(id)).await?;
    let mut lines = vec![package_line(&package)];
    if let Some(delivery) = &package.type_of_delivery {
        lines.push(format!("Delivery: {delivery}"));
    }
    if let Some(shipments) = package.number_of_shipment {
        lines.push(format!("Shipments: {shipments}"));
    }
    lines.extend(package.products.iter().map(|p| {
        format!(
            "  {} x{} @ {}",
            p.product.name,
            p.quantity,
            p.product.price.display()
        )
    }));
    print_lines(lines)
}

/// Print recent searches, or forget them.
pub async fn history(app: &App, clear: bool) -> Result<(), CliError> {
    if clear {
        app.search_history().clear().await?;
        return Ok(());
    }
    print_lines(app.search_history().entries().await?)
}

fn product_line(product: &Product) -> String {
    let brand = product
        .brand
        .as_ref()
        .and_then(|b| b.name())
        .map(|name| format!(" [{name}]"))
        .unwrap_or_default();
    format!(
        "{}  {}{}  {}",
        product.id,
        product.name,
        brand,
        product.price.display()
    )
}

fn package_line(package: &Package) -> String {
    format!(
        "{}  {}  {}",
        package.id,
        package.display_name(),
        package.effective_price().display()
    )
}
