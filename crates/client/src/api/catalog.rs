//! Products and packages.
//!
//! The raw endpoint methods live on [`ApiClient`]. [`Catalog`] wraps them with
//! a short-lived `moka` cache, since the catalog is read far more often than
//! it changes.

use std::time::Duration;

use milk_delivery_core::{BrandId, Package, PackageId, Product, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::http::{ApiClient, Transport};
use crate::storage::KeyValueStore;

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// `GET /api/products/getAllProducts`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/api/products/getAllProducts").await
    }

    /// `GET /api/products/:id`
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.get(format!("/api/products/{id}")).await
    }

    /// `GET /api/packages/getAllPackages`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a package list.
    #[instrument(skip(self))]
    pub async fn packages(&self) -> Result<Vec<Package>, ApiError> {
        self.get("/api/packages/getAllPackages").await
    }

    /// `GET /api/packages/:id`
    ///
    /// # Errors
    ///
    /// Returns an error if the package does not exist or the request fails.
    #[instrument(skip(self), fields(package_id = %id))]
    pub async fn package(&self, id: &PackageId) -> Result<Package, ApiError> {
        self.get(format!("/api/packages/{id}")).await
    }
}

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Product(ProductId),
    Packages,
    Package(PackageId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Packages(Vec<Package>),
    Package(Box<Package>),
}

/// Cached, read-only view of the catalog.
pub struct Catalog<T, S> {
    client: ApiClient<T, S>,
    cache: Cache<CacheKey, CacheValue>,
}

impl<T, S> Clone for Catalog<T, S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<T, S> std::fmt::Debug for Catalog<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl<T, S> Catalog<T, S>
where
    T: Transport + 'static,
    S: KeyValueStore + 'static,
{
    /// Wrap `client`, caching reads for `ttl`.
    #[must_use]
    pub fn new(client: ApiClient<T, S>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(ttl)
            .build();
        Self { client, cache }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::products`].
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }
        let products = self.client.products().await?;
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// One product.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::product`].
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!(product_id = %id, "Cache hit for product");
            return Ok(*product);
        }
        let product = self.client.product(id).await?;
        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Products of one brand, in catalog order.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::products`].
    pub async fn products_by_brand(&self, brand: &BrandId) -> Result<Vec<Product>, ApiError> {
        let products = self.products().await?;
        Ok(milk_delivery_core::products_by_brand(&products, brand)
            .into_iter()
            .cloned()
            .collect())
    }

    /// All packages.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::packages`].
    pub async fn packages(&self) -> Result<Vec<Package>, ApiError> {
        if let Some(CacheValue::Packages(packages)) = self.cache.get(&CacheKey::Packages).await {
            debug!("Cache hit for packages");
            return Ok(packages);
        }
        let packages = self.client.packages().await?;
        self.cache
            .insert(CacheKey::Packages, CacheValue::Packages(packages.clone()))
            .await;
        Ok(packages)
    }

    /// One package.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::package`].
    pub async fn package(&self, id: &PackageId) -> Result<Package, ApiError> {
        let key = CacheKey::Package(id.clone());
        if let Some(CacheValue::Package(package)) = self.cache.get(&key).await {
            debug!(package_id = %id, "Cache hit for package");
            return Ok(*package);
        }
        let package = self.client.package(id).await?;
        self.cache
            .insert(key, CacheValue::Package(Box::new(package.clone())))
            .await;
        Ok(package)
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
