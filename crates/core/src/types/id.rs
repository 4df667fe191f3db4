//! Newtype IDs for type-safe entity references.
//!
//! The remote API identifies every entity with an opaque document id string.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! mixing ids from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use milk_delivery_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer = CustomerId::new("66a1f0");
/// let invoice = InvoiceId::new("66a1f0");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice;
/// assert_eq!(customer.as_str(), invoice.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(PackageId);
define_id!(BrandId);
define_id!(OrderId);
define_id!(OrderItemId);
define_id!(CartItemId);

impl From<ProductId> for CartItemId {
    fn from(id: ProductId) -> Self {
        Self(id.into_inner())
    }
}

impl From<PackageId> for CartItemId {
    fn from(id: PackageId) -> Self {
        Self(id.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");

        let parsed: OrderId = serde_json::from_str("\"66b0c1\"").unwrap();
        assert_eq!(parsed.as_str(), "66b0c1");
    }

    #[test]
    fn test_id_display() {
        let id = OrderItemId::from("item-9");
        assert_eq!(id.to_string(), "item-9");
    }

    #[test]
    fn test_cart_item_id_from_catalog_ids() {
        assert_eq!(CartItemId::from(ProductId::new("p1")).as_str(), "p1");
        assert_eq!(CartItemId::from(PackageId::new("k1")).as_str(), "k1");
    }
}
