//! Catalog fixtures
//!
//! A YAML stand-in for the catalog service, keyed by model id:
//!
//! ```yaml
//! phones:
//!   Pixel 8:
//!     brand: Google
//!     name: Pixel 8
//!     price: "699.00"
//!     image: https://img.example/pixel-8.png
//!     id: "41"
//! ```

use std::{fs, io, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::lines::{InvalidArgument, Product, validate_product};

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The YAML could not be parsed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_norway::Error),

    /// A product entry is not usable.
    #[error("invalid catalog entry: {0}")]
    InvalidProduct(#[from] InvalidArgument),

    /// No product with this model id.
    #[error("unknown model: {0}")]
    UnknownModel(String),
}

/// Wrapper for phones in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    phones: FxHashMap<String, PhoneFixture>,
}

/// Phone Fixture
#[derive(Debug, Deserialize)]
struct PhoneFixture {
    brand: String,
    name: String,
    price: Decimal,
    #[serde(default)]
    image: String,
    #[serde(default)]
    id: Option<String>,
}

impl PhoneFixture {
    fn into_product(self, model_id: String) -> Product {
        Product {
            model_id,
            brand: self.brand,
            display_name: self.name,
            unit_price: self.price,
            image_url: self.image,
            catalog_id: self.id,
        }
    }
}

/// Products available to add to the cart.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<String, Product>,
}

impl Catalog {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the YAML is malformed or a product has an
    /// empty model id or a negative price.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let mut products = FxHashMap::default();

        for (model_id, phone) in fixture.phones {
            let product = phone.into_product(model_id.clone());
            validate_product(&product)?;
            products.insert(model_id, product);
        }

        Ok(Self { products })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();

        let yaml = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&yaml)
    }

    /// Look up a product by model id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownModel`] if the catalog does not list it.
    pub fn product(&self, model_id: &str) -> Result<&Product, CatalogError> {
        self.products
            .get(model_id)
            .ok_or_else(|| CatalogError::UnknownModel(model_id.to_string()))
    }

    /// Products ordered by model id
    pub fn products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by(|a, b| a.model_id.cmp(&b.model_id));

        products
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog lists nothing
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    const YAML: &str = r#"
phones:
  Pixel 8:
    brand: Google
    name: Pixel 8
    price: "699.00"
    image: https://img.example/pixel-8.png
    id: "41"
  Galaxy S24:
    brand: Samsung
    name: Galaxy S24
    price: 799.99
"#;

    #[test]
    fn parses_products_keyed_by_model() -> TestResult {
        let catalog = Catalog::from_yaml_str(YAML)?;

        let pixel = catalog.product("Pixel 8")?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(pixel.brand, "Google");
        assert_eq!(pixel.unit_price, Decimal::new(69_900, 2));
        assert_eq!(pixel.catalog_id.as_deref(), Some("41"));

        Ok(())
    }

    #[test]
    fn optional_fields_default() -> TestResult {
        let catalog = Catalog::from_yaml_str(YAML)?;

        let galaxy = catalog.product("Galaxy S24")?;

        assert_eq!(galaxy.unit_price, Decimal::new(79_999, 2));
        assert_eq!(galaxy.image_url, "");
        assert!(galaxy.catalog_id.is_none());

        Ok(())
    }

    #[test]
    fn unknown_model_is_an_error() -> TestResult {
        let catalog = Catalog::from_yaml_str(YAML)?;

        let result = catalog.product("Nokia 3310");

        assert!(
            matches!(result, Err(CatalogError::UnknownModel(ref model)) if model == "Nokia 3310"),
            "expected unknown model, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn negative_price_is_rejected() {
        let yaml = "phones:\n  Bad:\n    brand: X\n    name: Bad\n    price: \"-1\"\n";

        let result = Catalog::from_yaml_str(yaml);

        assert!(
            matches!(
                result,
                Err(CatalogError::InvalidProduct(InvalidArgument::NegativePrice(..)))
            ),
            "expected negative price, got {result:?}"
        );
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = Catalog::from_yaml_str("phones: [");

        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn products_are_sorted() -> TestResult {
        let catalog = Catalog::from_yaml_str(YAML)?;

        let models: Vec<&str> = catalog
            .products()
            .into_iter()
            .map(|product| product.model_id.as_str())
            .collect();

        assert_eq!(models, ["Galaxy S24", "Pixel 8"]);

        Ok(())
    }

    #[test]
    fn loads_from_file() -> TestResult {
        let mut file = NamedTempFile::new()?;
        file.write_all(YAML.as_bytes())?;

        let catalog = Catalog::from_path(file.path())?;

        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Catalog::from_path("/nonexistent/phones.yml");

        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
