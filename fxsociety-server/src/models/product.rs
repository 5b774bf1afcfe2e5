//! Product catalog models
//!
//! Request payloads deserialize into the raw `ProductCreate` / `ProductUpdate`
//! types and are validated into `NewProduct` / `ProductChanges` before they
//! reach the repository.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::validation::{optional_text, required_text};
use super::ValidationError;

const MAX_SLUG_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;
const MAX_SHORT_DESCRIPTION_LEN: usize = 500;
const MAX_CATEGORY_LEN: usize = 50;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("invalid slug regex"));

/// Validated product slug (URL segment)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// # Rules
    /// - Max 100 characters
    /// - Lowercase alphanumeric, hyphens, underscores
    /// - Must start with alphanumeric
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }
        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }
        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "must be lowercase alphanumeric with hyphens/underscores, starting with alphanumeric",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog sort order. Unknown values fall back to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("name") => Self::Name,
            _ => Self::Newest,
        }
    }

    /// ORDER BY clause for the products table (aliased `p`).
    pub fn order_clause(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price_idr ASC, p.id ASC",
            Self::PriceDesc => "p.price_idr DESC, p.id DESC",
            Self::Name => "p.title ASC, p.id ASC",
        }
    }
}

/// Public catalog filters
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: ProductSort,
}

/// Create product request
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub title: String,
    pub slug: String,
    pub description_short: String,
    pub description_full: Option<String>,
    pub price_idr: i64,
    pub category: String,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Validated product ready for insertion
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub slug: Slug,
    pub title: String,
    pub description_short: String,
    pub description_full: Option<String>,
    pub price_idr: i64,
    pub category: String,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_active: bool,
}

impl ProductCreate {
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            slug: Slug::new(&self.slug)?,
            title: required_text("title", &self.title, Some(MAX_TITLE_LEN))?,
            description_short: required_text(
                "description_short",
                &self.description_short,
                Some(MAX_SHORT_DESCRIPTION_LEN),
            )?,
            description_full: optional_text(self.description_full),
            price_idr: validate_price(self.price_idr)?,
            category: required_text("category", &self.category, Some(MAX_CATEGORY_LEN))?,
            badges: self.badges,
            images: self.images,
            is_active: self.is_active,
        })
    }
}

/// Partial product update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description_short: Option<String>,
    pub description_full: Option<String>,
    pub price_idr: Option<i64>,
    pub category: Option<String>,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Validated partial update
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub slug: Option<Slug>,
    pub description_short: Option<String>,
    pub description_full: Option<String>,
    pub price_idr: Option<i64>,
    pub category: Option<String>,
    pub badges: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    pub fn validate(self) -> Result<ProductChanges, ValidationError> {
        Ok(ProductChanges {
            title: self
                .title
                .map(|t| required_text("title", &t, Some(MAX_TITLE_LEN)))
                .transpose()?,
            slug: self.slug.map(|s| Slug::new(&s)).transpose()?,
            description_short: self
                .description_short
                .map(|d| required_text("description_short", &d, Some(MAX_SHORT_DESCRIPTION_LEN)))
                .transpose()?,
            description_full: self.description_full,
            price_idr: self.price_idr.map(validate_price).transpose()?,
            category: self
                .category
                .map(|c| required_text("category", &c, Some(MAX_CATEGORY_LEN)))
                .transpose()?,
            badges: self.badges,
            images: self.images,
            is_active: self.is_active,
        })
    }
}

fn validate_price(price: i64) -> Result<i64, ValidationError> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price_idr",
            min: 0,
            max: None,
        });
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> ProductCreate {
        ProductCreate {
            title: "Smart Trend Indicator".into(),
            slug: "smart-trend-indicator".into(),
            description_short: "Indikator tren".into(),
            description_full: None,
            price_idr: 299_000,
            category: "indikator".into(),
            badges: Some(vec!["popular".into()]),
            images: None,
            is_active: true,
        }
    }

    #[test]
    fn valid_slugs() {
        assert!(Slug::new("smart-trend-indicator").is_ok());
        assert!(Slug::new("ea_v2").is_ok());
        assert!(Slug::new("1st-book").is_ok());
    }

    #[test]
    fn invalid_slugs() {
        assert!(matches!(Slug::new(""), Err(ValidationError::Empty { .. })));
        assert!(matches!(
            Slug::new("Smart Trend"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Slug::new("-leading"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Slug::new(&"a".repeat(101)),
            Err(ValidationError::TooLong { max: 100, .. })
        ));
    }

    #[test]
    fn sort_parsing_falls_back_to_newest() {
        assert_eq!(ProductSort::parse(Some("price_asc")), ProductSort::PriceAsc);
        assert_eq!(ProductSort::parse(Some("price_desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::parse(Some("name")), ProductSort::Name);
        assert_eq!(ProductSort::parse(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::parse(None), ProductSort::Newest);
    }

    #[test]
    fn create_validates_fields() {
        let product = create_request().validate().unwrap();
        assert_eq!(product.slug.as_str(), "smart-trend-indicator");
        assert!(product.is_active);

        let mut req = create_request();
        req.price_idr = -1;
        assert!(matches!(
            req.validate(),
            Err(ValidationError::OutOfRange { field: "price_idr", .. })
        ));

        let mut req = create_request();
        req.title = "   ".into();
        assert!(matches!(
            req.validate(),
            Err(ValidationError::Empty { field: "title" })
        ));
    }

    #[test]
    fn is_active_defaults_to_true() {
        let req: ProductCreate = serde_json::from_str(
            r#"{"title":"T","slug":"t","description_short":"d","price_idr":1,"category":"ebook"}"#,
        )
        .unwrap();
        assert!(req.is_active);
    }

    #[test]
    fn update_leaves_absent_fields() {
        let changes = ProductUpdate {
            price_idr: Some(10),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.price_idr, Some(10));
        assert!(changes.title.is_none());
        assert!(changes.slug.is_none());
    }
}
