use booth_shared::{CreateFoodRequest, FoodCategory, UpdateFoodRequest};
use serde::Deserialize;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Food name is required")]
    MissingName,

    #[error("Food name is longer than 100 characters")]
    NameTooLong,

    #[error("Price must not be negative: {0}")]
    NegativePrice(i64),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Image must be an http(s) URL: {0}")]
    InvalidImage(String),
}

/// Admin form input for a new menu item.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Admin form input for editing a menu item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub sold_out: Option<bool>,
}

fn validate_name(name: &str) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CatalogError::NameTooLong);
    }
    Ok(name.to_string())
}

fn validate_price(price: i64) -> Result<i64, CatalogError> {
    if price < 0 {
        return Err(CatalogError::NegativePrice(price));
    }
    Ok(price)
}

fn validate_category(category: &str) -> Result<FoodCategory, CatalogError> {
    FoodCategory::parse(category).ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))
}

/// Blank images are dropped; anything else has to be a web URL.
fn validate_image(image: Option<&str>) -> Result<Option<String>, CatalogError> {
    match image.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            Ok(Some(url.to_string()))
        }
        Some(other) => Err(CatalogError::InvalidImage(other.to_string())),
    }
}

impl FoodDraft {
    pub fn validate(self) -> Result<CreateFoodRequest, CatalogError> {
        Ok(CreateFoodRequest {
            name: validate_name(&self.name)?,
            description: self.description.unwrap_or_default().trim().to_string(),
            price: validate_price(self.price)?,
            category: validate_category(&self.category)?,
            image: validate_image(self.image.as_deref())?,
        })
    }
}

impl FoodPatch {
    pub fn validate(self) -> Result<UpdateFoodRequest, CatalogError> {
        Ok(UpdateFoodRequest {
            name: self.name.as_deref().map(validate_name).transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
            price: self.price.map(validate_price).transpose()?,
            category: self.category.as_deref().map(validate_category).transpose()?,
            image: match self.image {
                // An explicit blank clears the image.
                Some(image) => Some(validate_image(Some(&image))?.unwrap_or_default()),
                None => None,
            },
            sold_out: self.sold_out,
        })
    }
}
