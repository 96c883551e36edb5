use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A fruit on sale. Rows are never removed; `is_deleted` hides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fruit {
    pub id: i64,
    pub name: String,
    pub price: i32,
    pub is_deleted: bool,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming fruit payload before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FruitBody {
    pub name: Option<String>,
    pub price: Option<i32>,
}

/// Validated values for creating or replacing a fruit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFruit {
    pub name: String,
    pub price: i32,
}

impl FruitBody {
    /// Check every field, collecting all violations instead of stopping at the first.
    pub fn validate(&self) -> Result<NewFruit, DomainError> {
        let mut errors = Vec::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push("name is required".to_string());
                None
            }
        };

        let price = match self.price {
            Some(price) if price >= 0 => Some(price),
            Some(_) => {
                errors.push("price must be greater than or equal to 0".to_string());
                None
            }
            None => {
                errors.push("price is required".to_string());
                None
            }
        };

        match (name, price) {
            (Some(name), Some(price)) => Ok(NewFruit { name, price }),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_free_fruit() {
        let body = FruitBody {
            name: Some(" apple ".to_string()),
            price: Some(0),
        };

        let fruit = body.validate().unwrap();
        assert_eq!(fruit.name, "apple");
        assert_eq!(fruit.price, 0);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let body = FruitBody {
            name: Some("   ".to_string()),
            price: Some(-1),
        };

        match body.validate() {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0], "name is required");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_price() {
        let body = FruitBody {
            name: Some("kiwi".to_string()),
            price: None,
        };

        assert!(matches!(body.validate(), Err(DomainError::Validation(e)) if e == vec!["price is required"]));
    }
}
