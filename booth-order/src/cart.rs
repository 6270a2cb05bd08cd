use booth_shared::{Food, OrderItemRequest};
use serde::{Deserialize, Serialize};

/// Most units of one food a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub food: Food,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.food.price * i64::from(self.quantity)
    }
}

/// A table's basket before it is sent upstream. Lines keep the order they were added in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error("{0} is sold out")]
    SoldOut(String),

    #[error("Food {0} is not in the cart")]
    NotInCart(i64),

    #[error("At most {max} of {name} per order")]
    QuantityLimit { name: String, max: u32 },
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds one unit of `food`.
    pub fn add(&mut self, food: Food) -> Result<(), CartError> {
        if food.sold_out {
            return Err(CartError::SoldOut(food.name));
        }

        match self.items.iter_mut().find(|item| item.food.id == food.id) {
            Some(item) if item.quantity >= MAX_LINE_QUANTITY => Err(CartError::QuantityLimit {
                name: item.food.name.clone(),
                max: MAX_LINE_QUANTITY,
            }),
            Some(item) => {
                item.quantity += 1;
                Ok(())
            }
            None => {
                self.items.push(CartItem { food, quantity: 1 });
                Ok(())
            }
        }
    }

    /// Sets a line's quantity. Zero or less drops the line; more than
    /// `MAX_LINE_QUANTITY` is refused and leaves the line as it was.
    pub fn update_quantity(&mut self, food_id: i64, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove(food_id);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.food.id == food_id)
            .ok_or(CartError::NotInCart(food_id))?;
        match u32::try_from(quantity) {
            Ok(quantity) if quantity <= MAX_LINE_QUANTITY => {
                item.quantity = quantity;
                Ok(())
            }
            _ => Err(CartError::QuantityLimit {
                name: item.food.name.clone(),
                max: MAX_LINE_QUANTITY,
            }),
        }
    }

    pub fn remove(&mut self, food_id: i64) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|item| item.food.id != food_id);
        if self.items.len() == before {
            return Err(CartError::NotInCart(food_id));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Takes already-ordered lines out of the cart. Lines added after the
    /// snapshot was taken, or units beyond it, stay.
    pub fn deduct(&mut self, ordered: &[CartItem]) {
        for paid in ordered {
            if let Some(item) = self.items.iter_mut().find(|item| item.food.id == paid.food.id) {
                item.quantity = item.quantity.saturating_sub(paid.quantity);
            }
        }
        self.items.retain(|item| item.quantity > 0);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_price(&self) -> i64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn to_order_items(&self) -> Vec<OrderItemRequest> {
        self.items
            .iter()
            .map(|item| OrderItemRequest {
                food_id: item.food.id,
                quantity: item.quantity,
            })
            .collect()
    }
}
