use booth_shared::{Food, FoodCategory};
use serde::{Deserialize, Serialize};

/// One category block on the kiosk screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuSection {
    pub category: FoodCategory,
    pub foods: Vec<Food>,
}

/// The kiosk menu: every category in display order, upstream order kept inside each.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Menu {
    pub sections: Vec<MenuSection>,
}

impl Menu {
    pub fn from_foods(foods: Vec<Food>) -> Self {
        let mut sections: Vec<MenuSection> = FoodCategory::ALL
            .iter()
            .map(|category| MenuSection {
                category: *category,
                foods: Vec::new(),
            })
            .collect();

        for food in foods {
            if let Some(section) = sections.iter_mut().find(|s| s.category == food.category) {
                section.foods.push(food);
            }
        }

        Self { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.foods.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
