use booth_shared::{Food, FoodCategory};
use serde::{Deserialize, Serialize};

/// Admin food list query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl FoodFilter {
    /// Keeps matching foods, newest first. Foods without a creation time go last.
    pub fn apply(&self, foods: Vec<Food>) -> Vec<Food> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let category = self.category.as_deref().and_then(FoodCategory::parse);

        let mut matched: Vec<Food> = foods
            .into_iter()
            .filter(|food| category.map_or(true, |c| food.category == c))
            .filter(|food| match &needle {
                Some(needle) => {
                    food.name.to_lowercase().contains(needle)
                        || food
                            .description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
                None => true,
            })
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}

/// One page of a list, 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Missing or zero pages resolve to the first page; pages past the end to the last.
    pub fn paginate(items: Vec<T>, page: Option<usize>, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let page = page.unwrap_or(1).clamp(1, total_pages);

        let items = items
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::tests::food;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_filter_by_search_and_category() {
        let mut spicy = food(1, "Spicy Tteokbokki", 8000, FoodCategory::Main);
        spicy.created_at = Some(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
        let mut skewer = food(2, "Chicken Skewer", 4000, FoodCategory::Side);
        skewer.description = Some("Spicy glaze".to_string());
        skewer.created_at = Some(Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap());
        let plain = food(3, "Rice", 1000, FoodCategory::Side);

        let all = vec![spicy, skewer, plain];

        let searched = FoodFilter { search: Some("SPICY".into()), category: None }.apply(all.clone());
        assert_eq!(searched.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 1]);

        let sides = FoodFilter { search: None, category: Some("side".into()) }.apply(all.clone());
        assert_eq!(sides.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 3]);

        let everything = FoodFilter::default().apply(all);
        assert_eq!(everything.last().unwrap().id, 3);
    }

    #[test]
    fn test_pagination_clamps() {
        let page = Page::paginate((1..=45).collect::<Vec<_>>(), Some(3), 20);
        assert_eq!(page.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);

        let past_end = Page::paginate((1..=45).collect::<Vec<_>>(), Some(99), 20);
        assert_eq!(past_end.page, 3);

        let zero = Page::paginate((1..=5).collect::<Vec<_>>(), Some(0), 20);
        assert_eq!(zero.page, 1);

        let empty: Page<i32> = Page::paginate(Vec::new(), None, 10);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
