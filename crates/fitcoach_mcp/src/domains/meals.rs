use chrono::NaiveDate;
use fitcoach_client::{Meal, MealType, NewFood, NewMeal};
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{McpError, McpResult};

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct MealTypeInfo {
    pub meal_type: MealType,
    pub title: &'static str,
    pub description: &'static str,
    pub typical_time: &'static str,
}

pub const MEAL_TYPES: [MealTypeInfo; 4] = [
    MealTypeInfo {
        meal_type: MealType::Breakfast,
        title: "Breakfast",
        description: "Start your day right",
        typical_time: "6:00 AM - 10:00 AM",
    },
    MealTypeInfo {
        meal_type: MealType::Lunch,
        title: "Lunch",
        description: "Midday fuel",
        typical_time: "11:00 AM - 2:00 PM",
    },
    MealTypeInfo {
        meal_type: MealType::Dinner,
        title: "Dinner",
        description: "Evening nourishment",
        typical_time: "6:00 PM - 9:00 PM",
    },
    MealTypeInfo {
        meal_type: MealType::Snack,
        title: "Snacks",
        description: "Between meals",
        typical_time: "Any time",
    },
];

#[derive(Debug, Clone, Serialize, JsonSchema, PartialEq)]
pub struct MealSummary {
    pub id: String,
    pub name: String,
    pub meal_type: MealType,
    /// YYYY-MM-DD
    pub date: String,
    pub notes: Option<String>,
    pub food_count: usize,
    pub total_calories: i64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl From<&Meal> for MealSummary {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.clone(),
            name: meal.name.clone(),
            meal_type: meal.meal_type,
            date: meal.date.format("%Y-%m-%d").to_string(),
            notes: meal.notes.clone(),
            food_count: meal.foods.len(),
            total_calories: meal.foods.iter().map(|f| f.calories).sum(),
            total_protein: meal.foods.iter().map(|f| f.protein).sum(),
            total_carbs: meal.foods.iter().map(|f| f.carbs).sum(),
            total_fat: meal.foods.iter().map(|f| f.fat).sum(),
        }
    }
}

/// Validate caller input and assemble a [`NewMeal`]. `date` defaults to `today`.
pub fn build_meal(
    user_id: String,
    name: &str,
    meal_type: Option<MealType>,
    notes: Option<String>,
    date: Option<&str>,
    foods: Vec<NewFood>,
    today: NaiveDate,
) -> McpResult<NewMeal> {
    let name = name.trim();
    if name.is_empty() {
        return Err(McpError::Validation("meal name must not be empty".into()));
    }
    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| McpError::Validation(format!("date must be YYYY-MM-DD, got {raw}")))?,
        None => today,
    };
    for food in &foods {
        if food.name.trim().is_empty() {
            return Err(McpError::Validation("food name must not be empty".into()));
        }
        let numbers = [food.serving_size, food.protein, food.carbs, food.fat];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(McpError::Validation(format!(
                "food {} has a non-numeric amount",
                food.name
            )));
        }
    }
    Ok(NewMeal {
        user_id,
        name: name.to_string(),
        meal_type: meal_type.unwrap_or_default(),
        notes: notes.filter(|n| !n.trim().is_empty()),
        date,
        foods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn food(name: &str, calories: i64) -> NewFood {
        NewFood {
            name: name.into(),
            serving_size: 1.0,
            calories,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
        }
    }

    #[test]
    fn defaults_to_snack_today() {
        let meal = build_meal("u1".into(), " Apple ", None, Some(" ".into()), None, vec![], today())
            .unwrap();
        assert_eq!(meal.meal_type, MealType::Snack);
        assert_eq!(meal.date, today());
        assert_eq!(meal.name, "Apple");
        assert!(meal.notes.is_none());
    }

    #[test]
    fn rejects_bad_date_and_blank_names() {
        assert!(build_meal("u1".into(), "x", None, None, Some("05/03/2025"), vec![], today()).is_err());
        assert!(build_meal("u1".into(), "", None, None, None, vec![], today()).is_err());
        assert!(
            build_meal("u1".into(), "x", None, None, None, vec![food(" ", 1)], today()).is_err()
        );
    }

    #[test]
    fn summary_totals_macros() {
        let meal = Meal {
            id: "m1".into(),
            user_id: "u1".into(),
            name: "Lunch".into(),
            meal_type: MealType::Lunch,
            notes: None,
            date: today(),
            foods: vec![food("Rice", 200), food("Chicken", 250)],
        };
        let s = MealSummary::from(&meal);
        assert_eq!(s.food_count, 2);
        assert_eq!(s.total_calories, 450);
        assert_eq!(s.total_protein, 20.0);
        assert_eq!(s.date, "2025-03-05");
    }

    #[test]
    fn catalogue_covers_every_meal_type_once() {
        let types: Vec<_> = MEAL_TYPES.iter().map(|m| m.meal_type).collect();
        assert_eq!(
            types,
            [MealType::Breakfast, MealType::Lunch, MealType::Dinner, MealType::Snack]
        );
    }
}
