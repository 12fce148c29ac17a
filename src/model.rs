use serde::Serialize;
use sha1::{Digest, Sha1};

/// One positioned text fragment, in layout units (see [`crate::layout`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meal {
    pub id: String,
    pub name: String,
}

impl Meal {
    /// Builds a meal whose id is the hex SHA-1 of `tag + meal_type + "_" + name`.
    pub fn new(tag: &str, meal_type: &str, name: &str) -> Self {
        Self {
            id: meal_id(tag, meal_type, name),
            name: name.to_string(),
        }
    }
}

pub fn meal_id(tag: &str, meal_type: &str, name: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(tag.as_bytes());
    hasher.update(meal_type.as_bytes());
    hasher.update(b"_");
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub meal_type: String,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Day {
    /// `YYYY-MM-DD`
    pub date: String,
    pub menus: Vec<Menu>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diet {
    pub name: String,
    pub code: String,
}

/// Result of a successful parse: days in ascending date order plus the legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyMenu {
    pub days: Vec<Day>,
    pub diets: Vec<Diet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_id_is_sha1_of_concatenation() {
        // sha1("aromiv2Lounas_Soup")
        let mut hasher = Sha1::new();
        hasher.update(b"aromiv2Lounas_Soup");
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(meal_id("aromiv2", "Lounas", "Soup"), expected);
        assert_eq!(expected.len(), 40);
    }

    #[test]
    fn meal_id_depends_on_meal_type() {
        let lunch = Meal::new("aromiv2", "Lounas", "Soup");
        let dinner = Meal::new("aromiv2", "Päivällinen", "Soup");
        assert_ne!(lunch.id, dinner.id);
        assert_eq!(lunch.id, Meal::new("aromiv2", "Lounas", "Soup").id);
    }

    #[test]
    fn menu_serializes_meal_type_in_camel_case() {
        let menu = Menu {
            meal_type: "Lounas".to_string(),
            meals: vec![],
        };
        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["mealType"], "Lounas");
    }
}
