//! Column layout of the Aromi weekly menu template.
//!
//! Coordinates are layout units of 1/16 pt, measured from the top-left
//! corner of the page. The thresholds below were calibrated against one
//! document template; other templates need their own values.

/// PDF points per layout unit.
pub const POINTS_PER_UNIT: f64 = 16.0;

/// Tokens with `MEAL_TYPE_MIN_X < x < MEAL_TYPE_MAX_X` name the meal type.
pub const MEAL_TYPE_MIN_X: f64 = 1.0;
pub const MEAL_TYPE_MAX_X: f64 = 3.0;

/// Tokens with `x > MEAL_MIN_X` are meal entries.
pub const MEAL_MIN_X: f64 = 4.0;

pub const DEFAULT_MEAL_TYPE: &str = "Lounas";

/// Prefix mixed into every meal id.
pub const PARSER_TAG: &str = "aromiv2";

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub meal_type_min_x: f64,
    pub meal_type_max_x: f64,
    pub meal_min_x: f64,
    pub default_meal_type: String,
    pub parser_tag: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            meal_type_min_x: MEAL_TYPE_MIN_X,
            meal_type_max_x: MEAL_TYPE_MAX_X,
            meal_min_x: MEAL_MIN_X,
            default_meal_type: DEFAULT_MEAL_TYPE.to_string(),
            parser_tag: PARSER_TAG.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn is_meal_type_column(&self, x: f64) -> bool {
        x > self.meal_type_min_x && x < self.meal_type_max_x
    }

    pub fn is_meal_column(&self, x: f64) -> bool {
        x > self.meal_min_x
    }
}
