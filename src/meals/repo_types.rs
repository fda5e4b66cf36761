use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Meal row as stored in the `meals` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,                 // owner, never changes after insert
    pub name: String,
    pub description: String,
    pub meal_datetime: OffsetDateTime, // when the meal was eaten, millisecond precision
    pub in_diet: bool,
    pub created_at: OffsetDateTime,    // insertion instant
}

/// Owner-editable fields of a meal, used for both insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealFields {
    pub name: String,
    pub description: String,
    pub meal_datetime: OffsetDateTime,
    pub in_diet: bool,
}
