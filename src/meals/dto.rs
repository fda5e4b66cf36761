use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use super::repo_types::{Meal, MealFields};

/// Body of `POST /meals` and `PUT /meals/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_meal_datetime")]
    pub meal_datetime: OffsetDateTime,
    pub in_diet: bool,
}

impl From<MealRequest> for MealFields {
    fn from(r: MealRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            meal_datetime: r.meal_datetime,
            in_diet: r.in_diet,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDatetime {
    Millis(i64),
    Text(String),
}

/// Accepts an RFC 3339 string or epoch milliseconds; normalizes to UTC and
/// drops anything below a millisecond.
fn deserialize_meal_datetime<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let dt = match RawDatetime::deserialize(deserializer)? {
        RawDatetime::Millis(ms) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
                .map_err(D::Error::custom)?
        }
        RawDatetime::Text(s) => OffsetDateTime::parse(&s, &Rfc3339).map_err(D::Error::custom)?,
    };
    let dt = dt.to_offset(UtcOffset::UTC);
    dt.replace_millisecond(dt.millisecond())
        .map_err(D::Error::custom)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub meal_datetime: OffsetDateTime,
    pub in_diet: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Meal> for MealResponse {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            meal_datetime: m.meal_datetime,
            in_diet: m.in_diet,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<MealResponse>,
}

#[derive(Debug, Serialize)]
pub struct MealDetails {
    pub meal: MealResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn parse(body: serde_json::Value) -> Result<MealRequest, serde_json::Error> {
        serde_json::from_value(body)
    }

    #[test]
    fn accepts_rfc3339_and_millis() {
        let from_text = parse(serde_json::json!({
            "name": "Ref 1",
            "description": "A melhor do mundo",
            "mealDatetime": "2024-05-01T21:05:55.809Z",
            "inDiet": true,
        }))
        .unwrap();
        let from_millis = parse(serde_json::json!({
            "name": "Ref 1",
            "description": "A melhor do mundo",
            "mealDatetime": 1714597555809_i64,
            "inDiet": true,
        }))
        .unwrap();

        assert_eq!(from_text.meal_datetime, datetime!(2024-05-01 21:05:55.809 UTC));
        assert_eq!(from_text.meal_datetime, from_millis.meal_datetime);
    }

    #[test]
    fn truncates_below_millisecond_and_normalizes_offset() {
        let req = parse(serde_json::json!({
            "name": "x",
            "description": "",
            "mealDatetime": "2024-05-01T23:05:55.809999+02:00",
            "inDiet": false,
        }))
        .unwrap();
        assert_eq!(req.meal_datetime, datetime!(2024-05-01 21:05:55.809 UTC));
        assert_eq!(req.meal_datetime.offset(), UtcOffset::UTC);
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(parse(serde_json::json!({
            "name": "x",
            "description": "",
            "mealDatetime": "yesterday",
            "inDiet": true,
        }))
        .is_err());
        assert!(parse(serde_json::json!({
            "name": "x",
            "description": "",
            "mealDatetime": "2024-05-01T21:05:55Z",
            "inDiet": "yes",
        }))
        .is_err());
    }
}
