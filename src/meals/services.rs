use tracing::{info, warn};
use uuid::Uuid;

use super::metrics::{self, MealMetrics};
use super::repo_types::{Meal, MealFields};
use crate::error::AppError;
use crate::store::MealStore;
use crate::users::extractors::AuthContext;

const MAX_FIELD_LEN: usize = 255;

fn validate(fields: &MealFields) -> Result<(), AppError> {
    if fields.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be blank".into()));
    }
    if fields.name.chars().count() > MAX_FIELD_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    if fields.description.chars().count() > MAX_FIELD_LEN {
        return Err(AppError::Validation(format!(
            "description must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn list_meals(store: &dyn MealStore, ctx: &AuthContext) -> Result<Vec<Meal>, AppError> {
    Ok(store.list_meals(ctx.user_id).await?)
}

pub async fn get_meal(store: &dyn MealStore, ctx: &AuthContext, id: Uuid) -> Result<Meal, AppError> {
    store
        .get_meal(ctx.user_id, id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_meal(
    store: &dyn MealStore,
    ctx: &AuthContext,
    fields: MealFields,
) -> Result<Meal, AppError> {
    validate(&fields)?;
    let meal = store.create_meal(ctx.user_id, fields).await?;
    info!(user_id = %ctx.user_id, meal_id = %meal.id, in_diet = meal.in_diet, "meal created");
    Ok(meal)
}

/// Existence is checked across all users; the write itself only touches a
/// meal the caller owns. Targeting someone else's meal is a silent no-op.
pub async fn update_meal(
    store: &dyn MealStore,
    ctx: &AuthContext,
    id: Uuid,
    fields: MealFields,
) -> Result<(), AppError> {
    validate(&fields)?;
    if !store.meal_exists(id).await? {
        return Err(AppError::NotFound);
    }
    let changed = store.update_meal(ctx.user_id, id, fields).await?;
    if changed == 0 {
        warn!(user_id = %ctx.user_id, meal_id = %id, "update matched no owned meal");
    } else {
        info!(user_id = %ctx.user_id, meal_id = %id, "meal updated");
    }
    Ok(())
}

/// Same existence-then-scoped-write rule as [`update_meal`].
pub async fn delete_meal(store: &dyn MealStore, ctx: &AuthContext, id: Uuid) -> Result<(), AppError> {
    if !store.meal_exists(id).await? {
        return Err(AppError::NotFound);
    }
    let removed = store.delete_meal(ctx.user_id, id).await?;
    if removed == 0 {
        warn!(user_id = %ctx.user_id, meal_id = %id, "delete matched no owned meal");
    } else {
        info!(user_id = %ctx.user_id, meal_id = %id, "meal deleted");
    }
    Ok(())
}

pub async fn meal_metrics(store: &dyn MealStore, ctx: &AuthContext) -> Result<MealMetrics, AppError> {
    let meals = store.list_meals(ctx.user_id).await?;
    Ok(metrics::compute(&meals))
}
