use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    entity::audit_logs::ActiveModel as AuditActive, error::AppResult, models::Role,
    state::AppState,
};

pub async fn log_audit(
    state: &AppState,
    actor_id: Option<Uuid>,
    actor_role: Option<Role>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> AppResult<()> {
    AuditActive {
        id: Set(Uuid::new_v4()),
        actor_id: Set(actor_id),
        actor_role: Set(actor_role.map(|r| r.as_str().to_string())),
        action: Set(action.to_string()),
        resource: Set(resource.map(|r| r.to_string())),
        metadata: Set(metadata),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(())
}
