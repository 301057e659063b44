use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::OrmConn,
    entity::admins::{ActiveModel as AdminActive, Column as AdminCol, Entity as Admins},
    services::auth_service,
};

/// Ensure the seed admin account exists. Runs once at startup, after
/// migrations. The seed password is hashed like every other credential.
pub async fn ensure_seed_admin(orm: &OrmConn, config: &AppConfig) -> anyhow::Result<()> {
    let existing = Admins::find()
        .filter(AdminCol::Email.eq(config.seed_admin_email.as_str()))
        .one(orm)
        .await?;

    if existing.is_some() {
        tracing::debug!(email = %config.seed_admin_email, "seed admin already present");
        return Ok(());
    }

    let password_hash = auth_service::hash_password(&config.seed_admin_password)?;

    let admin = AdminActive {
        id: Set(Uuid::new_v4()),
        email: Set(config.seed_admin_email.clone()),
        password_hash: Set(password_hash),
        name: Set("Clinic Administrator".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    tracing::info!(email = %config.seed_admin_email, id = %admin.id, "seed admin created");
    Ok(())
}
