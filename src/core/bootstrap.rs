use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories::{self, StoreError};

/// Creates the admin named by `FIRST_SUPERUSER_EMAIL`, or repairs its role and
/// password when the account already exists.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = admin.first_superuser_email.as_str();
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), email).await? {
        let password_matches =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password);

        if password_matches && user.role == UserRole::Admin {
            tracing::info!(email, "Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if password_matches {
            None
        } else {
            Some(security::hash_password(&admin.first_superuser_password)?)
        };

        repositories::users::update(
            state.db(),
            &user.id,
            repositories::users::UpdateUser {
                email: None,
                hashed_password,
                role: Some(UserRole::Admin),
                updated_at: now,
            },
        )
        .await?;

        tracing::info!(email, user_id = %user.id, "Updated default superuser");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    let created = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        },
    )
    .await;

    match created {
        Ok(user) => tracing::info!(email, user_id = %user.id, "Created default superuser"),
        // Another instance created it between the lookup and the insert.
        Err(StoreError::UniqueViolation(_)) => {
            tracing::info!(email, "Default superuser created concurrently")
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn superuser_is_created_then_repaired() {
        let ctx = test_support::setup_test_context().await;
        let email = ctx.state.settings().admin().first_superuser_email.clone();

        ensure_superuser(&ctx.state).await.expect("bootstrap");
        let user = repositories::users::find_by_email(ctx.state.db(), &email)
            .await
            .expect("query")
            .expect("superuser");
        assert_eq!(user.role, UserRole::Admin);

        repositories::users::update(
            ctx.state.db(),
            &user.id,
            repositories::users::UpdateUser {
                email: None,
                hashed_password: None,
                role: Some(UserRole::User),
                updated_at: primitive_now_utc(),
            },
        )
        .await
        .expect("demote");

        ensure_superuser(&ctx.state).await.expect("bootstrap");
        let repaired = repositories::users::find_by_id(ctx.state.db(), &user.id)
            .await
            .expect("query")
            .expect("superuser");
        assert_eq!(repaired.role, UserRole::Admin);
        assert!(security::verify_password(
            &ctx.state.settings().admin().first_superuser_password,
            &repaired.hashed_password
        ));
    }
}
