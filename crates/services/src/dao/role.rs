use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use vigil_db::models::{RoleName, UserRole};

use super::base::{BaseDao, DaoError, DaoResult};
use crate::admin::RoleLookup;

pub struct RoleDao {
    pub base: BaseDao<UserRole>,
}

impl RoleDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, UserRole::COLLECTION),
        }
    }

    /// Grants `role` to the user. Granting an existing role is a no-op.
    pub async fn grant(&self, user_id: ObjectId, role: RoleName) -> DaoResult<()> {
        let user_role = UserRole {
            id: None,
            user_id,
            role,
            created_at: DateTime::now(),
        };

        match self.base.insert_one(&user_role).await {
            Ok(_) | Err(DaoError::DuplicateKey(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn find_role(
        &self,
        user_id: ObjectId,
        role: RoleName,
    ) -> DaoResult<Option<UserRole>> {
        self.base
            .find_one(doc! { "user_id": user_id, "role": role.as_str() })
            .await
    }
}

#[async_trait]
impl RoleLookup for RoleDao {
    async fn find_role(&self, user_id: ObjectId, role: RoleName) -> DaoResult<Option<UserRole>> {
        RoleDao::find_role(self, user_id, role).await
    }
}
