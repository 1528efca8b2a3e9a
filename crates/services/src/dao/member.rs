use std::collections::HashMap;

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use vigil_db::models::Member;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct MemberDao {
    pub base: BaseDao<Member>,
}

impl MemberDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Member::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        full_name: String,
        password_hash: String,
    ) -> DaoResult<Member> {
        let now = DateTime::now();
        let member = Member {
            id: None,
            email: normalize_email(&email),
            full_name,
            password_hash: Some(password_hash),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&member).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Member> {
        self.base
            .find_one(doc! { "email": normalize_email(email) })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Looks up members for the attendance join. Unknown ids are simply absent from the map.
    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> DaoResult<HashMap<ObjectId, Member>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let members = self
            .base
            .find_many(doc! { "_id": { "$in": ids.to_vec() } }, None, None)
            .await?;

        Ok(members
            .into_iter()
            .filter_map(|m| m.id.map(|id| (id, m)))
            .collect())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
