use crate::{
    db::DbPool,
    entities::user::{self, Entity as Users},
    errors::ServiceError,
};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read-only account directory, used for owner dropdowns and the admin view.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        let users = Users::find()
            .order_by_asc(user::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        Users::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {id} not found")))
    }
}
