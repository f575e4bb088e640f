use crate::{
    db::DbPool,
    entities::{
        category::{self, Entity as Categories},
        material::{self, Entity as Materials},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Registry of material categories.
#[derive(Clone)]
pub struct CategoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CategoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        created_by: Uuid,
    ) -> Result<category::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "category name is required".to_string(),
            ));
        }

        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(self.db_pool.as_ref()).await?;
        if let Err(e) = self
            .event_sender
            .send(Event::CategoryCreated(saved.id))
            .await
        {
            warn!("Failed to publish category event: {}", e);
        }
        info!(category_id = %saved.id, "Created category");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<category::Model>, ServiceError> {
        let categories = Categories::find()
            .order_by_asc(category::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        Categories::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("category {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<category::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "category name is required".to_string(),
            ));
        }

        let existing = self.get(id).await?;
        let mut active: category::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let updated = active.update(self.db_pool.as_ref()).await?;
        Ok(updated)
    }

    /// Deletes a category. Refused while any material still references it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let in_use = Materials::find()
            .filter(material::Column::CategoryId.eq(id))
            .count(self.db_pool.as_ref())
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "category {} is referenced by {} material(s)",
                existing.name, in_use
            )));
        }

        Categories::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await?;
        if let Err(e) = self.event_sender.send(Event::CategoryDeleted(id)).await {
            warn!("Failed to publish category event: {}", e);
        }
        info!(category_id = %id, "Deleted category");
        Ok(())
    }
}
