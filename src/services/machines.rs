use crate::{
    db::DbPool,
    entities::{
        machine::{self, Entity as Machines},
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

/// Registry of machines that consume materials.
#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MachineService {
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
    ) -> Result<machine::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "machine name is required".to_string(),
            ));
        }

        let model = machine::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(self.db_pool.as_ref()).await?;
        if let Err(e) = self.event_sender.send(Event::MachineCreated(saved.id)).await {
            warn!("Failed to publish machine event: {}", e);
        }
        info!(machine_id = %saved.id, "Created machine");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<machine::Model>, ServiceError> {
        let machines = Machines::find()
            .order_by_asc(machine::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(machines)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<machine::Model, ServiceError> {
        Machines::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("machine {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<machine::Model, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "machine name is required".to_string(),
            ));
        }

        let existing = self.get(id).await?;
        let mut active: machine::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let updated = active.update(self.db_pool.as_ref()).await?;
        Ok(updated)
    }

    /// Deletes a machine. Refused while any material is associated with it;
    /// past transactions keep their machine snapshot either way.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let in_use = Materials::find()
            .filter(material::Column::MachineId.eq(id))
            .count(self.db_pool.as_ref())
            .await?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "machine {} is referenced by {} material(s)",
                existing.name, in_use
            )));
        }

        Machines::delete_by_id(id)
            .exec(self.db_pool.as_ref())
            .await?;
        if let Err(e) = self.event_sender.send(Event::MachineDeleted(id)).await {
            warn!("Failed to publish machine event: {}", e);
        }
        info!(machine_id = %id, "Deleted machine");
        Ok(())
    }
}
