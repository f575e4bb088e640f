use crate::{
    db::DbPool,
    entities::{
        category::Entity as Categories,
        machine::Entity as Machines,
        material::{self, Entity as Materials},
        stock_record::{self, Entity as StockRecords},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialCommand {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category_id: Uuid,
    pub machine_id: Option<Uuid>,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(max = 100))]
    pub cupboard: Option<String>,
    #[validate(length(max = 100))]
    pub shelf: Option<String>,
    #[validate(range(min = 0))]
    pub min_quantity: i32,
}

/// Descriptive fields only; material identity is immutable.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialCommand {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub cupboard: Option<String>,
    #[validate(length(max = 100))]
    pub shelf: Option<String>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
}

fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_unit_price"));
    }
    Ok(())
}

/// Material at or below its minimum-quantity threshold, read from the
/// materialized stock records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockItem {
    pub material_id: Uuid,
    pub material_name: String,
    pub category_name: String,
    pub unit_price: Decimal,
    pub current_quantity: i32,
    pub min_quantity: i32,
}

/// Registry of materials: the descriptive side of the inventory, as opposed to
/// the quantities tracked by the stock ledger.
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn create(
        &self,
        command: CreateMaterialCommand,
        created_by: Uuid,
    ) -> Result<material::Model, ServiceError> {
        command.validate()?;
        let db = self.db_pool.as_ref();

        Categories::find_by_id(command.category_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("category {} not found", command.category_id))
            })?;
        if let Some(machine_id) = command.machine_id {
            Machines::find_by_id(machine_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("machine {machine_id} not found"))
                })?;
        }

        let now = Utc::now();
        let model = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(command.name),
            category_id: Set(command.category_id),
            machine_id: Set(command.machine_id),
            unit_price: Set(command.unit_price),
            location: Set(command.location),
            cupboard: Set(command.cupboard),
            shelf: Set(command.shelf),
            min_quantity: Set(command.min_quantity),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = model.insert(db).await?;
        if let Err(e) = self
            .event_sender
            .send(Event::MaterialCreated(saved.id))
            .await
        {
            warn!("Failed to publish material event: {}", e);
        }
        info!(material_id = %saved.id, "Created material");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<material::Model, ServiceError> {
        Materials::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("material {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        category_id: Option<Uuid>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<material::Model>, u64), ServiceError> {
        let mut query = Materials::find().order_by_asc(material::Column::Name);
        if let Some(category_id) = category_id {
            query = query.filter(material::Column::CategoryId.eq(category_id));
        }

        let paginator = query.paginate(self.db_pool.as_ref(), limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((items, total))
    }

    #[instrument(skip(self, command))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateMaterialCommand,
    ) -> Result<material::Model, ServiceError> {
        command.validate()?;
        let db = self.db_pool.as_ref();
        let existing = self.get(id).await?;

        if let Some(category_id) = command.category_id {
            Categories::find_by_id(category_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("category {category_id} not found"))
                })?;
        }
        if let Some(machine_id) = command.machine_id {
            Machines::find_by_id(machine_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("machine {machine_id} not found"))
                })?;
        }

        let mut active: material::ActiveModel = existing.into();
        if let Some(name) = command.name {
            active.name = Set(name);
        }
        if let Some(category_id) = command.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(machine_id) = command.machine_id {
            active.machine_id = Set(Some(machine_id));
        }
        if let Some(unit_price) = command.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(location) = command.location {
            active.location = Set(location);
        }
        if let Some(cupboard) = command.cupboard {
            active.cupboard = Set(Some(cupboard));
        }
        if let Some(shelf) = command.shelf {
            active.shelf = Set(Some(shelf));
        }
        if let Some(min_quantity) = command.min_quantity {
            active.min_quantity = Set(min_quantity);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        if let Err(e) = self
            .event_sender
            .send(Event::MaterialUpdated(updated.id))
            .await
        {
            warn!("Failed to publish material event: {}", e);
        }
        Ok(updated)
    }

    /// Deletes a material and its stock record in one transaction. The
    /// transaction trail is retained as history.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        self.db_pool
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    StockRecords::delete_many()
                        .filter(stock_record::Column::MaterialId.eq(existing.id))
                        .exec(txn)
                        .await?;
                    existing.delete(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if let Err(e) = self.event_sender.send(Event::MaterialDeleted(id)).await {
            warn!("Failed to publish material event: {}", e);
        }
        info!(material_id = %id, "Deleted material");
        Ok(())
    }

    /// Materials whose current quantity is at or below their threshold.
    /// Materials with no stock record yet count as zero on hand.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<LowStockItem>, ServiceError> {
        let db = self.db_pool.as_ref();
        let materials = Materials::find()
            .find_also_related(StockRecords)
            .all(db)
            .await?;
        let categories: HashMap<Uuid, String> = Categories::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut items: Vec<LowStockItem> = materials
            .into_iter()
            .filter(|(m, record)| {
                record.as_ref().map(|r| r.quantity).unwrap_or(0) <= m.min_quantity
            })
            .map(|(m, record)| LowStockItem {
                material_id: m.id,
                category_name: categories
                    .get(&m.category_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Category".to_string()),
                material_name: m.name,
                unit_price: m.unit_price,
                current_quantity: record.map(|r| r.quantity).unwrap_or(0),
                min_quantity: m.min_quantity,
            })
            .collect();
        items.sort_by(|a, b| a.material_name.cmp(&b.material_name));
        Ok(items)
    }
}
