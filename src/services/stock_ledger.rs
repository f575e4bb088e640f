use crate::{
    db::DbPool,
    entities::{
        category::Entity as Categories,
        machine::{self, Entity as Machines},
        material::{self, Entity as Materials},
        stock_record::{self, Entity as StockRecords},
        stock_transaction::{self, Entity as StockTransactions, StockAction, WorkType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

const CONFLICT_RETRY_BASE_MS: u64 = 20;

/// One requested stock mutation. The acting principal is passed separately to
/// [`StockLedgerService::apply_mutation`], never read from ambient state.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_mutation_shape", skip_on_field_errors = false))]
pub struct StockMutationCommand {
    pub material_id: Uuid,
    pub action: StockAction,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 120))]
    pub owner_name: String,
    pub assigned_date: NaiveDate,
    /// One of the recorded work-type labels, e.g. "Breakdown Maintainance"
    #[schema(example = "Breakdown Maintainance")]
    pub work_type: String,
    /// Required for Remove, ignored for Add
    pub machine_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

fn validate_mutation_shape(command: &StockMutationCommand) -> Result<(), ValidationError> {
    let Some(work_type) = WorkType::parse(&command.work_type) else {
        return Err(ValidationError::new("unknown_work_type"));
    };
    if !work_type.applies_to(command.action) {
        return Err(ValidationError::new("work_type_does_not_match_action"));
    }
    if command.action == StockAction::Remove && command.machine_id.is_none() {
        return Err(ValidationError::new("machine_required_for_remove"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockMutationResult {
    pub transaction_id: Uuid,
    pub material_id: Uuid,
    pub action: StockAction,
    pub previous_quantity: i32,
    pub quantity: i32,
    pub new_quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    pub category_id: Option<Uuid>,
    pub month: Option<String>,
    pub page: u64,
    pub limit: u64,
}

/// Result of replaying a material's audit trail against its stock record.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditReport {
    pub material_id: Uuid,
    pub recorded_quantity: i32,
    pub replayed_quantity: i64,
    pub transaction_count: usize,
    pub consistent: bool,
}

/// Sums the signed deltas of an audit trail. Entries must be in chronological
/// order for intermediate snapshots to be meaningful; the final sum is
/// order-independent.
pub fn replay_quantity(entries: &[stock_transaction::Model]) -> i64 {
    entries.iter().map(stock_transaction::Model::signed_delta).sum()
}

/// The stock ledger: applies mutations atomically, keeping the materialized
/// stock record and the append-only transaction trail consistent.
#[derive(Clone)]
pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    retry_attempts: u32,
}

impl StockLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, retry_attempts: u32) -> Self {
        Self {
            db_pool,
            event_sender,
            retry_attempts: retry_attempts.max(1),
        }
    }

    /// Applies one stock mutation on behalf of `recorded_by`.
    ///
    /// Validates the request, then atomically updates the material's stock
    /// record and appends a transaction entry. Version conflicts are retried
    /// with backoff up to the configured budget; the resulting quantity is
    /// returned for immediate display.
    #[instrument(skip(self, command), fields(material_id = %command.material_id))]
    pub async fn apply_mutation(
        &self,
        command: StockMutationCommand,
        recorded_by: Uuid,
    ) -> Result<StockMutationResult, ServiceError> {
        command.validate()?;
        let work_type = WorkType::parse(&command.work_type).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "unknown work type {:?}; expected one of: {}",
                command.work_type,
                WorkType::iter()
                    .map(|w| w.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let db = self.db_pool.as_ref();
        let material = Materials::find_by_id(command.material_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("material {} not found", command.material_id))
            })?;
        let category = Categories::find_by_id(material.category_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "category {} for material {} not found",
                    material.category_id, material.id
                ))
            })?;
        let machine = match (command.action, command.machine_id) {
            (StockAction::Remove, Some(machine_id)) => Some(
                Machines::find_by_id(machine_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("machine {machine_id} not found"))
                    })?,
            ),
            _ => None,
        };

        let mut attempt = 0;
        let result = loop {
            attempt += 1;
            match self
                .try_apply(
                    &command,
                    work_type,
                    &material,
                    &category.name,
                    machine.as_ref(),
                    recorded_by,
                )
                .await
            {
                Ok(result) => break result,
                Err(ServiceError::ConcurrentModification(id)) if attempt < self.retry_attempts => {
                    debug!(attempt, material_id = %id, "Stock record version conflict, retrying");
                    sleep(Duration::from_millis(
                        CONFLICT_RETRY_BASE_MS * u64::from(attempt),
                    ))
                    .await;
                }
                Err(e) => return Err(e),
            }
        };

        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                material_id: result.material_id,
                transaction_id: result.transaction_id,
                action: result.action.as_str().to_string(),
                quantity: result.quantity,
                new_quantity: result.new_quantity,
            })
            .await
        {
            warn!("Failed to publish stock adjustment event: {}", e);
        }
        if result.new_quantity <= material.min_quantity {
            if let Err(e) = self
                .event_sender
                .send(Event::LowStockDetected {
                    material_id: material.id,
                    quantity: result.new_quantity,
                    min_quantity: material.min_quantity,
                })
                .await
            {
                warn!("Failed to publish low stock event: {}", e);
            }
        }

        info!(
            material_id = %result.material_id,
            action = %result.action.as_str(),
            quantity = %result.quantity,
            new_quantity = %result.new_quantity,
            "Stock mutation committed"
        );
        Ok(result)
    }

    /// One transactional attempt: resolve-or-create the stock record, apply
    /// the delta behind a version check, append the transaction entry.
    async fn try_apply(
        &self,
        command: &StockMutationCommand,
        work_type: WorkType,
        material: &material::Model,
        category_name: &str,
        machine: Option<&machine::Model>,
        recorded_by: Uuid,
    ) -> Result<StockMutationResult, ServiceError> {
        let command = command.clone();
        let material = material.clone();
        let category_name = category_name.to_string();
        let machine = machine.cloned();

        self.db_pool
            .transaction::<_, StockMutationResult, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = StockRecords::find()
                        .filter(stock_record::Column::MaterialId.eq(material.id))
                        .one(txn)
                        .await?;

                    let delta = match command.action {
                        StockAction::Add => command.quantity,
                        StockAction::Remove => -command.quantity,
                    };
                    let previous_quantity = existing.as_ref().map(|r| r.quantity).unwrap_or(0);
                    let new_quantity = previous_quantity + delta;
                    if new_quantity < 0 {
                        return Err(ServiceError::InsufficientStock(format!(
                            "material {} has {} on hand, tried to remove {}",
                            material.name, previous_quantity, command.quantity
                        )));
                    }

                    let now = Utc::now();
                    match existing {
                        Some(record) => {
                            let updated = StockRecords::update_many()
                                .col_expr(stock_record::Column::Quantity, Expr::value(new_quantity))
                                .col_expr(
                                    stock_record::Column::MaterialName,
                                    Expr::value(material.name.clone()),
                                )
                                .col_expr(
                                    stock_record::Column::CategoryId,
                                    Expr::value(material.category_id),
                                )
                                .col_expr(
                                    stock_record::Column::CategoryName,
                                    Expr::value(category_name.clone()),
                                )
                                .col_expr(
                                    stock_record::Column::OwnerName,
                                    Expr::value(command.owner_name.clone()),
                                )
                                .col_expr(
                                    stock_record::Column::AssignedDate,
                                    Expr::value(command.assigned_date),
                                )
                                .col_expr(
                                    stock_record::Column::Version,
                                    Expr::value(record.version + 1),
                                )
                                .col_expr(stock_record::Column::UpdatedAt, Expr::value(now))
                                .filter(stock_record::Column::Id.eq(record.id))
                                .filter(stock_record::Column::Version.eq(record.version))
                                .exec(txn)
                                .await?;
                            if updated.rows_affected == 0 {
                                return Err(ServiceError::ConcurrentModification(material.id));
                            }
                        }
                        None => {
                            let record = stock_record::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                material_id: Set(material.id),
                                material_name: Set(material.name.clone()),
                                category_id: Set(material.category_id),
                                category_name: Set(category_name.clone()),
                                quantity: Set(new_quantity),
                                owner_name: Set(command.owner_name.clone()),
                                assigned_date: Set(command.assigned_date),
                                version: Set(1),
                                created_at: Set(now),
                                updated_at: Set(now),
                            };
                            match record.insert(txn).await {
                                Ok(_) => {}
                                Err(e)
                                    if matches!(
                                        e.sql_err(),
                                        Some(SqlErr::UniqueConstraintViolation(_))
                                    ) =>
                                {
                                    return Err(ServiceError::ConcurrentModification(material.id));
                                }
                                Err(e) => return Err(ServiceError::DatabaseError(e)),
                            }
                        }
                    }

                    let transaction_id = Uuid::new_v4();
                    let entry = stock_transaction::ActiveModel {
                        id: Set(transaction_id),
                        material_id: Set(material.id),
                        material_name: Set(material.name.clone()),
                        category_id: Set(material.category_id),
                        category_name: Set(category_name),
                        action: Set(command.action.as_str().to_string()),
                        quantity: Set(command.quantity),
                        new_quantity: Set(new_quantity),
                        owner_name: Set(command.owner_name.clone()),
                        assigned_date: Set(command.assigned_date),
                        work_type: Set(work_type.to_string()),
                        machine_id: Set(machine.as_ref().map(|m| m.id)),
                        machine_name: Set(machine.as_ref().map(|m| m.name.clone())),
                        remarks: Set(command.remarks.clone()),
                        recorded_by: Set(recorded_by),
                        created_at: Set(now),
                    };
                    entry.insert(txn).await?;

                    Ok(StockMutationResult {
                        transaction_id,
                        material_id: material.id,
                        action: command.action,
                        previous_quantity,
                        quantity: command.quantity,
                        new_quantity,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })
    }

    /// Current stock for one material. The material must exist; the record may
    /// not, in which case the quantity is zero by definition.
    #[instrument(skip(self))]
    pub async fn stock_for_material(
        &self,
        material_id: Uuid,
    ) -> Result<(material::Model, Option<stock_record::Model>), ServiceError> {
        let db = self.db_pool.as_ref();
        let material = Materials::find_by_id(material_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("material {material_id} not found")))?;
        let record = StockRecords::find()
            .filter(stock_record::Column::MaterialId.eq(material_id))
            .one(db)
            .await?;
        Ok((material, record))
    }

    /// Lists stock records with optional category and month filters.
    #[instrument(skip(self))]
    pub async fn list_stock(
        &self,
        filter: StockFilter,
    ) -> Result<(Vec<stock_record::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = StockRecords::find().order_by_desc(stock_record::Column::UpdatedAt);

        if let Some(category_id) = filter.category_id {
            query = query.filter(stock_record::Column::CategoryId.eq(category_id));
        }
        if let Some(month) = &filter.month {
            let (start, end) = super::month_bounds(month).ok_or_else(|| {
                ServiceError::ValidationError(format!("invalid month filter {month:?}"))
            })?;
            query = query
                .filter(stock_record::Column::AssignedDate.gte(start))
                .filter(stock_record::Column::AssignedDate.lt(end));
        }

        let limit = filter.limit.max(1);
        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await?;
        let page = filter.page.max(1);
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    /// Replays a material's transactions in chronological order and checks the
    /// sum of signed deltas against the materialized record. The record is the
    /// source of truth; this reports divergence, it does not repair it.
    #[instrument(skip(self))]
    pub async fn verify_material_audit(
        &self,
        material_id: Uuid,
    ) -> Result<AuditReport, ServiceError> {
        let db = self.db_pool.as_ref();
        Materials::find_by_id(material_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("material {material_id} not found")))?;

        let record = StockRecords::find()
            .filter(stock_record::Column::MaterialId.eq(material_id))
            .one(db)
            .await?;
        let entries = StockTransactions::find()
            .filter(stock_transaction::Column::MaterialId.eq(material_id))
            .order_by_asc(stock_transaction::Column::CreatedAt)
            .all(db)
            .await?;

        let recorded_quantity = record.map(|r| r.quantity).unwrap_or(0);
        let replayed_quantity = replay_quantity(&entries);

        Ok(AuditReport {
            material_id,
            recorded_quantity,
            replayed_quantity,
            transaction_count: entries.len(),
            consistent: i64::from(recorded_quantity) == replayed_quantity,
        })
    }
}
