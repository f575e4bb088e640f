use crate::{
    db::DbPool,
    entities::stock_transaction::{self, Entity as StockTransactions},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Filters for the usage-history listing. `month` is `YYYY-MM` and applies to
/// the assigned date, matching how the stockroom files its paper log.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
    pub month: Option<String>,
    pub page: u64,
    pub limit: u64,
}

/// Read-only access to the stock-transaction audit trail.
#[derive(Clone)]
pub struct HistoryService {
    db_pool: Arc<DbPool>,
}

impl HistoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Lists transactions newest first, with optional filters.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: HistoryFilter,
    ) -> Result<(Vec<stock_transaction::Model>, u64), ServiceError> {
        let mut query =
            StockTransactions::find().order_by_desc(stock_transaction::Column::CreatedAt);

        if let Some(category_id) = filter.category_id {
            query = query.filter(stock_transaction::Column::CategoryId.eq(category_id));
        }
        if let Some(material_id) = filter.material_id {
            query = query.filter(stock_transaction::Column::MaterialId.eq(material_id));
        }
        if let Some(machine_id) = filter.machine_id {
            query = query.filter(stock_transaction::Column::MachineId.eq(machine_id));
        }
        if let Some(month) = &filter.month {
            let (start, end) = super::month_bounds(month).ok_or_else(|| {
                ServiceError::ValidationError(format!("invalid month filter {month:?}"))
            })?;
            query = query
                .filter(stock_transaction::Column::AssignedDate.gte(start))
                .filter(stock_transaction::Column::AssignedDate.lt(end));
        }

        let paginator = query.paginate(self.db_pool.as_ref(), filter.limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(filter.page.max(1) - 1).await?;
        Ok((items, total))
    }
}
