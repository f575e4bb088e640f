pub mod categories;
pub mod health;
pub mod history;
pub mod machines;
pub mod materials;
pub mod stock;
pub mod users;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    categories::CategoryService, history::HistoryService, machines::MachineService,
    materials::MaterialService, stock_ledger::StockLedgerService, users::UserService,
};
use std::sync::Arc;

pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<StockLedgerService>,
    pub materials: Arc<MaterialService>,
    pub categories: Arc<CategoryService>,
    pub machines: Arc<MachineService>,
    pub history: Arc<HistoryService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, stock_retry_attempts: u32) -> Self {
        let ledger = Arc::new(StockLedgerService::new(
            db_pool.clone(),
            event_sender.clone(),
            stock_retry_attempts,
        ));
        let materials = Arc::new(MaterialService::new(db_pool.clone(), event_sender.clone()));
        let categories = Arc::new(CategoryService::new(db_pool.clone(), event_sender.clone()));
        let machines = Arc::new(MachineService::new(db_pool.clone(), event_sender));
        let history = Arc::new(HistoryService::new(db_pool.clone()));
        let users = Arc::new(UserService::new(db_pool));

        Self {
            ledger,
            materials,
            categories,
            machines,
            history,
            users,
        }
    }
}
