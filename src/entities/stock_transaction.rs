use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;

/// The two kinds of stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum StockAction {
    Add,
    Remove,
}

impl StockAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockAction::Add => "add",
            StockAction::Remove => "remove",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(StockAction::Add),
            "remove" => Some(StockAction::Remove),
            _ => None,
        }
    }
}

/// Why a mutation happened. String forms match the labels the stockroom has
/// always used on its paper log, misspellings included; they are recorded data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, StrumEnumIter, Serialize, Deserialize,
)]
pub enum WorkType {
    #[strum(serialize = "Add New Stock")]
    #[serde(rename = "Add New Stock")]
    AddNewStock,
    #[strum(serialize = "Return")]
    Return,
    #[strum(serialize = "Breakdown Maintainance")]
    #[serde(rename = "Breakdown Maintainance")]
    BreakdownMaintainance,
    #[strum(serialize = "Preventive Maintainance")]
    #[serde(rename = "Preventive Maintainance")]
    PreventiveMaintainance,
    #[strum(serialize = "Kaizen/ Modification")]
    #[serde(rename = "Kaizen/ Modification")]
    KaizenModification,
    #[strum(serialize = "Test/Trial")]
    #[serde(rename = "Test/Trial")]
    TestTrial,
}

impl WorkType {
    /// Whether this classification is valid for the given action. Add covers
    /// restocking and returns; everything else consumes stock.
    pub fn applies_to(&self, action: StockAction) -> bool {
        match self {
            WorkType::AddNewStock | WorkType::Return => action == StockAction::Add,
            _ => action == StockAction::Remove,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        WorkType::from_str(s).ok()
    }
}

/// Immutable audit entry for one stock mutation. Append-only: rows are never
/// updated or deleted, so replaying a material's rows in order reproduces its
/// stock record quantity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub material_id: Uuid,
    pub material_name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub action: String,
    pub quantity: i32,
    pub new_quantity: i32,
    pub owner_name: String,
    pub assigned_date: Date,
    pub work_type: String,
    pub machine_id: Option<Uuid>,
    pub machine_name: Option<String>,
    pub remarks: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Signed contribution of this entry to the running quantity.
    pub fn signed_delta(&self) -> i64 {
        match StockAction::from_str(&self.action) {
            Some(StockAction::Add) => i64::from(self.quantity),
            Some(StockAction::Remove) => -i64::from(self.quantity),
            None => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::machine::Entity",
        from = "Column::MachineId",
        to = "super::machine::Column::Id"
    )]
    Machine,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::machine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Machine.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_type_round_trips_through_recorded_labels() {
        for wt in [
            WorkType::AddNewStock,
            WorkType::Return,
            WorkType::BreakdownMaintainance,
            WorkType::PreventiveMaintainance,
            WorkType::KaizenModification,
            WorkType::TestTrial,
        ] {
            assert_eq!(WorkType::parse(&wt.to_string()), Some(wt));
        }
        assert_eq!(WorkType::parse("Breakdown Maintainance"), Some(WorkType::BreakdownMaintainance));
        assert_eq!(WorkType::parse("breakdown"), None);
    }

    #[test]
    fn work_type_classification_matches_action() {
        assert!(WorkType::AddNewStock.applies_to(StockAction::Add));
        assert!(WorkType::Return.applies_to(StockAction::Add));
        assert!(!WorkType::Return.applies_to(StockAction::Remove));
        assert!(WorkType::BreakdownMaintainance.applies_to(StockAction::Remove));
        assert!(!WorkType::TestTrial.applies_to(StockAction::Add));
    }
}
