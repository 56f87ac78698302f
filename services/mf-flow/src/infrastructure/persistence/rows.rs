//! 数据库行到领域对象的映射
//!
//! 枚举列以字符串存储，解析失败视为数据损坏并报数据库错误。

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId, UserId};
use mes_errors::AppResult;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::coding::{CodeRule, CodeSequence, ResetPolicy};
use crate::domain::documents::{
    BusinessMode, ComputationLine, ComputationStatus, ComputationType, Demand, DemandComputation,
    DemandStatus, DocKind, ExecutionStatus, MaterialSource, PlanLine, PlanStatus, ProductionPlan,
    PurchaseOrder, PurchaseOrderLine, PurchaseRequisition, PurchaseStatus, RequisitionLine,
    ReviewStatus, SuggestedAction, WorkOrder, WorkOrderPriority, WorkOrderStatus,
};
use crate::domain::relations::{DocRelation, RelationMode};

fn audit(
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
) -> AuditInfo {
    AuditInfo {
        created_at,
        created_by: created_by.map(UserId::from_uuid),
        updated_at,
        updated_by: updated_by.map(UserId::from_uuid),
    }
}

// ============================================================================
// 编码规则
// ============================================================================

#[derive(Debug, FromRow)]
pub struct CodeRuleRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub template: String,
    pub seq_start: i64,
    pub seq_step: i64,
    pub seq_width: i64,
    pub reset_policy: String,
    pub is_system: bool,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CodeRuleRow {
    pub fn into_rule(self) -> AppResult<CodeRule> {
        Ok(CodeRule {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            code: self.code,
            name: self.name,
            template: self.template,
            seq_start: self.seq_start,
            seq_step: self.seq_step,
            seq_width: self.seq_width,
            reset_policy: ResetPolicy::parse(&self.reset_policy)?,
            is_system: self.is_system,
            is_active: self.is_active,
            description: self.description,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CodeSequenceRow {
    pub id: i64,
    pub rule_id: i64,
    pub tenant_id: Uuid,
    pub scope_key: String,
    pub current_value: i64,
    pub last_reset: Option<NaiveDate>,
}

impl CodeSequenceRow {
    pub fn into_sequence(self) -> CodeSequence {
        CodeSequence {
            id: self.id,
            rule_id: self.rule_id,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            scope_key: self.scope_key,
            current_value: self.current_value,
            last_reset: self.last_reset,
        }
    }
}

// ============================================================================
// 需求与需求计算
// ============================================================================

#[derive(Debug, FromRow)]
pub struct DemandRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub demand_code: String,
    pub demand_name: String,
    pub business_mode: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub total_quantity: Decimal,
    pub status: String,
    pub review_status: String,
    pub pushed_to_computation: bool,
    pub computation_id: Option<i64>,
    pub computation_code: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DemandRow {
    pub fn into_demand(self) -> AppResult<Demand> {
        Ok(Demand {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            demand_code: self.demand_code,
            demand_name: self.demand_name,
            business_mode: BusinessMode::parse(&self.business_mode)?,
            start_date: self.start_date,
            end_date: self.end_date,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            order_date: self.order_date,
            delivery_date: self.delivery_date,
            total_quantity: self.total_quantity,
            status: DemandStatus::parse(&self.status)?,
            review_status: ReviewStatus::parse(&self.review_status)?,
            pushed_to_computation: self.pushed_to_computation,
            computation_id: self.computation_id,
            computation_code: self.computation_code,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ComputationRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub computation_code: String,
    pub demand_id: i64,
    pub demand_code: String,
    pub business_mode: String,
    pub computation_type: String,
    pub computation_params: serde_json::Value,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ComputationRow {
    pub fn into_computation(self) -> AppResult<DemandComputation> {
        Ok(DemandComputation {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            computation_code: self.computation_code,
            demand_id: self.demand_id,
            demand_code: self.demand_code,
            business_mode: BusinessMode::parse(&self.business_mode)?,
            computation_type: ComputationType::parse(&self.computation_type)?,
            computation_params: self.computation_params,
            status: ComputationStatus::parse(&self.status)?,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ComputationLineRow {
    pub id: i64,
    pub computation_id: i64,
    pub material_id: i64,
    pub material_code: String,
    pub material_name: String,
    pub material_spec: Option<String>,
    pub unit: Option<String>,
    pub material_source: String,
    pub required_quantity: Decimal,
    pub available_quantity: Decimal,
    pub safety_stock: Decimal,
    pub gross_requirement: Decimal,
    pub net_requirement: Decimal,
    pub suggested_work_order_quantity: Decimal,
    pub planned_production: Decimal,
    pub suggested_purchase_order_quantity: Decimal,
    pub planned_procurement: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub production_start_date: Option<NaiveDate>,
    pub production_completion_date: Option<NaiveDate>,
    pub procurement_start_date: Option<NaiveDate>,
    pub procurement_completion_date: Option<NaiveDate>,
}

impl ComputationLineRow {
    pub fn into_line(self) -> AppResult<ComputationLine> {
        Ok(ComputationLine {
            id: self.id,
            computation_id: self.computation_id,
            material_id: self.material_id,
            material_code: self.material_code,
            material_name: self.material_name,
            material_spec: self.material_spec,
            unit: self.unit,
            material_source: MaterialSource::parse(&self.material_source)?,
            required_quantity: self.required_quantity,
            available_quantity: self.available_quantity,
            safety_stock: self.safety_stock,
            gross_requirement: self.gross_requirement,
            net_requirement: self.net_requirement,
            suggested_work_order_quantity: self.suggested_work_order_quantity,
            planned_production: self.planned_production,
            suggested_purchase_order_quantity: self.suggested_purchase_order_quantity,
            planned_procurement: self.planned_procurement,
            delivery_date: self.delivery_date,
            production_start_date: self.production_start_date,
            production_completion_date: self.production_completion_date,
            procurement_start_date: self.procurement_start_date,
            procurement_completion_date: self.procurement_completion_date,
        })
    }
}

// ============================================================================
// 生产计划
// ============================================================================

#[derive(Debug, FromRow)]
pub struct PlanRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub plan_code: String,
    pub plan_name: String,
    pub plan_type: String,
    pub source_type: String,
    pub source_id: i64,
    pub source_code: String,
    pub plan_start_date: Option<NaiveDate>,
    pub plan_end_date: Option<NaiveDate>,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PlanRow {
    pub fn into_plan(self) -> AppResult<ProductionPlan> {
        Ok(ProductionPlan {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            plan_code: self.plan_code,
            plan_name: self.plan_name,
            plan_type: ComputationType::parse(&self.plan_type)?,
            source_type: self.source_type,
            source_id: self.source_id,
            source_code: self.source_code,
            plan_start_date: self.plan_start_date,
            plan_end_date: self.plan_end_date,
            status: PlanStatus::parse(&self.status)?,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PlanLineRow {
    pub id: i64,
    pub plan_id: i64,
    pub material_id: i64,
    pub material_code: String,
    pub material_name: String,
    pub material_source: String,
    pub planned_quantity: Decimal,
    pub suggested_action: String,
    pub work_order_quantity: Decimal,
    pub purchase_order_quantity: Decimal,
    pub execution_status: String,
    pub work_order_id: Option<i64>,
    pub purchase_order_id: Option<i64>,
    pub notes: Option<String>,
}

impl PlanLineRow {
    pub fn into_line(self) -> AppResult<PlanLine> {
        Ok(PlanLine {
            id: self.id,
            plan_id: self.plan_id,
            material_id: self.material_id,
            material_code: self.material_code,
            material_name: self.material_name,
            material_source: MaterialSource::parse(&self.material_source)?,
            planned_quantity: self.planned_quantity,
            suggested_action: SuggestedAction::parse(&self.suggested_action)?,
            work_order_quantity: self.work_order_quantity,
            purchase_order_quantity: self.purchase_order_quantity,
            execution_status: ExecutionStatus::parse(&self.execution_status)?,
            work_order_id: self.work_order_id,
            purchase_order_id: self.purchase_order_id,
            notes: self.notes,
        })
    }
}

// ============================================================================
// 工单
// ============================================================================

#[derive(Debug, FromRow)]
pub struct WorkOrderRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub material_id: i64,
    pub material_code: String,
    pub material_name: String,
    pub quantity: Decimal,
    pub production_mode: String,
    pub status: String,
    pub priority: String,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub workshop_id: Option<i64>,
    pub workshop_name: Option<String>,
    pub completed_quantity: Decimal,
    pub qualified_quantity: Decimal,
    pub unqualified_quantity: Decimal,
    pub source_type: Option<String>,
    pub source_id: Option<i64>,
    pub source_code: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl WorkOrderRow {
    pub fn into_work_order(self) -> AppResult<WorkOrder> {
        Ok(WorkOrder {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            code: self.code,
            name: self.name,
            material_id: self.material_id,
            material_code: self.material_code,
            material_name: self.material_name,
            quantity: self.quantity,
            production_mode: BusinessMode::parse(&self.production_mode)?,
            status: WorkOrderStatus::parse(&self.status)?,
            priority: WorkOrderPriority::parse(&self.priority)?,
            planned_start_date: self.planned_start_date,
            planned_end_date: self.planned_end_date,
            actual_start_date: self.actual_start_date,
            workshop_id: self.workshop_id,
            workshop_name: self.workshop_name,
            completed_quantity: self.completed_quantity,
            qualified_quantity: self.qualified_quantity,
            unqualified_quantity: self.unqualified_quantity,
            source_type: self.source_type,
            source_id: self.source_id,
            source_code: self.source_code,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

// ============================================================================
// 采购单与采购申请
// ============================================================================

#[derive(Debug, FromRow)]
pub struct PurchaseOrderRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub order_code: String,
    pub order_name: Option<String>,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub status: String,
    pub total_amount: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PurchaseOrderRow {
    pub fn into_order(self) -> AppResult<PurchaseOrder> {
        Ok(PurchaseOrder {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            order_code: self.order_code,
            order_name: self.order_name,
            supplier_id: self.supplier_id,
            supplier_name: self.supplier_name,
            order_date: self.order_date,
            delivery_date: self.delivery_date,
            status: PurchaseStatus::parse(&self.status)?,
            total_amount: self.total_amount,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PurchaseOrderLineRow {
    pub id: i64,
    pub order_id: i64,
    pub material_id: i64,
    pub material_code: String,
    pub material_name: String,
    pub material_spec: Option<String>,
    pub unit: String,
    pub ordered_quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub required_date: Option<NaiveDate>,
    pub source_type: Option<String>,
    pub source_id: Option<i64>,
    pub remarks: Option<String>,
}

impl PurchaseOrderLineRow {
    pub fn into_line(self) -> PurchaseOrderLine {
        PurchaseOrderLine {
            id: self.id,
            order_id: self.order_id,
            material_id: self.material_id,
            material_code: self.material_code,
            material_name: self.material_name,
            material_spec: self.material_spec,
            unit: self.unit,
            ordered_quantity: self.ordered_quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            required_date: self.required_date,
            source_type: self.source_type,
            source_id: self.source_id,
            remarks: self.remarks,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct RequisitionRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub requisition_code: String,
    pub requisition_name: String,
    pub status: String,
    pub requisition_date: NaiveDate,
    pub source_type: String,
    pub source_id: i64,
    pub source_code: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RequisitionRow {
    pub fn into_requisition(self) -> AppResult<PurchaseRequisition> {
        Ok(PurchaseRequisition {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            requisition_code: self.requisition_code,
            requisition_name: self.requisition_name,
            status: PurchaseStatus::parse(&self.status)?,
            requisition_date: self.requisition_date,
            source_type: self.source_type,
            source_id: self.source_id,
            source_code: self.source_code,
            remarks: self.remarks,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct RequisitionLineRow {
    pub id: i64,
    pub requisition_id: i64,
    pub material_id: i64,
    pub material_code: String,
    pub material_name: String,
    pub material_spec: Option<String>,
    pub unit: String,
    pub quantity: Decimal,
    pub supplier_id: Option<i64>,
    pub required_date: Option<NaiveDate>,
    pub computation_line_id: Option<i64>,
}

impl RequisitionLineRow {
    pub fn into_line(self) -> RequisitionLine {
        RequisitionLine {
            id: self.id,
            requisition_id: self.requisition_id,
            material_id: self.material_id,
            material_code: self.material_code,
            material_name: self.material_name,
            material_spec: self.material_spec,
            unit: self.unit,
            quantity: self.quantity,
            supplier_id: self.supplier_id,
            required_date: self.required_date,
            computation_line_id: self.computation_line_id,
        }
    }
}

// ============================================================================
// 单据关联
// ============================================================================

#[derive(Debug, FromRow)]
pub struct DocRelationRow {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: Uuid,
    pub source_kind: String,
    pub source_id: i64,
    pub source_code: String,
    pub source_name: Option<String>,
    pub target_kind: String,
    pub target_id: i64,
    pub target_code: String,
    pub target_name: Option<String>,
    pub relation_type: String,
    pub relation_mode: String,
    pub relation_desc: String,
    pub business_mode: Option<String>,
    pub demand_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DocRelationRow {
    pub fn into_relation(self) -> AppResult<DocRelation> {
        Ok(DocRelation {
            id: self.id,
            uuid: self.uuid,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            source_kind: DocKind::parse(&self.source_kind)?,
            source_id: self.source_id,
            source_code: self.source_code,
            source_name: self.source_name,
            target_kind: DocKind::parse(&self.target_kind)?,
            target_id: self.target_id,
            target_code: self.target_code,
            target_name: self.target_name,
            relation_type: self.relation_type,
            relation_mode: RelationMode::parse(&self.relation_mode)?,
            relation_desc: self.relation_desc,
            business_mode: self.business_mode.as_deref().map(BusinessMode::parse).transpose()?,
            demand_id: self.demand_id,
            audit_info: audit(self.created_at, self.created_by, self.updated_at, self.updated_by),
            deleted_at: self.deleted_at,
        })
    }
}
