//! 下推处理器
//!
//! 一次下推在单个事务内完成：前置校验、行级筛选与聚合、目标单据
//! 落库、关联边记录、源单据回写。任何一步失败整体回滚，不存在
//! 部分成功。编码分配抢锁失败时丢弃事务，以全新事务重试。

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use async_trait::async_trait;
use mes_common::{with_conditional_retry, AuditInfo, RetryConfig, TenantId};
use mes_cqrs_core::CommandHandler;
use mes_errors::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::application::commands::orchestrator::{
    PushDocumentCommand, PushOutcome, TargetRef,
};
use crate::domain::coding::{allocate, system_rules, AllocationContext};
use crate::domain::documents::{
    BusinessMode, ComputationLine, ComputationStatus, ComputationType, Demand, DemandComputation,
    DemandStatus, DocKind, ExecutionStatus, MaterialSource, PlanLine, PlanStatus, ProductionPlan,
    PurchaseOrder, PurchaseOrderLine, PurchaseRequisition, PurchaseStatus, RequisitionLine,
    ReviewStatus, SuggestedAction, WorkOrder, WorkOrderPriority, WorkOrderStatus,
};
use crate::domain::registry::load_document;
use crate::domain::relations::{push_description, transition_allowed, RelationMode};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::ports::{MaterialLookup, SupplierLookup};
use crate::infrastructure::observability::record_push;

use super::edges::{record_edge, EdgeSpec};

pub struct PushDocumentHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    materials: Arc<dyn MaterialLookup>,
    suppliers: Arc<dyn SupplierLookup>,
    retry: RetryConfig,
}

impl PushDocumentHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        materials: Arc<dyn MaterialLookup>,
        suppliers: Arc<dyn SupplierLookup>,
    ) -> Self {
        Self {
            uow_factory,
            materials,
            suppliers,
            retry: RetryConfig::default(),
        }
    }

    async fn push_once(&self, command: &PushDocumentCommand) -> AppResult<PushOutcome> {
        let uow = self.uow_factory.begin().await?;
        match self.execute(uow.as_ref(), command).await {
            Ok(outcome) => {
                uow.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        match (command.source_kind, command.target_kind) {
            (DocKind::Demand, DocKind::DemandComputation) => {
                self.demand_to_computation(uow, command).await
            }
            (DocKind::DemandComputation, DocKind::ProductionPlan) => {
                self.computation_to_plan(uow, command).await
            }
            (DocKind::DemandComputation, DocKind::WorkOrder) => {
                self.computation_to_work_orders(uow, command).await
            }
            (DocKind::DemandComputation, DocKind::PurchaseOrder) => {
                self.computation_to_purchase_orders(uow, command).await
            }
            (DocKind::DemandComputation, DocKind::PurchaseRequisition) => {
                self.computation_to_requisition(uow, command).await
            }
            (DocKind::ProductionPlan, DocKind::WorkOrder) => {
                self.plan_to_work_orders(uow, command).await
            }
            (source, target) => Err(AppError::transition_not_allowed(format!(
                "不支持的下推类型: {} -> {}",
                source.as_str(),
                target.as_str()
            ))),
        }
    }

    async fn allocate_code(
        &self,
        uow: &dyn UnitOfWork,
        tenant_id: &TenantId,
        rule_code: &str,
        context: AllocationContext,
    ) -> AppResult<String> {
        allocate(
            uow.code_rules(),
            uow.code_sequences(),
            tenant_id,
            rule_code,
            &context,
            Utc::now().date_naive(),
        )
        .await
    }

    /// 源级去重：该源是否已有存活的同类目标
    async fn has_alive_target(
        &self,
        uow: &dyn UnitOfWork,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
    ) -> AppResult<bool> {
        let edges = uow
            .relations()
            .list_targets(tenant_id, source_kind, source_id, Some(target_kind))
            .await?;
        for edge in edges {
            if load_document(uow, tenant_id, target_kind, edge.target_id)
                .await?
                .is_some()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// 物料级去重：该计算已下推出存活目标的物料集合
    ///
    /// 已软删除的目标不计入，对应物料重新开放下推。
    async fn propagated_materials(
        &self,
        uow: &dyn UnitOfWork,
        tenant_id: &TenantId,
        computation_id: i64,
        target_kind: DocKind,
    ) -> AppResult<HashSet<i64>> {
        let edges = uow
            .relations()
            .list_targets(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                Some(target_kind),
            )
            .await?;

        let mut materials = HashSet::new();
        for edge in edges {
            match target_kind {
                DocKind::WorkOrder => {
                    if let Some(wo) = uow.work_orders().find_by_id(tenant_id, edge.target_id).await?
                    {
                        materials.insert(wo.material_id);
                    }
                }
                DocKind::PurchaseOrder => {
                    if uow
                        .purchase_orders()
                        .find_by_id(tenant_id, edge.target_id)
                        .await?
                        .is_some()
                    {
                        for line in uow.purchase_orders().list_lines(edge.target_id).await? {
                            materials.insert(line.material_id);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(materials)
    }

    async fn load_pushable_demand(
        &self,
        uow: &dyn UnitOfWork,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Demand> {
        let demand = uow
            .demands()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("需求不存在"))?;
        if demand.status != DemandStatus::Audited || demand.review_status != ReviewStatus::Approved
        {
            return Err(AppError::precondition_failed("只能下推已审核通过的需求"));
        }
        Ok(demand)
    }

    async fn load_completed_computation(
        &self,
        uow: &dyn UnitOfWork,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<DemandComputation> {
        let computation = uow
            .computations()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("需求计算不存在"))?;
        if computation.status != ComputationStatus::Completed {
            return Err(AppError::precondition_failed("只能下推已完成的需求计算"));
        }
        Ok(computation)
    }

    /// 需求 → 需求计算
    async fn demand_to_computation(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let mut demand = self
            .load_pushable_demand(uow, tenant_id, command.source_id)
            .await?;

        // 标记为权威判据；指向的计算已被删除时标记视为失效，允许重推
        if demand.pushed_to_computation {
            let alive = match demand.computation_id {
                Some(computation_id) => uow
                    .computations()
                    .find_by_id(tenant_id, computation_id)
                    .await?
                    .is_some(),
                None => false,
            };
            if alive {
                return Err(AppError::already_propagated(
                    "需求已经下推到需求计算，不能重复下推",
                ));
            }
        }

        let code = self
            .allocate_code(
                uow,
                tenant_id,
                system_rules::DEMAND_COMPUTATION_CODE,
                AllocationContext::with_prefix("DC"),
            )
            .await?;

        let mut computation = DemandComputation {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            computation_code: code.clone(),
            demand_id: demand.id,
            demand_code: demand.demand_code.clone(),
            business_mode: demand.business_mode,
            computation_type: demand.business_mode.computation_type(),
            computation_params: command
                .params
                .extra
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            status: ComputationStatus::Pending,
            remarks: None,
            audit_info: AuditInfo::new(command.created_by),
            deleted_at: None,
        };
        computation.id = uow.computations().insert(&computation).await?;

        demand.mark_pushed(computation.id, code.clone());
        demand.audit_info.update(command.created_by);
        uow.demands().update(&demand).await?;

        let (edge, _) = record_edge(
            uow,
            tenant_id,
            command.created_by,
            EdgeSpec {
                source_kind: DocKind::Demand,
                source_id: demand.id,
                source_code: demand.demand_code.clone(),
                source_name: Some(demand.demand_name.clone()),
                target_kind: DocKind::DemandComputation,
                target_id: computation.id,
                target_code: code.clone(),
                target_name: None,
                mode: RelationMode::Push,
                description: push_description(DocKind::Demand, DocKind::DemandComputation),
                business_mode: Some(demand.business_mode),
                demand_id: Some(demand.id),
            },
        )
        .await?;

        Ok(PushOutcome {
            message: "下推成功".to_string(),
            targets: vec![TargetRef {
                kind: DocKind::DemandComputation,
                id: computation.id,
                code,
            }],
            relation_ids: vec![edge.id],
        })
    }

    /// 需求计算 → 生产计划
    async fn computation_to_plan(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let computation = self
            .load_completed_computation(uow, tenant_id, command.source_id)
            .await?;

        if self
            .has_alive_target(
                uow,
                tenant_id,
                DocKind::DemandComputation,
                computation.id,
                DocKind::ProductionPlan,
            )
            .await?
        {
            return Err(AppError::already_propagated(
                "需求计算已下推生成生产计划，不能重复下推",
            ));
        }

        let lines = uow.computations().list_lines(computation.id).await?;
        let groups = aggregate_plan_lines(&lines);
        if groups.is_empty() {
            return Err(AppError::nothing_to_push("没有可下推的计算明细"));
        }

        let mut plan_start: Option<NaiveDate> = None;
        let mut plan_end: Option<NaiveDate> = None;
        for line in lines.iter().filter(|l| !matches!(l.material_source, MaterialSource::Phantom)) {
            for date in line.milestones() {
                plan_start = Some(plan_start.map_or(date, |d| d.min(date)));
                plan_end = Some(plan_end.map_or(date, |d| d.max(date)));
            }
        }

        let code = self
            .allocate_code(
                uow,
                tenant_id,
                system_rules::PRODUCTION_PLAN_CODE,
                AllocationContext::default(),
            )
            .await?;

        let mut plan = ProductionPlan {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            plan_code: code.clone(),
            plan_name: format!("{}生产计划", computation.computation_code),
            plan_type: computation.computation_type,
            source_type: DocKind::DemandComputation.as_str().to_string(),
            source_id: computation.id,
            source_code: computation.computation_code.clone(),
            plan_start_date: plan_start,
            plan_end_date: plan_end,
            status: PlanStatus::Draft,
            remarks: None,
            audit_info: AuditInfo::new(command.created_by),
            deleted_at: None,
        };
        plan.id = uow.plans().insert(&plan).await?;

        for group in groups.values() {
            let line = PlanLine {
                id: 0,
                plan_id: plan.id,
                material_id: group.material_id,
                material_code: group.material_code.clone(),
                material_name: group.material_name.clone(),
                material_source: group.material_source,
                planned_quantity: group.work_order_quantity + group.purchase_order_quantity,
                suggested_action: if group.material_source.is_purchased() {
                    SuggestedAction::Purchase
                } else {
                    SuggestedAction::Produce
                },
                work_order_quantity: group.work_order_quantity,
                purchase_order_quantity: group.purchase_order_quantity,
                execution_status: ExecutionStatus::Pending,
                work_order_id: None,
                purchase_order_id: None,
                notes: None,
            };
            uow.plans().insert_line(&line).await?;
        }

        let (edge, _) = record_edge(
            uow,
            tenant_id,
            command.created_by,
            EdgeSpec {
                source_kind: DocKind::DemandComputation,
                source_id: computation.id,
                source_code: computation.computation_code.clone(),
                source_name: None,
                target_kind: DocKind::ProductionPlan,
                target_id: plan.id,
                target_code: code.clone(),
                target_name: Some(plan.plan_name.clone()),
                mode: RelationMode::Push,
                description: push_description(
                    DocKind::DemandComputation,
                    DocKind::ProductionPlan,
                ),
                business_mode: Some(computation.business_mode),
                demand_id: Some(computation.demand_id),
            },
        )
        .await?;

        Ok(PushOutcome {
            message: "下推成功".to_string(),
            targets: vec![TargetRef {
                kind: DocKind::ProductionPlan,
                id: plan.id,
                code,
            }],
            relation_ids: vec![edge.id],
        })
    }

    /// 需求计算 → 工单（按物料逐单）
    async fn computation_to_work_orders(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let computation = self
            .load_completed_computation(uow, tenant_id, command.source_id)
            .await?;

        let lines = uow.computations().list_lines(computation.id).await?;
        let candidates: Vec<&ComputationLine> =
            lines.iter().filter(|l| l.needs_production()).collect();
        if candidates.is_empty() {
            return Err(AppError::nothing_to_push("没有需要生产的物料"));
        }

        let excluded = self
            .propagated_materials(uow, tenant_id, computation.id, DocKind::WorkOrder)
            .await?;
        let mut groups: BTreeMap<i64, Vec<&ComputationLine>> = BTreeMap::new();
        for line in candidates {
            if !excluded.contains(&line.material_id) {
                groups.entry(line.material_id).or_default().push(line);
            }
        }
        if groups.is_empty() {
            return Err(AppError::already_propagated("所有物料都已下推生成工单"));
        }

        let mut targets = Vec::new();
        let mut relation_ids = Vec::new();
        for (material_id, group) in groups {
            let quantity: Decimal = group.iter().map(|l| l.production_quantity()).sum();
            let planned_start = group.iter().filter_map(|l| l.production_start_date).min();
            let planned_end = group
                .iter()
                .filter_map(|l| l.production_completion_date)
                .max();
            let first = group[0];

            let code = self
                .allocate_code(
                    uow,
                    tenant_id,
                    system_rules::WORK_ORDER_CODE,
                    AllocationContext::default(),
                )
                .await?;
            let mut work_order = WorkOrder {
                id: 0,
                uuid: Uuid::now_v7(),
                tenant_id: *tenant_id,
                code: code.clone(),
                name: first.material_name.clone(),
                material_id,
                material_code: first.material_code.clone(),
                material_name: first.material_name.clone(),
                quantity,
                production_mode: computation.business_mode,
                status: WorkOrderStatus::Draft,
                priority: WorkOrderPriority::Normal,
                planned_start_date: planned_start,
                planned_end_date: planned_end,
                actual_start_date: None,
                workshop_id: None,
                workshop_name: None,
                completed_quantity: Decimal::ZERO,
                qualified_quantity: Decimal::ZERO,
                unqualified_quantity: Decimal::ZERO,
                source_type: Some(DocKind::DemandComputation.as_str().to_string()),
                source_id: Some(computation.id),
                source_code: Some(computation.computation_code.clone()),
                remarks: Some(format!(
                    "由需求计算{}下推生成",
                    computation.computation_code
                )),
                audit_info: AuditInfo::new(command.created_by),
                deleted_at: None,
            };
            work_order.id = uow.work_orders().insert(&work_order).await?;

            let (edge, _) = record_edge(
                uow,
                tenant_id,
                command.created_by,
                EdgeSpec {
                    source_kind: DocKind::DemandComputation,
                    source_id: computation.id,
                    source_code: computation.computation_code.clone(),
                    source_name: None,
                    target_kind: DocKind::WorkOrder,
                    target_id: work_order.id,
                    target_code: code.clone(),
                    target_name: Some(work_order.name.clone()),
                    mode: RelationMode::Push,
                    description: push_description(DocKind::DemandComputation, DocKind::WorkOrder),
                    business_mode: Some(computation.business_mode),
                    demand_id: Some(computation.demand_id),
                },
            )
            .await?;

            targets.push(TargetRef {
                kind: DocKind::WorkOrder,
                id: work_order.id,
                code,
            });
            relation_ids.push(edge.id);
        }

        Ok(PushOutcome {
            message: format!("下推成功，共生成{}个工单", targets.len()),
            targets,
            relation_ids,
        })
    }

    /// 需求计算 → 采购单（按物料逐单，一单一行）
    async fn computation_to_purchase_orders(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let computation = self
            .load_completed_computation(uow, tenant_id, command.source_id)
            .await?;

        let supplier_id = command
            .params
            .supplier_id
            .ok_or_else(|| AppError::missing_supplier("缺少供应商信息，无法生成采购单"))?;
        let supplier = self
            .suppliers
            .find_by_id(tenant_id, supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("供应商不存在: {}", supplier_id)))?;
        let unit_price = command.params.unit_price.unwrap_or(Decimal::ZERO);

        let lines = uow.computations().list_lines(computation.id).await?;
        let candidates: Vec<&ComputationLine> =
            lines.iter().filter(|l| l.needs_procurement()).collect();
        if candidates.is_empty() {
            return Err(AppError::nothing_to_push("没有需要采购的物料"));
        }

        let excluded = self
            .propagated_materials(uow, tenant_id, computation.id, DocKind::PurchaseOrder)
            .await?;
        let mut groups: BTreeMap<i64, Vec<&ComputationLine>> = BTreeMap::new();
        for line in candidates {
            if !excluded.contains(&line.material_id) {
                groups.entry(line.material_id).or_default().push(line);
            }
        }
        if groups.is_empty() {
            return Err(AppError::already_propagated("所有物料都已下推生成采购单"));
        }

        let today = Utc::now().date_naive();
        let mut targets = Vec::new();
        let mut relation_ids = Vec::new();
        for (material_id, group) in groups {
            let quantity: Decimal = group.iter().map(|l| l.procurement_quantity()).sum();
            let required_date = group
                .iter()
                .filter_map(|l| l.procurement_completion_date)
                .max();
            let first = group[0];
            let total_price = quantity * unit_price;

            let code = self
                .allocate_code(
                    uow,
                    tenant_id,
                    system_rules::PURCHASE_ORDER_CODE,
                    AllocationContext::default(),
                )
                .await?;
            let mut order = PurchaseOrder {
                id: 0,
                uuid: Uuid::now_v7(),
                tenant_id: *tenant_id,
                order_code: code.clone(),
                order_name: Some(format!("{}采购单", first.material_name)),
                supplier_id,
                supplier_name: supplier.name.clone(),
                order_date: today,
                delivery_date: required_date,
                status: PurchaseStatus::Draft,
                total_amount: total_price,
                remarks: Some(format!(
                    "由需求计算{}下推生成",
                    computation.computation_code
                )),
                audit_info: AuditInfo::new(command.created_by),
                deleted_at: None,
            };
            order.id = uow.purchase_orders().insert(&order).await?;

            let line = PurchaseOrderLine {
                id: 0,
                order_id: order.id,
                material_id,
                material_code: first.material_code.clone(),
                material_name: first.material_name.clone(),
                material_spec: first.material_spec.clone(),
                unit: first.unit.clone().unwrap_or_else(|| "件".to_string()),
                ordered_quantity: quantity,
                unit_price,
                total_price,
                required_date,
                source_type: Some(DocKind::DemandComputation.as_str().to_string()),
                source_id: Some(computation.id),
                remarks: None,
            };
            uow.purchase_orders().insert_line(&line).await?;

            let (edge, _) = record_edge(
                uow,
                tenant_id,
                command.created_by,
                EdgeSpec {
                    source_kind: DocKind::DemandComputation,
                    source_id: computation.id,
                    source_code: computation.computation_code.clone(),
                    source_name: None,
                    target_kind: DocKind::PurchaseOrder,
                    target_id: order.id,
                    target_code: code.clone(),
                    target_name: order.order_name.clone(),
                    mode: RelationMode::Push,
                    description: push_description(
                        DocKind::DemandComputation,
                        DocKind::PurchaseOrder,
                    ),
                    business_mode: Some(computation.business_mode),
                    demand_id: Some(computation.demand_id),
                },
            )
            .await?;

            targets.push(TargetRef {
                kind: DocKind::PurchaseOrder,
                id: order.id,
                code,
            });
            relation_ids.push(edge.id);
        }

        Ok(PushOutcome {
            message: format!("下推成功，共生成{}个采购单", targets.len()),
            targets,
            relation_ids,
        })
    }

    /// 需求计算 → 采购申请（全部外购行打包一张）
    async fn computation_to_requisition(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let computation = self
            .load_completed_computation(uow, tenant_id, command.source_id)
            .await?;

        if self
            .has_alive_target(
                uow,
                tenant_id,
                DocKind::DemandComputation,
                computation.id,
                DocKind::PurchaseRequisition,
            )
            .await?
        {
            return Err(AppError::already_propagated(
                "需求计算已下推生成采购申请，不能重复下推",
            ));
        }

        let lines = uow.computations().list_lines(computation.id).await?;
        let purchased: Vec<&ComputationLine> = lines
            .iter()
            .filter(|l| {
                l.material_source.is_purchased()
                    && l.suggested_purchase_order_quantity > Decimal::ZERO
            })
            .collect();
        if purchased.is_empty() {
            return Err(AppError::nothing_to_push("没有需要采购的物料"));
        }

        let code = self
            .allocate_code(
                uow,
                tenant_id,
                system_rules::PURCHASE_REQUISITION_CODE,
                AllocationContext::with_prefix("PR"),
            )
            .await?;

        let mut requisition = PurchaseRequisition {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            requisition_code: code.clone(),
            requisition_name: format!("{}采购申请", computation.computation_code),
            status: PurchaseStatus::Draft,
            requisition_date: Utc::now().date_naive(),
            source_type: DocKind::DemandComputation.as_str().to_string(),
            source_id: computation.id,
            source_code: computation.computation_code.clone(),
            remarks: None,
            audit_info: AuditInfo::new(command.created_by),
            deleted_at: None,
        };
        requisition.id = uow.requisitions().insert(&requisition).await?;

        for line in purchased {
            let material = self.materials.find_by_id(tenant_id, line.material_id).await?;
            let supplier_id = material.as_ref().and_then(|m| m.default_supplier_id);
            let unit = line
                .unit
                .clone()
                .or_else(|| material.as_ref().and_then(|m| m.unit.clone()))
                .unwrap_or_else(|| "件".to_string());

            let requisition_line = RequisitionLine {
                id: 0,
                requisition_id: requisition.id,
                material_id: line.material_id,
                material_code: line.material_code.clone(),
                material_name: line.material_name.clone(),
                material_spec: line.material_spec.clone(),
                unit,
                quantity: line.suggested_purchase_order_quantity,
                supplier_id,
                required_date: line.procurement_completion_date,
                computation_line_id: Some(line.id),
            };
            uow.requisitions().insert_line(&requisition_line).await?;
        }

        let (edge, _) = record_edge(
            uow,
            tenant_id,
            command.created_by,
            EdgeSpec {
                source_kind: DocKind::DemandComputation,
                source_id: computation.id,
                source_code: computation.computation_code.clone(),
                source_name: None,
                target_kind: DocKind::PurchaseRequisition,
                target_id: requisition.id,
                target_code: code.clone(),
                target_name: Some(requisition.requisition_name.clone()),
                mode: RelationMode::Push,
                description: push_description(
                    DocKind::DemandComputation,
                    DocKind::PurchaseRequisition,
                ),
                business_mode: Some(computation.business_mode),
                demand_id: Some(computation.demand_id),
            },
        )
        .await?;

        Ok(PushOutcome {
            message: "下推成功".to_string(),
            targets: vec![TargetRef {
                kind: DocKind::PurchaseRequisition,
                id: requisition.id,
                code,
            }],
            relation_ids: vec![edge.id],
        })
    }

    /// 生产计划 → 工单（按生产建议逐行）
    async fn plan_to_work_orders(
        &self,
        uow: &dyn UnitOfWork,
        command: &PushDocumentCommand,
    ) -> AppResult<PushOutcome> {
        let tenant_id = &command.tenant_id;
        let plan = uow
            .plans()
            .find_by_id(tenant_id, command.source_id)
            .await?
            .ok_or_else(|| AppError::not_found("生产计划不存在"))?;

        if self
            .has_alive_target(
                uow,
                tenant_id,
                DocKind::ProductionPlan,
                plan.id,
                DocKind::WorkOrder,
            )
            .await?
        {
            return Err(AppError::already_propagated(
                "生产计划已下推生成工单，不能重复下推",
            ));
        }

        let lines = uow.plans().list_lines(plan.id).await?;
        let pushable: Vec<PlanLine> = lines
            .into_iter()
            .filter(|l| l.can_push_work_order() && l.execution_status == ExecutionStatus::Pending)
            .collect();
        if pushable.is_empty() {
            return Err(AppError::nothing_to_push("没有可生成工单的计划明细"));
        }

        let production_mode = match plan.plan_type {
            ComputationType::Lrp => BusinessMode::Mto,
            ComputationType::Mrp => BusinessMode::Mts,
        };

        let mut targets = Vec::new();
        let mut relation_ids = Vec::new();
        for mut line in pushable {
            let code = self
                .allocate_code(
                    uow,
                    tenant_id,
                    system_rules::WORK_ORDER_CODE,
                    AllocationContext::default(),
                )
                .await?;
            let mut work_order = WorkOrder {
                id: 0,
                uuid: Uuid::now_v7(),
                tenant_id: *tenant_id,
                code: code.clone(),
                name: line.material_name.clone(),
                material_id: line.material_id,
                material_code: line.material_code.clone(),
                material_name: line.material_name.clone(),
                quantity: line.work_order_quantity,
                production_mode,
                status: WorkOrderStatus::Draft,
                priority: WorkOrderPriority::Normal,
                planned_start_date: plan.plan_start_date,
                planned_end_date: plan.plan_end_date,
                actual_start_date: None,
                workshop_id: None,
                workshop_name: None,
                completed_quantity: Decimal::ZERO,
                qualified_quantity: Decimal::ZERO,
                unqualified_quantity: Decimal::ZERO,
                source_type: Some(DocKind::ProductionPlan.as_str().to_string()),
                source_id: Some(plan.id),
                source_code: Some(plan.plan_code.clone()),
                remarks: Some(format!("由生产计划{}下推生成", plan.plan_code)),
                audit_info: AuditInfo::new(command.created_by),
                deleted_at: None,
            };
            work_order.id = uow.work_orders().insert(&work_order).await?;

            line.mark_executed(work_order.id);
            uow.plans().update_line_execution(&line).await?;

            let (edge, _) = record_edge(
                uow,
                tenant_id,
                command.created_by,
                EdgeSpec {
                    source_kind: DocKind::ProductionPlan,
                    source_id: plan.id,
                    source_code: plan.plan_code.clone(),
                    source_name: Some(plan.plan_name.clone()),
                    target_kind: DocKind::WorkOrder,
                    target_id: work_order.id,
                    target_code: code.clone(),
                    target_name: Some(work_order.name.clone()),
                    mode: RelationMode::Push,
                    description: push_description(DocKind::ProductionPlan, DocKind::WorkOrder),
                    business_mode: None,
                    demand_id: None,
                },
            )
            .await?;

            targets.push(TargetRef {
                kind: DocKind::WorkOrder,
                id: work_order.id,
                code,
            });
            relation_ids.push(edge.id);
        }

        Ok(PushOutcome {
            message: format!("下推成功，共生成{}个工单", targets.len()),
            targets,
            relation_ids,
        })
    }
}

/// 生成生产计划时的行聚合结果，按（物料，物料来源）分组
struct PlanAccum {
    material_id: i64,
    material_code: String,
    material_name: String,
    material_source: MaterialSource,
    work_order_quantity: Decimal,
    purchase_order_quantity: Decimal,
}

fn aggregate_plan_lines(lines: &[ComputationLine]) -> BTreeMap<(i64, &'static str), PlanAccum> {
    let mut groups: BTreeMap<(i64, &'static str), PlanAccum> = BTreeMap::new();
    for line in lines {
        if matches!(line.material_source, MaterialSource::Phantom) {
            continue;
        }
        let entry = groups
            .entry((line.material_id, line.material_source.as_str()))
            .or_insert_with(|| PlanAccum {
                material_id: line.material_id,
                material_code: line.material_code.clone(),
                material_name: line.material_name.clone(),
                material_source: line.material_source,
                work_order_quantity: Decimal::ZERO,
                purchase_order_quantity: Decimal::ZERO,
            });
        if line.material_source.is_purchased() {
            entry.purchase_order_quantity += line.procurement_quantity();
        } else {
            entry.work_order_quantity += line.production_quantity();
        }
    }
    // 两个方向数量都为零的组不落计划行
    groups.retain(|_, g| {
        g.work_order_quantity > Decimal::ZERO || g.purchase_order_quantity > Decimal::ZERO
    });
    groups
}

#[async_trait]
impl CommandHandler<PushDocumentCommand> for PushDocumentHandler {
    async fn handle(&self, command: PushDocumentCommand) -> AppResult<PushOutcome> {
        if !transition_allowed(command.source_kind, command.target_kind) {
            record_push(command.source_kind, command.target_kind, false);
            return Err(AppError::transition_not_allowed(format!(
                "不支持的下推类型: {} -> {}",
                command.source_kind.as_str(),
                command.target_kind.as_str()
            )));
        }

        let result = with_conditional_retry(
            &self.retry,
            "push_document",
            || self.push_once(&command),
            AppError::is_contention,
        )
        .await;

        match &result {
            Ok(outcome) => {
                record_push(command.source_kind, command.target_kind, true);
                info!(
                    tenant_id = %command.tenant_id,
                    source_kind = %command.source_kind,
                    source_id = command.source_id,
                    target_kind = %command.target_kind,
                    targets = outcome.targets.len(),
                    "Push succeeded"
                );
            }
            Err(e) => {
                record_push(command.source_kind, command.target_kind, false);
                info!(
                    tenant_id = %command.tenant_id,
                    source_kind = %command.source_kind,
                    source_id = command.source_id,
                    target_kind = %command.target_kind,
                    error = %e,
                    "Push failed"
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mes_errors::AppError;

    use super::super::testing::*;
    use super::*;
    use crate::application::commands::orchestrator::PushParams;
    use crate::domain::coding::system_rules;
    use crate::domain::documents::{BusinessMode, DocKind, ExecutionStatus, MaterialSource};
    use crate::domain::ports::SupplierRef;
    use crate::domain::relations::RelationMode;

    fn handler(
        factory: Arc<FakeUnitOfWorkFactory>,
        master: FakeMasterData,
    ) -> PushDocumentHandler {
        let master = Arc::new(master);
        PushDocumentHandler::new(factory, master.clone(), master)
    }

    fn push(
        tenant_id: mes_common::TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
    ) -> PushDocumentCommand {
        PushDocumentCommand {
            tenant_id,
            source_kind,
            source_id,
            target_kind,
            params: PushParams::default(),
            created_by: None,
        }
    }

    /// 布置一个已完成的计算单和明细行，返回 (工厂, 计算单 ID)
    fn seed_computation(
        tenant_id: mes_common::TenantId,
        rule_code: &str,
        lines: Vec<LineSpec>,
    ) -> (Arc<FakeUnitOfWorkFactory>, i64) {
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(tenant_id, rule_code, "{SEQ:4}");
            rule.id = 9001;
            rule
        });
        let mut computation = completed_computation(tenant_id, 501);
        computation.id = 100;
        store.computations.push(computation);
        for spec in lines {
            store.computation_lines.push(computation_line(100, spec));
        }
        (Arc::new(FakeUnitOfWorkFactory::new(store)), 100)
    }

    #[tokio::test]
    async fn test_push_demand_creates_computation_and_backlink() {
        let tenant_id = tenant();
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(tenant_id, system_rules::DEMAND_COMPUTATION_CODE, "{SEQ:4}");
            rule.id = 9001;
            rule
        });
        let mut demand = audited_demand(tenant_id, BusinessMode::Mts);
        demand.id = 1;
        store.demands.push(demand);

        let factory = Arc::new(FakeUnitOfWorkFactory::new(store));
        let handler = handler(factory.clone(), FakeMasterData::default());

        let outcome = handler
            .handle(push(tenant_id, DocKind::Demand, 1, DocKind::DemandComputation))
            .await
            .unwrap();
        assert_eq!(outcome.message, "下推成功");
        assert_eq!(outcome.targets.len(), 1);
        assert_eq!(outcome.targets[0].code, "DC-0001");

        let store = factory.snapshot();
        assert_eq!(store.computations.len(), 1);
        assert_eq!(store.computations[0].computation_code, "DC-0001");
        assert_eq!(store.computations[0].demand_id, 1);

        let demand = &store.demands[0];
        assert!(demand.pushed_to_computation);
        assert_eq!(demand.computation_id, Some(store.computations[0].id));
        assert_eq!(demand.computation_code.as_deref(), Some("DC-0001"));

        assert_eq!(store.relations.len(), 1);
        let edge = &store.relations[0];
        assert_eq!(edge.relation_mode, RelationMode::Push);
        assert_eq!(edge.demand_id, Some(1));
        assert_eq!(edge.relation_desc, "从需求下推到需求计算");
    }

    #[tokio::test]
    async fn test_push_demand_twice_rejected_until_computation_deleted() {
        let tenant_id = tenant();
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(tenant_id, system_rules::DEMAND_COMPUTATION_CODE, "{SEQ:4}");
            rule.id = 9001;
            rule
        });
        let mut demand = audited_demand(tenant_id, BusinessMode::Mts);
        demand.id = 1;
        store.demands.push(demand);

        let factory = Arc::new(FakeUnitOfWorkFactory::new(store));
        let handler = handler(factory.clone(), FakeMasterData::default());
        let command = push(tenant_id, DocKind::Demand, 1, DocKind::DemandComputation);

        handler.handle(command.clone()).await.unwrap();
        let err = handler.handle(command.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyPropagated(_)));

        // 计算单被删除后，失效的标记不再阻止重推
        factory.mutate(|store| {
            store.computations[0].deleted_at = Some(chrono::Utc::now());
        });
        let outcome = handler.handle(command).await.unwrap();
        assert_eq!(outcome.targets[0].code, "DC-0002");
    }

    #[tokio::test]
    async fn test_push_draft_demand_rejected() {
        let tenant_id = tenant();
        let mut store = Store::default();
        let mut demand = audited_demand(tenant_id, BusinessMode::Mts);
        demand.id = 1;
        demand.status = crate::domain::documents::DemandStatus::Draft;
        store.demands.push(demand);

        let factory = Arc::new(FakeUnitOfWorkFactory::new(store));
        let handler = handler(factory, FakeMasterData::default());
        let err = handler
            .handle(push(tenant_id, DocKind::Demand, 1, DocKind::DemandComputation))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_push_unknown_transition_rejected() {
        let tenant_id = tenant();
        let factory = Arc::new(FakeUnitOfWorkFactory::new(Store::default()));
        let handler = handler(factory, FakeMasterData::default());
        let err = handler
            .handle(push(tenant_id, DocKind::WorkOrder, 1, DocKind::Demand))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TransitionNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_push_work_orders_aggregates_per_material() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::WORK_ORDER_CODE,
            vec![
                LineSpec {
                    material_id: 11,
                    material_code: "M1",
                    material_name: "物料一",
                    suggested_production: 30,
                    production_window: Some((date(2025, 1, 1), date(2025, 1, 10))),
                    ..Default::default()
                },
                LineSpec {
                    material_id: 11,
                    material_code: "M1",
                    material_name: "物料一",
                    suggested_production: 30,
                    production_window: Some((date(2025, 1, 5), date(2025, 1, 15))),
                    ..Default::default()
                },
                LineSpec {
                    material_id: 12,
                    material_code: "M2",
                    material_name: "物料二",
                    suggested_production: 10,
                    ..Default::default()
                },
            ],
        );
        let handler = handler(factory.clone(), FakeMasterData::default());

        let outcome = handler
            .handle(push(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                DocKind::WorkOrder,
            ))
            .await
            .unwrap();
        assert_eq!(outcome.message, "下推成功，共生成2个工单");

        let store = factory.snapshot();
        assert_eq!(store.work_orders.len(), 2);

        let m1 = store.work_orders.iter().find(|w| w.material_id == 11).unwrap();
        assert_eq!(m1.quantity, Decimal::from(60));
        assert_eq!(m1.planned_start_date, Some(date(2025, 1, 1)));
        assert_eq!(m1.planned_end_date, Some(date(2025, 1, 15)));
        assert_eq!(m1.remarks.as_deref(), Some("由需求计算DC-0001下推生成"));

        let m2 = store.work_orders.iter().find(|w| w.material_id == 12).unwrap();
        assert_eq!(m2.quantity, Decimal::from(10));

        assert_eq!(store.relations.len(), 2);
        assert!(store.relations.iter().all(|r| r.demand_id == Some(501)));
    }

    #[tokio::test]
    async fn test_push_work_orders_again_rejected_then_reopened_by_soft_delete() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::WORK_ORDER_CODE,
            vec![
                LineSpec {
                    material_id: 11,
                    material_code: "M1",
                    material_name: "物料一",
                    suggested_production: 60,
                    ..Default::default()
                },
                LineSpec {
                    material_id: 12,
                    material_code: "M2",
                    material_name: "物料二",
                    suggested_production: 10,
                    ..Default::default()
                },
            ],
        );
        let handler = handler(factory.clone(), FakeMasterData::default());
        let command = push(
            tenant_id,
            DocKind::DemandComputation,
            computation_id,
            DocKind::WorkOrder,
        );

        handler.handle(command.clone()).await.unwrap();
        let err = handler.handle(command.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyPropagated(_)));

        // 软删除 M1 的工单后重新下推，只补 M1
        factory.mutate(|store| {
            let work_order = store
                .work_orders
                .iter_mut()
                .find(|w| w.material_id == 11)
                .unwrap();
            work_order.deleted_at = Some(chrono::Utc::now());
        });
        let outcome = handler.handle(command).await.unwrap();
        assert_eq!(outcome.targets.len(), 1);

        let store = factory.snapshot();
        let alive: Vec<_> = store
            .work_orders
            .iter()
            .filter(|w| w.deleted_at.is_none())
            .collect();
        assert_eq!(alive.len(), 2);
        assert!(alive.iter().any(|w| w.material_id == 11));
        assert!(alive.iter().any(|w| w.material_id == 12));
    }

    #[tokio::test]
    async fn test_push_work_orders_without_producible_lines() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::WORK_ORDER_CODE,
            vec![LineSpec {
                material_id: 21,
                material_code: "B1",
                material_name: "外购件",
                source: MaterialSource::Buy,
                planned_procurement: 5,
                ..Default::default()
            }],
        );
        let handler = handler(factory, FakeMasterData::default());
        let err = handler
            .handle(push(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                DocKind::WorkOrder,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NothingToPush(_)));
    }

    #[tokio::test]
    async fn test_push_purchase_orders_requires_supplier() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::PURCHASE_ORDER_CODE,
            vec![LineSpec {
                material_id: 21,
                material_code: "B1",
                material_name: "外购件",
                source: MaterialSource::Buy,
                planned_procurement: 5,
                ..Default::default()
            }],
        );
        let handler = handler(factory.clone(), FakeMasterData::default());

        let err = handler
            .handle(push(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                DocKind::PurchaseOrder,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingSupplier(_)));

        // 中止的下推不留下任何部分写入
        let store = factory.snapshot();
        assert!(store.purchase_orders.is_empty());
        assert!(store.relations.is_empty());
        assert!(store.sequences.is_empty());
    }

    #[tokio::test]
    async fn test_push_purchase_orders_one_per_material() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::PURCHASE_ORDER_CODE,
            vec![
                LineSpec {
                    material_id: 21,
                    material_code: "B1",
                    material_name: "外购件一",
                    source: MaterialSource::Buy,
                    suggested_procurement: 8,
                    planned_procurement: 5,
                    ..Default::default()
                },
                LineSpec {
                    material_id: 22,
                    material_code: "B2",
                    material_name: "外购件二",
                    source: MaterialSource::Buy,
                    planned_procurement: 3,
                    ..Default::default()
                },
            ],
        );
        let master = FakeMasterData::default().with_supplier(SupplierRef {
            id: 7,
            code: "S-007".to_string(),
            name: "供应商七".to_string(),
        });
        let handler = handler(factory.clone(), master);

        let mut command = push(
            tenant_id,
            DocKind::DemandComputation,
            computation_id,
            DocKind::PurchaseOrder,
        );
        command.params.supplier_id = Some(7);
        command.params.unit_price = Some(Decimal::from(2));

        let outcome = handler.handle(command).await.unwrap();
        assert_eq!(outcome.message, "下推成功，共生成2个采购单");

        let store = factory.snapshot();
        assert_eq!(store.purchase_orders.len(), 2);
        assert!(store
            .purchase_orders
            .iter()
            .all(|o| o.supplier_id == 7 && o.supplier_name == "供应商七"));

        let b1 = store
            .purchase_order_lines
            .iter()
            .find(|l| l.material_id == 21)
            .unwrap();
        // 建议值优先于计划值
        assert_eq!(b1.ordered_quantity, Decimal::from(8));
        assert_eq!(b1.total_price, Decimal::from(16));
    }

    #[tokio::test]
    async fn test_push_plan_aggregates_by_material_and_source() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::PRODUCTION_PLAN_CODE,
            vec![
                LineSpec {
                    material_id: 11,
                    material_code: "M1",
                    material_name: "物料一",
                    suggested_production: 30,
                    production_window: Some((date(2025, 1, 1), date(2025, 1, 10))),
                    ..Default::default()
                },
                LineSpec {
                    material_id: 11,
                    material_code: "M1",
                    material_name: "物料一",
                    suggested_production: 30,
                    production_window: Some((date(2025, 1, 5), date(2025, 1, 15))),
                    ..Default::default()
                },
                LineSpec {
                    material_id: 21,
                    material_code: "B1",
                    material_name: "外购件",
                    source: MaterialSource::Buy,
                    planned_procurement: 5,
                    ..Default::default()
                },
            ],
        );
        let handler = handler(factory.clone(), FakeMasterData::default());

        let outcome = handler
            .handle(push(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                DocKind::ProductionPlan,
            ))
            .await
            .unwrap();
        assert_eq!(outcome.targets.len(), 1);

        let store = factory.snapshot();
        let plan = &store.plans[0];
        assert_eq!(plan.plan_name, "DC-0001生产计划");
        assert_eq!(plan.plan_start_date, Some(date(2025, 1, 1)));
        assert_eq!(plan.plan_end_date, Some(date(2025, 1, 15)));

        assert_eq!(store.plan_lines.len(), 2);
        let produce = store.plan_lines.iter().find(|l| l.material_id == 11).unwrap();
        assert_eq!(produce.work_order_quantity, Decimal::from(60));
        assert_eq!(produce.suggested_action, SuggestedAction::Produce);
        let buy = store.plan_lines.iter().find(|l| l.material_id == 21).unwrap();
        assert_eq!(buy.purchase_order_quantity, Decimal::from(5));
        assert_eq!(buy.suggested_action, SuggestedAction::Purchase);
    }

    #[tokio::test]
    async fn test_push_requisition_packs_all_purchase_lines() {
        let tenant_id = tenant();
        let (factory, computation_id) = seed_computation(
            tenant_id,
            system_rules::PURCHASE_REQUISITION_CODE,
            vec![
                LineSpec {
                    material_id: 21,
                    material_code: "B1",
                    material_name: "外购件一",
                    source: MaterialSource::Buy,
                    suggested_procurement: 8,
                    ..Default::default()
                },
                LineSpec {
                    material_id: 22,
                    material_code: "B2",
                    material_name: "外购件二",
                    source: MaterialSource::Buy,
                    suggested_procurement: 3,
                    ..Default::default()
                },
            ],
        );
        let handler = handler(factory.clone(), FakeMasterData::default());

        let outcome = handler
            .handle(push(
                tenant_id,
                DocKind::DemandComputation,
                computation_id,
                DocKind::PurchaseRequisition,
            ))
            .await
            .unwrap();
        assert_eq!(outcome.targets.len(), 1);
        assert_eq!(outcome.targets[0].code, "PR-0001");

        let store = factory.snapshot();
        assert_eq!(store.requisitions.len(), 1);
        assert_eq!(store.requisitions[0].requisition_name, "DC-0001采购申请");
        assert_eq!(store.requisition_lines.len(), 2);
    }

    #[tokio::test]
    async fn test_push_plan_to_work_orders_marks_lines_executed() {
        let tenant_id = tenant();
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(tenant_id, system_rules::WORK_ORDER_CODE, "{SEQ:4}");
            rule.id = 9001;
            rule
        });
        store.plans.push(ProductionPlan {
            id: 200,
            uuid: uuid::Uuid::now_v7(),
            tenant_id,
            plan_code: "PP-0001".to_string(),
            plan_name: "一月生产计划".to_string(),
            plan_type: ComputationType::Mrp,
            source_type: "demand_computation".to_string(),
            source_id: 100,
            source_code: "DC-0001".to_string(),
            plan_start_date: Some(date(2025, 1, 1)),
            plan_end_date: Some(date(2025, 1, 31)),
            status: crate::domain::documents::PlanStatus::Audited,
            remarks: None,
            audit_info: mes_common::AuditInfo::new(None),
            deleted_at: None,
        });
        store.plan_lines.push(PlanLine {
            id: 201,
            plan_id: 200,
            material_id: 11,
            material_code: "M1".to_string(),
            material_name: "物料一".to_string(),
            material_source: MaterialSource::Make,
            planned_quantity: Decimal::from(60),
            suggested_action: SuggestedAction::Produce,
            work_order_quantity: Decimal::from(60),
            purchase_order_quantity: Decimal::ZERO,
            execution_status: ExecutionStatus::Pending,
            work_order_id: None,
            purchase_order_id: None,
            notes: None,
        });
        store.plan_lines.push(PlanLine {
            id: 202,
            plan_id: 200,
            material_id: 21,
            material_code: "B1".to_string(),
            material_name: "外购件".to_string(),
            material_source: MaterialSource::Buy,
            planned_quantity: Decimal::from(5),
            suggested_action: SuggestedAction::Purchase,
            work_order_quantity: Decimal::ZERO,
            purchase_order_quantity: Decimal::from(5),
            execution_status: ExecutionStatus::Pending,
            work_order_id: None,
            purchase_order_id: None,
            notes: None,
        });

        let factory = Arc::new(FakeUnitOfWorkFactory::new(store));
        let handler = handler(factory.clone(), FakeMasterData::default());

        let outcome = handler
            .handle(push(tenant_id, DocKind::ProductionPlan, 200, DocKind::WorkOrder))
            .await
            .unwrap();
        assert_eq!(outcome.message, "下推成功，共生成1个工单");

        let store = factory.snapshot();
        assert_eq!(store.work_orders.len(), 1);
        let work_order = &store.work_orders[0];
        assert_eq!(work_order.quantity, Decimal::from(60));
        assert_eq!(work_order.production_mode, BusinessMode::Mts);
        assert_eq!(work_order.source_code.as_deref(), Some("PP-0001"));

        let executed = store.plan_lines.iter().find(|l| l.id == 201).unwrap();
        assert_eq!(executed.execution_status, ExecutionStatus::Executed);
        assert_eq!(executed.work_order_id, Some(work_order.id));
        // 采购行不受影响
        let untouched = store.plan_lines.iter().find(|l| l.id == 202).unwrap();
        assert_eq!(untouched.execution_status, ExecutionStatus::Pending);
    }
}
