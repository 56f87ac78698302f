//! 编排与导入测试共用的内存存储
//!
//! `FakeUnitOfWorkFactory` 在 begin 时克隆共享存储作为工作副本，
//! 仓储操作只写工作副本，commit 时整体写回共享存储，rollback 丢弃。
//! 这让测试能够断言失败路径不留下任何部分写入。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use mes_common::{AuditInfo, Pagination, TenantId};
use mes_errors::AppResult;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::coding::{CodeRule, CodeSequence, ResetPolicy};
use crate::domain::documents::{
    BusinessMode, ComputationLine, ComputationStatus, ComputationType, Demand, DemandComputation,
    DemandStatus, DocKind, FinanceDocument, MaterialSource, PlanLine, ProductionPlan, PurchaseOrder,
    PurchaseOrderLine, PurchaseReceipt, PurchaseRequisition, ReceiptLine, RequisitionLine,
    ReviewStatus, WorkOrder, WorkOrderOperation,
};
use crate::domain::ports::{
    CodeMappingPort, CustomerLookup, CustomerRef, MaterialLookup, MaterialRef, OperationLookup,
    OperationRef, SupplierLookup, SupplierRef, WarehouseLookup, WarehouseRef, WorkshopLookup,
    WorkshopRef,
};
use crate::domain::relations::{DocRelation, RelationMode};
use crate::domain::repositories::coding::{CodeRuleRepository, CodeSequenceRepository};
use crate::domain::repositories::documents::{
    ComputationRepository, DemandRepository, FinanceRepository, PlanRepository,
    PurchaseOrderRepository, ReceiptRepository, RequisitionRepository, WorkOrderRepository,
};
use crate::domain::repositories::relations::RelationRepository;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// 全部聚合的内存表
#[derive(Default, Clone)]
pub(crate) struct Store {
    pub rules: Vec<CodeRule>,
    pub sequences: Vec<CodeSequence>,
    pub demands: Vec<Demand>,
    pub computations: Vec<DemandComputation>,
    pub computation_lines: Vec<ComputationLine>,
    pub plans: Vec<ProductionPlan>,
    pub plan_lines: Vec<PlanLine>,
    pub work_orders: Vec<WorkOrder>,
    pub work_order_operations: Vec<WorkOrderOperation>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub purchase_order_lines: Vec<PurchaseOrderLine>,
    pub requisitions: Vec<PurchaseRequisition>,
    pub requisition_lines: Vec<RequisitionLine>,
    pub receipts: Vec<PurchaseReceipt>,
    pub receipt_lines: Vec<ReceiptLine>,
    pub finance_documents: Vec<FinanceDocument>,
    pub relations: Vec<DocRelation>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type SharedStore = Arc<Mutex<Store>>;

pub(crate) struct FakeUnitOfWorkFactory {
    shared: SharedStore,
}

impl FakeUnitOfWorkFactory {
    pub fn new(store: Store) -> Self {
        Self {
            shared: Arc::new(Mutex::new(store)),
        }
    }

    pub fn snapshot(&self) -> Store {
        self.shared.lock().unwrap().clone()
    }

    /// 直接修改共享存储，用于在两次命令之间布置状态
    pub fn mutate(&self, f: impl FnOnce(&mut Store)) {
        f(&mut self.shared.lock().unwrap());
    }
}

#[async_trait]
impl UnitOfWorkFactory for FakeUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let working = Arc::new(Mutex::new(self.shared.lock().unwrap().clone()));
        Ok(Box::new(FakeUnitOfWork {
            shared: Arc::clone(&self.shared),
            code_rules: FakeRepo::new(&working),
            code_sequences: FakeRepo::new(&working),
            demands: FakeRepo::new(&working),
            computations: FakeRepo::new(&working),
            plans: FakeRepo::new(&working),
            work_orders: FakeRepo::new(&working),
            purchase_orders: FakeRepo::new(&working),
            requisitions: FakeRepo::new(&working),
            receipts: FakeRepo::new(&working),
            finance_documents: FakeRepo::new(&working),
            relations: FakeRepo::new(&working),
            working,
        }))
    }
}

/// 共用的仓储句柄，所有仓储实现挂在同一个工作副本上
pub(crate) struct FakeRepo {
    store: SharedStore,
}

impl FakeRepo {
    fn new(store: &SharedStore) -> Self {
        Self {
            store: Arc::clone(store),
        }
    }
}

pub(crate) struct FakeUnitOfWork {
    shared: SharedStore,
    working: SharedStore,
    code_rules: FakeRepo,
    code_sequences: FakeRepo,
    demands: FakeRepo,
    computations: FakeRepo,
    plans: FakeRepo,
    work_orders: FakeRepo,
    purchase_orders: FakeRepo,
    requisitions: FakeRepo,
    receipts: FakeRepo,
    finance_documents: FakeRepo,
    relations: FakeRepo,
}

#[async_trait]
impl UnitOfWork for FakeUnitOfWork {
    fn code_rules(&self) -> &dyn CodeRuleRepository {
        &self.code_rules
    }

    fn code_sequences(&self) -> &dyn CodeSequenceRepository {
        &self.code_sequences
    }

    fn demands(&self) -> &dyn DemandRepository {
        &self.demands
    }

    fn computations(&self) -> &dyn ComputationRepository {
        &self.computations
    }

    fn plans(&self) -> &dyn PlanRepository {
        &self.plans
    }

    fn work_orders(&self) -> &dyn WorkOrderRepository {
        &self.work_orders
    }

    fn purchase_orders(&self) -> &dyn PurchaseOrderRepository {
        &self.purchase_orders
    }

    fn requisitions(&self) -> &dyn RequisitionRepository {
        &self.requisitions
    }

    fn receipts(&self) -> &dyn ReceiptRepository {
        &self.receipts
    }

    fn finance_documents(&self) -> &dyn FinanceRepository {
        &self.finance_documents
    }

    fn relations(&self) -> &dyn RelationRepository {
        &self.relations
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let snapshot = self.working.lock().unwrap().clone();
        *self.shared.lock().unwrap() = snapshot;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CodeRuleRepository for FakeRepo {
    async fn find_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<Option<CodeRule>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .rules
            .iter()
            .find(|r| r.tenant_id == *tenant_id && r.code == code && r.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<CodeRule>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .rules
            .iter()
            .find(|r| r.tenant_id == *tenant_id && r.id == id && r.deleted_at.is_none())
            .cloned())
    }

    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool> {
        Ok(self.find_by_code(tenant_id, code).await?.is_some())
    }

    async fn insert(&self, rule: &CodeRule) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut rule = rule.clone();
        rule.id = id;
        store.rules.push(rule);
        Ok(id)
    }

    async fn update(&self, rule: &CodeRule) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(existing) = store.rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule.clone();
        }
        Ok(())
    }

    async fn soft_delete(&self, tenant_id: &TenantId, id: i64) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(rule) = store
            .rules
            .iter_mut()
            .find(|r| r.tenant_id == *tenant_id && r.id == id)
        {
            rule.deleted_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<CodeRule>, i64)> {
        let store = self.store.lock().unwrap();
        let all: Vec<CodeRule> = store
            .rules
            .iter()
            .filter(|r| r.tenant_id == *tenant_id && r.deleted_at.is_none())
            .cloned()
            .collect();
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.page_size as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl CodeSequenceRepository for FakeRepo {
    async fn ensure(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
        initial_value: i64,
    ) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        let exists = store.sequences.iter().any(|s| {
            s.rule_id == rule_id && s.tenant_id == *tenant_id && s.scope_key == scope_key
        });
        if !exists {
            let id = store.next_id();
            store.sequences.push(CodeSequence {
                id,
                rule_id,
                tenant_id: *tenant_id,
                scope_key: scope_key.to_string(),
                current_value: initial_value,
                last_reset: None,
            });
        }
        Ok(())
    }

    async fn lock(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
    ) -> AppResult<CodeSequence> {
        let store = self.store.lock().unwrap();
        Ok(store
            .sequences
            .iter()
            .find(|s| {
                s.rule_id == rule_id && s.tenant_id == *tenant_id && s.scope_key == scope_key
            })
            .cloned()
            .expect("sequence row must be ensured before lock"))
    }

    async fn update(
        &self,
        id: i64,
        current_value: i64,
        last_reset: Option<NaiveDate>,
    ) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(sequence) = store.sequences.iter_mut().find(|s| s.id == id) {
            sequence.current_value = current_value;
            sequence.last_reset = last_reset;
        }
        Ok(())
    }
}

#[async_trait]
impl DemandRepository for FakeRepo {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<Demand>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .demands
            .iter()
            .find(|d| d.tenant_id == *tenant_id && d.id == id && d.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, demand: &Demand) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(existing) = store.demands.iter_mut().find(|d| d.id == demand.id) {
            *existing = demand.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl ComputationRepository for FakeRepo {
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<DemandComputation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .computations
            .iter()
            .find(|c| c.tenant_id == *tenant_id && c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, computation: &DemandComputation) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut computation = computation.clone();
        computation.id = id;
        store.computations.push(computation);
        Ok(id)
    }

    async fn list_lines(&self, computation_id: i64) -> AppResult<Vec<ComputationLine>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .computation_lines
            .iter()
            .filter(|l| l.computation_id == computation_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PlanRepository for FakeRepo {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<ProductionPlan>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .plans
            .iter()
            .find(|p| p.tenant_id == *tenant_id && p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, plan: &ProductionPlan) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut plan = plan.clone();
        plan.id = id;
        store.plans.push(plan);
        Ok(id)
    }

    async fn insert_line(&self, line: &PlanLine) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut line = line.clone();
        line.id = id;
        store.plan_lines.push(line);
        Ok(id)
    }

    async fn list_lines(&self, plan_id: i64) -> AppResult<Vec<PlanLine>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .plan_lines
            .iter()
            .filter(|l| l.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn update_line_execution(&self, line: &PlanLine) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(existing) = store.plan_lines.iter_mut().find(|l| l.id == line.id) {
            existing.execution_status = line.execution_status;
            existing.work_order_id = line.work_order_id;
        }
        Ok(())
    }
}

#[async_trait]
impl WorkOrderRepository for FakeRepo {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<WorkOrder>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .work_orders
            .iter()
            .find(|w| w.tenant_id == *tenant_id && w.id == id && w.deleted_at.is_none())
            .cloned())
    }

    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool> {
        let store = self.store.lock().unwrap();
        Ok(store
            .work_orders
            .iter()
            .any(|w| w.tenant_id == *tenant_id && w.code == code && w.deleted_at.is_none()))
    }

    async fn insert(&self, work_order: &WorkOrder) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut work_order = work_order.clone();
        work_order.id = id;
        store.work_orders.push(work_order);
        Ok(id)
    }

    async fn insert_operation(&self, operation: &WorkOrderOperation) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut operation = operation.clone();
        operation.id = id;
        store.work_order_operations.push(operation);
        Ok(id)
    }
}

#[async_trait]
impl PurchaseOrderRepository for FakeRepo {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<PurchaseOrder>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .purchase_orders
            .iter()
            .find(|o| o.tenant_id == *tenant_id && o.id == id && o.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, order: &PurchaseOrder) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut order = order.clone();
        order.id = id;
        store.purchase_orders.push(order);
        Ok(id)
    }

    async fn insert_line(&self, line: &PurchaseOrderLine) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut line = line.clone();
        line.id = id;
        store.purchase_order_lines.push(line);
        Ok(id)
    }

    async fn list_lines(&self, order_id: i64) -> AppResult<Vec<PurchaseOrderLine>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .purchase_order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequisitionRepository for FakeRepo {
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<PurchaseRequisition>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .requisitions
            .iter()
            .find(|r| r.tenant_id == *tenant_id && r.id == id && r.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, requisition: &PurchaseRequisition) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut requisition = requisition.clone();
        requisition.id = id;
        store.requisitions.push(requisition);
        Ok(id)
    }

    async fn insert_line(&self, line: &RequisitionLine) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut line = line.clone();
        line.id = id;
        store.requisition_lines.push(line);
        Ok(id)
    }

    async fn list_lines(&self, requisition_id: i64) -> AppResult<Vec<RequisitionLine>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .requisition_lines
            .iter()
            .filter(|l| l.requisition_id == requisition_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReceiptRepository for FakeRepo {
    async fn insert(&self, receipt: &PurchaseReceipt) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut receipt = receipt.clone();
        receipt.id = id;
        store.receipts.push(receipt);
        Ok(id)
    }

    async fn insert_line(&self, line: &ReceiptLine) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut line = line.clone();
        line.id = id;
        store.receipt_lines.push(line);
        Ok(id)
    }
}

#[async_trait]
impl FinanceRepository for FakeRepo {
    async fn insert(&self, document: &FinanceDocument) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut document = document.clone();
        document.id = id;
        store.finance_documents.push(document);
        Ok(id)
    }
}

#[async_trait]
impl RelationRepository for FakeRepo {
    async fn find_existing(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
        target_id: i64,
        mode: RelationMode,
    ) -> AppResult<Option<DocRelation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .relations
            .iter()
            .find(|r| {
                r.tenant_id == *tenant_id
                    && r.source_kind == source_kind
                    && r.source_id == source_id
                    && r.target_kind == target_kind
                    && r.target_id == target_id
                    && r.relation_mode == mode
                    && r.deleted_at.is_none()
            })
            .cloned())
    }

    async fn insert(&self, relation: &DocRelation) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let mut relation = relation.clone();
        relation.id = id;
        store.relations.push(relation);
        Ok(id)
    }

    async fn list_targets(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: Option<DocKind>,
    ) -> AppResult<Vec<DocRelation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .relations
            .iter()
            .filter(|r| {
                r.tenant_id == *tenant_id
                    && r.source_kind == source_kind
                    && r.source_id == source_id
                    && target_kind.is_none_or(|k| r.target_kind == k)
                    && r.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }

    async fn list_sources(
        &self,
        tenant_id: &TenantId,
        target_kind: DocKind,
        target_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .relations
            .iter()
            .filter(|r| {
                r.tenant_id == *tenant_id
                    && r.target_kind == target_kind
                    && r.target_id == target_id
                    && r.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }

    async fn list_by_demand(
        &self,
        tenant_id: &TenantId,
        demand_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .relations
            .iter()
            .filter(|r| {
                r.tenant_id == *tenant_id && r.demand_id == Some(demand_id) && r.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// 主数据端口 Fake
// ============================================================================

/// 以 HashMap 为后端的主数据端口，所有查询端口共用一份
#[derive(Default, Clone)]
pub(crate) struct FakeMasterData {
    pub materials: HashMap<String, MaterialRef>,
    pub warehouses: HashMap<String, WarehouseRef>,
    pub operations: HashMap<String, OperationRef>,
    pub suppliers: HashMap<i64, SupplierRef>,
    pub customers: HashMap<String, CustomerRef>,
    pub workshops: HashMap<String, WorkshopRef>,
}

impl FakeMasterData {
    pub fn with_material(mut self, material: MaterialRef) -> Self {
        self.materials.insert(material.code.clone(), material);
        self
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseRef) -> Self {
        self.warehouses.insert(warehouse.code.clone(), warehouse);
        self
    }

    pub fn with_operation(mut self, operation: OperationRef) -> Self {
        self.operations.insert(operation.code.clone(), operation);
        self
    }

    pub fn with_supplier(mut self, supplier: SupplierRef) -> Self {
        self.suppliers.insert(supplier.id, supplier);
        self
    }

    pub fn with_customer(mut self, customer: CustomerRef) -> Self {
        self.customers.insert(customer.code.clone(), customer);
        self
    }
}

#[async_trait]
impl MaterialLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<MaterialRef>> {
        Ok(self.materials.get(code).cloned())
    }

    async fn find_by_id(&self, _tenant_id: &TenantId, id: i64) -> AppResult<Option<MaterialRef>> {
        Ok(self.materials.values().find(|m| m.id == id).cloned())
    }
}

#[async_trait]
impl WarehouseLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WarehouseRef>> {
        Ok(self.warehouses.get(code).cloned())
    }
}

#[async_trait]
impl OperationLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<OperationRef>> {
        Ok(self.operations.get(code).cloned())
    }
}

#[async_trait]
impl SupplierLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<SupplierRef>> {
        Ok(self.suppliers.values().find(|s| s.code == code).cloned())
    }

    async fn find_by_id(&self, _tenant_id: &TenantId, id: i64) -> AppResult<Option<SupplierRef>> {
        Ok(self.suppliers.get(&id).cloned())
    }
}

#[async_trait]
impl CustomerLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<CustomerRef>> {
        Ok(self.customers.get(code).cloned())
    }
}

#[async_trait]
impl WorkshopLookup for FakeMasterData {
    async fn find_by_code(
        &self,
        _tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WorkshopRef>> {
        Ok(self.workshops.get(code).cloned())
    }
}

#[async_trait]
impl CodeMappingPort for FakeMasterData {
    async fn convert(
        &self,
        _tenant_id: &TenantId,
        _external_system: &str,
        _entity_type: &str,
        external_code: &str,
    ) -> AppResult<String> {
        Ok(external_code.to_string())
    }
}

// ============================================================================
// 造数辅助
// ============================================================================

pub(crate) fn system_rule(tenant_id: TenantId, code: &str, template: &str) -> CodeRule {
    CodeRule::new(
        tenant_id,
        code.to_string(),
        code.to_string(),
        template.to_string(),
        1,
        1,
        4,
        ResetPolicy::Never,
        None,
        None,
    )
    .unwrap()
    .as_system()
}

pub(crate) fn audited_demand(tenant_id: TenantId, mode: BusinessMode) -> Demand {
    Demand {
        id: 0,
        uuid: Uuid::now_v7(),
        tenant_id,
        demand_code: "XQ-0001".to_string(),
        demand_name: "一月备货需求".to_string(),
        business_mode: mode,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: None,
        customer_id: None,
        customer_name: None,
        order_date: None,
        delivery_date: None,
        total_quantity: Decimal::from(100),
        status: DemandStatus::Audited,
        review_status: ReviewStatus::Approved,
        pushed_to_computation: false,
        computation_id: None,
        computation_code: None,
        remarks: None,
        audit_info: AuditInfo::new(None),
        deleted_at: None,
    }
}

pub(crate) fn completed_computation(tenant_id: TenantId, demand_id: i64) -> DemandComputation {
    DemandComputation {
        id: 0,
        uuid: Uuid::now_v7(),
        tenant_id,
        computation_code: "DC-0001".to_string(),
        demand_id,
        demand_code: "XQ-0001".to_string(),
        business_mode: BusinessMode::Mts,
        computation_type: ComputationType::Mrp,
        computation_params: serde_json::json!({}),
        status: ComputationStatus::Completed,
        remarks: None,
        audit_info: AuditInfo::new(None),
        deleted_at: None,
    }
}

pub(crate) struct LineSpec {
    pub material_id: i64,
    pub material_code: &'static str,
    pub material_name: &'static str,
    pub source: MaterialSource,
    pub suggested_production: i64,
    pub planned_production: i64,
    pub suggested_procurement: i64,
    pub planned_procurement: i64,
    pub production_window: Option<(NaiveDate, NaiveDate)>,
}

impl Default for LineSpec {
    fn default() -> Self {
        Self {
            material_id: 0,
            material_code: "",
            material_name: "",
            source: MaterialSource::Make,
            suggested_production: 0,
            planned_production: 0,
            suggested_procurement: 0,
            planned_procurement: 0,
            production_window: None,
        }
    }
}

pub(crate) fn computation_line(computation_id: i64, spec: LineSpec) -> ComputationLine {
    ComputationLine {
        id: 0,
        computation_id,
        material_id: spec.material_id,
        material_code: spec.material_code.to_string(),
        material_name: spec.material_name.to_string(),
        material_spec: None,
        unit: Some("件".to_string()),
        material_source: spec.source,
        required_quantity: Decimal::ZERO,
        available_quantity: Decimal::ZERO,
        safety_stock: Decimal::ZERO,
        gross_requirement: Decimal::ZERO,
        net_requirement: Decimal::ZERO,
        suggested_work_order_quantity: Decimal::from(spec.suggested_production),
        planned_production: Decimal::from(spec.planned_production),
        suggested_purchase_order_quantity: Decimal::from(spec.suggested_procurement),
        planned_procurement: Decimal::from(spec.planned_procurement),
        delivery_date: None,
        production_start_date: spec.production_window.map(|(start, _)| start),
        production_completion_date: spec.production_window.map(|(_, end)| end),
        procurement_start_date: None,
        procurement_completion_date: None,
    }
}

pub(crate) fn tenant() -> TenantId {
    TenantId::new()
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
