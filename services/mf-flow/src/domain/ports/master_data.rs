//! 主数据只读查询端口
//!
//! 期初导入和下推编排需要校验物料、仓库、工序等主数据的存在性，
//! 并抓取名称快照写入生成的单据。端口都在事务外读取。

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

/// 物料引用
#[derive(Debug, Clone)]
pub struct MaterialRef {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub spec: Option<String>,
    pub unit: Option<String>,
    /// 默认供应商，采购申请行带出
    pub default_supplier_id: Option<i64>,
}

/// 物料查询端口
#[async_trait]
pub trait MaterialLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<MaterialRef>>;

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<MaterialRef>>;
}

/// 仓库引用
#[derive(Debug, Clone)]
pub struct WarehouseRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// 仓库查询端口
#[async_trait]
pub trait WarehouseLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WarehouseRef>>;
}

/// 工序引用
#[derive(Debug, Clone)]
pub struct OperationRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// 工序查询端口
#[async_trait]
pub trait OperationLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<OperationRef>>;
}

/// 供应商引用
#[derive(Debug, Clone)]
pub struct SupplierRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// 供应商查询端口
#[async_trait]
pub trait SupplierLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<SupplierRef>>;

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<SupplierRef>>;
}

/// 客户引用
#[derive(Debug, Clone)]
pub struct CustomerRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// 客户查询端口
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<CustomerRef>>;
}

/// 车间引用
#[derive(Debug, Clone)]
pub struct WorkshopRef {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// 车间查询端口
#[async_trait]
pub trait WorkshopLookup: Send + Sync {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WorkshopRef>>;
}

/// 外部编码映射端口
///
/// 期初导入的编码可能来自外部系统，按 (外部系统, 实体类型) 转换为
/// 内部编码；没有映射时原样返回。
#[async_trait]
pub trait CodeMappingPort: Send + Sync {
    async fn convert(
        &self,
        tenant_id: &TenantId,
        external_system: &str,
        entity_type: &str,
        external_code: &str,
    ) -> AppResult<String>;
}
