//! 主数据查询端口的 PostgreSQL 适配器
//!
//! 主数据表由主数据服务维护，这里只做事务外的只读查询。

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::{AppError, AppResult};
use sqlx::{FromRow, PgPool};

use crate::domain::ports::{
    CodeMappingPort, CustomerLookup, CustomerRef, MaterialLookup, MaterialRef, OperationLookup,
    OperationRef, SupplierLookup, SupplierRef, WarehouseLookup, WarehouseRef, WorkshopLookup,
    WorkshopRef,
};

/// 所有主数据端口的统一适配器
#[derive(Clone)]
pub struct PostgresMasterData {
    pool: PgPool,
}

impl PostgresMasterData {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MaterialRefRow {
    id: i64,
    code: String,
    name: String,
    spec: Option<String>,
    unit: Option<String>,
    default_supplier_id: Option<i64>,
}

impl MaterialRefRow {
    fn into_ref(self) -> MaterialRef {
        MaterialRef {
            id: self.id,
            code: self.code,
            name: self.name,
            spec: self.spec,
            unit: self.unit,
            default_supplier_id: self.default_supplier_id,
        }
    }
}

/// 编码 + 名称引用行，仓库、工序、供应商等共用
#[derive(Debug, FromRow)]
struct NamedRefRow {
    id: i64,
    code: String,
    name: String,
}

#[async_trait]
impl MaterialLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<MaterialRef>> {
        let row = sqlx::query_as::<_, MaterialRefRow>(
            r#"
            SELECT id, code, name, spec, unit, default_supplier_id
            FROM materials
            WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find material: {}", e)))?;

        Ok(row.map(|r| r.into_ref()))
    }

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<MaterialRef>> {
        let row = sqlx::query_as::<_, MaterialRefRow>(
            r#"
            SELECT id, code, name, spec, unit, default_supplier_id
            FROM materials
            WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find material: {}", e)))?;

        Ok(row.map(|r| r.into_ref()))
    }
}

#[async_trait]
impl WarehouseLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WarehouseRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM warehouses WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find warehouse: {}", e)))?;

        Ok(row.map(|r| WarehouseRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }
}

#[async_trait]
impl OperationLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<OperationRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM operations WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find operation: {}", e)))?;

        Ok(row.map(|r| OperationRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }
}

#[async_trait]
impl SupplierLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<SupplierRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM suppliers WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find supplier: {}", e)))?;

        Ok(row.map(|r| SupplierRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<SupplierRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM suppliers WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find supplier: {}", e)))?;

        Ok(row.map(|r| SupplierRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }
}

#[async_trait]
impl CustomerLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<CustomerRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM customers WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find customer: {}", e)))?;

        Ok(row.map(|r| CustomerRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }
}

#[async_trait]
impl WorkshopLookup for PostgresMasterData {
    async fn find_by_code(
        &self,
        tenant_id: &TenantId,
        code: &str,
    ) -> AppResult<Option<WorkshopRef>> {
        let row = sqlx::query_as::<_, NamedRefRow>(
            "SELECT id, code, name FROM workshops WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find workshop: {}", e)))?;

        Ok(row.map(|r| WorkshopRef {
            id: r.id,
            code: r.code,
            name: r.name,
        }))
    }
}

#[async_trait]
impl CodeMappingPort for PostgresMasterData {
    async fn convert(
        &self,
        tenant_id: &TenantId,
        external_system: &str,
        entity_type: &str,
        external_code: &str,
    ) -> AppResult<String> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT internal_code FROM sys_code_mappings
            WHERE tenant_id = $1 AND external_system = $2 AND entity_type = $3
              AND external_code = $4
            "#,
        )
        .bind(tenant_id.0)
        .bind(external_system)
        .bind(entity_type)
        .bind(external_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to convert code mapping: {}", e)))?;

        // 没有映射时原样返回
        Ok(row
            .map(|(code,)| code)
            .unwrap_or_else(|| external_code.to_string()))
    }
}
