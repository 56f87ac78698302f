//! 单据类型与公共业务枚举

use mes_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 单据类型
///
/// 推拉关系两端的单据种类，纳入推拉网络的单据都在此枚举内。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocKind {
    /// 需求单
    Demand,
    /// 需求计算
    DemandComputation,
    /// 生产计划
    ProductionPlan,
    /// 工单
    WorkOrder,
    /// 采购单
    PurchaseOrder,
    /// 采购申请
    PurchaseRequisition,
}

impl DocKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::DemandComputation => "demand_computation",
            Self::ProductionPlan => "production_plan",
            Self::WorkOrder => "work_order",
            Self::PurchaseOrder => "purchase_order",
            Self::PurchaseRequisition => "purchase_requisition",
        }
    }

    /// 中文名称，用于关系描述与提示文案
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Demand => "需求",
            Self::DemandComputation => "需求计算",
            Self::ProductionPlan => "生产计划",
            Self::WorkOrder => "工单",
            Self::PurchaseOrder => "采购单",
            Self::PurchaseRequisition => "采购申请",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "demand" => Ok(Self::Demand),
            "demand_computation" => Ok(Self::DemandComputation),
            "production_plan" => Ok(Self::ProductionPlan),
            "work_order" => Ok(Self::WorkOrder),
            "purchase_order" => Ok(Self::PurchaseOrder),
            "purchase_requisition" => Ok(Self::PurchaseRequisition),
            other => Err(AppError::validation(format!(
                "unknown document kind: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DocKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 业务模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessMode {
    /// 按库存生产
    #[serde(rename = "MTS")]
    Mts,
    /// 按订单生产
    #[serde(rename = "MTO")]
    Mto,
}

impl BusinessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mts => "MTS",
            Self::Mto => "MTO",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "MTS" => Ok(Self::Mts),
            "MTO" => Ok(Self::Mto),
            other => Err(AppError::validation(format!(
                "unknown business mode: {}",
                other
            ))),
        }
    }

    /// 需求下推时对应的计算类型：备货用 MRP，订单用 LRP
    pub fn computation_type(&self) -> ComputationType {
        match self {
            Self::Mts => ComputationType::Mrp,
            Self::Mto => ComputationType::Lrp,
        }
    }
}

/// 计算类型，也是生产计划的计划类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputationType {
    /// 物料需求计划
    #[serde(rename = "MRP")]
    Mrp,
    /// 长周期需求计划
    #[serde(rename = "LRP")]
    Lrp,
}

impl ComputationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mrp => "MRP",
            Self::Lrp => "LRP",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "MRP" => Ok(Self::Mrp),
            "LRP" => Ok(Self::Lrp),
            other => Err(AppError::validation(format!(
                "unknown computation type: {}",
                other
            ))),
        }
    }
}

/// 物料来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialSource {
    /// 自制
    Make,
    /// 外购
    Buy,
    /// 委外
    Outsource,
    /// 配置
    Configure,
    /// 虚拟件
    Phantom,
}

impl MaterialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Make => "Make",
            Self::Buy => "Buy",
            Self::Outsource => "Outsource",
            Self::Configure => "Configure",
            Self::Phantom => "Phantom",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "Make" => Ok(Self::Make),
            "Buy" => Ok(Self::Buy),
            "Outsource" => Ok(Self::Outsource),
            "Configure" => Ok(Self::Configure),
            "Phantom" => Ok(Self::Phantom),
            other => Err(AppError::validation(format!(
                "unknown material source: {}",
                other
            ))),
        }
    }

    /// 是否通过生产满足
    pub fn is_produced(&self) -> bool {
        matches!(self, Self::Make | Self::Outsource | Self::Configure)
    }

    /// 是否通过采购满足
    pub fn is_purchased(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

/// 审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// 待审核
    Pending,
    /// 已通过
    Approved,
    /// 已驳回
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::validation(format!(
                "unknown review status: {}",
                other
            ))),
        }
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_kind_roundtrip() {
        for kind in [
            DocKind::Demand,
            DocKind::DemandComputation,
            DocKind::ProductionPlan,
            DocKind::WorkOrder,
            DocKind::PurchaseOrder,
            DocKind::PurchaseRequisition,
        ] {
            assert_eq!(DocKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(DocKind::parse("sales_order").is_err());
    }

    #[test]
    fn test_business_mode_maps_to_computation_type() {
        assert_eq!(BusinessMode::Mts.computation_type(), ComputationType::Mrp);
        assert_eq!(BusinessMode::Mto.computation_type(), ComputationType::Lrp);
    }

    #[test]
    fn test_material_source_classification() {
        assert!(MaterialSource::Make.is_produced());
        assert!(MaterialSource::Outsource.is_produced());
        assert!(MaterialSource::Configure.is_produced());
        assert!(MaterialSource::Buy.is_purchased());
        assert!(!MaterialSource::Phantom.is_produced());
        assert!(!MaterialSource::Phantom.is_purchased());
    }
}
