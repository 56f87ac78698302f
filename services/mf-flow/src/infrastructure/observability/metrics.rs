//! 单据流转 Metrics
//!
//! 业务指标记录

use metrics::{counter, histogram};
use std::time::Instant;

use crate::domain::documents::DocKind;

// ============================================================================
// 推拉 Metrics
// ============================================================================

/// 记录一次下推
pub fn record_push(source: DocKind, target: DocKind, success: bool) {
    let labels = [
        ("source", source.as_str().to_string()),
        ("target", target.as_str().to_string()),
        ("success", success.to_string()),
    ];

    counter!("flow_push_total", &labels).increment(1);

    if success {
        counter!("flow_push_success_total", &labels).increment(1);
    } else {
        counter!("flow_push_failure_total", &labels).increment(1);
    }
}

/// 记录一次上拉
pub fn record_pull(source: DocKind, target: DocKind, success: bool) {
    let labels = [
        ("source", source.as_str().to_string()),
        ("target", target.as_str().to_string()),
        ("success", success.to_string()),
    ];
    counter!("flow_pull_total", &labels).increment(1);
}

// ============================================================================
// 编码分配 Metrics
// ============================================================================

/// 记录编码分配
pub fn record_code_allocated(rule_code: &str, success: bool) {
    let labels = [
        ("rule", rule_code.to_string()),
        ("success", success.to_string()),
    ];
    counter!("flow_codes_allocated_total", &labels).increment(1);
}

/// 记录编码分配的锁竞争重试
pub fn record_allocation_retry(rule_code: &str) {
    let labels = [("rule", rule_code.to_string())];
    counter!("flow_allocation_retries_total", &labels).increment(1);
}

// ============================================================================
// 期初导入 Metrics
// ============================================================================

/// 记录一批期初导入的行级结果
pub fn record_initial_load(variant: &str, success_count: u64, failure_count: u64) {
    let labels = [("variant", variant.to_string())];
    counter!("flow_initial_load_rows_ok_total", &labels).increment(success_count);
    counter!("flow_initial_load_rows_failed_total", &labels).increment(failure_count);
}

// ============================================================================
// 数据库查询时间 Metrics
// ============================================================================

/// 数据库查询计时器
pub struct DbTimer {
    start: Instant,
    operation: String,
    table: String,
}

impl DbTimer {
    pub fn new(operation: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
            table: table.into(),
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        let labels = [
            ("operation", self.operation),
            ("table", self.table),
            ("success", success.to_string()),
        ];

        histogram!("flow_db_query_duration_ms", &labels).record(duration);
        counter!("flow_db_queries_total", &labels).increment(1);
    }
}
