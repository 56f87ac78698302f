//! 期初导入的二维表格解析
//!
//! 第 0 行表头，第 1 行示例（丢弃），其后为数据行。表头按别名字典
//! 归一到规范列名，必填列缺失属于结构性错误，整批拒绝。

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use mes_errors::{AppError, AppResult};
use rust_decimal::Decimal;

/// 列定义：规范名、是否必填、可接受的表头别名
pub(crate) struct Column {
    pub key: &'static str,
    pub required: bool,
    pub aliases: &'static [&'static str],
}

pub(crate) const fn required(key: &'static str, aliases: &'static [&'static str]) -> Column {
    Column {
        key,
        required: true,
        aliases,
    }
}

pub(crate) const fn optional(key: &'static str, aliases: &'static [&'static str]) -> Column {
    Column {
        key,
        required: false,
        aliases,
    }
}

/// 解析后的数据表
#[derive(Debug)]
pub(crate) struct Sheet {
    columns: HashMap<&'static str, usize>,
    /// (上报行号, 单元格)，行号按含表头与示例行的 1 起始序号
    rows: Vec<(usize, Vec<serde_json::Value>)>,
}

impl Sheet {
    /// 解析表头并切出非空数据行
    pub fn parse(rows: &[Vec<serde_json::Value>], columns: &[Column]) -> AppResult<Self> {
        if rows.len() < 2 {
            return Err(AppError::validation(
                "导入数据格式错误：至少需要表头和示例数据行",
            ));
        }

        let headers: Vec<String> = rows[0]
            .iter()
            .map(|cell| normalize_header(cell))
            .collect();

        let mut mapped = HashMap::new();
        for column in columns {
            let index = headers.iter().position(|h| {
                h == column.key || column.aliases.iter().any(|alias| h == alias)
            });
            if let Some(index) = index {
                mapped.insert(column.key, index);
            }
        }

        let missing: Vec<&str> = columns
            .iter()
            .filter(|c| c.required && !mapped.contains_key(c.key))
            .map(|c| c.key)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "缺少必填字段：{}",
                missing.join("、")
            )));
        }

        let data_rows: Vec<(usize, Vec<serde_json::Value>)> = rows
            .iter()
            .enumerate()
            .skip(2)
            .filter(|(_, row)| row.iter().any(|cell| !cell_text(cell).is_empty()))
            .map(|(index, row)| (index + 1, row.clone()))
            .collect();
        if data_rows.is_empty() {
            return Err(AppError::validation(
                "没有可导入的数据行（所有行都为空）",
            ));
        }

        Ok(Self {
            columns: mapped,
            rows: data_rows,
        })
    }

    pub fn rows(&self) -> &[(usize, Vec<serde_json::Value>)] {
        &self.rows
    }

    /// 取单元格文本，空白与缺列都归一为 None
    pub fn text(&self, row: &[serde_json::Value], key: &str) -> Option<String> {
        let index = *self.columns.get(key)?;
        let text = cell_text(row.get(index)?);
        if text.is_empty() { None } else { Some(text) }
    }
}

/// 表头归一：去空白，剥掉必填标记 `*` 前缀
fn normalize_header(cell: &serde_json::Value) -> String {
    cell_text(cell).trim_start_matches('*').trim().to_string()
}

/// 单元格到文本：字符串去空白，数字原样格式化，其余为空
pub(crate) fn cell_text(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// 按固定格式集合解析日期，支持带时间的变体
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    None
}

pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    text.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        required("物料编码", &["material_code"]),
        required("期初数量", &["quantity"]),
        optional("批次号", &["batch_number"]),
    ];

    fn sheet(rows: Vec<Vec<serde_json::Value>>) -> AppResult<Sheet> {
        Sheet::parse(&rows, COLUMNS)
    }

    #[test]
    fn test_parse_maps_aliases_and_strips_required_marker() {
        let parsed = sheet(vec![
            vec![json!("*物料编码"), json!("quantity"), json!("批次号")],
            vec![json!("示例"), json!("10"), json!("")],
            vec![json!("M-001"), json!(25), json!("B01")],
        ])
        .unwrap();
        assert_eq!(parsed.rows().len(), 1);
        let (row_no, row) = &parsed.rows()[0];
        assert_eq!(*row_no, 3);
        assert_eq!(parsed.text(row, "物料编码").as_deref(), Some("M-001"));
        assert_eq!(parsed.text(row, "期初数量").as_deref(), Some("25"));
        assert_eq!(parsed.text(row, "批次号").as_deref(), Some("B01"));
    }

    #[test]
    fn test_parse_rejects_missing_required_column() {
        let err = sheet(vec![
            vec![json!("物料编码"), json!("备注")],
            vec![json!("示例"), json!("")],
            vec![json!("M-001"), json!("x")],
        ])
        .unwrap_err();
        assert!(err.to_string().contains("缺少必填字段"));
        assert!(err.to_string().contains("期初数量"));
    }

    #[test]
    fn test_parse_rejects_header_only_payload() {
        let err = sheet(vec![vec![json!("物料编码"), json!("期初数量")]]).unwrap_err();
        assert!(err.to_string().contains("表头和示例数据行"));
    }

    #[test]
    fn test_parse_skips_blank_rows_and_rejects_all_blank() {
        let err = sheet(vec![
            vec![json!("物料编码"), json!("期初数量")],
            vec![json!("示例"), json!("10")],
            vec![json!(""), json!("")],
            vec![json!(null), json!(null)],
        ])
        .unwrap_err();
        assert!(err.to_string().contains("所有行都为空"));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("2025-01-14"),
            NaiveDate::from_ymd_opt(2025, 1, 14)
        );
        assert_eq!(
            parse_date("2025/1/14"),
            NaiveDate::from_ymd_opt(2025, 1, 14)
        );
        assert_eq!(
            parse_date("2025.01.14"),
            NaiveDate::from_ymd_opt(2025, 1, 14)
        );
        assert_eq!(
            parse_date("2025-01-14 08:30:00"),
            NaiveDate::from_ymd_opt(2025, 1, 14)
        );
        assert_eq!(parse_date("14/01/2025"), None);
    }
}
