//! 编码模板解析与渲染
//!
//! 模板使用花括号变量语法，如 `WO{YYYY}{MM}{DD}-{SEQ:4}`。
//! 支持的变量：YYYY/YY/MM/DD（取分配当日日期）、SEQ 或 SEQ:N（序列号，
//! N 为最小宽度，不足补零）、DICT:<key>（从分配上下文取值）。
//! 模板在规则保存时解析为 AST，分配时只做格式化。

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use mes_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// 模板片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// 原样保留的字面量
    Literal(String),
    /// 四位年份
    Year4,
    /// 两位年份
    Year2,
    /// 两位月份
    Month,
    /// 两位日期
    Day,
    /// 序列号，width 为最小宽度，None 时使用规则配置的默认宽度
    Seq { width: Option<usize> },
    /// 上下文字典变量
    Dict(String),
}

/// 解析后的编码模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTemplate {
    segments: Vec<Segment>,
}

impl CodeTemplate {
    /// 解析模板字符串，未知变量或括号不配对返回 `InvalidTemplate`
    pub fn parse(expression: &str) -> AppResult<Self> {
        if expression.trim().is_empty() {
            return Err(AppError::invalid_template("template is empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = expression;

        while let Some(open) = rest.find('{') {
            let (head, tail) = rest.split_at(open);
            if head.contains('}') {
                return Err(AppError::invalid_template(format!(
                    "unbalanced '}}' in template: {}",
                    expression
                )));
            }
            literal.push_str(head);

            let close = tail.find('}').ok_or_else(|| {
                AppError::invalid_template(format!("unclosed '{{' in template: {}", expression))
            })?;
            let variable = &tail[1..close];

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Self::parse_variable(variable)?);
            rest = &tail[close + 1..];
        }

        if rest.contains('}') {
            return Err(AppError::invalid_template(format!(
                "unbalanced '}}' in template: {}",
                expression
            )));
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    fn parse_variable(variable: &str) -> AppResult<Segment> {
        match variable {
            "" => Err(AppError::invalid_template("empty variable '{}'")),
            "YYYY" => Ok(Segment::Year4),
            "YY" => Ok(Segment::Year2),
            "MM" => Ok(Segment::Month),
            "DD" => Ok(Segment::Day),
            "SEQ" => Ok(Segment::Seq { width: None }),
            _ => {
                if let Some(width) = variable.strip_prefix("SEQ:") {
                    let width: usize = width.parse().map_err(|_| {
                        AppError::invalid_template(format!("invalid SEQ width: {}", width))
                    })?;
                    if width == 0 {
                        return Err(AppError::invalid_template("SEQ width must be at least 1"));
                    }
                    return Ok(Segment::Seq { width: Some(width) });
                }
                if let Some(key) = variable.strip_prefix("DICT:") {
                    if key.is_empty() {
                        return Err(AppError::invalid_template("DICT variable requires a key"));
                    }
                    return Ok(Segment::Dict(key.to_string()));
                }
                Err(AppError::invalid_template(format!(
                    "unknown variable {{{}}}",
                    variable
                )))
            }
        }
    }

    /// 用日期、序列号和上下文字典渲染编码
    ///
    /// `default_seq_width` 为规则配置的序列号宽度，模板未显式指定宽度时
    /// 生效。宽度是最小宽度，位数超出时不截断。
    pub fn render(
        &self,
        date: NaiveDate,
        seq: i64,
        default_seq_width: usize,
        dict: &HashMap<String, String>,
    ) -> AppResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Year4 => out.push_str(&format!("{:04}", date.year())),
                Segment::Year2 => out.push_str(&format!("{:02}", date.year() % 100)),
                Segment::Month => out.push_str(&format!("{:02}", date.month())),
                Segment::Day => out.push_str(&format!("{:02}", date.day())),
                Segment::Seq { width } => {
                    let width = width.unwrap_or(default_seq_width).max(1);
                    out.push_str(&format!("{:0width$}", seq));
                }
                Segment::Dict(key) => {
                    let value = dict.get(key).ok_or_else(|| {
                        AppError::invalid_template(format!("missing context value for DICT:{}", key))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_seq_only() {
        let template = CodeTemplate::parse("{SEQ:4}").unwrap();
        assert_eq!(template.segments(), &[Segment::Seq { width: Some(4) }]);
    }

    #[test]
    fn test_parse_mixed_segments() {
        let template = CodeTemplate::parse("WO{YYYY}{MM}-{SEQ}").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("WO".to_string()),
                Segment::Year4,
                Segment::Month,
                Segment::Literal("-".to_string()),
                Segment::Seq { width: None },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_variable() {
        let err = CodeTemplate::parse("{FOO}").unwrap_err();
        assert!(matches!(err, AppError::InvalidTemplate(_)));
        assert!(err.to_string().contains("{FOO}"));
    }

    #[test]
    fn test_parse_rejects_unbalanced_braces() {
        assert!(matches!(
            CodeTemplate::parse("WO{SEQ").unwrap_err(),
            AppError::InvalidTemplate(_)
        ));
        assert!(matches!(
            CodeTemplate::parse("WO}SEQ{DD}").unwrap_err(),
            AppError::InvalidTemplate(_)
        ));
        assert!(matches!(
            CodeTemplate::parse("   ").unwrap_err(),
            AppError::InvalidTemplate(_)
        ));
    }

    #[test]
    fn test_parse_rejects_zero_width() {
        assert!(matches!(
            CodeTemplate::parse("{SEQ:0}").unwrap_err(),
            AppError::InvalidTemplate(_)
        ));
        assert!(matches!(
            CodeTemplate::parse("{SEQ:abc}").unwrap_err(),
            AppError::InvalidTemplate(_)
        ));
    }

    #[test]
    fn test_render_date_and_seq() {
        let template = CodeTemplate::parse("WO{YY}{MM}{DD}-{SEQ:4}").unwrap();
        let code = template
            .render(date(2025, 1, 14), 7, 4, &HashMap::new())
            .unwrap();
        assert_eq!(code, "WO250114-0007");
    }

    #[test]
    fn test_render_bare_seq_uses_default_width() {
        let template = CodeTemplate::parse("PO{SEQ}").unwrap();
        let code = template
            .render(date(2025, 1, 14), 7, 6, &HashMap::new())
            .unwrap();
        assert_eq!(code, "PO000007");
    }

    #[test]
    fn test_render_width_is_minimum() {
        let template = CodeTemplate::parse("{SEQ:4}").unwrap();
        let code = template
            .render(date(2025, 1, 14), 12345, 4, &HashMap::new())
            .unwrap();
        assert_eq!(code, "12345");
    }

    #[test]
    fn test_render_dict_lookup() {
        let template = CodeTemplate::parse("{DICT:line}-{SEQ:2}").unwrap();
        let mut dict = HashMap::new();
        dict.insert("line".to_string(), "A3".to_string());
        let code = template.render(date(2025, 6, 1), 9, 4, &dict).unwrap();
        assert_eq!(code, "A3-09");

        let err = template
            .render(date(2025, 6, 1), 9, 4, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTemplate(_)));
    }
}
