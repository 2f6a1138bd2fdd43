use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{line_cost, money_zero, Currency};

/// 发票状态机: DRAFT → SENT → PAID, DRAFT/SENT → CANCELLED
/// 状态流转由调用方执行; 本核心只创建 DRAFT 发票
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(InvoiceStatus::Draft),
            "SENT" => Some(InvoiceStatus::Sent),
            "PAID" => Some(InvoiceStatus::Paid),
            "CANCELLED" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }

    /// 合法迁移的唯一定义, 供调用方复用
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Draft, InvoiceStatus::Sent)
                | (InvoiceStatus::Sent, InvoiceStatus::Paid)
                | (InvoiceStatus::Draft, InvoiceStatus::Cancelled)
                | (InvoiceStatus::Sent, InvoiceStatus::Cancelled)
        )
    }
}

/// 发票行 - 创建后不可变, 由所属发票独占持有
/// line_total 是派生值, 只在构造时计算一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_id: i64, // 发票内 1 起编号
    pub invoice_id: String,
    pub ticket_id: String,
    pub clause_id: String,
    pub hours_worked: BigDecimal, // 装配时刻从工单拷贝
    pub unit_price: BigDecimal,   // 装配时刻从条款拷贝
    pub line_total: BigDecimal,
}

impl InvoiceLine {
    pub fn new(
        line_id: i64,
        invoice_id: &str,
        ticket_id: &str,
        clause_id: &str,
        hours_worked: BigDecimal,
        unit_price: BigDecimal,
    ) -> Self {
        let line_total = line_cost(&hours_worked, &unit_price);
        Self {
            line_id,
            invoice_id: invoice_id.to_string(),
            ticket_id: ticket_id.to_string(),
            clause_id: clause_id.to_string(),
            hours_worked,
            unit_price,
            line_total,
        }
    }
}

/// 发票
/// 不变式: total_amount == Σ line_total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: String,
    pub project_name: String,
    pub billing_period: String, // 调用方给定的期别标签, 本核心不校验
    pub total_amount: BigDecimal,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// 各行合计, 用于核对 total_amount 不变式
    pub fn lines_total(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(money_zero(), |acc, line| acc + &line.line_total)
    }
}
