use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money_zero;

/// 工单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Closed => "CLOSED",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(TicketStatus::Open),
            "IN_PROGRESS" => Some(TicketStatus::InProgress),
            "CLOSED" => Some(TicketStatus::Closed),
            "CANCELLED" => Some(TicketStatus::Cancelled),
            _ => None,
        }
    }
}

/// 工单 (工单跟踪系统的本地副本)
/// 计费注解三字段由富集整体覆盖, 其余字段管道侧只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub hours_worked: BigDecimal, // 非负, 两位小数
    pub tags: Vec<String>,        // 保持声明顺序, 重复标签逻辑上忽略
    pub assignee: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    // 计费注解
    pub clause_id: Option<String>,
    pub billable_amount: BigDecimal,
    pub is_billable: bool,
}

/// 计费注解 - 富集的纯输出, 应用与落库是显式的单独一步
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAnnotation {
    pub clause_id: Option<String>,
    pub billable_amount: BigDecimal,
    pub is_billable: bool,
}

impl BillingAnnotation {
    pub fn not_billable() -> Self {
        Self {
            clause_id: None,
            billable_amount: money_zero(),
            is_billable: false,
        }
    }

    /// 覆盖工单上的旧注解; 不触碰 status 和 hours_worked
    pub fn apply(&self, ticket: &mut Ticket) {
        ticket.clause_id = self.clause_id.clone();
        ticket.billable_amount = self.billable_amount.clone();
        ticket.is_billable = self.is_billable;
    }
}

/// 解决日期过滤区间, 两端闭合, 已归一化为 UTC
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

/// 批量取单过滤条件
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub tag: Option<String>,
    pub resolved: DateRange,
}
