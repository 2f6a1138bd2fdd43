use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{money_zero, Clause, Ticket};

/// 不可计费原因, 固定集合, 按校验顺序列出
pub const REASON_NOT_CLOSED: &str = "not closed";
pub const REASON_NO_TAGS: &str = "no tags";
pub const REASON_NO_HOURS: &str = "no hours";
pub const REASON_NO_MATCHING_CLAUSE: &str = "no matching clause";

/// 可计费项: 工单 + 已解析条款 + 富集成本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillableItem {
    pub ticket: Ticket,
    pub clause: Clause,
    pub cost: BigDecimal,
}

/// 被排除的工单及首个触发的排除原因
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedTicket {
    pub ticket: Ticket,
    pub reason: String,
}

/// 批量分类结果: valid/invalid 两分区, 合计只覆盖 valid 分区
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchClassification {
    pub valid: Vec<BillableItem>,
    pub invalid: Vec<RejectedTicket>,
    pub total_cost: BigDecimal,
    pub total_hours: BigDecimal,
}

impl BatchClassification {
    pub fn new() -> Self {
        Self {
            valid: Vec::new(),
            invalid: Vec::new(),
            total_cost: money_zero(),
            total_hours: money_zero(),
        }
    }

    pub fn reject(&mut self, ticket: &Ticket, reason: &str) {
        self.invalid.push(RejectedTicket {
            ticket: ticket.clone(),
            reason: reason.to_string(),
        });
    }
}

impl Default for BatchClassification {
    fn default() -> Self {
        Self::new()
    }
}
