use bigdecimal::{BigDecimal, Zero};

use crate::error::BillingError;
use crate::models::{
    BatchClassification, BillableItem, Ticket, TicketStatus, REASON_NOT_CLOSED, REASON_NO_HOURS,
    REASON_NO_MATCHING_CLAUSE, REASON_NO_TAGS,
};
use crate::store::ClauseStore;

/// 批量分类: 已富集工单 → valid/invalid 两分区 + valid 分区合计
/// 只报首个触发的规则, 校验顺序固定:
/// not closed → no tags → no hours → no matching clause
pub async fn classify<S: ClauseStore>(
    tickets: &[Ticket],
    store: &S,
) -> Result<BatchClassification, BillingError> {
    let mut result = BatchClassification::new();

    for ticket in tickets {
        if let Some(reason) = precondition_failure(ticket) {
            result.reject(ticket, reason);
            continue;
        }

        // 可计费要求富集成功: billable 标记 + 可解析的条款
        // billable 却无条款属于上游契约破坏, 按 no matching clause 处理, 绝不崩溃
        let clause = match &ticket.clause_id {
            Some(clause_id) if ticket.is_billable => store.get_clause(clause_id).await?,
            _ => None,
        };
        let Some(clause) = clause else {
            if ticket.is_billable {
                tracing::warn!(
                    "Ticket {} is billable but its clause {:?} cannot be resolved",
                    ticket.ticket_id,
                    ticket.clause_id
                );
            }
            result.reject(ticket, REASON_NO_MATCHING_CLAUSE);
            continue;
        };

        // 合计是已舍入金额的精确相加, 只覆盖 valid 分区
        result.total_cost += &ticket.billable_amount;
        result.total_hours += &ticket.hours_worked;
        result.valid.push(BillableItem {
            ticket: ticket.clone(),
            clause,
            cost: ticket.billable_amount.clone(),
        });
    }

    tracing::info!(
        "Classified {} tickets: {} valid, {} invalid, total cost {}",
        tickets.len(),
        result.valid.len(),
        result.invalid.len(),
        result.total_cost
    );
    Ok(result)
}

/// 前置校验, 按固定顺序短路
fn precondition_failure(ticket: &Ticket) -> Option<&'static str> {
    if ticket.status != TicketStatus::Closed {
        return Some(REASON_NOT_CLOSED);
    }
    if ticket.tags.is_empty() {
        return Some(REASON_NO_TAGS);
    }
    if ticket.hours_worked <= BigDecimal::zero() {
        return Some(REASON_NO_HOURS);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{clause, dec, ticket};
    use crate::store::MemoryStore;

    /// 已富集的可计费工单
    fn billable(id: &str, hours: &str, clause_id: &str, amount: &str) -> Ticket {
        let mut t = ticket(id, TicketStatus::Closed, hours, &[clause_id]);
        t.clause_id = Some(clause_id.to_string());
        t.billable_amount = dec(amount);
        t.is_billable = true;
        t
    }

    #[tokio::test]
    async fn closed_matched_ticket_lands_in_valid_with_its_cost() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let t1 = billable("T1", "16.5", "FLASH_001", "1402.50");
        let result = classify(&[t1], &store).await.unwrap();

        assert_eq!(result.valid.len(), 1);
        assert!(result.invalid.is_empty());
        assert_eq!(result.valid[0].cost, dec("1402.50"));
        assert_eq!(result.total_cost, dec("1402.50"));
        assert_eq!(result.total_hours, dec("16.5"));
    }

    #[tokio::test]
    async fn open_ticket_is_rejected_as_not_closed_even_with_a_matching_clause() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let mut t2 = ticket("T2", TicketStatus::InProgress, "12.0", &["FLASH_001"]);
        t2.clause_id = Some("FLASH_001".to_string());
        t2.billable_amount = dec("1020.00");
        t2.is_billable = true;

        let result = classify(&[t2], &store).await.unwrap();
        assert!(result.valid.is_empty());
        assert_eq!(result.invalid[0].reason, REASON_NOT_CLOSED);
    }

    #[tokio::test]
    async fn no_tags_is_checked_before_no_hours() {
        let store = MemoryStore::new();

        // 有工时但无标签: 只报 no tags
        let t3 = ticket("T3", TicketStatus::Closed, "8.0", &[]);
        let result = classify(&[t3], &store).await.unwrap();
        assert_eq!(result.invalid[0].reason, REASON_NO_TAGS);
    }

    #[tokio::test]
    async fn zero_hours_is_rejected_as_no_hours() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));

        let t = ticket("T5", TicketStatus::Closed, "0", &["FLASH_001"]);
        let result = classify(&[t], &store).await.unwrap();
        assert_eq!(result.invalid[0].reason, REASON_NO_HOURS);
    }

    #[tokio::test]
    async fn unenriched_ticket_is_rejected_as_no_matching_clause() {
        let store = MemoryStore::new();

        let t = ticket("T6", TicketStatus::Closed, "4.0", &["UNKNOWN_TAG"]);
        let result = classify(&[t], &store).await.unwrap();
        assert_eq!(result.invalid[0].reason, REASON_NO_MATCHING_CLAUSE);
    }

    #[tokio::test]
    async fn billable_flag_without_clause_is_contract_violation_not_a_crash() {
        let store = MemoryStore::new();

        // 上游契约破坏: billable=true 但 clause_id 缺失
        let mut t = ticket("T7", TicketStatus::Closed, "4.0", &["FLASH_001"]);
        t.is_billable = true;
        t.clause_id = None;
        t.billable_amount = dec("340.00");

        let result = classify(&[t], &store).await.unwrap();
        assert_eq!(result.invalid[0].reason, REASON_NO_MATCHING_CLAUSE);

        // clause_id 指向已被删除的条款, 同样处理
        let mut t = ticket("T8", TicketStatus::Closed, "4.0", &["GONE_001"]);
        t.is_billable = true;
        t.clause_id = Some("GONE_001".to_string());

        let result = classify(&[t], &store).await.unwrap();
        assert_eq!(result.invalid[0].reason, REASON_NO_MATCHING_CLAUSE);
    }

    #[tokio::test]
    async fn totals_cover_only_the_valid_partition() {
        let store = MemoryStore::new();
        store.insert_clause(clause("FLASH_001", "85.00", true));
        store.insert_clause(clause("SUPPORT_002", "95.00", true));

        let t1 = billable("T1", "16.5", "FLASH_001", "1402.50");
        let t4 = billable("T4", "8.0", "SUPPORT_002", "760.00");
        let t2 = ticket("T2", TicketStatus::InProgress, "12.0", &["FLASH_001"]);

        let result = classify(&[t1, t4, t2], &store).await.unwrap();

        assert_eq!(result.valid.len(), 2);
        assert_eq!(result.invalid.len(), 1);
        assert_eq!(result.total_cost, dec("2162.50"));
        assert_eq!(result.total_hours, dec("24.5"));
    }
}
