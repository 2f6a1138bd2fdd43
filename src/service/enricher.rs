use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::BillingError;
use crate::models::{line_cost, BillingAnnotation, Ticket, TicketQuery};
use crate::service::matcher;
use crate::store::{ClauseStore, TicketStore};

/// 时间戳归一化: 带偏移的转换到 UTC, 不带偏移的按 UTC 解释
/// 下游日期过滤只比较归一化后的时间, 与记录时用的时区无关
pub fn normalize_to_utc(raw: &str) -> Result<DateTime<Utc>, BillingError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|_| BillingError::InvalidTimestamp(raw.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// 工单富集服务: 匹配条款、计算成本、落库注解
/// 注解作为不可变值先算出来, 应用与落库是显式的单独步骤
pub struct TicketEnricher<S> {
    store: S,
}

impl<S: ClauseStore + TicketStore> TicketEnricher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 批量取单 + 过滤 + 富集
    /// 日期过滤两端闭合; 没有解决时间的工单被任何日期过滤排除,
    /// 无日期条件时照常纳入
    pub async fn fetch_and_enrich(&self, query: &TicketQuery) -> Result<Vec<Ticket>, BillingError> {
        let tickets = self
            .store
            .query_tickets(query.status, query.tag.as_deref())
            .await?;
        tracing::info!(
            "Fetched {} tickets (status={:?}, tag={:?})",
            tickets.len(),
            query.status,
            query.tag
        );

        let mut enriched = Vec::with_capacity(tickets.len());
        for mut ticket in tickets {
            if !query.resolved.is_unbounded() {
                match ticket.resolved_at {
                    Some(at) if query.resolved.contains(at) => {}
                    _ => continue,
                }
            }

            let annotation = self.annotate(&ticket).await?;
            self.store
                .save_ticket_annotation(&ticket.ticket_id, &annotation)
                .await?;
            annotation.apply(&mut ticket);
            enriched.push(ticket);
        }

        tracing::info!("Enriched {} tickets", enriched.len());
        Ok(enriched)
    }

    /// 纯计算: 产出新的计费注解, 不修改工单
    /// 同一工单对同一份条款数据重复富集, 结果逐位相同 (幂等)
    pub async fn annotate(&self, ticket: &Ticket) -> Result<BillingAnnotation, BillingError> {
        match matcher::match_clause(&ticket.tags, &self.store).await? {
            Some(clause) => {
                let amount = line_cost(&ticket.hours_worked, &clause.unit_price);
                tracing::info!(
                    "Ticket {} enriched: clause={}, amount={}",
                    ticket.ticket_id,
                    clause.clause_id,
                    amount
                );
                Ok(BillingAnnotation {
                    clause_id: Some(clause.clause_id),
                    billable_amount: amount,
                    is_billable: true,
                })
            }
            None => {
                tracing::info!("Ticket {}: no matching clause found", ticket.ticket_id);
                Ok(BillingAnnotation::not_billable())
            }
        }
    }
}
