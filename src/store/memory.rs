use std::sync::Arc;

use dashmap::DashMap;

use super::{ClauseStore, InvoiceStore, TicketStore};
use crate::error::BillingError;
use crate::models::{BillingAnnotation, Clause, Invoice, Ticket, TicketStatus};

/// 内存存储 - 测试与单机演示用, 三张表都是并发安全的 DashMap
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    clauses: Arc<DashMap<String, Clause>>,
    tickets: Arc<DashMap<String, Ticket>>,
    invoices: Arc<DashMap<String, Invoice>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_clause(&self, clause: Clause) {
        self.clauses.insert(clause.clause_id.clone(), clause);
    }

    pub fn insert_ticket(&self, ticket: Ticket) {
        self.tickets.insert(ticket.ticket_id.clone(), ticket);
    }

    pub fn get_ticket(&self, ticket_id: &str) -> Option<Ticket> {
        self.tickets.get(ticket_id).map(|t| t.value().clone())
    }

    pub fn get_invoice(&self, invoice_id: &str) -> Option<Invoice> {
        self.invoices.get(invoice_id).map(|i| i.value().clone())
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }
}

impl ClauseStore for MemoryStore {
    async fn get_clause(&self, clause_id: &str) -> Result<Option<Clause>, BillingError> {
        Ok(self.clauses.get(clause_id).map(|c| c.value().clone()))
    }

    async fn get_active_clause_by_tag(&self, tag: &str) -> Result<Option<Clause>, BillingError> {
        Ok(self
            .clauses
            .get(tag)
            .filter(|c| c.value().is_active)
            .map(|c| c.value().clone()))
    }
}

impl TicketStore for MemoryStore {
    async fn query_tickets(
        &self,
        status: Option<TicketStatus>,
        tag: Option<&str>,
    ) -> Result<Vec<Ticket>, BillingError> {
        let mut out: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| status.map_or(true, |s| t.value().status == s))
            .filter(|t| tag.map_or(true, |tg| t.value().tags.iter().any(|x| x == tg)))
            .map(|t| t.value().clone())
            .collect();

        // DashMap 迭代顺序不固定, 按工单号排序保证确定性
        out.sort_by(|a, b| a.ticket_id.cmp(&b.ticket_id));
        Ok(out)
    }

    async fn save_ticket_annotation(
        &self,
        ticket_id: &str,
        annotation: &BillingAnnotation,
    ) -> Result<(), BillingError> {
        let Some(mut ticket) = self.tickets.get_mut(ticket_id) else {
            return Err(BillingError::TicketNotFound(ticket_id.to_string()));
        };
        annotation.apply(ticket.value_mut());
        Ok(())
    }
}

impl InvoiceStore for MemoryStore {
    async fn create_invoice_with_lines(&self, invoice: &Invoice) -> Result<(), BillingError> {
        // 单次插入整张发票及其行, 天然全有或全无
        self.invoices
            .insert(invoice.invoice_id.clone(), invoice.clone());
        Ok(())
    }
}
