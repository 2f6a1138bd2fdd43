use sqlx::PgPool;

use crate::db::queries;
use crate::error::BillingError;
use crate::models::{BillingAnnotation, Clause, Invoice, Ticket, TicketStatus};
use crate::store::{ClauseStore, InvoiceStore, TicketStore};

/// Postgres 存储 - 生产实现, 包装 queries 下的自由函数
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ClauseStore for PgStore {
    async fn get_clause(&self, clause_id: &str) -> Result<Option<Clause>, BillingError> {
        Ok(queries::get_clause(&self.pool, clause_id).await?)
    }

    async fn get_active_clause_by_tag(&self, tag: &str) -> Result<Option<Clause>, BillingError> {
        Ok(queries::get_active_clause_by_tag(&self.pool, tag).await?)
    }
}

impl TicketStore for PgStore {
    async fn query_tickets(
        &self,
        status: Option<TicketStatus>,
        tag: Option<&str>,
    ) -> Result<Vec<Ticket>, BillingError> {
        Ok(queries::query_tickets(&self.pool, status, tag).await?)
    }

    async fn save_ticket_annotation(
        &self,
        ticket_id: &str,
        annotation: &BillingAnnotation,
    ) -> Result<(), BillingError> {
        let affected = queries::save_ticket_annotation(&self.pool, ticket_id, annotation).await?;
        if affected == 0 {
            return Err(BillingError::TicketNotFound(ticket_id.to_string()));
        }
        Ok(())
    }
}

impl InvoiceStore for PgStore {
    async fn create_invoice_with_lines(&self, invoice: &Invoice) -> Result<(), BillingError> {
        Ok(queries::insert_invoice_with_lines(&self.pool, invoice).await?)
    }
}
