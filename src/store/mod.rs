pub mod memory;

pub use memory::MemoryStore;

use crate::error::BillingError;
use crate::models::{BillingAnnotation, Clause, Invoice, Ticket, TicketStatus};

/// 条款存储 - 管道侧只读
#[allow(async_fn_in_trait)]
pub trait ClauseStore {
    async fn get_clause(&self, clause_id: &str) -> Result<Option<Clause>, BillingError>;

    /// 标签即条款编号; 只返回激活条款, 未激活或不存在一律 None
    async fn get_active_clause_by_tag(&self, tag: &str) -> Result<Option<Clause>, BillingError>;
}

/// 工单存储
#[allow(async_fn_in_trait)]
pub trait TicketStore {
    /// 按状态/标签过滤; 日期过滤在富集侧基于归一化时间戳完成
    async fn query_tickets(
        &self,
        status: Option<TicketStatus>,
        tag: Option<&str>,
    ) -> Result<Vec<Ticket>, BillingError>;

    /// 整体覆盖工单上的计费注解; 写失败必须返回错误, 不允许静默丢弃
    async fn save_ticket_annotation(
        &self,
        ticket_id: &str,
        annotation: &BillingAnnotation,
    ) -> Result<(), BillingError>;
}

/// 发票存储
#[allow(async_fn_in_trait)]
pub trait InvoiceStore {
    /// 发票与发票行原子落库: 任一行失败则整体不可见
    async fn create_invoice_with_lines(&self, invoice: &Invoice) -> Result<(), BillingError>;
}
