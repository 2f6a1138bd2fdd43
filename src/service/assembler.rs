use chrono::Utc;
use uuid::Uuid;

use crate::error::BillingError;
use crate::models::{money_zero, BillableItem, Invoice, InvoiceLine, InvoiceStatus};
use crate::store::InvoiceStore;

/// 发票装配服务: valid 分区 → DRAFT 发票 + 发票行, 原子落库
pub struct InvoiceAssembler<S> {
    store: S,
}

impl<S: InvoiceStore> InvoiceAssembler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 空的 valid 分区是本组件唯一的硬失败 (NoBillableItems), 不落任何东西
    pub async fn assemble(
        &self,
        project_name: &str,
        billing_period: &str,
        items: &[BillableItem],
        created_by: &str,
    ) -> Result<Invoice, BillingError> {
        if items.is_empty() {
            tracing::error!("No valid billable tickets, invoice assembly aborted");
            return Err(BillingError::NoBillableItems);
        }

        let invoice_id = Uuid::new_v4().to_string();
        let currency = items[0].clause.currency;

        let mut lines = Vec::with_capacity(items.len());
        let mut total_amount = money_zero();
        let mut aggregate_cost = money_zero();

        for (idx, item) in items.iter().enumerate() {
            // 工时与单价在装配时刻拷贝, 之后的条款调价不回溯已建发票行
            let line = InvoiceLine::new(
                (idx + 1) as i64,
                &invoice_id,
                &item.ticket.ticket_id,
                &item.clause.clause_id,
                item.ticket.hours_worked.clone(),
                item.clause.unit_price.clone(),
            );
            tracing::info!(
                "Line {}: ticket {} {}h × {} = {}",
                line.line_id,
                line.ticket_id,
                line.hours_worked,
                line.unit_price,
                line.line_total
            );

            if item.clause.currency != currency {
                // 换汇是非目标, 混币种只告警不换算
                tracing::warn!(
                    "Ticket {} bills in {} but invoice is {}",
                    item.ticket.ticket_id,
                    item.clause.currency.as_str(),
                    currency.as_str()
                );
            }

            total_amount += &line.line_total;
            aggregate_cost += &item.cost;
            lines.push(line);
        }

        // 与分类阶段合计交叉校验; 不一致说明富集之后条款调过价,
        // 以发票行合计为准 (不变式 total_amount == Σ line_total)
        if total_amount != aggregate_cost {
            tracing::warn!(
                "Invoice total {} differs from aggregated cost {}",
                total_amount,
                aggregate_cost
            );
        }

        let invoice = Invoice {
            invoice_id,
            project_name: project_name.to_string(),
            billing_period: billing_period.to_string(),
            total_amount,
            currency,
            status: InvoiceStatus::Draft,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
            lines,
        };

        self.store.create_invoice_with_lines(&invoice).await?;
        tracing::info!(
            "Invoice {} created: {} lines, total {} {}",
            invoice.invoice_id,
            invoice.lines.len(),
            invoice.total_amount,
            invoice.currency.as_str()
        );

        Ok(invoice)
    }
}
