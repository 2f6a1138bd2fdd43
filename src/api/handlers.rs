use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::db::{queries, PgStore};
use crate::error::BillingError;
use crate::models::{DateRange, Invoice, Ticket, TicketQuery, TicketStatus};
use crate::service::{classify, normalize_to_utc, InvoiceAssembler, TicketEnricher};

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    pub enricher: Arc<TicketEnricher<PgStore>>,
    pub assembler: Arc<InvoiceAssembler<PgStore>>,
}

/// 取单过滤条件; 日期为原始字符串, 服务端统一归一化到 UTC
#[derive(Debug, Deserialize)]
pub struct TicketFilterRequest {
    pub status_filter: Option<TicketStatus>,
    pub tag_filter: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

impl TicketFilterRequest {
    fn to_query(&self) -> Result<TicketQuery, BillingError> {
        let start = self
            .period_start
            .as_deref()
            .map(normalize_to_utc)
            .transpose()?;
        let end = self
            .period_end
            .as_deref()
            .map(normalize_to_utc)
            .transpose()?;
        Ok(TicketQuery {
            status: self.status_filter,
            tag: self.tag_filter.clone(),
            resolved: DateRange { start, end },
        })
    }
}

/// 富集响应
#[derive(Debug, Serialize)]
pub struct EnrichResponse {
    pub success: bool,
    pub total_count: usize,
    pub billable_count: usize,
    pub excluded_count: usize,
    pub excluded_tickets: Vec<String>,
    pub tickets: Vec<Ticket>,
}

/// 发票生成请求
#[derive(Debug, Deserialize)]
pub struct GenerateInvoiceRequest {
    pub project_name: String,
    pub billing_period: String,
    pub created_by: String,
    #[serde(flatten)]
    pub filter: TicketFilterRequest,
    /// 可选: 落库成功后把发票行导出为 CSV
    pub csv_output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExcludedTicket {
    pub ticket_id: String,
    pub reason: String,
}

/// 发票生成响应; 失败时也要报告考察了多少工单及逐单排除原因
#[derive(Debug, Serialize)]
pub struct GenerateInvoiceResponse {
    pub success: bool,
    pub message: String,
    pub considered: usize,
    pub excluded: Vec<ExcludedTicket>,
    pub invoice: Option<Invoice>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

fn error_response(status: StatusCode, err: BillingError) -> Response {
    let body = ErrorResponse {
        success: false,
        message: format!("Error: {}", err),
    };
    (status, Json(body)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 批量富集接口: 取单 → 过滤 → 条款匹配 → 注解落库
pub async fn enrich_tickets(
    State(state): State<AppState>,
    Json(req): Json<TicketFilterRequest>,
) -> Response {
    let query = match req.to_query() {
        Ok(q) => q,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.enricher.fetch_and_enrich(&query).await {
        Ok(tickets) => {
            let billable_count = tickets.iter().filter(|t| t.is_billable).count();
            let excluded_tickets: Vec<String> = tickets
                .iter()
                .filter(|t| !t.is_billable)
                .map(|t| t.ticket_id.clone())
                .collect();

            let response = EnrichResponse {
                success: true,
                total_count: tickets.len(),
                billable_count,
                excluded_count: excluded_tickets.len(),
                excluded_tickets,
                tickets,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// 发票生成接口: 富集 → 分类 → 装配
pub async fn generate_invoice(
    State(state): State<AppState>,
    Json(req): Json<GenerateInvoiceRequest>,
) -> Response {
    let query = match req.filter.to_query() {
        Ok(q) => q,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let tickets = match state.enricher.fetch_and_enrich(&query).await {
        Ok(t) => t,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let considered = tickets.len();

    let classification = match classify(&tickets, &state.store).await {
        Ok(c) => c,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };
    let excluded: Vec<ExcludedTicket> = classification
        .invalid
        .iter()
        .map(|r| ExcludedTicket {
            ticket_id: r.ticket.ticket_id.clone(),
            reason: r.reason.clone(),
        })
        .collect();

    match state
        .assembler
        .assemble(
            &req.project_name,
            &req.billing_period,
            &classification.valid,
            &req.created_by,
        )
        .await
    {
        Ok(invoice) => {
            if let Some(path) = &req.csv_output {
                if let Err(e) = queries::export_invoice_to_csv(&invoice, Path::new(path)) {
                    tracing::error!("CSV export to {} failed: {}", path, e);
                }
            }
            let response = GenerateInvoiceResponse {
                success: true,
                message: format!(
                    "Invoice {} created with {} lines, total {}",
                    invoice.invoice_id,
                    invoice.lines.len(),
                    invoice.total_amount
                ),
                considered,
                excluded,
                invoice: Some(invoice),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(BillingError::NoBillableItems) => {
            let response = GenerateInvoiceResponse {
                success: false,
                message: format!(
                    "No valid billable tickets: {} considered, {} excluded",
                    considered,
                    excluded.len()
                ),
                considered,
                excluded,
                invoice: None,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
