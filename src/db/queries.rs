use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use std::path::Path;

use crate::models::{
    BillingAnnotation, Clause, Currency, Invoice, Ticket, TicketStatus,
};

/// 工单行 - labels 以逗号分隔存储, 状态/标签在边界处转换
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub ticket_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub hours_worked: BigDecimal,
    pub labels: Option<String>,
    pub assignee: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub clause_id: Option<String>,
    pub billable_amount: BigDecimal,
    pub is_billable: bool,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        let tags: Vec<String> = row
            .labels
            .map(|s| {
                s.split(',')
                    .map(|x| x.trim().to_string())
                    .filter(|x| !x.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let status = TicketStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!("Ticket {} has unknown status {:?}", row.ticket_id, row.status);
            TicketStatus::Open
        });

        Ticket {
            ticket_id: row.ticket_id,
            summary: row.summary,
            description: row.description,
            status,
            hours_worked: row.hours_worked,
            tags,
            assignee: row.assignee,
            resolved_at: row.resolved_at,
            clause_id: row.clause_id,
            billable_amount: row.billable_amount,
            is_billable: row.is_billable,
        }
    }
}

/// 条款行
#[derive(Debug, Clone, FromRow)]
pub struct ClauseRow {
    pub clause_id: String,
    pub clause_name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub currency: String,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<ClauseRow> for Clause {
    fn from(row: ClauseRow) -> Self {
        let currency = Currency::parse(&row.currency).unwrap_or_else(|| {
            tracing::warn!("Clause {} has unknown currency {:?}", row.clause_id, row.currency);
            Currency::Eur
        });

        Clause {
            clause_id: row.clause_id,
            clause_name: row.clause_name,
            description: row.description,
            unit_price: row.unit_price,
            currency,
            effective_date: row.effective_date,
            expiry_date: row.expiry_date,
            created_by: row.created_by,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

const CLAUSE_COLUMNS: &str = "clause_id, clause_name, description, unit_price, currency, \
     effective_date, expiry_date, created_by, created_at, is_active";

const TICKET_COLUMNS: &str = "ticket_id, summary, description, status, hours_worked, labels, \
     assignee, resolved_at, clause_id, billable_amount, is_billable";

/// 按编号查询条款 (不区分激活状态)
pub async fn get_clause(pool: &PgPool, clause_id: &str) -> Result<Option<Clause>, sqlx::Error> {
    let row = sqlx::query_as::<_, ClauseRow>(&format!(
        "SELECT {CLAUSE_COLUMNS} FROM legal_clauses WHERE clause_id = $1"
    ))
    .bind(clause_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Clause::from))
}

/// 按标签查询激活条款 (标签即条款编号)
pub async fn get_active_clause_by_tag(
    pool: &PgPool,
    tag: &str,
) -> Result<Option<Clause>, sqlx::Error> {
    let row = sqlx::query_as::<_, ClauseRow>(&format!(
        "SELECT {CLAUSE_COLUMNS} FROM legal_clauses WHERE clause_id = $1 AND is_active = TRUE"
    ))
    .bind(tag)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Clause::from))
}

/// 按状态/标签过滤工单 (动态条件, 按工单号排序)
pub async fn query_tickets(
    pool: &PgPool,
    status: Option<TicketStatus>,
    tag: Option<&str>,
) -> Result<Vec<Ticket>, sqlx::Error> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {TICKET_COLUMNS} FROM jira_tickets WHERE 1=1"
    ));

    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(tag) = tag {
        // 逗号分隔的 labels 列上做整词匹配, 避免子串误命中
        qb.push(" AND ',' || labels || ',' LIKE ")
            .push_bind(format!("%,{tag},%"));
    }
    qb.push(" ORDER BY ticket_id");

    let rows = qb.build_query_as::<TicketRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Ticket::from).collect())
}

/// 覆盖工单上的计费注解, 返回影响行数
pub async fn save_ticket_annotation(
    pool: &PgPool,
    ticket_id: &str,
    annotation: &BillingAnnotation,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jira_tickets
        SET clause_id = $2, billable_amount = $3, is_billable = $4, updated_at = now()
        WHERE ticket_id = $1
        "#,
    )
    .bind(ticket_id)
    .bind(&annotation.clause_id)
    .bind(annotation.billable_amount.clone())
    .bind(annotation.is_billable)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// 发票 + 发票行单事务落库 (全有或全无)
pub async fn insert_invoice_with_lines(
    pool: &PgPool,
    invoice: &Invoice,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO invoices (invoice_id, project_name, billing_period, total_amount,
                              currency, status, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&invoice.invoice_id)
    .bind(&invoice.project_name)
    .bind(&invoice.billing_period)
    .bind(invoice.total_amount.clone())
    .bind(invoice.currency.as_str())
    .bind(invoice.status.as_str())
    .bind(&invoice.created_by)
    .bind(invoice.created_at)
    .execute(&mut *tx)
    .await?;

    let mut qb = QueryBuilder::new(
        "INSERT INTO invoice_lines (line_id, invoice_id, jira_ticket_id, clause_id, \
         hours_worked, unit_price, line_total) ",
    );
    qb.push_values(&invoice.lines, |mut b, line| {
        b.push_bind(line.line_id)
            .push_bind(&line.invoice_id)
            .push_bind(&line.ticket_id)
            .push_bind(&line.clause_id)
            .push_bind(line.hours_worked.clone())
            .push_bind(line.unit_price.clone())
            .push_bind(line.line_total.clone());
    });
    qb.build().execute(&mut *tx).await?;

    tx.commit().await?;

    tracing::info!(
        "Invoice {} persisted with {} lines",
        invoice.invoice_id,
        invoice.lines.len()
    );
    Ok(())
}

/// 导出发票行到 CSV 文件 (PostgreSQL COPY 兼容格式)
pub fn export_invoice_to_csv(
    invoice: &Invoice,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;
    use std::fs::File;

    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    for line in &invoice.lines {
        writer.write_record(&[
            line.invoice_id.clone(),
            line.line_id.to_string(),
            line.ticket_id.clone(),
            line.clause_id.clone(),
            line.hours_worked.to_string(),
            line.unit_price.to_string(),
            line.line_total.to_string(),
            invoice.currency.as_str().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
