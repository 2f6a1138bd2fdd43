use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use std::str::FromStr;

use crate::models::{money_zero, Clause, Currency, Ticket, TicketStatus};

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn tags(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

pub fn clause(id: &str, unit_price: &str, active: bool) -> Clause {
    Clause {
        clause_id: id.to_string(),
        clause_name: format!("Clause {id}"),
        description: None,
        unit_price: dec(unit_price),
        currency: Currency::Eur,
        effective_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        expiry_date: None,
        created_by: Some("admin".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        is_active: active,
    }
}

pub fn ticket(id: &str, status: TicketStatus, hours: &str, tag_list: &[&str]) -> Ticket {
    Ticket {
        ticket_id: id.to_string(),
        summary: format!("Ticket {id}"),
        description: None,
        status,
        hours_worked: dec(hours),
        tags: tags(tag_list),
        assignee: None,
        resolved_at: None,
        clause_id: None,
        billable_amount: money_zero(),
        is_billable: false,
    }
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}
