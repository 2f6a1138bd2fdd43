pub mod classification;
pub mod clause;
pub mod invoice;
pub mod money;
pub mod ticket;

pub use classification::{
    BatchClassification, BillableItem, RejectedTicket, REASON_NOT_CLOSED, REASON_NO_HOURS,
    REASON_NO_MATCHING_CLAUSE, REASON_NO_TAGS,
};
pub use clause::{Clause, Currency};
pub use invoice::{Invoice, InvoiceLine, InvoiceStatus};
pub use money::{line_cost, money_zero};
pub use ticket::{BillingAnnotation, DateRange, Ticket, TicketQuery, TicketStatus};
