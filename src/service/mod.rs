pub mod assembler;
pub mod classifier;
pub mod enricher;
pub mod matcher;

#[cfg(test)]
pub(crate) mod testutil;

pub use assembler::InvoiceAssembler;
pub use classifier::classify;
pub use enricher::{normalize_to_utc, TicketEnricher};
pub use matcher::match_clause;
