use thiserror::Error;

/// 计费管道错误
/// 逐单的不可计费原因不是错误, 走 BatchClassification 的 invalid 分区;
/// 存储层错误原样向上传播, 不吞不重试, 重试策略由调用方决定
#[derive(Debug, Error)]
pub enum BillingError {
    /// valid 分区为空时发票装配的唯一硬失败
    #[error("no valid billable tickets found")]
    NoBillableItems,

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// 注解落库指向了不存在的工单
    #[error("ticket {0} not found")]
    TicketNotFound(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
