use bigdecimal::rounding::RoundingMode;
use bigdecimal::{BigDecimal, Zero};

/// 金额零值 (固定两位小数)
pub fn money_zero() -> BigDecimal {
    BigDecimal::zero().with_scale(2)
}

/// 成本计算: round(hours × unit_price, 2)
/// 半进位 (half-up), 与两位小数币种的最小货币单位约定一致
/// 零工时或零单价直接得 0.00, 不报错
/// 舍入只发生在这一次乘法上, 后续合计都是已舍入值的精确相加
pub fn line_cost(hours: &BigDecimal, unit_price: &BigDecimal) -> BigDecimal {
    if hours.is_zero() || unit_price.is_zero() {
        return money_zero();
    }
    (hours * unit_price).with_scale_round(2, RoundingMode::HalfUp)
}
