use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CrpError;
use crate::types::{Money, Rate};
use crate::CrpResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Net Present Value of a series of cash flows (first flow at t=0).
///
/// Uses iterative discount factors to stay exact in Decimal.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> CrpResult<Money> {
    if rate <= dec!(-1) {
        return Err(CrpError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            // Fully discounted once the factor overflows Decimal
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Callers that can tolerate non-convergence (all-positive flows have no
/// root) should substitute the engine's sentinel of zero.
pub fn irr(cash_flows: &[Money], guess: Rate) -> CrpResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(CrpError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        let mut discount = Decimal::ONE;
        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                // At extreme rates the factor overflows Decimal; later
                // terms are negligible by then
                discount = match discount.checked_mul(one_plus_r) {
                    Some(d) if !d.is_zero() => d,
                    _ => break,
                };
            }
            npv_val += cf / discount;
            if t > 0 {
                let t_dec = Decimal::from(t as i64);
                if let Some(next) = discount.checked_mul(one_plus_r) {
                    dnpv -= t_dec * (cf / next);
                }
            }
        }

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(CrpError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    Err(CrpError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}

/// Constant annuity payment for a level-payment loan.
/// PMT = P * r * (1+r)^n / ((1+r)^n - 1), compound via iterative multiplication.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> Money {
    if principal <= Decimal::ZERO || periods == 0 {
        return Decimal::ZERO;
    }
    if rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        compound *= one_plus_r;
    }

    if compound.is_zero() {
        return Decimal::ZERO;
    }

    principal * rate * compound / (compound - Decimal::ONE)
}
