// src/common/validation.rs

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::common::error::AppError;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

/// Maior valor que cabe nas colunas NUMERIC(12, 2).
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

// Valores em dinheiro: nem negativos, nem além do que o banco grava
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    if *val > max_money() {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &max_money());
        err.message = Some("O valor excede o limite permitido.".into());
        return Err(err);
    }
    Ok(())
}

/// Campo obrigatório ausente vira erro de validação no mesmo formato do `validator`.
pub fn required<T>(value: Option<T>, field: &'static str, message: &'static str) -> Result<T, AppError> {
    value.ok_or_else(|| {
        let mut err = ValidationError::new("required");
        err.message = Some(message.into());

        let mut errors = ValidationErrors::new();
        errors.add(field, err);
        AppError::ValidationError(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_fail() {
        assert!(validate_not_negative(&Decimal::from(-1)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::from(10)).is_ok());
    }

    #[test]
    fn money_is_bounded_by_the_column_range() {
        assert!(validate_money(&max_money()).is_ok());
        assert!(validate_money(&Decimal::ZERO).is_ok());
        assert!(validate_money(&(max_money() + Decimal::new(1, 2))).is_err());
        assert!(validate_money(&Decimal::MAX).is_err());
        assert!(validate_money(&Decimal::from(-5)).is_err());
    }

    #[test]
    fn missing_field_becomes_validation_error() {
        let err = required::<i32>(None, "customerId", "Selecione o cliente.").unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("customerId"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn present_field_passes_through() {
        assert_eq!(required(Some(7), "quantity", "x").unwrap(), 7);
    }
}
