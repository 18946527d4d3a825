use {
    super::error::ParseError,
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// ISO 4217-like currency code, normalised to upper case (`COP`, `USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for Currency {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseError::MalformedPayload(format!(
                "invalid currency code: {s:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, ParseError> {
        if amount.is_sign_negative() {
            return Err(ParseError::MalformedPayload(format!(
                "amount cannot be negative, got: {amount}"
            )));
        }
        Ok(Self { amount, currency })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rust_decimal::Decimal};

    #[test]
    fn currency_is_normalised_to_upper_case() {
        assert_eq!(Currency::try_from("cop").unwrap().as_str(), "COP");
    }

    #[test]
    fn currency_rejects_non_codes() {
        assert!(Currency::try_from("pesos").is_err());
        assert!(Currency::try_from("U$D").is_err());
    }

    #[test]
    fn money_rejects_negative_amounts() {
        let cop = Currency::try_from("COP").unwrap();
        assert!(Money::new(Decimal::new(-1, 0), cop).is_err());
    }
}
