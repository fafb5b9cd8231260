//! The currency/rate join and GDP estimation engine.
//!
//! `normalize` is a pure, total function: given the two fetched datasets and
//! a multiplier source it always produces one normalized record per raw
//! country, with no I/O and no error path. All the missing-data policy of
//! the system lives here:
//!
//! - a country with no currency gets an estimate of exactly zero,
//! - a currency without a matching rate gets an explicitly unknown (`None`)
//!   estimate,
//! - otherwise the estimate is `population x multiplier / rate`.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::model::NormalizedCountry;
use econatlas_sources::{RateTable, RawCountry};

/// Source of the estimation multiplier.
///
/// Production draws a fresh value per country per refresh; tests inject a
/// fixed one so the estimate is deterministic.
pub trait GdpMultiplier: Send + Sync {
    fn draw(&self) -> Decimal;
}

/// Production multiplier: uniform over `[1000, 2000)`, independently per
/// draw. The estimate is a synthetic proxy by design, so the spread is part
/// of the contract rather than noise to be removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformMultiplier;

impl GdpMultiplier for UniformMultiplier {
    fn draw(&self) -> Decimal {
        let value = rand::thread_rng().gen_range(1000.0_f64..2000.0);
        // f64 in [1000, 2000) always converts; the fallback is unreachable.
        Decimal::from_f64(value).unwrap_or_else(|| dec!(1500))
    }
}

/// Deterministic multiplier for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedMultiplier(pub Decimal);

impl GdpMultiplier for FixedMultiplier {
    fn draw(&self) -> Decimal {
        self.0
    }
}

/// Join raw countries with the rate table and compute estimates.
pub fn normalize(
    countries: Vec<RawCountry>,
    rates: &RateTable,
    multiplier: &dyn GdpMultiplier,
) -> Vec<NormalizedCountry> {
    countries
        .into_iter()
        .map(|country| normalize_one(country, rates, multiplier))
        .collect()
}

fn normalize_one(
    country: RawCountry,
    rates: &RateTable,
    multiplier: &dyn GdpMultiplier,
) -> NormalizedCountry {
    let currency_code = country.primary_currency().map(str::to_string);
    let exchange_rate = currency_code
        .as_deref()
        .and_then(|code| rates.get(code))
        .copied();

    let estimated_gdp = match (&currency_code, exchange_rate) {
        // No standalone currency: zero economic estimate by policy.
        (None, _) => Some(Decimal::ZERO),
        // Currency known but rate unavailable: explicitly unknown, not zero.
        (Some(_), None) => None,
        (Some(_), Some(rate)) => {
            Some(Decimal::from(country.population) * multiplier.draw() / rate)
        }
    };

    NormalizedCountry {
        name: country.name,
        capital: country.capital,
        region: country.region,
        population: country.population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: country.flag_url,
        last_refreshed_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw(name: &str, population: i64, codes: &[&str]) -> RawCountry {
        RawCountry {
            name: name.to_string(),
            capital: None,
            region: None,
            population,
            currency_codes: codes.iter().map(|c| c.to_string()).collect(),
            flag_url: None,
        }
    }

    fn rates(pairs: &[(&str, Decimal)]) -> RateTable {
        pairs
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect()
    }

    #[test]
    fn test_no_currency_yields_zero_estimate() {
        let result = normalize(
            vec![raw("Antarctica", 0, &[])],
            &HashMap::new(),
            &FixedMultiplier(dec!(1500)),
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].currency_code, None);
        assert_eq!(result[0].exchange_rate, None);
        assert_eq!(result[0].estimated_gdp, Some(Decimal::ZERO));
    }

    #[test]
    fn test_missing_rate_yields_unknown_estimate() {
        let result = normalize(
            vec![raw("Zimbabwe", 14_862_924, &["ZWL"])],
            &rates(&[("EUR", dec!(0.92))]),
            &FixedMultiplier(dec!(1500)),
        );

        assert_eq!(result[0].currency_code.as_deref(), Some("ZWL"));
        assert_eq!(result[0].exchange_rate, None);
        assert_eq!(result[0].estimated_gdp, None);
    }

    #[test]
    fn test_estimate_uses_first_currency_and_rate() {
        let table = rates(&[("EUR", dec!(0.92)), ("USD", dec!(1))]);
        let result = normalize(
            vec![raw("Aland", 1000, &["EUR", "USD"])],
            &table,
            &FixedMultiplier(dec!(1000)),
        );

        let record = &result[0];
        assert_eq!(record.currency_code.as_deref(), Some("EUR"));
        assert_eq!(record.exchange_rate, Some(dec!(0.92)));
        // 1000 * 1000 / 0.92
        let expected = dec!(1000000) / dec!(0.92);
        assert_eq!(record.estimated_gdp, Some(expected));
    }

    #[test]
    fn test_estimate_bounds_match_multiplier_bounds() {
        let table = rates(&[("EUR", dec!(0.92))]);
        let population = 1000i64;

        for multiplier in [dec!(1000), dec!(1500), dec!(1999.999)] {
            let result = normalize(
                vec![raw("Aland", population, &["EUR"])],
                &table,
                &FixedMultiplier(multiplier),
            );
            let gdp = result[0].estimated_gdp.unwrap();
            assert!(gdp >= dec!(1000) * Decimal::from(population) / dec!(0.92) - dec!(0.01));
            assert!(gdp < dec!(2000) * Decimal::from(population) / dec!(0.92));
        }
    }

    #[test]
    fn test_uniform_multiplier_stays_in_range() {
        let source = UniformMultiplier;
        for _ in 0..1000 {
            let draw = source.draw();
            assert!(draw >= dec!(1000), "draw {} below range", draw);
            assert!(draw < dec!(2000), "draw {} above range", draw);
        }
    }

    #[test]
    fn test_carries_descriptive_fields_through() {
        let mut country = raw("Aland", 28_875, &["EUR"]);
        country.capital = Some("Mariehamn".to_string());
        country.region = Some("Europe".to_string());
        country.flag_url = Some("https://flagcdn.com/ax.svg".to_string());

        let result = normalize(
            vec![country],
            &rates(&[("EUR", dec!(0.92))]),
            &FixedMultiplier(dec!(1500)),
        );

        let record = &result[0];
        assert_eq!(record.name, "Aland");
        assert_eq!(record.capital.as_deref(), Some("Mariehamn"));
        assert_eq!(record.region.as_deref(), Some("Europe"));
        assert_eq!(record.population, 28_875);
        assert_eq!(record.flag_url.as_deref(), Some("https://flagcdn.com/ax.svg"));
        assert_eq!(record.last_refreshed_at, None);
    }
}
