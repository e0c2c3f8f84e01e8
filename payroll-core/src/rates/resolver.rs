use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::validation::validate_brackets;
use crate::{ApitBracket, TaxRateConfig, TaxRateSet, TaxType};

/// Picks the configuration entry in force for `tax_type` on `as_of`.
///
/// Among several qualifying entries the one with the latest
/// `applicable_from` wins; equal start dates fall back to the highest `id`.
pub fn select_active<'a>(
    configs: &'a [TaxRateConfig],
    tax_type: TaxType,
    as_of: NaiveDate,
) -> Option<&'a TaxRateConfig> {
    configs
        .iter()
        .filter(|c| c.tax_type == tax_type && c.is_effective_on(as_of))
        .filter(|c| tax_type != TaxType::Apit || !c.brackets.is_empty())
        .max_by_key(|c| (c.applicable_from, c.id))
}

/// Builds the [`TaxRateSet`] in force on `as_of` from raw configuration.
///
/// Each tax type is resolved independently. Types without a qualifying
/// entry, and an APIT table that fails [`validate_brackets`], fall back to
/// the statutory defaults. Never fails.
pub fn resolve_active_rates(
    configs: &[TaxRateConfig],
    as_of: NaiveDate,
) -> TaxRateSet {
    let defaults = TaxRateSet::default();

    let rate_for = |tax_type: TaxType, fallback: Decimal| -> Decimal {
        match select_active(configs, tax_type, as_of) {
            Some(config) => {
                debug!(tax_type = tax_type.as_str(), id = config.id, rate = %config.rate, "using configured rate");
                config.rate
            }
            None => {
                debug!(tax_type = tax_type.as_str(), rate = %fallback, "no active configuration, using default");
                fallback
            }
        }
    };

    TaxRateSet {
        epf_employee_rate: rate_for(TaxType::EpfEmployee, defaults.epf_employee_rate),
        epf_employer_rate: rate_for(TaxType::EpfEmployer, defaults.epf_employer_rate),
        etf_rate: rate_for(TaxType::Etf, defaults.etf_rate),
        stamp_fee: rate_for(TaxType::StampFee, defaults.stamp_fee),
        apit_brackets: resolve_brackets(configs, as_of).unwrap_or(defaults.apit_brackets),
    }
}

fn resolve_brackets(
    configs: &[TaxRateConfig],
    as_of: NaiveDate,
) -> Option<Vec<ApitBracket>> {
    let config = select_active(configs, TaxType::Apit, as_of)?;

    let mut brackets = config.brackets.clone();
    brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));

    match validate_brackets(&brackets) {
        Ok(()) => {
            debug!(id = config.id, brackets = brackets.len(), "using configured APIT table");
            Some(brackets)
        }
        Err(error) => {
            warn!(id = config.id, %error, "configured APIT table is malformed, using default table");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::rates::defaults;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(
        id: i64,
        tax_type: TaxType,
        rate: Decimal,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> TaxRateConfig {
        TaxRateConfig {
            id,
            tax_type,
            rate,
            brackets: Vec::new(),
            applicable_from: from,
            applicable_to: to,
            is_active: true,
            description: None,
        }
    }

    fn apit_config(
        id: i64,
        from: NaiveDate,
        brackets: Vec<ApitBracket>,
    ) -> TaxRateConfig {
        TaxRateConfig {
            brackets,
            ..config(id, TaxType::Apit, dec!(0), from, None)
        }
    }

    #[test]
    fn empty_configuration_yields_defaults() {
        let rates = resolve_active_rates(&[], date(2025, 1, 15));

        assert_eq!(rates, TaxRateSet::default());
    }

    #[test]
    fn configured_rates_replace_defaults_per_type() {
        let configs = vec![
            config(1, TaxType::EpfEmployee, dec!(9), date(2024, 1, 1), None),
            config(2, TaxType::StampFee, dec!(30), date(2024, 1, 1), None),
        ];

        let rates = resolve_active_rates(&configs, date(2025, 1, 15));

        assert_eq!(rates.epf_employee_rate, dec!(9));
        assert_eq!(rates.stamp_fee, dec!(30));
        assert_eq!(rates.epf_employer_rate, dec!(12));
        assert_eq!(rates.etf_rate, dec!(3));
    }

    #[test]
    fn ignores_inactive_and_out_of_window_entries() {
        let mut inactive = config(1, TaxType::Etf, dec!(4), date(2024, 1, 1), None);
        inactive.is_active = false;
        let configs = vec![
            inactive,
            config(2, TaxType::Etf, dec!(5), date(2026, 1, 1), None),
            config(3, TaxType::Etf, dec!(6), date(2023, 1, 1), Some(date(2024, 12, 31))),
        ];

        let rates = resolve_active_rates(&configs, date(2025, 1, 15));

        assert_eq!(rates.etf_rate, dec!(3));
    }

    #[test]
    fn window_end_date_is_inclusive() {
        let configs = vec![config(1, TaxType::Etf, dec!(4), date(2024, 1, 1), Some(date(2025, 1, 15)))];

        assert_eq!(resolve_active_rates(&configs, date(2025, 1, 15)).etf_rate, dec!(4));
        assert_eq!(resolve_active_rates(&configs, date(2025, 1, 16)).etf_rate, dec!(3));
    }

    #[test]
    fn latest_applicable_from_wins() {
        let configs = vec![
            config(10, TaxType::EpfEmployer, dec!(13), date(2025, 1, 1), None),
            config(11, TaxType::EpfEmployer, dec!(12.5), date(2024, 1, 1), None),
        ];

        let rates = resolve_active_rates(&configs, date(2025, 6, 1));

        assert_eq!(rates.epf_employer_rate, dec!(13));
    }

    #[test]
    fn equal_start_dates_break_ties_by_highest_id() {
        let configs = vec![
            config(4, TaxType::EpfEmployer, dec!(14), date(2025, 1, 1), None),
            config(2, TaxType::EpfEmployer, dec!(15), date(2025, 1, 1), None),
        ];

        let rates = resolve_active_rates(&configs, date(2025, 6, 1));

        assert_eq!(rates.epf_employer_rate, dec!(14));
    }

    #[test]
    fn selection_ignores_input_order() {
        let a = config(1, TaxType::Etf, dec!(4), date(2024, 1, 1), None);
        let b = config(2, TaxType::Etf, dec!(5), date(2024, 6, 1), None);

        let forward = resolve_active_rates(&[a.clone(), b.clone()], date(2025, 1, 1));
        let backward = resolve_active_rates(&[b, a], date(2025, 1, 1));

        assert_eq!(forward, backward);
        assert_eq!(forward.etf_rate, dec!(5));
    }

    #[test]
    fn configured_apit_table_is_sorted_and_used() {
        let table = vec![
            ApitBracket::new(dec!(50001), None, dec!(10)),
            ApitBracket::new(dec!(0), Some(dec!(50000)), dec!(0)),
        ];
        let configs = vec![apit_config(1, date(2024, 1, 1), table)];

        let rates = resolve_active_rates(&configs, date(2025, 1, 1));

        assert_eq!(
            rates.apit_brackets,
            vec![
                ApitBracket::new(dec!(0), Some(dec!(50000)), dec!(0)),
                ApitBracket::new(dec!(50001), None, dec!(10)),
            ]
        );
    }

    #[test]
    fn apit_entry_without_brackets_is_skipped() {
        let table = vec![
            ApitBracket::new(dec!(0), Some(dec!(50000)), dec!(0)),
            ApitBracket::new(dec!(50001), None, dec!(10)),
        ];
        let configs = vec![
            apit_config(1, date(2024, 1, 1), table.clone()),
            apit_config(2, date(2025, 1, 1), Vec::new()),
        ];

        let rates = resolve_active_rates(&configs, date(2025, 6, 1));

        assert_eq!(rates.apit_brackets, table);
    }

    #[test]
    fn malformed_apit_table_falls_back_to_default() {
        let table = vec![
            ApitBracket::new(dec!(0), Some(dec!(50000)), dec!(0)),
            ApitBracket::new(dec!(90000), None, dec!(10)),
        ];
        let configs = vec![apit_config(1, date(2024, 1, 1), table)];

        let rates = resolve_active_rates(&configs, date(2025, 1, 1));

        assert_eq!(rates.apit_brackets, defaults::apit_brackets());
    }
}
