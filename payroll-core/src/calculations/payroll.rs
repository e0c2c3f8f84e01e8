//! Payroll breakdown for a single employee.
//!
//! | Step | Amount          | Formula |
//! |------|-----------------|---------|
//! | 1    | Gross salary    | basic + allowances |
//! | 2    | EPF (employee)  | round2(basic × EPF employee % / 100) |
//! | 3    | EPF (employer)  | round2(basic × EPF employer % / 100) |
//! | 4    | ETF             | round2(basic × ETF % / 100) |
//! | 5    | APIT            | bracket walk over gross, see [`calculate_apit`] |
//! | 6    | Deductions      | EPF employee + stamp fee (+ APIT in scenario A) |
//! | 7    | Net salary      | gross - deductions |
//! | 8    | Cost to company | gross + EPF employer + ETF (+ APIT in scenario B) |
//!
//! EPF and ETF are levied on basic salary only; APIT on gross. Lines 6-8 are
//! sums of already-rounded amounts and are not rounded again.
//!
//! The calculator does not validate its input. Negative salaries flow
//! through the arithmetic unchanged; rejecting them is the caller's job.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::compute_payroll;
//! use payroll_core::{ApitScenario, EmployeeSalaryInput, TaxRateSet};
//!
//! let input = EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employee);
//! let result = compute_payroll(&input, &TaxRateSet::default());
//!
//! assert_eq!(result.total_deductions, dec!(8025.00));
//! assert_eq!(result.net_salary, dec!(91975.00));
//! assert_eq!(result.total_ctc, dec!(115000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::apit::calculate_apit;
use crate::calculations::common::percent_of;
use crate::{ApitScenario, EmployeeSalaryInput, PayrollComputationResult, TaxRateSet};

/// Rates that apply to one employee after per-employee overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRates {
    pub epf_employee_rate: Decimal,
    pub epf_employer_rate: Decimal,
    pub etf_rate: Decimal,
    pub stamp_fee: Decimal,
}

/// Resolves the EPF/ETF rates for `input`, preferring its overrides.
///
/// The stamp fee has no per-employee override and always comes from `rates`.
pub fn effective_rates(
    input: &EmployeeSalaryInput,
    rates: &TaxRateSet,
) -> EffectiveRates {
    EffectiveRates {
        epf_employee_rate: input.epf_employee_rate.unwrap_or(rates.epf_employee_rate),
        epf_employer_rate: input.epf_employer_rate.unwrap_or(rates.epf_employer_rate),
        etf_rate: input.etf_rate.unwrap_or(rates.etf_rate),
        stamp_fee: rates.stamp_fee,
    }
}

/// Computes the full salary breakdown for one employee.
///
/// Shorthand for `PayrollCalculator::new(rates).calculate(input)`. Every
/// payroll path (single preview, run preview, run generation) goes through
/// here so identical inputs always produce identical figures.
pub fn compute_payroll(
    input: &EmployeeSalaryInput,
    rates: &TaxRateSet,
) -> PayrollComputationResult {
    PayrollCalculator::new(rates).calculate(input)
}

/// Calculator bound to one resolved [`TaxRateSet`].
///
/// Cheap to construct; holds only a borrow of the rate set, so a bulk run
/// builds one and reuses it for every employee.
#[derive(Debug, Clone, Copy)]
pub struct PayrollCalculator<'a> {
    rates: &'a TaxRateSet,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(rates: &'a TaxRateSet) -> Self {
        Self { rates }
    }

    /// Calculates the payroll breakdown for `input`.
    pub fn calculate(
        &self,
        input: &EmployeeSalaryInput,
    ) -> PayrollComputationResult {
        let rates = effective_rates(input, self.rates);

        let gross_salary = self.gross_salary(input.basic_salary, input.allowances);

        // Statutory funds are levied on basic salary only
        let epf_employee = percent_of(input.basic_salary, rates.epf_employee_rate);
        let epf_employer = percent_of(input.basic_salary, rates.epf_employer_rate);
        let etf = percent_of(input.basic_salary, rates.etf_rate);

        let apit = calculate_apit(gross_salary, &self.rates.apit_brackets);
        let apit_employer = self.apit_employer(input.apit_scenario, apit);

        let total_deductions =
            self.total_deductions(input.apit_scenario, epf_employee, apit, rates.stamp_fee);
        let net_salary = gross_salary - total_deductions;
        let total_ctc = gross_salary + epf_employer + etf + apit_employer;

        PayrollComputationResult {
            basic_salary: input.basic_salary,
            allowances: input.allowances,
            apit_scenario: input.apit_scenario,
            gross_salary,
            epf_employee,
            epf_employer,
            etf,
            apit,
            apit_employer,
            stamp_fee: rates.stamp_fee,
            total_deductions,
            net_salary,
            total_ctc,
        }
    }

    fn gross_salary(
        &self,
        basic_salary: Decimal,
        allowances: Decimal,
    ) -> Decimal {
        basic_salary + allowances
    }

    /// APIT carried by the employer: all of it in scenario B, none in A.
    fn apit_employer(
        &self,
        scenario: ApitScenario,
        apit: Decimal,
    ) -> Decimal {
        match scenario {
            ApitScenario::Employee => Decimal::ZERO,
            ApitScenario::Employer => apit,
        }
    }

    /// Amounts debited from the employee's payslip.
    fn total_deductions(
        &self,
        scenario: ApitScenario,
        epf_employee: Decimal,
        apit: Decimal,
        stamp_fee: Decimal,
    ) -> Decimal {
        match scenario {
            ApitScenario::Employee => epf_employee + apit + stamp_fee,
            ApitScenario::Employer => epf_employee + stamp_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn default_rates() -> TaxRateSet {
        TaxRateSet::default()
    }

    #[test]
    fn scenario_employee_at_first_bracket_ceiling() {
        let input = EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employee);

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(
            result,
            PayrollComputationResult {
                basic_salary: dec!(100000),
                allowances: dec!(0),
                apit_scenario: ApitScenario::Employee,
                gross_salary: dec!(100000),
                epf_employee: dec!(8000.00),
                epf_employer: dec!(12000.00),
                etf: dec!(3000.00),
                apit: dec!(0.00),
                apit_employer: dec!(0),
                stamp_fee: dec!(25),
                total_deductions: dec!(8025.00),
                net_salary: dec!(91975.00),
                total_ctc: dec!(115000.00),
            }
        );
    }

    #[test]
    fn scenario_employer_with_allowances() {
        let input = EmployeeSalaryInput::new(dec!(200000), dec!(20000), ApitScenario::Employer);

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(result.gross_salary, dec!(220000));
        assert_eq!(result.epf_employee, dec!(16000.00));
        assert_eq!(result.epf_employer, dec!(24000.00));
        assert_eq!(result.etf, dec!(6000.00));
        assert_eq!(result.apit, dec!(14100.00));
        assert_eq!(result.apit_employer, dec!(14100.00));
        assert_eq!(result.total_deductions, dec!(16025.00));
        assert_eq!(result.net_salary, dec!(203975.00));
        assert_eq!(result.total_ctc, dec!(264100.00));
    }

    #[test]
    fn scenario_employee_deducts_apit_from_net() {
        let input = EmployeeSalaryInput::new(dec!(200000), dec!(20000), ApitScenario::Employee);

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(result.apit_employer, Decimal::ZERO);
        assert_eq!(result.total_deductions, dec!(30125.00));
        assert_eq!(result.net_salary, dec!(189875.00));
        assert_eq!(result.total_ctc, dec!(250000.00));
    }

    #[test]
    fn statutory_funds_ignore_allowances() {
        let without = compute_payroll(
            &EmployeeSalaryInput::new(dec!(80000), dec!(0), ApitScenario::Employee),
            &default_rates(),
        );
        let with = compute_payroll(
            &EmployeeSalaryInput::new(dec!(80000), dec!(50000), ApitScenario::Employee),
            &default_rates(),
        );

        assert_eq!(with.epf_employee, without.epf_employee);
        assert_eq!(with.epf_employer, without.epf_employer);
        assert_eq!(with.etf, without.etf);
        assert!(with.apit > without.apit);
    }

    #[test]
    fn employee_overrides_take_precedence() {
        let input = EmployeeSalaryInput {
            epf_employee_rate: Some(dec!(10)),
            epf_employer_rate: Some(dec!(15)),
            etf_rate: Some(dec!(0)),
            ..EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employee)
        };

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(result.epf_employee, dec!(10000.00));
        assert_eq!(result.epf_employer, dec!(15000.00));
        assert_eq!(result.etf, dec!(0.00));
        assert_eq!(result.stamp_fee, dec!(25));
    }

    #[test]
    fn partial_override_falls_back_per_rate() {
        let input = EmployeeSalaryInput {
            etf_rate: Some(dec!(5)),
            ..EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employee)
        };

        let rates = effective_rates(&input, &default_rates());

        assert_eq!(
            rates,
            EffectiveRates {
                epf_employee_rate: dec!(8),
                epf_employer_rate: dec!(12),
                etf_rate: dec!(5),
                stamp_fee: dec!(25),
            }
        );
    }

    #[test]
    fn stamp_fee_comes_from_rate_set() {
        let rates = TaxRateSet {
            stamp_fee: dec!(50),
            ..default_rates()
        };
        let input = EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employee);

        let result = compute_payroll(&input, &rates);

        assert_eq!(result.stamp_fee, dec!(50));
        assert_eq!(result.total_deductions, dec!(8050.00));
    }

    #[test]
    fn sub_amounts_have_two_decimal_places() {
        let input = EmployeeSalaryInput::new(dec!(123456.78), dec!(9876.54), ApitScenario::Employer);

        let result = compute_payroll(&input, &default_rates());

        for amount in [result.epf_employee, result.epf_employer, result.etf, result.apit] {
            assert_eq!(amount.scale(), 2, "{amount} is not expressed to 2dp");
        }
        assert_eq!(result.epf_employee, dec!(9876.54));
        assert_eq!(result.etf, dec!(3703.70));
    }

    #[test]
    fn negative_salary_flows_through_unvalidated() {
        let input = EmployeeSalaryInput::new(dec!(-1000), dec!(0), ApitScenario::Employee);

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(result.epf_employee, dec!(-80.00));
        assert_eq!(result.apit, dec!(0.00));
        assert_eq!(result.net_salary, dec!(-945.00));
    }

    #[test]
    fn serializes_with_reporting_field_names() {
        let input = EmployeeSalaryInput::new(dec!(100000), dec!(0), ApitScenario::Employer);

        let result = compute_payroll(&input, &default_rates());
        let json = serde_json::to_value(&result).unwrap();

        for field in [
            "basicSalary",
            "allowances",
            "apitScenario",
            "grossSalary",
            "epfEmployee",
            "epfEmployer",
            "etf",
            "apit",
            "apitEmployer",
            "stampFee",
            "totalDeductions",
            "netSalary",
            "totalCTC",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["apitScenario"], "employer");
    }

    #[test]
    fn inputs_at_the_input_bound_stay_in_range() {
        use crate::calculations::MAX_INPUT_AMOUNT;

        let input = EmployeeSalaryInput {
            epf_employee_rate: Some(MAX_INPUT_AMOUNT),
            epf_employer_rate: Some(MAX_INPUT_AMOUNT),
            etf_rate: Some(MAX_INPUT_AMOUNT),
            ..EmployeeSalaryInput::new(
                MAX_INPUT_AMOUNT,
                MAX_INPUT_AMOUNT * dec!(3),
                ApitScenario::Employer,
            )
        };

        let result = compute_payroll(&input, &default_rates());

        assert_eq!(result.gross_salary, dec!(4000000000000));
        assert_eq!(result.epf_employee, dec!(10000000000000000000000.00));
        assert_eq!(result.apit, result.apit_employer);
    }
}
