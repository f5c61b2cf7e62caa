//! Solving for the unknown in a time-value problem.
//!
//! Rates have no closed form and are found with Newton-Raphson on the net
//! present value of the cash flows. Terms use logarithms when there are no
//! contributions and a bounded period-by-period search otherwise. Principal
//! and contribution come straight from the future value of an annuity:
//!
//! `FV = P(1+r)^n + C((1+r)^n - 1)/r`

use chrono::NaiveDate;
use log::{debug, trace, warn};

use crate::error::{AmortizeError, AmortizeResult};
use crate::frequency::{to_periodic_rate, Frequency};
use crate::growth::{grow, MAX_GROWTH_YEARS};
use crate::loan::compute_payment;

/// Day count used to turn dates into year fractions for dated cash flows.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Tunables for the iterative rate solves.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    pub max_iterations: u32,
    /// Stop once successive estimates differ by less than this.
    pub tolerance: f64,
    /// Estimates are clamped into `[min_rate, max_rate]` after every step;
    /// `(1 + r)^t` is undefined for fractional `t` once `r <= -1`.
    pub min_rate: f64,
    pub max_rate: f64,
    /// Annual seed; divided by periods per year for periodic solves.
    pub initial_guess: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 0.0001,
            min_rate: -0.99,
            max_rate: 10.,
            initial_guess: 0.10,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    Exact,
    /// Newton-Raphson failed and the simple average-balance return was
    /// used instead. Callers should tell users the figure is approximate.
    Approximate,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReturnRate {
    /// Annual rate as a decimal (0.07 = 7%).
    pub rate: f64,
    pub iterations: u32,
    pub precision: Precision,
}

impl ReturnRate {
    pub fn percent(&self) -> f64 {
        self.rate * 100.
    }

    pub fn is_approximate(&self) -> bool {
        self.precision == Precision::Approximate
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowKind {
    Deposit,
    Withdrawal,
    Starting,
    Ending,
}

/// A dated cash flow in an investment account.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashFlowEvent {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: FlowKind,
}

impl CashFlowEvent {
    pub fn new(date: NaiveDate, amount: f64, kind: FlowKind) -> Self {
        Self { date, amount, kind }
    }

    /// Amount from the investor's side: money put in (the starting value and
    /// deposits) is negative, money taken out (withdrawals and the ending
    /// value) is positive.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            FlowKind::Starting | FlowKind::Deposit => -self.amount.abs(),
            FlowKind::Withdrawal | FlowKind::Ending => self.amount.abs(),
        }
    }
}

enum NewtonFailure {
    /// Derivative vanished or went non-finite.
    Stalled { estimate: f64, iterations: u32 },
    /// Ran out of iterations, or settled on a clamp bound.
    NotConverged { estimate: f64, iterations: u32 },
}

impl NewtonFailure {
    fn estimate(&self) -> f64 {
        match self {
            NewtonFailure::Stalled { estimate, .. } | NewtonFailure::NotConverged { estimate, .. } => {
                *estimate
            }
        }
    }

    /// Newton steps taken before giving up.
    fn iterations(&self) -> u32 {
        match self {
            NewtonFailure::Stalled { iterations, .. }
            | NewtonFailure::NotConverged { iterations, .. } => *iterations,
        }
    }
}

/// NPV of `(time, amount)` flows at `rate`, and its derivative in `rate`.
fn npv_with_derivative(flows: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let one_plus_r = 1. + rate;
    flows
        .iter()
        .fold((0., 0.), |(npv, dnpv), &(t, amount)| {
            let discount = one_plus_r.powf(t);
            (
                npv + amount / discount,
                dnpv - amount * t / (discount * one_plus_r),
            )
        })
}

fn newton_rate(
    flows: &[(f64, f64)],
    guess: f64,
    config: &SolverConfig,
) -> Result<(f64, u32), NewtonFailure> {
    let mut rate = guess.clamp(config.min_rate, config.max_rate);

    for iteration in 1..=config.max_iterations {
        let (npv, dnpv) = npv_with_derivative(flows, rate);
        if !npv.is_finite() || !dnpv.is_finite() || dnpv.abs() < 1e-15 {
            return Err(NewtonFailure::Stalled {
                estimate: rate,
                iterations: iteration - 1,
            });
        }

        let next = (rate - npv / dnpv).clamp(config.min_rate, config.max_rate);
        trace!("newton iteration {}: rate {} npv {} -> {}", iteration, rate, npv, next);

        if (next - rate).abs() < config.tolerance {
            if next <= config.min_rate || next >= config.max_rate {
                return Err(NewtonFailure::NotConverged {
                    estimate: next,
                    iterations: iteration,
                });
            }
            debug!("newton converged to {} after {} iterations", next, iteration);
            return Ok((next, iteration));
        }
        rate = next;
    }

    Err(NewtonFailure::NotConverged {
        estimate: rate,
        iterations: config.max_iterations,
    })
}

/// Rate at which the NPV of `(time, amount)` flows is zero. Times are in
/// whatever unit the rate is per (periods or years).
pub fn solve_rate_newton(flows: &[(f64, f64)], config: &SolverConfig) -> AmortizeResult<ReturnRate> {
    if flows.len() < 2 {
        return Err(AmortizeError::invalid("flows", "need at least two cash flows"));
    }
    newton_rate(flows, config.initial_guess, config)
        .map(|(rate, iterations)| ReturnRate {
            rate,
            iterations,
            precision: Precision::Exact,
        })
        .map_err(|failure| AmortizeError::UnreachableTarget {
            what: "rate".into(),
            best_estimate: failure.estimate(),
        })
}

/// Annualized return of irregularly dated flows, measured in years of
/// [`DAYS_PER_YEAR`] from the earliest event.
///
/// Falls back to [`simple_annualized_return`] (tagged
/// [`Precision::Approximate`]) when Newton-Raphson fails.
pub fn xirr(events: &[CashFlowEvent], config: &SolverConfig) -> AmortizeResult<ReturnRate> {
    if events.len() < 2 {
        return Err(AmortizeError::invalid("events", "need at least two cash flows"));
    }
    let mut events = events.to_vec();
    events.sort_by_key(|e| e.date);

    let base_date = events[0].date;
    let total_days = (events[events.len() - 1].date - base_date).num_days();
    if total_days <= 0 {
        return Err(AmortizeError::invalid("events", "cash flows must span at least one day"));
    }

    let flows: Vec<(f64, f64)> = events
        .iter()
        .map(|e| {
            (
                (e.date - base_date).num_days() as f64 / DAYS_PER_YEAR,
                e.signed_amount(),
            )
        })
        .collect();

    match newton_rate(&flows, config.initial_guess, config) {
        Ok((rate, iterations)) => Ok(ReturnRate {
            rate,
            iterations,
            precision: Precision::Exact,
        }),
        Err(failure) => {
            let total = |kind: FlowKind| -> f64 {
                events
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.amount.abs())
                    .sum()
            };
            let starting = total(FlowKind::Starting);
            let ending = total(FlowKind::Ending);
            let net_contributions = total(FlowKind::Deposit) - total(FlowKind::Withdrawal);
            let total_years = total_days as f64 / DAYS_PER_YEAR;

            let rate = simple_annualized_return(
                starting,
                ending,
                net_contributions,
                (starting + ending) / 2.,
                total_years,
            )
            .map_err(|_| AmortizeError::UnreachableTarget {
                what: "xirr".into(),
                best_estimate: failure.estimate(),
            })?;
            warn!("xirr did not converge, using approximate return {:.4}", rate);

            Ok(ReturnRate {
                rate,
                iterations: failure.iterations(),
                precision: Precision::Approximate,
            })
        }
    }
}

/// Gain over the average balance per year:
/// `(ending - starting - net_contributions) / average_balance / total_years`.
pub fn simple_annualized_return(
    starting: f64,
    ending: f64,
    net_contributions: f64,
    average_balance: f64,
    total_years: f64,
) -> AmortizeResult<f64> {
    if average_balance <= 0. || !average_balance.is_finite() {
        return Err(AmortizeError::invalid("average_balance", "must be greater than zero"));
    }
    if total_years <= 0. || !total_years.is_finite() {
        return Err(AmortizeError::invalid("total_years", "must be greater than zero"));
    }
    Ok((ending - starting - net_contributions) / average_balance / total_years)
}

fn growth_factors(periodic_rate: f64, num_periods: u32) -> (f64, f64) {
    if periodic_rate == 0. {
        return (1., num_periods as f64);
    }
    let factor = (1. + periodic_rate).powf(num_periods as f64);
    (factor, (factor - 1.) / periodic_rate)
}

/// Starting amount that grows to `target` with the given contributions.
/// Zero when the contributions alone get there.
pub fn required_principal(contribution: f64, periodic_rate: f64, num_periods: u32, target: f64) -> f64 {
    let (factor, annuity) = growth_factors(periodic_rate, num_periods);
    let principal = (target - contribution * annuity) / factor;
    if principal < 0. {
        warn!("contributions exceed target on their own, no principal required");
        return 0.;
    }
    principal
}

/// Periodic deposit that grows `principal` to `target`. Zero when the
/// principal alone gets there.
pub fn required_contribution(
    principal: f64,
    periodic_rate: f64,
    num_periods: u32,
    target: f64,
) -> AmortizeResult<f64> {
    if num_periods == 0 {
        return Err(AmortizeError::invalid("num_periods", "must be at least one"));
    }
    let (factor, annuity) = growth_factors(periodic_rate, num_periods);
    let contribution = (target - principal * factor) / annuity;
    if contribution < 0. {
        warn!("principal exceeds target on its own, no contribution required");
        return Ok(0.);
    }
    Ok(contribution)
}

/// Periods until the balance reaches `target`. Fractional when solved in
/// closed form (no contributions), whole periods otherwise.
pub fn periods_to_target(
    principal: f64,
    contribution: f64,
    periodic_rate: f64,
    target: f64,
    frequency: Frequency,
) -> AmortizeResult<f64> {
    if principal >= target {
        return Ok(0.);
    }

    let cap = MAX_GROWTH_YEARS * frequency.periods_per_year();
    let unreachable = |best_estimate: f64| AmortizeError::UnreachableTarget {
        what: "term".into(),
        best_estimate,
    };

    if contribution == 0. {
        if principal <= 0. || periodic_rate <= 0. {
            return Err(unreachable(cap as f64));
        }
        let periods = (target / principal).ln() / (1. + periodic_rate).ln();
        if periods > cap as f64 {
            return Err(unreachable(cap as f64));
        }
        return Ok(periods);
    }

    let mut balance = principal;
    let mut periods = 0;
    while balance < target && periods < cap {
        balance = grow(balance, periodic_rate, contribution);
        periods += 1;
    }
    if balance < target {
        return Err(unreachable(periods as f64));
    }
    Ok(periods as f64)
}

/// Which quantity of a [`TimeValueInputs`] to solve for. The field being
/// solved for is ignored.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveFor {
    /// Level loan payment that retires `principal` over `years`.
    Payment,
    Rate,
    Principal,
    Term,
    Contribution,
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeValueInputs {
    pub principal: f64,
    /// Deposited at the end of every period.
    pub contribution: f64,
    pub annual_rate_percent: f64,
    pub years: f64,
    pub target: f64,
    /// Both the contribution and the compounding frequency.
    pub frequency: Frequency,
}

impl TimeValueInputs {
    pub fn periodic_rate(&self) -> f64 {
        to_periodic_rate(self.annual_rate_percent, self.frequency)
    }

    pub fn num_periods(&self) -> u32 {
        (self.years * self.frequency.periods_per_year() as f64).round() as u32
    }

    fn check(&self, solve_for: SolveFor) -> AmortizeResult<()> {
        let finite_non_negative = |field: &str, value: f64| {
            if !value.is_finite() || value < 0. {
                Err(AmortizeError::invalid(field, "must not be negative"))
            } else {
                Ok(())
            }
        };
        if solve_for != SolveFor::Principal {
            finite_non_negative("principal", self.principal)?;
        }
        if solve_for != SolveFor::Contribution {
            finite_non_negative("contribution", self.contribution)?;
        }
        if solve_for != SolveFor::Rate {
            finite_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        }
        if solve_for != SolveFor::Term
            && (!self.years.is_finite() || self.years > MAX_GROWTH_YEARS as f64)
        {
            return Err(AmortizeError::invalid(
                "years",
                format!("must not exceed {} years", MAX_GROWTH_YEARS),
            ));
        }
        if solve_for != SolveFor::Term && self.num_periods() == 0 {
            return Err(AmortizeError::invalid("years", "must cover at least one period"));
        }
        if solve_for != SolveFor::Payment && (!self.target.is_finite() || self.target <= 0.) {
            return Err(AmortizeError::invalid("target", "must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Solution {
    Payment(f64),
    /// Nominal annual rate.
    Rate(ReturnRate),
    Principal(f64),
    Term { periods: f64, years: f64 },
    Contribution(f64),
}

pub fn solve(
    inputs: &TimeValueInputs,
    solve_for: SolveFor,
    config: &SolverConfig,
) -> AmortizeResult<Solution> {
    inputs.check(solve_for)?;

    let rate = inputs.periodic_rate();
    let n = inputs.num_periods();
    let periods_per_year = inputs.frequency.periods_per_year() as f64;

    match solve_for {
        SolveFor::Payment => compute_payment(inputs.principal, rate, n).map(Solution::Payment),
        SolveFor::Rate => {
            if inputs.principal == 0. && inputs.contribution == 0. {
                return Err(AmortizeError::invalid(
                    "principal",
                    "principal or contribution must be positive to solve for a rate",
                ));
            }
            let mut flows = Vec::with_capacity(n as usize + 2);
            flows.push((0., -inputs.principal));
            flows.extend((1..=n).map(|k| (k as f64, -inputs.contribution)));
            flows.push((n as f64, inputs.target));

            let periodic_config = SolverConfig {
                initial_guess: config.initial_guess / periods_per_year,
                ..*config
            };
            let periodic = solve_rate_newton(&flows, &periodic_config)?;
            Ok(Solution::Rate(ReturnRate {
                rate: periodic.rate * periods_per_year,
                ..periodic
            }))
        }
        SolveFor::Principal => Ok(Solution::Principal(required_principal(
            inputs.contribution,
            rate,
            n,
            inputs.target,
        ))),
        SolveFor::Term => {
            let periods = periods_to_target(
                inputs.principal,
                inputs.contribution,
                rate,
                inputs.target,
                inputs.frequency,
            )?;
            Ok(Solution::Term {
                periods,
                years: periods / periods_per_year,
            })
        }
        SolveFor::Contribution => {
            required_contribution(inputs.principal, rate, n, inputs.target).map(Solution::Contribution)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::future_value;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn savings() -> TimeValueInputs {
        TimeValueInputs {
            principal: 20000.,
            contribution: 1000.,
            annual_rate_percent: 0.,
            years: 10.,
            target: 200000.,
            frequency: Frequency::Annually,
        }
    }

    #[test]
    fn test_solve_for_rate() {
        let solution = solve(&savings(), SolveFor::Rate, &SolverConfig::default()).unwrap();
        let Solution::Rate(rate) = solution else {
            panic!("expected a rate, got {solution:?}");
        };

        assert_eq!(rate.precision, Precision::Exact);
        assert!(rate.iterations <= 10);
        let fv = future_value(20000., 1000., rate.rate, 10);
        assert!((fv - 200000.).abs() / 200000. < 0.0001);
        assert_abs_diff_eq!(rate.percent(), 23.769, epsilon = 0.01);
    }

    #[test]
    fn test_solve_for_monthly_rate() {
        let inputs = TimeValueInputs {
            principal: 10000.,
            contribution: 200.,
            target: 50000.,
            frequency: Frequency::Monthly,
            ..savings()
        };
        let solution = solve(&inputs, SolveFor::Rate, &SolverConfig::default()).unwrap();
        let Solution::Rate(rate) = solution else {
            panic!("expected a rate, got {solution:?}");
        };
        let fv = future_value(10000., 200., rate.rate / 12., 120);
        assert!((fv - 50000.).abs() / 50000. < 0.0001);
    }

    #[test]
    fn test_solve_for_principal_and_contribution() {
        let inputs = TimeValueInputs {
            annual_rate_percent: 6.,
            frequency: Frequency::Monthly,
            ..savings()
        };
        let r = inputs.periodic_rate();

        let solution = solve(&inputs, SolveFor::Principal, &SolverConfig::default()).unwrap();
        let Solution::Principal(principal) = solution else {
            panic!("expected a principal, got {solution:?}");
        };
        assert_relative_eq!(future_value(principal, 1000., r, 120), 200000., max_relative = 1e-9);

        let solution = solve(&inputs, SolveFor::Contribution, &SolverConfig::default()).unwrap();
        let Solution::Contribution(contribution) = solution else {
            panic!("expected a contribution, got {solution:?}");
        };
        assert_relative_eq!(
            future_value(20000., contribution, r, 120),
            200000.,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_requirements_clamp_to_zero() {
        assert_eq!(required_principal(5000., 0., 10, 1000.), 0.);
        assert_eq!(required_contribution(5000., 0.01, 10, 1000.).unwrap(), 0.);
        assert_eq!(required_contribution(0., 0., 10, 1000.).unwrap(), 100.);
        assert!(required_contribution(0., 0., 0, 1000.).is_err());
    }

    #[test]
    fn test_solve_for_term() {
        let doubling = TimeValueInputs {
            principal: 1000.,
            contribution: 0.,
            annual_rate_percent: 6.,
            target: 2000.,
            frequency: Frequency::Monthly,
            ..savings()
        };
        let solution = solve(&doubling, SolveFor::Term, &SolverConfig::default()).unwrap();
        let Solution::Term { periods, years } = solution else {
            panic!("expected a term, got {solution:?}");
        };
        assert_abs_diff_eq!(periods, 138.9757, epsilon = 1e-3);
        assert_abs_diff_eq!(years, periods / 12., epsilon = 1e-12);

        let saving = TimeValueInputs {
            principal: 0.,
            contribution: 500.,
            target: 100000.,
            ..doubling
        };
        let solution = solve(&saving, SolveFor::Term, &SolverConfig::default()).unwrap();
        let Solution::Term { periods, .. } = solution else {
            panic!("expected a term, got {solution:?}");
        };
        assert_eq!(periods, 139.);
    }

    #[test]
    fn test_unreachable_term() {
        let err = periods_to_target(1000., 0., 0., 2000., Frequency::Monthly).unwrap_err();
        assert!(matches!(err, AmortizeError::UnreachableTarget { .. }));

        let err = periods_to_target(0., 1., 0., 1e9, Frequency::Annually).unwrap_err();
        assert_eq!(
            err,
            AmortizeError::UnreachableTarget {
                what: "term".into(),
                best_estimate: 100.,
            }
        );
        assert_eq!(periods_to_target(5000., 10., 0.01, 1000., Frequency::Monthly).unwrap(), 0.);
    }

    #[test]
    fn test_solve_for_payment() {
        let loan = TimeValueInputs {
            principal: 250000.,
            annual_rate_percent: 6.5,
            years: 30.,
            frequency: Frequency::Monthly,
            ..savings()
        };
        let solution = solve(&loan, SolveFor::Payment, &SolverConfig::default()).unwrap();
        let Solution::Payment(pmt) = solution else {
            panic!("expected a payment, got {solution:?}");
        };
        assert_abs_diff_eq!(pmt, 1580.17, epsilon = 0.005);
    }

    #[test]
    fn test_invalid_inputs() {
        let config = SolverConfig::default();
        let negative = TimeValueInputs {
            principal: -1.,
            ..savings()
        };
        assert!(solve(&negative, SolveFor::Rate, &config).is_err());
        let nothing = TimeValueInputs {
            principal: 0.,
            contribution: 0.,
            ..savings()
        };
        assert!(solve(&nothing, SolveFor::Rate, &config).is_err());
        let no_target = TimeValueInputs {
            target: 0.,
            ..savings()
        };
        assert!(solve(&no_target, SolveFor::Term, &config).is_err());
    }

    #[test]
    fn test_years_beyond_growth_horizon() {
        let config = SolverConfig::default();
        for years in [1e9, 1e5, 100.5, f64::INFINITY, f64::NAN] {
            let inputs = TimeValueInputs {
                years,
                frequency: Frequency::Monthly,
                ..savings()
            };
            for solve_for in [
                SolveFor::Payment,
                SolveFor::Rate,
                SolveFor::Principal,
                SolveFor::Contribution,
            ] {
                assert!(matches!(
                    solve(&inputs, solve_for, &config),
                    Err(AmortizeError::InvalidInput { .. })
                ));
            }
        }
        let century = TimeValueInputs {
            years: 100.,
            annual_rate_percent: 5.,
            ..savings()
        };
        assert!(solve(&century, SolveFor::Contribution, &config).is_ok());
    }

    #[test]
    fn test_xirr() {
        let events = [
            CashFlowEvent::new(date(2020, 7, 1), 2000., FlowKind::Deposit),
            CashFlowEvent::new(date(2020, 1, 1), 10000., FlowKind::Starting),
            CashFlowEvent::new(date(2021, 3, 15), 1000., FlowKind::Withdrawal),
            CashFlowEvent::new(date(2022, 1, 1), 13500., FlowKind::Ending),
        ];
        let result = xirr(&events, &SolverConfig::default()).unwrap();

        assert!(!result.is_approximate());
        assert_abs_diff_eq!(result.rate, 0.10693, epsilon = 1e-4);
    }

    #[test]
    fn test_xirr_single_year() {
        let events = [
            CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting),
            CashFlowEvent::new(date(2021, 1, 1), 1100., FlowKind::Ending),
        ];
        let result = xirr(&events, &SolverConfig::default()).unwrap();
        // 366 days is slightly more than a year of 365.25
        assert_abs_diff_eq!(result.rate, 0.09979, epsilon = 1e-4);
    }

    #[test]
    fn test_xirr_falls_back_to_simple_return() {
        // nothing comes back out, so no rate zeroes the NPV
        let events = [
            CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting),
            CashFlowEvent::new(date(2020, 7, 1), 500., FlowKind::Deposit),
            CashFlowEvent::new(date(2021, 1, 1), 0., FlowKind::Ending),
        ];
        let result = xirr(&events, &SolverConfig::default()).unwrap();

        assert!(result.is_approximate());
        let years = 366. / DAYS_PER_YEAR;
        assert_abs_diff_eq!(result.rate, -1500. / 500. / years, epsilon = 1e-9);
    }

    #[test]
    fn test_xirr_reports_steps_taken_before_fallback() {
        // a zero ending value leaves the NPV flat, so Newton stops at once
        let flat = [
            CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting),
            CashFlowEvent::new(date(2021, 1, 1), 0., FlowKind::Ending),
        ];
        let result = xirr(&flat, &SolverConfig::default()).unwrap();
        assert!(result.is_approximate());
        assert_eq!(result.iterations, 0);
        assert_abs_diff_eq!(result.rate, -1000. / 500. / (366. / DAYS_PER_YEAR), epsilon = 1e-9);

        let no_inflows = [
            CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting),
            CashFlowEvent::new(date(2020, 7, 1), 500., FlowKind::Deposit),
            CashFlowEvent::new(date(2021, 1, 1), 0., FlowKind::Ending),
        ];
        let result = xirr(&no_inflows, &SolverConfig::default()).unwrap();
        assert!(result.is_approximate());
        assert!(result.iterations < SolverConfig::default().max_iterations);
    }

    #[test]
    fn test_xirr_rejects_degenerate_input() {
        let config = SolverConfig::default();
        let one = [CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting)];
        assert!(xirr(&one, &config).is_err());

        let same_day = [
            CashFlowEvent::new(date(2020, 1, 1), 1000., FlowKind::Starting),
            CashFlowEvent::new(date(2020, 1, 1), 1100., FlowKind::Ending),
        ];
        assert!(xirr(&same_day, &config).is_err());
    }

    #[test]
    fn test_simple_annualized_return() {
        let rate = simple_annualized_return(10000., 12000., 1000., 11000., 2.).unwrap();
        assert_abs_diff_eq!(rate, 1000. / 11000. / 2., epsilon = 1e-12);
        assert!(simple_annualized_return(0., 0., 0., 0., 1.).is_err());
    }

    #[test]
    fn test_newton_reports_unreachable() {
        let all_inflows = [(0., 1000.), (1., 1100.)];
        let err = solve_rate_newton(&all_inflows, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, AmortizeError::UnreachableTarget { .. }));
        assert!(solve_rate_newton(&[(0., 1.)], &SolverConfig::default()).is_err());
    }

    #[test]
    fn test_signed_amounts() {
        let d = date(2024, 1, 1);
        assert_eq!(CashFlowEvent::new(d, 100., FlowKind::Starting).signed_amount(), -100.);
        assert_eq!(CashFlowEvent::new(d, -100., FlowKind::Deposit).signed_amount(), -100.);
        assert_eq!(CashFlowEvent::new(d, 100., FlowKind::Withdrawal).signed_amount(), 100.);
        assert_eq!(CashFlowEvent::new(d, 100., FlowKind::Ending).signed_amount(), 100.);
    }
}
