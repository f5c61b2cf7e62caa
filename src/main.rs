use amortize::frequency::PaymentCalendar;
use amortize::phased::compare_prepayment;
use amortize::{AmortizeError, AmortizeResult, Frequency, Loan, LoanTerms};
use chrono::NaiveDate;
use log::{error, info};
use simple_logger::SimpleLogger;

fn main() {
    // RUST_LOG overrides the default level
    if let Err(e) = SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("logger already initialized: {}", e);
    }

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> AmortizeResult<()> {
    let first_pmt_date =
        NaiveDate::from_ymd_opt(2024, 4, 1).ok_or_else(|| AmortizeError::InvalidInput {
            field: "first_pmt_date".into(),
            reason: "not a calendar date".into(),
        })?;
    let terms = LoanTerms::new(250000.0, 6.5, 30., Frequency::Monthly);

    let loan = Loan::new(terms, first_pmt_date)?;
    loan.show_amortization();

    for year in loan.annual_rollup() {
        info!(
            "year {}: paid ${:.2}, principal ${:.2}, interest ${:.2}, balance ${:.2}",
            year.year, year.total_payment, year.total_principal, year.total_interest, year.ending_balance
        );
    }

    let summary = loan.summary(0.)?;
    info!(
        "{} payments of ${:.2}, total interest ${:.2}, paid off {}",
        summary.number_of_payments,
        loan.payment(),
        summary.total_interest,
        summary.payoff_date
    );

    let calendar = PaymentCalendar::new(first_pmt_date, Frequency::Monthly);
    let comparison = compare_prepayment(&terms, 200., &calendar)?;
    info!(
        "with $200 extra each month: {} fewer payments, ${:.2} less interest",
        comparison.periods_saved, comparison.interest_savings
    );
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<amortize::PaymentPeriod>();
    is_normal::<amortize::Summary>();
    is_normal::<amortize::phased::DrawRepaySchedule>();
    is_normal::<amortize::solve::CashFlowEvent>();
}
