//! Debt Planner CLI
//!
//! Command-line interface for building and comparing repayment plans

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use debt_planner::debt::load_debts;
use debt_planner::plan::{Plan, PlanConfig, Strategy, DEFAULT_MAX_MONTHS};
use debt_planner::scenario::{budget_range, ScenarioRunner};
use debt_planner::{DebtRecord, RateConvention};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "debt_planner", version, about = "Debt repayment planner")]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build one repayment plan
    Plan {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        budget: f64,
        #[arg(long, default_value = "avalanche")]
        strategy: Strategy,
        /// Write the schedule as CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Months of the schedule to print
        #[arg(long, default_value_t = 24)]
        show: usize,
    },
    /// Plan with both strategies and compare
    Compare {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        budget: f64,
    },
    /// Plan across a range of budgets
    Sweep {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 100.0)]
        step: f64,
        #[arg(long, default_value = "avalanche")]
        strategy: Strategy,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Debts file (.csv or .json)
    #[arg(long)]
    debts: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_MONTHS)]
    max_months: u32,
    #[arg(long, value_enum, default_value_t = RateArg::Percent)]
    rates: RateArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RateArg {
    Percent,
    Fraction,
    Auto,
}

impl From<RateArg> for RateConvention {
    fn from(arg: RateArg) -> Self {
        match arg {
            RateArg::Percent => RateConvention::Percent,
            RateArg::Fraction => RateConvention::Fraction,
            RateArg::Auto => RateConvention::Auto,
        }
    }
}

impl InputArgs {
    fn load(&self) -> Result<(Vec<DebtRecord>, ScenarioRunner)> {
        let debts = load_debts(&self.debts)?;
        let runner = ScenarioRunner::with_config(PlanConfig {
            max_months: self.max_months,
            rate_convention: self.rates.into(),
        });
        Ok((debts, runner))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan {
            input,
            budget,
            strategy,
            output,
            show,
        } => {
            let (debts, runner) = input.load()?;
            let plan = runner.run(&debts, budget, strategy)?;

            if let Some(path) = output {
                let file = File::create(&path)
                    .with_context(|| format!("unable to create {}", path.display()))?;
                plan.write_csv(file)?;
                if !cli.json {
                    println!("Full schedule written to: {}", path.display());
                }
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan, show);
            }
        }
        Commands::Compare { input, budget } => {
            let (debts, runner) = input.load()?;
            let comparison = runner.compare(&debts, budget)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("{:<10} {:>7} {:>14} {:>14}", "Strategy", "Months", "Interest", "Total Paid");
                println!("{}", "-".repeat(48));
                for strategy in Strategy::ALL {
                    let plan = comparison.plan(strategy);
                    if let Some(shortfall) = &plan.feasibility_error {
                        println!("{:<10} infeasible, short {:.2}", strategy, shortfall.shortfall);
                        continue;
                    }
                    let summary = plan.summary();
                    println!(
                        "{:<10} {:>7} {:>14.2} {:>14.2}",
                        strategy, summary.months_to_payoff, summary.total_interest_paid, summary.total_paid
                    );
                }
                println!(
                    "\n{} is cheaper; avalanche saves {:.2} in interest",
                    comparison.cheaper(),
                    comparison.interest_saved()
                );
            }
        }
        Commands::Sweep {
            input,
            from,
            to,
            step,
            strategy,
        } => {
            let (debts, runner) = input.load()?;
            let budgets = budget_range(from, to, step);
            let points = runner.budget_sweep(&debts, &budgets, strategy);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&points)?);
            } else {
                println!("{:>12} {:>7} {:>14}", "Budget", "Months", "Interest");
                println!("{}", "-".repeat(35));
                for point in &points {
                    match (point.months_to_payoff, point.total_interest_paid, &point.error) {
                        (Some(months), Some(interest), _) => {
                            println!("{:>12.2} {:>7} {:>14.2}", point.monthly_budget, months, interest)
                        }
                        (_, _, error) => println!(
                            "{:>12.2} {}",
                            point.monthly_budget,
                            error.as_deref().unwrap_or("no result")
                        ),
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_plan(plan: &Plan, show: usize) {
    println!("Debt Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("==================\n");
    println!("Strategy: {}", plan.strategy);
    println!("Monthly budget: ${:.2}", plan.monthly_budget);

    if let Some(shortfall) = &plan.feasibility_error {
        println!(
            "\nBudget cannot cover minimum payments: need ${:.2}, short by ${:.2}",
            shortfall.required, shortfall.shortfall
        );
        return;
    }

    println!();
    println!("{:>5} {:>12} {:>10} {:>14} {:>10}", "Month", "Paid", "Interest", "Remaining", "Unused");
    println!("{}", "-".repeat(55));

    for record in plan.schedule.iter().take(show) {
        println!(
            "{:>5} {:>12.2} {:>10.2} {:>14.2} {:>10.2}",
            record.month, record.total_payment, record.total_interest, record.remaining_total, record.unallocated
        );
    }

    if plan.schedule.len() > show {
        println!("... ({} more months)", plan.schedule.len() - show);
    }

    let summary = plan.summary();
    println!("\nSummary:");
    println!("  Months to payoff: {}", summary.months_to_payoff);
    println!("  Total paid: ${:.2}", summary.total_paid);
    println!("  Total interest: ${:.2}", summary.total_interest_paid);

    if !summary.payoff_order.is_empty() {
        println!("\nPayoff order:");
        for event in &summary.payoff_order {
            println!("  Month {:>3}: {}", event.month, event.debt_id);
        }
    }
}
