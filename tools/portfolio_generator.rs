//! Sample Portfolio Generator
//!
//! Writes synthetic loan and customer JSON files for trying the risk engine.

use anyhow::Context;
use chrono::{Duration, Utc};
use portfolio_risk_engine::types::{Customer, FraudReport, Loan};
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::info;

const LENDERS: [&str; 6] = [
    "First National Bank",
    "City Credit Union",
    "Summit Lending",
    "Harbor Finance",
    "Oak Mortgage",
    "Pioneer Auto Finance",
];

const LOAN_NAMES: [&str; 5] = ["Mortgage", "Car Loan", "Student Loan", "Personal Loan", "Credit Line"];

/// Loan and customer generator
struct PortfolioGenerator {
    rng: rand::rngs::ThreadRng,
    loan_counter: u64,
    customer_counter: u64,
}

impl PortfolioGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            loan_counter: 0,
            customer_counter: 0,
        }
    }

    fn next_loan_id(&mut self) -> String {
        self.loan_counter += 1;
        format!("loan_{:06}", self.loan_counter)
    }

    /// A loan with its own contact details and a known lender
    fn generate_legitimate(&mut self) -> Loan {
        let id = self.next_loan_id();
        let total: f64 = self.rng.gen_range(1_000.0..40_000.0);
        let remaining = total * self.rng.gen_range(0.05..0.9);
        let name = self.random_choice(&LOAN_NAMES);
        let provider = self.random_choice(&LENDERS);

        Loan::new(id, name, provider, total, remaining)
            .with_email(format!("user{}@mail.example", self.loan_counter))
            .with_phone(format!("555-{:04}", self.loan_counter % 10_000))
    }

    /// A ring of loans sharing contact details, lenders nobody has heard of,
    /// and balances that are barely paid down
    fn generate_ring(&mut self, size: usize) -> Vec<Loan> {
        let ring_email = format!("ring{:04x}@tempmail.example", self.rng.gen::<u16>());
        let ring_phone = format!("555-9{:03}", self.rng.gen_range(0..1000));
        let now = Utc::now();

        (0..size)
            .map(|i| {
                let id = self.next_loan_id();
                let total: f64 = self.rng.gen_range(45_000.0..120_000.0);
                let remaining = total * self.rng.gen_range(0.96..1.0);
                let provider = format!("Unknown Lender {}", self.rng.gen_range(1..4));

                let mut loan = Loan::new(id, "Personal Loan", provider, total, remaining);
                // Alternate the shared detail so the ring is chained, not complete
                loan = if i % 2 == 0 {
                    loan.with_email(ring_email.clone())
                } else {
                    loan.with_phone(ring_phone.clone())
                };
                if i == 0 {
                    loan.flag_fraud(FraudReport::user_filed(
                        "Identity theft",
                        "Loan opened without my knowledge",
                        None,
                        now,
                    ));
                }
                loan
            })
            .collect()
    }

    fn generate_customer(&mut self) -> Customer {
        self.customer_counter += 1;
        let now = Utc::now();

        let joined_days = self.rng.gen_range(10..900);
        let inactive_days = self.rng.gen_range(0..joined_days.min(200));
        let spending = if self.rng.gen_bool(0.2) {
            self.rng.gen_range(1_000.0..8_000.0)
        } else {
            self.rng.gen_range(0.0..1_000.0)
        };

        let mut customer = Customer::new(format!("cust_{:06}", self.customer_counter), spending)
            .joined(now - Duration::days(joined_days))
            .active(now - Duration::days(inactive_days));
        customer.email = Some(format!("customer{}@mail.example", self.customer_counter));
        customer.is_premium = spending > 2_000.0;
        customer
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn write_json<T: serde::Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio_generator=info".parse()?),
        )
        .init();

    info!("Starting Sample Portfolio Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let out_dir = args.get(1).map(|s| s.as_str()).unwrap_or("data");
    let loan_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(50);
    let fraud_rate: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let customer_count: usize = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(200);

    info!(
        out_dir = %out_dir,
        loan_count = loan_count,
        fraud_rate = fraud_rate,
        customer_count = customer_count,
        "Configuration loaded"
    );

    let mut generator = PortfolioGenerator::new();
    let mut rng = rand::thread_rng();

    let mut loans = Vec::with_capacity(loan_count);
    let mut rings = 0;
    while loans.len() < loan_count {
        if rng.gen_bool(fraud_rate.clamp(0.0, 1.0)) {
            let size = rng.gen_range(3..6).min(loan_count - loans.len());
            loans.extend(generator.generate_ring(size));
            rings += 1;
        } else {
            loans.push(generator.generate_legitimate());
        }
    }

    let customers: Vec<Customer> = (0..customer_count)
        .map(|_| generator.generate_customer())
        .collect();

    let out_dir = Path::new(out_dir);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    write_json(&out_dir.join("loans.json"), &loans)?;
    write_json(&out_dir.join("customers.json"), &customers)?;

    info!(
        "Completed! Wrote {} loans ({} fraud rings) and {} customers to {}",
        loans.len(),
        rings,
        customers.len(),
        out_dir.display()
    );

    Ok(())
}
