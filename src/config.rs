use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LoanPolicy {
    /// Days between approval and due date.
    pub period_days: i64,
    /// Overdue fine per day, in whole currency units.
    pub fine_per_day: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub loan: LoanPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://polylib.db".into());
        let loan = LoanPolicy {
            period_days: std::env::var("LOAN_PERIOD_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(14),
            fine_per_day: std::env::var("LOAN_FINE_PER_DAY")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(50),
        };
        Ok(Self { database_url, loan })
    }
}
