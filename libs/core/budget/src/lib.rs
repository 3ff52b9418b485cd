// [libs/core/budget/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BUDGET ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: ventanas de periodo, rollup transitivo, auto-disable
 *
 * Period-window math is pure. Summing actual usage against a window is
 * not — it requires a hierarchy-aware query — so that half of the
 * pipeline is expressed as the `BudgetUsageSource` trait and supplied by
 * `tollgate-infra-db`. Every budget active anywhere on the request's
 * Org -> Workspace -> AgentGroup -> Agent path is checked independently
 * (property B-TRANSITIVE): a tight budget three levels up still blocks a
 * request even if every budget closer to the agent has headroom.
 * =================================================================
 */

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;
use tollgate_domain_models::{Budget, BudgetPeriod, Target};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("budget '{budget_id}' exceeded: {consumed} + {estimated} > {limit} credits")]
    Exceeded {
        budget_id: uuid::Uuid,
        consumed: i64,
        estimated: i64,
        limit: i64,
    },
}

/// The first instant of the window a budget's period covers, as of `now`.
/// `Total` has no window — it accumulates forever, so there is no start.
pub fn period_start(period: BudgetPeriod, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match period {
        BudgetPeriod::Daily => Some(
            Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                .single()
                .expect("valid calendar date"),
        ),
        BudgetPeriod::Monthly => Some(
            Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
                .single()
                .expect("valid calendar date"),
        ),
        BudgetPeriod::Total => None,
    }
}

use chrono::Datelike;

/// Pure comparison: does `consumed + estimated` exceed `budget.limit_credits`?
pub fn evaluate(budget: &Budget, consumed_credits: i64, estimated_credits: i64) -> Result<(), BudgetError> {
    let projected = consumed_credits + estimated_credits;
    if projected > budget.limit_credits {
        return Err(BudgetError::Exceeded {
            budget_id: budget.id,
            consumed: consumed_credits,
            estimated: estimated_credits,
            limit: budget.limit_credits,
        });
    }
    Ok(())
}

/// Supplies the hierarchy- and period-aware facts the pure engine can't
/// compute on its own. `tollgate-infra-db` is the production implementation;
/// tests supply an in-memory fake.
#[async_trait]
pub trait BudgetUsageSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every active budget attached anywhere on `path`.
    async fn active_budgets(&self, path: &[Target]) -> Result<Vec<Budget>, Self::Error>;

    /// Credits already consumed by `budget.target` since `since` (or all
    /// time if `since` is `None`), summed transitively up from every
    /// descendant that rolls up into that target.
    async fn consumed_credits(
        &self,
        target: Target,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, Self::Error>;

    /// Flip the target (and, per spec, only that target — no cascade) to
    /// a disabled/budget-exhausted state.
    async fn auto_disable(&self, target: Target) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum CheckBudgetsError<E: std::error::Error + Send + Sync + 'static> {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Source(E),
}

/// Check every active budget on `path` against `estimated_credits`. The
/// first violation wins: on an exceeded budget with `auto_disable` set,
/// the target is disabled (a separate write, not part of this check's
/// transaction — spec.md §9 Open Question) before the error is returned.
pub async fn check_budgets<S: BudgetUsageSource>(
    source: &S,
    path: &[Target],
    estimated_credits: i64,
    now: DateTime<Utc>,
) -> Result<(), CheckBudgetsError<S::Error>> {
    let budgets = source
        .active_budgets(path)
        .await
        .map_err(CheckBudgetsError::Source)?;

    for budget in budgets.iter().filter(|b| b.is_active) {
        let since = period_start(budget.period, now);
        let consumed = source
            .consumed_credits(budget.target, since)
            .await
            .map_err(CheckBudgetsError::Source)?;

        if let Err(e) = evaluate(budget, consumed, estimated_credits) {
            if budget.auto_disable {
                source
                    .auto_disable(budget.target)
                    .await
                    .map_err(CheckBudgetsError::Source)?;
            }
            return Err(e.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;

    fn budget(target: Target, period: BudgetPeriod, limit: i64, auto_disable: bool) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            target,
            period,
            limit_credits: limit,
            auto_disable,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn daily_window_is_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2026, 7, 27, 15, 30, 0).unwrap();
        let start = period_start(BudgetPeriod::Daily, now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).unwrap());
    }

    #[test]
    fn monthly_window_is_first_of_month() {
        let now = Utc.with_ymd_and_hms(2026, 7, 27, 15, 30, 0).unwrap();
        let start = period_start(BudgetPeriod::Monthly, now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn total_window_has_no_start() {
        assert_eq!(period_start(BudgetPeriod::Total, Utc::now()), None);
    }

    #[test]
    fn evaluate_blocks_on_overage() {
        let b = budget(Target::Org(Uuid::new_v4()), BudgetPeriod::Daily, 1000, false);
        assert!(evaluate(&b, 900, 50).is_ok());
        assert!(evaluate(&b, 900, 200).is_err());
    }

    struct FakeSource {
        budgets: Vec<Budget>,
        consumed: i64,
        disabled: Mutex<Vec<Target>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake source error")]
    struct FakeError;

    #[async_trait]
    impl BudgetUsageSource for FakeSource {
        type Error = FakeError;

        async fn active_budgets(&self, _path: &[Target]) -> Result<Vec<Budget>, Self::Error> {
            Ok(self.budgets.clone())
        }

        async fn consumed_credits(
            &self,
            _target: Target,
            _since: Option<DateTime<Utc>>,
        ) -> Result<i64, Self::Error> {
            Ok(self.consumed)
        }

        async fn auto_disable(&self, target: Target) -> Result<(), Self::Error> {
            self.disabled.lock().unwrap().push(target);
            Ok(())
        }
    }

    #[tokio::test]
    async fn exceeded_budget_with_auto_disable_triggers_separate_write() {
        let org = Target::Org(Uuid::new_v4());
        let source = FakeSource {
            budgets: vec![budget(org, BudgetPeriod::Daily, 1000, true)],
            consumed: 950,
            disabled: Mutex::new(Vec::new()),
        };

        let result = check_budgets(&source, &[org], 100, Utc::now()).await;
        assert!(result.is_err());
        assert_eq!(source.disabled.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn headroom_allows_request_without_disabling() {
        let org = Target::Org(Uuid::new_v4());
        let source = FakeSource {
            budgets: vec![budget(org, BudgetPeriod::Daily, 1000, true)],
            consumed: 100,
            disabled: Mutex::new(Vec::new()),
        };

        let result = check_budgets(&source, &[org], 100, Utc::now()).await;
        assert!(result.is_ok());
        assert!(source.disabled.lock().unwrap().is_empty());
    }

    // B-TRANSITIVE: a tight budget at any level on the path blocks the request,
    // regardless of how much headroom the other levels have.
    #[tokio::test]
    async fn transitive_block_from_any_level() {
        let org = Target::Org(Uuid::new_v4());
        let agent = Target::Agent(Uuid::new_v4());
        let source = FakeSource {
            budgets: vec![
                budget(org, BudgetPeriod::Daily, 1_000_000, false),
                budget(agent, BudgetPeriod::Daily, 100, false),
            ],
            consumed: 90,
            disabled: Mutex::new(Vec::new()),
        };

        let result = check_budgets(&source, &[org, agent], 50, Utc::now()).await;
        assert!(result.is_err());
    }
}
