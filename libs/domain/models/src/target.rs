// [libs/domain/models/src/target.rs]
//! Cascaded scope selector shared by `Policy` and `Budget`.
//!
//! Both row kinds select their scope via exactly one non-null FK of four
//! (Invariant P1 / B1). Storage keeps that as four nullable columns plus a
//! CHECK constraint; in memory we collapse it to a tagged variant so the
//! merge/enforce and budget-window code never has to juggle four `Option`s.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Org(Uuid),
    Workspace(Uuid),
    AgentGroup(Uuid),
    Agent(Uuid),
}

impl Target {
    /// Human-readable level name, used in `BudgetExceeded` error messages.
    pub fn level_name(&self) -> &'static str {
        match self {
            Target::Org(_) => "organization",
            Target::Workspace(_) => "workspace",
            Target::AgentGroup(_) => "agent_group",
            Target::Agent(_) => "agent",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Target::Org(id)
            | Target::Workspace(id)
            | Target::AgentGroup(id)
            | Target::Agent(id) => *id,
        }
    }

    /// True if `self` matches any of the four hierarchy ids belonging to a
    /// single request's resolved path (org, workspace, agent_group, agent).
    pub fn matches_path(&self, org: Uuid, workspace: Uuid, agent_group: Uuid, agent: Uuid) -> bool {
        match self {
            Target::Org(id) => *id == org,
            Target::Workspace(id) => *id == workspace,
            Target::AgentGroup(id) => *id == agent_group,
            Target::Agent(id) => *id == agent,
        }
    }
}
