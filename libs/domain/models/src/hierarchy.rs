// [libs/domain/models/src/hierarchy.rs]
//! `Organization ▷ Workspace ▷ AgentGroup ▷ Agent` — the resolved identity
//! path a gateway request walks before it ever reaches policy or budget
//! checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// The single ledger-bearing group this org's credits live in.
    pub billing_group_id: Uuid,
    pub owner_user_id: Uuid,
    /// Immutable once set; defaults to 100 at org creation (external to the core).
    pub credits_per_usd: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentGroup {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Active,
    Disabled,
    BudgetExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub agent_group_id: Uuid,
    pub name: String,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

/// The four-hop identity path resolved once per gateway request and carried
/// on the request context for its duration (spec.md §9: "a port may cache
/// the four-hop path on the request context").
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub agent: Agent,
    pub agent_group: AgentGroup,
    pub workspace: Workspace,
    pub organization: Organization,
}

impl ResolvedIdentity {
    pub fn org_id(&self) -> Uuid {
        self.organization.id
    }

    pub fn workspace_id(&self) -> Uuid {
        self.workspace.id
    }

    pub fn agent_group_id(&self) -> Uuid {
        self.agent_group.id
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent.id
    }
}
