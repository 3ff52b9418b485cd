// [libs/core/policy/src/lib.rs]
/*!
 * =================================================================
 * APARATO: POLICY ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: Cascada de politicas, fusion mas restrictiva
 *
 * Pure functions over a `Vec<Policy>` already fetched by the caller (one
 * query, no N+1 — the fetch itself is the repository's job, not this
 * crate's). Merge order never matters: every field is either an
 * intersection or a minimum, both commutative and associative.
 * =================================================================
 */

use std::collections::HashSet;
use thiserror::Error;
use tollgate_domain_models::Policy;

/// The merged, most-restrictive policy for a request. `None` in any field
/// means "no active policy constrained this field" (open).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePolicy {
    pub allowed_models: Option<HashSet<String>>,
    pub max_input_tokens: Option<i64>,
    pub max_output_tokens: Option<i64>,
    pub rpm_limit: Option<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("model '{model}' is not in the allowed list for this agent")]
    ModelNotAllowed { model: String },
}

/// Merge every active policy into one `EffectivePolicy`.
///
/// - `allowed_models`: intersection across all non-null contributions. A
///   policy with `None` contributes nothing (open). Intersecting to the
///   empty set is a legal outcome — it blocks every model.
/// - `max_input_tokens` / `max_output_tokens` / `rpm_limit`: minimum of the
///   non-null contributions.
pub fn merge_policies(policies: &[Policy]) -> EffectivePolicy {
    let mut merged = EffectivePolicy::default();

    for policy in policies.iter().filter(|p| p.is_active) {
        if let Some(models) = &policy.allowed_models {
            let incoming: HashSet<String> = models.iter().cloned().collect();
            merged.allowed_models = Some(match merged.allowed_models.take() {
                None => incoming,
                Some(existing) => existing.intersection(&incoming).cloned().collect(),
            });
        }

        merge_min(&mut merged.max_input_tokens, policy.max_input_tokens);
        merge_min(&mut merged.max_output_tokens, policy.max_output_tokens);
        merge_min(&mut merged.rpm_limit, policy.rpm_limit);
    }

    merged
}

fn merge_min(slot: &mut Option<i64>, incoming: Option<i64>) {
    if let Some(value) = incoming {
        *slot = Some(slot.map_or(value, |current| current.min(value)));
    }
}

/// Validate the request against the effective policy and compute the
/// effective max-output-tokens to hand the provider.
///
/// `max_input_tokens` and `rpm_limit` are carried on `EffectivePolicy` but
/// not enforced here — they are reserved for a future pre-flight input
/// counter and rate limiter (spec.md §4.3 note).
pub fn enforce(
    effective: &EffectivePolicy,
    requested_model: &str,
    requested_max_output: Option<i64>,
) -> Result<Option<i64>, PolicyError> {
    if let Some(allowed) = &effective.allowed_models {
        if !allowed.contains(requested_model) {
            return Err(PolicyError::ModelNotAllowed {
                model: requested_model.to_string(),
            });
        }
    }

    let effective_max = match (requested_max_output, effective.max_output_tokens) {
        (Some(requested), Some(policy_max)) => Some(requested.min(policy_max)),
        (Some(requested), None) => Some(requested),
        (None, Some(policy_max)) => Some(policy_max),
        (None, None) => None,
    };

    Ok(effective_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tollgate_domain_models::Target;
    use uuid::Uuid;

    fn policy(target: Target, allowed: Option<&[&str]>, max_output: Option<i64>) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            name: "test".into(),
            target,
            allowed_models: allowed.map(|m| m.iter().map(|s| s.to_string()).collect()),
            max_input_tokens: None,
            max_output_tokens: max_output,
            rpm_limit: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn scenario_policy_merge() {
        // spec.md §8 scenario 5.
        let org_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let org_policy = policy(Target::Org(org_id), Some(&["A", "B", "C"]), Some(500));
        let agent_policy = policy(Target::Agent(agent_id), Some(&["B", "C", "D"]), Some(300));

        let effective = merge_policies(&[org_policy, agent_policy]);
        let mut expected: HashSet<String> = HashSet::new();
        expected.insert("B".into());
        expected.insert("C".into());
        assert_eq!(effective.allowed_models, Some(expected));
        assert_eq!(effective.max_output_tokens, Some(300));

        assert_eq!(
            enforce(&effective, "A", None),
            Err(PolicyError::ModelNotAllowed { model: "A".into() })
        );
        assert_eq!(enforce(&effective, "B", Some(1000)), Ok(Some(300)));
    }

    #[test]
    fn open_field_contributes_nothing() {
        let p = policy(Target::Org(Uuid::new_v4()), None, None);
        let effective = merge_policies(&[p]);
        assert_eq!(effective.allowed_models, None);
        assert_eq!(enforce(&effective, "anything", None), Ok(None));
    }

    #[test]
    fn empty_intersection_blocks_every_model() {
        let a = policy(Target::Org(Uuid::new_v4()), Some(&["A"]), None);
        let b = policy(Target::Agent(Uuid::new_v4()), Some(&["B"]), None);
        let effective = merge_policies(&[a, b]);
        assert_eq!(effective.allowed_models, Some(HashSet::new()));
        assert!(enforce(&effective, "A", None).is_err());
    }

    #[test]
    fn inactive_policy_is_ignored() {
        let mut p = policy(Target::Org(Uuid::new_v4()), Some(&["A"]), Some(10));
        p.is_active = false;
        let effective = merge_policies(&[p]);
        assert_eq!(effective.allowed_models, None);
        assert_eq!(effective.max_output_tokens, None);
    }

    // P-MONOTONE: adding a more-restrictive policy never loosens the merge.
    proptest::proptest! {
        #[test]
        fn prop_monotone_max_output(a in 1i64..10_000, b in 1i64..10_000) {
            let p1 = policy(Target::Org(Uuid::new_v4()), None, Some(a));
            let p2 = policy(Target::Agent(Uuid::new_v4()), None, Some(b));
            let merged_one = merge_policies(&[p1.clone()]);
            let merged_both = merge_policies(&[p1, p2]);
            let one = merged_one.max_output_tokens.unwrap();
            let both = merged_both.max_output_tokens.unwrap();
            proptest::prop_assert!(both <= one);
        }
    }
}
