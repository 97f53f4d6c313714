use snrr_primitives::{decode_snode_list, Snode};

/// What a single status-code evaluation means for the caller. The
/// [`FailureAccountant`](crate::FailureAccountant) applies the counter and
/// clock-offset side effects named here; the RPC driver (`snrr-rpc`) and
/// dispatcher use the variant itself to decide retry/drop behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountantOutcome {
    /// 200-299: failure counter reset; clock offset and fork counters
    /// updated if the body carried `t`/`hf`.
    Success {
        clock_offset_ms: Option<i64>,
        fork_update: Option<(i64, i64)>,
    },
    /// 406: non-retryable, surfaced to the caller as-is.
    ClockOutOfSync,
    /// 421 with a non-empty `snodes` array: the account's swarm is replaced.
    SwarmReplaced { snodes: Vec<Snode> },
    /// 421 with no usable `snodes` array: the account's swarm is invalidated.
    SwarmInvalidated,
    /// 404/500/502/503/other: retryable, failure counter incremented.
    Retryable,
}

/// Evaluate the status-code rule table (spec §4.8) against a single
/// response. Counter/clock-offset side effects are applied by the caller;
/// this function is a pure mapping from `(status, body)` to an outcome so
/// it can be tested without a [`crate::FailureAccountant`] instance.
pub fn apply_status(status: u16, body: Option<&serde_json::Value>, local_now_ms: i64) -> AccountantOutcome {
    match status {
        200..=299 => {
            let clock_offset_ms = body
                .and_then(|b| b.get("t"))
                .and_then(serde_json::Value::as_i64)
                .map(|server_t| server_t - local_now_ms);
            let fork_update = body
                .and_then(|b| b.get("hf"))
                .and_then(serde_json::Value::as_array)
                .and_then(|hf| {
                    let hard = hf.first()?.as_i64()?;
                    let soft = hf.get(1)?.as_i64()?;
                    Some((hard, soft))
                });
            AccountantOutcome::Success { clock_offset_ms, fork_update }
        }
        406 => AccountantOutcome::ClockOutOfSync,
        421 => match body.and_then(|b| b.get("snodes")) {
            Some(value) => {
                let snodes = decode_snode_list(value);
                if snodes.is_empty() {
                    AccountantOutcome::SwarmInvalidated
                } else {
                    AccountantOutcome::SwarmReplaced { snodes }
                }
            }
            None => AccountantOutcome::SwarmInvalidated,
        },
        _ => AccountantOutcome::Retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_with_t_computes_offset() {
        let body = json!({"t": 1_700_000_000_000i64});
        let outcome = apply_status(200, Some(&body), 1_699_999_999_000);
        assert_eq!(
            outcome,
            AccountantOutcome::Success { clock_offset_ms: Some(1000), fork_update: None }
        );
    }

    #[test]
    fn success_with_hf_extracts_fork_pair() {
        let body = json!({"hf": [20, 1]});
        let outcome = apply_status(200, Some(&body), 0);
        assert_eq!(
            outcome,
            AccountantOutcome::Success { clock_offset_ms: None, fork_update: Some((20, 1)) }
        );
    }

    #[test]
    fn status_406_is_clock_out_of_sync() {
        assert_eq!(apply_status(406, None, 0), AccountantOutcome::ClockOutOfSync);
    }

    #[test]
    fn status_421_with_empty_snodes_invalidates() {
        let body = json!({"snodes": []});
        assert_eq!(apply_status(421, Some(&body), 0), AccountantOutcome::SwarmInvalidated);
    }

    #[test]
    fn retryable_statuses_map_to_retryable() {
        for status in [404, 500, 502, 503, 599] {
            assert_eq!(apply_status(status, None, 0), AccountantOutcome::Retryable);
        }
    }
}
