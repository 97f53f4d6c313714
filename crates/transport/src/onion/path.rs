use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_primitives::Snode;

/// One hop of a built onion path, in order from guard to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHop {
    pub snode: Snode,
}

/// A built three-hop onion path: guard, relay, and the implicit final hop
/// (the destination itself, not stored here since it varies per request).
///
/// Cheap to clone — hops are shared, not rebuilt, when a path is reused
/// across many requests between teardowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnionPath {
    hops: Vec<PathHop>,
}

const PATH_LENGTH: usize = 2;

impl OnionPath {
    /// Pick `PATH_LENGTH` distinct hops from the candidate pool. Real hop
    /// selection additionally weighs uptime and declines candidates that
    /// recently failed (spec §4.8's accounting feeds back into this); this
    /// models only the structural requirement of distinct, ordered hops.
    pub fn build(candidates: &[Snode]) -> SnrrResult<Self> {
        if candidates.len() < PATH_LENGTH {
            return Err(SnrrError::Protocol(ProtocolError::InsufficientSnodes {
                needed: PATH_LENGTH,
                have: candidates.len(),
            }));
        }

        let hops = candidates
            .iter()
            .take(PATH_LENGTH)
            .cloned()
            .map(|snode| PathHop { snode })
            .collect();

        Ok(Self { hops })
    }

    pub fn guard(&self) -> &Snode {
        &self.hops[0].snode
    }

    pub fn relay(&self) -> &Snode {
        &self.hops[1].snode
    }

    pub fn hops(&self) -> &[PathHop] {
        &self.hops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snode(byte: u8) -> Snode {
        Snode::new("127.0.0.1".parse().unwrap(), 4433, [byte; 32], [byte; 32])
    }

    #[test]
    fn build_fails_with_too_few_candidates() {
        let err = OnionPath::build(&[snode(1)]);
        assert!(matches!(
            err,
            Err(SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: 2, have: 1 }))
        ));
    }

    #[test]
    fn build_picks_guard_and_relay_in_order() {
        let path = OnionPath::build(&[snode(1), snode(2), snode(3)]).unwrap();
        assert_eq!(path.guard(), &snode(1));
        assert_eq!(path.relay(), &snode(2));
        assert_eq!(path.hops().len(), 2);
    }
}
