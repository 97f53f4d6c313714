/// Two monotonically non-decreasing counters echoed by snodes as `hf`
/// (`[hardfork, softfork]`). Increasing `hardfork` resets `softfork` to the
/// server-reported value (spec §3); both counters otherwise only move
/// forward, never backward, regardless of what an individual snode echoes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForkCounters {
    pub hardfork: i64,
    pub softfork: i64,
}

impl ForkCounters {
    /// Apply a server-reported `(hardfork, softfork)` pair, enforcing
    /// monotonicity and the hardfork-bump-resets-softfork rule.
    pub fn apply(&mut self, hardfork: i64, softfork: i64) {
        if hardfork > self.hardfork {
            self.hardfork = hardfork;
            self.softfork = softfork;
        } else if hardfork == self.hardfork && softfork > self.softfork {
            self.softfork = softfork;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardfork_bump_resets_softfork_to_reported_value() {
        let mut forks = ForkCounters { hardfork: 19, softfork: 5 };
        forks.apply(20, 1);
        assert_eq!(forks, ForkCounters { hardfork: 20, softfork: 1 });
    }

    #[test]
    fn counters_never_move_backward() {
        let mut forks = ForkCounters { hardfork: 19, softfork: 5 };
        forks.apply(18, 9);
        assert_eq!(forks, ForkCounters { hardfork: 19, softfork: 5 });

        forks.apply(19, 3);
        assert_eq!(forks.softfork, 5);
    }

    #[test]
    fn softfork_advances_within_the_same_hardfork() {
        let mut forks = ForkCounters { hardfork: 19, softfork: 1 };
        forks.apply(19, 4);
        assert_eq!(forks.softfork, 4);
    }
}
