use snrr_primitives::Snode;

/// Where an overlay transport is ultimately delivering a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A storage service node, addressed by its pool identity.
    Snode(Snode),
    /// A community/file server, addressed by hostname rather than IP.
    Server {
        host: String,
        target: String,
        x25519_pk: [u8; 32],
        scheme: String,
        port: u16,
    },
}

impl Destination {
    /// A human-readable label for logs and dispatcher stats; never used for
    /// routing decisions.
    pub fn label(&self) -> String {
        match self {
            Self::Snode(snode) => snode.to_string(),
            Self::Server { host, .. } => host.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_label_is_the_host() {
        let dest = Destination::Server {
            host: "example.loki".into(),
            target: "/files".into(),
            x25519_pk: [0u8; 32],
            scheme: "https".into(),
            port: 443,
        };
        assert_eq!(dest.label(), "example.loki");
    }
}
