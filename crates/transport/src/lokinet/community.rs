/// Fixed mapping from a community/open-group host name to the Lokinet
/// address and port that tunnels to it. Hosts without an entry return
/// `None`, which the transport turns into `InvalidUrl` — there is no
/// fallback for community servers Lokinet has no route to.
const COMMUNITY_HOSTS: &[(&str, &str, u16)] = &[
    (
        "open.getsession.org",
        "bl4venxp9f5xgk6o4dfdqebzwkz3qa9c6j3k9rwxdn8ba4wru1qo.loki",
        80,
    ),
    (
        "chat.session.community",
        "nihznctaib8qr7eqyetpfxr9i1kixbiqy5mrpdbk8fwcw6sp9qno.loki",
        80,
    ),
];

/// Look up the `.loki` tunnel address and port for a known community host.
pub fn lookup(host: &str) -> Option<(&'static str, u16)> {
    COMMUNITY_HOSTS
        .iter()
        .find(|(h, _, _)| *h == host)
        .map(|(_, loki, port)| (*loki, *port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_host_resolves() {
        assert!(lookup("open.getsession.org").is_some());
    }

    #[test]
    fn unknown_host_resolves_to_none() {
        assert!(lookup("not-a-known-community-host.example").is_none());
    }
}
