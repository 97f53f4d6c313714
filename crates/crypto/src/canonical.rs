/// The canonical byte string signed for a given authenticated endpoint.
///
/// Each variant names the exact concatenation required by the protocol
/// (spec §4.5); keeping them as an enum instead of ad-hoc `format!` calls at
/// each call site means there is exactly one place that can get a
/// concatenation order wrong.
pub enum CanonicalMessage<'a> {
    Store {
        namespace: i32,
        timestamp_ms: i64,
    },
    Retrieve {
        namespace: i32,
        timestamp_ms: i64,
    },
    Delete {
        hashes: &'a [String],
    },
    Expire {
        expiry_ms: i64,
        hashes: &'a [String],
    },
    RevokeSubkey {
        subkey: &'a [u8],
    },
    /// Not named in the source protocol table; modeled after `Delete`'s
    /// shape (operation name, then namespace if given, then the
    /// server-supplied timestamp that binds the deletion to its clock).
    DeleteAll {
        namespace: Option<i32>,
        timestamp_ms: i64,
    },
}

impl CanonicalMessage<'_> {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Store {
                namespace,
                timestamp_ms,
            } => format!("store{namespace}{timestamp_ms}").into_bytes(),
            Self::Retrieve {
                namespace,
                timestamp_ms,
            } => format!("retrieve{namespace}{timestamp_ms}").into_bytes(),
            Self::Delete { hashes } => {
                let mut buf = b"delete".to_vec();
                for hash in *hashes {
                    buf.extend_from_slice(hash.as_bytes());
                }
                buf
            }
            Self::Expire { expiry_ms, hashes } => {
                let mut buf = format!("expire{expiry_ms}").into_bytes();
                for hash in *hashes {
                    buf.extend_from_slice(hash.as_bytes());
                }
                buf
            }
            Self::RevokeSubkey { subkey } => {
                let mut buf = b"revoke_subkey".to_vec();
                buf.extend_from_slice(subkey);
                buf
            }
            Self::DeleteAll { namespace, timestamp_ms } => {
                let mut buf = b"delete_all".to_vec();
                if let Some(namespace) = namespace {
                    buf.extend_from_slice(namespace.to_string().as_bytes());
                }
                buf.extend_from_slice(timestamp_ms.to_string().as_bytes());
                buf
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_concatenates_namespace_then_timestamp() {
        let msg = CanonicalMessage::Store {
            namespace: -10,
            timestamp_ms: 1_700_000_000_000,
        };
        assert_eq!(msg.to_bytes(), b"store-101700000000000".to_vec());
    }

    #[test]
    fn delete_concatenates_hashes_in_request_order() {
        let hashes = vec!["aaa".to_string(), "bbb".to_string()];
        let msg = CanonicalMessage::Delete { hashes: &hashes };
        assert_eq!(msg.to_bytes(), b"deleteaaabbb".to_vec());
    }

    #[test]
    fn expire_prefixes_expiry_before_hashes() {
        let hashes = vec!["zzz".to_string()];
        let msg = CanonicalMessage::Expire {
            expiry_ms: 42,
            hashes: &hashes,
        };
        assert_eq!(msg.to_bytes(), b"expire42zzz".to_vec());
    }

    #[test]
    fn delete_all_omits_namespace_when_absent() {
        let msg = CanonicalMessage::DeleteAll { namespace: None, timestamp_ms: 42 };
        assert_eq!(msg.to_bytes(), b"delete_all42".to_vec());
    }

    #[test]
    fn delete_all_includes_namespace_when_present() {
        let msg = CanonicalMessage::DeleteAll { namespace: Some(-5), timestamp_ms: 42 };
        assert_eq!(msg.to_bytes(), b"delete_all-542".to_vec());
    }

    #[test]
    fn revoke_subkey_appends_raw_bytes() {
        let subkey = [1u8, 2, 3];
        let msg = CanonicalMessage::RevokeSubkey { subkey: &subkey };
        let mut expected = b"revoke_subkey".to_vec();
        expected.extend_from_slice(&subkey);
        assert_eq!(msg.to_bytes(), expected);
    }
}
