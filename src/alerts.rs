//! Critical-port classification.
//!
//! Maps well-known high-risk ports to a human-readable risk description.
//! An open port matching this table triggers a critical-finding event.

use crate::types::Port;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Static map of high-risk ports to risk descriptions.
static CRITICAL_PORTS: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(21, "FTP (Unencrypted file transfer)");
    m.insert(23, "Telnet (Unencrypted remote login)");
    m.insert(25, "SMTP (Unencrypted email sending)");
    m.insert(110, "POP3 (Unencrypted email receiving)");
    m.insert(143, "IMAP (Unencrypted email receiving)");
    m.insert(445, "SMB (Direct file sharing, often targeted by ransomware)");
    m.insert(3389, "RDP (Remote Desktop, common attack vector)");

    m
});

/// Look up the risk description for a port.
///
/// Returns `None` for ports not in the table. Pure lookup: no state, no
/// failure modes.
pub fn classify(port: Port) -> Option<&'static str> {
    CRITICAL_PORTS.get(&port.as_u16()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_known_critical_ports() {
        assert_eq!(classify(port(23)), Some("Telnet (Unencrypted remote login)"));
        assert_eq!(
            classify(port(445)),
            Some("SMB (Direct file sharing, often targeted by ransomware)")
        );
        assert_eq!(
            classify(port(3389)),
            Some("RDP (Remote Desktop, common attack vector)")
        );
    }

    #[test]
    fn test_ordinary_ports_are_not_critical() {
        assert_eq!(classify(port(22)), None);
        assert_eq!(classify(port(80)), None);
        assert_eq!(classify(port(443)), None);
    }

    #[test]
    fn test_classification_is_idempotent() {
        assert_eq!(classify(port(21)), classify(port(21)));
    }
}
