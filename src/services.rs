//! Static classification tables.
//!
//! A [`LookupTable`] maps a numeric key (a port or an HTTP status code) to
//! a short label, with a fallback for keys it does not know. Each probe
//! kind owns its table and hands it to the report aggregator.


/// Fixed mapping from a numeric key to a display label.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    entries: &'static [(u16, &'static str)],
    fallback: &'static str,
}

impl LookupTable {
    pub const fn new(entries: &'static [(u16, &'static str)], fallback: &'static str) -> Self {
        Self { entries, fallback }
    }

    /// Label for `key`, if the table knows it.
    pub fn get(&self, key: u16) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, label)| *label)
    }

    /// Label for `key`, or the fallback.
    pub fn label(&self, key: u16) -> &'static str {
        self.get(key).unwrap_or(self.fallback)
    }

    /// Whether `key` is in the table.
    pub fn contains(&self, key: u16) -> bool {
        self.get(key).is_some()
    }
}

/// Well-known TCP ports and the services usually found on them.
pub static PORT_SERVICES: LookupTable = LookupTable::new(
    &[
        (20, "FTP-Data"),
        (21, "FTP"),
        (22, "SSH"),
        (23, "Telnet"),
        (25, "SMTP"),
        (53, "DNS"),
        (69, "TFTP"),
        (80, "HTTP"),
        (88, "Kerberos"),
        (110, "POP3"),
        (111, "RPCBind"),
        (135, "MSRPC"),
        (139, "NetBIOS-SSN"),
        (143, "IMAP"),
        (161, "SNMP"),
        (389, "LDAP"),
        (443, "HTTPS"),
        (445, "SMB"),
        (465, "SMTPS"),
        (587, "Submission"),
        (636, "LDAPS"),
        (873, "Rsync"),
        (993, "IMAPS"),
        (995, "POP3S"),
        (1080, "SOCKS"),
        (1433, "MSSQL"),
        (1521, "Oracle"),
        (2049, "NFS"),
        (2375, "Docker"),
        (3000, "HTTP-Dev"),
        (3306, "MySQL"),
        (3389, "RDP"),
        (5000, "HTTP-Dev"),
        (5432, "PostgreSQL"),
        (5900, "VNC"),
        (5985, "WinRM"),
        (6379, "Redis"),
        (8000, "HTTP-Alt"),
        (8080, "HTTP-Alt"),
        (8443, "HTTPS-Alt"),
        (8888, "HTTP-Alt"),
        (9200, "Elasticsearch"),
        (11211, "Memcached"),
        (27017, "MongoDB"),
    ],
    "Unknown",
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_common_ports() {
        assert_eq!(PORT_SERVICES.get(22), Some("SSH"));
        assert_eq!(PORT_SERVICES.get(80), Some("HTTP"));
        assert_eq!(PORT_SERVICES.get(445), Some("SMB"));
        assert_eq!(PORT_SERVICES.label(3306), "MySQL");
    }

    #[test]
    fn test_unknown_port() {
        assert_eq!(PORT_SERVICES.get(12345), None);
        assert_eq!(PORT_SERVICES.label(12345), "Unknown");
    }

    #[test]
    fn test_no_duplicate_keys() {
        let keys: Vec<u16> = PORT_SERVICES.entries.iter().map(|(k, _)| *k).collect();
        let unique: HashSet<u16> = keys.iter().copied().collect();
        assert_eq!(keys.len(), unique.len());
    }
}
