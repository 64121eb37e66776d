//! String binding and dual string array types (MS-DCOM 2.2.19)
//!
//! A DUALSTRINGARRAY is a flat array of 16-bit units holding string
//! bindings, then security bindings, each list terminated by a zero unit.
//! Inside an OBJREF the array travels packed: two counts, then the units.

use std::fmt;

use msrpc_ndr::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter};

/// Protocol tower identifiers
pub mod protocol_id {
    /// TCP/IP protocol
    pub const NCACN_IP_TCP: u16 = 0x07;
    /// Named pipes protocol
    pub const NCACN_NP: u16 = 0x0F;
    /// Local RPC
    pub const NCALRPC: u16 = 0x10;
    /// HTTP protocol
    pub const NCACN_HTTP: u16 = 0x1F;
}

/// Authentication services
pub mod authn_svc {
    pub const NONE: u16 = 0;
    pub const GSS_NEGOTIATE: u16 = 9;
    pub const WINNT: u16 = 10;
    pub const GSS_KERBEROS: u16 = 16;
}

/// No authorization service
pub const AUTHZ_NONE: u16 = 0xFFFF;

/// One network address for reaching an object exporter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringBinding {
    pub tower_id: u16,
    pub network_addr: String,
}

impl StringBinding {
    pub fn new(tower_id: u16, network_addr: impl Into<String>) -> Self {
        Self {
            tower_id,
            network_addr: network_addr.into(),
        }
    }

    pub fn tcp(addr: &str) -> Self {
        Self::new(protocol_id::NCACN_IP_TCP, addr)
    }

    pub fn named_pipe(pipe_name: &str) -> Self {
        Self::new(protocol_id::NCACN_NP, pipe_name)
    }
}

impl fmt::Display for StringBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proto = match self.tower_id {
            protocol_id::NCACN_IP_TCP => "ncacn_ip_tcp",
            protocol_id::NCACN_NP => "ncacn_np",
            protocol_id::NCACN_HTTP => "ncacn_http",
            protocol_id::NCALRPC => "ncalrpc",
            _ => "unknown",
        };
        write!(f, "{}:{}", proto, self.network_addr)
    }
}

/// Authentication service accepted by the exporter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityBinding {
    pub authn_svc: u16,
    pub authz_svc: u16,
    pub principal_name: String,
}

impl SecurityBinding {
    pub fn new(authn_svc: u16, authz_svc: u16, principal_name: impl Into<String>) -> Self {
        Self {
            authn_svc,
            authz_svc,
            principal_name: principal_name.into(),
        }
    }
}

/// DUALSTRINGARRAY (MS-DCOM 2.2.19.1)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DualStringArray {
    pub string_bindings: Vec<StringBinding>,
    pub security_bindings: Vec<SecurityBinding>,
}

fn push_str(units: &mut Vec<u16>, s: &str) {
    units.extend(s.encode_utf16());
    units.push(0);
}

/// Terminate a binding list; an empty list is two zero units.
fn terminate(units: &mut Vec<u16>, empty: bool) {
    if empty {
        units.push(0);
    }
    units.push(0);
}

fn take_str(units: &[u16], pos: &mut usize) -> msrpc_ndr::Result<String> {
    let rest = units.get(*pos..).unwrap_or_default();
    let len = rest
        .iter()
        .position(|&unit| unit == 0)
        .ok_or_else(|| NdrError::InvalidString("unterminated binding".to_string()))?;
    *pos += len + 1;
    Ok(char::decode_utf16(rest[..len].iter().copied()).collect::<Result<String, _>>()?)
}

impl DualStringArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tcp_binding(addr: &str) -> Self {
        Self {
            string_bindings: vec![StringBinding::tcp(addr)],
            security_bindings: Vec::new(),
        }
    }

    pub fn add_string_binding(&mut self, binding: StringBinding) {
        self.string_bindings.push(binding);
    }

    pub fn add_security_binding(&mut self, binding: SecurityBinding) {
        self.security_bindings.push(binding);
    }

    /// `aStringArray` and `wSecurityOffset`
    pub fn to_units(&self) -> (Vec<u16>, u16) {
        let mut units = Vec::new();
        for binding in &self.string_bindings {
            units.push(binding.tower_id);
            push_str(&mut units, &binding.network_addr);
        }
        terminate(&mut units, self.string_bindings.is_empty());
        let security_offset = units.len() as u16;
        for binding in &self.security_bindings {
            units.push(binding.authn_svc);
            units.push(binding.authz_svc);
            push_str(&mut units, &binding.principal_name);
        }
        terminate(&mut units, self.security_bindings.is_empty());
        (units, security_offset)
    }

    pub fn from_units(units: &[u16], security_offset: u16) -> msrpc_ndr::Result<Self> {
        let security_offset = usize::from(security_offset);
        if security_offset > units.len() {
            return Err(NdrError::ArraySizeMismatch {
                expected: units.len(),
                got: security_offset,
            });
        }

        let mut string_bindings = Vec::new();
        let mut pos = 0;
        while pos < security_offset && units[pos] != 0 {
            let tower_id = units[pos];
            pos += 1;
            let network_addr = take_str(units, &mut pos)?;
            string_bindings.push(StringBinding {
                tower_id,
                network_addr,
            });
        }

        let mut security_bindings = Vec::new();
        pos = security_offset;
        while pos + 1 < units.len() && units[pos] != 0 {
            let authn_svc = units[pos];
            let authz_svc = units[pos + 1];
            pos += 2;
            let principal_name = take_str(units, &mut pos)?;
            security_bindings.push(SecurityBinding {
                authn_svc,
                authz_svc,
                principal_name,
            });
        }

        Ok(Self {
            string_bindings,
            security_bindings,
        })
    }
}

impl NdrEncode for DualStringArray {
    fn ndr_encode<'a>(&'a self, w: &mut NdrWriter<'a>) -> msrpc_ndr::Result<()> {
        let (units, security_offset) = self.to_units();
        w.write_u16(units.len() as u16);
        w.write_u16(security_offset);
        for unit in units {
            w.write_u16(unit);
        }
        Ok(())
    }
}

impl NdrDecode for DualStringArray {
    fn ndr_decode<'a>(&'a mut self, r: &mut NdrReader<'a>) -> msrpc_ndr::Result<()> {
        let num_entries = r.read_u16()?;
        let security_offset = r.read_u16()?;
        let count = r.check_count(u32::from(num_entries), 2)?;
        let units = (0..count)
            .map(|_| r.read_u16())
            .collect::<msrpc_ndr::Result<Vec<u16>>>()?;
        *self = Self::from_units(&units, security_offset)?;
        Ok(())
    }
}
