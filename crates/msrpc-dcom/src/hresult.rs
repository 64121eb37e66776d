//! HRESULT and RPC status codes
//!
//! Method return values and fault statuses are 32-bit codes. [`Hresult`]
//! wraps one and renders it with its symbolic name and description when the
//! code is well known, or with its facility and code otherwise.

use std::fmt;

/// A 32-bit status code as returned by a DCOM method
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hresult(pub i32);

macro_rules! known_codes {
    ($($name:ident = $value:expr, $description:expr;)*) => {
        impl Hresult {
            $(
                pub const $name: Hresult = Hresult::from_u32($value);
            )*
        }

        const KNOWN: &[(u32, &str, &str)] = &[
            $(($value, stringify!($name), $description),)*
        ];
    };
}

known_codes! {
    S_OK = 0x0000_0000, "Success";
    S_FALSE = 0x0000_0001, "Success, condition false";
    E_NOTIMPL = 0x8000_4001, "Not implemented";
    E_NOINTERFACE = 0x8000_4002, "No such interface supported";
    E_POINTER = 0x8000_4003, "Invalid pointer";
    E_ABORT = 0x8000_4004, "Operation aborted";
    E_FAIL = 0x8000_4005, "Unspecified error";
    E_UNEXPECTED = 0x8000_FFFF, "Catastrophic failure";
    E_ACCESSDENIED = 0x8007_0005, "General access denied error";
    E_HANDLE = 0x8007_0006, "Invalid handle";
    E_OUTOFMEMORY = 0x8007_000E, "Ran out of memory";
    E_INVALIDARG = 0x8007_0057, "One or more arguments are invalid";
    DISP_E_UNKNOWNINTERFACE = 0x8002_0001, "Unknown interface";
    DISP_E_MEMBERNOTFOUND = 0x8002_0003, "Member not found";
    DISP_E_PARAMNOTFOUND = 0x8002_0004, "Parameter not found";
    DISP_E_TYPEMISMATCH = 0x8002_0005, "Type mismatch";
    DISP_E_UNKNOWNNAME = 0x8002_0006, "Unknown name";
    DISP_E_BADVARTYPE = 0x8002_0008, "Bad variable type";
    DISP_E_EXCEPTION = 0x8002_0009, "Exception occurred";
    DISP_E_BADINDEX = 0x8002_000B, "Invalid index";
    DISP_E_UNKNOWNLCID = 0x8002_000C, "Unknown language";
    DISP_E_BADPARAMCOUNT = 0x8002_000E, "Invalid number of parameters";
    REGDB_E_CLASSNOTREG = 0x8004_0154, "Class not registered";
    CO_E_OBJNOTCONNECTED = 0x8004_01FD, "Object is not connected to server";
    RPC_E_DISCONNECTED = 0x8001_0108, "The object invoked has disconnected from its clients";
    RPC_E_SERVER_DIED = 0x8001_0007, "The server threw an exception";
    RPC_E_INVALID_HEADER = 0x8001_0111, "OLE received a packet with an invalid header";
    NCA_S_OP_RNG_ERROR = 0x1C01_0002, "The operation number is out of range";
    NCA_S_UNK_IF = 0x1C01_0003, "The interface is unknown to the server";
    NCA_S_PROTO_ERROR = 0x1C01_000B, "RPC protocol error";
    NCA_S_FAULT_CANCEL = 0x1C00_000D, "The call was cancelled";
    RPC_S_ACCESS_DENIED = 0x0000_0005, "Access is denied";
    RPC_X_BAD_STUB_DATA = 0x0000_06F7, "The stub received bad data";
    RPC_S_CALL_CANCELLED = 0x0000_071A, "The remote procedure call was cancelled";
    FSRM_E_NOT_FOUND = 0x8004_5301, "The requested object was not found";
    FSRM_E_INVALID_SCHEDULER_ARGUMENT = 0x8004_5302, "The specified scheduler argument is invalid";
    FSRM_E_ALREADY_EXISTS = 0x8004_5303, "The object already exists";
    FSRM_E_PATH_NOT_FOUND = 0x8004_5304, "The specified path was not found";
    FSRM_E_INVALID_USER = 0x8004_5305, "The specified user is invalid";
    FSRM_E_INVALID_PATH = 0x8004_5306, "The specified path is invalid";
    FSRM_E_INVALID_LIMIT = 0x8004_5307, "The specified limit is invalid";
    FSRM_E_INVALID_NAME = 0x8004_5308, "The specified name is invalid";
    FSRM_E_OUT_OF_RANGE = 0x8004_530D, "The value is out of range";
    FSRM_E_MODULE_INVALID_PARAM = 0x8004_5357, "A module parameter is invalid";
    FSRM_E_PROPERTY_DELETED = 0x8004_535F, "The property was deleted";
}

impl Hresult {
    pub const fn from_u32(value: u32) -> Self {
        Self(value as i32)
    }

    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Severity bit clear
    pub fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Facility field (bits 16 through 28)
    pub fn facility(self) -> u16 {
        ((self.as_u32() >> 16) & 0x1FFF) as u16
    }

    /// Code field (low 16 bits)
    pub fn code(self) -> u16 {
        (self.as_u32() & 0xFFFF) as u16
    }

    fn lookup(self) -> Option<&'static (u32, &'static str, &'static str)> {
        KNOWN.iter().find(|(value, _, _)| *value == self.as_u32())
    }

    /// Symbolic name, such as `E_ACCESSDENIED`
    pub fn name(self) -> Option<&'static str> {
        self.lookup().map(|(_, name, _)| *name)
    }

    pub fn description(self) -> Option<&'static str> {
        self.lookup().map(|(_, _, description)| *description)
    }
}

impl From<i32> for Hresult {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<Hresult> for i32 {
    fn from(value: Hresult) -> Self {
        value.0
    }
}

impl fmt::Debug for Hresult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Hresult({name})"),
            None => write!(f, "Hresult(0x{:08X})", self.as_u32()),
        }
    }
}

impl fmt::Display for Hresult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lookup() {
            Some((value, name, description)) => write!(f, "{name} (0x{value:08X}): {description}"),
            None => write!(
                f,
                "0x{:08X}: {} in facility {}, code {}",
                self.as_u32(),
                if self.is_success() { "success" } else { "error" },
                self.facility(),
                self.code()
            ),
        }
    }
}
