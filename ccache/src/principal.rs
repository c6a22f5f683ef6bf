use crate::{Cursor, Data, ErrorKind};
use log::trace;

const REALM_SEP: u8 = b'@';
const COMPONENT_SEP: u8 = b'/';
const KRB5_TGS_NAME: &str = "krbtgt";

/// Length prefix of an empty blob.
pub(crate) const MIN_DATA_LEN: usize = 4;
/// Smallest principal on disk: name type, component count and an empty realm.
pub(crate) const MIN_PRINCIPAL_LEN: usize = 4 + 4 + MIN_DATA_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub realm: Data,
    pub components: Vec<Data>,
    pub name_type: NameType,
}

impl Principal {
    // principal ::=
    //     name type (32 bits)
    //     count of components (32 bits)
    //     realm (data)
    //     component1 (data)
    //     component2 (data)
    //     ...
    //
    // There is no external framing on a principal, so it must be parsed
    // according to the above grammar to find whatever follows it.
    pub(crate) fn decode(cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        let name_type = NameType(cursor.read_u32()?);
        let component_count = cursor.read_u32()?;
        let realm = cursor.read_data()?;

        let component_count =
            cursor.check_count(component_count, MIN_DATA_LEN, "principal component count")?;
        trace!("principal with {} components", component_count);
        let mut components = Vec::with_capacity(component_count);
        for _ in 0..component_count {
            components.push(cursor.read_data()?);
        }

        Ok(Principal {
            realm,
            components,
            name_type,
        })
    }

    /// Renders `comp1/comp2@REALM`. Components are opaque bytes, so anything
    /// that is not UTF-8 is replaced rather than rejected.
    pub fn unparse_name(&self) -> String {
        let name = self.components.join(&COMPONENT_SEP);
        let name = vec![name, self.realm.clone()].join(&REALM_SEP);
        String::from_utf8_lossy(&name).into_owned()
    }

    pub fn is_local_tgt(&self, realm: &[u8]) -> bool {
        self.components.len() == 2
            && self.realm == realm
            && self.components[0] == KRB5_TGS_NAME.as_bytes()
            && self.components[1] == realm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameType(pub u32);

macro_rules! name_type {
    ($name_type:ident, $int:expr) => {
        pub const $name_type: NameType = NameType($int);
    };
}

impl NameType {
    // Name type not known
    name_type!(UNKNOWN, 0);
    // Just the name of the principal as in DCE, or for users
    name_type!(PRINCIPAL, 1);
    // Service and other unique instance (krbtgt)
    name_type!(SRV_INST, 2);
    // Service with host name as instance (telnet, rcommands)
    name_type!(SRV_HST, 3);
    // Service with host as remaining components
    name_type!(SRV_XHST, 4);
    // Unique ID
    name_type!(UID, 5);
    // PKINIT
    name_type!(X500_PRINCIPAL, 6);
    // Name in form of SMTP email name
    name_type!(SMTP_NAME, 7);
    // Windows 2000 UPN
    name_type!(ENTERPRISE_PRINCIPAL, 10);
    // Well-known (special) principal
    name_type!(WELLKNOWN, 11);
}
