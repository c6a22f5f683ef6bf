use crate::{
    principal::{MIN_DATA_LEN, MIN_PRINCIPAL_LEN},
    Cursor, Data, Enctype, ErrorKind, Flags, Principal, Timestamp,
};
use log::trace;

const CONF_REALM: &str = "X-CACHECONF:";
const CONF_NAME: &str = "krb5_ccache_conf_data";

const MIN_TAGGED_BLOB_LEN: usize = 2 + MIN_DATA_LEN;
const TIMES_LEN: usize = 4 * 4;
const IS_SKEY_LEN: usize = 1;
const FLAGS_LEN: usize = 4;
const LIST_COUNT_LEN: usize = 4;

/// Size of the smallest credential record: principals without components,
/// and empty keyblock, address list, authdata list and tickets.
pub const MIN_CREDENTIAL_LEN: usize = 2 * MIN_PRINCIPAL_LEN
    + MIN_TAGGED_BLOB_LEN
    + TIMES_LEN
    + IS_SKEY_LEN
    + FLAGS_LEN
    + 2 * LIST_COUNT_LEN
    + 2 * MIN_DATA_LEN;

type AddressType = u16;
type AuthDataType = u16;

/// A 16-bit discriminant bound to one data blob. Keyblocks, addresses and
/// authorization data entries all share this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedBlob {
    pub tag: u16,
    pub contents: Data,
}

/// `tag` is the enctype.
pub type Keyblock = TaggedBlob;
/// `tag` is the address type.
pub type Address = TaggedBlob;
/// `tag` is the ad-type.
pub type AuthData = TaggedBlob;

impl TaggedBlob {
    fn decode(cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        let tag = cursor.read_u16()?;
        let contents = cursor.read_data()?;
        Ok(TaggedBlob { tag, contents })
    }

    fn decode_list(cursor: &mut Cursor, what: &'static str) -> Result<Vec<Self>, ErrorKind> {
        let count = cursor.read_u32()?;
        let count = cursor.check_count(count, MIN_TAGGED_BLOB_LEN, what)?;
        trace!("{} entries in {}", count, what);
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(Self::decode(cursor)?);
        }
        Ok(list)
    }

    pub fn enctype(&self) -> Enctype {
        self.tag
    }
}

pub const ADDRTYPE_INET: AddressType = 0x0002;
pub const ADDRTYPE_CHAOS: AddressType = 0x0005;
pub const ADDRTYPE_XNS: AddressType = 0x0006;
pub const ADDRTYPE_ISO: AddressType = 0x0007;
pub const ADDRTYPE_DDP: AddressType = 0x0010;
pub const ADDRTYPE_INET6: AddressType = 0x0018;
pub const ADDRTYPE_ADDRPORT: AddressType = 0x0100;
pub const ADDRTYPE_IPPORT: AddressType = 0x0101;

pub const AD_TYPE_IF_RELEVANT: AuthDataType = 1;
pub const AD_TYPE_KDC_ISSUED: AuthDataType = 4;
pub const AD_TYPE_AND_OR: AuthDataType = 5;
pub const AD_TYPE_MANDATORY_FOR_KDC: AuthDataType = 8;
pub const AD_TYPE_WIN2K_PAC: AuthDataType = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub client: Principal,
    pub server: Principal,
    pub keyblock: Keyblock,
    pub times: TicketTimes,
    pub is_skey: bool,
    pub ticket_flags: Flags,
    pub addresses: Vec<Address>,
    pub authdata: Vec<AuthData>,
    pub ticket: Data,
    pub second_ticket: Data,
}

macro_rules! ticket_flag {
    ($name:ident, $value:expr) => {
        pub const $name: Flags = $value;
    };
}

impl Credential {
    ticket_flag!(TKT_FLG_FORWARDABLE, 0x40000000);
    ticket_flag!(TKT_FLG_FORWARDED, 0x20000000);
    ticket_flag!(TKT_FLG_PROXIABLE, 0x10000000);
    ticket_flag!(TKT_FLG_PROXY, 0x08000000);
    ticket_flag!(TKT_FLG_MAY_POSTDATE, 0x04000000);
    ticket_flag!(TKT_FLG_POSTDATED, 0x02000000);
    ticket_flag!(TKT_FLG_INVALID, 0x01000000);
    ticket_flag!(TKT_FLG_RENEWABLE, 0x00800000);
    ticket_flag!(TKT_FLG_INITIAL, 0x00400000);
    ticket_flag!(TKT_FLG_PRE_AUTH, 0x00200000);
    ticket_flag!(TKT_FLG_HW_AUTH, 0x00100000);
    ticket_flag!(TKT_FLG_TRANSIT_POLICY_CHECKED, 0x00080000);
    ticket_flag!(TKT_FLG_OK_AS_DELEGATE, 0x00040000);
    ticket_flag!(TKT_FLG_ENC_PA_REP, 0x00010000);
    ticket_flag!(TKT_FLG_ANONYMOUS, 0x00008000);

    // credential ::=
    //     client (principal)
    //     server (principal)
    //     keyblock (keyblock)
    //     authtime (32 bits)
    //     starttime (32 bits)
    //     endtime (32 bits)
    //     renew_till (32 bits)
    //     is_skey (1 byte, 0 or 1)
    //     ticket_flags (32 bits)
    //     addresses (addresses)
    //     authdata (authdata)
    //     ticket (data)
    //     second_ticket (data)
    // keyblock ::=
    //     enctype (16 bits)
    //     data
    // addresses ::=
    //     count (32 bits)
    //     address1
    //     ...
    // address ::=
    //     addrtype (16 bits)
    //     data
    // authdata ::=
    //     count (32 bits)
    //     authdata1
    //     ...
    // authdata ::=
    //     ad_type (16 bits)
    //     data
    //
    // Fields carry no tags, so every one of them is found by position alone.
    pub(crate) fn decode(cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        let client = Principal::decode(cursor)?;
        let server = Principal::decode(cursor)?;
        let keyblock = Keyblock::decode(cursor)?;
        let times = TicketTimes::decode(cursor)?;
        let is_skey = cursor.read_u8()? != 0;
        let ticket_flags = cursor.read_u32()?;
        let addresses = Address::decode_list(cursor, "address count")?;
        let authdata = AuthData::decode_list(cursor, "authdata count")?;
        let ticket = cursor.read_data()?;
        let second_ticket = cursor.read_data()?;

        Ok(Credential {
            client,
            server,
            keyblock,
            times,
            is_skey,
            ticket_flags,
            addresses,
            authdata,
            ticket,
            second_ticket,
        })
    }

    #[inline]
    pub fn has_flag(&self, flag: Flags) -> bool {
        self.ticket_flags & flag != 0
    }

    // Configuration entries are encoded as credential entries. The server
    // principal has the realm X-CACHECONF: and two or three components, the
    // first of which is krb5_ccache_conf_data, the second the configuration
    // key and the optional third a principal the key is associated with. The
    // value is stored in the ticket field.
    pub fn is_config(&self) -> bool {
        if self.server.realm != CONF_REALM.as_bytes() {
            return false;
        }
        self.server
            .components
            .first()
            .is_some_and(|component| component == CONF_NAME.as_bytes())
    }

    pub fn get_config(&self) -> Option<(&Data, Option<&Data>, &Data)> {
        if !self.is_config() {
            return None;
        }
        let components = &self.server.components;
        let key = components.get(1)?;
        Some((key, components.get(2), &self.ticket))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketTimes {
    pub authtime: Timestamp,
    pub starttime: Timestamp,
    pub endtime: Timestamp,
    pub renew_till: Timestamp,
}

impl TicketTimes {
    fn decode(cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        Ok(TicketTimes {
            authtime: cursor.read_u32()?,
            starttime: cursor.read_u32()?,
            endtime: cursor.read_u32()?,
            renew_till: cursor.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NameType;

    fn put_data(buf: &mut Vec<u8>, data: &[u8]) {
        buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
        buf.extend_from_slice(data);
    }

    fn put_principal(buf: &mut Vec<u8>, realm: &str, components: &[&str]) {
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&(components.len() as u32).to_be_bytes());
        put_data(buf, realm.as_bytes());
        for component in components {
            put_data(buf, component.as_bytes());
        }
    }

    fn credential_bytes(server: &[&str], server_realm: &str) -> Vec<u8> {
        let mut buf = vec![];
        put_principal(&mut buf, "EXAMPLE.COM", &["alice"]);
        put_principal(&mut buf, server_realm, server);
        buf.extend_from_slice(&18u16.to_be_bytes());
        put_data(&mut buf, &[0x11; 32]);
        for time in [100u32, 0, 400, 500] {
            buf.extend_from_slice(&time.to_be_bytes());
        }
        buf.push(2);
        buf.extend_from_slice(&0x40e10000u32.to_be_bytes());
        buf.extend_from_slice(&2u32.to_be_bytes());
        buf.extend_from_slice(&ADDRTYPE_INET.to_be_bytes());
        put_data(&mut buf, &[10, 0, 0, 1]);
        buf.extend_from_slice(&ADDRTYPE_INET6.to_be_bytes());
        put_data(&mut buf, &[0; 16]);
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&AD_TYPE_IF_RELEVANT.to_be_bytes());
        put_data(&mut buf, b"ad");
        put_data(&mut buf, b"ticket");
        put_data(&mut buf, b"");
        buf
    }

    #[test]
    fn decodes_fields_in_order() {
        let buf = credential_bytes(&["krbtgt", "EXAMPLE.COM"], "EXAMPLE.COM");
        let mut cursor = Cursor::new(&buf);
        let credential = Credential::decode(&mut cursor).unwrap();
        assert_eq!(cursor.remaining(), 0);

        assert_eq!(credential.client.name_type, NameType::PRINCIPAL);
        assert_eq!(credential.client.unparse_name(), "alice@EXAMPLE.COM");
        assert!(credential.server.is_local_tgt(b"EXAMPLE.COM"));
        assert_eq!(credential.keyblock.enctype(), 18);
        assert_eq!(credential.keyblock.contents, vec![0x11; 32]);
        assert_eq!(
            credential.times,
            TicketTimes {
                authtime: 100,
                starttime: 0,
                endtime: 400,
                renew_till: 500,
            }
        );
        assert!(credential.is_skey);
        assert!(credential.has_flag(Credential::TKT_FLG_FORWARDABLE));
        assert!(credential.has_flag(Credential::TKT_FLG_RENEWABLE));
        assert!(!credential.has_flag(Credential::TKT_FLG_PROXY));
        let address_types: Vec<u16> = credential.addresses.iter().map(|a| a.tag).collect();
        assert_eq!(address_types, vec![ADDRTYPE_INET, ADDRTYPE_INET6]);
        assert_eq!(credential.authdata[0].contents, b"ad");
        assert_eq!(credential.ticket, b"ticket");
        assert!(credential.second_ticket.is_empty());
        assert!(!credential.is_config());
    }

    #[test]
    fn minimal_record_size() {
        let mut buf = vec![];
        put_principal(&mut buf, "", &[]);
        put_principal(&mut buf, "", &[]);
        buf.extend_from_slice(&[0; MIN_TAGGED_BLOB_LEN + TIMES_LEN + IS_SKEY_LEN + FLAGS_LEN]);
        buf.extend_from_slice(&[0; 2 * LIST_COUNT_LEN + 2 * MIN_DATA_LEN]);
        assert_eq!(buf.len(), MIN_CREDENTIAL_LEN);
        assert_eq!(MIN_CREDENTIAL_LEN, 67);

        let mut cursor = Cursor::new(&buf);
        let credential = Credential::decode(&mut cursor).unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert!(!credential.is_skey);
        assert!(credential.addresses.is_empty());

        let mut cursor = Cursor::new(&buf[..MIN_CREDENTIAL_LEN - 1]);
        assert!(matches!(
            Credential::decode(&mut cursor),
            Err(ErrorKind::Truncated { .. })
        ));
    }

    #[test]
    fn truncated_anywhere_fails() {
        let buf = credential_bytes(&["host", "db.example.com"], "EXAMPLE.COM");
        for length in 0..buf.len() {
            let mut cursor = Cursor::new(&buf[..length]);
            assert!(
                matches!(
                    Credential::decode(&mut cursor),
                    Err(ErrorKind::Truncated { .. }) | Err(ErrorKind::Malformed(_))
                ),
                "prefix of {} bytes decoded",
                length
            );
        }
    }

    #[test]
    fn impossible_address_count() {
        let mut buf = vec![];
        put_principal(&mut buf, "", &[]);
        put_principal(&mut buf, "", &[]);
        buf.extend_from_slice(&[0; MIN_TAGGED_BLOB_LEN + TIMES_LEN + IS_SKEY_LEN + FLAGS_LEN]);
        buf.extend_from_slice(&0x10000000u32.to_be_bytes());
        buf.extend_from_slice(&[0; 12]);

        assert_eq!(
            Credential::decode(&mut Cursor::new(&buf)),
            Err(ErrorKind::Malformed("address count"))
        );
    }

    #[test]
    fn config_entry() {
        let buf = credential_bytes(
            &[CONF_NAME, "pa_type", "krbtgt/EXAMPLE.COM@EXAMPLE.COM"],
            CONF_REALM,
        );
        let credential = Credential::decode(&mut Cursor::new(&buf)).unwrap();
        assert!(credential.is_config());
        let (key, principal, value) = credential.get_config().unwrap();
        assert_eq!(key, b"pa_type");
        assert_eq!(
            principal.map(Vec::as_slice),
            Some(&b"krbtgt/EXAMPLE.COM@EXAMPLE.COM"[..])
        );
        assert_eq!(value, b"ticket");
    }

    #[test]
    fn config_entry_without_key() {
        let buf = credential_bytes(&[CONF_NAME], CONF_REALM);
        let credential = Credential::decode(&mut Cursor::new(&buf)).unwrap();
        assert!(credential.is_config());
        assert_eq!(credential.get_config(), None);
    }
}
